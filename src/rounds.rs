use serde::Serialize;
use tracing::warn;

use crate::types::{BracketType, GRAND_FINAL_ROUND, LOSER_ROUND_OFFSET, RESET_FINAL_ROUND};

/// Normalized view of a raw `(round_number, bracket_type)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundInfo {
    pub partition: BracketType,
    pub display_round: i32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    #[default]
    Standard,
    /// Name the last two winner rounds "Final" and "Semi-Final".
    SingleElimination { final_round: i32 },
}

pub fn classify(round_number: i32, bracket_type: BracketType) -> RoundInfo {
    classify_with(round_number, bracket_type, LabelStyle::Standard)
}

pub fn classify_with(round_number: i32, bracket_type: BracketType, style: LabelStyle) -> RoundInfo {
    match bracket_type {
        BracketType::Loser => classify_loser(round_number),
        BracketType::Championship => classify_championship(round_number),
        BracketType::Winner => classify_winner(round_number, style),
    }
}

fn classify_loser(round_number: i32) -> RoundInfo {
    let display_round = if round_number > LOSER_ROUND_OFFSET {
        round_number - LOSER_ROUND_OFFSET
    } else {
        warn!("loser round {round_number} is not offset by {LOSER_ROUND_OFFSET}, using it as-is");
        round_number.max(1)
    };
    let label = if display_round == 1 {
        "First LB Round".to_string()
    } else {
        format!("LB Round {display_round}")
    };
    RoundInfo {
        partition: BracketType::Loser,
        display_round,
        label,
    }
}

fn classify_championship(round_number: i32) -> RoundInfo {
    if round_number != GRAND_FINAL_ROUND && round_number != RESET_FINAL_ROUND {
        warn!(
            "championship round {round_number} is neither {GRAND_FINAL_ROUND} nor \
             {RESET_FINAL_ROUND}, labeling as grand final"
        );
    }
    let label = if round_number == RESET_FINAL_ROUND {
        "Bracket Reset"
    } else {
        "Grand Final"
    };
    RoundInfo {
        partition: BracketType::Championship,
        display_round: round_number,
        label: label.to_string(),
    }
}

fn classify_winner(round_number: i32, style: LabelStyle) -> RoundInfo {
    let display_round = if round_number < 1 {
        warn!("winner round {round_number} is below 1, clamping");
        1
    } else {
        if round_number > LOSER_ROUND_OFFSET {
            warn!("winner round {round_number} looks like a loser/championship encoding");
        }
        round_number
    };

    if let LabelStyle::SingleElimination { final_round } = style {
        if display_round == final_round {
            return winner_info(display_round, "Final".to_string());
        }
        if final_round >= 2 && display_round == final_round - 1 {
            return winner_info(display_round, "Semi-Final".to_string());
        }
    }

    let label = if display_round == 1 {
        "First Round".to_string()
    } else {
        format!("Round {display_round}")
    };
    winner_info(display_round, label)
}

fn winner_info(display_round: i32, label: String) -> RoundInfo {
    RoundInfo {
        partition: BracketType::Winner,
        display_round,
        label,
    }
}
