use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::LayoutConfig;
use crate::connectors::route_with_offset;
use crate::geometry::collect;
use crate::grouping::{group, Grouping};
use crate::numbering::assign_numbers;
use crate::rounds::{classify_with, LabelStyle};
use crate::types::{
    BracketPoint, BracketType, Connector, EliminationType, Match, Rect, RenderedBox,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundColumn {
    pub partition: BracketType,
    pub round_number: i32,
    pub label: String,
    pub match_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub elimination: EliminationType,
    pub columns: Vec<RoundColumn>,
    pub numbers: BTreeMap<i64, u32>,
    pub container: Rect,
    pub boxes: Vec<RenderedBox>,
    pub points: Vec<BracketPoint>,
    pub connectors: Vec<Connector>,
}

/// Extent of a laid-out partition block.
#[derive(Debug, Clone, Copy, Default)]
struct Extent {
    right: f64,
    bottom: f64,
}

/// Hand-computed match boxes. Winner rounds run left to right on top, loser
/// rounds below them, and the championship column sits to the right of both,
/// level with the midpoint of the two bracket finals.
pub fn compute_boxes(grouping: &Grouping, config: &LayoutConfig) -> (Rect, Vec<RenderedBox>) {
    let mut boxes = Vec::with_capacity(grouping.match_count());

    let winner = layout_partition(grouping, BracketType::Winner, 0.0, 0.0, config, &mut boxes);
    let loser_top = if winner.bottom > 0.0 {
        winner.bottom + config.partition_gap
    } else {
        0.0
    };
    let loser = layout_partition(grouping, BracketType::Loser, 0.0, loser_top, config, &mut boxes);

    let mut extent = Extent {
        right: winner.right.max(loser.right),
        bottom: winner.bottom.max(loser.bottom),
    };

    if grouping.final_round(BracketType::Championship).is_some() {
        let left = if extent.right > 0.0 {
            extent.right + config.column_gap + config.merge_offset
        } else {
            0.0
        };
        let center = finals_midpoint(&boxes).unwrap_or(config.box_height / 2.0);
        let top = (center - config.box_height / 2.0).max(0.0);
        let championship =
            layout_partition(grouping, BracketType::Championship, left, top, config, &mut boxes);
        extent.right = extent.right.max(championship.right);
        extent.bottom = extent.bottom.max(championship.bottom);
    }

    (Rect::new(0.0, 0.0, extent.right, extent.bottom), boxes)
}

/// Lays out one partition's rounds as columns starting at `(left, top)`.
fn layout_partition(
    grouping: &Grouping,
    bracket_type: BracketType,
    left: f64,
    top: f64,
    config: &LayoutConfig,
    boxes: &mut Vec<RenderedBox>,
) -> Extent {
    let mut extent = Extent::default();
    let mut previous_tops: Vec<f64> = Vec::new();

    for (column, (round_number, bucket)) in grouping.rounds(bracket_type).enumerate() {
        let x = left + column as f64 * (config.box_width + config.column_gap);
        let mut tops: Vec<f64> = Vec::with_capacity(bucket.len());

        for (match_index, m) in bucket.iter().enumerate() {
            let stacked = tops
                .last()
                .map(|prev| prev + config.box_height + config.row_gap)
                .unwrap_or(top);
            let feeders: Vec<f64> = [2 * match_index, 2 * match_index + 1]
                .iter()
                .filter_map(|i| previous_tops.get(*i).copied())
                .collect();
            let y = if feeders.is_empty() {
                stacked
            } else {
                let centered = feeders.iter().sum::<f64>() / feeders.len() as f64;
                centered.max(stacked)
            };
            tops.push(y);

            let rect = Rect::new(x, y, config.box_width, config.box_height);
            extent.right = extent.right.max(rect.right());
            extent.bottom = extent.bottom.max(rect.bottom());
            boxes.push(RenderedBox {
                match_id: m.id,
                round: round_number,
                match_index,
                bracket_type,
                status: m.status,
                rect,
            });
        }
        previous_tops = tops;
    }
    extent
}

/// Vertical midpoint between the winner final and loser final boxes.
fn finals_midpoint(boxes: &[RenderedBox]) -> Option<f64> {
    let final_center = |bracket_type: BracketType| {
        let last_round = boxes
            .iter()
            .filter(|b| b.bracket_type == bracket_type)
            .map(|b| b.round)
            .max()?;
        boxes
            .iter()
            .filter(|b| b.bracket_type == bracket_type && b.round == last_round)
            .max_by_key(|b| b.match_index)
            .map(|b| b.rect.top + b.rect.height / 2.0)
    };
    match (final_center(BracketType::Winner), final_center(BracketType::Loser)) {
        (Some(w), Some(l)) => Some((w + l) / 2.0),
        (Some(w), None) => Some(w),
        (None, Some(l)) => Some(l),
        (None, None) => None,
    }
}

fn round_columns(
    grouping: &Grouping,
    elimination: EliminationType,
    config: &LayoutConfig,
) -> Vec<RoundColumn> {
    let winner_style = match (elimination, grouping.final_round(BracketType::Winner)) {
        (EliminationType::Single, Some(final_round)) if config.single_elim_labels => {
            LabelStyle::SingleElimination { final_round }
        }
        _ => LabelStyle::Standard,
    };

    let mut columns = Vec::new();
    for partition in grouping.partitions() {
        let style = if partition == BracketType::Winner {
            winner_style
        } else {
            LabelStyle::Standard
        };
        for (round_number, bucket) in grouping.rounds(partition) {
            columns.push(RoundColumn {
                partition,
                round_number,
                label: classify_with(round_number, partition, style).label,
                match_ids: bucket.iter().map(|m| m.id).collect(),
            });
        }
    }
    columns
}

/// Runs the whole pipeline over a match set.
pub fn build_view(matches: &[Match], config: &LayoutConfig) -> BracketView {
    let elimination = config
        .elimination
        .unwrap_or_else(|| EliminationType::infer(matches));
    let grouping = group(matches);
    let numbers = assign_numbers(matches);
    let columns = round_columns(&grouping, elimination, config);
    let (container, boxes) = compute_boxes(&grouping, config);
    let points = collect(&container, &boxes);
    let connectors = route_with_offset(&points, elimination, config.merge_offset);
    info!(
        matches = numbers.len(),
        columns = columns.len(),
        connectors = connectors.len(),
        "built bracket view"
    );
    BracketView {
        elimination,
        columns,
        numbers,
        container,
        boxes,
        points,
        connectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConnectorKind, MatchStatus};

    fn config() -> LayoutConfig {
        LayoutConfig {
            box_width: 100.0,
            box_height: 40.0,
            column_gap: 60.0,
            row_gap: 20.0,
            partition_gap: 40.0,
            merge_offset: 20.0,
            ..LayoutConfig::default()
        }
    }

    fn single_elim(sizes: &[usize]) -> Vec<Match> {
        let mut out = Vec::new();
        let mut id = 1;
        for (round, size) in sizes.iter().enumerate() {
            for _ in 0..*size {
                out.push(Match::new(id, round as i32 + 1, BracketType::Winner));
                id += 1;
            }
        }
        out
    }

    fn double_elim(reset: MatchStatus) -> Vec<Match> {
        let mut out = single_elim(&[4, 2, 1]);
        out.push(Match::new(20, 101, BracketType::Loser));
        out.push(Match::new(21, 101, BracketType::Loser));
        out.push(Match::new(22, 102, BracketType::Loser));
        out.push(Match::new(23, 103, BracketType::Loser));
        out.push(Match::new(30, 200, BracketType::Championship));
        out.push(Match::new(31, 201, BracketType::Championship).with_status(reset));
        out
    }

    fn rect_of(boxes: &[RenderedBox], id: i64) -> Rect {
        boxes.iter().find(|b| b.match_id == id).unwrap().rect
    }

    #[test]
    fn test_later_rounds_center_on_feeders() {
        let grouping = group(&single_elim(&[4, 2, 1]));
        let (container, boxes) = compute_boxes(&grouping, &config());
        assert_eq!(boxes.len(), 7);

        assert_eq!(rect_of(&boxes, 1), Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(rect_of(&boxes, 2).top, 60.0);
        assert_eq!(rect_of(&boxes, 4).top, 180.0);
        // round 2 sits halfway between its feeders, one column over
        assert_eq!(rect_of(&boxes, 5), Rect::new(160.0, 30.0, 100.0, 40.0));
        assert_eq!(rect_of(&boxes, 6).top, 150.0);
        assert_eq!(rect_of(&boxes, 7), Rect::new(320.0, 90.0, 100.0, 40.0));

        assert_eq!(container, Rect::new(0.0, 0.0, 420.0, 220.0));
    }

    #[test]
    fn test_loser_block_sits_below_winner_block() {
        let grouping = group(&double_elim(MatchStatus::Scheduled));
        let (_, boxes) = compute_boxes(&grouping, &config());
        // winner block ends at 220, plus the partition gap
        assert_eq!(rect_of(&boxes, 20).top, 260.0);
        assert_eq!(rect_of(&boxes, 21).top, 320.0);
        assert_eq!(rect_of(&boxes, 22).top, 290.0);

        let gf = rect_of(&boxes, 30);
        // right of the widest block (420) plus gap and merge margin
        assert_eq!(gf.left, 500.0);
        // centered between the winner final (110) and loser final (310)
        assert_eq!(gf.top + gf.height / 2.0, 210.0);
        let reset = rect_of(&boxes, 31);
        assert_eq!(reset.left, 660.0);
        assert_eq!(reset.top, gf.top);
    }

    #[test]
    fn test_empty_grouping_has_empty_layout() {
        let (container, boxes) = compute_boxes(&group(&[]), &config());
        assert!(boxes.is_empty());
        assert_eq!(container, Rect::default());
    }

    #[test]
    fn test_build_view_single_elimination() {
        let view = build_view(&single_elim(&[8, 4, 2, 1]), &config());
        assert_eq!(view.elimination, EliminationType::Single);
        assert_eq!(view.connectors.len(), 14);
        assert_eq!(view.points.len(), 15);
        let labels: Vec<&str> = view.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["First Round", "Round 2", "Semi-Final", "Final"]);
        assert_eq!(view.numbers[&15], 15);
    }

    #[test]
    fn test_build_view_single_elim_labels_can_be_disabled() {
        let cfg = LayoutConfig {
            single_elim_labels: false,
            ..config()
        };
        let view = build_view(&single_elim(&[2, 1]), &cfg);
        let labels: Vec<&str> = view.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["First Round", "Round 2"]);
    }

    #[test]
    fn test_build_view_double_elimination_with_reset() {
        let view = build_view(&double_elim(MatchStatus::Scheduled), &config());
        assert_eq!(view.elimination, EliminationType::Double);
        let merges = view
            .connectors
            .iter()
            .filter(|c| c.kind == ConnectorKind::Merge)
            .count();
        let resets = view
            .connectors
            .iter()
            .filter(|c| c.kind == ConnectorKind::ResetLink)
            .count();
        assert_eq!(merges, 3);
        assert_eq!(resets, 1);

        let labels: Vec<&str> = view.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "First Round",
                "Round 2",
                "Round 3",
                "First LB Round",
                "LB Round 2",
                "LB Round 3",
                "Grand Final",
                "Bracket Reset",
            ]
        );
    }

    #[test]
    fn test_build_view_hidden_reset_is_absent() {
        let view = build_view(&double_elim(MatchStatus::Hidden), &config());
        assert!(view.boxes.iter().all(|b| b.match_id != 31));
        assert!(view.numbers.get(&31).is_none());
        assert!(view
            .connectors
            .iter()
            .all(|c| c.kind != ConnectorKind::ResetLink));
        assert_eq!(view.columns.last().unwrap().label, "Grand Final");
    }

    #[test]
    fn test_build_view_survives_malformed_round_encodings() {
        let matches = vec![
            Match::new(1, 150, BracketType::Winner),
            Match::new(2, 151, BracketType::Winner),
            Match::new(3, i32::MAX, BracketType::Winner),
            Match::new(4, i32::MIN, BracketType::Winner),
            Match::new(10, 5, BracketType::Loser),
            Match::new(11, 0, BracketType::Loser),
            Match::new(20, 7, BracketType::Championship),
            Match::new(21, i32::MAX, BracketType::Championship),
        ];
        let view = build_view(&matches, &config());
        assert_eq!(view.elimination, EliminationType::Double);
        assert_eq!(view.boxes.len(), 8);
        assert_eq!(view.numbers.len(), 8);
        assert_eq!(view.numbers[&4], 1);

        let lb = view.columns.iter().find(|c| c.round_number == 5).unwrap();
        assert_eq!(lb.partition, BracketType::Loser);
        assert_eq!(lb.label, "LB Round 5");
        let gf = view.columns.iter().find(|c| c.round_number == 7).unwrap();
        assert_eq!(gf.label, "Grand Final");

        // 150 -> 151 is still a link; nothing follows i32::MAX
        let normals: Vec<(Option<i64>, Option<i64>)> = view
            .connectors
            .iter()
            .filter(|c| c.kind == ConnectorKind::Normal)
            .map(|c| (c.source, c.target))
            .collect();
        assert_eq!(normals, vec![(Some(1), Some(2))]);
        // loser round 0 -> 1 has no match, 5 has no successor either
        assert_eq!(
            view.connectors
                .iter()
                .filter(|c| c.kind == ConnectorKind::Merge)
                .count(),
            3
        );
        assert!(view
            .connectors
            .iter()
            .all(|c| c.kind != ConnectorKind::ResetLink));
    }

    #[test]
    fn test_build_view_with_single_max_round_match() {
        let view = build_view(
            &[Match::new(1, i32::MAX, BracketType::Winner)],
            &LayoutConfig::default(),
        );
        assert_eq!(view.boxes.len(), 1);
        assert!(view.connectors.is_empty());
    }

    #[test]
    fn test_build_view_is_idempotent_and_serializable() {
        let matches = double_elim(MatchStatus::Scheduled);
        let a = serde_json::to_string(&build_view(&matches, &config())).unwrap();
        let b = serde_json::to_string(&build_view(&matches, &config())).unwrap();
        assert_eq!(a, b);
        let value: serde_json::Value = serde_json::from_str(&a).unwrap();
        assert_eq!(value["elimination"], "double");
        assert_eq!(value["numbers"]["30"], 12);
    }
}
