use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::debug;

use crate::types::{
    BracketPoint, BracketType, Connector, ConnectorKind, EliminationType, MatchStatus, Point,
    Segment, DEFAULT_MERGE_OFFSET,
};

/// Regular connectors link a match at `(round r, index i)` to the match at
/// `(round r + 1, index i / 2)` of the same partition. In double elimination
/// the winner and loser finals also merge into the grand final, and the grand
/// final links to the reset final when one is visible.
pub fn route(points: &[BracketPoint], elimination: EliminationType) -> Vec<Connector> {
    route_with_offset(points, elimination, DEFAULT_MERGE_OFFSET)
}

pub fn route_with_offset(
    points: &[BracketPoint],
    elimination: EliminationType,
    merge_offset: f64,
) -> Vec<Connector> {
    let mut connectors = regular_connectors(points);
    if elimination == EliminationType::Double {
        connectors.extend(championship_connectors(points, merge_offset));
    }
    debug!(
        points = points.len(),
        connectors = connectors.len(),
        "routed connectors"
    );
    connectors
}

fn is_visible(point: &BracketPoint) -> bool {
    point.status != MatchStatus::Hidden
}

fn regular_connectors(points: &[BracketPoint]) -> Vec<Connector> {
    let routable = || {
        points
            .iter()
            .filter(|p| is_visible(p) && p.bracket_type != BracketType::Championship)
    };

    let mut by_slot: HashMap<(BracketType, i32, usize), &BracketPoint> = HashMap::new();
    for p in routable() {
        by_slot
            .entry((p.bracket_type, p.round_index, p.match_index))
            .or_insert(p);
    }

    let mut out = Vec::new();
    for p in routable() {
        let Some(next_round) = p.round_index.checked_add(1) else {
            debug!(match_id = p.match_id, round = p.round_index, "round has no successor");
            continue;
        };
        let key = (p.bracket_type, next_round, p.match_index / 2);
        let Some(next) = by_slot.get(&key) else {
            debug!(
                match_id = p.match_id,
                bracket = p.bracket_type.as_str(),
                round = p.round_index,
                "no next-round match, skipping connector"
            );
            continue;
        };
        out.push(Connector {
            kind: ConnectorKind::Normal,
            source: Some(p.match_id),
            target: Some(next.match_id),
            segments: elbow(p.right_center, next.left_center),
        });
    }
    out
}

/// Three segments: across to the midpoint, vertical, across into `to`.
fn elbow(from: Point, to: Point) -> Vec<Segment> {
    let mid_x = (from.x + to.x) / 2.0;
    let turn_a = Point::new(mid_x, from.y);
    let turn_b = Point::new(mid_x, to.y);
    vec![
        Segment::new(from, turn_a),
        Segment::new(turn_a, turn_b),
        Segment::new(turn_b, to),
    ]
}

fn championship_connectors(points: &[BracketPoint], merge_offset: f64) -> Vec<Connector> {
    let mut out = Vec::new();

    let Some(grand_final) = points
        .iter()
        .filter(|p| is_visible(p) && p.bracket_type == BracketType::Championship)
        .min_by_key(|p| p.round_index)
    else {
        debug!("no grand final point, skipping championship connectors");
        return out;
    };

    let winner_final = partition_final_round(points, BracketType::Winner).and_then(|round| {
        points
            .iter()
            .filter(|p| {
                is_visible(p) && p.bracket_type == BracketType::Winner && p.round_index == round
            })
            .max_by_key(|p| p.match_index)
    });
    let loser_final = partition_final_round(points, BracketType::Loser).and_then(|round| {
        points
            .iter()
            .find(|p| {
                is_visible(p) && p.bracket_type == BracketType::Loser && p.round_index == round
            })
    });

    match (winner_final, loser_final) {
        (Some(winner_final), Some(loser_final)) => {
            out.extend(merge_connectors(winner_final, loser_final, grand_final, merge_offset));
        }
        _ => debug!(
            winner_final = winner_final.is_some(),
            loser_final = loser_final.is_some(),
            "missing bracket final, skipping merge connectors"
        ),
    }

    let reset_round = grand_final.round_index.checked_add(1);
    if reset_round.is_none() {
        debug!(round = grand_final.round_index, "grand final round has no successor");
    }
    let reset_final = points.iter().find(|p| {
        is_visible(p)
            && p.bracket_type == BracketType::Championship
            && Some(p.round_index) == reset_round
    });
    if let Some(reset_final) = reset_final {
        out.push(Connector {
            kind: ConnectorKind::ResetLink,
            source: Some(grand_final.match_id),
            target: Some(reset_final.match_id),
            segments: elbow(grand_final.right_center, reset_final.left_center),
        });
    }

    out
}

fn partition_final_round(points: &[BracketPoint], bracket_type: BracketType) -> Option<i32> {
    points
        .iter()
        .filter(|p| is_visible(p) && p.bracket_type == bracket_type)
        .map(|p| p.round_index)
        .max()
}

fn merge_connectors(
    winner_final: &BracketPoint,
    loser_final: &BracketPoint,
    grand_final: &BracketPoint,
    merge_offset: f64,
) -> [Connector; 3] {
    let merge_x = grand_final.left_center.x - merge_offset;
    let junction = Point::new(merge_x, grand_final.left_center.y);

    let leg = |from: &BracketPoint| {
        let turn = Point::new(merge_x, from.right_center.y);
        Connector {
            kind: ConnectorKind::Merge,
            source: Some(from.match_id),
            target: Some(grand_final.match_id),
            segments: vec![
                Segment::new(from.right_center, turn),
                Segment::new(turn, junction),
            ],
        }
    };

    [
        leg(winner_final),
        leg(loser_final),
        Connector {
            kind: ConnectorKind::Merge,
            source: None,
            target: Some(grand_final.match_id),
            segments: vec![Segment::new(junction, grand_final.left_center)],
        },
    ]
}

impl Connector {
    /// SVG path data, e.g. `"M 0 10 L 20 10 L 20 30"`.
    pub fn to_svg_path(&self) -> String {
        let mut path = String::new();
        let mut pen: Option<Point> = None;
        for segment in &self.segments {
            if pen != Some(segment.from) {
                if !path.is_empty() {
                    path.push(' ');
                }
                let _ = write!(path, "M {} {}", segment.from.x, segment.from.y);
            }
            let _ = write!(path, " L {} {}", segment.to.x, segment.to.y);
            pen = Some(segment.to);
        }
        path
    }
}
