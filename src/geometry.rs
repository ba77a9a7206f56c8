use tracing::debug;

use crate::types::{BracketPoint, MatchStatus, Point, Rect, RenderedBox};

/// Anchor points for every visible box, relative to `container`'s origin.
/// Box order is preserved.
pub fn collect(container: &Rect, boxes: &[RenderedBox]) -> Vec<BracketPoint> {
    let points: Vec<BracketPoint> = boxes
        .iter()
        .filter(|b| b.status != MatchStatus::Hidden)
        .map(|b| to_point(container, b))
        .collect();
    debug!(boxes = boxes.len(), points = points.len(), "collected bracket points");
    points
}

fn to_point(container: &Rect, b: &RenderedBox) -> BracketPoint {
    let rect = &b.rect;
    let y = rect.top - container.top + rect.height / 2.0;
    BracketPoint {
        match_id: b.match_id,
        round_index: b.round,
        match_index: b.match_index,
        bracket_type: b.bracket_type,
        status: b.status,
        right_center: Point::new(rect.right() - container.left, y),
        left_center: Point::new(rect.left - container.left, y),
    }
}
