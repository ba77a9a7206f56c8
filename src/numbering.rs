use std::collections::BTreeMap;

use crate::grouping::sort_for_display;
use crate::types::Match;

/// Sequential "Game #N" numbers, 1-based, in canonical display order.
/// Independent of input order and of how the caller groups matches.
pub fn assign_numbers(matches: &[Match]) -> BTreeMap<i64, u32> {
    sort_for_display(matches)
        .into_iter()
        .zip(1u32..)
        .map(|(m, number)| (m.id, number))
        .collect()
}
