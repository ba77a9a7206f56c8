use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{BracketType, Match};

/// Visible matches in canonical display order:
/// `(round_number, bracket priority, id)`, all ascending.
pub fn sort_for_display(matches: &[Match]) -> Vec<&Match> {
    let mut visible: Vec<&Match> = matches.iter().filter(|m| !m.is_hidden()).collect();
    visible.sort_by_key(|m| (m.round_number, m.bracket_type, m.id));
    visible
}

/// Position of one match inside its round bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSlot {
    pub match_id: i64,
    pub bracket_type: BracketType,
    pub round_number: i32,
    pub match_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    partitions: BTreeMap<BracketType, BTreeMap<i32, Vec<Match>>>,
}

/// Partition a flat match list into ordered round buckets.
pub fn group(matches: &[Match]) -> Grouping {
    let mut partitions: BTreeMap<BracketType, BTreeMap<i32, Vec<Match>>> = BTreeMap::new();
    for m in sort_for_display(matches) {
        partitions
            .entry(m.bracket_type)
            .or_default()
            .entry(m.round_number)
            .or_default()
            .push(m.clone());
    }
    let grouping = Grouping { partitions };
    debug!(
        partitions = grouping.partition_count(),
        matches = grouping.match_count(),
        "grouped matches"
    );
    grouping
}

impl Grouping {
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn match_count(&self) -> usize {
        self.partitions
            .values()
            .flat_map(|rounds| rounds.values())
            .map(|bucket| bucket.len())
            .sum()
    }

    pub fn partitions(&self) -> impl Iterator<Item = BracketType> + '_ {
        self.partitions.keys().copied()
    }

    /// Round buckets of one partition, in ascending numeric round order.
    pub fn rounds(&self, bracket_type: BracketType) -> impl Iterator<Item = (i32, &[Match])> + '_ {
        self.partitions
            .get(&bracket_type)
            .into_iter()
            .flat_map(|rounds| rounds.iter().map(|(round, bucket)| (*round, bucket.as_slice())))
    }

    pub fn round(&self, bracket_type: BracketType, round_number: i32) -> &[Match] {
        self.partitions
            .get(&bracket_type)
            .and_then(|rounds| rounds.get(&round_number))
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    pub fn final_round(&self, bracket_type: BracketType) -> Option<i32> {
        self.partitions
            .get(&bracket_type)
            .and_then(|rounds| rounds.keys().next_back().copied())
    }

    /// Every grouped match with its explicit `match_index`.
    pub fn slots(&self) -> Vec<MatchSlot> {
        let mut out = Vec::with_capacity(self.match_count());
        for (bracket_type, rounds) in &self.partitions {
            for (round_number, bucket) in rounds {
                for (match_index, m) in bucket.iter().enumerate() {
                    out.push(MatchSlot {
                        match_id: m.id,
                        bracket_type: *bracket_type,
                        round_number: *round_number,
                        match_index,
                    });
                }
            }
        }
        out
    }

    pub fn slot_of(&self, match_id: i64) -> Option<MatchSlot> {
        self.slots().into_iter().find(|slot| slot.match_id == match_id)
    }
}
