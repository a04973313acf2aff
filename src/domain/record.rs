//! Battle records and rank scoring
//!
//! Scoring follows the community rule: a top-50 finish earns
//! `51 - rank` points (rank 1 = 50 points, rank 50 = 1 point), anything
//! below the cutoff earns nothing.

use serde::{Deserialize, Serialize};

use super::member::Roster;

/// One battle placement for a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub member_id: u64,
    pub rank: u32,
}

/// Score for a single placement
pub fn rank_score(rank: u32) -> u64 {
    if rank <= 50 {
        u64::from(51 - rank)
    } else {
        0
    }
}

/// A member's aggregated standing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub member_id: u64,
    pub name: String,
    pub rank_score: u64,
    pub rank: u32,
}

/// Aggregates battle records into a ranking over active members.
///
/// Records for inactive or unknown members are ignored. Every active
/// member appears, scoring 0 when they have no top-50 placements.
/// Ordered by score descending, member ID ascending on ties, with ranks
/// assigned 1..n.
pub fn compute_rankings(records: &[BattleRecord], roster: &Roster) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = roster
        .iter()
        .filter(|(_, member)| member.is_active())
        .map(|(id, member)| RankEntry {
            member_id: *id,
            name: member.name.clone(),
            rank_score: 0,
            rank: 0,
        })
        .collect();

    for record in records {
        if let Some(entry) = entries.iter_mut().find(|e| e.member_id == record.member_id) {
            entry.rank_score += rank_score(record.rank);
        }
    }

    entries.sort_by(|a, b| {
        b.rank_score
            .cmp(&a.rank_score)
            .then(a.member_id.cmp(&b.member_id))
    });
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = (position + 1) as u32;
    }

    entries
}
