//! Domain models for guildtrack
//!
//! Member rosters and battle ranking arithmetic, without any I/O
//! concerns. The plugins and CLI commands are thin wrappers over these.

mod member;
mod record;

pub use member::{assign_ids, Member, Roster};
pub use record::{compute_rankings, rank_score, BattleRecord, RankEntry};
