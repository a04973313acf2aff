//! Guildtrack - Plugin-driven utilities for community game tracking
//!
//! Guildtrack glues together small data-processing helpers (battle rank
//! calculators, roster lookups, ID assignment) behind a plugin system:
//! helper modules declare their methods in a shared registry, a manager
//! loads them from manifest files, and a loader exposes every plugin's
//! methods through a per-plugin namespace.

pub mod cli;
pub mod config;
pub mod domain;
pub mod plugin;

pub use domain::{BattleRecord, Member, RankEntry, Roster};
pub use plugin::{MethodRegistry, PluginLoader, PluginManager};
