//! Battle ranking calculation exposed as a plugin
//!
//! Thin JSON wrapper over [`crate::domain::compute_rankings`]: top-50
//! finishes earn `51 - rank` points, summed per active member.

use std::path::Path;

use anyhow::{anyhow, Result};

use super::required;
use crate::domain::{compute_rankings, BattleRecord, Roster};
use crate::plugin::manifest::PluginManifest;
use crate::plugin::method::Plugin;
use crate::plugin::registry::MethodRegistry;

pub const NAME: &str = "rank_utils";

pub fn register(registry: &MethodRegistry) {
    registry.register(NAME, "calculate_rankings");
}

pub fn build(_manifest: &PluginManifest, _path: &Path) -> Result<Plugin> {
    Ok(Plugin::new(NAME)
        .with_method("calculate_rankings", |params| {
            let records: Vec<BattleRecord> =
                serde_json::from_value(required(&params, "records")?.clone())
                    .map_err(|e| anyhow!("parameter 'records' is not a valid record list: {e}"))?;
            let roster: Roster = serde_json::from_value(required(&params, "members")?.clone())
                .map_err(|e| anyhow!("parameter 'members' is not a valid roster: {e}"))?;

            let rankings = compute_rankings(&records, &roster);
            tracing::debug!(
                records = records.len(),
                ranked = rankings.len(),
                "rankings calculated"
            );
            serde_json::to_value(rankings).map_err(Into::into)
        })
        .with_initialize(|| {
            tracing::info!("rank_utils plugin initialized");
            Ok(())
        }))
}
