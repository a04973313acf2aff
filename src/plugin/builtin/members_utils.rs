//! Member roster lookups exposed as a plugin
//!
//! The roster lives in a JSON file mapping member IDs to entries
//! (`{"1": {"name": "Alice", "status": 1}}`). It sits next to the plugin
//! manifest by default, or wherever the manifest's `members_file` option
//! points, and is read once per loader construction and cached.
//!
//! A missing or broken roster file degrades to an empty roster with an
//! error in the log; lookups then come back empty rather than failing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use super::{required, required_u64};
use crate::domain::{assign_ids, Roster};
use crate::plugin::manifest::PluginManifest;
use crate::plugin::method::Plugin;
use crate::plugin::registry::MethodRegistry;

pub const NAME: &str = "members_utils";

const DEFAULT_MEMBERS_FILE: &str = "members.json";

pub fn register(registry: &MethodRegistry) {
    registry.register(NAME, "get_all_members");
    registry.register(NAME, "get_member");
    registry.register(NAME, "get_member_name");
    registry.register(NAME, "get_active_member_ids");
    registry.register(NAME, "list_active_members");
    registry.register(NAME, "assign_ids");
}

pub fn build(manifest: &PluginManifest, path: &Path) -> Result<Plugin> {
    let base = path.parent().unwrap_or(Path::new("."));
    let members_file = manifest.option_str("members_file").unwrap_or(DEFAULT_MEMBERS_FILE);
    let members_path = if Path::new(members_file).is_absolute() {
        PathBuf::from(members_file)
    } else {
        base.join(members_file)
    };

    let store = Rc::new(RosterStore::new(members_path));

    let all = Rc::clone(&store);
    let one = Rc::clone(&store);
    let name_of = Rc::clone(&store);
    let active_ids = Rc::clone(&store);
    let active_list = Rc::clone(&store);
    let init = Rc::clone(&store);

    Ok(Plugin::new(NAME)
        .with_method("get_all_members", move |_params| {
            all.with(|roster| serde_json::to_value(roster).map_err(Into::into))
        })
        .with_method("get_member", move |params| {
            let member_id = required_u64(&params, "member_id")?;
            one.with(|roster| match roster.get(&member_id) {
                Some(member) => serde_json::to_value(member).map_err(Into::into),
                None => {
                    tracing::warn!(member_id, "member not found");
                    Ok(Value::Null)
                }
            })
        })
        .with_method("get_member_name", move |params| {
            let member_id = required_u64(&params, "member_id")?;
            name_of.with(|roster| {
                roster
                    .get(&member_id)
                    .map(|member| Value::String(member.name.clone()))
                    .ok_or_else(|| anyhow!("member {member_id} not found"))
            })
        })
        .with_method("get_active_member_ids", move |_params| {
            active_ids.with(|roster| {
                let ids: Vec<u64> = roster
                    .iter()
                    .filter(|(_, member)| member.is_active())
                    .map(|(id, _)| *id)
                    .collect();
                Ok(json!(ids))
            })
        })
        .with_method("list_active_members", move |_params| {
            active_list.with(|roster| {
                let members: Vec<Value> = roster
                    .iter()
                    .filter(|(_, member)| member.is_active())
                    .map(|(id, member)| json!({"member_id": id, "name": member.name}))
                    .collect();
                Ok(Value::Array(members))
            })
        })
        .with_method("assign_ids", |params| {
            let data = required(&params, "data")?
                .as_array()
                .ok_or_else(|| anyhow!("parameter 'data' must be an array"))?
                .clone();
            let members: Roster = serde_json::from_value(required(&params, "members")?.clone())
                .map_err(|e| anyhow!("parameter 'members' is not a valid roster: {e}"))?;
            Ok(Value::Array(assign_ids(data, &members)))
        })
        .with_initialize(move || {
            tracing::info!(path = %init.path.display(), "members_utils plugin initialized");
            Ok(())
        }))
}

/// Lazily loaded, cached roster shared by the plugin's closures
struct RosterStore {
    path: PathBuf,
    cache: RefCell<Option<Roster>>,
}

impl RosterStore {
    fn new(path: PathBuf) -> Self {
        Self { path, cache: RefCell::new(None) }
    }

    fn with<T>(&self, f: impl FnOnce(&Roster) -> Result<T>) -> Result<T> {
        let mut cache = self.cache.borrow_mut();
        let roster = match cache.take() {
            Some(roster) => roster,
            None => load_roster(&self.path),
        };
        let result = f(&roster);
        *cache = Some(roster);
        result
    }
}

/// Reads the roster file; any failure is logged and yields an empty
/// roster, mirroring how lookups behave on unknown members.
fn load_roster(path: &Path) -> Roster {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read members file");
            return Roster::default();
        }
    };

    match serde_json::from_str::<Roster>(&content) {
        Ok(roster) => {
            tracing::debug!(path = %path.display(), members = roster.len(), "roster loaded");
            roster
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to parse members file");
            Roster::default()
        }
    }
}
