//! Member roster types
//!
//! The roster file maps member IDs (JSON object keys, numeric strings)
//! to entries: `{"1": {"name": "Alice", "status": 1}}`. Status 1 marks a
//! member as active; everything else is inactive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A community member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,

    /// 1 = active, anything else = inactive
    #[serde(default)]
    pub status: i64,
}

impl Member {
    pub fn new(name: impl Into<String>, status: i64) -> Self {
        Self { name: name.into(), status }
    }

    pub fn is_active(&self) -> bool {
        self.status == 1
    }
}

/// Roster keyed by member ID, ordered by ID
pub type Roster = BTreeMap<u64, Member>;

/// Attaches `member_id` to each record in `data` by matching its `name`
/// field against the roster.
///
/// Records whose name is unknown (or missing) are passed through
/// unchanged, with a warning per unknown name. Existing `member_id`
/// fields are overwritten.
pub fn assign_ids(data: Vec<Value>, members: &Roster) -> Vec<Value> {
    let id_by_name: BTreeMap<&str, u64> = members
        .iter()
        .map(|(id, member)| (member.name.as_str(), *id))
        .collect();

    let mut missing: Vec<String> = Vec::new();
    let data = data
        .into_iter()
        .map(|mut record| {
            let Some(name) = record.get("name").and_then(Value::as_str) else {
                tracing::warn!("record without a 'name' field, skipping ID assignment");
                return record;
            };
            match id_by_name.get(name) {
                Some(id) => {
                    if let Some(object) = record.as_object_mut() {
                        object.insert("member_id".to_string(), Value::from(*id));
                    }
                }
                None => {
                    tracing::warn!(name, "name not present in member data");
                    missing.push(name.to_string());
                }
            }
            record
        })
        .collect();

    if !missing.is_empty() {
        tracing::warn!(?missing, "members without an assigned ID");
    }

    data
}
