//! Deterministic binding registry with Vec storage.
//!
//! Uses Vec for deterministic iteration order (equal-priority ties resolve by
//! registration order) and HashMap for O(1) lookup by identity.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::binding::{Binding, BindingId, HotkeyInfo};
use crate::error::{HotkeyError, Result};

/// Named set of bindings toggled together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub enabled: bool,
    pub members: Vec<BindingId>,
}

/// Read-only statistics snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotkeyStats {
    pub total_registered: usize,
    pub total_triggered: u64,
    pub scope_stats: BTreeMap<String, u64>,
    pub last_triggered: Option<DateTime<Utc>>,
}

/// Reject bindings that can never be registered.
pub fn validate(binding: &Binding) -> Result<()> {
    if binding.combo.trim().is_empty() {
        return Err(HotkeyError::InvalidCombo);
    }
    Ok(())
}

/// Owner of every binding, group and counter of one engine.
#[derive(Debug, Default)]
pub struct Registry {
    bindings: Vec<Binding>,
    id_to_index: HashMap<BindingId, usize>,
    groups: BTreeMap<String, Group>,
    stats: HotkeyStats,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by identity.
    ///
    /// Replacement keeps the original storage slot and does not count as a
    /// new registration. Returns the id and whether an entry was replaced.
    pub fn insert(&mut self, binding: Binding) -> (BindingId, bool) {
        let id = binding.id();
        if let Some(&existing_index) = self.id_to_index.get(&id) {
            self.bindings[existing_index] = binding;
            (id, true)
        } else {
            let index = self.bindings.len();
            self.bindings.push(binding);
            self.id_to_index.insert(id.clone(), index);
            self.stats.total_registered += 1;
            (id, false)
        }
    }

    /// Remove by identity. Returns false when the id was not registered.
    pub fn remove(&mut self, id: &BindingId) -> bool {
        let Some(index) = self.id_to_index.remove(id) else {
            return false;
        };
        if index >= self.bindings.len() {
            crate::debug_panic!("index {} out of sync for {}", index, id);
            return false;
        }
        self.bindings.remove(index);
        for slot in self.id_to_index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        self.stats.total_registered = self.stats.total_registered.saturating_sub(1);
        true
    }

    pub fn get(&self, id: &BindingId) -> Option<&Binding> {
        self.id_to_index.get(id).and_then(|&i| self.bindings.get(i))
    }

    pub fn contains(&self, id: &BindingId) -> bool {
        self.id_to_index.contains_key(id)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Display rows, optionally limited to one scope, highest priority first.
    pub fn infos(&self, scope: Option<&str>) -> Vec<HotkeyInfo> {
        let mut rows: Vec<HotkeyInfo> = self
            .bindings
            .iter()
            .filter(|b| scope.map_or(true, |s| b.scope == s))
            .map(Binding::info)
            .collect();
        rows.sort_by(|a, b| b.priority.cmp(&a.priority));
        rows
    }

    pub fn is_combo_registered(&self, combo: &str, scope: Option<&str>) -> bool {
        self.bindings
            .iter()
            .filter(|b| scope.map_or(true, |s| b.scope == s))
            .any(|b| b.combo == combo)
    }

    pub fn insert_group(&mut self, name: &str, members: Vec<BindingId>) -> &Group {
        self.groups.insert(
            name.to_string(),
            Group {
                name: name.to_string(),
                enabled: true,
                members,
            },
        );
        &self.groups[name]
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Flip (or set) a group's flag and copy it onto every tagged binding.
    pub fn toggle_group(&mut self, name: &str, enabled: Option<bool>) -> Result<bool> {
        let group = self
            .groups
            .get_mut(name)
            .ok_or_else(|| HotkeyError::GroupNotFound(name.to_string()))?;
        group.enabled = enabled.unwrap_or(!group.enabled);
        let state = group.enabled;

        for binding in self.bindings.iter_mut().filter(|b| b.group() == Some(name)) {
            binding.enabled = state;
        }
        Ok(state)
    }

    pub fn record_trigger(&mut self, scope: &str) {
        self.stats.total_triggered += 1;
        *self.stats.scope_stats.entry(scope.to_string()).or_insert(0) += 1;
        self.stats.last_triggered = Some(Utc::now());
    }

    pub fn stats(&self) -> &HotkeyStats {
        &self.stats
    }

    /// Drop bindings and groups; trigger history is kept.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.id_to_index.clear();
        self.groups.clear();
        self.stats.total_registered = 0;
    }

    /// Drop everything, counters included.
    pub fn reset(&mut self) {
        self.clear();
        self.stats = HotkeyStats::default();
    }
}
