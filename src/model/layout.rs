use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::window_info::{DEFAULT_WEIGHT, ToolWindowAnchor, UNASSIGNED_ORDER, WindowInfo};
use crate::common::collections::{HashMap, HashSet};

/// Ordered set of [`WindowInfo`] keyed by id, plus the weights shared by all
/// docked windows at an anchor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayoutRepr", into = "LayoutRepr")]
pub struct DesktopLayout {
    infos: IndexMap<String, WindowInfo>,
    unified_weights: BTreeMap<ToolWindowAnchor, f32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct LayoutRepr {
    #[serde(default)]
    windows: Vec<WindowInfo>,
    #[serde(default)]
    unified_weights: BTreeMap<ToolWindowAnchor, f32>,
}

impl From<LayoutRepr> for DesktopLayout {
    fn from(repr: LayoutRepr) -> Self {
        let mut layout = DesktopLayout {
            infos: IndexMap::default(),
            unified_weights: repr.unified_weights,
        };
        for mut info in repr.windows {
            info.from_persistent_settings = true;
            layout.put(info);
        }
        layout
    }
}

impl From<DesktopLayout> for LayoutRepr {
    fn from(layout: DesktopLayout) -> Self {
        LayoutRepr {
            windows: layout.infos.into_values().collect(),
            unified_weights: layout.unified_weights,
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutViolation {
    #[error("windows {ids:?} share order {order} at {pane}/{anchor} (split={split})")]
    DuplicateOrder {
        pane: String,
        anchor: ToolWindowAnchor,
        split: bool,
        order: i32,
        ids: Vec<String>,
    },
    #[error("windows {ids:?} are all visible in slot {pane}/{anchor} (split={split})")]
    SharedSlot {
        pane: String,
        anchor: ToolWindowAnchor,
        split: bool,
        ids: Vec<String>,
    },
}

impl DesktopLayout {
    pub fn new() -> Self { Self::default() }

    pub fn from_infos(infos: impl IntoIterator<Item = WindowInfo>) -> Self {
        let mut layout = Self::new();
        for info in infos {
            layout.put(info);
        }
        layout
    }

    pub fn len(&self) -> usize { self.infos.len() }

    pub fn is_empty(&self) -> bool { self.infos.is_empty() }

    pub fn contains(&self, id: &str) -> bool { self.infos.contains_key(id) }

    pub fn get_info(&self, id: &str) -> Option<&WindowInfo> { self.infos.get(id) }

    pub fn get_info_mut(&mut self, id: &str) -> Option<&mut WindowInfo> { self.infos.get_mut(id) }

    /// Adds `info` unless the id is already known, returning the stored value.
    pub fn add_info(&mut self, info: WindowInfo) -> &mut WindowInfo {
        self.infos.entry(info.id.clone()).or_insert(info)
    }

    /// Inserts or replaces the info for `info.id`, keeping its position.
    pub fn put(&mut self, info: WindowInfo) { self.infos.insert(info.id.clone(), info); }

    pub fn remove(&mut self, id: &str) -> Option<WindowInfo> { self.infos.shift_remove(id) }

    pub fn infos(&self) -> impl Iterator<Item = &WindowInfo> { self.infos.values() }

    pub fn ids(&self) -> impl Iterator<Item = &str> { self.infos.keys().map(String::as_str) }

    pub fn panes(&self) -> Vec<&str> {
        let mut seen = HashSet::default();
        self.infos
            .values()
            .map(|info| info.pane_id.as_str())
            .filter(|pane| seen.insert(*pane))
            .collect()
    }

    /// First free order at `pane`/`anchor`, across both split slots.
    pub fn next_order(&self, pane_id: &str, anchor: ToolWindowAnchor) -> i32 {
        self.infos
            .values()
            .filter(|info| info.pane_id == pane_id && info.anchor == anchor)
            .map(|info| info.order)
            .max()
            .map_or(0, |max| (max + 1).max(0))
    }

    /// Windows of one bucket in paint order; unassigned orders come last.
    pub fn bucket(&self, pane_id: &str, anchor: ToolWindowAnchor, split: bool) -> Vec<&WindowInfo> {
        let mut bucket: Vec<&WindowInfo> = self
            .infos
            .values()
            .filter(|info| info.pane_id == pane_id && info.anchor == anchor && info.split == split)
            .collect();
        bucket.sort_by_key(|info| (!info.has_order(), info.order));
        bucket
    }

    /// Moves `id` to `pane_id`/`anchor` at `order` (or the end for `-1`) and
    /// renumbers both the old and the new stripe so their orders stay
    /// contiguous. Returns every other window whose order changed.
    pub fn set_anchor(
        &mut self,
        id: &str,
        pane_id: &str,
        anchor: ToolWindowAnchor,
        order: i32,
    ) -> Vec<WindowInfo> {
        let Some(current) = self.infos.get(id) else {
            return Vec::new();
        };
        let old_pane = current.pane_id.clone();
        let old_anchor = current.anchor;

        let before: HashMap<String, i32> =
            self.infos.values().map(|info| (info.id.clone(), info.order)).collect();

        let order = if order == UNASSIGNED_ORDER {
            self.next_order(pane_id, anchor)
        } else {
            for other in self.infos.values_mut() {
                if other.id != id
                    && other.pane_id == pane_id
                    && other.anchor == anchor
                    && other.has_order()
                    && other.order >= order
                {
                    other.order += 1;
                }
            }
            order
        };

        if let Some(info) = self.infos.get_mut(id) {
            info.pane_id = pane_id.to_string();
            info.anchor = anchor;
            info.order = order;
        }

        self.normalize_orders(pane_id, anchor);
        if old_pane != pane_id || old_anchor != anchor {
            self.normalize_orders(&old_pane, old_anchor);
        }

        self.infos
            .values()
            .filter(|info| info.id != id && before.get(&info.id) != Some(&info.order))
            .cloned()
            .collect()
    }

    fn normalize_orders(&mut self, pane_id: &str, anchor: ToolWindowAnchor) {
        let mut ordered: Vec<(i32, usize)> = self
            .infos
            .values()
            .enumerate()
            .filter(|(_, info)| info.pane_id == pane_id && info.anchor == anchor && info.has_order())
            .map(|(index, info)| (info.order, index))
            .collect();
        ordered.sort();
        for (new_order, (_, index)) in ordered.into_iter().enumerate() {
            if let Some((_, info)) = self.infos.get_index_mut(index) {
                if info.order != new_order as i32 {
                    trace!(id = %info.id, from = info.order, to = new_order, "renumbering");
                    info.order = new_order as i32;
                }
            }
        }
    }

    pub fn unified_anchor_weight(&self, anchor: ToolWindowAnchor) -> f32 {
        self.unified_weights.get(&anchor).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn set_unified_anchor_weight(&mut self, anchor: ToolWindowAnchor, weight: f32) {
        self.unified_weights.insert(anchor, weight);
    }

    /// Order collisions and doubly occupied slots, in layout order.
    pub fn violations(&self) -> Vec<LayoutViolation> {
        let mut orders: IndexMap<(&str, ToolWindowAnchor, bool, i32), Vec<String>> = IndexMap::default();
        let mut slots: IndexMap<(&str, ToolWindowAnchor, bool), Vec<String>> = IndexMap::default();
        for info in self.infos.values() {
            if info.has_order() {
                orders
                    .entry((&info.pane_id, info.anchor, info.split, info.order))
                    .or_default()
                    .push(info.id.clone());
            }
            if info.occupies_slot() {
                slots
                    .entry((&info.pane_id, info.anchor, info.split))
                    .or_default()
                    .push(info.id.clone());
            }
        }

        let mut violations = Vec::new();
        for ((pane, anchor, split, order), ids) in orders {
            if ids.len() > 1 {
                violations.push(LayoutViolation::DuplicateOrder {
                    pane: pane.to_string(),
                    anchor,
                    split,
                    order,
                    ids,
                });
            }
        }
        for ((pane, anchor, split), ids) in slots {
            if ids.len() > 1 {
                violations.push(LayoutViolation::SharedSlot { pane: pane.to_string(), anchor, split, ids });
            }
        }
        violations
    }
}
