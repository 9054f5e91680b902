//! Replacing the whole layout at runtime.
//!
//! Only windows whose placement differs are touched. Structural changes go
//! to the host in dirty mode and every affected pane is validated, and every
//! affected frame repainted, once at the end.

use indexmap::IndexSet;
use tracing::{debug, error, instrument};

use super::entry::EntryKey;
use super::error::EngineError;
use super::events::ToolWindowManagerEventType;
use super::host::DecoratorHost;
use super::manager::ToolWindowManager;
use super::placement::HideMutation;
use crate::model::{DesktopLayout, LayoutViolation, WindowInfo};

struct LayoutChange {
    key: EntryKey,
    old: WindowInfo,
    new: WindowInfo,
}

impl<H: DecoratorHost> ToolWindowManager<H> {
    #[instrument(skip(self, new_layout), fields(windows = new_layout.len()))]
    pub fn set_layout(&mut self, mut new_layout: DesktopLayout) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let duplicate = new_layout.violations().into_iter().find_map(|violation| match violation {
            LayoutViolation::DuplicateOrder { order, ids, .. } => Some((order, ids)),
            LayoutViolation::SharedSlot { .. } => None,
        });
        if let Some((order, ids)) = duplicate {
            error!(order, ?ids, "layout assigns one order to several windows");
            return Err(EngineError::ConflictingOrder {
                id: ids.first().cloned().unwrap_or_default(),
                order,
                reason: format!("shared by {ids:?}"),
            });
        }

        if self.entries.is_empty() {
            debug!("nothing registered, replacing the layout as is");
            self.replace_layout(new_layout);
            return Ok(());
        }

        let mut changes = Vec::new();
        for (key, entry) in &self.entries {
            let old = self.layout.get_info(&entry.id).cloned().unwrap_or_else(|| entry.info.clone());
            let mut new = match new_layout.get_info(&entry.id) {
                Some(info) => info.clone(),
                None => {
                    let fallback = match self.default_layout.get_info(&entry.id) {
                        Some(info) => info.clone(),
                        None => {
                            // a window nobody knows about should not linger
                            let mut info = old.clone();
                            info.visible = false;
                            info.show_stripe_button = false;
                            info
                        }
                    };
                    debug!(id = %entry.id, "missing from the new layout, using {fallback:?}");
                    new_layout.put(fallback.clone());
                    fallback
                }
            };
            if old != new {
                if !entry.available {
                    new.visible = false;
                    new_layout.put(new.clone());
                }
                changes.push(LayoutChange { key, old, new });
            }
        }

        self.replace_layout(new_layout);
        if changes.is_empty() {
            debug!("no layout changes");
            return Ok(());
        }

        debug!(changed = changes.len(), "pass 1: show, hide, move");
        changes.retain_mut(|change| {
            self.apply_to_entry(change.key, change.new.clone());
            self.entries[change.key].available
        });
        for change in &mut changes {
            self.apply_structural_change(change);
        }

        debug!("pass 2: sizes");
        for (index, change) in changes.iter().enumerate() {
            let (old, new) = (&change.old, &change.new);
            if !new.visible || !new.is_docked() {
                continue;
            }
            let pane = self.pane_for(&new.pane_id);
            if old.weight != new.weight {
                let mut weight = new.weight;
                if self.settings.ultrawide_layout && !new.anchor.is_horizontal() {
                    let beside = changes.iter().enumerate().find(|(other, c)| {
                        *other != index
                            && c.new.visible
                            && c.new.is_docked()
                            && c.new.anchor == new.anchor
                            && c.new.pane_id == new.pane_id
                    });
                    if let Some((_, beside)) = beside {
                        // side by side windows share one splitter
                        weight += beside.new.weight;
                    }
                }
                debug!(id = %new.id, weight, "weight from layout");
                self.host.set_weight(&pane, new.anchor, weight);
            }
            if old.side_weight != new.side_weight {
                self.host.set_side_weight(&pane, &new.id, new.side_weight);
            }
        }

        debug!("pass 3: validate and repaint");
        let mut panes = IndexSet::new();
        for change in &changes {
            panes.insert(self.pane_for(&change.old.pane_id));
            panes.insert(self.pane_for(&change.new.pane_id));
        }
        let mut frames = IndexSet::new();
        for pane in &panes {
            self.host.validate_pane(pane);
            frames.insert(self.host.frame_of(pane));
        }
        self.host.activate_editor_component();
        for frame in frames {
            self.host.repaint_frame(frame);
        }

        self.fire(ToolWindowManagerEventType::SetLayout, None);
        self.check_invariants();
        Ok(())
    }

    fn apply_structural_change(&mut self, change: &mut LayoutChange) {
        let key = change.key;
        let old = &change.old;
        let new = &mut change.new;

        if old.visible && !new.visible {
            debug!(id = %new.id, "hidden in the new layout");
            self.update_state_and_remove_decorator(new, key, true);
        }

        let mut shown = false;
        if old.pane_id != new.pane_id
            || old.anchor != new.anchor
            || old.order != new.order
            || old.show_stripe_button != new.show_stripe_button
        {
            self.reset_stripe_button(key, new);
            let moved = old.pane_id != new.pane_id || old.anchor != new.anchor;
            if moved && old.occupies_slot() && new.occupies_slot() {
                debug!(id = %new.id, "moving to another slot");
                self.remove_internal_decorator(key, true);
                self.show_impl(key, new.clone(), true);
                shown = true;
            }
        }

        let mut to_show = false;
        if !shown
            && old.split != new.split
            && old.window_type.is_internal()
            && new.window_type.is_internal()
            && old.visible
        {
            debug!(id = %new.id, split = new.split, "re-showing in the other split slot");
            self.execute_hide(key, old.clone(), true, false, HideMutation::None);
            to_show = new.visible;
        }

        if old.window_type != new.window_type {
            debug!(id = %new.id, from = %old.window_type, to = %new.window_type, "type changed");
            let mut state = old.clone();
            self.update_state_and_remove_decorator(&mut state, key, old.window_type.is_internal());
            if new.visible {
                to_show = true;
            }
        } else if !old.visible && new.visible {
            to_show = true;
        }

        if to_show && !shown {
            self.do_show_window(key, new, true);
        }
        self.store_info(new);
        self.apply_to_entry(key, new.clone());
    }

    fn reset_stripe_button(&mut self, key: EntryKey, info: &WindowInfo) {
        self.remove_stripe_button(key);
        if info.show_stripe_button && self.entries[key].available {
            self.ensure_stripe_button(key, info);
        }
    }
}
