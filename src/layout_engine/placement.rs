//! Per-window mutators: showing, hiding, activation and moving windows
//! between slots.

use tracing::{debug, error, instrument, warn};

use super::decorators::get_adjusted_ratio;
use super::entry::EntryKey;
use super::error::EngineError;
use super::events::ToolWindowManagerEventType;
use super::host::{DecoratorGeometry, DecoratorHost};
use super::manager::ToolWindowManager;
use crate::model::window_info::UNASSIGNED_ORDER;
use crate::model::{ContentUiType, DEFAULT_PANE_ID, ToolWindowAnchor, ToolWindowType, WindowInfo};
use crate::sys::geometry::Size;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HideOptions {
    /// Also hide every other window at the same anchor and forget the
    /// anchor's evicted windows.
    pub hide_side: bool,
    /// Give focus back to the editor if the hidden window had it.
    pub move_focus: bool,
    /// Drop the stripe button and move the window back to the default pane.
    pub remove_from_stripe: bool,
}

impl Default for HideOptions {
    fn default() -> Self { Self { hide_side: false, move_focus: true, remove_from_stripe: false } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum HideMutation {
    None,
    RemoveStripeButton,
    RemoveFromStripe,
}

impl<H: DecoratorHost> ToolWindowManager<H> {
    #[instrument(skip(self))]
    pub fn show(&mut self, id: &str) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        if self.entries[key].info.visible {
            debug!("already visible");
            return Ok(());
        }
        let info = self.registered_info(key);
        if !self.show_impl(key, info, false) {
            return Ok(());
        }
        self.check_invariants();
        self.fire(ToolWindowManagerEventType::ShowToolWindow, Some(id));
        Ok(())
    }

    /// Shows the window described by `info`, evicting whatever holds its slot.
    /// Returns false for an unavailable window, which stays hidden.
    pub(super) fn show_impl(&mut self, key: EntryKey, mut info: WindowInfo, dirty: bool) -> bool {
        if !self.entries[key].available {
            debug!(id = %info.id, "unavailable, not showing");
            return false;
        }
        info.visible = true;
        info.show_stripe_button = true;
        if !info.has_order() {
            info.order = self.layout.next_order(&info.pane_id, info.anchor);
        }
        if info.window_type.is_internal() {
            self.evict_slot(key, &info, dirty);
        }

        self.store_info(&info);
        self.apply_to_entry(key, info.clone());
        self.do_show_window(key, &info, dirty);
        if self.settings.stack_enabled {
            self.side_stack.remove(&info.id);
        }
        self.ensure_stripe_button(key, &info);
        self.fire(ToolWindowManagerEventType::ToolWindowShown, Some(&info.id));
        true
    }

    fn evict_slot(&mut self, key: EntryKey, info: &WindowInfo, dirty: bool) {
        let occupants: Vec<EntryKey> = self
            .entries
            .iter()
            .filter(|(other, entry)| {
                *other != key
                    && entry.info.occupies_slot()
                    && entry.info.pane_id == info.pane_id
                    && entry.info.anchor == info.anchor
                    && entry.info.split == info.split
            })
            .map(|(other, _)| other)
            .collect();

        for other in occupants {
            let mut evicted = self.registered_info(other);
            debug!(evicted = %evicted.id, by = %info.id, "slot is taken");
            if self.settings.stack_enabled && evicted.is_docked() && !evicted.auto_hide {
                self.side_stack.push(evicted.clone());
            }
            self.deactivate_tool_window(&mut evicted, other, dirty, HideMutation::None);
            self.store_info(&evicted);
            let id = evicted.id.clone();
            self.apply_to_entry(other, evicted);
            self.fire(ToolWindowManagerEventType::HideToolWindow, Some(&id));
        }
    }

    pub fn hide(&mut self, id: &str) -> Result<(), EngineError> { self.hide_with(id, HideOptions::default()) }

    #[instrument(skip(self))]
    pub fn hide_with(&mut self, id: &str, options: HideOptions) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        let mutation = if options.remove_from_stripe {
            HideMutation::RemoveFromStripe
        } else {
            HideMutation::None
        };

        if !info.visible {
            if mutation == HideMutation::RemoveFromStripe && info.show_stripe_button {
                self.apply_hide_mutation(&mut info, key, mutation);
                self.store_info(&info);
                self.apply_to_entry(key, info);
                self.fire(ToolWindowManagerEventType::HideToolWindow, Some(id));
            }
            return Ok(());
        }

        let move_focus = options.move_focus && self.host.has_focus(id);
        let pane = self.pane_for(&info.pane_id);
        self.execute_hide(key, info, false, options.hide_side, mutation);
        self.host.validate_pane(&pane);
        self.fire(ToolWindowManagerEventType::HideToolWindow, Some(id));
        if move_focus && self.host.is_application_active() {
            self.host.activate_editor_component();
        }
        Ok(())
    }

    pub(super) fn execute_hide(
        &mut self,
        key: EntryKey,
        mut info: WindowInfo,
        dirty: bool,
        hide_side: bool,
        mutation: HideMutation,
    ) {
        let was_visible = info.visible;
        if hide_side && info.window_type.is_internal() {
            let neighbours: Vec<EntryKey> = self
                .entries
                .iter()
                .filter(|(other, entry)| {
                    *other != key
                        && entry.info.occupies_slot()
                        && entry.info.pane_id == info.pane_id
                        && entry.info.anchor == info.anchor
                })
                .map(|(other, _)| other)
                .collect();
            for other in neighbours {
                let mut neighbour = self.registered_info(other);
                self.deactivate_tool_window(&mut neighbour, other, dirty, HideMutation::None);
                self.store_info(&neighbour);
                self.apply_to_entry(other, neighbour);
            }
            self.side_stack.clear_anchor(info.anchor);
        }

        self.deactivate_tool_window(&mut info, key, dirty, mutation);
        self.store_info(&info);
        self.apply_to_entry(key, info.clone());

        if was_visible && !hide_side && self.settings.stack_enabled && info.window_type.is_internal() {
            self.restore_from_side_stack(&info, dirty);
        }
    }

    /// Pops evicted windows of the anchor until one still matches its
    /// registered placement, and shows it.
    fn restore_from_side_stack(&mut self, hidden: &WindowInfo, dirty: bool) {
        while let Some(stored) = self.side_stack.pop(hidden.anchor) {
            if stored.split != hidden.split || stored.pane_id != hidden.pane_id {
                debug!(id = %stored.id, "evicted from another slot, skipping");
                continue;
            }
            let Some(key) = self.id_to_key.get(&stored.id).copied() else {
                warn!(id = %stored.id, "evicted window is no longer registered");
                continue;
            };
            if !self.entries[key].available {
                debug!(id = %stored.id, "evicted window is unavailable, skipping");
                continue;
            }
            let current = self.registered_info(key);
            let consistent = !current.visible
                && current.pane_id == stored.pane_id
                && current.anchor == stored.anchor
                && current.split == stored.split
                && current.window_type == stored.window_type
                && current.auto_hide == stored.auto_hide;
            if !consistent {
                warn!(id = %stored.id, "stale side stack snapshot dropped");
                continue;
            }
            debug!(id = %stored.id, "restoring evicted window");
            if self.show_impl(key, current, dirty) {
                break;
            }
        }
    }

    fn apply_hide_mutation(&mut self, info: &mut WindowInfo, key: EntryKey, mutation: HideMutation) {
        match mutation {
            HideMutation::None => {}
            HideMutation::RemoveStripeButton => self.remove_stripe_button(key),
            HideMutation::RemoveFromStripe => {
                info.show_stripe_button = false;
                if info.pane_id != DEFAULT_PANE_ID {
                    // the old order means nothing on the default pane
                    info.pane_id = DEFAULT_PANE_ID.to_string();
                    info.order = UNASSIGNED_ORDER;
                }
                self.remove_stripe_button(key);
            }
        }
    }

    pub(super) fn deactivate_tool_window(
        &mut self,
        info: &mut WindowInfo,
        key: EntryKey,
        dirty: bool,
        mutation: HideMutation,
    ) {
        debug!(id = %info.id, "deactivating");
        self.active_stack.remove(key, false);
        info.visible = false;
        info.active_on_start = false;
        self.apply_hide_mutation(info, key, mutation);
        self.update_state_and_remove_decorator(info, key, dirty);
    }

    /// Hides the window without restoring anything into its slot.
    #[instrument(skip(self))]
    pub fn deactivate(&mut self, id: &str) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        if !info.visible {
            return Ok(());
        }
        let pane = self.pane_for(&info.pane_id);
        self.deactivate_tool_window(&mut info, key, false, HideMutation::None);
        self.store_info(&info);
        self.apply_to_entry(key, info);
        self.host.validate_pane(&pane);
        self.fire(ToolWindowManagerEventType::HideToolWindow, Some(id));
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn activate(&mut self, id: &str, auto_focus: bool) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        if self.settings.unified_weights {
            info.weight = self.layout.unified_anchor_weight(info.anchor);
            self.store_info(&info);
        }
        self.recent.retain(|recent| recent != id);
        self.recent.push_front(id.to_string());

        if !self.entries[key].available {
            // may be logically active while another application has focus
            if auto_focus && !self.host.has_focus(id) {
                self.host.request_focus(id);
            }
            return Ok(());
        }

        if !self.entries[key].info.visible {
            info.active_on_start = auto_focus;
            self.show_impl(key, info, false);
        } else {
            self.apply_to_entry(key, info.clone());
            if !auto_focus && info.is_external() {
                self.host.bring_to_front(id);
            }
        }

        // a transferred focus reports back through tool_window_focused
        let focused = auto_focus && self.host.is_application_active() && self.host.request_focus(id);
        if !focused {
            self.active_stack.push(key);
        }
        self.check_invariants();
        self.fire(ToolWindowManagerEventType::ActivateToolWindow, Some(id));
        Ok(())
    }

    /// The host moved focus into a tool window.
    pub fn tool_window_focused(&mut self, id: &str) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        self.active_stack.push(key);
        Ok(())
    }

    /// Deactivates visible auto-hide and sliding windows that lost focus.
    pub fn focus_moved_to(&mut self, focused: Option<&str>) {
        self.owner.assert_on_owning_thread();
        let losing: Vec<String> = self
            .entries
            .values()
            .filter(|entry| {
                entry.info.visible
                    && (entry.info.auto_hide || entry.info.window_type == ToolWindowType::Sliding)
                    && Some(entry.id.as_str()) != focused
            })
            .map(|entry| entry.id.clone())
            .collect();
        for id in losing {
            if let Err(err) = self.deactivate(&id) {
                warn!(%err, "cannot deactivate window that lost focus");
            }
        }
        if let Some(id) = focused {
            if self.is_registered(id) {
                let _ = self.tool_window_focused(id);
            } else {
                self.editor_focused();
            }
        }
    }

    /// Focus went to an editor, so nothing is active any more.
    pub fn editor_focused(&mut self) { self.active_stack.clear(); }

    /// Activates the most recently active visible window.
    pub fn focus_tool_window_by_default(&mut self) -> Result<Option<String>, EngineError> {
        let target = self
            .active_stack
            .iter()
            .chain(self.active_stack.iter_persistent())
            .map(|key| &self.entries[key])
            .find(|entry| entry.info.visible)
            .map(|entry| entry.id.clone());
        if let Some(id) = &target {
            self.activate(id, true)?;
        }
        Ok(target)
    }

    pub fn clear_side_stack(&mut self) { self.side_stack.clear(); }

    #[instrument(skip(self))]
    pub fn set_anchor(
        &mut self,
        id: &str,
        pane_id: &str,
        anchor: ToolWindowAnchor,
        order: i32,
    ) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        if order < UNASSIGNED_ORDER {
            error!(order, "invalid order");
            return Err(EngineError::ConflictingOrder {
                id: id.to_string(),
                order,
                reason: "orders below -1 are never assigned".into(),
            });
        }
        let pane_id = self.pane_for(pane_id);
        let info = self.registered_info(key);
        if info.pane_id == pane_id
            && info.anchor == anchor
            && (info.order == order || order == UNASSIGNED_ORDER)
        {
            return Ok(());
        }

        let same_place = info.pane_id == pane_id && info.anchor == anchor;
        if !info.visible || same_place || info.is_external() {
            self.relabel(key, &pane_id, anchor, order);
        } else {
            let old_pane = self.pane_for(&info.pane_id);
            let was_focused = self.host.has_focus(id);
            self.remove_internal_decorator(key, true);
            self.relabel(key, &pane_id, anchor, order);
            let moved = self.registered_info(key);
            if self.show_impl(key, moved, true) && was_focused {
                self.host.request_focus(id);
            }
            self.host.validate_pane(&old_pane);
            if old_pane != pane_id {
                self.host.validate_pane(&pane_id);
            }
            self.host.repaint_frame(self.host.frame_of(&pane_id));
        }
        self.check_invariants();
        self.fire(ToolWindowManagerEventType::SetToolWindowAnchor, Some(id));
        Ok(())
    }

    /// Moves the window in the layout and refreshes every stripe button
    /// whose order changed.
    pub(super) fn relabel(&mut self, key: EntryKey, pane_id: &str, anchor: ToolWindowAnchor, order: i32) {
        let id = self.entries[key].id.clone();
        let changed = self.layout.set_anchor(&id, pane_id, anchor, order);
        if let Some(info) = self.layout.get_info(&id).cloned() {
            self.refresh_stripe_button(key, &info);
            self.apply_to_entry(key, info);
        }
        for sibling in changed {
            if let Some(other) = self.id_to_key.get(&sibling.id).copied() {
                self.refresh_stripe_button(other, &sibling);
                self.apply_to_entry(other, sibling);
            }
        }
    }

    pub(super) fn refresh_stripe_button(&mut self, key: EntryKey, info: &WindowInfo) {
        if let Some(button) = self.entries[key].stripe_button.take() {
            self.host.remove_stripe_button(button);
            if info.show_stripe_button {
                let button = self.host.create_stripe_button(info);
                self.entries[key].stripe_button = Some(button);
            }
        }
    }

    #[instrument(skip(self))]
    pub fn set_type(&mut self, id: &str, window_type: ToolWindowType) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        if info.window_type == window_type {
            return Ok(());
        }

        if !self.entries[key].info.visible {
            info.window_type = window_type;
            if window_type.is_internal() {
                info.internal_type = window_type;
            }
            self.store_info(&info);
            self.apply_to_entry(key, info);
            self.fire(ToolWindowManagerEventType::SetToolWindowType, Some(id));
            return Ok(());
        }

        let dirty = info.window_type.is_internal();
        self.update_state_and_remove_decorator(&mut info, key, dirty);
        info.window_type = window_type;
        if window_type.is_internal() {
            info.internal_type = window_type;
            self.evict_slot(key, &info, dirty);
        }
        self.store_info(&info);
        self.apply_to_entry(key, info.clone());
        self.do_show_window(key, &info, dirty);
        if self.host.is_application_active() {
            self.host.request_focus(id);
        }
        let pane = self.pane_for(&info.pane_id);
        self.host.validate_pane(&pane);
        self.host.repaint_frame(self.host.frame_of(&pane));
        self.check_invariants();
        self.fire(ToolWindowManagerEventType::SetToolWindowType, Some(id));
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_side_tool(&mut self, id: &str, split: bool) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        if self.registered_info(key).split == split {
            return Ok(());
        }
        self.hide_if_needed_and_show_after(key, |manager, key| {
            let mut info = manager.registered_info(key);
            info.split = split;
            manager.store_info(&info);
            manager.refresh_stripe_button(key, &info);
            manager.apply_to_entry(key, info);
        });
        self.fire(ToolWindowManagerEventType::SetSideTool, Some(id));
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_side_tool_and_anchor(
        &mut self,
        id: &str,
        pane_id: &str,
        anchor: ToolWindowAnchor,
        order: i32,
        split: bool,
    ) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let pane_id = self.pane_for(pane_id);
        let info = self.registered_info(key);
        if info.pane_id == pane_id
            && info.anchor == anchor
            && (info.order == order || order == UNASSIGNED_ORDER)
            && info.split == split
        {
            return Ok(());
        }
        self.hide_if_needed_and_show_after(key, |manager, key| {
            let mut info = manager.registered_info(key);
            info.split = split;
            manager.store_info(&info);
            manager.relabel(key, &pane_id, anchor, order);
        });
        self.fire(ToolWindowManagerEventType::SetSideToolAndAnchor, Some(id));
        Ok(())
    }

    /// Runs `mutate` on a hidden window, then shows it again if it was
    /// visible so the new slot is claimed through eviction.
    fn hide_if_needed_and_show_after(
        &mut self,
        key: EntryKey,
        mutate: impl FnOnce(&mut Self, EntryKey),
    ) {
        let info = self.registered_info(key);
        let was_visible = info.visible;
        let was_active = self.host.has_focus(&info.id);
        let old_pane = self.pane_for(&info.pane_id);
        if was_visible {
            self.execute_hide(key, info, true, false, HideMutation::None);
        }

        mutate(self, key);

        let mut info = self.registered_info(key);
        if was_visible {
            info.visible = true;
            let id = info.id.clone();
            self.show_impl(key, info.clone(), true);
            if was_active {
                self.host.request_focus(&id);
            }
        }
        let pane = self.pane_for(&info.pane_id);
        self.host.validate_pane(&old_pane);
        if pane != old_pane {
            self.host.validate_pane(&pane);
        }
        self.host.repaint_frame(self.host.frame_of(&pane));
        self.check_invariants();
    }

    pub fn set_auto_hide(&mut self, id: &str, auto_hide: bool) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        if info.auto_hide == auto_hide {
            return Ok(());
        }
        info.auto_hide = auto_hide;
        self.store_info(&info);
        self.apply_to_entry(key, info);
        self.fire(ToolWindowManagerEventType::SetToolWindowAutoHide, Some(id));
        Ok(())
    }

    pub fn set_content_ui_type(&mut self, id: &str, content_ui_type: ContentUiType) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        if info.content_ui_type == content_ui_type {
            return Ok(());
        }
        info.content_ui_type = content_ui_type;
        self.store_info(&info);
        self.apply_to_entry(key, info);
        self.fire(ToolWindowManagerEventType::SetContentUiType, Some(id));
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_show_stripe_button(&mut self, id: &str, show: bool) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        let mut info = self.registered_info(key);
        if info.show_stripe_button == show {
            return Ok(());
        }
        info.show_stripe_button = show;
        if show {
            self.store_info(&info);
            self.ensure_stripe_button(key, &info);
            self.apply_to_entry(key, info);
        } else if info.visible {
            let pane = self.pane_for(&info.pane_id);
            self.execute_hide(key, info, false, false, HideMutation::RemoveStripeButton);
            self.host.validate_pane(&pane);
        } else {
            self.remove_stripe_button(key);
            self.store_info(&info);
            self.apply_to_entry(key, info);
        }
        self.fire(ToolWindowManagerEventType::SetShowStripeButton, Some(id));
        Ok(())
    }

    /// The window can show content again. Shown if the layout says so.
    #[instrument(skip(self))]
    pub fn tool_window_available(&mut self, id: &str) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        if self.entries[key].available {
            return Ok(());
        }
        self.entries[key].available = true;
        let info = self.registered_info(key);
        if info.show_stripe_button {
            self.ensure_stripe_button(key, &info);
        }
        if info.visible && self.entries[key].has_content {
            self.show_impl(key, info, false);
        }
        self.fire(ToolWindowManagerEventType::ToolWindowAvailable, Some(id));
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn tool_window_unavailable(&mut self, id: &str) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        if !self.entries[key].available {
            return Ok(());
        }
        self.entries[key].available = false;
        let info = self.registered_info(key);
        let move_focus = info.visible && self.host.has_focus(id);
        self.execute_hide(key, info, false, false, HideMutation::RemoveStripeButton);
        self.fire(ToolWindowManagerEventType::ToolWindowUnavailable, Some(id));
        if move_focus {
            self.host.activate_editor_component();
        }
        Ok(())
    }

    /// The host moved or resized a decorator; remember the new geometry.
    #[instrument(skip(self, geometry))]
    pub fn moved_or_resized(&mut self, id: &str, geometry: &DecoratorGeometry) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        let key = self.key_of(id)?;
        if !geometry.showing {
            // nothing sensible to measure before the first layout
            return Ok(());
        }
        let mut info = self.registered_info(key);
        match info.window_type {
            ToolWindowType::Floating => {
                let Some(handle) = self.entries[key].floating else {
                    return Ok(());
                };
                info.floating_bounds = Some(self.host.external_bounds(handle));
                debug!(bounds = ?info.floating_bounds, "floating bounds updated");
            }
            ToolWindowType::Windowed => {
                let Some(handle) = self.entries[key].windowed else {
                    return Ok(());
                };
                if !self.host.is_external_showing(handle) {
                    return Ok(());
                }
                info.floating_bounds = Some(self.host.external_bounds(handle));
                info.maximized = self.host.is_external_maximized(handle);
                debug!(bounds = ?info.floating_bounds, maximized = info.maximized, "windowed bounds updated");
            }
            ToolWindowType::Docked | ToolWindowType::Sliding => {
                if !geometry.size_trusted {
                    debug!("docking area size cannot be trusted");
                    return Ok(());
                }
                let anchor = info.anchor;
                let along = |size: Size| {
                    if anchor.is_horizontal() { size.height } else { size.width }
                };
                let docking_area = match geometry.splitter {
                    Some(splitter) => {
                        let in_split = |size: Size| {
                            if anchor.is_split_vertically() { size.height } else { size.width }
                        };
                        let mut part = in_split(geometry.decorator);
                        if splitter.is_second {
                            part += splitter.divider_width;
                        }
                        let direction = if splitter.is_second { -1 } else { 1 };
                        info.side_weight = get_adjusted_ratio(part, in_split(splitter.size), direction);
                        splitter.size
                    }
                    None => geometry.decorator,
                };
                let root = along(geometry.root_pane);
                info.weight = get_adjusted_ratio(along(geometry.decorator), root, 1);
                let area_weight = get_adjusted_ratio(along(docking_area), root, 1);
                self.layout.set_unified_anchor_weight(anchor, area_weight);
                debug!(weight = info.weight, side_weight = info.side_weight, area_weight, "docked window resized");
            }
        }
        self.store_info(&info);
        self.apply_to_entry(key, info);
        self.fire(ToolWindowManagerEventType::MovedOrResized, Some(id));
        Ok(())
    }
}
