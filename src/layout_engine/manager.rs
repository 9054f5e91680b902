use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use slotmap::SlotMap;
use tokio::sync::mpsc;
use tracing::{debug, error, instrument, warn};

use super::entry::{Entry, EntryKey};
use super::error::EngineError;
use super::events::{ToolWindowManagerEvent, ToolWindowManagerEventType, ToolWindowManagerListener};
use super::host::DecoratorHost;
use super::key_chord::{KeyChordDetector, KeyEvent, OverlayChange, resolve_activation_mask};
use crate::common::collections::HashMap;
use crate::common::config::{Config, EngineSettings};
use crate::model::{
    ActiveStack, DEFAULT_PANE_ID, DesktopLayout, LayoutStore, SideStack, StoreError,
    ToolWindowAnchor, WindowInfo,
};
use crate::sys::debounce::Debouncer;
use crate::sys::thread::OwningThread;

/// What a caller knows about a tool window when registering it.
#[derive(Clone, Debug)]
pub struct RegisterRequest {
    pub id: String,
    pub anchor: ToolWindowAnchor,
    pub split: bool,
    pub should_be_available: bool,
    /// Whether content can be created for the window.
    pub has_content: bool,
    /// Persisted info to use instead of the layout's.
    pub existing: Option<WindowInfo>,
}

impl RegisterRequest {
    pub fn new(id: impl Into<String>, anchor: ToolWindowAnchor) -> Self {
        Self {
            id: id.into(),
            anchor,
            split: false,
            should_be_available: true,
            has_content: true,
            existing: None,
        }
    }

    pub fn split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.should_be_available = available;
        self
    }

    pub fn with_content(mut self, has_content: bool) -> Self {
        self.has_content = has_content;
        self
    }

    pub fn with_info(mut self, info: WindowInfo) -> Self {
        self.existing = Some(info);
        self
    }
}

/// Read-only view of the layout for other threads. Readers see either the
/// state before or after a mutation, never a mix.
#[derive(Clone, Debug, Default)]
pub struct LayoutSnapshot(Arc<RwLock<Arc<DesktopLayout>>>);

impl LayoutSnapshot {
    pub fn get(&self) -> Arc<DesktopLayout> { self.0.read().clone() }

    fn publish(&self, layout: &DesktopLayout) { *self.0.write() = Arc::new(layout.clone()); }

    /// The docked or sliding window currently shown in a slot.
    pub fn visible_in_slot(&self, pane_id: &str, anchor: ToolWindowAnchor, split: bool) -> Option<String> {
        let layout = self.get();
        layout
            .infos()
            .find(|info| {
                info.occupies_slot()
                    && info.pane_id == pane_id
                    && info.anchor == anchor
                    && info.split == split
            })
            .map(|info| info.id.clone())
    }
}

/// Sends layouts to the engine from any task. Requests are debounced so only
/// the newest one is delivered; the engine applies it on its own thread in
/// [`ToolWindowManager::apply_scheduled_layouts`].
#[derive(Clone)]
pub struct LayoutScheduler {
    tx: mpsc::UnboundedSender<DesktopLayout>,
    debouncer: Debouncer<&'static str>,
}

impl LayoutScheduler {
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, layout: DesktopLayout, delay: Duration) {
        let tx = self.tx.clone();
        self.debouncer.schedule("set_layout", delay, async move {
            if tx.send(layout).is_err() {
                debug!("tool window manager is gone, dropping scheduled layout");
            }
        });
    }
}

pub struct ToolWindowManager<H: DecoratorHost> {
    pub(super) host: H,
    pub(super) layout: DesktopLayout,
    pub(super) default_layout: DesktopLayout,
    pub(super) entries: SlotMap<EntryKey, Entry>,
    pub(super) id_to_key: HashMap<String, EntryKey>,
    pub(super) active_stack: ActiveStack<EntryKey>,
    pub(super) side_stack: SideStack,
    pub(super) panes: Vec<String>,
    pub(super) settings: EngineSettings,
    pub(super) recent: VecDeque<String>,
    pub(super) owner: OwningThread,
    listeners: Vec<Box<dyn ToolWindowManagerListener>>,
    layout_to_restore_later: Option<DesktopLayout>,
    snapshot: LayoutSnapshot,
    key_chord: KeyChordDetector,
    scheduled_tx: mpsc::UnboundedSender<DesktopLayout>,
    scheduled_rx: mpsc::UnboundedReceiver<DesktopLayout>,
}

impl<H: DecoratorHost> ToolWindowManager<H> {
    pub fn new(host: H, settings: EngineSettings) -> Self {
        let (scheduled_tx, scheduled_rx) = mpsc::unbounded_channel();
        let key_chord = KeyChordDetector::new(
            resolve_activation_mask(None, false, cfg!(target_os = "macos")),
            Duration::from_millis(300),
        );
        Self {
            host,
            layout: DesktopLayout::default(),
            default_layout: DesktopLayout::default(),
            entries: SlotMap::with_key(),
            id_to_key: HashMap::default(),
            active_stack: ActiveStack::new(),
            side_stack: SideStack::new(),
            panes: vec![DEFAULT_PANE_ID.to_string()],
            owner: OwningThread::current(settings.require_owning_thread),
            settings,
            recent: VecDeque::new(),
            listeners: Vec::new(),
            layout_to_restore_later: None,
            snapshot: LayoutSnapshot::default(),
            key_chord,
            scheduled_tx,
            scheduled_rx,
        }
    }

    pub fn from_config(host: H, config: &Config) -> Self {
        let mut manager = Self::new(host, config.engine.clone());
        let mask = resolve_activation_mask(
            config.keys.shortcut_modifiers(),
            config.keys.disable_double_key_overlay,
            cfg!(target_os = "macos"),
        );
        manager.key_chord = KeyChordDetector::new(mask, config.keys.double_press_delay());
        manager
    }

    pub fn host(&self) -> &H { &self.host }

    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    pub fn settings(&self) -> &EngineSettings { &self.settings }

    pub fn layout(&self) -> &DesktopLayout { &self.layout }

    pub fn snapshot(&self) -> LayoutSnapshot { self.snapshot.clone() }

    pub fn scheduler(&self) -> LayoutScheduler {
        LayoutScheduler { tx: self.scheduled_tx.clone(), debouncer: Debouncer::new() }
    }

    pub fn add_listener(&mut self, listener: impl ToolWindowManagerListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Layout the engine falls back to for windows a replacement layout lacks.
    pub fn set_default_layout(&mut self, layout: DesktopLayout) { self.default_layout = layout; }

    pub fn layout_to_restore_later(&self) -> Option<&DesktopLayout> { self.layout_to_restore_later.as_ref() }

    pub fn set_layout_to_restore_later(&mut self, layout: Option<DesktopLayout>) {
        self.layout_to_restore_later = layout;
    }

    pub fn is_registered(&self, id: &str) -> bool { self.id_to_key.contains_key(id) }

    pub fn ids(&self) -> impl Iterator<Item = &str> { self.entries.values().map(|e| e.id.as_str()) }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.id_to_key.get(id).map(|key| &self.entries[*key])
    }

    /// The engine's snapshot of a registered window.
    pub fn window_info(&self, id: &str) -> Option<&WindowInfo> { self.entry(id).map(|e| &e.info) }

    pub fn is_visible(&self, id: &str) -> bool { self.window_info(id).is_some_and(|info| info.visible) }

    pub fn active_stack_ids(&self) -> Vec<&str> {
        self.active_stack.iter().map(|key| self.entries[key].id.as_str()).collect()
    }

    pub fn persistent_active_stack_ids(&self) -> Vec<&str> {
        self.active_stack.iter_persistent().map(|key| self.entries[key].id.as_str()).collect()
    }

    pub fn side_stack_len(&self, anchor: ToolWindowAnchor) -> usize { self.side_stack.len(anchor) }

    pub fn recent_tool_windows(&self) -> Vec<String> { self.recent.iter().cloned().collect() }

    /// Most recently activated window that is still available, even if hidden.
    pub fn last_active_tool_window_id(&self) -> Option<&str> {
        self.active_stack
            .iter_persistent()
            .map(|key| &self.entries[key])
            .find(|entry| entry.available)
            .map(|entry| entry.id.as_str())
    }

    pub fn panes(&self) -> &[String] { &self.panes }

    /// Ids of visible docked or sliding windows in a slot.
    pub fn docked_at(&self, pane_id: &str, anchor: ToolWindowAnchor, split: bool) -> Vec<&str> {
        self.entries
            .values()
            .filter(|e| {
                e.info.occupies_slot()
                    && e.info.pane_id == pane_id
                    && e.info.anchor == anchor
                    && e.info.split == split
            })
            .map(|e| e.id.as_str())
            .collect()
    }

    #[instrument(skip(self, request), fields(id = %request.id))]
    pub fn register(&mut self, request: RegisterRequest) -> Result<EntryKey, EngineError> {
        self.owner.assert_on_owning_thread();
        if self.id_to_key.contains_key(&request.id) {
            error!(id = %request.id, "tool window is already registered");
            return Err(EngineError::AlreadyRegistered(request.id));
        }

        let existing = match request.existing {
            Some(info) => {
                let taken_by = info.has_order().then(|| {
                    self.layout
                        .bucket(&info.pane_id, info.anchor, info.split)
                        .into_iter()
                        .find(|other| other.id != info.id && other.order == info.order)
                        .map(|other| other.id.clone())
                });
                if let Some(other) = taken_by.flatten() {
                    error!(order = info.order, %other, "persisted order is already taken");
                    return Err(EngineError::ConflictingOrder {
                        id: request.id,
                        order: info.order,
                        reason: format!("already used by {other}"),
                    });
                }
                self.layout.put(info.clone());
                Some(info)
            }
            None => self.layout.get_info(&request.id).cloned(),
        };
        let button_needed =
            request.should_be_available && existing.as_ref().is_none_or(|info| info.show_stripe_button);

        let info = match existing {
            Some(info) => info,
            None => {
                let mut info = WindowInfo::new(request.id.clone(), request.anchor).with_split(request.split);
                if button_needed {
                    // without an order the window could never be moved before its siblings
                    info.order = self.layout.next_order(&info.pane_id, info.anchor);
                    self.layout.add_info(info.clone());
                }
                info
            }
        };

        let mut snapshot = info.clone();
        if snapshot.visible && (!request.has_content || !request.should_be_available) {
            debug!("cannot show a window without content");
            snapshot.visible = false;
        }

        let mut entry = Entry::new(snapshot.clone(), request.should_be_available, request.has_content);
        if button_needed {
            entry.stripe_button = Some(self.host.create_stripe_button(&snapshot));
        } else {
            debug!(show_stripe_button = info.show_stripe_button, "no stripe button");
        }
        let has_button = entry.stripe_button.is_some();
        let key = self.entries.insert(entry);
        self.id_to_key.insert(request.id.clone(), key);

        if has_button && request.has_content && snapshot.visible {
            self.show_impl(key, info, false);
            if snapshot.active_on_start && snapshot.is_external() && self.host.is_application_active() {
                self.host.request_focus(&request.id);
            }
        }

        let pane = self.pane_for(&snapshot.pane_id);
        self.host.validate_pane(&pane);
        self.fire(ToolWindowManagerEventType::RegisterToolWindow, Some(&request.id));
        Ok(key)
    }

    /// Hides the window and forgets it. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn unregister(&mut self, id: &str) {
        self.owner.assert_on_owning_thread();
        let Some(key) = self.id_to_key.get(id).copied() else {
            debug!("not registered, nothing to unregister");
            return;
        };

        if let Some(mut info) = self.layout.get_info(id).cloned() {
            // removing the decorators also saves the current bounds
            self.update_state_and_remove_decorator(&mut info, key, false);
            self.layout.put(info.clone());
            self.active_stack.remove(key, true);
            if self.settings.stack_enabled {
                self.side_stack.remove(id);
            }
            self.remove_stripe_button(key);
            let pane = self.pane_for(&info.pane_id);
            self.host.validate_pane(&pane);
        }

        self.id_to_key.remove(id);
        self.entries.remove(key);
        self.fire(ToolWindowManagerEventType::UnregisterToolWindow, Some(id));
    }

    pub fn add_pane(&mut self, pane_id: &str) {
        self.owner.assert_on_owning_thread();
        if !self.panes.iter().any(|p| p == pane_id) {
            debug!(pane_id, "pane added");
            self.panes.push(pane_id.to_string());
        }
    }

    /// Hides every window of the pane, drops their stripe buttons and moves
    /// them back to the default pane.
    #[instrument(skip(self))]
    pub fn remove_pane(&mut self, pane_id: &str) {
        self.owner.assert_on_owning_thread();
        if pane_id == DEFAULT_PANE_ID {
            warn!("the default pane cannot be removed");
            return;
        }
        let ids: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.info.pane_id == pane_id)
            .map(|e| e.id.clone())
            .collect();
        for id in ids {
            let options = super::placement::HideOptions { remove_from_stripe: true, ..Default::default() };
            if let Err(err) = self.hide_with(&id, options) {
                warn!(%err, "failed to hide window of removed pane");
            }
        }
        self.panes.retain(|p| p != pane_id);
    }

    /// Closes every floating and windowed decorator.
    pub fn project_closed(&mut self) {
        self.owner.assert_on_owning_thread();
        let keys: Vec<EntryKey> = self
            .entries
            .iter()
            .filter(|(_, e)| e.info.is_external())
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.remove_external_decorators(key);
        }
    }

    /// Installs the initial layout. Only valid before any window registered.
    pub fn set_layout_on_init(&mut self, layout: DesktopLayout) -> Result<(), EngineError> {
        self.owner.assert_on_owning_thread();
        if !self.entries.is_empty() {
            error!(registered = self.entries.len(), "initial layout applied after registration");
            return Err(EngineError::AlreadyInitialized(self.entries.len()));
        }
        debug!(windows = layout.len(), "initial tool window layout");
        self.replace_layout(layout);
        Ok(())
    }

    pub fn load_from(&mut self, store: &dyn LayoutStore) -> Result<bool, StoreError> {
        let Some(layout) = store.load()? else {
            return Ok(false);
        };
        let applied = if self.entries.is_empty() {
            self.set_layout_on_init(layout).map_err(|err| warn!(%err, "stored layout rejected"))
        } else {
            self.set_layout(layout).map_err(|err| warn!(%err, "stored layout rejected"))
        };
        Ok(applied.is_ok())
    }

    pub fn save_to(&self, store: &dyn LayoutStore) -> Result<(), StoreError> { store.save(&self.layout) }

    /// Applies the newest layout delivered through [`LayoutScheduler`].
    pub fn apply_scheduled_layouts(&mut self) -> Result<bool, EngineError> {
        let mut latest = None;
        while let Ok(layout) = self.scheduled_rx.try_recv() {
            latest = Some(layout);
        }
        match latest {
            Some(layout) => self.set_layout(layout).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn dispatch_key_event(&mut self, event: KeyEvent, now: Instant) {
        let change = self.key_chord.on_key(event, now);
        self.apply_overlay(change);
    }

    /// Lets a pending double press expire.
    pub fn tick(&mut self, now: Instant) {
        let change = self.key_chord.tick(now);
        self.apply_overlay(change);
    }

    pub fn key_chord(&self) -> &KeyChordDetector { &self.key_chord }

    fn apply_overlay(&mut self, change: Option<OverlayChange>) {
        match change {
            Some(OverlayChange::Show) => self.host.set_stripes_overlaid(true),
            Some(OverlayChange::Hide) => self.host.set_stripes_overlaid(false),
            None => {}
        }
    }

    pub(super) fn key_of(&self, id: &str) -> Result<EntryKey, EngineError> {
        match self.id_to_key.get(id) {
            Some(key) => Ok(*key),
            None => {
                error!(id, "tool window is not registered");
                Err(EngineError::NotRegistered(id.to_string()))
            }
        }
    }

    /// The layout's info for a registered window. A window registered without
    /// a stripe button has none yet, so its snapshot is added first.
    pub(super) fn registered_info(&mut self, key: EntryKey) -> WindowInfo {
        let entry = &self.entries[key];
        match self.layout.get_info(&entry.id) {
            Some(info) => info.clone(),
            None => self.layout.add_info(entry.info.clone()).clone(),
        }
    }

    pub(super) fn replace_layout(&mut self, layout: DesktopLayout) {
        self.layout = layout;
        self.snapshot.publish(&self.layout);
    }

    pub(super) fn store_info(&mut self, info: &WindowInfo) { self.layout.put(info.clone()); }

    pub(super) fn apply_to_entry(&mut self, key: EntryKey, info: WindowInfo) { self.entries[key].info = info; }

    /// Panes that were never added (or were removed) fall back to the default.
    pub(super) fn pane_for(&self, pane_id: &str) -> String {
        if self.panes.iter().any(|p| p == pane_id) {
            pane_id.to_string()
        } else {
            DEFAULT_PANE_ID.to_string()
        }
    }

    pub(super) fn remove_stripe_button(&mut self, key: EntryKey) {
        if let Some(button) = self.entries[key].stripe_button.take() {
            self.host.remove_stripe_button(button);
        }
    }

    pub(super) fn ensure_stripe_button(&mut self, key: EntryKey, info: &WindowInfo) {
        if self.entries[key].stripe_button.is_none() {
            let button = self.host.create_stripe_button(info);
            self.entries[key].stripe_button = Some(button);
        }
    }

    pub(super) fn fire(&mut self, kind: ToolWindowManagerEventType, id: Option<&str>) {
        self.snapshot.publish(&self.layout);
        let event = ToolWindowManagerEvent::new(kind, id);
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::recording_host::{HostOp, RecordingHost};
    use crate::model::MemoryStore;

    fn manager() -> ToolWindowManager<RecordingHost> {
        ToolWindowManager::new(RecordingHost::new(), EngineSettings::default())
    }

    #[test]
    fn register_assigns_next_order_and_button() {
        let mut m = manager();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        m.register(RegisterRequest::new("Commit", ToolWindowAnchor::Left)).unwrap();
        assert_eq!(m.layout().get_info("Commit").map(|i| i.order), Some(1));
        assert_eq!(m.host().stripe_buttons(), vec!["Commit", "Project"]);
        assert!(!m.is_visible("Project"));
    }

    #[test]
    fn double_registration_is_an_error() {
        let mut m = manager();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        assert_eq!(
            m.register(RegisterRequest::new("Project", ToolWindowAnchor::Right)).unwrap_err(),
            EngineError::AlreadyRegistered("Project".into())
        );
    }

    #[test]
    fn persisted_order_taken_by_a_sibling_is_rejected() {
        let mut m = manager();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        let stale = WindowInfo::new("Commit", ToolWindowAnchor::Left).with_order(0);
        let err = m
            .register(RegisterRequest::new("Commit", ToolWindowAnchor::Left).with_info(stale))
            .unwrap_err();
        assert!(matches!(err, EngineError::ConflictingOrder { order: 0, .. }));
        assert!(!m.is_registered("Commit"));
        assert!(m.layout().violations().is_empty());

        // the other split slot has its own orders
        let split = WindowInfo::new("Structure", ToolWindowAnchor::Left).with_split(true).with_order(0);
        m.register(RegisterRequest::new("Structure", ToolWindowAnchor::Left).with_info(split)).unwrap();
        assert!(m.layout().violations().is_empty());
    }

    #[test]
    fn unavailable_window_gets_no_button_and_no_layout_entry() {
        let mut m = manager();
        m.register(RegisterRequest::new("Database", ToolWindowAnchor::Right).available(false)).unwrap();
        assert!(m.layout().get_info("Database").is_none());
        assert!(m.host().stripe_buttons().is_empty());
    }

    #[test]
    fn persisted_visible_window_is_shown_on_registration() {
        let mut m = manager();
        let layout = DesktopLayout::from_infos([WindowInfo::new("Project", ToolWindowAnchor::Left)
            .with_order(0)
            .with_visible(true)]);
        m.set_layout_on_init(layout).unwrap();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        assert!(m.is_visible("Project"));
        assert!(m.host().ops().iter().any(|op| matches!(op, HostOp::Attach { id, .. } if id == "Project")));
    }

    #[test]
    fn window_without_content_stays_hidden() {
        let mut m = manager();
        let layout = DesktopLayout::from_infos([WindowInfo::new("Project", ToolWindowAnchor::Left)
            .with_order(0)
            .with_visible(true)]);
        m.set_layout_on_init(layout).unwrap();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left).with_content(false)).unwrap();
        assert!(!m.is_visible("Project"));
        assert!(m.layout().get_info("Project").unwrap().visible);
    }

    #[test]
    fn unregister_is_idempotent_and_drops_history() {
        let mut m = manager();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        m.activate("Project", false).unwrap();
        m.unregister("Project");
        m.unregister("Project");
        assert!(!m.is_registered("Project"));
        assert!(m.persistent_active_stack_ids().is_empty());
        assert!(m.host().stripe_buttons().is_empty());
    }

    #[test]
    fn initial_layout_after_registration_is_rejected() {
        let mut m = manager();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        assert_eq!(
            m.set_layout_on_init(DesktopLayout::new()).unwrap_err(),
            EngineError::AlreadyInitialized(1)
        );
    }

    #[test]
    fn listeners_and_snapshot_follow_mutations() {
        let mut m = manager();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        m.add_listener(move |event: &ToolWindowManagerEvent| sink.borrow_mut().push(event.kind));
        let snapshot = m.snapshot();

        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        m.show("Project").unwrap();

        assert_eq!(*seen.borrow(), vec![
            ToolWindowManagerEventType::RegisterToolWindow,
            ToolWindowManagerEventType::ToolWindowShown,
            ToolWindowManagerEventType::ShowToolWindow,
        ]);
        assert_eq!(
            snapshot.visible_in_slot(DEFAULT_PANE_ID, ToolWindowAnchor::Left, false),
            Some("Project".to_string())
        );
    }

    #[test]
    fn store_round_trip_through_engine() {
        let mut m = manager();
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        let store = MemoryStore::default();
        m.save_to(&store).unwrap();

        let mut fresh = manager();
        assert!(fresh.load_from(&store).unwrap());
        assert!(fresh.layout().contains("Project"));
    }

    #[test]
    fn removing_a_pane_returns_windows_to_default() {
        let mut m = manager();
        m.add_pane("second");
        let mut info = WindowInfo::new("Terminal", ToolWindowAnchor::Bottom).with_order(0);
        info.pane_id = "second".into();
        m.register(RegisterRequest::new("Terminal", ToolWindowAnchor::Bottom).with_info(info)).unwrap();
        m.show("Terminal").unwrap();

        m.remove_pane("second");
        let info = m.layout().get_info("Terminal").unwrap();
        assert_eq!(info.pane_id, DEFAULT_PANE_ID);
        assert!(!info.visible);
        assert!(!info.show_stripe_button);
        assert_eq!(m.panes(), &[DEFAULT_PANE_ID.to_string()]);
    }

    #[test]
    fn closing_the_project_closes_external_windows() {
        use crate::model::ToolWindowType;
        let mut m = manager();
        m.register(RegisterRequest::new("Find", ToolWindowAnchor::Bottom)).unwrap();
        m.set_type("Find", ToolWindowType::Floating).unwrap();
        m.show("Find").unwrap();
        assert!(m.host().external_window("Find").is_some());

        m.project_closed();
        assert!(m.host().external_window("Find").is_none());
        assert!(m.entry("Find").unwrap().external().is_none());
    }

    #[test]
    fn double_alt_overlays_stripes() {
        use crate::sys::hotkey::{KeyCode, Modifiers};
        let mut m = manager();
        let t = Instant::now();
        let press = |pressed| KeyEvent {
            code: KeyCode::Alt,
            pressed,
            modifiers: if pressed { Modifiers::ALT } else { Modifiers::empty() },
            mouse_button_down: false,
        };
        if m.key_chord().mask() != Modifiers::ALT {
            return;
        }
        m.dispatch_key_event(press(true), t);
        m.dispatch_key_event(press(false), t);
        m.dispatch_key_event(press(true), t);
        m.dispatch_key_event(press(false), t);
        assert_eq!(m.host().ops(), &[
            HostOp::SetStripesOverlaid { overlaid: true },
            HostOp::SetStripesOverlaid { overlaid: false }
        ]);
    }
}
