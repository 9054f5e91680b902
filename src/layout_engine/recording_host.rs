use serde::Serialize;

use super::host::{
    DecoratorHandle, DecoratorHost, ExternalHandle, ExternalKind, FrameId, StripeButtonHandle,
};
use crate::common::collections::HashMap;
use crate::model::{DEFAULT_PANE_ID, ToolWindowAnchor, WindowInfo};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{ScreenDescriptor, ScreenSet};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostOp {
    Attach { id: String, pane: String, anchor: ToolWindowAnchor, split: bool, dirty: bool },
    Detach { id: String, pane: String, anchor: ToolWindowAnchor, split: bool, dirty: bool },
    OpenExternal { id: String, kind: ExternalKind },
    ShowExternal { id: String, focus: bool },
    CloseExternal { id: String },
    SetExternalBounds { id: String, bounds: Rect },
    SetExternalMaximized { id: String, maximized: bool },
    CreateStripeButton { id: String, anchor: ToolWindowAnchor, split: bool },
    RemoveStripeButton { id: String },
    SetWeight { pane: String, anchor: ToolWindowAnchor, weight: f32 },
    SetSideWeight { pane: String, id: String, side_weight: f32 },
    ValidatePane { pane: String },
    RepaintFrame { frame: u32 },
    RequestFocus { id: String },
    BringToFront { id: String },
    ActivateEditor,
    SetStripesOverlaid { overlaid: bool },
}

impl HostOp {
    /// Operations that touch the widget tree or cause a repaint.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HostOp::Attach { .. }
                | HostOp::Detach { .. }
                | HostOp::OpenExternal { .. }
                | HostOp::CloseExternal { .. }
                | HostOp::ValidatePane { .. }
                | HostOp::RepaintFrame { .. }
        )
    }
}

impl std::fmt::Display for HostOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostOp::Attach { id, pane, anchor, split, dirty } => {
                write!(f, "attach {id} -> {pane}/{anchor} split={split} dirty={dirty}")
            }
            HostOp::Detach { id, pane, anchor, split, dirty } => {
                write!(f, "detach {id} <- {pane}/{anchor} split={split} dirty={dirty}")
            }
            HostOp::OpenExternal { id, kind } => write!(f, "open {kind} window for {id}"),
            HostOp::ShowExternal { id, focus } => write!(f, "show external {id} focus={focus}"),
            HostOp::CloseExternal { id } => write!(f, "close external {id}"),
            HostOp::SetExternalBounds { id, bounds } => write!(
                f,
                "bounds {id} = {}x{}+{}+{}",
                bounds.width, bounds.height, bounds.x, bounds.y
            ),
            HostOp::SetExternalMaximized { id, maximized } => {
                write!(f, "maximized {id} = {maximized}")
            }
            HostOp::CreateStripeButton { id, anchor, split } => {
                write!(f, "stripe button {id} at {anchor} split={split}")
            }
            HostOp::RemoveStripeButton { id } => write!(f, "remove stripe button {id}"),
            HostOp::SetWeight { pane, anchor, weight } => write!(f, "weight {pane}/{anchor} = {weight}"),
            HostOp::SetSideWeight { pane, id, side_weight } => {
                write!(f, "side weight {pane}/{id} = {side_weight}")
            }
            HostOp::ValidatePane { pane } => write!(f, "validate {pane}"),
            HostOp::RepaintFrame { frame } => write!(f, "repaint frame {frame}"),
            HostOp::RequestFocus { id } => write!(f, "focus {id}"),
            HostOp::BringToFront { id } => write!(f, "bring {id} to front"),
            HostOp::ActivateEditor => write!(f, "activate editor"),
            HostOp::SetStripesOverlaid { overlaid } => write!(f, "stripes overlaid = {overlaid}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExternalWindow {
    pub id: String,
    pub kind: ExternalKind,
    pub bounds: Rect,
    pub showing: bool,
    pub active: bool,
    pub maximized: bool,
}

/// A [`DecoratorHost`] without any UI. Every mutating call is recorded and
/// external windows are simulated well enough to exercise bounds handling.
#[derive(Debug)]
pub struct RecordingHost {
    ops: Vec<HostOp>,
    headless: bool,
    screens: Vec<ScreenDescriptor>,
    frame_bounds: Rect,
    frames: HashMap<String, FrameId>,
    decorator_size: Size,
    preferred_size: Size,
    external_origin: Point,
    next_handle: u64,
    decorators: HashMap<String, DecoratorHandle>,
    decorator_ids: HashMap<DecoratorHandle, String>,
    externals: HashMap<ExternalHandle, ExternalWindow>,
    buttons: HashMap<StripeButtonHandle, String>,
    focused: Option<String>,
    focus_transfers: bool,
    app_active: bool,
}

impl Default for RecordingHost {
    fn default() -> Self { Self::new() }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            headless: false,
            screens: vec![ScreenDescriptor::new(1, Rect::new(0, 0, 1920, 1080))],
            frame_bounds: Rect::new(0, 0, 1920, 1080),
            frames: HashMap::default(),
            decorator_size: Size::default(),
            preferred_size: Size::new(400, 300),
            external_origin: Point::new(0, 0),
            next_handle: 1,
            decorators: HashMap::default(),
            decorator_ids: HashMap::default(),
            externals: HashMap::default(),
            buttons: HashMap::default(),
            focused: None,
            focus_transfers: false,
            app_active: true,
        }
    }

    pub fn headless() -> Self { Self { headless: true, ..Self::new() } }

    pub fn with_screens(mut self, screens: Vec<ScreenDescriptor>) -> Self {
        self.screens = screens;
        self
    }

    pub fn with_frame_bounds(mut self, bounds: Rect) -> Self {
        self.frame_bounds = bounds;
        self
    }

    pub fn with_frame(mut self, pane_id: &str, frame: FrameId) -> Self {
        self.frames.insert(pane_id.to_string(), frame);
        self
    }

    pub fn with_decorator_size(mut self, size: Size) -> Self {
        self.decorator_size = size;
        self
    }

    /// When set, `request_focus` reports that focus moved into the window.
    pub fn with_focus_transfer(mut self, transfers: bool) -> Self {
        self.focus_transfers = transfers;
        self
    }

    pub fn set_application_active(&mut self, active: bool) { self.app_active = active; }

    pub fn ops(&self) -> &[HostOp] { &self.ops }

    pub fn take_ops(&mut self) -> Vec<HostOp> { std::mem::take(&mut self.ops) }

    pub fn focused(&self) -> Option<&str> { self.focused.as_deref() }

    pub fn set_focused(&mut self, id: Option<&str>) { self.focused = id.map(str::to_string); }

    pub fn stripe_buttons(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.buttons.values().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn external_window(&self, id: &str) -> Option<&ExternalWindow> {
        self.externals.values().find(|w| w.id == id)
    }

    /// Simulates the user moving or resizing an external window.
    pub fn move_external(&mut self, id: &str, bounds: Rect) {
        if let Some(window) = self.externals.values_mut().find(|w| w.id == id) {
            window.bounds = bounds;
        }
    }

    pub fn maximize_external(&mut self, id: &str, maximized: bool) {
        if let Some(window) = self.externals.values_mut().find(|w| w.id == id) {
            window.maximized = maximized;
        }
    }

    fn next(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn decorator_id(&self, decorator: DecoratorHandle) -> String {
        self.decorator_ids.get(&decorator).cloned().unwrap_or_default()
    }

    fn external_id(&self, handle: ExternalHandle) -> String {
        self.externals.get(&handle).map(|w| w.id.clone()).unwrap_or_default()
    }
}

impl DecoratorHost for RecordingHost {
    fn decorator(&mut self, id: &str) -> DecoratorHandle {
        if let Some(handle) = self.decorators.get(id) {
            return *handle;
        }
        let handle = DecoratorHandle(self.next());
        self.decorators.insert(id.to_string(), handle);
        self.decorator_ids.insert(handle, id.to_string());
        handle
    }

    fn attach(&mut self, decorator: DecoratorHandle, info: &WindowInfo, dirty: bool) {
        self.ops.push(HostOp::Attach {
            id: self.decorator_id(decorator),
            pane: info.pane_id.clone(),
            anchor: info.anchor,
            split: info.split,
            dirty,
        });
    }

    fn detach(&mut self, decorator: DecoratorHandle, info: &WindowInfo, dirty: bool) {
        self.ops.push(HostOp::Detach {
            id: self.decorator_id(decorator),
            pane: info.pane_id.clone(),
            anchor: info.anchor,
            split: info.split,
            dirty,
        });
    }

    fn open_external(
        &mut self,
        kind: ExternalKind,
        _decorator: DecoratorHandle,
        info: &WindowInfo,
    ) -> ExternalHandle {
        let handle = ExternalHandle(self.next());
        self.externals.insert(handle, ExternalWindow {
            id: info.id.clone(),
            kind,
            bounds: Rect::from_parts(self.external_origin, Size::default()),
            showing: false,
            active: false,
            maximized: false,
        });
        self.ops.push(HostOp::OpenExternal { id: info.id.clone(), kind });
        handle
    }

    fn show_external(&mut self, handle: ExternalHandle, request_focus: bool) {
        if let Some(window) = self.externals.get_mut(&handle) {
            window.showing = true;
            window.active = request_focus;
        }
        self.ops.push(HostOp::ShowExternal { id: self.external_id(handle), focus: request_focus });
    }

    fn close_external(&mut self, handle: ExternalHandle) {
        if let Some(window) = self.externals.remove(&handle) {
            self.ops.push(HostOp::CloseExternal { id: window.id });
        }
    }

    fn external_bounds(&self, handle: ExternalHandle) -> Rect {
        self.externals.get(&handle).map(|w| w.bounds).unwrap_or_default()
    }

    fn set_external_bounds(&mut self, handle: ExternalHandle, bounds: Rect) {
        if let Some(window) = self.externals.get_mut(&handle) {
            window.bounds = bounds;
        }
        self.ops.push(HostOp::SetExternalBounds { id: self.external_id(handle), bounds });
    }

    fn is_external_active(&self, handle: ExternalHandle) -> bool {
        self.externals.get(&handle).is_some_and(|w| w.active)
    }

    fn is_external_showing(&self, handle: ExternalHandle) -> bool {
        self.externals.get(&handle).is_some_and(|w| w.showing)
    }

    fn is_external_maximized(&self, handle: ExternalHandle) -> bool {
        self.externals.get(&handle).is_some_and(|w| w.maximized)
    }

    fn set_external_maximized(&mut self, handle: ExternalHandle, maximized: bool) {
        if let Some(window) = self.externals.get_mut(&handle) {
            window.maximized = maximized;
        }
        self.ops.push(HostOp::SetExternalMaximized { id: self.external_id(handle), maximized });
    }

    fn decorator_size(&self, _decorator: DecoratorHandle) -> Size { self.decorator_size }

    fn preferred_decorator_size(&self, _decorator: DecoratorHandle) -> Size { self.preferred_size }

    fn screens(&self) -> ScreenSet { ScreenSet::new(self.screens.clone()) }

    fn frame_of(&self, pane_id: &str) -> FrameId {
        self.frames
            .get(pane_id)
            .or_else(|| self.frames.get(DEFAULT_PANE_ID))
            .copied()
            .unwrap_or(FrameId(0))
    }

    fn frame_bounds(&self, _frame: FrameId) -> Rect { self.frame_bounds }

    fn create_stripe_button(&mut self, info: &WindowInfo) -> StripeButtonHandle {
        let handle = StripeButtonHandle(self.next());
        self.buttons.insert(handle, info.id.clone());
        self.ops.push(HostOp::CreateStripeButton {
            id: info.id.clone(),
            anchor: info.anchor,
            split: info.split,
        });
        handle
    }

    fn remove_stripe_button(&mut self, button: StripeButtonHandle) {
        if let Some(id) = self.buttons.remove(&button) {
            self.ops.push(HostOp::RemoveStripeButton { id });
        }
    }

    fn set_weight(&mut self, pane_id: &str, anchor: ToolWindowAnchor, weight: f32) {
        self.ops.push(HostOp::SetWeight { pane: pane_id.to_string(), anchor, weight });
    }

    fn set_side_weight(&mut self, pane_id: &str, id: &str, side_weight: f32) {
        self.ops.push(HostOp::SetSideWeight {
            pane: pane_id.to_string(),
            id: id.to_string(),
            side_weight,
        });
    }

    fn validate_pane(&mut self, pane_id: &str) {
        self.ops.push(HostOp::ValidatePane { pane: pane_id.to_string() });
    }

    fn repaint_frame(&mut self, frame: FrameId) { self.ops.push(HostOp::RepaintFrame { frame: frame.0 }); }

    fn request_focus(&mut self, id: &str) -> bool {
        self.ops.push(HostOp::RequestFocus { id: id.to_string() });
        if self.focus_transfers {
            self.focused = Some(id.to_string());
        }
        self.focus_transfers
    }

    fn has_focus(&self, id: &str) -> bool { self.focused.as_deref() == Some(id) }

    fn bring_to_front(&mut self, id: &str) { self.ops.push(HostOp::BringToFront { id: id.to_string() }); }

    fn activate_editor_component(&mut self) {
        self.focused = None;
        self.ops.push(HostOp::ActivateEditor);
    }

    fn is_application_active(&self) -> bool { self.app_active }

    fn set_stripes_overlaid(&mut self, overlaid: bool) {
        self.ops.push(HostOp::SetStripesOverlaid { overlaid });
    }

    fn is_headless(&self) -> bool { self.headless }
}
