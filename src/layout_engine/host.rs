//! The seam between the placement engine and whatever draws the windows.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::model::{ToolWindowAnchor, WindowInfo};
use crate::sys::geometry::{Rect, Size};
use crate::sys::screen::ScreenSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecoratorHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StripeButtonHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ExternalKind {
    Floating,
    Windowed,
}

/// Render and focus primitives the engine drives.
///
/// `dirty` on attach/detach asks the host to apply the structural change but
/// defer validation and repainting until [`DecoratorHost::validate_pane`] or
/// [`DecoratorHost::repaint_frame`] is called.
pub trait DecoratorHost {
    /// Returns the decorator of `id`, creating it on first use.
    fn decorator(&mut self, id: &str) -> DecoratorHandle;
    fn attach(&mut self, decorator: DecoratorHandle, info: &WindowInfo, dirty: bool);
    fn detach(&mut self, decorator: DecoratorHandle, info: &WindowInfo, dirty: bool);

    fn open_external(
        &mut self,
        kind: ExternalKind,
        decorator: DecoratorHandle,
        info: &WindowInfo,
    ) -> ExternalHandle;
    fn show_external(&mut self, handle: ExternalHandle, request_focus: bool);
    fn close_external(&mut self, handle: ExternalHandle);
    fn external_bounds(&self, handle: ExternalHandle) -> Rect;
    fn set_external_bounds(&mut self, handle: ExternalHandle, bounds: Rect);
    fn is_external_active(&self, handle: ExternalHandle) -> bool;
    fn is_external_showing(&self, handle: ExternalHandle) -> bool;
    fn is_external_maximized(&self, handle: ExternalHandle) -> bool;
    fn set_external_maximized(&mut self, handle: ExternalHandle, maximized: bool);

    fn decorator_size(&self, decorator: DecoratorHandle) -> Size;
    fn preferred_decorator_size(&self, decorator: DecoratorHandle) -> Size;
    fn screens(&self) -> ScreenSet;
    fn frame_of(&self, pane_id: &str) -> FrameId;
    fn frame_bounds(&self, frame: FrameId) -> Rect;

    fn create_stripe_button(&mut self, info: &WindowInfo) -> StripeButtonHandle;
    fn remove_stripe_button(&mut self, button: StripeButtonHandle);

    fn set_weight(&mut self, pane_id: &str, anchor: ToolWindowAnchor, weight: f32);
    fn set_side_weight(&mut self, pane_id: &str, id: &str, side_weight: f32);
    fn validate_pane(&mut self, pane_id: &str);
    fn repaint_frame(&mut self, frame: FrameId);

    /// Returns true when focus was actually transferred into the window.
    fn request_focus(&mut self, id: &str) -> bool;
    fn has_focus(&self, id: &str) -> bool;
    fn bring_to_front(&mut self, id: &str);
    fn activate_editor_component(&mut self);
    fn is_application_active(&self) -> bool;
    fn set_stripes_overlaid(&mut self, overlaid: bool);

    /// Headless hosts never open windowed decorators.
    fn is_headless(&self) -> bool;
}

/// Geometry a host reports when a decorator was moved or resized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoratorGeometry {
    pub showing: bool,
    pub decorator: Size,
    /// Size of the pane's root, the reference for docked weights.
    pub root_pane: Size,
    /// Present when the decorator shares its anchor with a split window.
    pub splitter: Option<SplitterGeometry>,
    /// False while the editor area is missing or hidden, which makes the
    /// docking area's size meaningless.
    pub size_trusted: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitterGeometry {
    pub size: Size,
    pub divider_width: i32,
    /// The decorator is the splitter's second component.
    pub is_second: bool,
}
