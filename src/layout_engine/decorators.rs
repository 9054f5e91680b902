//! Attaching decorators to panes and placing floating or windowed ones on
//! screen.

use tracing::debug;

use super::entry::EntryKey;
use super::host::{DecoratorHandle, DecoratorHost, ExternalKind};
use super::manager::ToolWindowManager;
use crate::model::{ToolWindowType, WindowInfo};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::ScreenSet;

/// Where an external window goes and whether it still has to be centered
/// over its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExternalBounds {
    pub bounds: Rect,
    pub needs_centering: bool,
}

/// Stored bounds are kept when some of the title bar and a sensible portion
/// of the window are on screen.
pub fn is_valid_bounds(bounds: &Rect, screens: &ScreenSet) -> bool {
    let header_visible =
        screens.is_point_visible(bounds.top_left()) || screens.is_point_visible(bounds.top_right());
    !bounds.is_empty() && header_visible && screens.is_rect_visible(bounds)
}

pub fn compute_external_bounds(
    stored: Option<Rect>,
    screens: &ScreenSet,
    fit_screen: &Rect,
    current_size: Size,
    preferred_size: Size,
    default_origin: Point,
) -> ExternalBounds {
    match stored {
        Some(bounds) if is_valid_bounds(&bounds, screens) => {
            debug!(?bounds, "keeping stored bounds");
            ExternalBounds { bounds, needs_centering: false }
        }
        Some(bounds) if !bounds.is_empty() => {
            let bounds = bounds.translated_into(fit_screen);
            debug!(?bounds, "moved stored bounds onto the screen");
            ExternalBounds { bounds, needs_centering: true }
        }
        _ => {
            let size = if current_size.is_degenerate() {
                debug!(?current_size, ?preferred_size, "using preferred size");
                preferred_size
            } else {
                current_size
            };
            ExternalBounds {
                bounds: Rect::from_parts(default_origin, size),
                needs_centering: true,
            }
        }
    }
}

/// Ratio of `part` in `total`, nudged halfway towards the next pixel in
/// `direction` so that integer rounding on the way back does not drift.
pub fn get_adjusted_ratio(part: i32, total: i32, direction: i32) -> f32 {
    if total <= 0 {
        return 0.0;
    }
    let total = total as f32;
    let ratio = part as f32 / total;
    ratio + ((part + direction) as f32 / total - ratio) / 2.0
}

impl<H: DecoratorHost> ToolWindowManager<H> {
    pub(super) fn decorator_of(&mut self, key: EntryKey) -> DecoratorHandle {
        if let Some(decorator) = self.entries[key].decorator {
            return decorator;
        }
        let decorator = self.host.decorator(&self.entries[key].id);
        self.entries[key].decorator = Some(decorator);
        decorator
    }

    /// Saves the state of external windows into `info` and removes every
    /// decorator of the window. `info.visible` is left alone.
    pub(super) fn update_state_and_remove_decorator(
        &mut self,
        info: &mut WindowInfo,
        key: EntryKey,
        dirty: bool,
    ) {
        self.save_floating_or_windowed_state(info, key);
        self.remove_external_decorators(key);
        self.remove_internal_decorator(key, dirty);
    }

    pub(super) fn save_floating_or_windowed_state(&mut self, info: &mut WindowInfo, key: EntryKey) {
        let entry = &self.entries[key];
        if let Some(handle) = entry.floating {
            info.floating_bounds = Some(self.host.external_bounds(handle));
            info.active_on_start = self.host.is_external_active(handle);
            return;
        }
        if let Some(handle) = entry.windowed {
            info.active_on_start = self.host.is_external_active(handle);
            if self.host.is_external_showing(handle) {
                // maximized geometry is not the rectangle the user chose
                let maximized = self.host.is_external_maximized(handle);
                if maximized {
                    self.host.set_external_maximized(handle, false);
                }
                info.floating_bounds = Some(self.host.external_bounds(handle));
                info.maximized = maximized;
            }
        }
    }

    pub(super) fn remove_external_decorators(&mut self, key: EntryKey) {
        if let Some(handle) = self.entries[key].floating.take() {
            self.host.close_external(handle);
        }
        if let Some(handle) = self.entries[key].windowed.take() {
            self.host.close_external(handle);
        }
    }

    pub(super) fn remove_internal_decorator(&mut self, key: EntryKey, dirty: bool) {
        let entry = &mut self.entries[key];
        if let (Some(decorator), Some(attached)) = (entry.decorator, entry.attached.take()) {
            self.host.detach(decorator, &attached, dirty);
        }
    }

    pub(super) fn add_internal_decorator(&mut self, key: EntryKey, info: &WindowInfo, dirty: bool) {
        let decorator = self.decorator_of(key);
        self.host.attach(decorator, info, dirty);
        self.entries[key].attached = Some(info.clone());
    }

    /// Attaches the decorator the way `info.window_type` asks for.
    pub(super) fn do_show_window(&mut self, key: EntryKey, info: &WindowInfo, dirty: bool) {
        match info.window_type {
            ToolWindowType::Floating => self.add_floating_decorator(key, info),
            ToolWindowType::Windowed => self.add_windowed_decorator(key, info),
            ToolWindowType::Docked | ToolWindowType::Sliding => {
                self.add_internal_decorator(key, info, dirty)
            }
        }
    }

    fn add_floating_decorator(&mut self, key: EntryKey, info: &WindowInfo) {
        let decorator = self.decorator_of(key);
        let handle = self.host.open_external(ExternalKind::Floating, decorator, info);
        self.entries[key].floating = Some(handle);
        self.place_external(handle, decorator, info);
        self.host.show_external(handle, info.active_on_start);
    }

    fn add_windowed_decorator(&mut self, key: EntryKey, info: &WindowInfo) {
        if self.host.is_headless() {
            debug!(id = %info.id, "headless, not opening a windowed decorator");
            return;
        }
        let decorator = self.decorator_of(key);
        let handle = self.host.open_external(ExternalKind::Windowed, decorator, info);
        self.place_external(handle, decorator, info);
        self.entries[key].windowed = Some(handle);
        self.host.show_external(handle, info.active_on_start);
        if info.maximized {
            self.host.set_external_maximized(handle, true);
        }
    }

    fn place_external(
        &mut self,
        handle: super::host::ExternalHandle,
        decorator: DecoratorHandle,
        info: &WindowInfo,
    ) {
        let frame = self.host.frame_bounds(self.host.frame_of(&info.pane_id));
        let screens = self.host.screens();
        let fit_screen = screens.nearest(&frame).map_or(frame, |screen| screen.frame);
        let placed = compute_external_bounds(
            info.floating_bounds,
            &screens,
            &fit_screen,
            self.host.decorator_size(decorator),
            self.host.preferred_decorator_size(decorator),
            self.host.external_bounds(handle).origin(),
        );
        let bounds = if placed.needs_centering { placed.bounds.centered_in(&frame) } else { placed.bounds };
        debug!(id = %info.id, ?bounds, centered = placed.needs_centering, "external bounds");
        self.host.set_external_bounds(handle, bounds);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::screen::ScreenDescriptor;

    fn screens() -> ScreenSet {
        ScreenSet::new(vec![
            ScreenDescriptor::new(1, Rect::new(0, 0, 1920, 1080)),
            ScreenDescriptor::new(2, Rect::new(1920, 0, 1280, 1024)),
        ])
    }

    fn compute(stored: Option<Rect>) -> ExternalBounds {
        compute_external_bounds(
            stored,
            &screens(),
            &Rect::new(0, 0, 1920, 1080),
            Size::default(),
            Size::new(400, 300),
            Point::new(10, 10),
        )
    }

    #[test]
    fn valid_bounds_are_kept_verbatim() {
        let stored = Rect::new(2000, 100, 600, 400);
        assert_eq!(compute(Some(stored)), ExternalBounds { bounds: stored, needs_centering: false });
    }

    #[test]
    fn off_screen_bounds_are_translated_not_resized() {
        let placed = compute(Some(Rect::new(5000, 3000, 600, 400)));
        assert_eq!(placed.bounds, Rect::new(1320, 680, 600, 400));
        assert!(placed.needs_centering);
    }

    #[test]
    fn headerless_bounds_are_invalid() {
        // title bar above every screen, body visible
        let stored = Rect::new(100, -50, 600, 400);
        assert!(!is_valid_bounds(&stored, &screens()));
    }

    #[test]
    fn missing_bounds_use_preferred_size_at_default_origin() {
        assert_eq!(compute(None), ExternalBounds {
            bounds: Rect::new(10, 10, 400, 300),
            needs_centering: true,
        });
        let sized = compute_external_bounds(
            Some(Rect::new(0, 0, 0, 0)),
            &screens(),
            &Rect::new(0, 0, 1920, 1080),
            Size::new(250, 120),
            Size::new(400, 300),
            Point::ZERO,
        );
        assert_eq!(sized.bounds, Rect::new(0, 0, 250, 120));
    }

    #[test]
    fn computing_twice_does_not_drift() {
        for stored in [Rect::new(5000, 3000, 600, 400), Rect::new(300, 200, 640, 480)] {
            let once = compute(Some(stored)).bounds;
            let twice = compute(Some(once)).bounds;
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn adjusted_ratio_biases_towards_direction() {
        let r = get_adjusted_ratio(300, 1000, 1);
        assert!((r - 0.3005).abs() < 1e-6);
        let r = get_adjusted_ratio(300, 1000, -1);
        assert!((r - 0.2995).abs() < 1e-6);
        assert_eq!(get_adjusted_ratio(10, 0, 1), 0.0);
    }

    #[test]
    fn adjusted_ratio_converges() {
        let total = 1234;
        let mut ratio = get_adjusted_ratio(400, total, 1);
        for _ in 0..20 {
            let part = (ratio * total as f32) as i32;
            let next = get_adjusted_ratio(part, total, 1);
            assert!((next - ratio).abs() * total as f32 <= 1.0);
            ratio = next;
        }
    }
}
