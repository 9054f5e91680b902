use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sys::geometry::{Point, Rect};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ScreenId(u32);

impl ScreenId {
    pub fn new(id: u32) -> Self { ScreenId(id) }

    pub fn as_u32(&self) -> u32 { self.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDescriptor {
    pub id: ScreenId,
    /// Usable area of the screen (menu bars and docks excluded).
    pub frame: Rect,
    #[serde(default)]
    pub name: Option<String>,
}

impl ScreenDescriptor {
    pub fn new(id: u32, frame: Rect) -> Self {
        Self { id: ScreenId::new(id), frame, name: None }
    }
}

/// Fraction of a window's area that has to be on one screen for the window to
/// count as visible there.
pub const MIN_VISIBLE_FRACTION: f64 = 0.1;

/// The set of screens a host reports, main screen first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenSet {
    screens: Vec<ScreenDescriptor>,
}

impl ScreenSet {
    /// The screen whose frame starts at the origin is treated as the main
    /// screen and moved to the front; the rest keep their position order.
    /// Note that there may be no screens.
    pub fn new(screens: Vec<ScreenDescriptor>) -> Self {
        if screens.is_empty() {
            return Self { screens };
        }
        let mut screens = order_screens_by_position(screens);
        if let Some(main_idx) = screens.iter().position(|s| s.frame.origin() == Point::ZERO) {
            let main = screens.remove(main_idx);
            screens.insert(0, main);
        } else {
            warn!("Could not find main screen. screens={screens:?}");
        }
        debug!("screens={screens:?}");
        Self { screens }
    }

    pub fn is_empty(&self) -> bool { self.screens.is_empty() }

    pub fn main(&self) -> Option<&ScreenDescriptor> { self.screens.first() }

    pub fn iter(&self) -> impl Iterator<Item = &ScreenDescriptor> { self.screens.iter() }

    pub fn is_point_visible(&self, point: Point) -> bool {
        self.screens.iter().any(|s| s.frame.contains(point))
    }

    /// Whether a sensible portion of `rect` lies on a single screen.
    pub fn is_rect_visible(&self, rect: &Rect) -> bool {
        if rect.is_empty() {
            return false;
        }
        let total = rect.area() as f64;
        self.screens.iter().any(|s| {
            s.frame
                .intersection(rect)
                .is_some_and(|i| i.area() as f64 / total > MIN_VISIBLE_FRACTION)
        })
    }

    /// The screen whose center is closest to the center of `rect`.
    pub fn nearest(&self, rect: &Rect) -> Option<&ScreenDescriptor> {
        let center = rect.center();
        self.screens.iter().min_by_key(|s| s.frame.distance_sq_to(center))
    }
}

pub fn order_screens_by_position(
    screens: impl IntoIterator<Item = ScreenDescriptor>,
) -> Vec<ScreenDescriptor> {
    let mut screens: Vec<_> = screens.into_iter().collect();

    // left-to-right, then top-to-bottom.
    screens.sort_by(|a, b| {
        let (a, b) = (a.frame.center(), b.frame.center());
        let x_order = a.x.cmp(&b.x);
        if x_order == Ordering::Equal {
            a.y.cmp(&b.y)
        } else {
            x_order
        }
    });

    screens
}
