use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::sys::geometry::Rect;

pub const DEFAULT_PANE_ID: &str = "main";
pub const DEFAULT_WEIGHT: f32 = 0.33;
pub const DEFAULT_SIDE_WEIGHT: f32 = 0.5;
pub const UNASSIGNED_ORDER: i32 = -1;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumIter, EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolWindowAnchor {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

impl ToolWindowAnchor {
    /// Top and bottom windows are sized by height.
    pub fn is_horizontal(self) -> bool {
        matches!(self, ToolWindowAnchor::Top | ToolWindowAnchor::Bottom)
    }

    /// Left and right split windows are stacked on top of each other.
    pub fn is_split_vertically(self) -> bool { !self.is_horizontal() }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolWindowType {
    #[default]
    Docked,
    Sliding,
    Floating,
    Windowed,
}

impl ToolWindowType {
    /// Docked and sliding windows live inside the frame and compete for slots.
    pub fn is_internal(self) -> bool {
        matches!(self, ToolWindowType::Docked | ToolWindowType::Sliding)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentUiType {
    #[default]
    Tabbed,
    Combo,
}

/// Placement of one tool window within a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot<'a> {
    pub pane_id: &'a str,
    pub anchor: ToolWindowAnchor,
    pub split: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    pub id: String,
    pub pane_id: String,
    pub anchor: ToolWindowAnchor,
    #[serde(rename = "type")]
    pub window_type: ToolWindowType,
    /// Last docked or sliding type, used when returning from an external window.
    pub internal_type: ToolWindowType,
    pub visible: bool,
    pub active_on_start: bool,
    pub auto_hide: bool,
    pub split: bool,
    pub order: i32,
    pub weight: f32,
    pub side_weight: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_bounds: Option<Rect>,
    pub maximized: bool,
    pub content_ui_type: ContentUiType,
    pub show_stripe_button: bool,
    #[serde(skip)]
    pub from_persistent_settings: bool,
}

impl Default for WindowInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            pane_id: DEFAULT_PANE_ID.to_string(),
            anchor: ToolWindowAnchor::Left,
            window_type: ToolWindowType::Docked,
            internal_type: ToolWindowType::Docked,
            visible: false,
            active_on_start: false,
            auto_hide: false,
            split: false,
            order: UNASSIGNED_ORDER,
            weight: DEFAULT_WEIGHT,
            side_weight: DEFAULT_SIDE_WEIGHT,
            floating_bounds: None,
            maximized: false,
            content_ui_type: ContentUiType::Tabbed,
            show_stripe_button: true,
            from_persistent_settings: false,
        }
    }
}

/// Equality covers the persisted placement only; where the info was loaded
/// from does not make two placements differ.
impl PartialEq for WindowInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.pane_id == other.pane_id
            && self.anchor == other.anchor
            && self.window_type == other.window_type
            && self.internal_type == other.internal_type
            && self.visible == other.visible
            && self.active_on_start == other.active_on_start
            && self.auto_hide == other.auto_hide
            && self.split == other.split
            && self.order == other.order
            && self.weight == other.weight
            && self.side_weight == other.side_weight
            && self.floating_bounds == other.floating_bounds
            && self.maximized == other.maximized
            && self.content_ui_type == other.content_ui_type
            && self.show_stripe_button == other.show_stripe_button
    }
}

impl WindowInfo {
    pub fn new(id: impl Into<String>, anchor: ToolWindowAnchor) -> Self {
        Self { id: id.into(), anchor, ..Self::default() }
    }

    pub fn with_split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_type(mut self, window_type: ToolWindowType) -> Self {
        self.window_type = window_type;
        if window_type.is_internal() {
            self.internal_type = window_type;
        }
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn is_docked(&self) -> bool { self.window_type == ToolWindowType::Docked }

    pub fn is_external(&self) -> bool { !self.window_type.is_internal() }

    pub fn slot(&self) -> Slot<'_> {
        Slot {
            pane_id: &self.pane_id,
            anchor: self.anchor,
            split: self.split,
        }
    }

    /// Whether this window currently claims its slot.
    pub fn occupies_slot(&self) -> bool { self.visible && self.window_type.is_internal() }

    pub fn has_order(&self) -> bool { self.order != UNASSIGNED_ORDER }
}
