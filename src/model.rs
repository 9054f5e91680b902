pub mod layout;
pub mod stacks;
pub mod store;
pub mod window_info;

pub use layout::{DesktopLayout, LayoutViolation};
pub use stacks::{ActiveStack, SideStack};
pub use store::{LayoutStore, MemoryStore, RonFileStore, StoreError};
pub use window_info::{
    ContentUiType, DEFAULT_PANE_ID, Slot, ToolWindowAnchor, ToolWindowType, WindowInfo,
};
