mod decorators;
mod entry;
mod error;
mod events;
pub mod host;
mod invariants;
mod key_chord;
mod manager;
mod placement;
mod reconcile;
pub mod recording_host;

pub use decorators::{ExternalBounds, compute_external_bounds, get_adjusted_ratio, is_valid_bounds};
pub use entry::{Entry, EntryKey};
pub use error::EngineError;
pub use events::{ToolWindowManagerEvent, ToolWindowManagerEventType, ToolWindowManagerListener};
pub use host::{
    DecoratorGeometry, DecoratorHandle, DecoratorHost, ExternalHandle, ExternalKind, FrameId,
    SplitterGeometry, StripeButtonHandle,
};
pub use invariants::InvariantViolation;
pub use key_chord::{KeyChordDetector, KeyEvent, KeyState, OverlayChange, resolve_activation_mask};
pub use manager::{LayoutScheduler, LayoutSnapshot, RegisterRequest, ToolWindowManager};
pub use placement::HideOptions;
pub use recording_host::{HostOp, RecordingHost};
