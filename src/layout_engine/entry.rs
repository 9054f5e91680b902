use slotmap::new_key_type;

use super::host::{DecoratorHandle, ExternalHandle, StripeButtonHandle};
use crate::model::WindowInfo;

new_key_type! {
    pub struct EntryKey;
}

/// Runtime state of a registered tool window. Handles belong to the host;
/// the engine only keeps them to hand them back.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    /// Read-only snapshot; the layout holds the authoritative copy.
    pub info: WindowInfo,
    pub available: bool,
    pub has_content: bool,
    pub stripe_button: Option<StripeButtonHandle>,
    pub decorator: Option<DecoratorHandle>,
    /// Placement the decorator was attached with, while it is in a pane.
    pub attached: Option<WindowInfo>,
    pub floating: Option<ExternalHandle>,
    pub windowed: Option<ExternalHandle>,
}

impl Entry {
    pub fn new(info: WindowInfo, available: bool, has_content: bool) -> Self {
        Self {
            id: info.id.clone(),
            info,
            available,
            has_content,
            stripe_button: None,
            decorator: None,
            attached: None,
            floating: None,
            windowed: None,
        }
    }

    pub fn external(&self) -> Option<ExternalHandle> { self.windowed.or(self.floating) }
}
