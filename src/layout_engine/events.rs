use serde::Serialize;
use strum::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ToolWindowManagerEventType {
    RegisterToolWindow,
    UnregisterToolWindow,
    ShowToolWindow,
    ToolWindowShown,
    HideToolWindow,
    ActivateToolWindow,
    SetToolWindowAnchor,
    SetToolWindowType,
    SetSideTool,
    SetSideToolAndAnchor,
    SetToolWindowAutoHide,
    SetContentUiType,
    SetShowStripeButton,
    ToolWindowAvailable,
    ToolWindowUnavailable,
    MovedOrResized,
    SetLayout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolWindowManagerEvent {
    pub kind: ToolWindowManagerEventType,
    /// `None` for whole-layout events.
    pub id: Option<String>,
}

impl ToolWindowManagerEvent {
    pub fn new(kind: ToolWindowManagerEventType, id: Option<&str>) -> Self {
        Self { kind, id: id.map(str::to_string) }
    }
}

pub trait ToolWindowManagerListener {
    fn on_event(&mut self, event: &ToolWindowManagerEvent);
}

impl<F> ToolWindowManagerListener for F
where F: FnMut(&ToolWindowManagerEvent)
{
    fn on_event(&mut self, event: &ToolWindowManagerEvent) { self(event) }
}
