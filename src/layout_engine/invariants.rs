use tracing::error;

use super::host::DecoratorHost;
use super::manager::ToolWindowManager;
use crate::model::{LayoutViolation, ToolWindowType};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("visible {kind} window {id} has no decorator")]
    MissingDecorator { id: String, kind: ToolWindowType },
    #[error("window {id} is visible in the engine but hidden in the layout")]
    HiddenInLayout { id: String },
    #[error(transparent)]
    Layout(#[from] LayoutViolation),
}

impl<H: DecoratorHost> ToolWindowManager<H> {
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        let headless = self.host.is_headless();
        let mut violations = Vec::new();
        for entry in self.entries.values() {
            if !entry.info.visible {
                continue;
            }
            let missing = match entry.info.window_type {
                ToolWindowType::Floating => entry.floating.is_none(),
                ToolWindowType::Windowed => !headless && entry.windowed.is_none(),
                ToolWindowType::Docked | ToolWindowType::Sliding => false,
            };
            if missing {
                violations.push(InvariantViolation::MissingDecorator {
                    id: entry.id.clone(),
                    kind: entry.info.window_type,
                });
            }
            if self.layout.get_info(&entry.id).is_some_and(|info| !info.visible) {
                violations.push(InvariantViolation::HiddenInLayout { id: entry.id.clone() });
            }
        }
        violations.extend(self.layout.violations().into_iter().map(InvariantViolation::from));
        violations
    }

    /// Internal diagnostics only, never surfaced to users.
    pub(super) fn check_invariants(&self) {
        if !self.settings.check_invariants {
            return;
        }
        for violation in self.invariant_violations() {
            error!(%violation, "tool window invariant violated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::EngineSettings;
    use crate::layout_engine::manager::RegisterRequest;
    use crate::layout_engine::recording_host::RecordingHost;
    use crate::model::{DesktopLayout, ToolWindowAnchor, WindowInfo};

    fn checked() -> EngineSettings { EngineSettings { check_invariants: true, ..Default::default() } }

    #[test_log::test]
    fn consistent_engine_has_no_violations() {
        let mut m = ToolWindowManager::new(RecordingHost::new(), checked());
        m.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
        m.register(RegisterRequest::new("Find", ToolWindowAnchor::Bottom)).unwrap();
        m.set_type("Find", ToolWindowType::Floating).unwrap();
        m.show("Project").unwrap();
        m.show("Find").unwrap();
        assert!(m.invariant_violations().is_empty());
    }

    #[test_log::test]
    fn layout_violations_are_reported() {
        let mut m = ToolWindowManager::new(RecordingHost::new(), checked());
        m.set_layout_on_init(DesktopLayout::from_infos([
            WindowInfo::new("Project", ToolWindowAnchor::Left).with_order(0).with_visible(true),
            WindowInfo::new("Commit", ToolWindowAnchor::Left).with_order(0).with_visible(true),
        ]))
        .unwrap();
        let violations = m.invariant_violations();
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], InvariantViolation::Layout(LayoutViolation::DuplicateOrder { .. })));
        assert!(matches!(violations[1], InvariantViolation::Layout(LayoutViolation::SharedSlot { .. })));
    }
}
