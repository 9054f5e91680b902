use std::time::Duration;

use dockyard::common::config::EngineSettings;
use dockyard::layout_engine::{
    DecoratorGeometry, HideOptions, HostOp, RecordingHost, RegisterRequest, ToolWindowManager,
};
use dockyard::model::{
    DEFAULT_PANE_ID, DesktopLayout, LayoutStore, RonFileStore, ToolWindowAnchor, ToolWindowType,
    WindowInfo,
};
use dockyard::sys::geometry::Size;
use pretty_assertions::assert_eq;

fn engine(windows: &[(&str, ToolWindowAnchor)]) -> ToolWindowManager<RecordingHost> {
    let settings = EngineSettings { check_invariants: true, ..Default::default() };
    let mut m = ToolWindowManager::new(RecordingHost::new(), settings);
    for (id, anchor) in windows {
        m.register(RegisterRequest::new(*id, *anchor)).unwrap();
    }
    m
}

fn attach_index(ops: &[HostOp], id: &str) -> Option<usize> {
    ops.iter().position(|op| matches!(op, HostOp::Attach { id: a, .. } if a == id))
}

fn detach_index(ops: &[HostOp], id: &str) -> Option<usize> {
    ops.iter().position(|op| matches!(op, HostOp::Detach { id: d, .. } if d == id))
}

fn assert_slots_exclusive(m: &ToolWindowManager<RecordingHost>) {
    let layout = m.snapshot().get();
    assert!(layout.violations().is_empty(), "{:?}", layout.violations());
    assert!(m.invariant_violations().is_empty(), "{:?}", m.invariant_violations());
}

#[test_log::test]
fn evicted_window_comes_back_when_evictor_hides() {
    let mut m = engine(&[("Project", ToolWindowAnchor::Left), ("Commit", ToolWindowAnchor::Left)]);
    m.show("Project").unwrap();
    m.host_mut().take_ops();

    m.show("Commit").unwrap();
    assert!(!m.is_visible("Project"));
    assert!(m.is_visible("Commit"));
    assert_eq!(m.side_stack_len(ToolWindowAnchor::Left), 1);
    let ops = m.host_mut().take_ops();
    assert!(detach_index(&ops, "Project").unwrap() < attach_index(&ops, "Commit").unwrap());

    m.hide("Commit").unwrap();
    assert!(m.is_visible("Project"));
    assert!(!m.is_visible("Commit"));
    assert_eq!(m.side_stack_len(ToolWindowAnchor::Left), 0);
    assert_slots_exclusive(&m);
}

#[test_log::test]
fn moving_terminal_to_the_bottom_evicts_run() {
    let mut m = engine(&[("Terminal", ToolWindowAnchor::Right), ("Run", ToolWindowAnchor::Bottom)]);
    m.show("Terminal").unwrap();
    m.show("Run").unwrap();
    m.host_mut().take_ops();

    m.set_anchor("Terminal", DEFAULT_PANE_ID, ToolWindowAnchor::Bottom, -1).unwrap();

    let info = m.window_info("Terminal").unwrap();
    assert_eq!(info.anchor, ToolWindowAnchor::Bottom);
    assert!(info.visible);
    assert!(!m.is_visible("Run"));
    assert_eq!(m.side_stack_len(ToolWindowAnchor::Bottom), 1);

    let ops = m.host().ops();
    let detached = detach_index(ops, "Terminal").unwrap();
    assert_eq!(ops[detached], HostOp::Detach {
        id: "Terminal".into(),
        pane: DEFAULT_PANE_ID.into(),
        anchor: ToolWindowAnchor::Right,
        split: false,
        dirty: true,
    });
    assert!(detached < attach_index(ops, "Terminal").unwrap());
    assert!(matches!(ops.last(), Some(HostOp::RepaintFrame { .. })));
    assert_slots_exclusive(&m);

    m.hide("Terminal").unwrap();
    assert!(m.is_visible("Run"));
}

#[test_log::test]
fn weight_only_layout_change_does_not_reattach() {
    let mut m = engine(&[("Project", ToolWindowAnchor::Left), ("Terminal", ToolWindowAnchor::Bottom)]);
    m.show("Project").unwrap();
    m.show("Terminal").unwrap();
    m.host_mut().take_ops();

    let mut layout = m.layout().clone();
    layout.get_info_mut("Terminal").unwrap().weight = 0.4;
    m.set_layout(layout).unwrap();

    let ops = m.host().ops();
    assert!(!ops.iter().any(|op| matches!(
        op,
        HostOp::Attach { .. } | HostOp::Detach { .. } | HostOp::OpenExternal { .. }
    )));
    assert!(ops.contains(&HostOp::SetWeight {
        pane: DEFAULT_PANE_ID.into(),
        anchor: ToolWindowAnchor::Bottom,
        weight: 0.4,
    }));
    assert!(m.is_visible("Project"));
    assert_eq!(m.layout().get_info("Terminal").unwrap().weight, 0.4);
}

#[test_log::test]
fn reapplying_a_layout_is_a_no_op() {
    let mut m = engine(&[("Project", ToolWindowAnchor::Left), ("Find", ToolWindowAnchor::Bottom)]);
    m.set_type("Find", ToolWindowType::Floating).unwrap();
    m.show("Project").unwrap();
    m.show("Find").unwrap();
    let before = m.layout().clone();
    m.host_mut().take_ops();

    m.set_layout(before.clone()).unwrap();
    assert!(m.host().ops().is_empty());
    assert_eq!(m.layout(), &before);
}

#[test_log::test]
fn repeated_resizes_settle_on_one_width() {
    let mut m = engine(&[("Project", ToolWindowAnchor::Left)]);
    m.show("Project").unwrap();
    let root = Size::new(1237, 900);
    let mut width = 401;
    for _ in 0..10 {
        let geometry = DecoratorGeometry {
            showing: true,
            decorator: Size::new(width, 900),
            root_pane: root,
            splitter: None,
            size_trusted: true,
        };
        m.moved_or_resized("Project", &geometry).unwrap();
        let weight = m.layout().get_info("Project").unwrap().weight;
        let laid_out = (weight * root.width as f32) as i32;
        assert_eq!(laid_out, width);
        width = laid_out;
    }
}

#[test_log::test]
fn floating_bounds_survive_hide_and_show() {
    let mut m = engine(&[("Find", ToolWindowAnchor::Bottom)]);
    m.set_type("Find", ToolWindowType::Floating).unwrap();
    m.show("Find").unwrap();
    let first = m.host().external_window("Find").unwrap().bounds;

    m.hide("Find").unwrap();
    m.show("Find").unwrap();
    assert_eq!(m.host().external_window("Find").unwrap().bounds, first);
    assert_eq!(m.layout().get_info("Find").unwrap().floating_bounds, Some(first));
}

#[test_log::test]
fn slots_stay_exclusive_through_a_session() {
    let mut m = engine(&[
        ("Project", ToolWindowAnchor::Left),
        ("Commit", ToolWindowAnchor::Left),
        ("Structure", ToolWindowAnchor::Left),
        ("Terminal", ToolWindowAnchor::Bottom),
        ("Run", ToolWindowAnchor::Bottom),
        ("Find", ToolWindowAnchor::Bottom),
    ]);
    m.set_side_tool("Structure", true).unwrap();

    m.show("Project").unwrap();
    assert_slots_exclusive(&m);
    m.show("Structure").unwrap();
    assert_slots_exclusive(&m);
    m.activate("Commit", true).unwrap();
    assert_slots_exclusive(&m);
    m.show("Terminal").unwrap();
    m.show("Run").unwrap();
    assert_slots_exclusive(&m);
    m.set_type("Find", ToolWindowType::Floating).unwrap();
    m.show("Find").unwrap();
    assert_slots_exclusive(&m);
    m.set_type("Find", ToolWindowType::Docked).unwrap();
    assert_slots_exclusive(&m);
    m.set_anchor("Terminal", DEFAULT_PANE_ID, ToolWindowAnchor::Left, 0).unwrap();
    assert_slots_exclusive(&m);
    m.set_side_tool("Commit", true).unwrap();
    assert_slots_exclusive(&m);
    m.hide_with("Structure", HideOptions { hide_side: true, ..Default::default() }).unwrap();
    assert_slots_exclusive(&m);
    m.unregister("Run");
    assert_slots_exclusive(&m);

    assert!(m.docked_at(DEFAULT_PANE_ID, ToolWindowAnchor::Left, false).len() <= 1);
    assert!(m.docked_at(DEFAULT_PANE_ID, ToolWindowAnchor::Left, true).len() <= 1);
}

#[test_log::test]
fn snapshot_is_readable_from_another_thread() {
    let mut m = engine(&[("Project", ToolWindowAnchor::Left), ("Commit", ToolWindowAnchor::Left)]);
    let snapshot = m.snapshot();
    m.show("Commit").unwrap();

    let seen = std::thread::spawn(move || {
        snapshot.visible_in_slot(DEFAULT_PANE_ID, ToolWindowAnchor::Left, false)
    })
    .join()
    .unwrap();
    assert_eq!(seen.as_deref(), Some("Commit"));
}

#[tokio::test(start_paused = true)]
async fn only_the_newest_scheduled_layout_is_applied() {
    let mut m = engine(&[("Project", ToolWindowAnchor::Left), ("Commit", ToolWindowAnchor::Left)]);
    let scheduler = m.scheduler();

    let mut project = m.layout().clone();
    project.get_info_mut("Project").unwrap().visible = true;
    let mut commit = m.layout().clone();
    commit.get_info_mut("Commit").unwrap().visible = true;

    scheduler.schedule(project, Duration::from_millis(100));
    scheduler.schedule(commit, Duration::from_millis(100));
    assert!(!m.apply_scheduled_layouts().unwrap());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(m.apply_scheduled_layouts().unwrap());
    assert!(m.is_visible("Commit"));
    assert!(!m.is_visible("Project"));
}

#[test_log::test]
fn layout_survives_a_restart_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = RonFileStore::new(dir.path().join("layouts").join("default.ron"));

    let mut first = engine(&[("Project", ToolWindowAnchor::Left), ("Terminal", ToolWindowAnchor::Bottom)]);
    first.show("Terminal").unwrap();
    first.set_anchor("Project", DEFAULT_PANE_ID, ToolWindowAnchor::Right, -1).unwrap();
    first.save_to(&store).unwrap();
    let saved = first.layout().clone();

    let mut second = ToolWindowManager::new(RecordingHost::new(), EngineSettings::default());
    assert!(second.load_from(&store).unwrap());
    second.register(RegisterRequest::new("Project", ToolWindowAnchor::Left)).unwrap();
    second.register(RegisterRequest::new("Terminal", ToolWindowAnchor::Bottom)).unwrap();

    assert_eq!(second.layout(), &saved);
    assert!(second.is_visible("Terminal"));
    assert_eq!(second.window_info("Project").unwrap().anchor, ToolWindowAnchor::Right);
    assert_eq!(store.load().unwrap(), Some(saved));
}

#[test_log::test]
fn missing_store_file_leaves_the_engine_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = RonFileStore::new(dir.path().join("absent.ron"));
    let mut m = engine(&[("Project", ToolWindowAnchor::Left)]);
    let before: DesktopLayout = m.layout().clone();
    assert!(!m.load_from(&store).unwrap());
    assert_eq!(m.layout(), &before);
    assert_eq!(before.get_info("Project").map(WindowInfo::has_order), Some(true));
}
