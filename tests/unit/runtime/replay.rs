use super::*;
use crate::decode::element_type::ElementType;
use crate::engine::fixture::SimNode;

fn app() -> SimApp {
    let mut app = SimApp::default();
    app.layout = vec![SimNode::new("layout-/", ElementType::Layout)];
    app.routes.insert(
        "/root".to_string(),
        vec![SimNode::new("page", ElementType::Page)
            .with_child(SimNode::new("count", ElementType::Text).with_text("0"))
            .with_child(SimNode::new("inc", ElementType::Button).with_text("+"))],
    );
    app.routes.insert(
        "/docs".to_string(),
        vec![SimNode::new("docs-title", ElementType::Header).with_text("Docs")],
    );
    app
}

#[test]
fn scripted_run_ends_in_the_expected_state() {
    let mut a = app();
    a.script = vec![
        SimStep::Click("inc".to_string()),
        SimStep::SetText {
            id: "count".to_string(),
            text: "1".to_string(),
        },
        SimStep::Frame,
        SimStep::Navigate("/docs".to_string()),
        SimStep::Frame,
    ];
    let mut replay = Replay::new(a, BridgeOpts::default()).unwrap();
    replay.run_script().unwrap();

    let summary = replay.summary();
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.path, "/docs");
    assert_eq!(summary.route, "/docs");
    assert_eq!(summary.registered, 2);
    assert!(!summary.halted);
    let ids: Vec<&str> = summary.tree.iter().filter_map(|n| n.id.as_deref()).collect();
    assert_eq!(ids, ["layout-/", "docs-title"]);
}

#[test]
fn script_is_consumed_once() {
    let mut a = app();
    a.script = vec![SimStep::Frame];
    let mut replay = Replay::new(a, BridgeOpts::default()).unwrap();
    replay.run_script().unwrap();
    replay.run_script().unwrap();
    assert_eq!(replay.summary().frames, 1);
}

#[test]
fn initial_route_is_rendered_first() {
    let mut a = app();
    a.initial_route = "/docs".to_string();
    let replay = Replay::new(a, BridgeOpts::default()).unwrap();
    let b = replay.bridge();
    assert_eq!(b.current_path(), "/docs");
    assert!(b.dom().element_by_id("docs-title").is_some());
    assert!(b.dom().element_by_id("page").is_none());
}

#[test]
fn run_frames_advances_the_clock() {
    let mut replay = Replay::new(app(), BridgeOpts::default()).unwrap();
    assert_eq!(replay.run_frames(3), FrameOutcome::Idle);
    replay
        .bridge_mut()
        .engine_mut()
        .set_text("count", "5")
        .unwrap();
    assert!(matches!(replay.frame(), FrameOutcome::Rendered(_)));
    assert_eq!(replay.summary().frames, 4);
}

#[test]
fn run_frames_stops_once_halted() {
    let opts = BridgeOpts {
        max_consecutive_failures: Some(2),
        ..BridgeOpts::default()
    };
    let mut replay = Replay::new(app(), opts).unwrap();
    let engine = replay.bridge_mut().engine_mut();
    engine.mark_dirty("count").unwrap();
    engine.set_memory_fault(true);
    assert_eq!(replay.run_frames(10), FrameOutcome::Halted);
    let summary = replay.summary();
    assert_eq!(summary.frames, 2);
    assert!(summary.halted);
}

#[test]
fn unknown_ids_in_a_script_fail() {
    let mut a = app();
    a.script = vec![SimStep::Remove("nope".to_string())];
    let mut replay = Replay::new(a, BridgeOpts::default()).unwrap();
    assert!(replay.run_script().is_err());
}

#[test]
fn invalid_fixtures_are_rejected() {
    let mut a = app();
    a.layout.push(SimNode::new("page", ElementType::Flexbox));
    assert!(Replay::new(a, BridgeOpts::default()).is_err());
}
