use super::*;
use crate::decode::element_type::ElementType;
use crate::dom::LiveTree;
use crate::dom::virtual_dom::VirtualDom;
use crate::engine::Engine;
use crate::engine::fixture::{SimApp, SimNode};
use crate::engine::sim::{ButtonArg, EngineCall, SimEngine};
use crate::foundation::core::Span;
use crate::host::calls::HostCall;

fn app() -> SimApp {
    let mut link = SimNode::new("to-docs", ElementType::Link).with_text("Docs");
    link.href = "/docs".to_string();
    let mut open = SimNode::new("open", ElementType::DialogShow).with_text("Open");
    open.dialog_id = "dlg".to_string();
    open.btn_id = 7;
    let mut toast = SimNode::new("toast", ElementType::Text).with_text("saved");
    toast.exit_animation = Some("fade".to_string());

    let mut app = SimApp::default();
    app.layout = vec![SimNode::new("layout-/", ElementType::Layout).with_child(link)];
    app.routes.insert(
        "/root".to_string(),
        vec![
            SimNode::new("page", ElementType::Page)
                .with_child(SimNode::new("inc", ElementType::Button).with_text("+"))
                .with_child(SimNode::new("count", ElementType::Text).with_text("0"))
                .with_child(open)
                .with_child(SimNode::new("dlg", ElementType::Dialog))
                .with_child(toast),
        ],
    );
    app.routes.insert(
        "/docs".to_string(),
        vec![SimNode::new("docs-page", ElementType::Page)
            .with_child(SimNode::new("docs-title", ElementType::Header).with_text("Docs"))],
    );
    app
}

fn bridge() -> Bridge<SimEngine, VirtualDom> {
    Bridge::init(SimEngine::new(app()), VirtualDom::new(), BridgeOpts::default()).unwrap()
}

fn span(b: &mut Bridge<SimEngine, VirtualDom>, s: &str) -> Span {
    let ptr = b.engine.alloc_string(s.as_bytes());
    Span::new(ptr, s.len() as u32)
}

#[test]
fn init_renders_the_current_route() {
    let b = bridge();
    let calls = b.engine().calls();
    assert_eq!(
        calls.first(),
        Some(&EngineCall::Instantiate {
            width: 1280,
            height: 720
        })
    );
    assert!(calls.contains(&EngineCall::RenderCommands("/root".to_string())));
    assert!(calls.contains(&EngineCall::PendingClassesToAdd));
    assert!(b.dom().element_by_id("count").is_some());
    assert!(b.dom().element_by_id("docs-page").is_none());
    assert_eq!(b.reconciler().registry().len(), 8);
    assert!(!b.engine().should_rerender());
}

#[test]
fn init_fails_on_an_uninitialized_engine() {
    let err = Bridge::init(
        SimEngine::uninitialized(app()),
        VirtualDom::new(),
        BridgeOpts::default(),
    )
    .err()
    .unwrap();
    assert!(err.to_string().starts_with("descriptor error:"));
}

#[test]
fn keyframes_are_installed_at_init() {
    let mut a = app();
    a.keyframes = vec!["@keyframes fade { to { opacity: 0; } }".to_string()];
    let b = Bridge::init(SimEngine::new(a), VirtualDom::new(), BridgeOpts::default()).unwrap();
    assert_eq!(b.dom().rules()[0], "@keyframes fade { to { opacity: 0; } }");
}

#[test]
fn idle_frames_do_not_touch_the_tree() {
    let mut b = bridge();
    let before = b.dom().mutation_count();
    assert_eq!(b.frame(16), FrameOutcome::Idle);
    assert_eq!(b.frame(32), FrameOutcome::Idle);
    assert_eq!(b.dom().mutation_count(), before);
}

#[test]
fn grain_rerender_updates_in_place() {
    let mut b = bridge();
    b.engine_mut().set_text("count", "1").unwrap();
    let FrameOutcome::Rendered(stats) = b.frame(16) else {
        panic!("expected a render");
    };
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.created, 0);
    let el = b.dom().element_by_id("count").unwrap();
    assert_eq!(b.dom().text(el), Some("1"));
    assert!(!b.engine().grain_rerender());
}

#[test]
fn global_rerender_recomputes_and_cleans_up_next_frame() {
    let mut b = bridge();
    b.engine_mut().request_rerender();
    b.engine_mut().take_calls();
    assert!(matches!(b.frame(16), FrameOutcome::Rendered(_)));
    assert_eq!(
        b.engine().calls().first(),
        Some(&EngineCall::RenderCommands("/root".to_string()))
    );
    assert!(!b.engine().calls().contains(&EngineCall::CleanUp));
    b.frame(32);
    assert!(b.engine().calls().contains(&EngineCall::CleanUp));
}

#[test]
fn button_click_passes_the_element_id() {
    let mut b = bridge();
    assert_eq!(b.click("inc").unwrap(), 1);
    assert_eq!(
        b.engine().calls().last(),
        Some(&EngineCall::Button(ButtonArg::Id("inc".to_string())))
    );
}

#[test]
fn dialog_trigger_calls_back_and_opens_the_dialog() {
    let mut b = bridge();
    b.click("open").unwrap();
    assert_eq!(
        b.engine().calls().last(),
        Some(&EngineCall::Button(ButtonArg::Raw(7)))
    );
    let dlg = b.dom().element_by_id("dlg").unwrap();
    assert!(b.dom().is_open(dlg));
}

#[test]
fn events_on_missing_elements_are_ignored() {
    let mut b = bridge();
    assert_eq!(b.click("nope").unwrap(), 0);
}

#[test]
fn link_navigation_tears_down_and_rerenders_next_frame() {
    let mut b = bridge();
    b.click("to-docs").unwrap();

    assert_eq!(b.dom().history(), ["/", "/docs"]);
    assert!(b.dom().element_by_id("page").is_none());
    assert!(b.dom().element_by_id("to-docs").is_some());
    let registered: Vec<&str> = b.reconciler().registry().iter().map(|(id, _)| id).collect();
    assert_eq!(registered, ["layout-/", "to-docs"]);
    assert!(b.engine().calls().contains(&EngineCall::RouteRenderCycle("/docs".to_string())));
    assert!(!b.engine().should_rerender());

    assert!(matches!(b.frame(16), FrameOutcome::Rendered(_)));
    assert!(b.dom().element_by_id("docs-title").is_some());
    assert_eq!(b.reconciler().registry().len(), b.reconciler().active().len());
    assert_eq!(b.current_path(), "/docs");
}

#[test]
fn popstate_renders_the_previous_route() {
    let mut b = bridge();
    b.navigate("/docs").unwrap();
    b.frame(16);
    assert!(b.dom_mut().go_back().is_some());

    let stats = b.popstate().unwrap();
    assert!(stats.created >= 6);
    assert!(b.dom().element_by_id("docs-page").is_none());
    assert!(b.dom().element_by_id("count").is_some());
    assert!(b.engine().calls().contains(&EngineCall::RouteRenderCycle("/root".to_string())));
    assert_eq!(b.reconciler().registry().len(), b.reconciler().active().len());
}

#[test]
fn route_hooks_fire_on_matching_navigation() {
    let mut b = bridge();
    let endpoint = span(&mut b, "/docs");
    b.host_call(HostCall::CreateHook { endpoint, id: 5 }).unwrap();
    let endpoint = span(&mut b, "*");
    b.host_call(HostCall::CreateHook { endpoint, id: 6 }).unwrap();
    let endpoint = span(&mut b, "/other");
    b.host_call(HostCall::CreateHook { endpoint, id: 9 }).unwrap();

    b.navigate("/docs").unwrap();
    let fired: Vec<u32> = b
        .engine()
        .calls()
        .iter()
        .filter_map(|c| match c {
            EngineCall::InstHook(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(fired, [6, 5]);
}

#[test]
fn exit_animation_completes_on_animation_end() {
    let mut b = bridge();
    b.engine_mut().remove_node("toast").unwrap();
    b.frame(16);
    let toast = b.dom().element_by_id("toast").unwrap();
    assert!(b.dom().class_name(toast).contains("fade"));
    assert_eq!(b.reconciler().pending_exit_count(), 1);

    assert_eq!(b.dispatch("toast", DomEvent::animation_end("fade")).unwrap(), 1);
    assert!(!b.dom().is_connected(toast));
    assert_eq!(b.reconciler().pending_exit_count(), 0);
}

#[test]
fn navigation_cancels_route_intervals() {
    let mut b = bridge();
    let name = span(&mut b, "poll");
    b.host_call(HostCall::CreateInterval { name, delay_ms: 10 })
        .unwrap();
    b.frame(16);
    assert!(b.engine().calls().contains(&EngineCall::TimeoutCtx("poll".to_string())));

    b.navigate("/docs").unwrap();
    b.engine_mut().take_calls();
    b.frame(48);
    b.frame(64);
    assert!(!b.engine().calls().contains(&EngineCall::TimeoutCtx("poll".to_string())));
}

#[test]
fn failing_frames_halt_after_the_threshold() {
    let opts = BridgeOpts {
        max_consecutive_failures: Some(3),
        ..BridgeOpts::default()
    };
    let mut b = Bridge::init(SimEngine::new(app()), VirtualDom::new(), opts).unwrap();
    b.engine_mut().mark_dirty("count").unwrap();
    b.engine_mut().set_memory_fault(true);

    assert_eq!(b.frame(16), FrameOutcome::Failed);
    assert_eq!(b.frame(32), FrameOutcome::Failed);
    assert_eq!(b.consecutive_failures(), 2);
    assert_eq!(b.frame(48), FrameOutcome::Halted);
    assert!(b.is_halted());

    b.engine_mut().set_memory_fault(false);
    assert_eq!(b.frame(64), FrameOutcome::Halted);
}

#[test]
fn a_good_frame_resets_the_failure_count() {
    let mut b = bridge();
    b.engine_mut().mark_dirty("count").unwrap();
    b.engine_mut().set_memory_fault(true);
    assert_eq!(b.frame(16), FrameOutcome::Failed);
    b.engine_mut().set_memory_fault(false);
    assert!(matches!(b.frame(32), FrameOutcome::Rendered(_)));
    assert_eq!(b.consecutive_failures(), 0);
}

#[test]
fn unlimited_failures_never_halt() {
    let opts = BridgeOpts {
        max_consecutive_failures: None,
        ..BridgeOpts::default()
    };
    let mut b = Bridge::init(SimEngine::new(app()), VirtualDom::new(), opts).unwrap();
    b.engine_mut().mark_dirty("count").unwrap();
    b.engine_mut().set_memory_fault(true);
    for i in 0..200 {
        assert_eq!(b.frame(i * 16), FrameOutcome::Failed);
    }
}

#[test]
fn forced_navigation_with_a_dirty_layout_keeps_its_clean_children() {
    let mut b = bridge();
    let link = b.dom().element_by_id("to-docs").unwrap();
    b.engine.mark_dirty("layout-/").unwrap();
    b.navigate_forced("/").unwrap();
    b.engine.request_rerender();
    assert!(matches!(b.frame(16), FrameOutcome::Rendered(_)));

    let layout = b.dom().element_by_id("layout-/").unwrap();
    assert_eq!(b.dom().element_by_id("to-docs"), Some(link));
    assert_eq!(b.dom().parent(link), Some(layout));
    assert_eq!(b.reconciler().registry().get("to-docs").unwrap().element, link);
    assert!(b.dom().element_by_id("count").is_some());

    let mut connected = b.dom().connected_ids();
    connected.sort();
    let mut registered: Vec<String> = b
        .reconciler()
        .registry()
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();
    registered.sort();
    assert_eq!(connected, registered);
}
