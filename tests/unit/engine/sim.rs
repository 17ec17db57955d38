use super::*;
use crate::decode::command::decode_render_command;
use crate::memory::reader::read_string;

fn app() -> SimApp {
    let mut app = SimApp {
        layout: vec![SimNode::new("nav", ElementType::Flexbox)],
        ..SimApp::default()
    };
    app.routes.insert(
        "/root".to_string(),
        vec![
            SimNode::new("home", ElementType::Flexbox)
                .with_child(SimNode::new("t1", ElementType::Text).with_text("hello")),
        ],
    );
    app.routes.insert(
        "/docs".to_string(),
        vec![SimNode::new("docs", ElementType::Text).with_text("docs")],
    );
    app
}

#[test]
fn tree_is_layout_then_route_nodes() {
    let engine = SimEngine::new(app());
    let root = engine.render_tree_ptr();
    assert_eq!(engine.child_count(root), 2);
    let home = engine.child(root, 1);
    assert_eq!(engine.node_ptr_of("home"), Some(home));
    assert_eq!(engine.child_count(home), 1);
    assert_eq!(engine.child(home, 0), engine.node_ptr_of("t1").unwrap());
    assert_eq!(engine.child(home, 7), NodePtr(0));
}

#[test]
fn every_node_starts_dirty() {
    let engine = SimEngine::new(app());
    for id in ["nav", "home", "t1"] {
        assert_eq!(engine.is_node_dirty(id), Some(true), "{id}");
    }
    assert_eq!(engine.is_node_dirty("docs"), None);
}

#[test]
fn relayout_moves_records_but_keeps_dirty_flags() {
    let mut engine = SimEngine::new(app());
    let t1 = engine.node_ptr_of("t1").unwrap();
    let before = engine.render_command_ptr(t1);
    engine.set_dirty_false(t1);
    engine.set_text("home", "x").unwrap();
    let after = engine.render_command_ptr(engine.node_ptr_of("t1").unwrap());
    assert_ne!(before, after);
    assert_eq!(engine.is_node_dirty("t1"), Some(false));
    assert_eq!(engine.is_node_dirty("home"), Some(true));
    assert!(engine.grain_rerender());
}

#[test]
fn records_decode_with_the_sim_layout() {
    let mut engine = SimEngine::new(app());
    let t1 = engine.node_ptr_of("t1").unwrap();
    let ptr = engine.render_command_ptr(t1);
    let cmd = decode_render_command(&mut engine, &SIM_LAYOUT, ptr).unwrap();
    assert_eq!(cmd.id, "t1");
    assert_eq!(cmd.text, "hello");
    assert_eq!(cmd.elem_type, ElementType::Text);
    assert_eq!(cmd.node, t1);
    assert!(cmd.show);
}

#[test]
fn route_render_cycle_switches_and_dirties_route_nodes() {
    let mut engine = SimEngine::new(app());
    let nav = engine.node_ptr_of("nav").unwrap();
    engine.set_dirty_false(nav);
    let ptr = engine.alloc_string(b"/docs");
    engine.route_render_cycle(ptr);
    assert_eq!(engine.route(), "/docs");
    assert_eq!(engine.is_node_dirty("docs"), Some(true));
    assert_eq!(engine.is_node_dirty("nav"), Some(false));
    assert_eq!(engine.is_node_dirty("home"), None);
    assert_eq!(
        engine.calls().last(),
        Some(&EngineCall::RouteRenderCycle("/docs".to_string()))
    );
}

#[test]
fn mark_non_layout_dirty_spares_layout() {
    let mut engine = SimEngine::new(app());
    for id in ["nav", "home", "t1"] {
        let p = engine.node_ptr_of(id).unwrap();
        engine.set_dirty_false(p);
    }
    engine.mark_all_non_layout_nodes_dirty();
    assert_eq!(engine.is_node_dirty("nav"), Some(false));
    assert_eq!(engine.is_node_dirty("home"), Some(true));
    assert_eq!(engine.is_node_dirty("t1"), Some(true));
}

#[test]
fn button_arguments_distinguish_strings_from_raw_ids() {
    let mut engine = SimEngine::new(app());
    let ptr = engine.alloc_string(b"b1");
    engine.button_callback(ptr);
    engine.button_callback(7);
    assert_eq!(
        engine.take_calls(),
        vec![
            EngineCall::Button(ButtonArg::Id("b1".to_string())),
            EngineCall::Button(ButtonArg::Raw(7)),
        ]
    );
    assert!(engine.calls().is_empty());
}

#[test]
fn motions_yield_each_keyframe_once() {
    let mut a = app();
    a.keyframes = vec!["@keyframes a {}".to_string(), "@keyframes b {}".to_string()];
    let mut engine = SimEngine::new(a);
    let mut seen = Vec::new();
    loop {
        let m = engine.next_motion();
        if m == 0 {
            break;
        }
        let span = engine.key_frames(m);
        seen.push(read_string(engine.memory(), span).unwrap());
    }
    assert_eq!(seen, vec!["@keyframes a {}", "@keyframes b {}"]);
}

#[test]
fn remove_and_push_child_edit_the_current_route() {
    let mut engine = SimEngine::new(app());
    let removed = engine.remove_node("t1").unwrap();
    assert_eq!(removed.text, "hello");
    assert_eq!(engine.node_ptr_of("t1"), None);
    assert!(engine.remove_node("t1").is_err());

    engine
        .push_child(Some("home"), SimNode::new("t2", ElementType::Text))
        .unwrap();
    assert_eq!(engine.is_node_dirty("t2"), Some(true));
    engine.push_child(None, SimNode::new("tail", ElementType::BoxContainer)).unwrap();
    let root = engine.render_tree_ptr();
    assert_eq!(engine.child_count(root), 3);
}

#[test]
fn fixture_rejects_duplicate_ids() {
    let json = r#"{
        "layout": [{"id": "a", "kind": "flexbox"}],
        "routes": {"/root": [{"id": "a", "kind": "text"}]}
    }"#;
    let err = SimApp::from_json_str(json).unwrap_err();
    assert!(err.to_string().contains("duplicate node id 'a'"));
}
