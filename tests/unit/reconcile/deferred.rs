use super::*;
use crate::dom::virtual_dom::VirtualDom;
use crate::dom::{ElementKind, EventType};
use crate::engine::fixture::SimApp;
use crate::engine::sim::{EngineCall, SimEngine};
use crate::reconcile::handlers::{Behavior, listener_key};

fn mounted(dom: &mut VirtualDom, id: &str, kind: ElementKind) -> crate::dom::ElementRef {
    let el = dom.create_element(kind);
    dom.set_id(el, id);
    let root = dom.root();
    dom.append_child(root, el).unwrap();
    el
}

#[test]
fn operations_wait_for_flush_and_resolve_late() {
    let mut engine = SimEngine::new(SimApp::default());
    let mut dom = VirtualDom::new();
    let mut handlers = HandlerMap::default();
    let mut q = DeferredQueue::default();

    q.push(DeferredOp::Focus { id: "name".into() });
    q.push(DeferredOp::Listen {
        key: listener_key(5, "name"),
        listener: Listener {
            element: "name".into(),
            event: EventType::Input,
            behavior: Behavior::EngineEvent { callback: 5 },
        },
    });
    let el = mounted(&mut dom, "name", ElementKind::Input);
    assert_eq!(dom.focused(), None);

    assert_eq!(q.flush(&mut engine, &mut dom, &mut handlers), 2);
    assert!(q.is_empty());
    assert_eq!(dom.focused(), Some(el));
    assert!(dom.has_listener(el, &EventType::Input));
    assert!(handlers.listener(&listener_key(5, "name")).is_some());
}

#[test]
fn missing_targets_are_skipped() {
    let mut engine = SimEngine::new(SimApp::default());
    let mut dom = VirtualDom::new();
    let mut handlers = HandlerMap::default();
    let mut q = DeferredQueue::default();
    q.push(DeferredOp::ShowModal { id: "nope".into() });
    q.push(DeferredOp::AddClass {
        id: "nope".into(),
        class: "x".into(),
    });
    assert_eq!(q.flush(&mut engine, &mut dom, &mut handlers), 2);
    assert_eq!(dom.mutation_count(), 0);
}

#[test]
fn dialog_and_class_operations_apply_in_order() {
    let mut engine = SimEngine::new(SimApp::default());
    let mut dom = VirtualDom::new();
    let mut handlers = HandlerMap::default();
    let dlg = mounted(&mut dom, "dlg", ElementKind::Dialog);
    let mut q = DeferredQueue::default();
    q.push(DeferredOp::ShowModal { id: "dlg".into() });
    q.push(DeferredOp::AddClass {
        id: "dlg".into(),
        class: "open".into(),
    });
    q.push(DeferredOp::SetAttribute {
        id: "dlg".into(),
        name: "aria-modal".into(),
        value: "true".into(),
    });
    q.flush(&mut engine, &mut dom, &mut handlers);
    assert!(dom.is_open(dlg));
    assert_eq!(dom.class_name(dlg), "open");
    assert_eq!(dom.attribute(dlg, "aria-modal").as_deref(), Some("true"));

    q.push(DeferredOp::CloseDialog { id: "dlg".into() });
    q.push(DeferredOp::RemoveClass {
        id: "dlg".into(),
        class: "open".into(),
    });
    q.flush(&mut engine, &mut dom, &mut handlers);
    assert!(!dom.is_open(dlg));
    assert_eq!(dom.class_name(dlg), "");
}

#[test]
fn engine_operations_reach_the_engine() {
    let mut engine = SimEngine::new(SimApp::default());
    let mut dom = VirtualDom::new();
    let mut handlers = HandlerMap::default();
    let mut q = DeferredQueue::default();
    q.push(DeferredOp::RequestRerender);
    q.push(DeferredOp::CleanUp);
    assert!(!engine.should_rerender());
    q.flush(&mut engine, &mut dom, &mut handlers);
    assert!(engine.should_rerender());
    assert_eq!(engine.calls(), [EngineCall::CleanUp]);
}
