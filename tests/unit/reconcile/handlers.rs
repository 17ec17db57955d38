use super::*;

#[test]
fn keys_follow_the_engine_naming() {
    assert_eq!(listener_key(4, "name"), "fb-evt-hd-4-name");
    assert_eq!(inst_listener_key(4, "name"), "fb-inst-evt-hd-4-name");
}

#[test]
fn dispatch_orders_intrinsic_listeners_then_document() {
    let mut map = HandlerMap::default();
    map.bind(
        "b1",
        EventType::Click,
        Behavior::ButtonClick { id: "b1".into() },
    );
    map.add_listener(
        listener_key(7, "b1"),
        Listener {
            element: "b1".into(),
            event: EventType::Click,
            behavior: Behavior::EngineEvent { callback: 7 },
        },
    );
    map.add_document_listener(EventType::Click, 9);

    assert_eq!(
        map.dispatch("b1", &EventType::Click),
        vec![
            Behavior::ButtonClick { id: "b1".into() },
            Behavior::EngineEvent { callback: 7 },
            Behavior::EngineEvent { callback: 9 },
        ]
    );
    assert_eq!(
        map.dispatch("other", &EventType::Click),
        vec![Behavior::EngineEvent { callback: 9 }]
    );
    assert!(map.dispatch("b1", &EventType::Input).is_empty());
}

#[test]
fn forget_drops_all_handlers_of_an_element() {
    let mut map = HandlerMap::default();
    map.bind("a", EventType::Click, Behavior::Navigate { href: "/x".into() });
    map.add_listener(
        listener_key(1, "a"),
        Listener {
            element: "a".into(),
            event: EventType::Input,
            behavior: Behavior::EngineEvent { callback: 1 },
        },
    );
    map.forget("a");
    assert!(map.dispatch("a", &EventType::Click).is_empty());
    assert_eq!(map.listener_count(), 0);
}

#[test]
fn duplicate_listener_keys_replace() {
    let mut map = HandlerMap::default();
    let l = Listener {
        element: "a".into(),
        event: EventType::Input,
        behavior: Behavior::EngineEvent { callback: 1 },
    };
    assert!(map.add_listener(listener_key(1, "a"), l.clone()));
    assert!(!map.add_listener(listener_key(1, "a"), l));
    assert_eq!(map.listener_count(), 1);
}

#[test]
fn event_data_keeps_the_last_payload() {
    let mut map = HandlerMap::default();
    map.store_event(3, DomEvent::input("a"));
    map.store_event(3, DomEvent::input("ab"));
    assert_eq!(map.event_data(3).and_then(|e| e.value.as_deref()), Some("ab"));
    assert!(map.event_data(4).is_none());
}
