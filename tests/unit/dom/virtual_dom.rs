use super::*;

#[test]
fn element_by_id_only_finds_connected_elements() {
    let mut dom = VirtualDom::new();
    let a = dom.create_element(ElementKind::Div);
    dom.set_id(a, "a");
    assert_eq!(dom.element_by_id("a"), None);

    let root = dom.root();
    dom.append_child(root, a).unwrap();
    assert_eq!(dom.element_by_id("a"), Some(a));

    dom.detach(a);
    assert_eq!(dom.element_by_id("a"), None);
    assert!(!dom.is_connected(a));
}

#[test]
fn append_child_moves_between_parents() {
    let mut dom = VirtualDom::new();
    let root = dom.root();
    let p1 = dom.create_element(ElementKind::Div);
    let p2 = dom.create_element(ElementKind::Div);
    let c = dom.create_element(ElementKind::Paragraph);
    dom.append_child(root, p1).unwrap();
    dom.append_child(root, p2).unwrap();
    dom.append_child(p1, c).unwrap();
    dom.append_child(p2, c).unwrap();

    assert!(dom.children(p1).is_empty());
    assert_eq!(dom.children(p2), vec![c]);
    assert_eq!(dom.parent(c), Some(p2));
}

#[test]
fn append_child_rejects_cycles() {
    let mut dom = VirtualDom::new();
    let a = dom.create_element(ElementKind::Div);
    let b = dom.create_element(ElementKind::Div);
    dom.append_child(a, b).unwrap();
    let err = dom.append_child(b, a).unwrap_err();
    assert!(err.to_string().starts_with("dom error:"));
}

#[test]
fn stylesheet_insert_and_delete_keep_order() {
    let mut dom = VirtualDom::new();
    dom.insert_rule(".a { color: red; }", 0).unwrap();
    dom.insert_rule(".b { color: blue; }", 1).unwrap();
    dom.delete_rule(0).unwrap();
    dom.insert_rule(".a { color: green; }", 0).unwrap();
    assert_eq!(dom.rule(0), Some(".a { color: green; }"));
    assert_eq!(dom.rule(1), Some(".b { color: blue; }"));
    assert_eq!(dom.rule_count(), 2);

    assert!(dom.insert_rule(".c {}", 5).is_err());
    assert!(dom.delete_rule(2).is_err());
}

#[test]
fn class_helpers_manage_tokens() {
    let mut dom = VirtualDom::new();
    let el = dom.create_element(ElementKind::Icon);
    dom.set_class_name(el, "fa  fa-home");
    dom.add_class(el, "spin");
    dom.add_class(el, "spin");
    assert_eq!(dom.class_name(el), "fa fa-home spin");
    dom.remove_class(el, "fa");
    assert_eq!(dom.attribute(el, "class").as_deref(), Some("fa-home spin"));
}

#[test]
fn mutation_counter_ignores_reads() {
    let mut dom = VirtualDom::new();
    let el = dom.create_element(ElementKind::Div);
    let before = dom.mutation_count();
    let _ = dom.class_name(el);
    let _ = dom.element_by_id("x");
    let _ = dom.to_html();
    assert_eq!(dom.mutation_count(), before);
    dom.set_text(el, "x");
    assert_eq!(dom.mutation_count(), before + 1);
}

#[test]
fn html_serialization_escapes_and_nests() {
    let mut dom = VirtualDom::new();
    let root = dom.root();
    let p = dom.create_element(ElementKind::Paragraph);
    dom.set_id(p, "t1");
    dom.set_text(p, "a < b");
    dom.append_child(root, p).unwrap();
    let html = dom.to_html();
    assert!(html.contains("<p id=\"t1\">a &lt; b</p>"), "{html}");
    assert!(html.starts_with("<div id=\"root\">"));
}

#[test]
fn history_back_returns_previous_location() {
    let mut dom = VirtualDom::new();
    assert_eq!(dom.go_back(), None);
    dom.push_history("/a");
    dom.push_history("/b");
    assert_eq!(dom.pathname(), "/b");
    assert_eq!(dom.go_back().as_deref(), Some("/a"));
    assert_eq!(dom.pathname(), "/a");
}
