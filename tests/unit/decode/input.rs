use super::*;
use crate::decode::element_type::ElementType;
use crate::engine::fixture::{SimApp, SimInput, SimNode};
use crate::engine::sim::SimEngine;

fn decode_for(input: SimInput) -> InputRecord {
    let mut node = SimNode::new("in", ElementType::Input);
    node.input = Some(input);
    let mut app = SimApp::default();
    app.routes.insert("/root".to_string(), vec![node]);
    let mut engine = SimEngine::new(app);
    let ptr = engine.node_ptr_of("in").unwrap();
    decode_input(&mut engine, ptr).unwrap()
}

#[test]
fn text_input_reads_strings_and_lengths() {
    let rec = decode_for(SimInput {
        kind: InputKind::Text,
        name: "email".to_string(),
        placeholder: "you@example.com".to_string(),
        value: "a".to_string(),
        min_len: 1,
        max_len: 64,
        on_input: 12,
    });
    assert_eq!(rec.kind, InputKind::Text);
    assert_eq!(rec.name, "email");
    assert_eq!(rec.placeholder.as_deref(), Some("you@example.com"));
    assert_eq!(rec.value.as_deref(), Some("a"));
    assert_eq!(rec.min_len, Some(1));
    assert_eq!(rec.max_len, Some(64));
    assert_eq!(rec.on_input, 12);
}

#[test]
fn number_input_renders_numbers_as_text() {
    let rec = decode_for(SimInput {
        kind: InputKind::Number,
        placeholder: "10".to_string(),
        value: "42".to_string(),
        ..SimInput::default()
    });
    assert_eq!(rec.placeholder.as_deref(), Some("10"));
    assert_eq!(rec.value.as_deref(), Some("42"));
    assert_eq!(rec.min_len, None);
}

#[test]
fn radio_input_reads_only_its_value() {
    let rec = decode_for(SimInput {
        kind: InputKind::Radio,
        name: "size".to_string(),
        value: "large".to_string(),
        placeholder: "ignored".to_string(),
        ..SimInput::default()
    });
    assert_eq!(rec.name, "size");
    assert_eq!(rec.value.as_deref(), Some("large"));
    assert_eq!(rec.placeholder, None);
}

#[test]
fn unknown_kind_keeps_only_the_name() {
    let rec = decode_for(SimInput {
        kind: InputKind::Other(9),
        name: "x".to_string(),
        value: "v".to_string(),
        ..SimInput::default()
    });
    assert_eq!(rec.kind, InputKind::Other(9));
    assert_eq!(rec.name, "x");
    assert_eq!(rec.value, None);
    assert_eq!(rec.kind.html_type(), None);
}

#[test]
fn kind_tags_map_to_html_types() {
    assert_eq!(InputKind::from_tag(5), InputKind::Password);
    assert_eq!(InputKind::Password.html_type(), Some("password"));
    assert_eq!(InputKind::from_tag(7).tag(), 7);
}
