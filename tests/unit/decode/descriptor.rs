use super::*;
use crate::engine::fixture::SimApp;
use crate::engine::sim::{SIM_LAYOUT, SimEngine};

#[test]
fn load_reads_descriptor_words_in_order() {
    let mut engine = SimEngine::new(SimApp::default());
    let desc = LayoutDescriptor::load(&mut engine).unwrap();
    assert_eq!(desc, SIM_LAYOUT);
}

#[test]
fn load_fails_before_engine_start() {
    let mut engine = SimEngine::uninitialized(SimApp::default());
    let err = LayoutDescriptor::load(&mut engine).unwrap_err();
    assert!(err.to_string().starts_with("descriptor error:"));
}

#[test]
fn words_round_trip_through_memory() {
    let mut mem = vec![0u8; 4];
    for w in SIM_LAYOUT.to_words() {
        mem.extend_from_slice(&w.to_le_bytes());
    }
    let desc = LayoutDescriptor::read_at(MemoryView::new(&mem), 4).unwrap();
    assert_eq!(desc, SIM_LAYOUT);
}

#[test]
fn truncated_block_is_a_memory_error() {
    let mem = vec![0u8; (DESCRIPTOR_WORDS as usize - 1) * 4];
    let err = LayoutDescriptor::read_at(MemoryView::new(&mem), 0).unwrap_err();
    assert!(err.to_string().starts_with("memory error:"));
}

#[test]
fn validate_rejects_fields_outside_the_record() {
    let mut desc = SIM_LAYOUT;
    desc.hooks = desc.render_command_size - 4;
    let err = desc.validate().unwrap_err();
    assert!(err.to_string().contains("`hooks`"));

    let mut desc = SIM_LAYOUT;
    desc.props_style_id_len = desc.props_size;
    assert!(desc.validate().is_err());

    let desc = LayoutDescriptor::default();
    assert!(desc.validate().is_err());
}
