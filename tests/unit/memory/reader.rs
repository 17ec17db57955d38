use super::*;

fn sample() -> Vec<u8> {
    let mut mem = vec![0u8; 32];
    mem[4..8].copy_from_slice(&0xdead_beef_u32.to_le_bytes());
    mem[8..12].copy_from_slice(&1.5f32.to_le_bytes());
    mem[12] = 9;
    mem[16..21].copy_from_slice(b"hello");
    mem[24..27].copy_from_slice(b"ab\0");
    mem
}

#[test]
fn reads_little_endian_scalars() {
    let mem = sample();
    let view = MemoryView::new(&mem);
    assert_eq!(view.u32_at(4).unwrap(), 0xdead_beef);
    assert_eq!(view.f32_at(8).unwrap(), 1.5);
    assert_eq!(view.u8_at(12).unwrap(), 9);
}

#[test]
fn windows_are_relative_and_bounded() {
    let mem = sample();
    let view = MemoryView::new(&mem).window(4, 8).unwrap();
    assert_eq!(view.base(), 4);
    assert_eq!(view.u32_at(0).unwrap(), 0xdead_beef);
    assert!(view.u32_at(6).is_err());
    assert!(MemoryView::new(&mem).window(30, 4).is_err());
}

#[test]
fn strings_are_length_prefixed() {
    let mem = sample();
    let view = MemoryView::new(&mem);
    assert_eq!(view.string(Span::new(16, 5)).unwrap(), "hello");
    assert_eq!(view.string(Span::new(16, 2)).unwrap(), "he");
    assert_eq!(view.string(Span::null()).unwrap(), "");
}

#[test]
fn out_of_bounds_string_is_an_error() {
    let mem = sample();
    let err = read_string(&mem, Span::new(30, 8)).unwrap_err();
    assert!(err.to_string().contains("memory error"));
}

#[test]
fn invalid_utf8_is_an_error() {
    let mut mem = sample();
    mem[16] = 0xff;
    assert!(read_string(&mem, Span::new(16, 2)).is_err());
}

#[test]
fn cstr_stops_at_nul() {
    let mem = sample();
    assert_eq!(read_cstr(&mem, 24).unwrap(), "ab");
    assert!(read_cstr(&mem, 64).is_err());
}
