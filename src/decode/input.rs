use crate::engine::Engine;
use crate::foundation::core::NodePtr;
use crate::foundation::error::BridgeResult;
use crate::memory::reader::MemoryView;

// Fixed offsets of the input sub-record. The first 8 bytes are engine bookkeeping.
pub(crate) const IN_NAME_PTR: u32 = 8;
pub(crate) const IN_NAME_LEN: u32 = 12;
pub(crate) const IN_BODY: u32 = 20;
pub(crate) const IN_PLACEHOLDER_LEN: u32 = IN_BODY + 4;
pub(crate) const IN_VALUE_PTR: u32 = IN_BODY + 12;
pub(crate) const IN_VALUE_LEN: u32 = IN_BODY + 16;
pub(crate) const IN_MIN_LEN: u32 = IN_BODY + 24;
pub(crate) const IN_MAX_LEN: u32 = IN_BODY + 32;
pub(crate) const IN_NUMBER_VALUE: u32 = IN_BODY + 8;
/// Minimum size of an input sub-record.
pub const INPUT_RECORD_SIZE: u32 = IN_MAX_LEN + 8;

/// Input variant tag as reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// `type=number`.
    Number,
    /// `type=text`.
    Text,
    /// `type=radio`.
    Radio,
    /// `type=password`.
    Password,
    /// `type=email`.
    Email,
    /// `type=file`.
    File,
    /// Any other tag; only the name is decoded.
    Other(u32),
}

impl InputKind {
    /// Decode the engine tag.
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            0 => Self::Number,
            2 => Self::Text,
            4 => Self::Radio,
            5 => Self::Password,
            6 => Self::Email,
            7 => Self::File,
            other => Self::Other(other),
        }
    }

    /// Engine tag of this kind.
    pub fn tag(self) -> u32 {
        match self {
            Self::Number => 0,
            Self::Text => 2,
            Self::Radio => 4,
            Self::Password => 5,
            Self::Email => 6,
            Self::File => 7,
            Self::Other(t) => t,
        }
    }

    /// Value of the live element's `type` attribute.
    pub fn html_type(self) -> Option<&'static str> {
        match self {
            Self::Number => Some("number"),
            Self::Text => Some("text"),
            Self::Radio => Some("radio"),
            Self::Password => Some("password"),
            Self::Email => Some("email"),
            Self::File => Some("file"),
            Self::Other(_) => None,
        }
    }
}

/// Decoded input sub-record.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct InputRecord {
    /// Input variant.
    pub kind: InputKind,
    /// `name` attribute, empty when absent.
    pub name: String,
    /// Placeholder text (numbers are rendered as decimal).
    pub placeholder: Option<String>,
    /// Initial value.
    pub value: Option<String>,
    /// Minimum length, text-like kinds only.
    pub min_len: Option<u32>,
    /// Maximum length, text-like kinds only.
    pub max_len: Option<u32>,
    /// Event callback id for input changes, `0` for none.
    pub on_input: u32,
}

/// Materialize and decode the input sub-record of `node`.
pub fn decode_input(engine: &mut dyn Engine, node: NodePtr) -> BridgeResult<InputRecord> {
    let kind = InputKind::from_tag(engine.input_type(node));
    let ptr = engine.create_input(node);
    let size = engine.input_size(node);
    let on_input = engine.on_input_callback(node);

    let mem = MemoryView::new(engine.memory());
    let rec = mem.window(ptr, size)?;
    let mut out = InputRecord {
        kind,
        name: String::new(),
        placeholder: None,
        value: None,
        min_len: None,
        max_len: None,
        on_input,
    };

    out.name = rec.string(rec.span_at(IN_NAME_PTR, IN_NAME_LEN)?)?;

    let non_empty = |s: String| (!s.is_empty()).then_some(s);
    let non_zero = |n: u32| (n != 0).then_some(n);
    match kind {
        InputKind::Number => {
            out.placeholder = non_zero(rec.u32_at(IN_BODY)?).map(|n| n.to_string());
            out.value = non_zero(rec.u32_at(IN_NUMBER_VALUE)?).map(|n| n.to_string());
        }
        InputKind::Text | InputKind::Password | InputKind::Email => {
            out.placeholder =
                non_empty(rec.string(rec.span_at(IN_BODY, IN_PLACEHOLDER_LEN)?)?);
            out.value = non_empty(rec.string(rec.span_at(IN_VALUE_PTR, IN_VALUE_LEN)?)?);
            out.min_len = non_zero(rec.u32_at(IN_MIN_LEN)?);
            out.max_len = non_zero(rec.u32_at(IN_MAX_LEN)?);
        }
        InputKind::Radio => {
            out.value = non_empty(rec.string(rec.span_at(IN_BODY, IN_PLACEHOLDER_LEN)?)?);
        }
        InputKind::File | InputKind::Other(_) => {}
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/input.rs"]
mod tests;
