use crate::engine::Engine;
use crate::foundation::error::{BridgeError, BridgeResult};
use crate::memory::reader::MemoryView;

/// Number of `u32` words in the descriptor block.
pub const DESCRIPTOR_WORDS: u32 = 23;

/// Byte offsets and sizes describing the render-command record format.
///
/// Offsets are engine-defined and read once at startup; they are never hard-coded. Fields
/// named `props_*` (except the hover block) are relative to the record's props base
/// (`record + props_offset`); all others are relative to the record start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayoutDescriptor {
    /// Size of one render-command record.
    pub render_command_size: u32,
    /// Bounding box (4 x `f32`).
    pub bounding_box: u32,
    /// Element-type tag (`u8`).
    pub elem_type: u32,
    /// Text pointer.
    pub text_ptr: u32,
    /// Text length.
    pub text_len: u32,
    /// Href pointer.
    pub href_ptr: u32,
    /// Href length.
    pub href_len: u32,
    /// Props sub-record offset.
    pub props_offset: u32,
    /// Props sub-record size.
    pub props_size: u32,
    /// Button id inside props.
    pub props_btn_id: u32,
    /// Dialog id pointer inside props.
    pub dialog_id_ptr: u32,
    /// Dialog id length inside props.
    pub dialog_id_len: u32,
    /// Identifier pointer.
    pub id_ptr: u32,
    /// Identifier length.
    pub id_len: u32,
    /// Visibility flag (`u8`).
    pub show: u32,
    /// Hook-id block (4 x `u32`).
    pub hooks: u32,
    /// Engine node handle.
    pub node_ptr: u32,
    /// Hover flag block offset, relative to the record.
    pub props_hover_offset: u32,
    /// Hover flag block size.
    pub props_hover_size: u32,
    /// Exit animation pointer inside props.
    pub props_exit_animation: u32,
    /// Exit animation length inside props.
    pub props_exit_animation_len: u32,
    /// Style id pointer inside props.
    pub props_style_id: u32,
    /// Style id length inside props.
    pub props_style_id_len: u32,
}

impl LayoutDescriptor {
    /// Ask the engine for its descriptor block and decode it.
    ///
    /// Fails when the engine has not run its start routine; there is no retry.
    #[tracing::instrument(skip(engine))]
    pub fn load(engine: &mut dyn Engine) -> BridgeResult<Self> {
        if !engine.is_initialized() {
            return Err(BridgeError::descriptor(
                "engine is not initialized; layout descriptor cannot be read",
            ));
        }
        let ptr = engine.allocate_layout_info();
        if ptr == 0 {
            return Err(BridgeError::descriptor("engine returned a null descriptor"));
        }
        let desc = Self::read_at(MemoryView::new(engine.memory()), ptr)?;
        desc.validate()?;
        tracing::debug!(ptr, record_size = desc.render_command_size, "layout descriptor loaded");
        Ok(desc)
    }

    /// Decode [`DESCRIPTOR_WORDS`] consecutive little-endian words at `ptr`.
    pub fn read_at(mem: MemoryView<'_>, ptr: u32) -> BridgeResult<Self> {
        let v = mem.window(ptr, DESCRIPTOR_WORDS * 4)?;
        let w = |i: u32| v.u32_at(i * 4);
        Ok(Self {
            render_command_size: w(0)?,
            bounding_box: w(1)?,
            elem_type: w(2)?,
            text_ptr: w(3)?,
            text_len: w(4)?,
            href_ptr: w(5)?,
            href_len: w(6)?,
            props_offset: w(7)?,
            props_size: w(8)?,
            props_btn_id: w(9)?,
            dialog_id_ptr: w(10)?,
            dialog_id_len: w(11)?,
            id_ptr: w(12)?,
            id_len: w(13)?,
            show: w(14)?,
            hooks: w(15)?,
            node_ptr: w(16)?,
            props_hover_offset: w(17)?,
            props_hover_size: w(18)?,
            props_exit_animation: w(19)?,
            props_exit_animation_len: w(20)?,
            props_style_id: w(21)?,
            props_style_id_len: w(22)?,
        })
    }

    /// Encode as the engine lays it out. Used by in-process engines.
    pub fn to_words(&self) -> [u32; DESCRIPTOR_WORDS as usize] {
        [
            self.render_command_size,
            self.bounding_box,
            self.elem_type,
            self.text_ptr,
            self.text_len,
            self.href_ptr,
            self.href_len,
            self.props_offset,
            self.props_size,
            self.props_btn_id,
            self.dialog_id_ptr,
            self.dialog_id_len,
            self.id_ptr,
            self.id_len,
            self.show,
            self.hooks,
            self.node_ptr,
            self.props_hover_offset,
            self.props_hover_size,
            self.props_exit_animation,
            self.props_exit_animation_len,
            self.props_style_id,
            self.props_style_id_len,
        ]
    }

    /// Check that every field fits inside its enclosing record or props block.
    pub fn validate(&self) -> BridgeResult<()> {
        let rec = self.render_command_size;
        if rec == 0 {
            return Err(BridgeError::descriptor("render command size is zero"));
        }
        let in_record = [
            ("bounding_box", self.bounding_box, 16),
            ("elem_type", self.elem_type, 1),
            ("text_ptr", self.text_ptr, 4),
            ("text_len", self.text_len, 4),
            ("href_ptr", self.href_ptr, 4),
            ("href_len", self.href_len, 4),
            ("id_ptr", self.id_ptr, 4),
            ("id_len", self.id_len, 4),
            ("show", self.show, 1),
            ("hooks", self.hooks, 16),
            ("node_ptr", self.node_ptr, 4),
            ("props", self.props_offset, self.props_size),
            ("hover", self.props_hover_offset, self.props_hover_size.max(1)),
        ];
        for (name, offset, size) in in_record {
            if offset.saturating_add(size) > rec {
                return Err(BridgeError::descriptor(format!(
                    "field `{name}` at {offset}+{size} exceeds record size {rec}"
                )));
            }
        }
        let in_props = [
            ("props_btn_id", self.props_btn_id),
            ("dialog_id_ptr", self.dialog_id_ptr),
            ("dialog_id_len", self.dialog_id_len),
            ("props_exit_animation", self.props_exit_animation),
            ("props_exit_animation_len", self.props_exit_animation_len),
            ("props_style_id", self.props_style_id),
            ("props_style_id_len", self.props_style_id_len),
        ];
        for (name, offset) in in_props {
            if offset.saturating_add(4) > self.props_size {
                return Err(BridgeError::descriptor(format!(
                    "props field `{name}` at {offset} exceeds props size {}",
                    self.props_size
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/descriptor.rs"]
mod tests;
