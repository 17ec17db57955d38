use crate::decode::descriptor::LayoutDescriptor;
use crate::decode::element_type::ElementType;
use crate::engine::Engine;
use crate::foundation::core::{BoundingBox, HookIds, NodePtr, Span};
use crate::foundation::error::BridgeResult;
use crate::memory::reader::{MemoryView, read_string};

/// Style-related props of a render command.
///
/// Only authoritative when the owning command is dirty.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CommandProps {
    /// Style declarations for the node's class rule.
    pub css: String,
    /// Hover declarations, empty when the node has no hover style.
    pub hover_css: String,
    /// Button id passed to the button callback by dialog triggers.
    pub button_id: u32,
    /// Target dialog identifier of dialog triggers.
    pub dialog_id: String,
}

/// One engine node decoded from linear memory.
///
/// Constructed fresh on every visit and never persisted.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderCommand {
    /// Stable identifier, unique across the live tree.
    pub id: String,
    /// Element-type tag.
    pub elem_type: ElementType,
    /// Engine-computed box.
    pub bounding_box: BoundingBox,
    /// Text content.
    pub text: String,
    /// Link target, image source or icon class list depending on the kind.
    pub href: String,
    /// Engine dirty flag at decode time.
    pub is_dirty: bool,
    /// Engine visibility flag.
    pub show: bool,
    /// Engine node handle.
    pub node: NodePtr,
    /// Caller-supplied class name, empty when none.
    pub style_id: String,
    /// Exit animation name.
    pub exit_animation_id: Option<String>,
    /// Lifecycle hooks.
    pub hooks: HookIds,
    /// Style props.
    pub props: CommandProps,
}

/// Decode the render command stored at `offset`.
///
/// Header fields are always read. Strings that need extra engine calls (style, hover) and the
/// remaining props are only read when the engine reports the node dirty.
pub fn decode_render_command(
    engine: &mut dyn Engine,
    layout: &LayoutDescriptor,
    offset: u32,
) -> BridgeResult<RenderCommand> {
    let (node, header, button_id) = {
        let mem = MemoryView::new(engine.memory());
        let rec = mem.window(offset, layout.render_command_size)?;
        let node = NodePtr(rec.u32_at(layout.node_ptr)?);
        let bb = layout.bounding_box;
        let header = Header {
            bounding_box: BoundingBox {
                x: rec.f32_at(bb)?,
                y: rec.f32_at(bb + 4)?,
                width: rec.f32_at(bb + 8)?,
                height: rec.f32_at(bb + 12)?,
            },
            elem_type: ElementType::from_u8(rec.u8_at(layout.elem_type)?),
            text: rec.string(rec.span_at(layout.text_ptr, layout.text_len)?)?,
            href: rec.string(rec.span_at(layout.href_ptr, layout.href_len)?)?,
            id: rec.string(rec.span_at(layout.id_ptr, layout.id_len)?)?,
            show: rec.u8_at(layout.show)? != 0,
        };
        let props = rec.window(layout.props_offset, layout.props_size)?;
        let button_id = props.u32_at(layout.props_btn_id)?;
        (node, header, button_id)
    };

    let is_dirty = engine.is_dirty(node);
    let mut cmd = RenderCommand {
        id: header.id,
        elem_type: header.elem_type,
        bounding_box: header.bounding_box,
        text: header.text,
        href: header.href,
        is_dirty,
        show: header.show,
        node,
        style_id: String::new(),
        exit_animation_id: None,
        hooks: HookIds::default(),
        props: CommandProps {
            button_id,
            ..CommandProps::default()
        },
    };
    if !is_dirty {
        return Ok(cmd);
    }

    let css_span = engine.style(node);
    cmd.props.css = read_string(engine.memory(), css_span)?;

    let has_hover = {
        let mem = MemoryView::new(engine.memory());
        let rec = mem.window(offset, layout.render_command_size)?;
        let h = layout.hooks;
        cmd.hooks = HookIds {
            created: rec.u32_at(h)?,
            mounted: rec.u32_at(h + 4)?,
            updated: rec.u32_at(h + 8)?,
            destroy: rec.u32_at(h + 12)?,
        };

        let props = rec.window(layout.props_offset, layout.props_size)?;
        cmd.props.dialog_id =
            props.string(props.span_at(layout.dialog_id_ptr, layout.dialog_id_len)?)?;

        let exit = props.span_at(layout.props_exit_animation, layout.props_exit_animation_len)?;
        if !exit.is_null() {
            cmd.exit_animation_id = Some(props.string(exit)?);
        }
        let style_id = props.span_at(layout.props_style_id, layout.props_style_id_len)?;
        cmd.style_id = props.string(style_id)?;

        let hover = rec.window(layout.props_hover_offset, layout.props_hover_size.max(1))?;
        hover.u8_at(0)? > 0
    };

    if has_hover {
        let span: Span = engine.hover_style(node);
        cmd.props.hover_css = read_string(engine.memory(), span)?;
    }

    if engine.has_extra_classes(node) {
        engine.add_extra_classes(node);
    }

    Ok(cmd)
}

struct Header {
    bounding_box: BoundingBox,
    elem_type: ElementType,
    text: String,
    href: String,
    id: String,
    show: bool,
}

#[cfg(test)]
#[path = "../../tests/unit/decode/command.rs"]
mod tests;
