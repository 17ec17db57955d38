//! Entry points consumed from the foreign compute engine.
//!
//! The engine owns layout, styling source-of-truth and dirty state. The bridge only reads its
//! linear memory through [`Engine::memory`] and calls the entry points below.

pub(crate) mod fixture;
pub(crate) mod sim;

use crate::foundation::core::{NodePtr, Span};

/// Lifecycle hook phase, used when the bridge invokes a hook callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HookPhase {
    /// First creation of the live element.
    Created,
    /// Element attached to the live tree.
    Mounted,
    /// Post-creation update notification.
    Updated,
    /// Node removed by garbage collection.
    Destroy,
    /// Mount of a context (per-activation) node.
    CtxMounted,
}

/// The foreign compute engine, as seen from the bridge.
///
/// Implementations wrap an instantiated module (for example a WebAssembly instance) or an
/// in-process simulation such as [`crate::SimEngine`].
pub trait Engine {
    /// Current linear memory. Must be re-fetched after any call that may grow or move it.
    fn memory(&self) -> &[u8];

    /// Return `true` once the engine has run its start routine.
    fn is_initialized(&self) -> bool;

    /// Run the engine's UI instantiation for the given viewport.
    fn instantiate(&mut self, width: u32, height: u32);

    /// Allocate the layout descriptor block and return its address.
    fn allocate_layout_info(&mut self) -> u32;

    /// Root of the current render tree.
    fn render_tree_ptr(&self) -> NodePtr;

    /// Number of children of a tree node.
    fn child_count(&self, node: NodePtr) -> u32;

    /// The `index`-th child of a tree node.
    fn child(&self, node: NodePtr, index: u32) -> NodePtr;

    /// Address of the render-command record of a tree node.
    fn render_command_ptr(&self, node: NodePtr) -> u32;

    /// Dirty flag of the node addressed by a record's node handle.
    fn is_dirty(&self, node: NodePtr) -> bool;

    /// Clear the dirty flag of a node.
    fn set_dirty_false(&mut self, node: NodePtr);

    /// Style declaration string of a node.
    fn style(&mut self, node: NodePtr) -> Span;

    /// Hover style declaration string of a node.
    fn hover_style(&mut self, node: NodePtr) -> Span;

    /// Checked-state style of a radio input, if any.
    fn check_mark_style(&mut self, node: NodePtr) -> Span;

    /// `false` when the node's scrollbar must be hidden.
    fn show_scroll_bar(&self, node: NodePtr) -> bool;

    /// Return `true` when the engine has extra classes queued for the node.
    fn has_extra_classes(&self, node: NodePtr) -> bool;

    /// Ask the engine to flush its extra classes for the node.
    fn add_extra_classes(&mut self, node: NodePtr);

    /// Input variant tag of an input node.
    fn input_type(&self, node: NodePtr) -> u32;

    /// Materialize the input sub-record and return its address.
    fn create_input(&mut self, node: NodePtr) -> u32;

    /// Size of the input sub-record in bytes.
    fn input_size(&self, node: NodePtr) -> u32;

    /// Event callback id bound to input changes, `0` for none.
    fn on_input_callback(&self, node: NodePtr) -> u32;

    /// Plain button callback. `arg` is either a string pointer or a button id.
    fn button_callback(&mut self, arg: u32);

    /// Context button callback.
    fn ctx_button_callback(&mut self, arg: u32);

    /// Invoke a lifecycle hook.
    fn hook_callback(&mut self, phase: HookPhase, id: u32);

    /// Generic event callback for listeners registered by the engine.
    fn event_callback(&mut self, id: u32);

    /// Event callback for instance listeners.
    fn event_inst_callback(&mut self, id: u32);

    /// Route hook callback.
    fn hook_inst_callback(&mut self, id: u32);

    /// Interval tick; `name_ptr` addresses a NUL-terminated interval name.
    fn timeout_ctx_callback(&mut self, name_ptr: u32);

    /// Resume an awaiting engine task with a result string.
    fn resume_callback(&mut self, callback_id: u32, payload_ptr: u32);

    /// Resume an awaiting engine task with a failure description.
    fn resume_failed(&mut self, callback_id: u32, error_ptr: u32);

    /// Global rerender requested.
    fn should_rerender(&self) -> bool;

    /// Partial rerender requested.
    fn grain_rerender(&self) -> bool;

    /// Acknowledge a global rerender.
    fn reset_rerender(&mut self);

    /// Acknowledge a partial rerender.
    fn reset_grain_rerender(&mut self);

    /// Request a global rerender on the next frame.
    fn set_rerender_true(&mut self);

    /// Copy `bytes` plus a NUL terminator into engine memory and return the address.
    fn alloc_string(&mut self, bytes: &[u8]) -> u32;

    /// Recompute the render tree for the route at `route_ptr`.
    fn render_commands(&mut self, route_ptr: u32);

    /// Switch to the route at `route_ptr` and run its render cycle.
    fn route_render_cycle(&mut self, route_ptr: u32);

    /// Mark every node outside the persistent layout subtree dirty.
    fn mark_all_non_layout_nodes_dirty(&mut self);

    /// Flush engine-side class additions.
    fn pending_classes_to_add(&mut self);

    /// Flush engine-side class removals.
    fn pending_classes_to_remove(&mut self);

    /// Post-render engine cleanup.
    fn clean_up(&mut self);

    /// Next queued motion (keyframes) id, `0` when exhausted.
    fn next_motion(&mut self) -> u32;

    /// Keyframes rule text of a motion.
    fn key_frames(&mut self, motion: u32) -> Span;
}
