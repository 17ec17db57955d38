use std::collections::BTreeMap;

use crate::decode::descriptor::LayoutDescriptor;
use crate::decode::element_type::ElementType;
use crate::decode::input::{
    INPUT_RECORD_SIZE, IN_MAX_LEN, IN_MIN_LEN, IN_NAME_LEN, IN_NAME_PTR, IN_NUMBER_VALUE,
    IN_PLACEHOLDER_LEN, IN_VALUE_LEN, IN_VALUE_PTR, IN_BODY, InputKind,
};
use crate::engine::fixture::{SimApp, SimInput, SimNode};
use crate::engine::{Engine, HookPhase};
use crate::foundation::core::{NodePtr, Span};
use crate::foundation::error::{BridgeError, BridgeResult};
use crate::memory::reader::read_cstr;

const DESCRIPTOR_PTR: u32 = 8;
const RECORDS_BASE: u32 = 128;
const RECORD_SIZE: u32 = 96;

/// Record format used by the simulated engine. Field order deliberately differs from the
/// descriptor word order.
pub const SIM_LAYOUT: LayoutDescriptor = LayoutDescriptor {
    render_command_size: RECORD_SIZE,
    bounding_box: 16,
    elem_type: 12,
    text_ptr: 32,
    text_len: 36,
    href_ptr: 40,
    href_len: 44,
    props_offset: 68,
    props_size: 28,
    props_btn_id: 0,
    dialog_id_ptr: 4,
    dialog_id_len: 8,
    id_ptr: 4,
    id_len: 8,
    show: 13,
    hooks: 48,
    node_ptr: 0,
    props_hover_offset: 64,
    props_hover_size: 4,
    props_exit_animation: 12,
    props_exit_animation_len: 16,
    props_style_id: 20,
    props_style_id_len: 24,
};

/// Argument the bridge passed to a button callback.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ButtonArg {
    /// Pointer to an allocated identifier string.
    Id(String),
    /// Raw button id.
    Raw(u32),
}

/// Every entry point call the bridge made into a [`SimEngine`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[allow(missing_docs)]
pub enum EngineCall {
    Instantiate { width: u32, height: u32 },
    Button(ButtonArg),
    CtxButton(ButtonArg),
    Hook { phase: HookPhase, id: u32 },
    Event(u32),
    InstEvent(u32),
    InstHook(u32),
    TimeoutCtx(String),
    Resume { callback: u32, payload: String },
    ResumeFailed { callback: u32, error: String },
    AddExtraClasses(String),
    RenderCommands(String),
    RouteRenderCycle(String),
    MarkNonLayoutDirty,
    PendingClassesToAdd,
    PendingClassesToRemove,
    CleanUp,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    id: String,
    record: u32,
    children: Vec<NodePtr>,
    layout: bool,
    style: Span,
    hover: Span,
    check_mark: Span,
    input: u32,
    input_kind: u32,
    on_input: u32,
    hide_scroll_bar: bool,
    extra_classes: bool,
}

/// Deterministic in-process [`Engine`] serving a [`SimApp`].
///
/// The memory image is rebuilt after every mutation and record addresses shift between
/// generations, so stale pointers held across engine calls are caught by bounds checks or
/// decode garbage instead of silently reading the old layout.
#[derive(Clone, Debug)]
pub struct SimEngine {
    app: SimApp,
    route: String,
    initialized: bool,
    generation: u32,
    mem: Vec<u8>,
    alloc_base: u32,
    slots: Vec<Slot>,
    dirty: BTreeMap<String, bool>,
    keyframes: Vec<Span>,
    next_keyframe: usize,
    rerender: bool,
    grain: bool,
    memory_fault: bool,
    calls: Vec<EngineCall>,
}

impl SimEngine {
    /// Engine serving `app`, positioned on its initial route (or `/root`).
    pub fn new(app: SimApp) -> Self {
        let route = if app.initial_route.is_empty() {
            "/root".to_string()
        } else {
            app.initial_route.clone()
        };
        let mut engine = Self {
            app,
            route,
            initialized: true,
            generation: 0,
            mem: Vec::new(),
            alloc_base: 0,
            slots: Vec::new(),
            dirty: BTreeMap::new(),
            keyframes: Vec::new(),
            next_keyframe: 0,
            rerender: false,
            grain: false,
            memory_fault: false,
            calls: Vec::new(),
        };
        engine.rebuild();
        engine
    }

    /// Engine that has not run its start routine; descriptor loading must fail.
    pub fn uninitialized(app: SimApp) -> Self {
        let mut engine = Self::new(app);
        engine.initialized = false;
        engine
    }

    /// Current route id.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    /// Hook calls recorded so far, in order.
    pub fn hook_calls(&self) -> Vec<(HookPhase, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Hook { phase, id } => Some((*phase, *id)),
                _ => None,
            })
            .collect()
    }

    /// Engine-side dirty flag of a node.
    pub fn is_node_dirty(&self, id: &str) -> Option<bool> {
        self.dirty.get(id).copied()
    }

    /// Node handle of the node with identifier `id` in the current tree.
    pub fn node_ptr_of(&self, id: &str) -> Option<NodePtr> {
        self.slots
            .iter()
            .position(|s| s.id == id && !id.is_empty())
            .map(|i| NodePtr(i as u32 + 1))
    }

    /// Replace a node's text and mark it dirty.
    pub fn set_text(&mut self, id: &str, text: &str) -> BridgeResult<()> {
        self.node_mut(id)?.text = text.to_string();
        self.touch(id);
        Ok(())
    }

    /// Replace a node's style and mark it dirty.
    pub fn set_css(&mut self, id: &str, css: &str) -> BridgeResult<()> {
        self.node_mut(id)?.css = css.to_string();
        self.touch(id);
        Ok(())
    }

    /// Append `node` under `parent`, or at the end of the current route when `parent` is
    /// `None`. The new subtree is dirty.
    pub fn push_child(&mut self, parent: Option<&str>, node: SimNode) -> BridgeResult<()> {
        match parent {
            Some(pid) => self.node_mut(pid)?.children.push(node),
            None => self
                .app
                .routes
                .entry(self.route.clone())
                .or_default()
                .push(node),
        }
        self.grain = true;
        self.rebuild();
        Ok(())
    }

    /// Remove the node with identifier `id` and its subtree.
    pub fn remove_node(&mut self, id: &str) -> BridgeResult<SimNode> {
        let removed = remove_from(&mut self.app.layout, id)
            .or_else(|| {
                self.app
                    .routes
                    .get_mut(&self.route)
                    .and_then(|nodes| remove_from(nodes, id))
            })
            .ok_or_else(|| BridgeError::validation(format!("no node '{id}'")))?;
        self.grain = true;
        self.rebuild();
        Ok(removed)
    }

    /// Mark a node dirty without changing it.
    pub fn mark_dirty(&mut self, id: &str) -> BridgeResult<()> {
        self.node_mut(id)?;
        self.touch(id);
        Ok(())
    }

    /// Simulate a memory that shrank under the bridge: while set, every read sees an empty
    /// buffer.
    pub fn set_memory_fault(&mut self, on: bool) {
        self.memory_fault = on;
    }

    /// Raise the global rerender flag, as engine state changes do.
    pub fn request_rerender(&mut self) {
        self.rerender = true;
    }

    fn touch(&mut self, id: &str) {
        self.dirty.insert(id.to_string(), true);
        self.grain = true;
        self.rebuild();
    }

    fn node_mut(&mut self, id: &str) -> BridgeResult<&mut SimNode> {
        let route = self.route.clone();
        let Self { app, .. } = self;
        if let Some(n) = find_mut(&mut app.layout, id) {
            return Ok(n);
        }
        app.routes
            .get_mut(&route)
            .and_then(|nodes| find_mut(nodes, id))
            .ok_or_else(|| BridgeError::validation(format!("no node '{id}' on route '{route}'")))
    }

    fn slot(&self, node: NodePtr) -> Option<&Slot> {
        (node.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
    }

    fn read_arg(&self, ptr: u32) -> String {
        read_cstr(&self.mem, ptr).unwrap_or_default()
    }

    fn button_arg(&self, arg: u32) -> ButtonArg {
        if arg >= self.alloc_base {
            ButtonArg::Id(self.read_arg(arg))
        } else {
            ButtonArg::Raw(arg)
        }
    }

    fn switch_route(&mut self, route: String) {
        self.route = route;
        self.rebuild();
        let ids: Vec<String> = self
            .slots
            .iter()
            .filter(|s| !s.layout && !s.id.is_empty())
            .map(|s| s.id.clone())
            .collect();
        for id in ids {
            self.dirty.insert(id, true);
        }
    }

    fn rebuild(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        let route_nodes = self
            .app
            .routes
            .get(&self.route)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let image = build_image(&self.app.layout, route_nodes, &self.app.keyframes, self.generation);
        self.mem = image.mem;
        self.alloc_base = self.mem.len() as u32;
        self.slots = image.slots;
        self.keyframes = image.keyframes;

        let live: std::collections::BTreeSet<&str> =
            self.slots.iter().map(|s| s.id.as_str()).collect();
        self.dirty.retain(|id, _| live.contains(id.as_str()));
        for s in &self.slots[1..] {
            self.dirty.entry(s.id.clone()).or_insert(true);
        }
    }
}

fn find_mut<'a>(nodes: &'a mut [SimNode], id: &str) -> Option<&'a mut SimNode> {
    for n in nodes {
        if n.id == id {
            return Some(n);
        }
        if let Some(found) = find_mut(&mut n.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_from(nodes: &mut Vec<SimNode>, id: &str) -> Option<SimNode> {
    if let Some(i) = nodes.iter().position(|n| n.id == id) {
        return Some(nodes.remove(i));
    }
    nodes.iter_mut().find_map(|n| remove_from(&mut n.children, id))
}

struct Image {
    mem: Vec<u8>,
    slots: Vec<Slot>,
    keyframes: Vec<Span>,
}

struct ImageWriter {
    mem: Vec<u8>,
}

impl ImageWriter {
    fn put_u32(&mut self, at: u32, v: u32) {
        let at = at as usize;
        self.mem[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn put_f32(&mut self, at: u32, v: f32) {
        let at = at as usize;
        self.mem[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn put_u8(&mut self, at: u32, v: u8) {
        self.mem[at as usize] = v;
    }

    fn put_span(&mut self, ptr_at: u32, len_at: u32, span: Span) {
        self.put_u32(ptr_at, span.ptr);
        self.put_u32(len_at, span.len);
    }

    fn intern(&mut self, s: &str) -> Span {
        if s.is_empty() {
            return Span::null();
        }
        let ptr = self.mem.len() as u32;
        self.mem.extend_from_slice(s.as_bytes());
        self.mem.push(0);
        Span::new(ptr, s.len() as u32)
    }

    fn reserve(&mut self, size: u32) -> u32 {
        while self.mem.len() % 4 != 0 {
            self.mem.push(0);
        }
        let ptr = self.mem.len() as u32;
        self.mem.resize(self.mem.len() + size as usize, 0);
        ptr
    }
}

fn flatten<'a>(
    node: &'a SimNode,
    layout: bool,
    order: &mut Vec<(&'a SimNode, bool)>,
    children: &mut Vec<Vec<NodePtr>>,
) -> NodePtr {
    let idx = order.len() + 1;
    order.push((node, layout));
    children.push(Vec::new());
    let kids = node
        .children
        .iter()
        .map(|c| flatten(c, layout, order, children))
        .collect();
    children[idx] = kids;
    NodePtr(idx as u32 + 1)
}

fn build_image(
    layout: &[SimNode],
    route: &[SimNode],
    keyframes: &[String],
    generation: u32,
) -> Image {
    let mut order = Vec::new();
    let mut children = vec![Vec::new()];
    let roots: Vec<NodePtr> = layout
        .iter()
        .map(|n| (n, true))
        .chain(route.iter().map(|n| (n, false)))
        .map(|(n, l)| flatten(n, l, &mut order, &mut children))
        .collect();
    children[0] = roots;

    let records = RECORDS_BASE + (generation % 8) * 16;
    let mut w = ImageWriter {
        mem: vec![0; (records + order.len() as u32 * RECORD_SIZE) as usize],
    };
    for (i, word) in SIM_LAYOUT.to_words().iter().enumerate() {
        w.put_u32(DESCRIPTOR_PTR + i as u32 * 4, *word);
    }

    let mut slots = vec![Slot {
        children: std::mem::take(&mut children[0]),
        ..Slot::default()
    }];
    for (j, (node, is_layout)) in order.iter().enumerate() {
        let rec = records + j as u32 * RECORD_SIZE;
        let l = &SIM_LAYOUT;
        let props = rec + l.props_offset;

        w.put_u32(rec + l.node_ptr, j as u32 + 2);
        let id = w.intern(&node.id);
        w.put_span(rec + l.id_ptr, rec + l.id_len, id);
        w.put_u8(rec + l.elem_type, node.kind.as_u8());
        w.put_u8(rec + l.show, u8::from(node.show));
        let bb = rec + l.bounding_box;
        w.put_f32(bb, node.bbox.x);
        w.put_f32(bb + 4, node.bbox.y);
        w.put_f32(bb + 8, node.bbox.width);
        w.put_f32(bb + 12, node.bbox.height);
        let text = w.intern(&node.text);
        w.put_span(rec + l.text_ptr, rec + l.text_len, text);
        let href = w.intern(&node.href);
        w.put_span(rec + l.href_ptr, rec + l.href_len, href);
        let h = rec + l.hooks;
        w.put_u32(h, node.hooks.created);
        w.put_u32(h + 4, node.hooks.mounted);
        w.put_u32(h + 8, node.hooks.updated);
        w.put_u32(h + 12, node.hooks.destroy);
        w.put_u8(rec + l.props_hover_offset, u8::from(!node.hover_css.is_empty()));

        w.put_u32(props + l.props_btn_id, node.btn_id);
        let dialog = w.intern(&node.dialog_id);
        w.put_span(props + l.dialog_id_ptr, props + l.dialog_id_len, dialog);
        let exit = w.intern(node.exit_animation.as_deref().unwrap_or(""));
        w.put_span(
            props + l.props_exit_animation,
            props + l.props_exit_animation_len,
            exit,
        );
        let style_id = w.intern(&node.style_id);
        w.put_span(props + l.props_style_id, props + l.props_style_id_len, style_id);

        let mut slot = Slot {
            id: node.id.clone(),
            record: rec,
            children: std::mem::take(&mut children[j + 1]),
            layout: *is_layout,
            style: w.intern(&node.css),
            hover: w.intern(&node.hover_css),
            check_mark: w.intern(&node.check_mark_css),
            hide_scroll_bar: node.hide_scroll_bar,
            extra_classes: node.extra_classes,
            ..Slot::default()
        };
        if node.kind == ElementType::Input {
            let input = node.input.clone().unwrap_or_default();
            slot.input = write_input(&mut w, &input);
            slot.input_kind = input.kind.tag();
            slot.on_input = input.on_input;
        }
        slots.push(slot);
    }

    let keyframes = keyframes.iter().map(|k| w.intern(k)).collect();
    Image {
        mem: w.mem,
        slots,
        keyframes,
    }
}

fn write_input(w: &mut ImageWriter, input: &SimInput) -> u32 {
    let name = w.intern(&input.name);
    let (placeholder, value) = match input.kind {
        InputKind::Number => (Span::null(), Span::null()),
        _ => (w.intern(&input.placeholder), w.intern(&input.value)),
    };
    let rec = w.reserve(INPUT_RECORD_SIZE);
    w.put_u32(rec, input.kind.tag());
    w.put_span(rec + IN_NAME_PTR, rec + IN_NAME_LEN, name);
    match input.kind {
        InputKind::Number => {
            w.put_u32(rec + IN_BODY, input.placeholder.parse().unwrap_or(0));
            w.put_u32(rec + IN_NUMBER_VALUE, input.value.parse().unwrap_or(0));
        }
        InputKind::Radio => {
            w.put_span(rec + IN_BODY, rec + IN_PLACEHOLDER_LEN, value);
        }
        _ => {
            w.put_span(rec + IN_BODY, rec + IN_PLACEHOLDER_LEN, placeholder);
            w.put_span(rec + IN_VALUE_PTR, rec + IN_VALUE_LEN, value);
            w.put_u32(rec + IN_MIN_LEN, input.min_len);
            w.put_u32(rec + IN_MAX_LEN, input.max_len);
        }
    }
    rec
}

impl Engine for SimEngine {
    fn memory(&self) -> &[u8] {
        if self.memory_fault { &[] } else { &self.mem }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn instantiate(&mut self, width: u32, height: u32) {
        self.calls.push(EngineCall::Instantiate { width, height });
    }

    fn allocate_layout_info(&mut self) -> u32 {
        DESCRIPTOR_PTR
    }

    fn render_tree_ptr(&self) -> NodePtr {
        NodePtr(1)
    }

    fn child_count(&self, node: NodePtr) -> u32 {
        self.slot(node).map_or(0, |s| s.children.len() as u32)
    }

    fn child(&self, node: NodePtr, index: u32) -> NodePtr {
        self.slot(node)
            .and_then(|s| s.children.get(index as usize).copied())
            .unwrap_or_default()
    }

    fn render_command_ptr(&self, node: NodePtr) -> u32 {
        self.slot(node).map_or(0, |s| s.record)
    }

    fn is_dirty(&self, node: NodePtr) -> bool {
        self.slot(node)
            .and_then(|s| self.dirty.get(&s.id))
            .copied()
            .unwrap_or(false)
    }

    fn set_dirty_false(&mut self, node: NodePtr) {
        if let Some(id) = self.slot(node).map(|s| s.id.clone()) {
            self.dirty.insert(id, false);
        }
    }

    fn style(&mut self, node: NodePtr) -> Span {
        self.slot(node).map(|s| s.style).unwrap_or_default()
    }

    fn hover_style(&mut self, node: NodePtr) -> Span {
        self.slot(node).map(|s| s.hover).unwrap_or_default()
    }

    fn check_mark_style(&mut self, node: NodePtr) -> Span {
        self.slot(node).map(|s| s.check_mark).unwrap_or_default()
    }

    fn show_scroll_bar(&self, node: NodePtr) -> bool {
        self.slot(node).is_none_or(|s| !s.hide_scroll_bar)
    }

    fn has_extra_classes(&self, node: NodePtr) -> bool {
        self.slot(node).is_some_and(|s| s.extra_classes)
    }

    fn add_extra_classes(&mut self, node: NodePtr) {
        if let Some(id) = self.slot(node).map(|s| s.id.clone()) {
            self.calls.push(EngineCall::AddExtraClasses(id));
        }
    }

    fn input_type(&self, node: NodePtr) -> u32 {
        self.slot(node).map_or(0, |s| s.input_kind)
    }

    fn create_input(&mut self, node: NodePtr) -> u32 {
        self.slot(node).map_or(0, |s| s.input)
    }

    fn input_size(&self, _node: NodePtr) -> u32 {
        INPUT_RECORD_SIZE
    }

    fn on_input_callback(&self, node: NodePtr) -> u32 {
        self.slot(node).map_or(0, |s| s.on_input)
    }

    fn button_callback(&mut self, arg: u32) {
        let arg = self.button_arg(arg);
        self.calls.push(EngineCall::Button(arg));
    }

    fn ctx_button_callback(&mut self, arg: u32) {
        let arg = self.button_arg(arg);
        self.calls.push(EngineCall::CtxButton(arg));
    }

    fn hook_callback(&mut self, phase: HookPhase, id: u32) {
        self.calls.push(EngineCall::Hook { phase, id });
    }

    fn event_callback(&mut self, id: u32) {
        self.calls.push(EngineCall::Event(id));
    }

    fn event_inst_callback(&mut self, id: u32) {
        self.calls.push(EngineCall::InstEvent(id));
    }

    fn hook_inst_callback(&mut self, id: u32) {
        self.calls.push(EngineCall::InstHook(id));
    }

    fn timeout_ctx_callback(&mut self, name_ptr: u32) {
        let name = self.read_arg(name_ptr);
        self.calls.push(EngineCall::TimeoutCtx(name));
    }

    fn resume_callback(&mut self, callback_id: u32, payload_ptr: u32) {
        let payload = self.read_arg(payload_ptr);
        self.calls.push(EngineCall::Resume {
            callback: callback_id,
            payload,
        });
    }

    fn resume_failed(&mut self, callback_id: u32, error_ptr: u32) {
        let error = self.read_arg(error_ptr);
        self.calls.push(EngineCall::ResumeFailed {
            callback: callback_id,
            error,
        });
    }

    fn should_rerender(&self) -> bool {
        self.rerender
    }

    fn grain_rerender(&self) -> bool {
        self.grain
    }

    fn reset_rerender(&mut self) {
        self.rerender = false;
    }

    fn reset_grain_rerender(&mut self) {
        self.grain = false;
    }

    fn set_rerender_true(&mut self) {
        self.rerender = true;
    }

    fn alloc_string(&mut self, bytes: &[u8]) -> u32 {
        let ptr = self.mem.len() as u32;
        self.mem.extend_from_slice(bytes);
        self.mem.push(0);
        ptr
    }

    fn render_commands(&mut self, route_ptr: u32) {
        let route = self.read_arg(route_ptr);
        self.calls.push(EngineCall::RenderCommands(route.clone()));
        self.route = route;
        self.rebuild();
    }

    fn route_render_cycle(&mut self, route_ptr: u32) {
        let route = self.read_arg(route_ptr);
        self.calls.push(EngineCall::RouteRenderCycle(route.clone()));
        self.switch_route(route);
    }

    fn mark_all_non_layout_nodes_dirty(&mut self) {
        self.calls.push(EngineCall::MarkNonLayoutDirty);
        for s in &self.slots[1..] {
            if !s.layout {
                self.dirty.insert(s.id.clone(), true);
            }
        }
    }

    fn pending_classes_to_add(&mut self) {
        self.calls.push(EngineCall::PendingClassesToAdd);
    }

    fn pending_classes_to_remove(&mut self) {
        self.calls.push(EngineCall::PendingClassesToRemove);
    }

    fn clean_up(&mut self) {
        self.calls.push(EngineCall::CleanUp);
    }

    fn next_motion(&mut self) -> u32 {
        if self.next_keyframe >= self.keyframes.len() {
            return 0;
        }
        self.next_keyframe += 1;
        self.next_keyframe as u32
    }

    fn key_frames(&mut self, motion: u32) -> Span {
        (motion as usize)
            .checked_sub(1)
            .and_then(|i| self.keyframes.get(i).copied())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/sim.rs"]
mod tests;
