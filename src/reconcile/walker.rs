use std::collections::{BTreeMap, BTreeSet};

use crate::decode::command::{RenderCommand, decode_render_command};
use crate::decode::descriptor::LayoutDescriptor;
use crate::decode::element_type::ElementType;
use crate::decode::input::{InputKind, decode_input};
use crate::dom::{ElementRef, EventType, LiveTree};
use crate::engine::{Engine, HookPhase};
use crate::foundation::core::NodePtr;
use crate::foundation::error::BridgeResult;
use crate::foundation::opts::BridgeOpts;
use crate::memory::reader::read_string;
use crate::reconcile::deferred::{DeferredOp, DeferredQueue};
use crate::reconcile::elements;
use crate::reconcile::handlers::{Behavior, HandlerMap, Listener, listener_key};
use crate::reconcile::registry::{ActiveIdentifierSet, LiveNodeRegistry, RegistryEntry};
use crate::style::cache::{StyleRuleCache, StyleTarget};

/// Whether existing elements may be updated in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RenderMode {
    /// Dirty nodes with a live element are updated in place.
    Incremental,
    /// Every dirty node gets a fresh element.
    ForceRebuild,
}

/// Counters of one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PassStats {
    /// Records decoded.
    pub visited: usize,
    /// Elements created.
    pub created: usize,
    /// Elements updated in place.
    pub updated: usize,
    /// Dialog triggers skipped for lacking a target.
    pub skipped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingExit {
    pub(crate) id: String,
    pub(crate) animation: String,
}

/// Owner of the bridge-side state that survives between passes: the node registry, the
/// visited set of the last pass, the style cache, event routing and deferred host operations.
#[derive(Clone, Debug)]
pub struct Reconciler {
    layout: LayoutDescriptor,
    pub(crate) registry: LiveNodeRegistry,
    pub(crate) active: ActiveIdentifierSet,
    pub(crate) styles: StyleRuleCache,
    pub(crate) handlers: HandlerMap,
    pub(crate) deferred: DeferredQueue,
    pub(crate) pending_exits: BTreeMap<ElementRef, PendingExit>,
    replaced: BTreeSet<ElementRef>,
}

impl Reconciler {
    /// Reconciler decoding records with `layout`.
    pub fn new(layout: LayoutDescriptor, opts: &BridgeOpts) -> Self {
        Self {
            layout,
            registry: LiveNodeRegistry::default(),
            active: ActiveIdentifierSet::default(),
            styles: StyleRuleCache::new(opts.class_prefix.clone(), opts.hover_prefix.clone()),
            handlers: HandlerMap::default(),
            deferred: DeferredQueue::default(),
            pending_exits: BTreeMap::new(),
            replaced: BTreeSet::new(),
        }
    }

    pub fn layout(&self) -> &LayoutDescriptor {
        &self.layout
    }

    pub fn registry(&self) -> &LiveNodeRegistry {
        &self.registry
    }

    /// Identifiers visited by the last pass.
    pub fn active(&self) -> &ActiveIdentifierSet {
        &self.active
    }

    pub fn styles(&self) -> &StyleRuleCache {
        &self.styles
    }

    pub fn handlers(&self) -> &HandlerMap {
        &self.handlers
    }

    /// Host operations waiting for the next frame.
    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    /// Number of elements waiting for their exit animation to end.
    pub fn pending_exit_count(&self) -> usize {
        self.pending_exits.len()
    }

    /// Walk the engine tree from its root and bring the live tree in line with it.
    ///
    /// The visited set is rebuilt from scratch.
    #[tracing::instrument(skip_all, fields(mode = ?mode))]
    pub fn reconcile_pass(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        mode: RenderMode,
    ) -> BridgeResult<PassStats> {
        self.active.clear();
        let mut stats = PassStats::default();
        let tree = engine.render_tree_ptr();
        let mount = dom.root();
        let walked = self.traverse(engine, dom, Some(mount), tree, mode, &mut stats);
        self.replaced.clear();
        walked?;
        tracing::debug!(?stats, "reconcile pass complete");
        Ok(stats)
    }

    fn traverse(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        parent: Option<ElementRef>,
        node: NodePtr,
        mode: RenderMode,
        stats: &mut PassStats,
    ) -> BridgeResult<()> {
        let Some(parent) = parent else {
            return Ok(());
        };

        let count = engine.child_count(node);
        for i in 0..count {
            let child = engine.child(node, i);
            let offset = engine.render_command_ptr(child);
            let cmd = decode_render_command(engine, &self.layout, offset)?;
            stats.visited += 1;
            self.active.insert(cmd.id.clone());

            if cmd.is_dirty && cmd.elem_type.is_dialog_trigger() && cmd.props.dialog_id.is_empty()
            {
                tracing::warn!(id = %cmd.id, "dialog trigger without a dialog id; skipped");
                stats.skipped += 1;
                continue;
            }

            let existing = self.existing_element(dom, parent, &cmd.id)?;
            if !cmd.is_dirty {
                self.traverse(engine, dom, existing, child, mode, stats)?;
                continue;
            }

            engine.set_dirty_false(cmd.node);
            match existing {
                Some(el) if mode == RenderMode::Incremental => {
                    self.update(engine, dom, el, &cmd)?;
                    stats.updated += 1;
                    self.traverse(engine, dom, Some(el), child, mode, stats)?;
                }
                _ => {
                    self.create(engine, dom, parent, child, existing, &cmd, mode, stats)?;
                    stats.created += 1;
                }
            }
        }
        Ok(())
    }

    fn live_element(&self, dom: &dyn LiveTree, id: &str) -> Option<ElementRef> {
        dom.element_by_id(id)
            .filter(|el| !self.pending_exits.contains_key(el))
    }

    /// Element currently standing for `id` under `parent`.
    ///
    /// Besides connected elements this finds registered elements inside a subtree that is
    /// still being built (their parent is `parent`), and registered elements left inside an
    /// element replaced earlier in this pass, which are moved under `parent`.
    fn existing_element(
        &mut self,
        dom: &mut dyn LiveTree,
        parent: ElementRef,
        id: &str,
    ) -> BridgeResult<Option<ElementRef>> {
        if let Some(el) = self.live_element(&*dom, id) {
            return Ok(Some(el));
        }
        let Some(el) = self.registry.get(id).map(|e| e.element) else {
            return Ok(None);
        };
        if self.pending_exits.contains_key(&el) {
            return Ok(None);
        }
        match dom.parent(el) {
            Some(p) if p == parent => Ok(Some(el)),
            Some(old) if self.replaced.contains(&old) => {
                dom.append_child(parent, el)?;
                tracing::debug!(id, "element carried over to its rebuilt parent");
                Ok(Some(el))
            }
            _ => Ok(None),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        parent: ElementRef,
        node: NodePtr,
        existing: Option<ElementRef>,
        cmd: &RenderCommand,
        mode: RenderMode,
        stats: &mut PassStats,
    ) -> BridgeResult<()> {
        if let Some(old) = existing.or_else(|| dom.element_by_id(&cmd.id)) {
            dom.detach(old);
            self.pending_exits.remove(&old);
            self.replaced.insert(old);
        }
        self.handlers.forget(&cmd.id);

        let spec = elements::element_spec(cmd);
        let el = elements::materialize(dom, cmd, &spec);
        if let Some(behavior) = spec.on_click {
            self.handlers.bind(&cmd.id, EventType::Click, behavior);
            dom.listen(el, EventType::Click);
        }
        if cmd.elem_type == ElementType::Input {
            self.setup_input(engine, dom, el, cmd)?;
        }

        self.apply_style(&*engine, dom, el, cmd)?;
        self.register(cmd, el);

        self.traverse(engine, dom, Some(el), node, mode, stats)?;
        dom.append_child(parent, el)?;
        fire_creation_hooks(engine, cmd);
        Ok(())
    }

    fn update(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        el: ElementRef,
        cmd: &RenderCommand,
    ) -> BridgeResult<()> {
        elements::update_content(dom, el, cmd);
        self.apply_style(&*engine, dom, el, cmd)?;
        self.register(cmd, el);
        Ok(())
    }

    fn register(&mut self, cmd: &RenderCommand, el: ElementRef) {
        self.registry.insert(
            cmd.id.clone(),
            RegistryEntry {
                element: el,
                exit_animation_id: cmd.exit_animation_id.clone(),
                destroy_id: cmd.hooks.destroy_id(),
            },
        );
    }

    fn apply_style(
        &mut self,
        engine: &dyn Engine,
        dom: &mut dyn LiveTree,
        el: ElementRef,
        cmd: &RenderCommand,
    ) -> BridgeResult<()> {
        let icon = cmd.elem_type.is_icon();
        let target = StyleTarget {
            node: cmd.node,
            element: el,
            id: &cmd.id,
            style_id: &cmd.style_id,
            icon,
        };
        self.styles.apply(dom, engine, target, &cmd.props.css)?;
        if !cmd.props.hover_css.is_empty() {
            self.styles
                .apply_hover(dom, el, &cmd.id, &cmd.style_id, icon, &cmd.props.hover_css)?;
        }
        Ok(())
    }

    fn setup_input(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        el: ElementRef,
        cmd: &RenderCommand,
    ) -> BridgeResult<()> {
        let rec = decode_input(engine, cmd.node)?;
        if !rec.name.is_empty() {
            dom.set_attribute(el, "name", &rec.name);
        }
        if let Some(ty) = rec.kind.html_type() {
            dom.set_attribute(el, "type", ty);
        }
        if let Some(placeholder) = &rec.placeholder {
            dom.set_attribute(el, "placeholder", placeholder);
        }
        if let Some(value) = &rec.value {
            dom.set_value(el, value);
        }
        if let Some(n) = rec.min_len {
            dom.set_attribute(el, "minlength", &n.to_string());
        }
        if let Some(n) = rec.max_len {
            dom.set_attribute(el, "maxlength", &n.to_string());
        }
        if rec.kind == InputKind::Radio {
            let span = engine.check_mark_style(cmd.node);
            let css = read_string(engine.memory(), span)?;
            if !css.is_empty() {
                self.styles.apply_check_mark(dom, el, &cmd.id, &css)?;
            }
        }
        if rec.on_input > 0 {
            self.deferred.push(DeferredOp::Listen {
                key: listener_key(rec.on_input, &cmd.id),
                listener: Listener {
                    element: cmd.id.clone(),
                    event: EventType::Input,
                    behavior: Behavior::EngineEvent {
                        callback: rec.on_input,
                    },
                },
            });
        }
        Ok(())
    }

    /// Route-transition teardown: remove the live element and registry entry of every dirty
    /// node, then mark it clean. Clean (layout) nodes stay; their subtrees are still searched.
    ///
    /// Descendants of a removed node lose their registry entries and fire their destroy hooks
    /// too, since their elements leave the live tree with the ancestor.
    #[tracing::instrument(skip_all)]
    pub fn removal_pass(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
    ) -> BridgeResult<usize> {
        let tree = engine.render_tree_ptr();
        let mut removed = 0;
        self.traverse_remove(engine, dom, tree, false, &mut removed)?;
        tracing::debug!(removed, "removal pass complete");
        Ok(removed)
    }

    fn traverse_remove(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        node: NodePtr,
        inside_removed: bool,
        removed: &mut usize,
    ) -> BridgeResult<()> {
        let count = engine.child_count(node);
        for i in 0..count {
            let child = engine.child(node, i);
            let offset = engine.render_command_ptr(child);
            let cmd = decode_render_command(engine, &self.layout, offset)?;
            if cmd.is_dirty {
                engine.set_dirty_false(cmd.node);
            }
            let doomed = cmd.is_dirty || inside_removed;
            if doomed && self.remove_one(engine, dom, &cmd.id, !inside_removed) {
                *removed += 1;
            }
            self.traverse_remove(engine, dom, child, doomed, removed)?;
        }
        Ok(())
    }

    fn remove_one(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        id: &str,
        expect_connected: bool,
    ) -> bool {
        let Some(entry) = self.registry.remove(id) else {
            let stray = self.live_element(&*dom, id);
            debug_assert!(stray.is_none(), "live element '{id}' has no registry entry");
            if let Some(el) = stray {
                tracing::warn!(id, "removing unregistered live element");
                dom.detach(el);
            }
            return false;
        };
        let pending = self.pending_exits.remove(&entry.element).is_some();
        if expect_connected && !pending && !dom.is_connected(entry.element) {
            debug_assert!(false, "registered node '{id}' is missing from the live tree");
            tracing::warn!(id, "registered node is missing from the live tree");
        }
        if let Some(destroy) = entry.destroy_id {
            engine.hook_callback(HookPhase::Destroy, destroy);
        }
        self.handlers.forget(id);
        dom.detach(entry.element);
        true
    }
}

fn fire_creation_hooks(engine: &mut dyn Engine, cmd: &RenderCommand) {
    let h = cmd.hooks;
    if cmd.elem_type.is_context() {
        if h.mounted > 0 {
            engine.hook_callback(HookPhase::CtxMounted, h.mounted);
        }
        return;
    }
    for (phase, id) in [
        (HookPhase::Created, h.created),
        (HookPhase::Mounted, h.mounted),
        (HookPhase::Updated, h.updated),
    ] {
        if id > 0 {
            engine.hook_callback(phase, id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/walker.rs"]
mod tests;
