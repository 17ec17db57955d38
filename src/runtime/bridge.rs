use std::collections::BTreeMap;

use crate::decode::descriptor::LayoutDescriptor;
use crate::dom::{DomEvent, EventType, LiveTree};
use crate::engine::Engine;
use crate::foundation::core::{canonical_route, pathname_of};
use crate::foundation::error::BridgeResult;
use crate::foundation::opts::BridgeOpts;
use crate::memory::reader::read_string;
use crate::reconcile::deferred::DeferredOp;
use crate::reconcile::handlers::Behavior;
use crate::reconcile::walker::{PassStats, Reconciler, RenderMode};
use crate::runtime::tasks::{Fetcher, StaticFetcher, TaskQueue};

/// What one call to [`Bridge::frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum FrameOutcome {
    /// No rerender was requested.
    Idle,
    /// A reconciliation pass ran.
    Rendered(PassStats),
    /// The frame failed; the loop keeps going.
    Failed,
    /// Too many consecutive failures; frames are no longer processed.
    Halted,
}

/// Engine, live tree and reconciler wired together and driven frame by frame.
///
/// The bridge is single-threaded: a pass always runs to completion before the next frame.
pub struct Bridge<E: Engine, D: LiveTree> {
    pub(crate) engine: E,
    pub(crate) dom: D,
    pub(crate) opts: BridgeOpts,
    pub(crate) reconciler: Reconciler,
    pub(crate) tasks: TaskQueue,
    pub(crate) fetcher: Box<dyn Fetcher>,
    pub(crate) route_hooks: BTreeMap<String, u32>,
    pub(crate) current_path: String,
    pub(crate) now_ms: u64,
    failures: u32,
    halted: bool,
}

impl<E: Engine, D: LiveTree> Bridge<E, D> {
    /// Start the bridge: instantiate the engine UI, read the layout descriptor, install
    /// keyframes and render the route of the live tree's current location.
    #[tracing::instrument(skip_all)]
    pub fn init(mut engine: E, mut dom: D, opts: BridgeOpts) -> BridgeResult<Self> {
        opts.validate()?;
        engine.instantiate(opts.viewport.width, opts.viewport.height);
        let layout = LayoutDescriptor::load(&mut engine)?;
        let mut reconciler = Reconciler::new(layout, &opts);

        let mut motions = 0;
        loop {
            let motion = engine.next_motion();
            if motion == 0 {
                break;
            }
            let span = engine.key_frames(motion);
            let text = read_string(engine.memory(), span)?;
            if !text.is_empty() {
                reconciler.styles.append_raw(&mut dom, &text)?;
                motions += 1;
            }
        }

        let path = dom.pathname();
        let route = canonical_route(&path, &opts.root_route).to_string();
        let ptr = engine.alloc_string(route.as_bytes());
        engine.render_commands(ptr);
        let stats = reconciler.reconcile_pass(&mut engine, &mut dom, RenderMode::ForceRebuild)?;
        engine.pending_classes_to_add();
        engine.pending_classes_to_remove();
        engine.reset_rerender();
        tracing::info!(%route, motions, created = stats.created, "bridge initialized");

        Ok(Self {
            engine,
            dom,
            opts,
            reconciler,
            tasks: TaskQueue::default(),
            fetcher: Box::new(StaticFetcher::default()),
            route_hooks: BTreeMap::new(),
            current_path: path,
            now_ms: 0,
            failures: 0,
            halted: false,
        })
    }

    /// Replace the network collaborator used for engine fetches.
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Reconciliation state.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Outstanding asynchronous work.
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    pub fn opts(&self) -> &BridgeOpts {
        &self.opts
    }

    /// Location path the bridge last rendered.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Frames failed in a row.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Return `true` once the failure threshold stopped the loop.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Hand back the engine and the live tree.
    pub fn into_parts(self) -> (E, D) {
        (self.engine, self.dom)
    }

    /// Run one animation frame at time `now_ms`.
    ///
    /// Errors are logged and counted, never returned: the loop favors availability. It halts
    /// once `max_consecutive_failures` frames in a row have failed.
    #[tracing::instrument(skip(self))]
    pub fn frame(&mut self, now_ms: u64) -> FrameOutcome {
        if self.halted {
            return FrameOutcome::Halted;
        }
        self.now_ms = now_ms;
        match self.run_frame(now_ms) {
            Ok(outcome) => {
                self.failures = 0;
                outcome
            }
            Err(err) => {
                self.failures += 1;
                tracing::error!(error = %err, failures = self.failures, "frame failed");
                match self.opts.max_consecutive_failures {
                    Some(max) if self.failures >= max => {
                        self.halted = true;
                        tracing::error!(failures = self.failures, "render loop halted");
                        FrameOutcome::Halted
                    }
                    _ => FrameOutcome::Failed,
                }
            }
        }
    }

    fn run_frame(&mut self, now_ms: u64) -> BridgeResult<FrameOutcome> {
        let r = &mut self.reconciler;
        r.deferred
            .flush(&mut self.engine, &mut self.dom, &mut r.handlers);
        self.tasks.pump(&mut self.engine, now_ms)?;

        if self.engine.should_rerender() {
            let route = canonical_route(&self.dom.pathname(), &self.opts.root_route).to_string();
            let ptr = self.engine.alloc_string(route.as_bytes());
            self.engine.render_commands(ptr);
            let stats = self.render(RenderMode::Incremental)?;
            self.engine.reset_rerender();
            self.reconciler.deferred.push(DeferredOp::CleanUp);
            return Ok(FrameOutcome::Rendered(stats));
        }
        if self.engine.grain_rerender() {
            let stats = self.render(RenderMode::Incremental)?;
            self.engine.reset_grain_rerender();
            return Ok(FrameOutcome::Rendered(stats));
        }
        Ok(FrameOutcome::Idle)
    }

    fn render(&mut self, mode: RenderMode) -> BridgeResult<PassStats> {
        let stats = self
            .reconciler
            .reconcile_pass(&mut self.engine, &mut self.dom, mode)?;
        self.engine.pending_classes_to_add();
        self.engine.pending_classes_to_remove();
        self.reconciler
            .collect_garbage(&mut self.engine, &mut self.dom);
        Ok(stats)
    }

    /// Deliver `event` to the live element with identifier `id`. Returns the number of
    /// behaviors run.
    pub fn dispatch(&mut self, id: &str, event: DomEvent) -> BridgeResult<usize> {
        let Some(el) = self.dom.element_by_id(id) else {
            tracing::debug!(id, event = event.kind.as_str(), "event target is not live");
            return Ok(0);
        };
        if event.kind == EventType::AnimationEnd {
            let name = event.animation_name.as_deref().unwrap_or_default();
            if self.reconciler.on_animation_end(&mut self.dom, el, name) {
                return Ok(1);
            }
        }

        let behaviors = self.reconciler.handlers.dispatch(id, &event.kind);
        let n = behaviors.len();
        for behavior in behaviors {
            self.run_behavior(behavior, &event)?;
        }
        Ok(n)
    }

    /// Click the element with identifier `id`.
    pub fn click(&mut self, id: &str) -> BridgeResult<usize> {
        self.dispatch(id, DomEvent::click())
    }

    /// Type `value` into the element with identifier `id`.
    pub fn input(&mut self, id: &str, value: &str) -> BridgeResult<usize> {
        if let Some(el) = self.dom.element_by_id(id) {
            self.dom.set_value(el, value);
        }
        self.dispatch(id, DomEvent::input(value))
    }

    fn run_behavior(&mut self, behavior: Behavior, event: &DomEvent) -> BridgeResult<()> {
        match behavior {
            Behavior::ButtonClick { id } => {
                let ptr = self.engine.alloc_string(id.as_bytes());
                self.engine.button_callback(ptr);
            }
            Behavior::CtxButtonClick { id } => {
                let ptr = self.engine.alloc_string(id.as_bytes());
                self.engine.ctx_button_callback(ptr);
            }
            Behavior::DialogShow { dialog, button_id } => {
                self.engine.button_callback(button_id);
                match self.dom.element_by_id(&dialog) {
                    Some(el) => self.dom.show_modal(el),
                    None => tracing::warn!(%dialog, "dialog to show is not live"),
                }
            }
            Behavior::DialogClose { dialog, button_id } => {
                self.engine.button_callback(button_id);
                match self.dom.element_by_id(&dialog) {
                    Some(el) => self.dom.close_dialog(el),
                    None => tracing::warn!(%dialog, "dialog to close is not live"),
                }
            }
            Behavior::Navigate { href } => self.navigate(&pathname_of(&href))?,
            Behavior::EngineEvent { callback } => {
                self.reconciler.handlers.store_event(callback, event.clone());
                self.engine.event_callback(callback);
            }
            Behavior::InstEvent { callback } => {
                self.reconciler.handlers.store_event(callback, event.clone());
                self.engine.event_inst_callback(callback);
            }
        }
        Ok(())
    }

    /// In-app navigation to `path`: tear down every non-layout node, switch the engine to the
    /// new route and request a global rerender for the next frame.
    #[tracing::instrument(skip(self))]
    pub fn navigate(&mut self, path: &str) -> BridgeResult<()> {
        self.engine.mark_all_non_layout_nodes_dirty();
        self.reconciler
            .removal_pass(&mut self.engine, &mut self.dom)?;
        self.leave_route();
        self.dom.push_history(path);
        self.enter_route(path);
        self.reconciler.deferred.push(DeferredOp::RequestRerender);
        self.fire_route_hooks(path);
        Ok(())
    }

    /// Navigation by the engine itself: tear down the current route, keeping only the layout
    /// subtree of `path`, and rebuild synchronously.
    #[tracing::instrument(skip(self))]
    pub fn navigate_forced(&mut self, path: &str) -> BridgeResult<PassStats> {
        self.leave_route();
        self.dom.push_history(path);
        self.enter_route(path);
        self.reconciler
            .remove_route_specific_nodes(&mut self.engine, &mut self.dom, path);
        let stats = self
            .reconciler
            .reconcile_pass(&mut self.engine, &mut self.dom, RenderMode::ForceRebuild)?;
        self.fire_route_hooks(path);
        Ok(stats)
    }

    /// History traversal already applied to the live tree's location: render the route it
    /// now points at.
    #[tracing::instrument(skip(self))]
    pub fn popstate(&mut self) -> BridgeResult<PassStats> {
        let path = self.dom.pathname();
        self.engine.mark_all_non_layout_nodes_dirty();
        self.reconciler
            .removal_pass(&mut self.engine, &mut self.dom)?;
        self.leave_route();
        self.enter_route(&path);
        let stats = self.render(RenderMode::ForceRebuild)?;
        self.fire_route_hooks(&path);
        Ok(stats)
    }

    fn leave_route(&mut self) {
        self.tasks.cancel_route(&self.current_path);
    }

    fn enter_route(&mut self, path: &str) {
        self.current_path = path.to_string();
        let route = canonical_route(path, &self.opts.root_route).to_string();
        let ptr = self.engine.alloc_string(route.as_bytes());
        self.engine.route_render_cycle(ptr);
    }

    fn fire_route_hooks(&mut self, path: &str) {
        let ids: Vec<u32> = self
            .route_hooks
            .iter()
            .filter(|(key, _)| {
                key.rsplit_once('-')
                    .is_some_and(|(endpoint, _)| endpoint == path || endpoint == "*")
            })
            .map(|(_, id)| *id)
            .collect();
        for id in ids {
            self.engine.hook_inst_callback(id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/bridge.rs"]
mod tests;
