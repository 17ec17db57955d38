use std::collections::BTreeSet;

use crate::dom::{ElementRef, EventType, LiveTree};
use crate::engine::{Engine, HookPhase};
use crate::foundation::core::route_layout_key;
use crate::reconcile::registry::RegistryEntry;
use crate::reconcile::walker::{PendingExit, Reconciler};

/// Result of a garbage-collection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct GcStats {
    /// Destroy hooks invoked.
    pub destroyed: usize,
    /// Elements detached immediately.
    pub detached: usize,
    /// Elements left running their exit animation.
    pub animating: usize,
}

impl Reconciler {
    /// Invoke the destroy hook of every registered node the last pass did not visit.
    ///
    /// Registry entries are left in place; [`Self::remove_inactive_nodes`] drops them.
    #[tracing::instrument(skip_all)]
    pub fn call_destroy_hooks(&self, engine: &mut dyn Engine) -> usize {
        let mut fired = 0;
        for (id, entry) in self.registry.iter() {
            if self.active.contains(id) {
                continue;
            }
            if let Some(destroy) = entry.destroy_id {
                engine.hook_callback(HookPhase::Destroy, destroy);
                fired += 1;
            }
        }
        fired
    }

    /// Drop every registered node the last pass did not visit and remove its element.
    ///
    /// Elements with an exit animation get the animation class and stay attached until the
    /// matching `animationend` arrives through [`Self::on_animation_end`]. Doomed descendants of
    /// such an element leave with it instead of being detached first.
    #[tracing::instrument(skip_all)]
    pub fn remove_inactive_nodes(&mut self, dom: &mut dyn LiveTree) -> GcStats {
        let active = &self.active;
        let doomed = self.registry.drain_where(|id, _| !active.contains(id));
        self.retire(dom, doomed)
    }

    /// Destroy hooks followed by inactive-node removal.
    pub fn collect_garbage(&mut self, engine: &mut dyn Engine, dom: &mut dyn LiveTree) -> GcStats {
        let destroyed = self.call_destroy_hooks(engine);
        let stats = GcStats {
            destroyed,
            ..self.remove_inactive_nodes(dom)
        };
        if stats != GcStats::default() {
            tracing::debug!(?stats, "garbage collected");
        }
        stats
    }

    /// Tear down every registered node except the persistent layout subtree of `path`, firing
    /// destroy hooks on the way.
    ///
    /// The layout subtree is found by naming convention only (see
    /// [`crate::route_layout_key`]).
    #[tracing::instrument(skip(self, engine, dom))]
    pub fn remove_route_specific_nodes(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        path: &str,
    ) -> GcStats {
        let keep = route_layout_key(path);
        let mut kept: BTreeSet<ElementRef> = BTreeSet::new();
        if let Some(entry) = self.registry.get(&keep) {
            collect_subtree(dom, entry.element, &mut kept);
        }
        let doomed = self
            .registry
            .drain_where(|id, entry| id != keep && !kept.contains(&entry.element));
        let mut destroyed = 0;
        for destroy in doomed.iter().filter_map(|(_, e)| e.destroy_id) {
            engine.hook_callback(HookPhase::Destroy, destroy);
            destroyed += 1;
        }
        GcStats {
            destroyed,
            ..self.retire(dom, doomed)
        }
    }

    /// Finish the exit of `element` when `animation` is the one it was waiting for.
    ///
    /// Returns `true` when the element was removed.
    pub fn on_animation_end(
        &mut self,
        dom: &mut dyn LiveTree,
        element: ElementRef,
        animation: &str,
    ) -> bool {
        match self.pending_exits.get(&element) {
            Some(p) if p.animation == animation => {}
            Some(p) => {
                tracing::debug!(id = %p.id, animation, "unrelated animation ended");
                return false;
            }
            None => return false,
        }
        if let Some(p) = self.pending_exits.remove(&element) {
            tracing::debug!(id = %p.id, "exit animation finished");
        }
        dom.unlisten(element, &EventType::AnimationEnd);
        dom.detach(element);
        true
    }

    fn retire(&mut self, dom: &mut dyn LiveTree, doomed: Vec<(String, RegistryEntry)>) -> GcStats {
        let mut covered: BTreeSet<ElementRef> = BTreeSet::new();
        for (_, entry) in doomed.iter().filter(|(_, e)| e.exit_animation_id.is_some()) {
            for child in dom.children(entry.element) {
                collect_subtree(dom, child, &mut covered);
            }
        }

        let mut stats = GcStats::default();
        for (id, entry) in doomed {
            self.handlers.forget(&id);
            if covered.contains(&entry.element) {
                continue;
            }
            match entry.exit_animation_id {
                Some(animation) if dom.is_connected(entry.element) => {
                    dom.listen(entry.element, EventType::AnimationEnd);
                    dom.add_class(entry.element, &animation);
                    self.pending_exits
                        .insert(entry.element, PendingExit { id, animation });
                    stats.animating += 1;
                }
                _ => {
                    dom.detach(entry.element);
                    stats.detached += 1;
                }
            }
        }
        stats
    }
}

fn collect_subtree(dom: &dyn LiveTree, el: ElementRef, out: &mut BTreeSet<ElementRef>) {
    out.insert(el);
    for child in dom.children(el) {
        collect_subtree(dom, child, out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/lifecycle.rs"]
mod tests;
