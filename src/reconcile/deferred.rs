use std::collections::VecDeque;

use crate::dom::{ElementRef, LiveTree};
use crate::engine::Engine;
use crate::reconcile::handlers::{HandlerMap, Listener};

/// Host-boundary operation applied at the next frame boundary.
///
/// Elements are addressed by identifier and resolved when the operation runs, so an operation
/// queued during a pass can target an element appended later in the same pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredOp {
    /// Move focus to the element.
    Focus { id: String },
    /// Set an attribute.
    SetAttribute { id: String, name: String, value: String },
    /// Add a class token.
    AddClass { id: String, class: String },
    /// Remove a class token.
    RemoveClass { id: String, class: String },
    /// Open a dialog modally.
    ShowModal { id: String },
    /// Close a dialog.
    CloseDialog { id: String },
    /// Register a keyed listener and start delivering its event.
    Listen { key: String, listener: Listener },
    /// Raise the engine's global rerender flag.
    RequestRerender,
    /// Run the engine's post-render cleanup.
    CleanUp,
}

/// FIFO of [`DeferredOp`]s. Fire-and-forget: nothing is reported back to the engine.
#[derive(Clone, Debug, Default)]
pub struct DeferredQueue {
    ops: VecDeque<DeferredOp>,
}

impl DeferredQueue {
    pub fn push(&mut self, op: DeferredOp) {
        self.ops.push_back(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeferredOp> {
        self.ops.iter()
    }

    /// Apply every operation queued before this call. Returns how many were applied.
    pub fn flush(
        &mut self,
        engine: &mut dyn Engine,
        dom: &mut dyn LiveTree,
        handlers: &mut HandlerMap,
    ) -> usize {
        let ops = std::mem::take(&mut self.ops);
        let n = ops.len();
        for op in ops {
            apply(op, engine, dom, handlers);
        }
        n
    }
}

fn apply(op: DeferredOp, engine: &mut dyn Engine, dom: &mut dyn LiveTree, handlers: &mut HandlerMap) {
    match op {
        DeferredOp::Focus { id } => {
            if let Some(el) = lookup(&*dom, &id) {
                dom.focus(el);
            }
        }
        DeferredOp::SetAttribute { id, name, value } => {
            if let Some(el) = lookup(&*dom, &id) {
                dom.set_attribute(el, &name, &value);
            }
        }
        DeferredOp::AddClass { id, class } => {
            if let Some(el) = lookup(&*dom, &id) {
                dom.add_class(el, &class);
            }
        }
        DeferredOp::RemoveClass { id, class } => {
            if let Some(el) = lookup(&*dom, &id) {
                dom.remove_class(el, &class);
            }
        }
        DeferredOp::ShowModal { id } => {
            if let Some(el) = lookup(&*dom, &id) {
                dom.show_modal(el);
            }
        }
        DeferredOp::CloseDialog { id } => {
            if let Some(el) = lookup(&*dom, &id) {
                dom.close_dialog(el);
            }
        }
        DeferredOp::Listen { key, listener } => {
            let Some(el) = lookup(&*dom, &listener.element) else {
                tracing::warn!(%key, "listener target missing; listener dropped");
                return;
            };
            dom.listen(el, listener.event.clone());
            handlers.add_listener(key, listener);
        }
        DeferredOp::RequestRerender => engine.set_rerender_true(),
        DeferredOp::CleanUp => engine.clean_up(),
    }
}

fn lookup(dom: &dyn LiveTree, id: &str) -> Option<ElementRef> {
    let el = dom.element_by_id(id);
    if el.is_none() {
        tracing::debug!(id, "deferred operation target is not in the live tree");
    }
    el
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/deferred.rs"]
mod tests;
