use std::collections::BTreeMap;

use crate::dom::{DomEvent, EventType};

/// What a live element does when an event reaches it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Behavior {
    /// Plain button: button callback with the element identifier.
    ButtonClick { id: String },
    /// Context button: context button callback with the element identifier.
    CtxButtonClick { id: String },
    /// Button callback with `button_id`, then open `dialog`.
    DialogShow { dialog: String, button_id: u32 },
    /// Button callback with `button_id`, then close `dialog`.
    DialogClose { dialog: String, button_id: u32 },
    /// In-app navigation to `href`.
    Navigate { href: String },
    /// Store the event and invoke the generic event callback.
    EngineEvent { callback: u32 },
    /// Store the event and invoke the instance event callback.
    InstEvent { callback: u32 },
}

/// Listener registered on behalf of the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    /// Identifier of the element listened on.
    pub element: String,
    /// Event type.
    pub event: EventType,
    /// Action.
    pub behavior: Behavior,
}

/// Key of an engine listener: `fb-evt-hd-<callback>-<element id>`.
pub fn listener_key(callback: u32, element: &str) -> String {
    format!("fb-evt-hd-{callback}-{element}")
}

/// Key of an engine instance listener: `fb-inst-evt-hd-<callback>-<element id>`.
pub fn inst_listener_key(callback: u32, element: &str) -> String {
    format!("fb-inst-evt-hd-{callback}-{element}")
}

/// Event routing table.
///
/// Intrinsic behaviors come from the element kind (button clicks, links, dialog triggers).
/// Keyed listeners are registered by the engine through host calls or input wiring. The last
/// event delivered to each callback is kept for later engine queries.
#[derive(Clone, Debug, Default)]
pub struct HandlerMap {
    intrinsic: BTreeMap<(String, EventType), Behavior>,
    listeners: BTreeMap<String, Listener>,
    document: Vec<(EventType, u32)>,
    event_data: BTreeMap<u32, DomEvent>,
}

impl HandlerMap {
    /// Bind the intrinsic behavior of an element, replacing any previous one.
    pub fn bind(&mut self, element: &str, event: EventType, behavior: Behavior) {
        self.intrinsic.insert((element.to_string(), event), behavior);
    }

    /// Register a keyed listener. Returns `false` when the key was already present.
    pub fn add_listener(&mut self, key: String, listener: Listener) -> bool {
        self.listeners.insert(key, listener).is_none()
    }

    /// Remove a keyed listener.
    pub fn remove_listener(&mut self, key: &str) -> Option<Listener> {
        self.listeners.remove(key)
    }

    /// Registered listener under `key`.
    pub fn listener(&self, key: &str) -> Option<&Listener> {
        self.listeners.get(key)
    }

    /// Listen for `event` on the whole document.
    pub fn add_document_listener(&mut self, event: EventType, callback: u32) {
        self.document.push((event, callback));
    }

    /// Drop every intrinsic behavior and keyed listener of an element.
    pub fn forget(&mut self, element: &str) {
        self.intrinsic.retain(|(id, _), _| id != element);
        self.listeners.retain(|_, l| l.element != element);
    }

    /// Behaviors triggered by `event` on the element `element`, intrinsic first, then keyed
    /// listeners in key order, then document listeners.
    pub fn dispatch(&self, element: &str, event: &EventType) -> Vec<Behavior> {
        let mut out = Vec::new();
        if let Some(b) = self.intrinsic.get(&(element.to_string(), event.clone())) {
            out.push(b.clone());
        }
        out.extend(
            self.listeners
                .values()
                .filter(|l| l.element == element && &l.event == event)
                .map(|l| l.behavior.clone()),
        );
        out.extend(
            self.document
                .iter()
                .filter(|(e, _)| e == event)
                .map(|(_, cb)| Behavior::EngineEvent { callback: *cb }),
        );
        out
    }

    /// Keep `event` as the last payload of `callback`.
    pub fn store_event(&mut self, callback: u32, event: DomEvent) {
        self.event_data.insert(callback, event);
    }

    /// Last payload delivered to `callback`.
    pub fn event_data(&self, callback: u32) -> Option<&DomEvent> {
        self.event_data.get(&callback)
    }

    /// Number of keyed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/handlers.rs"]
mod tests;
