use crate::dom::{EventType, LiveTree};
use crate::engine::Engine;
use crate::foundation::core::Span;
use crate::foundation::error::BridgeResult;
use crate::memory::reader::read_string;
use crate::reconcile::deferred::DeferredOp;
use crate::reconcile::handlers::{Behavior, Listener, inst_listener_key, listener_key};
use crate::runtime::bridge::Bridge;
use crate::runtime::tasks::{FetchRequest, TimerKind};

/// A call the engine makes into the host. String arguments are `(ptr, len)` spans into engine
/// memory, decoded when the call is served.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCall {
    /// Forward a message to the log.
    ConsoleLog { text: Span },
    /// Write text to the clipboard.
    CopyText { text: Span },
    /// Listen for `event` on an element; delivered through the generic event callback.
    AddListener { element: Span, event: Span, callback: u32 },
    /// Listen for `event` on an element; delivered through the instance event callback.
    AddInstListener { element: Span, event: Span, callback: u32 },
    /// Drop a listener added with [`HostCall::AddListener`].
    RemoveListener { element: Span, event: Span, callback: u32 },
    /// Listen for `event` on the whole document.
    DocumentListener { event: Span, callback: u32 },
    /// Last input value delivered to `callback`, as an engine string.
    EventValue { callback: u32 },
    /// Focus an element.
    Focus { element: Span },
    /// Set an attribute of an element.
    SetAttribute { element: Span, name: Span, value: Span },
    /// Add a class token at the next frame boundary.
    AddClass { element: Span, class: Span },
    /// Remove a class token at the next frame boundary.
    RemoveClass { element: Span, class: Span },
    /// Open a dialog modally.
    ShowDialog { element: Span },
    /// Close a dialog.
    CloseDialog { element: Span },
    /// Click an element.
    Click { element: Span },
    /// Insert a complete style rule.
    CreateClass { rule: Span },
    /// Detach an element.
    RemoveFromParent { element: Span },
    /// Move `child` under `parent`.
    AddChild { parent: Span, child: Span },
    /// Navigate and rebuild synchronously.
    Navigate { path: Span },
    /// Register a route hook keyed `"<endpoint>-<id>"`.
    CreateHook { endpoint: Span, id: u32 },
    /// GET `url`, resuming task `callback` with the result.
    Fetch { url: Span, callback: u32 },
    /// Fetch `url` with JSON request options.
    FetchWithParams { url: Span, callback: u32, options: Span },
    /// Button callback after `ms`.
    Timeout { ms: u32, callback: u32 },
    /// Context button callback after `ms`.
    TimeoutCtx { ms: u32, callback: u32 },
    /// Recurring tick every `delay_ms`, owned by the current route.
    CreateInterval { name: Span, delay_ms: u32 },
}

impl<E: Engine, D: LiveTree> Bridge<E, D> {
    /// Serve a host call. Returns an engine string pointer for calls that produce a value,
    /// `0` otherwise.
    pub fn host_call(&mut self, call: HostCall) -> BridgeResult<u32> {
        match call {
            HostCall::ConsoleLog { text } => {
                let text = self.text(text)?;
                tracing::info!(target: "fabric::engine", "{text}");
            }
            HostCall::CopyText { text } => {
                let text = self.text(text)?;
                self.dom.write_clipboard(&text);
            }
            HostCall::AddListener {
                element,
                event,
                callback,
            } => {
                let element = self.text(element)?;
                let event = EventType::parse(&self.text(event)?);
                self.reconciler.deferred.push(DeferredOp::Listen {
                    key: listener_key(callback, &element),
                    listener: Listener {
                        element,
                        event,
                        behavior: Behavior::EngineEvent { callback },
                    },
                });
            }
            HostCall::AddInstListener {
                element,
                event,
                callback,
            } => {
                let element = self.text(element)?;
                let event = EventType::parse(&self.text(event)?);
                self.reconciler.deferred.push(DeferredOp::Listen {
                    key: inst_listener_key(callback, &element),
                    listener: Listener {
                        element,
                        event,
                        behavior: Behavior::InstEvent { callback },
                    },
                });
            }
            HostCall::RemoveListener {
                element,
                event,
                callback,
            } => {
                let element = self.text(element)?;
                let event = self.text(event)?;
                let key = listener_key(callback, &element);
                if self.reconciler.handlers.remove_listener(&key).is_none() {
                    tracing::debug!(%key, %event, "no listener to remove");
                }
            }
            HostCall::DocumentListener { event, callback } => {
                let event = EventType::parse(&self.text(event)?);
                self.reconciler.handlers.add_document_listener(event, callback);
            }
            HostCall::EventValue { callback } => {
                let value = self
                    .reconciler
                    .handlers
                    .event_data(callback)
                    .and_then(|e| e.value.clone())
                    .unwrap_or_default();
                return Ok(self.engine.alloc_string(value.as_bytes()));
            }
            HostCall::Focus { element } => {
                let id = self.text(element)?;
                self.reconciler.deferred.push(DeferredOp::Focus { id });
            }
            HostCall::SetAttribute {
                element,
                name,
                value,
            } => {
                let op = DeferredOp::SetAttribute {
                    id: self.text(element)?,
                    name: self.text(name)?,
                    value: self.text(value)?,
                };
                self.reconciler.deferred.push(op);
            }
            HostCall::AddClass { element, class } => {
                let op = DeferredOp::AddClass {
                    id: self.text(element)?,
                    class: self.text(class)?,
                };
                self.reconciler.deferred.push(op);
            }
            HostCall::RemoveClass { element, class } => {
                let op = DeferredOp::RemoveClass {
                    id: self.text(element)?,
                    class: self.text(class)?,
                };
                self.reconciler.deferred.push(op);
            }
            HostCall::ShowDialog { element } => {
                let id = self.text(element)?;
                self.reconciler.deferred.push(DeferredOp::ShowModal { id });
            }
            HostCall::CloseDialog { element } => {
                let id = self.text(element)?;
                self.reconciler.deferred.push(DeferredOp::CloseDialog { id });
            }
            HostCall::Click { element } => {
                let id = self.text(element)?;
                self.click(&id)?;
            }
            HostCall::CreateClass { rule } => {
                let rule = self.text(rule)?;
                let styles = &mut self.reconciler.styles;
                match simple_class_rule(&rule) {
                    Some((class, css)) => styles.create_class(&mut self.dom, class, css)?,
                    None => styles.append_raw(&mut self.dom, &rule)?,
                }
            }
            HostCall::RemoveFromParent { element } => {
                let id = self.text(element)?;
                if let Some(el) = self.live(&id) {
                    self.dom.detach(el);
                }
            }
            HostCall::AddChild { parent, child } => {
                let (parent, child) = (self.text(parent)?, self.text(child)?);
                if let (Some(p), Some(c)) = (self.live(&parent), self.live(&child)) {
                    self.dom.append_child(p, c)?;
                }
            }
            HostCall::Navigate { path } => {
                let path = self.text(path)?;
                self.navigate_forced(&path)?;
            }
            HostCall::CreateHook { endpoint, id } => {
                let endpoint = self.text(endpoint)?;
                let key = format!("{endpoint}-{id}");
                tracing::debug!(%key, "route hook registered");
                self.route_hooks.insert(key, id);
            }
            HostCall::Fetch { url, callback } => {
                let request = FetchRequest::get(self.text(url)?);
                self.tasks
                    .submit_fetch(self.fetcher.as_mut(), callback, request);
            }
            HostCall::FetchWithParams {
                url,
                callback,
                options,
            } => {
                let request = FetchRequest::with_options_json(self.text(url)?, &self.text(options)?)?;
                self.tasks
                    .submit_fetch(self.fetcher.as_mut(), callback, request);
            }
            HostCall::Timeout { ms, callback } => {
                self.tasks
                    .set_timeout(self.now_ms, u64::from(ms), TimerKind::Timeout { callback });
            }
            HostCall::TimeoutCtx { ms, callback } => {
                self.tasks.set_timeout(
                    self.now_ms,
                    u64::from(ms),
                    TimerKind::CtxTimeout { callback },
                );
            }
            HostCall::CreateInterval { name, delay_ms } => {
                let name = self.text(name)?;
                self.tasks
                    .set_interval(self.now_ms, &self.current_path, name, u64::from(delay_ms));
            }
        }
        Ok(0)
    }

    fn text(&self, span: Span) -> BridgeResult<String> {
        read_string(self.engine.memory(), span)
    }

    fn live(&self, id: &str) -> Option<crate::dom::ElementRef> {
        let el = self.dom.element_by_id(id);
        if el.is_none() {
            tracing::debug!(id, "host call target is not live");
        }
        el
    }
}

/// Split `.name { body }` into `("name", "body")`. Anything else (compound selectors, at-rules)
/// is `None`.
fn simple_class_rule(rule: &str) -> Option<(&str, &str)> {
    let (selector, rest) = rule.split_once('{')?;
    let class = selector.trim().strip_prefix('.')?;
    if class.is_empty() || !class.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    let body = rest.trim_end().strip_suffix('}')?.trim();
    Some((class, body))
}

#[cfg(test)]
#[path = "../../tests/unit/host/calls.rs"]
mod tests;
