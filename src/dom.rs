//! Host UI tree abstraction.
//!
//! [`LiveTree`] is the mutable platform tree the bridge reconciles into (a browser document,
//! a native view hierarchy, or [`crate::VirtualDom`] in tests).

pub(crate) mod virtual_dom;

use crate::foundation::error::BridgeResult;

/// Opaque handle to a live element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ElementRef(pub u32);

/// Concrete element kind (tag) created for a render command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[allow(missing_docs)]
pub enum ElementKind {
    Div,
    Paragraph,
    Heading,
    TextArea,
    Image,
    Dialog,
    Button,
    Input,
    Anchor,
    LinkTag,
    Icon,
    List,
    ListItem,
    Select,
    SelectOption,
    Label,
    Form,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    TableBody,
    Canvas,
}

impl ElementKind {
    /// HTML tag name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Paragraph => "p",
            Self::Heading => "h1",
            Self::TextArea => "textarea",
            Self::Image => "img",
            Self::Dialog => "dialog",
            Self::Button => "button",
            Self::Input => "input",
            Self::Anchor => "a",
            Self::LinkTag => "link",
            Self::Icon => "i",
            Self::List => "ul",
            Self::ListItem => "li",
            Self::Select => "select",
            Self::SelectOption => "option",
            Self::Label => "label",
            Self::Form => "form",
            Self::Table => "table",
            Self::TableRow => "tr",
            Self::TableCell => "td",
            Self::TableHeader => "th",
            Self::TableBody => "tbody",
            Self::Canvas => "canvas",
        }
    }
}

/// Event types the bridge listens for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum EventType {
    /// Pointer activation.
    Click,
    /// Form value change.
    Input,
    /// CSS animation finished.
    AnimationEnd,
    /// Any other event name registered by the engine.
    Named(String),
}

impl EventType {
    /// Parse a host event name.
    pub fn parse(name: &str) -> Self {
        match name {
            "click" => Self::Click,
            "input" => Self::Input,
            "animationend" => Self::AnimationEnd,
            other => Self::Named(other.to_string()),
        }
    }

    /// Host event name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::AnimationEnd => "animationend",
            Self::Named(name) => name,
        }
    }
}

/// An event delivered by the host to the bridge.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DomEvent {
    /// Event type.
    pub kind: EventType,
    /// Current value of the target for input-like events.
    pub value: Option<String>,
    /// Animation name for `animationend`.
    pub animation_name: Option<String>,
}

impl DomEvent {
    /// A click event.
    pub fn click() -> Self {
        Self {
            kind: EventType::Click,
            value: None,
            animation_name: None,
        }
    }

    /// An input event carrying the new value.
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            kind: EventType::Input,
            value: Some(value.into()),
            animation_name: None,
        }
    }

    /// An `animationend` event for `name`.
    pub fn animation_end(name: impl Into<String>) -> Self {
        Self {
            kind: EventType::AnimationEnd,
            value: None,
            animation_name: Some(name.into()),
        }
    }

    /// An arbitrary named event.
    pub fn named(name: &str, value: Option<String>) -> Self {
        Self {
            kind: EventType::parse(name),
            value,
            animation_name: None,
        }
    }
}

/// Stylesheet the bridge inserts class rules into.
///
/// Rule indices shift when an earlier rule is deleted; callers replace rules in place
/// (delete then insert at the same index) to keep cached indices valid.
pub trait StyleSheet {
    /// Insert `rule` at `index` (`index <= rule_count()`).
    fn insert_rule(&mut self, rule: &str, index: usize) -> BridgeResult<()>;
    /// Delete the rule at `index`.
    fn delete_rule(&mut self, index: usize) -> BridgeResult<()>;
    /// Number of rules.
    fn rule_count(&self) -> usize;
    /// Text of the rule at `index`.
    fn rule(&self, index: usize) -> Option<&str>;
}

/// Mutable host UI tree.
pub trait LiveTree: StyleSheet {
    /// Mount point all top-level elements are appended under.
    fn root(&self) -> ElementRef;
    /// Create a detached element.
    fn create_element(&mut self, kind: ElementKind) -> ElementRef;
    /// Kind of an element, `None` for unknown handles.
    fn kind(&self, el: ElementRef) -> Option<ElementKind>;
    /// Set the element's identifier.
    fn set_id(&mut self, el: ElementRef, id: &str);
    /// Connected element with identifier `id`.
    fn element_by_id(&self, id: &str) -> Option<ElementRef>;
    /// Replace text content.
    fn set_text(&mut self, el: ElementRef, text: &str);
    /// Replace inner markup.
    fn set_inner_html(&mut self, el: ElementRef, html: &str);
    /// Replace the form value.
    fn set_value(&mut self, el: ElementRef, value: &str);
    /// Set an attribute.
    fn set_attribute(&mut self, el: ElementRef, name: &str, value: &str);
    /// Read an attribute.
    fn attribute(&self, el: ElementRef, name: &str) -> Option<String>;
    /// Full class attribute (space separated).
    fn class_name(&self, el: ElementRef) -> String;
    /// Replace the class attribute.
    fn set_class_name(&mut self, el: ElementRef, class: &str);
    /// Add one class token.
    fn add_class(&mut self, el: ElementRef, class: &str);
    /// Remove one class token.
    fn remove_class(&mut self, el: ElementRef, class: &str);
    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    fn append_child(&mut self, parent: ElementRef, child: ElementRef) -> BridgeResult<()>;
    /// Detach an element (and its subtree) from its parent. No-op when already detached.
    fn detach(&mut self, el: ElementRef);
    /// Parent of an element.
    fn parent(&self, el: ElementRef) -> Option<ElementRef>;
    /// Children in order.
    fn children(&self, el: ElementRef) -> Vec<ElementRef>;
    /// Return `true` when the element is reachable from [`LiveTree::root`].
    fn is_connected(&self, el: ElementRef) -> bool;
    /// Start delivering `event` for this element.
    fn listen(&mut self, el: ElementRef, event: EventType);
    /// Stop delivering `event` for this element.
    fn unlisten(&mut self, el: ElementRef, event: &EventType);
    /// Move focus to the element.
    fn focus(&mut self, el: ElementRef);
    /// Open a dialog modally.
    fn show_modal(&mut self, el: ElementRef);
    /// Close a dialog.
    fn close_dialog(&mut self, el: ElementRef);
    /// Push `path` onto the location history.
    fn push_history(&mut self, path: &str);
    /// Current location path.
    fn pathname(&self) -> String;
    /// Write text to the clipboard.
    fn write_clipboard(&mut self, text: &str);
}
