use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::dom::{ElementKind, ElementRef, EventType, LiveTree, StyleSheet};
use crate::foundation::error::{BridgeError, BridgeResult};

#[derive(Clone, Debug)]
struct VNode {
    kind: ElementKind,
    id: Option<String>,
    text: String,
    inner_html: Option<String>,
    value: Option<String>,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    parent: Option<ElementRef>,
    children: Vec<ElementRef>,
    listeners: BTreeSet<EventType>,
    open: bool,
}

impl VNode {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            text: String::new(),
            inner_html: None,
            value: None,
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
            listeners: BTreeSet::new(),
            open: false,
        }
    }
}

/// Serializable snapshot of a connected element subtree.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSnapshot {
    /// Tag name.
    pub tag: &'static str,
    /// Element identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Class attribute.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class: String,
    /// Text content.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Children in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

/// In-memory [`LiveTree`] with a single stylesheet.
///
/// Elements live in an arena and are never freed; detached elements simply stop being
/// reachable from the root. Every mutating call bumps [`VirtualDom::mutation_count`].
#[derive(Clone, Debug)]
pub struct VirtualDom {
    nodes: Vec<VNode>,
    rules: Vec<String>,
    history: Vec<String>,
    clipboard: Option<String>,
    focused: Option<ElementRef>,
    mutations: u64,
}

impl Default for VirtualDom {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDom {
    /// Empty document with a `div#root` mount point at location `/`.
    pub fn new() -> Self {
        let mut root = VNode::new(ElementKind::Div);
        root.id = Some("root".to_string());
        Self {
            nodes: vec![root],
            rules: Vec::new(),
            history: vec!["/".to_string()],
            clipboard: None,
            focused: None,
            mutations: 0,
        }
    }

    /// Number of mutating operations applied so far (elements and stylesheet).
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Stylesheet rules in order.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Location history, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Drop the most recent history entry and return the new location, as the platform does on
    /// a back navigation.
    pub fn go_back(&mut self) -> Option<String> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        self.history.last().cloned()
    }

    /// Last text written to the clipboard.
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Currently focused element.
    pub fn focused(&self) -> Option<ElementRef> {
        self.focused
    }

    /// Text content of an element.
    pub fn text(&self, el: ElementRef) -> Option<&str> {
        self.node(el).map(|n| n.text.as_str())
    }

    /// Inner markup of an element.
    pub fn inner_html(&self, el: ElementRef) -> Option<&str> {
        self.node(el).and_then(|n| n.inner_html.as_deref())
    }

    /// Form value of an element.
    pub fn value(&self, el: ElementRef) -> Option<&str> {
        self.node(el).and_then(|n| n.value.as_deref())
    }

    /// Element identifier.
    pub fn id_of(&self, el: ElementRef) -> Option<&str> {
        self.node(el).and_then(|n| n.id.as_deref())
    }

    /// Return `true` when `event` is being delivered for the element.
    pub fn has_listener(&self, el: ElementRef, event: &EventType) -> bool {
        self.node(el).is_some_and(|n| n.listeners.contains(event))
    }

    /// Return `true` when a dialog element is open.
    pub fn is_open(&self, el: ElementRef) -> bool {
        self.node(el).is_some_and(|n| n.open)
    }

    /// Identifiers of all connected elements in document order (root excluded).
    pub fn connected_ids(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementRef> = self.nodes[0].children.iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            let Some(n) = self.node(el) else { continue };
            if let Some(id) = &n.id {
                out.push(id.clone());
            }
            stack.extend(n.children.iter().rev().copied());
        }
        out
    }

    /// Snapshot the connected tree under the root.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.nodes[0]
            .children
            .iter()
            .filter_map(|&c| self.snapshot_of(c))
            .collect()
    }

    fn snapshot_of(&self, el: ElementRef) -> Option<NodeSnapshot> {
        let n = self.node(el)?;
        Some(NodeSnapshot {
            tag: n.kind.tag(),
            id: n.id.clone(),
            class: n.classes.join(" "),
            text: n.text.clone(),
            children: n
                .children
                .iter()
                .filter_map(|&c| self.snapshot_of(c))
                .collect(),
        })
    }

    /// Serialize the connected tree (stylesheet first) as indented HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if !self.rules.is_empty() {
            out.push_str("<style>\n");
            for rule in &self.rules {
                let _ = writeln!(out, "  {rule}");
            }
            out.push_str("</style>\n");
        }
        self.write_html(&mut out, ElementRef(0), 0);
        out
    }

    fn write_html(&self, out: &mut String, el: ElementRef, depth: usize) {
        let Some(n) = self.node(el) else { return };
        let pad = "  ".repeat(depth);
        let tag = n.kind.tag();
        let _ = write!(out, "{pad}<{tag}");
        if let Some(id) = &n.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !n.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&n.classes.join(" ")));
        }
        for (k, v) in &n.attrs {
            let _ = write!(out, " {k}=\"{}\"", escape(v));
        }
        if let Some(v) = &n.value {
            let _ = write!(out, " value=\"{}\"", escape(v));
        }
        if n.open {
            out.push_str(" open");
        }
        out.push('>');
        if matches!(
            n.kind,
            ElementKind::Input | ElementKind::Image | ElementKind::LinkTag
        ) {
            out.push('\n');
            return;
        }
        if let Some(html) = &n.inner_html {
            out.push_str(html);
        } else {
            out.push_str(&escape(&n.text));
        }
        if n.children.is_empty() {
            let _ = writeln!(out, "</{tag}>");
            return;
        }
        out.push('\n');
        for &c in &n.children {
            self.write_html(out, c, depth + 1);
        }
        let _ = writeln!(out, "{pad}</{tag}>");
    }

    fn node(&self, el: ElementRef) -> Option<&VNode> {
        self.nodes.get(el.0 as usize)
    }

    fn node_mut(&mut self, el: ElementRef) -> Option<&mut VNode> {
        self.mutations += 1;
        self.nodes.get_mut(el.0 as usize)
    }

    fn is_ancestor(&self, maybe_ancestor: ElementRef, mut el: ElementRef) -> bool {
        loop {
            if el == maybe_ancestor {
                return true;
            }
            match self.node(el).and_then(|n| n.parent) {
                Some(p) => el = p,
                None => return false,
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl StyleSheet for VirtualDom {
    fn insert_rule(&mut self, rule: &str, index: usize) -> BridgeResult<()> {
        if index > self.rules.len() {
            return Err(BridgeError::dom(format!(
                "insert_rule index {index} out of range for {} rules",
                self.rules.len()
            )));
        }
        self.mutations += 1;
        self.rules.insert(index, rule.to_string());
        Ok(())
    }

    fn delete_rule(&mut self, index: usize) -> BridgeResult<()> {
        if index >= self.rules.len() {
            return Err(BridgeError::dom(format!(
                "delete_rule index {index} out of range for {} rules",
                self.rules.len()
            )));
        }
        self.mutations += 1;
        self.rules.remove(index);
        Ok(())
    }

    fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn rule(&self, index: usize) -> Option<&str> {
        self.rules.get(index).map(String::as_str)
    }
}

impl LiveTree for VirtualDom {
    fn root(&self) -> ElementRef {
        ElementRef(0)
    }

    fn create_element(&mut self, kind: ElementKind) -> ElementRef {
        self.mutations += 1;
        self.nodes.push(VNode::new(kind));
        ElementRef((self.nodes.len() - 1) as u32)
    }

    fn kind(&self, el: ElementRef) -> Option<ElementKind> {
        self.node(el).map(|n| n.kind)
    }

    fn set_id(&mut self, el: ElementRef, id: &str) {
        if let Some(n) = self.node_mut(el) {
            n.id = Some(id.to_string());
        }
    }

    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        let mut stack = vec![ElementRef(0)];
        while let Some(el) = stack.pop() {
            let n = self.node(el)?;
            if el != ElementRef(0) && n.id.as_deref() == Some(id) {
                return Some(el);
            }
            stack.extend(n.children.iter().rev().copied());
        }
        None
    }

    fn set_text(&mut self, el: ElementRef, text: &str) {
        if let Some(n) = self.node_mut(el) {
            n.text = text.to_string();
        }
    }

    fn set_inner_html(&mut self, el: ElementRef, html: &str) {
        if let Some(n) = self.node_mut(el) {
            n.inner_html = Some(html.to_string());
        }
    }

    fn set_value(&mut self, el: ElementRef, value: &str) {
        if let Some(n) = self.node_mut(el) {
            n.value = Some(value.to_string());
        }
    }

    fn set_attribute(&mut self, el: ElementRef, name: &str, value: &str) {
        if name == "class" {
            self.set_class_name(el, value);
            return;
        }
        if let Some(n) = self.node_mut(el) {
            n.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn attribute(&self, el: ElementRef, name: &str) -> Option<String> {
        let n = self.node(el)?;
        match name {
            "class" => Some(n.classes.join(" ")),
            "id" => n.id.clone(),
            _ => n.attrs.get(name).cloned(),
        }
    }

    fn class_name(&self, el: ElementRef) -> String {
        self.node(el)
            .map(|n| n.classes.join(" "))
            .unwrap_or_default()
    }

    fn set_class_name(&mut self, el: ElementRef, class: &str) {
        if let Some(n) = self.node_mut(el) {
            n.classes = class.split_whitespace().map(str::to_string).collect();
        }
    }

    fn add_class(&mut self, el: ElementRef, class: &str) {
        if let Some(n) = self.node_mut(el)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, el: ElementRef, class: &str) {
        if let Some(n) = self.node_mut(el) {
            n.classes.retain(|c| c != class);
        }
    }

    fn append_child(&mut self, parent: ElementRef, child: ElementRef) -> BridgeResult<()> {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return Err(BridgeError::dom(format!(
                "append_child with unknown element ({parent:?}, {child:?})"
            )));
        }
        if self.is_ancestor(child, parent) {
            return Err(BridgeError::dom(format!(
                "append_child would make {child:?} its own ancestor"
            )));
        }
        self.detach(child);
        self.mutations += 1;
        self.nodes[parent.0 as usize].children.push(child);
        self.nodes[child.0 as usize].parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, el: ElementRef) {
        let Some(parent) = self.node(el).and_then(|n| n.parent) else {
            return;
        };
        self.mutations += 1;
        self.nodes[parent.0 as usize].children.retain(|&c| c != el);
        self.nodes[el.0 as usize].parent = None;
    }

    fn parent(&self, el: ElementRef) -> Option<ElementRef> {
        self.node(el).and_then(|n| n.parent)
    }

    fn children(&self, el: ElementRef) -> Vec<ElementRef> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn is_connected(&self, el: ElementRef) -> bool {
        self.node(el).is_some() && self.is_ancestor(ElementRef(0), el)
    }

    fn listen(&mut self, el: ElementRef, event: EventType) {
        if let Some(n) = self.node_mut(el) {
            n.listeners.insert(event);
        }
    }

    fn unlisten(&mut self, el: ElementRef, event: &EventType) {
        if let Some(n) = self.node_mut(el) {
            n.listeners.remove(event);
        }
    }

    fn focus(&mut self, el: ElementRef) {
        self.mutations += 1;
        self.focused = Some(el);
    }

    fn show_modal(&mut self, el: ElementRef) {
        if let Some(n) = self.node_mut(el) {
            n.open = true;
        }
    }

    fn close_dialog(&mut self, el: ElementRef) {
        if let Some(n) = self.node_mut(el) {
            n.open = false;
        }
    }

    fn push_history(&mut self, path: &str) {
        self.mutations += 1;
        self.history.push(path.to_string());
    }

    fn pathname(&self) -> String {
        self.history.last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn write_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/virtual_dom.rs"]
mod tests;
