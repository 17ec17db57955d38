use std::collections::BTreeMap;
use std::path::Path;

use crate::decode::element_type::ElementType;
use crate::decode::input::InputKind;
use crate::foundation::core::{BoundingBox, HookIds};
use crate::foundation::error::{BridgeError, BridgeResult};

/// Declarative application served by [`crate::SimEngine`].
///
/// The render tree is the `layout` nodes (kept across navigations) followed by the nodes of the
/// current route.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimApp {
    /// Persistent layout nodes.
    pub layout: Vec<SimNode>,
    /// Route id (`"/root"`, `"/docs"`, ...) to its nodes.
    pub routes: BTreeMap<String, Vec<SimNode>>,
    /// Route shown after instantiation.
    pub initial_route: String,
    /// Keyframes rules reported through the motion queue.
    pub keyframes: Vec<String>,
    /// Scripted interaction used by `fabric-bridge replay`.
    pub script: Vec<SimStep>,
}

impl SimApp {
    /// Parse a fixture from JSON.
    pub fn from_json_str(s: &str) -> BridgeResult<Self> {
        let app: Self = serde_json::from_str(s)?;
        app.validate()?;
        Ok(app)
    }

    /// Load a fixture from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::validation(format!("read fixture '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Reject fixtures whose identifiers are empty or not unique within a route.
    pub fn validate(&self) -> BridgeResult<()> {
        let mut layout_ids = Vec::new();
        collect_ids(&self.layout, &mut layout_ids);
        check_unique(&layout_ids, "layout")?;
        for (route, nodes) in &self.routes {
            if !route.starts_with('/') {
                return Err(BridgeError::validation(format!(
                    "route '{route}' must start with '/'"
                )));
            }
            let mut ids = layout_ids.clone();
            collect_ids(nodes, &mut ids);
            check_unique(&ids, route)?;
        }
        Ok(())
    }
}

fn collect_ids<'a>(nodes: &'a [SimNode], out: &mut Vec<&'a str>) {
    for n in nodes {
        out.push(&n.id);
        collect_ids(&n.children, out);
    }
}

fn check_unique(ids: &[&str], scope: &str) -> BridgeResult<()> {
    let mut seen = std::collections::BTreeSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(BridgeError::validation(format!(
                "empty node id in '{scope}'"
            )));
        }
        if !seen.insert(*id) {
            return Err(BridgeError::validation(format!(
                "duplicate node id '{id}' in '{scope}'"
            )));
        }
    }
    Ok(())
}

/// One node of a [`SimApp`] tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimNode {
    pub id: String,
    pub kind: ElementType,
    pub text: String,
    pub href: String,
    pub css: String,
    pub hover_css: String,
    pub style_id: String,
    pub exit_animation: Option<String>,
    pub dialog_id: String,
    pub btn_id: u32,
    pub hooks: HookIds,
    pub input: Option<SimInput>,
    pub check_mark_css: String,
    pub hide_scroll_bar: bool,
    pub extra_classes: bool,
    pub show: bool,
    pub bbox: BoundingBox,
    pub children: Vec<SimNode>,
}

impl Default for SimNode {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: ElementType::Flexbox,
            text: String::new(),
            href: String::new(),
            css: String::new(),
            hover_css: String::new(),
            style_id: String::new(),
            exit_animation: None,
            dialog_id: String::new(),
            btn_id: 0,
            hooks: HookIds::default(),
            input: None,
            check_mark_css: String::new(),
            hide_scroll_bar: false,
            extra_classes: false,
            show: true,
            bbox: BoundingBox::default(),
            children: Vec::new(),
        }
    }
}

impl SimNode {
    /// Node of `kind` with identifier `id`.
    pub fn new(id: impl Into<String>, kind: ElementType) -> Self {
        Self {
            id: id.into(),
            kind,
            ..Self::default()
        }
    }

    /// Builder: set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: set the style declarations.
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = css.into();
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: SimNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Input sub-record of an input node.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimInput {
    pub kind: InputKind,
    pub name: String,
    /// Placeholder; parsed as a number for number inputs.
    pub placeholder: String,
    /// Initial value; parsed as a number for number inputs.
    pub value: String,
    pub min_len: u32,
    pub max_len: u32,
    pub on_input: u32,
}

impl Default for SimInput {
    fn default() -> Self {
        Self {
            kind: InputKind::Text,
            name: String::new(),
            placeholder: String::new(),
            value: String::new(),
            min_len: 0,
            max_len: 0,
            on_input: 0,
        }
    }
}

/// One scripted replay step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimStep {
    /// Run one frame.
    Frame,
    /// Click the element with this id.
    Click(String),
    /// Type into the input with this id.
    Input { id: String, value: String },
    /// Navigate to a path.
    Navigate(String),
    /// Replace a node's text on the engine side.
    SetText { id: String, text: String },
    /// Replace a node's style on the engine side.
    SetCss { id: String, css: String },
    /// Remove a node on the engine side.
    Remove(String),
}

#[cfg(test)]
#[path = "../../tests/unit/engine/fixture.rs"]
mod tests;
