use std::collections::BTreeMap;

use crate::dom::{ElementRef, LiveTree};
use crate::engine::Engine;
use crate::foundation::core::NodePtr;
use crate::foundation::error::BridgeResult;

/// Class name to stylesheet rule index.
///
/// Indices stay valid because rules are only ever replaced in place (delete then insert at the
/// same index) or appended; nothing before a cached rule is removed.
#[derive(Clone, Debug)]
pub struct StyleRuleCache {
    rules: BTreeMap<String, usize>,
    class_prefix: String,
    hover_prefix: String,
}

/// Per-element inputs to [`StyleRuleCache::apply`].
#[derive(Clone, Copy, Debug)]
pub struct StyleTarget<'a> {
    /// Engine node, consulted for scrollbar visibility.
    pub node: NodePtr,
    /// Live element.
    pub element: ElementRef,
    /// Identifier of the element.
    pub id: &'a str,
    /// Caller-supplied class, empty when none.
    pub style_id: &'a str,
    /// Icon-like elements keep their own class list.
    pub icon: bool,
}

impl StyleRuleCache {
    /// Empty cache using the given class and hover-key prefixes.
    pub fn new(class_prefix: impl Into<String>, hover_prefix: impl Into<String>) -> Self {
        Self {
            rules: BTreeMap::new(),
            class_prefix: class_prefix.into(),
            hover_prefix: hover_prefix.into(),
        }
    }

    /// Cached rule index for a class (or hover key).
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.rules.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Synthesized class of an element identifier.
    pub fn synthesized_class(&self, id: &str) -> String {
        format!("{}{id}", self.class_prefix)
    }

    /// Install `css` as the class rule of `target.element` and return the class applied.
    pub fn apply(
        &mut self,
        dom: &mut dyn LiveTree,
        engine: &dyn Engine,
        target: StyleTarget<'_>,
        css: &str,
    ) -> BridgeResult<String> {
        let synth = self.synthesized_class(target.id);
        let el = target.element;

        if let Some(index) = self.index_of(&synth) {
            replace_rule(dom, index, &class_rule(&synth, css))?;
            dom.set_class_name(el, &synth);
            return Ok(synth);
        }

        let style_id = target.style_id;
        if !style_id.is_empty()
            && let Some(index) = self.index_of(style_id)
        {
            replace_rule(dom, index, &class_rule(style_id, css))?;
            dom.set_class_name(el, style_id);
            return Ok(style_id.to_string());
        }

        let current = dom.class_name(el);
        if current.is_empty() && style_id.is_empty() {
            let index = append_rule(dom, &class_rule(&synth, css))?;
            self.rules.insert(synth.clone(), index);
            if !engine.show_scroll_bar(target.node) {
                let key = format!("{synth}::-webkit-scrollbar");
                let index = append_rule(dom, &format!(".{key} {{ display: none; }}"))?;
                self.rules.insert(key, index);
            }
            dom.set_class_name(el, &synth);
            return Ok(synth);
        }

        if !style_id.is_empty() && !target.icon {
            dom.set_class_name(el, style_id);
            let index = append_rule(dom, &class_rule(style_id, css))?;
            self.rules.insert(style_id.to_string(), index);
            return Ok(style_id.to_string());
        }

        // The element already carries a class list (icons); style its last token.
        let last = current.split_whitespace().last().unwrap_or_default();
        let rule = class_rule(last, css);
        match self.index_of(&current) {
            Some(index) => replace_rule(dom, index, &rule)?,
            None => {
                let index = append_rule(dom, &rule)?;
                self.rules.insert(current.clone(), index);
            }
        }
        Ok(current)
    }

    /// Install the hover rule of an element.
    ///
    /// With a `style_id` the rule targets that class inside the hovered element, otherwise the
    /// element's own class.
    pub fn apply_hover(
        &mut self,
        dom: &mut dyn LiveTree,
        element: ElementRef,
        id: &str,
        style_id: &str,
        icon: bool,
        hover_css: &str,
    ) -> BridgeResult<()> {
        let class = dom.class_name(element);
        let own = if icon && style_id.is_empty() {
            class.split_whitespace().last().unwrap_or_default().to_string()
        } else {
            class.split_whitespace().collect::<Vec<_>>().join(".")
        };
        let selector = if style_id.is_empty() {
            format!(".{own}:hover")
        } else {
            let child = style_id.strip_prefix('.').unwrap_or(style_id);
            format!(".{own}:hover .{child}")
        };
        let rule = format!("{selector} {{ {hover_css} }}");
        let key = format!("{}{id}", self.hover_prefix);
        self.upsert(dom, key, &rule)
    }

    /// Install the checked-state rules of a radio input and tag the element with its class.
    pub fn apply_check_mark(
        &mut self,
        dom: &mut dyn LiveTree,
        element: ElementRef,
        id: &str,
        check_css: &str,
    ) -> BridgeResult<()> {
        let class = self.synthesized_class(id);
        let checked = format!(".{class}:checked {{ {check_css} }}");
        let after = format!(
            ".{class}:checked::after {{ content: ''; position: absolute; top: 50%; left: 50%; \
             transform: translate(-50%, -50%); width: 10px; height: 10px; border-radius: 50%; \
             {check_css} }}"
        );
        self.upsert(dom, format!("{class}:checked"), &checked)?;
        self.upsert(dom, format!("{class}:checked::after"), &after)?;
        dom.add_class(element, &class);
        Ok(())
    }

    /// Append a rule verbatim (keyframes, engine-authored selectors). Never cached.
    pub fn append_raw(&mut self, dom: &mut dyn LiveTree, rule: &str) -> BridgeResult<()> {
        append_rule(dom, rule)?;
        Ok(())
    }

    /// Insert a rule under an explicit class name on behalf of the engine.
    pub fn create_class(
        &mut self,
        dom: &mut dyn LiveTree,
        class: &str,
        css: &str,
    ) -> BridgeResult<()> {
        self.upsert(dom, class.to_string(), &class_rule(class, css))
    }

    fn upsert(&mut self, dom: &mut dyn LiveTree, key: String, rule: &str) -> BridgeResult<()> {
        match self.rules.get(&key) {
            Some(&index) => replace_rule(dom, index, rule),
            None => {
                let index = append_rule(dom, rule)?;
                self.rules.insert(key, index);
                Ok(())
            }
        }
    }
}

fn class_rule(class: &str, css: &str) -> String {
    format!(".{class} {{ {css} }}")
}

fn append_rule(dom: &mut dyn LiveTree, rule: &str) -> BridgeResult<usize> {
    let index = dom.rule_count();
    dom.insert_rule(rule, index)?;
    Ok(index)
}

fn replace_rule(dom: &mut dyn LiveTree, index: usize, rule: &str) -> BridgeResult<()> {
    if dom.rule(index) == Some(rule) {
        return Ok(());
    }
    dom.delete_rule(index)?;
    dom.insert_rule(rule, index)
}

#[cfg(test)]
#[path = "../../tests/unit/style/cache.rs"]
mod tests;
