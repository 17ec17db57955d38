use crate::decode::command::RenderCommand;
use crate::decode::element_type::ElementType;
use crate::dom::{ElementKind, ElementRef, LiveTree};
use crate::reconcile::handlers::Behavior;

/// How a render command materializes as a live element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementSpec {
    /// Concrete element kind.
    pub kind: ElementKind,
    /// Literal text content.
    pub text: Option<String>,
    /// Inner markup (inline SVG).
    pub inner_html: Option<String>,
    /// Attributes set at creation.
    pub attributes: Vec<(&'static str, String)>,
    /// Initial class list.
    pub class: Option<String>,
    /// Click behavior.
    pub on_click: Option<Behavior>,
}

impl ElementSpec {
    fn of(kind: ElementKind) -> Self {
        Self {
            kind,
            text: None,
            inner_html: None,
            attributes: Vec::new(),
            class: None,
            on_click: None,
        }
    }

    fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn click(mut self, behavior: Behavior) -> Self {
        self.on_click = Some(behavior);
        self
    }
}

/// Map a render command to its element spec. Unknown types become a plain container.
pub fn element_spec(cmd: &RenderCommand) -> ElementSpec {
    use ElementType as T;
    use ElementKind as K;

    match cmd.elem_type {
        T::Text | T::AllocText => ElementSpec::of(K::Paragraph).text(&cmd.text),
        T::Header => ElementSpec::of(K::Heading).text(&cmd.text),
        T::TextArea | T::JsonEditor => ElementSpec::of(K::TextArea).text(&cmd.text),
        T::Block => ElementSpec::of(K::Div).text(&cmd.text),
        T::Svg => ElementSpec {
            inner_html: Some(cmd.text.clone()),
            ..ElementSpec::of(K::Div)
        },
        T::Image => ElementSpec::of(K::Image).attr("src", &cmd.href),
        T::Flexbox | T::BoxContainer | T::Hooks | T::Bind | T::Rectangle | T::Draggable => {
            ElementSpec::of(K::Div)
        }
        T::Dialog => ElementSpec::of(K::Dialog),
        T::DialogShow => ElementSpec::of(K::Button)
            .attr("type", "button")
            .click(Behavior::DialogShow {
                dialog: cmd.props.dialog_id.clone(),
                button_id: cmd.props.button_id,
            }),
        T::DialogClose => ElementSpec::of(K::Button)
            .attr("type", "button")
            .click(Behavior::DialogClose {
                dialog: cmd.props.dialog_id.clone(),
                button_id: cmd.props.button_id,
            }),
        T::Button => ElementSpec::of(K::Button)
            .attr("type", "button")
            .click(Behavior::ButtonClick { id: cmd.id.clone() }),
        T::ButtonCtx => ElementSpec::of(K::Button)
            .attr("type", "button")
            .click(Behavior::CtxButtonClick { id: cmd.id.clone() }),
        T::SubmitButtonCtx => ElementSpec::of(K::Button).attr("type", "submit"),
        T::Input => ElementSpec::of(K::Input),
        T::Link => ElementSpec::of(K::Anchor)
            .attr("href", &cmd.href)
            .click(Behavior::Navigate {
                href: cmd.href.clone(),
            }),
        T::RedirectLink => ElementSpec::of(K::Anchor).attr("href", &cmd.href),
        T::EmbedLink => ElementSpec::of(K::LinkTag)
            .attr("rel", "stylesheet")
            .attr("crossorigin", "anonymous")
            .attr("href", &cmd.href),
        T::EmbedIcon => ElementSpec::of(K::LinkTag)
            .attr("rel", "icon")
            .attr("crossorigin", "anonymous")
            .attr("href", &cmd.href),
        T::Icon => ElementSpec {
            class: Some(cmd.href.clone()),
            ..ElementSpec::of(K::Icon)
        },
        T::List => ElementSpec::of(K::List),
        T::ListItem => ElementSpec::of(K::ListItem),
        T::Select => ElementSpec::of(K::Select),
        T::SelectItem => ElementSpec::of(K::SelectOption),
        T::Label => ElementSpec::of(K::Label).attr("for", &cmd.href).text(&cmd.text),
        T::Form => ElementSpec::of(K::Form).attr("action", ""),
        T::Table => ElementSpec::of(K::Table),
        T::TableRow => ElementSpec::of(K::TableRow),
        T::TableCell => ElementSpec::of(K::TableCell),
        T::TableHeader => ElementSpec::of(K::TableHeader),
        T::TableBody => ElementSpec::of(K::TableBody),
        T::Canvas => ElementSpec::of(K::Canvas),
        T::If | T::Layout | T::Page | T::HooksCtx | T::Other(_) => ElementSpec::of(K::Div),
    }
}

/// Create the detached element for `cmd` and give it the command's identifier.
pub fn materialize(dom: &mut dyn LiveTree, cmd: &RenderCommand, spec: &ElementSpec) -> ElementRef {
    let el = dom.create_element(spec.kind);
    if let Some(text) = &spec.text {
        dom.set_text(el, text);
    }
    if let Some(html) = &spec.inner_html {
        dom.set_inner_html(el, html);
    }
    for (name, value) in &spec.attributes {
        dom.set_attribute(el, name, value);
    }
    if let Some(class) = &spec.class {
        dom.set_class_name(el, class);
    }
    dom.set_id(el, &cmd.id);
    el
}

/// Refresh the content of an existing element from a dirty command.
pub fn update_content(dom: &mut dyn LiveTree, el: ElementRef, cmd: &RenderCommand) {
    match cmd.elem_type {
        ElementType::Text | ElementType::Header | ElementType::AllocText | ElementType::TextArea => {
            dom.set_text(el, &cmd.text)
        }
        ElementType::Input if !cmd.text.is_empty() => dom.set_value(el, &cmd.text),
        ElementType::Icon => dom.set_class_name(el, &cmd.href),
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/elements.rs"]
mod tests;
