/// Element-type tag stored as a single byte in every render-command record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ElementType {
    Rectangle,
    Text,
    Image,
    Flexbox,
    Input,
    Button,
    Block,
    #[serde(rename = "box")]
    BoxContainer,
    Header,
    Svg,
    Link,
    EmbedLink,
    List,
    ListItem,
    If,
    Hooks,
    Layout,
    Page,
    Bind,
    Dialog,
    DialogShow,
    DialogClose,
    Draggable,
    RedirectLink,
    Select,
    SelectItem,
    ButtonCtx,
    EmbedIcon,
    Icon,
    Label,
    Form,
    AllocText,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    TableBody,
    TextArea,
    Canvas,
    SubmitButtonCtx,
    HooksCtx,
    JsonEditor,
    /// A tag this bridge does not know; rendered as a generic container.
    Other(u8),
}

const KNOWN: [ElementType; 42] = [
    ElementType::Rectangle,
    ElementType::Text,
    ElementType::Image,
    ElementType::Flexbox,
    ElementType::Input,
    ElementType::Button,
    ElementType::Block,
    ElementType::BoxContainer,
    ElementType::Header,
    ElementType::Svg,
    ElementType::Link,
    ElementType::EmbedLink,
    ElementType::List,
    ElementType::ListItem,
    ElementType::If,
    ElementType::Hooks,
    ElementType::Layout,
    ElementType::Page,
    ElementType::Bind,
    ElementType::Dialog,
    ElementType::DialogShow,
    ElementType::DialogClose,
    ElementType::Draggable,
    ElementType::RedirectLink,
    ElementType::Select,
    ElementType::SelectItem,
    ElementType::ButtonCtx,
    ElementType::EmbedIcon,
    ElementType::Icon,
    ElementType::Label,
    ElementType::Form,
    ElementType::AllocText,
    ElementType::Table,
    ElementType::TableRow,
    ElementType::TableCell,
    ElementType::TableHeader,
    ElementType::TableBody,
    ElementType::TextArea,
    ElementType::Canvas,
    ElementType::SubmitButtonCtx,
    ElementType::HooksCtx,
    ElementType::JsonEditor,
];

impl ElementType {
    /// Decode the wire tag.
    pub fn from_u8(tag: u8) -> Self {
        KNOWN
            .get(tag as usize)
            .copied()
            .unwrap_or(Self::Other(tag))
    }

    /// Encode to the wire tag.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Other(tag) => tag,
            known => KNOWN
                .iter()
                .position(|k| *k == known)
                .map_or(u8::MAX, |i| i as u8),
        }
    }

    /// Dialog triggers require a non-empty target dialog id.
    pub fn is_dialog_trigger(self) -> bool {
        matches!(self, Self::DialogShow | Self::DialogClose)
    }

    /// Context kinds are recreated per activation and only fire the context mount hook.
    pub fn is_context(self) -> bool {
        matches!(self, Self::HooksCtx | Self::ButtonCtx | Self::SubmitButtonCtx)
    }

    /// Icon-like kinds carry their class list in `href`.
    pub fn is_icon(self) -> bool {
        matches!(self, Self::Icon)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/element_type.rs"]
mod tests;
