/// Opaque handle to a node in the engine's render tree.
///
/// The bridge never dereferences it; it is only passed back into engine entry points.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct NodePtr(pub u32);

/// A `(ptr, len)` pair addressing UTF-8 bytes in engine linear memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Byte offset into linear memory. `0` means "no value".
    pub ptr: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Build a span from a pointer/length pair.
    pub const fn new(ptr: u32, len: u32) -> Self {
        Self { ptr, len }
    }

    /// The null span (`ptr == 0`).
    pub const fn null() -> Self {
        Self { ptr: 0, len: 0 }
    }

    /// Return `true` when the span carries no value.
    pub const fn is_null(self) -> bool {
        self.ptr == 0
    }
}

/// Engine-computed bounding box of a render command, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Lifecycle hook handles attached to a render command. `0` means "no hook".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HookIds {
    /// Fired once after the live element is first created.
    #[serde(default)]
    pub created: u32,
    /// Fired once after the live element is attached.
    #[serde(default)]
    pub mounted: u32,
    /// Fired after creation alongside `created`/`mounted`.
    #[serde(default)]
    pub updated: u32,
    /// Fired when the node is garbage collected.
    #[serde(default)]
    pub destroy: u32,
}

impl HookIds {
    /// Destroy hook as an option, treating `0` as absent.
    pub fn destroy_id(&self) -> Option<u32> {
        (self.destroy > 0).then_some(self.destroy)
    }
}

/// Viewport size handed to the engine at instantiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Map a location path to the route identifier the engine expects.
///
/// `"/"` is reserved by the engine and is sent as `root_route` instead.
pub fn canonical_route<'a>(path: &'a str, root_route: &'a str) -> &'a str {
    if path.is_empty() || path == "/" {
        root_route
    } else {
        path
    }
}

/// Extract the path component of an href (absolute URL or path), without query or fragment.
pub fn pathname_of(href: &str) -> String {
    let rest = match href.find("://") {
        Some(scheme_end) => {
            let after = &href[scheme_end + 3..];
            match after.find('/') {
                Some(slash) => &after[slash..],
                None => "/",
            }
        }
        None => href,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = &rest[..end];
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Registry key of the persistent layout subtree for `path`.
///
/// This is a naming heuristic: the layout node of a route is assumed to be registered as
/// `layout-<parent path>`. Nothing in the engine tree guarantees it.
pub fn route_layout_key(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let parent = segments[..segments.len().saturating_sub(1)].join("/");
    format!("layout-/{parent}")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
