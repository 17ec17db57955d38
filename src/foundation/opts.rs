use std::path::Path;

use crate::foundation::core::Viewport;
use crate::foundation::error::{BridgeError, BridgeResult};

/// Options controlling bridge behavior.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BridgeOpts {
    /// Route identifier substituted for the `"/"` location path.
    pub root_route: String,
    /// Prefix of synthesized per-element class names.
    pub class_prefix: String,
    /// Prefix of hover rule cache keys.
    pub hover_prefix: String,
    /// Halt the render loop after this many consecutive failed frames. `None` never halts.
    pub max_consecutive_failures: Option<u32>,
    /// Viewport passed to the engine at instantiation.
    pub viewport: Viewport,
}

impl Default for BridgeOpts {
    fn default() -> Self {
        Self {
            root_route: "/root".to_string(),
            class_prefix: "fabric-component-".to_string(),
            hover_prefix: "hover-".to_string(),
            max_consecutive_failures: Some(120),
            viewport: Viewport::default(),
        }
    }
}

impl BridgeOpts {
    /// Parse options from a JSON string. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> BridgeResult<Self> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Load options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::validation(format!("read options '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Reject option combinations the bridge cannot run with.
    pub fn validate(&self) -> BridgeResult<()> {
        if !self.root_route.starts_with('/') || self.root_route == "/" {
            return Err(BridgeError::validation(
                "root_route must be a non-root path starting with '/'",
            ));
        }
        if self.class_prefix.is_empty() || self.class_prefix.contains(char::is_whitespace) {
            return Err(BridgeError::validation(
                "class_prefix must be a non-empty class token",
            ));
        }
        if self.hover_prefix.is_empty() {
            return Err(BridgeError::validation("hover_prefix must be non-empty"));
        }
        if self.max_consecutive_failures == Some(0) {
            return Err(BridgeError::validation(
                "max_consecutive_failures must be > 0 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/opts.rs"]
mod tests;
