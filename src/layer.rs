//! Layer identifiers
//!
//! Views on the same layer stack on top of each other; views on different
//! layers are independent. The scene layer is special: it is never backed by
//! a stack and is only reachable through the scene-anchored operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named stacking context
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Regular full-screen and windowed panels
    #[default]
    Normal,
    /// Dialogs and popups drawn above normal panels
    Popup,
    /// Toasts, tooltips and other always-on-top content
    Top,
    /// Panels anchored in the scene; tracked by the scene registry
    Scene,
    /// Application-defined layer
    Custom(String),
}

impl Layer {
    pub fn custom(name: impl Into<String>) -> Self {
        Layer::Custom(name.into())
    }

    /// Whether this is the scene layer (no stack semantics)
    pub fn is_scene(&self) -> bool {
        matches!(self, Layer::Scene)
    }

    pub fn name(&self) -> &str {
        match self {
            Layer::Normal => "normal",
            Layer::Popup => "popup",
            Layer::Top => "top",
            Layer::Scene => "scene",
            Layer::Custom(name) => name,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
