//! Error types for panel management
//!
//! Every error is local to the call that produced it. A failed open never
//! touches a layer stack, the scene registry or the visual host.

use std::path::PathBuf;

use thiserror::Error;

use crate::layer::Layer;

#[derive(Debug, Error)]
pub enum PanelError {
    /// The requested view type has no registered template
    #[error("no template registered for view type `{view_type}`")]
    TemplateNotFound { view_type: String },

    /// A query or close targeted a layer with no open views
    #[error("no panels open on layer `{layer}`")]
    EmptyStack { layer: Layer },

    /// A stack operation was given the scene layer, or a scene operation
    /// was given a view living on a stack layer
    #[error("layer `{layer}` cannot be used with {operation}")]
    InvalidLayerForOperation {
        layer: Layer,
        operation: &'static str,
    },

    /// Two templates were registered under the same name
    #[error("template `{name}` is already registered")]
    DuplicateTemplate { name: String },

    /// Reading a template directory or manifest failed
    #[error("failed to read template source {}: {source}", path.display())]
    TemplateSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template manifest could not be parsed
    #[error("failed to parse template manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// Persisting configuration failed
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T, E = PanelError> = std::result::Result<T, E>;
