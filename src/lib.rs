//! Panel Stack - layered panel lifecycle management
//!
//! This crate tracks on-screen panels ("views") for an interactive
//! application. Each layer keeps a LIFO stack of views; scene-anchored views
//! live in a flat registry outside any stack. The [`PanelManager`] creates
//! views through a [`VisualHost`], drives their lifecycle and answers
//! queries about what is on top.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod host;
pub mod layer;
pub mod manager;
pub mod stack;
pub mod template;
pub mod tracing;
pub mod view;

// Re-export commonly used types
pub use config::PanelConfig;
pub use config_paths::ConfigPaths;
pub use error::PanelError;
pub use host::{ContainerSpec, ElementHandle, HeadlessHost, VisualHost};
pub use layer::Layer;
pub use manager::PanelManager;
pub use template::{Template, TemplateTable};
pub use view::{AnyViewHandle, View, ViewContext, ViewCx, ViewHandle, ViewState};
