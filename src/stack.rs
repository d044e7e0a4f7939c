//! Layer stacks and the scene-anchored registry
//!
//! Plain containers. All lifecycle decisions live in the panel manager.

use crate::layer::Layer;
use crate::view::AnyViewHandle;

/// LIFO stack of the views open on one layer
///
/// Insertion order is stacking order; the last element is the top.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layer: Layer,
    views: Vec<AnyViewHandle>,
}

impl LayerStack {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            views: Vec::new(),
        }
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn push(&mut self, view: AnyViewHandle) {
        self.views.push(view);
    }

    pub fn pop(&mut self) -> Option<AnyViewHandle> {
        self.views.pop()
    }

    /// The top view, if any
    pub fn peek(&self) -> Option<&AnyViewHandle> {
        self.views.last()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

}

/// Unordered collection of scene-anchored views
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    views: Vec<AnyViewHandle>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, view: AnyViewHandle) {
        self.views.push(view);
    }

    /// Remove `view`; returns whether it was registered
    pub fn remove(&mut self, view: &AnyViewHandle) -> bool {
        let before = self.views.len();
        self.views.retain(|v| v != view);
        self.views.len() != before
    }

    /// First registered view with the given type tag
    pub fn find_by_type(&self, view_type: &str) -> Option<&AnyViewHandle> {
        self.views.iter().find(|v| v.view_type() == view_type)
    }

    pub fn contains(&self, view: &AnyViewHandle) -> bool {
        self.views.iter().any(|v| v == view)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Take every registered view, leaving the registry empty
    pub fn drain(&mut self) -> Vec<AnyViewHandle> {
        std::mem::take(&mut self.views)
    }
}
