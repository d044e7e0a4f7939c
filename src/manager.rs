//! Panel manager
//!
//! The single owner of every live view. It resolves templates, asks the
//! visual host for visuals, drives view lifecycles and keeps one LIFO stack
//! per layer plus the scene-anchored registry.
//!
//! The manager is constructed explicitly with [`PanelManager::initialize`]
//! and torn down with [`PanelManager::shutdown`]. It is single-threaded:
//! every call runs to completion on the thread that owns the host's frame
//! loop.
//!
//! # Close ordering
//!
//! Closing a view releases its visual and its tick registration first and
//! only then delivers `Pause` and `Close`. Hooks must not expect the visual
//! to still exist.

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::host::{ContainerHandle, ContainerSpec, ElementHandle, VisualHost};
use crate::layer::Layer;
use crate::stack::{LayerStack, SceneRegistry};
use crate::template::TemplateTable;
use crate::view::{AnyViewHandle, Lifecycle, View, ViewContext, ViewHandle, ViewId, ViewShared};

pub struct PanelManager<H: VisualHost> {
    host: H,
    templates: TemplateTable,
    container_spec: ContainerSpec,
    /// Resolved lazily on the first open, cleared on reset
    container: Option<ContainerHandle>,
    /// Stacks in the order their layers were first used
    stacks: Vec<LayerStack>,
    scene: SceneRegistry,
    next_view_id: u64,
}

impl<H: VisualHost> PanelManager<H> {
    /// Create a manager over `host` with a fixed template table
    pub fn initialize(host: H, templates: TemplateTable, container_spec: ContainerSpec) -> Self {
        tracing::info!(
            templates = templates.len(),
            container = %container_spec.name,
            "panel manager initialized"
        );
        Self {
            host,
            templates,
            container_spec,
            container: None,
            stacks: Vec::new(),
            scene: SceneRegistry::new(),
            next_view_id: 0,
        }
    }

    /// Create a manager from a loaded config, reading its template source
    pub fn from_config(host: H, config: &PanelConfig) -> Result<Self> {
        let templates = config.load_templates()?;
        Ok(Self::initialize(host, templates, config.container.clone()))
    }

    /// Close every live view and hand the host back
    pub fn shutdown(mut self) -> H {
        self.reset();
        tracing::info!("panel manager shut down");
        self.host
    }

    // ========================================================================
    // Opening
    // ========================================================================

    /// Open a view of type `V` on top of `layer`'s stack
    ///
    /// Fails without side effects if `layer` is the scene layer or `V` has
    /// no template.
    pub fn open_panel<V: View>(&mut self, data: V::Data, layer: Layer) -> Result<ViewHandle<V>> {
        if layer.is_scene() {
            tracing::error!(
                view_type = V::VIEW_TYPE,
                "scene panels must be opened with open_view_in_scene"
            );
            return Err(PanelError::InvalidLayerForOperation {
                layer,
                operation: "open_panel",
            });
        }

        let handle = self.create_view::<V>(data, layer.clone())?;
        self.stack_mut(&layer).push(handle.clone().erase());
        ViewShared::wire_update(handle.shared(), &mut self.host);

        tracing::debug!(
            view = %handle.id(),
            view_type = V::VIEW_TYPE,
            %layer,
            depth = self.depth(&layer),
            "opened panel"
        );
        Ok(handle)
    }

    /// Open a view of type `V` anchored in the scene, outside any stack
    pub fn open_view_in_scene<V: View>(&mut self, data: V::Data) -> Result<ViewHandle<V>> {
        let handle = self.create_view::<V>(data, Layer::Scene)?;
        self.scene.add(handle.clone().erase());
        ViewShared::wire_update(handle.shared(), &mut self.host);

        tracing::debug!(
            view = %handle.id(),
            view_type = V::VIEW_TYPE,
            "opened scene view"
        );
        Ok(handle)
    }

    /// Resolve, instantiate, construct, then deliver Open and Resume
    fn create_view<V: View>(&mut self, data: V::Data, layer: Layer) -> Result<ViewHandle<V>> {
        let template = self.templates.resolve(V::VIEW_TYPE)?.clone();
        let container = self.ensure_container();
        let visual = self.host.instantiate(&template, container);

        self.next_view_id += 1;
        let cx = ViewContext {
            id: ViewId(self.next_view_id),
            view_type: V::VIEW_TYPE,
            layer,
            visual,
        };

        let handle = ViewHandle::<V>::new(ViewShared::new::<V>(cx, data));
        self.deliver(&handle, Lifecycle::Open);
        self.deliver(&handle, Lifecycle::Resume);
        Ok(handle)
    }

    /// The shared container, resolved through the host on first use
    pub fn ensure_container(&mut self) -> ContainerHandle {
        if let Some(container) = self.container {
            return container;
        }
        let container = self.host.ensure_container(&self.container_spec);
        tracing::debug!(?container, name = %self.container_spec.name, "resolved container");
        self.container = Some(container);
        container
    }

    // ========================================================================
    // Closing
    // ========================================================================

    /// Close the top view of `layer`
    ///
    /// No-op on an empty or unknown layer. The view beneath, if any, is
    /// resumed. Returns the closed view.
    pub fn close_top_panel(&mut self, layer: &Layer) -> Option<AnyViewHandle> {
        let Some(index) = self.stack_index(layer) else {
            tracing::debug!(%layer, "close_top_panel on a layer with no stack");
            return None;
        };
        let Some(top) = self.stacks[index].peek().cloned() else {
            tracing::debug!(%layer, "close_top_panel on an empty stack");
            return None;
        };

        self.teardown(&top);
        self.stacks[index].pop();

        if let Some(new_top) = self.stacks[index].peek().cloned() {
            ViewShared::wire_update(new_top.shared(), &mut self.host);
            self.deliver(&new_top, Lifecycle::Resume);
        }

        tracing::debug!(
            view = %top.id(),
            view_type = top.view_type(),
            %layer,
            depth = self.stacks[index].len(),
            "closed panel"
        );
        Some(top)
    }

    /// Close the current top of every layer, once
    ///
    /// Layers keep whatever was beneath their top. Returns how many views
    /// were closed.
    pub fn close_all(&mut self) -> usize {
        let layers: Vec<Layer> = self.stacks.iter().map(|s| s.layer().clone()).collect();
        layers
            .iter()
            .filter(|layer| self.close_top_panel(layer).is_some())
            .count()
    }

    /// Close every view on `layer`, top first
    ///
    /// Views uncovered along the way are not resumed. Returns how many views
    /// were closed.
    pub fn drain_layer(&mut self, layer: &Layer) -> usize {
        let Some(index) = self.stack_index(layer) else {
            return 0;
        };

        let mut closed = 0;
        while let Some(top) = self.stacks[index].pop() {
            self.teardown(&top);
            closed += 1;
        }
        if closed > 0 {
            tracing::debug!(%layer, closed, "drained layer");
        }
        closed
    }

    /// Close a scene-anchored view
    ///
    /// Views that are not registered are still torn down. Closing an
    /// already closed view does nothing. Views that live on a stack layer
    /// are rejected.
    pub fn close_in_scene(&mut self, view: &AnyViewHandle) -> Result<()> {
        let layer = view.layer();
        if !layer.is_scene() {
            tracing::error!(
                view = %view.id(),
                %layer,
                "close_in_scene called for a stacked panel"
            );
            return Err(PanelError::InvalidLayerForOperation {
                layer,
                operation: "close_in_scene",
            });
        }
        if view.is_closed() {
            tracing::debug!(view = %view.id(), "scene view already closed");
            return Ok(());
        }

        if !self.scene.remove(view) {
            tracing::debug!(view = %view.id(), "scene view was not registered");
        }
        self.teardown(view);

        tracing::debug!(
            view = %view.id(),
            view_type = view.view_type(),
            "closed scene view"
        );
        Ok(())
    }

    /// Close `view` only if it is registered in the scene registry
    pub fn close_if_in_scene(&mut self, view: &AnyViewHandle) -> bool {
        self.is_in_scene(view) && self.close_in_scene(view).is_ok()
    }

    /// Close every live view and release the container reference
    ///
    /// The next open resolves the container through the host again.
    pub fn reset(&mut self) {
        let layers: Vec<Layer> = self.stacks.iter().map(|s| s.layer().clone()).collect();
        let mut closed: usize = layers.iter().map(|layer| self.drain_layer(layer)).sum();
        self.stacks.clear();

        for view in self.scene.drain() {
            if self.close_in_scene(&view).is_ok() {
                closed += 1;
            }
        }

        self.container = None;
        tracing::debug!(closed, "panel manager reset");
    }

    /// Destroy the visual and drop its tick registration, then deliver
    /// Pause and Close
    fn teardown(&mut self, view: &AnyViewHandle) {
        self.host.destroy(view.visual());
        if let Some(subscription) = view.shared().release_tick() {
            self.host.unsubscribe_tick(subscription);
        }
        self.deliver(view, Lifecycle::Pause);
        self.deliver(view, Lifecycle::Close);
    }

    fn deliver(&mut self, view: &AnyViewHandle, event: Lifecycle) -> bool {
        let host: &mut dyn VisualHost = &mut self.host;
        view.shared().apply(event, Some(host))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Top view of `layer`; logs an error and returns `None` when empty
    pub fn get_top_panel(&self, layer: &Layer) -> Option<AnyViewHandle> {
        match self.try_top_panel(layer) {
            Ok(top) => Some(top),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }

    /// Top view of `layer`, or [`PanelError::EmptyStack`]
    pub fn try_top_panel(&self, layer: &Layer) -> Result<AnyViewHandle> {
        self.stack(layer)
            .and_then(LayerStack::peek)
            .cloned()
            .ok_or_else(|| PanelError::EmptyStack {
                layer: layer.clone(),
            })
    }

    /// Top view of `layer` if it is a `V`
    pub fn top_panel_as<V: View>(&self, layer: &Layer) -> Option<ViewHandle<V>> {
        self.get_top_panel(layer)?.downcast::<V>()
    }

    /// First scene-anchored view of type `V`
    pub fn get_in_scene<V: View>(&self) -> Option<ViewHandle<V>> {
        self.get_in_scene_by_type(V::VIEW_TYPE)?.downcast::<V>()
    }

    /// First scene-anchored view with the given type tag
    pub fn get_in_scene_by_type(&self, view_type: &str) -> Option<AnyViewHandle> {
        self.scene.find_by_type(view_type).cloned()
    }

    pub fn is_in_scene(&self, view: &AnyViewHandle) -> bool {
        self.scene.contains(view)
    }

    /// Named child element of `view`'s visual; `None` once the view closed
    pub fn find_child(&mut self, view: &AnyViewHandle, name: &str) -> Option<ElementHandle> {
        if view.is_closed() {
            return None;
        }
        self.host.find_child(view.visual(), name)
    }

    /// Layers that currently have a stack, in first-use order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.stacks.iter().map(LayerStack::layer)
    }

    pub fn stack(&self, layer: &Layer) -> Option<&LayerStack> {
        self.stacks.iter().find(|s| s.layer() == layer)
    }

    /// Number of open views on `layer`
    pub fn depth(&self, layer: &Layer) -> usize {
        self.stack(layer).map(LayerStack::len).unwrap_or(0)
    }

    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    /// Open views across all stacks plus the scene registry
    pub fn live_views(&self) -> usize {
        self.stacks.iter().map(LayerStack::len).sum::<usize>() + self.scene.len()
    }

    /// The shared container, if it has been resolved since the last reset
    pub fn container(&self) -> Option<ContainerHandle> {
        self.container
    }

    pub fn container_spec(&self) -> &ContainerSpec {
        &self.container_spec
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to run its frame loop
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn stack_index(&self, layer: &Layer) -> Option<usize> {
        self.stacks.iter().position(|s| s.layer() == layer)
    }

    /// Stack for `layer`, created on first use
    fn stack_mut(&mut self, layer: &Layer) -> &mut LayerStack {
        let index = match self.stack_index(layer) {
            Some(index) => index,
            None => {
                self.stacks.push(LayerStack::new(layer.clone()));
                self.stacks.len() - 1
            }
        };
        &mut self.stacks[index]
    }
}
