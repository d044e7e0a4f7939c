//! Visual host boundary
//!
//! The panel manager never draws anything itself. A [`VisualHost`] owns the
//! rendering substrate: it resolves the shared container panels are parented
//! under, instantiates a visual for a template, destroys visuals and runs
//! per-visual tick callbacks from its frame loop.
//!
//! [`HeadlessHost`] is an in-memory host that records every call. It backs
//! the CLI, the benchmarks and the test suite.

use serde::{Deserialize, Serialize};

use crate::template::Template;

/// Opaque handle to the shared container panels are instantiated under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerHandle(pub u64);

/// Opaque handle to one instantiated visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// Opaque handle to a named child element inside a visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Identifies one tick registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickSubscription(pub u64);

/// Callback fired once per frame for a visual
pub type TickCallback = Box<dyn FnMut()>;

/// Description of the container a host resolves or creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSpec {
    /// Name used to find an existing container in the current scene
    pub name: String,
    /// Root node the container and input router are parented under
    pub root_name: String,
    /// Resolution panels are authored against (width, height)
    pub reference_resolution: (u32, u32),
    /// Blend between matching width (0.0) and height (1.0) when scaling
    pub match_width_or_height: f32,
    /// Create an input router alongside the container if none exists
    pub input_routing: bool,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            name: "OverlayCanvas".to_string(),
            root_name: "UIRoot".to_string(),
            reference_resolution: (1920, 1080),
            match_width_or_height: 0.5,
            input_routing: true,
        }
    }
}

/// Rendering substrate the panel manager drives
pub trait VisualHost {
    /// Return the container named by `spec`, creating it (and any input
    /// routing it needs) if the current scene has none. Idempotent.
    fn ensure_container(&mut self, spec: &ContainerSpec) -> ContainerHandle;

    /// Instantiate a new visual for `template` under `container`
    fn instantiate(&mut self, template: &Template, container: ContainerHandle) -> VisualHandle;

    /// Release a visual. Every tick registration against it is dropped.
    fn destroy(&mut self, visual: VisualHandle);

    /// Child element called `name` inside a live visual. Repeated lookups
    /// return the same element.
    fn find_child(&mut self, visual: VisualHandle, name: &str) -> Option<ElementHandle>;

    /// Fire `callback` once per frame for as long as `visual` lives
    fn subscribe_tick(&mut self, visual: VisualHandle, callback: TickCallback) -> TickSubscription;

    /// Drop one registration. Unknown subscriptions are ignored.
    fn unsubscribe_tick(&mut self, subscription: TickSubscription);
}

/// One recorded host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ContainerCreated(ContainerHandle),
    ContainerFound(ContainerHandle),
    InputRouterCreated,
    Instantiated {
        visual: VisualHandle,
        template: String,
        container: ContainerHandle,
    },
    Destroyed(VisualHandle),
    TickSubscribed {
        visual: VisualHandle,
        subscription: TickSubscription,
    },
    TickUnsubscribed(TickSubscription),
}

#[derive(Debug, Clone)]
struct ContainerRecord {
    handle: ContainerHandle,
    name: String,
}

#[derive(Debug, Clone)]
struct VisualRecord {
    handle: VisualHandle,
    template: String,
    container: ContainerHandle,
    children: Vec<(String, ElementHandle)>,
}

struct TickRecord {
    subscription: TickSubscription,
    visual: VisualHandle,
    callback: TickCallback,
}

/// In-memory [`VisualHost`]
///
/// Keeps the scene as plain lists and appends a [`HostEvent`] for every call
/// so callers can assert on ordering.
#[derive(Default)]
pub struct HeadlessHost {
    next_id: u64,
    containers: Vec<ContainerRecord>,
    has_input_router: bool,
    visuals: Vec<VisualRecord>,
    ticks: Vec<TickRecord>,
    events: Vec<HostEvent>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Run one frame: fire every live tick callback once.
    /// Returns the number of callbacks fired.
    pub fn tick(&mut self) -> usize {
        for record in self.ticks.iter_mut() {
            (record.callback)();
        }
        self.ticks.len()
    }

    /// Drop every container and visual, as if a new scene was loaded.
    /// Tick registrations die with their visuals.
    pub fn unload_scene(&mut self) {
        tracing::debug!(
            containers = self.containers.len(),
            visuals = self.visuals.len(),
            "unloading headless scene"
        );
        self.containers.clear();
        self.visuals.clear();
        self.ticks.clear();
        self.has_input_router = false;
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn is_live(&self, visual: VisualHandle) -> bool {
        self.visuals.iter().any(|v| v.handle == visual)
    }

    pub fn live_visuals(&self) -> usize {
        self.visuals.len()
    }

    /// Template name a live visual was instantiated from
    pub fn template_of(&self, visual: VisualHandle) -> Option<&str> {
        self.visuals
            .iter()
            .find(|v| v.handle == visual)
            .map(|v| v.template.as_str())
    }

    /// Container a live visual is parented under
    pub fn container_of(&self, visual: VisualHandle) -> Option<ContainerHandle> {
        self.visuals
            .iter()
            .find(|v| v.handle == visual)
            .map(|v| v.container)
    }

    pub fn containers(&self) -> usize {
        self.containers.len()
    }

    /// Number of tick registrations against `visual`
    pub fn tick_subscriptions(&self, visual: VisualHandle) -> usize {
        self.ticks.iter().filter(|t| t.visual == visual).count()
    }

    /// Count of recorded events matching `predicate`
    pub fn count_events(&self, predicate: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl VisualHost for HeadlessHost {
    fn ensure_container(&mut self, spec: &ContainerSpec) -> ContainerHandle {
        if let Some(existing) = self.containers.iter().find(|c| c.name == spec.name) {
            let handle = existing.handle;
            self.events.push(HostEvent::ContainerFound(handle));
            return handle;
        }

        let handle = ContainerHandle(self.next_id());
        self.containers.push(ContainerRecord {
            handle,
            name: spec.name.clone(),
        });
        self.events.push(HostEvent::ContainerCreated(handle));

        if spec.input_routing && !self.has_input_router {
            self.has_input_router = true;
            self.events.push(HostEvent::InputRouterCreated);
        }

        tracing::debug!(
            container = %spec.name,
            root = %spec.root_name,
            width = spec.reference_resolution.0,
            height = spec.reference_resolution.1,
            "created headless container"
        );
        handle
    }

    fn instantiate(&mut self, template: &Template, container: ContainerHandle) -> VisualHandle {
        let handle = VisualHandle(self.next_id());
        let children = template
            .children
            .iter()
            .map(|name| (name.clone(), ElementHandle(self.next_id())))
            .collect();
        self.visuals.push(VisualRecord {
            handle,
            template: template.name.clone(),
            container,
            children,
        });
        self.events.push(HostEvent::Instantiated {
            visual: handle,
            template: template.name.clone(),
            container,
        });
        handle
    }

    fn destroy(&mut self, visual: VisualHandle) {
        let before = self.visuals.len();
        self.visuals.retain(|v| v.handle != visual);
        if self.visuals.len() == before {
            tracing::warn!(?visual, "destroy called for unknown visual");
        }
        self.ticks.retain(|t| t.visual != visual);
        self.events.push(HostEvent::Destroyed(visual));
    }

    fn find_child(&mut self, visual: VisualHandle, name: &str) -> Option<ElementHandle> {
        let record = self.visuals.iter().find(|v| v.handle == visual)?;
        let child = record
            .children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, element)| *element);
        if child.is_none() {
            tracing::debug!(?visual, name, template = %record.template, "no such child");
        }
        child
    }

    fn subscribe_tick(&mut self, visual: VisualHandle, callback: TickCallback) -> TickSubscription {
        let subscription = TickSubscription(self.next_id());
        if self.is_live(visual) {
            self.ticks.push(TickRecord {
                subscription,
                visual,
                callback,
            });
        } else {
            tracing::warn!(?visual, "tick subscription for a visual that is not live");
        }
        self.events.push(HostEvent::TickSubscribed {
            visual,
            subscription,
        });
        subscription
    }

    fn unsubscribe_tick(&mut self, subscription: TickSubscription) {
        self.ticks.retain(|t| t.subscription != subscription);
        self.events.push(HostEvent::TickUnsubscribed(subscription));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn template(name: &str) -> Template {
        Template::new(name)
    }

    #[test]
    fn test_ensure_container_is_idempotent() {
        let mut host = HeadlessHost::new();
        let spec = ContainerSpec::default();

        let first = host.ensure_container(&spec);
        let second = host.ensure_container(&spec);

        assert_eq!(first, second);
        assert_eq!(host.containers(), 1);
        assert_eq!(
            host.events(),
            &[
                HostEvent::ContainerCreated(first),
                HostEvent::InputRouterCreated,
                HostEvent::ContainerFound(first),
            ]
        );
    }

    #[test]
    fn test_input_router_created_once_across_scene_containers() {
        let mut host = HeadlessHost::new();
        host.ensure_container(&ContainerSpec::default());
        host.ensure_container(&ContainerSpec {
            name: "WorldCanvas".to_string(),
            ..ContainerSpec::default()
        });

        assert_eq!(host.containers(), 2);
        assert_eq!(
            host.count_events(|e| matches!(e, HostEvent::InputRouterCreated)),
            1
        );
    }

    #[test]
    fn test_destroy_drops_tick_subscriptions() {
        let mut host = HeadlessHost::new();
        let container = host.ensure_container(&ContainerSpec::default());
        let visual = host.instantiate(&template("Hud"), container);

        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        host.subscribe_tick(visual, Box::new(move || counter.set(counter.get() + 1)));

        assert_eq!(host.tick(), 1);
        host.destroy(visual);
        assert_eq!(host.tick(), 0);

        assert_eq!(fired.get(), 1);
        assert!(!host.is_live(visual));
        assert_eq!(host.tick_subscriptions(visual), 0);
    }

    #[test]
    fn test_unload_scene_forgets_containers() {
        let mut host = HeadlessHost::new();
        let spec = ContainerSpec::default();
        let first = host.ensure_container(&spec);
        host.instantiate(&template("Hud"), first);

        host.unload_scene();
        let second = host.ensure_container(&spec);

        assert_ne!(first, second);
        assert_eq!(host.live_visuals(), 0);
    }

    #[test]
    fn test_find_child_uses_template_children() {
        let mut host = HeadlessHost::new();
        let container = host.ensure_container(&ContainerSpec::default());
        let visual = host.instantiate(
            &Template::new("Shop").with_children(["ItemGrid", "CloseButton"]),
            container,
        );

        let grid = host.find_child(visual, "ItemGrid").unwrap();
        assert_eq!(host.find_child(visual, "ItemGrid"), Some(grid));
        assert_ne!(host.find_child(visual, "CloseButton"), Some(grid));
        assert_eq!(host.find_child(visual, "Title"), None);

        host.destroy(visual);
        assert_eq!(host.find_child(visual, "ItemGrid"), None);
    }

    #[test]
    fn test_unsubscribe_stops_callbacks() {
        let mut host = HeadlessHost::new();
        let container = host.ensure_container(&ContainerSpec::default());
        let visual = host.instantiate(&template("Hud"), container);

        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let sub = host.subscribe_tick(visual, Box::new(move || counter.set(counter.get() + 1)));
        host.unsubscribe_tick(sub);
        host.tick();

        assert_eq!(fired.get(), 0);
        assert!(host.is_live(visual));
    }
}
