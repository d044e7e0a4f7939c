//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use panel_stack::host::{
    ContainerHandle, ContainerSpec, ElementHandle, HeadlessHost, HostEvent, TickCallback,
    TickSubscription, VisualHandle, VisualHost,
};
use panel_stack::view::{Lifecycle, View, ViewContext, ViewCx, ViewId};
use panel_stack::{PanelManager, Template, TemplateTable};

/// One observable step, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Hook {
        view: ViewId,
        label: String,
        event: Lifecycle,
    },
    Destroyed(VisualHandle),
}

/// Ordered record shared between views and the host
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    pub fn push(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Lifecycle events delivered to `view`, in order (ticks excluded)
    pub fn hooks_for(&self, view: ViewId) -> Vec<Lifecycle> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Entry::Hook { view: v, event, .. }
                    if *v == view && *event != Lifecycle::Update =>
                {
                    Some(*event)
                }
                _ => None,
            })
            .collect()
    }

    /// How many times `event` reached `view`
    pub fn count(&self, view: ViewId, event: Lifecycle) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, Entry::Hook { view: v, event: ev, .. } if *v == view && *ev == event))
            .count()
    }
}

/// Payload every probe view is opened with
#[derive(Debug, Clone)]
pub struct Probe {
    pub journal: Journal,
    pub label: String,
}

impl Probe {
    pub fn new(journal: &Journal, label: &str) -> Self {
        Self {
            journal: journal.clone(),
            label: label.to_string(),
        }
    }
}

/// Per-view state kept by probe views
#[derive(Debug)]
pub struct ProbeState {
    pub probe: Probe,
    pub counts: HashMap<Lifecycle, usize>,
    pub last_cx: Option<ViewContext>,
}

impl ProbeState {
    fn new(probe: Probe) -> Self {
        Self {
            probe,
            counts: HashMap::new(),
            last_cx: None,
        }
    }

    fn record(&mut self, event: Lifecycle, cx: &ViewContext) {
        *self.counts.entry(event).or_default() += 1;
        self.last_cx = Some(cx.clone());
        self.probe.journal.push(Entry::Hook {
            view: cx.id,
            label: self.probe.label.clone(),
            event,
        });
    }

    pub fn count(&self, event: Lifecycle) -> usize {
        self.counts.get(&event).copied().unwrap_or(0)
    }
}

macro_rules! probe_view {
    ($name:ident) => {
        pub struct $name(pub ProbeState);

        impl View for $name {
            type Data = Probe;
            const VIEW_TYPE: &'static str = stringify!($name);

            fn from_data(data: Probe) -> Self {
                $name(ProbeState::new(data))
            }

            fn on_open(&mut self, cx: &mut ViewCx<'_>) {
                self.0.record(Lifecycle::Open, cx);
            }

            fn on_resume(&mut self, cx: &mut ViewCx<'_>) {
                self.0.record(Lifecycle::Resume, cx);
            }

            fn on_pause(&mut self, cx: &mut ViewCx<'_>) {
                self.0.record(Lifecycle::Pause, cx);
            }

            fn on_close(&mut self, cx: &mut ViewCx<'_>) {
                self.0.record(Lifecycle::Close, cx);
            }

            fn on_update(&mut self, cx: &mut ViewCx<'_>) {
                self.0.record(Lifecycle::Update, cx);
            }
        }
    };
}

probe_view!(InventoryPanel);
probe_view!(SettingsPanel);
probe_view!(ConfirmDialog);
probe_view!(WorldMarker);
probe_view!(Nameplate);

/// View with no registered template
pub struct UnknownPanel;

impl View for UnknownPanel {
    type Data = ();
    const VIEW_TYPE: &'static str = "UnknownPanel";

    fn from_data(_: ()) -> Self {
        UnknownPanel
    }
}

/// Headless host that also journals destroy calls
#[derive(Default)]
pub struct JournalHost {
    pub inner: HeadlessHost,
    pub journal: Journal,
}

impl JournalHost {
    pub fn new(journal: &Journal) -> Self {
        Self {
            inner: HeadlessHost::new(),
            journal: journal.clone(),
        }
    }

    pub fn tick(&mut self) -> usize {
        self.inner.tick()
    }

    pub fn ensure_calls(&self) -> usize {
        self.inner.count_events(|e| {
            matches!(
                e,
                HostEvent::ContainerCreated(_) | HostEvent::ContainerFound(_)
            )
        })
    }

    pub fn instantiate_calls(&self) -> usize {
        self.inner
            .count_events(|e| matches!(e, HostEvent::Instantiated { .. }))
    }

    pub fn destroy_calls(&self) -> usize {
        self.inner
            .count_events(|e| matches!(e, HostEvent::Destroyed(_)))
    }

    /// Index of the first recorded host event matching `predicate`
    pub fn position(&self, predicate: impl Fn(&HostEvent) -> bool) -> Option<usize> {
        self.inner.events().iter().position(predicate)
    }
}

impl VisualHost for JournalHost {
    fn ensure_container(&mut self, spec: &ContainerSpec) -> ContainerHandle {
        self.inner.ensure_container(spec)
    }

    fn instantiate(&mut self, template: &Template, container: ContainerHandle) -> VisualHandle {
        self.inner.instantiate(template, container)
    }

    fn destroy(&mut self, visual: VisualHandle) {
        self.journal.push(Entry::Destroyed(visual));
        self.inner.destroy(visual);
    }

    fn find_child(&mut self, visual: VisualHandle, name: &str) -> Option<ElementHandle> {
        self.inner.find_child(visual, name)
    }

    fn subscribe_tick(&mut self, visual: VisualHandle, callback: TickCallback) -> TickSubscription {
        self.inner.subscribe_tick(visual, callback)
    }

    fn unsubscribe_tick(&mut self, subscription: TickSubscription) {
        self.inner.unsubscribe_tick(subscription)
    }
}

/// Template table covering every probe view
pub fn probe_templates() -> TemplateTable {
    let mut table = TemplateTable::new();
    for name in [
        InventoryPanel::VIEW_TYPE,
        SettingsPanel::VIEW_TYPE,
        ConfirmDialog::VIEW_TYPE,
        WorldMarker::VIEW_TYPE,
        Nameplate::VIEW_TYPE,
    ] {
        table.insert(Template::new(name)).unwrap();
    }
    table
}

/// Manager over a journaling host, plus the journal views should write to
pub fn test_manager() -> (PanelManager<JournalHost>, Journal) {
    let journal = Journal::default();
    let manager = PanelManager::initialize(
        JournalHost::new(&journal),
        probe_templates(),
        ContainerSpec::default(),
    );
    (manager, journal)
}
