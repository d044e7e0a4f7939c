//! Views and their lifecycle
//!
//! A view is one open panel: application logic implementing [`View`], bound
//! to a visual instance owned by the host. The panel manager is the only
//! thing that moves a view through its lifecycle:
//!
//! ```text
//! Created → Opened → Resumed ⇄ (Paused → Closed)
//! ```
//!
//! - `Open` fires once, right after the view is built from its data
//! - `Resume` fires at creation and again whenever the view becomes the top
//!   of its layer because the view above it closed
//! - `Pause` fires exactly once, immediately before `Close`
//! - `Close` fires exactly once, after the visual has been released
//! - `Update` fires every frame while tick wiring is active
//!
//! `Closed` is terminal. Transitions that the table does not allow are
//! rejected and logged, the hook is not called. A view that is borrowed
//! through its handle when an event arrives still moves to the next state,
//! but misses that hook.

use std::any::{Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::host::{ElementHandle, TickSubscription, VisualHandle, VisualHost};
use crate::layer::Layer;

/// Unique id of a view within one panel manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Lifecycle position of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    Created,
    Opened,
    Resumed,
    Paused,
    Closed,
}

/// Lifecycle notification delivered to a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Open,
    Resume,
    Pause,
    Close,
    Update,
}

impl ViewState {
    /// State after delivering `event`, or `None` if the transition is illegal
    pub fn after(self, event: Lifecycle) -> Option<ViewState> {
        use Lifecycle as L;
        use ViewState as S;
        match (self, event) {
            (S::Created, L::Open) => Some(S::Opened),
            (S::Opened | S::Resumed, L::Resume) => Some(S::Resumed),
            (S::Resumed, L::Pause) => Some(S::Paused),
            (S::Paused, L::Close) => Some(S::Closed),
            (S::Opened | S::Resumed, L::Update) => Some(self),
            _ => None,
        }
    }

    pub fn is_closed(self) -> bool {
        self == ViewState::Closed
    }
}

/// Fixed facts about a view, set when it is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    pub id: ViewId,
    pub view_type: &'static str,
    pub layer: Layer,
    pub visual: VisualHandle,
}

/// What a lifecycle hook sees
///
/// Derefs to the view's [`ViewContext`]. Hooks delivered by the manager can
/// also reach into the view's own visual with [`ViewCx::find_child`]; the
/// per-frame `Update` runs from the host's tick and has no host access.
pub struct ViewCx<'a> {
    context: &'a ViewContext,
    host: Option<&'a mut dyn VisualHost>,
}

impl<'a> ViewCx<'a> {
    pub fn context(&self) -> &ViewContext {
        self.context
    }

    /// Named child element of this view's visual
    ///
    /// `None` if the template declares no such child, the visual has already
    /// been released, or the hook runs without host access.
    pub fn find_child(&mut self, name: &str) -> Option<ElementHandle> {
        let visual = self.context.visual;
        self.host.as_deref_mut()?.find_child(visual, name)
    }
}

impl Deref for ViewCx<'_> {
    type Target = ViewContext;

    fn deref(&self) -> &ViewContext {
        self.context
    }
}

/// Interface logic for one kind of panel
///
/// `VIEW_TYPE` names the template the view is instantiated from and is the
/// key for scene lookups. The data payload is bound once, when the view is
/// built, so a view never observes a payload of the wrong type.
pub trait View: 'static {
    type Data: 'static;

    const VIEW_TYPE: &'static str;

    fn from_data(data: Self::Data) -> Self;

    fn on_open(&mut self, cx: &mut ViewCx<'_>) {
        let _ = cx;
    }

    fn on_resume(&mut self, cx: &mut ViewCx<'_>) {
        let _ = cx;
    }

    fn on_pause(&mut self, cx: &mut ViewCx<'_>) {
        let _ = cx;
    }

    fn on_close(&mut self, cx: &mut ViewCx<'_>) {
        let _ = cx;
    }

    fn on_update(&mut self, cx: &mut ViewCx<'_>) {
        let _ = cx;
    }
}

/// Object-safe face of [`View`]
trait ErasedView {
    fn deliver(&mut self, event: Lifecycle, cx: &mut ViewCx<'_>);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<V: View> ErasedView for V {
    fn deliver(&mut self, event: Lifecycle, cx: &mut ViewCx<'_>) {
        match event {
            Lifecycle::Open => self.on_open(cx),
            Lifecycle::Resume => self.on_resume(cx),
            Lifecycle::Pause => self.on_pause(cx),
            Lifecycle::Close => self.on_close(cx),
            Lifecycle::Update => self.on_update(cx),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Manager-side record of a live view
///
/// Only the view itself sits behind a `RefCell`. Identity, state and the
/// tick registration stay readable while a caller holds a view borrow.
pub(crate) struct ViewShared {
    cx: ViewContext,
    type_id: TypeId,
    state: Cell<ViewState>,
    tick: Cell<Option<TickSubscription>>,
    view: RefCell<Box<dyn ErasedView>>,
}

pub(crate) type SharedView = Rc<ViewShared>;

impl ViewShared {
    pub(crate) fn new<V: View>(cx: ViewContext, data: V::Data) -> SharedView {
        Rc::new(Self {
            cx,
            type_id: TypeId::of::<V>(),
            state: Cell::new(ViewState::Created),
            tick: Cell::new(None),
            view: RefCell::new(Box::new(V::from_data(data))),
        })
    }

    /// Move to the state after `event` and run its hook.
    /// Returns whether the hook ran.
    ///
    /// A view that is borrowed through its handle still changes state, but
    /// misses the hook.
    pub(crate) fn apply<'a>(
        &'a self,
        event: Lifecycle,
        host: Option<&'a mut dyn VisualHost>,
    ) -> bool {
        let state = self.state.get();
        let Some(next) = state.after(event) else {
            if event == Lifecycle::Update {
                tracing::trace!(view = %self.cx.id, ?state, "update skipped");
            } else {
                tracing::error!(
                    view = %self.cx.id,
                    view_type = self.cx.view_type,
                    ?state,
                    ?event,
                    "rejected lifecycle transition"
                );
            }
            return false;
        };

        let Ok(mut view) = self.view.try_borrow_mut() else {
            if event != Lifecycle::Update {
                self.state.set(next);
                tracing::warn!(
                    view = %self.cx.id,
                    ?event,
                    "view is borrowed, hook not delivered"
                );
            }
            return false;
        };

        self.state.set(next);
        let mut cx = ViewCx {
            context: &self.cx,
            host,
        };
        view.deliver(event, &mut cx);
        true
    }

    /// Register `on_update` against the view's visual.
    /// A view that already holds a registration is left alone.
    pub(crate) fn wire_update<H: VisualHost + ?Sized>(shared: &SharedView, host: &mut H) {
        if shared.tick.get().is_some() || shared.state.get().is_closed() {
            return;
        }

        let weak: Weak<ViewShared> = Rc::downgrade(shared);
        let subscription = host.subscribe_tick(
            shared.cx.visual,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.apply(Lifecycle::Update, None);
                }
            }),
        );
        shared.tick.set(Some(subscription));
    }

    /// Take the tick registration so it can be handed back to the host
    pub(crate) fn release_tick(&self) -> Option<TickSubscription> {
        self.tick.take()
    }
}

/// Untyped handle to a view owned by a panel manager
///
/// Handles compare equal when they refer to the same view.
#[derive(Clone)]
pub struct AnyViewHandle {
    shared: SharedView,
}

impl AnyViewHandle {
    pub(crate) fn new(shared: SharedView) -> Self {
        Self { shared }
    }

    pub(crate) fn shared(&self) -> &SharedView {
        &self.shared
    }

    pub fn context(&self) -> &ViewContext {
        &self.shared.cx
    }

    pub fn id(&self) -> ViewId {
        self.shared.cx.id
    }

    pub fn view_type(&self) -> &'static str {
        self.shared.cx.view_type
    }

    pub fn layer(&self) -> Layer {
        self.shared.cx.layer.clone()
    }

    pub fn visual(&self) -> VisualHandle {
        self.shared.cx.visual
    }

    pub fn state(&self) -> ViewState {
        self.shared.state.get()
    }

    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    /// Whether the view behind this handle is a `V`
    pub fn is<V: View>(&self) -> bool {
        self.shared.type_id == TypeId::of::<V>()
    }

    /// Recover the typed handle
    pub fn downcast<V: View>(self) -> Option<ViewHandle<V>> {
        if self.is::<V>() {
            Some(ViewHandle {
                inner: self,
                _view: PhantomData,
            })
        } else {
            None
        }
    }
}

impl PartialEq for AnyViewHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for AnyViewHandle {}

impl fmt::Debug for AnyViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyViewHandle")
            .field("id", &self.id())
            .field("view_type", &self.view_type())
            .field("layer", &self.shared.cx.layer)
            .field("state", &self.state())
            .finish()
    }
}

/// Typed handle to a view of type `V`
///
/// Derefs to [`AnyViewHandle`], so it can be passed wherever an untyped
/// handle is expected.
pub struct ViewHandle<V> {
    inner: AnyViewHandle,
    _view: PhantomData<fn() -> V>,
}

impl<V: View> ViewHandle<V> {
    pub(crate) fn new(shared: SharedView) -> Self {
        Self {
            inner: AnyViewHandle::new(shared),
            _view: PhantomData,
        }
    }

    /// Borrow the view
    ///
    /// Returns `None` while the view is being driven through a hook.
    pub fn borrow(&self) -> Option<Ref<'_, V>> {
        let view = self.inner.shared.view.try_borrow().ok()?;
        Ref::filter_map(view, |v| v.as_any().downcast_ref::<V>()).ok()
    }

    /// Mutably borrow the view
    pub fn borrow_mut(&self) -> Option<RefMut<'_, V>> {
        let view = self.inner.shared.view.try_borrow_mut().ok()?;
        RefMut::filter_map(view, |v| v.as_any_mut().downcast_mut::<V>()).ok()
    }

    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.borrow().map(|view| f(&view))
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.borrow_mut().map(|mut view| f(&mut view))
    }

    pub fn erase(self) -> AnyViewHandle {
        self.inner
    }
}

impl<V> Clone for ViewHandle<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _view: PhantomData,
        }
    }
}

impl<V> Deref for ViewHandle<V> {
    type Target = AnyViewHandle;

    fn deref(&self) -> &AnyViewHandle {
        &self.inner
    }
}

impl<V> PartialEq for ViewHandle<V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<V> Eq for ViewHandle<V> {}

impl<V> PartialEq<AnyViewHandle> for ViewHandle<V> {
    fn eq(&self, other: &AnyViewHandle) -> bool {
        &self.inner == other
    }
}

impl<V> PartialEq<ViewHandle<V>> for AnyViewHandle {
    fn eq(&self, other: &ViewHandle<V>) -> bool {
        self == &other.inner
    }
}

impl<V> fmt::Debug for ViewHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<V> From<ViewHandle<V>> for AnyViewHandle {
    fn from(handle: ViewHandle<V>) -> Self {
        handle.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut state = ViewState::Created;
        for (event, expected) in [
            (Lifecycle::Open, ViewState::Opened),
            (Lifecycle::Resume, ViewState::Resumed),
            (Lifecycle::Update, ViewState::Resumed),
            (Lifecycle::Resume, ViewState::Resumed),
            (Lifecycle::Pause, ViewState::Paused),
            (Lifecycle::Close, ViewState::Closed),
        ] {
            state = state.after(event).unwrap();
            assert_eq!(state, expected, "after {:?}", event);
        }
    }

    #[test]
    fn test_closed_is_terminal() {
        for event in [
            Lifecycle::Open,
            Lifecycle::Resume,
            Lifecycle::Pause,
            Lifecycle::Close,
            Lifecycle::Update,
        ] {
            assert_eq!(ViewState::Closed.after(event), None);
        }
    }

    #[test]
    fn test_pause_only_as_teardown() {
        // Pause before the first resume, or twice in a row, is illegal
        assert_eq!(ViewState::Opened.after(Lifecycle::Pause), None);
        assert_eq!(ViewState::Paused.after(Lifecycle::Pause), None);
        // Paused views never resume, they close
        assert_eq!(ViewState::Paused.after(Lifecycle::Resume), None);
        assert_eq!(ViewState::Paused.after(Lifecycle::Update), None);
    }

    #[test]
    fn test_close_requires_pause() {
        assert_eq!(ViewState::Resumed.after(Lifecycle::Close), None);
        assert_eq!(ViewState::Created.after(Lifecycle::Close), None);
    }

    struct Counter {
        hits: Vec<Lifecycle>,
    }

    impl View for Counter {
        type Data = ();
        const VIEW_TYPE: &'static str = "Counter";

        fn from_data(_: ()) -> Self {
            Self { hits: Vec::new() }
        }

        fn on_open(&mut self, _: &mut ViewCx<'_>) {
            self.hits.push(Lifecycle::Open);
        }

        fn on_pause(&mut self, _: &mut ViewCx<'_>) {
            self.hits.push(Lifecycle::Pause);
        }
    }

    struct Other;

    impl View for Other {
        type Data = ();
        const VIEW_TYPE: &'static str = "Other";

        fn from_data(_: ()) -> Self {
            Other
        }
    }

    fn shared() -> SharedView {
        ViewShared::new::<Counter>(
            ViewContext {
                id: ViewId(1),
                view_type: Counter::VIEW_TYPE,
                layer: Layer::Normal,
                visual: VisualHandle(7),
            },
            (),
        )
    }

    #[test]
    fn test_rejected_transition_skips_hook() {
        let shared = shared();
        assert!(!shared.apply(Lifecycle::Pause, None));
        assert!(shared.apply(Lifecycle::Open, None));

        let handle = ViewHandle::<Counter>::new(shared);
        assert_eq!(handle.state(), ViewState::Opened);
        assert_eq!(handle.with(|c| c.hits.clone()).unwrap(), vec![Lifecycle::Open]);
    }

    #[test]
    fn test_downcast_checks_type() {
        let any = AnyViewHandle::new(shared());
        assert!(any.is::<Counter>());
        assert!(any.clone().downcast::<Other>().is_none());

        let typed = any.clone().downcast::<Counter>().unwrap();
        assert_eq!(typed, any);
        assert_eq!(typed.view_type(), "Counter");
        assert_eq!(typed.visual(), VisualHandle(7));
    }

    #[test]
    fn test_identity_readable_while_view_is_borrowed() {
        let handle = ViewHandle::<Counter>::new(shared());
        let _guard = handle.borrow_mut().unwrap();

        assert!(handle.borrow().is_none());
        assert_eq!(handle.id(), ViewId(1));
        assert_eq!(handle.state(), ViewState::Created);
        assert!(handle.is::<Counter>());
        assert!(format!("{:?}", handle).contains("Counter"));
    }

    #[test]
    fn test_borrowed_view_changes_state_without_hook() {
        let handle = ViewHandle::<Counter>::new(shared());
        {
            let _guard = handle.borrow().unwrap();
            assert!(!handle.shared().apply(Lifecycle::Open, None));
            assert!(!handle.shared().apply(Lifecycle::Update, None));
        }

        assert_eq!(handle.state(), ViewState::Opened);
        assert!(handle.with(|c| c.hits.is_empty()).unwrap());
    }

    #[test]
    fn test_find_child_without_host_is_none() {
        let cx = ViewContext {
            id: ViewId(3),
            view_type: "Counter",
            layer: Layer::Popup,
            visual: VisualHandle(9),
        };
        let mut view_cx = ViewCx {
            context: &cx,
            host: None,
        };
        assert_eq!(view_cx.find_child("CloseButton"), None);
        assert_eq!(view_cx.layer, Layer::Popup);
    }
}
