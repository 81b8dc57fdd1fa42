//! Stateful component runtime.
//!
//! A component instance persists across render passes: created once on
//! first mount, mutated by each patch cycle, destroyed when its owning
//! vnode leaves the tree. Initialization is the single suspension point in
//! the reconciler — `init` may return a pending [`Deferred`] that the host
//! settles later, during which the component holds its place in the DOM
//! with a comment placeholder.

use crate::dom::NodeId;
use crate::runtime::{Runtime, RuntimeInner, WeakRuntime};
use crate::vnode::{Children, PropValue, Props, VNode};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::cell::{BorrowMutError, Ref as CellRef, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// User-defined component behavior.
pub trait Component: 'static {
    /// Props merged under the owner-provided props.
    fn default_props(&self) -> Props {
        Props::new()
    }

    /// One-time initialization. Return [`InitResult::Pending`] to defer the
    /// first render until the host settles the deferred.
    fn init(&mut self) -> InitResult {
        InitResult::Ready
    }

    /// Produce the component's output for the current props and children.
    fn render(&self, props: &Props, children: &Children) -> VNode;

    /// The component's DOM is attached; descendants are already mounted.
    fn mounted(&mut self) {}

    /// An update cycle is about to render.
    fn before_update(&mut self, props: &Props) {
        let _ = props;
    }

    /// An update cycle finished patching.
    fn updated(&mut self) {}

    /// Teardown is starting.
    fn before_unmount(&mut self) {}

    /// Teardown finished.
    fn unmounted(&mut self) {}
}

/// Outcome of [`Component::init`].
pub enum InitResult {
    /// Initialization finished synchronously.
    Ready,
    /// Initialization suspends until the deferred settles.
    Pending(Deferred),
}

type SettleCallback = Box<dyn FnOnce(Result<(), String>)>;

#[derive(Default)]
struct DeferredInner {
    settled: Option<Result<(), String>>,
    callbacks: Vec<SettleCallback>,
}

/// A single-threaded promise-like completion cell.
///
/// The host settles it from its event loop; continuations run synchronously
/// at settle time, in registration order. Settling twice is a no-op. There
/// is no cancellation — a continuation registered by a component that has
/// since been unmounted checks the instance's alive flag and backs out.
#[derive(Clone, Default)]
pub struct Deferred {
    inner: Rc<RefCell<DeferredInner>>,
}

impl Deferred {
    /// Create a pending deferred.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle successfully.
    pub fn resolve(&self) {
        self.settle(Ok(()));
    }

    /// Settle with an error message.
    pub fn reject(&self, message: impl Into<String>) {
        self.settle(Err(message.into()));
    }

    /// Check whether the deferred has settled.
    pub fn is_settled(&self) -> bool {
        self.inner.borrow().settled.is_some()
    }

    /// Register a continuation; runs immediately when already settled.
    pub fn on_settle(&self, callback: impl FnOnce(Result<(), String>) + 'static) {
        let settled = self.inner.borrow().settled.clone();
        match settled {
            Some(result) => callback(result),
            None => self.inner.borrow_mut().callbacks.push(Box::new(callback)),
        }
    }

    fn settle(&self, result: Result<(), String>) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.settled.is_some() {
                return;
            }
            inner.settled = Some(result.clone());
            std::mem::take(&mut inner.callbacks)
        };
        for callback in callbacks {
            callback(result.clone());
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

struct SpecInner {
    name: SmolStr,
    create: Box<dyn Fn() -> Box<dyn Component>>,
}

/// A component constructor. Two component vnodes are of the same kind iff
/// they share a spec (pointer identity).
#[derive(Clone)]
pub struct ComponentSpec {
    inner: Rc<SpecInner>,
}

impl ComponentSpec {
    /// Create a spec from a constructor function.
    pub fn new(
        name: impl Into<SmolStr>,
        create: impl Fn() -> Box<dyn Component> + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(SpecInner {
                name: name.into(),
                create: Box::new(create),
            }),
        }
    }

    /// The component's display name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Identity comparison.
    pub fn same(&self, other: &ComponentSpec) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn instantiate(&self) -> Box<dyn Component> {
        (self.inner.create)()
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentSpec({})", self.inner.name)
    }
}

/// Lifecycle states a persistent instance moves through, in order.
/// Updating and unmounting are transient phases between these states, not
/// stored states of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    /// Constructed; `init` not yet finished.
    Constructing,
    /// `init` finished (or its rejection was swallowed).
    Inited,
    /// First render evaluated and mounted.
    Rendered,
    /// `mounted` hook fired.
    Mounted,
    /// Terminal; no further updates are accepted.
    Unmounted,
}

/// Options for [`InstanceHandle::set_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Mutate the store without re-rendering or notifying watchers.
    pub silent: bool,
}

impl SetOptions {
    /// The silent option.
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// A prop-change notification callback: (new value, previous value).
pub type WatchCallback = Rc<dyn Fn(&PropValue, Option<&PropValue>)>;

type PropChange = (SmolStr, PropValue, Option<PropValue>);

/// The persistent state behind a mounted component vnode.
pub struct ComponentInstance {
    pub(crate) spec: ComponentSpec,
    pub(crate) component: Box<dyn Component>,
    pub(crate) props: Props,
    pub(crate) children: Children,
    pub(crate) state: LifecycleState,
    pub(crate) alive: bool,
    pub(crate) pending_init: bool,
    pub(crate) placeholder: Option<NodeId>,
    pub(crate) queued_notifications: Vec<PropChange>,
    pub(crate) last_input: Option<VNode>,
    pub(crate) watchers: FxHashMap<SmolStr, Vec<WatchCallback>>,
    pub(crate) runtime: WeakRuntime,
    pub(crate) parent_dom: Option<NodeId>,
    pub(crate) vnode_dom: Option<NodeId>,
}

impl ComponentInstance {
    pub(crate) fn new(
        spec: ComponentSpec,
        component: Box<dyn Component>,
        props: Props,
        children: Children,
        runtime: WeakRuntime,
    ) -> Self {
        Self {
            spec,
            component,
            props,
            children,
            state: LifecycleState::Constructing,
            alive: true,
            pending_init: false,
            placeholder: None,
            queued_notifications: Vec::new(),
            last_input: None,
            watchers: FxHashMap::default(),
            runtime,
            parent_dom: None,
            vnode_dom: None,
        }
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("spec", &self.spec.name())
            .field("state", &self.state)
            .field("alive", &self.alive)
            .finish()
    }
}

/// Shared handle to a component instance.
#[derive(Clone)]
pub struct InstanceHandle {
    inner: Rc<RefCell<ComponentInstance>>,
    runtime: WeakRuntime,
}

impl InstanceHandle {
    pub(crate) fn new(instance: ComponentInstance) -> Self {
        let runtime = instance.runtime.clone();
        Self {
            inner: Rc::new(RefCell::new(instance)),
            runtime,
        }
    }

    pub(crate) fn borrow(&self) -> CellRef<'_, ComponentInstance> {
        self.inner.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, ComponentInstance> {
        self.inner.borrow_mut()
    }

    pub(crate) fn try_borrow_mut(
        &self,
    ) -> Result<RefMut<'_, ComponentInstance>, BorrowMutError> {
        self.inner.try_borrow_mut()
    }

    pub(crate) fn downgrade(&self) -> WeakInstance {
        WeakInstance {
            inner: Rc::downgrade(&self.inner),
            runtime: self.runtime.clone(),
        }
    }

    /// The DOM node currently standing in for the component: its rendered
    /// root, or the placeholder while init is pending.
    pub fn current_dom(&self) -> Option<NodeId> {
        let instance = self.inner.borrow();
        if instance.pending_init {
            instance.placeholder
        } else {
            instance.vnode_dom
        }
    }

    /// Read one prop.
    pub fn get(&self, key: &str) -> Option<PropValue> {
        self.inner.borrow().props.get(key).cloned()
    }

    /// The instance's lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// False once unmount has begun.
    pub fn is_alive(&self) -> bool {
        self.inner.borrow().alive
    }

    /// Register a change notification callback for one prop.
    pub fn watch(
        &self,
        key: impl Into<SmolStr>,
        callback: impl Fn(&PropValue, Option<&PropValue>) + 'static,
    ) {
        self.inner
            .borrow_mut()
            .watchers
            .entry(key.into())
            .or_default()
            .push(Rc::new(callback));
    }

    /// Merge one prop and synchronously re-render.
    pub fn set(&self, key: impl Into<SmolStr>, value: impl Into<PropValue>) {
        self.set_with(key, value, SetOptions::default());
    }

    /// Merge one prop with options.
    pub fn set_with(
        &self,
        key: impl Into<SmolStr>,
        value: impl Into<PropValue>,
        options: SetOptions,
    ) {
        let mut entries = Props::new();
        entries.insert(key.into(), value.into());
        self.set_many(entries, options);
    }

    /// Merge several props. Unless silent, each change fires its watchers
    /// and one render→patch cycle runs. Silent updates mutate the store
    /// only; the caller owns any needed refresh.
    pub fn set_many(&self, entries: Props, options: SetOptions) {
        let Ok(mut instance) = self.inner.try_borrow_mut() else {
            // A render or hook on this instance is in progress; apply once
            // the current cycle finishes.
            let handle = self.clone();
            if let Some(runtime) = self.runtime.upgrade() {
                runtime.defer(Box::new(move |_rt| handle.set_many(entries, options)));
            }
            return;
        };
        if !instance.alive {
            return;
        }
        let mut changes: Vec<PropChange> = Vec::new();
        for (key, value) in entries {
            let old = instance.props.get(&key).cloned();
            if old.as_ref() == Some(&value) {
                continue;
            }
            instance.props.insert(key.clone(), value.clone());
            changes.push((key, value, old));
        }
        if changes.is_empty() || options.silent {
            return;
        }
        if instance.pending_init {
            // Notifications replay in order once init settles.
            instance.queued_notifications.append(&mut changes);
            return;
        }
        drop(instance);
        self.notify(&changes);
        self.rerender(false);
    }

    /// Re-render unconditionally, bypassing the unchanged-props skip.
    pub fn force_update(&self) {
        self.rerender(true);
    }

    pub(crate) fn notify(&self, changes: &[PropChange]) {
        for (key, new_value, old_value) in changes {
            let callbacks: Vec<WatchCallback> = {
                let instance = self.inner.borrow();
                instance.watchers.get(key).cloned().unwrap_or_default()
            };
            for callback in callbacks {
                callback(new_value, old_value.as_ref());
            }
        }
    }

    fn rerender(&self, force: bool) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.update_component(self, force);
        }
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.borrow().fmt(f)
    }
}

/// A weak handle captured by deferred-init continuations.
#[derive(Clone)]
pub struct WeakInstance {
    inner: Weak<RefCell<ComponentInstance>>,
    runtime: WeakRuntime,
}

impl WeakInstance {
    /// Upgrade back to a strong handle if the instance is still owned.
    pub fn upgrade(&self) -> Option<InstanceHandle> {
        self.inner.upgrade().map(|inner| InstanceHandle {
            inner,
            runtime: self.runtime.clone(),
        })
    }
}

/// Run one update cycle: `before_update`, render, patch against the last
/// input, `updated`.
pub(crate) fn rerender(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    handle: &InstanceHandle,
    force: bool,
) {
    let (old_input, mut new_input, parent) = {
        let Ok(mut instance) = handle.try_borrow_mut() else {
            // Update requested from inside this instance's own cycle;
            // run it after the cycle completes.
            let retry = handle.clone();
            rt.enqueue(Box::new(move |rt| rt.update_component(&retry, force)));
            return;
        };
        if !instance.alive
            || instance.pending_init
            || instance.state < LifecycleState::Rendered
        {
            return;
        }
        let ComponentInstance {
            component,
            props,
            children,
            ..
        } = &mut *instance;
        component.before_update(props);
        let input = component.render(props, children);
        (instance.last_input.take(), input, instance.parent_dom)
    };
    let Some(parent) = parent else {
        handle.borrow_mut().last_input = old_input;
        return;
    };
    match &old_input {
        Some(old) => crate::patch::patch(rt, inner, old, &mut new_input, parent, force),
        None => crate::mount::mount(rt, inner, &mut new_input, parent, None),
    }
    let first = new_input.first_dom();
    {
        let mut instance = handle.borrow_mut();
        instance.last_input = Some(new_input);
        instance.vnode_dom = first;
        instance.component.updated();
    }
}

/// Apply an owner-driven update: replace props (merged over defaults) and
/// children, fire change notifications, and re-render unless nothing
/// changed and the update is not forced.
pub(crate) fn update_from_parent(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    handle: &InstanceHandle,
    new_props: &Props,
    new_children: &Children,
    force: bool,
) {
    let mut changes: Vec<PropChange> = Vec::new();
    let (pending, removed) = {
        let mut instance = handle.borrow_mut();
        if !instance.alive {
            return;
        }
        instance.children = new_children.clone();
        let mut merged = instance.component.default_props();
        for (key, value) in new_props {
            merged.insert(key.clone(), value.clone());
        }
        for (key, value) in &merged {
            let old = instance.props.get(key);
            if old != Some(value) {
                changes.push((key.clone(), value.clone(), old.cloned()));
            }
        }
        let removed = instance.props.keys().any(|key| !merged.contains_key(key));
        instance.props = merged;
        (instance.pending_init, removed)
    };
    if pending {
        handle
            .borrow_mut()
            .queued_notifications
            .append(&mut changes);
        return;
    }
    let changed = !changes.is_empty() || removed;
    if !changes.is_empty() {
        // Deliver after the enclosing patch has finished mutating the DOM,
        // alongside refs and mounted hooks.
        let notify_handle = handle.clone();
        rt.enqueue(Box::new(move |_rt| notify_handle.notify(&changes)));
    }
    if !changed && !force {
        // Previous rendered output is reused as-is.
        return;
    }
    rerender(rt, inner, handle, force);
}
