//! vdt virtual DOM runtime.
//!
//! This crate implements the reconciliation engine behind compiled vdt
//! templates: the VNode model and children normalizer, mount/patch/unmount
//! over a DOM capability interface, delegated-event bookkeeping, and the
//! stateful component runtime with asynchronous initialization.
//!
//! The model is single-threaded and event-loop-driven: every top-level
//! operation runs synchronously to completion, and the only suspension
//! point is a component init awaiting a [`component::Deferred`].

pub mod component;
pub mod dom;
pub mod events;
pub mod normalize;
pub mod vnode;

mod mount;
mod patch;
mod runtime;
mod unmount;

pub use component::{
    Component, ComponentSpec, Deferred, InitResult, InstanceHandle, LifecycleState, SetOptions,
    WatchCallback,
};
pub use dom::{Dom, DomStats, MemoryDom, NodeId, SVG_NAMESPACE};
pub use events::{DelegationTable, Event, EventHandler, EventRegistry, EVENT_PROP_PREFIX};
pub use normalize::{normalize_children, ChildInput};
pub use runtime::{Runtime, WeakRuntime};
pub use vnode::{
    Children, ElementFlags, Key, PropValue, Props, Ref, RefTarget, VNode, VNodeKind,
};
