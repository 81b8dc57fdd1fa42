//! The runtime context that owns a render root.
//!
//! One `Runtime` is created per render root and owns the DOM capability,
//! the event-delegation registry, and the mounted-callback queue. All
//! mount/patch/unmount work runs synchronously to completion once entered;
//! the queue (refs, `mounted` hooks, deferred notifications) is flushed in
//! FIFO order strictly after the triggering top-level operation has
//! finished mutating the DOM.

use crate::component::{self, InstanceHandle};
use crate::dom::{Dom, NodeId};
use crate::events::EventRegistry;
use crate::vnode::VNode;
use std::cell::{Cell, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// A callback queued for execution after the current top-level operation.
pub(crate) type QueuedCallback = Box<dyn FnOnce(&Runtime)>;

/// The host capabilities a runtime drives.
pub(crate) struct RuntimeInner {
    pub(crate) dom: Box<dyn Dom>,
    pub(crate) events: Box<dyn EventRegistry>,
}

pub(crate) struct RuntimeCtx {
    inner: RefCell<RuntimeInner>,
    queue: RefCell<VecDeque<QueuedCallback>>,
    depth: Cell<u32>,
}

/// A render root's runtime. Cheap to clone; clones share one context.
#[derive(Clone)]
pub struct Runtime {
    ctx: Rc<RuntimeCtx>,
}

impl Runtime {
    /// Create a runtime over a DOM environment and an event registry.
    pub fn new(dom: impl Dom + 'static, events: impl EventRegistry + 'static) -> Self {
        Self {
            ctx: Rc::new(RuntimeCtx {
                inner: RefCell::new(RuntimeInner {
                    dom: Box::new(dom),
                    events: Box::new(events),
                }),
                queue: RefCell::new(VecDeque::new()),
                depth: Cell::new(0),
            }),
        }
    }

    /// Mount a fresh vnode tree into `parent` before `anchor`.
    pub fn mount(&self, vnode: &mut VNode, parent: NodeId, anchor: Option<NodeId>) {
        self.enter();
        {
            let mut inner = self.ctx.inner.borrow_mut();
            crate::mount::mount(self, &mut inner, vnode, parent, anchor);
        }
        self.leave_and_flush();
    }

    /// Reconcile `old` against `new`, mutating the DOM minimally.
    pub fn patch(&self, old: &VNode, new: &mut VNode, parent: NodeId) {
        self.patch_with(old, new, parent, false);
    }

    /// Reconcile with an explicit force flag, bypassing component
    /// update-skipping.
    pub fn patch_with(&self, old: &VNode, new: &mut VNode, parent: NodeId, force: bool) {
        self.enter();
        {
            let mut inner = self.ctx.inner.borrow_mut();
            crate::patch::patch(self, &mut inner, old, new, parent, force);
        }
        self.leave_and_flush();
    }

    /// Tear down a mounted vnode tree.
    pub fn unmount(&self, vnode: &VNode, parent: NodeId) {
        self.enter();
        {
            let mut inner = self.ctx.inner.borrow_mut();
            crate::unmount::unmount(self, &mut inner, vnode, parent);
        }
        self.leave_and_flush();
    }

    pub(crate) fn update_component(&self, handle: &InstanceHandle, force: bool) {
        let Ok(mut inner) = self.ctx.inner.try_borrow_mut() else {
            // An operation is already driving the DOM; run after it.
            let retry = handle.clone();
            self.enqueue(Box::new(move |rt| rt.update_component(&retry, force)));
            return;
        };
        self.enter();
        component::rerender(self, &mut inner, handle, force);
        drop(inner);
        self.leave_and_flush();
    }

    pub(crate) fn enter(&self) {
        self.ctx.depth.set(self.ctx.depth.get() + 1);
    }

    pub(crate) fn leave_and_flush(&self) {
        self.ctx.depth.set(self.ctx.depth.get() - 1);
        self.flush();
    }

    pub(crate) fn inner_mut(&self) -> RefMut<'_, RuntimeInner> {
        self.ctx.inner.borrow_mut()
    }

    pub(crate) fn enqueue(&self, callback: QueuedCallback) {
        self.ctx.queue.borrow_mut().push_back(callback);
    }

    /// Enqueue and flush immediately when idle.
    pub(crate) fn defer(&self, callback: QueuedCallback) {
        self.enqueue(callback);
        self.flush();
    }

    pub(crate) fn downgrade(&self) -> WeakRuntime {
        WeakRuntime {
            ctx: Rc::downgrade(&self.ctx),
        }
    }

    fn flush(&self) {
        loop {
            if self.ctx.depth.get() > 0 {
                return;
            }
            let callback = self.ctx.queue.borrow_mut().pop_front();
            match callback {
                Some(callback) => callback(self),
                None => return,
            }
        }
    }
}

/// Weak reference to a runtime, held by component instances and deferred
/// continuations so a dropped root does not keep the context alive.
#[derive(Clone)]
pub struct WeakRuntime {
    ctx: Weak<RuntimeCtx>,
}

impl WeakRuntime {
    /// Upgrade to a strong runtime handle.
    pub fn upgrade(&self) -> Option<Runtime> {
        self.ctx.upgrade().map(|ctx| Runtime { ctx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{
        Component, ComponentSpec, Deferred, InitResult, LifecycleState, SetOptions,
    };
    use crate::dom::MemoryDom;
    use crate::events::{DelegationTable, EventHandler};
    use crate::normalize::ChildInput;
    use crate::vnode::{Children, PropValue, Props, Ref, RefTarget, VNode, VNodeKind};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Runtime, MemoryDom, DelegationTable, NodeId) {
        let dom = MemoryDom::new();
        let events = DelegationTable::new();
        let root = dom.create_root();
        let rt = Runtime::new(dom.clone(), events.clone());
        (rt, dom, events, root)
    }

    fn instance_of(tree: &VNode) -> crate::component::InstanceHandle {
        match &tree.kind {
            VNodeKind::Component(c) => c.instance.clone().expect("mounted component"),
            _ => panic!("expected component vnode"),
        }
    }

    fn prop_str(props: &Props, key: &str) -> String {
        match props.get(key) {
            Some(PropValue::Str(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Renders `<span>{text}{suffix}</span>` from its props.
    struct Label;

    impl Component for Label {
        fn default_props(&self) -> Props {
            let mut props = Props::new();
            props.insert("text".into(), PropValue::from(""));
            props.insert("suffix".into(), PropValue::from(""));
            props
        }

        fn render(&self, props: &Props, _children: &Children) -> VNode {
            let text = format!("{}{}", prop_str(props, "text"), prop_str(props, "suffix"));
            VNode::element("span").children(text)
        }
    }

    fn label_spec() -> ComponentSpec {
        ComponentSpec::new("Label", || Box::new(Label))
    }

    fn li(key: &str, text: &str) -> VNode {
        VNode::element("li").key(key).children(text)
    }

    #[test]
    fn test_mount_element_tree() {
        let (rt, dom, _events, root) = setup();
        let mut tree = VNode::element("div").class_name("app").children(vec![
            ChildInput::from("hello "),
            VNode::element("span").children("world").into(),
        ]);
        rt.mount(&mut tree, root, None);
        assert_eq!(
            dom.inner_html(root),
            "<div class=\"app\">hello <span>world</span></div>"
        );
        assert!(tree.dom.is_some());
    }

    #[test]
    fn test_mount_unmount_symmetry() {
        let (rt, dom, events, root) = setup();
        let clicked = Rc::new(RefCell::new(0));
        let counter = clicked.clone();
        let handler: EventHandler = Rc::new(move |_| *counter.borrow_mut() += 1);
        let mut tree = VNode::element("div").children(vec![
            VNode::element("button")
                .prop("ev-click", PropValue::Event(handler))
                .children("go")
                .into(),
            ChildInput::from(VNode::element("p").children("text")),
        ]);
        rt.mount(&mut tree, root, None);
        assert_eq!(events.len(), 1);
        let div = dom.children(root)[0];
        let button = dom.children(div)[0];
        assert!(events.emit("click", button));
        assert_eq!(*clicked.borrow(), 1);

        rt.unmount(&tree, root);
        assert!(dom.children(root).is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_patch_updates_props_and_text() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("div").prop("id", "a").children("one");
        rt.mount(&mut old, root, None);
        assert_eq!(dom.inner_html(root), "<div id=\"a\">one</div>");

        let mut new = VNode::element("div").prop("title", "t").children("two");
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(root), "<div title=\"t\">two</div>");
        assert_eq!(new.dom, old.dom);
    }

    #[test]
    fn test_patch_event_prop_swap_rebinds() {
        let (rt, dom, events, root) = setup();
        let first = Rc::new(RefCell::new(0));
        let second = Rc::new(RefCell::new(0));
        let c1 = first.clone();
        let c2 = second.clone();
        let h1: EventHandler = Rc::new(move |_| *c1.borrow_mut() += 1);
        let h2: EventHandler = Rc::new(move |_| *c2.borrow_mut() += 1);

        let mut old = VNode::element("a").prop("ev-click", PropValue::Event(h1));
        rt.mount(&mut old, root, None);
        let a = dom.children(root)[0];
        events.emit("click", a);

        let mut new = VNode::element("a").prop("ev-click", PropValue::Event(h2));
        rt.patch(&old, &mut new, root);
        events.emit("click", a);
        assert_eq!((*first.borrow(), *second.borrow()), (1, 1));

        let mut bare = VNode::element("a");
        rt.patch(&new, &mut bare, root);
        assert!(events.is_empty());
    }

    #[test]
    fn test_patch_replaces_on_tag_change() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("div").children("x");
        rt.mount(&mut old, root, None);
        let mut new = VNode::element("span").children("x");
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(root), "<span>x</span>");
    }

    #[test]
    fn test_keyed_reorder_is_minimal_and_reuses_nodes() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("ul").children(vec![li("A", "a"), li("B", "b"), li("C", "c")]);
        rt.mount(&mut old, root, None);
        let ul = dom.children(root)[0];
        let before = dom.children(ul);

        dom.reset_stats();
        let mut new = VNode::element("ul").children(vec![li("C", "c"), li("A", "a"), li("B", "b")]);
        rt.patch(&old, &mut new, root);

        assert_eq!(dom.inner_html(ul), "<li>c</li><li>a</li><li>b</li>");
        let stats = dom.stats();
        assert_eq!(stats.created, 0, "keys present in both lists never remount");
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.moved, 1, "only C changed relative order");
        let after = dom.children(ul);
        assert_eq!(after, vec![before[2], before[0], before[1]]);
    }

    #[test]
    fn test_keyed_add_and_remove() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("ul").children(vec![li("A", "a"), li("B", "b"), li("C", "c")]);
        rt.mount(&mut old, root, None);
        let ul = dom.children(root)[0];

        let mut new = VNode::element("ul").children(vec![li("B", "b"), li("D", "d")]);
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(ul), "<li>b</li><li>d</li>");
    }

    #[test]
    fn test_keyed_reversal() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("ul").children(vec![
            li("A", "a"),
            li("B", "b"),
            li("C", "c"),
            li("D", "d"),
        ]);
        rt.mount(&mut old, root, None);
        let ul = dom.children(root)[0];

        dom.reset_stats();
        let mut new = VNode::element("ul").children(vec![
            li("D", "d"),
            li("C", "c"),
            li("B", "b"),
            li("A", "a"),
        ]);
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(ul), "<li>d</li><li>c</li><li>b</li><li>a</li>");
        assert_eq!(dom.stats().created, 0);
        // Reversal keeps one node fixed and moves the rest.
        assert_eq!(dom.stats().moved, 3);
    }

    #[test]
    fn test_non_keyed_positional_patch() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("div").children(vec![
            VNode::element("i").children("1"),
            VNode::element("i").children("2"),
            VNode::element("i").children("3"),
        ]);
        rt.mount(&mut old, root, None);
        let container = dom.children(root)[0];

        let mut new = VNode::element("div").children(vec![
            VNode::element("i").children("1"),
            VNode::element("i").children("9"),
        ]);
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(container), "<i>1</i><i>9</i>");
    }

    #[test]
    fn test_fragment_mounts_without_wrapper_and_grows_in_place() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::fragment(vec![
            VNode::element("i").children("1"),
            VNode::element("b").children("2"),
        ]);
        rt.mount(&mut old, root, None);
        assert_eq!(dom.inner_html(root), "<i>1</i><b>2</b><!---->");

        let mut new = VNode::fragment(vec![
            VNode::element("i").children("1"),
            VNode::element("b").children("2"),
            VNode::element("u").children("3"),
        ]);
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(root), "<i>1</i><b>2</b><u>3</u><!---->");
    }

    #[test]
    fn test_children_shape_transition_single_to_array() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::element("div").children(VNode::element("span").children("only"));
        rt.mount(&mut old, root, None);
        let container = dom.children(root)[0];

        let mut new = VNode::element("div").children(vec![
            VNode::element("span").children("a"),
            VNode::element("span").children("b"),
        ]);
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(container), "<span>a</span><span>b</span>");

        let mut none = VNode::element("div");
        rt.patch(&new, &mut none, root);
        assert_eq!(dom.inner_html(container), "");
    }

    #[test]
    fn test_ref_lifecycle() {
        let (rt, dom, _events, root) = setup();
        let seen: Rc<RefCell<Option<NodeId>>> = Rc::new(RefCell::new(None));
        let slot = seen.clone();
        let node_ref = Ref::callback(move |target| match target {
            Some(RefTarget::Dom(id)) => *slot.borrow_mut() = Some(id),
            _ => *slot.borrow_mut() = None,
        });
        let mut tree = VNode::element("div").with_ref(node_ref);
        rt.mount(&mut tree, root, None);
        let id = seen.borrow().expect("ref delivered after mount");
        assert_eq!(dom.parent(id), Some(root));

        rt.unmount(&tree, root);
        assert!(seen.borrow().is_none());
    }

    #[test]
    fn test_component_mount_and_set() {
        let (rt, dom, _events, root) = setup();
        let mut tree = VNode::component(label_spec()).prop("text", "hi");
        rt.mount(&mut tree, root, None);
        assert_eq!(dom.inner_html(root), "<span>hi</span>");

        let handle = instance_of(&tree);
        assert_eq!(handle.state(), LifecycleState::Mounted);

        handle.set("text", "yo");
        assert_eq!(dom.inner_html(root), "<span>yo</span>");
    }

    #[test]
    fn test_silent_set_defers_render_and_notifications() {
        let (rt, dom, _events, root) = setup();
        let mut tree = VNode::component(label_spec()).prop("text", "hi");
        rt.mount(&mut tree, root, None);
        let handle = instance_of(&tree);

        let notified = Rc::new(RefCell::new(0));
        let count = notified.clone();
        handle.watch("text", move |_, _| *count.borrow_mut() += 1);

        handle.set_with("text", "one", SetOptions::silent());
        assert_eq!(dom.inner_html(root), "<span>hi</span>", "no DOM mutation");
        assert_eq!(*notified.borrow(), 0, "no change notification");

        // A later non-silent set reflects the cumulative state.
        handle.set("suffix", "!");
        assert_eq!(dom.inner_html(root), "<span>one!</span>");
        assert_eq!(*notified.borrow(), 0, "only the suffix watcher would fire");
    }

    #[test]
    fn test_watch_fires_on_set() {
        let (rt, _dom, _events, root) = setup();
        let mut tree = VNode::component(label_spec());
        rt.mount(&mut tree, root, None);
        let handle = instance_of(&tree);

        let seen: Rc<RefCell<Vec<(String, Option<String>)>>> = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        handle.watch("text", move |new, old| {
            let render = |v: &PropValue| match v {
                PropValue::Str(s) => s.clone(),
                _ => String::new(),
            };
            log.borrow_mut().push((render(new), old.map(render)));
        });

        handle.set("text", "a");
        handle.set("text", "b");
        assert_eq!(
            *seen.borrow(),
            vec![
                ("a".to_string(), Some("".to_string())),
                ("b".to_string(), Some("a".to_string())),
            ]
        );
    }

    /// Counts renders so update-skipping and forcing are observable.
    struct Counting {
        renders: Rc<RefCell<usize>>,
    }

    impl Component for Counting {
        fn render(&self, _props: &Props, _children: &Children) -> VNode {
            *self.renders.borrow_mut() += 1;
            VNode::element("p")
        }
    }

    #[test]
    fn test_force_update_always_rerenders() {
        let (rt, _dom, _events, root) = setup();
        let renders = Rc::new(RefCell::new(0));
        let counter = renders.clone();
        let spec = ComponentSpec::new("Counting", move || {
            Box::new(Counting {
                renders: counter.clone(),
            })
        });

        let mut tree = VNode::component(spec.clone());
        rt.mount(&mut tree, root, None);
        assert_eq!(*renders.borrow(), 1);

        let handle = instance_of(&tree);
        handle.force_update();
        assert_eq!(*renders.borrow(), 2);

        // A forced patch from the owner re-renders as well.
        let mut next = VNode::component(spec);
        rt.patch_with(&tree, &mut next, root, true);
        assert_eq!(*renders.borrow(), 3);
    }

    type Log = Rc<RefCell<Vec<String>>>;

    struct Child {
        log: Log,
    }

    impl Component for Child {
        fn render(&self, _props: &Props, _children: &Children) -> VNode {
            VNode::element("em").children("child")
        }

        fn mounted(&mut self) {
            self.log.borrow_mut().push("child mounted".into());
        }

        fn before_unmount(&mut self) {
            self.log.borrow_mut().push("child before_unmount".into());
        }

        fn unmounted(&mut self) {
            self.log.borrow_mut().push("child unmounted".into());
        }
    }

    struct Parent {
        log: Log,
        child: ComponentSpec,
    }

    impl Component for Parent {
        fn render(&self, _props: &Props, _children: &Children) -> VNode {
            VNode::element("div").children(VNode::component(self.child.clone()))
        }

        fn mounted(&mut self) {
            self.log.borrow_mut().push("parent mounted".into());
        }

        fn before_unmount(&mut self) {
            self.log.borrow_mut().push("parent before_unmount".into());
        }

        fn unmounted(&mut self) {
            self.log.borrow_mut().push("parent unmounted".into());
        }
    }

    fn parent_spec(log: &Log) -> ComponentSpec {
        let child_log = log.clone();
        let child = ComponentSpec::new("Child", move || {
            Box::new(Child {
                log: child_log.clone(),
            })
        });
        let parent_log = log.clone();
        ComponentSpec::new("Parent", move || {
            Box::new(Parent {
                log: parent_log.clone(),
                child: child.clone(),
            })
        })
    }

    #[test]
    fn test_mounted_fires_children_before_parents() {
        let (rt, dom, _events, root) = setup();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = VNode::component(parent_spec(&log));
        rt.mount(&mut tree, root, None);
        assert_eq!(dom.inner_html(root), "<div><em>child</em></div>");
        assert_eq!(*log.borrow(), vec!["child mounted", "parent mounted"]);
    }

    #[test]
    fn test_unmount_runs_component_teardown_depth_first() {
        let (rt, dom, _events, root) = setup();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = VNode::component(parent_spec(&log));
        rt.mount(&mut tree, root, None);
        log.borrow_mut().clear();

        rt.unmount(&tree, root);
        assert!(dom.children(root).is_empty());
        assert_eq!(
            *log.borrow(),
            vec![
                "parent before_unmount",
                "child before_unmount",
                "child unmounted",
                "parent unmounted",
            ]
        );
        assert_eq!(instance_of(&tree).state(), LifecycleState::Unmounted);
    }

    struct Lazy {
        deferred: Deferred,
    }

    impl Component for Lazy {
        fn default_props(&self) -> Props {
            let mut props = Props::new();
            props.insert("text".into(), PropValue::from("ready"));
            props
        }

        fn init(&mut self) -> InitResult {
            InitResult::Pending(self.deferred.clone())
        }

        fn render(&self, props: &Props, _children: &Children) -> VNode {
            VNode::element("em").children(prop_str(props, "text"))
        }
    }

    fn lazy_spec(deferred: &Deferred) -> ComponentSpec {
        let deferred = deferred.clone();
        ComponentSpec::new("Lazy", move || {
            Box::new(Lazy {
                deferred: deferred.clone(),
            })
        })
    }

    #[test]
    fn test_async_init_mounts_placeholder_then_real_output() {
        let (rt, dom, _events, root) = setup();
        let deferred = Deferred::new();
        let mut tree = VNode::component(lazy_spec(&deferred));
        rt.mount(&mut tree, root, None);

        // Scenario: the triggering render has returned, the component is
        // still initializing, and a placeholder holds its position.
        assert_eq!(dom.inner_html(root), "<!---->");
        let handle = instance_of(&tree);
        assert_eq!(handle.state(), LifecycleState::Constructing);

        deferred.resolve();
        assert_eq!(dom.inner_html(root), "<em>ready</em>");
        assert_eq!(handle.state(), LifecycleState::Mounted);
    }

    #[test]
    fn test_async_init_queues_prop_changes_in_order() {
        let (rt, dom, _events, root) = setup();
        let deferred = Deferred::new();
        let mut tree = VNode::component(lazy_spec(&deferred));
        rt.mount(&mut tree, root, None);
        let handle = instance_of(&tree);

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        handle.watch("text", move |new, _| {
            if let PropValue::Str(s) = new {
                log.borrow_mut().push(s.clone());
            }
        });

        handle.set("text", "first");
        handle.set("text", "second");
        assert_eq!(dom.inner_html(root), "<!---->", "still deferred");
        assert!(seen.borrow().is_empty(), "notifications wait for settle");

        deferred.resolve();
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(dom.inner_html(root), "<em>second</em>");
    }

    #[test]
    fn test_async_settle_after_unmount_is_noop() {
        let (rt, dom, _events, root) = setup();
        let deferred = Deferred::new();
        let mut tree = VNode::component(lazy_spec(&deferred));
        rt.mount(&mut tree, root, None);
        rt.unmount(&tree, root);
        assert!(dom.children(root).is_empty());

        deferred.resolve();
        assert!(dom.children(root).is_empty());
    }

    #[test]
    fn test_async_rejection_is_swallowed_and_proceeds() {
        let (rt, dom, _events, root) = setup();
        let deferred = Deferred::new();
        let mut tree = VNode::component(lazy_spec(&deferred));
        rt.mount(&mut tree, root, None);

        deferred.reject("backend exploded");
        assert_eq!(dom.inner_html(root), "<em>ready</em>");
        assert_eq!(instance_of(&tree).state(), LifecycleState::Mounted);
    }

    #[test]
    fn test_component_update_from_parent_patch() {
        let (rt, dom, _events, root) = setup();
        let spec = label_spec();
        let mut old = VNode::component(spec.clone()).prop("text", "a");
        rt.mount(&mut old, root, None);
        let span_before = dom.children(root)[0];

        let mut new = VNode::component(spec).prop("text", "b");
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(root), "<span>b</span>");
        // Same instance, same DOM node: patched, not remounted.
        assert_eq!(dom.children(root)[0], span_before);
        match instance_of(&new).get("text") {
            Some(PropValue::Str(s)) => assert_eq!(s, "b"),
            other => panic!("Expected text prop, got {:?}", other),
        }
    }

    #[test]
    fn test_component_replaced_by_different_spec() {
        let (rt, dom, _events, root) = setup();
        let mut old = VNode::component(label_spec()).prop("text", "a");
        rt.mount(&mut old, root, None);
        let old_handle = instance_of(&old);

        let renders = Rc::new(RefCell::new(0));
        let counter = renders.clone();
        let other = ComponentSpec::new("Counting", move || {
            Box::new(Counting {
                renders: counter.clone(),
            })
        });
        let mut new = VNode::component(other);
        rt.patch(&old, &mut new, root);
        assert_eq!(dom.inner_html(root), "<p></p>");
        assert!(!old_handle.is_alive());
    }
}
