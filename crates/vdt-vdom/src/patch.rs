//! Reconciliation: diff a previous vnode tree against the next one,
//! mutating the live DOM minimally.
//!
//! Nodes of different fundamental kinds are replaced wholesale; same-kind
//! elements diff props and children. Keyed sibling lists go through the
//! prefix/suffix/longest-increasing-subsequence algorithm so nodes whose
//! keys survive are repositioned, never recreated. Duplicate keys within
//! one sibling list are undefined behavior; debug builds assert.

use crate::component;
use crate::dom::NodeId;
use crate::events::event_prop_name;
use crate::mount::{mount, mount_children, queue_ref_attach};
use crate::runtime::{Runtime, RuntimeInner};
use crate::unmount::unmount;
use crate::vnode::{Children, PropValue, Props, VNode, VNodeKind};
use rustc_hash::FxHashMap;

/// Patch `old` into `new`. The current DOM handle transfers onto `new`;
/// `old` is discarded by the caller once the patch completes.
pub(crate) fn patch(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    old: &VNode,
    new: &mut VNode,
    parent: NodeId,
    force: bool,
) {
    if !old.same_kind(new) {
        replace(rt, inner, old, new, parent);
        return;
    }

    // A previous node that never received a DOM handle or instance cannot
    // be diffed against; mount fresh.
    let old_unmounted = match &old.kind {
        VNodeKind::Text(_) | VNodeKind::Element(_) => old.dom.is_none(),
        VNodeKind::Component(c) => c.instance.is_none(),
        VNodeKind::Fragment(f) => f.anchor.is_none(),
    };
    if old_unmounted {
        mount(rt, inner, new, parent, None);
        return;
    }

    match (&old.kind, &mut new.kind) {
        (VNodeKind::Text(old_text), VNodeKind::Text(new_text)) => {
            new.dom = old.dom;
            if let Some(id) = old.dom {
                if old_text != new_text {
                    inner.dom.set_text(id, new_text);
                }
            }
        }
        (VNodeKind::Element(old_el), VNodeKind::Element(new_el)) => {
            let Some(id) = old.dom else { return };
            new.dom = Some(id);
            if old_el.class_name != new_el.class_name {
                match &new_el.class_name {
                    Some(class) => inner.dom.set_attribute(id, "class", class),
                    None => inner.dom.remove_attribute(id, "class"),
                }
            }
            patch_props(inner, id, &old_el.props, &new_el.props);
            patch_children(
                rt,
                inner,
                &old_el.children,
                &mut new_el.children,
                id,
                None,
                force,
            );
        }
        (VNodeKind::Fragment(old_f), VNodeKind::Fragment(new_f)) => {
            new_f.anchor = old_f.anchor;
            patch_children(
                rt,
                inner,
                &old_f.children,
                &mut new_f.children,
                parent,
                old_f.anchor,
                force,
            );
            new.dom = new_f
                .children
                .nodes()
                .first()
                .and_then(|child| child.first_dom())
                .or(new_f.anchor);
        }
        (VNodeKind::Component(old_c), VNodeKind::Component(new_c)) => {
            // Same spec (kind equality already held): reuse the instance.
            let Some(handle) = old_c.instance.clone() else { return };
            new_c.instance = Some(handle.clone());
            component::update_from_parent(
                rt,
                inner,
                &handle,
                &new_c.props,
                &new_c.children,
                force,
            );
            new.dom = handle.current_dom();
        }
        _ => unreachable!("same_kind held"),
    }

    transfer_ref(rt, old, new);
}

/// Full replace: mount `new` at `old`'s position, then tear `old` down.
fn replace(rt: &Runtime, inner: &mut RuntimeInner, old: &VNode, new: &mut VNode, parent: NodeId) {
    let anchor = old.first_dom();
    mount(rt, inner, new, parent, anchor);
    unmount(rt, inner, old, parent);
}

fn transfer_ref(rt: &Runtime, old: &VNode, new: &VNode) {
    match (&old.node_ref, &new.node_ref) {
        (Some(old_ref), Some(new_ref)) if old_ref.same(new_ref) => {}
        (old_ref, new_ref) => {
            if let Some(old_ref) = old_ref {
                old_ref.attach(None);
            }
            if let Some(new_ref) = new_ref {
                queue_ref_attach(rt, new_ref.clone(), new);
            }
        }
    }
}

/// Apply one prop transition. Event props route through the delegation
/// registry; everything else becomes an attribute write or removal.
pub(crate) fn apply_prop(
    inner: &mut RuntimeInner,
    id: NodeId,
    name: &str,
    new: Option<&PropValue>,
    old: Option<&PropValue>,
) {
    if let Some(event) = event_prop_name(name) {
        match new {
            Some(PropValue::Event(handler)) => {
                inner
                    .events
                    .register_delegated_event(event, id, handler.clone());
            }
            _ => {
                if matches!(old, Some(PropValue::Event(_))) {
                    inner.events.unregister_delegated_event(event, id);
                }
            }
        }
        return;
    }
    match new {
        Some(value) => match value.as_attribute() {
            Some(text) => inner.dom.set_attribute(id, name, &text),
            None => inner.dom.remove_attribute(id, name),
        },
        None => {
            if old.is_some() {
                inner.dom.remove_attribute(id, name);
            }
        }
    }
}

/// Diff two prop bags by key; order is irrelevant.
fn patch_props(inner: &mut RuntimeInner, id: NodeId, old: &Props, new: &Props) {
    for (name, value) in new {
        let previous = old.get(name);
        if previous != Some(value) {
            apply_prop(inner, id, name, Some(value), previous);
        }
    }
    for (name, value) in old {
        if !new.contains_key(name) {
            apply_prop(inner, id, name, None, Some(value));
        }
    }
}

/// Diff children according to the next node's children shape.
///
/// `end_anchor` marks the insertion point at the end of this child list:
/// None for an element container (append), the trailing anchor comment for
/// a fragment segment.
fn patch_children(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    old: &Children,
    new: &mut Children,
    parent: NodeId,
    end_anchor: Option<NodeId>,
    force: bool,
) {
    match (old, new) {
        (Children::None, new_children) => {
            mount_children(rt, inner, new_children, parent, end_anchor);
        }
        (Children::Text(old_text), Children::Text(new_text)) => {
            if old_text != new_text {
                inner.dom.set_text(parent, new_text);
            }
        }
        (Children::Text(_), Children::None) => {
            inner.dom.set_text(parent, "");
        }
        (Children::Text(_), new_children) => {
            inner.dom.set_text(parent, "");
            mount_children(rt, inner, new_children, parent, end_anchor);
        }
        (Children::Single(old_node), Children::Single(new_node)) => {
            patch(rt, inner, old_node, new_node, parent, force);
        }
        (Children::Single(old_node), Children::None) => {
            unmount(rt, inner, old_node, parent);
        }
        (Children::Single(old_node), new_children) => {
            unmount(rt, inner, old_node, parent);
            mount_children(rt, inner, new_children, parent, end_anchor);
        }
        (Children::NonKeyed(old_nodes), Children::NonKeyed(new_nodes)) => {
            patch_non_keyed(rt, inner, old_nodes, new_nodes, parent, end_anchor, force);
        }
        (Children::Keyed(old_nodes), Children::Keyed(new_nodes)) => {
            patch_keyed(rt, inner, old_nodes, new_nodes, parent, end_anchor, force);
        }
        (Children::NonKeyed(old_nodes) | Children::Keyed(old_nodes), new_children) => {
            // Shape changed (array→single/text/none or keyedness flipped):
            // tear down and rebuild.
            for old_node in old_nodes {
                unmount(rt, inner, old_node, parent);
            }
            mount_children(rt, inner, new_children, parent, end_anchor);
        }
    }
}

/// Positional diff for non-keyed arrays.
fn patch_non_keyed(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    old: &[VNode],
    new: &mut [VNode],
    parent: NodeId,
    end_anchor: Option<NodeId>,
    force: bool,
) {
    let common = old.len().min(new.len());
    for i in 0..common {
        patch(rt, inner, &old[i], &mut new[i], parent, force);
    }
    for new_node in &mut new[common..] {
        mount(rt, inner, new_node, parent, end_anchor);
    }
    for old_node in &old[common..] {
        unmount(rt, inner, old_node, parent);
    }
}

/// Keyed-list diff.
///
/// Syncs the longest stable prefix and suffix without moving DOM, then
/// reconciles the middle: entries whose keys vanished unmount, new keys
/// mount in place, and surviving keys are repositioned with the minimal
/// set of moves (nodes on a longest increasing subsequence of old indices
/// stay put).
fn patch_keyed(
    rt: &Runtime,
    inner: &mut RuntimeInner,
    old: &[VNode],
    new: &mut [VNode],
    parent: NodeId,
    end_anchor: Option<NodeId>,
    force: bool,
) {
    let mut a_start = 0;
    let mut b_start = 0;
    let mut a_end = old.len();
    let mut b_end = new.len();

    while a_start < a_end && b_start < b_end {
        if old[a_start].key != new[b_start].key {
            break;
        }
        patch(rt, inner, &old[a_start], &mut new[b_start], parent, force);
        a_start += 1;
        b_start += 1;
    }
    while a_end > a_start && b_end > b_start {
        if old[a_end - 1].key != new[b_end - 1].key {
            break;
        }
        patch(rt, inner, &old[a_end - 1], &mut new[b_end - 1], parent, force);
        a_end -= 1;
        b_end -= 1;
    }

    if a_start == a_end {
        if b_start < b_end {
            let anchor = if b_end < new.len() {
                new[b_end].first_dom()
            } else {
                end_anchor
            };
            for new_node in &mut new[b_start..b_end] {
                mount(rt, inner, new_node, parent, anchor);
            }
        }
        return;
    }
    if b_start == b_end {
        for old_node in &old[a_start..a_end] {
            unmount(rt, inner, old_node, parent);
        }
        return;
    }

    let b_len = b_end - b_start;
    let mut key_index = FxHashMap::default();
    for (i, new_node) in new[b_start..b_end].iter().enumerate() {
        if let Some(key) = &new_node.key {
            let previous = key_index.insert(key.clone(), i);
            debug_assert!(
                previous.is_none(),
                "duplicate key {:?} among keyed siblings",
                key
            );
        }
    }

    // sources[i] = relative old index matched to new middle position i.
    let mut sources = vec![usize::MAX; b_len];
    let mut moved = false;
    let mut last_matched = 0;
    let mut patched = 0;
    for (i, old_node) in old[a_start..a_end].iter().enumerate() {
        let matched = if patched < b_len {
            old_node
                .key
                .as_ref()
                .and_then(|key| key_index.get(key).copied())
        } else {
            None
        };
        match matched {
            Some(bi) => {
                sources[bi] = i;
                if bi < last_matched {
                    moved = true;
                } else {
                    last_matched = bi;
                }
                patch(rt, inner, old_node, &mut new[b_start + bi], parent, force);
                patched += 1;
            }
            None => unmount(rt, inner, old_node, parent),
        }
    }

    let lis = if moved {
        longest_increasing_subsequence(&sources)
    } else {
        Vec::new()
    };
    let mut lis_pos = lis.len();
    let mut anchor = if b_end < new.len() {
        new[b_end].first_dom()
    } else {
        end_anchor
    };
    for i in (0..b_len).rev() {
        let index = b_start + i;
        if sources[i] == usize::MAX {
            mount(rt, inner, &mut new[index], parent, anchor);
        } else if moved {
            if lis_pos == 0 || lis[lis_pos - 1] != i {
                move_dom(inner, &new[index], parent, anchor);
            } else {
                lis_pos -= 1;
            }
        }
        anchor = new[index].first_dom().or(anchor);
    }
}

/// Reposition an already-mounted vnode's DOM before `anchor`.
pub(crate) fn move_dom(
    inner: &mut RuntimeInner,
    vnode: &VNode,
    parent: NodeId,
    anchor: Option<NodeId>,
) {
    match &vnode.kind {
        VNodeKind::Text(_) | VNodeKind::Element(_) => {
            if let Some(id) = vnode.dom {
                inner.dom.insert_before(parent, id, anchor);
            }
        }
        VNodeKind::Fragment(f) => {
            for child in f.children.nodes() {
                move_dom(inner, child, parent, anchor);
            }
            if let Some(end) = f.anchor {
                inner.dom.insert_before(parent, end, anchor);
            }
        }
        VNodeKind::Component(c) => {
            let Some(handle) = &c.instance else { return };
            let instance = handle.borrow();
            if instance.pending_init {
                if let Some(placeholder) = instance.placeholder {
                    inner.dom.insert_before(parent, placeholder, anchor);
                }
            } else if let Some(input) = &instance.last_input {
                move_dom(inner, input, parent, anchor);
            }
        }
    }
}

/// Positions within `sources` forming a longest strictly-increasing
/// subsequence of its values; `usize::MAX` entries (freshly mounted
/// positions) are skipped.
fn longest_increasing_subsequence(sources: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev = vec![usize::MAX; sources.len()];
    for (i, &value) in sources.iter().enumerate() {
        if value == usize::MAX {
            continue;
        }
        match tails.last() {
            None => tails.push(i),
            Some(&last) if sources[last] < value => {
                prev[i] = last;
                tails.push(i);
            }
            Some(_) => {
                let mut lo = 0;
                let mut hi = tails.len() - 1;
                while lo < hi {
                    let mid = (lo + hi) / 2;
                    if sources[tails[mid]] < value {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                if value < sources[tails[lo]] {
                    if lo > 0 {
                        prev[i] = tails[lo - 1];
                    }
                    tails[lo] = i;
                }
            }
        }
    }
    let mut result = vec![0; tails.len()];
    let mut current = tails.last().copied().unwrap_or(usize::MAX);
    for slot in result.iter_mut().rev() {
        *slot = current;
        current = prev.get(current).copied().unwrap_or(usize::MAX);
    }
    result
}
