use std::{collections::HashMap, hash::Hash};

use crate::api::{Account, AccountId, Item, ItemId};

/// Anything that can be placed in a forest: it has an identifier, and maybe
/// references its parent's identifier
pub trait Node {
    type Id: Copy + Eq + Hash;

    fn id(&self) -> Self::Id;
    fn parent_id(&self) -> Option<Self::Id>;
}

impl Node for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }

    fn parent_id(&self) -> Option<ItemId> {
        self.parent_id
    }
}

impl Node for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }

    fn parent_id(&self) -> Option<AccountId> {
        self.created_by
    }
}

/// Position of a node in its forest, in input order
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct NodeIdx(pub usize);

#[derive(Clone, Debug)]
struct Slot<T> {
    payload: T,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
    level: usize,
}

/// Forest reconstructed from a flat collection of nodes.
///
/// Nodes are stored in an arena in input order, and refer to each other by
/// index. Building never fails: a node whose parent cannot be found, or whose
/// attachment would create a cycle, becomes a root.
#[derive(Clone, Debug)]
pub struct Forest<T> {
    slots: Vec<Slot<T>>,
    roots: Vec<NodeIdx>,
}

/// Owned nested rendition of one tree of a forest
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Tree<V> {
    #[serde(flatten)]
    pub value: V,
    pub level: usize,
    pub children: Vec<Tree<V>>,
}

impl<T: Node> Forest<T> {
    /// Links every node to its parent. When several nodes share an
    /// identifier, the first one in input order is the one children get
    /// attached to.
    pub fn build(nodes: Vec<T>) -> Forest<T> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            index.entry(n.id()).or_insert(NodeIdx(i));
        }

        let mut slots = nodes
            .into_iter()
            .map(|payload| Slot {
                payload,
                parent: None,
                children: Vec::new(),
                level: 0,
            })
            .collect::<Vec<_>>();
        let mut roots = Vec::new();
        for i in 0..slots.len() {
            let cur = NodeIdx(i);
            let parent = slots[i]
                .payload
                .parent_id()
                .and_then(|p| index.get(&p).copied())
                .filter(|p| !is_ancestor_or_self(&slots, cur, *p));
            match parent {
                Some(p) => {
                    slots[p.0].children.push(cur);
                    slots[i].parent = Some(p);
                }
                None => roots.push(cur),
            }
        }

        Forest { slots, roots }
    }

}

/// Whether `node` is `of` or one of its ancestors.
///
/// Terminates because the parent links set so far never form a cycle.
fn is_ancestor_or_self<T>(slots: &[Slot<T>], node: NodeIdx, of: NodeIdx) -> bool {
    let mut cur = Some(of);
    while let Some(c) = cur {
        if c == node {
            return true;
        }
        cur = slots[c.0].parent;
    }
    false
}

impl<T> Forest<T> {
    /// Stamps every reachable node with its depth, roots being at level 0.
    ///
    /// A node is never descended into twice: should the structure contain a
    /// back-edge, the walk stops there instead of looping.
    pub fn assign_levels(&mut self) {
        let mut visited = vec![false; self.slots.len()];
        let mut stack = self
            .roots
            .iter()
            .rev()
            .map(|r| (*r, 0))
            .collect::<Vec<_>>();
        while let Some((idx, level)) = stack.pop() {
            if std::mem::replace(&mut visited[idx.0], true) {
                continue;
            }
            let slot = &mut self.slots[idx.0];
            slot.level = level;
            stack.extend(slot.children.iter().rev().map(|c| (*c, level + 1)));
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    pub fn get(&self, idx: NodeIdx) -> &T {
        &self.slots[idx.0].payload
    }

    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.slots[idx.0].parent
    }

    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.slots[idx.0].children
    }

    pub fn level(&self, idx: NodeIdx) -> usize {
        self.slots[idx.0].level
    }

    /// All payloads, in input order
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &T)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (NodeIdx(i), &s.payload))
    }

    pub fn payloads_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().map(|s| &mut s.payload)
    }

    pub fn into_payloads(self) -> Vec<T> {
        self.slots.into_iter().map(|s| s.payload).collect()
    }

    /// Nodes in display order: each node followed by its subtree, siblings in
    /// discovery order
    pub fn depth_first(&self) -> Vec<NodeIdx> {
        let mut visited = vec![false; self.slots.len()];
        let mut order = Vec::with_capacity(self.slots.len());
        let mut stack = self.roots.iter().rev().copied().collect::<Vec<_>>();
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut visited[idx.0], true) {
                continue;
            }
            order.push(idx);
            stack.extend(self.slots[idx.0].children.iter().rev().copied());
        }
        order
    }

    /// Converts the forest into nested trees, mapping each payload through `f`
    pub fn to_trees<V>(&self, mut f: impl FnMut(&T) -> V) -> Vec<Tree<V>> {
        let mut built = (0..self.slots.len()).map(|_| None).collect::<Vec<_>>();
        // descendants come after their ancestor in depth-first order, so
        // walking it backwards always finds the children already built
        for idx in self.depth_first().into_iter().rev() {
            let slot = &self.slots[idx.0];
            let children = slot
                .children
                .iter()
                .filter_map(|c| built[c.0].take())
                .collect();
            built[idx.0] = Some(Tree {
                value: f(&slot.payload),
                level: slot.level,
                children,
            });
        }
        self.roots
            .iter()
            .filter_map(|r| built[r.0].take())
            .collect()
    }
}
