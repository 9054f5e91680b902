use std::collections::VecDeque;

use super::window_info::{ToolWindowAnchor, WindowInfo};
use crate::common::collections::HashMap;

/// Most recently activated windows, front first.
///
/// The persistent list survives plain hides so focus can return to a window
/// that is no longer visible. Only hard removals (unregistration) drop an
/// entry from it.
#[derive(Clone, Debug)]
pub struct ActiveStack<K> {
    stack: VecDeque<K>,
    persistent: VecDeque<K>,
}

impl<K> Default for ActiveStack<K> {
    fn default() -> Self { Self { stack: VecDeque::new(), persistent: VecDeque::new() } }
}

impl<K: Copy + PartialEq> ActiveStack<K> {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, key: K) {
        self.stack.retain(|k| *k != key);
        self.stack.push_front(key);
        self.persistent.retain(|k| *k != key);
        self.persistent.push_front(key);
    }

    pub fn remove(&mut self, key: K, persistent_too: bool) {
        self.stack.retain(|k| *k != key);
        if persistent_too {
            self.persistent.retain(|k| *k != key);
        }
    }

    pub fn peek(&self, index: usize) -> Option<K> { self.stack.get(index).copied() }

    pub fn peek_persistent(&self, index: usize) -> Option<K> { self.persistent.get(index).copied() }

    pub fn contains(&self, key: K) -> bool { self.stack.contains(&key) }

    pub fn size(&self) -> usize { self.stack.len() }

    pub fn persistent_size(&self) -> usize { self.persistent.len() }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ { self.stack.iter().copied() }

    pub fn iter_persistent(&self) -> impl Iterator<Item = K> + '_ { self.persistent.iter().copied() }

    /// Forgets the transient history, e.g. once an editor takes focus.
    pub fn clear(&mut self) { self.stack.clear(); }
}

/// Snapshots of docked windows evicted from their slot, newest last.
#[derive(Clone, Debug, Default)]
pub struct SideStack {
    stacks: HashMap<ToolWindowAnchor, Vec<WindowInfo>>,
}

impl SideStack {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, info: WindowInfo) {
        self.stacks.entry(info.anchor).or_default().push(info);
    }

    /// Pops the newest snapshot; callers loop because snapshots may be stale.
    pub fn pop(&mut self, anchor: ToolWindowAnchor) -> Option<WindowInfo> {
        self.stacks.get_mut(&anchor)?.pop()
    }

    pub fn is_empty(&self, anchor: ToolWindowAnchor) -> bool {
        self.stacks.get(&anchor).is_none_or(Vec::is_empty)
    }

    /// Drops every snapshot of `id`, on all anchors.
    pub fn remove(&mut self, id: &str) {
        for stack in self.stacks.values_mut() {
            stack.retain(|info| info.id != id);
        }
    }

    pub fn clear_anchor(&mut self, anchor: ToolWindowAnchor) { self.stacks.remove(&anchor); }

    pub fn clear(&mut self) { self.stacks.clear(); }

    pub fn len(&self, anchor: ToolWindowAnchor) -> usize { self.stacks.get(&anchor).map_or(0, Vec::len) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_moves_to_front_in_both_lists() {
        let mut stack = ActiveStack::new();
        stack.push(1);
        stack.push(2);
        stack.push(1);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(stack.iter_persistent().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn soft_removal_keeps_persistent_history() {
        let mut stack = ActiveStack::new();
        stack.push(1);
        stack.push(2);
        stack.remove(2, false);
        assert_eq!(stack.peek(0), Some(1));
        assert_eq!(stack.peek_persistent(0), Some(2));

        stack.remove(2, true);
        assert_eq!(stack.persistent_size(), 1);
        stack.clear();
        assert_eq!(stack.size(), 0);
        assert_eq!(stack.peek_persistent(0), Some(1));
    }

    #[test]
    fn side_stack_is_per_anchor_lifo() {
        let mut side = SideStack::new();
        side.push(WindowInfo::new("Project", ToolWindowAnchor::Left));
        side.push(WindowInfo::new("Commit", ToolWindowAnchor::Left));
        side.push(WindowInfo::new("Run", ToolWindowAnchor::Bottom));

        assert_eq!(side.len(ToolWindowAnchor::Left), 2);
        side.remove("Run");
        assert!(side.is_empty(ToolWindowAnchor::Bottom));
        assert_eq!(side.pop(ToolWindowAnchor::Left).map(|i| i.id), Some("Commit".to_string()));
        assert_eq!(side.pop(ToolWindowAnchor::Left).map(|i| i.id), Some("Project".to_string()));
        assert_eq!(side.pop(ToolWindowAnchor::Left), None);
        assert!(side.is_empty(ToolWindowAnchor::Top));
    }
}
