use std::fmt;

use dlv_list::{Iter, VecList};

/// Boxed one-shot action owning its captured context.
pub type Action = Box<dyn FnOnce() + 'static>;

/// Task represents one scheduled action together with its position in time.
///
/// # Fields
///
/// - `due`: Absolute virtual target time, in the unit shared by every level
///   of the wheel
/// - `action`: Invoked exactly once when the task expires; dropped unfired
///   if the wheel is cleared or torn down first
///
/// A task lives in exactly one slot list at a time. Ownership moves to the
/// wheel on submission and the wheel consumes the task when it fires.
pub struct Task {
    pub due: u64,
    action: Action,
}

impl Task {
    #[inline]
    pub fn new(due: u64, action: Action) -> Self {
        Self { due, action }
    }

    /// Consumes the task and runs its action.
    #[inline]
    pub fn fire(self) {
        (self.action)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("due", &self.due).finish_non_exhaustive()
    }
}

/// One wheel slot: a doubly-linked chain of tasks ordered by due time.
///
/// Backed by `dlv_list::VecList` so positions are stable indices rather than
/// raw node pointers. Tasks with equal due time keep their insertion order,
/// so the first task submitted is the first to fire.
#[derive(Debug, Default)]
pub struct SlotList {
    pub list: VecList<Task>,
}

impl SlotList {
    /// Creates a slot with room for `capacity` tasks before reallocating.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: VecList::with_capacity(capacity.max(1)),
        }
    }

    /// Splices a task into the position preserving ascending due order.
    ///
    /// The new task lands after any occupants with an equal due time. The
    /// scan is linear; slot occupancy stays small because tasks spread
    /// across a level's slots.
    pub fn insert_ordered(&mut self, task: Task) {
        let next_later = self
            .list
            .indices()
            .find(|&index| self.list.get(index).is_some_and(|t| t.due > task.due));
        match next_later {
            Some(index) => {
                self.list.insert_before(index, task);
            }
            None => {
                self.list.push_back(task);
            }
        }
    }

    /// Detaches and returns the earliest task in the slot.
    #[inline]
    pub fn pop_front(&mut self) -> Option<Task> {
        self.list.pop_front()
    }

    /// Detaches the entire chain in one step, leaving the slot empty.
    ///
    /// Used by the cascade: a coarser level's slot is migrated as one batch.
    pub fn take_all(&mut self) -> VecList<Task> {
        std::mem::replace(&mut self.list, VecList::new())
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, Task> {
        self.list.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Drops every pending task, releasing each action's captured state.
    pub fn clear(&mut self) {
        self.list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(due: u64) -> Task {
        Task::new(due, Box::new(|| {}))
    }

    #[test]
    fn test_insert_ordered_sorts_by_due() {
        let mut slot = SlotList::new(8);
        for due in [30, 10, 20, 5] {
            slot.insert_ordered(noop(due));
        }

        let dues: Vec<u64> = slot.iter().map(|t| t.due).collect();
        assert_eq!(dues, vec![5, 10, 20, 30]);
    }

    #[test]
    fn test_equal_due_keeps_insertion_order() {
        let mut slot = SlotList::new(8);
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        for id in 0..4u64 {
            let order = std::rc::Rc::clone(&order);
            slot.insert_ordered(Task::new(7, Box::new(move || order.borrow_mut().push(id))));
        }

        while let Some(task) = slot.pop_front() {
            task.fire();
        }
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_equal_due_lands_after_earlier_and_before_later() {
        let mut slot = SlotList::new(8);
        slot.insert_ordered(noop(10));
        slot.insert_ordered(noop(20));
        slot.insert_ordered(noop(10));

        let dues: Vec<u64> = slot.iter().map(|t| t.due).collect();
        assert_eq!(dues, vec![10, 10, 20]);
    }

    #[test]
    fn test_take_all_empties_slot() {
        let mut slot = SlotList::new(4);
        for due in [1, 2, 3] {
            slot.insert_ordered(noop(due));
        }

        let batch = slot.take_all();
        assert_eq!(batch.len(), 3);
        assert!(slot.is_empty());

        let dues: Vec<u64> = batch.into_iter().map(|t| t.due).collect();
        assert_eq!(dues, vec![1, 2, 3]);
    }

    #[test]
    fn test_clear_releases_tasks() {
        let mut slot = SlotList::new(4);
        slot.insert_ordered(noop(1));
        slot.insert_ordered(noop(2));
        slot.clear();
        assert_eq!(slot.len(), 0);
    }
}
