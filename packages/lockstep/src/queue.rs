//! Per-phase staging area for tasks, one slot per worker.

use std::mem;
use std::num::NonZero;

use crate::Task;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,

    /// Submitted into the open phase, not yet released.
    Pending(Task),

    /// Released to the worker with the same index as the slot.
    Assigned(Task),
}

/// Bounded task queue keyed by slot index.
///
/// Slot `i` is executed by worker `i`. Tasks fill slots in submission order, so when fewer tasks
/// than workers are submitted, the workers with the highest indexes stay idle for that phase.
#[derive(Debug)]
pub(crate) struct TaskQueue {
    slots: Box<[Slot]>,

    /// Number of occupied slots. Occupied slots are always `slots[..len]`.
    len: usize,
}

impl TaskQueue {
    pub(crate) fn new(capacity: NonZero<usize>) -> Self {
        Self {
            slots: (0..capacity.get()).map(|_| Slot::Empty).collect(),
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of tasks that have been submitted but not yet released.
    pub(crate) fn pending(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Pending(_)))
            .count()
    }

    /// Places the task into the next free slot. Gives the task back if every slot is occupied.
    pub(crate) fn push(&mut self, task: Task) -> Result<(), Task> {
        let Some(slot) = self.slots.get_mut(self.len) else {
            return Err(task);
        };

        debug_assert!(matches!(slot, Slot::Empty));

        *slot = Slot::Pending(task);
        self.len = self.len.wrapping_add(1);
        Ok(())
    }

    /// Transitions every pending task to assigned. Returns the number of assigned tasks.
    pub(crate) fn assign(&mut self) -> usize {
        let mut assigned = 0_usize;

        for slot in &mut self.slots {
            if let Slot::Pending(task) = mem::take(slot) {
                *slot = Slot::Assigned(task);
                assigned = assigned.wrapping_add(1);
            }
        }

        assigned
    }

    /// Whether the slot of the given worker holds a task assigned to it.
    #[cfg(test)]
    pub(crate) fn is_assigned(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Assigned(_)))
    }

    /// Removes the task assigned to the given worker, if any. Pending tasks are never handed out.
    pub(crate) fn take_assigned(&mut self, index: usize) -> Option<Task> {
        let slot = self.slots.get_mut(index)?;

        match mem::take(slot) {
            Slot::Assigned(task) => Some(task),
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Empties every slot, dropping any task that is still present.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }

        self.len = 0;
    }
}
