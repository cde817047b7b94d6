//! Single-threaded cooperative task queue
//!
//! Completion callbacks are never run inline with the code that triggers
//! them. They are queued here and run when the owner of the frame loop calls
//! [`TaskQueue::run_pending`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::scene::context::Task;

/// Cloneable handle to a FIFO of deferred tasks
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the next scheduling opportunity
    pub fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every task queued before this call
    ///
    /// Tasks scheduled while running wait for the next call. The queue is
    /// not borrowed while a task runs, so tasks may schedule more work.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("pending", &self.len()).finish()
    }
}
