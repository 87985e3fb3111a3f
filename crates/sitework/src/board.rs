//! Application-shell state container for a task collection.
//!
//! [`TaskBoard`] owns the in-memory task list that the dependency functions
//! read from. All writes go through `&mut self`, so a board has at most one
//! mutation in flight. Callers that share a board across async tasks wrap it
//! in `Arc<tokio::sync::Mutex<TaskBoard>>`.
//!
//! Every change is published to subscribers as a [`BoardEvent`]. The
//! dependency functions themselves never publish anything.

use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use crate::events::{EventBus, Subscription};
use crate::graph::{self, DependencyIndex, Readiness, TaskRelations};

/// A change applied to a [`TaskBoard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// `task` now depends on `dependency`.
    DependencyAdded {
        /// The dependent task
        task: TaskId,
        /// The new prerequisite
        dependency: TaskId,
    },

    /// `task` no longer depends on `dependency`.
    DependencyRemoved {
        /// The dependent task
        task: TaskId,
        /// The removed prerequisite
        dependency: TaskId,
    },

    /// A task's status changed.
    StatusChanged {
        /// The task
        task: TaskId,
        /// Previous status
        from: TaskStatus,
        /// New status
        to: TaskStatus,
    },

    /// A task that was waiting on prerequisites can now start.
    Unblocked {
        /// The task
        task: TaskId,
    },

    /// The whole collection was replaced, e.g. after a refetch.
    TasksReplaced {
        /// Number of tasks in the new collection
        count: usize,
    },
}

/// Owner of the current task collection.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    events: EventBus<BoardEvent>,
    reject_cycles: bool,
}

impl TaskBoard {
    /// Create a board over a task collection.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            events: EventBus::new(),
            reject_cycles: false,
        }
    }

    /// Refuse dependency edges that would close a cycle.
    #[must_use]
    pub fn with_cycle_rejection(mut self, reject: bool) -> Self {
        self.reject_cycles = reject;
        self
    }

    /// The current collection.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn require(&self, id: TaskId) -> Result<&Task> {
        self.get(id).ok_or(Error::TaskNotFound(id))
    }

    /// Direct prerequisites and dependents of a task.
    pub fn relations(&self, id: TaskId) -> TaskRelations<'_> {
        graph::get_task_dependencies(id, &self.tasks)
    }

    /// Whether a task's direct prerequisites are all completed.
    pub fn can_start(&self, id: TaskId) -> bool {
        graph::can_start_task(id, &self.tasks)
    }

    /// Readiness report for a task.
    pub fn readiness(&self, id: TaskId) -> Readiness {
        graph::readiness(id, &self.tasks)
    }

    /// Build a graph index over the current collection.
    pub fn index(&self) -> DependencyIndex {
        DependencyIndex::from_tasks(&self.tasks)
    }

    /// Register a listener for board changes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&BoardEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Make `task` depend on `dependency`.
    ///
    /// Returns `Ok(false)` without publishing if the edge already exists.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `task` is not on the board
    /// - `Error::SelfDependency` if `task == dependency`
    /// - `Error::CircularDependency` if cycle rejection is enabled and the
    ///   edge would close a cycle
    pub fn add_dependency(&mut self, task: TaskId, dependency: TaskId) -> Result<bool> {
        self.require(task)?;

        if self.reject_cycles
            && task != dependency
            && self.index().would_create_cycle(task, dependency)
        {
            return Err(Error::CircularDependency {
                from: task,
                to: dependency,
            });
        }

        let changed = graph::insert_dependency(&mut self.tasks, task, dependency)?;
        if changed {
            tracing::debug!(task = %task, dependency = %dependency, "Added dependency");
            self.events
                .publish(&BoardEvent::DependencyAdded { task, dependency });
        }
        Ok(changed)
    }

    /// Stop `task` depending on `dependency`.
    ///
    /// Returns `Ok(false)` without publishing if there was no such edge.
    /// Removing an edge can unblock `task`, which is published as well.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if `task` is not on the board.
    pub fn remove_dependency(&mut self, task: TaskId, dependency: TaskId) -> Result<bool> {
        self.require(task)?;

        let was_startable = self.readiness(task).is_startable();
        let changed = graph::strip_dependency(&mut self.tasks, task, dependency);
        if changed {
            tracing::debug!(task = %task, dependency = %dependency, "Removed dependency");
            self.events
                .publish(&BoardEvent::DependencyRemoved { task, dependency });
            if !was_startable && self.readiness(task).is_startable() {
                self.events.publish(&BoardEvent::Unblocked { task });
            }
        }
        Ok(changed)
    }

    /// Mirror a status change applied by the task backend.
    ///
    /// Publishes `StatusChanged`, followed by `Unblocked` for every dependent
    /// that could not start before and can now. Setting the current status
    /// again publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if `task` is not on the board.
    pub fn set_status(&mut self, task: TaskId, status: TaskStatus) -> Result<()> {
        let previous = self.require(task)?.status;
        if previous == status {
            return Ok(());
        }
        if !previous.can_transition_to(status) {
            tracing::warn!(task = %task, from = %previous, to = %status, "Unexpected status transition");
        }

        let dependents: Vec<TaskId> = self.relations(task).dependents.iter().map(|t| t.id).collect();
        let waiting: Vec<TaskId> = dependents
            .into_iter()
            .filter(|&id| !self.readiness(id).is_startable())
            .collect();

        if let Some(entry) = self.tasks.iter_mut().find(|t| t.id == task) {
            entry.status = status;
        }

        self.events.publish(&BoardEvent::StatusChanged {
            task,
            from: previous,
            to: status,
        });
        for id in waiting {
            if self.readiness(id).is_startable() {
                self.events.publish(&BoardEvent::Unblocked { task: id });
            }
        }
        Ok(())
    }

    /// Replace the collection wholesale.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        let count = tasks.len();
        self.tasks = tasks;
        self.events.publish(&BoardEvent::TasksReplaced { count });
    }
}
