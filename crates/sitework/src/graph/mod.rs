//! Task dependency resolution and readiness evaluation.
//!
//! The functions in this module work directly on the flat task collection the
//! backend serves. They hold no state and rescan the collection on every
//! call, so they always reflect the current statuses and dependency lists.
//!
//! # Edge Direction Convention
//!
//! A task's `dependencies` list points from the **dependent** to its
//! **prerequisites**: if task 3 lists `[2]`, task 3 waits on task 2 and task 3
//! is one of task 2's dependents.
//!
//! # Stale References
//!
//! A dependency list may name a task that is no longer in the collection
//! (deleted, or filtered out of the current view). Such ids are skipped when
//! resolving and never block readiness.
//!
//! # Cycles
//!
//! Cycles are not rejected. Direct readiness only inspects one hop, so a
//! cycle cannot make it loop. Transitive queries live on
//! [`DependencyIndex`] and track visited nodes.

pub mod index;

pub use index::{DependencyIndex, MAX_TRAVERSAL_DEPTH, TreeEntry};

use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Direct prerequisites and dependents of a task.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskRelations<'a> {
    /// Tasks this task depends on, in listed order
    pub dependencies: Vec<&'a Task>,

    /// Tasks that depend on this task, in collection order
    pub dependents: Vec<&'a Task>,
}

impl TaskRelations<'_> {
    /// Whether the task has neither prerequisites nor dependents.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dependents.is_empty()
    }
}

/// Whether a task may be started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum Readiness {
    /// Every resolved prerequisite is completed.
    Ready,

    /// Some prerequisites are not completed yet.
    Waiting {
        /// Unfinished prerequisites, in listed order
        on: Vec<TaskId>,
    },

    /// Prerequisites are unfinished but the task is flagged to start anyway.
    Override {
        /// Unfinished prerequisites, in listed order
        waiting_on: Vec<TaskId>,
    },
}

impl Readiness {
    /// Whether work may begin.
    pub fn is_startable(&self) -> bool {
        !matches!(self, Self::Waiting { .. })
    }

    /// Unfinished prerequisites, empty when `Ready`.
    pub fn unfinished(&self) -> &[TaskId] {
        match self {
            Self::Ready => &[],
            Self::Waiting { on } => on,
            Self::Override { waiting_on } => waiting_on,
        }
    }
}

/// How far readiness looks along the dependency chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessMode {
    /// Only immediate prerequisites must be completed
    #[default]
    Direct,

    /// Every reachable prerequisite must be completed
    Transitive,
}

fn find_task(all_tasks: &[Task], id: TaskId) -> Option<&Task> {
    all_tasks.iter().find(|t| t.id == id)
}

/// Resolve the direct prerequisites and dependents of a task.
///
/// Returns empty relations when `task_id` is not in the collection. Dependency
/// ids with no matching task are left out.
///
/// # Example
///
/// ```
/// use sitework::domain::{Task, TaskId};
/// use sitework::graph::get_task_dependencies;
///
/// let tasks = vec![
///     Task::new(1, "Excavation"),
///     Task::new(2, "Footings").with_dependencies([1, 99]),
/// ];
///
/// let relations = get_task_dependencies(TaskId(2), &tasks);
/// assert_eq!(relations.dependencies.len(), 1);
/// assert_eq!(relations.dependencies[0].title, "Excavation");
/// ```
pub fn get_task_dependencies(task_id: TaskId, all_tasks: &[Task]) -> TaskRelations<'_> {
    let Some(task) = find_task(all_tasks, task_id) else {
        return TaskRelations::default();
    };

    let dependencies = task
        .dependencies
        .iter()
        .filter_map(|&id| find_task(all_tasks, id))
        .collect();

    let dependents = all_tasks.iter().filter(|t| t.depends_on(task_id)).collect();

    TaskRelations {
        dependencies,
        dependents,
    }
}

/// Whether every resolved prerequisite of a task is completed.
///
/// Unknown tasks and unresolvable prerequisites do not block. The
/// `can_start_without_dependency` flag is not consulted here; see
/// [`readiness`] for the report that honours it.
pub fn can_start_task(task_id: TaskId, all_tasks: &[Task]) -> bool {
    get_task_dependencies(task_id, all_tasks)
        .dependencies
        .iter()
        .all(|dep| dep.is_completed())
}

/// Evaluate readiness of a task, reporting what it waits on.
pub fn readiness(task_id: TaskId, all_tasks: &[Task]) -> Readiness {
    let Some(task) = find_task(all_tasks, task_id) else {
        return Readiness::Ready;
    };

    let unfinished: Vec<TaskId> = get_task_dependencies(task_id, all_tasks)
        .dependencies
        .iter()
        .filter(|dep| !dep.is_completed())
        .map(|dep| dep.id)
        .collect();

    if unfinished.is_empty() {
        Readiness::Ready
    } else if task.may_skip_dependencies() {
        Readiness::Override {
            waiting_on: unfinished,
        }
    } else {
        Readiness::Waiting { on: unfinished }
    }
}

/// Whether a task should display as blocked.
///
/// Only not-started tasks are shown as blocked; a task already in progress or
/// on hold keeps its own status even if a prerequisite was reopened.
pub fn is_blocked(task_id: TaskId, all_tasks: &[Task]) -> bool {
    find_task(all_tasks, task_id).is_some_and(|task| {
        task.status == TaskStatus::NotStarted && !readiness(task_id, all_tasks).is_startable()
    })
}

/// Add `dependency_id` to the dependency list of `task_id`, in place.
///
/// Returns `Ok(true)` if the list changed.
pub(crate) fn insert_dependency(
    tasks: &mut [Task],
    task_id: TaskId,
    dependency_id: TaskId,
) -> Result<bool> {
    if task_id == dependency_id {
        return Err(Error::SelfDependency(task_id));
    }

    match tasks.iter_mut().find(|t| t.id == task_id) {
        Some(task) if !task.depends_on(dependency_id) => {
            task.dependencies.push(dependency_id);
            Ok(true)
        }
        Some(_) => {
            tracing::debug!(task = %task_id, dependency = %dependency_id, "Dependency already present");
            Ok(false)
        }
        None => {
            tracing::debug!(task = %task_id, "Task not in collection, dependency not added");
            Ok(false)
        }
    }
}

/// Remove every occurrence of `dependency_id` from the list of `task_id`, in place.
///
/// Returns `true` if the list changed.
pub(crate) fn strip_dependency(tasks: &mut [Task], task_id: TaskId, dependency_id: TaskId) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
        return false;
    };

    let before = task.dependencies.len();
    task.dependencies.retain(|&id| id != dependency_id);
    task.dependencies.len() != before
}

/// Return a copy of the collection in which `task_id` depends on `dependency_id`.
///
/// Adding an edge that already exists leaves the list unchanged. An unknown
/// `task_id` yields an unchanged copy. `dependency_id` does not need to exist,
/// and cycles are allowed.
///
/// # Errors
///
/// Returns `Error::SelfDependency` if `task_id == dependency_id`.
///
/// # Example
///
/// ```
/// use sitework::domain::{Task, TaskId};
/// use sitework::graph::add_dependency;
///
/// let tasks = vec![Task::new(1, "Framing"), Task::new(2, "Drywall")];
/// let updated = add_dependency(TaskId(2), TaskId(1), &tasks)?;
///
/// assert!(updated[1].depends_on(TaskId(1)));
/// assert!(tasks[1].dependencies.is_empty());
/// # Ok::<(), sitework::error::Error>(())
/// ```
pub fn add_dependency(
    task_id: TaskId,
    dependency_id: TaskId,
    all_tasks: &[Task],
) -> Result<Vec<Task>> {
    let mut updated = all_tasks.to_vec();
    insert_dependency(&mut updated, task_id, dependency_id)?;
    Ok(updated)
}

/// Return a copy of the collection without the edge `task_id -> dependency_id`.
pub fn remove_dependency(task_id: TaskId, dependency_id: TaskId, all_tasks: &[Task]) -> Vec<Task> {
    let mut updated = all_tasks.to_vec();
    strip_dependency(&mut updated, task_id, dependency_id);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Completed foundation, framing waits on it, roofing waits on framing.
    #[fixture]
    fn chain() -> Vec<Task> {
        vec![
            Task::new(1, "Foundation").with_status(TaskStatus::Completed),
            Task::new(2, "Framing").with_dependencies([1]),
            Task::new(3, "Roofing").with_dependencies([2]),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id.get()).collect()
    }

    #[rstest]
    fn chain_readiness(chain: Vec<Task>) {
        assert!(can_start_task(TaskId(2), &chain));
        assert!(!can_start_task(TaskId(3), &chain));
        assert_eq!(
            ids(&get_task_dependencies(TaskId(2), &chain).dependents),
            vec![3]
        );
    }

    #[rstest]
    fn unknown_task_has_no_relations(chain: Vec<Task>) {
        let relations = get_task_dependencies(TaskId(404), &chain);
        assert!(relations.is_empty());
        assert!(can_start_task(TaskId(404), &chain));
        assert_eq!(readiness(TaskId(404), &chain), Readiness::Ready);
        assert!(!is_blocked(TaskId(404), &chain));
    }

    #[test]
    fn stale_dependency_is_skipped_and_does_not_block() {
        let tasks = vec![Task::new(5, "Paint").with_dependencies([99])];

        assert!(get_task_dependencies(TaskId(5), &tasks).dependencies.is_empty());
        assert!(can_start_task(TaskId(5), &tasks));
    }

    #[test]
    fn dependencies_keep_listed_order() {
        let tasks = vec![
            Task::new(1, "A"),
            Task::new(2, "B"),
            Task::new(3, "C"),
            Task::new(4, "D").with_dependencies([3, 42, 1, 2]),
        ];

        assert_eq!(
            ids(&get_task_dependencies(TaskId(4), &tasks).dependencies),
            vec![3, 1, 2]
        );
    }

    #[test]
    fn dependents_follow_collection_order() {
        let tasks = vec![
            Task::new(9, "Late").with_dependencies([1]),
            Task::new(1, "Base"),
            Task::new(4, "Early").with_dependencies([1]),
            Task::new(2, "Unrelated"),
        ];

        assert_eq!(
            ids(&get_task_dependencies(TaskId(1), &tasks).dependents),
            vec![9, 4]
        );
    }

    #[rstest]
    #[case(TaskStatus::NotStarted, false)]
    #[case(TaskStatus::InProgress, false)]
    #[case(TaskStatus::OnHold, false)]
    #[case(TaskStatus::Completed, true)]
    fn only_completed_prerequisites_unblock(#[case] status: TaskStatus, #[case] startable: bool) {
        let tasks = vec![
            Task::new(1, "Prereq").with_status(status),
            Task::new(2, "Next").with_dependencies([1]),
        ];
        assert_eq!(can_start_task(TaskId(2), &tasks), startable);
    }

    #[test]
    fn two_task_cycle_is_evaluated_one_hop() {
        let tasks = vec![
            Task::new(1, "A").with_dependencies([2]),
            Task::new(2, "B")
                .with_dependencies([1])
                .with_status(TaskStatus::Completed),
        ];

        assert!(can_start_task(TaskId(1), &tasks));
        assert!(!can_start_task(TaskId(2), &tasks));
    }

    #[rstest]
    fn readiness_lists_unfinished_in_order(chain: Vec<Task>) {
        let mut tasks = chain;
        tasks.push(Task::new(4, "Inspection").with_dependencies([3, 1, 2]));

        assert_eq!(
            readiness(TaskId(4), &tasks),
            Readiness::Waiting {
                on: vec![TaskId(3), TaskId(2)]
            }
        );
        assert_eq!(readiness(TaskId(2), &tasks), Readiness::Ready);
    }

    #[rstest]
    fn override_flag_only_affects_readiness(chain: Vec<Task>) {
        let mut tasks = chain;
        tasks[2].can_start_without_dependency = Some(true);

        let report = readiness(TaskId(3), &tasks);
        assert_eq!(
            report,
            Readiness::Override {
                waiting_on: vec![TaskId(2)]
            }
        );
        assert!(report.is_startable());
        assert!(!can_start_task(TaskId(3), &tasks));
        assert!(!is_blocked(TaskId(3), &tasks));
    }

    #[rstest]
    #[case(TaskStatus::NotStarted, true)]
    #[case(TaskStatus::InProgress, false)]
    #[case(TaskStatus::OnHold, false)]
    fn blocked_indicator_only_for_not_started(
        chain: Vec<Task>,
        #[case] status: TaskStatus,
        #[case] blocked: bool,
    ) {
        let mut tasks = chain;
        tasks[2].status = status;
        assert_eq!(is_blocked(TaskId(3), &tasks), blocked);
    }

    #[rstest]
    fn add_dependency_is_idempotent(chain: Vec<Task>) {
        let once = add_dependency(TaskId(3), TaskId(1), &chain).unwrap();
        let twice = add_dependency(TaskId(3), TaskId(1), &once).unwrap();

        assert_eq!(once[2].dependencies, vec![TaskId(2), TaskId(1)]);
        assert_eq!(twice[2].dependencies, once[2].dependencies);
    }

    #[rstest]
    fn add_dependency_leaves_input_untouched(chain: Vec<Task>) {
        let before = chain.clone();
        let updated = add_dependency(TaskId(1), TaskId(3), &chain).unwrap();

        assert_eq!(chain, before);
        assert_eq!(updated[0].dependencies, vec![TaskId(3)]);
    }

    #[rstest]
    fn self_dependency_is_rejected(chain: Vec<Task>) {
        let result = add_dependency(TaskId(2), TaskId(2), &chain);
        assert!(matches!(result, Err(Error::SelfDependency(TaskId(2)))));
    }

    #[rstest]
    fn add_dependency_for_unknown_task_changes_nothing(chain: Vec<Task>) {
        let updated = add_dependency(TaskId(77), TaskId(1), &chain).unwrap();
        assert_eq!(updated, chain);
    }

    #[rstest]
    fn add_dependency_accepts_missing_target(chain: Vec<Task>) {
        let updated = add_dependency(TaskId(1), TaskId(500), &chain).unwrap();
        assert_eq!(updated[0].dependencies, vec![TaskId(500)]);
        assert!(can_start_task(TaskId(1), &updated));
    }

    #[test]
    fn remove_dependency_drops_every_occurrence() {
        let tasks = vec![
            Task::new(1, "A"),
            Task::new(2, "B").with_dependencies([1, 1, 3]),
        ];

        let updated = remove_dependency(TaskId(2), TaskId(1), &tasks);
        assert_eq!(updated[1].dependencies, vec![TaskId(3)]);

        let again = remove_dependency(TaskId(2), TaskId(1), &updated);
        assert_eq!(again, updated);
    }
}
