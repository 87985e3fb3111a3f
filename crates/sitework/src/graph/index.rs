//! Dependency graph snapshot using petgraph.
//!
//! [`DependencyIndex`] is built once from a task collection and answers bulk
//! queries without rescanning the collection per task:
//! - Reverse edges (dependents) via incoming edges
//! - Dependency tree traversal (BFS)
//! - Cycle detection
//! - Transitive readiness
//! - Ready and blocked task listings
//!
//! The index is immutable. It reflects the collection it was built from and
//! must be rebuilt after the collection changes.
//!
//! # Edge Direction
//!
//! Edges point from **dependent -> dependency**, matching each task's
//! `dependencies` list. Stale references (ids with no task) produce no edge.

use super::ReadinessMode;
use crate::domain::{Task, TaskId, TaskStatus};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Maximum depth for transitive traversals.
///
/// Prerequisites further than this from the starting task are not inspected.
pub const MAX_TRAVERSAL_DEPTH: usize = 50;

/// Per-node data kept in the graph.
#[derive(Debug, Clone, Copy)]
struct TaskNode {
    id: TaskId,
    status: TaskStatus,
    may_skip: bool,
}

/// One entry of a transitive dependency tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// The prerequisite task
    pub id: TaskId,

    /// The task that lists `id` as a dependency
    pub parent: TaskId,

    /// Distance from the root (direct prerequisites are depth 1)
    pub depth: usize,
}

/// Immutable petgraph view of a task collection.
#[derive(Debug, Clone)]
pub struct DependencyIndex {
    /// Nodes are added in collection order, so node index order is
    /// collection order.
    graph: DiGraph<TaskNode, ()>,

    /// Mapping from TaskId to graph NodeIndex. On duplicate ids the first
    /// task in the collection wins.
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyIndex {
    /// Build an index from a task collection.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut node_map = HashMap::with_capacity(tasks.len());

        for task in tasks {
            node_map.entry(task.id).or_insert_with(|| {
                graph.add_node(TaskNode {
                    id: task.id,
                    status: task.status,
                    may_skip: task.may_skip_dependencies(),
                })
            });
        }

        let mut stale = 0usize;
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in tasks {
            if !seen.insert(task.id) {
                continue;
            }
            let from = node_map[&task.id];
            for dep in &task.dependencies {
                match node_map.get(dep) {
                    // update_edge keeps a single edge for repeated listings
                    Some(&to) => {
                        graph.update_edge(from, to, ());
                    }
                    None => stale += 1,
                }
            }
        }

        tracing::debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            stale,
            "Built dependency index"
        );

        Self { graph, node_map }
    }

    /// Number of distinct tasks in the index.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the index holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether a task with this id was in the collection.
    pub fn contains(&self, id: TaskId) -> bool {
        self.node_map.contains_key(&id)
    }

    /// Neighbours of a node in collection order.
    fn neighbors_sorted(&self, node: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(node, dir).collect();
        out.sort_unstable();
        out
    }

    fn ids(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<TaskId> {
        nodes.into_iter().map(|n| self.graph[n].id).collect()
    }

    /// Resolved prerequisites of a task, in collection order.
    pub fn dependencies(&self, id: TaskId) -> Vec<TaskId> {
        self.node_map
            .get(&id)
            .map(|&n| self.ids(self.neighbors_sorted(n, Direction::Outgoing)))
            .unwrap_or_default()
    }

    /// Tasks that depend on `id`, in collection order.
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.node_map
            .get(&id)
            .map(|&n| self.ids(self.neighbors_sorted(n, Direction::Incoming)))
            .unwrap_or_default()
    }

    /// Breadth-first list of all transitive prerequisites of a task.
    ///
    /// Each prerequisite appears once, at the depth it was first reached.
    /// Traversal stops expanding beyond `max_depth` when given. Returns an
    /// empty list for unknown tasks.
    pub fn dependency_tree(&self, id: TaskId, max_depth: Option<usize>) -> Vec<TreeEntry> {
        let Some(&start) = self.node_map.get(&id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::from([(start, 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            for next in self.neighbors_sorted(current, Direction::Outgoing) {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                    result.push(TreeEntry {
                        id: self.graph[next].id,
                        parent: self.graph[current].id,
                        depth: depth + 1,
                    });
                }
            }
        }

        result
    }

    /// Whether every prerequisite reachable from `id` is completed.
    ///
    /// When a cycle leads back to the starting task within `max_depth`, the
    /// task is one of its own prerequisites and must itself be completed.
    /// Prerequisites deeper than `max_depth` are not
    /// inspected. Unknown tasks are startable.
    pub fn can_start_transitively(&self, id: TaskId, max_depth: usize) -> bool {
        let Some(&start) = self.node_map.get(&id) else {
            return true;
        };

        let tree = self.dependency_tree(id, Some(max_depth));

        // The tree never lists the start, so edges back to it are checked here
        let cycles_back = self.graph.find_edge(start, start).is_some()
            || tree.iter().filter(|entry| entry.depth < max_depth).any(|entry| {
                self.node_map
                    .get(&entry.id)
                    .is_some_and(|&n| self.graph.find_edge(n, start).is_some())
            });
        if cycles_back && self.graph[start].status != TaskStatus::Completed {
            return false;
        }

        tree.iter()
            .all(|entry| self.status(entry.id) == Some(TaskStatus::Completed))
    }

    fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.node_map.get(&id).map(|&n| self.graph[n].status)
    }

    /// Whether adding `from -> to` would close a cycle.
    ///
    /// A self edge always would. An edge touching a task outside the index
    /// never can.
    pub fn would_create_cycle(&self, from: TaskId, to: TaskId) -> bool {
        if from == to {
            return true;
        }
        let (Some(&from_node), Some(&to_node)) = (self.node_map.get(&from), self.node_map.get(&to))
        else {
            return false;
        };

        // A path to -> ... -> from already exists
        algo::has_path_connecting(&self.graph, to_node, from_node, None)
    }

    /// Every dependency cycle, as the set of tasks involved.
    ///
    /// Each cycle is a strongly connected component with more than one task,
    /// or a single task that depends on itself. Ids within a cycle and the
    /// cycles themselves are sorted.
    pub fn find_cycles(&self) -> Vec<Vec<TaskId>> {
        let mut cycles: Vec<Vec<TaskId>> = algo::tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut ids = self.ids(scc);
                ids.sort_unstable();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Unfinished direct prerequisites of a node, in collection order.
    fn unfinished(&self, node: NodeIndex) -> Vec<TaskId> {
        self.neighbors_sorted(node, Direction::Outgoing)
            .into_iter()
            .filter(|&n| self.graph[n].status != TaskStatus::Completed)
            .map(|n| self.graph[n].id)
            .collect()
    }

    /// Tasks that are not completed and may be started, in collection order.
    ///
    /// Tasks flagged `can_start_without_dependency` are always included.
    pub fn ready_tasks(&self, mode: ReadinessMode, max_depth: usize) -> Vec<TaskId> {
        self.graph
            .node_indices()
            .filter(|&n| {
                let node = self.graph[n];
                if node.status == TaskStatus::Completed {
                    return false;
                }
                node.may_skip
                    || match mode {
                        ReadinessMode::Direct => self.unfinished(n).is_empty(),
                        ReadinessMode::Transitive => self.can_start_transitively(node.id, max_depth),
                    }
            })
            .map(|n| self.graph[n].id)
            .collect()
    }

    /// Not-started tasks waiting on unfinished direct prerequisites.
    ///
    /// Returns each blocked task with the prerequisites it waits on.
    /// Tasks flagged `can_start_without_dependency` are never blocked.
    pub fn blocked_tasks(&self) -> Vec<(TaskId, Vec<TaskId>)> {
        self.graph
            .node_indices()
            .filter(|&n| {
                let node = self.graph[n];
                node.status == TaskStatus::NotStarted && !node.may_skip
            })
            .filter_map(|n| {
                let waiting = self.unfinished(n);
                (!waiting.is_empty()).then(|| (self.graph[n].id, waiting))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn done(id: u64) -> Task {
        Task::new(id, format!("task {id}")).with_status(TaskStatus::Completed)
    }

    fn todo(id: u64, deps: &[u64]) -> Task {
        Task::new(id, format!("task {id}")).with_dependencies(deps.iter().copied())
    }

    fn tid(ids: &[u64]) -> Vec<TaskId> {
        ids.iter().copied().map(TaskId).collect()
    }

    #[test]
    fn stale_references_produce_no_edges() {
        let index = DependencyIndex::from_tasks(&[todo(1, &[2, 99]), done(2)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.dependencies(TaskId(1)), tid(&[2]));
        assert!(!index.contains(TaskId(99)));
    }

    #[test]
    fn duplicate_listing_yields_single_edge() {
        let index = DependencyIndex::from_tasks(&[done(1), todo(2, &[1, 1])]);
        assert_eq!(index.dependents(TaskId(1)), tid(&[2]));
    }

    #[test]
    fn duplicate_task_id_keeps_first() {
        let index = DependencyIndex::from_tasks(&[todo(1, &[2]), done(2), todo(1, &[3]), done(3)]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.dependencies(TaskId(1)), tid(&[2]));
        assert!(index.dependents(TaskId(3)).is_empty());
    }

    #[test]
    fn dependents_in_collection_order() {
        let index = DependencyIndex::from_tasks(&[todo(7, &[1]), done(1), todo(3, &[1])]);
        assert_eq!(index.dependents(TaskId(1)), tid(&[7, 3]));
    }

    #[test]
    fn tree_is_breadth_first_with_depths() {
        // 4 -> {2, 3}, 2 -> 1, 3 -> 1
        let index =
            DependencyIndex::from_tasks(&[done(1), todo(2, &[1]), todo(3, &[1]), todo(4, &[2, 3])]);

        let tree = index.dependency_tree(TaskId(4), None);
        let flat: Vec<(u64, usize)> = tree.iter().map(|e| (e.id.get(), e.depth)).collect();
        assert_eq!(flat, vec![(2, 1), (3, 1), (1, 2)]);
        assert_eq!(tree[2].parent, TaskId(2));
    }

    #[rstest]
    #[case(Some(1), 2)]
    #[case(Some(2), 3)]
    #[case(None, 3)]
    fn tree_respects_max_depth(#[case] max: Option<usize>, #[case] expected: usize) {
        let index =
            DependencyIndex::from_tasks(&[done(1), todo(2, &[1]), todo(3, &[1]), todo(4, &[2, 3])]);
        assert_eq!(index.dependency_tree(TaskId(4), max).len(), expected);
    }

    #[test]
    fn tree_terminates_on_cycle() {
        let index = DependencyIndex::from_tasks(&[todo(1, &[2]), todo(2, &[3]), todo(3, &[1])]);

        let tree = index.dependency_tree(TaskId(1), None);
        let ids: Vec<u64> = tree.iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn transitive_readiness_looks_past_first_hop() {
        // 3 -> 2 (done) -> 1 (not done)
        let tasks = vec![
            todo(1, &[]),
            done(2).with_dependencies([1]),
            todo(3, &[2]),
        ];
        let index = DependencyIndex::from_tasks(&tasks);

        assert!(crate::graph::can_start_task(TaskId(3), &tasks));
        assert!(!index.can_start_transitively(TaskId(3), MAX_TRAVERSAL_DEPTH));
        assert!(index.can_start_transitively(TaskId(3), 1));
    }

    #[test]
    fn transitive_readiness_on_cycle_includes_start() {
        let index = DependencyIndex::from_tasks(&[todo(1, &[2]), done(2).with_dependencies([1])]);

        assert!(crate::graph::can_start_task(TaskId(1), &[todo(1, &[2]), done(2)]));
        assert!(!index.can_start_transitively(TaskId(1), MAX_TRAVERSAL_DEPTH));
        assert!(index.can_start_transitively(TaskId(404), MAX_TRAVERSAL_DEPTH));
    }

    #[rstest]
    #[case(2, true)]
    #[case(3, false)]
    fn cycle_back_to_start_counts_within_depth(#[case] max_depth: usize, #[case] startable: bool) {
        // 1 -> 2 (done) -> 3 (done) -> 1
        let index = DependencyIndex::from_tasks(&[
            todo(1, &[2]),
            done(2).with_dependencies([3]),
            done(3).with_dependencies([1]),
        ]);
        assert_eq!(index.can_start_transitively(TaskId(1), max_depth), startable);
    }

    #[test]
    fn transitive_readiness_respects_self_edge() {
        let index = DependencyIndex::from_tasks(&[todo(1, &[1])]);
        assert!(!index.can_start_transitively(TaskId(1), MAX_TRAVERSAL_DEPTH));
    }

    #[rstest]
    #[case(1, 3, true)]
    #[case(3, 1, false)]
    #[case(2, 2, true)]
    #[case(1, 99, false)]
    fn cycle_guard(#[case] from: u64, #[case] to: u64, #[case] cycle: bool) {
        // 3 -> 2 -> 1
        let index = DependencyIndex::from_tasks(&[todo(1, &[]), todo(2, &[1]), todo(3, &[2])]);
        assert_eq!(index.would_create_cycle(TaskId(from), TaskId(to)), cycle);
    }

    #[test]
    fn find_cycles_reports_each_component_once() {
        let index = DependencyIndex::from_tasks(&[
            todo(1, &[2]),
            todo(2, &[1]),
            todo(3, &[3]),
            todo(4, &[1]),
            todo(5, &[6]),
            todo(6, &[7]),
            todo(7, &[5]),
        ]);

        assert_eq!(
            index.find_cycles(),
            vec![tid(&[1, 2]), tid(&[3]), tid(&[5, 6, 7])]
        );
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let index = DependencyIndex::from_tasks(&[done(1), todo(2, &[1]), todo(3, &[1, 2])]);
        assert!(index.find_cycles().is_empty());
    }

    #[test]
    fn ready_and_blocked_listings() {
        let mut skip = todo(5, &[2]);
        skip.can_start_without_dependency = Some(true);
        let mut held = todo(6, &[2]);
        held.status = TaskStatus::OnHold;

        let tasks = vec![
            done(1),
            todo(2, &[1]),
            todo(3, &[2]),
            done(4).with_dependencies([3]),
            skip,
            held,
        ];
        let index = DependencyIndex::from_tasks(&tasks);

        assert_eq!(
            index.ready_tasks(ReadinessMode::Direct, MAX_TRAVERSAL_DEPTH),
            tid(&[2, 5])
        );
        assert_eq!(index.blocked_tasks(), vec![(TaskId(3), tid(&[2]))]);
    }

    #[test]
    fn transitive_ready_excludes_deep_waiters() {
        let tasks = vec![
            todo(1, &[]),
            done(2).with_dependencies([1]),
            todo(3, &[2]),
        ];
        let index = DependencyIndex::from_tasks(&tasks);

        assert_eq!(
            index.ready_tasks(ReadinessMode::Direct, MAX_TRAVERSAL_DEPTH),
            tid(&[1, 3])
        );
        assert_eq!(
            index.ready_tasks(ReadinessMode::Transitive, MAX_TRAVERSAL_DEPTH),
            tid(&[1])
        );
    }
}
