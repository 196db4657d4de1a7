//! Graph helpers over child -> parents adjacency
//!
//! - Depth-first path search, used to reject edges that would close a cycle
//! - Kahn's algorithm, used to order roles parents-first when memoizing
//!   ancestor sets at freeze time

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{RbacError, Result};
use crate::types::RoleId;

/// Child role -> directly inherited parent roles
pub(crate) type ParentEdges = HashMap<RoleId, Vec<RoleId>>;

/// Find a path from `from` to `to` following parent edges.
///
/// Returns the path including both endpoints, or `None` when `to` is not
/// reachable. Iterative DFS, O(V + E).
pub(crate) fn find_path(edges: &ParentEdges, from: &str, to: &str) -> Option<Vec<RoleId>> {
    if from == to {
        return Some(vec![from.to_string()]);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    // (node, index of next parent to explore)
    let mut stack: Vec<(&str, usize)> = vec![(from, 0)];
    visited.insert(from);

    while let Some((node, next)) = stack.last_mut() {
        let parents = edges.get(*node).map(Vec::as_slice).unwrap_or(&[]);

        if *next >= parents.len() {
            stack.pop();
            continue;
        }

        let parent = parents[*next].as_str();
        *next += 1;

        if parent == to {
            let mut path: Vec<RoleId> = stack.iter().map(|(n, _)| n.to_string()).collect();
            path.push(parent.to_string());
            return Some(path);
        }

        if visited.insert(parent) {
            stack.push((parent, 0));
        }
    }

    None
}

/// Order `nodes` so that every parent precedes its children (Kahn's algorithm).
///
/// Ties keep the order of `nodes`, so the result is deterministic.
///
/// # Errors
///
/// `CycleDetected` if some nodes could not be ordered.
pub(crate) fn topological_order<'a, I>(nodes: I, edges: &ParentEdges) -> Result<Vec<RoleId>>
where
    I: IntoIterator<Item = &'a RoleId>,
{
    let nodes: Vec<&RoleId> = nodes.into_iter().collect();

    // parent -> children, and number of unresolved parents per child
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for node in &nodes {
        in_degree.insert(node.as_str(), 0);
    }

    for node in &nodes {
        if let Some(parents) = edges.get(node.as_str()) {
            for parent in parents {
                children.entry(parent.as_str()).or_default().push(node.as_str());
                if let Some(degree) = in_degree.get_mut(node.as_str()) {
                    *degree += 1;
                }
            }
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.as_str())
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();

    let mut sorted = Vec::with_capacity(nodes.len());

    while let Some(current) = queue.pop_front() {
        sorted.push(current.to_string());

        if let Some(dependents) = children.get(current) {
            for dependent in dependents {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }
    }

    if sorted.len() != nodes.len() {
        let stuck: Vec<&str> = nodes
            .iter()
            .map(|n| n.as_str())
            .filter(|n| in_degree.get(n).copied().unwrap_or(0) > 0)
            .collect();
        return Err(RbacError::CycleDetected(stuck.join(", ")));
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> ParentEdges {
        let mut map = ParentEdges::new();
        for (child, parent) in pairs {
            map.entry(child.to_string()).or_default().push(parent.to_string());
        }
        map
    }

    fn ids(names: &[&str]) -> Vec<RoleId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_find_path_linear() {
        let graph = edges(&[("c", "b"), ("b", "a")]);
        assert_eq!(find_path(&graph, "c", "a"), Some(ids(&["c", "b", "a"])));
        assert_eq!(find_path(&graph, "a", "c"), None);
    }

    #[test]
    fn test_find_path_diamond() {
        // d inherits b and c, both inherit a
        let graph = edges(&[("d", "b"), ("d", "c"), ("b", "a"), ("c", "a")]);
        let path = find_path(&graph, "d", "a").unwrap();
        assert_eq!(path.first().map(String::as_str), Some("d"));
        assert_eq!(path.last().map(String::as_str), Some("a"));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_topological_order_parents_first() {
        let nodes = ids(&["senior", "junior", "lead"]);
        let graph = edges(&[("senior", "junior"), ("lead", "senior")]);

        let order = topological_order(&nodes, &graph).unwrap();
        assert_eq!(order, ids(&["junior", "senior", "lead"]));
    }

    #[test]
    fn test_topological_order_reports_cycle() {
        let nodes = ids(&["a", "b", "c"]);
        let graph = edges(&[("a", "b"), ("b", "a")]);

        match topological_order(&nodes, &graph) {
            Err(RbacError::CycleDetected(msg)) => {
                assert!(msg.contains('a') && msg.contains('b'));
                assert!(!msg.contains('c'));
            }
            other => panic!("Expected CycleDetected, got {:?}", other),
        }
    }
}
