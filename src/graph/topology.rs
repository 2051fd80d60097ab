use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError<K: Debug + Clone> {
    CycleDetected { path: Vec<K> },
}

impl<K: Debug + Clone> std::fmt::Display for TopologyError<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::CycleDetected { path } => {
                write!(f, "Cycle detected: ")?;
                for (i, node) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{:?}", node)?;
                }
                Ok(())
            }
        }
    }
}

impl<K: Debug + Clone> std::error::Error for TopologyError<K> {}

/// DFS-based topological sort. Returns nodes in dependency order
/// (dependencies before dependents) or the offending cycle. The graph layer
/// has no feedback-capable nodes, so every cycle is an error.
pub fn topological_sort<K>(
    nodes: impl IntoIterator<Item = K>,
    get_dependencies: impl Fn(&K) -> Vec<K>,
) -> Result<Vec<K>, TopologyError<K>>
where
    K: Hash + Eq + Clone + Debug,
{
    let nodes: Vec<K> = nodes.into_iter().collect();

    // Adjacency: edge dep -> node for every dependency.
    let mut adjacency: HashMap<K, Vec<K>> = HashMap::new();
    for node in &nodes {
        adjacency.insert(node.clone(), Vec::new());
    }
    for node in &nodes {
        for dep in get_dependencies(node) {
            adjacency
                .entry(dep)
                .or_insert_with(Vec::new)
                .push(node.clone());
        }
    }

    let mut sorted = Vec::with_capacity(nodes.len());
    let mut visited = HashSet::new();
    let mut recursion_stack = HashSet::new();
    let mut path = Vec::new();

    fn visit<K>(
        node: K,
        adjacency: &HashMap<K, Vec<K>>,
        visited: &mut HashSet<K>,
        recursion_stack: &mut HashSet<K>,
        path: &mut Vec<K>,
        sorted: &mut Vec<K>,
    ) -> Result<(), TopologyError<K>>
    where
        K: Hash + Eq + Clone + Debug,
    {
        if recursion_stack.contains(&node) {
            let cycle_start = path.iter().position(|n| *n == node).unwrap_or(0);
            return Err(TopologyError::CycleDetected {
                path: path[cycle_start..].to_vec(),
            });
        }

        if visited.contains(&node) {
            return Ok(());
        }

        visited.insert(node.clone());
        recursion_stack.insert(node.clone());
        path.push(node.clone());

        if let Some(neighbors) = adjacency.get(&node) {
            for neighbor in neighbors {
                visit(
                    neighbor.clone(),
                    adjacency,
                    visited,
                    recursion_stack,
                    path,
                    sorted,
                )?;
            }
        }

        recursion_stack.remove(&node);
        path.pop();
        sorted.push(node);

        Ok(())
    }

    for node in &nodes {
        if !visited.contains(node) {
            visit(
                node.clone(),
                &adjacency,
                &mut visited,
                &mut recursion_stack,
                &mut path,
                &mut sorted,
            )?;
        }
    }

    // Reverse to get dependency order (dependencies first).
    sorted.reverse();

    Ok(sorted)
}
