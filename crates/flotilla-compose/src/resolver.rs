//! Dependency resolution over the module graph.
//!
//! Builds a directed graph over the transitive closure of the requested
//! modules and produces a deterministic, dependency-first build order.
//! A cycle fails resolution with an error naming its members; it is never
//! silently truncated into a partial order.

use std::collections::{HashMap, VecDeque};

use flotilla_common::error::{FlotillaError, Result};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::registry::ModuleRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Resolves the transitive closure of `requested` into a build order.
///
/// Every dependency appears strictly before its dependents, each module
/// appears exactly once, and requested names are traversed in input order,
/// so the result is stable across runs.
///
/// # Errors
///
/// Fails if a module cannot be loaded or the dependency graph is cyclic.
pub fn resolve(registry: &mut ModuleRegistry, requested: &[String]) -> Result<Vec<String>> {
    tracing::info!(count = requested.len(), "resolving module set");
    let (graph, nodes) = build_graph(registry, requested)?;

    let mut marks: HashMap<NodeIndex, Mark> = HashMap::new();
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut order: Vec<String> = Vec::new();

    for name in requested {
        if let Some(&idx) = nodes.get(name.as_str()) {
            visit(&graph, idx, &mut marks, &mut path, &mut order)?;
        }
    }
    Ok(order)
}

/// Discovers the transitive closure breadth-first and materializes it as a
/// graph with one edge per (dependent -> dependency) pair.
fn build_graph(
    registry: &mut ModuleRegistry,
    requested: &[String],
) -> Result<(DiGraph<String, ()>, HashMap<String, NodeIndex>)> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
    let mut discovered: Vec<String> = Vec::new();
    let mut queue: VecDeque<String> = requested.iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        if nodes.contains_key(&name) {
            continue;
        }
        let idx = graph.add_node(name.clone());
        let _ = nodes.insert(name.clone(), idx);
        for dep in registry.dependencies(&name)? {
            queue.push_back(dep);
        }
        discovered.push(name);
    }

    for name in &discovered {
        for dep in registry.dependencies(name)? {
            if let (Some(&from), Some(&to)) = (nodes.get(name.as_str()), nodes.get(dep.as_str())) {
                let _ = graph.add_edge(from, to, ());
            }
        }
    }

    Ok((graph, nodes))
}

fn visit(
    graph: &DiGraph<String, ()>,
    node: NodeIndex,
    marks: &mut HashMap<NodeIndex, Mark>,
    path: &mut Vec<NodeIndex>,
    order: &mut Vec<String>,
) -> Result<()> {
    match marks.get(&node) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            return Err(cycle_error(graph, path, node));
        }
        None => {}
    }

    let _ = marks.insert(node, Mark::InProgress);
    path.push(node);

    // petgraph yields neighbors most-recent-edge first; reverse to walk
    // dependencies in declaration order.
    let mut deps: Vec<NodeIndex> = graph.neighbors(node).collect();
    deps.reverse();
    for dep in deps {
        visit(graph, dep, marks, path, order)?;
    }

    let _ = path.pop();
    let _ = marks.insert(node, Mark::Done);
    if let Some(name) = graph.node_weight(node) {
        order.push(name.clone());
    }
    Ok(())
}

/// Names the members along the cycle, from the re-encountered module back
/// to itself.
fn cycle_error(graph: &DiGraph<String, ()>, path: &[NodeIndex], node: NodeIndex) -> FlotillaError {
    let start = path.iter().position(|&n| n == node).unwrap_or(0);
    let mut members: Vec<String> = path
        .iter()
        .skip(start)
        .filter_map(|&n| graph.node_weight(n).cloned())
        .collect();
    if let Some(name) = graph.node_weight(node) {
        members.push(name.clone());
    }
    FlotillaError::DependencyCycle { members }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use flotilla_common::constants::MODULE_FILE_NAME;

    use crate::store::DescriptorStore;

    use super::*;

    fn registry_with(modules: &[(&str, &str)]) -> (tempfile::TempDir, ModuleRegistry) {
        let tmp = tempfile::tempdir().expect("tempdir");
        for (name, deps) in modules {
            let dir = tmp.path().join(name);
            fs::create_dir_all(&dir).expect("create module dir");
            let yaml = format!("dependencies: [{deps}]\ndocker:\n  image: {name}:latest\n");
            fs::write(dir.join(MODULE_FILE_NAME), yaml).expect("write descriptor");
        }
        let registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));
        (tmp, registry)
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn single_module_resolves_to_itself() {
        let (_tmp, mut registry) = registry_with(&[("db", "")]);
        let order = resolve(&mut registry, &names(&["db"])).expect("should resolve");
        assert_eq!(order, vec!["db"]);
    }

    #[test]
    fn dependency_comes_first() {
        let (_tmp, mut registry) = registry_with(&[("a", "b"), ("b", "")]);
        let order = resolve(&mut registry, &names(&["a"])).expect("should resolve");
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn transitive_closure_is_pulled_in() {
        let (_tmp, mut registry) = registry_with(&[("web", ""), ("app", "db"), ("db", "")]);
        let order = resolve(&mut registry, &names(&["app", "web"])).expect("should resolve");
        assert_eq!(order, vec!["db", "app", "web"]);
    }

    #[test]
    fn shared_dependency_appears_once() {
        let (_tmp, mut registry) = registry_with(&[
            ("a", "d"),
            ("b", "d"),
            ("top", "a, b"),
            ("d", ""),
        ]);
        let order = resolve(&mut registry, &names(&["top"])).expect("should resolve");
        assert_eq!(order, vec!["d", "a", "b", "top"]);
    }

    #[test]
    fn duplicate_requests_resolve_once() {
        let (_tmp, mut registry) = registry_with(&[("db", "")]);
        let order = resolve(&mut registry, &names(&["db", "db"])).expect("should resolve");
        assert_eq!(order, vec!["db"]);
    }

    #[test]
    fn request_order_is_preserved() {
        let (_tmp, mut registry) = registry_with(&[("x", ""), ("y", ""), ("z", "")]);
        let order = resolve(&mut registry, &names(&["z", "x", "y"])).expect("should resolve");
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn resolution_is_deterministic_across_runs() {
        let (_tmp, mut registry) = registry_with(&[("web", "app"), ("app", "db"), ("db", "")]);
        let first = resolve(&mut registry, &names(&["web"])).expect("first run");
        let second = resolve(&mut registry, &names(&["web"])).expect("second run");
        assert_eq!(first, second);
    }

    #[test]
    fn two_node_cycle_is_an_error_naming_members() {
        let (_tmp, mut registry) = registry_with(&[("a", "b"), ("b", "a")]);
        let err = resolve(&mut registry, &names(&["a"])).expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("cyclic"), "got: {msg}");
        assert!(msg.contains("a -> b -> a"), "got: {msg}");
    }

    #[test]
    fn three_node_cycle_is_detected() {
        let (_tmp, mut registry) = registry_with(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let err = resolve(&mut registry, &names(&["a"])).expect_err("should fail");
        match err {
            FlotillaError::DependencyCycle { members } => {
                assert_eq!(members, vec!["a", "b", "c", "a"]);
            }
            other => panic!("expected DependencyCycle, got: {other}"),
        }
    }

    #[test]
    fn cycle_below_a_healthy_module_is_still_detected() {
        let (_tmp, mut registry) = registry_with(&[("top", "a"), ("a", "b"), ("b", "a")]);
        let err = resolve(&mut registry, &names(&["top"])).expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("a -> b -> a"), "got: {msg}");
    }

    #[test]
    fn missing_dependency_fails_with_not_found() {
        let (_tmp, mut registry) = registry_with(&[("app", "ghost")]);
        let err = resolve(&mut registry, &names(&["app"])).expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("ghost"), "got: {msg}");
    }

    #[test]
    fn empty_request_resolves_to_empty() {
        let (_tmp, mut registry) = registry_with(&[]);
        let order = resolve(&mut registry, &[]).expect("should resolve");
        assert!(order.is_empty());
    }
}
