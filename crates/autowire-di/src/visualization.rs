//! Dependency graph visualization for development and debugging
//!
//! [`Container::dependency_graph`] walks the graph a resolution would build
//! without constructing anything, and renders it in DOT format for Graphviz.
//!
//! ## Example
//!
//! ```rust
//! use autowire_di::visualization::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node("Database", "singleton");
//! graph.add_node("UserService", "transient");
//! graph.add_dependency("UserService", "Database");
//!
//! let dot = graph.to_dot();
//! println!("{}", dot);
//! ```

use crate::container::Container;
use crate::constructor::ConstructorSelector;
use crate::context::{ResolutionContext, ResolutionSession};
use autowire_types::TypeKey;
use std::collections::{HashMap, HashSet, VecDeque};

/// Label of a node whose concrete type or lifetime could not be determined.
pub const UNRESOLVED: &str = "unresolved";

/// Represents a node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
	/// Full name of the concrete type (or of the requested type if unresolved)
	pub name: String,
	/// "singleton", "transient" or "unresolved"
	pub lifetime: String,
	/// Optional Rust type information
	pub type_name: Option<String>,
}

/// Dependency graph for visualization
#[derive(Debug, Default)]
pub struct DependencyGraph {
	nodes: HashMap<String, GraphNode>,
	edges: Vec<(String, String)>,
}

impl DependencyGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a node to the graph
	pub fn add_node(&mut self, name: impl Into<String>, lifetime: impl Into<String>) {
		let name = name.into();
		self.nodes.insert(
			name.clone(),
			GraphNode {
				name,
				lifetime: lifetime.into(),
				type_name: None,
			},
		);
	}

	/// Add a node with type information
	pub fn add_typed_node(
		&mut self,
		name: impl Into<String>,
		lifetime: impl Into<String>,
		type_name: impl Into<String>,
	) {
		let name = name.into();
		self.nodes.insert(
			name.clone(),
			GraphNode {
				name,
				lifetime: lifetime.into(),
				type_name: Some(type_name.into()),
			},
		);
	}

	/// Add a dependency edge from `from` to `to`
	pub fn add_dependency(&mut self, from: impl Into<String>, to: impl Into<String>) {
		self.edges.push((from.into(), to.into()));
	}

	pub fn node(&self, name: &str) -> Option<&GraphNode> {
		self.nodes.get(name)
	}

	/// Direct dependencies of `name`, in declaration order.
	pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
		self.edges
			.iter()
			.filter(|(from, _)| from == name)
			.map(|(_, to)| to.as_str())
			.collect()
	}

	/// Generate DOT format output for Graphviz
	///
	/// # Example
	///
	/// ```rust
	/// use autowire_di::visualization::DependencyGraph;
	///
	/// let mut graph = DependencyGraph::new();
	/// graph.add_node("Database", "singleton");
	/// graph.add_node("UserService", "transient");
	/// graph.add_dependency("UserService", "Database");
	///
	/// let dot = graph.to_dot();
	/// assert!(dot.contains("digraph"));
	/// assert!(dot.contains("\"UserService\" -> \"Database\""));
	/// ```
	pub fn to_dot(&self) -> String {
		let mut output = String::from("digraph DependencyGraph {\n");
		output.push_str("  rankdir=LR;\n");
		output.push_str("  node [shape=box, style=rounded];\n\n");

		let mut names: Vec<&String> = self.nodes.keys().collect();
		names.sort();
		for node in names.into_iter().filter_map(|name| self.nodes.get(name)) {
			let color = match node.lifetime.as_str() {
				"singleton" => "lightblue",
				"transient" => "lightyellow",
				UNRESOLVED => "lightcoral",
				_ => "white",
			};

			let label = match &node.type_name {
				Some(type_name) => format!("{}\\n({})", node.name, type_name),
				None => node.name.clone(),
			};

			output.push_str(&format!(
				"  \"{}\" [label=\"{}\", fillcolor={}, style=filled];\n",
				node.name, label, color
			));
		}

		output.push('\n');

		for (from, to) in &self.edges {
			output.push_str(&format!("  \"{}\" -> \"{}\";\n", from, to));
		}

		output.push_str("}\n");
		output
	}

	/// Detect circular dependencies in the graph
	///
	/// Returns a list of dependency cycles if found.
	///
	/// # Example
	///
	/// ```rust
	/// use autowire_di::visualization::DependencyGraph;
	///
	/// let mut graph = DependencyGraph::new();
	/// graph.add_node("A", "transient");
	/// graph.add_node("B", "transient");
	/// graph.add_dependency("A", "B");
	/// graph.add_dependency("B", "A");
	///
	/// let cycles = graph.detect_cycles();
	/// assert!(!cycles.is_empty());
	/// ```
	pub fn detect_cycles(&self) -> Vec<Vec<String>> {
		let mut cycles = Vec::new();
		let mut visited = HashSet::new();
		let mut rec_stack = HashSet::new();

		let mut names: Vec<&String> = self.nodes.keys().collect();
		names.sort();
		for node_name in names {
			if !visited.contains(node_name.as_str()) {
				let mut path = Vec::new();
				self.dfs_detect_cycles(
					node_name,
					&mut visited,
					&mut rec_stack,
					&mut path,
					&mut cycles,
				);
			}
		}

		cycles
	}

	fn dfs_detect_cycles(
		&self,
		node: &str,
		visited: &mut HashSet<String>,
		rec_stack: &mut HashSet<String>,
		path: &mut Vec<String>,
		cycles: &mut Vec<Vec<String>>,
	) {
		visited.insert(node.to_string());
		rec_stack.insert(node.to_string());
		path.push(node.to_string());

		for dep in self.dependencies_of(node) {
			if !visited.contains(dep) {
				self.dfs_detect_cycles(dep, visited, rec_stack, path, cycles);
			} else if rec_stack.contains(dep) {
				if let Some(cycle_start) = path.iter().position(|p| p == dep) {
					cycles.push(path[cycle_start..].to_vec());
				}
			}
		}

		path.pop();
		rec_stack.remove(node);
	}

	/// Get statistics about the dependency graph
	///
	/// # Example
	///
	/// ```rust
	/// use autowire_di::visualization::DependencyGraph;
	///
	/// let mut graph = DependencyGraph::new();
	/// graph.add_node("A", "singleton");
	/// graph.add_node("B", "transient");
	/// graph.add_dependency("B", "A");
	///
	/// let stats = graph.statistics();
	/// assert_eq!(stats.node_count, 2);
	/// assert_eq!(stats.edge_count, 1);
	/// assert_eq!(stats.singleton_count, 1);
	/// assert_eq!(stats.transient_count, 1);
	/// ```
	pub fn statistics(&self) -> GraphStatistics {
		let count = |lifetime: &str| {
			self.nodes
				.values()
				.filter(|n| n.lifetime == lifetime)
				.count()
		};

		GraphStatistics {
			node_count: self.nodes.len(),
			edge_count: self.edges.len(),
			singleton_count: count("singleton"),
			transient_count: count("transient"),
			unresolved_count: count(UNRESOLVED),
		}
	}
}

/// Statistics about a dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStatistics {
	/// Total number of nodes
	pub node_count: usize,
	/// Total number of edges
	pub edge_count: usize,
	/// Number of singleton dependencies
	pub singleton_count: usize,
	/// Number of transient dependencies
	pub transient_count: usize,
	/// Number of nodes the container could not resolve
	pub unresolved_count: usize,
}

impl Container {
	/// The graph `resolve::<T>()` would build, without building it.
	///
	/// Abstract types are replaced by the implementation the container would
	/// pick. Anything that fails to resolve becomes an `unresolved` leaf, so a
	/// broken graph can still be inspected.
	pub fn dependency_graph<T>(&self) -> DependencyGraph
	where
		T: ?Sized + 'static,
	{
		let mut graph = DependencyGraph::new();
		let mut seen: HashSet<TypeKey> = HashSet::new();
		let mut queue = VecDeque::from([(TypeKey::of::<T>(), ResolutionContext::none(), None::<String>)]);

		while let Some((target, context, parent)) = queue.pop_front() {
			let concrete = match self.finder().find_concrete(target, &context) {
				Ok(concrete) => concrete,
				Err(error) => {
					let name = target.type_name().to_owned();
					tracing::debug!(type_name = %name, %error, "unresolved node in dependency graph");
					graph.add_node(name.clone(), UNRESOLVED);
					if let Some(parent) = parent {
						graph.add_dependency(parent, name);
					}
					continue;
				}
			};

			let name = concrete.full_name();
			if let Some(parent) = parent {
				graph.add_dependency(parent, name.clone());
			}
			if !seen.insert(concrete.key()) {
				continue;
			}

			// Fresh session per node: a cycle only marks the node unresolved
			let lifetime = self
				.lifetimes()
				.determine(&concrete, &ResolutionSession::new())
				.map(|lifetime| lifetime.to_string())
				.unwrap_or_else(|_| UNRESOLVED.to_owned());
			graph.add_typed_node(name.clone(), lifetime, concrete.key().type_name());

			if let Ok(constructor) = ConstructorSelector::select(&concrete) {
				for parameter in constructor.parameters() {
					queue.push_back((
						parameter.ty,
						ResolutionContext::Type(concrete.key()),
						Some(name.clone()),
					));
				}
			}
		}

		graph
	}
}
