//! # Propagation Module.
//!
//! This module computes personalized trust scores from a seed node over the
//! trust graph, using bounded signed spreading activation.
//!
//! A unit of mass starts at the seed. Each round, every node holding mass
//! splits it across its outgoing edges proportionally to relative absolute
//! weight. Mass crossing a positive edge is deposited into the target's
//! positive accumulator and keeps flowing, scaled down by the damping
//! factor; mass crossing a negative edge is deposited into the target's
//! negative accumulator and is absorbed there, so distrust attenuates
//! without compounding. The final score of a node is its positive minus its
//! negative accumulator.
//!
//! The damping factor is strictly below one, so the circulating mass decays
//! geometrically and the loop terminates on cyclic graphs. If it has not
//! fallen below the tolerance within the iteration budget the partial
//! result is returned with `converged` unset.

use crate::{
	config::EngineConfig,
	graph::{Node, TrustGraph},
};
use log::{debug, warn};
use std::collections::BTreeMap;

/// The result of a propagation run.
#[derive(Clone, Debug, PartialEq)]
pub struct Propagation {
	/// Score per node, excluding the seed. Deterministic for a given graph
	/// and seed.
	pub scores: BTreeMap<Node, f64>,
	/// Whether the circulating mass fell below the tolerance within the
	/// iteration budget.
	pub converged: bool,
}

/// Computes personalized trust scores from a seed node.
pub struct TrustPropagator {
	damping: f64,
	tolerance: f64,
	max_iterations: usize,
}

impl TrustPropagator {
	/// Creates a propagator from the engine configuration.
	pub fn new(config: &EngineConfig) -> Self {
		Self {
			damping: config.damping,
			tolerance: config.tolerance,
			max_iterations: config.max_iterations,
		}
	}

	/// Propagates trust from `seed` over `graph`. All flow originates at the
	/// seed; the seed itself is excluded from the result.
	pub fn propagate(&self, graph: &TrustGraph, seed: &Node) -> Propagation {
		let mut positive: BTreeMap<Node, f64> = BTreeMap::new();
		let mut negative: BTreeMap<Node, f64> = BTreeMap::new();

		let mut frontier: BTreeMap<Node, f64> = BTreeMap::new();
		frontier.insert(seed.clone(), 1.0);

		let mut converged = false;
		let mut rounds = 0;
		for round in 0..self.max_iterations {
			rounds = round + 1;
			let mut next: BTreeMap<Node, f64> = BTreeMap::new();

			for (node, mass) in &frontier {
				let outs = match graph.out_edges(node) {
					Some(outs) => outs,
					None => continue,
				};
				let total: f64 = outs.values().map(|weight| weight.abs()).sum();
				if total == 0.0 {
					continue;
				}

				for (target, weight) in outs {
					let share = mass * weight.abs() / total;
					if *weight >= 0.0 {
						*positive.entry(target.clone()).or_insert(0.0) += share;
						*next.entry(target.clone()).or_insert(0.0) += share * self.damping;
					} else {
						*negative.entry(target.clone()).or_insert(0.0) += share;
					}
				}
			}

			let circulating: f64 = next.values().sum();
			frontier = next;
			if circulating < self.tolerance {
				converged = true;
				break;
			}
		}

		if converged {
			debug!("Propagation converged after {} rounds.", rounds);
		} else {
			warn!(
				"Propagation exhausted its budget of {} rounds; returning partial scores.",
				self.max_iterations
			);
		}

		let mut scores = positive;
		for (node, distrust) in negative {
			*scores.entry(node).or_insert(0.0) -= distrust;
		}
		scores.remove(seed);

		Propagation { scores, converged }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::{ActorId, PostId};

	fn actor(name: &str) -> Node {
		Node::Actor(ActorId::new(name))
	}

	fn content(id: u64) -> Node {
		Node::Content(PostId::new(id))
	}

	fn propagator() -> TrustPropagator {
		TrustPropagator::new(&EngineConfig::default())
	}

	#[test]
	fn propagation_is_deterministic() {
		let mut graph = TrustGraph::new();
		graph.add_edge(actor("a"), content(1), 1.0);
		graph.add_edge(content(1), actor("b"), 77777.0);
		graph.add_edge(actor("b"), content(1), 2.0);
		graph.add_edge(actor("a"), content(2), -3.0);
		graph.add_edge(content(2), actor("c"), 77777.0);

		let first = propagator().propagate(&graph, &actor("a"));
		let second = propagator().propagate(&graph, &actor("a"));

		assert_eq!(first, second);
	}

	#[test]
	fn seed_is_excluded_from_the_result() {
		let mut graph = TrustGraph::new();
		// A cycle that sends mass straight back to the seed.
		graph.add_edge(actor("a"), content(1), 1.0);
		graph.add_edge(content(1), actor("a"), 77777.0);

		let result = propagator().propagate(&graph, &actor("a"));

		assert!(!result.scores.contains_key(&actor("a")));
		assert!(result.scores.contains_key(&content(1)));
	}

	#[test]
	fn trust_only_graphs_yield_non_negative_scores() {
		let mut graph = TrustGraph::new();
		graph.add_edge(actor("a"), content(1), 1.0);
		graph.add_edge(actor("a"), content(2), 4.0);
		graph.add_edge(content(1), actor("b"), 77777.0);
		graph.add_edge(content(2), actor("c"), 77777.0);
		graph.add_edge(actor("b"), content(2), 2.0);
		graph.add_edge(actor("c"), content(1), 3.0);

		let result = propagator().propagate(&graph, &actor("a"));

		assert!(result.converged);
		for (node, score) in &result.scores {
			assert!(*score >= 0.0, "{:?} has negative score {}", node, score);
		}
	}

	#[test]
	fn negative_influence_does_not_compound() {
		let mut graph = TrustGraph::new();
		graph.add_edge(actor("a"), content(1), -1.0);
		graph.add_edge(content(1), actor("b"), 77777.0);

		let result = propagator().propagate(&graph, &actor("a"));

		// All the seed's mass crosses the negative edge and is absorbed at
		// the target; nothing flows on to the creator.
		assert_eq!(result.scores.get(&content(1)), Some(&-1.0));
		assert!(!result.scores.contains_key(&actor("b")));
	}

	#[test]
	fn outgoing_flow_splits_proportionally() {
		let mut graph = TrustGraph::new();
		graph.add_edge(actor("a"), content(1), 1.0);
		graph.add_edge(actor("a"), content(2), 3.0);

		let result = propagator().propagate(&graph, &actor("a"));

		assert_eq!(result.scores.get(&content(1)), Some(&0.25));
		assert_eq!(result.scores.get(&content(2)), Some(&0.75));
	}

	#[test]
	fn cyclic_graphs_terminate() {
		let mut graph = TrustGraph::new();
		// Mutual authorship/voting cycle.
		graph.add_edge(actor("a"), content(1), 1.0);
		graph.add_edge(content(1), actor("b"), 77777.0);
		graph.add_edge(actor("b"), content(2), 1.0);
		graph.add_edge(content(2), actor("a"), 77777.0);

		let result = propagator().propagate(&graph, &actor("a"));

		assert!(result.converged);
		assert!(result.scores[&content(1)] > 0.0);
	}

	#[test]
	fn exhausted_budget_flags_partial_result() {
		let config = EngineConfig { max_iterations: 2, tolerance: 1e-12, ..Default::default() };
		let mut graph = TrustGraph::new();
		graph.add_edge(actor("a"), content(1), 1.0);
		graph.add_edge(content(1), actor("b"), 77777.0);
		graph.add_edge(actor("b"), content(1), 1.0);

		let result = TrustPropagator::new(&config).propagate(&graph, &actor("a"));

		assert!(!result.converged);
		assert!(result.scores[&content(1)] > 0.0);
	}
}
