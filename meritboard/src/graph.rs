//! # Graph Module.
//!
//! This module contains the trust graph and its builder. The graph is a
//! directed, signed-weight graph over actors and posts, rebuilt from the
//! current board and vote state on every recompute. It is transient and
//! never persisted as a whole.

use crate::{
	board::{ActorId, Board, PostId},
	config::EngineConfig,
	error::MeritError,
};
use std::collections::BTreeMap;

/// A node of the trust graph: an actor or a piece of content. The ordering
/// is total so that every graph traversal is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Node {
	/// An actor (author or voter).
	Actor(ActorId),
	/// A post or thread.
	Content(PostId),
}

/// Directed, signed-weight trust graph. Inserting an edge that already
/// exists overwrites its weight.
#[derive(Debug, Default)]
pub struct TrustGraph {
	out: BTreeMap<Node, BTreeMap<Node, f64>>,
	edge_count: usize,
}

impl TrustGraph {
	/// Creates an empty graph.
	pub fn new() -> Self {
		Self { out: BTreeMap::new(), edge_count: 0 }
	}

	/// Inserts or overwrites a directed edge.
	pub fn add_edge(&mut self, from: Node, to: Node, weight: f64) {
		let targets = self.out.entry(from).or_default();
		if targets.insert(to, weight).is_none() {
			self.edge_count += 1;
		}
	}

	/// Outgoing edges of a node, in target order.
	pub fn out_edges(&self, node: &Node) -> Option<&BTreeMap<Node, f64>> {
		self.out.get(node)
	}

	/// Number of edges in the graph.
	pub fn edge_count(&self) -> usize {
		self.edge_count
	}
}

/// A recorded vote feeding the graph build.
#[derive(Clone, Debug, PartialEq)]
pub struct VoteEdge {
	/// The voting actor.
	pub actor: ActorId,
	/// The voted post.
	pub target: PostId,
	/// Accumulated vote total.
	pub vote: i64,
}

/// Assembles the full trust graph from a board snapshot and the recorded
/// votes. Pure read; the graph is returned by value.
pub struct GraphBuilder<'a> {
	config: &'a EngineConfig,
}

impl<'a> GraphBuilder<'a> {
	/// Creates a builder over the given configuration.
	pub fn new(config: &'a EngineConfig) -> Self {
		Self { config }
	}

	/// Builds the graph. Authorship edges are inserted first so that an
	/// author's explicit vote on their own post overwrites the minimal
	/// author vote. A vote referencing a missing post is a referential
	/// integrity violation and fails the whole build.
	pub fn build(&self, board: &Board, votes: &[VoteEdge]) -> Result<TrustGraph, MeritError> {
		let mut graph = TrustGraph::new();

		// Every post sends all its merit to its creator through a single
		// outgoing edge, and receives the minimal author vote back.
		for post in board.posts() {
			graph.add_edge(
				Node::Content(post.id),
				Node::Actor(post.creator.clone()),
				self.config.post_to_creator_weight,
			);
			graph.add_edge(
				Node::Actor(post.creator.clone()),
				Node::Content(post.id),
				self.config.minimal_author_vote,
			);
		}

		for vote in votes {
			if !board.contains(vote.target) {
				return Err(MeritError::DataIntegrityError(format!(
					"vote by {} references missing post {}",
					vote.actor, vote.target
				)));
			}
			// A vote total of zero is no explicit vote and adds no edge.
			if vote.vote == 0 {
				continue;
			}
			graph.add_edge(
				Node::Actor(vote.actor.clone()),
				Node::Content(vote.target),
				self.weigh(vote.vote),
			);
		}

		Ok(graph)
	}

	/// Applies the negative-vote amplification to a raw vote total.
	fn weigh(&self, vote: i64) -> f64 {
		let value = vote as f64;
		if value >= 0.0 {
			value
		} else {
			value * self.config.negative_vote_amplification
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn board_with_post() -> (Board, ActorId, PostId) {
		let mut board = Board::new();
		let alice = ActorId::new("alice");
		let post = board.publish(alice.clone(), None, 100).unwrap();
		(board, alice, post)
	}

	#[test]
	fn authorship_edges_use_configured_weights() {
		let config = EngineConfig::default();
		let (board, alice, post) = board_with_post();

		let graph = GraphBuilder::new(&config).build(&board, &[]).unwrap();

		let from_post = graph.out_edges(&Node::Content(post)).unwrap();
		assert_eq!(from_post.get(&Node::Actor(alice.clone())), Some(&77777.0));

		let from_author = graph.out_edges(&Node::Actor(alice)).unwrap();
		assert_eq!(from_author.get(&Node::Content(post)), Some(&1.0));

		assert_eq!(graph.edge_count(), 2);
	}

	#[test]
	fn negative_votes_are_amplified_tenfold() {
		let config = EngineConfig::default();
		let (board, _, post) = board_with_post();

		let votes = vec![
			VoteEdge { actor: ActorId::new("bob"), target: post, vote: 1 },
			VoteEdge { actor: ActorId::new("carol"), target: post, vote: -1 },
		];
		let graph = GraphBuilder::new(&config).build(&board, &votes).unwrap();

		let up = graph.out_edges(&Node::Actor(ActorId::new("bob"))).unwrap()
			[&Node::Content(post)];
		let down = graph.out_edges(&Node::Actor(ActorId::new("carol"))).unwrap()
			[&Node::Content(post)];

		assert_eq!(up, 1.0);
		assert_eq!(down, -10.0);
		assert_eq!(down.abs(), config.negative_vote_amplification * up.abs());
	}

	#[test]
	fn author_self_vote_overwrites_minimal_vote() {
		let config = EngineConfig::default();
		let (board, alice, post) = board_with_post();

		let votes = vec![VoteEdge { actor: alice.clone(), target: post, vote: 5 }];
		let graph = GraphBuilder::new(&config).build(&board, &votes).unwrap();

		let from_author = graph.out_edges(&Node::Actor(alice)).unwrap();
		assert_eq!(from_author.get(&Node::Content(post)), Some(&5.0));
	}

	#[test]
	fn zero_vote_total_adds_no_edge() {
		let config = EngineConfig::default();
		let (board, alice, post) = board_with_post();

		// A voter whose ups and downs cancelled out leaves no edge; in
		// particular the author's minimal vote stays in place.
		let votes = vec![
			VoteEdge { actor: alice.clone(), target: post, vote: 0 },
			VoteEdge { actor: ActorId::new("bob"), target: post, vote: 0 },
		];
		let graph = GraphBuilder::new(&config).build(&board, &votes).unwrap();

		let from_author = graph.out_edges(&Node::Actor(alice)).unwrap();
		assert_eq!(from_author.get(&Node::Content(post)), Some(&1.0));
		assert!(graph.out_edges(&Node::Actor(ActorId::new("bob"))).is_none());
	}

	#[test]
	fn dangling_vote_fails_the_build() {
		let config = EngineConfig::default();
		let (board, _, _) = board_with_post();

		let votes =
			vec![VoteEdge { actor: ActorId::new("bob"), target: PostId::new(99), vote: 1 }];
		let result = GraphBuilder::new(&config).build(&board, &votes);

		assert!(matches!(result, Err(MeritError::DataIntegrityError(_))));
	}
}
