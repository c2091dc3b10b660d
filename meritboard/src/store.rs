//! # Store Module.
//!
//! This module persists the derived rank results and the recorded votes,
//! one entry per (actor, target) pair. The `rank` field is only ever
//! written by the propagation pipeline and the `vote` field only by the
//! voting endpoint; the two never overwrite each other.

use crate::board::{ActorId, PostId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// A persisted rank/vote entry for one (actor, target) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
	/// The seed actor from whose viewpoint the rank holds.
	pub actor: ActorId,
	/// The ranked post.
	pub target: PostId,
	/// Propagated rank. Meaningful only when `computed` is set.
	pub rank: f64,
	/// Accumulated explicit vote total.
	pub vote: i64,
	/// Whether the rank field was written by the propagation pipeline.
	pub computed: bool,
}

impl RankEntry {
	fn empty(actor: ActorId, target: PostId) -> Self {
		Self { actor, target, rank: 0.0, vote: 0, computed: false }
	}
}

/// Thread-safe store of rank entries. Entries are never deleted; stale
/// ranks stay valid until superseded by the next recompute.
#[derive(Debug, Default)]
pub struct RankStore {
	entries: Mutex<BTreeMap<(ActorId, PostId), RankEntry>>,
}

impl RankStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self { entries: Mutex::new(BTreeMap::new()) }
	}

	/// Updates the rank of an entry, inserting it if absent. Never touches
	/// the vote field.
	pub fn upsert_rank(&self, actor: &ActorId, target: PostId, rank: f64) {
		let mut entries = self.lock();
		let entry = entries
			.entry((actor.clone(), target))
			.or_insert_with(|| RankEntry::empty(actor.clone(), target));
		entry.rank = rank;
		entry.computed = true;
	}

	/// Returns the computed rank of a target from the actor's viewpoint.
	/// Absent or uncomputed entries coalesce to zero, never null.
	pub fn rank(&self, actor: &ActorId, target: PostId) -> f64 {
		let entries = self.lock();
		entries
			.get(&(actor.clone(), target))
			.filter(|entry| entry.computed)
			.map_or(0.0, |entry| entry.rank)
	}

	/// Applies an additive vote update atomically and returns the new vote
	/// total. Creates the entry with a zero vote if absent. Never touches
	/// the rank field.
	pub fn apply_vote(&self, actor: &ActorId, target: PostId, delta: i64) -> i64 {
		let mut entries = self.lock();
		let entry = entries
			.entry((actor.clone(), target))
			.or_insert_with(|| RankEntry::empty(actor.clone(), target));
		entry.vote += delta;
		entry.vote
	}

	/// Returns the recorded vote total of a target for an actor.
	pub fn vote(&self, actor: &ActorId, target: PostId) -> i64 {
		let entries = self.lock();
		entries.get(&(actor.clone(), target)).map_or(0, |entry| entry.vote)
	}

	/// All (actor, target, vote) triples in key order, for the graph build.
	pub fn votes(&self) -> Vec<crate::graph::VoteEdge> {
		let entries = self.lock();
		entries
			.values()
			.map(|entry| crate::graph::VoteEdge {
				actor: entry.actor.clone(),
				target: entry.target,
				vote: entry.vote,
			})
			.collect()
	}

	/// All computed ranks of an actor in target order.
	pub fn computed_ranks(&self, actor: &ActorId) -> BTreeMap<PostId, f64> {
		let entries = self.lock();
		entries
			.values()
			.filter(|entry| entry.computed && &entry.actor == actor)
			.map(|entry| (entry.target, entry.rank))
			.collect()
	}

	/// All entries in key order, for persistence.
	pub fn entries(&self) -> Vec<RankEntry> {
		self.lock().values().cloned().collect()
	}

	/// Restores an entry from persisted state, replacing any existing one.
	pub fn restore(&self, entry: RankEntry) {
		let mut entries = self.lock();
		entries.insert((entry.actor.clone(), entry.target), entry);
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(ActorId, PostId), RankEntry>> {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids() -> (ActorId, PostId) {
		(ActorId::new("alice"), PostId::new(1))
	}

	#[test]
	fn absent_entries_coalesce_to_zero() {
		let store = RankStore::new();
		let (alice, post) = ids();

		assert_eq!(store.rank(&alice, post), 0.0);
		assert_eq!(store.vote(&alice, post), 0);
	}

	#[test]
	fn rank_upsert_never_touches_vote() {
		let store = RankStore::new();
		let (alice, post) = ids();

		store.apply_vote(&alice, post, 1);
		store.upsert_rank(&alice, post, 0.5);

		assert_eq!(store.rank(&alice, post), 0.5);
		assert_eq!(store.vote(&alice, post), 1);
	}

	#[test]
	fn vote_update_never_touches_rank() {
		let store = RankStore::new();
		let (alice, post) = ids();

		store.upsert_rank(&alice, post, 0.5);
		store.apply_vote(&alice, post, -1);
		store.apply_vote(&alice, post, -1);

		assert_eq!(store.rank(&alice, post), 0.5);
		assert_eq!(store.vote(&alice, post), -2);
	}

	#[test]
	fn uncomputed_rank_reads_as_zero() {
		let store = RankStore::new();
		let (alice, post) = ids();

		// Voting creates the entry, but the rank has not been computed yet.
		store.apply_vote(&alice, post, 1);

		assert_eq!(store.rank(&alice, post), 0.0);
		assert!(store.computed_ranks(&alice).is_empty());
	}

	#[test]
	fn computed_ranks_are_scoped_per_actor() {
		let store = RankStore::new();
		let alice = ActorId::new("alice");
		let bob = ActorId::new("bob");
		let post = PostId::new(1);

		store.upsert_rank(&alice, post, 0.7);
		store.upsert_rank(&bob, post, -0.2);

		assert_eq!(store.computed_ranks(&alice)[&post], 0.7);
		assert_eq!(store.computed_ranks(&bob)[&post], -0.2);
	}

	#[test]
	fn votes_feed_the_graph_build_in_key_order() {
		let store = RankStore::new();
		let post = PostId::new(1);

		store.apply_vote(&ActorId::new("carol"), post, -1);
		store.apply_vote(&ActorId::new("bob"), post, 1);

		let votes = store.votes();
		assert_eq!(votes.len(), 2);
		assert_eq!(votes[0].actor, ActorId::new("bob"));
		assert_eq!(votes[1].actor, ActorId::new("carol"));
	}
}
