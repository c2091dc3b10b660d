//! # Meritboard
//!
//! A personalized trust-rank engine for forum content.
//!
//! The engine builds a directed, signed-weight trust graph from authorship
//! and voting relationships, propagates a per-viewer reputation score from
//! a seed actor to every other node, caches the result with time-based
//! invalidation, persists the derived ranks, and uses them to order and
//! filter content for display.
//!
//! ## Main characteristics:
//!
//! **Personalized** - there is no global reputation; every score is
//! computed from one viewer's seat in the graph, so each viewer sees the
//! board through their own votes and the votes of those they trust.
//!
//! **Self-policing** - authorship and explicit votes are the only inputs;
//! negative votes weigh more than positive ones, so sustained bad behavior
//! sinks content below the shadowban threshold without any moderator.
//!
//! **Deterministic** - identical graph and seed always yield identical
//! scores, which keeps the cache, the persisted ranks, and the tests honest.

// Rustc
#![warn(trivial_casts)]
#![deny(
	absolute_paths_not_starting_with_crate, deprecated, future_incompatible, missing_docs,
	nonstandard_style, unreachable_code, unreachable_patterns
)]
#![forbid(unsafe_code)]
// Clippy
#![allow(clippy::tabs_in_doc_comments, clippy::new_without_default)]
#![deny(
	// Complexity
 	clippy::unnecessary_cast,
	clippy::needless_question_mark,
	clippy::clone_on_copy,
	// Pedantic
 	clippy::cast_lossless,
 	clippy::cast_possible_wrap,
	// Perf
	clippy::redundant_clone,
	// Restriction
 	clippy::panic,
	// Style
 	clippy::let_and_return,
 	clippy::needless_borrow
)]

pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod propagation;
pub mod storage;
pub mod store;

use board::{ActorId, Board, Post, PostId};
use cache::RankCache;
use config::EngineConfig;
use error::MeritError;
use filter::{ContentRankingFilter, RankedEntry, RankedPage};
use graph::{GraphBuilder, Node};
use log::{debug, info, warn};
use propagation::TrustPropagator;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use store::{RankEntry, RankStore};

/// The ranks of one seed actor at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct RankSnapshot {
	/// The seed actor.
	pub seed: ActorId,
	/// Computed rank per post, from the seed's viewpoint.
	pub ranks: BTreeMap<PostId, f64>,
	/// Set when the propagation exhausted its iteration budget; the ranks
	/// are a best-effort partial result and the next request recomputes.
	pub stale: bool,
	/// When the ranks were last computed, if ever.
	pub computed_at: Option<SystemTime>,
}

/// Which content a ranked listing covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ListScope {
	/// Top-level threads.
	Threads,
	/// Replies within one thread.
	Thread(PostId),
}

/// The trust-rank engine. Owns the content repository, the rank store, and
/// the recompute cache; all methods take `&self` and are safe to call from
/// multiple threads.
pub struct MeritEngine {
	config: EngineConfig,
	board: RwLock<Board>,
	store: RankStore,
	cache: RankCache,
}

impl MeritEngine {
	/// Creates an engine with an empty board.
	pub fn new(config: EngineConfig) -> Result<Self, MeritError> {
		config.validate()?;
		let cache = RankCache::new(config.cache_ttl(), config.force_recompute);
		Ok(Self { config, board: RwLock::new(Board::new()), store: RankStore::new(), cache })
	}

	/// Creates an engine from persisted posts and rank entries.
	pub fn restore(
		config: EngineConfig, posts: Vec<Post>, entries: Vec<RankEntry>,
	) -> Result<Self, MeritError> {
		let engine = Self::new(config)?;
		{
			let mut board = engine.board.write().unwrap_or_else(PoisonError::into_inner);
			for post in posts {
				board.restore(post);
			}
		}
		for entry in entries {
			engine.store.restore(entry);
		}
		Ok(engine)
	}

	/// Creates a new post. Replies bump their thread.
	pub fn publish(
		&self, creator: &ActorId, thread: Option<PostId>,
	) -> Result<PostId, MeritError> {
		let now = unix_now();
		let mut board = self.board.write().unwrap_or_else(PoisonError::into_inner);
		let id = board.publish(creator.clone(), thread, now)?;
		debug!("Actor {} published post {}.", creator, id);
		Ok(id)
	}

	/// Ensures the actor's ranks are fresh and returns them. Within the TTL
	/// window this is idempotent and touches neither the graph nor the
	/// store. Recomputation for the same actor is serialized; different
	/// actors recompute in parallel.
	pub fn refresh_rank(&self, actor: &ActorId) -> Result<RankSnapshot, MeritError> {
		let guard = self.cache.guard(actor);
		let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

		let now = SystemTime::now();
		if self.cache.is_fresh(actor, now) {
			return Ok(self.snapshot(actor, false));
		}

		let graph = {
			let board = self.board.read().unwrap_or_else(PoisonError::into_inner);
			GraphBuilder::new(&self.config).build(&board, &self.store.votes())?
		};
		debug!("Rebuilt trust graph with {} edges for {}.", graph.edge_count(), actor);

		let seed = Node::Actor(actor.clone());
		let propagation = TrustPropagator::new(&self.config).propagate(&graph, &seed);

		// Only actor -> content results are persisted; scores landing on
		// other actors are transient.
		for (node, score) in &propagation.scores {
			if let Node::Content(post) = node {
				self.store.upsert_rank(actor, *post, *score);
			}
		}

		if propagation.converged {
			self.cache.mark_computed(actor, now);
			info!("Recomputed ranks for {}.", actor);
		} else {
			// The partial result is stored and served, but the calc time is
			// left untouched so the next request retries.
			warn!("Serving partial ranks for {}; recompute will retry.", actor);
		}

		Ok(self.snapshot(actor, !propagation.converged))
	}

	/// The computed rank of a post from the actor's viewpoint, zero if
	/// uncomputed.
	pub fn get_rank(&self, actor: &ActorId, target: PostId) -> f64 {
		self.store.rank(actor, target)
	}

	/// Records an explicit vote and returns the new vote total. The rank is
	/// not recomputed here; it catches up at the next cache-expired refresh
	/// of the relevant seed actors.
	pub fn record_vote(
		&self, actor: &ActorId, target: PostId, delta: i64,
	) -> Result<i64, MeritError> {
		if delta != 1 && delta != -1 {
			return Err(MeritError::ValidationError(format!(
				"vote delta must be +1 or -1, got {}",
				delta
			)));
		}
		{
			let board = self.board.read().unwrap_or_else(PoisonError::into_inner);
			if !board.contains(target) {
				return Err(MeritError::NotFoundError(format!(
					"post {} does not exist",
					target
				)));
			}
		}
		let total = self.store.apply_vote(actor, target, delta);
		debug!("Actor {} voted {:+} on post {}; total {}.", actor, delta, target, total);
		Ok(total)
	}

	/// Lists content for a viewer: refreshes the viewer's ranks, hides
	/// posts below the shadowban threshold (except the viewer's own), and
	/// orders the rest by descending rank.
	pub fn list_ranked_content(
		&self, actor: &ActorId, scope: ListScope, page: usize,
	) -> Result<RankedPage, MeritError> {
		self.refresh_rank(actor)?;

		let candidates: Vec<RankedEntry> = {
			let board = self.board.read().unwrap_or_else(PoisonError::into_inner);
			let posts: Vec<Post> = match scope {
				ListScope::Threads => board.threads().cloned().collect(),
				ListScope::Thread(thread) => {
					if !board.contains(thread) {
						return Err(MeritError::NotFoundError(format!(
							"thread {} does not exist",
							thread
						)));
					}
					board.replies(thread).cloned().collect()
				},
			};
			posts
				.into_iter()
				.map(|post| RankedEntry {
					rank: self.store.rank(actor, post.id),
					vote: self.store.vote(actor, post.id),
					post,
				})
				.collect()
		};

		let filter = ContentRankingFilter::new(
			actor,
			self.config.shadowban_threshold,
			self.config.page_size,
		);
		Ok(filter.page(candidates, page))
	}

	/// All posts in id order, for persistence.
	pub fn posts(&self) -> Vec<Post> {
		let board = self.board.read().unwrap_or_else(PoisonError::into_inner);
		board.posts().cloned().collect()
	}

	/// All rank entries in key order, for persistence.
	pub fn entries(&self) -> Vec<RankEntry> {
		self.store.entries()
	}

	fn snapshot(&self, actor: &ActorId, stale: bool) -> RankSnapshot {
		RankSnapshot {
			seed: actor.clone(),
			ranks: self.store.computed_ranks(actor),
			stale,
			computed_at: self.cache.last_computed(actor),
		}
	}
}

/// Current unix time in seconds.
fn unix_now() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
