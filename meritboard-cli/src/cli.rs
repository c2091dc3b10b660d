//! # CLI Module.
//!
//! This module contains all CLI related data handling and conversions.

use crate::fs::{load_entries, load_posts, save_config, save_entries, save_posts, save_scores};
use clap::{Args, Parser, Subcommand};
use log::info;
use meritboard::{
	board::{ActorId, PostId},
	config::EngineConfig,
	error::MeritError,
	storage::ScoreRecord,
	ListScope, MeritEngine,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Mode {
	/// List ranked content from a seed actor's viewpoint. Requires 'ListData'.
	List(ListData),
	/// Create a new post or reply. Requires 'PostData'.
	Post(PostData),
	/// Calculate the personalized scores for a seed actor. Requires 'ScoresData'.
	Scores(ScoresData),
	/// Display the current configuration.
	Show,
	/// Update the configuration. Requires 'UpdateData'.
	Update(UpdateData),
	/// Record a vote on a post. Requires 'VoteData'.
	Vote(VoteData),
}

/// Listing subcommand input.
#[derive(Args, Debug)]
pub struct ListData {
	/// Seed actor identity.
	#[clap(long = "seed")]
	seed: Option<String>,
	/// Thread to list replies of; top-level threads when omitted.
	#[clap(long = "thread")]
	thread: Option<u64>,
	/// 1-based page number.
	#[clap(long = "page")]
	page: Option<usize>,
}

/// Posting subcommand input.
#[derive(Args, Debug)]
pub struct PostData {
	/// Creating actor identity.
	#[clap(long = "creator")]
	creator: Option<String>,
	/// Thread to reply to; a new thread when omitted.
	#[clap(long = "thread")]
	thread: Option<u64>,
}

/// Scores subcommand input.
#[derive(Args, Debug)]
pub struct ScoresData {
	/// Seed actor identity.
	#[clap(long = "seed")]
	seed: Option<String>,
}

/// Voting subcommand input.
#[derive(Args, Debug)]
pub struct VoteData {
	/// Voting actor identity.
	#[clap(long = "actor")]
	actor: Option<String>,
	/// Voted post id.
	#[clap(long = "post")]
	post: Option<u64>,
	/// Vote delta, +1 or -1.
	#[clap(long = "delta", allow_hyphen_values = true)]
	delta: Option<i64>,
}

/// Configuration update subcommand input.
#[derive(Args, Debug)]
pub struct UpdateData {
	/// Weight of the post -> creator edge.
	#[clap(long = "post-weight")]
	post_to_creator_weight: Option<f64>,
	/// Minimal author vote on their own post.
	#[clap(long = "author-vote")]
	minimal_author_vote: Option<f64>,
	/// Negative vote amplification coefficient.
	#[clap(long = "amplification")]
	negative_vote_amplification: Option<f64>,
	/// Shadowban threshold.
	#[clap(long = "shadowban", allow_hyphen_values = true)]
	shadowban_threshold: Option<f64>,
	/// Cache TTL in seconds.
	#[clap(long = "ttl")]
	cache_ttl_secs: Option<u64>,
	/// Bypass the cache TTL unconditionally.
	#[clap(long = "force-recompute")]
	force_recompute: Option<bool>,
}

/// Loads the persisted board and entries into an engine.
fn load_engine(config: EngineConfig) -> Result<MeritEngine, MeritError> {
	MeritEngine::restore(config, load_posts()?, load_entries()?)
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, MeritError> {
	value.ok_or_else(|| MeritError::ValidationError(format!("Missing {}", name)))
}

/// Handle the `list` command.
pub fn handle_list(config: EngineConfig, data: ListData) -> Result<(), MeritError> {
	let seed = ActorId::new(required(data.seed, "seed")?);
	let scope = match data.thread {
		Some(thread) => ListScope::Thread(PostId::new(thread)),
		None => ListScope::Threads,
	};
	let page = data.page.unwrap_or(1);

	let engine = load_engine(config)?;
	let listing = engine.list_ranked_content(&seed, scope, page)?;

	info!(
		"Page {}/{} ({} visible posts):",
		listing.page, listing.total_pages, listing.total_entries
	);
	for entry in &listing.entries {
		info!(
			"#{} by {} rank {:.6} vote {:+}",
			entry.post.id, entry.post.creator, entry.rank, entry.vote
		);
	}

	save_entries(engine.entries())
}

/// Handle the `post` command.
pub fn handle_post(config: EngineConfig, data: PostData) -> Result<(), MeritError> {
	let creator = ActorId::new(required(data.creator, "creator")?);
	let thread = data.thread.map(PostId::new);

	let engine = load_engine(config)?;
	let id = engine.publish(&creator, thread)?;

	save_posts(engine.posts())?;
	info!("Created post {}.", id);

	Ok(())
}

/// Handle the `scores` command.
pub fn handle_scores(config: EngineConfig, data: ScoresData) -> Result<(), MeritError> {
	let seed = ActorId::new(required(data.seed, "seed")?);

	let engine = load_engine(config)?;
	let snapshot = engine.refresh_rank(&seed)?;
	let records = ScoreRecord::from_snapshot(&snapshot);

	let storage = save_scores(records)?;
	save_entries(engine.entries())?;

	info!("Scores saved at \"{}\".", storage.filepath().display());

	Ok(())
}

/// Handle the `vote` command.
pub fn handle_vote(config: EngineConfig, data: VoteData) -> Result<(), MeritError> {
	let actor = ActorId::new(required(data.actor, "actor")?);
	let post = PostId::new(required(data.post, "post")?);
	let delta = required(data.delta, "delta")?;

	let engine = load_engine(config)?;
	let total = engine.record_vote(&actor, post, delta)?;

	save_entries(engine.entries())?;
	info!("Vote recorded; new total for post {} is {:+}.", post, total);

	Ok(())
}

/// Handle the `update` command.
pub fn handle_update(config: &mut EngineConfig, data: UpdateData) -> Result<(), MeritError> {
	if let Some(weight) = data.post_to_creator_weight {
		config.post_to_creator_weight = weight;
	}
	if let Some(vote) = data.minimal_author_vote {
		config.minimal_author_vote = vote;
	}
	if let Some(amplification) = data.negative_vote_amplification {
		config.negative_vote_amplification = amplification;
	}
	if let Some(threshold) = data.shadowban_threshold {
		config.shadowban_threshold = threshold;
	}
	if let Some(ttl) = data.cache_ttl_secs {
		config.cache_ttl_secs = ttl;
	}
	if let Some(force) = data.force_recompute {
		config.force_recompute = force;
	}
	config.validate()?;

	save_config(config.clone())?;
	info!("Configuration updated.");

	Ok(())
}
