//! # Meritboard CLI
//!
//! This crate provides a CLI interface to use the `meritboard` library.

#![warn(trivial_casts)]
#![deny(
	absolute_paths_not_starting_with_crate, deprecated, future_incompatible, missing_docs,
	nonstandard_style, unreachable_code, unreachable_patterns
)]
#![forbid(unsafe_code)]
#![deny(
	// Complexity
 	clippy::unnecessary_cast,
	clippy::needless_question_mark,
	// Perf
	clippy::redundant_clone,
	// Restriction
 	clippy::panic,
	// Style
 	clippy::let_and_return,
 	clippy::needless_borrow
)]

mod cli;
mod fs;

use clap::Parser;
use cli::*;
use dotenv::dotenv;
use env_logger::{init_from_env, Env};
use fs::load_config;
use log::info;
use meritboard::{config::EngineConfig, error::MeritError};

fn main() -> Result<(), MeritError> {
	dotenv().ok();
	init_from_env(Env::default().filter_or("LOG_LEVEL", "info"));
	let mut config: EngineConfig = load_config()?;

	match Cli::parse().mode {
		Mode::List(list_data) => handle_list(config, list_data)?,
		Mode::Post(post_data) => handle_post(config, post_data)?,
		Mode::Scores(scores_data) => handle_scores(config, scores_data)?,
		Mode::Show => info!("Engine config:\n{:#?}", config),
		Mode::Update(update_data) => handle_update(&mut config, update_data)?,
		Mode::Vote(vote_data) => handle_vote(config, vote_data)?,
	};

	Ok(())
}
