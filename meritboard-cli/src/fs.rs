//! # Filesystem Actions Module.
//!
//! This module provides functionalities for filesystem actions.

use log::warn;
use meritboard::{
	board::Post,
	config::EngineConfig,
	error::MeritError,
	storage::{CSVFileStorage, JSONFileStorage, ScoreRecord, Storage},
	store::RankEntry,
};
use std::{env::current_dir, path::PathBuf};

/// Engine configuration file name.
pub const CONFIG_FILENAME: &str = "config";
/// Board posts file name.
pub const POSTS_FILENAME: &str = "posts";
/// Rank/vote entries file name.
pub const RATINGS_FILENAME: &str = "ratings";
/// Computed scores file name.
pub const SCORES_FILENAME: &str = "scores";

/// Enum representing the possible file extensions.
pub enum FileType {
	/// CSV file.
	Csv,
	/// JSON file.
	Json,
}

impl FileType {
	/// Converts the enum variant into its corresponding file extension.
	fn as_str(&self) -> &'static str {
		match self {
			FileType::Csv => "csv",
			FileType::Json => "json",
		}
	}
}

/// Retrieves the path to the `assets` directory.
pub fn get_assets_path() -> Result<PathBuf, MeritError> {
	current_dir().map_err(MeritError::IOError).map(|current_dir| current_dir.join("assets"))
}

/// Helper function to get the path of a file in the `assets` directory.
pub fn get_file_path(file_name: &str, file_type: FileType) -> Result<PathBuf, MeritError> {
	let assets_path = get_assets_path()?;
	Ok(assets_path.join(format!("{}.{}", file_name, file_type.as_str())))
}

/// Loads the configuration file, falling back to defaults when missing.
pub fn load_config() -> Result<EngineConfig, MeritError> {
	let filepath = get_file_path(CONFIG_FILENAME, FileType::Json)?;
	if !filepath.exists() {
		warn!("No configuration file found. Using defaults.");
		return Ok(EngineConfig::default());
	}
	JSONFileStorage::<EngineConfig>::new(filepath).load()
}

/// Saves the configuration file.
pub fn save_config(config: EngineConfig) -> Result<(), MeritError> {
	let filepath = get_file_path(CONFIG_FILENAME, FileType::Json)?;
	JSONFileStorage::<EngineConfig>::new(filepath).save(config)
}

/// Loads the persisted posts, or an empty board when the file is missing.
pub fn load_posts() -> Result<Vec<Post>, MeritError> {
	let filepath = get_file_path(POSTS_FILENAME, FileType::Csv)?;
	if !filepath.exists() {
		warn!("No posts file found. Starting with an empty board.");
		return Ok(Vec::new());
	}
	CSVFileStorage::<Post>::new(filepath).load()
}

/// Saves the board posts.
pub fn save_posts(posts: Vec<Post>) -> Result<(), MeritError> {
	let filepath = get_file_path(POSTS_FILENAME, FileType::Csv)?;
	CSVFileStorage::<Post>::new(filepath).save(posts)
}

/// Loads the persisted rank/vote entries, or none when the file is missing.
pub fn load_entries() -> Result<Vec<RankEntry>, MeritError> {
	let filepath = get_file_path(RATINGS_FILENAME, FileType::Csv)?;
	if !filepath.exists() {
		return Ok(Vec::new());
	}
	CSVFileStorage::<RankEntry>::new(filepath).load()
}

/// Saves the rank/vote entries.
pub fn save_entries(entries: Vec<RankEntry>) -> Result<(), MeritError> {
	let filepath = get_file_path(RATINGS_FILENAME, FileType::Csv)?;
	CSVFileStorage::<RankEntry>::new(filepath).save(entries)
}

/// Saves computed scores and returns the storage for path reporting.
pub fn save_scores(records: Vec<ScoreRecord>) -> Result<CSVFileStorage<ScoreRecord>, MeritError> {
	let filepath = get_file_path(SCORES_FILENAME, FileType::Csv)?;
	let mut storage = CSVFileStorage::<ScoreRecord>::new(filepath);
	storage.save(records)?;
	Ok(storage)
}
