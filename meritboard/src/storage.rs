//! # Storage Module.
//!
//! This module contains generic storage traits and implementations used to
//! persist board state, rank entries, and score exports.

use crate::{
	board::{ActorId, PostId},
	error::MeritError,
	RankSnapshot,
};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{from_reader, to_string_pretty};
use std::fs::File;
use std::io::{BufReader, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

/// The main trait to be implemented by different storage types.
pub trait Storage<T> {
	/// The error type.
	type Err;

	/// Loads data from storage.
	fn load(&self) -> Result<T, Self::Err>;
	/// Saves data to storage.
	fn save(&mut self, data: T) -> Result<(), Self::Err>;
}

/// The `CSVFileStorage` struct provides a mechanism for persisting
/// and retrieving structured data to and from CSV files.
pub struct CSVFileStorage<T> {
	filepath: PathBuf,
	phantom: PhantomData<T>,
}

impl<T> CSVFileStorage<T> {
	/// Creates a new CSVFileStorage.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, phantom: PhantomData }
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}
}

impl<T: Serialize + DeserializeOwned + Clone> Storage<Vec<T>> for CSVFileStorage<T> {
	type Err = MeritError;

	fn load(&self) -> Result<Vec<T>, MeritError> {
		let file = File::open(&self.filepath).map_err(MeritError::IOError)?;
		let mut reader = ReaderBuilder::new().from_reader(BufReader::new(file));

		reader
			.deserialize()
			.map(|result| result.map_err(|e| MeritError::FileIOError(e.to_string())))
			.collect()
	}

	fn save(&mut self, data: Vec<T>) -> Result<(), MeritError> {
		let mut writer = WriterBuilder::new()
			.from_path(&self.filepath)
			.map_err(|e| MeritError::FileIOError(e.to_string()))?;

		for record in &data {
			writer.serialize(record).map_err(|e| MeritError::FileIOError(e.to_string()))?;
		}

		writer.flush().map_err(|e| MeritError::FileIOError(e.to_string()))?;

		Ok(())
	}
}

/// The `JSONFileStorage` struct provides a mechanism for persisting
/// and retrieving structured data to and from JSON files.
pub struct JSONFileStorage<T> {
	filepath: PathBuf,
	phantom: PhantomData<T>,
}

impl<T> JSONFileStorage<T> {
	/// Creates a new JSONFileStorage.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, phantom: PhantomData }
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}
}

impl<T: Serialize + DeserializeOwned + Clone> Storage<T> for JSONFileStorage<T> {
	type Err = MeritError;

	fn load(&self) -> Result<T, Self::Err> {
		let file = File::open(&self.filepath).map_err(MeritError::IOError)?;
		let reader = BufReader::new(file);
		from_reader(reader).map_err(|e| MeritError::ParsingError(e.to_string()))
	}

	fn save(&mut self, data: T) -> Result<(), Self::Err> {
		let json_str =
			to_string_pretty(&data).map_err(|e| MeritError::ParsingError(e.to_string()))?;

		let mut file = File::create(&self.filepath).map_err(MeritError::IOError)?;
		file.write_all(json_str.as_bytes()).map_err(MeritError::IOError)
	}
}

/// Score record, the CSV export of one computed rank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreRecord {
	/// The seed actor from whose viewpoint the rank holds.
	seed: ActorId,
	/// The ranked post.
	post: PostId,
	/// Propagated rank.
	rank: f64,
	/// Whether the snapshot was flagged stale (budget-exhausted).
	stale: bool,
}

impl ScoreRecord {
	/// Creates a new score record.
	pub fn new(seed: ActorId, post: PostId, rank: f64, stale: bool) -> Self {
		Self { seed, post, rank, stale }
	}

	/// Flattens a rank snapshot into score records.
	pub fn from_snapshot(snapshot: &RankSnapshot) -> Vec<Self> {
		snapshot
			.ranks
			.iter()
			.map(|(post, rank)| {
				Self::new(snapshot.seed.clone(), *post, *rank, snapshot.stale)
			})
			.collect()
	}

	/// Returns the seed actor.
	pub fn seed(&self) -> &ActorId {
		&self.seed
	}

	/// Returns the ranked post.
	pub fn post(&self) -> PostId {
		self.post
	}

	/// Returns the rank.
	pub fn rank(&self) -> f64 {
		self.rank
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::Post;
	use std::{env::temp_dir, fs};

	#[test]
	fn csv_storage_roundtrips_posts() {
		let filepath = temp_dir().join("meritboard_posts_test.csv");
		let mut storage = CSVFileStorage::<Post>::new(filepath.clone());

		let content = vec![
			Post {
				id: PostId::new(1),
				creator: ActorId::new("alice"),
				thread: None,
				created: 100,
				bump: 120,
			},
			Post {
				id: PostId::new(2),
				creator: ActorId::new("bob"),
				thread: Some(PostId::new(1)),
				created: 120,
				bump: 120,
			},
		];

		assert!(storage.save(content.clone()).is_ok());

		let loaded = storage.load().unwrap();
		assert_eq!(loaded, content);

		fs::remove_file(filepath).unwrap();
	}

	#[test]
	fn csv_storage_roundtrips_score_records() {
		let filepath = temp_dir().join("meritboard_scores_test.csv");
		let mut storage = CSVFileStorage::<ScoreRecord>::new(filepath.clone());

		let content =
			vec![ScoreRecord::new(ActorId::new("alice"), PostId::new(1), 0.5, false)];

		assert!(storage.save(content).is_ok());

		let loaded = storage.load().unwrap();
		assert_eq!(loaded.len(), 1);
		assert_eq!(loaded[0].seed(), &ActorId::new("alice"));
		assert_eq!(loaded[0].post(), PostId::new(1));
		assert_eq!(loaded[0].rank(), 0.5);

		fs::remove_file(filepath).unwrap();
	}

	#[test]
	fn json_storage_roundtrips_config() {
		use crate::config::EngineConfig;

		let filepath = temp_dir().join("meritboard_config_test.json");
		let mut storage = JSONFileStorage::<EngineConfig>::new(filepath.clone());

		let config = EngineConfig { shadowban_threshold: -0.5, ..Default::default() };
		assert!(storage.save(config.clone()).is_ok());

		let loaded = storage.load().unwrap();
		assert_eq!(loaded, config);

		fs::remove_file(filepath).unwrap();
	}
}
