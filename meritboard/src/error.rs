//! # Error Module.
//!
//! This module features the `MeritError` enum for error handling throughout the project.

use thiserror::Error;

/// The crate-wide error variants.
#[derive(Debug, Error)]
pub enum MeritError {
	/// Configuration error
	#[error("ConfigurationError: {0}")]
	ConfigurationError(String),

	/// Referential integrity violation in the trust graph source data
	#[error("DataIntegrityError: {0}")]
	DataIntegrityError(String),

	/// File read/write error
	#[error("FileIOError: {0}")]
	FileIOError(String),

	/// Input/output error
	#[error("IOError: {0}")]
	IOError(std::io::Error),

	/// Referenced entity does not exist
	#[error("NotFoundError: {0}")]
	NotFoundError(String),

	/// Parsing error
	#[error("ParsingError: {0}")]
	ParsingError(String),

	/// Validation error
	#[error("ValidationError: {0}")]
	ValidationError(String),
}
