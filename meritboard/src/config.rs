//! # Configuration Module.
//!
//! This module contains the engine tunables. Every parameter that shapes the
//! trust graph, the propagation, or the content filter is explicit here so
//! that test suites can run the engine under arbitrary settings.

use crate::error::MeritError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
	/// Weight of the single outgoing edge from a post into its creator.
	/// Since a post has exactly one outgoing edge, the magnitude does not
	/// affect the proportional split; a recognizable value helps debugging.
	pub post_to_creator_weight: f64,
	/// The minimal amount of vote an author gives a post by creating it.
	/// An explicit vote by the author on their own post replaces it.
	pub minimal_author_vote: f64,
	/// How much more a negative vote weighs than a positive one.
	/// Must be greater than 1.
	pub negative_vote_amplification: f64,
	/// Posts ranked strictly below this value are hidden from the viewer,
	/// except the viewer's own posts.
	pub shadowban_threshold: f64,
	/// Seconds a computed rank snapshot stays fresh for its seed actor.
	pub cache_ttl_secs: u64,
	/// Fraction of mass that keeps flowing after being deposited at a node.
	/// Must be in (0, 1) so the propagation contracts.
	pub damping: f64,
	/// Circulating-mass threshold below which the propagation is converged.
	pub tolerance: f64,
	/// Hard iteration budget for the propagation. Exceeding it yields a
	/// partial result flagged as stale.
	pub max_iterations: usize,
	/// Number of entries per page in ranked listings.
	pub page_size: usize,
	/// Bypasses the cache TTL unconditionally. Used for tuning and tests.
	pub force_recompute: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			post_to_creator_weight: 77777.0,
			minimal_author_vote: 1.0,
			negative_vote_amplification: 10.0,
			shadowban_threshold: -0.01,
			cache_ttl_secs: 3600,
			damping: 0.85,
			tolerance: 1e-6,
			max_iterations: 100,
			page_size: 10,
			force_recompute: false,
		}
	}
}

impl EngineConfig {
	/// Checks the configuration for values the engine cannot run under.
	pub fn validate(&self) -> Result<(), MeritError> {
		if self.negative_vote_amplification <= 1.0 {
			return Err(MeritError::ConfigurationError(
				"negative_vote_amplification must be greater than 1".to_string(),
			));
		}
		if !(self.damping > 0.0 && self.damping < 1.0) {
			return Err(MeritError::ConfigurationError(
				"damping must be strictly between 0 and 1".to_string(),
			));
		}
		if self.max_iterations == 0 {
			return Err(MeritError::ConfigurationError(
				"max_iterations must be at least 1".to_string(),
			));
		}
		if self.page_size == 0 {
			return Err(MeritError::ConfigurationError(
				"page_size must be at least 1".to_string(),
			));
		}
		Ok(())
	}

	/// Returns the cache TTL as a `Duration`.
	pub fn cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_ttl_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_valid() {
		let config = EngineConfig::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.post_to_creator_weight, 77777.0);
		assert_eq!(config.minimal_author_vote, 1.0);
		assert_eq!(config.negative_vote_amplification, 10.0);
		assert_eq!(config.shadowban_threshold, -0.01);
		assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
	}

	#[test]
	fn rejects_weak_amplification() {
		let config = EngineConfig { negative_vote_amplification: 1.0, ..Default::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn rejects_non_contracting_damping() {
		let config = EngineConfig { damping: 1.0, ..Default::default() };
		assert!(config.validate().is_err());

		let config = EngineConfig { damping: 0.0, ..Default::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn rejects_zero_budgets() {
		let config = EngineConfig { max_iterations: 0, ..Default::default() };
		assert!(config.validate().is_err());

		let config = EngineConfig { page_size: 0, ..Default::default() };
		assert!(config.validate().is_err());
	}
}
