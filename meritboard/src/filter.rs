//! # Filter Module.
//!
//! This module turns stored ranks and votes into the viewer-facing
//! ordering and visibility decisions. Posts ranked strictly below the
//! shadowban threshold are hidden from the viewer; a rank exactly at the
//! threshold stays visible. The viewer's own posts are always visible
//! regardless of rank, but are still ordered by it.

use crate::board::{ActorId, Post};

/// A post annotated with the viewer's rank and vote.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedEntry {
	/// The post.
	pub post: Post,
	/// Rank from the viewer's perspective, zero if uncomputed.
	pub rank: f64,
	/// The viewer's accumulated vote on the post.
	pub vote: i64,
}

/// One page of a filtered, ordered listing.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedPage {
	/// Entries of this page.
	pub entries: Vec<RankedEntry>,
	/// 1-based page number.
	pub page: usize,
	/// Total number of pages after filtering.
	pub total_pages: usize,
	/// Total number of visible entries after filtering.
	pub total_entries: usize,
}

/// Applies visibility, ordering, and pagination for one viewer.
pub struct ContentRankingFilter<'a> {
	viewer: &'a ActorId,
	shadowban_threshold: f64,
	page_size: usize,
}

impl<'a> ContentRankingFilter<'a> {
	/// Creates a filter for the given viewer.
	pub fn new(viewer: &'a ActorId, shadowban_threshold: f64, page_size: usize) -> Self {
		Self { viewer, shadowban_threshold, page_size }
	}

	/// Filters and orders the candidates, returning the requested 1-based
	/// page. An out-of-range page yields an empty page.
	pub fn page(&self, candidates: Vec<RankedEntry>, page: usize) -> RankedPage {
		let mut visible: Vec<RankedEntry> =
			candidates.into_iter().filter(|entry| self.is_visible(entry)).collect();

		// Rank descending, then last bump descending, then id ascending.
		// The order is total, which keeps pagination stable.
		visible.sort_by(|a, b| {
			b.rank
				.total_cmp(&a.rank)
				.then_with(|| b.post.bump.cmp(&a.post.bump))
				.then_with(|| a.post.id.cmp(&b.post.id))
		});

		let total_entries = visible.len();
		let total_pages = total_entries.div_ceil(self.page_size).max(1);

		let page = page.max(1);
		let start = (page - 1).saturating_mul(self.page_size);
		let entries: Vec<RankedEntry> =
			visible.into_iter().skip(start).take(self.page_size).collect();

		RankedPage { entries, page, total_pages, total_entries }
	}

	fn is_visible(&self, entry: &RankedEntry) -> bool {
		entry.post.creator == *self.viewer || entry.rank >= self.shadowban_threshold
	}
}
