//! # Board Module.
//!
//! This module contains the content identities and the in-memory content
//! repository. Actors are opaque identifiers handed in by the surrounding
//! application; posts are created here and referenced everywhere else.

use crate::error::MeritError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque actor identity. Created implicitly on first interaction and
/// independent of any session mechanism.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
	/// Creates a new actor identity from an opaque string.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Content identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
	/// Creates a new post identifier.
	pub fn new(id: u64) -> Self {
		Self(id)
	}

	/// Returns the raw identifier.
	pub fn value(&self) -> u64 {
		self.0
	}
}

impl fmt::Display for PostId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A post or thread. A post with no parent thread is itself a thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
	/// Content identifier.
	pub id: PostId,
	/// The actor who created the post.
	pub creator: ActorId,
	/// Parent thread, if this post is a reply.
	pub thread: Option<PostId>,
	/// Creation time, unix seconds.
	pub created: u64,
	/// Last-bump time, unix seconds. Replying to a thread bumps it.
	pub bump: u64,
}

/// In-memory content repository.
#[derive(Debug)]
pub struct Board {
	posts: BTreeMap<PostId, Post>,
	next_id: u64,
}

impl Board {
	/// Creates an empty board.
	pub fn new() -> Self {
		Self { posts: BTreeMap::new(), next_id: 1 }
	}

	/// Creates a new post. Replies must reference an existing thread, which
	/// gets bumped to `now`.
	pub fn publish(
		&mut self, creator: ActorId, thread: Option<PostId>, now: u64,
	) -> Result<PostId, MeritError> {
		if let Some(thread_id) = thread {
			let parent = self.posts.get_mut(&thread_id).ok_or_else(|| {
				MeritError::NotFoundError(format!("thread {} does not exist", thread_id))
			})?;
			parent.bump = now;
		}

		let id = PostId::new(self.next_id);
		self.next_id += 1;
		self.posts.insert(id, Post { id, creator, thread, created: now, bump: now });

		Ok(id)
	}

	/// Restores a post from persisted state, keeping id allocation ahead of
	/// the highest seen identifier.
	pub fn restore(&mut self, post: Post) {
		self.next_id = self.next_id.max(post.id.value() + 1);
		self.posts.insert(post.id, post);
	}

	/// Returns the post with the given id.
	pub fn get(&self, id: PostId) -> Option<&Post> {
		self.posts.get(&id)
	}

	/// Whether a post with the given id exists.
	pub fn contains(&self, id: PostId) -> bool {
		self.posts.contains_key(&id)
	}

	/// Iterates over all posts in id order.
	pub fn posts(&self) -> impl Iterator<Item = &Post> {
		self.posts.values()
	}

	/// Iterates over top-level threads in id order.
	pub fn threads(&self) -> impl Iterator<Item = &Post> {
		self.posts.values().filter(|post| post.thread.is_none())
	}

	/// Iterates over the replies of a thread in id order.
	pub fn replies(&self, thread: PostId) -> impl Iterator<Item = &Post> + '_ {
		self.posts.values().filter(move |post| post.thread == Some(thread))
	}

	/// Number of posts on the board.
	pub fn len(&self) -> usize {
		self.posts.len()
	}

	/// Whether the board holds no posts.
	pub fn is_empty(&self) -> bool {
		self.posts.is_empty()
	}
}
