//! # Cache Module.
//!
//! This module gates rank recomputation. Each actor carries a
//! last-computed timestamp; a snapshot is fresh until the TTL elapses,
//! unless the debug-force flag bypasses the check. Recomputation for the
//! same actor is serialized through a per-actor lock while different
//! actors proceed independently.

use crate::board::ActorId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

/// TTL gate and per-actor recompute serialization.
#[derive(Debug)]
pub struct RankCache {
	ttl: Duration,
	force_recompute: bool,
	calc_times: Mutex<HashMap<ActorId, SystemTime>>,
	locks: Mutex<HashMap<ActorId, Arc<Mutex<()>>>>,
}

impl RankCache {
	/// Creates a cache with the given TTL and debug-force flag.
	pub fn new(ttl: Duration, force_recompute: bool) -> Self {
		Self {
			ttl,
			force_recompute,
			calc_times: Mutex::new(HashMap::new()),
			locks: Mutex::new(HashMap::new()),
		}
	}

	/// Whether the actor's snapshot is still fresh at `now`. A missing
	/// record, a clock running backwards, or the force flag all count as a
	/// cache miss.
	pub fn is_fresh(&self, actor: &ActorId, now: SystemTime) -> bool {
		if self.force_recompute {
			return false;
		}
		let calc_times = self.calc_times.lock().unwrap_or_else(PoisonError::into_inner);
		match calc_times.get(actor) {
			Some(last) => match now.duration_since(*last) {
				Ok(elapsed) => elapsed < self.ttl,
				Err(_) => false,
			},
			None => false,
		}
	}

	/// Records a completed recomputation for the actor.
	pub fn mark_computed(&self, actor: &ActorId, now: SystemTime) {
		let mut calc_times = self.calc_times.lock().unwrap_or_else(PoisonError::into_inner);
		calc_times.insert(actor.clone(), now);
	}

	/// Last-computed timestamp for the actor, if any.
	pub fn last_computed(&self, actor: &ActorId) -> Option<SystemTime> {
		let calc_times = self.calc_times.lock().unwrap_or_else(PoisonError::into_inner);
		calc_times.get(actor).copied()
	}

	/// Returns the lock serializing recomputation for this actor. Callers
	/// hold it across the freshness check and the recompute.
	pub fn guard(&self, actor: &ActorId) -> Arc<Mutex<()>> {
		let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
		locks.entry(actor.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_record_is_a_miss() {
		let cache = RankCache::new(Duration::from_secs(3600), false);
		assert!(!cache.is_fresh(&ActorId::new("alice"), SystemTime::now()));
	}

	#[test]
	fn record_within_ttl_is_fresh() {
		let cache = RankCache::new(Duration::from_secs(3600), false);
		let alice = ActorId::new("alice");
		let now = SystemTime::now();

		cache.mark_computed(&alice, now);

		assert!(cache.is_fresh(&alice, now + Duration::from_secs(10)));
		assert!(!cache.is_fresh(&alice, now + Duration::from_secs(3600)));
	}

	#[test]
	fn force_flag_bypasses_ttl() {
		let cache = RankCache::new(Duration::from_secs(3600), true);
		let alice = ActorId::new("alice");
		let now = SystemTime::now();

		cache.mark_computed(&alice, now);

		assert!(!cache.is_fresh(&alice, now));
	}

	#[test]
	fn backwards_clock_is_a_miss() {
		let cache = RankCache::new(Duration::from_secs(3600), false);
		let alice = ActorId::new("alice");
		let now = SystemTime::now();

		cache.mark_computed(&alice, now);

		assert!(!cache.is_fresh(&alice, now - Duration::from_secs(1)));
	}

	#[test]
	fn guard_is_shared_per_actor() {
		let cache = RankCache::new(Duration::from_secs(3600), false);
		let alice = ActorId::new("alice");
		let bob = ActorId::new("bob");

		let first = cache.guard(&alice);
		let second = cache.guard(&alice);
		let other = cache.guard(&bob);

		assert!(Arc::ptr_eq(&first, &second));
		assert!(!Arc::ptr_eq(&first, &other));
	}
}
