//! Utilities and other miscellaneous things.

use std::ops::{Deref, DerefMut};

use turborand::rng::AtomicRng;
use turborand::SeededCore;
pub use turborand::TurboRand;

/// Random number generator handle
///
/// Wraps an atomic RNG so a single instance can be handed around freely;
/// all randomness in the crate flows through this type so that a seed
/// fully determines the outcome.
#[derive(Debug)]
pub struct Rand(AtomicRng);

impl Rand {
	#[allow(clippy::new_without_default)]
	#[must_use]
	pub fn new() -> Self {
		Self(AtomicRng::new())
	}

	/// Create a generator from a 32-bit signed seed
	///
	/// The same seed always produces the same value sequence.
	#[must_use]
	pub fn with_seed(seed: i32) -> Self {
		Self(AtomicRng::with_seed(u64::from(seed as u32)))
	}

	pub const fn from_rng(rng: AtomicRng) -> Self {
		Self(rng)
	}
}

impl Deref for Rand {
	type Target = AtomicRng;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Rand {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}
