//! Deterministic charset permutation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Returns the character order the search enumerates.
///
/// With `scramble` set the input is shuffled by a ChaCha8 stream seeded with
/// `seed`, which yields the same permutation on every platform. This spreads
/// likely characters across shards instead of queueing them together.
pub fn effective_charset(chars: &[char], scramble: bool, seed: u64) -> Vec<char> {
    let mut charset = chars.to_vec();
    if scramble {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        charset.shuffle(&mut rng);
    }
    charset
}
