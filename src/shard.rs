//! Partitioning of the candidate space and per-shard enumeration.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SearchConfig;

/// Independently enumerable slice of the search space: every candidate with a
/// fixed prefix, suffix, body length and first body character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub body_len: usize,
    pub first: char,
}

/// Yields shards ordered by prefix, then suffix, then body length, then first character.
///
/// The iterator is lazy; workers pull from it as they become free.
pub fn shards<'a>(
    config: &'a SearchConfig,
    charset: &'a [char],
) -> impl Iterator<Item = Shard<'a>> + Send + 'a {
    let lengths = config.min_len..=config.max_len;
    config.prefixes.iter().flat_map(move |prefix| {
        let lengths = lengths.clone();
        config.suffixes.iter().flat_map(move |suffix| {
            lengths.clone().flat_map(move |body_len| {
                charset.iter().map(move |&first| Shard {
                    prefix,
                    suffix,
                    body_len,
                    first,
                })
            })
        })
    })
}

/// Number of shards [`shards`] yields, saturating at `usize::MAX`.
pub fn shard_count(config: &SearchConfig, charset: &[char]) -> usize {
    let lengths = config
        .max_len
        .checked_sub(config.min_len)
        .map_or(0, |span| span.saturating_add(1));
    config
        .prefixes
        .len()
        .saturating_mul(config.suffixes.len())
        .saturating_mul(lengths)
        .saturating_mul(charset.len())
}

impl Shard<'_> {
    /// Visits every candidate of this shard, right-most body position changing fastest.
    ///
    /// `found` is polled on entry to every position and before every visit;
    /// once it reads true, or `visit` breaks, enumeration stops.
    pub fn for_each_candidate<F>(&self, charset: &[char], found: &AtomicBool, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let mut body = vec![self.first; self.body_len];
        let mut candidate =
            String::with_capacity(self.prefix.len() + self.suffix.len() + self.body_len * 4);
        self.descend(&mut body, 1, charset, found, &mut candidate, &mut visit)
    }

    fn descend<F>(
        &self,
        body: &mut [char],
        index: usize,
        charset: &[char],
        found: &AtomicBool,
        candidate: &mut String,
        visit: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        if found.load(Ordering::Acquire) {
            return ControlFlow::Break(());
        }

        if index >= body.len() {
            candidate.clear();
            candidate.push_str(self.prefix);
            candidate.extend(body.iter());
            candidate.push_str(self.suffix);
            return visit(candidate.as_str());
        }

        for &ch in charset {
            body[index] = ch;
            self.descend(body, index + 1, charset, found, candidate, visit)?;
        }
        ControlFlow::Continue(())
    }
}
