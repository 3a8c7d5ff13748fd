//! Size of the candidate space.

/// Total number of candidates, saturated at `u64::MAX` when the product overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSpace {
    pub total: u64,
    pub overflowed: bool,
}

impl SearchSpace {
    /// `|prefixes| * |suffixes| * sum(|charset|^L)` for `L` in `min_len..=max_len`.
    pub fn compute(
        prefixes: usize,
        suffixes: usize,
        charset_len: usize,
        min_len: usize,
        max_len: usize,
    ) -> Self {
        match checked_total(prefixes, suffixes, charset_len, min_len, max_len) {
            Some(total) => Self {
                total,
                overflowed: false,
            },
            None => Self {
                total: u64::MAX,
                overflowed: true,
            },
        }
    }
}

fn checked_total(
    prefixes: usize,
    suffixes: usize,
    charset_len: usize,
    min_len: usize,
    max_len: usize,
) -> Option<u64> {
    let base = u64::try_from(charset_len).ok()?;
    let mut bodies: u64 = 0;
    for len in min_len..=max_len {
        let combos = base.checked_pow(u32::try_from(len).ok()?)?;
        bodies = bodies.checked_add(combos)?;
    }
    u64::try_from(prefixes)
        .ok()?
        .checked_mul(u64::try_from(suffixes).ok()?)?
        .checked_mul(bodies)
}
