//! Texture-Unit Accounting
//!
//! A [`UnitMask`] tracks which texture units are claimed, sized to the
//! platform's reported unit limit rather than any host integer width. The
//! pipeline keeps one mask of init-time image reservations for its whole
//! life and clones it at the start of every frame's sampler pass; per-frame
//! claims are released implicitly by discarding the clone.

use smallvec::SmallVec;

use crate::errors::{BindError, Result};

const WORD_BITS: u32 = u64::BITS;

/// First-fit texture-unit bitmask.
///
/// Units are claimed, never released; a frame starts from a fresh clone of
/// the init-time reservations instead of freeing anything mid-frame.
#[derive(Clone, Debug, Default)]
pub struct UnitMask {
    // One inline word covers every platform with <= 64 units.
    bits: SmallVec<[u64; 1]>,
    limit: u32,
}

impl UnitMask {
    /// Creates an empty mask over `limit` allocatable units.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        let words = limit.div_ceil(WORD_BITS).max(1);
        Self {
            bits: SmallVec::from_elem(0, words as usize),
            limit,
        }
    }

    /// Number of allocatable units.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn is_used(&self, unit: u32) -> bool {
        let word = (unit / WORD_BITS) as usize;
        let bit = unit % WORD_BITS;
        self.bits
            .get(word)
            .is_some_and(|w| w & (1u64 << bit) != 0)
    }

    /// Claims and returns the lowest free unit, or `None` when every unit
    /// below the limit is taken.
    pub fn acquire(&mut self) -> Option<u32> {
        for (i, word) in self.bits.iter_mut().enumerate() {
            if *word == u64::MAX {
                continue;
            }
            let bit = word.trailing_ones();
            let unit = i as u32 * WORD_BITS + bit;
            if unit >= self.limit {
                return None;
            }
            *word |= 1u64 << bit;
            return Some(unit);
        }
        None
    }

    /// Claims a specific compiler-assigned unit. Used for image-store
    /// uniforms whose unit the compiler fixes in the shader.
    pub fn claim(&mut self, unit: u32) -> Result<()> {
        if unit >= self.limit {
            return Err(BindError::UnitExceedsLimit {
                unit,
                max: self.limit,
            });
        }
        if self.is_used(unit) {
            return Err(BindError::UnitAlreadyUsed(unit));
        }
        self.bits[(unit / WORD_BITS) as usize] |= 1u64 << (unit % WORD_BITS);
        Ok(())
    }
}
