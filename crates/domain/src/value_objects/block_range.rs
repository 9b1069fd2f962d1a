use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive span of blocks queried in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    pub fn block_count(&self) -> u64 {
        self.to - self.from + 1
    }

    pub fn contains(&self, block: u64) -> bool {
        block >= self.from && block <= self.to
    }

    /// Sub-ranges of the lookback window ending at `head`.
    ///
    /// The window starts at `head - lookback` (floored at genesis) and is split
    /// into `step`-sized pieces. The final piece absorbs the head block, so a
    /// head of 230_000 with a 200_000 lookback and 50_000 step yields
    /// `[30000, 79999] .. [180000, 230000]`.
    pub fn lookback_window(head: u64, lookback: u64, step: u64) -> Vec<BlockRange> {
        Self::split(head.saturating_sub(lookback), head, step)
    }

    /// Splits `[from, to]` into consecutive pieces of `step` blocks. A tail
    /// of exactly one block is merged into the previous piece.
    pub fn split(from: u64, to: u64, step: u64) -> Vec<BlockRange> {
        if from > to {
            return Vec::new();
        }
        let step = step.max(1);

        let mut ranges = Vec::new();
        let mut start = from;
        loop {
            let end = if to - start <= step {
                to
            } else {
                start + step - 1
            };
            ranges.push(BlockRange::new(start, end));
            if end == to {
                break;
            }
            start = end + 1;
        }
        ranges
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}
