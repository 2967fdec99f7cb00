/// Buffered hardware random words.
///
/// The hardware generator produces a whole block of words per call, which is
/// slow. `RandomWordCache` keeps one block and hands it out a word at a time,
/// refilling only when the block is used up.
///
/// On a generator fault `next()` returns `0` instead of failing: the
/// cryptographic self-test must keep reporting even if the generator breaks.
/// Consumers that cannot accept a degraded word use `try_fill_bytes`, which
/// reports the fault instead.
use core::num::NonZeroU32;

use log::warn;

use crate::error::HardwareFault;

/// Words produced by one hardware generate call (128 bits).
pub const BLOCK_WORDS: usize = 4;

/// Word returned when the generator fails.
pub const FAULT_SENTINEL: u32 = 0;

static_assertions::const_assert!(BLOCK_WORDS > 0);

const FAULT_CODE: NonZeroU32 = match NonZeroU32::new(rand_core::Error::CUSTOM_START) {
    Some(code) => code,
    None => panic!("rand_core custom error range starts at zero"),
};

/// A hardware primitive that generates `N` random words per call.
pub trait RandomBlock<const N: usize> {
    fn generate(&mut self) -> Result<[u32; N], HardwareFault>;
}

/// Counters for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Words returned, sentinels included.
    pub served: u64,
    pub refills: u64,
    pub faults: u64,
}

/// Single-owner cache over a `RandomBlock`. Not for concurrent callers.
pub struct RandomWordCache<R, const N: usize = BLOCK_WORDS> {
    source: R,
    buffer: [u32; N],
    cursor: usize,
    stats: CacheStats,
}

impl<R: RandomBlock<N>, const N: usize> RandomWordCache<R, N> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: [0; N],
            cursor: 0,
            stats: CacheStats::default(),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index of the next word to serve. Zero means a refill is due.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Next random word, or `FAULT_SENTINEL` if the refill failed.
    pub fn next(&mut self) -> u32 {
        self.try_next().unwrap_or(FAULT_SENTINEL)
    }

    /// A `() -> word` random source for the crypto library.
    pub fn source(&mut self) -> impl FnMut() -> u32 + '_ {
        move || self.next()
    }

    fn try_next(&mut self) -> Result<u32, HardwareFault> {
        self.stats.served += 1;
        if self.cursor == 0 {
            self.refill()?;
        }
        let word = self.buffer[self.cursor];
        self.cursor = (self.cursor + 1) % N;
        Ok(word)
    }

    fn refill(&mut self) -> Result<(), HardwareFault> {
        match self.source.generate() {
            Ok(block) => {
                self.buffer = block;
                self.stats.refills += 1;
                Ok(())
            }
            Err(fault) => {
                // Cursor stays at 0, so the next call retries the refill.
                self.stats.faults += 1;
                warn!(target: "rng", "GenRand failed: {}", fault);
                Err(fault)
            }
        }
    }
}

impl<R: RandomBlock<N>, const N: usize> rand_core::RngCore for RandomWordCache<R, N> {
    fn next_u32(&mut self) -> u32 {
        self.next()
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        for chunk in dest.chunks_mut(4) {
            let word = self
                .try_next()
                .map_err(|_| rand_core::Error::from(FAULT_CODE))?;
            let bytes = word.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}
