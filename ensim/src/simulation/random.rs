//! Independent random streams for parallel sampling
//!
//! Every concurrent sampling call gets its own [`RandomStream`]; streams are
//! never shared. Streams are handed out by a [`StreamAllocator`] that is owned
//! by whoever grows the ensemble, so there is no process-wide stream counter.
//! Stream `k` of a run is seeded from `(master_seed, k)` via SipHash-1-3 with
//! fixed zero keys, which keeps runs reproducible for a given master seed.

use std::hash::Hasher;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

use crate::error::StreamError;

/// Default stream budget, the size of the MT2203 family of independent streams
pub const DEFAULT_MAX_STREAMS: usize = 6024;

/// Derive the seed for stream `substream` of a run seeded with `master_seed`
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// A seeded random stream. Owned by exactly one sampling call at a time.
#[derive(Debug, Clone)]
pub struct RandomStream {
    id: usize,
    rng: StdRng,
}

impl RandomStream {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Hands out independent streams up to a fixed limit
#[derive(Debug, Clone)]
pub struct StreamAllocator {
    master_seed: u64,
    next_id: usize,
    limit: usize,
}

impl StreamAllocator {
    pub fn new(master_seed: u64, limit: usize) -> Self {
        debug!("stream allocator: master seed {master_seed}, limit {limit}");
        Self {
            master_seed,
            next_id: 0,
            limit,
        }
    }

    /// Allocator seeded from the wall clock, for runs that don't ask for
    /// reproducibility
    pub fn from_clock(limit: usize) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(clock_seed)
            .unwrap_or_default();
        Self::new(seed, limit)
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Streams still available
    pub fn remaining(&self) -> usize {
        self.limit - self.next_id
    }

    pub fn next_stream(&mut self) -> Result<RandomStream, StreamError> {
        if self.next_id >= self.limit {
            return Err(StreamError::Exhausted { limit: self.limit });
        }
        let id = self.next_id;
        self.next_id += 1;
        trace!("allocating random stream {id}");
        Ok(RandomStream {
            id,
            rng: StdRng::seed_from_u64(derive_substream_seed(self.master_seed, id as u64)),
        })
    }

    /// Allocate `N` streams at once, or none at all if the budget is short
    pub fn take<const N: usize>(&mut self) -> Result<[RandomStream; N], StreamError> {
        if self.remaining() < N {
            return Err(StreamError::Exhausted { limit: self.limit });
        }
        let mut streams = Vec::with_capacity(N);
        for _ in 0..N {
            streams.push(self.next_stream()?);
        }
        // length checked above
        streams
            .try_into()
            .map_err(|_| StreamError::Exhausted { limit: self.limit })
    }
}

/// Master seed from time since the epoch, in nanoseconds
fn clock_seed(since_epoch: Duration) -> u64 {
    since_epoch.as_nanos() as u64
}

impl Default for StreamAllocator {
    fn default() -> Self {
        Self::from_clock(DEFAULT_MAX_STREAMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_master_seed_gives_same_streams() {
        let mut a = StreamAllocator::new(7, 4);
        let mut b = StreamAllocator::new(7, 4);
        let mut sa = a.next_stream().unwrap();
        let mut sb = b.next_stream().unwrap();
        assert_eq!(sa.next_u64(), sb.next_u64());
    }

    #[test]
    fn streams_within_a_run_differ() {
        let mut alloc = StreamAllocator::new(7, 4);
        let mut s0 = alloc.next_stream().unwrap();
        let mut s1 = alloc.next_stream().unwrap();
        assert_ne!(s0.next_u64(), s1.next_u64());
    }

    #[test]
    fn allocator_reports_exhaustion() {
        let mut alloc = StreamAllocator::new(1, 2);
        assert!(alloc.next_stream().is_ok());
        assert!(alloc.next_stream().is_ok());
        assert_eq!(alloc.next_stream().unwrap_err(), StreamError::Exhausted { limit: 2 });
    }

    #[test]
    fn clock_seeds_differ_within_one_second() {
        let a = clock_seed(Duration::new(1_700_000_000, 1));
        let b = clock_seed(Duration::new(1_700_000_000, 2));
        assert_ne!(a, b);
        assert_eq!(clock_seed(Duration::new(2, 5)), 2_000_000_005);
    }

    #[test]
    fn take_is_all_or_nothing() {
        let mut alloc = StreamAllocator::new(1, 5);
        assert!(alloc.take::<6>().is_err());
        assert_eq!(alloc.remaining(), 5);
        let streams = alloc.take::<3>().unwrap();
        assert_eq!(streams.iter().map(|s| s.id()).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(alloc.remaining(), 2);
    }
}
