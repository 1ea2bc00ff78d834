//! Bounded per-pool event buffers and the mixed-event pair stream built on
//! top of them.

use crate::domain::{EventId, EventLike, HadronLike, JetLike};
use crate::modules::binning::PoolBin;
use std::collections::{BTreeMap, VecDeque, vec_deque};

/// Snapshot of a previously seen event and its hadrons.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEvent<E, H> {
    pub sequence: u64,
    pub event: E,
    pub hadrons: Vec<H>,
}

#[derive(Debug, Clone)]
pub struct MixingCache<E, H> {
    depth: usize,
    next_sequence: u64,
    pools: BTreeMap<PoolBin, VecDeque<CachedEvent<E, H>>>,
}

impl<E, H> MixingCache<E, H>
where
    E: EventLike,
    H: HadronLike,
{
    /// `depth` is clamped to at least one entry per pool.
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            next_sequence: 0,
            pools: BTreeMap::new(),
        }
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Appends to the pool of `bin`, evicting the oldest entries beyond the depth.
    pub fn put(&mut self, bin: PoolBin, event: E, hadrons: Vec<H>) {
        let depth = self.depth;
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let pool = self
            .pools
            .entry(bin)
            .or_insert_with(|| VecDeque::with_capacity(depth));
        pool.push_back(CachedEvent {
            sequence,
            event,
            hadrons,
        });
        while pool.len() > depth {
            pool.pop_front();
        }
    }

    fn pool(&self, bin: PoolBin) -> Option<&VecDeque<CachedEvent<E, H>>> {
        self.pools.get(&bin)
    }

    /// Cached entries of `bin`, oldest first, excluding entries of `event_id`.
    pub fn pairs_for(
        &self,
        event_id: EventId,
        bin: PoolBin,
    ) -> impl Iterator<Item = &CachedEvent<E, H>> + '_ {
        self.pool(bin)
            .into_iter()
            .flat_map(|pool| pool.iter())
            .filter(move |cached| cached.event.id() != event_id)
    }

    pub fn len(&self, bin: PoolBin) -> usize {
        self.pools.get(&bin).map_or(0, VecDeque::len)
    }

    pub fn total_len(&self) -> usize {
        self.pools.values().map(VecDeque::len).sum()
    }

    pub fn active_pools(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.values().all(VecDeque::is_empty)
    }
}

/// One (current jets, cached hadrons) combination.
#[derive(Debug, Clone)]
pub struct MixedPair<'a, E, J, H> {
    pub current: &'a E,
    pub current_jets: &'a [J],
    pub cached: &'a E,
    pub cached_hadrons: &'a [H],
    pub pool_bin: PoolBin,
}

/// Pairs the current event's jets with every cached event of the same pool.
pub struct PairGenerator<'a, E, J, H> {
    current: &'a E,
    current_jets: &'a [J],
    pool_bin: PoolBin,
    cached: Option<vec_deque::Iter<'a, CachedEvent<E, H>>>,
}

impl<'a, E, J, H> PairGenerator<'a, E, J, H>
where
    E: EventLike,
    J: JetLike,
    H: HadronLike,
{
    pub fn new(
        cache: &'a MixingCache<E, H>,
        current: &'a E,
        current_jets: &'a [J],
        pool_bin: PoolBin,
    ) -> Self {
        Self {
            current,
            current_jets,
            pool_bin,
            cached: cache.pool(pool_bin).map(VecDeque::iter),
        }
    }
}

impl<'a, E, J, H> Iterator for PairGenerator<'a, E, J, H>
where
    E: EventLike,
{
    type Item = MixedPair<'a, E, J, H>;

    fn next(&mut self) -> Option<Self::Item> {
        let current_id = self.current.id();
        let cached = self
            .cached
            .as_mut()?
            .find(|cached| cached.event.id() != current_id)?;
        Some(MixedPair {
            current: self.current,
            current_jets: self.current_jets,
            cached: &cached.event,
            cached_hadrons: &cached.hadrons,
            pool_bin: self.pool_bin,
        })
    }
}
