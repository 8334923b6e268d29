//! Lazy per-patch tessellation cache.
//!
//! A [`TessellationCache`] hands out block storage and evicts everything at
//! once when it runs out, by bumping its epoch. Each patch owns a
//! [`PatchCache`]: a reader/writer lock around a [`CacheTag`] that points at
//! the patch's grid. A tag is valid only while its epoch matches the cache's,
//! so eviction is detected lazily on the next lookup.
//!
//! Storage is reference counted. A reader that already holds a grid keeps it
//! alive after eviction, but every new lookup re-validates the tag.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use spin::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::TessellationConfig;
use crate::error::{CacheError, Result};

// =============================================================================
// Storage
// =============================================================================

/// One 64-byte, 64-byte aligned unit of cache storage.
#[repr(C, align(64))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Block(pub [f32; 16]);

/// Size of a [`Block`] in bytes.
pub const BLOCK_BYTES: usize = std::mem::size_of::<Block>();

/// Zero-initialized block storage reserved from a [`TessellationCache`].
pub struct CacheStorage {
    blocks: Box<[Block]>,
    epoch: u64,
}

impl CacheStorage {
    fn zeroed(blocks: usize, epoch: u64) -> Self {
        Self {
            blocks: vec![Block::zeroed(); blocks].into_boxed_slice(),
            epoch,
        }
    }

    /// Epoch the storage was reserved in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of blocks.
    pub fn len_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The storage as blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The storage as mutable blocks.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// The storage as a flat float array.
    pub fn floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// The storage as a mutable flat float array.
    pub fn floats_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.blocks)
    }

    /// The raw bytes.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// The raw bytes, mutably.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.blocks)
    }
}

impl fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStorage")
            .field("blocks", &self.blocks.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}

// =============================================================================
// Shared cache manager
// =============================================================================

/// Shared block allocator with whole-cache eviction.
///
/// Usage accounting is advisory: reservations racing with an eviction sweep
/// may be forgotten, which only delays the next sweep.
#[derive(Debug)]
pub struct TessellationCache {
    capacity_blocks: usize,
    used_blocks: AtomicUsize,
    epoch: AtomicU64,
}

impl TessellationCache {
    /// Create a cache holding at most `capacity_blocks` blocks per epoch.
    pub fn new(capacity_blocks: usize) -> Self {
        Self {
            capacity_blocks,
            used_blocks: AtomicUsize::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Create a cache sized by the configuration.
    pub fn from_config(config: &TessellationConfig) -> Self {
        Self::new(config.cache_capacity_blocks)
    }

    /// Total capacity in blocks.
    pub fn capacity_blocks(&self) -> usize {
        self.capacity_blocks
    }

    /// Blocks reserved in the current epoch.
    pub fn used_blocks(&self) -> usize {
        self.used_blocks.load(Ordering::Acquire)
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// `true` if the tag holds storage from the current epoch.
    pub fn is_valid(&self, tag: &CacheTag) -> bool {
        tag.epoch() == Some(self.epoch())
    }

    /// Reserve `blocks` zeroed blocks, evicting everything if the cache is full.
    pub fn allocate(&self, blocks: usize) -> Result<CacheStorage> {
        if blocks == 0 {
            return Err(CacheError::EmptyGrid);
        }
        if blocks > self.capacity_blocks {
            return Err(CacheError::Oversized {
                requested: blocks,
                capacity: self.capacity_blocks,
            });
        }
        loop {
            let epoch = self.epoch();
            let used = self.used_blocks.load(Ordering::Acquire);
            if used + blocks > self.capacity_blocks {
                self.sweep(epoch);
                continue;
            }
            if self
                .used_blocks
                .compare_exchange_weak(used, used + blocks, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                continue;
            }
            // A sweep between reading the epoch and reserving invalidates the reservation
            if self.epoch() == epoch {
                return Ok(CacheStorage::zeroed(blocks, epoch));
            }
        }
    }

    /// Invalidate every tag handed out so far.
    pub fn evict_all(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.used_blocks.store(0, Ordering::Release);
        log::info!("tessellation cache: evicted all grids, epoch {}", epoch);
    }

    fn sweep(&self, epoch: u64) {
        // Only one thread wins the sweep for a given epoch
        if self
            .epoch
            .compare_exchange(epoch, epoch + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.used_blocks.store(0, Ordering::Release);
            log::info!(
                "tessellation cache full ({} blocks), evicted all grids, epoch {}",
                self.capacity_blocks,
                epoch + 1
            );
        }
    }
}

// =============================================================================
// Per-patch cache slot
// =============================================================================

/// Opaque handle to a patch's tessellated grid.
#[derive(Debug, Clone, Default)]
pub struct CacheTag {
    storage: Option<Arc<CacheStorage>>,
}

impl CacheTag {
    /// `true` if no grid was ever published into this tag.
    pub fn is_empty(&self) -> bool {
        self.storage.is_none()
    }

    /// Epoch of the referenced storage.
    pub fn epoch(&self) -> Option<u64> {
        self.storage.as_ref().map(|s| s.epoch)
    }

    /// The referenced storage, valid or not.
    pub fn storage(&self) -> Option<&Arc<CacheStorage>> {
        self.storage.as_ref()
    }

    fn valid_storage(&self, cache: &TessellationCache) -> Option<Arc<CacheStorage>> {
        if cache.is_valid(self) {
            self.storage.clone()
        } else {
            None
        }
    }
}

/// Observable state of a [`PatchCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No valid grid; the next lookup builds one.
    Empty,
    /// A writer holds the lock.
    Building,
    /// A valid grid is published.
    Ready,
}

/// A built grid together with the read lock that keeps it published.
pub struct CacheRead<'a> {
    _guard: RwLockReadGuard<'a, CacheTag>,
    storage: Arc<CacheStorage>,
}

impl CacheRead<'_> {
    /// Shared handle to the storage, usable after the lock is released.
    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }
}

impl Deref for CacheRead<'_> {
    type Target = CacheStorage;

    fn deref(&self) -> &CacheStorage {
        &self.storage
    }
}

impl fmt::Debug for CacheRead<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheRead").field(&self.storage).finish()
    }
}

/// Per-patch lock and cache tag.
#[derive(Debug, Default)]
pub struct PatchCache {
    tag: RwLock<CacheTag>,
    builds: AtomicU64,
}

impl PatchCache {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a grid was built into this slot.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Acquire)
    }

    /// Current state, without blocking.
    pub fn state(&self, cache: &TessellationCache) -> CacheState {
        match self.tag.try_read() {
            None => CacheState::Building,
            Some(tag) if cache.is_valid(&tag) => CacheState::Ready,
            Some(_) => CacheState::Empty,
        }
    }

    /// Try to take the read lock.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, CacheTag>> {
        self.tag.try_read()
    }

    /// Try to take the write lock.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, CacheTag>> {
        self.tag.try_write()
    }

    /// Take the write lock, spinning until it is free.
    pub fn write(&self) -> RwLockWriteGuard<'_, CacheTag> {
        self.tag.write()
    }

    /// Return the patch's grid, building it first if the tag is empty or stale.
    ///
    /// `build` runs under the write lock on exactly `blocks` zeroed blocks and
    /// must fill them completely; readers never see the storage before it
    /// returns.
    pub fn lookup_or_build<F>(
        &self,
        cache: &TessellationCache,
        blocks: usize,
        mut build: F,
    ) -> Result<CacheRead<'_>>
    where
        F: FnMut(&mut CacheStorage),
    {
        loop {
            let guard = self.tag.read();
            if let Some(storage) = guard.valid_storage(cache) {
                log::trace!("tessellation cache hit");
                return Ok(CacheRead {
                    _guard: guard,
                    storage,
                });
            }
            drop(guard);

            let mut guard = self.tag.write();
            if guard.valid_storage(cache).is_none() {
                log::trace!("tessellation cache miss, building {} blocks", blocks);
                let mut storage = cache.allocate(blocks)?;
                build(&mut storage);
                guard.storage = Some(Arc::new(storage));
                let generation = self.builds.fetch_add(1, Ordering::AcqRel) + 1;
                log::debug!("built tessellation grid, generation {}", generation);
            }

            let guard = guard.downgrade();
            if let Some(storage) = guard.valid_storage(cache) {
                return Ok(CacheRead {
                    _guard: guard,
                    storage,
                });
            }
            // Evicted between publish and downgrade
        }
    }

    /// Drop the cached grid.
    ///
    /// Taking `&mut self` guarantees no guard is alive.
    pub fn reset(&mut self) {
        debug_assert_eq!(self.tag.reader_count(), 0);
        debug_assert_eq!(self.tag.writer_count(), 0);
        *self.tag.get_mut() = CacheTag::default();
    }
}
