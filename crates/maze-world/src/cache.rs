//! Append-only store of generated chunks.

use std::sync::Arc;

use dashmap::DashMap;
use maze_common::ChunkCoord;
use tracing::warn;

use crate::chunk::Chunk;

/// Maps chunk coordinates to committed chunks.
///
/// Entries are never replaced or removed, so an `Arc<Chunk>` handed out
/// once stays the answer for that coordinate for the life of the cache.
#[derive(Debug, Default)]
pub struct ChunkCache {
    chunks: DashMap<ChunkCoord, Arc<Chunk>>,
}

impl ChunkCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed chunk at `coord`, if any.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.get(&coord).map(|entry| Arc::clone(entry.value()))
    }

    /// Checks if a chunk is cached.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Commits a chunk and returns the stored entry.
    ///
    /// If `coord` already holds a chunk the existing entry wins and the new
    /// one is dropped.
    pub fn insert(&self, coord: ChunkCoord, chunk: Chunk) -> Arc<Chunk> {
        let entry = self.chunks.entry(coord).or_insert_with(|| Arc::new(chunk));
        let stored = Arc::clone(entry.value());
        drop(entry);
        if stored.coord() != coord {
            warn!("Chunk stored at {coord} reports coordinate {}", stored.coord());
        }
        stored
    }

    /// Returns the number of cached chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if nothing has been committed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of every cached chunk, sorted.
    #[must_use]
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.iter().map(|e| *e.key()).collect();
        coords.sort_unstable();
        coords
    }
}
