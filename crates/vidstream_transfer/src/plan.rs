use std::ops::Range;

use vidstream_contract::DEFAULT_CHUNK_SIZE;

/// Byte-range partitioning of a file into `ceil(file_size / chunk_size)`
/// contiguous chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(file_size: u64, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self {
            file_size,
            chunk_size,
        }
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    pub fn range(&self, index: u64) -> Option<Range<u64>> {
        if index >= self.chunk_count() {
            return None;
        }
        let start = index * self.chunk_size;
        let end = (start + self.chunk_size).min(self.file_size);
        Some(start..end)
    }

    pub fn ranges(&self) -> impl Iterator<Item = (u64, Range<u64>)> + '_ {
        (0..self.chunk_count()).filter_map(move |index| self.range(index).map(|r| (index, r)))
    }

    pub fn progress_percent(&self, completed: u64) -> f64 {
        let total = self.chunk_count();
        if total == 0 {
            return 100.0;
        }
        (completed as f64 / total as f64) * 100.0
    }
}
