pub mod loader;

pub const MIN_CHUNK_SIZE: usize = 4 * 1024;
pub const MAX_CHUNK_SIZE: usize = 32 * 1024;
/// Target number of chunks per load, before clamping.
pub const TARGET_CHUNK_COUNT: u64 = 200;

/// `clamp(total_size / 200, 4096, 32768)`.
///
/// Keeps the number of progress events roughly constant for mid-sized files
/// while bounding the per-event work for tiny and huge ones.
#[inline]
#[must_use]
pub fn adaptive_chunk_size(total_size: u64) -> usize {
    let size = (total_size / TARGET_CHUNK_COUNT).clamp(MIN_CHUNK_SIZE as u64, MAX_CHUNK_SIZE as u64);

    // Clamped into usize range above.
    usize::try_from(size).unwrap_or(MAX_CHUNK_SIZE)
}
