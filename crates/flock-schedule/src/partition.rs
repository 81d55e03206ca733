//! Split a job list into fixed-size chunks.

/// Split `jobs` into consecutive chunks of `chunk_size`, preserving order.
/// The last chunk holds the remainder.
///
/// # Panics
/// Panics if `chunk_size` is zero; configurations are validated before any
/// step runs, so a zero here is a programming error.
pub fn partition<T>(jobs: Vec<T>, chunk_size: usize) -> Vec<Vec<T>> {
    assert!(chunk_size > 0, "chunk_size must be at least 1");
    let mut chunks = Vec::with_capacity(jobs.len().div_ceil(chunk_size));
    let mut iter = jobs.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(chunk_size).collect());
    }
    chunks
}
