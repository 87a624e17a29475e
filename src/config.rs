use std::time::Duration;

/// Width, in bytes, reserved for a string field on disk. Trailing bytes past
/// the string's content are zero-padded and stripped back out on read.
pub const STRING_LENGTH: usize = 128;

/// Size of a page on disk and in the buffer pool cache, in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Default number of pages a `BufferPool` will cache before it must evict.
pub const DEFAULT_POOL_SIZE: usize = 50;

/// How long `BufferPool::get_page` sleeps between retries while a lock is
/// contended. The source implementation hard-codes 100ms; the spec treats
/// this as a tunable, so it is a constant here rather than baked into the
/// retry loop.
pub const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);
