use std::io;

use crate::transaction::TransactionId;

/// Errors surfaced across the storage engine's operator boundary.
///
/// Every fallible operation described by the component design returns one of
/// these kinds rather than a bare `String` or a panic, so callers can match on
/// `Deadlock` / `BufferPoolFull` and recover instead of unwinding.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("incompatible types: {0}")]
    IncompatibleTypes(String),

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("page is full, no empty slot available")]
    PageFull,

    #[error("illegal slot {slot}: {reason}")]
    IllegalSlot { slot: usize, reason: &'static str },

    #[error("buffer pool is full of dirty pages")]
    BufferPoolFull,

    #[error("deadlock detected, transaction {0:?} aborted")]
    Deadlock(TransactionId),

    #[error("ambiguous field name: {0}")]
    AmbiguousName(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type DbResult<T> = Result<T, DbError>;
