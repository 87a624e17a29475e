use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-unique transaction identifier with a stable total order.
///
/// Transactions begin implicitly: calling `TransactionId::new()` and then
/// using it for a `BufferPool::get_page` call *is* beginning a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId {
    tid: u64,
}

impl TransactionId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let tid = COUNTER.fetch_add(1, Ordering::SeqCst);
        TransactionId { tid }
    }

    pub fn get_tid(&self) -> u64 {
        self.tid
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tid({})", self.tid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_increments() {
        let tid1 = TransactionId::new();
        let tid2 = TransactionId::new();
        assert_ne!(tid1, tid2);
        assert!(tid2.get_tid() > tid1.get_tid());
    }

    #[test]
    fn test_transaction_id_ordering() {
        let ids: Vec<_> = (0..5).map(|_| TransactionId::new()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted, "ids are assigned in increasing order");
    }
}
