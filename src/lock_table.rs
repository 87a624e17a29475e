use std::collections::{HashMap, HashSet};

use log::debug;

use crate::heap_page::{HeapPageId, Permission};
use crate::transaction::TransactionId;

/// Per-page lock state: no holders, one-or-more readers, or a sole writer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum LockState {
    Unlocked,
    Shared,
    Exclusive,
}

#[derive(Debug, Default)]
struct LockInfo {
    state_holders: Option<(LockState, HashSet<TransactionId>)>,
}

impl LockInfo {
    fn state(&self) -> LockState {
        self.state_holders
            .as_ref()
            .map(|(s, _)| *s)
            .unwrap_or(LockState::Unlocked)
    }

    fn holders(&self) -> HashSet<TransactionId> {
        self.state_holders
            .as_ref()
            .map(|(_, h)| h.clone())
            .unwrap_or_default()
    }
}

/// Outcome of an attempted lock acquisition (§4.3).
#[derive(Debug, PartialEq, Eq)]
pub enum AcquireResult {
    Granted,
    /// A shared hold by `tid` was upgraded to exclusive in place.
    Upgrade,
    /// `tid` must wait on the listed holders before retrying.
    MustWait(HashSet<TransactionId>),
}

/// Per-page lock state, the transaction→pages touch index, and the wait-for
/// graph, all mutated together under the buffer pool's single mutex (§5).
#[derive(Default)]
pub struct LockTable {
    locks: HashMap<HeapPageId, LockInfo>,
    touched: HashMap<TransactionId, HashSet<HeapPageId>>,
    wait_for: HashMap<TransactionId, HashSet<TransactionId>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `tid` has referenced `pid`, regardless of whether the
    /// lock is granted immediately or only after blocking.
    pub fn note_reference(&mut self, tid: TransactionId, pid: HeapPageId) {
        self.touched.entry(tid).or_default().insert(pid);
    }

    pub fn acquire(&mut self, tid: TransactionId, pid: HeapPageId, mode: Permission) -> AcquireResult {
        let info = self.locks.entry(pid).or_default();
        let holders = info.holders();

        if info.state() == LockState::Exclusive && holders.contains(&tid) {
            return AcquireResult::Granted;
        }

        match mode {
            Permission::Read => match info.state() {
                LockState::Unlocked => {
                    info.state_holders = Some((LockState::Shared, HashSet::from([tid])));
                    AcquireResult::Granted
                }
                LockState::Shared => {
                    let mut holders = holders;
                    holders.insert(tid);
                    info.state_holders = Some((LockState::Shared, holders));
                    AcquireResult::Granted
                }
                LockState::Exclusive => AcquireResult::MustWait(holders),
            },
            Permission::Write => match info.state() {
                LockState::Unlocked => {
                    info.state_holders = Some((LockState::Exclusive, HashSet::from([tid])));
                    AcquireResult::Granted
                }
                LockState::Shared => {
                    if holders.contains(&tid) && holders.len() == 1 {
                        info.state_holders = Some((LockState::Exclusive, HashSet::from([tid])));
                        AcquireResult::Upgrade
                    } else if holders.contains(&tid) {
                        let others: HashSet<_> =
                            holders.into_iter().filter(|h| *h != tid).collect();
                        AcquireResult::MustWait(others)
                    } else {
                        AcquireResult::MustWait(holders)
                    }
                }
                LockState::Exclusive => AcquireResult::MustWait(holders),
            },
        }
    }

    /// Union every holder into `waitGraph[tid]`, deduplicated.
    pub fn add_wait_edges(&mut self, tid: TransactionId, holders: &HashSet<TransactionId>) {
        self.wait_for.entry(tid).or_default().extend(holders.iter().copied());
    }

    /// Drop `tid`'s outgoing wait edges once it has been granted a lock.
    pub fn clear_wait_edges(&mut self, tid: TransactionId) {
        self.wait_for.remove(&tid);
    }

    /// Detect any cycle reachable in the wait-for graph via union-find: for
    /// every edge u→v, union u with v; if they already share a root, a cycle
    /// exists. `tid` identifies the caller for diagnostic purposes only — the
    /// whole graph is checked, since `tid`'s own edge may close a cycle that
    /// doesn't directly involve it as an endpoint pair.
    pub fn has_cycle(&self, tid: TransactionId) -> bool {
        let mut parent: HashMap<TransactionId, TransactionId> = HashMap::new();

        fn find(x: TransactionId, parent: &mut HashMap<TransactionId, TransactionId>) -> TransactionId {
            let p = *parent.entry(x).or_insert(x);
            if p == x {
                x
            } else {
                let root = find(p, parent);
                parent.insert(x, root);
                root
            }
        }

        for (&from, tos) in self.wait_for.iter() {
            let pa = find(from, &mut parent);
            for &to in tos {
                let pb = find(to, &mut parent);
                if pa == pb {
                    debug!("lock table: wait-for cycle detected while checking {tid}");
                    return true;
                }
                parent.insert(pa, pb);
            }
        }
        false
    }

    /// Release every lock `tid` holds, erase it from the touch set, and
    /// prune its wait edges (both as source and as a target elsewhere).
    /// Returns the set of pages `tid` had touched, for the caller to flush
    /// or discard.
    pub fn release_all(&mut self, tid: TransactionId) -> HashSet<HeapPageId> {
        let pages = self.touched.remove(&tid).unwrap_or_default();
        for pid in &pages {
            if let Some(info) = self.locks.get_mut(pid) {
                let mut holders = info.holders();
                holders.remove(&tid);
                info.state_holders = if holders.is_empty() {
                    None
                } else {
                    Some((LockState::Shared, holders))
                };
            }
        }
        self.wait_for.remove(&tid);
        for tos in self.wait_for.values_mut() {
            tos.remove(&tid);
        }
        pages
    }

    /// Pages `tid` has referenced so far, without releasing anything —
    /// used by commit to know what to flush before it releases locks.
    pub fn touched_pages(&self, tid: TransactionId) -> HashSet<HeapPageId> {
        self.touched.get(&tid).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> HeapPageId {
        HeapPageId::new(1, 0)
    }

    #[test]
    fn two_readers_then_writer_must_wait() {
        let mut lt = LockTable::new();
        let t1 = TransactionId::new();
        let t2 = TransactionId::new();
        let p = pid();

        assert_eq!(lt.acquire(t1, p, Permission::Read), AcquireResult::Granted);
        assert_eq!(lt.acquire(t2, p, Permission::Read), AcquireResult::Granted);
        assert!(matches!(
            lt.acquire(t1, p, Permission::Write),
            AcquireResult::MustWait(_)
        ));
    }

    #[test]
    fn sole_reader_upgrades() {
        let mut lt = LockTable::new();
        let t1 = TransactionId::new();
        let p = pid();
        lt.acquire(t1, p, Permission::Read);
        assert_eq!(lt.acquire(t1, p, Permission::Write), AcquireResult::Upgrade);
    }

    #[test]
    fn exclusive_holder_is_idempotent() {
        let mut lt = LockTable::new();
        let t1 = TransactionId::new();
        let p = pid();
        lt.acquire(t1, p, Permission::Write);
        assert_eq!(lt.acquire(t1, p, Permission::Write), AcquireResult::Granted);
        assert_eq!(lt.acquire(t1, p, Permission::Read), AcquireResult::Granted);
    }

    #[test]
    fn release_all_frees_the_page_for_others() {
        let mut lt = LockTable::new();
        let t1 = TransactionId::new();
        let t2 = TransactionId::new();
        let p = pid();
        lt.note_reference(t1, p);
        lt.acquire(t1, p, Permission::Write);
        lt.release_all(t1);
        assert_eq!(lt.acquire(t2, p, Permission::Write), AcquireResult::Granted);
    }

    #[test]
    fn cycle_detection_via_union_find() {
        let mut lt = LockTable::new();
        let t1 = TransactionId::new();
        let t2 = TransactionId::new();
        lt.add_wait_edges(t1, &HashSet::from([t2]));
        assert!(!lt.has_cycle(t1));
        lt.add_wait_edges(t2, &HashSet::from([t1]));
        assert!(lt.has_cycle(t2));
    }
}
