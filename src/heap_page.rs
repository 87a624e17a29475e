use crate::config::PAGE_SIZE;
use crate::error::{DbError, DbResult};
use crate::transaction::TransactionId;
use crate::tuple::{RecordId, Tuple, TupleDesc};

/// The mode a page is requested in: shared (read) or exclusive (write).
#[derive(Debug, PartialEq, Eq, Clone, Hash, Copy)]
pub enum Permission {
    Read,
    Write,
}

/// A page-key: identifies a page of a specific `HeapFile` uniquely and
/// stably, suitable as a buffer pool cache key and a lock table key.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct HeapPageId {
    file_id: usize,
    page_number: usize,
}

impl HeapPageId {
    pub fn new(file_id: usize, page_number: usize) -> Self {
        HeapPageId {
            file_id,
            page_number,
        }
    }

    pub fn file_id(&self) -> usize {
        self.file_id
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }
}

/// A fixed-size page of one `HeapFile`, holding up to `num_slots` tuples of a
/// single schema. On disk the page is exactly `PAGE_SIZE` bytes: an 8-byte
/// header (total slots, used slots, both little-endian i32) followed by
/// `num_slots` fixed-size tuple slots.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct HeapPage {
    pid: HeapPageId,
    td: TupleDesc,
    slots: Vec<Option<Tuple>>,
    num_slots: usize,
    used_slots: usize,
    dirtied_by: Option<TransactionId>,
}

impl HeapPage {
    /// Number of slots a page of this schema can hold.
    pub fn num_slots_for(td: &TupleDesc) -> usize {
        (PAGE_SIZE - 8) / td.get_size()
    }

    /// Construct a fresh, all-empty page (e.g. for a new page past EOF).
    pub fn empty(pid: HeapPageId, td: TupleDesc) -> Self {
        let num_slots = Self::num_slots_for(&td);
        HeapPage {
            pid,
            td,
            slots: vec![None; num_slots],
            num_slots,
            used_slots: 0,
            dirtied_by: None,
        }
    }

    /// Deserialize a page from exactly `PAGE_SIZE` bytes of on-disk data.
    pub fn deserialize(pid: HeapPageId, data: &[u8], td: TupleDesc) -> DbResult<Self> {
        let total_slots = i32::from_le_bytes(data[0..4].try_into().unwrap()) as usize;
        let used_slots = i32::from_le_bytes(data[4..8].try_into().unwrap()) as usize;

        let mut slots = vec![None; total_slots];
        let tuple_size = td.get_size();
        for i in 0..used_slots {
            let start = 8 + i * tuple_size;
            let end = start + tuple_size;
            let mut tuple = Tuple::deserialize(&data[start..end], &td)?;
            tuple.set_record_id(RecordId::new(pid, i));
            slots[i] = Some(tuple);
        }

        Ok(HeapPage {
            pid,
            td,
            slots,
            num_slots: total_slots,
            used_slots,
            dirtied_by: None,
        })
    }

    pub fn get_id(&self) -> HeapPageId {
        self.pid
    }

    pub fn tuple_desc(&self) -> &TupleDesc {
        &self.td
    }

    /// Serialize back to exactly `PAGE_SIZE` bytes. Only occupied slots are
    /// written out, compacted into the first `used_slots` positions — slot
    /// numbering may be renumbered across a serialize/deserialize round trip,
    /// which is safe because a dirty page is never evicted mid-transaction.
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(PAGE_SIZE);
        data.extend_from_slice(&(self.num_slots as i32).to_le_bytes());
        data.extend_from_slice(&(self.used_slots as i32).to_le_bytes());
        for tuple in self.slots.iter().flatten() {
            data.extend(tuple.serialize());
        }
        data.resize(PAGE_SIZE, 0);
        data
    }

    /// Insert `tuple` into the first empty slot, stamping its record-id.
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> DbResult<RecordId> {
        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(DbError::PageFull)?;
        let rid = RecordId::new(self.pid, slot);
        tuple.set_record_id(rid);
        self.slots[slot] = Some(tuple);
        self.used_slots += 1;
        Ok(rid)
    }

    /// Delete the tuple at `rid.slot_index()`, failing if the slot is out of
    /// range or already empty.
    pub fn delete_tuple(&mut self, rid: RecordId) -> DbResult<()> {
        let slot = rid.slot_index();
        if slot >= self.slots.len() {
            return Err(DbError::IllegalSlot {
                slot,
                reason: "slot index out of range",
            });
        }
        if self.slots[slot].is_none() {
            return Err(DbError::IllegalSlot {
                slot,
                reason: "slot is empty",
            });
        }
        self.slots[slot] = None;
        self.used_slots -= 1;
        Ok(())
    }

    pub fn num_empty_slots(&self) -> usize {
        self.num_slots - self.used_slots
    }

    pub fn used_slots(&self) -> usize {
        self.used_slots
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn mark_dirty(&mut self, dirty: bool, tid: TransactionId) {
        self.dirtied_by = if dirty { Some(tid) } else { None };
    }

    /// Clear the dirty flag without attributing the change to any particular
    /// transaction (used once a page has actually been flushed to disk).
    pub fn clear_dirty(&mut self) {
        self.dirtied_by = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirtied_by.is_some()
    }

    /// A fresh, non-restartable iterator over the live tuples on this page in
    /// ascending slot order, each stamped with its record-id.
    pub fn iter(&self) -> HeapPageIter<'_> {
        HeapPageIter {
            slots: &self.slots,
            index: 0,
        }
    }
}

pub struct HeapPageIter<'a> {
    slots: &'a [Option<Tuple>],
    index: usize,
}

impl<'a> Iterator for HeapPageIter<'a> {
    type Item = &'a Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.slots.len() {
            let slot = &self.slots[self.index];
            self.index += 1;
            if let Some(tuple) = slot {
                return Some(tuple);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldVal, IntField};
    use crate::types::Type;

    fn desc() -> TupleDesc {
        TupleDesc::new(vec![Type::IntType], vec!["n".to_string()])
    }

    #[test]
    fn insert_and_delete() {
        let td = desc();
        let pid = HeapPageId::new(1, 0);
        let mut page = HeapPage::empty(pid, td.clone());
        let tuple = Tuple::new(vec![FieldVal::IntField(IntField::new(7))], &td);
        let rid = page.insert_tuple(tuple).unwrap();
        assert_eq!(page.used_slots(), 1);
        page.delete_tuple(rid).unwrap();
        assert_eq!(page.used_slots(), 0);
    }

    #[test]
    fn delete_illegal_slot_errors() {
        let td = desc();
        let pid = HeapPageId::new(1, 0);
        let mut page = HeapPage::empty(pid, td.clone());
        let bogus = RecordId::new(pid, 9999);
        assert!(matches!(
            page.delete_tuple(bogus),
            Err(DbError::IllegalSlot { .. })
        ));
    }

    #[test]
    fn page_full_errors_when_no_slots_left() {
        let td = desc();
        let pid = HeapPageId::new(1, 0);
        let mut page = HeapPage::empty(pid, td.clone());
        let total = page.num_slots();
        for i in 0..total {
            page.insert_tuple(Tuple::new(
                vec![FieldVal::IntField(IntField::new(i as i64))],
                &td,
            ))
            .unwrap();
        }
        let overflow = Tuple::new(vec![FieldVal::IntField(IntField::new(0))], &td);
        assert!(matches!(
            page.insert_tuple(overflow),
            Err(DbError::PageFull)
        ));
    }

    #[test]
    fn serialize_round_trips() {
        let td = desc();
        let pid = HeapPageId::new(1, 0);
        let mut page = HeapPage::empty(pid, td.clone());
        page.insert_tuple(Tuple::new(vec![FieldVal::IntField(IntField::new(1))], &td))
            .unwrap();
        page.insert_tuple(Tuple::new(vec![FieldVal::IntField(IntField::new(2))], &td))
            .unwrap();
        let bytes = page.serialize();
        assert_eq!(bytes.len(), PAGE_SIZE);

        let restored = HeapPage::deserialize(pid, &bytes, td).unwrap();
        assert_eq!(restored.used_slots(), 2);
        let values: Vec<i64> = restored
            .iter()
            .map(|t| match t.get_field(0).unwrap() {
                FieldVal::IntField(f) => f.get_value(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn empty_page_serializes_with_zero_used_slots() {
        let td = desc();
        let pid = HeapPageId::new(1, 0);
        let page = HeapPage::empty(pid, td.clone());
        let bytes = page.serialize();
        assert_eq!(bytes.len(), PAGE_SIZE);
        let used = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(used, 0);
    }
}
