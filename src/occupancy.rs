//! The table of output slots claimed so far.

use bitvec::{bitvec, vec::BitVec};

/// Fixed-size set of claimed slots. Slots are only ever claimed, never released.
#[derive(Clone, Debug)]
pub struct OccupancyTable {
    taken: BitVec,
    claimed: usize,
}

impl OccupancyTable {
    pub fn new(slots: usize) -> Self {
        Self {
            taken: bitvec![0; slots],
            claimed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    #[inline(always)]
    pub fn is_claimed(&self, slot: u32) -> bool {
        self.taken[slot as usize]
    }

    /// Whether every slot in `slots` is currently free.
    ///
    /// Only reads the table; duplicates inside `slots` are not detected here.
    #[inline]
    pub fn can_claim(&self, slots: &[u32]) -> bool {
        slots.iter().all(|&s| !self.is_claimed(s))
    }

    /// Mark `slots` as claimed.
    pub fn commit(&mut self, slots: &[u32]) {
        for &slot in slots {
            if !self.taken[slot as usize] {
                self.taken.set(slot as usize, true);
                self.claimed += 1;
            }
        }
    }

    /// Number of distinct claimed slots.
    pub fn claimed(&self) -> usize {
        self.claimed
    }

    /// Fraction of slots claimed.
    pub fn load(&self) -> f64 {
        if self.taken.is_empty() {
            0.0
        } else {
            self.claimed as f64 / self.taken.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_free() {
        let table = OccupancyTable::new(8);
        assert_eq!(table.len(), 8);
        assert_eq!(table.claimed(), 0);
        assert!(table.can_claim(&[0, 3, 7]));
        assert_eq!(table.load(), 0.0);
    }

    #[test]
    fn test_commit_is_monotone() {
        let mut table = OccupancyTable::new(4);
        table.commit(&[1, 2]);
        assert!(table.is_claimed(1));
        assert!(!table.can_claim(&[0, 2]));
        assert!(table.can_claim(&[0, 3]));
        table.commit(&[2, 3]);
        assert_eq!(table.claimed(), 3);
        assert!(table.is_claimed(1));
        assert_eq!(table.load(), 0.75);
    }

    #[test]
    fn test_duplicate_slots_pass_check_but_claim_once() {
        let mut table = OccupancyTable::new(4);
        assert!(table.can_claim(&[2, 2]));
        table.commit(&[2, 2]);
        assert_eq!(table.claimed(), 1);
    }

    #[test]
    fn test_empty_slot_list() {
        let mut table = OccupancyTable::new(0);
        assert!(table.is_empty());
        assert!(table.can_claim(&[]));
        table.commit(&[]);
        assert_eq!(table.load(), 0.0);
    }
}
