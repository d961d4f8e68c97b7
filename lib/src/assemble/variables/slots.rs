use std::collections::BTreeSet;

/// Largest number of local slots a method can have (`max_locals` is a `u16`)
pub const MAX_LOCALS: usize = u16::MAX as usize;

/// A slot could not be committed
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocationConflict {
    /// The slot is the second half of a `long`/`double` stored in the slot before it
    #[error("illegal usage of slot {slot}, reserved by the wide value in slot {}", .slot - 1)]
    ReservedWideSlot { slot: usize },

    /// The value would not fit under the `max_locals` limit
    #[error("slot {slot} (width {width}) exceeds the limit of {} locals", MAX_LOCALS)]
    TooManyLocals { slot: usize, width: usize },
}

/// Tracks which local slots are taken
///
/// Slots are committed one at a time (along with their width). The allocator remembers which
/// slots hold wide values since the slot right after a wide value can never be used on its own.
#[derive(Clone, Debug, Default)]
pub struct SlotAllocator {
    /// Smallest slot guaranteed not to collide with anything committed so far
    next_free_slot: usize,

    /// Largest slot committed so far
    high_water_slot: usize,

    /// Slots holding wide values (so the following slot is reserved)
    wide_slots: BTreeSet<usize>,
}

impl SlotAllocator {
    pub fn new() -> SlotAllocator {
        SlotAllocator::default()
    }

    /// Commit a slot holding a value of the given width (1 or 2)
    ///
    /// Committing a slot below the high-water mark is allowed (as long as it isn't the tail of a
    /// wide value) but does not move the next free slot.
    pub fn reserve(&mut self, slot: usize, width: usize) -> Result<(), AllocationConflict> {
        debug_assert!(width == 1 || width == 2, "invalid slot width {}", width);

        if self.is_reserved_tail(slot) {
            return Err(AllocationConflict::ReservedWideSlot { slot });
        }
        if slot + width > MAX_LOCALS {
            return Err(AllocationConflict::TooManyLocals { slot, width });
        }

        if width == 2 {
            self.wide_slots.insert(slot);
        }
        if self.high_water_slot <= slot {
            self.high_water_slot = slot;
            self.next_free_slot = self.next_free_slot.max(slot + width);
        }
        Ok(())
    }

    /// Next slot to hand out to a new variable
    pub fn next_free_slot(&self) -> usize {
        self.next_free_slot
    }

    pub fn high_water_slot(&self) -> usize {
        self.high_water_slot
    }

    /// Does the slot hold a wide value?
    pub fn is_wide(&self, slot: usize) -> bool {
        self.wide_slots.contains(&slot)
    }

    /// Is the slot the second half of a wide value?
    pub fn is_reserved_tail(&self, slot: usize) -> bool {
        slot > 0 && self.wide_slots.contains(&(slot - 1))
    }

    /// Forget everything that was committed
    pub fn clear(&mut self) {
        self.next_free_slot = 0;
        self.high_water_slot = 0;
        self.wide_slots.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sequential_slots() {
        let mut slots = SlotAllocator::new();
        slots.reserve(0, 1).unwrap();
        slots.reserve(1, 2).unwrap();
        assert_eq!(slots.next_free_slot(), 3);
        assert_eq!(slots.high_water_slot(), 1);
        slots.reserve(3, 1).unwrap();
        assert_eq!(slots.next_free_slot(), 4);
        assert!(slots.is_wide(1));
        assert!(!slots.is_wide(3));
    }

    #[test]
    fn wide_tail_is_reserved() {
        let mut slots = SlotAllocator::new();
        slots.reserve(2, 2).unwrap();
        assert!(slots.is_reserved_tail(3));
        assert_eq!(
            slots.reserve(3, 1),
            Err(AllocationConflict::ReservedWideSlot { slot: 3 })
        );
        assert_eq!(
            slots.reserve(3, 2),
            Err(AllocationConflict::ReservedWideSlot { slot: 3 })
        );
        assert!(slots.reserve(4, 1).is_ok());
        assert!(slots.reserve(2, 2).is_ok());
    }

    #[test]
    fn slots_below_high_water_mark() {
        let mut slots = SlotAllocator::new();
        slots.reserve(5, 1).unwrap();
        assert_eq!(slots.next_free_slot(), 6);

        // A wide value below the high water mark does not move the next free slot
        slots.reserve(0, 2).unwrap();
        assert_eq!(slots.next_free_slot(), 6);
        assert_eq!(slots.high_water_slot(), 5);
        assert!(slots.reserve(1, 1).is_err());
    }

    #[test]
    fn too_many_locals() {
        let mut slots = SlotAllocator::new();
        assert!(slots.reserve(MAX_LOCALS - 1, 1).is_ok());
        assert_eq!(
            slots.reserve(MAX_LOCALS - 1, 2),
            Err(AllocationConflict::TooManyLocals {
                slot: MAX_LOCALS - 1,
                width: 2
            })
        );
    }

    #[test]
    fn clearing() {
        let mut slots = SlotAllocator::new();
        slots.reserve(0, 2).unwrap();
        slots.clear();
        assert_eq!(slots.next_free_slot(), 0);
        assert!(slots.reserve(1, 1).is_ok());
    }
}
