use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("all {0} data-channel stream slots are taken")]
    Exhausted(u16),

    #[error("stream slot {0} is reserved")]
    Reserved(u16),

    #[error("stream slot {0} is not allocated")]
    NotAllocated(u16),
}

/// Bitmap of SCTP stream ids on one transport.
///
/// Slot 0 is never handed out. The cursor keeps moving forward so a freshly
/// released id is the last one to be reused.
#[derive(Debug, Clone)]
pub struct StreamSlotAllocator {
    used: Vec<u64>,
    reserved: Vec<u64>,
    capacity: u16,
    cursor: u16,
}

impl StreamSlotAllocator {
    pub fn new(capacity: u16, reserved: &[u16]) -> Self {
        let words = (capacity as usize).div_ceil(64);
        let mut allocator = Self {
            used: vec![0; words],
            reserved: vec![0; words],
            capacity,
            cursor: 0,
        };
        for slot in std::iter::once(0).chain(reserved.iter().copied()) {
            if slot < capacity {
                Self::set(&mut allocator.used, slot);
                Self::set(&mut allocator.reserved, slot);
            }
        }
        allocator
    }

    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    pub fn allocate(&mut self) -> Result<u16, SlotError> {
        let capacity = u32::from(self.capacity);
        for step in 0..capacity {
            let slot = ((u32::from(self.cursor) + step) % capacity) as u16;
            if !Self::get(&self.used, slot) {
                Self::set(&mut self.used, slot);
                self.cursor = ((u32::from(slot) + 1) % capacity) as u16;
                return Ok(slot);
            }
        }
        Err(SlotError::Exhausted(self.capacity))
    }

    /// Returns `slot` to the free set. Only call once whatever was bound to it is gone.
    pub fn release(&mut self, slot: u16) -> Result<(), SlotError> {
        if slot < self.capacity && Self::get(&self.reserved, slot) {
            return Err(SlotError::Reserved(slot));
        }
        if !self.is_allocated(slot) {
            return Err(SlotError::NotAllocated(slot));
        }
        Self::clear(&mut self.used, slot);
        Ok(())
    }

    pub fn is_allocated(&self, slot: u16) -> bool {
        slot < self.capacity && Self::get(&self.used, slot) && !Self::get(&self.reserved, slot)
    }

    /// Allocated slots, not counting reserved ones.
    pub fn in_use(&self) -> usize {
        self.used
            .iter()
            .zip(&self.reserved)
            .map(|(used, reserved)| (used & !reserved).count_ones() as usize)
            .sum()
    }

    fn get(bits: &[u64], slot: u16) -> bool {
        bits[slot as usize / 64] & (1 << (slot % 64)) != 0
    }

    fn set(bits: &mut [u64], slot: u16) {
        bits[slot as usize / 64] |= 1 << (slot % 64);
    }

    fn clear(bits: &mut [u64], slot: u16) {
        bits[slot as usize / 64] &= !(1 << (slot % 64));
    }
}
