//! Slot bookkeeping for a per-frame ring of uniform snapshots.
//!
//! The ring hands out dynamic offsets into one uniform buffer, one aligned
//! slot per draw, and never wraps within a frame: once every slot is taken
//! further draws are refused until [`UniformRing::rewind`].

/// Offsets of a fixed number of equally sized, aligned uniform slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformRing {
    stride: u64,
    capacity: u32,
    cursor: u32,
}

impl UniformRing {
    /// Ring of `capacity` slots, each `block_size` bytes rounded up to
    /// `align` (the device's `min_uniform_buffer_offset_alignment`).
    ///
    /// A zero capacity or alignment is raised to one.
    pub fn new(block_size: u64, align: u64, capacity: u32) -> Self {
        let align = align.max(1);
        Self {
            stride: block_size.div_ceil(align) * align,
            capacity: capacity.max(1),
            cursor: 0,
        }
    }

    /// Bytes the backing buffer needs.
    pub fn buffer_size(&self) -> u64 {
        self.stride * u64::from(self.capacity)
    }

    /// Claim the next slot, returning its byte offset, or `None` once the
    /// frame's slots are used up.
    pub fn next_offset(&mut self) -> Option<u32> {
        if self.cursor >= self.capacity {
            return None;
        }
        let offset = u32::try_from(u64::from(self.cursor) * self.stride).ok()?;
        self.cursor += 1;
        Some(offset)
    }

    /// Release every slot for a new frame.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(UniformRing::new(80, 256, 4).buffer_size(), 1024);
        assert_eq!(UniformRing::new(256, 256, 4).buffer_size(), 1024);
        assert_eq!(UniformRing::new(272, 256, 4).buffer_size(), 2048);
    }

    #[test]
    fn offsets_step_by_stride() {
        let mut ring = UniformRing::new(80, 256, 3);
        assert_eq!(ring.next_offset(), Some(0));
        assert_eq!(ring.next_offset(), Some(256));
        assert_eq!(ring.next_offset(), Some(512));
    }

    #[test]
    fn full_ring_refuses_until_rewound() {
        let mut ring = UniformRing::new(64, 256, 2);
        assert!(ring.next_offset().is_some());
        assert!(ring.next_offset().is_some());
        assert_eq!(ring.next_offset(), None);
        assert_eq!(ring.next_offset(), None);

        ring.rewind();
        assert_eq!(ring.next_offset(), Some(0));
    }

    #[test]
    fn zero_capacity_still_holds_one_draw() {
        let mut ring = UniformRing::new(64, 0, 0);
        assert_eq!(ring.buffer_size(), 64);
        assert_eq!(ring.next_offset(), Some(0));
        assert_eq!(ring.next_offset(), None);
    }
}
