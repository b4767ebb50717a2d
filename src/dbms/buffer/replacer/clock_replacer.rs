use super::buffer_pool_replacer::{BufferPoolReplacerError, IBufferPoolReplacer};
use crate::dbms::types::FrameId;

/// State of one frame under the clock hand: not an eviction candidate, a
/// candidate that has spent its second chance, or a candidate whose
/// reference bit is still set.
#[derive(Debug, PartialEq, Clone, Copy)]
enum ClockCell {
    Absent,
    Unreferenced,
    Referenced,
}

/// Second-chance replacement over a fixed ring of cells, one per frame.
///
/// `size` is maintained as the count of non-`Absent` cells; `victim`
/// terminates because `size > 0` guarantees a candidate somewhere in the
/// ring and every full rotation clears at least one reference bit.
pub struct ClockReplacer {
    hand: usize,
    cells: Vec<ClockCell>,
    size: usize,
}

impl ClockReplacer {
    pub fn new(num_frames: usize) -> Self {
        ClockReplacer {
            hand: 0,
            cells: vec![ClockCell::Absent; num_frames],
            size: 0,
        }
    }

    fn check_frame_id(&self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        if frame_id >= self.cells.len() {
            return Err(BufferPoolReplacerError::FrameOutOfRange(format!(
                "frame_id {} is out of range",
                frame_id
            )));
        }
        Ok(())
    }
}

impl IBufferPoolReplacer for ClockReplacer {
    fn victim(&mut self) -> Result<Option<FrameId>, BufferPoolReplacerError> {
        if self.size == 0 {
            return Ok(None);
        }

        loop {
            let hand = self.hand;
            self.hand = (self.hand + 1) % self.cells.len();
            match self.cells[hand] {
                ClockCell::Absent => {}
                ClockCell::Referenced => {
                    // Second chance: survive this sweep, fall next time.
                    self.cells[hand] = ClockCell::Unreferenced;
                }
                ClockCell::Unreferenced => {
                    self.cells[hand] = ClockCell::Absent;
                    self.size -= 1;
                    return Ok(Some(hand));
                }
            }
        }
    }

    fn pin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        self.check_frame_id(frame_id)?;
        if self.cells[frame_id] != ClockCell::Absent {
            self.size -= 1;
        }
        self.cells[frame_id] = ClockCell::Absent;
        Ok(())
    }

    fn unpin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        self.check_frame_id(frame_id)?;
        if self.cells[frame_id] == ClockCell::Absent {
            self.size += 1;
        }
        self.cells[frame_id] = ClockCell::Referenced;
        Ok(())
    }

    fn size(&self) -> Result<usize, BufferPoolReplacerError> {
        Ok(self.size)
    }
}
