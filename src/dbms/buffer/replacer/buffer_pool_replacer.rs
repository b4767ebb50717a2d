#[cfg(test)]
use mockall::automock;

use crate::dbms::types::FrameId;

#[derive(Debug, PartialEq, Eq)]
pub enum BufferPoolReplacerError {
    /// Frame is out of range
    FrameOutOfRange(String),
}

#[cfg_attr(test, automock)]
pub trait IBufferPoolReplacer {
    /// Select a frame to evict from the buffer pool, removing it from the
    /// candidate set. Returns `None` if no frame is a candidate, e.g. every
    /// frame is pinned.
    fn victim(&mut self) -> Result<Option<FrameId>, BufferPoolReplacerError>;
    /// Remove a frame from the candidate set, after its pin count rises
    /// above zero. Idempotent.
    fn pin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError>;
    /// Add a frame to the candidate set, after its pin count drops to zero.
    /// Idempotent.
    fn unpin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError>;
    /// Number of frames currently in the candidate set.
    fn size(&self) -> Result<usize, BufferPoolReplacerError>;
}
