use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockWriteGuard};

use tracing::debug;

use crate::dbms::buffer::replacer::BufferPoolReplacerError;
use crate::dbms::buffer::types::{
    DiskManagerGeneric, ReadOnlyPage, ReplacerGeneric, WritablePage,
};
use crate::dbms::storage::disk::DiskManagerError;
use crate::dbms::types::{FrameId, PageData, PageId, PAGE_SIZE};

#[derive(Debug, PartialEq)]
pub enum BufferPoolManagerError {
    /// Every frame is pinned; nothing can be evicted to make room
    NoFrameAvailable,
    /// The requested page is not resident in the pool
    PageNotInPool,
    /// The page is pinned and cannot be deleted
    PageInUse,
    /// Unpin on a page whose pin count is already zero
    PinCountZero,
    ReplacerError(BufferPoolReplacerError),
    DiskManagerError(DiskManagerError),
}

impl From<BufferPoolReplacerError> for BufferPoolManagerError {
    fn from(e: BufferPoolReplacerError) -> Self {
        BufferPoolManagerError::ReplacerError(e)
    }
}

impl From<DiskManagerError> for BufferPoolManagerError {
    fn from(e: DiskManagerError) -> Self {
        BufferPoolManagerError::DiskManagerError(e)
    }
}

pub trait IBufferPoolManager {
    /// Fetch the requested page as readable, pinning it.
    fn fetch_page(&self, page_id: PageId) -> Result<ReadOnlyPage, BufferPoolManagerError>;
    /// Fetch the requested page as writable, pinning it.
    fn fetch_page_writable(&self, page_id: PageId)
        -> Result<WritablePage, BufferPoolManagerError>;
    /// Allocate a new page on disk and pin it in the pool, returning its ID
    /// and its zeroed bytes as writable.
    fn new_page(&self) -> Result<(PageId, WritablePage), BufferPoolManagerError>;
    /// Release one pin on the target page. `is_dirty` ORs into the frame's
    /// dirty flag and sticks until the page is flushed.
    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<(), BufferPoolManagerError>;
    /// Write the target page to disk if it is dirty.
    fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError>;
    /// Write every dirty page in the pool to disk.
    fn flush_all_pages(&self) -> Result<(), BufferPoolManagerError>;
    /// Drop a page from the pool and deallocate it on disk. Fails if the
    /// page is pinned.
    fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError>;
}

/// Metadata for one frame. Guarded by the pool latch; the frame's bytes are
/// guarded separately by the per-frame latch.
#[derive(Debug, PartialEq, Clone, Copy)]
struct FrameMeta {
    page_id: Option<PageId>,
    pin_count: usize,
    is_dirty: bool,
}

impl FrameMeta {
    fn vacant() -> Self {
        FrameMeta {
            page_id: None,
            pin_count: 0,
            is_dirty: false,
        }
    }
}

/// Page table, free list and frame metadata, all behind the pool-wide latch.
struct PoolState {
    /// page_id -> frame_id
    page_table: HashMap<PageId, FrameId>,
    free_frames: VecDeque<FrameId>,
    frames: Vec<FrameMeta>,
}

/// Fixed-size cache of disk pages.
///
/// Latch order is pool state, then replacer, then a frame's byte latch, then
/// the disk manager, never the reverse. No disk page I/O happens while the
/// pool latch is held: operations that touch disk take the frame latch
/// first, release the pool latch, and do their I/O under the frame latch
/// alone.
pub struct BufferPoolManager {
    pool_size: usize,
    state: RwLock<PoolState>,
    replacer: RwLock<ReplacerGeneric>,
    disk_manager: RwLock<DiskManagerGeneric>,
    /// One latch per frame's bytes. Page guards handed to callers are read
    /// or write guards on these; callers must drop a guard before unpinning.
    page_data: Vec<RwLock<PageData>>,
}

impl BufferPoolManager {
    pub fn new(
        pool_size: usize,
        replacer: ReplacerGeneric,
        disk_manager: DiskManagerGeneric,
    ) -> BufferPoolManager {
        BufferPoolManager {
            pool_size,
            state: RwLock::new(PoolState {
                page_table: HashMap::new(),
                // All frames start free
                free_frames: (0..pool_size).collect(),
                frames: vec![FrameMeta::vacant(); pool_size],
            }),
            replacer: RwLock::new(replacer),
            disk_manager: RwLock::new(disk_manager),
            page_data: (0..pool_size).map(|_| RwLock::new([0u8; PAGE_SIZE])).collect(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Pin `page_id` into a frame, reading it from disk if it is not
    /// resident, and return the frame index.
    fn fetch_page_frame(&self, page_id: PageId) -> Result<FrameId, BufferPoolManagerError> {
        let mut state = self.state.write().unwrap();
        let mut replacer = self.replacer.write().unwrap();

        if let Some(&frame_id) = state.page_table.get(&page_id) {
            state.frames[frame_id].pin_count += 1;
            replacer.pin(frame_id)?;
            return Ok(frame_id);
        }

        if state.free_frames.is_empty() && replacer.size()? == 0 {
            return Err(BufferPoolManagerError::NoFrameAvailable);
        }

        self.replace_and_update(page_id, false, state, replacer)
    }

    /// Claim a frame for `page_id`, from the free list first, else by
    /// evicting a victim. Called with the pool and replacer latches held;
    /// both are released before any disk I/O, with the claimed frame's
    /// latch held across the I/O instead.
    fn replace_and_update(
        &self,
        page_id: PageId,
        new_page: bool,
        mut state: RwLockWriteGuard<'_, PoolState>,
        mut replacer: RwLockWriteGuard<'_, ReplacerGeneric>,
    ) -> Result<FrameId, BufferPoolManagerError> {
        let (frame_id, write_back) = match state.free_frames.pop_front() {
            Some(frame_id) => (frame_id, None),
            None => {
                let frame_id = replacer
                    .victim()?
                    .ok_or(BufferPoolManagerError::NoFrameAvailable)?;
                let old = state.frames[frame_id];
                if let Some(old_page_id) = old.page_id {
                    state.page_table.remove(&old_page_id);
                }
                // The victim already left the candidate set; pin is
                // idempotent.
                replacer.pin(frame_id)?;
                (frame_id, old.page_id.filter(|_| old.is_dirty))
            }
        };

        state.page_table.insert(page_id, frame_id);
        state.frames[frame_id] = FrameMeta {
            page_id: Some(page_id),
            pin_count: 1,
            is_dirty: new_page,
        };

        // Latch handoff: the frame latch is taken before the pool latch is
        // released, so a concurrent fetch of `page_id` finds the mapping
        // and then blocks on the frame until the I/O below completes.
        let mut data = self.page_data[frame_id].write().unwrap();
        drop(replacer);
        drop(state);

        let mut disk_manager = self.disk_manager.write().unwrap();
        if let Some(old_page_id) = write_back {
            debug!(old_page_id, frame_id, "writing back dirty victim");
            disk_manager.write_page(old_page_id, &data[..])?;
        }
        if new_page {
            *data = [0u8; PAGE_SIZE];
        } else {
            *data = disk_manager.read_page(page_id)?;
        }

        Ok(frame_id)
    }
}

impl IBufferPoolManager for BufferPoolManager {
    fn fetch_page(&self, page_id: PageId) -> Result<ReadOnlyPage, BufferPoolManagerError> {
        let frame_id = self.fetch_page_frame(page_id)?;
        Ok(self.page_data[frame_id].read().unwrap())
    }

    fn fetch_page_writable(
        &self,
        page_id: PageId,
    ) -> Result<WritablePage, BufferPoolManagerError> {
        let frame_id = self.fetch_page_frame(page_id)?;
        Ok(self.page_data[frame_id].write().unwrap())
    }

    fn new_page(&self) -> Result<(PageId, WritablePage), BufferPoolManagerError> {
        let state = self.state.write().unwrap();
        let replacer = self.replacer.write().unwrap();

        if state.free_frames.is_empty() && replacer.size()? == 0 {
            return Err(BufferPoolManagerError::NoFrameAvailable);
        }

        // An id-counter bump on the disk manager, not page I/O.
        let page_id = self.disk_manager.write().unwrap().allocate_page()?;

        let frame_id = self.replace_and_update(page_id, true, state, replacer)?;
        Ok((page_id, self.page_data[frame_id].write().unwrap()))
    }

    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<(), BufferPoolManagerError> {
        let mut state = self.state.write().unwrap();
        let mut replacer = self.replacer.write().unwrap();

        let frame_id = match state.page_table.get(&page_id) {
            Some(&frame_id) => frame_id,
            None => return Err(BufferPoolManagerError::PageNotInPool),
        };

        let frame = &mut state.frames[frame_id];
        if frame.pin_count == 0 {
            return Err(BufferPoolManagerError::PinCountZero);
        }
        frame.is_dirty |= is_dirty;
        frame.pin_count -= 1;
        if frame.pin_count == 0 {
            replacer.unpin(frame_id)?;
        }
        Ok(())
    }

    fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        let mut state = self.state.write().unwrap();
        let frame_id = match state.page_table.get(&page_id) {
            Some(&frame_id) => frame_id,
            None => return Err(BufferPoolManagerError::PageNotInPool),
        };
        if !state.frames[frame_id].is_dirty {
            return Ok(());
        }

        // Cleared optimistically under the pool latch and restored below if
        // the write fails. Holding the frame latch across the I/O keeps
        // eviction and writers off the frame in the meantime.
        state.frames[frame_id].is_dirty = false;
        let data = self.page_data[frame_id].write().unwrap();
        drop(state);

        let result = self.disk_manager.write().unwrap().write_page(page_id, &data[..]);
        drop(data);

        if result.is_err() {
            let mut state = self.state.write().unwrap();
            if state.page_table.get(&page_id) == Some(&frame_id) {
                state.frames[frame_id].is_dirty = true;
            }
        }
        result.map_err(Into::into)
    }

    fn flush_all_pages(&self) -> Result<(), BufferPoolManagerError> {
        let dirty_pages: Vec<PageId> = {
            let state = self.state.read().unwrap();
            state
                .frames
                .iter()
                .filter(|frame| frame.is_dirty)
                .filter_map(|frame| frame.page_id)
                .collect()
        };

        for page_id in dirty_pages {
            match self.flush_page(page_id) {
                // Evicted in the meantime; the eviction wrote it back.
                Err(BufferPoolManagerError::PageNotInPool) => {}
                result => result?,
            }
        }
        Ok(())
    }

    fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        let mut state = self.state.write().unwrap();

        let frame_id = match state.page_table.get(&page_id) {
            Some(&frame_id) => frame_id,
            None => {
                // Not resident; only the disk copy needs to go.
                drop(state);
                self.disk_manager.write().unwrap().deallocate_page(page_id)?;
                return Ok(());
            }
        };

        if state.frames[frame_id].pin_count > 0 {
            return Err(BufferPoolManagerError::PageInUse);
        }

        // Unpinned resident pages sit in the candidate set; drop this one
        // out before the frame goes back on the free list.
        self.replacer.write().unwrap().pin(frame_id)?;

        state.page_table.remove(&page_id);
        state.frames[frame_id] = FrameMeta::vacant();
        // The frame latch is taken before the frame is handed to the free
        // list, so the next claimant sees zeroed bytes.
        let mut data = self.page_data[frame_id].write().unwrap();
        state.free_frames.push_back(frame_id);
        drop(state);

        *data = [0u8; PAGE_SIZE];
        drop(data);

        debug!(page_id, frame_id, "deleted page");
        self.disk_manager.write().unwrap().deallocate_page(page_id)?;
        Ok(())
    }
}

#[cfg(test)]
impl BufferPoolManager {
    fn pin_count_of(&self, page_id: PageId) -> Option<usize> {
        let state = self.state.read().unwrap();
        let &frame_id = state.page_table.get(&page_id)?;
        Some(state.frames[frame_id].pin_count)
    }

    fn is_resident(&self, page_id: PageId) -> bool {
        self.state.read().unwrap().page_table.contains_key(&page_id)
    }

    fn free_frame_count(&self) -> usize {
        self.state.read().unwrap().free_frames.len()
    }

    fn assert_invariants(&self) {
        let state = self.state.read().unwrap();
        let replacer = self.replacer.read().unwrap();

        for (&page_id, &frame_id) in &state.page_table {
            assert_eq!(state.frames[frame_id].page_id, Some(page_id));
        }

        let resident = state
            .frames
            .iter()
            .filter(|frame| frame.page_id.is_some())
            .count();
        assert_eq!(resident, state.page_table.len());
        assert_eq!(resident, self.pool_size - state.free_frames.len());

        let unpinned_resident = state
            .frames
            .iter()
            .filter(|frame| frame.page_id.is_some() && frame.pin_count == 0)
            .count();
        assert_eq!(replacer.size().unwrap(), unpinned_resident);

        for &frame_id in &state.free_frames {
            assert_eq!(state.frames[frame_id], FrameMeta::vacant());
        }
    }
}
