use std::fs::{File, OpenOptions};
// Positioned I/O, so concurrent page reads and writes need no lock on the
// file itself.
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;

use super::{DiskManagerError, IDiskManager};
use crate::dbms::types::{PageData, PageId, PAGE_SIZE};

/// Disk manager backed by a database file and a sibling log file.
///
/// Page IDs are allocated monotonically and never reused; `allocate_page`
/// extends the database file with a zeroed page so the ID count survives
/// reopening the file.
pub struct FileDiskManager {
    db_file: File,
    log_file: File,
    next_page_id: Mutex<PageId>,
    log_end: Mutex<u64>,
}

impl FileDiskManager {
    pub fn new(db_path: &Path, log_path: &Path) -> Result<Self, DiskManagerError> {
        let db_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(db_path)?;
        let log_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(log_path)?;

        let next_page_id = (db_file.metadata()?.len() / PAGE_SIZE as u64) as PageId;
        let log_end = log_file.metadata()?.len();
        debug!(?db_path, next_page_id, "opened database file");

        Ok(Self {
            db_file,
            log_file,
            next_page_id: Mutex::new(next_page_id),
            log_end: Mutex::new(log_end),
        })
    }

    fn page_offset(page_id: PageId) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }

    fn check_allocated(&self, page_id: PageId) -> Result<(), DiskManagerError> {
        if page_id >= *self.next_page_id.lock().unwrap() {
            return Err(DiskManagerError::PageNotFound);
        }
        Ok(())
    }
}

impl IDiskManager for FileDiskManager {
    fn write_page(&mut self, page_id: PageId, page: &[u8]) -> Result<(), DiskManagerError> {
        self.check_allocated(page_id)?;
        self.db_file.write_all_at(page, Self::page_offset(page_id))?;
        Ok(())
    }

    fn read_page(&self, page_id: PageId) -> Result<PageData, DiskManagerError> {
        self.check_allocated(page_id)?;
        let mut data = [0u8; PAGE_SIZE];
        self.db_file.read_exact_at(&mut data, Self::page_offset(page_id))?;
        Ok(data)
    }

    fn write_log(&mut self, log: &[u8]) -> Result<(), DiskManagerError> {
        let mut log_end = self.log_end.lock().unwrap();
        self.log_file.write_all_at(log, *log_end)?;
        *log_end += log.len() as u64;
        Ok(())
    }

    fn read_log(&self, size: usize, offset: usize) -> Result<Vec<u8>, DiskManagerError> {
        let mut buffer = vec![0u8; size];
        self.log_file.read_exact_at(&mut buffer, offset as u64)?;
        Ok(buffer)
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError> {
        let mut next_page_id = self.next_page_id.lock().unwrap();
        let page_id = *next_page_id;
        // Extend the file up front so a read of the fresh page sees zeroes.
        self.db_file
            .write_all_at(&[0u8; PAGE_SIZE], Self::page_offset(page_id))?;
        *next_page_id += 1;
        Ok(page_id)
    }

    fn deallocate_page(&mut self, _page_id: PageId) -> Result<(), DiskManagerError> {
        // IDs are never reused; reclaiming the file space is a compaction
        // concern that lives outside the disk manager.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use tempfile::TempDir;

    fn open_manager(dir: &TempDir) -> FileDiskManager {
        FileDiskManager::new(&dir.path().join("test.db"), &dir.path().join("test.log")).unwrap()
    }

    #[rstest]
    fn test_write_read_page() {
        let dir = TempDir::new().unwrap();
        let mut disk_manager = open_manager(&dir);

        let page_id = disk_manager.allocate_page().unwrap();
        let mut page = [0u8; PAGE_SIZE];
        page[0..4].copy_from_slice(b"SILT");
        disk_manager.write_page(page_id, &page).unwrap();

        assert_eq!(disk_manager.read_page(page_id).unwrap(), page);
    }

    #[rstest]
    fn test_fresh_page_reads_zeroed() {
        let dir = TempDir::new().unwrap();
        let mut disk_manager = open_manager(&dir);

        let page_id = disk_manager.allocate_page().unwrap();
        assert_eq!(disk_manager.read_page(page_id).unwrap(), [0u8; PAGE_SIZE]);
    }

    #[rstest]
    fn test_unallocated_page_not_found() {
        let dir = TempDir::new().unwrap();
        let mut disk_manager = open_manager(&dir);

        let page_id = disk_manager.allocate_page().unwrap();
        assert_eq!(
            disk_manager.read_page(page_id + 1),
            Err(DiskManagerError::PageNotFound)
        );
        assert_eq!(
            disk_manager.write_page(page_id + 1, &[0u8; PAGE_SIZE]),
            Err(DiskManagerError::PageNotFound)
        );
    }

    #[rstest]
    fn test_allocation_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut disk_manager = open_manager(&dir);
            assert_eq!(disk_manager.allocate_page().unwrap(), 0);
            assert_eq!(disk_manager.allocate_page().unwrap(), 1);
        }

        let mut disk_manager = open_manager(&dir);
        assert_eq!(disk_manager.allocate_page().unwrap(), 2);
    }

    #[rstest]
    fn test_log_append_and_read() {
        let dir = TempDir::new().unwrap();
        let mut disk_manager = open_manager(&dir);

        disk_manager.write_log(b"first;").unwrap();
        disk_manager.write_log(b"second;").unwrap();

        assert_eq!(disk_manager.read_log(6, 0).unwrap(), b"first;");
        assert_eq!(disk_manager.read_log(7, 6).unwrap(), b"second;");
    }
}
