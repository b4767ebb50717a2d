use std::collections::HashMap;

use super::{DiskManagerError, IDiskManager};
use crate::dbms::types::{PageData, PageId, PAGE_SIZE};

/// A purely in-memory implementation of the disk manager for testing.
/// Exposes its underlying data structures for inspection in tests.
pub struct InMemoryDiskManager {
    /// page_id -> page_data
    pub pages: HashMap<PageId, Vec<u8>>,
    pub log: Vec<u8>,
    pub next_page_id: PageId,
}

impl InMemoryDiskManager {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            log: Vec::new(),
            next_page_id: 0,
        }
    }
}

impl IDiskManager for InMemoryDiskManager {
    fn write_page(&mut self, page_id: PageId, page: &[u8]) -> Result<(), DiskManagerError> {
        // Must allocate a page before writing to it
        if !self.pages.contains_key(&page_id) {
            return Err(DiskManagerError::PageNotFound);
        }
        self.pages.insert(page_id, page.to_vec());
        Ok(())
    }

    fn read_page(&self, page_id: PageId) -> Result<PageData, DiskManagerError> {
        let page = match self.pages.get(&page_id) {
            Some(page) => page,
            None => return Err(DiskManagerError::PageNotFound),
        };
        let mut page_data = [0u8; PAGE_SIZE];
        page_data.copy_from_slice(page);
        Ok(page_data)
    }

    fn write_log(&mut self, log: &[u8]) -> Result<(), DiskManagerError> {
        self.log.extend_from_slice(log);
        Ok(())
    }

    fn read_log(&self, size: usize, offset: usize) -> Result<Vec<u8>, DiskManagerError> {
        if offset + size > self.log.len() {
            return Err(DiskManagerError::Io(std::io::ErrorKind::UnexpectedEof));
        }
        Ok(self.log[offset..offset + size].to_vec())
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError> {
        let page_id = self.next_page_id;
        self.next_page_id += 1;
        self.pages.insert(page_id, vec![0u8; PAGE_SIZE]);
        Ok(page_id)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<(), DiskManagerError> {
        self.pages.remove(&page_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_write_page() {
        let mut disk_manager = InMemoryDiskManager::new();
        let page_id = disk_manager.allocate_page().unwrap();
        let page = [1u8; PAGE_SIZE];
        disk_manager.write_page(page_id, &page).unwrap();
        assert_eq!(disk_manager.pages.get(&page_id).unwrap(), &page);
    }

    #[rstest]
    fn test_write_page_nonexistent() {
        let mut disk_manager = InMemoryDiskManager::new();
        let page_id = disk_manager.allocate_page().unwrap();
        let page = [1u8; PAGE_SIZE];
        let result = disk_manager.write_page(page_id + 1, &page);
        assert_eq!(result, Err(DiskManagerError::PageNotFound));
    }

    #[rstest]
    fn test_read_page() {
        let mut disk_manager = InMemoryDiskManager::new();
        let page_id = disk_manager.allocate_page().unwrap();
        let page = [1u8; PAGE_SIZE];
        disk_manager.write_page(page_id, &page).unwrap();
        assert_eq!(disk_manager.read_page(page_id).unwrap(), page);
    }

    #[rstest]
    fn test_read_page_nonexistent() {
        let disk_manager = InMemoryDiskManager::new();
        assert_eq!(
            disk_manager.read_page(0),
            Err(DiskManagerError::PageNotFound)
        );
    }

    #[rstest]
    fn test_allocate_page() {
        let mut disk_manager = InMemoryDiskManager::new();
        assert_eq!(disk_manager.allocate_page().unwrap(), 0);
        assert_eq!(disk_manager.pages.len(), 1);
        assert_eq!(disk_manager.allocate_page().unwrap(), 1);
        assert_eq!(disk_manager.pages.len(), 2);
    }

    #[rstest]
    fn test_deallocate_page() {
        let mut disk_manager = InMemoryDiskManager::new();
        disk_manager.allocate_page().unwrap();
        disk_manager.allocate_page().unwrap();
        disk_manager.allocate_page().unwrap();
        disk_manager.deallocate_page(1).unwrap();
        assert_eq!(disk_manager.pages.len(), 2);
        assert!(disk_manager.pages.get(&1).is_none());
    }

    #[rstest]
    fn test_deallocated_page_ids_not_reused() {
        let mut disk_manager = InMemoryDiskManager::new();
        disk_manager.allocate_page().unwrap();
        disk_manager.allocate_page().unwrap();
        disk_manager.allocate_page().unwrap();
        disk_manager.deallocate_page(1).unwrap();
        let page_id = disk_manager.allocate_page().unwrap();
        assert_eq!(page_id, 3);
        assert!(disk_manager.pages.get(&1).is_none());
    }

    #[rstest]
    fn test_log_round_trip() {
        let mut disk_manager = InMemoryDiskManager::new();
        disk_manager.write_log(b"record").unwrap();
        assert_eq!(disk_manager.read_log(6, 0).unwrap(), b"record");
        assert!(disk_manager.read_log(7, 0).is_err());
    }
}
