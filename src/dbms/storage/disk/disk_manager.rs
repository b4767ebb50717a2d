#[cfg(test)]
use mockall::automock;

use crate::dbms::types::{PageData, PageId};

#[derive(Debug, PartialEq, Eq)]
pub enum DiskManagerError {
    /// The page was never allocated, or has been deallocated
    PageNotFound,
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for DiskManagerError {
    fn from(e: std::io::Error) -> Self {
        DiskManagerError::Io(e.kind())
    }
}

#[cfg_attr(test, automock)]
pub trait IDiskManager {
    /// Write a full page of data under the given page ID.
    fn write_page(&mut self, page_id: PageId, page: &[u8]) -> Result<(), DiskManagerError>;
    /// Read a full page of data by page ID.
    fn read_page(&self, page_id: PageId) -> Result<PageData, DiskManagerError>;
    /// Append a record to the log.
    fn write_log(&mut self, log: &[u8]) -> Result<(), DiskManagerError>;
    /// Read `size` bytes of log data starting at `offset`.
    fn read_log(&self, size: usize, offset: usize) -> Result<Vec<u8>, DiskManagerError>;
    /// Hand out a fresh page ID. IDs are never reused.
    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError>;
    /// Mark a page ID as free.
    fn deallocate_page(&mut self, page_id: PageId) -> Result<(), DiskManagerError>;
}
