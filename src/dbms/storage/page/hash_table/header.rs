use super::util::{read_u32_at, write_u32_at};
use crate::dbms::buffer::types::{ReadOnlyPage, WritablePage};
use crate::dbms::types::{PageId, NULL_PAGE_ID, PAGE_SIZE};

#[derive(Debug, PartialEq, Eq)]
pub enum HashTableHeaderError {
    /// The header's block page directory is full
    NoMoreCapacity,
    /// Directory position beyond the header's capacity
    SlotOutOfRange,
}

const PAGE_ENTRY_SIZE_BYTES: usize = (PageId::BITS / 8) as usize;
const PAGE_ID_OFFSET_BYTES: usize = 0;
const SIZE_OFFSET_BYTES: usize = PAGE_ENTRY_SIZE_BYTES;
const NEXT_IND_OFFSET_BYTES: usize = 2 * PAGE_ENTRY_SIZE_BYTES;
const LSN_OFFSET_BYTES: usize = 3 * PAGE_ENTRY_SIZE_BYTES;
const EXTENSION_PAGE_OFFSET_BYTES: usize = 4 * PAGE_ENTRY_SIZE_BYTES;
const BLOCK_PAGE_IDS_START_OFFSET_BYTES: usize = 5 * PAGE_ENTRY_SIZE_BYTES;
const BLOCK_PAGE_IDS_COUNT: usize =
    (PAGE_SIZE - BLOCK_PAGE_IDS_START_OFFSET_BYTES) / PAGE_ENTRY_SIZE_BYTES;

/// Interact with a page as the root directory page of a hash table.
pub trait IHashTableHeaderPageRead {
    /// The header page's own page ID
    fn get_page_id(&self) -> Result<PageId, HashTableHeaderError>;
    /// Total slot capacity of the table
    fn get_size(&self) -> Result<u32, HashTableHeaderError>;
    /// Number of block page IDs registered in this header
    fn get_next_ind(&self) -> Result<u32, HashTableHeaderError>;
    /// Log sequence number, reserved for recovery integration
    fn get_lsn(&self) -> Result<u32, HashTableHeaderError>;
    /// The first header extension page, if there is one
    fn get_extension_page_id(&self) -> Result<Option<PageId>, HashTableHeaderError>;
    /// The block page ID at the given directory position
    fn get_block_page_id(&self, position: usize) -> Result<Option<PageId>, HashTableHeaderError>;
}

pub trait IHashTableHeaderPageWrite: IHashTableHeaderPageRead {
    /// Set up a fresh header page with no block pages registered
    fn initialize(&mut self, page_id: PageId, size: u32) -> Result<(), HashTableHeaderError>;
    fn set_size(&mut self, size: u32) -> Result<(), HashTableHeaderError>;
    fn set_lsn(&mut self, lsn: u32) -> Result<(), HashTableHeaderError>;
    fn set_extension_page_id(
        &mut self,
        extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderError>;
    /// Register the next block page in the directory
    fn add_block_page_id(&mut self, page_id: PageId) -> Result<(), HashTableHeaderError>;
}

fn read_block_page_id(data: &[u8], position: usize) -> Result<Option<PageId>, HashTableHeaderError> {
    if position >= BLOCK_PAGE_IDS_COUNT {
        return Err(HashTableHeaderError::SlotOutOfRange);
    }
    match read_u32_at(
        data,
        BLOCK_PAGE_IDS_START_OFFSET_BYTES + position * PAGE_ENTRY_SIZE_BYTES,
    ) {
        NULL_PAGE_ID => Ok(None),
        page_id => Ok(Some(page_id)),
    }
}

pub struct ReadOnlyHashTableHeaderPage<'a> {
    page: ReadOnlyPage<'a>,
}

impl<'a> ReadOnlyHashTableHeaderPage<'a> {
    pub fn new(page: ReadOnlyPage<'a>) -> Self {
        Self { page }
    }
}

impl IHashTableHeaderPageRead for ReadOnlyHashTableHeaderPage<'_> {
    fn get_page_id(&self) -> Result<PageId, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], PAGE_ID_OFFSET_BYTES))
    }

    fn get_size(&self) -> Result<u32, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], SIZE_OFFSET_BYTES))
    }

    fn get_next_ind(&self) -> Result<u32, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], NEXT_IND_OFFSET_BYTES))
    }

    fn get_lsn(&self) -> Result<u32, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], LSN_OFFSET_BYTES))
    }

    fn get_extension_page_id(&self) -> Result<Option<PageId>, HashTableHeaderError> {
        match read_u32_at(&self.page[..], EXTENSION_PAGE_OFFSET_BYTES) {
            NULL_PAGE_ID => Ok(None),
            page_id => Ok(Some(page_id)),
        }
    }

    fn get_block_page_id(&self, position: usize) -> Result<Option<PageId>, HashTableHeaderError> {
        read_block_page_id(&self.page[..], position)
    }
}

pub struct WritableHashTableHeaderPage<'a> {
    page: WritablePage<'a>,
}

impl<'a> WritableHashTableHeaderPage<'a> {
    pub fn new(page: WritablePage<'a>) -> Self {
        Self { page }
    }

    /// Number of block page IDs one header page can hold.
    pub fn capacity_slots() -> usize {
        BLOCK_PAGE_IDS_COUNT
    }
}

impl IHashTableHeaderPageRead for WritableHashTableHeaderPage<'_> {
    fn get_page_id(&self) -> Result<PageId, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], PAGE_ID_OFFSET_BYTES))
    }

    fn get_size(&self) -> Result<u32, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], SIZE_OFFSET_BYTES))
    }

    fn get_next_ind(&self) -> Result<u32, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], NEXT_IND_OFFSET_BYTES))
    }

    fn get_lsn(&self) -> Result<u32, HashTableHeaderError> {
        Ok(read_u32_at(&self.page[..], LSN_OFFSET_BYTES))
    }

    fn get_extension_page_id(&self) -> Result<Option<PageId>, HashTableHeaderError> {
        match read_u32_at(&self.page[..], EXTENSION_PAGE_OFFSET_BYTES) {
            NULL_PAGE_ID => Ok(None),
            page_id => Ok(Some(page_id)),
        }
    }

    fn get_block_page_id(&self, position: usize) -> Result<Option<PageId>, HashTableHeaderError> {
        read_block_page_id(&self.page[..], position)
    }
}

impl IHashTableHeaderPageWrite for WritableHashTableHeaderPage<'_> {
    fn initialize(&mut self, page_id: PageId, size: u32) -> Result<(), HashTableHeaderError> {
        write_u32_at(&mut self.page[..], PAGE_ID_OFFSET_BYTES, page_id);
        self.set_size(size)?;
        write_u32_at(&mut self.page[..], NEXT_IND_OFFSET_BYTES, 0);
        self.set_lsn(0)?;
        self.set_extension_page_id(None)?;
        for position in 0..BLOCK_PAGE_IDS_COUNT {
            write_u32_at(
                &mut self.page[..],
                BLOCK_PAGE_IDS_START_OFFSET_BYTES + position * PAGE_ENTRY_SIZE_BYTES,
                NULL_PAGE_ID,
            );
        }
        Ok(())
    }

    fn set_size(&mut self, size: u32) -> Result<(), HashTableHeaderError> {
        write_u32_at(&mut self.page[..], SIZE_OFFSET_BYTES, size);
        Ok(())
    }

    fn set_lsn(&mut self, lsn: u32) -> Result<(), HashTableHeaderError> {
        write_u32_at(&mut self.page[..], LSN_OFFSET_BYTES, lsn);
        Ok(())
    }

    fn set_extension_page_id(
        &mut self,
        extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderError> {
        write_u32_at(
            &mut self.page[..],
            EXTENSION_PAGE_OFFSET_BYTES,
            extension_page_id.unwrap_or(NULL_PAGE_ID),
        );
        Ok(())
    }

    fn add_block_page_id(&mut self, page_id: PageId) -> Result<(), HashTableHeaderError> {
        let next_ind = self.get_next_ind()? as usize;
        if next_ind >= BLOCK_PAGE_IDS_COUNT {
            return Err(HashTableHeaderError::NoMoreCapacity);
        }
        write_u32_at(
            &mut self.page[..],
            BLOCK_PAGE_IDS_START_OFFSET_BYTES + next_ind * PAGE_ENTRY_SIZE_BYTES,
            page_id,
        );
        write_u32_at(
            &mut self.page[..],
            NEXT_IND_OFFSET_BYTES,
            (next_ind + 1) as u32,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::sync::RwLock;

    use crate::dbms::types::{PageData, PAGE_SIZE};

    fn empty_page() -> RwLock<PageData> {
        RwLock::new([0u8; PAGE_SIZE])
    }

    #[rstest]
    fn test_initialize_and_read_back() {
        let lock = empty_page();
        let mut header = WritableHashTableHeaderPage::new(lock.write().unwrap());
        header.initialize(9, 4000).unwrap();

        assert_eq!(header.get_page_id().unwrap(), 9);
        assert_eq!(header.get_size().unwrap(), 4000);
        assert_eq!(header.get_next_ind().unwrap(), 0);
        assert_eq!(header.get_lsn().unwrap(), 0);
        assert_eq!(header.get_extension_page_id().unwrap(), None);
        assert_eq!(header.get_block_page_id(0).unwrap(), None);
        drop(header);

        let header = ReadOnlyHashTableHeaderPage::new(lock.read().unwrap());
        assert_eq!(header.get_page_id().unwrap(), 9);
        assert_eq!(header.get_size().unwrap(), 4000);
    }

    #[rstest]
    fn test_add_block_page_ids_in_order() {
        let lock = empty_page();
        let mut header = WritableHashTableHeaderPage::new(lock.write().unwrap());
        header.initialize(0, 100).unwrap();

        header.add_block_page_id(11).unwrap();
        header.add_block_page_id(22).unwrap();

        assert_eq!(header.get_next_ind().unwrap(), 2);
        assert_eq!(header.get_block_page_id(0).unwrap(), Some(11));
        assert_eq!(header.get_block_page_id(1).unwrap(), Some(22));
        assert_eq!(header.get_block_page_id(2).unwrap(), None);
    }

    #[rstest]
    fn test_add_block_page_id_capacity() {
        let lock = empty_page();
        let mut header = WritableHashTableHeaderPage::new(lock.write().unwrap());
        header.initialize(0, 100).unwrap();

        for i in 0..WritableHashTableHeaderPage::capacity_slots() {
            header.add_block_page_id(i as PageId).unwrap();
        }
        assert_eq!(
            header.add_block_page_id(0),
            Err(HashTableHeaderError::NoMoreCapacity)
        );
    }

    #[rstest]
    fn test_block_page_id_position_out_of_range() {
        let lock = empty_page();
        let mut header = WritableHashTableHeaderPage::new(lock.write().unwrap());
        header.initialize(0, 100).unwrap();

        assert_eq!(
            header.get_block_page_id(WritableHashTableHeaderPage::capacity_slots()),
            Err(HashTableHeaderError::SlotOutOfRange)
        );
    }

    #[rstest]
    fn test_extension_page_link() {
        let lock = empty_page();
        let mut header = WritableHashTableHeaderPage::new(lock.write().unwrap());
        header.initialize(0, 100).unwrap();

        header.set_extension_page_id(Some(77)).unwrap();
        assert_eq!(header.get_extension_page_id().unwrap(), Some(77));
        header.set_extension_page_id(None).unwrap();
        assert_eq!(header.get_extension_page_id().unwrap(), None);
    }
}
