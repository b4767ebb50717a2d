use super::util::{read_u32_at, write_u32_at};
use crate::dbms::buffer::types::{ReadOnlyPage, WritablePage};
use crate::dbms::types::{PageId, NULL_PAGE_ID, PAGE_SIZE};

#[derive(Debug, PartialEq, Eq)]
pub enum HashTableHeaderExtensionError {
    /// The extension's block page directory is full
    NoMoreCapacity,
    /// Directory position beyond the extension's capacity
    SlotOutOfRange,
}

const PAGE_ENTRY_SIZE_BYTES: usize = (PageId::BITS / 8) as usize;
const HEADER_PAGE_ID_OFFSET_BYTES: usize = 0;
const PREVIOUS_EXTENSION_PAGE_OFFSET_BYTES: usize = PAGE_ENTRY_SIZE_BYTES;
const NEXT_EXTENSION_PAGE_OFFSET_BYTES: usize = 2 * PAGE_ENTRY_SIZE_BYTES;
const BLOCK_PAGE_IDS_START_OFFSET_BYTES: usize = 3 * PAGE_ENTRY_SIZE_BYTES;
const BLOCK_PAGE_IDS_COUNT: usize =
    (PAGE_SIZE - BLOCK_PAGE_IDS_START_OFFSET_BYTES) / PAGE_ENTRY_SIZE_BYTES;

/// Interact with a page as an overflow directory page chained off a hash
/// table's header.
pub trait IHashTableHeaderExtensionPageRead {
    /// Page ID of the root header page
    fn get_header_page_id(&self) -> Result<PageId, HashTableHeaderExtensionError>;
    /// Page ID of the previous extension page, if there is one
    fn get_previous_extension_page_id(
        &self,
    ) -> Result<Option<PageId>, HashTableHeaderExtensionError>;
    /// Page ID of the next extension page, if there is one
    fn get_next_extension_page_id(&self) -> Result<Option<PageId>, HashTableHeaderExtensionError>;
    /// The block page ID at the given directory position
    fn get_block_page_id(
        &self,
        position: usize,
    ) -> Result<Option<PageId>, HashTableHeaderExtensionError>;
}

pub trait IHashTableHeaderExtensionPageWrite: IHashTableHeaderExtensionPageRead {
    /// Set up a fresh extension page with no block pages registered
    fn initialize(
        &mut self,
        header_page_id: PageId,
        previous_extension_page_id: Option<PageId>,
        next_extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderExtensionError>;
    fn set_header_page_id(&mut self, page_id: PageId)
        -> Result<(), HashTableHeaderExtensionError>;
    fn set_previous_extension_page_id(
        &mut self,
        extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderExtensionError>;
    fn set_next_extension_page_id(
        &mut self,
        extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderExtensionError>;
    /// Register a block page in the first free directory position
    fn add_block_page_id(&mut self, page_id: PageId)
        -> Result<(), HashTableHeaderExtensionError>;
}

fn read_page_id_field(data: &[u8], offset: usize) -> Option<PageId> {
    match read_u32_at(data, offset) {
        NULL_PAGE_ID => None,
        page_id => Some(page_id),
    }
}

fn read_block_page_id(
    data: &[u8],
    position: usize,
) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
    if position >= BLOCK_PAGE_IDS_COUNT {
        return Err(HashTableHeaderExtensionError::SlotOutOfRange);
    }
    Ok(read_page_id_field(
        data,
        BLOCK_PAGE_IDS_START_OFFSET_BYTES + position * PAGE_ENTRY_SIZE_BYTES,
    ))
}

pub struct ReadOnlyHashTableHeaderExtensionPage<'a> {
    page: ReadOnlyPage<'a>,
}

impl<'a> ReadOnlyHashTableHeaderExtensionPage<'a> {
    pub fn new(page: ReadOnlyPage<'a>) -> Self {
        Self { page }
    }
}

impl IHashTableHeaderExtensionPageRead for ReadOnlyHashTableHeaderExtensionPage<'_> {
    fn get_header_page_id(&self) -> Result<PageId, HashTableHeaderExtensionError> {
        Ok(read_u32_at(&self.page[..], HEADER_PAGE_ID_OFFSET_BYTES))
    }

    fn get_previous_extension_page_id(
        &self,
    ) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
        Ok(read_page_id_field(
            &self.page[..],
            PREVIOUS_EXTENSION_PAGE_OFFSET_BYTES,
        ))
    }

    fn get_next_extension_page_id(&self) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
        Ok(read_page_id_field(
            &self.page[..],
            NEXT_EXTENSION_PAGE_OFFSET_BYTES,
        ))
    }

    fn get_block_page_id(
        &self,
        position: usize,
    ) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
        read_block_page_id(&self.page[..], position)
    }
}

pub struct WritableHashTableHeaderExtensionPage<'a> {
    page: WritablePage<'a>,
}

impl<'a> WritableHashTableHeaderExtensionPage<'a> {
    pub fn new(page: WritablePage<'a>) -> Self {
        Self { page }
    }

    /// Number of block page IDs one extension page can hold.
    pub fn capacity_slots() -> usize {
        BLOCK_PAGE_IDS_COUNT
    }
}

impl IHashTableHeaderExtensionPageRead for WritableHashTableHeaderExtensionPage<'_> {
    fn get_header_page_id(&self) -> Result<PageId, HashTableHeaderExtensionError> {
        Ok(read_u32_at(&self.page[..], HEADER_PAGE_ID_OFFSET_BYTES))
    }

    fn get_previous_extension_page_id(
        &self,
    ) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
        Ok(read_page_id_field(
            &self.page[..],
            PREVIOUS_EXTENSION_PAGE_OFFSET_BYTES,
        ))
    }

    fn get_next_extension_page_id(&self) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
        Ok(read_page_id_field(
            &self.page[..],
            NEXT_EXTENSION_PAGE_OFFSET_BYTES,
        ))
    }

    fn get_block_page_id(
        &self,
        position: usize,
    ) -> Result<Option<PageId>, HashTableHeaderExtensionError> {
        read_block_page_id(&self.page[..], position)
    }
}

impl IHashTableHeaderExtensionPageWrite for WritableHashTableHeaderExtensionPage<'_> {
    fn initialize(
        &mut self,
        header_page_id: PageId,
        previous_extension_page_id: Option<PageId>,
        next_extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderExtensionError> {
        self.set_header_page_id(header_page_id)?;
        self.set_previous_extension_page_id(previous_extension_page_id)?;
        self.set_next_extension_page_id(next_extension_page_id)?;
        for position in 0..BLOCK_PAGE_IDS_COUNT {
            write_u32_at(
                &mut self.page[..],
                BLOCK_PAGE_IDS_START_OFFSET_BYTES + position * PAGE_ENTRY_SIZE_BYTES,
                NULL_PAGE_ID,
            );
        }
        Ok(())
    }

    fn set_header_page_id(
        &mut self,
        page_id: PageId,
    ) -> Result<(), HashTableHeaderExtensionError> {
        write_u32_at(&mut self.page[..], HEADER_PAGE_ID_OFFSET_BYTES, page_id);
        Ok(())
    }

    fn set_previous_extension_page_id(
        &mut self,
        extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderExtensionError> {
        write_u32_at(
            &mut self.page[..],
            PREVIOUS_EXTENSION_PAGE_OFFSET_BYTES,
            extension_page_id.unwrap_or(NULL_PAGE_ID),
        );
        Ok(())
    }

    fn set_next_extension_page_id(
        &mut self,
        extension_page_id: Option<PageId>,
    ) -> Result<(), HashTableHeaderExtensionError> {
        write_u32_at(
            &mut self.page[..],
            NEXT_EXTENSION_PAGE_OFFSET_BYTES,
            extension_page_id.unwrap_or(NULL_PAGE_ID),
        );
        Ok(())
    }

    fn add_block_page_id(
        &mut self,
        page_id: PageId,
    ) -> Result<(), HashTableHeaderExtensionError> {
        for position in 0..BLOCK_PAGE_IDS_COUNT {
            if self.get_block_page_id(position)?.is_none() {
                write_u32_at(
                    &mut self.page[..],
                    BLOCK_PAGE_IDS_START_OFFSET_BYTES + position * PAGE_ENTRY_SIZE_BYTES,
                    page_id,
                );
                return Ok(());
            }
        }
        Err(HashTableHeaderExtensionError::NoMoreCapacity)
    }
}
