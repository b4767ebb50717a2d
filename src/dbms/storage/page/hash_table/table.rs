use std::marker::PhantomData;

use tracing::trace;

use super::block::{
    HashTableBlockError, IHashTableBlockPageRead, IHashTableBlockPageWrite,
    ReadOnlyHashTableBlockPage, WritableHashTableBlockPage,
};
use super::hash_function::HashFunction;
use super::header::{
    HashTableHeaderError, IHashTableHeaderPageRead, IHashTableHeaderPageWrite,
    ReadOnlyHashTableHeaderPage, WritableHashTableHeaderPage,
};
use super::header_extension::{
    HashTableHeaderExtensionError, IHashTableHeaderExtensionPageRead,
    IHashTableHeaderExtensionPageWrite, ReadOnlyHashTableHeaderExtensionPage,
    WritableHashTableHeaderExtensionPage,
};
use super::util::{calculate_block_page_layout, PageLayoutError};
use crate::dbms::buffer::pool_manager::{BufferPoolManagerError, IBufferPoolManager};
use crate::dbms::storage::serialize::BytesSerialize;
use crate::dbms::types::PageId;

#[derive(Debug, PartialEq)]
pub enum HashTableInsertResult {
    Inserted,
    /// The exact (key, value) pair is already in the table
    DuplicateEntry,
}

#[derive(Debug, PartialEq)]
pub enum HashTableDeleteResult {
    Deleted,
    DidNotExist,
}

#[derive(Debug, PartialEq)]
pub enum HashTableError {
    /// Every slot in the table is live
    NoSlotsInTable,
    /// The directory does not cover the requested block
    MissingBlockPage,
    BufferPoolManagerError(BufferPoolManagerError),
    HashTableHeaderError(HashTableHeaderError),
    HashTableHeaderExtensionError(HashTableHeaderExtensionError),
    HashTableBlockError(HashTableBlockError),
    PageLayoutError(PageLayoutError),
}

impl From<BufferPoolManagerError> for HashTableError {
    fn from(e: BufferPoolManagerError) -> Self {
        HashTableError::BufferPoolManagerError(e)
    }
}

impl From<HashTableHeaderError> for HashTableError {
    fn from(e: HashTableHeaderError) -> Self {
        HashTableError::HashTableHeaderError(e)
    }
}

impl From<HashTableHeaderExtensionError> for HashTableError {
    fn from(e: HashTableHeaderExtensionError) -> Self {
        HashTableError::HashTableHeaderExtensionError(e)
    }
}

impl From<HashTableBlockError> for HashTableError {
    fn from(e: HashTableBlockError) -> Self {
        HashTableError::HashTableBlockError(e)
    }
}

impl From<PageLayoutError> for HashTableError {
    fn from(e: PageLayoutError) -> Self {
        HashTableError::PageLayoutError(e)
    }
}

pub trait IHashTable<KeyType: BytesSerialize, ValueType: BytesSerialize> {
    /// Create a new hash table over the pool, allocating its header,
    /// directory extensions and block pages.
    fn initialize(
        pool: &impl IBufferPoolManager,
        initial_table_size: u32,
        hash_seed: u64,
    ) -> Result<Self, HashTableError>
    where
        Self: Sized;

    /// Get a single value with the given key, if any exists
    fn get_single_value(
        &self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
    ) -> Result<Option<ValueType>, HashTableError>;

    /// Get all values with the given key
    fn get_all_values(
        &self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
    ) -> Result<Vec<ValueType>, HashTableError>;

    /// Insert a new entry. Keys may repeat, but an exact (key, value)
    /// duplicate is rejected.
    fn insert_entry(
        &mut self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
        value: ValueType,
    ) -> Result<HashTableInsertResult, HashTableError>;

    /// Delete the entry matching both key and value, if it exists
    fn delete_entry(
        &mut self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
        value: ValueType,
    ) -> Result<HashTableDeleteResult, HashTableError>;
}

/// Linear-probing hash table spread over block pages, addressed through a
/// header page and its chain of extension pages.
///
/// Probes walk the slot space from the key's home slot, continuing through
/// tombstones and stopping at the first never-occupied slot.
pub struct LinearProbingHashTable<
    KeyType: BytesSerialize,
    ValueType: BytesSerialize,
    HashFn: HashFunction,
> {
    header_page_id: PageId,
    hash_fn: HashFn,

    _key_type: PhantomData<KeyType>,
    _value_type: PhantomData<ValueType>,
}

/// What a probe found in one slot.
enum SlotContents<KeyType, ValueType> {
    /// Never occupied: the probe chain ends here
    Vacant,
    /// Occupied but not readable: insertable, probing continues
    Tombstone,
    Live(KeyType, ValueType),
}

fn pages_required_for_slots(page_capacity: usize, slots: usize) -> usize {
    let mut pages = slots / page_capacity;
    if slots % page_capacity != 0 {
        pages += 1;
    }
    pages
}

impl<KeyType: BytesSerialize + PartialEq, ValueType: BytesSerialize + PartialEq, HashFn: HashFunction>
    LinearProbingHashTable<KeyType, ValueType, HashFn>
{
    fn entry_size() -> usize {
        KeyType::serialized_size() + ValueType::serialized_size()
    }

    fn block_capacity() -> Result<usize, HashTableError> {
        Ok(calculate_block_page_layout(Self::entry_size())?.max_values)
    }

    /// Total slot capacity, read from the header page.
    fn table_size(&self, pool: &impl IBufferPoolManager) -> Result<usize, HashTableError> {
        let header = ReadOnlyHashTableHeaderPage::new(pool.fetch_page(self.header_page_id)?);
        let size = header.get_size()?;
        drop(header);
        pool.unpin_page(self.header_page_id, false)?;
        Ok(size as usize)
    }

    /// Resolve the page ID of the `block_index`th block page, looking first
    /// in the header directory and then along the extension chain.
    fn block_page_id_at(
        &self,
        pool: &impl IBufferPoolManager,
        block_index: usize,
    ) -> Result<PageId, HashTableError> {
        let header = ReadOnlyHashTableHeaderPage::new(pool.fetch_page(self.header_page_id)?);
        let header_capacity = WritableHashTableHeaderPage::capacity_slots();
        if block_index < header_capacity {
            let block_page_id = header.get_block_page_id(block_index)?;
            drop(header);
            pool.unpin_page(self.header_page_id, false)?;
            return block_page_id.ok_or(HashTableError::MissingBlockPage);
        }

        let mut next_extension = header.get_extension_page_id()?;
        drop(header);
        pool.unpin_page(self.header_page_id, false)?;

        let extension_capacity = WritableHashTableHeaderExtensionPage::capacity_slots();
        let mut remaining = block_index - header_capacity;
        while let Some(extension_page_id) = next_extension {
            let extension =
                ReadOnlyHashTableHeaderExtensionPage::new(pool.fetch_page(extension_page_id)?);
            if remaining < extension_capacity {
                let block_page_id = extension.get_block_page_id(remaining)?;
                drop(extension);
                pool.unpin_page(extension_page_id, false)?;
                return block_page_id.ok_or(HashTableError::MissingBlockPage);
            }
            remaining -= extension_capacity;
            next_extension = extension.get_next_extension_page_id()?;
            drop(extension);
            pool.unpin_page(extension_page_id, false)?;
        }
        Err(HashTableError::MissingBlockPage)
    }

    /// Read one global slot.
    fn read_slot(
        &self,
        pool: &impl IBufferPoolManager,
        block_capacity: usize,
        slot: usize,
    ) -> Result<SlotContents<KeyType, ValueType>, HashTableError> {
        let block_page_id = self.block_page_id_at(pool, slot / block_capacity)?;
        let slot_in_block = slot % block_capacity;

        let block =
            ReadOnlyHashTableBlockPage::<KeyType, ValueType>::new(pool.fetch_page(block_page_id)?)?;
        let contents = if block.slot_readable(slot_in_block)? {
            SlotContents::Live(block.key_at(slot_in_block)?, block.value_at(slot_in_block)?)
        } else if block.slot_occupied(slot_in_block)? {
            SlotContents::Tombstone
        } else {
            SlotContents::Vacant
        };
        drop(block);
        pool.unpin_page(block_page_id, false)?;
        Ok(contents)
    }

    /// Write an entry into one global slot.
    fn put_slot(
        &self,
        pool: &impl IBufferPoolManager,
        block_capacity: usize,
        slot: usize,
        key: KeyType,
        value: ValueType,
    ) -> Result<(), HashTableError> {
        let block_page_id = self.block_page_id_at(pool, slot / block_capacity)?;

        let mut block = WritableHashTableBlockPage::<KeyType, ValueType>::new(
            pool.fetch_page_writable(block_page_id)?,
        )?;
        block.put_slot(slot % block_capacity, key, value)?;
        drop(block);
        pool.unpin_page(block_page_id, true)?;
        Ok(())
    }

    /// Tombstone one global slot.
    fn clear_slot(
        &self,
        pool: &impl IBufferPoolManager,
        block_capacity: usize,
        slot: usize,
    ) -> Result<(), HashTableError> {
        let block_page_id = self.block_page_id_at(pool, slot / block_capacity)?;

        let mut block = WritableHashTableBlockPage::<KeyType, ValueType>::new(
            pool.fetch_page_writable(block_page_id)?,
        )?;
        block.remove_slot(slot % block_capacity)?;
        drop(block);
        pool.unpin_page(block_page_id, true)?;
        Ok(())
    }

    /// Create a new extension page and link it to the end of the directory
    /// chain.
    fn add_extension_page(
        &self,
        pool: &impl IBufferPoolManager,
    ) -> Result<PageId, HashTableError> {
        let (new_extension_page_id, new_page) = pool.new_page()?;
        let mut new_extension = WritableHashTableHeaderExtensionPage::new(new_page);

        let mut header =
            WritableHashTableHeaderPage::new(pool.fetch_page_writable(self.header_page_id)?);
        match header.get_extension_page_id()? {
            Some(first_extension_page_id) => {
                drop(header);
                pool.unpin_page(self.header_page_id, false)?;

                // Walk to the last extension page in the chain
                let mut last_extension_page_id = first_extension_page_id;
                loop {
                    let extension = ReadOnlyHashTableHeaderExtensionPage::new(
                        pool.fetch_page(last_extension_page_id)?,
                    );
                    let next = extension.get_next_extension_page_id()?;
                    drop(extension);
                    pool.unpin_page(last_extension_page_id, false)?;
                    match next {
                        Some(next_page_id) => last_extension_page_id = next_page_id,
                        None => break,
                    }
                }

                new_extension.initialize(
                    self.header_page_id,
                    Some(last_extension_page_id),
                    None,
                )?;
                drop(new_extension);

                let mut last_extension = WritableHashTableHeaderExtensionPage::new(
                    pool.fetch_page_writable(last_extension_page_id)?,
                );
                last_extension.set_next_extension_page_id(Some(new_extension_page_id))?;
                drop(last_extension);
                pool.unpin_page(last_extension_page_id, true)?;
            }
            None => {
                // First extension: hang it directly off the header
                header.set_extension_page_id(Some(new_extension_page_id))?;
                drop(header);
                pool.unpin_page(self.header_page_id, true)?;

                new_extension.initialize(self.header_page_id, None, None)?;
                drop(new_extension);
            }
        }
        pool.unpin_page(new_extension_page_id, true)?;
        Ok(new_extension_page_id)
    }

    /// Create a new block page and register it in the header or the first
    /// extension page with space.
    fn add_block_page(&self, pool: &impl IBufferPoolManager) -> Result<PageId, HashTableError> {
        let (new_block_page_id, new_page) = pool.new_page()?;
        drop(new_page);
        pool.unpin_page(new_block_page_id, true)?;

        let mut header =
            WritableHashTableHeaderPage::new(pool.fetch_page_writable(self.header_page_id)?);
        match header.add_block_page_id(new_block_page_id) {
            Ok(()) => {
                drop(header);
                pool.unpin_page(self.header_page_id, true)?;
                Ok(new_block_page_id)
            }
            Err(HashTableHeaderError::NoMoreCapacity) => {
                let mut next_extension = header.get_extension_page_id()?;
                drop(header);
                pool.unpin_page(self.header_page_id, false)?;

                while let Some(extension_page_id) = next_extension {
                    let mut extension = WritableHashTableHeaderExtensionPage::new(
                        pool.fetch_page_writable(extension_page_id)?,
                    );
                    match extension.add_block_page_id(new_block_page_id) {
                        Ok(()) => {
                            drop(extension);
                            pool.unpin_page(extension_page_id, true)?;
                            return Ok(new_block_page_id);
                        }
                        Err(HashTableHeaderExtensionError::NoMoreCapacity) => {
                            next_extension = extension.get_next_extension_page_id()?;
                            drop(extension);
                            pool.unpin_page(extension_page_id, false)?;
                        }
                        Err(e) => {
                            drop(extension);
                            pool.unpin_page(extension_page_id, false)?;
                            return Err(e.into());
                        }
                    }
                }
                Err(HashTableError::NoSlotsInTable)
            }
            Err(e) => {
                drop(header);
                pool.unpin_page(self.header_page_id, false)?;
                Err(e.into())
            }
        }
    }
}

impl<KeyType: BytesSerialize + PartialEq, ValueType: BytesSerialize + PartialEq, HashFn: HashFunction>
    IHashTable<KeyType, ValueType> for LinearProbingHashTable<KeyType, ValueType, HashFn>
{
    fn initialize(
        pool: &impl IBufferPoolManager,
        initial_table_size: u32,
        hash_seed: u64,
    ) -> Result<Self, HashTableError> {
        if initial_table_size == 0 {
            return Err(HashTableError::NoSlotsInTable);
        }

        let (header_page_id, header_page) = pool.new_page()?;
        let mut header = WritableHashTableHeaderPage::new(header_page);
        header.initialize(header_page_id, initial_table_size)?;
        drop(header);

        let table = Self {
            header_page_id,
            hash_fn: HashFn::new(hash_seed),
            _key_type: PhantomData,
            _value_type: PhantomData,
        };

        let block_capacity = Self::block_capacity()?;
        let block_pages_needed =
            pages_required_for_slots(block_capacity, initial_table_size as usize);

        let header_capacity = WritableHashTableHeaderPage::capacity_slots();
        if block_pages_needed > header_capacity {
            let extension_slots_needed = block_pages_needed - header_capacity;
            let extension_pages_needed = pages_required_for_slots(
                WritableHashTableHeaderExtensionPage::capacity_slots(),
                extension_slots_needed,
            );
            for _ in 0..extension_pages_needed {
                table.add_extension_page(pool)?;
            }
        }

        for _ in 0..block_pages_needed {
            table.add_block_page(pool)?;
        }

        trace!(
            header_page_id,
            initial_table_size,
            block_pages_needed,
            "initialized hash table"
        );
        pool.unpin_page(header_page_id, true)?;
        Ok(table)
    }

    fn get_single_value(
        &self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
    ) -> Result<Option<ValueType>, HashTableError> {
        let table_size = self.table_size(pool)?;
        let block_capacity = Self::block_capacity()?;
        let home_slot = self.hash_fn.hash(&key.to_bytes(), table_size);

        for probe in 0..table_size {
            let slot = (home_slot + probe) % table_size;
            match self.read_slot(pool, block_capacity, slot)? {
                SlotContents::Vacant => break,
                SlotContents::Tombstone => {}
                SlotContents::Live(slot_key, slot_value) => {
                    if slot_key == key {
                        return Ok(Some(slot_value));
                    }
                }
            }
        }
        Ok(None)
    }

    fn get_all_values(
        &self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
    ) -> Result<Vec<ValueType>, HashTableError> {
        let table_size = self.table_size(pool)?;
        let block_capacity = Self::block_capacity()?;
        let home_slot = self.hash_fn.hash(&key.to_bytes(), table_size);

        let mut values = Vec::new();
        for probe in 0..table_size {
            let slot = (home_slot + probe) % table_size;
            match self.read_slot(pool, block_capacity, slot)? {
                SlotContents::Vacant => break,
                SlotContents::Tombstone => {}
                SlotContents::Live(slot_key, slot_value) => {
                    if slot_key == key {
                        values.push(slot_value);
                    }
                }
            }
        }
        Ok(values)
    }

    fn insert_entry(
        &mut self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
        value: ValueType,
    ) -> Result<HashTableInsertResult, HashTableError> {
        let table_size = self.table_size(pool)?;
        let block_capacity = Self::block_capacity()?;
        let home_slot = self.hash_fn.hash(&key.to_bytes(), table_size);

        // The whole probe chain is checked for a duplicate before the entry
        // is placed in the first free (empty or tombstoned) slot.
        let mut insert_slot = None;
        for probe in 0..table_size {
            let slot = (home_slot + probe) % table_size;
            match self.read_slot(pool, block_capacity, slot)? {
                SlotContents::Vacant => {
                    if insert_slot.is_none() {
                        insert_slot = Some(slot);
                    }
                    break;
                }
                SlotContents::Tombstone => {
                    if insert_slot.is_none() {
                        insert_slot = Some(slot);
                    }
                }
                SlotContents::Live(slot_key, slot_value) => {
                    if slot_key == key && slot_value == value {
                        return Ok(HashTableInsertResult::DuplicateEntry);
                    }
                }
            }
        }

        match insert_slot {
            Some(slot) => {
                self.put_slot(pool, block_capacity, slot, key, value)?;
                Ok(HashTableInsertResult::Inserted)
            }
            None => Err(HashTableError::NoSlotsInTable),
        }
    }

    fn delete_entry(
        &mut self,
        pool: &impl IBufferPoolManager,
        key: KeyType,
        value: ValueType,
    ) -> Result<HashTableDeleteResult, HashTableError> {
        let table_size = self.table_size(pool)?;
        let block_capacity = Self::block_capacity()?;
        let home_slot = self.hash_fn.hash(&key.to_bytes(), table_size);

        for probe in 0..table_size {
            let slot = (home_slot + probe) % table_size;
            match self.read_slot(pool, block_capacity, slot)? {
                SlotContents::Vacant => break,
                SlotContents::Tombstone => {}
                SlotContents::Live(slot_key, slot_value) => {
                    if slot_key == key && slot_value == value {
                        self.clear_slot(pool, block_capacity, slot)?;
                        return Ok(HashTableDeleteResult::Deleted);
                    }
                }
            }
        }
        Ok(HashTableDeleteResult::DidNotExist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    use crate::dbms::buffer::pool_manager::testing::create_testing_pool_manager;
    use crate::dbms::storage::page::hash_table::hash_function::{
        ConstHashFunction, XxHashFunction,
    };

    type TestKey = (u32, bool);
    type TestValue = (f64, u32, bool);
    type TestTable = LinearProbingHashTable<TestKey, TestValue, XxHashFunction>;
    type CollidingTable = LinearProbingHashTable<u32, u64, ConstHashFunction>;

    #[rstest]
    #[case(100, 100)]
    #[case(5, 100)]
    #[case(100, 5)]
    #[case(100, 10000)]
    fn test_initialize(#[case] buffer_pool_size: usize, #[case] initial_table_size: u32) {
        let pool_manager = create_testing_pool_manager(buffer_pool_size);
        TestTable::initialize(&pool_manager, initial_table_size, 0).unwrap();
    }

    #[rstest]
    fn test_initialize_zero_size() {
        let pool_manager = create_testing_pool_manager(10);
        assert!(matches!(
            TestTable::initialize(&pool_manager, 0, 0),
            Err(HashTableError::NoSlotsInTable)
        ));
    }

    #[rstest]
    fn test_insert_and_get() {
        let pool_manager = create_testing_pool_manager(50);
        let mut table = TestTable::initialize(&pool_manager, 1000, 0).unwrap();

        for i in 0..100u32 {
            let result = table
                .insert_entry(&pool_manager, (i, i % 2 == 0), (f64::from(i), i, true))
                .unwrap();
            assert_eq!(result, HashTableInsertResult::Inserted);
        }

        for i in 0..100u32 {
            let value = table
                .get_single_value(&pool_manager, (i, i % 2 == 0))
                .unwrap();
            assert_eq!(value, Some((f64::from(i), i, true)));
        }
        assert_eq!(
            table.get_single_value(&pool_manager, (500, true)).unwrap(),
            None
        );
    }

    #[rstest]
    fn test_duplicate_entry_rejected() {
        let pool_manager = create_testing_pool_manager(50);
        let mut table = TestTable::initialize(&pool_manager, 100, 0).unwrap();

        let key = (7, true);
        let value = (1.5, 8, false);
        assert_eq!(
            table.insert_entry(&pool_manager, key, value).unwrap(),
            HashTableInsertResult::Inserted
        );
        assert_eq!(
            table.insert_entry(&pool_manager, key, value).unwrap(),
            HashTableInsertResult::DuplicateEntry
        );

        // Same key with a different value is a legal non-unique insert.
        assert_eq!(
            table
                .insert_entry(&pool_manager, key, (2.5, 9, true))
                .unwrap(),
            HashTableInsertResult::Inserted
        );
        let mut values = table.get_all_values(&pool_manager, key).unwrap();
        values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        assert_eq!(values, vec![(1.5, 8, false), (2.5, 9, true)]);
    }

    #[rstest]
    fn test_delete_entry() {
        let pool_manager = create_testing_pool_manager(50);
        let mut table = TestTable::initialize(&pool_manager, 100, 0).unwrap();

        let key = (3, false);
        table
            .insert_entry(&pool_manager, key, (0.5, 1, true))
            .unwrap();

        assert_eq!(
            table
                .delete_entry(&pool_manager, key, (0.5, 1, true))
                .unwrap(),
            HashTableDeleteResult::Deleted
        );
        assert_eq!(
            table.get_single_value(&pool_manager, key).unwrap(),
            None
        );
        assert_eq!(
            table
                .delete_entry(&pool_manager, key, (0.5, 1, true))
                .unwrap(),
            HashTableDeleteResult::DidNotExist
        );

        // Deleting a present key with the wrong value does nothing.
        table
            .insert_entry(&pool_manager, key, (0.5, 1, true))
            .unwrap();
        assert_eq!(
            table
                .delete_entry(&pool_manager, key, (9.5, 1, true))
                .unwrap(),
            HashTableDeleteResult::DidNotExist
        );
    }

    #[rstest]
    fn test_colliding_keys_probe_linearly() {
        let pool_manager = create_testing_pool_manager(50);
        // Every key hashes to slot 3.
        let mut table = CollidingTable::initialize(&pool_manager, 100, 3).unwrap();

        table.insert_entry(&pool_manager, 1, 10).unwrap();
        table.insert_entry(&pool_manager, 2, 20).unwrap();
        table.insert_entry(&pool_manager, 3, 30).unwrap();

        // Tombstone the middle of the cluster; probing must continue past
        // it to find key 3.
        assert_eq!(
            table.delete_entry(&pool_manager, 2, 20).unwrap(),
            HashTableDeleteResult::Deleted
        );
        assert_eq!(
            table.get_single_value(&pool_manager, 3).unwrap(),
            Some(30)
        );

        // A new insert reclaims the tombstoned slot and remains findable.
        table.insert_entry(&pool_manager, 4, 40).unwrap();
        assert_eq!(
            table.get_single_value(&pool_manager, 4).unwrap(),
            Some(40)
        );
        assert_eq!(
            table.get_single_value(&pool_manager, 1).unwrap(),
            Some(10)
        );
    }

    #[rstest]
    fn test_table_full() {
        let pool_manager = create_testing_pool_manager(10);
        // Four slots, all colliding.
        let mut table = CollidingTable::initialize(&pool_manager, 4, 0).unwrap();

        for i in 0..4u32 {
            assert_eq!(
                table
                    .insert_entry(&pool_manager, i, u64::from(i))
                    .unwrap(),
                HashTableInsertResult::Inserted
            );
        }
        assert_eq!(
            table.insert_entry(&pool_manager, 99, 99),
            Err(HashTableError::NoSlotsInTable)
        );

        // Deleting makes room again.
        table.delete_entry(&pool_manager, 0, 0).unwrap();
        assert_eq!(
            table.insert_entry(&pool_manager, 99, 99).unwrap(),
            HashTableInsertResult::Inserted
        );
    }

    #[rstest]
    fn test_wrap_around_probing() {
        let pool_manager = create_testing_pool_manager(10);
        // Home slot is the last slot of an 8-slot table.
        let mut table = CollidingTable::initialize(&pool_manager, 8, 7).unwrap();

        table.insert_entry(&pool_manager, 1, 10).unwrap();
        table.insert_entry(&pool_manager, 2, 20).unwrap();

        // The second entry wrapped to slot 0 and is still reachable.
        assert_eq!(
            table.get_single_value(&pool_manager, 2).unwrap(),
            Some(20)
        );
    }

    // Uses a key/value pair wide enough that the block directory spills out
    // of the header page and into an extension page.
    #[rstest]
    fn test_directory_spills_into_extension_pages() {
        type WideKey = (i128, i128, i128);
        type WideValue = (i128, i128, i128);
        type WideTable = LinearProbingHashTable<WideKey, WideValue, ConstHashFunction>;

        let block_capacity =
            calculate_block_page_layout(<WideKey>::serialized_size() + <WideValue>::serialized_size())
                .unwrap()
                .max_values;
        let header_capacity = WritableHashTableHeaderPage::capacity_slots();
        // One block page more than the header can track.
        let table_size = (block_capacity * (header_capacity + 1)) as u32;

        let pool_manager = create_testing_pool_manager(100);
        // Home the probes in the extension-backed tail of the table.
        let home_slot = block_capacity * header_capacity;
        let mut table =
            WideTable::initialize(&pool_manager, table_size, home_slot as u64).unwrap();

        let key = (1, 2, 3);
        let value = (4, 5, 6);
        assert_eq!(
            table.insert_entry(&pool_manager, key, value).unwrap(),
            HashTableInsertResult::Inserted
        );
        assert_eq!(
            table.get_single_value(&pool_manager, key).unwrap(),
            Some(value)
        );
        assert_eq!(
            table.delete_entry(&pool_manager, key, value).unwrap(),
            HashTableDeleteResult::Deleted
        );
    }
}
