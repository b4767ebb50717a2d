use std::marker::PhantomData;

use super::util::{calculate_block_page_layout, PageLayout, PageLayoutError};
use crate::dbms::buffer::types::{ReadOnlyPage, WritablePage};
use crate::dbms::storage::serialize::BytesSerialize;

#[derive(Debug, PartialEq, Eq)]
pub enum HashTableBlockError {
    /// Slot index beyond the block's capacity
    SlotOutOfRange,
    /// The slot holds no live entry
    SlotNotReadable,
    PageLayoutError(PageLayoutError),
}

impl From<PageLayoutError> for HashTableBlockError {
    fn from(e: PageLayoutError) -> Self {
        HashTableBlockError::PageLayoutError(e)
    }
}

pub trait IHashTableBlockPageRead<KeyType: BytesSerialize, ValueType: BytesSerialize> {
    /// Key stored at the slot. Fails unless the slot is live.
    fn key_at(&self, slot: usize) -> Result<KeyType, HashTableBlockError>;
    /// Value stored at the slot. Fails unless the slot is live.
    fn value_at(&self, slot: usize) -> Result<ValueType, HashTableBlockError>;
    /// Whether the slot has ever held an entry. Never cleared, so probes
    /// can distinguish a tombstone from a slot that was always empty.
    fn slot_occupied(&self, slot: usize) -> Result<bool, HashTableBlockError>;
    /// Whether the slot currently holds a live entry.
    fn slot_readable(&self, slot: usize) -> Result<bool, HashTableBlockError>;
}

pub trait IHashTableBlockPageWrite<KeyType: BytesSerialize, ValueType: BytesSerialize>:
    IHashTableBlockPageRead<KeyType, ValueType>
{
    /// Claim the slot for the given entry. Returns `false` without touching
    /// anything if the slot already holds a live entry; a tombstoned slot
    /// can be reclaimed.
    fn put_slot(
        &mut self,
        slot: usize,
        key: KeyType,
        value: ValueType,
    ) -> Result<bool, HashTableBlockError>;
    /// Tombstone the slot: the entry stops being readable but the slot
    /// stays occupied.
    fn remove_slot(&mut self, slot: usize) -> Result<(), HashTableBlockError>;
}

// Bitmap addressing is MSB-first: slot i lives in byte i/8 under mask
// 0x80 >> (i % 8). The bit order is part of the on-disk layout.

fn bit_is_set(data: &[u8], bitmap_start: usize, slot: usize) -> bool {
    data[bitmap_start + slot / 8] & (0x80u8 >> (slot % 8)) != 0
}

fn set_bit(data: &mut [u8], bitmap_start: usize, slot: usize) {
    data[bitmap_start + slot / 8] |= 0x80u8 >> (slot % 8);
}

fn clear_bit(data: &mut [u8], bitmap_start: usize, slot: usize) {
    data[bitmap_start + slot / 8] &= !(0x80u8 >> (slot % 8));
}

fn check_slot(layout: &PageLayout, slot: usize) -> Result<(), HashTableBlockError> {
    if slot >= layout.max_values {
        return Err(HashTableBlockError::SlotOutOfRange);
    }
    Ok(())
}

fn key_address<KeyType: BytesSerialize, ValueType: BytesSerialize>(
    layout: &PageLayout,
    slot: usize,
) -> usize {
    let entry_size = KeyType::serialized_size() + ValueType::serialized_size();
    layout.value_array_start + slot * entry_size
}

fn read_key<KeyType: BytesSerialize, ValueType: BytesSerialize>(
    data: &[u8],
    layout: &PageLayout,
    slot: usize,
) -> Result<KeyType, HashTableBlockError> {
    check_slot(layout, slot)?;
    if !bit_is_set(data, layout.readability_array_start, slot) {
        return Err(HashTableBlockError::SlotNotReadable);
    }
    let start = key_address::<KeyType, ValueType>(layout, slot);
    Ok(KeyType::from_bytes(
        &data[start..start + KeyType::serialized_size()],
    ))
}

fn read_value<KeyType: BytesSerialize, ValueType: BytesSerialize>(
    data: &[u8],
    layout: &PageLayout,
    slot: usize,
) -> Result<ValueType, HashTableBlockError> {
    check_slot(layout, slot)?;
    if !bit_is_set(data, layout.readability_array_start, slot) {
        return Err(HashTableBlockError::SlotNotReadable);
    }
    let start = key_address::<KeyType, ValueType>(layout, slot) + KeyType::serialized_size();
    Ok(ValueType::from_bytes(
        &data[start..start + ValueType::serialized_size()],
    ))
}

/// Read-only view of a frame's bytes as a block of `(key, value)` slots.
pub struct ReadOnlyHashTableBlockPage<'a, KeyType: BytesSerialize, ValueType: BytesSerialize> {
    page: ReadOnlyPage<'a>,
    layout: PageLayout,
    _phantom: PhantomData<(KeyType, ValueType)>,
}

impl<'a, KeyType: BytesSerialize, ValueType: BytesSerialize>
    ReadOnlyHashTableBlockPage<'a, KeyType, ValueType>
{
    pub fn new(page: ReadOnlyPage<'a>) -> Result<Self, HashTableBlockError> {
        let layout =
            calculate_block_page_layout(KeyType::serialized_size() + ValueType::serialized_size())?;
        Ok(Self {
            page,
            layout,
            _phantom: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        self.layout.max_values
    }
}

impl<KeyType: BytesSerialize, ValueType: BytesSerialize>
    IHashTableBlockPageRead<KeyType, ValueType>
    for ReadOnlyHashTableBlockPage<'_, KeyType, ValueType>
{
    fn key_at(&self, slot: usize) -> Result<KeyType, HashTableBlockError> {
        read_key::<KeyType, ValueType>(&self.page[..], &self.layout, slot)
    }

    fn value_at(&self, slot: usize) -> Result<ValueType, HashTableBlockError> {
        read_value::<KeyType, ValueType>(&self.page[..], &self.layout, slot)
    }

    fn slot_occupied(&self, slot: usize) -> Result<bool, HashTableBlockError> {
        check_slot(&self.layout, slot)?;
        Ok(bit_is_set(
            &self.page[..],
            self.layout.occupancy_array_start,
            slot,
        ))
    }

    fn slot_readable(&self, slot: usize) -> Result<bool, HashTableBlockError> {
        check_slot(&self.layout, slot)?;
        Ok(bit_is_set(
            &self.page[..],
            self.layout.readability_array_start,
            slot,
        ))
    }
}

/// Writable view of a frame's bytes as a block of `(key, value)` slots.
///
/// The view sits on the frame's write latch, so slot claims cannot race;
/// `put_slot` still publishes in claim order (occupied bit, payload,
/// readable bit) so a partially written entry is never readable.
pub struct WritableHashTableBlockPage<'a, KeyType: BytesSerialize, ValueType: BytesSerialize> {
    page: WritablePage<'a>,
    layout: PageLayout,
    _phantom: PhantomData<(KeyType, ValueType)>,
}

impl<'a, KeyType: BytesSerialize, ValueType: BytesSerialize>
    WritableHashTableBlockPage<'a, KeyType, ValueType>
{
    pub fn new(page: WritablePage<'a>) -> Result<Self, HashTableBlockError> {
        let layout =
            calculate_block_page_layout(KeyType::serialized_size() + ValueType::serialized_size())?;
        Ok(Self {
            page,
            layout,
            _phantom: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        self.layout.max_values
    }
}

impl<KeyType: BytesSerialize, ValueType: BytesSerialize>
    IHashTableBlockPageRead<KeyType, ValueType>
    for WritableHashTableBlockPage<'_, KeyType, ValueType>
{
    fn key_at(&self, slot: usize) -> Result<KeyType, HashTableBlockError> {
        read_key::<KeyType, ValueType>(&self.page[..], &self.layout, slot)
    }

    fn value_at(&self, slot: usize) -> Result<ValueType, HashTableBlockError> {
        read_value::<KeyType, ValueType>(&self.page[..], &self.layout, slot)
    }

    fn slot_occupied(&self, slot: usize) -> Result<bool, HashTableBlockError> {
        check_slot(&self.layout, slot)?;
        Ok(bit_is_set(
            &self.page[..],
            self.layout.occupancy_array_start,
            slot,
        ))
    }

    fn slot_readable(&self, slot: usize) -> Result<bool, HashTableBlockError> {
        check_slot(&self.layout, slot)?;
        Ok(bit_is_set(
            &self.page[..],
            self.layout.readability_array_start,
            slot,
        ))
    }
}

impl<KeyType: BytesSerialize, ValueType: BytesSerialize>
    IHashTableBlockPageWrite<KeyType, ValueType>
    for WritableHashTableBlockPage<'_, KeyType, ValueType>
{
    fn put_slot(
        &mut self,
        slot: usize,
        key: KeyType,
        value: ValueType,
    ) -> Result<bool, HashTableBlockError> {
        check_slot(&self.layout, slot)?;
        if bit_is_set(&self.page[..], self.layout.readability_array_start, slot) {
            return Ok(false);
        }

        set_bit(&mut self.page[..], self.layout.occupancy_array_start, slot);

        let key_start = key_address::<KeyType, ValueType>(&self.layout, slot);
        let value_start = key_start + KeyType::serialized_size();
        self.page[key_start..key_start + KeyType::serialized_size()]
            .copy_from_slice(&key.to_bytes());
        self.page[value_start..value_start + ValueType::serialized_size()]
            .copy_from_slice(&value.to_bytes());

        set_bit(&mut self.page[..], self.layout.readability_array_start, slot);
        Ok(true)
    }

    fn remove_slot(&mut self, slot: usize) -> Result<(), HashTableBlockError> {
        check_slot(&self.layout, slot)?;
        clear_bit(&mut self.page[..], self.layout.readability_array_start, slot);
        Ok(())
    }
}
