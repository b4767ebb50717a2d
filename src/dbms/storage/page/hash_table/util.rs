use crate::dbms::types::PAGE_SIZE;

#[derive(Debug, PartialEq, Eq)]
pub enum PageLayoutError {
    /// Zero-sized entries cannot be laid out
    ZeroSizeEntry,
    /// A single entry plus its bitmap bits does not fit in one page
    EntryTooLarge,
}

/// Byte offsets of the three regions of a block page: the occupancy bitmap,
/// the readability bitmap, and the entry array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub occupancy_array_start: usize,
    pub readability_array_start: usize,
    pub value_array_start: usize,
    pub max_values: usize,
}

/// Find the largest slot count N such that two N-bit bitmaps plus N entries
/// of `value_size` bytes fit in one page.
pub fn calculate_block_page_layout(value_size: usize) -> Result<PageLayout, PageLayoutError> {
    if value_size == 0 {
        return Err(PageLayoutError::ZeroSizeEntry);
    }

    let bitmap_bytes = |slots: usize| (slots + 7) / 8;

    // Start from the no-bitmap upper bound and shrink until everything fits.
    let mut max_values = PAGE_SIZE / value_size;
    while max_values > 0 && 2 * bitmap_bytes(max_values) + max_values * value_size > PAGE_SIZE {
        max_values -= 1;
    }
    if max_values == 0 {
        return Err(PageLayoutError::EntryTooLarge);
    }

    let occupancy_array_bytes = bitmap_bytes(max_values);
    Ok(PageLayout {
        occupancy_array_start: 0,
        readability_array_start: occupancy_array_bytes,
        value_array_start: 2 * occupancy_array_bytes,
        max_values,
    })
}

/// Read a big-endian u32 field out of a page at the given byte offset.
pub(crate) fn read_u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap())
}

/// Write a big-endian u32 field into a page at the given byte offset.
pub(crate) fn write_u32_at(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    // 5.25 bytes per slot: 780 slots fill the page exactly.
    #[case(5, 780)]
    // 1.25 bytes per slot, another exact fit.
    #[case(1, 3276)]
    #[case(8, 496)]
    // One entry barely fits next to its two bitmap bytes.
    #[case(PAGE_SIZE - 2, 1)]
    fn test_layout_capacity(#[case] value_size: usize, #[case] expected_max: usize) {
        let layout = calculate_block_page_layout(value_size).unwrap();
        assert_eq!(layout.max_values, expected_max);

        let bitmap_bytes = (layout.max_values + 7) / 8;
        assert_eq!(layout.occupancy_array_start, 0);
        assert_eq!(layout.readability_array_start, bitmap_bytes);
        assert_eq!(layout.value_array_start, 2 * bitmap_bytes);
        assert!(2 * bitmap_bytes + layout.max_values * value_size <= PAGE_SIZE);
    }

    #[rstest]
    fn test_zero_size_entry() {
        assert_eq!(
            calculate_block_page_layout(0),
            Err(PageLayoutError::ZeroSizeEntry)
        );
    }

    #[rstest]
    fn test_entry_too_large() {
        assert_eq!(
            calculate_block_page_layout(PAGE_SIZE - 1),
            Err(PageLayoutError::EntryTooLarge)
        );
    }
}
