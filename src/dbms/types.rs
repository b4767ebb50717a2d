/// Size of a page in bytes, fixed at build time.
pub const PAGE_SIZE: usize = 4096;

pub type PageData = [u8; PAGE_SIZE];

pub type PageId = u32;

/// Index of a frame within the buffer pool's frame array.
pub type FrameId = usize;

/// On-disk encoding of "no page". In memory, absent pages are `Option`s;
/// this sentinel only appears inside serialized page layouts.
pub const NULL_PAGE_ID: PageId = PageId::MAX;
