use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use super::replacer::IBufferPoolReplacer;
use crate::dbms::storage::disk::IDiskManager;
use crate::dbms::types::PageData;

pub type ReplacerGeneric = Box<dyn IBufferPoolReplacer + Send + Sync>;
pub type DiskManagerGeneric = Box<dyn IDiskManager + Send + Sync>;

/// Shared borrow of a frame's bytes. Holding one holds the frame latch, so
/// the page cannot be evicted out from under the reader even after its pin
/// is released — but callers are expected to drop the guard before
/// unpinning.
pub type ReadOnlyPage<'a> = RwLockReadGuard<'a, PageData>;
/// Exclusive borrow of a frame's bytes; same latch discipline.
pub type WritablePage<'a> = RwLockWriteGuard<'a, PageData>;
