//! Storage engine core built around a fixed-size buffer pool.
//!
//! The buffer pool caches disk pages in a fixed array of frames, with a
//! second-chance clock policy choosing eviction victims. On top of the pool
//! sits a linear-probing hash index whose buckets are slotted block pages
//! laid out directly over frame bytes.

pub mod dbms;
