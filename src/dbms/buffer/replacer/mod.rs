pub mod buffer_pool_replacer;
pub mod clock_replacer;

pub use buffer_pool_replacer::{BufferPoolReplacerError, IBufferPoolReplacer};
#[cfg(test)]
pub use buffer_pool_replacer::MockIBufferPoolReplacer;
