pub mod time;

// Re-export time utilities
pub use time::{current_time, format_block_time, format_duration, DAY, HOUR, MINUTE, WEEK};
