//! Domain entities - window keys, usage records and the window clock.

mod usage;
mod window;

pub use usage::UsageRecord;
pub use window::{WINDOW_LENGTH_SECS, WindowKey, current_window, label, window_end};
