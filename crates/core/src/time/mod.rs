pub mod vendor_clock;

pub use vendor_clock::{to_calendar_time, to_vendor_minutes, NULL_SENTINEL};
