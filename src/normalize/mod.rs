//! Pure field normalizers.
//!
//! Every function here is total: malformed input degrades to a fallback value
//! (current time, zero, `None`, or an empty list) instead of an error.

mod count;
mod date;
mod links;

pub use count::parse_count;
pub use date::{parse_date, parse_date_at};
pub use links::{extract_status_id, filter_external_urls};
