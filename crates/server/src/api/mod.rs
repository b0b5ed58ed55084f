mod dataset;
mod live;
mod positions;
mod viewport;
pub use dataset::*;
pub use live::*;
pub use positions::*;
pub use viewport::*;

use chrono::NaiveDateTime;

/// Parses a simulation start such as `20240506T080000`.
pub fn parse_start(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y%m%dT%H%M%S").ok()
}
