//! Derived views over collection snapshots.
//!
//! Everything here is a pure function of the users and tasks passed in; nothing is cached and
//! every render recomputes from scratch.

mod charts;
mod dashboard;
mod export;

pub use charts::*;
pub use dashboard::*;
pub use export::*;

/// Label rendered for a user id that no longer resolves.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Integer percentage of `part` in `whole`, rounded half away from zero; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
