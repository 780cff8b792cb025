//! Mock filesystem for testing collectors without Linux `/proc`.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::{SLABINFO_HEADER, SLABINFO_PATH, TYPICAL_SLABINFO};
