//! Signal front-end: edge pairing and bit timing classification
//!
//! This module turns raw level transitions into classified logical bits:
//! 1. Group transitions into bit cells (start edge, midpoint edge, end edge)
//! 2. Measure the two half-cycle durations of each cell
//! 3. Classify the pair against the DCC timing windows (58 µs halves for a
//!    "1", 100 µs halves for a "0")

mod edges;
mod timing;

pub use edges::{BitCell, EdgeEvent, EdgePairer};
pub use timing::{BitClass, BitClassifier, DccBitClassifier, LegacyPeriodClassifier};
