//! Digital Command Control (DCC) bitstream decoder
//!
//! Decodes the timing-encoded signal used to command model-railway
//! locomotives and accessories. The pipeline turns a stream of signal-edge
//! timestamps into typed, validated DCC packets:
//!
//! 1. Pair opposite-polarity edges into bit cells
//! 2. Classify each cell's half-cycle durations as a logical 0 or 1
//! 3. Assemble bits into framed packets (preamble, data bytes, end marker)
//! 4. Interpret each packet (addressing, speed/direction, functions,
//!    accessories, XOR checksum)
//!
//! Results are emitted as positioned [`Annotation`] records on two rows:
//! one per classified bit, one per decoded field.
//!
//! # Example
//!
//! ```no_run
//! use dcc_decode::{Config, DccSession, EdgeEvent};
//!
//! let mut session = DccSession::new(Config::new(1_000_000.0))?;
//! for ann in session.process_edge(EdgeEvent { position: 0, level: false }) {
//!     println!("{}..{} {}", ann.start, ann.end, ann.text);
//! }
//! # Ok::<(), dcc_decode::ConfigError>(())
//! ```

pub mod config;
pub mod dcc;
pub mod session;
pub mod signal;

pub use config::{Config, ConfigError, Phase, TimingProfile};
pub use dcc::{Annotation, AnnotationRow, DecodedByte, Packet};
pub use session::{DccSession, SessionStats};
pub use signal::{BitClass, BitClassifier, DccBitClassifier, EdgeEvent, LegacyPeriodClassifier};
