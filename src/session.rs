//! Decoding session: signal edges in, annotations out
//!
//! A session owns one pipeline instance end to end: the edge pairer, the
//! configured bit classifier, and the packet assembler (which routes
//! completed packets through the interpreter). Processing is synchronous
//! and pull-driven; one edge is handled to completion before the next.

use tracing::debug;

use crate::config::{Config, ConfigError, TimingProfile};
use crate::dcc::{Annotation, AssemblerStats, PacketAssembler};
use crate::signal::{
    BitClass, BitClassifier, DccBitClassifier, EdgeEvent, EdgePairer, LegacyPeriodClassifier,
};

/// Session-level counters.
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    pub edges_processed: u64,
    pub bits_classified: u64,
    pub ambiguous_bits: u64,
}

/// One DCC decoding session.
///
/// Every accumulator lives on this struct and is initialized fresh at
/// construction; independently configured sessions share nothing.
pub struct DccSession {
    pairer: EdgePairer,
    classifier: Box<dyn BitClassifier + Send>,
    assembler: PacketAssembler,
    us_per_sample: f64,
    stats: SessionStats,
}

impl DccSession {
    /// Create a session. Fails if the configuration cannot support
    /// decoding (missing/zero sample rate, out-of-range tolerance).
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let classifier: Box<dyn BitClassifier + Send> = match config.profile {
            TimingProfile::Strict => Box::new(DccBitClassifier::new(config.tolerance)),
            TimingProfile::Legacy => Box::new(LegacyPeriodClassifier::new(config.tolerance)),
        };
        debug!(
            sample_rate = config.sample_rate,
            tolerance = config.tolerance,
            profile = ?config.profile,
            "session created"
        );

        Ok(Self {
            pairer: EdgePairer::new(config.phase),
            classifier,
            assembler: PacketAssembler::new(),
            us_per_sample: 1_000_000.0 / config.sample_rate,
            stats: SessionStats::default(),
        })
    }

    /// Process one level transition; returns the annotations it produced
    /// (usually none - a bit cell needs three transitions).
    pub fn process_edge(&mut self, edge: EdgeEvent) -> Vec<Annotation> {
        self.stats.edges_processed += 1;

        let Some(cell) = self.pairer.push(edge) else {
            return Vec::new();
        };

        let half1_us = (cell.mid - cell.start) as f64 * self.us_per_sample;
        let half2_us = (cell.end - cell.mid) as f64 * self.us_per_sample;
        let class = self.classifier.classify(half1_us, half2_us);
        self.stats.bits_classified += 1;

        let mut out = Vec::new();
        let text = match class {
            BitClass::One => "1".to_string(),
            BitClass::Zero => "0".to_string(),
            BitClass::Ambiguous(h1, h2) => {
                self.stats.ambiguous_bits += 1;
                format!("({h1:.1}/{h2:.1})")
            }
        };
        out.push(Annotation::bits(cell.start, cell.end, text));

        self.assembler.advance(class, cell.start, cell.end, &mut out);
        out
    }

    /// Process a sequence of transitions, collecting all annotations.
    pub fn process_edges(
        &mut self,
        edges: impl IntoIterator<Item = EdgeEvent>,
    ) -> Vec<Annotation> {
        let mut out = Vec::new();
        for edge in edges {
            out.extend(self.process_edge(edge));
        }
        out
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn assembler_stats(&self) -> &AssemblerStats {
        &self.assembler.stats
    }
}
