//! DCC decoder data types

use serde::Serialize;

/// Output row an annotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationRow {
    /// Per-bit classification results.
    Bits,
    /// Decoded protocol fields.
    Decoded,
}

/// A positioned, labeled decode result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Sample position where the annotated range begins.
    pub start: u64,
    /// Sample position where the annotated range ends.
    pub end: u64,
    pub row: AnnotationRow,
    pub text: String,
}

impl Annotation {
    pub(crate) fn bits(start: u64, end: u64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            row: AnnotationRow::Bits,
            text: text.into(),
        }
    }

    pub(crate) fn decoded(start: u64, end: u64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            row: AnnotationRow::Decoded,
            text: text.into(),
        }
    }
}

/// One assembled data byte together with its bit boundary positions.
///
/// `boundaries[0]` is the byte's start, `boundaries[8]` its end, and
/// `boundaries[i]` the start of bit `i`. Boundaries are monotonically
/// non-decreasing, which lets the interpreter annotate sub-ranges of a
/// byte (e.g. just the speed bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedByte {
    pub value: u8,
    pub boundaries: [u64; 9],
}

impl DecodedByte {
    /// Sample position where the byte begins.
    pub fn start(&self) -> u64 {
        self.boundaries[0]
    }

    /// Sample position where the byte ends.
    pub fn end(&self) -> u64 {
        self.boundaries[8]
    }

    /// Span covering bits `from..to` of this byte.
    pub fn bit_span(&self, from: usize, to: usize) -> (u64, u64) {
        (self.boundaries[from], self.boundaries[to])
    }
}

/// A complete frame of assembled bytes, in wire order.
pub type Packet = Vec<DecodedByte>;
