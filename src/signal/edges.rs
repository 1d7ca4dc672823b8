//! Grouping of level transitions into bit cells
//!
//! A DCC bit cell is one full square-wave period: a transition to the
//! configured start level, an opposite transition halfway through, and the
//! next start-level transition, which also begins the following cell.

use tracing::trace;

use crate::config::Phase;

/// A single level transition on the data line.
///
/// `level` is the line state after the transition. Events must be supplied
/// in strictly increasing position order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Sample index of the transition.
    pub position: u64,
    /// Line level after the transition.
    pub level: bool,
}

/// One complete bit cell delimited by three transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitCell {
    /// Sample position where the cell begins.
    pub start: u64,
    /// Sample position of the mid-cell transition.
    pub mid: u64,
    /// Sample position where the cell ends (and the next cell begins).
    pub end: u64,
}

/// Groups transitions into [`BitCell`]s according to the configured phase.
///
/// Transitions arriving before the first cell-start edge are consumed
/// without output.
#[derive(Debug)]
pub struct EdgePairer {
    start_level: bool,
    cell_start: Option<u64>,
    cell_mid: Option<u64>,
}

impl EdgePairer {
    pub fn new(phase: Phase) -> Self {
        Self {
            start_level: phase.start_level(),
            cell_start: None,
            cell_mid: None,
        }
    }

    /// Feed one transition; returns a cell when this edge completes one.
    pub fn push(&mut self, edge: EdgeEvent) -> Option<BitCell> {
        if edge.level == self.start_level {
            let completed = match (self.cell_start, self.cell_mid) {
                (Some(start), Some(mid)) => Some(BitCell {
                    start,
                    mid,
                    end: edge.position,
                }),
                (Some(start), None) => {
                    // Start edge with no midpoint seen. Possible when the
                    // capture drops the opposite transition; restart the cell.
                    trace!(start, position = edge.position, "cell without midpoint, restarting");
                    None
                }
                _ => None,
            };
            self.cell_start = Some(edge.position);
            self.cell_mid = None;
            completed
        } else {
            if self.cell_start.is_some() {
                self.cell_mid = Some(edge.position);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(position: u64, level: bool) -> EdgeEvent {
        EdgeEvent { position, level }
    }

    #[test]
    fn test_cell_grouping_phase_01() {
        let mut pairer = EdgePairer::new(Phase::ZeroOne);
        assert_eq!(pairer.push(edge(100, false)), None);
        assert_eq!(pairer.push(edge(158, true)), None);
        let cell = pairer.push(edge(216, false)).unwrap();
        assert_eq!(
            cell,
            BitCell {
                start: 100,
                mid: 158,
                end: 216
            }
        );

        // The completing edge starts the next cell.
        assert_eq!(pairer.push(edge(316, true)), None);
        let cell = pairer.push(edge(416, false)).unwrap();
        assert_eq!(
            cell,
            BitCell {
                start: 216,
                mid: 316,
                end: 416
            }
        );
    }

    #[test]
    fn test_cell_grouping_phase_10() {
        let mut pairer = EdgePairer::new(Phase::OneZero);
        assert_eq!(pairer.push(edge(0, true)), None);
        assert_eq!(pairer.push(edge(58, false)), None);
        let cell = pairer.push(edge(116, true)).unwrap();
        assert_eq!(cell.start, 0);
        assert_eq!(cell.mid, 58);
        assert_eq!(cell.end, 116);
    }

    #[test]
    fn test_leading_opposite_edge_ignored() {
        let mut pairer = EdgePairer::new(Phase::ZeroOne);
        // A rising edge before any cell start carries no cell information.
        assert_eq!(pairer.push(edge(10, true)), None);
        assert_eq!(pairer.push(edge(50, false)), None);
        assert_eq!(pairer.push(edge(108, true)), None);
        assert!(pairer.push(edge(166, false)).is_some());
    }

    #[test]
    fn test_missing_midpoint_restarts_cell() {
        let mut pairer = EdgePairer::new(Phase::ZeroOne);
        assert_eq!(pairer.push(edge(0, false)), None);
        // Second start-level edge without an intervening midpoint.
        assert_eq!(pairer.push(edge(200, false)), None);
        assert_eq!(pairer.push(edge(258, true)), None);
        let cell = pairer.push(edge(316, false)).unwrap();
        assert_eq!(cell.start, 200);
    }
}
