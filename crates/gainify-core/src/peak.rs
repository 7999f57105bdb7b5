//! Peak meter tracking with a running maximum.

use crate::format::Formatter;
use crate::gain::{gain_to_db_floored, METER_FLOOR_DB};

const READOUT: Formatter = Formatter::Fixed { precision: 2 };

/// Snapshot of the meter: the latest reading and the highest one so far.
///
/// Both values are in dB and never below the tracker's floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakState {
    /// Most recent reading.
    pub current_db: f64,
    /// Highest reading since the tracker was created.
    pub max_db: f64,
    floor_db: f64,
}

impl PeakState {
    /// Fraction of the meter bar to fill, in `[0, 1]`.
    ///
    /// The floor is empty and 0 dB is full.
    pub fn meter_fill(&self) -> f64 {
        ((self.current_db - self.floor_db) / -self.floor_db).clamp(0.0, 1.0)
    }

    /// Current reading formatted to two decimals, e.g. "-10.00 dB".
    pub fn current_readout(&self) -> String {
        READOUT.display(self.current_db)
    }

    /// Peak hold formatted to two decimals, e.g. "-10.00 dB".
    pub fn max_readout(&self) -> String {
        READOUT.display(self.max_db)
    }
}

/// Converts linear peak samples to dB and holds the running maximum.
///
/// `max_db` only ever grows. Comparison is exact IEEE `>`; two readings that
/// differ by one ulp are different readings.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    state: PeakState,
    readings: u64,
}

impl PeakTracker {
    /// Create a tracker with the standard -100 dB floor.
    pub fn new() -> Self {
        Self::with_floor(METER_FLOOR_DB)
    }

    /// Create a tracker with a custom floor.
    ///
    /// # Panics
    ///
    /// Panics if `floor_db` is not finite and negative.
    pub fn with_floor(floor_db: f64) -> Self {
        assert!(
            floor_db.is_finite() && floor_db < 0.0,
            "meter floor must be finite and negative"
        );
        Self {
            state: PeakState {
                current_db: floor_db,
                max_db: floor_db,
                floor_db,
            },
            readings: 0,
        }
    }

    /// Feed one linear amplitude sample.
    ///
    /// Negative, NaN and infinite samples are read as the floor; a bad
    /// telemetry sample must not pin the peak hold.
    pub fn record(&mut self, amplitude: f64) -> PeakState {
        let floor = self.state.floor_db;
        let db = if amplitude.is_finite() {
            gain_to_db_floored(amplitude, floor)
        } else {
            log::debug!("non-finite peak sample {amplitude} read as floor");
            floor
        };

        self.state.current_db = db;
        if self.readings == 0 || db > self.state.max_db {
            self.state.max_db = db;
        }
        self.readings += 1;
        self.state
    }

    /// Current snapshot.
    pub fn state(&self) -> PeakState {
        self.state
    }

    /// Latest reading in dB.
    pub fn current_db(&self) -> f64 {
        self.state.current_db
    }

    /// Highest reading in dB.
    pub fn max_db(&self) -> f64 {
        self.state.max_db
    }

    /// Number of samples recorded.
    pub fn reading_count(&self) -> u64 {
        self.readings
    }
}

impl Default for PeakTracker {
    fn default() -> Self {
        Self::new()
    }
}
