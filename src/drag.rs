//! Drag coefficient lookup.
//!
//! The sparse control tables in `drag_tables` are resampled once, at
//! construction, onto a dense uniform Mach grid so that a lookup in the
//! integration hot path is an index computation plus one linear
//! interpolation, never a search. Out-of-domain Mach numbers clamp to
//! the table edges.

use once_cell::sync::Lazy;

use crate::constants::MIN_DIVISION_THRESHOLD;
use crate::drag_model::DragLaw;
use crate::drag_tables::{G1_CONTROL_POINTS, G7_CONTROL_POINTS};

/// Mach increment of the dense grid (1001 entries for Mach 0–5)
const MACH_STEP: f64 = 0.005;
const MACH_MAX: f64 = 5.0;
const DENSE_SIZE: usize = 1001;
const INV_MACH_STEP: f64 = 1.0 / MACH_STEP;

/// Dense, immutable Cd-vs-Mach table for one drag law.
#[derive(Debug, Clone)]
pub struct DragTable {
    law: DragLaw,
    cd_dense: Vec<f64>,
}

impl DragTable {
    /// Build a dense table by linearly resampling sparse control points.
    ///
    /// Control points must be sorted by ascending Mach and span the
    /// dense grid domain; both published tables do.
    fn from_control_points(law: DragLaw, points: &[(f64, f64)]) -> Self {
        debug_assert!(points.len() >= 2);
        debug_assert!(points.windows(2).all(|w| w[0].0 < w[1].0));

        let mut cd_dense = Vec::with_capacity(DENSE_SIZE);
        let mut seg = 0;
        for i in 0..DENSE_SIZE {
            let mach = i as f64 * MACH_STEP;
            // Advance to the control segment containing this Mach value.
            while seg + 2 < points.len() && mach > points[seg + 1].0 {
                seg += 1;
            }
            let (m0, cd0) = points[seg];
            let (m1, cd1) = points[seg + 1];
            let cd = if mach <= m0 {
                cd0
            } else if mach >= m1 {
                cd1
            } else {
                let span = m1 - m0;
                if span.abs() < MIN_DIVISION_THRESHOLD {
                    cd0
                } else {
                    cd0 + (mach - m0) / span * (cd1 - cd0)
                }
            };
            cd_dense.push(cd);
        }

        DragTable { law, cd_dense }
    }

    pub fn law(&self) -> DragLaw {
        self.law
    }

    /// Drag coefficient at the given Mach number.
    ///
    /// O(1): index plus one interpolation between adjacent dense
    /// entries. Mach values outside [0, 5] clamp to the nearest edge.
    #[inline]
    pub fn cd(&self, mach: f64) -> f64 {
        if mach <= 0.0 || !mach.is_finite() {
            return self.cd_dense[0];
        }
        if mach >= MACH_MAX {
            return self.cd_dense[DENSE_SIZE - 1];
        }

        let idx_f = mach * INV_MACH_STEP;
        let idx = idx_f as usize;
        let frac = idx_f - idx as f64;
        self.cd_dense[idx] + frac * (self.cd_dense[idx + 1] - self.cd_dense[idx])
    }
}

/// Shared G1 table, built once on first use.
static G1_DRAG_TABLE: Lazy<DragTable> =
    Lazy::new(|| DragTable::from_control_points(DragLaw::G1, G1_CONTROL_POINTS));

/// Shared G7 table, built once on first use.
static G7_DRAG_TABLE: Lazy<DragTable> =
    Lazy::new(|| DragTable::from_control_points(DragLaw::G7, G7_CONTROL_POINTS));

/// The process-wide immutable table for a drag law.
///
/// Safe to share by reference across concurrent solves.
pub fn drag_table(law: DragLaw) -> &'static DragTable {
    match law {
        DragLaw::G1 => &G1_DRAG_TABLE,
        DragLaw::G7 => &G7_DRAG_TABLE,
    }
}

/// Convenience lookup without holding a table reference.
pub fn drag_coefficient(mach: f64, law: DragLaw) -> f64 {
    drag_table(law).cd(mach)
}
