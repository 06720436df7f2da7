//! Unit Normalizer: converts raw literal tables (mixed GeV/eV/log10
//! conventions, per-decade binning) into base units, exactly once.

use super::model::{DatasetError, RawTable};

// ---------------------------------------------------------------------------
// UnitOp – one per-column scale operation of a conversion recipe
// ---------------------------------------------------------------------------

/// A single step of a unit-conversion recipe.  Ops are applied strictly in
/// the declared order: datasets store either linear or log10 values, so a
/// log-inversion must run before any linear scale on the same column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitOp {
    /// The column stores log10 values; replace each `v` with `10^v`.
    PowTen(usize),
    /// Multiply the column by a constant (unit conversion, flavor-count
    /// multipliers, inline energy factors).
    Scale(usize, f64),
    /// Divide the column by `energy²` (column 0, which must already be in
    /// base units when this op runs); converts E²-weighted columns to
    /// differential flux.
    PerEnergySquared(usize),
}

// ---------------------------------------------------------------------------
// to_base_units
// ---------------------------------------------------------------------------

/// Apply a conversion recipe to a raw table, consuming it and returning the
/// table in base units.
pub fn to_base_units(mut table: RawTable, ops: &[UnitOp]) -> Result<RawTable, DatasetError> {
    for op in ops {
        match *op {
            UnitOp::PowTen(col) => {
                for v in table.column_mut(col)? {
                    *v = 10f64.powf(*v);
                }
            }
            UnitOp::Scale(col, factor) => {
                for v in table.column_mut(col)? {
                    *v *= factor;
                }
            }
            UnitOp::PerEnergySquared(col) => {
                let energy = table.column(0)?.to_vec();
                for (v, e) in table.column_mut(col)?.iter_mut().zip(energy) {
                    *v /= e * e;
                }
            }
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// apply_decade_correction
// ---------------------------------------------------------------------------

/// Normalize the named flux columns to the common per-decade differential
/// convention: multiply by `bins_per_decade`, and divide by 2 when the
/// source used half-decade binning.
///
/// The table's one-shot guard makes a second application an error; a
/// pre-corrected dataset silently scaled again was a known corruption in
/// the original tooling.
pub fn apply_decade_correction(
    table: &mut RawTable,
    flux_cols: &[usize],
    bins_per_decade: f64,
    half_decade: bool,
) -> Result<(), DatasetError> {
    table.mark_decade_corrected()?;
    let factor = if half_decade {
        bins_per_decade / 2.0
    } else {
        bins_per_decade
    };
    for &col in flux_cols {
        for v in table.column_mut(col)? {
            *v *= factor;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{EV, GEV};
    use approx::assert_relative_eq;

    fn table(columns: Vec<Vec<f64>>) -> RawTable {
        RawTable::from_columns("t", columns).unwrap()
    }

    #[test]
    fn recipe_round_trips() {
        let raw = vec![vec![1.0e7, 2.0e7], vec![3.0e-8, 4.0e-8]];
        let ops = [UnitOp::Scale(0, GEV), UnitOp::Scale(1, 1e13)];

        let converted = to_base_units(table(raw.clone()), &ops).unwrap();
        // Dividing by the same factors reproduces the raw table.
        for (i, &(col, factor)) in [(0usize, GEV), (1usize, 1e13)].iter().enumerate() {
            for (j, &v) in converted.column(col).unwrap().iter().enumerate() {
                assert_relative_eq!(v / factor, raw[i][j], max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn pow_ten_before_scale_matters() {
        // log10(E/eV) = 16 stored in the energy column.
        let ops = [UnitOp::PowTen(0), UnitOp::Scale(0, EV)];
        let t = to_base_units(table(vec![vec![16.0]]), &ops).unwrap();
        assert_relative_eq!(t.column(0).unwrap()[0], 1e16, max_relative = 1e-12);

        // Reversed order scales the exponent instead of the value.
        let bad = [UnitOp::Scale(0, 2.0), UnitOp::PowTen(0)];
        let t = to_base_units(table(vec![vec![16.0]]), &bad).unwrap();
        assert_relative_eq!(t.column(0).unwrap()[0], 1e32, max_relative = 1e-12);
    }

    #[test]
    fn per_energy_squared_uses_base_energy() {
        // E²Φ = 8.0 at E = 2.0 → Φ = 2.0
        let ops = [UnitOp::PerEnergySquared(1)];
        let t = to_base_units(table(vec![vec![2.0], vec![8.0]]), &ops).unwrap();
        assert_relative_eq!(t.column(1).unwrap()[0], 2.0);
    }

    #[test]
    fn decade_correction_full_and_half() {
        let mut full = table(vec![vec![1.0], vec![10.0]]);
        assert!(!full.decade_corrected());
        apply_decade_correction(&mut full, &[1], 2.0, false).unwrap();
        assert!(full.decade_corrected());
        assert_relative_eq!(full.column(1).unwrap()[0], 20.0);

        let mut half = table(vec![vec![1.0], vec![10.0]]);
        apply_decade_correction(&mut half, &[1], 2.0, true).unwrap();
        assert_relative_eq!(half.column(1).unwrap()[0], 10.0);
    }

    #[test]
    fn decade_correction_is_linear() {
        let k = 7.5;
        let mut a = table(vec![vec![1.0, 2.0], vec![1.5, 2.5]]);
        let mut b = table(vec![vec![1.0, 2.0], vec![1.5 * k, 2.5 * k]]);
        apply_decade_correction(&mut a, &[1], 2.0, true).unwrap();
        apply_decade_correction(&mut b, &[1], 2.0, true).unwrap();
        for (x, y) in a
            .column(1)
            .unwrap()
            .iter()
            .zip(b.column(1).unwrap().iter())
        {
            assert_relative_eq!(x * k, *y, max_relative = 1e-12);
        }
    }

    #[test]
    fn double_correction_is_an_error() {
        let mut t = table(vec![vec![1.0], vec![10.0]]);
        apply_decade_correction(&mut t, &[1], 2.0, false).unwrap();
        let err = apply_decade_correction(&mut t, &[1], 2.0, false).unwrap_err();
        assert!(matches!(err, DatasetError::AlreadyCorrected { .. }));
        // First application stands, no partial re-scale.
        assert_relative_eq!(t.column(1).unwrap()[0], 20.0);
    }
}
