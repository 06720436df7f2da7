//! Base-unit system for all stored quantities.
//!
//! Every quantity in this crate is an `f64` in base units: energies in eV,
//! lengths in m, times in s, solid angles in sr. Multiplying a literal by
//! the matching constant converts it *into* base units; dividing converts
//! back out. Conversion happens exactly once, at ingestion (see
//! [`crate::data::normalize`]), and division to display units exactly once,
//! at figure assembly (see [`crate::figure`]).

// ---------------------------------------------------------------------------
// Energy (base: eV)
// ---------------------------------------------------------------------------

pub const EV: f64 = 1.0;
pub const GEV: f64 = 1e9 * EV;
pub const TEV: f64 = 1e12 * EV;

// ---------------------------------------------------------------------------
// Length (base: m)
// ---------------------------------------------------------------------------

pub const METER: f64 = 1.0;
pub const CM: f64 = 1e-2 * METER;

// ---------------------------------------------------------------------------
// Time (base: s)
// ---------------------------------------------------------------------------

pub const SECOND: f64 = 1.0;
pub const DAY: f64 = 86_400.0 * SECOND;
/// Julian year.
pub const YEAR: f64 = 365.25 * DAY;

// ---------------------------------------------------------------------------
// Solid angle (base: sr)
// ---------------------------------------------------------------------------

pub const SR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Derived units
// ---------------------------------------------------------------------------

/// The conventional E²Φ display unit: GeV cm⁻² s⁻¹ sr⁻¹.
pub const GEV_PER_CM2_S_SR: f64 = GEV / (CM * CM) / SECOND / SR;

/// Differential-flux unit: GeV⁻¹ cm⁻² s⁻¹ sr⁻¹.
pub const PER_GEV_CM2_S_SR: f64 = 1.0 / GEV / (CM * CM) / SECOND / SR;

/// Effective volume times solid angle: m³ sr.
pub const M3_SR: f64 = METER * METER * METER * SR;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_flux_unit_value() {
        // GeV = 1e9 eV, cm⁻² = 1e4 m⁻²
        assert_eq!(GEV_PER_CM2_S_SR, 1e13);
    }

    #[test]
    fn year_in_seconds() {
        assert_eq!(YEAR, 31_557_600.0);
    }
}
