//! Theoretical flux models: analytic IceCube power-law fits with their
//! uncertainty envelopes, and the file-backed UHECR / proton model tables
//! read from `data/` at startup.

use std::path::Path;

use anyhow::{Context, Result, bail};

use super::interp::interp_linear;
use super::loader::load_table;
use super::model::{BandSeries, Series};
use super::normalize::{UnitOp, to_base_units};
use crate::units::{GEV, GEV_PER_CM2_S_SR, PER_GEV_CM2_S_SR, TEV};

// ---------------------------------------------------------------------------
// IceCube astrophysical power-law fits
// ---------------------------------------------------------------------------

/// Single-flavor astrophysical power-law fit, summed over three flavors:
/// `3 · offset · (E / 100 TeV)^slope · 1e-18 GeV⁻¹ cm⁻² s⁻¹ sr⁻¹`,
/// returned as differential flux in base units.
pub fn ice_cube_nu_fit(energy: f64, offset: f64, slope: f64) -> f64 {
    3.0 * offset * (energy / (100.0 * TEV)).powf(slope) * 1e-18 * PER_GEV_CM2_S_SR
}

/// Shared energy grid of the fit envelopes: 1e5 to 4.9e6 GeV in 1e5 GeV
/// steps (end-exclusive, matching the published binning).
fn fit_energy_grid() -> Vec<f64> {
    (1..50).map(|i| i as f64 * 1e5 * GEV).collect()
}

fn fit_envelope(
    name: &str,
    upper: [(f64, f64); 2],
    lower: [(f64, f64); 2],
) -> BandSeries {
    let energy = fit_energy_grid();
    let hi: Vec<f64> = energy
        .iter()
        .map(|&e| {
            let a = ice_cube_nu_fit(e, upper[0].0, upper[0].1);
            let b = ice_cube_nu_fit(e, upper[1].0, upper[1].1);
            a.max(b) * e * e
        })
        .collect();
    let lo: Vec<f64> = energy
        .iter()
        .map(|&e| {
            let a = ice_cube_nu_fit(e, lower[0].0, lower[0].1);
            let b = ice_cube_nu_fit(e, lower[1].0, lower[1].1);
            a.min(b) * e * e
        })
        .collect();
    // The analytic envelopes are ordered by construction.
    BandSeries::new(name, energy, lo, hi).expect("analytic envelope is well formed")
}

/// Uncertainty band of the through-going muon fit.
pub fn ice_cube_mu_range() -> BandSeries {
    fit_envelope(
        "IceCube νμ fit",
        [(0.9, -2.0), (1.2, -2.13)],
        [(0.9, -2.26), (0.63, -2.13)],
    )
}

/// Best-fit line of the through-going muon sample, E²-weighted.
pub fn ice_cube_mu_fit_line() -> Series {
    fit_line("IceCube νμ best fit", 0.9, -2.13)
}

/// Uncertainty band of the HESE fit.
pub fn ice_cube_hese_range() -> BandSeries {
    fit_envelope(
        "IceCube HESE fit",
        [(2.46, -2.63), (2.76, -2.92)],
        [(2.46, -3.25), (2.16, -2.92)],
    )
}

/// Best-fit line of the HESE sample, E²-weighted.
pub fn ice_cube_hese_fit_line() -> Series {
    fit_line("IceCube HESE best fit", 2.46, -2.92)
}

fn fit_line(name: &str, offset: f64, slope: f64) -> Series {
    let energy = fit_energy_grid();
    let value: Vec<f64> = energy
        .iter()
        .map(|&e| ice_cube_nu_fit(e, offset, slope) * e * e)
        .collect();
    Series::new(name, energy, value).expect("analytic fit line is well formed")
}

// ---------------------------------------------------------------------------
// File-backed model tables
// ---------------------------------------------------------------------------

/// The static model tables read once at startup. Missing or malformed
/// files abort figure generation.
#[derive(Debug, Clone)]
pub struct ModelTables {
    /// Best-fit UHECR neutrino flux, E²-weighted.
    pub uhecr_best_fit: Series,
    /// Source-evolution envelope around the best fit, E²-weighted.
    pub uhecr_evolution: BandSeries,
    /// Region allowed by UHECR data: maximal flux down to reasonable/10.
    pub proton_band: BandSeries,
    /// The 10%-protons-in-UHECRs flux, E²-weighted.
    pub proton_reasonable: Series,
}

impl ModelTables {
    /// Load every model table from `dir`.
    ///
    /// Expected files (col 0 = E [GeV] throughout):
    /// * `uhecr_best_fit.out`       – col 1 dN/dE [GeV⁻¹ cm⁻² s⁻¹ sr⁻¹]
    /// * `uhecr_evolution_band.out` – cols 1,2 lower/upper dN/dE
    /// * `proton_max_1.txt`, `proton_max_2.txt`, `proton_reasonable.txt`
    ///                              – col 1 E²Φ [GeV cm⁻² s⁻¹ sr⁻¹]
    pub fn load(dir: &Path) -> Result<Self> {
        let uhecr_best_fit = load_diff_flux_series(&dir.join("uhecr_best_fit.out"))?;
        let uhecr_evolution = load_diff_flux_band(&dir.join("uhecr_evolution_band.out"))?;

        let max_1 = load_e2_series(&dir.join("proton_max_1.txt"))?;
        let max_2 = load_e2_series(&dir.join("proton_max_2.txt"))?;
        let proton_reasonable = load_e2_series(&dir.join("proton_reasonable.txt"))?;

        let proton_band = proton_band(&max_1, &max_2, &proton_reasonable)?;

        log::info!(
            "loaded model tables from {} ({} best-fit samples, {} proton samples)",
            dir.display(),
            uhecr_best_fit.len(),
            proton_reasonable.len()
        );

        Ok(ModelTables {
            uhecr_best_fit,
            uhecr_evolution,
            proton_band,
            proton_reasonable,
        })
    }

    /// Differential flux of the 10%-proton model at `energy`, interpolated
    /// between table samples (clamped at the table ends).
    pub fn proton_10_flux(&self, energy: f64) -> f64 {
        let phi: Vec<f64> = self
            .proton_reasonable
            .energy
            .iter()
            .zip(self.proton_reasonable.value.iter())
            .map(|(&e, &v)| v / (e * e))
            .collect();
        interp_linear(&self.proton_reasonable.energy, &phi, energy)
    }
}

/// col 1 is differential flux; returns the E²-weighted series.
fn load_diff_flux_series(path: &Path) -> Result<Series> {
    let t = to_base_units(
        load_table(path)?,
        &[
            UnitOp::Scale(0, GEV),
            UnitOp::Scale(1, PER_GEV_CM2_S_SR),
        ],
    )?;
    let energy = t.column(0)?.to_vec();
    let value: Vec<f64> = t
        .column(1)?
        .iter()
        .zip(energy.iter())
        .map(|(&f, &e)| f * e * e)
        .collect();
    Ok(Series::new(&t.name, energy, value)?)
}

/// cols 1,2 are differential-flux bounds; returns the E²-weighted band.
fn load_diff_flux_band(path: &Path) -> Result<BandSeries> {
    let t = to_base_units(
        load_table(path)?,
        &[
            UnitOp::Scale(0, GEV),
            UnitOp::Scale(1, PER_GEV_CM2_S_SR),
            UnitOp::Scale(2, PER_GEV_CM2_S_SR),
        ],
    )?;
    let energy = t.column(0)?.to_vec();
    let weight = |col: &[f64]| -> Vec<f64> {
        col.iter()
            .zip(energy.iter())
            .map(|(&f, &e)| f * e * e)
            .collect()
    };
    let lo = weight(t.column(1)?);
    let hi = weight(t.column(2)?);
    Ok(BandSeries::new(&t.name, energy, lo, hi)?)
}

/// col 1 is already E²-weighted flux in display units.
fn load_e2_series(path: &Path) -> Result<Series> {
    let t = to_base_units(
        load_table(path)?,
        &[
            UnitOp::Scale(0, GEV),
            UnitOp::Scale(1, GEV_PER_CM2_S_SR),
        ],
    )?;
    Ok(Series::new(
        &t.name,
        t.column(0)?.to_vec(),
        t.column(1)?.to_vec(),
    )?)
}

/// Pointwise max of the two maximal-flux tables down to reasonable/10.
/// All three tables must share one energy grid.
fn proton_band(max_1: &Series, max_2: &Series, reasonable: &Series) -> Result<BandSeries> {
    if max_1.energy != max_2.energy || max_1.energy != reasonable.energy {
        bail!("proton model tables do not share an energy grid");
    }
    let hi: Vec<f64> = max_1
        .value
        .iter()
        .zip(max_2.value.iter())
        .map(|(&a, &b)| a.max(b))
        .collect();
    let lo: Vec<f64> = reasonable.value.iter().map(|&v| v / 10.0).collect();
    BandSeries::new("not excluded from UHECRs", max_1.energy.clone(), lo, hi)
        .context("proton band bounds")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn nu_fit_pins_the_anchor_normalization() {
        // At the 100 TeV anchor the power law collapses to its prefactor.
        let flux = ice_cube_nu_fit(100.0 * TEV, 0.9, -2.13);
        assert_relative_eq!(flux, 2.7e-18 * PER_GEV_CM2_S_SR, max_relative = 1e-12);
    }

    #[test]
    fn nu_fit_slope_is_falling() {
        let f1 = ice_cube_nu_fit(100.0 * TEV, 0.9, -2.13);
        let f2 = ice_cube_nu_fit(1000.0 * TEV, 0.9, -2.13);
        assert!(f2 < f1);
    }

    #[test]
    fn fit_envelopes_are_ordered_on_the_grid() {
        for band in [ice_cube_mu_range(), ice_cube_hese_range()] {
            assert_eq!(band.energy.len(), 49);
            assert!(band.lo.iter().zip(band.hi.iter()).all(|(l, h)| l <= h));
        }
    }

    #[test]
    fn fit_grid_spans_published_range() {
        let band = ice_cube_mu_range();
        assert_relative_eq!(band.energy[0], 1e5 * GEV);
        assert_relative_eq!(band.energy[48], 4.9e6 * GEV);
    }

    fn write_model_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("nufluxview_models_test");
        std::fs::create_dir_all(&dir).unwrap();
        let write = |name: &str, contents: &str| {
            let mut f = std::fs::File::create(dir.join(name)).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
        };
        write(
            "uhecr_best_fit.out",
            "1.0e6 1.0e-20\n1.0e7 1.0e-22\n1.0e8 1.0e-24\n",
        );
        write(
            "uhecr_evolution_band.out",
            "1.0e6 0.5e-20 2.0e-20\n1.0e7 0.5e-22 2.0e-22\n1.0e8 0.5e-24 2.0e-24\n",
        );
        write("proton_max_1.txt", "1.0e6 4.0e-8\n1.0e7 6.0e-8\n1.0e8 3.0e-8\n");
        write("proton_max_2.txt", "1.0e6 5.0e-8\n1.0e7 5.0e-8\n1.0e8 2.0e-8\n");
        write(
            "proton_reasonable.txt",
            "1.0e6 1.0e-8\n1.0e7 2.0e-8\n1.0e8 1.0e-8\n",
        );
        dir
    }

    #[test]
    fn model_tables_load_and_weight() {
        let models = ModelTables::load(&write_model_dir()).unwrap();

        // dN/dE = 1e-20 GeV⁻¹cm⁻²s⁻¹sr⁻¹ at 1e6 GeV → E²Φ in base units.
        let e = 1.0e6 * GEV;
        assert_relative_eq!(
            models.uhecr_best_fit.value[0],
            1.0e-20 * PER_GEV_CM2_S_SR * e * e,
            max_relative = 1e-12
        );

        // Band envelope: max(4, 5) = 5e-8; lower = reasonable / 10.
        assert_relative_eq!(
            models.proton_band.hi[0],
            5.0e-8 * GEV_PER_CM2_S_SR,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            models.proton_band.lo[0],
            1.0e-9 * GEV_PER_CM2_S_SR,
            max_relative = 1e-12
        );
    }

    #[test]
    fn proton_interpolation_is_differential() {
        let models = ModelTables::load(&write_model_dir()).unwrap();
        let e = 1.0e6 * GEV;
        // At a table sample the interpolation returns E²Φ / E² exactly.
        assert_relative_eq!(
            models.proton_10_flux(e),
            1.0e-8 * GEV_PER_CM2_S_SR / (e * e),
            max_relative = 1e-12
        );
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = std::env::temp_dir().join("nufluxview_models_missing");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(ModelTables::load(&dir).is_err());
    }
}
