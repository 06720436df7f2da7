//! Sensitivity Calculator: neutrino-nucleon cross sections and the
//! conversion of an effective-volume curve into an E²Φ flux limit.
//!
//! This is the one interface downstream consumers compare curves against;
//! every constant entering the computation lives in this module.

use thiserror::Error;

use crate::units::{CM, GEV, YEAR};

/// Nucleon mass [kg].
const NUCLEON_MASS: f64 = 1.67262192369e-27;

/// Ice density [kg m⁻³].
const ICE_DENSITY: f64 = 917.0;

const LN_10: f64 = std::f64::consts::LN_10;

// ---------------------------------------------------------------------------
// Cross-section models
// ---------------------------------------------------------------------------

/// Neutrino-nucleon cross-section scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossSectionModel {
    /// Connolly, Thorne, Waters, Phys. Rev. D 83, 113009 (2011);
    /// flavor-averaged CC+NC mean of ν and ν̄. Valid above ~10⁴ GeV.
    Ctw,
    /// Gandhi, Quigg, Reno, Sarcevic power law, total CC+NC.
    Gandhi,
}

/// One CTW parametrization: log10(σ/cm²) as a function of ε = log10(E/GeV).
struct CtwParams {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,
}

const CTW_NU_CC: CtwParams = CtwParams {
    c0: -1.826,
    c1: -17.31,
    c2: -6.406,
    c3: 1.431,
    c4: -17.91,
};
const CTW_NU_NC: CtwParams = CtwParams {
    c0: -1.826,
    c1: -17.31,
    c2: -6.448,
    c3: 1.431,
    c4: -18.61,
};
const CTW_NUBAR_CC: CtwParams = CtwParams {
    c0: -1.033,
    c1: -15.95,
    c2: -7.247,
    c3: 1.569,
    c4: -17.72,
};
const CTW_NUBAR_NC: CtwParams = CtwParams {
    c0: -1.033,
    c1: -15.95,
    c2: -7.296,
    c3: 1.569,
    c4: -18.30,
};

fn ctw_sigma_cm2(epsilon: f64, p: &CtwParams) -> f64 {
    let l = (epsilon - p.c0).ln();
    10f64.powf(p.c1 + p.c2 * l + p.c3 * l * l + p.c4 / l)
}

/// Total neutrino-nucleon cross section [m²] at `energy` (base units).
pub fn nu_cross_section(energy: f64, model: CrossSectionModel) -> f64 {
    let e_gev = energy / GEV;
    match model {
        CrossSectionModel::Ctw => {
            let eps = e_gev.log10();
            let nu = ctw_sigma_cm2(eps, &CTW_NU_CC) + ctw_sigma_cm2(eps, &CTW_NU_NC);
            let nubar = ctw_sigma_cm2(eps, &CTW_NUBAR_CC) + ctw_sigma_cm2(eps, &CTW_NUBAR_NC);
            0.5 * (nu + nubar) * CM * CM
        }
        CrossSectionModel::Gandhi => 7.84e-36 * e_gev.powf(0.363) * CM * CM,
    }
}

/// Neutrino interaction length in ice [m] at `energy`.
pub fn interaction_length(energy: f64, model: CrossSectionModel) -> f64 {
    NUCLEON_MASS / (ICE_DENSITY * nu_cross_section(energy, model))
}

// ---------------------------------------------------------------------------
// Flux-limit computation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SensitivityError {
    #[error("energy and effective-volume arrays differ in length ({energies} vs {veff})")]
    LengthMismatch { energies: usize, veff: usize },
}

/// Exposure configuration of a limit computation. The defaults mirror the
/// usual convention: one detector unit, one energy bin per decade, and the
/// Feldman-Cousins 90% CL event bound for zero observed background.
#[derive(Debug, Clone, Copy)]
pub struct ExposureConfig {
    /// Observation time (base units).
    pub livetime: f64,
    /// Dimensionless signal efficiency, e.g. the number of stations.
    pub signal_eff: f64,
    /// Logarithmic energy bins per factor 10 in energy.
    pub bins_per_decade: f64,
    /// Upper limit on the expected event count per bin.
    pub upper_lim_events: f64,
    /// Cross-section scenario.
    pub model: CrossSectionModel,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        ExposureConfig {
            livetime: 3.0 * YEAR,
            signal_eff: 1.0,
            bins_per_decade: 1.0,
            upper_lim_events: 2.44,
            model: CrossSectionModel::Ctw,
        }
    }
}

/// Differential-flux upper limit, expressed as E²Φ in base units, one value
/// per input energy.
///
/// Per energy bin the expected event count for a flux Φ is
/// `Φ(E) · E · ln(10)/binsPerDecade · Veff·sr / L_int(E) · livetime · eff`;
/// inverting at the event bound and weighting by E² gives
/// `E²Φ = upperLim · E · binsPerDecade / (ln 10 · Veff/L_int · T · eff)`.
///
/// A zero or negative effective volume makes the limit infinite at that
/// energy; the sentinel `f64::INFINITY` is returned there instead of an
/// error so a whole curve can still be plotted. No monotonicity is imposed
/// on the output.
pub fn limit_e2_flux(
    energy: &[f64],
    veff_sr: &[f64],
    cfg: &ExposureConfig,
) -> Result<Vec<f64>, SensitivityError> {
    if energy.len() != veff_sr.len() {
        return Err(SensitivityError::LengthMismatch {
            energies: energy.len(),
            veff: veff_sr.len(),
        });
    }

    let limit = energy
        .iter()
        .zip(veff_sr.iter())
        .map(|(&e, &veff)| {
            if veff <= 0.0 {
                return f64::INFINITY;
            }
            let rate_per_flux =
                veff / interaction_length(e, cfg.model) * cfg.livetime * cfg.signal_eff;
            cfg.upper_lim_events * e * cfg.bins_per_decade / (LN_10 * rate_per_flux)
        })
        .collect();

    Ok(limit)
}

/// Limit curves for two effective-volume estimates on one energy grid, for
/// drawing a sensitivity band. Returned in argument order; the larger
/// volume yields the lower (tighter) curve.
pub fn limit_band(
    energy: &[f64],
    veff_sr_1: &[f64],
    veff_sr_2: &[f64],
    cfg: &ExposureConfig,
) -> Result<(Vec<f64>, Vec<f64>), SensitivityError> {
    let first = limit_e2_flux(energy, veff_sr_1, cfg)?;
    let second = limit_e2_flux(energy, veff_sr_2, cfg)?;
    Ok((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{EV, M3_SR};
    use approx::assert_relative_eq;

    fn spec_inputs() -> (Vec<f64>, Vec<f64>) {
        (
            vec![1e16 * EV, 1e17 * EV],
            vec![1e9 * M3_SR, 1e10 * M3_SR],
        )
    }

    #[test]
    fn ctw_cross_section_rises_with_energy() {
        let mut last = 0.0;
        for exp in 15..21 {
            let sigma = nu_cross_section(10f64.powi(exp) * EV, CrossSectionModel::Ctw);
            assert!(sigma > last);
            last = sigma;
        }
    }

    #[test]
    fn ctw_cross_section_magnitude_at_eev() {
        // Total νN cross section at 1 EeV is of order 1e-32 cm².
        let sigma = nu_cross_section(1e18 * EV, CrossSectionModel::Ctw);
        assert!(sigma > 1e-33 * CM * CM && sigma < 1e-31 * CM * CM);
    }

    #[test]
    fn gandhi_power_law_scaling() {
        let s1 = nu_cross_section(1e6 * GEV, CrossSectionModel::Gandhi);
        let s2 = nu_cross_section(1e9 * GEV, CrossSectionModel::Gandhi);
        assert_relative_eq!(s2 / s1, 1e3f64.powf(0.363), max_relative = 1e-12);
    }

    #[test]
    fn doubling_stations_halves_the_limit() {
        let (energy, veff) = spec_inputs();
        let base = ExposureConfig {
            bins_per_decade: 2.0,
            ..ExposureConfig::default()
        };
        let few = limit_e2_flux(
            &energy,
            &veff,
            &ExposureConfig {
                signal_eff: 270.0,
                ..base
            },
        )
        .unwrap();
        let many = limit_e2_flux(
            &energy,
            &veff,
            &ExposureConfig {
                signal_eff: 540.0,
                ..base
            },
        )
        .unwrap();
        for (f, m) in few.iter().zip(many.iter()) {
            assert_relative_eq!(*f, 2.0 * m, max_relative = 1e-12);
        }
    }

    #[test]
    fn limit_scales_inversely_with_livetime() {
        let (energy, veff) = spec_inputs();
        let short = limit_e2_flux(&energy, &veff, &ExposureConfig::default()).unwrap();
        let long = limit_e2_flux(
            &energy,
            &veff,
            &ExposureConfig {
                livetime: 6.0 * YEAR,
                ..ExposureConfig::default()
            },
        )
        .unwrap();
        for (s, l) in short.iter().zip(long.iter()) {
            assert_relative_eq!(*s, 2.0 * l, max_relative = 1e-12);
        }
    }

    #[test]
    fn zero_veff_yields_sentinel_not_failure() {
        let energy = vec![1e16 * EV, 1e17 * EV, 1e18 * EV];
        let veff = vec![1e9 * M3_SR, 0.0, 1e10 * M3_SR];
        let limit = limit_e2_flux(&energy, &veff, &ExposureConfig::default()).unwrap();
        assert!(limit[0].is_finite());
        assert!(limit[1].is_infinite() && limit[1] > 0.0);
        assert!(limit[2].is_finite());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = limit_e2_flux(&[1e16], &[1e9, 1e10], &ExposureConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SensitivityError::LengthMismatch {
                energies: 1,
                veff: 2
            }
        ));
    }

    #[test]
    fn more_exposure_tightens_the_limit() {
        // Fixed energy fixes the cross section and bin width; a strictly
        // increasing Veff must then give a non-increasing limit.
        let energy = vec![1e17 * EV; 6];
        let veff: Vec<f64> = (1..=6).map(|i| i as f64 * 1e9 * M3_SR).collect();
        let limit = limit_e2_flux(&energy, &veff, &ExposureConfig::default()).unwrap();
        assert!(limit.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn limit_band_orders_by_volume() {
        let (energy, veff) = spec_inputs();
        let veff_large: Vec<f64> = veff.iter().map(|v| v * 10.0).collect();
        let (small, large) =
            limit_band(&energy, &veff, &veff_large, &ExposureConfig::default()).unwrap();
        for (s, l) in small.iter().zip(large.iter()) {
            assert!(l < s);
        }
    }
}
