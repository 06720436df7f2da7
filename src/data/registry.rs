//! Read-only registry of published experimental limits, measurements and
//! projected sensitivities.
//!
//! Every dataset is a literal table copied from the publication it cites,
//! together with its unit-conversion recipe and its per-dataset binning
//! correction. Tables are normalized to base units exactly once, here, at
//! construction; the registry only ever hands out normalized series.

use std::collections::BTreeMap;

use super::model::{
    BandSeries, DatasetError, MeasurementPoint, MeasurementSeries, RawTable, Series, UpperError,
};
use super::normalize::{UnitOp, apply_decade_correction, to_base_units};
use crate::units::{EV, GEV, GEV_PER_CM2_S_SR};

// ---------------------------------------------------------------------------
// Published – one registry entry
// ---------------------------------------------------------------------------

/// A normalized published dataset, shaped by how it is drawn.
#[derive(Debug, Clone)]
pub enum Published {
    /// A limit or projected-sensitivity curve, E²Φ per energy.
    Limit(Series),
    /// Measured flux points with asymmetric errors and upper-limit flags.
    Measurement(MeasurementSeries),
    /// A filled region between two flux bounds.
    Band(BandSeries),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable collection of the published datasets, keyed by experiment
/// name. Built once at startup; no mutation afterwards.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: BTreeMap<String, Published>,
}

impl Registry {
    /// Build the registry of all published datasets.
    ///
    /// `bins_per_decade` is the figure's differential-flux convention; the
    /// datasets that need a binning correction receive it here and are
    /// flagged so it cannot be applied again downstream.
    pub fn published(bins_per_decade: f64) -> Result<Self, DatasetError> {
        let mut entries = BTreeMap::new();

        entries.insert(
            "grand_10k".to_string(),
            Published::Limit(grand_10k(bins_per_decade)?),
        );
        entries.insert(
            "grand_200k".to_string(),
            Published::Limit(grand_200k()?),
        );
        entries.insert("radar".to_string(), Published::Band(radar()?));
        entries.insert(
            "ice_cube_ehe".to_string(),
            Published::Limit(ice_cube_ehe(bins_per_decade)?),
        );
        entries.insert(
            "ice_cube_hese".to_string(),
            Published::Measurement(ice_cube_hese()?),
        );
        entries.insert(
            "anita_i_iii".to_string(),
            Published::Limit(anita_i_iii(bins_per_decade)?),
        );
        entries.insert(
            "auger".to_string(),
            Published::Limit(auger(bins_per_decade)?),
        );

        Ok(Registry { entries })
    }

    pub fn get(&self, name: &str) -> Option<&Published> {
        self.entries.get(name)
    }

    /// Convenience accessor for entries known to be limit curves.
    pub fn limit(&self, name: &str) -> Option<&Series> {
        match self.entries.get(name) {
            Some(Published::Limit(s)) => Some(s),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GRAND – projected sensitivities, white paper (numerical values, Bustamante)
// ---------------------------------------------------------------------------

/// Energies in GeV, shared by both GRAND configurations.
const GRAND_ENERGY: [f64; 40] = [
    48192296.5,
    67644231.1,
    94947581.6,
    133271428.0,
    187063990.0,
    262568931.0,
    368550053.0,
    517308507.0,
    726110577.0,
    1019191760.0,
    1430569790.0,
    2007992980.0,
    2818482440.0,
    3956111070.0,
    5552922590.0,
    7794257720.0,
    10940266600.0,
    15356104100.0,
    21554313200.0,
    30254315500.0,
    42465913900.0,
    59606499400.0,
    83665567300.0,
    117435636000.0,
    164836371000.0,
    231369543000.0,
    324757606000.0,
    455840043000.0,
    639831498000.0,
    898087721000.0,
    1260584320000.0,
    1769396010000.0,
    2483580190000.0,
    3486031680000.0,
    4893104280000.0,
    6868115880000.0,
    9640304610000.0,
    13531436400000.0,
    18993151900000.0,
    26659388600000.0,
];

const GRAND_10K_FLUX: [f64; 40] = [
    8.41513361e-08,
    7.38147706e-08,
    5.69225180e-08,
    3.46647934e-08,
    1.95651137e-08,
    1.40651565e-08,
    1.25782087e-08,
    1.24621707e-08,
    1.31123151e-08,
    1.45812119e-08,
    1.65528260e-08,
    1.91930521e-08,
    2.31554429e-08,
    2.87477813e-08,
    3.55164030e-08,
    4.42563884e-08,
    5.63965197e-08,
    7.45183330e-08,
    1.01159657e-07,
    1.39040439e-07,
    1.98526677e-07,
    2.61742251e-07,
    3.40870828e-07,
    4.82745531e-07,
    6.55876763e-07,
    9.07706655e-07,
    1.67125879e-06,
    1.76142511e-05,
    2.55022320e-04,
    1.88371074e-03,
    6.71431813e-03,
    1.14286198e-02,
    1.14294614e-02,
    1.72447830e-02,
    7.48579143e-02,
    3.31883351e-01,
    8.57786094e-01,
    1.24824516e+00,
    1.42294586e+00,
    1.80135089e+00,
];

const GRAND_200K_FLUX: [f64; 40] = [
    4.26219753e-09,
    3.58147708e-09,
    2.75670137e-09,
    1.85254042e-09,
    1.13825106e-09,
    7.70141315e-10,
    6.51758930e-10,
    6.35878242e-10,
    6.69261628e-10,
    7.37439217e-10,
    8.38784832e-10,
    9.81688683e-10,
    1.18493794e-09,
    1.45699379e-09,
    1.80867621e-09,
    2.26948852e-09,
    2.91952068e-09,
    3.86790849e-09,
    5.24530715e-09,
    7.31211288e-09,
    9.98848945e-09,
    1.33523293e-08,
    1.80893102e-08,
    2.46582187e-08,
    3.41054825e-08,
    5.39140368e-08,
    3.36553610e-07,
    4.57179717e-06,
    3.59391218e-05,
    1.47550853e-04,
    3.33777479e-04,
    4.92873322e-04,
    6.68381070e-04,
    1.72553598e-03,
    7.06643413e-03,
    2.10754560e-02,
    4.06319101e-02,
    5.88162853e-02,
    7.45423652e-02,
    8.83700084e-02,
];

fn grand_table(name: &str, flux: &[f64; 40]) -> Result<RawTable, DatasetError> {
    let raw = RawTable::from_columns(name, vec![GRAND_ENERGY.to_vec(), flux.to_vec()])?;
    to_base_units(
        raw,
        &[
            UnitOp::Scale(0, GEV),
            UnitOp::Scale(1, GEV_PER_CM2_S_SR),
        ],
    )
}

/// GRAND 10k antennas; the published table uses full-decade binning.
fn grand_10k(bins_per_decade: f64) -> Result<Series, DatasetError> {
    let mut t = grand_table("GRAND 10k", &GRAND_10K_FLUX)?;
    apply_decade_correction(&mut t, &[1], bins_per_decade, false)?;
    Series::new("GRAND 10k", t.column(0)?.to_vec(), t.column(1)?.to_vec())
}

/// GRAND 200k antennas; the published values already follow the figure's
/// binning convention and take no correction.
fn grand_200k() -> Result<Series, DatasetError> {
    let t = grand_table("GRAND 200k", &GRAND_200K_FLUX)?;
    Series::new("GRAND 200k", t.column(0)?.to_vec(), t.column(1)?.to_vec())
}

// ---------------------------------------------------------------------------
// Radar echo – proposed, arXiv:1710.02883
// ---------------------------------------------------------------------------

/// Rows: log10(E/eV), lower and upper E²Φ bound [GeV cm⁻² s⁻¹ sr⁻¹].
const RADAR: [(f64, f64, f64); 9] = [
    (1.525e+01, 6.870e-09, 3.430e-07),
    (1.575e+01, 9.797e-10, 3.113e-08),
    (1.625e+01, 4.728e-09, 1.928e-07),
    (1.675e+01, 6.359e-09, 3.706e-07),
    (1.725e+01, 9.128e-09, 8.517e-07),
    (1.775e+01, 1.619e-08, 1.835e-06),
    (1.825e+01, 2.995e-08, 2.766e-06),
    (1.875e+01, 5.562e-08, 8.253e-06),
    (1.925e+01, 1.072e-07, 1.849e-05),
];

fn radar() -> Result<BandSeries, DatasetError> {
    let raw = RawTable::from_columns(
        "Radar",
        vec![
            RADAR.iter().map(|r| r.0).collect(),
            RADAR.iter().map(|r| r.1).collect(),
            RADAR.iter().map(|r| r.2).collect(),
        ],
    )?;
    let t = to_base_units(
        raw,
        &[
            UnitOp::PowTen(0),
            UnitOp::Scale(0, EV),
            UnitOp::Scale(1, GEV_PER_CM2_S_SR),
            UnitOp::Scale(2, GEV_PER_CM2_S_SR),
        ],
    )?;
    BandSeries::new(
        "Radar",
        t.column(0)?.to_vec(),
        t.column(1)?.to_vec(),
        t.column(2)?.to_vec(),
    )
}

// ---------------------------------------------------------------------------
// IceCube differential limit – Phys. Rev. D 98, 062003 (2018)
// ---------------------------------------------------------------------------

/// Rows: log10(E/GeV), log10(E²Φ / GeV cm⁻² s⁻¹ sr⁻¹).
const ICE_CUBE_EHE: [(f64, f64); 18] = [
    (6.199999125, -7.698484687),
    (6.299999496, -8.162876678),
    (6.400000617, -8.11395291),
    (6.500000321, -8.063634144),
    (6.599999814, -8.004841781),
    (6.699999798, -7.944960162),
    (6.799999763, -7.924197388),
    (6.899999872, -7.899315263),
    (7.299999496, -7.730561153),
    (7.699999798, -7.670680637),
    (8.100001583, -7.683379711),
    (8.500000321, -7.748746801),
    (8.899999872, -7.703060304),
    (9.299999496, -7.512907553),
    (9.699999798, -7.370926525),
    (10.10000158, -7.134626026),
    (10.50000032, -6.926516638),
    (10.89999987, -6.576523031),
];

fn ice_cube_ehe(bins_per_decade: f64) -> Result<Series, DatasetError> {
    let raw = RawTable::from_columns(
        "IceCube",
        vec![
            ICE_CUBE_EHE.iter().map(|r| r.0).collect(),
            ICE_CUBE_EHE.iter().map(|r| r.1).collect(),
        ],
    )?;
    let mut t = to_base_units(
        raw,
        &[
            UnitOp::PowTen(0),
            UnitOp::Scale(0, GEV),
            UnitOp::PowTen(1),
            UnitOp::Scale(1, GEV_PER_CM2_S_SR),
        ],
    )?;
    apply_decade_correction(&mut t, &[1], bins_per_decade, false)?;
    Series::new("IceCube", t.column(0)?.to_vec(), t.column(1)?.to_vec())
}

// ---------------------------------------------------------------------------
// IceCube HESE – PoS ICRC2017 (2018) 981, Fig. 2 (preliminary)
// ---------------------------------------------------------------------------

/// Rows: E [GeV], E²Φ, error down, error up [GeV cm⁻² s⁻¹ sr⁻¹].
/// A zero upper error marks a one-sided upper limit.
const ICE_CUBE_HESE: [(f64, f64, f64, f64); 10] = [
    (6.526e+04, 2.248e-08, 9.96e-9, 1.123e-8),
    (1.409e+05, 2.692e-08, 5.91e-9, 7.56e-9),
    (3.041e+05, 7.631e-09, 3.746e-9, 4.61e-9),
    (6.644e+05, 2.022e-09, 7.03e-10, 0.),
    (1.434e+06, 5.205e-09, 3.183e-9, 4.57e-9),
    (3.096e+06, 4.347e-09, 3.142e-9, 5.428e-9),
    (6.684e+06, 1.544e-09, 5.37e-10, 0.),
    (1.46e+07, 4.063e-09, 1.353e-9, 0.),
    (3.153e+07, 6.093e-09, 2.03e-9, 0.),
    (6.806e+07, 1.046e-08, 3.641e-9, 0.),
];

/// HESE is a single-flavor measurement shown on an all-flavor figure; the
/// flux and both error columns carry a flavor-sum factor of 3. This factor
/// is specific to this dataset and is not a general rule.
const HESE_FLAVOR_SUM: f64 = 3.0;

fn ice_cube_hese() -> Result<MeasurementSeries, DatasetError> {
    let raw = RawTable::from_columns(
        "IceCube HESE",
        vec![
            ICE_CUBE_HESE.iter().map(|r| r.0).collect(),
            ICE_CUBE_HESE.iter().map(|r| r.1).collect(),
            ICE_CUBE_HESE.iter().map(|r| r.2).collect(),
            ICE_CUBE_HESE.iter().map(|r| r.3).collect(),
        ],
    )?;
    let flux_scale = GEV_PER_CM2_S_SR * HESE_FLAVOR_SUM;
    let t = to_base_units(
        raw,
        &[
            UnitOp::Scale(0, GEV),
            UnitOp::Scale(1, flux_scale),
            UnitOp::Scale(2, flux_scale),
            UnitOp::Scale(3, flux_scale),
        ],
    )?;

    let points = (0..t.n_rows())
        .map(|i| {
            let up = t.column(3)?[i];
            Ok(MeasurementPoint {
                energy: t.column(0)?[i],
                e2_flux: t.column(1)?[i],
                err_down: t.column(2)?[i],
                err_up: if up == 0.0 {
                    UpperError::UpperLimit
                } else {
                    UpperError::Bar(up)
                },
            })
        })
        .collect::<Result<Vec<_>, DatasetError>>()?;

    MeasurementSeries::new("IceCube HESE", points)
}

// ---------------------------------------------------------------------------
// ANITA I–III – Phys. Rev. D 98, 022001 (2018)
// ---------------------------------------------------------------------------

/// Rows: E [eV], E²Φ [GeV cm⁻² s⁻¹ sr⁻¹]; the publication quotes EΦ, the
/// inline `E / 1e9` factors convert to E²Φ at the table's own energies.
const ANITA: [(f64, f64); 8] = [
    (9.94e17, 3.79e-14 * 9.94e17 / 1e9),
    (2.37e18, 2.15e-15 * 2.37e18 / 1e9),
    (5.19e18, 2.33e-16 * 5.19e18 / 1e9),
    (1.10e19, 3.64e-17 * 1.10e19 / 1e9),
    (3.55e19, 4.45e-18 * 3.55e19 / 1e9),
    (1.11e20, 9.22e-19 * 1.11e20 / 1e9),
    (4.18e20, 2.97e-19 * 4.18e20 / 1e9),
    (9.70e20, 1.62e-19 * 9.70e20 / 1e9),
];

fn anita_i_iii(bins_per_decade: f64) -> Result<Series, DatasetError> {
    let raw = RawTable::from_columns(
        "ANITA I - III",
        vec![
            ANITA.iter().map(|r| r.0).collect(),
            ANITA.iter().map(|r| r.1).collect(),
        ],
    )?;
    let mut t = to_base_units(
        raw,
        &[
            UnitOp::Scale(0, EV),
            UnitOp::Scale(1, GEV_PER_CM2_S_SR),
        ],
    )?;
    // Half-decade binning in the publication.
    apply_decade_correction(&mut t, &[1], bins_per_decade, true)?;
    Series::new(
        "ANITA I - III",
        t.column(0)?.to_vec(),
        t.column(1)?.to_vec(),
    )
}

// ---------------------------------------------------------------------------
// Auger – 9 years, all flavor
// ---------------------------------------------------------------------------

/// Rows: log10(E/eV), E²Φ [GeV cm⁻² s⁻¹ sr⁻¹], half-decade bins.
const AUGER: [(f64, f64); 8] = [
    (16.7523809524, 4.462265901e-07),
    (17.2523809524, 1.103901153e-07),
    (17.7523809524, 6.487559078e-08),
    (18.2380952381, 7.739545498e-08),
    (18.7523809524, 1.387743075e-07),
    (19.2571428571, 3.083827665e-07),
    (19.7523809524, 7.467202523e-07),
    (20.2476190476, 1.998499395e-06),
];

fn auger(bins_per_decade: f64) -> Result<Series, DatasetError> {
    let raw = RawTable::from_columns(
        "Auger",
        vec![
            AUGER.iter().map(|r| r.0).collect(),
            AUGER.iter().map(|r| r.1).collect(),
        ],
    )?;
    let mut t = to_base_units(
        raw,
        &[
            UnitOp::PowTen(0),
            UnitOp::Scale(0, EV),
            UnitOp::Scale(1, GEV_PER_CM2_S_SR),
        ],
    )?;
    apply_decade_correction(&mut t, &[1], bins_per_decade, true)?;
    Series::new("Auger", t.column(0)?.to_vec(), t.column(1)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BPD: f64 = 2.0;

    #[test]
    fn builds_all_entries() {
        let reg = Registry::published(BPD).unwrap();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(
            names,
            [
                "anita_i_iii",
                "auger",
                "grand_10k",
                "grand_200k",
                "ice_cube_ehe",
                "ice_cube_hese",
                "radar"
            ]
        );
    }

    #[test]
    fn auger_first_row_reference_value() {
        let reg = Registry::published(BPD).unwrap();
        let auger = reg.limit("auger").unwrap();
        assert_relative_eq!(
            auger.energy[0],
            10f64.powf(16.7523809524) * EV,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            auger.value[0],
            4.462265901e-07 * GEV_PER_CM2_S_SR / 2.0 * BPD,
            max_relative = 1e-12
        );
    }

    #[test]
    fn hese_upper_limit_flags_match_source_zeros() {
        let reg = Registry::published(BPD).unwrap();
        let Some(Published::Measurement(hese)) = reg.get("ice_cube_hese") else {
            panic!("hese entry missing");
        };
        let flagged: Vec<usize> = hese
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_upper_limit())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(flagged, [3, 6, 7, 8, 9]);
    }

    #[test]
    fn hese_flavor_sum_applied_to_flux_and_errors() {
        let reg = Registry::published(BPD).unwrap();
        let Some(Published::Measurement(hese)) = reg.get("ice_cube_hese") else {
            panic!("hese entry missing");
        };
        let p = &hese.points[0];
        assert_relative_eq!(
            p.e2_flux,
            2.248e-08 * 3.0 * GEV_PER_CM2_S_SR,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            p.err_down,
            9.96e-9 * 3.0 * GEV_PER_CM2_S_SR,
            max_relative = 1e-12
        );
        match p.err_up {
            UpperError::Bar(b) => {
                assert_relative_eq!(b, 1.123e-8 * 3.0 * GEV_PER_CM2_S_SR, max_relative = 1e-12)
            }
            UpperError::UpperLimit => panic!("first point is a detection"),
        }
    }

    #[test]
    fn grand_corrections_differ_per_configuration() {
        let reg = Registry::published(BPD).unwrap();
        // 10k carries the bins-per-decade correction, 200k ships corrected.
        let g10 = reg.limit("grand_10k").unwrap();
        let g200 = reg.limit("grand_200k").unwrap();
        assert_relative_eq!(
            g10.value[0],
            8.41513361e-08 * GEV_PER_CM2_S_SR * BPD,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            g200.value[0],
            4.26219753e-09 * GEV_PER_CM2_S_SR,
            max_relative = 1e-12
        );
    }

    #[test]
    fn ice_cube_ehe_log_inversion() {
        let reg = Registry::published(BPD).unwrap();
        let ehe = reg.limit("ice_cube_ehe").unwrap();
        assert_relative_eq!(
            ehe.energy[0],
            10f64.powf(6.199999125) * GEV,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            ehe.value[0],
            10f64.powf(-7.698484687) * GEV_PER_CM2_S_SR * BPD,
            max_relative = 1e-12
        );
    }

    #[test]
    fn radar_is_a_band_in_ev_energies() {
        let reg = Registry::published(BPD).unwrap();
        let Some(Published::Band(radar)) = reg.get("radar") else {
            panic!("radar entry missing");
        };
        assert_relative_eq!(radar.energy[0], 10f64.powf(15.25) * EV, max_relative = 1e-12);
        assert!(radar.lo.iter().zip(radar.hi.iter()).all(|(l, h)| l <= h));
    }
}
