//! Declarative figure configuration and pure figure assembly.
//!
//! `assemble` turns normalized datasets, model curves and computed limit
//! curves into a list of drawable elements in display units. It performs
//! no I/O and no computation beyond division to display units; which
//! overlays appear is controlled entirely by [`FigureConfig`].

use serde::{Deserialize, Serialize};

use crate::data::model::{BandSeries, Series, UpperError};
use crate::data::models::{
    ModelTables, ice_cube_hese_fit_line, ice_cube_hese_range, ice_cube_mu_fit_line,
    ice_cube_mu_range,
};
use crate::data::registry::{Published, Registry};
use crate::sensitivity::{ExposureConfig, SensitivityError, limit_band, limit_e2_flux};
use crate::units::{GEV, GEV_PER_CM2_S_SR, YEAR};

// ---------------------------------------------------------------------------
// Display units
// ---------------------------------------------------------------------------

/// Units the figure is drawn in: base-unit values are divided by these
/// factors exactly once, during assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayUnits {
    pub energy: f64,
    pub flux: f64,
    pub energy_label: String,
    pub flux_label: String,
}

impl Default for DisplayUnits {
    fn default() -> Self {
        DisplayUnits {
            energy: GEV,
            flux: GEV_PER_CM2_S_SR,
            energy_label: "Neutrino Energy [GeV]".to_string(),
            flux_label: "E²Φ [GeV cm⁻² s⁻¹ sr⁻¹]".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// FigureConfig – which overlays render
// ---------------------------------------------------------------------------

/// Declarative overlay toggles, loadable from `data/figure.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub show_ice_cube_ehe: bool,
    pub show_ice_cube_hese: bool,
    pub show_ice_cube_mu: bool,
    pub show_anita: bool,
    pub show_auger: bool,
    pub show_uhecr_best_fit: bool,
    pub show_uhecr_evolution: bool,
    pub show_proton_band: bool,
    pub show_proton_reasonable: bool,
    pub show_grand_10k: bool,
    pub show_grand_200k: bool,
    pub show_radar: bool,
    /// Differential-flux binning convention shared by the registry
    /// corrections and the sensitivity computation.
    pub bins_per_decade: f64,
    pub display: DisplayUnits,
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            show_ice_cube_ehe: true,
            show_ice_cube_hese: true,
            show_ice_cube_mu: true,
            show_anita: true,
            show_auger: true,
            show_uhecr_best_fit: true,
            show_uhecr_evolution: true,
            show_proton_band: true,
            show_proton_reasonable: true,
            show_grand_10k: true,
            show_grand_200k: true,
            show_radar: false,
            bins_per_decade: 2.0,
            display: DisplayUnits::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DetectorSpec – a projected detector configuration
// ---------------------------------------------------------------------------

/// Effective-volume curve plus exposure of a planned detector; the figure
/// shows its computed sensitivity.
#[derive(Debug, Clone)]
pub struct DetectorSpec {
    pub label: String,
    /// Sample energies, base units, strictly increasing.
    pub energy: Vec<f64>,
    /// Effective volume times solid angle per station [m³ sr], matching
    /// `energy` element-wise.
    pub veff_sr: Vec<f64>,
    /// Optional second volume estimate; when present the figure shows a
    /// sensitivity band between the two curves instead of a single line.
    pub veff_sr_alt: Option<Vec<f64>>,
    pub stations: f64,
    pub livetime: f64,
}

impl DetectorSpec {
    fn legend_label(&self) -> String {
        format!(
            "{}: {} stations, {} years",
            self.label,
            self.stations,
            (self.livetime / YEAR).round() as i64
        )
    }

    fn exposure(&self, bins_per_decade: f64) -> ExposureConfig {
        ExposureConfig {
            livetime: self.livetime,
            signal_eff: self.stations,
            bins_per_decade,
            ..ExposureConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Figure elements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

/// One measured point in display units; `err_up == None` marks a one-sided
/// upper limit drawn with a downward arrow instead of a bar.
#[derive(Debug, Clone, Copy)]
pub struct MeasuredPoint {
    pub x: f64,
    pub y: f64,
    pub err_down: f64,
    pub err_up: Option<f64>,
}

/// A drawable figure element, coordinates in display units.
#[derive(Debug, Clone)]
pub enum Element {
    Line {
        label: String,
        points: Vec<[f64; 2]>,
        style: LineStyle,
        /// Emphasized width for computed sensitivity curves.
        strong: bool,
    },
    Band {
        label: String,
        energy: Vec<f64>,
        lo: Vec<f64>,
        hi: Vec<f64>,
    },
    Points {
        label: String,
        points: Vec<MeasuredPoint>,
    },
}

impl Element {
    pub fn label(&self) -> &str {
        match self {
            Element::Line { label, .. } => label,
            Element::Band { label, .. } => label,
            Element::Points { label, .. } => label,
        }
    }
}

/// The assembled figure: elements in draw order plus axis metadata, all in
/// display units.
#[derive(Debug, Clone)]
pub struct Figure {
    pub elements: Vec<Element>,
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Axis ranges in base units (the conventional window of this comparison).
const X_RANGE: (f64, f64) = (1e5 * GEV, 1e11 * GEV);
const Y_RANGE: (f64, f64) = (1e-11 * GEV_PER_CM2_S_SR, 2e-6 * GEV_PER_CM2_S_SR);

/// Build the figure: model bands first (background), published results on
/// top of them, computed detector sensitivities last.
pub fn assemble(
    registry: &Registry,
    models: &ModelTables,
    detectors: &[DetectorSpec],
    config: &FigureConfig,
) -> Result<Figure, SensitivityError> {
    let d = &config.display;
    let mut elements = Vec::new();

    // ---- Theoretical models ----
    if config.show_uhecr_evolution {
        elements.push(band_element(&models.uhecr_evolution, d));
    }
    if config.show_proton_band {
        elements.push(band_element(&models.proton_band, d));
    }
    if config.show_uhecr_best_fit {
        elements.push(line_element(&models.uhecr_best_fit, LineStyle::DashDot, d));
    }
    if config.show_proton_reasonable {
        elements.push(line_element(&models.proton_reasonable, LineStyle::Dotted, d));
    }

    // ---- Published experiments ----
    if config.show_grand_10k {
        push_published(&mut elements, registry, "grand_10k", LineStyle::Dashed, d);
    }
    if config.show_grand_200k {
        push_published(&mut elements, registry, "grand_200k", LineStyle::Dashed, d);
    }
    if config.show_radar {
        push_published(&mut elements, registry, "radar", LineStyle::Solid, d);
    }
    if config.show_ice_cube_ehe {
        push_published(&mut elements, registry, "ice_cube_ehe", LineStyle::Solid, d);
    }
    if config.show_ice_cube_hese {
        push_published(&mut elements, registry, "ice_cube_hese", LineStyle::Solid, d);
        elements.push(band_element(&ice_cube_hese_range(), d));
        elements.push(line_element(&ice_cube_hese_fit_line(), LineStyle::Solid, d));
    }
    if config.show_ice_cube_mu {
        elements.push(band_element(&ice_cube_mu_range(), d));
        elements.push(line_element(&ice_cube_mu_fit_line(), LineStyle::Solid, d));
    }
    if config.show_anita {
        push_published(&mut elements, registry, "anita_i_iii", LineStyle::Solid, d);
    }
    if config.show_auger {
        push_published(&mut elements, registry, "auger", LineStyle::Solid, d);
    }

    // ---- Computed detector sensitivities ----
    for det in detectors {
        let exposure = det.exposure(config.bins_per_decade);
        match &det.veff_sr_alt {
            None => {
                let limit = limit_e2_flux(&det.energy, &det.veff_sr, &exposure)?;
                elements.push(Element::Line {
                    label: det.legend_label(),
                    points: display_points(&det.energy, &limit, d),
                    style: LineStyle::Solid,
                    strong: true,
                });
            }
            Some(alt) => {
                let (first, second) = limit_band(&det.energy, &det.veff_sr, alt, &exposure)?;
                let (lo, hi): (Vec<f64>, Vec<f64>) = first
                    .iter()
                    .zip(second.iter())
                    .map(|(&a, &b)| (a.min(b) / d.flux, a.max(b) / d.flux))
                    .unzip();
                elements.push(Element::Band {
                    label: det.legend_label(),
                    energy: det.energy.iter().map(|&e| e / d.energy).collect(),
                    lo,
                    hi,
                });
            }
        }
    }

    Ok(Figure {
        elements,
        x_label: d.energy_label.clone(),
        y_label: d.flux_label.clone(),
        x_range: (X_RANGE.0 / d.energy, X_RANGE.1 / d.energy),
        y_range: (Y_RANGE.0 / d.flux, Y_RANGE.1 / d.flux),
    })
}

fn push_published(
    elements: &mut Vec<Element>,
    registry: &Registry,
    key: &str,
    style: LineStyle,
    d: &DisplayUnits,
) {
    // Registry construction guarantees every key; a missing one means a
    // stale toggle and is only worth a warning, not an abort.
    let Some(entry) = registry.get(key) else {
        log::warn!("no published dataset named '{key}'");
        return;
    };
    match entry {
        Published::Limit(series) => elements.push(line_element(series, style, d)),
        Published::Band(band) => elements.push(band_element(band, d)),
        Published::Measurement(m) => {
            let points = m
                .points
                .iter()
                .map(|p| MeasuredPoint {
                    x: p.energy / d.energy,
                    y: p.e2_flux / d.flux,
                    err_down: p.err_down / d.flux,
                    err_up: match p.err_up {
                        UpperError::Bar(b) => Some(b / d.flux),
                        UpperError::UpperLimit => None,
                    },
                })
                .collect();
            elements.push(Element::Points {
                label: m.name.clone(),
                points,
            });
        }
    }
}

fn line_element(series: &Series, style: LineStyle, d: &DisplayUnits) -> Element {
    Element::Line {
        label: series.name.clone(),
        points: display_points(&series.energy, &series.value, d),
        style,
        strong: false,
    }
}

fn band_element(band: &BandSeries, d: &DisplayUnits) -> Element {
    Element::Band {
        label: band.name.clone(),
        energy: band.energy.iter().map(|&e| e / d.energy).collect(),
        lo: band.lo.iter().map(|&v| v / d.flux).collect(),
        hi: band.hi.iter().map(|&v| v / d.flux).collect(),
    }
}

/// Divide to display units, dropping non-finite samples (the zero-Veff
/// sentinel) so a curve with gaps still renders.
fn display_points(energy: &[f64], value: &[f64], d: &DisplayUnits) -> Vec<[f64; 2]> {
    energy
        .iter()
        .zip(value.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(&e, &v)| [e / d.energy, v / d.flux])
        .collect()
}
