mod app;
mod color;
mod data;
mod figure;
mod sensitivity;
mod ui;
mod units;

use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui;

use app::FluxViewApp;
use data::models::ModelTables;
use data::registry::Registry;
use figure::{DetectorSpec, Figure, FigureConfig};
use units::{EV, M3_SR, YEAR};

fn main() -> eframe::Result {
    env_logger::init();

    // Any load failure aborts figure generation entirely; no partial output.
    let figure = match build_figure(Path::new("data")) {
        Ok(figure) => figure,
        Err(e) => {
            log::error!("failed to build figure: {e:#}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([700.0, 800.0])
            .with_min_inner_size([500.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "nufluxview – Neutrino Flux Sensitivities",
        options,
        Box::new(|_cc| Ok(Box::new(FluxViewApp::new(figure)))),
    )
}

/// Load configuration and static tables, then assemble the figure.
fn build_figure(data_dir: &Path) -> Result<Figure> {
    let config = load_config(&data_dir.join("figure.json"))?;
    let registry = Registry::published(config.bins_per_decade)?;
    let models = ModelTables::load(data_dir)?;
    let detectors = vec![strawman_phased_array()];

    let figure = figure::assemble(&registry, &models, &detectors, &config)?;
    log::info!(
        "assembled figure: {} published datasets, {} detector curves, {} elements",
        registry.len(),
        detectors.len(),
        figure.elements.len()
    );
    Ok(figure)
}

/// Read `figure.json` when present; a malformed file is fatal, a missing
/// one falls back to the default overlay set.
fn load_config(path: &Path) -> Result<FigureConfig> {
    if !path.exists() {
        return Ok(FigureConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Simulated single-station effective volume of the phased-array strawman
/// design, per half-decade energy bin.
fn strawman_phased_array() -> DetectorSpec {
    let energy: Vec<f64> = [
        1.00000000e+16,
        3.16227766e+16,
        1.00000000e+17,
        3.16227766e+17,
        1.00000000e+18,
        3.16227766e+18,
        1.00000000e+19,
        3.16227766e+19,
    ]
    .iter()
    .map(|&e| e * EV)
    .collect();
    let veff_sr: Vec<f64> = [
        1.82805666e+07,
        1.34497197e+08,
        6.32044851e+08,
        2.20387046e+09,
        4.86050340e+09,
        8.18585201e+09,
        1.25636305e+10,
        1.83360237e+10,
    ]
    .iter()
    .map(|&v| v * M3_SR)
    .collect();

    DetectorSpec {
        label: "Strawman + PA@15m@2s".to_string(),
        energy,
        veff_sr,
        veff_sr_alt: None,
        stations: 270.0,
        livetime: 3.0 * YEAR,
    }
}
