use eframe::egui;

use crate::color::SeriesColors;
use crate::figure::Figure;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Hosts the assembled figure. All computation happened at startup; the
/// app only draws (egui_plot's own zoom/pan remains available).
pub struct FluxViewApp {
    figure: Figure,
    colors: SeriesColors,
}

impl FluxViewApp {
    pub fn new(figure: Figure) -> Self {
        let colors = SeriesColors::new(figure.elements.iter().map(|e| e.label()));
        Self { figure, colors }
    }
}

impl eframe::App for FluxViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: status line ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui: &mut egui::Ui| {
                ui.label(format!("{} overlays", self.figure.elements.len()));
                ui.separator();
                ui.label(&self.figure.y_label);
            });
        });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::flux_figure(ui, &self.figure, &self.colors);
        });
    }
}
