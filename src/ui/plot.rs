use eframe::egui::{Stroke, Ui};
use egui_plot::{
    Arrows, GridInput, GridMark, Legend, Line, LineStyle as PlotLineStyle, Plot, PlotPoints,
    Points, Polygon,
};

use crate::color::SeriesColors;
use crate::figure::{Element, Figure, LineStyle, MeasuredPoint};

// ---------------------------------------------------------------------------
// Flux figure (central panel)
// ---------------------------------------------------------------------------

/// Length of the downward arrow drawn for one-sided upper limits, decades.
const UPPER_LIMIT_ARROW: f64 = 0.35;

/// Render the assembled figure.
///
/// egui_plot has no native log axes, so both coordinates are drawn as
/// log10 with decade grid marks and power-of-ten labels; non-positive
/// values cannot appear on a log axis and are skipped.
pub fn flux_figure(ui: &mut Ui, figure: &Figure, colors: &SeriesColors) {
    Plot::new("flux_figure")
        .legend(Legend::default())
        .x_axis_label(figure.x_label.clone())
        .y_axis_label(figure.y_label.clone())
        .x_grid_spacer(log_axis_spacer)
        .y_grid_spacer(log_axis_spacer)
        .x_axis_formatter(|gm, bounds| log_axis_formatter(gm, bounds))
        .y_axis_formatter(|gm, bounds| log_axis_formatter(gm, bounds))
        .include_x(figure.x_range.0.log10())
        .include_x(figure.x_range.1.log10())
        .include_y(figure.y_range.0.log10())
        .include_y(figure.y_range.1.log10())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for element in &figure.elements {
                let color = colors.color_for(element.label());
                match element {
                    Element::Line {
                        label,
                        points,
                        style,
                        strong,
                    } => {
                        let pts: PlotPoints = points
                            .iter()
                            .filter(|p| p[0] > 0.0 && p[1] > 0.0)
                            .map(|p| [p[0].log10(), p[1].log10()])
                            .collect();
                        plot_ui.line(
                            Line::new(pts)
                                .name(label)
                                .color(color)
                                .style(line_style(*style))
                                .width(if *strong { 3.0 } else { 1.5 }),
                        );
                    }
                    Element::Band {
                        label,
                        energy,
                        lo,
                        hi,
                    } => {
                        plot_ui.polygon(
                            Polygon::new(band_outline(energy, lo, hi))
                                .name(label)
                                .fill_color(color.gamma_multiply(0.25))
                                .stroke(Stroke::new(1.0, color)),
                        );
                    }
                    Element::Points { label, points } => {
                        let markers: PlotPoints = points
                            .iter()
                            .filter(|p| p.x > 0.0 && p.y > 0.0)
                            .map(|p| [p.x.log10(), p.y.log10()])
                            .collect();
                        plot_ui.points(
                            Points::new(markers)
                                .name(label)
                                .color(color)
                                .radius(3.0),
                        );

                        for bar in error_bar_segments(points) {
                            plot_ui.line(Line::new(bar).color(color).width(1.0));
                        }

                        let (origins, tips) = upper_limit_arrows(points);
                        if !origins.is_empty() {
                            plot_ui.arrows(Arrows::new(origins, tips).color(color));
                        }
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Log-axis helpers
// ---------------------------------------------------------------------------

/// Grid marks at decades (major) and 2..9 subdecades (minor).
fn log_axis_spacer(input: GridInput) -> Vec<GridMark> {
    let (min, max) = input.bounds;
    let mut marks = Vec::new();
    for i in min.floor() as i64..=max.ceil() as i64 {
        for j in 1..10 {
            let value = i as f64 + (j as f64).log10();
            if (min..=max).contains(&value) {
                marks.push(GridMark {
                    value,
                    step_size: if j == 1 { 1.0 } else { 0.1 },
                });
            }
        }
    }
    marks
}

/// "1e{n}" at decade marks, nothing at the minor ones.
fn log_axis_formatter(gm: GridMark, _bounds: &std::ops::RangeInclusive<f64>) -> String {
    if gm.step_size < 1.0 {
        return String::new();
    }
    format!("1e{:.0}", gm.value.round())
}

fn line_style(style: LineStyle) -> PlotLineStyle {
    match style {
        LineStyle::Solid => PlotLineStyle::Solid,
        LineStyle::Dashed => PlotLineStyle::dashed_loose(),
        LineStyle::Dotted => PlotLineStyle::dotted_loose(),
        LineStyle::DashDot => PlotLineStyle::dashed_dense(),
    }
}

/// Closed outline of a band: upper bound left to right, lower bound back.
fn band_outline(energy: &[f64], lo: &[f64], hi: &[f64]) -> Vec<[f64; 2]> {
    // The zero-Veff sentinel can leave infinite bounds in a computed band.
    let drawable =
        |e: f64, l: f64, h: f64| e > 0.0 && l > 0.0 && h > 0.0 && l.is_finite() && h.is_finite();
    let mut outline: Vec<[f64; 2]> = Vec::with_capacity(energy.len() * 2);
    for ((&e, &l), &h) in energy.iter().zip(lo.iter()).zip(hi.iter()) {
        if drawable(e, l, h) {
            outline.push([e.log10(), h.log10()]);
        }
    }
    for ((&e, &l), &h) in energy.iter().zip(lo.iter()).zip(hi.iter()).rev() {
        if drawable(e, l, h) {
            outline.push([e.log10(), l.log10()]);
        }
    }
    outline
}

/// Vertical error-bar segments in log space, one per two-sided point.
fn error_bar_segments(points: &[MeasuredPoint]) -> Vec<Vec<[f64; 2]>> {
    points
        .iter()
        .filter(|p| p.x > 0.0 && p.y > 0.0)
        .map(|p| {
            let x = p.x.log10();
            let top = match p.err_up {
                Some(up) => (p.y + up).log10(),
                None => p.y.log10(),
            };
            let bottom = if p.y > p.err_down {
                (p.y - p.err_down).log10()
            } else {
                // Bar would cross zero; clip it well below the window.
                p.y.log10() - 2.0
            };
            vec![[x, bottom], [x, top]]
        })
        .collect()
}

/// Downward arrows marking one-sided upper limits.
fn upper_limit_arrows(points: &[MeasuredPoint]) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    points
        .iter()
        .filter(|p| p.err_up.is_none() && p.x > 0.0 && p.y > 0.0)
        .map(|p| {
            let x = p.x.log10();
            let y = p.y.log10();
            ([x, y], [x, y - UPPER_LIMIT_ARROW])
        })
        .unzip()
}
