//! SVG chart renderers
//!
//! Thin wrappers over plotters: extract the requested columns, set up a
//! cartesian chart, draw. Styling knobs are limited to what
//! [`PlotConfig`] carries; everything else uses fixed defaults.

use crate::error::{Result, TreinoError};
use crate::training::numeric_column;
use crate::visualization::{
    correlation_matrix, freedman_diaconis_bins, string_column, PlotConfig,
};
use plotters::prelude::*;
use plotters::style::{Palette, Palette99};
use polars::prelude::DataFrame;
use std::ops::Range;

fn plot_err<E: std::fmt::Display>(e: E) -> TreinoError {
    TreinoError::PlotError(e.to_string())
}

/// Axis range with a small pad; degenerate spans widen to ±1
fn padded(min: f64, max: f64) -> Range<f64> {
    if max > min {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    } else {
        (min - 1.0)..(max + 1.0)
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

/// Row indices grouped by the hue column (appearance order), or one group
/// covering everything when `hue` is `None`
fn group_indices(
    df: &DataFrame,
    hue: Option<&str>,
    n_rows: usize,
) -> Result<Vec<(String, Vec<usize>)>> {
    match hue {
        None => Ok(vec![(String::new(), (0..n_rows).collect())]),
        Some(col) => {
            let values = string_column(df, col)?;
            let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
            for (i, v) in values.iter().enumerate() {
                match groups.iter().position(|(label, _)| label == v) {
                    Some(pos) => groups[pos].1.push(i),
                    None => groups.push((v.clone(), vec![i])),
                }
            }
            Ok(groups)
        }
    }
}

/// Axis label for slot-indexed ticks: integer tick `i` gets `names[i]`,
/// everything else stays blank
fn slot_label(names: &[String], v: f64) -> String {
    let nearest = v.round();
    let i = nearest as usize;
    if (v - nearest).abs() < 1e-6 && nearest >= 0.0 && i < names.len() {
        names[i].clone()
    } else {
        String::new()
    }
}

/// Distinct category labels in appearance order
fn categories(values: &[String]) -> Vec<String> {
    let mut cats = Vec::new();
    for v in values {
        if !cats.contains(v) {
            cats.push(v.clone());
        }
    }
    cats
}

/// Line plot of `y` over `x`, one line per `hue` group. `markers` adds a
/// point at every observation.
pub fn line_plot(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
    markers: bool,
    config: &PlotConfig,
    path: &str,
) -> Result<()> {
    let xs = numeric_column(df, x)?.to_vec();
    let ys = numeric_column(df, y)?.to_vec();
    let groups = group_indices(df, hue, xs.len())?;

    let (x_min, x_max) = min_max(&xs);
    let (y_min, y_max) = min_max(&ys);

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 22));
    }
    let mut chart = builder
        .build_cartesian_2d(padded(x_min, x_max), padded(y_min, y_max))
        .map_err(plot_err)?;

    chart.configure_mesh().draw().map_err(plot_err)?;

    for (gi, (label, indices)) in groups.iter().enumerate() {
        let color = Palette99::pick(gi).to_rgba();
        let mut points: Vec<(f64, f64)> = indices.iter().map(|&i| (xs[i], ys[i])).collect();
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let series = chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(plot_err)?;
        if hue.is_some() {
            series
                .label(label.clone())
                .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 16, ly)], color));
        }
        if markers {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(px, py)| Circle::new((px, py), 3, color.filled())),
                )
                .map_err(plot_err)?;
        }
    }

    if hue.is_some() {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)
}

/// Scatter plot of `y` over `x`, colored by `hue` group
pub fn scatter_plot(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
    config: &PlotConfig,
    path: &str,
) -> Result<()> {
    let xs = numeric_column(df, x)?.to_vec();
    let ys = numeric_column(df, y)?.to_vec();
    let groups = group_indices(df, hue, xs.len())?;

    let (x_min, x_max) = min_max(&xs);
    let (y_min, y_max) = min_max(&ys);

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 22));
    }
    let mut chart = builder
        .build_cartesian_2d(padded(x_min, x_max), padded(y_min, y_max))
        .map_err(plot_err)?;

    chart.configure_mesh().draw().map_err(plot_err)?;

    for (gi, (label, indices)) in groups.iter().enumerate() {
        let color = Palette99::pick(gi).to_rgba();
        let series = chart
            .draw_series(
                indices
                    .iter()
                    .map(|&i| Circle::new((xs[i], ys[i]), 3, color.filled())),
            )
            .map_err(plot_err)?;
        if hue.is_some() {
            series
                .label(label.clone())
                .legend(move |(lx, ly)| Circle::new((lx + 8, ly), 3, color.filled()));
        }
    }

    if hue.is_some() {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)
}

/// Bars of per-category row counts, optionally grouped by `hue`
pub fn count_plot(
    df: &DataFrame,
    x: &str,
    hue: Option<&str>,
    config: &PlotConfig,
    path: &str,
) -> Result<()> {
    let values = string_column(df, x)?;
    let cats = categories(&values);
    let groups = group_indices(df, hue, values.len())?;

    // counts[group][category]
    let counts: Vec<Vec<f64>> = groups
        .iter()
        .map(|(_, indices)| {
            cats.iter()
                .map(|cat| indices.iter().filter(|&&i| &values[i] == cat).count() as f64)
                .collect()
        })
        .collect();

    let max_count = counts
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &v| acc.max(v))
        .max(1.0);

    draw_grouped_bars(
        &cats, &groups, &counts, max_count, hue.is_some(), config, path,
    )
}

/// Bars of the mean of `y` per category of `x`, optionally grouped by `hue`
pub fn bar_plot(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
    config: &PlotConfig,
    path: &str,
) -> Result<()> {
    let values = string_column(df, x)?;
    let ys = numeric_column(df, y)?.to_vec();
    let cats = categories(&values);
    let groups = group_indices(df, hue, values.len())?;

    let means: Vec<Vec<f64>> = groups
        .iter()
        .map(|(_, indices)| {
            cats.iter()
                .map(|cat| {
                    let members: Vec<f64> = indices
                        .iter()
                        .filter(|&&i| &values[i] == cat)
                        .map(|&i| ys[i])
                        .collect();
                    if members.is_empty() {
                        0.0
                    } else {
                        members.iter().sum::<f64>() / members.len() as f64
                    }
                })
                .collect()
        })
        .collect();

    let max_mean = means
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &v| acc.max(v))
        .max(1.0);

    draw_grouped_bars(&cats, &groups, &means, max_mean, hue.is_some(), config, path)
}

/// Shared renderer for count/bar plots: categories on x, one bar per group
/// inside each category slot
fn draw_grouped_bars(
    cats: &[String],
    groups: &[(String, Vec<usize>)],
    heights: &[Vec<f64>],
    y_max: f64,
    with_legend: bool,
    config: &PlotConfig,
    path: &str,
) -> Result<()> {
    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 22));
    }

    let cats_owned: Vec<String> = cats.to_vec();
    let mut chart = builder
        .build_cartesian_2d(0.0..cats.len() as f64, 0.0..y_max * 1.1)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(cats.len() + 1)
        .x_label_formatter(&move |v: &f64| slot_label(&cats_owned, *v))
        .draw()
        .map_err(plot_err)?;

    let n_groups = groups.len().max(1);
    let bar_width = 0.8 / n_groups as f64;

    for (gi, (label, _)) in groups.iter().enumerate() {
        let color = Palette99::pick(gi).to_rgba();
        let series = chart
            .draw_series(heights[gi].iter().enumerate().map(|(ci, &h)| {
                let x0 = ci as f64 + 0.1 + gi as f64 * bar_width;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, h)], color.filled())
            }))
            .map_err(plot_err)?;
        if with_legend {
            series.label(label.clone()).legend(move |(lx, ly)| {
                Rectangle::new([(lx, ly - 4), (lx + 10, ly + 4)], color.filled())
            });
        }
    }

    if with_legend {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)
}

/// Histogram of one numeric column, bin count chosen by the
/// Freedman–Diaconis rule
pub fn hist_plot(df: &DataFrame, column: &str, config: &PlotConfig, path: &str) -> Result<()> {
    let values = numeric_column(df, column)?.to_vec();
    let bins = freedman_diaconis_bins(df, column)?;

    let (min, max) = min_max(&values);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0.0_f64; bins];
    for &v in &values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1.0;
    }
    let max_count = counts.iter().fold(1.0_f64, |acc, &c| acc.max(c));

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 22));
    }
    let mut chart = builder
        .build_cartesian_2d(padded(min, max), 0.0..max_count * 1.1)
        .map_err(plot_err)?;

    chart.configure_mesh().disable_x_mesh().draw().map_err(plot_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let lo = min + i as f64 * width;
            Rectangle::new(
                [(lo, 0.0), (lo + width, count)],
                BLUE.mix(0.6).filled().stroke_width(1),
            )
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)
}

/// Box-and-whisker plot of `y` per category of `x`
pub fn box_plot(df: &DataFrame, x: &str, y: &str, config: &PlotConfig, path: &str) -> Result<()> {
    let values = string_column(df, x)?;
    let ys = numeric_column(df, y)?.to_vec();
    let cats = categories(&values);

    // Per-category five-number summaries
    struct BoxStats {
        q1: f64,
        median: f64,
        q3: f64,
        whisker_lo: f64,
        whisker_hi: f64,
    }

    let stats: Vec<BoxStats> = cats
        .iter()
        .map(|cat| {
            let mut members: Vec<f64> = values
                .iter()
                .zip(ys.iter())
                .filter(|(v, _)| *v == cat)
                .map(|(_, &yv)| yv)
                .collect();
            members.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let q1 = super::quantile(&members, 0.25);
            let median = super::quantile(&members, 0.5);
            let q3 = super::quantile(&members, 0.75);
            let iqr = q3 - q1;
            let lo_fence = q1 - 1.5 * iqr;
            let hi_fence = q3 + 1.5 * iqr;
            let whisker_lo = members
                .iter()
                .copied()
                .find(|&v| v >= lo_fence)
                .unwrap_or(q1);
            let whisker_hi = members
                .iter()
                .rev()
                .copied()
                .find(|&v| v <= hi_fence)
                .unwrap_or(q3);

            BoxStats {
                q1,
                median,
                q3,
                whisker_lo,
                whisker_hi,
            }
        })
        .collect();

    let (y_min, y_max) = min_max(&ys);

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 22));
    }

    let cats_owned: Vec<String> = cats.clone();
    let mut chart = builder
        .build_cartesian_2d(0.0..cats.len() as f64, padded(y_min, y_max))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(cats.len() + 1)
        .x_label_formatter(&move |v: &f64| slot_label(&cats_owned, *v))
        .draw()
        .map_err(plot_err)?;

    for (ci, s) in stats.iter().enumerate() {
        let center = ci as f64 + 0.5;
        let left = ci as f64 + 0.25;
        let right = ci as f64 + 0.75;

        // box
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(left, s.q1), (right, s.q3)],
                BLUE.mix(0.3).filled().stroke_width(1),
            )))
            .map_err(plot_err)?;
        // median line
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(left, s.median), (right, s.median)],
                BLACK.stroke_width(2),
            )))
            .map_err(plot_err)?;
        // whiskers and caps
        for (from, to) in [(s.whisker_lo, s.q1), (s.q3, s.whisker_hi)] {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(center, from), (center, to)],
                    BLACK.stroke_width(1),
                )))
                .map_err(plot_err)?;
        }
        for w in [s.whisker_lo, s.whisker_hi] {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(center - 0.1, w), (center + 0.1, w)],
                    BLACK.stroke_width(1),
                )))
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)
}

/// Annotated heatmap of the Pearson correlation matrix over numeric columns
pub fn heatmap(df: &DataFrame, config: &PlotConfig, path: &str) -> Result<()> {
    let (names, matrix) = correlation_matrix(df)?;
    let n = names.len();

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(60).y_label_area_size(80);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 22));
    }

    let x_names = names.clone();
    // rows are drawn top-down, so the y axis reads the names in reverse
    let y_names: Vec<String> = names.iter().rev().cloned().collect();
    let mut chart = builder
        .build_cartesian_2d(0.0..n as f64, 0.0..n as f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n + 1)
        .y_labels(n + 1)
        .x_label_formatter(&move |v: &f64| slot_label(&x_names, *v))
        .y_label_formatter(&move |v: &f64| slot_label(&y_names, *v))
        .draw()
        .map_err(plot_err)?;

    for i in 0..n {
        for j in 0..n {
            let r = matrix[[i, j]];
            let row = (n - 1 - i) as f64;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(j as f64, row), (j as f64 + 1.0, row + 1.0)],
                    corr_color(r).filled(),
                )))
                .map_err(plot_err)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{r:.2}"),
                    (j as f64 + 0.35, row + 0.45),
                    ("sans-serif", 14).into_font().color(&BLACK),
                )))
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)
}

/// Diverging blue–white–red scale over [-1, 1]
fn corr_color(r: f64) -> RGBColor {
    let t = ((r + 1.0) / 2.0).clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8, f: f64| (a as f64 + (b as f64 - a as f64) * f) as u8;
    if t < 0.5 {
        let f = t / 0.5;
        RGBColor(lerp(59, 255, f), lerp(76, 255, f), lerp(192, 255, f))
    } else {
        let f = (t - 0.5) / 0.5;
        RGBColor(lerp(255, 180, f), lerp(255, 4, f), lerp(255, 38, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample_frame() -> DataFrame {
        df!(
            "day" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            "sales" => &[10.0, 12.0, 9.0, 14.0, 20.0, 18.0, 25.0, 22.0],
            "store" => &["a", "a", "a", "a", "b", "b", "b", "b"],
        )
        .unwrap()
    }

    fn render_and_check<F: FnOnce(&str) -> crate::error::Result<()>>(name: &str, f: F) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let path = path.to_str().unwrap().to_string();
        f(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"), "no svg output in {name}");
    }

    #[test]
    fn test_line_plot_renders() {
        let df = sample_frame();
        let config = PlotConfig::new().with_title("sales over time");
        render_and_check("line.svg", |p| {
            line_plot(&df, "day", "sales", Some("store"), false, &config, p)
        });
    }

    #[test]
    fn test_line_plot_with_markers() {
        let df = sample_frame();
        render_and_check("line_markers.svg", |p| {
            line_plot(&df, "day", "sales", None, true, &PlotConfig::default(), p)
        });
    }

    #[test]
    fn test_scatter_plot_renders() {
        let df = sample_frame();
        render_and_check("scatter.svg", |p| {
            scatter_plot(&df, "day", "sales", None, &PlotConfig::default(), p)
        });
    }

    #[test]
    fn test_count_plot_renders() {
        let df = sample_frame();
        render_and_check("count.svg", |p| {
            count_plot(&df, "store", None, &PlotConfig::default(), p)
        });
    }

    #[test]
    fn test_bar_plot_renders() {
        let df = sample_frame();
        render_and_check("bar.svg", |p| {
            bar_plot(&df, "store", "sales", None, &PlotConfig::default(), p)
        });
    }

    #[test]
    fn test_hist_plot_renders() {
        let df = sample_frame();
        render_and_check("hist.svg", |p| {
            hist_plot(&df, "sales", &PlotConfig::default(), p)
        });
    }

    #[test]
    fn test_box_plot_renders() {
        let df = sample_frame();
        render_and_check("box.svg", |p| {
            box_plot(&df, "store", "sales", &PlotConfig::default(), p)
        });
    }

    #[test]
    fn test_heatmap_renders() {
        let df = sample_frame();
        render_and_check("heatmap.svg", |p| heatmap(&df, &PlotConfig::default(), p));
    }

    fn rendered_svg<F: FnOnce(&str) -> crate::error::Result<()>>(name: &str, f: F) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let path = path.to_str().unwrap().to_string();
        f(&path).unwrap();
        std::fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn test_count_plot_labels_categories_on_axis() {
        let df = df!(
            "kind" => &["alpha", "alpha", "beta", "alpha", "beta"],
        )
        .unwrap();
        let svg = rendered_svg("count_labels.svg", |p| {
            count_plot(&df, "kind", None, &PlotConfig::default(), p)
        });
        assert!(svg.contains("alpha"), "category label missing from axis");
        assert!(svg.contains("beta"), "category label missing from axis");
    }

    #[test]
    fn test_box_plot_labels_categories_on_axis() {
        let df = df!(
            "kind" => &["alpha", "alpha", "beta", "beta"],
            "value" => &[1.0, 2.0, 5.0, 6.0],
        )
        .unwrap();
        let svg = rendered_svg("box_labels.svg", |p| {
            box_plot(&df, "kind", "value", &PlotConfig::default(), p)
        });
        assert!(svg.contains("alpha"), "category label missing from axis");
        assert!(svg.contains("beta"), "category label missing from axis");
    }

    #[test]
    fn test_heatmap_labels_columns_on_both_axes() {
        let df = sample_frame();
        let svg = rendered_svg("heatmap_labels.svg", |p| {
            heatmap(&df, &PlotConfig::default(), p)
        });
        // numeric columns of the fixture appear as axis labels
        assert!(svg.contains("day"), "column label missing from axis");
        assert!(svg.contains("sales"), "column label missing from axis");
    }

    #[test]
    fn test_unknown_column_fails() {
        let df = sample_frame();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.svg");
        let result = line_plot(
            &df,
            "missing",
            "sales",
            None,
            false,
            &PlotConfig::default(),
            path.to_str().unwrap(),
        );
        assert!(matches!(result, Err(TreinoError::FeatureNotFound(_))));
    }
}
