//! Chart rendering.
//!
//! Each chart is a named render function over the shared [`Dataset`]. A chart
//! that fails is logged and skipped; the rest still render.

use crate::config::{AnalysisConfig, ChartConfig};
use crate::distribution::{rating_distribution, runtime_distribution, GRID_SIZE};
use crate::error::InsightsError;
use crate::insights::{genre_comparison, yearly_stats};
use crate::types::Dataset;
use crate::util::format_int;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

type ChartResult = std::result::Result<(), Box<dyn std::error::Error>>;
type RenderFn = fn(&ChartContext<'_>, &Path) -> ChartResult;

/// Everything a render function may read.
pub struct ChartContext<'a> {
    pub data: &'a Dataset,
    pub analysis: &'a AnalysisConfig,
    pub chart: &'a ChartConfig,
}

pub const CHARTS: [(&str, RenderFn); 4] = [
    ("heatmap", rating_heatmap),
    ("genre_comparison", genre_comparison_chart),
    ("yearly_trends", yearly_trends_chart),
    ("runtime_analysis", runtime_chart),
];

#[derive(Debug, Default)]
pub struct ChartOutcome {
    pub written: Vec<PathBuf>,
    pub failed: Vec<InsightsError>,
}

pub fn chart_path(plots_dir: &Path, name: &str) -> PathBuf {
    plots_dir.join(format!("movie_analysis_{name}.svg"))
}

pub fn render_all(ctx: &ChartContext<'_>, plots_dir: &Path) -> ChartOutcome {
    let mut outcome = ChartOutcome::default();
    for (name, render) in CHARTS {
        let path = chart_path(plots_dir, name);
        match render(ctx, &path) {
            Ok(()) => {
                info!(chart = name, path = %path.display(), "plot saved");
                outcome.written.push(path);
            }
            Err(e) => {
                let err = InsightsError::Chart {
                    name,
                    reason: e.to_string(),
                };
                error!(chart = name, error = %err, "chart skipped");
                outcome.failed.push(err);
            }
        }
    }
    outcome
}

const FONT: &str = "sans-serif";
const CRITIC_COLOR: RGBColor = RGBColor(70, 130, 180);
const AUDIENCE_COLOR: RGBColor = RGBColor(60, 160, 90);

impl ChartConfig {
    fn title_font(&self) -> FontDesc<'static> {
        (FONT, f64::from(self.title_size) * 2.0).into_font()
    }

    fn label_font(&self) -> FontDesc<'static> {
        (FONT, f64::from(self.label_size) * 2.0).into_font()
    }

    fn tick_font(&self) -> FontDesc<'static> {
        (FONT, f64::from(self.tick_size) * 2.0).into_font()
    }

    fn annotation_font(&self) -> FontDesc<'static> {
        (FONT, f64::from(self.font_size) * 1.6).into_font()
    }
}

/// Yellow → green → blue ramp; `t` in [0, 1].
fn ramp(t: f64) -> RGBColor {
    const STOPS: [(f64, f64, f64); 3] = [
        (255.0, 255.0, 217.0),
        (65.0, 182.0, 196.0),
        (8.0, 29.0, 88.0),
    ];
    let t = t.clamp(0.0, 1.0) * 2.0;
    let i = (t.floor() as usize).min(1);
    let f = t - i as f64;
    let (a, b) = (STOPS[i], STOPS[i + 1]);
    let mix = |x: f64, y: f64| (x + (y - x) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn linear_shade(count: u64, max: u64) -> RGBColor {
    if max == 0 {
        return ramp(0.0);
    }
    ramp(count as f64 / max as f64)
}

fn log_shade(count: u64, max: u64) -> RGBColor {
    if count == 0 {
        return WHITE;
    }
    if max <= 1 {
        return ramp(1.0);
    }
    ramp((count as f64).ln() / (max as f64).ln())
}

fn rating_heatmap(ctx: &ChartContext<'_>, path: &Path) -> ChartResult {
    let grid = rating_distribution(ctx.data);
    let max = grid.max();
    let cfg = ctx.chart;

    let root = SVGBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Critics vs Audience Ratings (Total: {} movies)", format_int(grid.total())),
            cfg.title_font(),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..100f64, 0f64..100f64)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(11)
        .y_labels(11)
        .x_desc("Critics Rating (%)")
        .y_desc("Audience Rating (%)")
        .label_style(cfg.tick_font())
        .axis_desc_style(cfg.label_font())
        .draw()?;

    // Row 0 holds the highest audience band, so it is drawn at the top.
    let cells: Vec<(f64, f64, u64)> = grid
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(row, counts)| {
            counts.iter().enumerate().map(move |(col, &count)| {
                let x0 = col as f64 * 10.0;
                let y0 = (GRID_SIZE - 1 - row) as f64 * 10.0;
                (x0, y0, count)
            })
        })
        .collect();
    chart.draw_series(cells.iter().map(|&(x0, y0, count)| {
        Rectangle::new([(x0, y0), (x0 + 10.0, y0 + 10.0)], linear_shade(count, max).filled())
    }))?;
    chart.draw_series(cells.iter().map(|&(x0, y0, count)| {
        Text::new(count.to_string(), (x0 + 3.5, y0 + 6.0), cfg.annotation_font())
    }))?;

    root.present()?;
    Ok(())
}

fn genre_comparison_chart(ctx: &ChartContext<'_>, path: &Path) -> ChartResult {
    let genres = genre_comparison(
        ctx.data,
        ctx.analysis.min_movies_per_genre,
        ctx.analysis.genre_comparison_limit,
    )?;
    if genres.is_empty() {
        return Err("no genre has enough movies to compare".into());
    }
    let cfg = ctx.chart;
    let n = genres.len();
    let names: Vec<String> = genres.iter().map(|g| g.genre.clone()).collect();
    let label = |x: &f64| -> String {
        let i = x.floor();
        if i >= 0.0 && (i as usize) < names.len() && (x - i).abs() < 1e-9 {
            names[i as usize].clone()
        } else {
            String::new()
        }
    };

    let root = SVGBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Top {n} Genres by Rating"), cfg.title_font())
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..n as f64, 0f64..100f64)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&label)
        .y_desc("Average Rating (%)")
        .label_style(cfg.tick_font())
        .axis_desc_style(cfg.label_font())
        .draw()?;

    let series = [
        ("Critics", CRITIC_COLOR, 0.1, true),
        ("Audience", AUDIENCE_COLOR, 0.5, false),
    ];
    for (name, color, offset, critic) in series {
        let bars: Vec<(f64, f64, f64)> = genres
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let s = if critic { g.critic } else { g.audience };
                (i as f64 + offset, s.mean, s.std_dev / 2.0)
            })
            .collect();
        chart
            .draw_series(bars.iter().map(|&(x, mean, _)| {
                Rectangle::new([(x, 0.0), (x + 0.4, mean)], color.filled())
            }))?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        chart.draw_series(bars.iter().map(|&(x, mean, err)| {
            PathElement::new(
                vec![(x + 0.2, mean - err), (x + 0.2, mean + err)],
                BLACK.stroke_width(2),
            )
        }))?;
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .label_font(cfg.label_font())
        .draw()?;

    root.present()?;
    Ok(())
}

fn yearly_trends_chart(ctx: &ChartContext<'_>, path: &Path) -> ChartResult {
    let years = yearly_stats(ctx.data, ctx.analysis.min_movies_per_year)?;
    let (Some(first), Some(last)) = (years.first(), years.last()) else {
        return Err("no release year has enough movies to plot".into());
    };
    let cfg = ctx.chart;
    let x_range = f64::from(first.year) - 1.0..f64::from(last.year) + 1.0;
    let max_count = years.iter().map(|y| y.critic.count).max().unwrap_or(1).max(1) as f64;

    let root = SVGBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Rating Trends Over Time (with 95% CI)", cfg.title_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0f64..100f64)?;
    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .x_desc("Year")
        .y_desc("Average Rating (%)")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .label_style(cfg.tick_font())
        .axis_desc_style(cfg.label_font())
        .draw()?;

    let series = [("Critics", CRITIC_COLOR, true), ("Audience", AUDIENCE_COLOR, false)];
    for (name, color, critic) in series {
        let points: Vec<(f64, f64, f64, usize)> = years
            .iter()
            .map(|y| {
                let s = if critic { y.critic } else { y.audience };
                (f64::from(y.year), s.mean, s.ci95(), s.count)
            })
            .collect();

        let mut band: Vec<(f64, f64)> = points
            .iter()
            .map(|&(x, m, ci, _)| (x, (m + ci).min(100.0)))
            .collect();
        band.extend(points.iter().rev().map(|&(x, m, ci, _)| (x, (m - ci).max(0.0))));
        chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))?;

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|&(x, m, _, _)| (x, m)),
                color.stroke_width(2),
            ))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

        chart.draw_series(points.iter().map(|&(x, m, _, count)| {
            let radius = (count as f64 / max_count * 8.0).round() as i32 + 2;
            Circle::new((x, m), radius, color.mix(0.5).filled())
        }))?;
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .label_font(cfg.label_font())
        .draw()?;

    root.present()?;
    Ok(())
}

fn runtime_chart(ctx: &ChartContext<'_>, path: &Path) -> ChartResult {
    let dist = runtime_distribution(ctx.data, *ctx.analysis.runtime_range.end());
    let cfg = ctx.chart;
    let max = dist.max();
    let rt_lo = dist.runtime_edges[0];
    let rt_hi = dist.runtime_edges[dist.runtime_edges.len() - 1];

    let root = SVGBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 1));

    let mut upper = ChartBuilder::on(&areas[0])
        .caption("Movie Distribution by Runtime and Critics Rating", cfg.title_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(rt_lo..rt_hi, 0f64..100f64)?;
    upper
        .configure_mesh()
        .disable_mesh()
        .x_labels(dist.runtime_edges.len())
        .y_labels(11)
        .x_desc("Runtime (minutes)")
        .y_desc("Critics Rating (%)")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .label_style(cfg.tick_font())
        .axis_desc_style(cfg.label_font())
        .draw()?;
    let mut cells = Vec::new();
    for (i, counts) in dist.counts.iter().enumerate() {
        for (j, &count) in counts.iter().enumerate() {
            let (x0, x1) = (dist.runtime_edges[i], dist.runtime_edges[i + 1]);
            let (y0, y1) = (dist.rating_edges[j], dist.rating_edges[j + 1]);
            cells.push(Rectangle::new([(x0, y0), (x1, y1)], log_shade(count, max).filled()));
        }
    }
    upper.draw_series(cells)?;

    let ranges = &dist.ranges;
    let range_labels: Vec<String> = ranges
        .iter()
        .map(|r| format!("({:.0}, {:.0}]", r.lower, r.upper))
        .collect();
    let label = |x: &f64| -> String {
        let i = x.floor();
        if i >= 0.0 && (i as usize) < range_labels.len() && (x - i).abs() < 1e-9 {
            range_labels[i as usize].clone()
        } else {
            String::new()
        }
    };
    let mut lower = ChartBuilder::on(&areas[1])
        .caption("Ratings Distribution by Runtime Range", cfg.title_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..ranges.len() as f64, 0f64..100f64)?;
    lower
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(ranges.len() + 1)
        .x_label_formatter(&label)
        .x_desc("Runtime Range (minutes)")
        .y_desc("Rating (%)")
        .label_style(cfg.tick_font())
        .axis_desc_style(cfg.label_font())
        .draw()?;

    let series = [
        ("Critics Rating", CRITIC_COLOR, 0.1, true),
        ("Audience Rating", AUDIENCE_COLOR, 0.55, false),
    ];
    for (name, color, offset, critic) in series {
        let boxes: Vec<(f64, _)> = ranges
            .iter()
            .enumerate()
            .filter_map(|(i, r)| {
                let summary = if critic { r.critic } else { r.audience };
                summary.map(|s| (i as f64 + offset, s))
            })
            .collect();
        lower
            .draw_series(boxes.iter().map(|(x, s)| {
                Rectangle::new([(*x, s.q1), (x + 0.35, s.q3)], color.mix(0.6).filled())
            }))?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        lower.draw_series(boxes.iter().map(|(x, s)| {
            PathElement::new(vec![(*x, s.median), (x + 0.35, s.median)], BLACK.stroke_width(2))
        }))?;
        lower.draw_series(boxes.iter().map(|(x, s)| {
            PathElement::new(vec![(x + 0.175, s.min), (x + 0.175, s.max)], color.stroke_width(1))
        }))?;
    }
    lower
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .label_font(cfg.label_font())
        .draw()?;

    root.present()?;
    Ok(())
}
