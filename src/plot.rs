//! Scatter plots rendered as standalone SVG documents

use crate::error::{Error, Result};
use crate::utils::compact_labels;
use ndarray::{ArrayView1, ArrayView2};
use std::fmt::{self, Write as _};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Black, used for centroid overlays
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Build a color from its channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

const VIRIDIS: [Color; 5] = [
    Color::rgb(0x44, 0x01, 0x54),
    Color::rgb(0x3b, 0x52, 0x8b),
    Color::rgb(0x21, 0x91, 0x8c),
    Color::rgb(0x5e, 0xc9, 0x62),
    Color::rgb(0xfd, 0xe7, 0x25),
];

/// `n` colors evenly spaced along a viridis-like ramp
pub fn palette(n: usize) -> Vec<Color> {
    match n {
        0 => Vec::new(),
        1 => vec![VIRIDIS[0]],
        _ => (0..n)
            .map(|i| {
                let pos = i as f64 / (n - 1) as f64 * (VIRIDIS.len() - 1) as f64;
                let lo = (pos.floor() as usize).min(VIRIDIS.len() - 2);
                VIRIDIS[lo].lerp(VIRIDIS[lo + 1], pos - lo as f64)
            })
            .collect(),
    }
}

/// Marker style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Marker {
    /// Solid disc
    #[default]
    Filled,
    /// Outlined circle
    Hollow,
}

/// One named group of points drawn in a single color
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Series {
    /// Legend entry
    pub name: String,
    /// `(x, y)` coordinates
    pub points: Vec<(f64, f64)>,
    /// Fill or stroke color
    pub color: Color,
    /// Marker radius in pixels
    pub radius: f64,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
    /// Marker style
    pub marker: Marker,
}

impl Series {
    /// New filled series with default size
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>, color: Color) -> Self {
        Self {
            name: name.into(),
            points,
            color,
            radius: 4.0,
            opacity: 0.85,
            marker: Marker::Filled,
        }
    }

    /// Set the marker radius
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the opacity
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the marker style
    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }
}

/// Split two columns of `data` into one series per cluster.
///
/// `names[c]` is the legend entry of cluster `c`; missing names fall back to
/// `cluster {c}`. Clusters without points produce no series.
pub fn series_by_cluster(
    data: ArrayView2<f64>,
    x_col: usize,
    y_col: usize,
    labels: ArrayView1<usize>,
    names: &[String],
) -> Result<Vec<Series>> {
    if x_col >= data.ncols() || y_col >= data.ncols() {
        return Err(Error::invalid_parameter(format!(
            "Plot columns ({x_col}, {y_col}) out of range for {} features",
            data.ncols()
        )));
    }
    if labels.len() != data.nrows() {
        return Err(Error::invalid_data("One label per plotted row is required"));
    }

    let (dense, originals) = compact_labels(labels);
    let mut groups = vec![Vec::new(); originals.len()];
    for (row, &slot) in data.rows().into_iter().zip(dense.iter()) {
        groups[slot].push((row[x_col], row[y_col]));
    }

    let colors = palette(originals.len());
    Ok(groups
        .into_iter()
        .zip(originals)
        .zip(colors)
        .map(|((points, cluster), color)| {
            let name = names
                .get(cluster)
                .cloned()
                .unwrap_or_else(|| format!("cluster {cluster}"));
            Series::new(name, points, color)
        })
        .collect())
}

/// Data range covered by a plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x
    pub x_min: f64,
    /// Largest x
    pub x_max: f64,
    /// Smallest y
    pub y_min: f64,
    /// Largest y
    pub y_max: f64,
}

impl Bounds {
    /// Widen by `fraction` of the span on every side; zero spans get a unit pad
    fn padded(self, fraction: f64) -> Bounds {
        let pad = |lo: f64, hi: f64| {
            let span = hi - lo;
            if span > 0.0 {
                (lo - span * fraction, hi + span * fraction)
            } else {
                (lo - 0.5, hi + 0.5)
            }
        };
        let (x_min, x_max) = pad(self.x_min, self.x_max);
        let (y_min, y_max) = pad(self.y_min, self.y_max);
        Bounds {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// A 2-D scatter plot with axes, grid and legend
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScatterPlot {
    /// Title above the plot area
    pub title: String,
    /// Horizontal axis caption
    pub x_label: String,
    /// Vertical axis caption
    pub y_label: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Series drawn in order, later ones on top
    pub series: Vec<Series>,
}

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 45.0;
const MARGIN_BOTTOM: f64 = 55.0;

impl ScatterPlot {
    /// Empty 800x600 plot
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            width: 800,
            height: 600,
            series: Vec::new(),
        }
    }

    /// Set the x axis caption
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    /// Set the y axis caption
    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Set the image size
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Append a series
    pub fn add_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Total number of points across all series
    pub fn n_points(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// Range of all finite points, or `None` for an empty plot
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self
            .series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite());
        let &(x0, y0) = points.next()?;
        Some(points.fold(
            Bounds {
                x_min: x0,
                x_max: x0,
                y_min: y0,
                y_max: y0,
            },
            |b, &(x, y)| Bounds {
                x_min: b.x_min.min(x),
                x_max: b.x_max.max(x),
                y_min: b.y_min.min(y),
                y_max: b.y_max.max(y),
            },
        ))
    }

    /// Render to an SVG document
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        // fmt::Write into a String only fails on allocation failure
        let _ = self.render(&mut out);
        out
    }

    /// Write the SVG document to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_svg())?;
        log::info!("wrote scatter plot to {}", path.as_ref().display());
        Ok(())
    }

    fn render(&self, out: &mut String) -> fmt::Result {
        let (w, h) = (self.width as f64, self.height as f64);
        let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let bounds = self
            .bounds()
            .unwrap_or(Bounds {
                x_min: 0.0,
                x_max: 1.0,
                y_min: 0.0,
                y_max: 1.0,
            })
            .padded(0.05);

        let sx = |x: f64| MARGIN_LEFT + (x - bounds.x_min) / (bounds.x_max - bounds.x_min) * plot_w;
        let sy = |y: f64| MARGIN_TOP + plot_h - (y - bounds.y_min) / (bounds.y_max - bounds.y_min) * plot_h;

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"#,
            self.width, self.height, self.width, self.height
        )?;
        writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="25" text-anchor="middle" font-size="16">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            escape(&self.title)
        )?;

        for tick in nice_ticks(bounds.x_min, bounds.x_max, 6) {
            let x = sx(tick);
            writeln!(
                out,
                "<line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#e0e0e0\"/>",
                MARGIN_TOP,
                MARGIN_TOP + plot_h
            )?;
            writeln!(
                out,
                r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="11">{}</text>"#,
                MARGIN_TOP + plot_h + 16.0,
                format_tick(tick)
            )?;
        }
        for tick in nice_ticks(bounds.y_min, bounds.y_max, 6) {
            let y = sy(tick);
            writeln!(
                out,
                "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e0e0e0\"/>",
                MARGIN_LEFT,
                MARGIN_LEFT + plot_w
            )?;
            writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{}</text>"#,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                format_tick(tick)
            )?;
        }

        writeln!(
            out,
            r#"<rect x="{MARGIN_LEFT:.1}" y="{MARGIN_TOP:.1}" width="{plot_w:.1}" height="{plot_h:.1}" fill="none" stroke="black"/>"#
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            h - 15.0,
            escape(&self.x_label)
        )?;
        writeln!(
            out,
            r#"<text transform="translate(18 {:.1}) rotate(-90)" text-anchor="middle" font-size="13">{}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            escape(&self.y_label)
        )?;

        for series in &self.series {
            let paint = marker_paint(series);
            writeln!(out, r#"<g opacity="{:.2}">"#, series.opacity)?;
            for &(x, y) in series.points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
                writeln!(
                    out,
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" {paint}/>"#,
                    sx(x),
                    sy(y),
                    series.radius
                )?;
            }
            writeln!(out, "</g>")?;
        }

        let legend_x = MARGIN_LEFT + plot_w + 15.0;
        for (i, series) in self.series.iter().enumerate() {
            let y = MARGIN_TOP + 12.0 + i as f64 * 20.0;
            writeln!(
                out,
                r#"<circle cx="{:.1}" cy="{y:.1}" r="5" {}/>"#,
                legend_x,
                marker_paint(series)
            )?;
            writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
                legend_x + 12.0,
                y + 4.0,
                escape(&series.name)
            )?;
        }

        writeln!(out, "</svg>")
    }
}

fn marker_paint(series: &Series) -> String {
    let color = series.color.to_hex();
    match series.marker {
        Marker::Filled => format!(r#"fill="{color}""#),
        Marker::Hollow => format!(r#"fill="none" stroke="{color}" stroke-width="2""#),
    }
}

/// Round tick positions (steps of 1, 2 or 5 times a power of ten) inside `[lo, hi]`
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) || target == 0 {
        return Vec::new();
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn format_tick(value: f64) -> String {
    if value == value.round() {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_palette() {
        assert!(palette(0).is_empty());
        let colors = palette(3);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], VIRIDIS[0]);
        assert_eq!(colors[2], VIRIDIS[4]);
        assert_eq!(Color::BLACK.to_hex(), "#000000");
    }

    #[test]
    fn test_series_by_cluster() {
        let data = arr2(&[[0.0, 1.0, 9.0], [2.0, 3.0, 9.0], [4.0, 5.0, 9.0]]);
        let labels = arr1(&[1, 0, 1]);
        let names = vec!["edible".to_string(), "poisonous".to_string()];

        let series = series_by_cluster(data.view(), 0, 1, labels.view(), &names).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "edible");
        assert_eq!(series[0].points, vec![(2.0, 3.0)]);
        assert_eq!(series[1].name, "poisonous");
        assert_eq!(series[1].points, vec![(0.0, 1.0), (4.0, 5.0)]);

        assert!(series_by_cluster(data.view(), 0, 3, labels.view(), &names).is_err());
    }

    #[test]
    fn test_series_by_cluster_skips_empty_and_unnamed() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let labels = arr1(&[0, 2]);

        let series = series_by_cluster(data.view(), 0, 1, labels.view(), &[]).unwrap();
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["cluster 0", "cluster 2"]);
    }

    #[test]
    fn test_series_by_cluster_extreme_ids() {
        let data = arr2(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        let labels = arr1(&[0, usize::MAX, usize::MAX]);
        let names = vec!["edible".to_string()];

        let series = series_by_cluster(data.view(), 0, 1, labels.view(), &names).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "edible");
        assert_eq!(series[1].name, format!("cluster {}", usize::MAX));
        assert_eq!(series[1].points, vec![(1.0, 1.0), (2.0, 2.0)]);
        assert_ne!(series[0].color, series[1].color);
    }

    #[test]
    fn test_bounds() {
        let plot = ScatterPlot::new("t")
            .add_series(Series::new("a", vec![(0.0, 5.0), (2.0, -1.0)], Color::BLACK))
            .add_series(Series::new("b", vec![(f64::NAN, 100.0)], Color::BLACK));

        let bounds = plot.bounds().unwrap();
        assert_eq!(bounds.x_min, 0.0);
        assert_eq!(bounds.x_max, 2.0);
        assert_eq!(bounds.y_min, -1.0);
        assert_eq!(bounds.y_max, 5.0);
        assert!(ScatterPlot::new("empty").bounds().is_none());
    }

    #[test]
    fn test_to_svg() {
        let plot = ScatterPlot::new("Cap <diameter> & height")
            .x_label("Cap Diameter (cm)")
            .y_label("Stem Height (cm)")
            .size(640, 480)
            .add_series(Series::new("edible", vec![(1.0, 2.0), (3.0, 4.0)], palette(2)[0]))
            .add_series(
                Series::new("centers", vec![(2.0, 3.0)], Color::BLACK)
                    .radius(8.0)
                    .opacity(0.5)
                    .marker(Marker::Hollow),
            );

        let svg = plot.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="640" height="480""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 3 + 2);
        assert!(svg.contains("Cap &lt;diameter&gt; &amp; height"));
        assert!(svg.contains("Stem Height (cm)"));
        assert!(svg.contains(r##"fill="none" stroke="#000000""##));
        assert_eq!(plot.n_points(), 3);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.0, 1.0, 4), vec![0.0, 0.5, 1.0]);
        assert!(nice_ticks(1.0, 1.0, 5).is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-1.5), "-1.5");
    }
}
