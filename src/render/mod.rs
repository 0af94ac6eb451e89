//! HTML scatter plot renderer
//!
//! Produces one self-contained HTML document (inline SVG, CSS and a small
//! script) from encoded records:
//! - each record is drawn with its category color and cluster marker
//! - hovering a point shows the configured hover fields
//! - clicking a category in the legend toggles that category's points
//! - cluster centroids are drawn as larger black squares

pub mod shapes;

use crate::analysis::Centroid;
use crate::encode::{Marker, VisualRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const MARGIN: f64 = 50.0;
const PADDING_FRACTION: f64 = 0.05;
const TICKS: usize = 5;
const CENTROID_COLOR: &str = "#000000";
const LEGEND_MARKER_COLOR: &str = "#555555";

/// Corner of the plot area holding the legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLocation {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl LegendLocation {
    fn css_class(&self) -> &'static str {
        match self {
            LegendLocation::TopLeft => "top_left",
            LegendLocation::TopRight => "top_right",
            LegendLocation::BottomLeft => "bottom_left",
            LegendLocation::BottomRight => "bottom_right",
        }
    }
}

/// Field shown in the hover tooltip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverField {
    Graph,
    Category,
    Cluster,
    X,
    Y,
}

impl HoverField {
    fn format(&self, record: &VisualRecord) -> String {
        match self {
            HoverField::Graph => format!("Graph: {}", record.graph_id),
            HoverField::Category => format!("Category: {}", record.category),
            HoverField::Cluster => format!("Cluster: {}", record.cluster_label),
            HoverField::X => format!("x: {:.3}", record.x),
            HoverField::Y => format!("y: {:.3}", record.y),
        }
    }
}

/// Plot appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub point_size: f64,
    pub centroid_size: f64,
    pub legend_location: LegendLocation,
    pub hover_fields: Vec<HoverField>,
    pub show_centroids: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: "t-Distributed Stochastic Neighbor Embedding".to_string(),
            width: 1000,
            height: 800,
            point_size: 8.0,
            centroid_size: 12.0,
            legend_location: LegendLocation::TopLeft,
            hover_fields: vec![HoverField::Graph, HoverField::Category, HoverField::Cluster],
            show_centroids: true,
        }
    }
}

/// Linear map from data coordinates to SVG pixels (y axis pointing up)
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn fit(coords: impl Iterator<Item = (f64, f64)>, width: f64, height: f64) -> Self {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, y) in coords {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !x_min.is_finite() {
            (x_min, x_max, y_min, y_max) = (-1.0, 1.0, -1.0, 1.0);
        }
        let (x_min, x_max) = padded(x_min, x_max);
        let (y_min, y_max) = padded(y_min, y_max);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            width,
            height,
        }
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN + (x - self.x_min) / (self.x_max - self.x_min) * (self.width - 2.0 * MARGIN)
    }

    fn py(&self, y: f64) -> f64 {
        self.height - MARGIN - (y - self.y_min) / (self.y_max - self.y_min) * (self.height - 2.0 * MARGIN)
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    let range = max - min;
    if range <= 0.0 {
        (min - 1.0, max + 1.0)
    } else {
        (min - range * PADDING_FRACTION, max + range * PADDING_FRACTION)
    }
}

/// Render the interactive scatter plot document
pub fn render_html(records: &[VisualRecord], centroids: &[Centroid], options: &PlotOptions) -> String {
    let width = options.width as f64;
    let height = options.height as f64;
    let shown_centroids: Vec<&Centroid> = if options.show_centroids {
        centroids.iter().filter(|c| c.size > 0).collect()
    } else {
        Vec::new()
    };
    let frame = Frame::fit(
        records
            .iter()
            .map(|r| (r.x, r.y))
            .chain(shown_centroids.iter().map(|c| (c.x, c.y))),
        width,
        height,
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&options.title)));
    html.push_str(&format!(
        "<div class=\"plot\" style=\"width:{}px;height:{}px\">\n",
        options.width, options.height
    ));
    html.push_str(&format!(
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
        w = options.width,
        h = options.height
    ));
    html.push('\n');

    push_axes(&mut html, &frame);

    html.push_str("<g class=\"points\">\n");
    for record in records {
        let d = shapes::marker_path(record.marker, frame.px(record.x), frame.py(record.y), options.point_size);
        let paint = if record.marker.is_stroked() {
            format!(r#"fill="none" stroke="{}" stroke-width="2""#, escape_html(&record.color))
        } else {
            format!(r#"fill="{}" fill-opacity="0.85""#, escape_html(&record.color))
        };
        let tip = options
            .hover_fields
            .iter()
            .map(|f| f.format(record))
            .collect::<Vec<_>>()
            .join("\n");
        html.push_str(&format!(
            r#"<path class="point" d="{}" {} data-category="{}" data-cluster="{}" data-tip="{}"/>"#,
            d,
            paint,
            escape_html(&record.category),
            record.cluster_label,
            escape_attr(&tip)
        ));
        html.push('\n');
    }
    html.push_str("</g>\n");

    if !shown_centroids.is_empty() {
        html.push_str("<g class=\"centroids\">\n");
        for centroid in &shown_centroids {
            let d = shapes::marker_path(
                Marker::Square,
                frame.px(centroid.x),
                frame.py(centroid.y),
                options.centroid_size,
            );
            let tip = format!("Centroid {}\nMembers: {}", centroid.cluster_label, centroid.size);
            html.push_str(&format!(
                r##"<path class="centroid" d="{}" fill="{}" stroke="#ffffff" stroke-width="1" data-tip="{}"/>"##,
                d,
                CENTROID_COLOR,
                escape_attr(&tip)
            ));
            html.push('\n');
        }
        html.push_str("</g>\n");
    }
    html.push_str("</svg>\n");

    push_legend(&mut html, records, !shown_centroids.is_empty(), options);

    html.push_str("<div id=\"tooltip\"></div>\n</div>\n<script>\n");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn push_axes(html: &mut String, frame: &Frame) {
    html.push_str(&format!(
        r##"<rect x="{m}" y="{m}" width="{w:.1}" height="{h:.1}" fill="none" stroke="#cccccc"/>"##,
        m = MARGIN,
        w = frame.width - 2.0 * MARGIN,
        h = frame.height - 2.0 * MARGIN
    ));
    html.push('\n');
    for i in 0..=TICKS {
        let t = i as f64 / TICKS as f64;
        let x = frame.x_min + t * (frame.x_max - frame.x_min);
        let y = frame.y_min + t * (frame.y_max - frame.y_min);
        html.push_str(&format!(
            r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="middle">{:.1}</text>"#,
            frame.px(x),
            frame.height - MARGIN + 18.0,
            x
        ));
        html.push_str(&format!(
            r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="end">{:.1}</text>"#,
            MARGIN - 6.0,
            frame.py(y) + 4.0,
            y
        ));
        html.push('\n');
    }
}

fn push_legend(html: &mut String, records: &[VisualRecord], with_centroid: bool, options: &PlotOptions) {
    html.push_str(&format!(
        "<div class=\"legend {}\">\n",
        options.legend_location.css_class()
    ));

    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.category.as_str()) {
            continue;
        }
        html.push_str(&format!(
            r#"<div class="legend-item" data-category="{cat}"><svg width="14" height="14"><circle cx="7" cy="7" r="5" fill="{color}"/></svg>{cat}</div>"#,
            cat = escape_html(&record.category),
            color = escape_html(&record.color)
        ));
        html.push('\n');
    }

    let mut clusters: Vec<(usize, Marker)> = records
        .iter()
        .map(|r| (r.cluster_label, r.marker))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    clusters.sort_unstable_by_key(|(label, _)| *label);
    for (label, marker) in clusters {
        let paint = if marker.is_stroked() {
            format!(r#"fill="none" stroke="{}" stroke-width="1.5""#, LEGEND_MARKER_COLOR)
        } else {
            format!(r#"fill="{}""#, LEGEND_MARKER_COLOR)
        };
        html.push_str(&format!(
            r#"<div class="legend-cluster"><svg width="14" height="14"><path d="{}" {}/></svg>Cluster {}</div>"#,
            shapes::marker_path(marker, 7.0, 7.0, 10.0),
            paint,
            label
        ));
        html.push('\n');
    }

    if with_centroid {
        html.push_str(&format!(
            r#"<div class="legend-cluster"><svg width="14" height="14"><path d="{}" fill="{}"/></svg>Centroid</div>"#,
            shapes::marker_path(Marker::Square, 7.0, 7.0, 12.0),
            CENTROID_COLOR
        ));
        html.push('\n');
    }
    html.push_str("</div>\n");
}

/// Escape text for HTML content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape_html(s).replace('\n', "&#10;")
}

const STYLE: &str = r##"body { font-family: Helvetica, Arial, sans-serif; margin: 20px; color: #222222; }
h1 { font-size: 25pt; font-weight: normal; margin: 0 0 12px 0; }
.plot { position: relative; }
.tick { font-size: 11px; fill: #666666; }
.point, .centroid { cursor: pointer; }
.legend { position: absolute; background: rgba(255, 255, 255, 0.9); border: 1px solid #dddddd; padding: 6px 10px; font-size: 12px; max-height: 70%; overflow-y: auto; }
.legend.top_left { top: 60px; left: 60px; }
.legend.top_right { top: 60px; right: 60px; }
.legend.bottom_left { bottom: 60px; left: 60px; }
.legend.bottom_right { bottom: 60px; right: 60px; }
.legend-item, .legend-cluster { display: flex; align-items: center; gap: 6px; line-height: 18px; }
.legend-item { cursor: pointer; user-select: none; }
.legend-item.muted { opacity: 0.35; }
#tooltip { position: absolute; display: none; pointer-events: none; white-space: pre; background: #ffffff; border: 1px solid #999999; padding: 4px 8px; font-size: 12px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.2); }
"##;

const SCRIPT: &str = r##"(function () {
  var plot = document.querySelector('.plot');
  var tip = document.getElementById('tooltip');
  document.querySelectorAll('[data-tip]').forEach(function (el) {
    el.addEventListener('mousemove', function (e) {
      var box = plot.getBoundingClientRect();
      tip.textContent = el.getAttribute('data-tip');
      tip.style.left = (e.clientX - box.left + 12) + 'px';
      tip.style.top = (e.clientY - box.top + 12) + 'px';
      tip.style.display = 'block';
    });
    el.addEventListener('mouseleave', function () {
      tip.style.display = 'none';
    });
  });
  document.querySelectorAll('.legend-item[data-category]').forEach(function (item) {
    item.addEventListener('click', function () {
      var category = item.getAttribute('data-category');
      var hidden = item.classList.toggle('muted');
      document.querySelectorAll('.point').forEach(function (p) {
        if (p.getAttribute('data-category') === category) {
          p.style.display = hidden ? 'none' : '';
        }
      });
    });
  });
})();
"##;
