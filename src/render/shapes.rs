//! SVG path data for marker shapes

use crate::encode::Marker;

/// Path data for `marker` centered at (`cx`, `cy`) with outer size `size` px
pub fn marker_path(marker: Marker, cx: f64, cy: f64, size: f64) -> String {
    let r = size / 2.0;
    match marker {
        Marker::Circle => format!(
            "M{:.2},{:.2} a{r:.2},{r:.2} 0 1,0 {d:.2},0 a{r:.2},{r:.2} 0 1,0 -{d:.2},0 Z",
            cx - r,
            cy,
            r = r,
            d = 2.0 * r
        ),
        Marker::Square => polygon(&[(cx - r, cy - r), (cx + r, cy - r), (cx + r, cy + r), (cx - r, cy + r)]),
        Marker::Triangle => polygon(&[(cx, cy - r), (cx + r, cy + r), (cx - r, cy + r)]),
        Marker::InvertedTriangle => polygon(&[(cx, cy + r), (cx + r, cy - r), (cx - r, cy - r)]),
        Marker::Diamond => polygon(&[(cx, cy - r), (cx + r, cy), (cx, cy + r), (cx - r, cy)]),
        Marker::Hex => {
            let pts: Vec<(f64, f64)> = (0..6)
                .map(|i| {
                    let a = std::f64::consts::PI / 3.0 * i as f64;
                    (cx + r * a.cos(), cy + r * a.sin())
                })
                .collect();
            polygon(&pts)
        }
        Marker::Star => {
            let pts: Vec<(f64, f64)> = (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { r } else { r * 0.45 };
                    let a = std::f64::consts::PI / 5.0 * i as f64 - std::f64::consts::FRAC_PI_2;
                    (cx + radius * a.cos(), cy + radius * a.sin())
                })
                .collect();
            polygon(&pts)
        }
        Marker::Cross => segments(&[((cx - r, cy), (cx + r, cy)), ((cx, cy - r), (cx, cy + r))]),
        Marker::X => segments(&[
            ((cx - r, cy - r), (cx + r, cy + r)),
            ((cx - r, cy + r), (cx + r, cy - r)),
        ]),
        Marker::Asterisk => {
            let d = r * std::f64::consts::FRAC_1_SQRT_2;
            segments(&[
                ((cx - r, cy), (cx + r, cy)),
                ((cx, cy - r), (cx, cy + r)),
                ((cx - d, cy - d), (cx + d, cy + d)),
                ((cx - d, cy + d), (cx + d, cy - d)),
            ])
        }
    }
}

fn polygon(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{}{:.2},{:.2} ", cmd, x, y));
    }
    d.push('Z');
    d
}

fn segments(lines: &[((f64, f64), (f64, f64))]) -> String {
    lines
        .iter()
        .map(|((x1, y1), (x2, y2))| format!("M{:.2},{:.2} L{:.2},{:.2}", x1, y1, x2, y2))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_marker_has_path() {
        for marker in Marker::PALETTE {
            let d = marker_path(marker, 10.0, 10.0, 8.0);
            assert!(d.starts_with('M'), "{} path: {}", marker, d);
        }
    }

    #[test]
    fn test_square_path() {
        assert_eq!(
            marker_path(Marker::Square, 10.0, 10.0, 4.0),
            "M8.00,8.00 L12.00,8.00 L12.00,12.00 L8.00,12.00 Z"
        );
    }
}
