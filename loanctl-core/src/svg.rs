//! Minimal SVG rendering for the dashboard charts.
//!
//! Output is a standalone `<svg>` document that can be inlined into HTML or
//! served as `image/svg+xml`.

use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 56.0;
const LEGEND_WIDTH: f64 = 110.0;
const Y_TICKS: usize = 5;

/// seaborn "Set2"
pub const SET2: &[&str] = &[
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// seaborn default categorical palette
pub const DEEP: &[&str] = &[
    "#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860", "#da8bc3", "#8c8c8c",
    "#ccb974", "#64b5cd",
];

/// Colour fill for a set of bars.
#[derive(Debug, Clone, Copy)]
pub enum Palette {
    Set2,
    Coolwarm,
}

impl Palette {
    fn color(self, index: usize, total: usize) -> String {
        match self {
            Self::Set2 => SET2[index % SET2.len()].to_string(),
            Self::Coolwarm => {
                let t = if total <= 1 {
                    0.5
                } else {
                    index as f64 / (total - 1) as f64
                };
                coolwarm(t)
            }
        }
    }
}

/// Diverging blue-grey-red ramp, `t` in `[0, 1]`.
pub fn coolwarm(t: f64) -> String {
    const BLUE: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const RED: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = t.clamp(0.0, 1.0);
    let (from, to, local) = if t < 0.5 {
        (BLUE, MID, t * 2.0)
    } else {
        (MID, RED, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * local).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(from.0, to.0),
        lerp(from.1, to.1),
        lerp(from.2, to.2)
    )
}

/// Bar chart with one bar per category.
#[derive(Debug, Clone)]
pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub bars: Vec<(String, f64)>,
    pub palette: Palette,
}

/// Scatter plot with one colour per series.
#[derive(Debug, Clone)]
pub struct ScatterChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// (series label, points). An empty label means no legend entry.
    pub series: Vec<(String, Vec<(f64, f64)>)>,
}

/// Escape text for use inside SVG/HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

/// Round an axis maximum up to 1, 2, 5 or 10 times a power of ten.
pub fn nice_ceil(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }
    let exp = 10f64.powf(value.log10().floor());
    let fraction = value / exp;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * exp
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Axis range anchored at zero unless data goes negative.
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut min, mut max) = (0.0f64, 0.0f64);
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    let lo = if min < 0.0 { -nice_ceil(-min) } else { 0.0 };
    (lo, nice_ceil(max))
}

struct Frame {
    plot_right: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn plot_width(&self) -> f64 {
        self.plot_right - MARGIN_LEFT
    }

    fn plot_height(&self) -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn y(&self, value: f64) -> f64 {
        let span = self.y_max - self.y_min;
        HEIGHT - MARGIN_BOTTOM - (value - self.y_min) / span * self.plot_height()
    }
}

fn open(svg: &mut String, title: &str) {
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(
        svg,
        r##"<rect width="100%" height="100%" fill="#ffffff"/><text x="{}" y="24" text-anchor="middle" font-size="15" fill="#0a66c2">{}</text>"##,
        WIDTH / 2.0,
        escape(title)
    );
}

fn axes(svg: &mut String, frame: &Frame, x_label: &str, y_label: &str) {
    let bottom = HEIGHT - MARGIN_BOTTOM;
    for i in 0..=Y_TICKS {
        let value = frame.y_min + (frame.y_max - frame.y_min) * i as f64 / Y_TICKS as f64;
        let y = frame.y(value);
        let _ = write!(
            svg,
            r##"<line x1="{l}" y1="{y:.1}" x2="{r}" y2="{y:.1}" stroke="#e5e5e5"/><text x="{tx}" y="{ty:.1}" text-anchor="end" fill="#333">{label}</text>"##,
            l = MARGIN_LEFT,
            r = frame.plot_right,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            label = format_tick(value),
        );
    }
    let _ = write!(
        svg,
        r##"<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="#333"/><line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="#333"/>"##,
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = bottom,
        r = frame.plot_right,
    );
    let _ = write!(
        svg,
        r##"<text x="{x:.1}" y="{y}" text-anchor="middle" fill="#333">{label}</text>"##,
        x = MARGIN_LEFT + frame.plot_width() / 2.0,
        y = HEIGHT - 14.0,
        label = escape(x_label),
    );
    let _ = write!(
        svg,
        r##"<text x="18" y="{y:.1}" text-anchor="middle" fill="#333" transform="rotate(-90 18 {y:.1})">{label}</text>"##,
        y = MARGIN_TOP + frame.plot_height() / 2.0,
        label = escape(y_label),
    );
}

/// Render a bar chart to an SVG document.
pub fn render_bar_chart(chart: &BarChart<'_>) -> String {
    let mut svg = String::new();
    open(&mut svg, chart.title);

    let (y_min, y_max) = axis_range(chart.bars.iter().map(|(_, v)| *v));
    let frame = Frame {
        plot_right: WIDTH - MARGIN_RIGHT,
        y_min,
        y_max,
    };
    axes(&mut svg, &frame, chart.x_label, chart.y_label);

    let n = chart.bars.len();
    if n > 0 {
        let slot = frame.plot_width() / n as f64;
        let bar_width = slot * 0.8;
        let zero = frame.y(0.0);
        for (i, (label, value)) in chart.bars.iter().enumerate() {
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
            let top = frame.y(*value);
            let (y, h) = if top < zero { (top, zero - top) } else { (zero, top - zero) };
            let _ = write!(
                svg,
                r##"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{label}: {value}</title></rect><text x="{cx:.1}" y="{ly:.1}" text-anchor="middle" fill="#333">{label}</text>"##,
                w = bar_width,
                fill = chart.palette.color(i, n),
                label = escape(label),
                value = format_tick(*value),
                cx = x + bar_width / 2.0,
                ly = HEIGHT - MARGIN_BOTTOM + 16.0,
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Render a scatter plot to an SVG document.
pub fn render_scatter(chart: &ScatterChart<'_>) -> String {
    let mut svg = String::new();
    open(&mut svg, chart.title);

    let has_legend = chart.series.iter().any(|(label, _)| !label.is_empty());
    let plot_right = WIDTH - MARGIN_RIGHT - if has_legend { LEGEND_WIDTH } else { 0.0 };

    let points = || chart.series.iter().flat_map(|(_, pts)| pts.iter());
    let (x_min, x_max) = axis_range(points().map(|(x, _)| *x));
    let (y_min, y_max) = axis_range(points().map(|(_, y)| *y));
    let frame = Frame {
        plot_right,
        y_min,
        y_max,
    };
    axes(&mut svg, &frame, chart.x_label, chart.y_label);

    for i in 0..=Y_TICKS {
        let value = x_min + (x_max - x_min) * i as f64 / Y_TICKS as f64;
        let x = MARGIN_LEFT + (value - x_min) / (x_max - x_min) * frame.plot_width();
        let _ = write!(
            svg,
            r##"<text x="{x:.1}" y="{y}" text-anchor="middle" fill="#333">{label}</text>"##,
            y = HEIGHT - MARGIN_BOTTOM + 16.0,
            label = format_tick(value),
        );
    }

    for (s, (label, pts)) in chart.series.iter().enumerate() {
        let fill = DEEP[s % DEEP.len()];
        for (px, py) in pts {
            let cx = MARGIN_LEFT + (px - x_min) / (x_max - x_min) * frame.plot_width();
            let _ = write!(
                svg,
                r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="4" fill="{fill}" fill-opacity="0.8" stroke="#ffffff" stroke-width="0.5"/>"##,
                cy = frame.y(*py),
            );
        }
        if !label.is_empty() {
            let ly = MARGIN_TOP + 10.0 + 18.0 * s as f64;
            let _ = write!(
                svg,
                r##"<circle cx="{lx:.1}" cy="{ly:.1}" r="5" fill="{fill}"/><text x="{tx:.1}" y="{ty:.1}" fill="#333">{label}</text>"##,
                lx = plot_right + 20.0,
                tx = plot_right + 30.0,
                ty = ly + 4.0,
                label = escape(label),
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_ceil_rounds_up() {
        assert_eq!(nice_ceil(0.0), 1.0);
        assert_eq!(nice_ceil(3.0), 5.0);
        assert_eq!(nice_ceil(12.0), 20.0);
        assert_eq!(nice_ceil(5849.0), 10000.0);
        assert_eq!(nice_ceil(100.0), 100.0);
    }

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(0.0), "#3b4cc0");
        assert_eq!(coolwarm(0.5), "#dddddd");
        assert_eq!(coolwarm(1.0), "#b40426");
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn bar_chart_draws_one_rect_per_bar() {
        let svg = render_bar_chart(&BarChart {
            title: "Loan Approval Distribution",
            x_label: "Loan_Status",
            y_label: "count",
            bars: vec![("Y".into(), 3.0), ("N".into(), 1.0)],
            palette: Palette::Set2,
        });
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect x=").count(), 2);
        assert!(svg.contains(SET2[0]));
        assert!(svg.contains(SET2[1]));
    }

    #[test]
    fn scatter_has_legend_per_series() {
        let svg = render_scatter(&ScatterChart {
            title: "Applicant Income vs Loan Amount",
            x_label: "ApplicantIncome",
            y_label: "LoanAmount",
            series: vec![
                ("Y".into(), vec![(5000.0, 100.0), (3000.0, 66.0)]),
                ("N".into(), vec![(4583.0, 128.0)]),
            ],
        });
        // 3 points + 2 legend markers
        assert_eq!(svg.matches("<circle").count(), 5);
        assert!(svg.contains(">Y</text>"));
    }

    #[test]
    fn empty_bar_chart_still_renders_axes() {
        let svg = render_bar_chart(&BarChart {
            title: "t",
            x_label: "x",
            y_label: "y",
            bars: Vec::new(),
            palette: Palette::Coolwarm,
        });
        assert!(svg.contains("<line"));
        assert!(!svg.contains("<rect x="));
    }
}
