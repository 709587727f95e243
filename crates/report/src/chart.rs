//! Headless chart rendering
//!
//! Charts are drawn with the plotters SVG backend, which needs neither a
//! display nor a system font lookup. Text is emitted as SVG `<text>` with the
//! configured font stack, so glyphs are resolved by whatever opens the file.

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use shelfscope_core::{AppError, GroupedCount};
use std::path::Path;

/// Generic family appended after the configured one
pub const FALLBACK_FONT_FAMILY: &str = "sans-serif";

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const TITLE_SIZE: f64 = 28.0;
const AXIS_DESC_SIZE: f64 = 18.0;
const LABEL_SIZE: f64 = 14.0;

/// Bar direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Keys along the x axis
    Vertical,
    /// Keys along the y axis, first entry on top
    Horizontal,
}

/// Chart shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar(Orientation),
    /// Line with a marker on every point
    Line,
}

/// How one table is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Pixel size as `(width, height)`
    pub size: (u32, u32),
    /// Preferred font family, without fallback
    pub font_family: String,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            size: (1200, 600),
            font_family: default_font_family().to_string(),
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Font family list written into the SVG
    pub fn font_stack(&self) -> String {
        let family = self.font_family.trim();
        if family.is_empty() || family.eq_ignore_ascii_case(FALLBACK_FONT_FAMILY) {
            FALLBACK_FONT_FAMILY.to_string()
        } else {
            format!("{}, {}", family, FALLBACK_FONT_FAMILY)
        }
    }
}

/// CJK-capable family shipped with the host platform
pub fn default_font_family() -> &'static str {
    if cfg!(target_os = "macos") {
        "Hiragino Sans GB"
    } else if cfg!(target_os = "windows") {
        "MS Gothic"
    } else {
        "IPAGothic"
    }
}

/// Renders `table` to an SVG file at `path`
///
/// An empty table produces no file and returns [`AppError::RenderError`].
pub fn render_chart(
    table: &GroupedCount,
    spec: &ChartSpec,
    path: &Path,
) -> Result<(), AppError> {
    let chart_name = table.dimension.to_string();
    if table.is_empty() {
        return Err(AppError::render(chart_name, "no data to plot"));
    }

    let labels: Vec<&str> = table.entries().iter().map(|e| e.key.as_str()).collect();
    let counts: Vec<u32> = table.entries().iter().map(|e| e.count as u32).collect();
    let count_max = count_axis_max(table.max_count() as u32);
    let fonts = spec.font_stack();

    let result = match spec.kind {
        ChartKind::Bar(Orientation::Vertical) => {
            draw_vertical_bars(&labels, &counts, count_max, spec, &fonts, path)
        }
        ChartKind::Bar(Orientation::Horizontal) => {
            draw_horizontal_bars(&labels, &counts, count_max, spec, &fonts, path)
        }
        ChartKind::Line => draw_line(&labels, &counts, count_max, spec, &fonts, path),
    };
    result.map_err(|reason| AppError::render(chart_name, reason))?;

    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Upper bound of the count axis, leaving head room for annotations
fn count_axis_max(max: u32) -> u32 {
    max + (max / 10).max(1)
}

fn draw_vertical_bars(
    labels: &[&str],
    counts: &[u32],
    count_max: u32,
    spec: &ChartSpec,
    fonts: &str,
    path: &Path,
) -> Result<(), String> {
    let root = SVGBackend::new(path, spec.size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let last = last_index(labels);
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, (fonts, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..last).into_segmented(), 0u32..count_max)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| segment_label(labels, v))
        .x_label_style((fonts, LABEL_SIZE))
        .y_label_style((fonts, LABEL_SIZE))
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_desc_style((fonts, AXIS_DESC_SIZE))
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(8)
                .data(counts.iter().enumerate().map(|(i, c)| (i as u32, *c))),
        )
        .map_err(|e| e.to_string())?;

    let annotation =
        TextStyle::from((fonts, LABEL_SIZE).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            Text::new(
                c.to_string(),
                (SegmentValue::CenterOf(i as u32), *c),
                annotation.clone(),
            )
        }))
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

fn draw_horizontal_bars(
    labels: &[&str],
    counts: &[u32],
    count_max: u32,
    spec: &ChartSpec,
    fonts: &str,
    path: &Path,
) -> Result<(), String> {
    let root = SVGBackend::new(path, spec.size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    // Row 0 is drawn at the bottom, so the first entry goes to the last row.
    // A one-row axis gets no tick labels, so a lone entry sits on row 1 of two.
    let last = last_index(labels).max(1);
    let row = |i: usize| last - i as u32;
    let mut rows = vec![""; last as usize + 1];
    for (i, label) in labels.iter().enumerate() {
        rows[row(i) as usize] = *label;
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, (fonts, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d(0u32..count_max, (0u32..last).into_segmented())
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.len())
        .y_label_formatter(&|v: &SegmentValue<u32>| segment_label(&rows, v))
        .x_label_style((fonts, LABEL_SIZE))
        .y_label_style((fonts, LABEL_SIZE))
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_desc_style((fonts, AXIS_DESC_SIZE))
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(
            Histogram::horizontal(&chart)
                .style(BAR_COLOR.filled())
                .margin(6)
                .data(counts.iter().enumerate().map(|(i, c)| (row(i), *c))),
        )
        .map_err(|e| e.to_string())?;

    let annotation =
        TextStyle::from((fonts, LABEL_SIZE).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            Text::new(
                format!(" {}", c),
                (*c, SegmentValue::CenterOf(row(i))),
                annotation.clone(),
            )
        }))
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

fn draw_line(
    labels: &[&str],
    counts: &[u32],
    count_max: u32,
    spec: &ChartSpec,
    fonts: &str,
    path: &Path,
) -> Result<(), String> {
    let root = SVGBackend::new(path, spec.size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let last = last_index(labels);
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, (fonts, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..last).into_segmented(), 0u32..count_max)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| segment_label(labels, v))
        .x_label_style((fonts, LABEL_SIZE).into_font().transform(FontTransform::Rotate90))
        .y_label_style((fonts, LABEL_SIZE))
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_desc_style((fonts, AXIS_DESC_SIZE))
        .draw()
        .map_err(|e| e.to_string())?;

    let points: Vec<(SegmentValue<u32>, u32)> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| (SegmentValue::CenterOf(i as u32), *c))
        .collect();

    chart
        .draw_series(LineSeries::new(points.clone(), LINE_COLOR.stroke_width(2)))
        .map_err(|e| e.to_string())?;
    chart
        .draw_series(points.iter().map(|p| Circle::new(p.clone(), 4, LINE_COLOR.filled())))
        .map_err(|e| e.to_string())?;

    let annotation =
        TextStyle::from((fonts, LABEL_SIZE).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(points.iter().map(|(x, c)| {
            Text::new(c.to_string(), (x.clone(), *c), annotation.clone())
        }))
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

/// Integer coordinates are inclusive when segmented, so `0..=last` gives one
/// slot per label
fn last_index(labels: &[&str]) -> u32 {
    labels.len().saturating_sub(1) as u32
}

fn segment_label(labels: &[&str], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscope_core::{Dimension, GroupEntry};
    use tempfile::TempDir;

    fn table(dimension: Dimension, rows: &[(&str, usize)]) -> GroupedCount {
        GroupedCount::new(
            dimension,
            rows.iter().map(|(k, c)| GroupEntry::new(*k, *c)).collect(),
        )
    }

    #[test]
    fn test_empty_table_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yearly_counts.svg");
        let spec = ChartSpec::new(ChartKind::Bar(Orientation::Vertical), "Books per Year");

        let result = render_chart(&GroupedCount::empty(Dimension::Year), &spec, &path);

        assert!(matches!(result, Err(AppError::RenderError { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_single_entry_vertical_bar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yearly_counts.svg");
        let spec = ChartSpec::new(ChartKind::Bar(Orientation::Vertical), "Books per Year")
            .with_axes("Year", "Books");

        render_chart(&table(Dimension::Year, &[("2024", 37)]), &spec, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        let texts = text_contents(&svg);
        assert!(texts.iter().any(|t| t == "Books per Year"));
        assert_labelled(&texts, &[("2024", 37)]);
    }

    #[test]
    fn test_line_chart_marks_points() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monthly_counts.svg");
        let spec = ChartSpec::new(ChartKind::Line, "Purchases per Month").with_size(1500, 600);

        render_chart(
            &table(Dimension::Month, &[("2024-01", 1), ("2024-03", 4)]),
            &spec,
            &path,
        )
        .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    /// Contents of every `<text>` element, trimmed
    fn text_contents(svg: &str) -> Vec<String> {
        svg.split("<text")
            .skip(1)
            .filter_map(|chunk| {
                let start = chunk.find('>')? + 1;
                let end = chunk.find("</text>")?;
                Some(chunk[start..end].trim().to_string())
            })
            .collect()
    }

    /// Renders `rows` and returns the text drawn into the SVG
    fn rendered_text(kind: ChartKind, dimension: Dimension, rows: &[(&str, usize)]) -> Vec<String> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.svg");
        let spec = ChartSpec::new(kind, "Chart").with_axes("Key", "Books");

        render_chart(&table(dimension, rows), &spec, &path).unwrap();
        text_contents(&std::fs::read_to_string(&path).unwrap())
    }

    fn assert_labelled(texts: &[String], rows: &[(&str, usize)]) {
        for (key, count) in rows {
            assert!(texts.iter().any(|t| t == key), "missing key {key} in {texts:?}");
            assert!(
                texts.iter().any(|t| t == &count.to_string()),
                "missing count {count} in {texts:?}"
            );
        }
    }

    // Counts are odd primes above the tick step so they only show up as annotations

    #[test]
    fn test_vertical_bar_labels_every_entry() {
        let rows = [("2023", 23), ("2024", 37)];
        let texts = rendered_text(ChartKind::Bar(Orientation::Vertical), Dimension::Year, &rows);
        assert_labelled(&texts, &rows);
    }

    #[test]
    fn test_horizontal_bar_labels_every_entry() {
        let rows = [("Kodansha", 37), ("Shueisha", 23)];
        let texts = rendered_text(
            ChartKind::Bar(Orientation::Horizontal),
            Dimension::Publisher,
            &rows,
        );
        assert_labelled(&texts, &rows);
    }

    #[test]
    fn test_single_entry_horizontal_bar_keeps_label() {
        let rows = [("Kodansha", 37)];
        let texts = rendered_text(
            ChartKind::Bar(Orientation::Horizontal),
            Dimension::Publisher,
            &rows,
        );
        assert_labelled(&texts, &rows);
    }

    #[test]
    fn test_line_chart_labels_every_point() {
        let rows = [("2024-01", 23), ("2024-03", 37)];
        let texts = rendered_text(ChartKind::Line, Dimension::Month, &rows);
        assert_labelled(&texts, &rows);
    }

    #[test]
    fn test_single_entry_line_keeps_label() {
        let rows = [("2024-01", 37)];
        let texts = rendered_text(ChartKind::Line, Dimension::Month, &rows);
        assert_labelled(&texts, &rows);
    }

    #[test]
    fn test_font_stack_has_fallback() {
        let spec = ChartSpec::new(ChartKind::Line, "t").with_font_family("Noto Sans CJK JP");
        assert_eq!(spec.font_stack(), "Noto Sans CJK JP, sans-serif");

        let spec = spec.with_font_family("  ");
        assert_eq!(spec.font_stack(), "sans-serif");
    }

    #[test]
    fn test_missing_output_dir_is_render_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("tag_counts.svg");
        let spec = ChartSpec::new(ChartKind::Bar(Orientation::Vertical), "Tags");

        let result = render_chart(&table(Dimension::Tag, &[("comic", 3)]), &spec, &path);

        assert!(matches!(result, Err(AppError::RenderError { .. })));
    }
}
