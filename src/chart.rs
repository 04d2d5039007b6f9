use crate::aggregate::{Counts, CrossTab};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;

/// Chart kinds the dashboard draws
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// One bar per category
    Bar,

    /// Share of each category in the total
    Pie,

    /// Values over dates
    Line,

    /// One cluster of bars per category, one bar per group inside it
    GroupedBar,
}

/// Data behind a chart
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Categories {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Series {
        points: Vec<(NaiveDate, f64)>,
    },
    Grouped {
        categories: Vec<String>,
        groups: Vec<String>,
        /// `values[category][group]`
        values: Vec<Vec<f64>>,
    },
}

/// A chart ready to be rendered or exported
///
/// Carries the title and axis labels together with the data, so the same
/// value drives the PNG image, the JSON API and the CSV/XLSX downloads.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chart {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis (category column in exports)
    pub x_label: String,

    /// Label for the Y-axis (value column in exports)
    pub y_label: String,

    pub chart_type: ChartType,

    pub data: ChartData,
}

fn labelled<K: Display>(counts: &Counts<K>) -> ChartData {
    ChartData::Categories {
        labels: counts.iter().map(|(k, _)| k.to_string()).collect(),
        values: counts.iter().map(|(_, c)| *c as f64).collect(),
    }
}

impl Chart {
    pub fn bar<K: Display>(title: &str, x_label: &str, y_label: &str, counts: &Counts<K>) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            chart_type: ChartType::Bar,
            data: labelled(counts),
        }
    }

    pub fn pie<K: Display>(title: &str, category: &str, counts: &Counts<K>) -> Self {
        Self {
            title: title.to_string(),
            x_label: category.to_string(),
            y_label: "Count".to_string(),
            chart_type: ChartType::Pie,
            data: labelled(counts),
        }
    }

    /// Points are sorted by date.
    pub fn line(title: &str, x_label: &str, y_label: &str, mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            chart_type: ChartType::Line,
            data: ChartData::Series { points },
        }
    }

    pub fn grouped_bar<A: Display, B: Display>(
        title: &str,
        x_label: &str,
        y_label: &str,
        tab: &CrossTab<A, B>,
    ) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            chart_type: ChartType::GroupedBar,
            data: ChartData::Grouped {
                categories: tab.rows.iter().map(ToString::to_string).collect(),
                groups: tab.columns.iter().map(ToString::to_string).collect(),
                values: tab
                    .cells
                    .iter()
                    .map(|row| row.iter().map(|c| *c as f64).collect())
                    .collect(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.data {
            ChartData::Categories { values, .. } => values.is_empty(),
            ChartData::Series { points } => points.is_empty(),
            ChartData::Grouped { categories, groups, .. } => categories.is_empty() || groups.is_empty(),
        }
    }

    /// The chart's data as a header row plus labelled value rows.
    pub fn table(&self) -> (Vec<String>, Vec<(String, Vec<f64>)>) {
        match &self.data {
            ChartData::Categories { labels, values } => (
                vec![self.x_label.clone(), self.y_label.clone()],
                labels
                    .iter()
                    .zip(values)
                    .map(|(label, value)| (label.clone(), vec![*value]))
                    .collect(),
            ),
            ChartData::Series { points } => (
                vec![self.x_label.clone(), self.y_label.clone()],
                points
                    .iter()
                    .map(|(date, value)| (date.format("%Y-%m-%d").to_string(), vec![*value]))
                    .collect(),
            ),
            ChartData::Grouped {
                categories,
                groups,
                values,
            } => {
                let mut header = vec![self.x_label.clone()];
                header.extend(groups.iter().cloned());
                (
                    header,
                    categories.iter().cloned().zip(values.iter().cloned()).collect(),
                )
            }
        }
    }
}

/// Format a value for tables: whole numbers without decimals, others with two.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(feature = "web")]
pub use render::{ChartError, ChartOptions, render_png, save_png};

#[cfg(feature = "web")]
mod render {
    use super::{Chart, ChartData};
    use crate::config::ChartConfig;
    use chrono::{Duration, NaiveDate};
    use image::{ImageFormat, RgbImage};
    use plotters::coord::Shift;
    use plotters::element::Pie;
    use plotters::prelude::*;
    use std::io::Cursor;
    use std::path::Path;
    use thiserror::Error;

    type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

    /// rgb(203, 32, 45)
    const BRAND: RGBColor = RGBColor(203, 32, 45);

    const PALETTE: [RGBColor; 8] = [
        BRAND,
        RGBColor(38, 70, 83),
        RGBColor(233, 196, 106),
        RGBColor(42, 157, 143),
        RGBColor(244, 162, 97),
        RGBColor(106, 76, 147),
        RGBColor(25, 130, 196),
        RGBColor(138, 201, 38),
    ];

    fn palette(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    #[derive(Error, Debug)]
    pub enum ChartError {
        #[error("chart `{0}` has no data")]
        Empty(String),

        #[error("drawing failed: {0}")]
        Drawing(String),

        #[error("pixel buffer does not match {0}x{1}")]
        Buffer(u32, u32),

        #[error("png encoding failed: {0}")]
        Encoding(#[from] image::ImageError),

        #[error("{0}")]
        Io(#[from] std::io::Error),
    }

    impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
        fn from(err: DrawingAreaErrorKind<E>) -> Self {
            ChartError::Drawing(err.to_string())
        }
    }

    /// Pixel size of the rendered image
    #[derive(Clone, Debug)]
    pub struct ChartOptions {
        pub width: u32,
        pub height: u32,
    }

    impl Default for ChartOptions {
        fn default() -> Self {
            Self {
                width: 800,
                height: 400,
            }
        }
    }

    impl From<&ChartConfig> for ChartOptions {
        fn from(config: &ChartConfig) -> Self {
            Self {
                width: config.width,
                height: config.height,
            }
        }
    }

    /// Renders a chart to PNG bytes
    ///
    /// Draws into an in-memory RGB buffer and encodes it as PNG.
    ///
    /// # Errors
    /// * `ChartError::Empty` if the chart has no data points
    /// * `ChartError::Drawing` if plotters fails (e.g. no usable font)
    pub fn render_png(chart: &Chart, options: &ChartOptions) -> Result<Vec<u8>, ChartError> {
        if chart.is_empty() {
            return Err(ChartError::Empty(chart.title.clone()));
        }

        let (width, height) = (options.width, options.height);
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            match &chart.data {
                ChartData::Categories { labels, values } => match chart.chart_type {
                    super::ChartType::Pie => draw_pie(&root, chart, labels, values)?,
                    _ => draw_bar(&root, chart, labels, values)?,
                },
                ChartData::Series { points } => draw_line(&root, chart, points)?,
                ChartData::Grouped {
                    categories,
                    groups,
                    values,
                } => draw_grouped_bar(&root, chart, categories, groups, values)?,
            }

            root.present()?;
        }

        let image = RgbImage::from_raw(width, height, pixels).ok_or(ChartError::Buffer(width, height))?;
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        Ok(png.into_inner())
    }

    /// Renders a chart and writes the PNG to `path`
    pub fn save_png(chart: &Chart, options: &ChartOptions, path: &Path) -> Result<(), ChartError> {
        let png = render_png(chart, options)?;
        std::fs::write(path, png)?;
        Ok(())
    }

    fn draw_bar(root: &Root<'_>, chart: &Chart, labels: &[String], values: &[f64]) -> Result<(), ChartError> {
        let max_y = values.iter().cloned().fold(0.0, f64::max);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0..labels.len()).into_segmented(), 0.0..max_y * 1.1 + 1.0)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(labels.len())
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .draw()?;

        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(BRAND.filled())
                .margin(10)
                .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
        )?;

        Ok(())
    }

    fn draw_pie(root: &Root<'_>, chart: &Chart, labels: &[String], values: &[f64]) -> Result<(), ChartError> {
        let area = root.titled(&chart.title, ("sans-serif", 24))?;
        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = width.min(height) as f64 * 0.38;
        let colors: Vec<RGBColor> = (0..values.len()).map(palette).collect();

        let mut pie = Pie::new(&center, &radius, values, &colors, labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
        area.draw(&pie)?;

        Ok(())
    }

    fn draw_line(root: &Root<'_>, chart: &Chart, points: &[(NaiveDate, f64)]) -> Result<(), ChartError> {
        let first = points[0].0;
        let last = points[points.len() - 1].0;
        let span = (last - first).num_days().max(1) as f64;
        let min_y = points.iter().map(|(_, v)| *v).fold(0.0, f64::min);
        let max_y = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..span, min_y..max_y * 1.05 + 1.0)?;

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(6)
            .x_label_formatter(&|days| {
                (first + Duration::days(*days as i64))
                    .format("%Y-%m-%d")
                    .to_string()
            })
            .draw()?;

        ctx.draw_series(LineSeries::new(
            points
                .iter()
                .map(|(date, value)| ((*date - first).num_days() as f64, *value)),
            &BRAND,
        ))?;

        Ok(())
    }

    fn draw_grouped_bar(
        root: &Root<'_>,
        chart: &Chart,
        categories: &[String],
        groups: &[String],
        values: &[Vec<f64>],
    ) -> Result<(), ChartError> {
        let max_y = values.iter().flatten().cloned().fold(0.0, f64::max);
        let slot = 0.8 / groups.len() as f64;

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..categories.len() as f64 - 0.5, 0.0..max_y * 1.1 + 1.0)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(categories.len())
            .x_label_formatter(&|x| {
                let index = x.round();
                if (x - index).abs() < 1e-6 && index >= 0.0 {
                    categories.get(index as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .draw()?;

        for (g, group) in groups.iter().enumerate() {
            let color = palette(g);
            ctx.draw_series(values.iter().enumerate().map(|(c, row)| {
                let left = c as f64 - 0.4 + g as f64 * slot;
                Rectangle::new([(left, 0.0), (left + slot, row[g])], color.filled())
            }))?
            .label(group.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        Ok(())
    }
}
