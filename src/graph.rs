use crate::ir::{ChartKind, Figure, FigureData, PointGroup, Series};
use crate::palette::ColorPalette;
use crate::scale::{self, Scales};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

const TREND_LINE_COLOR: RGBColor = RGBColor(128, 128, 128);
const TREND_LINE_WIDTH: u32 = 3;
const TREND_MARKER_COLOR: RGBColor = RGBColor(135, 206, 235);
const TREND_MARKER_SIZE: i32 = 5;

/// Share of a category slot covered by its bars
const BAR_SLOT_WIDTH: f64 = 0.8;

const POINT_ALPHA: f64 = 0.9;
const POINT_SIZE: i32 = 3;
const MAP_POINT_SIZE: i32 = 2;

/// Largest accepted canvas side, in pixels
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Canvas that turns figures into encoded images
pub struct Canvas {
    width: u32,
    height: u32,
    buffer_len: usize,
    format: OutputFormat,
}

impl Canvas {
    pub fn new(options: &RenderOptions) -> Result<Self> {
        if options.width == 0 || options.height == 0 {
            anyhow::bail!(
                "Canvas size must be positive (width: {}, height: {})",
                options.width,
                options.height
            );
        }
        if options.width > MAX_CANVAS_SIDE || options.height > MAX_CANVAS_SIDE {
            anyhow::bail!(
                "Canvas size {}x{} is too large (max {} per side)",
                options.width,
                options.height,
                MAX_CANVAS_SIDE
            );
        }
        let buffer_len = (options.width as usize)
            .checked_mul(options.height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .with_context(|| {
                format!(
                    "Canvas size {}x{} is too large",
                    options.width, options.height
                )
            })?;
        Ok(Canvas {
            width: options.width,
            height: options.height,
            buffer_len,
            format: options.format,
        })
    }

    /// Draw a figure and encode it in the canvas' output format
    pub fn render(&self, figure: &Figure) -> Result<Vec<u8>> {
        debug!("Rendering '{}' as {:?}", figure.spec.title, self.format);
        match self.format {
            OutputFormat::Png => self.render_png(figure),
            OutputFormat::Svg => self.render_svg(figure),
        }
    }

    fn render_png(&self, figure: &Figure) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.buffer_len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().context("Failed to present drawing")?;
        }

        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }

    fn render_svg(&self, figure: &Figure) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().context("Failed to present drawing")?;
        }
        Ok(svg.into_bytes())
    }
}

/// Draw a figure onto any plotters drawing area
pub fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let is_bar = matches!(figure.spec.kind, ChartKind::Bar | ChartKind::Histogram);
    let scales = scale::build_scales(figure, is_bar);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.spec.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            scales.x.domain.0..scales.x.domain.1,
            scales.y.domain.0..scales.y.domain.1,
        )
        .context("Failed to build chart")?;

    let categories = scales.x.categories.clone();
    let category_formatter = |x: &f64| scale::category_label(&categories, *x);

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(figure.spec.x_label.as_str())
            .y_desc(figure.spec.y_label.as_str());
        if scales.x.is_categorical {
            mesh.x_labels(categories.len().max(1))
                .x_label_formatter(&category_formatter)
                .disable_x_mesh();
        }
        mesh.draw().context("Failed to draw mesh")?;
    }

    match (&figure.data, figure.spec.kind) {
        (FigureData::Categorical { series, .. }, ChartKind::Line) => {
            if let Some(first) = series.first() {
                draw_trend(&mut chart, first)?;
            }
        }
        (FigureData::Categorical { series, .. }, _) => {
            draw_bars(&mut chart, series, &scales, figure.spec.show_values)?;
        }
        (FigureData::Points { groups }, kind) => {
            let palette = if kind == ChartKind::Map {
                ColorPalette::dark24()
            } else {
                ColorPalette::category10()
            };
            let size = if kind == ChartKind::Map { MAP_POINT_SIZE } else { POINT_SIZE };
            draw_points(&mut chart, groups, &palette, size)?;
        }
    }

    // Legend only when colour carries meaning
    let series_count = match &figure.data {
        FigureData::Categorical { series, .. } => series.len(),
        FigureData::Points { groups } => groups.len(),
    };
    if series_count > 1 || figure.spec.color_by.is_some() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_trend<DB>(chart: &mut Chart<'_, DB>, series: &Series) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points: Vec<(f64, f64)> = series
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
        .collect();

    chart
        .draw_series(LineSeries::new(
            points.clone(),
            TREND_LINE_COLOR.stroke_width(TREND_LINE_WIDTH),
        ))
        .context("Failed to draw line series")?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), TREND_MARKER_SIZE, TREND_MARKER_COLOR.filled())),
        )
        .context("Failed to draw markers")?;

    Ok(())
}

/// Dodged bars: each category slot is split evenly between the series
fn draw_bars<DB>(
    chart: &mut Chart<'_, DB>,
    series: &[Series],
    scales: &Scales,
    show_values: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if series.is_empty() {
        anyhow::bail!("Cannot create bar chart with no series");
    }

    let palette = ColorPalette::category10();
    let num_series = series.len();
    let slot = BAR_SLOT_WIDTH / num_series as f64;
    let label_offset = (scales.y.domain.1 - scales.y.domain.0) * 0.01;

    for (series_idx, s) in series.iter().enumerate() {
        let color = palette.get(series_idx);
        let x_offset = (series_idx as f64 - (num_series as f64 - 1.0) / 2.0) * slot;

        let bars: Vec<(f64, f64)> = s
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| (i as f64 + x_offset, v))
            .collect();

        chart
            .draw_series(bars.iter().map(|&(x, y)| {
                Rectangle::new([(x - slot / 2.0, 0.0), (x + slot / 2.0, y)], color.filled())
            }))
            .context("Failed to draw bars")?
            .label(s.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        if show_values {
            let style = TextStyle::from(("sans-serif", 12).into_font())
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart
                .draw_series(bars.iter().map(|&(x, y)| {
                    Text::new(format_value(y), (x, y.max(0.0) + label_offset), style.clone())
                }))
                .context("Failed to draw bar labels")?;
        }
    }

    Ok(())
}

fn draw_points<DB>(
    chart: &mut Chart<'_, DB>,
    groups: &[PointGroup],
    palette: &ColorPalette,
    size: i32,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    for (idx, group) in groups.iter().enumerate() {
        let color = palette.get(idx);
        let fill = color.mix(POINT_ALPHA);

        chart
            .draw_series(
                group
                    .points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), size, fill.filled())),
            )
            .context("Failed to draw point series")?
            .label(group.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 8, y + 4)], color.filled()));
    }
    Ok(())
}

/// Value printed above a bar: whole numbers without decimals, others to one place
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}
