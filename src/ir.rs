// Chart intermediate representation: aggregated data paired with how to draw it

/// Chart families the dashboard draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Categorical x, one value per category joined by a line with markers
    Line,
    /// Categorical x, bars; several series are dodged side by side
    Bar,
    /// Aggregated bars split by a colour-by column (plotly's `histfunc`)
    Histogram,
    /// Numeric x against numeric y
    Scatter,
    /// Longitude/latitude points coloured by a category
    Map,
}

/// Presentation of a chart, independent of its data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Column whose values split the data into coloured series
    pub color_by: Option<String>,
    /// Print each bar's value above it
    pub show_values: bool,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            color_by: None,
            show_values: matches!(kind, ChartKind::Bar | ChartKind::Histogram),
        }
    }

    pub fn color_by(mut self, col: &str) -> Self {
        self.color_by = Some(col.to_string());
        self
    }
}

/// Values aligned 1:1 with the figure's categories. `NaN` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// A coloured set of (x, y) points
#[derive(Debug, Clone, PartialEq)]
pub struct PointGroup {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FigureData {
    Categorical {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Points {
        groups: Vec<PointGroup>,
    },
}

/// A chart ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub spec: ChartSpec,
    pub data: FigureData,
}

impl Figure {
    /// Category labels for categorical figures, empty otherwise.
    pub fn categories(&self) -> &[String] {
        match &self.data {
            FigureData::Categorical { categories, .. } => categories,
            FigureData::Points { .. } => &[],
        }
    }

    /// Look up the value drawn for `category` in the series called `series`.
    pub fn value(&self, series: &str, category: &str) -> Option<f64> {
        match &self.data {
            FigureData::Categorical { categories, series: all } => {
                let idx = categories.iter().position(|c| c == category)?;
                all.iter().find(|s| s.name == series)?.values.get(idx).copied()
            }
            FigureData::Points { .. } => None,
        }
    }

    pub fn point_count(&self) -> usize {
        match &self.data {
            FigureData::Points { groups } => groups.iter().map(|g| g.points.len()).sum(),
            FigureData::Categorical { .. } => 0,
        }
    }
}
