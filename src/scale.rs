use crate::ir::{Figure, FigureData};

/// Axis domains for one figure
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    pub x: Scale,
    pub y: Scale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub domain: (f64, f64),
    pub is_categorical: bool,
    pub categories: Vec<String>, // If categorical, maps index -> label
}

/// Build the x and y scales for a figure
pub fn build_scales(figure: &Figure, include_zero: bool) -> Scales {
    match &figure.data {
        FigureData::Categorical { categories, series } => {
            let n = categories.len() as f64;
            let x = Scale {
                domain: (-0.5, (n - 0.5).max(0.5)),
                is_categorical: true,
                categories: categories.clone(),
            };

            let (mut min, mut max) = min_max(series.iter().flat_map(|s| s.values.iter().copied()));
            if include_zero {
                // Bar charts always include 0
                if min > 0.0 { min = 0.0; }
                if max < 0.0 { max = 0.0; }
            }
            // Bars stand on the axis; the top keeps its padding for value labels
            let (lo, hi) = pad_range(min, max);
            let y = Scale {
                domain: (if include_zero && min >= 0.0 { 0.0 } else { lo }, hi),
                is_categorical: false,
                categories: Vec::new(),
            };
            Scales { x, y }
        }
        FigureData::Points { groups } => {
            let xs = min_max(groups.iter().flat_map(|g| g.points.iter().map(|p| p.0)));
            let ys = min_max(groups.iter().flat_map(|g| g.points.iter().map(|p| p.1)));
            Scales {
                x: continuous(pad_range(xs.0, xs.1)),
                y: continuous(pad_range(ys.0, ys.1)),
            }
        }
    }
}

fn continuous(domain: (f64, f64)) -> Scale {
    Scale {
        domain,
        is_categorical: false,
        categories: Vec::new(),
    }
}

/// Min and max of the finite values; (0, 1) when there are none.
fn min_max<I>(values: I) -> (f64, f64)
where
    I: Iterator<Item = f64>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for val in values.filter(|v| v.is_finite()) {
        if val < min { min = val; }
        if val > max { max = val; }
    }

    // Handle empty case
    if min == f64::INFINITY {
        return (0.0, 1.0);
    }
    (min, max)
}

pub fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

/// Label for a categorical tick at coordinate `x`; empty between categories.
pub fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}
