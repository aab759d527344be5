// Aggregate-and-render: turn the listings into figures and figures into files

use crate::data::Dataset;
use crate::error::{DashError, DashResult};
use crate::graph::Canvas;
use crate::ir::{ChartKind, ChartSpec, Figure, FigureData, PointGroup, Series};
use crate::transform::{self, Aggregation, GroupKey, GroupValue, Order};
use crate::RenderOptions;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Group, reduce, order and wrap the result in a figure.
///
/// A single-column key yields one series. A two-column key yields one series
/// per distinct value of the second column, and the figure is coloured by it.
pub fn aggregate_figure(
    data: &Dataset,
    key: &GroupKey,
    agg: &Aggregation,
    order: &Order,
    decimals: Option<u32>,
    spec: ChartSpec,
) -> DashResult<Figure> {
    let values = transform::aggregate(data, key, agg)?;
    let categories = transform::order_keys(data, transform::distinct_keys(&values), order)?;
    let round = |v: f64| decimals.map_or(v, |d| transform::round_to(v, d));

    let (series, spec) = match key {
        GroupKey::Single(_) => {
            let lookup: HashMap<&str, f64> =
                values.iter().map(|g| (g.key.as_str(), g.value)).collect();
            let series = Series {
                name: series_name(agg),
                values: categories
                    .iter()
                    .map(|c| round(lookup.get(c.as_str()).copied().unwrap_or(f64::NAN)))
                    .collect(),
            };
            (vec![series], spec)
        }
        GroupKey::Pair(_, inner) => {
            let mut subs = transform::distinct_subs(&values);
            transform::sort_keys(&mut subs);
            let lookup: HashMap<(&str, &str), f64> = values
                .iter()
                .filter_map(|g| g.sub.as_deref().map(|s| ((g.key.as_str(), s), g.value)))
                .collect();
            let series = subs
                .iter()
                .map(|sub| Series {
                    name: sub.clone(),
                    values: categories
                        .iter()
                        .map(|c| {
                            round(
                                lookup
                                    .get(&(c.as_str(), sub.as_str()))
                                    .copied()
                                    .unwrap_or(f64::NAN),
                            )
                        })
                        .collect(),
                })
                .collect();
            let spec = if spec.color_by.is_none() {
                spec.color_by(inner)
            } else {
                spec
            };
            (series, spec)
        }
    };

    debug!("Figure '{}': {} categories", spec.title, categories.len());
    Ok(Figure {
        spec,
        data: FigureData::Categorical { categories, series },
    })
}

/// Top (`descending`) or bottom `n` keys by an aggregate, in ranked order.
pub fn ranked_figure(
    data: &Dataset,
    key: &str,
    agg: &Aggregation,
    n: usize,
    descending: bool,
    spec: ChartSpec,
) -> DashResult<Figure> {
    let values = transform::aggregate(data, &GroupKey::single(key), agg)?;
    let ranked: Vec<GroupValue> = if descending {
        transform::top_n(values, n)
    } else {
        transform::bottom_n(values, n)
    };

    Ok(Figure {
        spec,
        data: FigureData::Categorical {
            categories: ranked.iter().map(|g| g.key.clone()).collect(),
            series: vec![Series {
                name: series_name(agg),
                values: ranked.iter().map(|g| g.value).collect(),
            }],
        },
    })
}

/// Means of several metrics per key, one series per metric.
pub fn metrics_figure(
    data: &Dataset,
    key: &str,
    metrics: &[&str],
    decimals: Option<u32>,
    spec: ChartSpec,
) -> DashResult<Figure> {
    let rows = transform::multi_mean(data, key, metrics)?;
    let series = metrics
        .iter()
        .enumerate()
        .map(|(m, name)| Series {
            name: name.to_string(),
            values: rows
                .iter()
                .map(|r| decimals.map_or(r.values[m], |d| transform::round_to(r.values[m], d)))
                .collect(),
        })
        .collect();

    Ok(Figure {
        spec: spec.color_by("Metric"),
        data: FigureData::Categorical {
            categories: rows.into_iter().map(|r| r.key).collect(),
            series,
        },
    })
}

/// Raw (x, y) points, split into groups by `spec.color_by` when set.
/// Rows missing either coordinate or the colour value are skipped.
pub fn scatter_figure(data: &Dataset, x: &str, y: &str, spec: ChartSpec) -> DashResult<Figure> {
    let x_idx = data.column_index(x)?;
    let y_idx = data.column_index(y)?;
    let color_idx = match &spec.color_by {
        Some(col) => Some(data.column_index(col)?),
        None => None,
    };

    let mut groups: Vec<PointGroup> = Vec::new();
    for row in 0..data.len() {
        let (Some(xv), Some(yv)) = (data.numeric_cell(row, x_idx)?, data.numeric_cell(row, y_idx)?)
        else {
            continue;
        };
        let name = match color_idx {
            Some(idx) => {
                let v = data.cell(row, idx).trim();
                if v.is_empty() {
                    continue;
                }
                v.to_string()
            }
            None => y.to_string(),
        };
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.points.push((xv, yv)),
            None => groups.push(PointGroup {
                name,
                points: vec![(xv, yv)],
            }),
        }
    }

    Ok(Figure {
        spec,
        data: FigureData::Points { groups },
    })
}

/// Listings placed by longitude and latitude, coloured by `color_by`.
pub fn map_figure(data: &Dataset, lat: &str, long: &str, color_by: &str, title: &str) -> DashResult<Figure> {
    let spec = ChartSpec::new(ChartKind::Map, title, long, lat).color_by(color_by);
    scatter_figure(data, long, lat, spec)
}

/// Mean of `target` per value of `col`, sorted by `col`, drawn as a trend line.
pub fn plot_line_chart(
    data: &Dataset,
    col: &str,
    target: &str,
    x_label: &str,
    y_label: &str,
    title: &str,
) -> DashResult<Figure> {
    aggregate_figure(
        data,
        &GroupKey::single(col),
        &Aggregation::mean(target),
        &Order::ByKey,
        None,
        ChartSpec::new(ChartKind::Line, title, x_label, y_label),
    )
}

fn series_name(agg: &Aggregation) -> String {
    match agg {
        Aggregation::Mean(col) => col.clone(),
        Aggregation::Count(_) => "count".to_string(),
    }
}

/// Draw a figure to encoded image bytes
pub fn render_figure(figure: &Figure, options: &RenderOptions) -> Result<Vec<u8>> {
    let canvas = Canvas::new(options)?;
    canvas
        .render(figure)
        .map_err(|e| DashError::Render(format!("{}: {:#}", figure.spec.title, e)).into())
}

/// Draw a figure and write it to `path`
pub fn write_figure(figure: &Figure, options: &RenderOptions, path: &Path) -> Result<()> {
    let bytes = render_figure(figure, options)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    info!("Wrote '{}' to {}", figure.spec.title, path.display());
    Ok(())
}

/// `<dir>/<section>-<NN>-<title>.<ext>`
pub fn chart_path(dir: &Path, section: &str, index: usize, title: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}-{:02}-{}.{}", section, index, slugify(title), ext))
}

/// Lowercase ASCII words joined by '-'
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_dataset;

    fn listings() -> Dataset {
        make_dataset(
            vec!["room type", "neighbourhood group", "price", "service fee", "lat", "long"],
            vec![
                vec!["Private room", "Brooklyn", "50", "10", "40.64", "-73.97"],
                vec!["Private room", "Manhattan", "150", "30", "40.75", "-73.98"],
                vec!["Entire home/apt", "Manhattan", "200", "40", "40.80", "-73.94"],
                vec!["Shared room", "Brooklyn", "", "", "", ""],
            ],
        )
    }

    #[test]
    fn test_aggregate_figure_single() {
        let figure = aggregate_figure(
            &listings(),
            &GroupKey::single("room type"),
            &Aggregation::mean("price"),
            &Order::FirstSeen,
            None,
            ChartSpec::new(ChartKind::Bar, "Average Price by Room Type", "room type", "price"),
        )
        .unwrap();
        assert_eq!(figure.categories(), &["Private room", "Entire home/apt", "Shared room"]);
        assert_eq!(figure.value("price", "Private room"), Some(100.0));
        assert_eq!(figure.value("price", "Entire home/apt"), Some(200.0));
        assert!(figure.value("price", "Shared room").unwrap().is_nan());
        assert!(figure.spec.show_values);
    }

    #[test]
    fn test_aggregate_figure_pair_fills_gaps() {
        let figure = aggregate_figure(
            &listings(),
            &GroupKey::pair("neighbourhood group", "room type"),
            &Aggregation::count(),
            &Order::ByCount("neighbourhood group".to_string()),
            None,
            ChartSpec::new(ChartKind::Histogram, "Counts", "neighbourhood group", "count"),
        )
        .unwrap();
        assert_eq!(figure.spec.color_by.as_deref(), Some("room type"));
        assert_eq!(figure.categories(), &["Brooklyn", "Manhattan"]);
        assert_eq!(figure.value("Private room", "Brooklyn"), Some(1.0));
        assert_eq!(figure.value("Entire home/apt", "Manhattan"), Some(1.0));
        assert!(figure.value("Entire home/apt", "Brooklyn").unwrap().is_nan());
        if let FigureData::Categorical { series, .. } = &figure.data {
            let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Entire home/apt", "Private room", "Shared room"]);
        } else {
            panic!("Expected categorical data");
        }
    }

    #[test]
    fn test_aggregate_figure_rounds() {
        let data = make_dataset(vec!["g", "v"], vec![vec!["a", "1"], vec!["a", "2"], vec!["a", "2"]]);
        let figure = aggregate_figure(
            &data,
            &GroupKey::single("g"),
            &Aggregation::mean("v"),
            &Order::FirstSeen,
            Some(1),
            ChartSpec::new(ChartKind::Histogram, "t", "g", "v"),
        )
        .unwrap();
        assert_eq!(figure.value("v", "a"), Some(1.7));
    }

    #[test]
    fn test_ranked_figure() {
        let data = make_dataset(
            vec!["road", "price"],
            vec![
                vec!["A St", "100"],
                vec!["B Ave", "300"],
                vec!["C Rd", "200"],
                vec!["B Ave", "100"],
            ],
        );
        let spec = ChartSpec::new(ChartKind::Bar, "Top", "road", "price");
        let top = ranked_figure(&data, "road", &Aggregation::mean("price"), 2, true, spec.clone()).unwrap();
        assert_eq!(top.categories(), &["B Ave", "C Rd"]);
        let bottom = ranked_figure(&data, "road", &Aggregation::mean("price"), 5, false, spec).unwrap();
        assert_eq!(bottom.categories(), &["A St", "B Ave", "C Rd"]);
    }

    #[test]
    fn test_metrics_figure() {
        let figure = metrics_figure(
            &listings(),
            "room type",
            &["price", "service fee"],
            Some(0),
            ChartSpec::new(ChartKind::Bar, "Averages", "room type", "value"),
        )
        .unwrap();
        assert_eq!(figure.spec.color_by.as_deref(), Some("Metric"));
        assert_eq!(figure.value("price", "Private room"), Some(100.0));
        assert_eq!(figure.value("service fee", "Private room"), Some(20.0));
    }

    #[test]
    fn test_scatter_figure_skips_missing() {
        let figure = scatter_figure(
            &listings(),
            "service fee",
            "price",
            ChartSpec::new(ChartKind::Scatter, "Price vs fee", "service fee", "price"),
        )
        .unwrap();
        assert_eq!(figure.point_count(), 3);
    }

    #[test]
    fn test_map_figure_groups_by_color() {
        let figure = map_figure(&listings(), "lat", "long", "room type", "Map").unwrap();
        if let FigureData::Points { groups } = &figure.data {
            assert_eq!(groups.len(), 2);
            assert_eq!(groups[0].name, "Private room");
            assert_eq!(groups[0].points[0], (-73.97, 40.64));
        } else {
            panic!("Expected point data");
        }
    }

    #[test]
    fn test_plot_line_chart_sorted() {
        let data = make_dataset(
            vec!["year", "number of reviews"],
            vec![vec!["2021", "10"], vec!["2019", "4"], vec!["2021", "20"]],
        );
        let figure = plot_line_chart(&data, "year", "number of reviews", "Year", "Average Reviews", "t").unwrap();
        assert_eq!(figure.spec.kind, ChartKind::Line);
        assert_eq!(figure.categories(), &["2019", "2021"]);
        assert_eq!(figure.value("number of reviews", "2021"), Some(15.0));
    }

    #[test]
    fn test_missing_column_aborts_figure() {
        let result = plot_line_chart(&listings(), "last_review_(year)", "price", "x", "y", "t");
        assert!(matches!(result, Err(DashError::MissingColumn(_))));
    }

    #[test]
    fn test_chart_path() {
        let path = chart_path(Path::new("out"), "price", 4, "Average Price over Top 5 Roads :", "png");
        assert_eq!(path, Path::new("out").join("price-04-average-price-over-top-5-roads.png"));
    }

    #[test]
    fn test_render_rejects_zero_size() {
        let figure = map_figure(&listings(), "lat", "long", "room type", "Map").unwrap();
        let options = RenderOptions { width: 0, ..RenderOptions::default() };
        assert!(render_figure(&figure, &options).is_err());
    }

    #[test]
    fn test_render_rejects_oversized_canvas() {
        let figure = map_figure(&listings(), "lat", "long", "room type", "Map").unwrap();
        let options = RenderOptions { width: 40_000, height: 40_000, ..RenderOptions::default() };
        let err = render_figure(&figure, &options).unwrap_err();
        assert!(format!("{:#}", err).contains("too large"));
    }
}
