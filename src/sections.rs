//! The dashboard menu.
//!
//! Each section is a fixed list of text blocks and charts. Every chart is
//! built independently, so a missing column only loses the charts that read it.

use crate::data::{columns, Dataset};
use crate::error::DashResult;
use crate::ir::{ChartKind, ChartSpec, Figure};
use crate::runtime::{
    aggregate_figure, map_figure, metrics_figure, plot_line_chart, ranked_figure, scatter_figure,
};
use crate::transform::{Aggregation, GroupKey, Order};
use std::fmt;

pub const DASHBOARD_TITLE: &str = "Airbnb Listings Analysis";

const BANNER_URL: &str =
    "https://digital.hbs.edu/platform-digit/wp-content/uploads/sites/2/2019/10/airbnb-678x381.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Section {
    Overview,
    Neighbourhood,
    Price,
    Review,
    ServiceFee,
    RoomType,
}

impl Section {
    /// Menu order
    pub const ALL: [Section; 6] = [
        Section::Overview,
        Section::Neighbourhood,
        Section::Price,
        Section::Review,
        Section::ServiceFee,
        Section::RoomType,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Neighbourhood => "Neighbourhood Group Analysis",
            Section::Price => "Price Analysis",
            Section::Review => "Review Analysis",
            Section::ServiceFee => "Service Fee Analysis",
            Section::RoomType => "Room Type Analysis",
        }
    }

    /// File name prefix for the section's charts
    pub fn slug(&self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Neighbourhood => "neighbourhood",
            Section::Price => "price",
            Section::Review => "review",
            Section::ServiceFee => "service-fee",
            Section::RoomType => "room-type",
        }
    }

    pub fn text(&self) -> Vec<String> {
        match self {
            Section::Overview => overview_text(),
            Section::Neighbourhood => vec![
                "Map to visualize neighbourhood group with room type.".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    /// Build every chart of the section. One result per chart, in display order.
    pub fn figures(&self, data: &Dataset) -> Vec<DashResult<Figure>> {
        match self {
            Section::Overview => Vec::new(),
            Section::Neighbourhood => neighbourhood_figures(data),
            Section::Price => price_figures(data),
            Section::Review => review_figures(data),
            Section::ServiceFee => service_fee_figures(data),
            Section::RoomType => room_type_figures(data),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

fn overview_text() -> Vec<String> {
    [
        DASHBOARD_TITLE,
        "This dashboard provides insights into Airbnb listings data.",
        "Objective:",
        "- Price Analysis: understand the factors affecting price.",
        "- Review Analysis: analyse reviews to find what drives ratings.",
        "Problem Statement:",
        "- What are the factors that affect price?",
        "- What characteristics do listings with more reviews share?",
        "This project analyses the New York City Airbnb dataset and the short-term \
         lodging market it describes. Data wrangling, exploratory analysis and \
         summary statistics give insight into listing distribution, pricing, hosts \
         and reviews.",
        "Entire home/apt listings dominate the counts, listing counts vary widely \
         across neighbourhood groups, price trends down with construction year, and \
         price correlates strongly with service fee.",
        "Analysing guest reviews for the drivers of satisfaction and preference can \
         inform targeted marketing and product improvements.",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(format!("Banner: {}", BANNER_URL)))
    .collect()
}

fn price_figures(data: &Dataset) -> Vec<DashResult<Figure>> {
    vec![
        scatter_figure(
            data,
            columns::SERVICE_FEE,
            columns::PRICE,
            ChartSpec::new(
                ChartKind::Scatter,
                "Correlation Between Price and Service Fee",
                columns::SERVICE_FEE,
                columns::PRICE,
            ),
        ),
        metrics_figure(
            data,
            columns::ROOM_TYPE,
            &[columns::PRICE, columns::NUMBER_OF_REVIEWS, columns::AVAILABILITY],
            Some(0),
            ChartSpec::new(
                ChartKind::Bar,
                "Average Price, Reviews & Availability for Each Room Type",
                "Room Type",
                "Average (Price / Num Of Reviews / Availability)",
            ),
        ),
        aggregate_figure(
            data,
            &GroupKey::pair(columns::NEIGHBOURHOOD_GROUP, columns::ROOM_TYPE),
            &Aggregation::mean(columns::PRICE),
            &Order::FirstSeen,
            None,
            ChartSpec::new(
                ChartKind::Histogram,
                "Average Price for each Room Type in Neighbourhood",
                columns::NEIGHBOURHOOD_GROUP,
                "avg of price",
            ),
        ),
        ranked_figure(
            data,
            columns::ROAD,
            &Aggregation::mean(columns::PRICE),
            5,
            true,
            ChartSpec::new(ChartKind::Bar, "Average Price over Top 5 Roads", columns::ROAD, columns::PRICE),
        ),
        ranked_figure(
            data,
            columns::ROAD,
            &Aggregation::mean(columns::PRICE),
            5,
            false,
            ChartSpec::new(ChartKind::Bar, "Average Price over 5 Least Roads", columns::ROAD, columns::PRICE),
        ),
    ]
}

fn neighbourhood_figures(data: &Dataset) -> Vec<DashResult<Figure>> {
    let by_count = Order::ByCount(columns::NEIGHBOURHOOD_GROUP.to_string());
    vec![
        aggregate_figure(
            data,
            &GroupKey::single(columns::NEIGHBOURHOOD_GROUP),
            &Aggregation::count(),
            &by_count,
            None,
            ChartSpec::new(
                ChartKind::Histogram,
                "Counts of Neighbourhood Group Uniques",
                columns::NEIGHBOURHOOD_GROUP,
                "count",
            ),
        ),
        aggregate_figure(
            data,
            &GroupKey::pair(columns::NEIGHBOURHOOD_GROUP, columns::ROOM_TYPE),
            &Aggregation::count(),
            &by_count,
            None,
            ChartSpec::new(
                ChartKind::Histogram,
                "Counts of Neighbourhood Group Across Room Type",
                columns::NEIGHBOURHOOD_GROUP,
                "count",
            ),
        ),
        aggregate_figure(
            data,
            &GroupKey::single(columns::NEIGHBOURHOOD_GROUP),
            &Aggregation::mean(columns::PRICE),
            &by_count,
            None,
            ChartSpec::new(
                ChartKind::Bar,
                "Average Price by Neighbourhood Group",
                columns::NEIGHBOURHOOD_GROUP,
                columns::PRICE,
            ),
        ),
        aggregate_figure(
            data,
            &GroupKey::pair(columns::NEIGHBOURHOOD_GROUP, columns::ROOM_TYPE),
            &Aggregation::count_of(columns::REVIEW_RATE),
            &Order::FirstSeen,
            None,
            ChartSpec::new(
                ChartKind::Histogram,
                "Review Rate Counts with Neighbourhood over Room Type",
                columns::NEIGHBOURHOOD_GROUP,
                "count of review rate number",
            ),
        ),
        map_figure(
            data,
            columns::LAT,
            columns::LONG,
            columns::ROOM_TYPE,
            "Comparing places",
        ),
    ]
}

fn review_figures(data: &Dataset) -> Vec<DashResult<Figure>> {
    [
        (columns::REVIEW_YEAR, "Last Review (Year)", "Average Reviews per Last Review Year"),
        (columns::REVIEW_MONTH, "Last Review (Month)", "Average Reviews per Last Review Month"),
        (columns::REVIEW_DAY_NAME, "Last Review (Day Name)", "Average Reviews per Last Review Day Name"),
    ]
    .iter()
    .map(|(col, x_label, title)| {
        plot_line_chart(data, col, columns::NUMBER_OF_REVIEWS, x_label, "Average Reviews", title)
    })
    .collect()
}

fn service_fee_figures(data: &Dataset) -> Vec<DashResult<Figure>> {
    vec![
        aggregate_figure(
            data,
            &GroupKey::single(columns::ROOM_TYPE),
            &Aggregation::mean(columns::SERVICE_FEE),
            &Order::FirstSeen,
            Some(1),
            ChartSpec::new(
                ChartKind::Histogram,
                "Average Service Fee with Room Type",
                "Room Type",
                "Average Service Fee",
            ),
        ),
        aggregate_figure(
            data,
            &GroupKey::pair(columns::NEIGHBOURHOOD_GROUP, columns::REVIEW_RATE),
            &Aggregation::mean(columns::SERVICE_FEE),
            &Order::FirstSeen,
            Some(1),
            ChartSpec::new(
                ChartKind::Histogram,
                "Average Service Fee with Neighbourhood Group & Review Rate",
                "Neighbourhood Group",
                "Average Service Fee",
            ),
        ),
    ]
}

fn room_type_figures(data: &Dataset) -> Vec<DashResult<Figure>> {
    vec![
        metrics_figure(
            data,
            columns::ROOM_TYPE,
            &[columns::MINIMUM_NIGHTS, columns::HOST_LISTINGS],
            Some(0),
            ChartSpec::new(
                ChartKind::Bar,
                "Average of minimum nights & calculated hosts for Each Room Type",
                "Room Type",
                "Average (Minimum Nights / Calculated hosts)",
            ),
        ),
        aggregate_figure(
            data,
            &GroupKey::single(columns::ROOM_TYPE),
            &Aggregation::mean(columns::PRICE),
            &Order::ByCount(columns::ROOM_TYPE.to_string()),
            None,
            ChartSpec::new(ChartKind::Bar, "Average Price by Room Type", columns::ROOM_TYPE, columns::PRICE),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_dataset;
    use crate::error::DashError;

    const HEADERS: [&str; 15] = [
        "price",
        "service fee",
        "room type",
        "neighbourhood group",
        "lat",
        "long",
        "number of reviews",
        "review rate number",
        "availability 365",
        "minimum nights",
        "calculated host listings count",
        "road",
        "last_review_(year)",
        "last_review_(month)",
        "last_review_(day_name)",
    ];

    fn full_dataset() -> Dataset {
        make_dataset(
            HEADERS.to_vec(),
            vec![
                vec!["966", "193", "Private room", "Brooklyn", "40.64749", "-73.97237", "9", "4", "286", "10", "6", "Church Ave", "2021", "10", "Tuesday"],
                vec!["142", "28", "Entire home/apt", "Manhattan", "40.75362", "-73.98377", "45", "4", "228", "30", "2", "W 42nd St", "2022", "5", "Saturday"],
                vec!["620", "124", "Private room", "Manhattan", "40.80902", "-73.9419", "0", "5", "352", "3", "1", "Lenox Ave", "", "", ""],
                vec!["368", "74", "Entire home/apt", "Brooklyn", "40.68514", "-73.95976", "270", "4", "322", "3", "1", "Church Ave", "2019", "7", "Friday"],
                vec!["204", "41", "Entire home/apt", "Manhattan", "40.79851", "-73.94399", "9", "3", "289", "10", "1", "Madison Ave", "2018", "11", "Monday"],
                vec!["577", "115", "Shared room", "Queens", "40.74767", "-73.975", "74", "", "374", "1", "1", "Queens Blvd", "2019", "6", "Friday"],
            ],
        )
    }

    #[test]
    fn test_every_section_builds() {
        let data = full_dataset();
        for section in Section::ALL {
            for figure in section.figures(&data) {
                assert!(figure.is_ok(), "{} failed: {:?}", section, figure.err());
            }
        }
    }

    #[test]
    fn test_chart_counts() {
        let data = full_dataset();
        let counts: Vec<usize> = Section::ALL.iter().map(|s| s.figures(&data).len()).collect();
        assert_eq!(counts, vec![0, 5, 5, 3, 2, 2]);
    }

    #[test]
    fn test_overview_text() {
        let text = Section::Overview.text();
        assert_eq!(text[0], DASHBOARD_TITLE);
        assert!(text.last().unwrap().contains("airbnb-678x381.png"));
    }

    #[test]
    fn test_price_top_roads() {
        let figures = Section::Price.figures(&full_dataset());
        let top = figures[3].as_ref().unwrap();
        assert_eq!(top.categories().len(), 5);
        assert_eq!(top.categories()[0], "Church Ave");
        assert_eq!(top.value("price", "Church Ave"), Some(667.0));
        let bottom = figures[4].as_ref().unwrap();
        assert_eq!(bottom.categories()[0], "W 42nd St");
    }

    #[test]
    fn test_neighbourhood_ordered_by_count() {
        let figures = Section::Neighbourhood.figures(&full_dataset());
        let counts = figures[0].as_ref().unwrap();
        assert_eq!(counts.categories(), &["Manhattan", "Brooklyn", "Queens"]);
        assert_eq!(counts.value("count", "Manhattan"), Some(3.0));
    }

    #[test]
    fn test_review_months_sorted_numerically() {
        let figures = Section::Review.figures(&full_dataset());
        let months = figures[1].as_ref().unwrap();
        assert_eq!(months.categories(), &["5", "6", "7", "10", "11"]);
    }

    #[test]
    fn test_missing_column_only_loses_its_chart() {
        let data = make_dataset(
            vec!["room type", "price", "minimum nights", "calculated host listings count"],
            vec![vec!["Private room", "100", "2", "1"]],
        );
        let figures = Section::RoomType.figures(&data);
        assert!(figures[0].is_ok());
        assert!(figures[1].is_ok());

        let figures = Section::Price.figures(&data);
        assert!(matches!(figures[0], Err(DashError::MissingColumn(_))));
        assert!(figures[1].is_err());
        assert!(figures[3].is_err());
    }

    #[test]
    fn test_titles_and_slugs() {
        assert_eq!(Section::ServiceFee.title(), "Service Fee Analysis");
        assert_eq!(Section::ServiceFee.slug(), "service-fee");
        assert_eq!(Section::Neighbourhood.to_string(), "Neighbourhood Group Analysis");
    }
}
