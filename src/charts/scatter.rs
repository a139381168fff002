use serde::Serialize;

use crate::data::{Dataset, LaunchRecord};
use crate::view::ViewState;

pub const X_LABEL: &str = "Payload Mass (kg)";
pub const Y_LABEL: &str = "class";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: u8,
    pub flight_number: u32,
}

/// One color group: every point sharing a booster version category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub category: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Visible x window. Points outside it stay in `series`.
    pub x_range: [f64; 2],
    pub series: Vec<ScatterSeries>,
}

impl ScatterChart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Payload vs. outcome scatter.
///
/// Rows are filtered by site only. The payload range sets the visible x
/// window afterwards and never removes points.
pub fn payload_scatter(dataset: &Dataset, view: &ViewState) -> ScatterChart {
    let mut series: Vec<ScatterSeries> = Vec::new();
    for row in dataset.filter_site(view.site) {
        let point = to_point(row);
        match series
            .iter_mut()
            .find(|s| s.category == row.booster_version_category)
        {
            Some(s) => s.points.push(point),
            None => series.push(ScatterSeries {
                category: row.booster_version_category.clone(),
                points: vec![point],
            }),
        }
    }

    ScatterChart {
        title: format!(
            "Correlation between Payload Mass and Success Rate for {}",
            view.site.title_label()
        ),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        x_range: [view.payload.lo(), view.payload.hi()],
        series,
    }
}

fn to_point(row: &LaunchRecord) -> ScatterPoint {
    ScatterPoint {
        x: row.payload_mass_kg,
        y: row.outcome.class(),
        flight_number: row.flight_number,
    }
}
