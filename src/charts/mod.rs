//! Chart specifications.
//!
//! Both chart functions are pure: they read the dataset and a view state and
//! return a declarative figure. Rendering is left to Plotly.js in the browser;
//! [`Figure::to_plotly`] produces the figure object it expects.

mod pie;
mod plotly;
mod scatter;

pub use pie::{success_pie, PieAggregate, PieChart, PieSlice};
pub use scatter::{payload_scatter, ScatterChart, ScatterPoint, ScatterSeries};

use crate::data::LaunchRecord;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Figure {
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl Figure {
    pub fn title(&self) -> &str {
        match self {
            Figure::Pie(p) => &p.title,
            Figure::Scatter(s) => &s.title,
        }
    }

    /// Slices for a pie, points for a scatter.
    pub fn item_count(&self) -> usize {
        match self {
            Figure::Pie(p) => p.slices.len(),
            Figure::Scatter(s) => s.point_count(),
        }
    }

    pub fn to_plotly(&self) -> Value {
        match self {
            Figure::Pie(p) => plotly::pie_figure(p),
            Figure::Scatter(s) => plotly::scatter_figure(s),
        }
    }
}

/// Groups rows by `key` in first-appearance order, folding `value` per group.
pub(crate) fn group_in_order<'a, K, I>(
    rows: I,
    key: impl Fn(&LaunchRecord) -> K,
    value: impl Fn(&LaunchRecord) -> f64,
) -> Vec<(K, f64)>
where
    K: PartialEq,
    I: IntoIterator<Item = &'a LaunchRecord>,
{
    let mut groups: Vec<(K, f64)> = Vec::new();
    for row in rows {
        let k = key(row);
        let v = value(row);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, total)) => *total += v,
            None => groups.push((k, v)),
        }
    }
    groups
}
