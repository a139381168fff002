//! Input → chart wiring.
//!
//! Each chart declares the inputs it depends on. When an input changes, only
//! the charts that list it are re-rendered.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::charts::{payload_scatter, success_pie, Figure, PieAggregate};
use crate::data::Dataset;
use crate::logging::{log_render, v_str, ProfileScope};
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputId {
    #[serde(rename = "site-dropdown")]
    SiteDropdown,
    #[serde(rename = "payload-slider")]
    PayloadSlider,
}

impl InputId {
    pub fn element_id(&self) -> &'static str {
        match self {
            InputId::SiteDropdown => "site-dropdown",
            InputId::PayloadSlider => "payload-slider",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartId {
    #[serde(rename = "success-pie-chart")]
    SuccessPie,
    #[serde(rename = "success-payload-scatter-chart")]
    PayloadScatter,
}

impl ChartId {
    pub const ALL: [ChartId; 2] = [ChartId::SuccessPie, ChartId::PayloadScatter];

    pub fn element_id(&self) -> &'static str {
        match self {
            ChartId::SuccessPie => "success-pie-chart",
            ChartId::PayloadScatter => "success-payload-scatter-chart",
        }
    }

    pub fn inputs(&self) -> &'static [InputId] {
        match self {
            ChartId::SuccessPie => &[InputId::SiteDropdown],
            ChartId::PayloadScatter => &[InputId::SiteDropdown, InputId::PayloadSlider],
        }
    }

    pub fn depends_on(&self, input: InputId) -> bool {
        self.inputs().contains(&input)
    }
}

impl FromStr for ChartId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartId::ALL
            .into_iter()
            .find(|c| c.element_id() == s)
            .ok_or_else(|| format!("unknown chart '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub id: ChartId,
    pub figure: Figure,
    pub plotly: Value,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    dataset: Arc<Dataset>,
    pie_aggregate: PieAggregate,
}

impl Reconciler {
    pub fn new(dataset: Arc<Dataset>, pie_aggregate: PieAggregate) -> Self {
        Self { dataset, pie_aggregate }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn render(&self, chart: ChartId, view: &ViewState) -> RenderedChart {
        let _scope = ProfileScope::with_context("render", &[("chart", v_str(chart.element_id()))]);
        let figure = match chart {
            ChartId::SuccessPie => Figure::Pie(success_pie(&self.dataset, view.site, self.pie_aggregate)),
            ChartId::PayloadScatter => Figure::Scatter(payload_scatter(&self.dataset, view)),
        };
        log_render(chart.element_id(), figure.title(), figure.item_count());
        RenderedChart { id: chart, plotly: figure.to_plotly(), figure }
    }

    /// Charts that depend on `input`, in page order.
    pub fn affected(input: InputId) -> Vec<ChartId> {
        ChartId::ALL.into_iter().filter(|c| c.depends_on(input)).collect()
    }

    /// Re-render every chart that depends on `input`.
    pub fn reconcile(&self, input: InputId, view: &ViewState) -> Vec<RenderedChart> {
        Self::affected(input)
            .into_iter()
            .map(|chart| self.render(chart, view))
            .collect()
    }

    pub fn render_all(&self, view: &ViewState) -> Vec<RenderedChart> {
        ChartId::ALL.into_iter().map(|chart| self.render(chart, view)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LaunchRecord, LaunchSite, Outcome, SiteSelection};
    use crate::view::PayloadRange;

    fn reconciler() -> Reconciler {
        let rec = |site, payload| LaunchRecord {
            flight_number: 3,
            launch_site: site,
            payload_mass_kg: payload,
            outcome: Outcome::Success,
            booster_version_category: "B5".to_string(),
        };
        let ds = Dataset::new(
            "mem",
            vec![rec(LaunchSite::CcafsLc40, 100.0), rec(LaunchSite::VafbSlc4e, 200.0)],
        );
        Reconciler::new(Arc::new(ds), PieAggregate::Count)
    }

    fn view() -> ViewState {
        ViewState { site: SiteSelection::All, payload: PayloadRange::new(0.0, 10_000.0).unwrap() }
    }

    #[test]
    fn slider_only_touches_scatter() {
        assert_eq!(Reconciler::affected(InputId::PayloadSlider), vec![ChartId::PayloadScatter]);
        assert_eq!(
            Reconciler::affected(InputId::SiteDropdown),
            vec![ChartId::SuccessPie, ChartId::PayloadScatter]
        );
    }

    #[test]
    fn reconcile_renders_dependents() {
        let r = reconciler();
        let out = r.reconcile(InputId::PayloadSlider, &view());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, ChartId::PayloadScatter);
        assert_eq!(out[0].figure.item_count(), 2);
    }

    #[test]
    fn sentinel_pie_has_one_slice_per_site() {
        let r = reconciler();
        let pie = r.render(ChartId::SuccessPie, &view());
        assert_eq!(pie.figure.item_count(), r.dataset().sites().len());
        assert_eq!(pie.plotly["data"][0]["type"], "pie");
    }

    #[test]
    fn chart_ids_parse_from_element_ids() {
        assert_eq!("success-pie-chart".parse::<ChartId>().unwrap(), ChartId::SuccessPie);
        assert!("nope".parse::<ChartId>().is_err());
        let v = serde_json::to_value(ChartId::PayloadScatter).unwrap();
        assert_eq!(v, "success-payload-scatter-chart");
    }
}
