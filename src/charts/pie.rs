use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::group_in_order;
use crate::data::{Dataset, LaunchRecord, SiteSelection};

/// How slice values are computed from the grouped rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieAggregate {
    /// Number of launches in the group.
    #[default]
    Count,
    /// Sum of `class` per site, or of `Flight Number` per outcome.
    Sum,
}

impl FromStr for PieAggregate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(PieAggregate::Count),
            "sum" => Ok(PieAggregate::Sum),
            other => Err(format!("unknown pie aggregate '{}'", other)),
        }
    }
}

impl fmt::Display for PieAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieAggregate::Count => f.write_str("count"),
            PieAggregate::Sum => f.write_str("sum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

/// Launch outcome pie for the selected site. Payload range is not consulted.
///
/// With the sentinel selected there is one slice per site present in the
/// dataset; otherwise one slice per outcome class among that site's rows.
pub fn success_pie(dataset: &Dataset, site: SiteSelection, aggregate: PieAggregate) -> PieChart {
    let count = |_: &LaunchRecord| 1.0;
    match site {
        SiteSelection::All => {
            let class = |r: &LaunchRecord| f64::from(r.outcome.class());
            let groups = match aggregate {
                PieAggregate::Count => group_in_order(dataset.rows(), |r| r.launch_site, count),
                PieAggregate::Sum => group_in_order(dataset.rows(), |r| r.launch_site, class),
            };
            PieChart {
                title: "Total Successful Launches By Sites".to_string(),
                slices: groups
                    .into_iter()
                    .map(|(site, value)| PieSlice { label: site.as_str().to_string(), value })
                    .collect(),
            }
        }
        SiteSelection::Site(selected) => {
            let rows = dataset.filter_site(site);
            let flight = |r: &LaunchRecord| f64::from(r.flight_number);
            let groups = match aggregate {
                PieAggregate::Count => group_in_order(rows, |r| r.outcome, count),
                PieAggregate::Sum => group_in_order(rows, |r| r.outcome, flight),
            };
            PieChart {
                title: format!("Total Successful Launches at {}", selected),
                slices: groups
                    .into_iter()
                    .map(|(outcome, value)| PieSlice { label: outcome.label().to_string(), value })
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LaunchSite, Outcome};

    fn rec(flight: u32, site: LaunchSite, payload: f64, outcome: Outcome) -> LaunchRecord {
        LaunchRecord {
            flight_number: flight,
            launch_site: site,
            payload_mass_kg: payload,
            outcome,
            booster_version_category: "FT".to_string(),
        }
    }

    fn three_rows() -> Dataset {
        Dataset::new(
            "mem",
            vec![
                rec(10, LaunchSite::CcafsSlc40, 500.0, Outcome::Success),
                rec(20, LaunchSite::CcafsSlc40, 9000.0, Outcome::Failure),
                rec(30, LaunchSite::KscLc39a, 3000.0, Outcome::Success),
            ],
        )
    }

    fn value_of(chart: &PieChart, label: &str) -> f64 {
        chart.slices.iter().find(|s| s.label == label).map(|s| s.value).unwrap()
    }

    #[test]
    fn all_sites_counts_launches_per_site() {
        let chart = success_pie(&three_rows(), SiteSelection::All, PieAggregate::Count);
        assert_eq!(chart.title, "Total Successful Launches By Sites");
        assert_eq!(chart.slices.len(), 2);
        assert_eq!(value_of(&chart, "CCAFS SLC-40"), 2.0);
        assert_eq!(value_of(&chart, "KSC LC-39A"), 1.0);
    }

    #[test]
    fn single_site_splits_by_outcome() {
        let site = SiteSelection::Site(LaunchSite::CcafsSlc40);
        let chart = success_pie(&three_rows(), site, PieAggregate::Count);
        assert_eq!(chart.title, "Total Successful Launches at CCAFS SLC-40");
        assert_eq!(chart.slices.len(), 2);
        assert_eq!(value_of(&chart, "0"), 1.0);
        assert_eq!(value_of(&chart, "1"), 1.0);
        assert_eq!(chart.total(), 2.0);
    }

    #[test]
    fn sum_aggregate_uses_class_and_flight_number() {
        let ds = three_rows();
        let all = success_pie(&ds, SiteSelection::All, PieAggregate::Sum);
        assert_eq!(value_of(&all, "CCAFS SLC-40"), 1.0);
        assert_eq!(value_of(&all, "KSC LC-39A"), 1.0);

        let site = success_pie(&ds, SiteSelection::Site(LaunchSite::CcafsSlc40), PieAggregate::Sum);
        assert_eq!(value_of(&site, "1"), 10.0);
        assert_eq!(value_of(&site, "0"), 20.0);
    }

    #[test]
    fn site_without_rows_yields_empty_pie() {
        let site = SiteSelection::Site(LaunchSite::VafbSlc4e);
        let chart = success_pie(&three_rows(), site, PieAggregate::Count);
        assert!(chart.slices.is_empty());
        assert_eq!(chart.title, "Total Successful Launches at VAFB SLC-4E");
    }

    #[test]
    fn slice_count_matches_distinct_outcomes_for_every_site() {
        let ds = three_rows();
        for site in LaunchSite::ALL {
            let rows: Vec<_> = ds.filter_site(SiteSelection::Site(site)).collect();
            let mut outcomes: Vec<Outcome> = rows.iter().map(|r| r.outcome).collect();
            outcomes.sort();
            outcomes.dedup();
            let chart = success_pie(&ds, SiteSelection::Site(site), PieAggregate::Count);
            assert_eq!(chart.slices.len(), outcomes.len());
            assert_eq!(chart.total(), rows.len() as f64);
        }
    }

    #[test]
    fn aggregate_parses_from_config_strings() {
        assert_eq!("SUM".parse::<PieAggregate>().unwrap(), PieAggregate::Sum);
        assert_eq!("count".parse::<PieAggregate>().unwrap(), PieAggregate::Count);
        assert!("mean".parse::<PieAggregate>().is_err());
    }
}
