use crate::charts::PieAggregate;

/// Range slider domain shown under the pie chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderSpec {
    fn default() -> Self {
        Self { min: 0.0, max: 10_000.0, step: 1_000.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub bind_addr: String,
    pub pie_aggregate: PieAggregate,
    pub slider: SliderSpec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: "spacex_launch_dash.csv".to_string(),
            bind_addr: "127.0.0.1:8050".to_string(),
            pie_aggregate: PieAggregate::Count,
            slider: SliderSpec::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            data_path: lookup("DATA_PATH").unwrap_or(d.data_path),
            bind_addr: lookup("BIND_ADDR").unwrap_or(d.bind_addr),
            pie_aggregate: lookup("PIE_AGGREGATE").and_then(|v| v.parse().ok()).unwrap_or(d.pie_aggregate),
            slider: SliderSpec {
                min: lookup("SLIDER_MIN").and_then(|v| v.parse().ok()).unwrap_or(d.slider.min),
                max: lookup("SLIDER_MAX").and_then(|v| v.parse().ok()).unwrap_or(d.slider.max),
                step: lookup("SLIDER_STEP").and_then(|v| v.parse().ok()).unwrap_or(d.slider.step),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        let cfg = Config::default();
        assert_eq!(cfg.data_path, "spacex_launch_dash.csv");
        assert_eq!(cfg.bind_addr, "127.0.0.1:8050");
        assert_eq!(cfg.pie_aggregate, PieAggregate::Count);
        assert_eq!(cfg.slider, SliderSpec { min: 0.0, max: 10_000.0, step: 1_000.0 });
    }

    #[test]
    fn overrides_parse_and_garbage_falls_back() {
        let vars: HashMap<&str, &str> = [
            ("PIE_AGGREGATE", "sum"),
            ("SLIDER_STEP", "500"),
            ("SLIDER_MAX", "lots"),
            ("DATA_PATH", "/data/launches.csv"),
        ]
        .into_iter()
        .collect();
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.pie_aggregate, PieAggregate::Sum);
        assert_eq!(cfg.slider.step, 500.0);
        assert_eq!(cfg.slider.max, 10_000.0);
        assert_eq!(cfg.slider.min, 0.0);
        assert_eq!(cfg.data_path, "/data/launches.csv");
        assert_eq!(cfg.bind_addr, "127.0.0.1:8050");

        let bad = Config::from_lookup(|k| (k == "PIE_AGGREGATE").then(|| "median".to_string()));
        assert_eq!(bad.pie_aggregate, PieAggregate::Count);
    }
}
