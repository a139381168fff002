use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dropdown value meaning "no site filter".
pub const ALL_SITES: &str = "All sites";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaunchSite {
    #[serde(rename = "CCAFS LC-40")]
    CcafsLc40,
    #[serde(rename = "CCAFS SLC-40")]
    CcafsSlc40,
    #[serde(rename = "KSC LC-39A")]
    KscLc39a,
    #[serde(rename = "VAFB SLC-4E")]
    VafbSlc4e,
}

impl LaunchSite {
    /// Dropdown order.
    pub const ALL: [LaunchSite; 4] = [
        LaunchSite::CcafsSlc40,
        LaunchSite::KscLc39a,
        LaunchSite::VafbSlc4e,
        LaunchSite::CcafsLc40,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchSite::CcafsLc40 => "CCAFS LC-40",
            LaunchSite::CcafsSlc40 => "CCAFS SLC-40",
            LaunchSite::KscLc39a => "KSC LC-39A",
            LaunchSite::VafbSlc4e => "VAFB SLC-4E",
        }
    }
}

impl fmt::Display for LaunchSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSite(pub String);

impl fmt::Display for UnknownSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown launch site '{}'", self.0)
    }
}

impl std::error::Error for UnknownSite {}

impl FromStr for LaunchSite {
    type Err = UnknownSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LaunchSite::ALL
            .into_iter()
            .find(|site| site.as_str() == s)
            .ok_or_else(|| UnknownSite(s.to_string()))
    }
}

/// Site filter: the "All sites" sentinel or one concrete site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SiteSelection {
    #[default]
    All,
    Site(LaunchSite),
}

impl SiteSelection {
    pub fn matches(&self, site: LaunchSite) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(selected) => *selected == site,
        }
    }

    /// Wire value, as the dropdown sends it.
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteSelection::All => ALL_SITES,
            SiteSelection::Site(site) => site.as_str(),
        }
    }

    /// Wording used in chart titles.
    pub fn title_label(&self) -> &'static str {
        match self {
            SiteSelection::All => "All Sites",
            SiteSelection::Site(site) => site.as_str(),
        }
    }

    /// Every value the dropdown offers, sentinel first.
    pub fn options() -> Vec<SiteSelection> {
        std::iter::once(SiteSelection::All)
            .chain(LaunchSite::ALL.into_iter().map(SiteSelection::Site))
            .collect()
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteSelection {
    type Err = UnknownSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == ALL_SITES {
            return Ok(SiteSelection::All);
        }
        s.parse().map(SiteSelection::Site)
    }
}

impl Serialize for SiteSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SiteSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_site() {
        for site in LaunchSite::ALL {
            assert_eq!(site.as_str().parse::<LaunchSite>().unwrap(), site);
        }
    }

    #[test]
    fn rejects_unknown_site() {
        let err = "Boca Chica".parse::<LaunchSite>().unwrap_err();
        assert_eq!(err, UnknownSite("Boca Chica".to_string()));
    }

    #[test]
    fn sentinel_round_trips_through_wire_value() {
        assert_eq!(ALL_SITES.parse::<SiteSelection>().unwrap(), SiteSelection::All);
        assert_eq!(SiteSelection::All.to_string(), "All sites");
        assert_eq!(SiteSelection::All.title_label(), "All Sites");
    }

    #[test]
    fn selection_filters_by_site() {
        let sel = SiteSelection::Site(LaunchSite::KscLc39a);
        assert!(sel.matches(LaunchSite::KscLc39a));
        assert!(!sel.matches(LaunchSite::VafbSlc4e));
        assert!(SiteSelection::All.matches(LaunchSite::VafbSlc4e));
    }

    #[test]
    fn options_list_sentinel_then_sites() {
        let opts = SiteSelection::options();
        assert_eq!(opts.len(), 5);
        assert_eq!(opts[0], SiteSelection::All);
        assert_eq!(opts[1], SiteSelection::Site(LaunchSite::CcafsSlc40));
    }

    #[test]
    fn selection_serializes_as_label() {
        let v = serde_json::to_value(SiteSelection::Site(LaunchSite::VafbSlc4e)).unwrap();
        assert_eq!(v, "VAFB SLC-4E");
        let back: SiteSelection = serde_json::from_value(v).unwrap();
        assert_eq!(back, SiteSelection::Site(LaunchSite::VafbSlc4e));
    }
}
