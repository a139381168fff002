//! Control panel: the two dashboard inputs and the view state they produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

use crate::config::SliderSpec;
use crate::data::{Dataset, SiteSelection};

/// Closed payload interval in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct PayloadRange {
    lo: f64,
    hi: f64,
}

impl PayloadRange {
    pub fn new(lo: f64, hi: f64) -> Result<Self, ViewError> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(ViewError::NonFinite { lo, hi });
        }
        if lo > hi {
            return Err(ViewError::InvertedRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

}

impl TryFrom<[f64; 2]> for PayloadRange {
    type Error = ViewError;

    fn try_from([lo, hi]: [f64; 2]) -> Result<Self, Self::Error> {
        PayloadRange::new(lo, hi)
    }
}

impl From<PayloadRange> for [f64; 2] {
    fn from(r: PayloadRange) -> Self {
        [r.lo, r.hi]
    }
}

/// Current dashboard selection. Replaced whole on every accepted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub site: SiteSelection,
    pub payload: PayloadRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Raw dropdown value.
    SiteSelected(String),
    PayloadRangeChanged { lo: f64, hi: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    UnknownSite(String),
    InvertedRange { lo: f64, hi: f64 },
    NonFinite { lo: f64, hi: f64 },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::UnknownSite(v) => write!(f, "'{}' is not a selectable launch site", v),
            ViewError::InvertedRange { lo, hi } => {
                write!(f, "payload range lower bound {} exceeds upper bound {}", lo, hi)
            }
            ViewError::NonFinite { lo, hi } => {
                write!(f, "payload range [{}, {}] must be finite", lo, hi)
            }
        }
    }
}

impl std::error::Error for ViewError {}

/// Owns the view state and publishes every replacement to subscribers.
#[derive(Debug)]
pub struct ControlPanel {
    slider: SliderSpec,
    default_range: PayloadRange,
    tx: watch::Sender<ViewState>,
}

impl ControlPanel {
    /// Default state: all sites, full observed payload range. An empty dataset
    /// falls back to the slider's own domain.
    pub fn new(dataset: &Dataset, slider: SliderSpec) -> Self {
        let (lo, hi) = dataset.payload_bounds().unwrap_or((slider.min, slider.max));
        let default_range = PayloadRange { lo, hi };
        let initial = ViewState { site: SiteSelection::All, payload: default_range };
        let (tx, _rx) = watch::channel(initial);
        Self { slider, default_range, tx }
    }

    pub fn slider(&self) -> SliderSpec {
        self.slider
    }

    pub fn default_range(&self) -> PayloadRange {
        self.default_range
    }

    pub fn current(&self) -> ViewState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Validate an input event and publish the resulting view state.
    /// A rejected event leaves the current state untouched.
    pub fn apply(&self, event: InputEvent) -> Result<ViewState, ViewError> {
        let change = Change::validate(event)?;
        let mut next = self.current();
        // Merge under the channel's write lock so concurrent inputs never
        // overwrite each other's field.
        self.tx.send_modify(|state| {
            match change {
                Change::Site(site) => state.site = site,
                Change::Payload(range) => state.payload = range,
            }
            next = *state;
        });
        Ok(next)
    }
}

/// A validated input event, ready to merge into the view state.
enum Change {
    Site(SiteSelection),
    Payload(PayloadRange),
}

impl Change {
    fn validate(event: InputEvent) -> Result<Self, ViewError> {
        match event {
            InputEvent::SiteSelected(value) => value
                .parse::<SiteSelection>()
                .map(Change::Site)
                .map_err(|_| ViewError::UnknownSite(value)),
            InputEvent::PayloadRangeChanged { lo, hi } => {
                PayloadRange::new(lo, hi).map(Change::Payload)
            }
        }
    }
}
