//! Page layout and its HTML rendering.

use serde::Serialize;

use crate::config::SliderSpec;
use crate::data::SiteSelection;
use crate::reconcile::{ChartId, InputId};
use crate::view::{ControlPanel, PayloadRange};

pub const PAGE_TITLE: &str = "SpaceX Launch Records Dashboard";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, Serialize)]
pub struct Heading {
    pub text: String,
    pub text_align: String,
    pub color: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dropdown {
    pub id: InputId,
    pub options: Vec<DropdownOption>,
    pub value: SiteSelection,
    pub placeholder: String,
    pub searchable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub id: InputId,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: PayloadRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Heading(Heading),
    Dropdown(Dropdown),
    Graph { id: ChartId },
    RangeSlider(RangeSlider),
}

/// Components top to bottom.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub children: Vec<Component>,
}

impl Layout {
    pub fn build(panel: &ControlPanel) -> Self {
        let options = SiteSelection::options()
            .into_iter()
            .map(|s| DropdownOption { label: s.as_str().to_string(), value: s.as_str().to_string() })
            .collect();
        let SliderSpec { min, max, step } = panel.slider();
        Layout {
            children: vec![
                Component::Heading(Heading {
                    text: PAGE_TITLE.to_string(),
                    text_align: "center".to_string(),
                    color: "#503D36".to_string(),
                    font_size: 40,
                }),
                Component::Dropdown(Dropdown {
                    id: InputId::SiteDropdown,
                    options,
                    value: SiteSelection::All,
                    placeholder: "Select a Launch Site".to_string(),
                    searchable: true,
                }),
                Component::Graph { id: ChartId::SuccessPie },
                Component::RangeSlider(RangeSlider {
                    id: InputId::PayloadSlider,
                    label: "Payload range (Kg):".to_string(),
                    min,
                    max,
                    step,
                    value: panel.default_range(),
                }),
                Component::Graph { id: ChartId::PayloadScatter },
            ],
        }
    }

    pub fn render_html(&self) -> String {
        let mut body = String::new();
        for child in &self.children {
            match child {
                Component::Heading(h) => body.push_str(&format!(
                    "<h1 style=\"text-align:{};color:{};font-size:{}px\">{}</h1>\n",
                    h.text_align,
                    h.color,
                    h.font_size,
                    escape(&h.text)
                )),
                Component::Dropdown(d) => {
                    let mut opts = String::new();
                    for o in &d.options {
                        let selected = if o.value == d.value.as_str() { " selected" } else { "" };
                        opts.push_str(&format!(
                            "<option value=\"{}\"{}>{}</option>",
                            escape(&o.value),
                            selected,
                            escape(&o.label)
                        ));
                    }
                    body.push_str(&format!(
                        "<select id=\"{}\" title=\"{}\">{}</select>\n<br>\n",
                        d.id.element_id(),
                        escape(&d.placeholder),
                        opts
                    ));
                }
                Component::Graph { id } => body.push_str(&format!(
                    "<div><div id=\"{}\" class=\"graph\"></div></div>\n<br>\n",
                    id.element_id()
                )),
                Component::RangeSlider(s) => {
                    let id = s.id.element_id();
                    body.push_str(&format!("<p>{}</p>\n", escape(&s.label)));
                    body.push_str(&format!(
                        "<div id=\"{id}\">\
                         <input id=\"{id}-lo\" type=\"range\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{lo}\">\
                         <input id=\"{id}-hi\" type=\"range\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{hi}\">\
                         <span id=\"{id}-value\">{lo} – {hi}</span></div>\n",
                        id = id,
                        min = s.min,
                        max = s.max,
                        step = s.step,
                        lo = s.value.lo(),
                        hi = s.value.hi(),
                    ));
                }
            }
        }
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <script src=\"{cdn}\"></script>\n</head>\n<body>\n{body}<script>\n{script}</script>\n</body>\n</html>\n",
            title = escape(PAGE_TITLE),
            cdn = PLOTLY_CDN,
            body = body,
            script = CLIENT_SCRIPT,
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// Posts each input change and redraws whatever charts come back.
const CLIENT_SCRIPT: &str = r#"
function draw(charts) {
  for (const c of charts) {
    Plotly.react(c.id, c.plotly.data, c.plotly.layout);
  }
}
async function send(input, value) {
  const res = await fetch('/api/input', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ input: input, value: value }),
  });
  if (!res.ok) { console.warn(await res.text()); return; }
  const out = await res.json();
  draw(out.charts);
}
document.getElementById('site-dropdown').addEventListener('change', (e) => {
  send('site-dropdown', e.target.value);
});
for (const end of ['lo', 'hi']) {
  document.getElementById('payload-slider-' + end).addEventListener('change', () => {
    let lo = Number(document.getElementById('payload-slider-lo').value);
    let hi = Number(document.getElementById('payload-slider-hi').value);
    if (lo > hi) { [lo, hi] = [hi, lo]; }
    document.getElementById('payload-slider-value').textContent = lo + ' – ' + hi;
    send('payload-slider', [lo, hi]);
  });
}
fetch('/api/charts').then((r) => r.json()).then(draw);
"#;
