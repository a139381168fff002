use serde_json::{json, Value};

use super::{PieChart, ScatterChart};

pub(super) fn pie_figure(chart: &PieChart) -> Value {
    let labels: Vec<&str> = chart.slices.iter().map(|s| s.label.as_str()).collect();
    let values: Vec<f64> = chart.slices.iter().map(|s| s.value).collect();
    json!({
        "data": [{
            "type": "pie",
            "labels": labels,
            "values": values,
        }],
        "layout": {
            "title": { "text": chart.title },
            "legend": { "tracegroupgap": 0 },
        },
    })
}

pub(super) fn scatter_figure(chart: &ScatterChart) -> Value {
    let traces: Vec<Value> = chart
        .series
        .iter()
        .map(|s| {
            let x: Vec<f64> = s.points.iter().map(|p| p.x).collect();
            let y: Vec<u8> = s.points.iter().map(|p| p.y).collect();
            let text: Vec<String> = s
                .points
                .iter()
                .map(|p| format!("Flight {}", p.flight_number))
                .collect();
            json!({
                "type": "scatter",
                "mode": "markers",
                "name": s.category,
                "legendgroup": s.category,
                "x": x,
                "y": y,
                "text": text,
            })
        })
        .collect();
    json!({
        "data": traces,
        "layout": {
            "title": { "text": chart.title },
            "xaxis": { "title": { "text": chart.x_label }, "range": chart.x_range },
            "yaxis": { "title": { "text": chart.y_label } },
            "legend": { "title": { "text": "Booster Version Category" } },
        },
    })
}
