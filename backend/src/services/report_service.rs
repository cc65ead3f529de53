use serde_json::{json, Value};

use crate::models::{AnalysisForm, AnalysisResponse, ChartSeries, TotalReturn};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Stock Analysis</title>
    <script src="{{plotly_src}}"></script>
</head>
<body>
    <h1>Stock Analysis</h1>
    <form method="POST" action="/">
        <label for="tickers">Ticker Symbols (comma-separated):</label>
        <input type="text" id="tickers" name="tickers" placeholder="e.g., AAPL, MSFT" value="{{tickers}}"><br><br>
        <label for="start_date">Start Date:</label>
        <input type="date" id="start_date" name="start_date" value="{{start_date}}"><br><br>
        <label for="end_date">End Date:</label>
        <input type="date" id="end_date" name="end_date" value="{{end_date}}"><br><br>
        <input type="submit" value="Analyze">
    </form>
{{error}}
{{results}}
</body>
</html>
"#;

/// Text shown in the results list for one ticker.
pub fn format_total_return(total_return: &TotalReturn) -> String {
    match total_return {
        TotalReturn::Percent(pct) => format!("{:.2}%", pct),
        TotalReturn::Unavailable => "Data not available".to_string(),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plotly traces: close, SMA 50 (dashed) and SMA 200 (dotted) per ticker.
/// Undefined averages serialize as `null`, which plotly draws as a gap.
pub fn chart_traces(chart: &[ChartSeries]) -> Value {
    let traces: Vec<Value> = chart
        .iter()
        .flat_map(|s| {
            [
                json!({
                    "x": s.dates,
                    "y": s.close,
                    "mode": "lines",
                    "name": format!("{} Close", s.ticker),
                }),
                json!({
                    "x": s.dates,
                    "y": s.sma_50,
                    "mode": "lines",
                    "name": format!("{} SMA 50", s.ticker),
                    "line": { "dash": "dash" },
                }),
                json!({
                    "x": s.dates,
                    "y": s.sma_200,
                    "mode": "lines",
                    "name": format!("{} SMA 200", s.ticker),
                    "line": { "dash": "dot" },
                }),
            ]
        })
        .collect();
    Value::Array(traces)
}

fn chart_layout() -> Value {
    json!({
        "title": { "text": "Stock Analysis" },
        "xaxis": { "title": { "text": "Date" } },
        "yaxis": { "title": { "text": "Price (USD)" } },
        "template": "plotly_dark",
    })
}

// JSON is embedded in a <script> block; "</" would close it early.
fn script_safe_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn build_results(response: &AnalysisResponse) -> String {
    let mut html = String::new();
    html.push_str("    <h2>Analysis Results</h2>\n    <ul>\n");
    for result in &response.results {
        html.push_str(&format!(
            "        <li>{}: {}</li>\n",
            escape_html(&result.ticker),
            format_total_return(&result.total_return)
        ));
    }
    html.push_str("    </ul>\n");

    if !response.chart.is_empty() {
        html.push_str("    <div id=\"chart\"></div>\n");
        html.push_str(&format!(
            "    <script>Plotly.newPlot(\"chart\", {}, {});</script>\n",
            script_safe_json(&chart_traces(&response.chart)),
            script_safe_json(&chart_layout())
        ));
    }
    html
}

/// Render the form page, optionally with an error message or analysis results.
pub fn render_page(
    form: &AnalysisForm,
    response: Option<&AnalysisResponse>,
    error: Option<&str>,
) -> String {
    let error_html = error
        .map(|msg| format!("    <p class=\"error\">{}</p>", escape_html(msg)))
        .unwrap_or_default();
    let results_html = response.map(build_results).unwrap_or_default();

    PAGE_TEMPLATE
        .replace("{{plotly_src}}", PLOTLY_CDN)
        .replace("{{tickers}}", &escape_html(&form.tickers))
        .replace("{{start_date}}", &escape_html(&form.start_date))
        .replace("{{end_date}}", &escape_html(&form.end_date))
        .replace("{{error}}", &error_html)
        .replace("{{results}}", &results_html)
}
