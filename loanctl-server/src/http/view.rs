//! Server-rendered dashboard page
//!
//! Sidebar with upload and filter; main column with preview, filtered
//! table, charts and the prediction form.

use std::fmt::Write;

use uuid::Uuid;

use loanctl_core::dataset::{Cell, LoanDataset};
use loanctl_core::svg::escape;
use loanctl_core::{ChartSet, CreditFilter};

use super::extractors::DashboardQuery;
use crate::state::PredictionOutcome;

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; background-color: #f9fafc; color: #262730; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 280px; padding: 24px; background-color: #e8f0fe; }
.main { flex: 1; padding: 24px 48px; overflow-x: auto; }
h1, h2, h3 { color: #0a66c2; }
table { border-collapse: collapse; margin-bottom: 16px; font-size: 14px; }
th, td { border: 1px solid #d0d7de; padding: 4px 8px; text-align: right; }
th { background: #f0f2f6; }
.msg { padding: 12px 16px; border-radius: 6px; margin: 8px 0; }
.info { background: #e8f0fe; color: #0a3069; }
.success { background: #dafbe1; color: #116329; }
.error { background: #ffebe9; color: #82071e; }
.warning { background: #fff8c5; color: #7d4e00; }
label { display: block; margin: 8px 0 4px; }
.chart { margin-bottom: 24px; }
"#;

/// Everything the dashboard needs to render one response.
#[derive(Debug, Default)]
pub struct DashboardView {
    pub dataset: Option<DatasetPanel>,
    pub outcome: Option<PredictionOutcome>,
    pub error: Option<String>,
    pub form: PredictFormValues,
}

/// Uploaded dataset section.
#[derive(Debug)]
pub struct DatasetPanel {
    pub id: Uuid,
    pub name: String,
    pub preview: LoanDataset,
    /// Filter section, or why it could not be built
    pub filtered: Result<FilteredPanel, String>,
}

#[derive(Debug)]
pub struct FilteredPanel {
    pub options: Vec<Cell>,
    pub filter: CreditFilter,
    /// Whether the selection came from the user rather than the default
    pub explicit: bool,
    pub data: LoanDataset,
    pub charts: ChartSet,
}

impl FilteredPanel {
    fn query(&self, dataset: Uuid) -> DashboardQuery {
        DashboardQuery {
            dataset: Some(dataset),
            selection: self
                .explicit
                .then(|| self.filter.selected().iter().map(ToString::to_string).collect()),
        }
    }
}

/// Values to refill the prediction form with.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictFormValues {
    pub income: String,
    pub loan_amount: String,
    pub credit_history: u8,
}

impl Default for PredictFormValues {
    fn default() -> Self {
        Self {
            income: "0".to_string(),
            loan_amount: "0".to_string(),
            credit_history: 0,
        }
    }
}

fn message(out: &mut String, class: &str, text: &str) {
    let _ = write!(out, r#"<div class="msg {}">{}</div>"#, class, escape(text));
}

/// Render a dataset as an HTML table.
pub fn render_table(out: &mut String, dataset: &LoanDataset) {
    out.push_str("<table><thead><tr><th></th>");
    for header in dataset.headers() {
        let _ = write!(out, "<th>{}</th>", escape(header));
    }
    out.push_str("</tr></thead><tbody>");
    for (i, row) in dataset.rows().iter().enumerate() {
        let _ = write!(out, "<tr><th>{}</th>", i);
        for cell in row {
            match cell {
                Cell::Empty => out.push_str("<td><em>None</em></td>"),
                other => {
                    let _ = write!(out, "<td>{}</td>", escape(&other.to_string()));
                }
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn render_sidebar(out: &mut String, view: &DashboardView) {
    out.push_str(r#"<aside class="sidebar"><h2>Upload Loan Data (CSV)</h2>"#);
    out.push_str(
        r#"<form method="post" action="/upload" enctype="multipart/form-data">
<label for="file">Choose a file</label>
<input type="file" id="file" name="file" accept=".csv,text/csv" required>
<button type="submit">Upload</button>
</form>"#,
    );

    if let Some(DatasetPanel {
        id,
        filtered: Ok(panel),
        ..
    }) = &view.dataset
    {
        out.push_str("<h3>Filter Data</h3>");
        let _ = write!(
            out,
            r#"<form method="get" action="/"><input type="hidden" name="dataset" value="{}"><input type="hidden" name="filter" value="1"><label>Select Credit History:</label>"#,
            id
        );
        for option in &panel.options {
            let value = escape(&option.to_string());
            let checked = if panel.filter.contains(option) { " checked" } else { "" };
            let _ = write!(
                out,
                r#"<label><input type="checkbox" name="credit_history" value="{value}"{checked}> {value}</label>"#,
            );
        }
        out.push_str(r#"<button type="submit">Apply</button></form>"#);
    }

    out.push_str("</aside>");
}

fn render_dataset(out: &mut String, panel: &DatasetPanel) {
    let _ = write!(
        out,
        "<h3>Uploaded Data Preview:</h3><p><code>{}</code></p>",
        escape(&panel.name)
    );
    render_table(out, &panel.preview);

    let filtered = match &panel.filtered {
        Ok(filtered) => filtered,
        Err(reason) => {
            message(out, "error", reason);
            return;
        }
    };

    let _ = write!(
        out,
        "<h3>Filtered Data</h3><p>{} rows</p>",
        filtered.data.len()
    );
    render_table(out, &filtered.data);

    out.push_str("<h2>Data Visualization</h2>");
    let query = filtered.query(panel.id).to_query_string();
    for kind in filtered.charts.available() {
        let _ = write!(
            out,
            r#"<div class="chart"><h3>{title}</h3><img src="/charts/{id}/{slug}.svg?{query}" alt="{title}" width="640" height="400"></div>"#,
            title = escape(kind.title()),
            id = panel.id,
            slug = kind.slug(),
            query = escape(&query),
        );
    }
}

fn render_outcome(out: &mut String, outcome: &PredictionOutcome) {
    let p = &outcome.prediction;
    if p.verdict.is_approved() {
        message(out, "success", p.headline());
        message(out, "info", &p.reason());
    } else {
        message(out, "error", p.headline());
        message(out, "warning", &p.reason());
    }
    match &outcome.saved {
        Ok(_) => message(out, "success", "Data saved successfully to the database!"),
        Err(e) => message(out, "error", e),
    }
}

fn render_predict_form(out: &mut String, view: &DashboardView) {
    out.push_str("<h2>Predict Loan Approval</h2>");
    out.push_str(r#"<form method="post" action="/predict">"#);
    if let Some(panel) = &view.dataset {
        let _ = write!(
            out,
            r#"<input type="hidden" name="dataset" value="{}">"#,
            panel.id
        );
        if let Ok(filtered) = &panel.filtered {
            if filtered.explicit {
                let joined: Vec<String> = filtered
                    .filter
                    .selected()
                    .iter()
                    .map(|v| urlencoding::encode(&v.to_string()).into_owned())
                    .collect();
                let _ = write!(
                    out,
                    r#"<input type="hidden" name="selection" value="{}">"#,
                    escape(&joined.join(","))
                );
            }
        }
    }
    let _ = write!(
        out,
        r#"<label for="income">Applicant Income</label><input type="number" id="income" name="income" min="0" step="any" value="{income}">
<label for="loan_amount">Loan Amount</label><input type="number" id="loan_amount" name="loan_amount" min="0" step="any" value="{loan}">
<label for="credit_history">Credit History</label><select id="credit_history" name="credit_history">"#,
        income = escape(&view.form.income),
        loan = escape(&view.form.loan_amount),
    );
    for value in [0u8, 1] {
        let selected = if view.form.credit_history == value { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{value}"{selected}>{value}</option>"#);
    }
    out.push_str(r#"</select> <button type="submit">Predict</button></form>"#);
}

/// Render the full dashboard page.
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let _ = write!(
        out,
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>Loan Approval Prediction App</title><style>{}</style></head><body><div class="layout">"#,
        STYLE
    );
    render_sidebar(&mut out, view);

    out.push_str(r#"<main class="main"><h1>Loan Approval Prediction App</h1>"#);
    if let Some(error) = &view.error {
        message(&mut out, "error", error);
    }
    match &view.dataset {
        Some(panel) => render_dataset(&mut out, panel),
        None => message(&mut out, "info", "Upload a CSV file to see visualizations."),
    }

    render_predict_form(&mut out, view);
    if let Some(outcome) = &view.outcome {
        render_outcome(&mut out, outcome);
    }

    out.push_str("</main></div></body></html>");
    out
}
