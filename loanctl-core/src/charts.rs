//! Chart aggregations over a (filtered) loan dataset.
//!
//! Three charts are supported:
//! - loan approval distribution (row count per `Loan_Status`)
//! - applicant income vs loan amount (scatter, coloured by status)
//! - average applicant income per loan status
//!
//! A chart is only produced when the columns it needs are present.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{LoanDataset, APPLICANT_INCOME, LOAN_AMOUNT, LOAN_STATUS};
use crate::svg::{self, BarChart, Palette, ScatterChart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Status,
    IncomeVsLoan,
    AverageIncome,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [Self::Status, Self::IncomeVsLoan, Self::AverageIncome];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::IncomeVsLoan => "income-vs-loan",
            Self::AverageIncome => "average-income",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Status => "Loan Approval Distribution",
            Self::IncomeVsLoan => "Applicant Income vs Loan Amount",
            Self::AverageIncome => "Average Applicant Income by Loan Status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub label: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub income: f64,
    pub loan_amount: f64,
    pub status: Option<String>,
}

/// Row counts per loan status, in order of first appearance.
pub fn status_distribution(dataset: &LoanDataset) -> Option<Vec<CategoryCount>> {
    let statuses = dataset.column(LOAN_STATUS)?;
    let mut counts: Vec<CategoryCount> = Vec::new();
    for cell in statuses.filter(|c| !c.is_empty()) {
        let label = cell.to_string();
        match counts.iter_mut().find(|c| c.label == label) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount { label, count: 1 }),
        }
    }
    Some(counts)
}

/// Income/loan-amount pairs; rows missing either number are skipped.
pub fn income_vs_loan(dataset: &LoanDataset) -> Option<Vec<ScatterPoint>> {
    let income = dataset.column_index(APPLICANT_INCOME)?;
    let amount = dataset.column_index(LOAN_AMOUNT)?;
    let status = dataset.column_index(LOAN_STATUS);

    let points = dataset
        .rows()
        .iter()
        .filter_map(|row| {
            let x = row[income].as_f64()?;
            let y = row[amount].as_f64()?;
            let status = status
                .map(|idx| &row[idx])
                .filter(|c| !c.is_empty())
                .map(ToString::to_string);
            Some(ScatterPoint {
                income: x,
                loan_amount: y,
                status,
            })
        })
        .collect();
    Some(points)
}

/// Mean applicant income per loan status, groups sorted by label.
pub fn average_income(dataset: &LoanDataset) -> Option<Vec<CategoryMean>> {
    let status = dataset.column_index(LOAN_STATUS)?;
    let income = dataset.column_index(APPLICANT_INCOME)?;

    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in dataset.rows() {
        if row[status].is_empty() {
            continue;
        }
        if let Some(value) = row[income].as_f64() {
            let entry = groups.entry(row[status].to_string()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    Some(
        groups
            .into_iter()
            .map(|(label, (sum, n))| CategoryMean {
                label,
                mean: sum / n as f64,
            })
            .collect(),
    )
}

/// All charts that apply to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSet {
    pub status: Option<Vec<CategoryCount>>,
    pub income_vs_loan: Option<Vec<ScatterPoint>>,
    pub average_income: Option<Vec<CategoryMean>>,
}

impl ChartSet {
    pub fn from_dataset(dataset: &LoanDataset) -> Self {
        Self {
            status: status_distribution(dataset),
            income_vs_loan: income_vs_loan(dataset),
            average_income: average_income(dataset),
        }
    }

    /// Kinds that have data to draw, in display order.
    pub fn available(&self) -> Vec<ChartKind> {
        ChartKind::ALL
            .into_iter()
            .filter(|k| match k {
                ChartKind::Status => self.status.is_some(),
                ChartKind::IncomeVsLoan => self.income_vs_loan.is_some(),
                ChartKind::AverageIncome => self.average_income.is_some(),
            })
            .collect()
    }

    /// Render one chart as SVG, or `None` when its columns were absent.
    pub fn render(&self, kind: ChartKind) -> Option<String> {
        match kind {
            ChartKind::Status => self.status.as_ref().map(|counts| {
                svg::render_bar_chart(&BarChart {
                    title: kind.title(),
                    x_label: LOAN_STATUS,
                    y_label: "count",
                    bars: counts
                        .iter()
                        .map(|c| (c.label.clone(), c.count as f64))
                        .collect(),
                    palette: Palette::Set2,
                })
            }),
            ChartKind::IncomeVsLoan => self.income_vs_loan.as_ref().map(|points| {
                svg::render_scatter(&ScatterChart {
                    title: kind.title(),
                    x_label: APPLICANT_INCOME,
                    y_label: LOAN_AMOUNT,
                    series: group_by_status(points),
                })
            }),
            ChartKind::AverageIncome => self.average_income.as_ref().map(|means| {
                svg::render_bar_chart(&BarChart {
                    title: kind.title(),
                    x_label: LOAN_STATUS,
                    y_label: APPLICANT_INCOME,
                    bars: means.iter().map(|m| (m.label.clone(), m.mean)).collect(),
                    palette: Palette::Coolwarm,
                })
            }),
        }
    }
}

/// Split scatter points into hue series in order of first appearance.
fn group_by_status(points: &[ScatterPoint]) -> Vec<(String, Vec<(f64, f64)>)> {
    let mut series: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for p in points {
        let label = p.status.clone().unwrap_or_default();
        let xy = (p.income, p.loan_amount);
        match series.iter_mut().find(|(l, _)| *l == label) {
            Some((_, pts)) => pts.push(xy),
            None => series.push((label, vec![xy])),
        }
    }
    series
}
