//! Summarise a loan CSV: preview, filter options, filtered rows, chart data

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use loanctl_core::dataset::PREVIEW_ROWS;
use loanctl_core::{
    credit_history_options, filter_by_credit_history, Cell, ChartSet, CreditFilter, LoanDataset,
};

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// CSV file to inspect
    pub path: PathBuf,

    /// Credit-history values to keep, comma-separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub credit_history: Option<Vec<String>>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct InspectReport {
    rows: usize,
    columns: Vec<String>,
    credit_history_options: Vec<Cell>,
    selected: Vec<Cell>,
    filtered_rows: usize,
    charts: ChartSet,
}

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let dataset = LoanDataset::from_path(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let options = credit_history_options(&dataset)?;
    let filter = match &args.credit_history {
        Some(values) => CreditFilter::from_raw(values),
        None => CreditFilter::new(options.clone()),
    };
    let filtered = filter_by_credit_history(&dataset, &filter)?;
    let charts = ChartSet::from_dataset(&filtered);

    if args.json {
        let report = InspectReport {
            rows: dataset.len(),
            columns: dataset.headers().to_vec(),
            credit_history_options: options,
            selected: filter.selected().to_vec(),
            filtered_rows: filtered.len(),
            charts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Preview ({} of {} rows):", PREVIEW_ROWS.min(dataset.len()), dataset.len());
    print_table(&dataset.head(PREVIEW_ROWS));
    println!();
    println!("Credit_History options: {}", join(&options));
    println!("Selected: {}", join(filter.selected()));
    println!("Filtered rows: {}", filtered.len());

    if let Some(status) = &charts.status {
        println!();
        println!("Loan approval distribution:");
        for c in status {
            println!("  {:<12} {}", c.label, c.count);
        }
    }
    if let Some(points) = &charts.income_vs_loan {
        println!();
        println!("Income vs loan amount: {} points", points.len());
    }
    if let Some(means) = &charts.average_income {
        println!();
        println!("Average applicant income by status:");
        for m in means {
            println!("  {:<12} {:.2}", m.label, m.mean);
        }
    }
    Ok(())
}

fn join(cells: &[Cell]) -> String {
    cells.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn print_table(dataset: &LoanDataset) {
    println!("{}", dataset.headers().join("\t"));
    for row in dataset.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|c| match c {
                Cell::Empty => "None".to_string(),
                other => other.to_string(),
            })
            .collect();
        println!("{}", line.join("\t"));
    }
}
