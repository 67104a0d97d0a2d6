use crate::infra::FacilitySnapshot;
use crate::routes::calculate_snapshot;
use chrono::{Local, NaiveDate};
use clap::Args;
use facility_ledger::error::AppError;
use facility_ledger::workflows::stays::report::{checked_slots, write_csv};
use facility_ledger::workflows::stays::{ReportMonth, StatusKind, StayReport};
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct StayReportArgs {
    /// Facility snapshot JSON (facility_id, facility_name, residents, records)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Reporting year
    #[arg(long)]
    pub(crate) year: i32,
    /// Reporting month (1-12)
    #[arg(long)]
    pub(crate) month: u32,
    /// Cutoff date for enrollment days (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Interval columns shown per status kind (1-31)
    #[arg(long, default_value_t = 10)]
    pub(crate) slots: usize,
    /// Write the report as CSV to this path instead of printing it
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_stay_report(args: StayReportArgs) -> Result<(), AppError> {
    let StayReportArgs {
        input,
        year,
        month,
        as_of,
        slots,
        csv,
    } = args;

    let month = ReportMonth::new(year, month)?;
    let slots = checked_slots(slots)?;
    // Resolved once here; everything below receives the cutoff explicitly.
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = FacilitySnapshot::from_path(&input)?;
    let (report, periods) = calculate_snapshot(snapshot, month, as_of)?;

    match csv {
        Some(path) => {
            let file = File::create(&path)?;
            write_csv(&report, slots, file)?;
            println!(
                "Wrote {} resident rows ({} periods) to {}",
                report.rows.len(),
                periods.len(),
                path.display()
            );
        }
        None => render_stay_report(&report, slots),
    }

    Ok(())
}

fn render_stay_report(report: &StayReport, slots: usize) {
    println!("Stay report: {}", report.facility_name);
    println!("Month {} (days counted through {})", report.month, report.as_of);

    let totals = report.totals();
    println!(
        "Residents: {}, enrolled days: {}, hospitalized: {}, overnight absences: {}",
        totals.residents,
        totals.enrolled_days,
        totals.hospitalized_residents,
        totals.absent_residents
    );

    if report.rows.is_empty() {
        println!("\nNo active residents");
        return;
    }

    for view in report.views(slots) {
        println!(
            "\n{} ({}) - {} enrolled days",
            view.resident_name, view.resident_id, view.enrolled_days
        );
        for kind in StatusKind::ordered() {
            let column = view.slots(kind);
            let shown: Vec<&str> = column
                .slots
                .iter()
                .map(String::as_str)
                .filter(|slot| !slot.is_empty())
                .collect();
            if shown.is_empty() {
                continue;
            }
            let overflow = if column.hidden > 0 {
                format!(" (+{} more)", column.hidden)
            } else {
                String::new()
            };
            println!("- {}: {}{}", column.kind_label, shown.join(", "), overflow);
        }
    }
}
