use super::super::domain::StatusKind;
use super::summary::StayReport;
use super::views::display_width;
use std::io::Write;

/// Writes the report as CSV with `slots` interval columns per kind, capped
/// the same way as the row views.
pub fn write_csv<W: Write>(
    report: &StayReport,
    slots: usize,
    writer: W,
) -> Result<(), csv::Error> {
    let slots = display_width(slots);
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![
        "resident_id".to_string(),
        "resident_name".to_string(),
        "facility_name".to_string(),
        "month".to_string(),
        "enrolled_days".to_string(),
    ];
    for kind in StatusKind::ordered() {
        let prefix = column_prefix(kind);
        header.extend((1..=slots).map(|slot| format!("{prefix}_{slot}")));
        header.push(format!("{prefix}_hidden"));
    }
    csv_writer.write_record(&header)?;

    let month = report.month.to_string();
    for view in report.views(slots) {
        let mut record = vec![
            view.resident_id.to_string(),
            view.resident_name.clone(),
            view.facility_name.clone(),
            month.clone(),
            view.enrolled_days.to_string(),
        ];
        for kind in StatusKind::ordered() {
            let column = view.slots(kind);
            record.extend(column.slots.iter().cloned());
            record.push(column.hidden.to_string());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn column_prefix(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Hospitalization => "hospitalization",
        StatusKind::OvernightAbsence => "overnight_absence",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::stays::calculator::MonthlyStayCalculator;
    use crate::workflows::stays::domain::{DailyStatusRecord, ReportMonth, ResidentId};
    use crate::workflows::stays::report::views::MAX_REPORT_SLOTS;
    use crate::workflows::stays::repository::ResidentListing;
    use chrono::NaiveDate;

    #[test]
    fn writes_header_and_one_line_per_resident() {
        let month = ReportMonth::new(2026, 2).expect("valid month");
        let as_of = NaiveDate::from_ymd_opt(2026, 2, 10).expect("valid date");
        let calculator = MonthlyStayCalculator::new(month, as_of);
        let records: Vec<DailyStatusRecord> = (5..=8)
            .map(|day| DailyStatusRecord {
                resident_id: ResidentId("r-1".to_string()),
                date: NaiveDate::from_ymd_opt(2026, 2, day).expect("valid date"),
                hospitalization_active: true,
                overnight_absence_active: false,
            })
            .collect();
        let summaries = calculator.summarize(&records, &[]).expect("summarizes");
        let report = StayReport::assemble(
            &calculator,
            "Maple House".to_string(),
            vec![ResidentListing {
                id: ResidentId("r-1".to_string()),
                name: "Abe".to_string(),
            }],
            summaries,
        );

        let mut buffer = Vec::new();
        write_csv(&report, 2, &mut buffer).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "resident_id,resident_name,facility_name,month,enrolled_days,\
hospitalization_1,hospitalization_2,hospitalization_hidden,\
overnight_absence_1,overnight_absence_2,overnight_absence_hidden"
        );
        assert_eq!(lines[1], "r-1,Abe,Maple House,2026-02,6,02/05~02/08,,0,,,0");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn header_width_is_capped_for_oversized_slot_counts() {
        let month = ReportMonth::new(2026, 2).expect("valid month");
        let as_of = NaiveDate::from_ymd_opt(2026, 2, 10).expect("valid date");
        let calculator = MonthlyStayCalculator::new(month, as_of);
        let report = StayReport::assemble(&calculator, "Maple House".to_string(), vec![], vec![]);

        let mut buffer = Vec::new();
        write_csv(&report, usize::MAX, &mut buffer).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        let header: Vec<&str> = text.lines().next().expect("header").split(',').collect();

        assert_eq!(header.len(), 5 + 2 * (MAX_REPORT_SLOTS + 1));
        assert_eq!(header[5 + MAX_REPORT_SLOTS], "hospitalization_hidden");
    }
}
