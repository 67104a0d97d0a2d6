use chrono::NaiveDate;
use facility_ledger::workflows::stays::{
    enrolled_days, extract_intervals, limit_day, DailyStatusRecord, IntervalStart, MonthFlags,
    MonthlyStayCalculator, ReportMonth, ResidentId, StatusKind,
};

fn february() -> ReportMonth {
    ReportMonth::new(2026, 2).expect("valid month")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn days(month: ReportMonth, active: impl Fn(u32) -> bool) -> Vec<bool> {
    (1..=month.days_in_month()).map(active).collect()
}

#[test]
fn hospitalization_mid_month_with_open_cutoff() {
    let month = february();
    let hospitalized = days(month, |d| (5..=8).contains(&d));
    let hospitalization = MonthFlags::from_days(month, false, &hospitalized);
    let absence = MonthFlags::new(month);
    let as_of = date(2026, 2, 10);

    let intervals = extract_intervals(&hospitalization, StatusKind::Hospitalization);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].start.to_string(), "02/05");
    assert_eq!(intervals[0].end.to_string(), "02/08");
    assert_eq!(intervals[0].kind, StatusKind::Hospitalization);

    assert_eq!(limit_day(month, as_of), 10);
    assert_eq!(enrolled_days(&hospitalization, &absence, as_of), 6);
}

#[test]
fn stay_continuing_from_previous_month() {
    let month = february();
    let flags = MonthFlags::from_days(month, true, &days(month, |d| d <= 3));

    let intervals = extract_intervals(&flags, StatusKind::Hospitalization);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].start, IntervalStart::Unbounded);
    assert_eq!(intervals[0].end.to_string(), "02/03");
}

#[test]
fn extraction_covers_every_maximal_run() {
    let month = ReportMonth::new(2026, 3).expect("valid month");
    let pattern = days(month, |d| d % 3 != 0);
    let flags = MonthFlags::from_days(month, false, &pattern);

    let intervals = extract_intervals(&flags, StatusKind::OvernightAbsence);
    // Days 1-2, 4-5, ..., 28-29, 31
    assert_eq!(intervals.len(), 11);

    let covered: u32 = intervals
        .iter()
        .map(|interval| {
            let start = interval.start.label().expect("bounded start").day();
            interval.end.day() - start + 1
        })
        .sum();
    assert_eq!(covered, pattern.iter().filter(|active| **active).count() as u32);

    for pair in intervals.windows(2) {
        let gap_start = pair[0].end.day();
        let next = pair[1].start.label().expect("bounded start").day();
        assert!(next > gap_start + 1, "runs must be separated by an inactive day");
    }
}

#[test]
fn month_end_runs_are_truncated_not_left_open() {
    let month = ReportMonth::new(2025, 12).expect("valid month");
    let flags = MonthFlags::from_days(month, false, &days(month, |d| d >= 30));

    let intervals = extract_intervals(&flags, StatusKind::Hospitalization);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].end.to_string(), "12/31");
    assert!(intervals[0].reaches_month_end(month));
}

#[test]
fn kinds_are_extracted_independently() {
    let month = february();
    let same_day = days(month, |d| d == 14);
    let hospitalization = MonthFlags::from_days(month, false, &same_day);
    let absence = MonthFlags::from_days(month, false, &same_day);

    assert_eq!(
        extract_intervals(&hospitalization, StatusKind::Hospitalization).len(),
        1
    );
    assert_eq!(
        extract_intervals(&absence, StatusKind::OvernightAbsence).len(),
        1
    );
    assert_eq!(
        enrolled_days(&hospitalization, &absence, date(2026, 2, 28)),
        27
    );
}

#[test]
fn calculator_output_is_stable_across_runs() {
    let month = february();
    let calculator = MonthlyStayCalculator::new(month, date(2026, 2, 18));
    let records: Vec<DailyStatusRecord> = (1..=28)
        .map(|day| DailyStatusRecord {
            resident_id: ResidentId(format!("r-{}", day % 4)),
            date: date(2026, 2, day),
            hospitalization_active: day % 5 == 0,
            overnight_absence_active: day % 7 == 0,
        })
        .collect();

    let first = calculator.summarize(&records, &[]).expect("summarizes");
    let second = calculator.summarize(&records, &[]).expect("summarizes");
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    for summary in &first {
        assert!(summary.enrolled_days() <= limit_day(month, calculator.as_of()));
    }
}
