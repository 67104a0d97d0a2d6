use super::domain::{DateLabel, IntervalStart, MonthFlags, StatusInterval, StatusKind};

/// Converts one kind's daily flags into the maximal runs of active days.
///
/// A run active on day 1 whose previous-month slot is also set starts
/// `Unbounded`. A run still active on the last day is truncated there.
pub fn extract_intervals(flags: &MonthFlags, kind: StatusKind) -> Vec<StatusInterval> {
    let month = flags.month();
    let days = flags.days();
    let mut intervals = Vec::new();
    let mut open: Option<IntervalStart> = None;

    for day in 1..=days {
        if flags.get(day) {
            if open.is_none() {
                let start = if day == 1 && flags.previous_day() {
                    IntervalStart::Unbounded
                } else {
                    IntervalStart::Day(month.label(day))
                };
                open = Some(start);
            }
        } else if let Some(start) = open.take() {
            intervals.push(close(kind, start, month.label(day - 1)));
        }
    }

    if let Some(start) = open {
        intervals.push(close(kind, start, month.label(days)));
    }

    intervals
}

fn close(kind: StatusKind, start: IntervalStart, end: DateLabel) -> StatusInterval {
    StatusInterval { kind, start, end }
}
