use super::super::domain::{ResidentId, StatusKind, StayError};
use super::summary::StayReportRow;
use serde::Serialize;

/// Upper bound on display slots per kind. A month never holds more than 31
/// separate runs of one kind.
pub const MAX_REPORT_SLOTS: usize = 31;

/// Validates a caller-supplied slot count.
pub fn checked_slots(requested: usize) -> Result<usize, StayError> {
    if (1..=MAX_REPORT_SLOTS).contains(&requested) {
        Ok(requested)
    } else {
        Err(StayError::InvalidSlots {
            requested,
            max: MAX_REPORT_SLOTS,
        })
    }
}

/// Width actually rendered for `slots`, kept within `1..=MAX_REPORT_SLOTS`.
pub(crate) fn display_width(slots: usize) -> usize {
    slots.clamp(1, MAX_REPORT_SLOTS)
}

/// Fixed-width rendering of one kind's intervals. Intervals beyond the slot
/// count are not shown; `hidden` says how many were cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalSlots {
    pub kind: StatusKind,
    pub kind_label: &'static str,
    pub slots: Vec<String>,
    pub hidden: usize,
}

impl IntervalSlots {
    fn from_row(row: &StayReportRow, kind: StatusKind, width: usize) -> Self {
        let rendered: Vec<String> = row
            .intervals_of(kind)
            .map(|interval| interval.to_string())
            .collect();
        let hidden = rendered.len().saturating_sub(width);

        let mut slots: Vec<String> = rendered.into_iter().take(width).collect();
        slots.resize(width, String::new());

        Self {
            kind,
            kind_label: kind.label(),
            slots,
            hidden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StayReportRowView {
    pub resident_id: ResidentId,
    pub resident_name: String,
    pub facility_name: String,
    pub enrolled_days: u32,
    pub hospitalization: IntervalSlots,
    pub overnight_absence: IntervalSlots,
}

impl StayReportRowView {
    pub(crate) fn from_row(row: &StayReportRow, slots: usize) -> Self {
        let width = display_width(slots);
        Self {
            resident_id: row.resident_id.clone(),
            resident_name: row.resident_name.clone(),
            facility_name: row.facility_name.clone(),
            enrolled_days: row.enrolled_days,
            hospitalization: IntervalSlots::from_row(row, StatusKind::Hospitalization, width),
            overnight_absence: IntervalSlots::from_row(row, StatusKind::OvernightAbsence, width),
        }
    }

    pub fn slots(&self, kind: StatusKind) -> &IntervalSlots {
        match kind {
            StatusKind::Hospitalization => &self.hospitalization,
            StatusKind::OvernightAbsence => &self.overnight_absence,
        }
    }
}
