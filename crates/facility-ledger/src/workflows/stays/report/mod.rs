mod export;
mod summary;
pub mod views;

pub use export::write_csv;
pub use views::{checked_slots, MAX_REPORT_SLOTS};
pub use summary::{
    StayReport, StayReportError, StayReportRow, StayReportService, StayReportTotals,
};
