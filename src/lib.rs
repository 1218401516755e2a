pub mod calendar;
pub mod persistence;
pub mod quota;

pub use calendar::DayHours;
pub use calendar::Interval;
pub use calendar::LabCalendar;
pub use calendar::LabCalendarConfig;
pub use persistence::PrintStore;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePrintStore;
pub use quota::PrintJob;
pub use quota::Refund;
pub use quota::UserQuota;
