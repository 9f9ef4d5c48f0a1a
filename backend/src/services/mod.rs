//! Services for the smart irrigation backend

pub mod daily_run;
pub mod reporting;
pub mod settings;

pub use daily_run::{DailyInput, DailyRunService, PlotReading};
pub use reporting::{ReportingService, WeeklyReport};
pub use settings::{SettingsService, SettingsUpdate};
