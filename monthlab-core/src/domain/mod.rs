//! Domain types for monthlab

pub mod monthly;
pub mod observation;

pub use monthly::{month_end, IndicatorSeries, MonthlyRecord};
pub use observation::{DailyObservation, ObservationError};
