//! MonthlyRecord and its indicator columns.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The four moving-average columns attached to a monthly record.
///
/// `None` means the window had too little history. It is never encoded as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_10: Option<f64>,
    pub ema_20: Option<f64>,
}

impl IndicatorSeries {
    /// True when every column is missing.
    pub fn is_empty(&self) -> bool {
        self.sma_10.is_none()
            && self.sma_20.is_none()
            && self.ema_10.is_none()
            && self.ema_20.is_none()
    }
}

/// One calendar month of OHLC for one instrument.
///
/// `month_end_date` is always the last calendar day of the month, whichever
/// days were actually observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub instrument_id: String,
    pub month_end_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub indicators: IndicatorSeries,
}

impl MonthlyRecord {
    /// (year, month) key of this bucket.
    pub fn month_key(&self) -> (i32, u32) {
        (self.month_end_date.year(), self.month_end_date.month())
    }
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        // Only December of the last representable year lands here.
        .unwrap_or(NaiveDate::MAX)
}
