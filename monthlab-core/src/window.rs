//! Output windows: the most recent slice of an instrument's monthly history.

use crate::domain::MonthlyRecord;

/// Number of monthly records kept per instrument in the emitted output.
pub const OUTPUT_WINDOW_LEN: usize = 24;

/// Last `min(len, records.len())` records, in their original ascending order.
pub fn output_window(records: &[MonthlyRecord], len: usize) -> &[MonthlyRecord] {
    let start = records.len().saturating_sub(len);
    &records[start..]
}
