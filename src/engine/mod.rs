// Pure statistics engine: slot selection, ring reading, unit scaling and aggregation.
// Nothing in here performs I/O or holds state between calls.

pub mod aggregate;
pub mod format;
pub mod period;
pub mod ring;
pub mod scale;
pub mod selector;

pub use aggregate::{merge_servers, month_to_date, sum_days, sum_points, sum_window, today_total};
pub use format::{NO_DATA, counter, format_size};
pub use period::{DisplayRange, Period, PeriodError, RangeName, YearMonth, YearWindow};
pub use ring::RingSeries;
pub use scale::{choose_unit, scale, scale_series};
pub use selector::{Clock, PeriodMenuItem, PeriodWindow, SlotWindow, period_menu, select};
