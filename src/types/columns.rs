//! Column names shared by the loader, the preprocessor and the views.

pub const STATION: &str = "station";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const HOUR: &str = "hour";
pub const PM10: &str = "PM10";
pub const TEMP: &str = "TEMP";
pub const DEWP: &str = "DEWP";
pub const PRES: &str = "PRES";

/// Components every row's timestamp is built from.
pub const CALENDAR_COLUMNS: [&str; 4] = [YEAR, MONTH, DAY, HOUR];

// Derived by the preprocessor
pub const DATE: &str = "date";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const HOUR_OF_DAY: &str = "hour_of_day";
pub const MONTH_NAME: &str = "month_name";
pub const YEAR_MONTH: &str = "year_month";

/// Columns that must be present in the source CSV. Anything else is dropped at load time.
pub const REQUIRED_COLUMNS: [&str; 9] = [STATION, YEAR, MONTH, DAY, HOUR, PM10, TEMP, DEWP, PRES];

pub const DERIVED_COLUMNS: [&str; 5] = [DATE, DAY_OF_WEEK, HOUR_OF_DAY, MONTH_NAME, YEAR_MONTH];
