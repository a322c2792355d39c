//! Documents held by the store

pub mod availability;
pub mod shift;
pub mod time;
pub mod worker;

pub use availability::*;
pub use shift::*;
pub use time::*;
pub use worker::*;

/// Create a [`Timestamp`] literal.
///
/// Expects `m/d/y` format. Time can be appended to date with `@ h:m`.
#[cfg(test)]
macro_rules! datetime {
    ($mo:literal/$d:literal/$yr:literal$( @ $hr:literal:$m:literal)?) => {
        $crate::data::Timestamp(
            chrono::prelude::NaiveDateTime::new(
                chrono::prelude::NaiveDate::from_ymd_opt($yr, $mo, $d)
                    .unwrap_or_else(|| panic!(
                        "`{}/{}/{}` is not a valid date",
                        $mo,
                        $d,
                        $yr,
                    )),
                None$(.or(Some(chrono::prelude::NaiveTime::from_hms_opt($hr, $m, 0)
                    .unwrap_or_else(|| panic!(
                        "`{}:{}` is not a valid time",
                        $hr,
                        $m,
                    )))))?
                    .unwrap_or_default(),
            )
            .and_utc(),
        )
    };
}

#[cfg(test)]
pub(crate) use datetime;
