//! See [`Availability`]

use crate::data::ShiftId;
use serde::{Deserialize, Serialize};

/// A worker's standalone claim of availability for a shift.
///
/// Mirrors [`Shift::potential_workers`](crate::data::Shift::potential_workers).
/// `shift_id` is only a lookup key; deleting the shift leaves the record in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Shift the worker is available for
    pub shift_id: ShiftId,
    /// Who is available
    pub worker_name: String,
}

/// A filter for selecting [`Availability`] records.
///
/// Each parameter is combined as "and". Parameters that are [`None`] are ignored,
/// so the default filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityFilter {
    /// Only records for this shift.
    pub shift_id: Option<ShiftId>,
    /// Only records for this worker.
    pub worker_name: Option<String>,
}

impl AvailabilityFilter {
    /// Select every record.
    pub const ALL: Self = Self {
        shift_id: None,
        worker_name: None,
    };

    /// Test if `record` satisfies every parameter.
    pub fn is_match(&self, record: &Availability) -> bool {
        self.shift_id.is_none_or(|id| record.shift_id == id)
            && self
                .worker_name
                .as_ref()
                .is_none_or(|name| &record.worker_name == name)
    }
}
