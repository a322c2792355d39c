//! See [`Shift`]

use crate::data::{TimeInterval, Timestamp, WorkerSet};
use serde::{Deserialize, Serialize, de::Visitor};
use thiserror::Error;

/// Code uniquely identifying a shift
///
/// Written as lowercase hexadecimal in JSON and URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShiftId(pub u64);

impl std::fmt::Display for ShiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Error while parsing a [`ShiftId`] from a string.
#[derive(Debug, Error)]
#[error("`{0}` is not a shift id")]
pub struct ParseShiftIdError(String);

impl std::str::FromStr for ShiftId {
    type Err = ParseShiftIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseShiftIdError(s.to_string()))
    }
}

impl Serialize for ShiftId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShiftId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ShiftIdVisitor;

        impl Visitor<'_> for ShiftIdVisitor {
            type Value = ShiftId;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a hexadecimal shift id")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ShiftIdVisitor)
    }
}

/// A shift payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A field required to create a shift was not provided.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// Title was empty or only whitespace.
    #[error("title cannot be blank")]
    BlankTitle,

    /// A batch creation contained no shifts.
    #[error("no shifts were provided")]
    NoShifts,

    /// A worker name was empty or only whitespace.
    #[error("worker names cannot be blank")]
    BlankWorker,

    /// The shift would not end after it starts.
    #[error("shift must start before it ends (start {start}, end {end})")]
    Reversed {
        /// Requested start
        start: Timestamp,
        /// Requested end
        end: Timestamp,
    },
}

/// Trim a worker name, rejecting blank names.
pub fn worker_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::BlankWorker)
    } else {
        Ok(name.to_string())
    }
}

fn worker_set(names: Vec<String>) -> Result<WorkerSet, ValidationError> {
    names.iter().map(|name| worker_name(name)).collect()
}

fn title(title: String) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(ValidationError::BlankTitle)
    } else if trimmed.len() == title.len() {
        Ok(title)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Blank roles are the same as no role.
fn role(role: String) -> Option<String> {
    let role = role.trim();
    (!role.is_empty()).then(|| role.to_string())
}

/// A bookable work interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    /// Assigned by the store. Never changes.
    pub id: ShiftId,

    /// Free-text label.
    pub title: String,

    /// Beginning of the shift. Always before [`end`](Shift::end).
    pub start: Timestamp,

    /// Conclusion of the shift.
    pub end: Timestamp,

    /// Display hint: the shift covers whole days.
    #[serde(default)]
    pub all_day: bool,

    /// Free-text tag such as a position or station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Workers confirmed for the shift.
    ///
    /// [`None`]: nobody has decided yet.
    ///
    /// [`Some`]: decided, possibly on nobody. Finalizing turns every [`None`] into an empty set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_workers: Option<WorkerSet>,

    /// Workers who declared they are available.
    #[serde(default)]
    pub potential_workers: WorkerSet,
}

impl Shift {
    /// Check a shift that did not come through [`ShiftDraft::validate`],
    /// such as one loaded from disk.
    ///
    /// # Errors
    ///
    /// The first rule the shift breaks: a time-reversed or empty interval,
    /// a blank title, or a blank worker name.
    pub fn check(&self) -> Result<(), ValidationError> {
        TimeInterval::new(self.start, self.end)?;
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        if self
            .potential_workers
            .iter()
            .chain(self.accepted_workers.iter().flatten())
            .any(|name| name.trim().is_empty())
        {
            return Err(ValidationError::BlankWorker);
        }
        Ok(())
    }
}

/// A shift as submitted for creation, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDraft {
    /// Required
    pub title: Option<String>,
    /// Required
    pub start: Option<Timestamp>,
    /// Required, after `start`
    pub end: Option<Timestamp>,
    /// Defaults to `false`
    pub all_day: Option<bool>,
    /// Blank is the same as absent
    pub role: Option<String>,
    /// Empty or absent leaves the shift undecided
    pub accepted_workers: Option<Vec<String>>,
    /// Defaults to empty
    pub potential_workers: Option<Vec<String>>,
}

/// A validated [`ShiftDraft`] waiting for the store to assign it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShift {
    /// Trimmed, non-blank
    pub title: String,
    /// When the shift runs
    pub interval: TimeInterval,
    /// See [`Shift::all_day`]
    pub all_day: bool,
    /// See [`Shift::role`]
    pub role: Option<String>,
    /// See [`Shift::accepted_workers`]
    pub accepted_workers: Option<WorkerSet>,
    /// See [`Shift::potential_workers`]
    pub potential_workers: WorkerSet,
}

impl ShiftDraft {
    /// Check required fields and time ordering.
    ///
    /// Missing worker lists become empty.
    /// An empty `acceptedWorkers` is stored as undecided, since a fresh shift has had no decision made.
    pub fn validate(self) -> Result<NewShift, ValidationError> {
        let ShiftDraft {
            title: title_,
            start,
            end,
            all_day,
            role: role_,
            accepted_workers,
            potential_workers,
        } = self;

        let title = title(title_.ok_or(ValidationError::MissingField("title"))?)?;
        let start = start.ok_or(ValidationError::MissingField("start"))?;
        let end = end.ok_or(ValidationError::MissingField("end"))?;
        let interval = TimeInterval::new(start, end)?;

        Ok(NewShift {
            title,
            interval,
            all_day: all_day.unwrap_or(false),
            role: role_.and_then(role),
            accepted_workers: accepted_workers
                .map(worker_set)
                .transpose()?
                .filter(|set| !set.is_empty()),
            potential_workers: potential_workers
                .map(worker_set)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl NewShift {
    /// Attach the id the store assigned.
    pub fn into_shift(self, id: ShiftId) -> Shift {
        let NewShift {
            title,
            interval,
            all_day,
            role,
            accepted_workers,
            potential_workers,
        } = self;
        Shift {
            id,
            title,
            start: interval.start(),
            end: interval.end(),
            all_day,
            role,
            accepted_workers,
            potential_workers,
        }
    }
}

/// A partial update. Fields that are [`None`] keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    /// New title; cannot be blank.
    pub title: Option<String>,
    /// New start; must stay before the (possibly new) end.
    pub start: Option<Timestamp>,
    /// New end
    pub end: Option<Timestamp>,
    /// New all-day flag
    pub all_day: Option<bool>,
    /// An empty role clears the role.
    pub role: Option<String>,
    /// Replaces the accepted workers. An empty list is a decision to accept nobody.
    pub accepted_workers: Option<Vec<String>>,
    /// Replaces the potential workers.
    pub potential_workers: Option<Vec<String>>,
}

impl ShiftPatch {
    /// Merge onto `shift`, producing the updated shift.
    ///
    /// The merged shift must still start before it ends.
    pub fn merge(self, shift: &Shift) -> Result<Shift, ValidationError> {
        let mut next = shift.clone();
        if let Some(title_) = self.title {
            next.title = title(title_)?;
        }
        if let Some(start) = self.start {
            next.start = start;
        }
        if let Some(end) = self.end {
            next.end = end;
        }
        TimeInterval::new(next.start, next.end)?;
        if let Some(all_day) = self.all_day {
            next.all_day = all_day;
        }
        if let Some(role_) = self.role {
            next.role = role(role_);
        }
        if let Some(names) = self.accepted_workers {
            next.accepted_workers = Some(worker_set(names)?);
        }
        if let Some(names) = self.potential_workers {
            next.potential_workers = worker_set(names)?;
        }
        Ok(next)
    }
}

/// A single-document update the store applies atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftUpdate {
    /// Overwrite the fields present in the patch.
    Merge(ShiftPatch),

    /// Add a name to [`potential_workers`](Shift::potential_workers) if absent.
    AddPotential(String),

    /// Remove a name from [`potential_workers`](Shift::potential_workers) if present.
    RemovePotential(String),

    /// Replace [`accepted_workers`](Shift::accepted_workers) outright.
    SetAccepted(WorkerSet),

    /// Turn undecided [`accepted_workers`](Shift::accepted_workers) into an empty decision.
    Decide,
}

impl ShiftUpdate {
    /// Apply to `shift`. Returns whether anything changed.
    ///
    /// On error `shift` is left untouched.
    pub fn apply(self, shift: &mut Shift) -> Result<bool, ValidationError> {
        Ok(match self {
            ShiftUpdate::Merge(patch) => {
                let next = patch.merge(shift)?;
                let changed = next != *shift;
                *shift = next;
                changed
            }
            ShiftUpdate::AddPotential(name) => shift.potential_workers.insert(name),
            ShiftUpdate::RemovePotential(name) => shift.potential_workers.remove(&name),
            ShiftUpdate::SetAccepted(names) => {
                let changed = shift.accepted_workers.as_ref() != Some(&names);
                shift.accepted_workers = Some(names);
                changed
            }
            ShiftUpdate::Decide => {
                let changed = shift.accepted_workers.is_none();
                shift.accepted_workers.get_or_insert_default();
                changed
            }
        })
    }
}
