//! Document storage for [`Shift`]s and [`Availability`] records
//!
//! Every method on [`Store`] is one atomic operation on one collection.
//! Anything spanning several documents is a sequence of these calls, see [`crate::workflow`].

use crate::data::*;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};
use thiserror::Error;

/// Error produced by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No shift has the requested id.
    #[error("shift {0} does not exist")]
    NotFound(ShiftId),

    /// The update would leave the shift invalid; nothing was written.
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// The snapshot file could not be read or written.
    #[error("could not access snapshot `{}`", path.display())]
    Io {
        /// Snapshot location
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file exists but does not hold a snapshot.
    #[error("snapshot `{}` is corrupt", path.display())]
    Corrupt {
        /// Snapshot location
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot holds a shift that could never have been created.
    #[error("snapshot `{}` holds invalid shift {id}", path.display())]
    Invalid {
        /// Snapshot location
        path: PathBuf,
        /// The offending shift
        id: ShiftId,
        /// What is wrong with it
        #[source]
        source: ValidationError,
    },
}

/// The two collections backing the application.
pub trait Store: Send + Sync {
    /// Every shift, ordered by start, then end, then id.
    fn shifts(&self) -> Result<Vec<Shift>, StoreError>;

    /// One shift by id.
    fn shift(&self, id: ShiftId) -> Result<Shift, StoreError>;

    /// Assign an id to and insert one shift.
    fn insert_shift(&self, shift: NewShift) -> Result<Shift, StoreError>;

    /// Assign ids to and insert every shift in one write. Returns them in the order given.
    fn insert_shifts(&self, shifts: Vec<NewShift>) -> Result<Vec<Shift>, StoreError>;

    /// Apply `update` to one shift, returning the shift as it is afterwards.
    fn update_shift(&self, id: ShiftId, update: ShiftUpdate) -> Result<Shift, StoreError>;

    /// Remove one shift, returning what was removed.
    fn delete_shift(&self, id: ShiftId) -> Result<Shift, StoreError>;

    /// Availability records matching `filter`, in insertion order.
    fn availabilities(&self, filter: &AvailabilityFilter) -> Result<Vec<Availability>, StoreError>;

    /// Insert `record` unless an identical one exists. Returns whether it was inserted.
    fn insert_availability(&self, record: Availability) -> Result<bool, StoreError>;

    /// Remove every record matching `filter`. Returns how many were removed.
    fn delete_availabilities(&self, filter: &AvailabilityFilter) -> Result<usize, StoreError>;
}

#[derive(Debug)]
struct Collections {
    next_id: u64,
    shifts: FxHashMap<ShiftId, Shift>,
    availability: Vec<Availability>,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            next_id: 1,
            shifts: FxHashMap::default(),
            availability: Vec::new(),
        }
    }
}

impl Collections {
    fn take_id(&mut self) -> ShiftId {
        let id = ShiftId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// On-disk form of [`Collections`].
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    shifts: Vec<Shift>,
    #[serde(default)]
    availability: Vec<Availability>,
}

#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    shifts: Vec<&'a Shift>,
    availability: &'a [Availability],
}

impl From<Snapshot> for Collections {
    fn from(snapshot: Snapshot) -> Self {
        let Snapshot {
            shifts,
            availability,
        } = snapshot;
        Self {
            next_id: shifts.iter().map(|shift| shift.id.0 + 1).max().unwrap_or(1),
            shifts: shifts.into_iter().map(|shift| (shift.id, shift)).collect(),
            availability,
        }
    }
}

impl<'a> From<&'a Collections> for SnapshotRef<'a> {
    fn from(data: &'a Collections) -> Self {
        let mut shifts = data.shifts.values().collect::<Vec<_>>();
        shifts.sort_by_key(|shift| shift.id);
        Self {
            shifts,
            availability: &data.availability,
        }
    }
}

/// A [`Store`] held in memory, optionally mirrored to a JSON snapshot file.
///
/// With a snapshot, every write that changes something rewrites the whole file
/// while still holding the write lock, so the file always matches some state the
/// store actually passed through. If rewriting fails the in-memory change stays
/// and the caller gets [`StoreError::Io`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// An empty store that is never written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the snapshot at `path`, or start empty if there is no file yet.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed,
    /// or if any shift in it breaks the rules enforced on creation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match File::open(&path) {
            Ok(file) => {
                let snapshot = serde_json::from_reader::<_, Snapshot>(BufReader::new(file))
                    .map_err(|source| StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                if let Some((id, source)) = snapshot
                    .shifts
                    .iter()
                    .find_map(|shift| shift.check().err().map(|e| (shift.id, e)))
                {
                    return Err(StoreError::Invalid { path, id, source });
                }
                Collections::from(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
                Collections::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::info!(
            path = %path.display(),
            shifts = data.shifts.len(),
            availability = data.availability.len(),
            "loaded snapshot"
        );
        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(path),
        })
    }

    fn persist(&self, data: &Collections) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let io = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };
        let tmp = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp).map_err(io)?);
        serde_json::to_writer_pretty(&mut writer, &SnapshotRef::from(data))
            .map_err(|e| io(e.into()))?;
        writer.flush().map_err(io)?;
        drop(writer);
        std::fs::rename(&tmp, path).map_err(io)
    }

    /// Run `f` under the write lock. `f` reports whether it changed anything.
    fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Collections) -> Result<(T, bool), StoreError>,
    {
        let mut data = self.data.write();
        let (value, changed) = f(&mut data)?;
        if changed {
            self.persist(&data).inspect_err(|e| {
                tracing::error!(error = %e, "snapshot write failed");
            })?;
        }
        Ok(value)
    }
}

impl Store for MemoryStore {
    fn shifts(&self) -> Result<Vec<Shift>, StoreError> {
        let mut shifts = self.data.read().shifts.values().cloned().collect::<Vec<_>>();
        shifts.sort_by_key(|shift| (shift.start, shift.end, shift.id));
        Ok(shifts)
    }

    fn shift(&self, id: ShiftId) -> Result<Shift, StoreError> {
        self.data
            .read()
            .shifts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn insert_shift(&self, shift: NewShift) -> Result<Shift, StoreError> {
        self.write(|data| {
            let shift = shift.into_shift(data.take_id());
            data.shifts.insert(shift.id, shift.clone());
            Ok((shift, true))
        })
    }

    fn insert_shifts(&self, shifts: Vec<NewShift>) -> Result<Vec<Shift>, StoreError> {
        self.write(|data| {
            let shifts = shifts
                .into_iter()
                .map(|shift| shift.into_shift(data.take_id()))
                .collect::<Vec<_>>();
            data.shifts
                .extend(shifts.iter().map(|shift| (shift.id, shift.clone())));
            let changed = !shifts.is_empty();
            Ok((shifts, changed))
        })
    }

    fn update_shift(&self, id: ShiftId, update: ShiftUpdate) -> Result<Shift, StoreError> {
        self.write(|data| {
            let shift = data.shifts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            let changed = update.apply(shift)?;
            Ok((shift.clone(), changed))
        })
    }

    fn delete_shift(&self, id: ShiftId) -> Result<Shift, StoreError> {
        self.write(|data| {
            data.shifts
                .remove(&id)
                .map(|shift| (shift, true))
                .ok_or(StoreError::NotFound(id))
        })
    }

    fn availabilities(&self, filter: &AvailabilityFilter) -> Result<Vec<Availability>, StoreError> {
        Ok(self
            .data
            .read()
            .availability
            .iter()
            .filter(|record| filter.is_match(record))
            .cloned()
            .collect())
    }

    fn insert_availability(&self, record: Availability) -> Result<bool, StoreError> {
        self.write(|data| {
            if data.availability.contains(&record) {
                Ok((false, false))
            } else {
                data.availability.push(record);
                Ok((true, true))
            }
        })
    }

    fn delete_availabilities(&self, filter: &AvailabilityFilter) -> Result<usize, StoreError> {
        self.write(|data| {
            let before = data.availability.len();
            data.availability.retain(|record| !filter.is_match(record));
            let removed = before - data.availability.len();
            Ok((removed, removed != 0))
        })
    }
}
