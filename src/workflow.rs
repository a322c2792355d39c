//! Shift, availability, and acceptance operations
//!
//! Each operation is a short sequence of single-document [`Store`] calls.
//! Operations touching several shifts do not roll back: they carry on past a
//! failing shift and report which shifts succeeded and which failed.
//! Bulk creation is the exception, see [`create_shifts`].

use crate::{
    data::*,
    store::{Store, StoreError},
};
use serde::Serialize;
use thiserror::Error;

/// Error from a workflow operation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The request itself was unacceptable.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// At least one entry of a bulk creation was unacceptable, so none were created.
    #[error("{} of {total} shifts are invalid; none were created", errors.len())]
    InvalidBatch {
        /// Number of entries submitted
        total: usize,
        /// Every rejected entry
        errors: Vec<EntryError>,
    },

    /// The shift does not exist, or the id could not name any shift.
    #[error("shift {0} not found")]
    NotFound(String),

    /// The store failed.
    #[error("store failure: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id.to_string()),
            StoreError::Rejected(e) => Self::Invalid(e),
            e => Self::Store(e),
        }
    }
}

/// Parse an id taken from a request. Ids that cannot name a shift are reported as not found.
pub fn parse_id(raw: &str) -> Result<ShiftId, WorkflowError> {
    raw.parse().map_err(|_| WorkflowError::NotFound(raw.to_string()))
}

/// One rejected entry of a bulk creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    /// Position of the entry in the submitted list
    pub index: usize,
    /// Why it was rejected
    pub reason: String,
}

/// Why an individual shift in a batch was not updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// The id as it was submitted
    pub id: String,
    /// Why the update failed
    pub reason: String,
}

impl Failure {
    fn new(id: impl ToString, reason: &WorkflowError) -> Self {
        Self {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of adding a worker to several shifts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Shifts that now list the worker
    pub succeeded: Vec<ShiftId>,
    /// Shifts that could not be updated
    pub failed: Vec<Failure>,
    /// Shifts that now list the worker but whose [`Availability`] record could not be stored
    pub mirror_failed: Vec<Failure>,
    /// The updated shifts, in submission order
    pub updated_shifts: Vec<Shift>,
}

/// Result of replacing a worker's availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Shifts the worker was added to
    pub added: Vec<ShiftId>,
    /// Shifts the worker was already listed on and still wants
    pub kept: Vec<ShiftId>,
    /// Shifts the worker was removed from
    pub removed: Vec<ShiftId>,
    /// Shifts that could not be updated
    pub failed: Vec<Failure>,
}

/// Result of finalizing the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finalization {
    /// Undecided shifts that were marked as decided with nobody accepted
    pub decided: Vec<ShiftId>,
    /// Undecided shifts that could not be marked
    pub failed: Vec<Failure>,
    /// Number of availability records deleted
    pub availability_cleared: usize,
}

/// Every shift.
pub fn list_shifts(store: &dyn Store) -> Result<Vec<Shift>, WorkflowError> {
    Ok(store.shifts()?)
}

/// One shift.
pub fn get_shift(store: &dyn Store, id: ShiftId) -> Result<Shift, WorkflowError> {
    Ok(store.shift(id)?)
}

/// Validate and create one shift.
pub fn create_shift(store: &dyn Store, draft: ShiftDraft) -> Result<Shift, WorkflowError> {
    let shift = store.insert_shift(draft.validate()?)?;
    tracing::debug!(id = %shift.id, title = %shift.title, "created shift");
    Ok(shift)
}

/// Validate and create several shifts, all or nothing.
///
/// Every entry is validated before anything is written. If any entry is invalid,
/// nothing is created and every invalid entry is reported by index.
/// Otherwise all entries are inserted in one store write.
pub fn create_shifts(
    store: &dyn Store,
    drafts: Vec<ShiftDraft>,
) -> Result<Vec<Shift>, WorkflowError> {
    if drafts.is_empty() {
        return Err(ValidationError::NoShifts.into());
    }

    let total = drafts.len();
    let mut valid = Vec::with_capacity(total);
    let mut errors = Vec::new();
    for (index, draft) in drafts.into_iter().enumerate() {
        match draft.validate() {
            Ok(shift) => valid.push(shift),
            Err(e) => errors.push(EntryError {
                index,
                reason: e.to_string(),
            }),
        }
    }

    if !errors.is_empty() {
        tracing::debug!(total, rejected = errors.len(), "rejected shift batch");
        return Err(WorkflowError::InvalidBatch { total, errors });
    }

    let shifts = store.insert_shifts(valid)?;
    tracing::debug!(count = shifts.len(), "created shifts");
    Ok(shifts)
}

/// Overwrite the fields present in `patch`.
pub fn update_shift(
    store: &dyn Store,
    id: ShiftId,
    patch: ShiftPatch,
) -> Result<Shift, WorkflowError> {
    Ok(store.update_shift(id, ShiftUpdate::Merge(patch))?)
}

/// Delete a shift permanently. Deleting a missing shift is [`WorkflowError::NotFound`].
///
/// Availability records pointing at the shift are left alone.
pub fn delete_shift(store: &dyn Store, id: ShiftId) -> Result<Shift, WorkflowError> {
    let shift = store.delete_shift(id)?;
    tracing::debug!(id = %shift.id, "deleted shift");
    Ok(shift)
}

/// Add `name` to the potential workers of each shift in `shift_ids`.
///
/// With `mirror`, also record an [`Availability`] per updated shift. A shift whose
/// record could not be stored still lists the worker, so it is reported in both
/// [`Submission::succeeded`] and [`Submission::mirror_failed`].
///
/// Shifts that do not exist are reported in [`Submission::failed`]; the rest are still updated.
/// Each shift is updated once no matter how often its id is repeated.
pub fn submit_availability(
    store: &dyn Store,
    name: &str,
    shift_ids: &[String],
    mirror: bool,
) -> Result<Submission, WorkflowError> {
    let name = worker_name(name)?;
    let mut submission = Submission::default();
    let mut seen = Vec::with_capacity(shift_ids.len());

    for raw in shift_ids {
        let result = parse_id(raw).and_then(|id| {
            if seen.contains(&id) {
                return Ok(None);
            }
            seen.push(id);
            Ok(Some(store.update_shift(id, ShiftUpdate::AddPotential(name.clone()))?))
        });
        let shift = match result {
            Ok(Some(shift)) => shift,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(
                    worker = %name,
                    shift = %raw,
                    error = %e,
                    "availability not recorded"
                );
                submission.failed.push(Failure::new(raw, &e));
                continue;
            }
        };

        if mirror {
            let record = Availability {
                shift_id: shift.id,
                worker_name: name.clone(),
            };
            if let Err(e) = store.insert_availability(record) {
                let e = WorkflowError::from(e);
                tracing::warn!(
                    worker = %name,
                    shift = %shift.id,
                    error = %e,
                    "availability record not stored"
                );
                submission.mirror_failed.push(Failure::new(shift.id, &e));
            }
        }
        submission.succeeded.push(shift.id);
        submission.updated_shifts.push(shift);
    }

    tracing::debug!(
        worker = %name,
        succeeded = submission.succeeded.len(),
        failed = submission.failed.len(),
        mirror_failed = submission.mirror_failed.len(),
        "submitted availability"
    );
    Ok(submission)
}

/// Make `shift_ids` the complete set of shifts listing `name` as a potential worker.
///
/// Shifts newly included gain the worker. Shifts currently listing the worker but
/// not included lose them, along with the worker's availability records for those shifts.
/// Accepted workers are never touched.
pub fn replace_availability(
    store: &dyn Store,
    name: &str,
    shift_ids: &[String],
) -> Result<Reconciliation, WorkflowError> {
    let name = worker_name(name)?;
    let mut report = Reconciliation::default();

    let mut wanted = Vec::with_capacity(shift_ids.len());
    for raw in shift_ids {
        match parse_id(raw) {
            Ok(id) if !wanted.contains(&id) => wanted.push(id),
            Ok(_) => {}
            Err(e) => report.failed.push(Failure::new(raw, &e)),
        }
    }

    let current = store
        .shifts()?
        .into_iter()
        .filter(|shift| shift.potential_workers.contains(&name))
        .map(|shift| shift.id)
        .collect::<Vec<_>>();

    for &id in &wanted {
        if current.contains(&id) {
            report.kept.push(id);
            continue;
        }
        match store.update_shift(id, ShiftUpdate::AddPotential(name.clone())) {
            Ok(_) => report.added.push(id),
            Err(e) => report.failed.push(Failure::new(id, &WorkflowError::from(e))),
        }
    }

    for &id in current.iter().filter(|id| !wanted.contains(id)) {
        let result = store
            .update_shift(id, ShiftUpdate::RemovePotential(name.clone()))
            .and_then(|_| {
                store.delete_availabilities(&AvailabilityFilter {
                    shift_id: Some(id),
                    worker_name: Some(name.clone()),
                })
            });
        match result {
            Ok(_) => report.removed.push(id),
            Err(e) => report.failed.push(Failure::new(id, &WorkflowError::from(e))),
        }
    }

    tracing::debug!(
        worker = %name,
        added = report.added.len(),
        removed = report.removed.len(),
        failed = report.failed.len(),
        "replaced availability"
    );
    Ok(report)
}

/// Accept exactly one worker, replacing whoever was accepted before.
pub fn accept_worker(store: &dyn Store, id: ShiftId, name: &str) -> Result<Shift, WorkflowError> {
    let accepted = WorkerSet::from_iter([worker_name(name)?]);
    Ok(store.update_shift(id, ShiftUpdate::SetAccepted(accepted))?)
}

/// Replace the accepted workers with `names`.
///
/// An empty list is an explicit decision to accept nobody.
/// Accepted workers stay in the potential workers list.
pub fn accept_workers(
    store: &dyn Store,
    id: ShiftId,
    names: &[String],
) -> Result<Shift, WorkflowError> {
    let accepted = names
        .iter()
        .map(|name| worker_name(name))
        .collect::<Result<WorkerSet, _>>()?;
    Ok(store.update_shift(id, ShiftUpdate::SetAccepted(accepted))?)
}

/// Mark every undecided shift as decided with nobody accepted,
/// then delete all availability records.
///
/// Shifts are marked one at a time. A shift that fails is reported and skipped;
/// availability is cleared regardless.
pub fn finalize(store: &dyn Store) -> Result<Finalization, WorkflowError> {
    let mut report = Finalization::default();

    for shift in store.shifts()? {
        if shift.accepted_workers.is_some() {
            continue;
        }
        match store.update_shift(shift.id, ShiftUpdate::Decide) {
            Ok(_) => report.decided.push(shift.id),
            Err(e) => {
                let e = WorkflowError::from(e);
                tracing::warn!(shift = %shift.id, error = %e, "could not finalize shift");
                report.failed.push(Failure::new(shift.id, &e));
            }
        }
    }

    report.availability_cleared = store.delete_availabilities(&AvailabilityFilter::ALL)?;
    tracing::info!(
        decided = report.decided.len(),
        failed = report.failed.len(),
        availability_cleared = report.availability_cleared,
        "finalized calendar"
    );
    Ok(report)
}

/// Every availability record.
pub fn list_availability(store: &dyn Store) -> Result<Vec<Availability>, WorkflowError> {
    Ok(store.availabilities(&AvailabilityFilter::ALL)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::datetime, store::MemoryStore};
    use std::path::PathBuf;

    fn draft(title: &str) -> ShiftDraft {
        ShiftDraft {
            title: Some(title.to_string()),
            start: Some(datetime!(6/1/2024 @ 10:00)),
            end: Some(datetime!(6/1/2024 @ 14:00)),
            ..ShiftDraft::default()
        }
    }

    fn names(shift: &Shift) -> (Option<Vec<&str>>, Vec<&str>) {
        (
            shift
                .accepted_workers
                .as_ref()
                .map(|set| set.iter().map(String::as_str).collect()),
            shift.potential_workers.iter().map(String::as_str).collect(),
        )
    }

    /// Fails every update to one shift, and optionally every availability insert,
    /// passing everything else through.
    struct FlakyStore {
        inner: MemoryStore,
        broken: ShiftId,
        availability_broken: bool,
    }

    impl FlakyStore {
        fn failure() -> StoreError {
            StoreError::Io {
                path: PathBuf::from("snapshot.json"),
                source: std::io::Error::other("disk full"),
            }
        }
    }

    impl Store for FlakyStore {
        fn shifts(&self) -> Result<Vec<Shift>, StoreError> {
            self.inner.shifts()
        }
        fn shift(&self, id: ShiftId) -> Result<Shift, StoreError> {
            self.inner.shift(id)
        }
        fn insert_shift(&self, shift: NewShift) -> Result<Shift, StoreError> {
            self.inner.insert_shift(shift)
        }
        fn insert_shifts(&self, shifts: Vec<NewShift>) -> Result<Vec<Shift>, StoreError> {
            self.inner.insert_shifts(shifts)
        }
        fn update_shift(&self, id: ShiftId, update: ShiftUpdate) -> Result<Shift, StoreError> {
            if id == self.broken {
                Err(Self::failure())
            } else {
                self.inner.update_shift(id, update)
            }
        }
        fn delete_shift(&self, id: ShiftId) -> Result<Shift, StoreError> {
            self.inner.delete_shift(id)
        }
        fn availabilities(
            &self,
            filter: &AvailabilityFilter,
        ) -> Result<Vec<Availability>, StoreError> {
            self.inner.availabilities(filter)
        }
        fn insert_availability(&self, record: Availability) -> Result<bool, StoreError> {
            if self.availability_broken {
                Err(Self::failure())
            } else {
                self.inner.insert_availability(record)
            }
        }
        fn delete_availabilities(&self, filter: &AvailabilityFilter) -> Result<usize, StoreError> {
            self.inner.delete_availabilities(filter)
        }
    }

    #[test]
    fn test_open_wall_scenario() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("Open Wall")).unwrap();

        submit_availability(&store, "Ann", &[shift.id.to_string()], true).unwrap();
        let shift = get_shift(&store, shift.id).unwrap();
        assert_eq!(names(&shift), (None, vec!["Ann"]));

        accept_workers(&store, shift.id, &["Ann".to_string()]).unwrap();
        let shift = get_shift(&store, shift.id).unwrap();
        assert_eq!(names(&shift), (Some(vec!["Ann"]), vec!["Ann"]));

        let report = finalize(&store).unwrap();
        assert!(report.decided.is_empty(), "an already decided shift should not be re-marked");
        assert_eq!(report.availability_cleared, 1);
        assert!(list_availability(&store).unwrap().is_empty());
        assert_eq!(get_shift(&store, shift.id).unwrap(), shift);
    }

    #[test]
    fn test_create_rejects_reversed_interval() {
        let store = MemoryStore::new();
        let result = create_shift(
            &store,
            ShiftDraft {
                end: Some(datetime!(6/1/2024 @ 10:00)),
                ..draft("zero length")
            },
        );
        assert!(matches!(
            result,
            Err(WorkflowError::Invalid(ValidationError::Reversed { .. }))
        ));
        assert!(list_shifts(&store).unwrap().is_empty());
    }

    #[test]
    fn test_bulk_create_is_all_or_nothing() {
        let store = MemoryStore::new();
        let result = create_shifts(
            &store,
            vec![
                draft("first"),
                ShiftDraft {
                    title: None,
                    ..draft("")
                },
                draft("third"),
            ],
        );
        match result {
            Err(WorkflowError::InvalidBatch { total, errors }) => {
                assert_eq!(total, 3);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].index, 1);
            }
            other => panic!("expected a rejected batch, got {other:?}"),
        }
        assert!(
            list_shifts(&store).unwrap().is_empty(),
            "valid entries of a rejected batch should not be persisted"
        );

        let shifts = create_shifts(&store, vec![draft("first"), draft("third")]).unwrap();
        assert_eq!(shifts.len(), 2);
        assert_eq!(list_shifts(&store).unwrap().len(), 2);
    }

    #[test]
    fn test_bulk_create_rejects_empty_batch() {
        let store = MemoryStore::new();
        assert!(matches!(
            create_shifts(&store, vec![]),
            Err(WorkflowError::Invalid(ValidationError::NoShifts))
        ));
    }

    #[test]
    fn test_submit_twice_does_not_duplicate() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        let ids = [shift.id.to_string()];
        submit_availability(&store, "Ann", &ids, true).unwrap();
        submit_availability(&store, " Ann ", &ids, true).unwrap();
        assert_eq!(names(&get_shift(&store, shift.id).unwrap()).1, ["Ann"]);
        assert_eq!(list_availability(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_submit_reports_missing_shifts() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        let submission = submit_availability(
            &store,
            "Ann",
            &[shift.id.to_string(), "ff".to_string(), "not-an-id".to_string()],
            false,
        )
        .unwrap();
        assert_eq!(submission.succeeded, [shift.id]);
        assert_eq!(
            submission
                .failed
                .iter()
                .map(|failure| failure.id.as_str())
                .collect::<Vec<_>>(),
            ["ff", "not-an-id"]
        );
        assert!(
            list_availability(&store).unwrap().is_empty(),
            "unmirrored submission should not create records"
        );
    }

    #[test]
    fn test_submit_repeated_id_counts_once() {
        let store = MemoryStore::new();
        let id = create_shift(&store, draft("a")).unwrap().id;
        let submission =
            submit_availability(&store, "Ann", &[id.to_string(), id.to_string()], true).unwrap();
        assert_eq!(submission.succeeded, [id]);
        assert_eq!(submission.updated_shifts.len(), 1);
        assert!(submission.failed.is_empty());
    }

    #[test]
    fn test_submit_reports_unstored_record_separately() {
        let inner = MemoryStore::new();
        let id = create_shift(&inner, draft("a")).unwrap().id;
        let store = FlakyStore {
            inner,
            broken: ShiftId(0),
            availability_broken: true,
        };

        let submission = submit_availability(&store, "Ann", &[id.to_string()], true).unwrap();
        assert_eq!(
            submission.succeeded,
            [id],
            "the shift lists the worker, so it should count as updated"
        );
        assert!(submission.failed.is_empty());
        assert_eq!(submission.mirror_failed.len(), 1);
        assert_eq!(submission.mirror_failed[0].id, id.to_string());
        assert!(get_shift(&store, id).unwrap().potential_workers.contains("Ann"));

        let submission = submit_availability(&store, "Bob", &[id.to_string()], false).unwrap();
        assert!(submission.mirror_failed.is_empty(), "unmirrored submission never inserts records");
    }

    #[test]
    fn test_submit_rejects_blank_name() {
        let store = MemoryStore::new();
        assert!(matches!(
            submit_availability(&store, "  ", &[], false),
            Err(WorkflowError::Invalid(ValidationError::BlankWorker))
        ));
    }

    #[test]
    fn test_replace_availability_reconciles() {
        let store = MemoryStore::new();
        let [a, b, c] = [draft("a"), draft("b"), draft("c")]
            .map(|draft| create_shift(&store, draft).unwrap().id);
        submit_availability(&store, "Ann", &[a.to_string(), b.to_string()], true).unwrap();
        accept_worker(&store, b, "Ann").unwrap();

        let report =
            replace_availability(&store, "Ann", &[b.to_string(), c.to_string()]).unwrap();
        assert_eq!(report.added, [c]);
        assert_eq!(report.kept, [b]);
        assert_eq!(report.removed, [a]);
        assert!(report.failed.is_empty());

        assert!(!get_shift(&store, a).unwrap().potential_workers.contains("Ann"));
        assert!(get_shift(&store, c).unwrap().potential_workers.contains("Ann"));
        assert_eq!(
            names(&get_shift(&store, b).unwrap()).0,
            Some(vec!["Ann"]),
            "reconciling should not touch accepted workers"
        );
        let records = list_availability(&store).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].shift_id, b);
    }

    #[test]
    fn test_accept_single_overwrites() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        accept_worker(&store, shift.id, "Ann").unwrap();
        let shift = accept_worker(&store, shift.id, "Bob").unwrap();
        assert_eq!(names(&shift).0, Some(vec!["Bob"]));
    }

    #[test]
    fn test_accept_set_is_verbatim_and_keeps_potential() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        submit_availability(&store, "Ann", &[shift.id.to_string()], false).unwrap();
        let set = ["Bob".to_string(), "Ann".to_string(), "Bob".to_string()];
        accept_workers(&store, shift.id, &set).unwrap();
        let shift = get_shift(&store, shift.id).unwrap();
        assert_eq!(names(&shift), (Some(vec!["Bob", "Ann"]), vec!["Ann"]));
    }

    #[test]
    fn test_accept_missing_shift() {
        let store = MemoryStore::new();
        assert!(matches!(
            accept_worker(&store, ShiftId(42), "Ann"),
            Err(WorkflowError::NotFound(id)) if id == "2a"
        ));
    }

    #[test]
    fn test_finalize_marks_undecided() {
        let store = MemoryStore::new();
        let open = create_shift(&store, draft("open")).unwrap();
        let staffed = create_shift(&store, draft("staffed")).unwrap();
        accept_worker(&store, staffed.id, "Ann").unwrap();
        submit_availability(&store, "Bob", &[open.id.to_string()], true).unwrap();

        let report = finalize(&store).unwrap();
        assert_eq!(report.decided, [open.id]);
        assert_eq!(report.availability_cleared, 1);
        assert_eq!(
            get_shift(&store, open.id).unwrap().accepted_workers,
            Some(WorkerSet::default())
        );
        assert_eq!(names(&get_shift(&store, staffed.id).unwrap()).0, Some(vec!["Ann"]));
        assert!(list_availability(&store).unwrap().is_empty());
    }

    #[test]
    fn test_finalize_continues_past_failure() {
        let inner = MemoryStore::new();
        let broken = create_shift(&inner, draft("broken")).unwrap().id;
        let fine = create_shift(&inner, draft("fine")).unwrap().id;
        submit_availability(&inner, "Ann", &[fine.to_string()], true).unwrap();
        let store = FlakyStore {
            inner,
            broken,
            availability_broken: false,
        };

        let report = finalize(&store).unwrap();
        assert_eq!(report.decided, [fine]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, broken.to_string());
        assert_eq!(report.availability_cleared, 1, "availability should clear despite the failure");
        assert_eq!(get_shift(&store, broken).unwrap().accepted_workers, None);
    }

    #[test]
    fn test_delete_then_get() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        delete_shift(&store, shift.id).unwrap();
        assert!(matches!(get_shift(&store, shift.id), Err(WorkflowError::NotFound(_))));
        assert!(matches!(delete_shift(&store, shift.id), Err(WorkflowError::NotFound(_))));
    }

    #[test]
    fn test_delete_keeps_orphaned_availability() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        submit_availability(&store, "Ann", &[shift.id.to_string()], true).unwrap();
        delete_shift(&store, shift.id).unwrap();
        assert_eq!(list_availability(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_update_merges() {
        let store = MemoryStore::new();
        let shift = create_shift(&store, draft("a")).unwrap();
        let updated = update_shift(
            &store,
            shift.id,
            ShiftPatch {
                title: Some("b".to_string()),
                potential_workers: Some(vec!["Cy".to_string()]),
                ..ShiftPatch::default()
            },
        )
        .unwrap();
        assert_eq!(updated.title, "b");
        assert_eq!(updated.start, shift.start);
        assert_eq!(names(&updated).1, ["Cy"]);
        assert!(matches!(
            update_shift(&store, ShiftId(99), ShiftPatch::default()),
            Err(WorkflowError::NotFound(_))
        ));
    }
}
