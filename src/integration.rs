//! JSON-over-HTTP interface for the frontend
//!
//! Request bodies must be sent with `Content-Type: application/json`.
//! Errors are always `{"message": str}`, plus `"errors"` for rejected batches.

use crate::{
    data::*,
    store::Store,
    workflow::{self, WorkflowError},
};
use rouille::{Request, Response, input::json::JsonError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

type Result<T> = std::result::Result<T, ApiError>;

/// Error returned from a request handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// The request needs the administrator password.
    #[error("this action requires the administrator password")]
    Unauthorized,

    /// No handler for this method and path.
    #[error("no such endpoint")]
    NoRoute,

    /// The operation itself failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl From<JsonError> for ApiError {
    fn from(e: JsonError) -> Self {
        Self::BadRequest(format!("invalid request body: {e}"))
    }
}

impl ApiError {
    /// HTTP status the error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized => 401,
            Self::NoRoute => 404,
            Self::Workflow(e) => match e {
                WorkflowError::Invalid(_) | WorkflowError::InvalidBatch { .. } => 400,
                WorkflowError::NotFound(_) => 404,
                WorkflowError::Store(_) => 500,
            },
        }
    }

    fn into_response(self) -> Response {
        let status = self.status();
        if status >= 500 {
            tracing::error!(error = ?self, "request failed");
        }
        let body = match &self {
            Self::Workflow(WorkflowError::InvalidBatch { errors, .. }) => {
                json!({ "message": self.to_string(), "errors": errors })
            }
            _ => json!({ "message": self.to_string() }),
        };
        let response = Response::json(&body).with_status_code(status);
        if let Self::Unauthorized = self {
            response.with_additional_header("WWW-Authenticate", "Bearer")
        } else {
            response
        }
    }
}

/// Who is making a request.
///
/// Derived from the `Authorization: Bearer <password>` header on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// May do anything.
    Admin,
    /// May read and submit availability.
    Worker,
}

impl Session {
    /// Without a configured password everyone is an admin.
    pub fn from_request(request: &Request, admin_password: Option<&str>) -> Self {
        let Some(expected) = admin_password else {
            return Self::Admin;
        };
        match request
            .header("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            Some(given) if given.trim() == expected => Self::Admin,
            _ => Self::Worker,
        }
    }

    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] unless this is an admin session.
    pub fn require_admin(self) -> Result<()> {
        match self {
            Self::Admin => Ok(()),
            Self::Worker => Err(ApiError::Unauthorized),
        }
    }
}

/// Body of `POST /shifts`.
///
/// # Syntax
/// ```json
/// { "shift": {
///     "title": str,
///     "start": datetime,
///     "end": datetime,            // must be after `start`
///     "allDay": bool?,
///     "role": str?,
///     "acceptedWorkers": [str]?,  // empty or missing means undecided
///     "potentialWorkers": [str]?
/// } }
/// ```
/// or `{ "shifts": [ <same as above>, ... ] }` to create several at once.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CreateShifts {
    Shift(ShiftDraft),
    Shifts(Vec<ShiftDraft>),
}

/// Body of the availability endpoints.
///
/// # Syntax
/// ```json
/// { "name": str, "shiftIds": [ShiftId] }
/// ```
/// `availableShifts` is accepted in place of `shiftIds`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityBody {
    name: String,
    #[serde(alias = "availableShifts")]
    shift_ids: Vec<String>,
}

/// Body of `POST /shifts/:id/accept`.
///
/// # Syntax
/// ```json
/// { "workerName": str }      // accept exactly this worker
/// { "workerNames": [str] }   // accept exactly these workers; [] accepts nobody
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptBody {
    worker_name: Option<String>,
    worker_names: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct Message<T> {
    message: String,
    #[serde(flatten)]
    body: T,
}

fn message<T: Serialize>(status: u16, message: impl Into<String>, body: T) -> Response {
    Response::json(&Message {
        message: message.into(),
        body,
    })
    .with_status_code(status)
}

/// Everything a request handler needs.
#[derive(Clone)]
pub struct App {
    store: Arc<dyn Store>,
    admin_password: Option<String>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl App {
    /// Serve `store`, requiring `admin_password` for administrative requests if provided.
    pub fn new(store: Arc<dyn Store>, admin_password: Option<String>) -> Self {
        Self {
            store,
            admin_password,
        }
    }

    /// Handle one request, logging its outcome.
    pub fn handle(&self, request: &Request) -> Response {
        rouille::log_custom(
            request,
            |request, response, elapsed| {
                tracing::info!(
                    method = %request.method(),
                    url = %request.raw_url(),
                    status = response.status_code,
                    ?elapsed,
                    "request"
                );
            },
            |request, elapsed| {
                tracing::error!(
                    method = %request.method(),
                    url = %request.raw_url(),
                    ?elapsed,
                    "handler panicked"
                );
            },
            || self.route(request).unwrap_or_else(ApiError::into_response),
        )
    }

    fn route(&self, request: &Request) -> Result<Response> {
        let session = Session::from_request(request, self.admin_password.as_deref());
        rouille::router!(request,
            (GET) (/shifts) => { self.list_shifts() },
            (POST) (/shifts) => { self.create_shifts(request, session) },
            (PUT) (/shifts) => { self.submit_availability(request, false) },
            (GET) (/shifts/{id: String}) => { self.get_shift(&id) },
            (PUT) (/shifts/{id: String}) => { self.update_shift(request, session, &id) },
            (DELETE) (/shifts/{id: String}) => { self.delete_shift(session, &id) },
            (POST) (/shifts/{id: String}/accept) => { self.accept(request, session, &id) },
            (GET) (/availability) => { self.list_availability() },
            (GET) (/availabilities) => { self.list_availability() },
            (POST) (/availability) => { self.submit_availability(request, true) },
            (PUT) (/availability) => { self.replace_availability(request) },
            (POST) (/calendar/finalize) => { self.finalize(session) },
            _ => Err(ApiError::NoRoute)
        )
    }

    /// `GET /shifts`: every shift, ordered by start.
    fn list_shifts(&self) -> Result<Response> {
        let shifts = workflow::list_shifts(&*self.store)?;
        Ok(Response::json(&json!({ "shifts": shifts })))
    }

    /// `GET /shifts/:id`
    fn get_shift(&self, id: &str) -> Result<Response> {
        let shift = workflow::get_shift(&*self.store, workflow::parse_id(id)?)?;
        Ok(Response::json(&shift))
    }

    /// `POST /shifts`: create one or several shifts. See [`CreateShifts`].
    ///
    /// Several shifts are created all or nothing.
    fn create_shifts(&self, request: &Request, session: Session) -> Result<Response> {
        session.require_admin()?;
        let body = rouille::input::json_input::<CreateShifts>(request).map_err(|e| match e {
            JsonError::ParseError(e) => ApiError::BadRequest(format!(
                r#"expected {{"shift": {{...}}}} or {{"shifts": [...]}}: {e}"#
            )),
            e => e.into(),
        })?;
        Ok(match body {
            CreateShifts::Shift(draft) => {
                let shift = workflow::create_shift(&*self.store, draft)?;
                message(201, "shift created", json!({ "shift": shift }))
            }
            CreateShifts::Shifts(drafts) => {
                let shifts = workflow::create_shifts(&*self.store, drafts)?;
                message(
                    201,
                    format!("{} shifts created", shifts.len()),
                    json!({ "shifts": shifts }),
                )
            }
        })
    }

    /// `PUT /shifts/:id`: overwrite only the fields provided.
    ///
    /// # Syntax
    /// Any subset of the fields of [`CreateShifts`], unwrapped.
    /// `"acceptedWorkers": []` records a decision to accept nobody.
    fn update_shift(&self, request: &Request, session: Session, id: &str) -> Result<Response> {
        session.require_admin()?;
        let id = workflow::parse_id(id)?;
        let patch = rouille::input::json_input::<ShiftPatch>(request)?;
        let shift = workflow::update_shift(&*self.store, id, patch)?;
        Ok(message(200, "shift updated", json!({ "shift": shift })))
    }

    /// `DELETE /shifts/:id`
    fn delete_shift(&self, session: Session, id: &str) -> Result<Response> {
        session.require_admin()?;
        let shift = workflow::delete_shift(&*self.store, workflow::parse_id(id)?)?;
        Ok(message(200, "shift deleted", json!({ "shift": shift })))
    }

    /// `POST /shifts/:id/accept`: replace the accepted workers. See [`AcceptBody`].
    fn accept(&self, request: &Request, session: Session, id: &str) -> Result<Response> {
        session.require_admin()?;
        let id = workflow::parse_id(id)?;
        let shift = match rouille::input::json_input::<AcceptBody>(request)? {
            AcceptBody {
                worker_name: Some(name),
                worker_names: None,
            } => workflow::accept_worker(&*self.store, id, &name)?,
            AcceptBody {
                worker_name: None,
                worker_names: Some(names),
            } => workflow::accept_workers(&*self.store, id, &names)?,
            _ => {
                return Err(ApiError::BadRequest(
                    "provide exactly one of `workerName` or `workerNames`".to_string(),
                ));
            }
        };
        Ok(message(200, "accepted workers updated", json!({ "shift": shift })))
    }

    /// `GET /availability`
    fn list_availability(&self) -> Result<Response> {
        let availabilities = workflow::list_availability(&*self.store)?;
        Ok(Response::json(&json!({ "availabilities": availabilities })))
    }

    /// `PUT /shifts` and `POST /availability`: add a worker to shifts. See [`AvailabilityBody`].
    ///
    /// Only `POST /availability` records standalone availability.
    /// Responds 404, still listing the failures, if no shift was updated.
    fn submit_availability(&self, request: &Request, mirror: bool) -> Result<Response> {
        let body = rouille::input::json_input::<AvailabilityBody>(request)?;
        let submission =
            workflow::submit_availability(&*self.store, &body.name, &body.shift_ids, mirror)?;
        Ok(if submission.succeeded.is_empty() {
            message(404, "no shifts were updated", submission)
        } else {
            let status = if mirror { 201 } else { 200 };
            let count = submission.succeeded.len();
            message(status, format!("availability recorded for {count} shifts"), submission)
        })
    }

    /// `PUT /availability`: make the listed shifts the worker's complete availability.
    /// See [`AvailabilityBody`].
    fn replace_availability(&self, request: &Request) -> Result<Response> {
        let body = rouille::input::json_input::<AvailabilityBody>(request)?;
        let report = workflow::replace_availability(&*self.store, &body.name, &body.shift_ids)?;
        Ok(message(200, "availability replaced", report))
    }

    /// `POST /calendar/finalize`
    fn finalize(&self, session: Session) -> Result<Response> {
        session.require_admin()?;
        let report = workflow::finalize(&*self.store)?;
        Ok(message(200, "calendar finalized", report))
    }
}
