//! Resource access layer for the clinic administration front-end.
//!
//! # Overview
//! Views read and write patients, doctors, appointments and medical histories
//! through a REST backend. This crate standardizes how they do it: one shared
//! `ApiClient` per backend, and one `Resource<T, _>` per logical resource on
//! screen, tracking `{data, is_loading, error}` for that resource.
//!
//! # Design
//! - `ApiClient` is constructed explicitly and passed around in an `Arc`;
//!   there is no process-wide client.
//! - Requests and responses are plain data (`http`); a `Transport` performs
//!   the I/O, so tests can script the backend.
//! - `Resource` operations soft-fail: errors land in the state and the call
//!   resolves to `None`/`false`. `ResourceState::outcome` gives callers a
//!   discriminated result when they want one.
//! - Every operation carries a `CancelToken`; unmounting a resource aborts
//!   its in-flight requests and stops state updates.
//! - `types` mirrors the backend schema; `validation` and `format` cover the
//!   client-side checks and display helpers the screens share.

pub mod cancel;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod format;
pub mod http;
pub mod resource;
pub mod transport;
pub mod types;
pub mod validation;

pub use cancel::CancelToken;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use endpoints::QueryParams;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::{RequestConfig, Resource, ResourceState};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Appointment, AppointmentCreate, AppointmentStatus, AppointmentUpdate, Doctor, DoctorCreate,
    DoctorUpdate, MedicalHistory, MedicalHistoryCreate, MedicalHistoryUpdate, Patient,
    PatientCreate, PatientUpdate,
};
pub use validation::{Validate, ValidationErrors};
