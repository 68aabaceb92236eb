//! In-memory stand-in for the clinic REST backend.
//!
//! Serves `/patients`, `/doctors`, `/appointments` and `/medical-histories`
//! with the same JSON shapes, filters and status codes as the real service,
//! so the client crate can be exercised end to end without a database.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

const DEFAULT_LIMIT: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub medical_history: Option<Vec<MedicalHistory>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub appointments: Option<Vec<Appointment>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub appointments: Option<Vec<Appointment>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date_time: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    pub id: i64,
    pub patient_id: i64,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatient {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub dob: String,
}

#[derive(Deserialize)]
pub struct UpdatePatient {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateDoctor {
    pub name: String,
    pub specialty: String,
}

#[derive(Deserialize)]
pub struct UpdateDoctor {
    pub name: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date_time: String,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointment {
    pub date_time: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicalHistory {
    pub patient_id: i64,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub date: String,
}

#[derive(Deserialize)]
pub struct UpdateMedicalHistory {
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub date: Option<String>,
}

/// Query string accepted by every list endpoint; each one reads the fields
/// that apply to it.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl ListQuery {
    fn page<T>(&self, rows: impl Iterator<Item = T>) -> Vec<T> {
        rows.skip(self.skip.unwrap_or(0))
            .take(self.limit.unwrap_or(DEFAULT_LIMIT))
            .collect()
    }
}

/// 404 with a `{"detail": ...}` body.
pub struct NotFound(&'static str);

impl IntoResponse for NotFound {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": format!("{} not found", self.0) });
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    }
}

/// Per-table id sequence; ids start at 1 and are never reused.
#[derive(Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Default)]
struct Sequences {
    patients: Sequence,
    doctors: Sequence,
    appointments: Sequence,
    histories: Sequence,
}

#[derive(Default)]
pub struct Store {
    ids: Sequences,
    patients: BTreeMap<i64, Patient>,
    doctors: BTreeMap<i64, Doctor>,
    appointments: BTreeMap<i64, Appointment>,
    histories: BTreeMap<i64, MedicalHistory>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/doctors", get(list_doctors).post(create_doctor))
        .route(
            "/doctors/{id}",
            get(get_doctor).put(update_doctor).delete(delete_doctor),
        )
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route(
            "/medical-histories",
            get(list_histories).post(create_history),
        )
        .route(
            "/medical-histories/{id}",
            get(get_history).put(update_history).delete(delete_history),
        )
        .route("/medical-histories/patient/{id}", get(list_patient_histories))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn contains_ignore_case(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_ref()
        .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

// --- patients ---

async fn list_patients(State(db): State<Db>, Query(q): Query<ListQuery>) -> Json<Vec<Patient>> {
    let store = db.read().await;
    let rows = store
        .patients
        .values()
        .filter(|p| contains_ignore_case(&p.name, &q.name))
        .filter(|p| contains_ignore_case(&p.email, &q.email))
        .cloned();
    Json(q.page(rows))
}

async fn create_patient(
    State(db): State<Db>,
    Json(input): Json<CreatePatient>,
) -> (StatusCode, Json<Patient>) {
    let mut store = db.write().await;
    let patient = Patient {
        id: store.ids.patients.next(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        dob: input.dob,
        medical_history: None,
        appointments: None,
    };
    tracing::info!(id = patient.id, "patient created");
    store.patients.insert(patient.id, patient.clone());
    (StatusCode::CREATED, Json(patient))
}

async fn get_patient(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, NotFound> {
    let store = db.read().await;
    let mut patient = store.patients.get(&id).cloned().ok_or(NotFound("Patient"))?;
    patient.medical_history = Some(
        store
            .histories
            .values()
            .filter(|h| h.patient_id == id)
            .cloned()
            .collect(),
    );
    patient.appointments = Some(
        store
            .appointments
            .values()
            .filter(|a| a.patient_id == id)
            .cloned()
            .collect(),
    );
    Ok(Json(patient))
}

async fn update_patient(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePatient>,
) -> Result<Json<Patient>, NotFound> {
    let mut store = db.write().await;
    let patient = store.patients.get_mut(&id).ok_or(NotFound("Patient"))?;
    if let Some(name) = input.name {
        patient.name = name;
    }
    if let Some(phone) = input.phone {
        patient.phone = Some(phone);
    }
    if let Some(dob) = input.dob {
        patient.dob = dob;
    }
    Ok(Json(patient.clone()))
}

/// Removes the patient together with its appointments and history.
async fn delete_patient(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, NotFound> {
    let mut store = db.write().await;
    let patient = store.patients.remove(&id).ok_or(NotFound("Patient"))?;
    store.appointments.retain(|_, a| a.patient_id != id);
    store.histories.retain(|_, h| h.patient_id != id);
    tracing::info!(id, "patient deleted");
    Ok(Json(patient))
}

// --- doctors ---

async fn list_doctors(State(db): State<Db>, Query(q): Query<ListQuery>) -> Json<Vec<Doctor>> {
    let store = db.read().await;
    let rows = store
        .doctors
        .values()
        .filter(|d| contains_ignore_case(&d.specialty, &q.specialty))
        .cloned();
    Json(q.page(rows))
}

async fn create_doctor(
    State(db): State<Db>,
    Json(input): Json<CreateDoctor>,
) -> (StatusCode, Json<Doctor>) {
    let mut store = db.write().await;
    let doctor = Doctor {
        id: store.ids.doctors.next(),
        name: input.name,
        specialty: input.specialty,
        appointments: None,
    };
    store.doctors.insert(doctor.id, doctor.clone());
    (StatusCode::CREATED, Json(doctor))
}

async fn get_doctor(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Doctor>, NotFound> {
    let store = db.read().await;
    let mut doctor = store.doctors.get(&id).cloned().ok_or(NotFound("Doctor"))?;
    doctor.appointments = Some(
        store
            .appointments
            .values()
            .filter(|a| a.doctor_id == id)
            .cloned()
            .collect(),
    );
    Ok(Json(doctor))
}

async fn update_doctor(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateDoctor>,
) -> Result<Json<Doctor>, NotFound> {
    let mut store = db.write().await;
    let doctor = store.doctors.get_mut(&id).ok_or(NotFound("Doctor"))?;
    if let Some(name) = input.name {
        doctor.name = name;
    }
    if let Some(specialty) = input.specialty {
        doctor.specialty = specialty;
    }
    Ok(Json(doctor.clone()))
}

async fn delete_doctor(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Doctor>, NotFound> {
    let mut store = db.write().await;
    let doctor = store.doctors.remove(&id).ok_or(NotFound("Doctor"))?;
    store.appointments.retain(|_, a| a.doctor_id != id);
    Ok(Json(doctor))
}

// --- appointments ---

async fn list_appointments(
    State(db): State<Db>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<Appointment>> {
    let store = db.read().await;
    let rows = store
        .appointments
        .values()
        .filter(|a| q.patient_id.is_none_or(|id| a.patient_id == id))
        .filter(|a| q.doctor_id.is_none_or(|id| a.doctor_id == id))
        .filter(|a| q.date.as_ref().is_none_or(|d| a.date_time.starts_with(d.as_str())))
        .cloned();
    Json(q.page(rows))
}

async fn create_appointment(
    State(db): State<Db>,
    Json(input): Json<CreateAppointment>,
) -> Result<(StatusCode, Json<Appointment>), NotFound> {
    let mut store = db.write().await;
    if !store.patients.contains_key(&input.patient_id) {
        return Err(NotFound("Patient"));
    }
    if !store.doctors.contains_key(&input.doctor_id) {
        return Err(NotFound("Doctor"));
    }
    let appointment = Appointment {
        id: store.ids.appointments.next(),
        patient_id: input.patient_id,
        doctor_id: input.doctor_id,
        date_time: input.date_time,
        status: input.status.unwrap_or_else(|| "Scheduled".to_string()),
    };
    store.appointments.insert(appointment.id, appointment.clone());
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn get_appointment(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, NotFound> {
    let store = db.read().await;
    store
        .appointments
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(NotFound("Appointment"))
}

async fn update_appointment(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateAppointment>,
) -> Result<Json<Appointment>, NotFound> {
    let mut store = db.write().await;
    let appointment = store.appointments.get_mut(&id).ok_or(NotFound("Appointment"))?;
    if let Some(date_time) = input.date_time {
        appointment.date_time = date_time;
    }
    if let Some(status) = input.status {
        appointment.status = status;
    }
    Ok(Json(appointment.clone()))
}

async fn delete_appointment(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, NotFound> {
    let mut store = db.write().await;
    store
        .appointments
        .remove(&id)
        .map(Json)
        .ok_or(NotFound("Appointment"))
}

// --- medical histories ---

async fn list_histories(
    State(db): State<Db>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<MedicalHistory>> {
    let store = db.read().await;
    let rows = store
        .histories
        .values()
        .filter(|h| q.patient_id.is_none_or(|id| h.patient_id == id))
        .cloned();
    Json(q.page(rows))
}

async fn list_patient_histories(
    State(db): State<Db>,
    Path(patient_id): Path<i64>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<MedicalHistory>>, NotFound> {
    let store = db.read().await;
    if !store.patients.contains_key(&patient_id) {
        return Err(NotFound("Patient"));
    }
    let rows = store
        .histories
        .values()
        .filter(|h| h.patient_id == patient_id)
        .cloned();
    Ok(Json(q.page(rows)))
}

async fn create_history(
    State(db): State<Db>,
    Json(input): Json<CreateMedicalHistory>,
) -> Result<(StatusCode, Json<MedicalHistory>), NotFound> {
    let mut store = db.write().await;
    if !store.patients.contains_key(&input.patient_id) {
        return Err(NotFound("Patient"));
    }
    let history = MedicalHistory {
        id: store.ids.histories.next(),
        patient_id: input.patient_id,
        diagnosis: input.diagnosis,
        treatment: input.treatment,
        date: input.date,
    };
    store.histories.insert(history.id, history.clone());
    Ok((StatusCode::CREATED, Json(history)))
}

async fn get_history(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<MedicalHistory>, NotFound> {
    let store = db.read().await;
    store
        .histories
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(NotFound("Medical history"))
}

async fn update_history(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateMedicalHistory>,
) -> Result<Json<MedicalHistory>, NotFound> {
    let mut store = db.write().await;
    let history = store.histories.get_mut(&id).ok_or(NotFound("Medical history"))?;
    if let Some(diagnosis) = input.diagnosis {
        history.diagnosis = diagnosis;
    }
    if let Some(treatment) = input.treatment {
        history.treatment = Some(treatment);
    }
    if let Some(date) = input.date {
        history.date = date;
    }
    Ok(Json(history.clone()))
}

async fn delete_history(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<MedicalHistory>, NotFound> {
    let mut store = db.write().await;
    store
        .histories
        .remove(&id)
        .map(Json)
        .ok_or(NotFound("Medical history"))
}
