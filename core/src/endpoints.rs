//! Typed paths, list filters and per-entity calls for the clinic API.
//!
//! Path helpers are what screens mount resources on. The `ApiClient` methods
//! below are the hard-fail counterpart of `Resource`: they return `Result`
//! and leave state tracking to the caller.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{
    Appointment, AppointmentCreate, AppointmentUpdate, Doctor, DoctorCreate, DoctorUpdate,
    MedicalHistory, MedicalHistoryCreate, MedicalHistoryUpdate, Patient, PatientCreate,
    PatientUpdate,
};

pub fn patients() -> String {
    "/patients".to_string()
}

pub fn patient(id: i64) -> String {
    format!("/patients/{id}")
}

pub fn doctors() -> String {
    "/doctors".to_string()
}

pub fn doctor(id: i64) -> String {
    format!("/doctors/{id}")
}

pub fn appointments() -> String {
    "/appointments".to_string()
}

pub fn appointment(id: i64) -> String {
    format!("/appointments/{id}")
}

pub fn medical_histories() -> String {
    "/medical-histories".to_string()
}

pub fn medical_history(id: i64) -> String {
    format!("/medical-histories/{id}")
}

pub fn patient_medical_histories(patient_id: i64) -> String {
    format!("/medical-histories/patient/{patient_id}")
}

/// Anything that renders as query-string pairs. `None` fields are omitted.
pub trait QueryParams {
    fn to_query(&self) -> Vec<(String, String)>;
}

impl QueryParams for [(String, String)] {
    fn to_query(&self) -> Vec<(String, String)> {
        self.to_vec()
    }
}

impl QueryParams for Vec<(String, String)> {
    fn to_query(&self) -> Vec<(String, String)> {
        self.clone()
    }
}

fn push<V: ToString>(query: &mut Vec<(String, String)>, key: &str, value: &Option<V>) {
    if let Some(value) = value {
        query.push((key.to_string(), value.to_string()));
    }
}

/// Plain skip/limit passthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl Page {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }
}

impl QueryParams for Page {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push(&mut query, "skip", &self.skip);
        push(&mut query, "limit", &self.limit);
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub page: Page,
}

impl QueryParams for PatientFilter {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push(&mut query, "name", &self.name);
        push(&mut query, "email", &self.email);
        query.extend(self.page.to_query());
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    pub specialty: Option<String>,
    pub page: Page,
}

impl QueryParams for DoctorFilter {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push(&mut query, "specialty", &self.specialty);
        query.extend(self.page.to_query());
        query
    }
}

/// `date` matches appointments on that day (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub page: Page,
}

impl QueryParams for AppointmentFilter {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push(&mut query, "patient_id", &self.patient_id);
        push(&mut query, "doctor_id", &self.doctor_id);
        push(&mut query, "date", &self.date);
        query.extend(self.page.to_query());
        query
    }
}

impl<X: Transport> ApiClient<X> {
    pub async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>, ApiError> {
        self.get(&patients(), &filter.to_query()).await
    }

    pub async fn get_patient(&self, id: i64) -> Result<Patient, ApiError> {
        self.get(&patient(id), &[]).await
    }

    pub async fn create_patient(&self, input: &PatientCreate) -> Result<Patient, ApiError> {
        self.post(&patients(), input).await
    }

    pub async fn update_patient(&self, id: i64, input: &PatientUpdate) -> Result<Patient, ApiError> {
        self.put(&patient(id), input).await
    }

    pub async fn delete_patient(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&patient(id)).await
    }

    pub async fn list_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, ApiError> {
        self.get(&doctors(), &filter.to_query()).await
    }

    pub async fn get_doctor(&self, id: i64) -> Result<Doctor, ApiError> {
        self.get(&doctor(id), &[]).await
    }

    pub async fn create_doctor(&self, input: &DoctorCreate) -> Result<Doctor, ApiError> {
        self.post(&doctors(), input).await
    }

    pub async fn update_doctor(&self, id: i64, input: &DoctorUpdate) -> Result<Doctor, ApiError> {
        self.put(&doctor(id), input).await
    }

    pub async fn delete_doctor(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&doctor(id)).await
    }

    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, ApiError> {
        self.get(&appointments(), &filter.to_query()).await
    }

    pub async fn get_appointment(&self, id: i64) -> Result<Appointment, ApiError> {
        self.get(&appointment(id), &[]).await
    }

    pub async fn create_appointment(
        &self,
        input: &AppointmentCreate,
    ) -> Result<Appointment, ApiError> {
        self.post(&appointments(), input).await
    }

    pub async fn update_appointment(
        &self,
        id: i64,
        input: &AppointmentUpdate,
    ) -> Result<Appointment, ApiError> {
        self.put(&appointment(id), input).await
    }

    pub async fn delete_appointment(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&appointment(id)).await
    }

    pub async fn list_medical_histories(
        &self,
        page: &Page,
    ) -> Result<Vec<MedicalHistory>, ApiError> {
        self.get(&medical_histories(), &page.to_query()).await
    }

    pub async fn list_patient_medical_histories(
        &self,
        patient_id: i64,
        page: &Page,
    ) -> Result<Vec<MedicalHistory>, ApiError> {
        self.get(&patient_medical_histories(patient_id), &page.to_query())
            .await
    }

    pub async fn get_medical_history(&self, id: i64) -> Result<MedicalHistory, ApiError> {
        self.get(&medical_history(id), &[]).await
    }

    pub async fn create_medical_history(
        &self,
        input: &MedicalHistoryCreate,
    ) -> Result<MedicalHistory, ApiError> {
        self.post(&medical_histories(), input).await
    }

    pub async fn update_medical_history(
        &self,
        id: i64,
        input: &MedicalHistoryUpdate,
    ) -> Result<MedicalHistory, ApiError> {
        self.put(&medical_history(id), input).await
    }

    pub async fn delete_medical_history(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&medical_history(id)).await
    }
}
