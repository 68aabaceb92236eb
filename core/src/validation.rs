//! Client-side validation of create/update payloads before they are sent.
//!
//! Each rule yields a `FieldError` keyed by the JSON field name so a form can
//! show the message next to the input. All rules run; errors are collected
//! rather than stopping at the first one.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::{
    AppointmentCreate, AppointmentStatus, AppointmentUpdate, DoctorCreate, DoctorUpdate,
    MedicalHistoryCreate, MedicalHistoryUpdate, PatientCreate, PatientUpdate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message recorded for `field`.
    pub fn message(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `local@domain.tld` with no whitespace and a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.ends_with('.'),
        None => false,
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// RFC 3339, or the `YYYY-MM-DDTHH:MM[:SS]` a datetime-local input produces.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn check_dob(errors: &mut ValidationErrors, dob: &str) {
    if is_blank(dob) {
        errors.add("dob", "Date of birth is required");
        return;
    }
    match parse_date(dob) {
        None => errors.add("dob", "Invalid date"),
        Some(date) if date > Utc::now().date_naive() => {
            errors.add("dob", "Date of birth cannot be in the future");
        }
        Some(_) => {}
    }
}

fn check_status(errors: &mut ValidationErrors, status: &str) {
    // Exact names only; No-Show is only ever set by the backend.
    const FORM_STATUSES: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];
    if !FORM_STATUSES.iter().any(|s| s.as_str() == status) {
        errors.add("status", "Status must be Scheduled, Completed or Cancelled");
    }
}

fn check_date_time(errors: &mut ValidationErrors, value: &str) {
    if is_blank(value) {
        errors.add("dateTime", "Date and time are required");
    } else if parse_date_time(value).is_none() {
        errors.add("dateTime", "Invalid date and time");
    }
}

impl Validate for PatientCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if is_blank(&self.name) {
            errors.add("name", "Name is required");
        }
        if is_blank(&self.email) {
            errors.add("email", "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.add("email", "Invalid email");
        }
        check_dob(&mut errors, &self.dob);
        errors.into_result()
    }
}

impl Validate for PatientUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.as_deref().is_some_and(is_blank) {
            errors.add("name", "Name is required");
        }
        if let Some(dob) = &self.dob {
            check_dob(&mut errors, dob);
        }
        errors.into_result()
    }
}

impl Validate for DoctorCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if is_blank(&self.name) {
            errors.add("name", "Name is required");
        }
        if is_blank(&self.specialty) {
            errors.add("specialty", "Specialty is required");
        }
        errors.into_result()
    }
}

impl Validate for DoctorUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.as_deref().is_some_and(is_blank) {
            errors.add("name", "Name is required");
        }
        if self.specialty.as_deref().is_some_and(is_blank) {
            errors.add("specialty", "Specialty is required");
        }
        errors.into_result()
    }
}

impl Validate for AppointmentCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.patient_id <= 0 {
            errors.add("patientId", "Patient is required");
        }
        if self.doctor_id <= 0 {
            errors.add("doctorId", "Doctor is required");
        }
        check_date_time(&mut errors, &self.date_time);
        if let Some(status) = &self.status {
            check_status(&mut errors, status);
        }
        errors.into_result()
    }
}

impl Validate for AppointmentUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(date_time) = &self.date_time {
            check_date_time(&mut errors, date_time);
        }
        if let Some(status) = &self.status {
            check_status(&mut errors, status);
        }
        errors.into_result()
    }
}

impl Validate for MedicalHistoryCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.patient_id <= 0 {
            errors.add("patientId", "Patient ID is required");
        }
        if is_blank(&self.diagnosis) {
            errors.add("diagnosis", "Diagnosis is required");
        }
        if is_blank(&self.date) {
            errors.add("date", "Date is required");
        }
        errors.into_result()
    }
}

impl Validate for MedicalHistoryUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.diagnosis.as_deref().is_some_and(is_blank) {
            errors.add("diagnosis", "Diagnosis is required");
        }
        if self.date.as_deref().is_some_and(is_blank) {
            errors.add("date", "Date is required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn patient() -> PatientCreate {
        PatientCreate {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: None,
            dob: "1990-01-01".to_string(),
        }
    }

    #[rstest]
    #[case("jane@x.com", true)]
    #[case("a.b+c@clinic.example.org", true)]
    #[case("jane", false)]
    #[case("@x.com", false)]
    #[case("jane@x", false)]
    #[case("jane@@x.com", false)]
    #[case("jane doe@x.com", false)]
    #[case("jane@.com", false)]
    fn email_shape(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid, "{email}");
    }

    #[rstest]
    #[case("2025-04-13T14:30", true)]
    #[case("2025-04-13T14:30:15", true)]
    #[case("2025-04-13T14:30:00Z", true)]
    #[case("2025-04-13T14:30:00+02:00", true)]
    #[case("2025-04-13", false)]
    #[case("tomorrow", false)]
    fn date_time_formats(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(parse_date_time(value).is_some(), valid, "{value}");
    }

    #[test]
    fn valid_patient_passes() {
        assert!(patient().validate().is_ok());
    }

    #[test]
    fn patient_collects_every_error() {
        let input = PatientCreate {
            name: "  ".to_string(),
            email: "nope".to_string(),
            phone: None,
            dob: String::new(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert_eq!(errors.message("name"), Some("Name is required"));
        assert_eq!(errors.message("email"), Some("Invalid email"));
        assert_eq!(errors.message("dob"), Some("Date of birth is required"));
    }

    #[test]
    fn future_dob_is_rejected() {
        let input = PatientCreate {
            dob: "2999-01-01".to_string(),
            ..patient()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.message("dob"), Some("Date of birth cannot be in the future"));
    }

    #[test]
    fn patient_update_checks_only_present_fields() {
        assert!(PatientUpdate::default().validate().is_ok());
        let update = PatientUpdate {
            dob: Some("13/04/1990".to_string()),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err().message("dob"), Some("Invalid date"));
    }

    #[test]
    fn doctor_requires_name_and_specialty() {
        let input = DoctorCreate {
            name: "Dr. Smith".to_string(),
            specialty: String::new(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.to_string(), "specialty: Specialty is required");
    }

    #[rstest]
    #[case(Some("Scheduled"), true)]
    #[case(Some("Cancelled"), true)]
    #[case(Some("completed"), false)]
    #[case(Some("cancelled"), false)]
    #[case(Some("  SCHEDULED  "), false)]
    #[case(Some(" Scheduled"), false)]
    #[case(None, true)]
    #[case(Some("No-Show"), false)]
    #[case(Some("Pending"), false)]
    fn appointment_status(#[case] status: Option<&str>, #[case] valid: bool) {
        let input = AppointmentCreate {
            patient_id: 1,
            doctor_id: 2,
            date_time: "2025-04-13T14:30".to_string(),
            status: status.map(str::to_string),
        };
        assert_eq!(input.validate().is_ok(), valid);
    }

    #[test]
    fn appointment_requires_ids_and_time() {
        let input = AppointmentCreate {
            patient_id: 0,
            doctor_id: -1,
            date_time: String::new(),
            status: None,
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.message("patientId"), Some("Patient is required"));
        assert_eq!(errors.message("doctorId"), Some("Doctor is required"));
        assert_eq!(errors.message("dateTime"), Some("Date and time are required"));
    }

    #[test]
    fn medical_history_trims_diagnosis() {
        let input = MedicalHistoryCreate {
            patient_id: 1,
            diagnosis: "   ".to_string(),
            treatment: None,
            date: "2024-01-01".to_string(),
        };
        assert_eq!(
            input.validate().unwrap_err().message("diagnosis"),
            Some("Diagnosis is required")
        );
    }

    #[test]
    fn medical_history_update_rejects_blank_date() {
        let update = MedicalHistoryUpdate {
            date: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(MedicalHistoryUpdate::default().validate().is_ok());
    }
}
