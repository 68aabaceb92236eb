//! Resource and client operations against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread, then drives the
//! resource layer over real HTTP through `UreqTransport`. Each test gets a
//! fresh server so ids start at 1.

use std::sync::Arc;
use std::time::Duration;

use clinic_core::endpoints::{self, AppointmentFilter, DoctorFilter, Page, PatientFilter};
use clinic_core::{
    ApiClient, ApiError, Appointment, AppointmentCreate, ClientConfig, Doctor, DoctorCreate,
    MedicalHistory, MedicalHistoryCreate, Patient, PatientCreate, PatientUpdate, RequestConfig,
    Resource, UreqTransport,
};

fn start_server() -> Arc<ApiClient<UreqTransport>> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    Arc::new(ApiClient::new(
        ClientConfig::new(&format!("http://{addr}")),
        UreqTransport::new(),
    ))
}

fn jane() -> PatientCreate {
    PatientCreate {
        name: "Jane Doe".to_string(),
        email: "jane@x.com".to_string(),
        phone: None,
        dob: "1990-01-01".to_string(),
    }
}

#[tokio::test]
async fn fetch_filtered_patients_into_state() {
    let client = start_server();
    client.create_patient(&jane()).await.unwrap();
    client
        .create_patient(&PatientCreate {
            name: "Ann Smith".to_string(),
            email: "ann@x.com".to_string(),
            phone: None,
            dob: "1985-06-30".to_string(),
        })
        .await
        .unwrap();

    let patients: Resource<Vec<Patient>, _> =
        Resource::mount(Arc::clone(&client), Some(endpoints::patients().as_str()));
    let filter = PatientFilter {
        name: Some("Doe".to_string()),
        email: None,
        page: Page::new(0, 10),
    };
    let data = patients
        .fetch_data(RequestConfig::new().query(&filter))
        .await
        .unwrap();

    let expected = vec![Patient {
        id: 1,
        name: "Jane Doe".to_string(),
        email: "jane@x.com".to_string(),
        phone: None,
        dob: "1990-01-01".to_string(),
        medical_history: None,
        appointments: None,
    }];
    assert_eq!(data, expected);
    let state = patients.state();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(state.data, Some(expected));
}

#[tokio::test]
async fn repeated_fetch_is_stable() {
    let client = start_server();
    client.create_patient(&jane()).await.unwrap();

    let patients: Resource<Vec<Patient>, _> =
        Resource::mount(Arc::clone(&client), Some(endpoints::patients().as_str()));
    let first = patients.fetch_data(RequestConfig::new()).await;
    let second = patients.fetch_data(RequestConfig::new()).await;
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn doctor_crud_through_one_resource() {
    let client = start_server();
    let doctor: Resource<Doctor, _> = Resource::mount(Arc::clone(&client), None);

    // create
    let input = DoctorCreate {
        name: "Dr. Smith".to_string(),
        specialty: "Cardiology".to_string(),
    };
    let created = doctor
        .post_data(&endpoints::doctors(), &input, RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(created.specialty, "Cardiology");

    // fetch by explicit path
    let fetched = doctor
        .fetch_data(RequestConfig::new().path(endpoints::doctor(created.id)))
        .await
        .unwrap();
    assert_eq!(fetched.name, "Dr. Smith");
    assert_eq!(fetched.appointments, Some(Vec::new()));

    // update
    let update = serde_json::json!({ "specialty": "Neurology" });
    let updated = doctor
        .put_data(&endpoints::doctor(created.id), &update, RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(updated.specialty, "Neurology");
    assert_eq!(doctor.state().data.unwrap().specialty, "Neurology");

    // delete
    assert!(doctor.delete_data(&endpoints::doctor(created.id), RequestConfig::new()).await);
    let state = doctor.state();
    assert!(state.data.is_none());
    assert!(state.error.is_none());

    // fetch after delete
    let missing = doctor
        .fetch_data(RequestConfig::new().path(endpoints::doctor(created.id)))
        .await;
    assert!(missing.is_none());
    assert_eq!(doctor.state().error, Some(ApiError::NotFound));

    // delete again
    assert!(!doctor.delete_data(&endpoints::doctor(created.id), RequestConfig::new()).await);
    assert_eq!(doctor.state().error, Some(ApiError::NotFound));
}

#[tokio::test]
async fn typed_client_calls_cover_every_entity() {
    let client = start_server();

    let patient = client.create_patient(&jane()).await.unwrap();
    let doctor = client
        .create_doctor(&DoctorCreate {
            name: "Dr. Smith".to_string(),
            specialty: "Cardiology".to_string(),
        })
        .await
        .unwrap();
    let appointment = client
        .create_appointment(&AppointmentCreate {
            patient_id: patient.id,
            doctor_id: doctor.id,
            date_time: "2025-04-13T14:30".to_string(),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(appointment.status, "Scheduled");

    let history = client
        .create_medical_history(&MedicalHistoryCreate {
            patient_id: patient.id,
            diagnosis: "Hypertension".to_string(),
            treatment: Some("Lisinopril".to_string()),
            date: "2024-11-02".to_string(),
        })
        .await
        .unwrap();

    let updated = client
        .update_patient(
            patient.id,
            &PatientUpdate {
                phone: Some("5551234567".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("5551234567"));

    let detail = client.get_patient(patient.id).await.unwrap();
    assert_eq!(detail.medical_history.as_ref().map(Vec::len), Some(1));
    assert_eq!(detail.appointments.as_ref().map(Vec::len), Some(1));

    let by_doctor = client
        .list_appointments(&AppointmentFilter {
            doctor_id: Some(doctor.id),
            date: Some("2025-04-13".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_doctor, vec![appointment.clone()]);

    let cardiologists = client
        .list_doctors(&DoctorFilter {
            specialty: Some("cardio".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cardiologists.len(), 1);

    let histories = client
        .list_patient_medical_histories(patient.id, &Page::default())
        .await
        .unwrap();
    assert_eq!(histories, vec![history.clone()]);
    assert_eq!(client.get_medical_history(history.id).await.unwrap(), history);

    client.delete_appointment(appointment.id).await.unwrap();
    let err = client.get_appointment(appointment.id).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound);

    client.delete_medical_history(history.id).await.unwrap();
    assert!(client
        .list_medical_histories(&Page::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn patient_histories_resource_reports_unknown_patient() {
    let client = start_server();
    let histories: Resource<Vec<MedicalHistory>, _> = Resource::mount(
        Arc::clone(&client),
        Some(endpoints::patient_medical_histories(42).as_str()),
    );

    assert!(histories.fetch_data(RequestConfig::new()).await.is_none());
    let state = histories.state();
    assert!(!state.is_loading);
    assert!(state.data.is_none());
    assert_eq!(state.error, Some(ApiError::NotFound));
}

#[tokio::test]
async fn unprocessable_payload_surfaces_status() {
    let client = start_server();
    let appointments: Resource<Appointment, _> = Resource::mount(Arc::clone(&client), None);

    let body = serde_json::json!({ "patientId": "not a number" });
    let created = appointments
        .post_data(&endpoints::appointments(), &body, RequestConfig::new())
        .await;
    assert!(created.is_none());
    let err = appointments.state().error.unwrap();
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = Arc::new(ApiClient::new(
        ClientConfig::new(&format!("http://{addr}")),
        UreqTransport::new(),
    ));
    let patients: Resource<Vec<Patient>, _> =
        Resource::mount(client, Some(endpoints::patients().as_str()));

    assert!(patients.fetch_data(RequestConfig::new()).await.is_none());
    assert!(matches!(patients.state().error, Some(ApiError::Transport(_))));
}

#[tokio::test]
async fn silent_server_times_out() {
    // Connections queue in the backlog but nothing ever answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = Arc::new(ApiClient::new(
        ClientConfig::new(&format!("http://{addr}")),
        UreqTransport::with_timeout(Duration::from_millis(200)),
    ));
    let patients: Resource<Vec<Patient>, _> =
        Resource::mount(client, Some(endpoints::patients().as_str()));

    let fetched = tokio::time::timeout(
        Duration::from_secs(5),
        patients.fetch_data(RequestConfig::new()),
    )
    .await
    .expect("transport timeout should fire first");

    assert!(fetched.is_none());
    assert!(matches!(patients.state().error, Some(ApiError::Transport(_))));
    drop(listener);
}
