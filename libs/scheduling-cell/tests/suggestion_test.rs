// End-to-end suggestion ranking against a mocked PostgREST backend.

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::models::ScheduleError;
use scheduling_cell::services::suggestion::SUGGESTION_LIMIT;
use scheduling_cell::services::SuggestionService;
use shared_config::AppConfig;

fn test_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        database_rest_url: mock_server.uri(),
        database_service_key: "test-key".to_string(),
        port: 0,
    }
}

async fn mock_backend(mock_server: &MockServer, doctor_id: Uuid, appointments: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": doctor_id,
            "name": "Dr. Arjun Mehta",
            "specialization": "Cardiology"
        }])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/working_hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": null,
            "start_time": "09:00:00",
            "end_time": "17:00:00",
            "slot_minutes": 30
        }])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointments))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn suggestions_are_ranked_capped_and_explained() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    mock_backend(&mock_server, doctor_id, json!([])).await;

    let service = SuggestionService::new(&test_config(&mock_server));
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

    let suggestions = service.suggest(doctor_id, date, now).await.unwrap();

    assert_eq!(suggestions.len(), SUGGESTION_LIMIT);
    for pair in suggestions.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for suggestion in &suggestions {
        assert!(!suggestion.reason.is_empty());
        assert_eq!(
            suggestion.time_display,
            suggestion.time.format("%H:%M").to_string()
        );
    }
    // An empty day ranks on midday proximity alone.
    assert_eq!(suggestions[0].time_display, "12:00");
}

#[tokio::test]
async fn booked_slots_never_appear_in_suggestions() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    mock_backend(
        &mock_server,
        doctor_id,
        json!([{
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "start_time": "2025-03-10T12:00:00Z",
            "duration_minutes": 30,
            "status": "scheduled"
        }]),
    )
    .await;

    let service = SuggestionService::new(&test_config(&mock_server));
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

    let suggestions = service.suggest(doctor_id, date, now).await.unwrap();

    assert!(!suggestions.is_empty());
    assert!(suggestions.iter().all(|s| s.time_display != "12:00"));
}

#[tokio::test]
async fn fully_booked_day_yields_empty_suggestions_not_an_error() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": doctor_id,
            "name": "Dr. Arjun Mehta",
            "specialization": "Cardiology"
        }])))
        .mount(&mock_server)
        .await;

    // One template slot, one appointment covering it.
    Mock::given(method("GET"))
        .and(path("/working_hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": null,
            "start_time": "09:00:00",
            "end_time": "09:30:00",
            "slot_minutes": 30
        }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "start_time": "2025-03-10T09:00:00Z",
            "duration_minutes": 30,
            "status": "scheduled"
        }])))
        .mount(&mock_server)
        .await;

    let service = SuggestionService::new(&test_config(&mock_server));
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

    let suggestions = service.suggest(doctor_id, date, now).await.unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn unknown_doctor_propagates_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = SuggestionService::new(&test_config(&mock_server));
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let result = service.suggest(Uuid::new_v4(), date, Utc::now()).await;

    assert_matches!(result, Err(ScheduleError::DoctorNotFound));
}
