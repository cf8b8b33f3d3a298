//! Integration tests for the busadmin HTTP client

use busadmin_http::types::{
    AvailabilityWindow, BusType, LoginRequest, NewBus, PageQuery, ScheduleSearch, SignupRequest,
};
use busadmin_http::{ClientBuilder, ClientError, PublicClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_client_builder() {
    let client = ClientBuilder::new()
        .base_url("http://localhost:8080/api/")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/api");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ClientBuilder::new().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_returns_token_pair() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .and(body_json(json!({
            "email": "admin@example.com",
            "password": "Secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "message": "Login successful"
        })))
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(format!("{}/api", mock_server.uri())).unwrap();
    let response = client
        .login(&LoginRequest {
            email: "admin@example.com".into(),
            password: "Secret123".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.access_token, "access-1");
    assert_eq!(response.refresh_token, "refresh-1");
    assert_eq!(response.message.as_deref(), Some("Login successful"));
}

#[tokio::test]
async fn test_login_failure_surfaces_backend_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri()).unwrap();
    let err = client
        .login(&LoginRequest {
            email: "admin@example.com".into(),
            password: "Wrong1234".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::AuthenticationFailed(_)));
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn test_signup_posts_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/signup"))
        .and(body_json(json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "Secret123",
            "phone": "9876543210"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "User created" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri()).unwrap();
    let response = client
        .signup(&SignupRequest {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "Secret123".into(),
            phone: "9876543210".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.message, "User created");
}

#[tokio::test]
async fn test_refresh_sends_refresh_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "access-2" })))
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri()).unwrap();
    let response = client.refresh("refresh-1").await.unwrap();
    assert_eq!(response.access_token, "access-2");
}

#[tokio::test]
async fn test_authenticated_requests_carry_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bus/getAllBuses"))
        .and(header("authorization", "Bearer access-1"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "_id": "b1",
                "busNumber": "MH-12-0001",
                "busType": "Non-AC/Seater",
                "capacity": 52,
                "features": []
            }],
            "message": "Buses fetched",
            "totalCount": 6
        })))
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri())
        .unwrap()
        .authenticate("access-1");
    let page = client.list_buses(&PageQuery::new(2, 5)).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].bus_type, BusType::NonAcSeater);
    assert_eq!(page.total(), 6);
}

#[tokio::test]
async fn test_invalid_token_is_token_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bus/addBus"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid Token" })))
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri())
        .unwrap()
        .authenticate("stale");
    let err = client
        .add_bus(&NewBus {
            bus_number: "KA-01-1234".into(),
            bus_type: BusType::AcSeater,
            capacity: 40,
            features: vec!["wifi".into()],
        })
        .await
        .unwrap_err();

    assert!(err.is_token_rejected());
}

#[tokio::test]
async fn test_schedule_search_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schedule/getScheduleBuses"))
        .and(query_param("from", "Pune"))
        .and(query_param("to", "Goa"))
        .and(query_param("date", "2026-11-01T00:00:00.000Z"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "scheduleId": "s1",
                "busNumber": "GA-07-7777",
                "busType": "AC/Sleeper",
                "startLocation": "Pune",
                "endLocation": "Goa",
                "departureTime": "2026-11-01T20:00:00Z",
                "price": 1200.0
            }],
            "message": "Buses found"
        })))
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri())
        .unwrap()
        .authenticate("access-1");
    let page = client
        .search_schedules(&ScheduleSearch {
            from: "Pune".into(),
            to: "Goa".into(),
            date: "2026-11-01T00:00:00Z".parse().unwrap(),
            page: PageQuery::default(),
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].key(), Some("s1"));
    assert_eq!(page.message.as_deref(), Some("Buses found"));
}

#[tokio::test]
async fn test_available_buses_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bus/fetchAvailableBuses"))
        .and(query_param("departureTime", "2026-11-01T08:00:00.000Z"))
        .and(query_param("arrivalTime", "2026-11-01T14:30:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let client = PublicClient::new(mock_server.uri())
        .unwrap()
        .authenticate("access-1");
    let page = client
        .available_buses(&AvailabilityWindow {
            departure_time: "2026-11-01T08:00:00Z".parse().unwrap(),
            arrival_time: "2026-11-01T14:30:00Z".parse().unwrap(),
        })
        .await
        .unwrap();

    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = PublicClient::new("http://127.0.0.1:1").unwrap();
    let err = client.refresh("refresh-1").await.unwrap_err();
    assert!(err.is_network(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_reachability_check() {
    let server = MockServer::start().await;
    // No mocks mounted: wiremock answers 404, which still proves the backend is up
    let client = PublicClient::new(format!("{}/api", server.uri())).unwrap();
    assert!(client.is_reachable().await);

    let client = PublicClient::new("http://127.0.0.1:1").unwrap();
    assert!(!client.is_reachable().await);
}
