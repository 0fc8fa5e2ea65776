//! In-process API harness shared by the flow tests.

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use campus_backend::Trace;
use campus_backend::inbound::http::routes::configure_api;
use campus_backend::test_support::MemoryBackend;
use serde_json::{Value, json};

pub const PASSWORD: &str = "Str0ng!pw";

pub async fn init_app(
    backend: &MemoryBackend,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(backend.state.clone()))
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

pub async fn body_json(response: ServiceResponse) -> Value {
    let bytes = test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Registered account as seen by a client.
pub struct Client {
    pub token: String,
    pub user_id: String,
}

impl Client {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
) -> Client {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(json!({
                "username": username,
                "email": format!("{username}@amigo.edu.co"),
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    Client {
        token: body["token"].as_str().expect("token").to_owned(),
        user_id: body["user"]["id"].as_str().expect("user id").to_owned(),
    }
}

pub async fn create_course(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    client: &Client,
    title: &str,
) -> String {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/courses")
            .insert_header(client.bearer())
            .set_json(json!({
                "title": title,
                "description": "An introductory course",
                "thumbnailUrl": "https://cdn.example.com/cover.jpg",
                "categoryId": "5b0f8e0e-8f6a-4c65-9d1e-6f0b0b8d2a11",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"]
        .as_str()
        .expect("course id")
        .to_owned()
}

pub async fn rate(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    client: &Client,
    course_id: &str,
    rating: f64,
) -> ServiceResponse {
    test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/courses/{course_id}/rate"))
            .insert_header(client.bearer())
            .set_json(json!({ "rating": rating }))
            .to_request(),
    )
    .await
}
