//! Shared helpers for the HTTP integration tests.

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use strongroom_backend::inbound::http::api_routes;
use strongroom_backend::test_support::TestHarness;

/// Multipart boundary used by the body builders below.
pub const BOUNDARY: &str = "it-boundary-83c1";

/// Build the API application over a harness, mirroring production wiring
/// minus the listener.
pub fn vault_app(
    harness: &TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(harness.http_state.clone()))
        .app_data(web::Data::new(harness.auth_tokens.clone()))
        .app_data(web::Data::new(harness.upload_limits))
        .configure(api_routes)
}

/// Hand-rolled multipart body with a single file part.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Content type header value matching [`multipart_body`].
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Register an account and return its bearer header value plus profile.
pub async fn register_user<S, B>(app: &S, email: &str, display_name: &str) -> (String, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": email,
                "password": "correct horse battery",
                "displayName": display_name,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 201, "registration should succeed");
    let body: Value = test::read_body_json(res).await;
    let token = body["token"].as_str().expect("token in response").to_owned();
    (format!("Bearer {token}"), body["user"].clone())
}
