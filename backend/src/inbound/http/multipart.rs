//! Multipart adapter for the upload pipeline.
//!
//! Accepts exactly one file under a fixed field name and buffers it with
//! the byte ceiling enforced while the stream is drained: an oversize
//! upload is rejected the moment the ceiling is crossed, before anything
//! can reach the blob store.

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;

use crate::domain::upload::{UploadedFile, no_file_error, too_large_error};
use crate::domain::DomainError;

fn stream_error(err: actix_multipart::MultipartError) -> DomainError {
    DomainError::invalid_request(format!("malformed multipart body: {err}"))
}

async fn buffer_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, DomainError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(stream_error)? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large_error(max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Read the single expected file out of a multipart body.
///
/// Fields other than `expected_field` are skipped without buffering. The
/// declared content type falls back to `application/octet-stream` and the
/// filename to the field name when the client omits them.
pub async fn read_single_file(
    mut payload: Multipart,
    expected_field: &str,
    max_bytes: usize,
) -> Result<UploadedFile, DomainError> {
    while let Some(mut field) = payload.try_next().await.map_err(stream_error)? {
        if field.name() != Some(expected_field) {
            continue;
        }
        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(expected_field)
            .to_owned();
        let content_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_owned(), ToString::to_string);
        let bytes = buffer_field(&mut field, max_bytes).await?;
        return Ok(UploadedFile {
            original_name,
            content_type,
            bytes,
        });
    }
    Err(no_file_error(expected_field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::http::StatusCode;
    use actix_web::http::header;
    use actix_web::{App, HttpResponse, test, web};

    const BOUNDARY: &str = "test-boundary-7f3a";

    fn multipart_body(parts: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, filename, content_type, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn receive(payload: Multipart) -> Result<HttpResponse, crate::inbound::http::ApiError> {
        let file = read_single_file(payload, "file", 32).await?;
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "name": file.original_name,
            "contentType": file.content_type,
            "size": file.bytes.len(),
        })))
    }

    async fn call(body: Vec<u8>) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(App::new().route("/upload", web::post().to(receive))).await;
        let req = test::TestRequest::post()
            .uri("/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn reads_the_expected_field() {
        let body = multipart_body(&[("file", "notes.txt", "text/plain", b"hello")]);
        let res = call(body).await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(value["name"], "notes.txt");
        assert_eq!(value["contentType"], "text/plain");
        assert_eq!(value["size"], 5);
    }

    #[actix_web::test]
    async fn missing_field_reports_no_file() {
        let body = multipart_body(&[("other", "x.bin", "application/octet-stream", b"x")]);
        let res = call(body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(value["code"], "invalid_request");
        assert!(
            value["message"]
                .as_str()
                .expect("message")
                .contains("no file provided")
        );
    }

    #[actix_web::test]
    async fn oversize_upload_names_the_limit() {
        let body = multipart_body(&[("file", "big.bin", "application/octet-stream", &[0u8; 64])]);
        let res = call(body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: serde_json::Value = test::read_body_json(res).await;
        assert!(value["message"].as_str().expect("message").contains("32"));
    }

    #[tokio::test]
    async fn too_large_error_is_invalid_request() {
        assert_eq!(too_large_error(1).code(), ErrorCode::InvalidRequest);
    }
}
