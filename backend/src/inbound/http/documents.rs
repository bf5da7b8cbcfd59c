//! Document HTTP handlers.
//!
//! ```text
//! GET    /api/documents
//! GET    /api/documents/{id}
//! POST   /api/documents/upload      (multipart field `file`)
//! GET    /api/documents/{id}/download
//! DELETE /api/documents/{id}
//! ```

use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header::{
    ContentDisposition, DispositionParam, DispositionType, LOCATION,
};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Document, DocumentDownload, DomainError, UploadLimits};

use super::auth::Identity;
use super::error::ApiResult;
use super::multipart::read_single_file;
use super::state::HttpState;

/// Response payload for document metadata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(value: Document) -> Self {
        Self {
            id: value.id,
            original_name: value.original_name,
            stored_name: value.stored_name,
            content_type: value.content_type,
            size_bytes: value.size_bytes,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// List the owner's documents, newest first.
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Document metadata for the owner", body = [DocumentResponse])
    ),
    tags = ["documents"],
    operation_id = "listDocuments"
)]
#[get("/documents")]
pub async fn list(state: web::Data<HttpState>, identity: Identity) -> ApiResult<HttpResponse> {
    let documents = state.documents.list(identity.owner()).await?;
    let body: Vec<DocumentResponse> = documents.into_iter().map(DocumentResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a single owned document's metadata.
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 404, description = "Unknown or foreign document")
    ),
    tags = ["documents"],
    operation_id = "getDocument"
)]
#[get("/documents/{id}")]
pub async fn get(
    state: web::Data<HttpState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let document = state
        .documents
        .get(id.into_inner(), identity.owner())
        .await?;
    Ok(HttpResponse::Ok().json(DocumentResponse::from(document)))
}

/// Upload one file under the `file` field.
#[utoipa::path(
    post,
    path = "/api/documents/upload",
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "No file, oversize, or malformed body")
    ),
    tags = ["documents"],
    operation_id = "uploadDocument"
)]
#[post("/documents/upload")]
pub async fn upload(
    state: web::Data<HttpState>,
    limits: web::Data<UploadLimits>,
    identity: Identity,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let file = read_single_file(payload, "file", limits.document_max_bytes).await?;
    let document = state.documents.upload(identity.owner(), file).await?;
    Ok(HttpResponse::Created().json(DocumentResponse::from(document)))
}

/// Download an owned document: remote locators redirect, local locators
/// stream bytes as an attachment.
#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    responses(
        (status = 200, description = "Document bytes"),
        (status = 302, description = "Redirect to the remote store"),
        (status = 404, description = "Unknown document or missing blob")
    ),
    tags = ["documents"],
    operation_id = "downloadDocument"
)]
#[get("/documents/{id}/download")]
pub async fn download(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let resolved = state
        .documents
        .download(id.into_inner(), identity.owner())
        .await?;
    match resolved {
        DocumentDownload::Redirect(url) => Ok(HttpResponse::Found()
            .insert_header((LOCATION, url.to_string()))
            .finish()),
        DocumentDownload::File {
            path,
            content_type,
            original_name,
        } => {
            let file = NamedFile::open_async(&path)
                .await
                .map_err(|err| DomainError::internal(format!("failed to open stored blob: {err}")))?;
            let mime = content_type
                .parse::<mime::Mime>()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM);
            let file = file
                .set_content_type(mime)
                .set_content_disposition(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(original_name)],
                });
            Ok(file.into_response(&req))
        }
    }
}

/// Delete an owned document and best-effort remove its blob.
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    responses(
        (status = 204, description = "Metadata deleted; blob removal attempted"),
        (status = 404, description = "Unknown or foreign document")
    ),
    tags = ["documents"],
    operation_id = "deleteDocument"
)]
#[delete("/documents/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .documents
        .delete(id.into_inner(), identity.owner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
