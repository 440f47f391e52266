// 文件 API 处理器

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest};
use futures::{StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::api::extractors::Pagination;
use crate::api::middleware::AuthenticatedUser;
use crate::api::models::PaginationQuery;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::{AgentDeskError, ErrorResponse};
use crate::services::{FileSummaryInfo, IncomingFile, PutSummaryRequest, UploadResult};

const FILE_FIELD: &str = "file";

fn multipart_error(err: actix_multipart::MultipartError) -> AgentDeskError {
    AgentDeskError::validation("file", format!("multipart 数据错误: {}", err))
}

/// 读取单个文件字段，超过上限后只计数不再缓存
async fn read_file_field(mut field: Field, max_size: u64) -> Result<IncomingFile, AgentDeskError> {
    let file_name = field
        .content_disposition()
        .get_filename()
        .unwrap_or_default()
        .to_string();
    let content_type = field.content_type().map(|mime| mime.to_string());

    let mut data = Vec::new();
    let mut size: u64 = 0;
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        size += chunk.len() as u64;
        if size <= max_size {
            data.extend_from_slice(&chunk);
        }
    }

    Ok(IncomingFile {
        file_name,
        content_type,
        data,
        size,
    })
}

/// 上传一个或多个文件
///
/// 每个 `file` 字段单独校验与保存，结果中分别列出成功与失败的文件。
#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/files",
    tag = "File",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    request_body(content = String, description = "一个或多个 file 字段", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "逐个文件的处理结果", body = UploadResult),
        (status = 400, description = "没有文件、文件数超限或 multipart 格式错误", body = ErrorResponse),
        (status = 403, description = "不是工作区所属组织的成员", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_files(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> HandlerResult {
    let service = state.file_service();
    // 非成员在读取文件内容前即被拒绝
    let target = service.authorize_upload(user.user_id, path.into_inner()).await?;
    let storage = service.storage();

    let mut files = Vec::new();
    while let Some(field) = payload.try_next().await.map_err(multipart_error)? {
        if field.name() == FILE_FIELD {
            storage.check_file_count(files.len() + 1)?;
            files.push(read_file_field(field, storage.max_file_size()).await?);
        } else {
            // 丢弃未知字段
            field.for_each(|_| async {}).await;
        }
    }

    let result = service.upload(target, files).await?;
    HttpResponseBuilder::ok(&req, result)
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/files",
    tag = "File",
    params(("id" = Uuid, Path, description = "工作区 ID"), PaginationQuery),
    responses((status = 200, description = "文件分页列表")),
    security(("bearer_auth" = []))
)]
pub async fn list_files(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    pagination: Pagination,
) -> HandlerResult {
    let page = state
        .file_service()
        .list(user.user_id, path.into_inner(), pagination.0)
        .await?;
    HttpResponseBuilder::ok(&req, page)
}

#[utoipa::path(
    delete,
    path = "/api/v1/files/{id}",
    tag = "File",
    params(("id" = Uuid, Path, description = "文件 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 404, description = "文件不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    state.file_service().delete(user.user_id, path.into_inner()).await?;
    HttpResponseBuilder::no_content()
}

#[utoipa::path(
    get,
    path = "/api/v1/files/{id}/summary",
    tag = "File",
    params(("id" = Uuid, Path, description = "文件 ID")),
    responses(
        (status = 200, description = "文件摘要", body = FileSummaryInfo),
        (status = 404, description = "文件或摘要不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_file_summary(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let summary = state
        .file_service()
        .get_summary(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, summary)
}

#[utoipa::path(
    put,
    path = "/api/v1/files/{id}/summary",
    tag = "File",
    params(("id" = Uuid, Path, description = "文件 ID")),
    request_body = PutSummaryRequest,
    responses((status = 200, description = "摘要已保存", body = FileSummaryInfo)),
    security(("bearer_auth" = []))
)]
pub async fn put_file_summary(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<PutSummaryRequest>,
) -> HandlerResult {
    let summary = state
        .file_service()
        .put_summary(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, summary)
}

/// 挂在 `/workspaces` 作用域下
pub fn configure_workspace_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}/files", web::post().to(upload_files))
        .route("/{id}/files", web::get().to(list_files));
}

pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .route("/{id}", web::delete().to(delete_file))
            .route("/{id}/summary", web::get().to(get_file_summary))
            .route("/{id}/summary", web::put().to(put_file_summary)),
    );
}

