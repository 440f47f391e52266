// 组织管理 API 处理器

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::api::middleware::AuthenticatedUser;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::ErrorResponse;
use crate::services::{
    AddMemberRequest, CreateOrganizationRequest, MemberInfo, OrganizationInfo,
    UpdateOrganizationRequest,
};

/// 创建组织，调用者成为所有者
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    tag = "Organization",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "创建成功", body = OrganizationInfo),
        (status = 400, description = "名称或标识符不合法", body = ErrorResponse),
        (status = 409, description = "标识符已被使用", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_organization(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateOrganizationRequest>,
) -> HandlerResult {
    let organization = state
        .organization_service()
        .create(user.user_id, body.into_inner())
        .await?;
    HttpResponseBuilder::created(&req, organization)
}

/// 调用者所属的组织列表
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    tag = "Organization",
    responses((status = 200, description = "组织列表", body = [OrganizationInfo])),
    security(("bearer_auth" = []))
)]
pub async fn list_organizations(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> HandlerResult {
    let organizations = state.organization_service().list(user.user_id).await?;
    HttpResponseBuilder::ok(&req, organizations)
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}",
    tag = "Organization",
    params(("id" = Uuid, Path, description = "组织 ID")),
    responses(
        (status = 200, description = "组织详情", body = OrganizationInfo),
        (status = 403, description = "不是组织成员", body = ErrorResponse),
        (status = 404, description = "组织不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let organization = state
        .organization_service()
        .get(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, organization)
}

#[utoipa::path(
    put,
    path = "/api/v1/organizations/{id}",
    tag = "Organization",
    params(("id" = Uuid, Path, description = "组织 ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "更新成功", body = OrganizationInfo),
        (status = 403, description = "需要所有者或管理员", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_organization(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrganizationRequest>,
) -> HandlerResult {
    let organization = state
        .organization_service()
        .update(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, organization)
}

#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}",
    tag = "Organization",
    params(("id" = Uuid, Path, description = "组织 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 403, description = "只有所有者可以删除", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_organization(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    state
        .organization_service()
        .delete(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::no_content()
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}/members",
    tag = "Organization",
    params(("id" = Uuid, Path, description = "组织 ID")),
    responses((status = 200, description = "成员列表", body = [MemberInfo])),
    security(("bearer_auth" = []))
)]
pub async fn list_members(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let members = state
        .organization_service()
        .list_members(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, members)
}

#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/members",
    tag = "Organization",
    params(("id" = Uuid, Path, description = "组织 ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "成员已添加", body = MemberInfo),
        (status = 404, description = "用户不存在", body = ErrorResponse),
        (status = 409, description = "已是成员", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<AddMemberRequest>,
) -> HandlerResult {
    let member = state
        .organization_service()
        .add_member(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::created(&req, member)
}

#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}/members/{user_id}",
    tag = "Organization",
    params(
        ("id" = Uuid, Path, description = "组织 ID"),
        ("user_id" = Uuid, Path, description = "成员用户 ID")
    ),
    responses(
        (status = 204, description = "已移除"),
        (status = 400, description = "不能移除所有者", body = ErrorResponse),
        (status = 404, description = "成员不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> HandlerResult {
    let (organization_id, member_user_id) = path.into_inner();
    state
        .organization_service()
        .remove_member(user.user_id, organization_id, member_user_id)
        .await?;
    HttpResponseBuilder::no_content()
}

pub fn configure_organization_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/organizations")
            .route("", web::post().to(create_organization))
            .route("", web::get().to(list_organizations))
            .route("/{id}", web::get().to(get_organization))
            .route("/{id}", web::put().to(update_organization))
            .route("/{id}", web::delete().to(delete_organization))
            .route("/{id}/members", web::get().to(list_members))
            .route("/{id}/members", web::post().to(add_member))
            .route("/{id}/members/{user_id}", web::delete().to(remove_member))
            .configure(super::workspace::configure_organization_workspace_routes),
    );
}
