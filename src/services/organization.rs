// 组织服务
// 组织的增删改查与成员管理

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::membership::require_organization;
use crate::db::entities::organization;
use crate::db::entities::prelude::OrganizationRole;
use crate::db::{OrganizationMemberRepository, OrganizationRepository, UserRepository};
use crate::errors::AgentDeskError;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,62}$").expect("slug 正则表达式无效"));

const MAX_NAME_LENGTH: usize = 255;

/// 创建组织请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    pub name: String,
    /// 缺省时由名称生成
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// 更新组织请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// 添加成员请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: OrganizationRole,
}

/// 组织信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationInfo {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    /// 调用者在组织中的角色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<OrganizationRole>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrganizationInfo {
    fn from_model(model: organization::Model, role: Option<OrganizationRole>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            owner_id: model.owner_id,
            role,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// 成员信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberInfo {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: OrganizationRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// 校验组织名称
pub fn validate_organization_name(name: &str) -> Result<String, AgentDeskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AgentDeskError::validation("name", "组织名称不能为空"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AgentDeskError::validation(
            "name",
            format!("组织名称不能超过 {} 个字符", MAX_NAME_LENGTH),
        ));
    }
    Ok(name.to_string())
}

/// 由名称生成 slug：小写字母数字保留，其余字符折叠为单个连字符
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(63);
    slug.trim_end_matches('-').to_string()
}

/// 未提供 slug 时使用：名称推导不出合法 slug（如纯中文名称）时生成 `org-` 加随机后缀
pub fn derive_slug(name: &str) -> String {
    let slug = slugify(name);
    if SLUG_PATTERN.is_match(&slug) {
        slug
    } else {
        format!("org-{}", &Uuid::new_v4().simple().to_string()[..8])
    }
}

/// 校验 slug 格式
pub fn validate_slug(slug: &str) -> Result<(), AgentDeskError> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        Err(AgentDeskError::validation(
            "slug",
            "标识符只能包含小写字母、数字和连字符，长度 2-63，且以字母或数字开头",
        ))
    }
}

/// 组织服务
pub struct OrganizationService {
    db: Arc<DatabaseConnection>,
}

impl OrganizationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 创建组织并把创建者设为 owner，两步在同一事务中完成
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateOrganizationRequest,
    ) -> Result<OrganizationInfo, AgentDeskError> {
        let name = validate_organization_name(&request.name)?;
        let slug = match request.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => derive_slug(&name),
        };
        validate_slug(&slug)?;

        if OrganizationRepository::slug_exists(self.db.as_ref(), &slug).await? {
            return Err(AgentDeskError::conflict(format!("标识符 '{}' 已被使用", slug)));
        }

        let txn = self.db.begin().await?;
        let organization =
            OrganizationRepository::create(&txn, name, slug, request.description, user_id).await?;
        OrganizationMemberRepository::add(&txn, organization.id, user_id, OrganizationRole::Owner).await?;
        txn.commit().await?;

        info!(organization_id = %organization.id, "组织创建完成");
        Ok(OrganizationInfo::from_model(organization, Some(OrganizationRole::Owner)))
    }

    /// 调用者所属的组织
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<OrganizationInfo>, AgentDeskError> {
        let organizations = OrganizationRepository::list_for_user(self.db.as_ref(), user_id).await?;
        Ok(organizations
            .into_iter()
            .map(|o| OrganizationInfo::from_model(o, None))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid, organization_id: Uuid) -> Result<OrganizationInfo, AgentDeskError> {
        let (organization, membership) = require_organization(self.db.as_ref(), organization_id, user_id).await?;
        Ok(OrganizationInfo::from_model(organization, Some(membership.role)))
    }

    /// 仅 owner/admin 可修改
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        request: UpdateOrganizationRequest,
    ) -> Result<OrganizationInfo, AgentDeskError> {
        let name = request
            .name
            .as_deref()
            .map(validate_organization_name)
            .transpose()?;

        let (organization, membership) = require_organization(self.db.as_ref(), organization_id, user_id).await?;
        if !membership.role.can_manage() {
            return Err(AgentDeskError::forbidden("只有组织所有者或管理员可以修改组织"));
        }

        let updated =
            OrganizationRepository::update(self.db.as_ref(), organization, name, request.description).await?;
        Ok(OrganizationInfo::from_model(updated, Some(membership.role)))
    }

    /// 仅 owner 可删除
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, organization_id: Uuid) -> Result<(), AgentDeskError> {
        let (_, membership) = require_organization(self.db.as_ref(), organization_id, user_id).await?;
        if membership.role != OrganizationRole::Owner {
            return Err(AgentDeskError::forbidden("只有组织所有者可以删除组织"));
        }
        OrganizationRepository::delete(self.db.as_ref(), organization_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_members(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Vec<MemberInfo>, AgentDeskError> {
        require_organization(self.db.as_ref(), organization_id, user_id).await?;

        let members = OrganizationMemberRepository::list_with_users(self.db.as_ref(), organization_id).await?;
        Ok(members
            .into_iter()
            .map(|(member, user)| MemberInfo {
                user_id: member.user_id,
                email: user.as_ref().map(|u| u.email.clone()),
                display_name: user.map(|u| u.display_name),
                role: member.role,
                joined_at: member.joined_at.into(),
            })
            .collect())
    }

    /// 按邮箱添加成员，不能授予 owner 角色
    #[instrument(skip(self, request))]
    pub async fn add_member(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        request: AddMemberRequest,
    ) -> Result<MemberInfo, AgentDeskError> {
        if request.role == OrganizationRole::Owner {
            return Err(AgentDeskError::validation("role", "不能授予所有者角色"));
        }

        let (_, membership) = require_organization(self.db.as_ref(), organization_id, user_id).await?;
        if !membership.role.can_manage() {
            return Err(AgentDeskError::forbidden("只有组织所有者或管理员可以添加成员"));
        }

        let user = UserRepository::find_by_email(self.db.as_ref(), request.email.trim())
            .await?
            .ok_or_else(|| AgentDeskError::not_found("用户"))?;

        if OrganizationMemberRepository::find(self.db.as_ref(), organization_id, user.id)
            .await?
            .is_some()
        {
            return Err(AgentDeskError::conflict("该用户已是组织成员"));
        }

        let member =
            OrganizationMemberRepository::add(self.db.as_ref(), organization_id, user.id, request.role).await?;
        info!(member_user_id = %user.id, "组织成员已添加");

        Ok(MemberInfo {
            user_id: user.id,
            email: Some(user.email),
            display_name: Some(user.display_name),
            role: member.role,
            joined_at: member.joined_at.into(),
        })
    }

    /// 移除成员，所有者不能被移除
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        member_user_id: Uuid,
    ) -> Result<(), AgentDeskError> {
        let (organization, membership) = require_organization(self.db.as_ref(), organization_id, user_id).await?;
        if !membership.role.can_manage() {
            return Err(AgentDeskError::forbidden("只有组织所有者或管理员可以移除成员"));
        }
        if member_user_id == organization.owner_id {
            return Err(AgentDeskError::validation("user_id", "不能移除组织所有者"));
        }

        let removed = OrganizationMemberRepository::remove(self.db.as_ref(), organization_id, member_user_id).await?;
        if removed == 0 {
            return Err(AgentDeskError::not_found("组织成员"));
        }
        Ok(())
    }
}
