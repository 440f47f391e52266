// 组织与组织成员仓储实现

use crate::db::entities::{organization, organization_member, prelude::*, user};
use crate::errors::AgentDeskError;
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

/// 组织仓储
pub struct OrganizationRepository;

impl OrganizationRepository {
    /// 创建组织（可在事务中调用）
    #[instrument(skip(db, description))]
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        name: String,
        slug: String,
        description: Option<String>,
        owner_id: Uuid,
    ) -> Result<organization::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let organization = organization::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug),
            description: Set(description),
            owner_id: Set(owner_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = organization.insert(db).await?;
        info!(organization_id = %result.id, "组织创建成功");
        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<organization::Model>, AgentDeskError> {
        Ok(Organization::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn slug_exists<C: ConnectionTrait>(db: &C, slug: &str) -> Result<bool, AgentDeskError> {
        let existing = Organization::find()
            .filter(organization::Column::Slug.eq(slug))
            .one(db)
            .await?;
        Ok(existing.is_some())
    }

    /// 用户所属的全部组织
    #[instrument(skip(db))]
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Vec<organization::Model>, AgentDeskError> {
        let organizations = Organization::find()
            .inner_join(OrganizationMember)
            .filter(organization_member::Column::UserId.eq(user_id))
            .order_by_asc(organization::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(organizations)
    }

    #[instrument(skip(db, organization), fields(organization_id = %organization.id))]
    pub async fn update(
        db: &DatabaseConnection,
        organization: organization::Model,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<organization::Model, AgentDeskError> {
        let mut active: organization::ActiveModel = organization.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(db).await?)
    }

    /// 删除组织，工作区等下级数据由外键级联删除
    #[instrument(skip(db))]
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AgentDeskError> {
        let result = Organization::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AgentDeskError::not_found("组织"));
        }
        info!(organization_id = %id, "组织已删除");
        Ok(())
    }
}

/// 组织成员仓储
pub struct OrganizationMemberRepository;

impl OrganizationMemberRepository {
    #[instrument(skip(db))]
    pub async fn add<C: ConnectionTrait>(
        db: &C,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrganizationRole,
    ) -> Result<organization_member::Model, AgentDeskError> {
        let member = organization_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            user_id: Set(user_id),
            role: Set(role),
            joined_at: Set(chrono::Utc::now().into()),
        };
        Ok(member.insert(db).await?)
    }

    /// 查找成员关系，用于权限判断
    #[instrument(skip(db))]
    pub async fn find(
        db: &DatabaseConnection,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_member::Model>, AgentDeskError> {
        let member = OrganizationMember::find()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .filter(organization_member::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(member)
    }

    /// 列出成员及其用户信息
    #[instrument(skip(db))]
    pub async fn list_with_users(
        db: &DatabaseConnection,
        organization_id: Uuid,
    ) -> Result<Vec<(organization_member::Model, Option<user::Model>)>, AgentDeskError> {
        let members = OrganizationMember::find()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .find_also_related(User)
            .order_by_asc(organization_member::Column::JoinedAt)
            .all(db)
            .await?;
        Ok(members)
    }

    #[instrument(skip(db))]
    pub async fn remove(
        db: &DatabaseConnection,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, AgentDeskError> {
        let result = OrganizationMember::delete_many()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .filter(organization_member::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
