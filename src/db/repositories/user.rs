// 用户仓储实现

use crate::db::entities::{prelude::*, user};
use crate::errors::AgentDeskError;
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

/// 用户仓储
pub struct UserRepository;

impl UserRepository {
    /// 创建新用户，邮箱重复时返回冲突错误
    #[instrument(skip(db, password_hash))]
    pub async fn create(
        db: &DatabaseConnection,
        email: String,
        password_hash: String,
        display_name: String,
    ) -> Result<user::Model, AgentDeskError> {
        if Self::find_by_email(db, &email).await?.is_some() {
            return Err(AgentDeskError::conflict(format!("邮箱 '{}' 已被注册", email)));
        }

        let now = chrono::Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            display_name: Set(display_name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            last_login_at: Set(None),
        };

        let result = user.insert(db).await?;
        info!(user_id = %result.id, "用户创建成功");
        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<user::Model>, AgentDeskError> {
        Ok(User::find_by_id(id).one(db).await?)
    }

    /// 邮箱比较不区分大小写，存储时统一为小写
    #[instrument(skip(db))]
    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<user::Model>, AgentDeskError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(db)
            .await?;
        Ok(user)
    }

    /// 记录最后登录时间
    #[instrument(skip(db, user), fields(user_id = %user.id))]
    pub async fn touch_last_login(
        db: &DatabaseConnection,
        user: user::Model,
    ) -> Result<user::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let mut active: user::ActiveModel = user.into();
        active.last_login_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        Ok(active.update(db).await?)
    }
}
