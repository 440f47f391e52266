// OAuth 令牌实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oauth_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub connection_id: Uuid,

    /// 加密后的令牌集合（access/refresh token 等）
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub encrypted_tokens: String,

    /// access token 过期时间
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::external_connection::Entity",
        from = "Column::ConnectionId",
        to = "super::external_connection::Column::Id",
        on_delete = "Cascade"
    )]
    Connection,
}

impl Related<super::external_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Connection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
