// AI Agent 实体定义
// Agent 只保存配置，不在服务端执行

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 默认模型名称
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 默认采样温度
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ai_agents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_id: Uuid,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// 系统提示词
    #[sea_orm(column_type = "Text", nullable)]
    pub system_prompt: Option<String>,

    #[sea_orm(column_type = "String(Some(100))")]
    pub model: String,

    /// 采样温度，取值范围 [0, 2]
    #[sea_orm(column_type = "Double")]
    pub temperature: f64,

    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspace::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspace::Column::Id",
        on_delete = "Cascade"
    )]
    Workspace,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
