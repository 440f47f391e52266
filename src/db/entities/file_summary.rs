// 文件摘要实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 每个文件最多一条摘要
    #[sea_orm(unique)]
    pub file_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub summary: String,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::file_upload::Entity",
        from = "Column::FileId",
        to = "super::file_upload::Column::Id",
        on_delete = "Cascade"
    )]
    File,
}

impl Related<super::file_upload::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
