// 文件上传与摘要仓储实现

use super::fetch_page;
use crate::db::entities::{file_summary, file_upload, prelude::*};
use crate::errors::AgentDeskError;
use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

/// 新上传文件的记录
#[derive(Debug, Clone)]
pub struct NewFileUpload {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub stored_path: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// 文件仓储
pub struct FileRepository;

impl FileRepository {
    #[instrument(skip(db, file), fields(file_id = %file.id))]
    pub async fn create(
        db: &DatabaseConnection,
        file: NewFileUpload,
    ) -> Result<file_upload::Model, AgentDeskError> {
        let active = file_upload::ActiveModel {
            id: Set(file.id),
            workspace_id: Set(file.workspace_id),
            uploaded_by: Set(file.uploaded_by),
            file_name: Set(file.file_name),
            stored_path: Set(file.stored_path),
            content_type: Set(file.content_type),
            size_bytes: Set(file.size_bytes),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(active.insert(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<file_upload::Model>, AgentDeskError> {
        Ok(FileUpload::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_by_workspace(
        db: &DatabaseConnection,
        workspace_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<file_upload::Model>, AgentDeskError> {
        let select = FileUpload::find()
            .filter(file_upload::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(file_upload::Column::CreatedAt);
        fetch_page(db, select, params).await
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AgentDeskError> {
        let result = FileUpload::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AgentDeskError::not_found("文件"));
        }
        Ok(())
    }
}

/// 文件摘要仓储
pub struct FileSummaryRepository;

impl FileSummaryRepository {
    #[instrument(skip(db))]
    pub async fn find_by_file(
        db: &DatabaseConnection,
        file_id: Uuid,
    ) -> Result<Option<file_summary::Model>, AgentDeskError> {
        let summary = FileSummary::find()
            .filter(file_summary::Column::FileId.eq(file_id))
            .one(db)
            .await?;
        Ok(summary)
    }

    /// 存在则更新，不存在则创建
    #[instrument(skip(db, summary))]
    pub async fn upsert(
        db: &DatabaseConnection,
        file_id: Uuid,
        summary: String,
    ) -> Result<file_summary::Model, AgentDeskError> {
        let now = chrono::Utc::now();

        match Self::find_by_file(db, file_id).await? {
            Some(existing) => {
                let mut active: file_summary::ActiveModel = existing.into();
                active.summary = Set(summary);
                active.updated_at = Set(now.into());
                Ok(active.update(db).await?)
            }
            None => {
                let active = file_summary::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    file_id: Set(file_id),
                    summary: Set(summary),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                Ok(active.insert(db).await?)
            }
        }
    }
}
