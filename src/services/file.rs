// 文件服务
// 上传文件落盘、记录元数据以及摘要读写

use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::membership::require_workspace_access;
use crate::config::StorageConfig;
use crate::db::entities::{file_summary, file_upload};
use crate::db::{FileRepository, FileSummaryRepository, NewFileUpload};
use crate::errors::AgentDeskError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 从 multipart 中读出的单个文件
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    /// 客户端发送的总字节数，超限后 data 不再增长
    pub size: u64,
}

/// 文件信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileInfo {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<file_upload::Model> for FileInfo {
    fn from(model: file_upload::Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            uploaded_by: model.uploaded_by,
            file_name: model.file_name,
            content_type: model.content_type,
            size_bytes: model.size_bytes,
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

/// 批量上传结果，逐个文件报告
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct UploadResult {
    pub uploaded: Vec<FileInfo>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PutSummaryRequest {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileSummaryInfo {
    pub file_id: Uuid,
    pub summary: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<file_summary::Model> for FileSummaryInfo {
    fn from(model: file_summary::Model) -> Self {
        Self {
            file_id: model.file_id,
            summary: model.summary,
            updated_at: model.updated_at.into(),
        }
    }
}

/// 本地磁盘文件存储
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    max_file_size: u64,
    max_files: usize,
    allowed_extensions: Vec<String>,
}

impl FileStorage {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.path),
            max_file_size: config.max_file_size,
            max_files: config.max_files_per_upload,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// 单次上传的文件数不能超过上限
    pub fn check_file_count(&self, count: usize) -> Result<(), AgentDeskError> {
        if count > self.max_files {
            return Err(AgentDeskError::validation(
                "file",
                format!("单次最多上传 {} 个文件", self.max_files),
            ));
        }
        Ok(())
    }

    /// 只保留路径中的文件名部分
    pub fn sanitize_file_name(file_name: &str) -> String {
        Path::new(file_name.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// 校验文件名、扩展名与大小，返回小写扩展名
    pub fn validate(&self, file_name: &str, size: u64) -> Result<String, AgentDeskError> {
        if file_name.is_empty() {
            return Err(AgentDeskError::validation("file", "文件名不能为空"));
        }
        if size == 0 {
            return Err(AgentDeskError::file_processing_with_name("文件内容为空", file_name));
        }
        if size > self.max_file_size {
            return Err(AgentDeskError::payload_too_large(format!(
                "文件大小超过限制（{} 字节）",
                self.max_file_size
            )));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| AgentDeskError::file_processing_with_name("文件缺少扩展名", file_name))?;

        if !self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            return Err(AgentDeskError::file_processing_with_name(
                format!("不支持的文件类型: .{}", extension),
                file_name,
            ));
        }

        Ok(extension)
    }

    /// 存储路径为 `<root>/<workspace_id>/<file_id>.<ext>`
    pub fn path_for(&self, workspace_id: Uuid, file_id: Uuid, extension: &str) -> PathBuf {
        self.root
            .join(workspace_id.to_string())
            .join(format!("{}.{}", file_id, extension))
    }

    pub async fn save(
        &self,
        workspace_id: Uuid,
        file_id: Uuid,
        extension: &str,
        data: &[u8],
    ) -> Result<PathBuf, AgentDeskError> {
        let path = self.path_for(workspace_id, file_id, extension);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// 尽力删除，失败只记录日志
    pub async fn remove(&self, path: &str) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path, error = %e, "删除存储文件失败");
        }
    }
}

/// 已通过成员校验的上传目标，只能由 [`FileService::authorize_upload`] 创建
#[derive(Debug, Clone, Copy)]
pub struct UploadTarget {
    user_id: Uuid,
    workspace_id: Uuid,
}

/// 文件服务
pub struct FileService {
    db: Arc<DatabaseConnection>,
    storage: FileStorage,
}

impl FileService {
    pub fn new(db: Arc<DatabaseConnection>, storage: FileStorage) -> Self {
        Self { db, storage }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// 读取请求体之前校验工作区成员关系
    #[instrument(skip(self))]
    pub async fn authorize_upload(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<UploadTarget, AgentDeskError> {
        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        Ok(UploadTarget { user_id, workspace_id })
    }

    /// 按顺序处理每个文件，单个失败不影响其他文件
    #[instrument(skip(self, files), fields(file_count = files.len()))]
    pub async fn upload(
        &self,
        target: UploadTarget,
        files: Vec<IncomingFile>,
    ) -> Result<UploadResult, AgentDeskError> {
        if files.is_empty() {
            return Err(AgentDeskError::validation("file", "至少需要上传一个文件"));
        }
        self.storage.check_file_count(files.len())?;
        let UploadTarget { user_id, workspace_id } = target;

        let mut result = UploadResult::default();
        for file in files {
            let file_name = FileStorage::sanitize_file_name(&file.file_name);
            match self.store_one(user_id, workspace_id, &file_name, file).await {
                Ok(info) => result.uploaded.push(info),
                Err(e) => {
                    warn!(file_name = %file_name, error = %e, "文件上传失败");
                    result.failed.push(FailedUpload {
                        file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            uploaded = result.uploaded.len(),
            failed = result.failed.len(),
            "文件上传处理完成"
        );
        Ok(result)
    }

    async fn store_one(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        file_name: &str,
        file: IncomingFile,
    ) -> Result<FileInfo, AgentDeskError> {
        let extension = self.storage.validate(file_name, file.size)?;
        let file_id = Uuid::new_v4();
        let path = self
            .storage
            .save(workspace_id, file_id, &extension, &file.data)
            .await?;
        let stored_path = path.to_string_lossy().into_owned();

        let record = NewFileUpload {
            id: file_id,
            workspace_id,
            uploaded_by: user_id,
            file_name: file_name.to_string(),
            stored_path: stored_path.clone(),
            content_type: file
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            size_bytes: file.data.len() as i64,
        };

        match FileRepository::create(self.db.as_ref(), record).await {
            Ok(model) => Ok(model.into()),
            Err(e) => {
                self.storage.remove(&stored_path).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<FileInfo>, AgentDeskError> {
        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        let page = FileRepository::list_by_workspace(self.db.as_ref(), workspace_id, params).await?;
        Ok(page.map(FileInfo::from))
    }

    async fn load(&self, user_id: Uuid, file_id: Uuid) -> Result<file_upload::Model, AgentDeskError> {
        let file = FileRepository::find_by_id(self.db.as_ref(), file_id)
            .await?
            .ok_or_else(|| AgentDeskError::not_found("文件"))?;
        require_workspace_access(self.db.as_ref(), file.workspace_id, user_id).await?;
        Ok(file)
    }

    /// 删除记录后尽力删除磁盘文件
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, file_id: Uuid) -> Result<(), AgentDeskError> {
        let file = self.load(user_id, file_id).await?;
        FileRepository::delete(self.db.as_ref(), file.id).await?;
        self.storage.remove(&file.stored_path).await;
        info!(file_id = %file_id, "文件已删除");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_summary(&self, user_id: Uuid, file_id: Uuid) -> Result<FileSummaryInfo, AgentDeskError> {
        let file = self.load(user_id, file_id).await?;
        FileSummaryRepository::find_by_file(self.db.as_ref(), file.id)
            .await?
            .map(FileSummaryInfo::from)
            .ok_or_else(|| AgentDeskError::not_found("文件摘要"))
    }

    #[instrument(skip(self, request))]
    pub async fn put_summary(
        &self,
        user_id: Uuid,
        file_id: Uuid,
        request: PutSummaryRequest,
    ) -> Result<FileSummaryInfo, AgentDeskError> {
        let summary = request.summary.trim();
        if summary.is_empty() {
            return Err(AgentDeskError::validation("summary", "摘要不能为空"));
        }

        let file = self.load(user_id, file_id).await?;
        let saved = FileSummaryRepository::upsert(self.db.as_ref(), file.id, summary.to_string()).await?;
        Ok(saved.into())
    }
}
