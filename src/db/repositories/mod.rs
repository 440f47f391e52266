// 数据库仓储模块
// 提供数据访问层的抽象

pub mod user;
pub mod organization;
pub mod workspace;
pub mod agent;
pub mod file;
pub mod connection;
pub mod database_connection;

pub use user::UserRepository;
pub use organization::{OrganizationMemberRepository, OrganizationRepository};
pub use workspace::{WorkspaceMemberRepository, WorkspaceRepository};
pub use agent::{AgentRepository, NewAgent};
pub use file::{FileRepository, FileSummaryRepository, NewFileUpload};
pub use connection::{
    DataSourceRepository, ExternalConnectionRepository, NewDataSource, NewExternalConnection,
    OAuthTokenRepository,
};
pub use database_connection::DatabaseConnectionRepository;

use crate::errors::AgentDeskError;
use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::{DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Select};

/// 按分页参数执行查询，返回当前页和总数
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    params: PaginationParams,
) -> Result<PaginatedResponse<E::Model>, AgentDeskError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let paginator = select.paginate(db, params.page_size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.zero_based_page()).await?;
    Ok(PaginatedResponse::new(items, total, params))
}
