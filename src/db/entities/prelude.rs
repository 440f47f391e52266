// 实体预导入模块
// 提供便捷的实体导入

pub use super::user::{Entity as User, Model as UserModel, ActiveModel as UserActiveModel};
pub use super::organization::{
    Entity as Organization, Model as OrganizationModel, ActiveModel as OrganizationActiveModel,
};
pub use super::organization_member::{
    Entity as OrganizationMember, Model as OrganizationMemberModel,
    ActiveModel as OrganizationMemberActiveModel, OrganizationRole,
};
pub use super::workspace::{Entity as Workspace, Model as WorkspaceModel, ActiveModel as WorkspaceActiveModel};
pub use super::workspace_member::{
    Entity as WorkspaceMember, Model as WorkspaceMemberModel, ActiveModel as WorkspaceMemberActiveModel,
    WorkspaceRole,
};
pub use super::ai_agent::{Entity as AiAgent, Model as AiAgentModel, ActiveModel as AiAgentActiveModel};
pub use super::file_upload::{Entity as FileUpload, Model as FileUploadModel, ActiveModel as FileUploadActiveModel};
pub use super::file_summary::{
    Entity as FileSummary, Model as FileSummaryModel, ActiveModel as FileSummaryActiveModel,
};
pub use super::external_connection::{
    Entity as ExternalConnection, Model as ExternalConnectionModel,
    ActiveModel as ExternalConnectionActiveModel, ConnectionStatus, ConnectionType,
};
pub use super::oauth_token::{Entity as OAuthToken, Model as OAuthTokenModel, ActiveModel as OAuthTokenActiveModel};
pub use super::workspace_data_source::{
    Entity as WorkspaceDataSource, Model as WorkspaceDataSourceModel,
    ActiveModel as WorkspaceDataSourceActiveModel,
};
pub use super::database_connection::{
    Entity as DatabaseConnectionEntity, Model as DatabaseConnectionModel,
    ActiveModel as DatabaseConnectionActiveModel, DatabaseType,
};
