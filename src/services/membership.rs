// 成员关系校验
// 各服务在读写前通过行查询确认调用者属于所属组织

use sea_orm::DatabaseConnection;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::db::entities::{organization, organization_member, workspace};
use crate::db::{OrganizationMemberRepository, OrganizationRepository, WorkspaceRepository};
use crate::errors::AgentDeskError;

/// 调用者对某个工作区的访问上下文
#[derive(Debug, Clone)]
pub struct WorkspaceAccess {
    pub workspace: workspace::Model,
    pub membership: organization_member::Model,
}

impl WorkspaceAccess {
    /// 是否为所属组织的 owner 或 admin
    pub fn can_manage(&self) -> bool {
        self.membership.role.can_manage()
    }
}

/// 调用者必须是组织成员，否则返回 403
#[instrument(skip(db))]
pub async fn require_org_member(
    db: &DatabaseConnection,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<organization_member::Model, AgentDeskError> {
    match OrganizationMemberRepository::find(db, organization_id, user_id).await? {
        Some(member) => Ok(member),
        None => {
            debug!("调用者不是组织成员");
            Err(AgentDeskError::forbidden("您不是该组织的成员"))
        }
    }
}

/// 组织必须存在（404）且调用者是成员（403）
#[instrument(skip(db))]
pub async fn require_organization(
    db: &DatabaseConnection,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<(organization::Model, organization_member::Model), AgentDeskError> {
    let organization = OrganizationRepository::find_by_id(db, organization_id)
        .await?
        .ok_or_else(|| AgentDeskError::not_found("组织"))?;
    let membership = require_org_member(db, organization_id, user_id).await?;
    Ok((organization, membership))
}

/// 工作区必须存在（404）且调用者是所属组织成员（403）
#[instrument(skip(db))]
pub async fn require_workspace_access(
    db: &DatabaseConnection,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<WorkspaceAccess, AgentDeskError> {
    let workspace = WorkspaceRepository::find_by_id(db, workspace_id)
        .await?
        .ok_or_else(|| AgentDeskError::not_found("工作区"))?;
    let membership = require_org_member(db, workspace.organization_id, user_id).await?;
    Ok(WorkspaceAccess {
        workspace,
        membership,
    })
}
