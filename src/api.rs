//! 协作方接口
//! 权限 API 与身份 API 的抽象，编辑器与会话只依赖这里的 trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::{LoginCredentials, LoginResponse},
        permission::{Permission, PermissionFilter},
        role::{AssignRolePermissionsRequest, Role},
    },
};

/// 权限 API
#[async_trait]
pub trait PermissionApi: Send + Sync {
    /// 列出权限目录
    async fn list_permissions(&self, filter: PermissionFilter) -> Result<Vec<Permission>, AppError>;

    /// 列出角色当前拥有的权限
    async fn list_role_permissions(&self, role_id: Uuid) -> Result<Vec<Permission>, AppError>;

    /// 整体替换角色的权限集合（非增量）
    async fn assign_role_permissions(
        &self,
        role_id: Uuid,
        request: AssignRolePermissionsRequest,
    ) -> Result<(), AppError>;

    /// 列出所有角色
    async fn list_roles(&self) -> Result<Vec<Role>, AppError>;
}

/// 身份 API
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, AppError>;

    /// 重新获取当前令牌对应的权威授权信息
    ///
    /// 返回 `Ok(None)` 表示该实现没有接入刷新端点，调用方必须把它当作"未执行"，
    /// 而不是"已刷新"。
    async fn fetch_user_info(&self, _token: &str) -> Result<Option<LoginResponse>, AppError> {
        Ok(None)
    }
}
