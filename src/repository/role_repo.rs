//! Role repository (角色与权限数据访问)

use crate::{
    api::PermissionApi,
    error::AppError,
    models::{
        permission::{Permission, PermissionFilter},
        role::{AssignRolePermissionsRequest, Role},
    },
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RoleRepository {
    db: PgPool,
}

impl RoleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ==================== Roles ====================

    /// 根据 ID 查找角色
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, code, name, localized_names, description, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(role)
    }

    /// 创建角色
    pub async fn insert_role(&self, role: &Role) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, code, name, localized_names, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.id)
        .bind(&role.code)
        .bind(&role.name)
        .bind(sqlx::types::Json(&role.localized_names))
        .bind(&role.description)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    // ==================== Permissions ====================

    /// 写入权限目录条目
    pub async fn insert_permission(&self, permission: &Permission) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, resource_type, action, action_label, description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(permission.id)
        .bind(&permission.resource_type)
        .bind(&permission.action)
        .bind(&permission.action_label)
        .bind(&permission.description)
        .bind(permission.is_active)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PermissionApi for RoleRepository {
    /// 列出权限目录
    async fn list_permissions(&self, filter: PermissionFilter) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, resource_type, action, action_label, description, is_active
            FROM permissions
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
            ORDER BY resource_type, action
            "#,
        )
        .bind(filter.is_active)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// 获取角色的所有权限
    async fn list_role_permissions(&self, role_id: Uuid) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.resource_type, p.action, p.action_label, p.description, p.is_active
            FROM permissions p
            JOIN role_permissions rp ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.resource_type, p.action
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// 整体替换角色权限
    ///
    /// 删除与插入在同一事务中完成，失败时不会留下部分生效的授权。
    async fn assign_role_permissions(
        &self,
        role_id: Uuid,
        request: AssignRolePermissionsRequest,
    ) -> Result<(), AppError> {
        let mut ids = request.permission_ids;
        ids.sort_unstable();
        ids.dedup();

        let mut tx = self.db.begin().await?;

        let role: Option<Uuid> = sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(role_id)
            .fetch_optional(&mut *tx)
            .await?;

        if role.is_none() {
            return Err(AppError::NotFound);
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        if !ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, UNNEST($2::UUID[])
                "#,
            )
            .bind(role_id)
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE roles SET updated_at = NOW() WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            role_id = %role_id,
            permission_count = ids.len(),
            "Role permissions replaced"
        );

        Ok(())
    }

    /// 列出所有角色
    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, code, name, localized_names, description, created_at, updated_at
            FROM roles
            ORDER BY code
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }
}
