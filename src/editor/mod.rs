//! 权限矩阵编辑器
//!
//! 一次编辑一个角色：选中角色后把其权限 id 载入基线与工作集，勾选只修改工作集，
//! 保存时整体替换服务端集合，撤销时工作集回到基线。
//!
//! 三个网络操作（加载目录、加载角色权限、保存）是仅有的挂起点。每个操作都有
//! `begin_*` / `complete_*` 两段式接口，请求带单调递增的 id，过期的响应会被丢弃。
//! 编辑器从不修改授权会话：即使编辑的是当前用户自己的角色，也要下次登录才生效。

pub mod change_set;
pub mod grouping;

pub use change_set::{PendingChangeSet, PermissionDiff};
pub use grouping::{group_permissions, Coverage, PermissionCell, PermissionGroup};

use crate::{
    api::PermissionApi,
    error::AppError,
    models::{
        permission::{Permission, PermissionFilter},
        role::{AssignRolePermissionsRequest, Role},
    },
};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// 编辑器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Loaded,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// 面向用户的临时通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(error: &AppError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: error.user_message(),
        }
    }
}

/// 加载角色权限的请求凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLoadTicket {
    request_id: u64,
    role_id: Uuid,
}

impl RoleLoadTicket {
    pub fn role_id(&self) -> Uuid {
        self.role_id
    }
}

/// 保存请求凭据，记录提交时的完整集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    request_id: u64,
    role_id: Uuid,
    submitted: BTreeSet<Uuid>,
}

impl SaveTicket {
    pub fn role_id(&self) -> Uuid {
        self.role_id
    }

    pub fn request(&self) -> AssignRolePermissionsRequest {
        AssignRolePermissionsRequest::from_set(&self.submitted)
    }
}

/// 选中角色的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// 已载入；`discarded_changes` 表示上一个角色的未保存修改被丢弃
    Loaded { discarded_changes: bool },
    /// 响应已过期（之后又发起了新的选择）
    Stale,
}

/// 保存的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// 响应已过期（之后又发起了新的保存，或已切换角色）
    Stale,
}

pub struct PermissionMatrixEditor {
    api: Arc<dyn PermissionApi>,
    catalog: Vec<Permission>,
    roles: Vec<Role>,
    selection: Option<PendingChangeSet>,
    notices: Vec<Notice>,
    next_request_id: u64,
    latest_load: Option<u64>,
    latest_save: Option<u64>,
}

impl PermissionMatrixEditor {
    pub fn new(api: Arc<dyn PermissionApi>) -> Self {
        Self {
            api,
            catalog: Vec::new(),
            roles: Vec::new(),
            selection: None,
            notices: Vec::new(),
            next_request_id: 0,
            latest_load: None,
            latest_save: None,
        }
    }

    // ==================== 查询 ====================

    pub fn state(&self) -> EditorState {
        match (&self.selection, self.latest_save) {
            (None, _) => EditorState::Idle,
            (Some(_), Some(_)) => EditorState::Saving,
            (Some(_), None) => EditorState::Loaded,
        }
    }

    pub fn catalog(&self) -> &[Permission] {
        &self.catalog
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn pending(&self) -> Option<&PendingChangeSet> {
        self.selection.as_ref()
    }

    pub fn selected_role_id(&self) -> Option<Uuid> {
        self.selection.as_ref().map(PendingChangeSet::role_id)
    }

    pub fn selected_role(&self) -> Option<&Role> {
        let role_id = self.selected_role_id()?;
        self.roles.iter().find(|r| r.id == role_id)
    }

    pub fn has_changes(&self) -> bool {
        self.selection.as_ref().is_some_and(PendingChangeSet::has_changes)
    }

    pub fn diff(&self) -> PermissionDiff {
        self.selection
            .as_ref()
            .map(PendingChangeSet::diff)
            .unwrap_or_default()
    }

    /// 按资源类型分组的矩阵视图
    pub fn groups(&self) -> Vec<PermissionGroup> {
        let empty = BTreeSet::new();
        let selected = self.selection.as_ref().map_or(&empty, PendingChangeSet::current);
        group_permissions(&self.catalog, selected)
    }

    /// 取出并清空待展示的通知
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ==================== 目录与角色 ====================

    /// 加载启用中的权限目录；失败时保留原目录
    pub async fn load_catalog(&mut self) -> Result<(), AppError> {
        match self.api.list_permissions(PermissionFilter::active_only()).await {
            Ok(catalog) => {
                tracing::debug!(count = catalog.len(), "Permission catalog loaded");
                self.catalog = catalog;
                Ok(())
            }
            Err(e) => {
                let error = e.into_catalog_load();
                tracing::warn!(error = %error, "Permission catalog load failed");
                self.notices.push(Notice::error(&error));
                Err(error)
            }
        }
    }

    /// 加载角色目录；失败时保留原目录
    pub async fn load_roles(&mut self) -> Result<(), AppError> {
        match self.api.list_roles().await {
            Ok(mut roles) => {
                // 已加载过的角色权限随目录刷新保留
                for role in roles.iter_mut() {
                    if let Some(previous) = self.roles.iter().find(|r| r.id == role.id) {
                        role.permissions.clone_from(&previous.permissions);
                    }
                }
                tracing::debug!(count = roles.len(), "Role directory loaded");
                self.roles = roles;
                Ok(())
            }
            Err(e) => {
                let error = e.into_role_load();
                tracing::warn!(error = %error, "Role directory load failed");
                self.notices.push(Notice::error(&error));
                Err(error)
            }
        }
    }

    // ==================== 选择角色 ====================

    pub async fn select_role(&mut self, role_id: Uuid) -> Result<SelectOutcome, AppError> {
        let ticket = self.begin_select_role(role_id);
        let result = self.api.list_role_permissions(role_id).await;
        self.complete_select_role(ticket, result)
    }

    pub fn begin_select_role(&mut self, role_id: Uuid) -> RoleLoadTicket {
        let request_id = self.issue_request_id();
        self.latest_load = Some(request_id);
        RoleLoadTicket {
            request_id,
            role_id,
        }
    }

    pub fn complete_select_role(
        &mut self,
        ticket: RoleLoadTicket,
        result: Result<Vec<Permission>, AppError>,
    ) -> Result<SelectOutcome, AppError> {
        if self.latest_load != Some(ticket.request_id) {
            tracing::debug!(
                role_id = %ticket.role_id,
                request_id = ticket.request_id,
                "Discarding stale role permission response"
            );
            return Ok(SelectOutcome::Stale);
        }
        self.latest_load = None;

        let permissions = match result {
            Ok(permissions) => permissions,
            Err(e) => {
                let error = e.into_role_load();
                tracing::warn!(role_id = %ticket.role_id, error = %error, "Role permission load failed");
                self.notices.push(Notice::error(&error));
                return Err(error);
            }
        };

        let ids: BTreeSet<Uuid> = permissions.iter().map(|p| p.id).collect();

        let discarded_changes = self.has_changes();
        if discarded_changes {
            tracing::info!(
                previous_role_id = ?self.selected_role_id(),
                role_id = %ticket.role_id,
                "Unsaved permission edits discarded on role switch"
            );
        }

        self.cache_role_permissions(ticket.role_id, &ids);
        self.selection = Some(PendingChangeSet::new(ticket.role_id, ids));
        self.latest_save = None;

        Ok(SelectOutcome::Loaded { discarded_changes })
    }

    // ==================== 编辑 ====================

    /// 翻转一项权限，返回翻转后的勾选状态
    pub fn toggle(&mut self, permission_id: Uuid) -> Result<bool, AppError> {
        if !self.catalog.iter().any(|p| p.id == permission_id) {
            return Err(AppError::NotFound);
        }
        let selection = self.selection_mut()?;
        Ok(selection.toggle(permission_id))
    }

    /// 整组勾选或取消
    pub fn set_group(&mut self, resource_type: &str, checked: bool) -> Result<(), AppError> {
        let ids: Vec<Uuid> = self
            .catalog
            .iter()
            .filter(|p| p.resource_type == resource_type)
            .map(|p| p.id)
            .collect();

        if ids.is_empty() {
            return Err(AppError::NotFound);
        }

        let selection = self.selection_mut()?;
        for id in ids {
            selection.set(id, checked);
        }
        Ok(())
    }

    /// 撤销所有未保存修改，返回是否有内容被撤销
    pub fn undo(&mut self) -> bool {
        match self.selection.as_mut() {
            Some(selection) if selection.has_changes() => {
                selection.reset();
                true
            }
            _ => false,
        }
    }

    // ==================== 保存 ====================

    pub async fn save(&mut self) -> Result<SaveOutcome, AppError> {
        let ticket = self.begin_save()?;
        let result = self
            .api
            .assign_role_permissions(ticket.role_id, ticket.request())
            .await;
        self.complete_save(ticket, result)
    }

    pub fn begin_save(&mut self) -> Result<SaveTicket, AppError> {
        let (role_id, submitted) = {
            let selection = self
                .selection
                .as_ref()
                .ok_or_else(|| AppError::BadRequest("No role selected".to_string()))?;
            (selection.role_id(), selection.current().clone())
        };

        let request_id = self.issue_request_id();
        self.latest_save = Some(request_id);

        tracing::debug!(
            role_id = %role_id,
            request_id,
            permission_count = submitted.len(),
            "Saving role permissions"
        );

        Ok(SaveTicket {
            request_id,
            role_id,
            submitted,
        })
    }

    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), AppError>,
    ) -> Result<SaveOutcome, AppError> {
        let current_role = self.selected_role_id();
        if self.latest_save != Some(ticket.request_id) || current_role != Some(ticket.role_id) {
            tracing::debug!(
                role_id = %ticket.role_id,
                request_id = ticket.request_id,
                succeeded = result.is_ok(),
                "Discarding stale save response"
            );
            // 过期的失败仍需告知用户：那次提交的修改没有写入
            if let Err(e) = result {
                let error = e.into_persist();
                tracing::warn!(role_id = %ticket.role_id, error = %error, "Superseded role permission save failed");
                metrics::counter!("console_role_permission_saves_total", "outcome" => "failure")
                    .increment(1);
                self.notices.push(Notice::error(&error));
            }
            return Ok(SaveOutcome::Stale);
        }
        self.latest_save = None;

        match result {
            Ok(()) => {
                let selection = self.selection_mut()?;
                let before = selection.original().clone();
                selection.commit(ticket.submitted.clone());

                tracing::info!(
                    role_id = %ticket.role_id,
                    added = ticket.submitted.difference(&before).count(),
                    removed = before.difference(&ticket.submitted).count(),
                    "Role permissions saved"
                );
                metrics::counter!("console_role_permission_saves_total", "outcome" => "success")
                    .increment(1);

                self.cache_role_permissions(ticket.role_id, &ticket.submitted);
                self.notices.push(Notice::success("Permissions saved"));
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                let error = e.into_persist();
                tracing::warn!(role_id = %ticket.role_id, error = %error, "Role permission save failed");
                metrics::counter!("console_role_permission_saves_total", "outcome" => "failure")
                    .increment(1);

                self.notices.push(Notice::error(&error));
                Err(error)
            }
        }
    }

    // ==================== 内部 ====================

    fn issue_request_id(&mut self) -> u64 {
        self.next_request_id += 1;
        self.next_request_id
    }

    fn selection_mut(&mut self) -> Result<&mut PendingChangeSet, AppError> {
        self.selection
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("No role selected".to_string()))
    }

    fn cache_role_permissions(&mut self, role_id: Uuid, ids: &BTreeSet<Uuid>) {
        if let Some(role) = self.roles.iter_mut().find(|r| r.id == role_id) {
            role.permissions = Some(ids.clone());
        }
    }
}
