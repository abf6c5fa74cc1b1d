//! Role domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    /// 业务主键，创建后不可修改
    pub code: String,
    pub name: String,
    /// locale -> 名称
    #[sqlx(json)]
    #[serde(default)]
    pub localized_names: HashMap<String, String>,
    pub description: Option<String>,
    /// 按需加载；`None` 表示尚未从服务端获取
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<Uuid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// 取本地化名称，缺失时回退到 name
    pub fn display_name(&self, locale: &str) -> &str {
        self.localized_names
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// Assign role permissions request (full replace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRolePermissionsRequest {
    pub permission_ids: Vec<Uuid>,
}

impl AssignRolePermissionsRequest {
    pub fn from_set(ids: &BTreeSet<Uuid>) -> Self {
        Self {
            permission_ids: ids.iter().copied().collect(),
        }
    }
}
