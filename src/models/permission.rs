//! Permission catalog models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission: an atomic (resource_type, action) capability grant
///
/// `(resource_type, action)` is not unique across the catalog: scoped variants
/// may repeat a pair under different ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub resource_type: String,
    pub action: String,
    /// 操作的展示名称，为空时回退到 action
    #[serde(default)]
    pub action_label: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
}

impl Permission {
    pub fn display_label(&self) -> &str {
        if self.action_label.trim().is_empty() {
            &self.action
        } else {
            &self.action_label
        }
    }
}

/// 权限列表过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl PermissionFilter {
    pub fn active_only() -> Self {
        Self {
            is_active: Some(true),
        }
    }

    pub fn matches(&self, permission: &Permission) -> bool {
        self.is_active.map_or(true, |active| permission.is_active == active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(action_label: &str, is_active: bool) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            resource_type: "order".to_string(),
            action: "read".to_string(),
            action_label: action_label.to_string(),
            description: None,
            is_active,
        }
    }

    #[test]
    fn test_display_label_falls_back_to_action() {
        assert_eq!(permission("", true).display_label(), "read");
        assert_eq!(permission("  ", true).display_label(), "read");
        assert_eq!(permission("View orders", true).display_label(), "View orders");
    }

    #[test]
    fn test_filter_matches() {
        let active = permission("", true);
        let inactive = permission("", false);

        assert!(PermissionFilter::default().matches(&active));
        assert!(PermissionFilter::default().matches(&inactive));
        assert!(PermissionFilter::active_only().matches(&active));
        assert!(!PermissionFilter::active_only().matches(&inactive));
    }
}
