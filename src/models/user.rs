//! User as seen by the console session

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 登录时下发的用户快照
///
/// `permissions` 是登录时刻的扁平化授权列表，不保证等于用户各角色权限的实时并集；
/// 只有重新登录或显式刷新才会更新。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// 角色名称
    #[serde(default)]
    pub roles: Vec<String>,
    /// 权限 id
    #[serde(default)]
    pub permissions: Vec<Uuid>,
    #[serde(default)]
    pub is_authenticated: bool,
}
