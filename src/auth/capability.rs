//! 访问要求描述
//!
//! 路由或组件声明"需要哪些角色/权限"。单值与列表统一规范化为有序、去重的列表，
//! 列表内按 OR 语义求值：满足任意一项即可。空列表永远不满足。

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// 需要任一角色（按角色名）
    Roles(Vec<String>),
    /// 需要任一权限（按权限 id）
    Permissions(Vec<Uuid>),
}

impl Requirement {
    pub fn role(role: impl Into<String>) -> Self {
        Requirement::Roles(vec![role.into()])
    }

    pub fn any_role<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Requirement::Roles(normalize(roles.into_iter().map(Into::into)))
    }

    pub fn permission(id: Uuid) -> Self {
        Requirement::Permissions(vec![id])
    }

    pub fn any_permission<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Uuid>,
    {
        Requirement::Permissions(normalize(ids.into_iter()))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Requirement::Roles(roles) => roles.is_empty(),
            Requirement::Permissions(ids) => ids.is_empty(),
        }
    }

    /// 用于日志与指标的类别标签
    pub fn kind(&self) -> &'static str {
        match self {
            Requirement::Roles(_) => "role",
            Requirement::Permissions(_) => "permission",
        }
    }
}

/// 保序去重
fn normalize<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
