//! 导航解析
//!
//! 根据层级菜单把当前路由映射为标题与图标，仅用于展示，不参与访问控制：
//! 被守卫拦截的路由同样可以解析出标题，面包屑永远不会出现空标签。

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 菜单节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub path: String,
    pub label_key: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new(path: impl Into<String>, label_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label_key: label_key.into(),
            icon: None,
            children: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }
}

/// 解析出的标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub label: String,
    pub icon: Option<String>,
    /// 是否精确命中菜单节点
    pub matched: bool,
}

pub struct NavigationResolver {
    menu: Vec<MenuNode>,
    default_label: String,
}

impl NavigationResolver {
    pub fn new(menu: Vec<MenuNode>, default_label: impl Into<String>) -> Self {
        Self {
            menu,
            default_label: default_label.into(),
        }
    }

    pub fn from_json_str(json: &str, default_label: impl Into<String>) -> Result<Self, AppError> {
        let menu: Vec<MenuNode> = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid menu definition: {}", e)))?;
        Ok(Self::new(menu, default_label))
    }

    pub fn from_json_file(
        path: impl AsRef<Path>,
        default_label: impl Into<String>,
    ) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read menu file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json, default_label)
    }

    pub fn menu(&self) -> &[MenuNode] {
        &self.menu
    }

    /// 精确匹配（递归、深度优先、先到先得）
    pub fn find(&self, path: &str) -> Option<&MenuNode> {
        self.breadcrumb(path).pop()
    }

    /// 从根到命中节点的链路；未命中时为空
    pub fn breadcrumb(&self, path: &str) -> Vec<&MenuNode> {
        let target = normalize_path(path);
        let mut trail = Vec::new();
        if find_trail(&self.menu, target, &mut trail) {
            trail
        } else {
            Vec::new()
        }
    }

    pub fn resolve(&self, path: &str) -> ResolvedTitle {
        match self.find(path) {
            Some(node) => ResolvedTitle {
                label: node.label_key.clone(),
                icon: node.icon.clone(),
                matched: true,
            },
            None => ResolvedTitle {
                label: derive_label(path).unwrap_or_else(|| self.default_label.clone()),
                icon: None,
                matched: false,
            },
        }
    }
}

fn find_trail<'a>(nodes: &'a [MenuNode], target: &str, trail: &mut Vec<&'a MenuNode>) -> bool {
    for node in nodes {
        trail.push(node);
        if normalize_path(&node.path) == target || find_trail(&node.children, target, trail) {
            return true;
        }
        trail.pop();
    }
    false
}

/// 去掉 query、fragment 与末尾斜杠
fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// 取最后一个非纯数字的路径段作为默认标签
fn derive_label(path: &str) -> Option<String> {
    normalize_path(path)
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}
