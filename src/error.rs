//! 统一错误模型
//! 定义权限核心的错误类型与面向用户的提示文案

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Failed to load permission catalog: {0}")]
    CatalogLoad(String),

    #[error("Failed to load roles: {0}")]
    RoleLoad(String),

    #[error("Failed to save role permissions: {0}")]
    Persist(String),

    #[error("Upstream API error: {0}")]
    Api(String),

    #[error("Internal error")]
    Internal,
}

impl AppError {
    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Authentication failed".to_string(),
            AppError::NotFound => "Resource not found".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::CatalogLoad(_) => "Could not load the permission list".to_string(),
            AppError::RoleLoad(_) => "Could not load role data".to_string(),
            AppError::Persist(_) => {
                "Saving permissions failed, your changes are still pending".to_string()
            }
            AppError::Api(_) => "The permission service is unavailable".to_string(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal => "Internal error".to_string(),
        }
    }

    /// 包装为目录加载失败
    pub fn into_catalog_load(self) -> Self {
        AppError::CatalogLoad(self.to_string())
    }

    /// 包装为角色加载失败
    pub fn into_role_load(self) -> Self {
        AppError::RoleLoad(self.to_string())
    }

    /// 包装为保存失败
    pub fn into_persist(self) -> Self {
        AppError::Persist(self.to_string())
    }
}

/// 权限存储接入失败
impl From<crate::db::DbError> for AppError {
    fn from(e: crate::db::DbError) -> Self {
        AppError::Api(e.to_string())
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
