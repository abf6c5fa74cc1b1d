//! 权限存储的数据库接入
//! 连接 PostgreSQL、执行 permissions / roles / role_permissions 迁移，并核对表结构就绪

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 角色权限矩阵依赖的表
const REQUIRED_TABLES: [&str; 3] = ["permissions", "roles", "role_permissions"];

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Permission schema incomplete, missing tables: {0}")]
    SchemaIncomplete(String),
}

/// 打开权限存储：建池、迁移、核对表结构
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = pool_options(config)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Cannot reach permission database");
            DbError::ConnectionFailed(e.to_string())
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "Permission schema migration failed");
        DbError::MigrationFailed(e.to_string())
    })?;

    let missing = missing_tables(&pool).await?;
    if !missing.is_empty() {
        return Err(DbError::SchemaIncomplete(missing.join(", ")));
    }

    tracing::info!(
        max_connections = config.max_connections,
        "Permission store ready"
    );

    Ok(pool)
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
}

async fn missing_tables(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let present: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::TEXT
        FROM information_schema.tables
        WHERE table_schema = current_schema() AND table_name = ANY($1)
        "#,
    )
    .bind(&REQUIRED_TABLES[..])
    .fetch_all(pool)
    .await
    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    Ok(REQUIRED_TABLES
        .iter()
        .filter(|table| !present.iter().any(|p| p == *table))
        .map(|table| table.to_string())
        .collect())
}
