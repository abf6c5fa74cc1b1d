//! 会话持久化存储
//! 对外只暴露 get / set / clear 原语

use crate::models::user::User;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 存储错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed persisted session: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 持久化的会话记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    user: User,
}

/// 会话存储
pub trait SessionStore: Send + Sync {
    fn get_token(&self) -> Result<Option<String>, StoreError>;

    fn get_user_info(&self) -> Result<Option<User>, StoreError>;

    fn set(&self, token: &str, user: &User) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// 内存会话存储（进程退出即丢失）
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有会话初始化（用于启动恢复场景）
    pub fn with_session(token: &str, user: User) -> Self {
        Self {
            inner: Mutex::new(Some(PersistedSession {
                token: token.to_string(),
                user,
            })),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().as_ref().map(|s| s.token.clone()))
    }

    fn get_user_info(&self) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().as_ref().map(|s| s.user.clone()))
    }

    fn set(&self, token: &str, user: &User) -> Result<(), StoreError> {
        *self.inner.lock() = Some(PersistedSession {
            token: token.to_string(),
            user: user.clone(),
        });
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

/// 文件会话存储（JSON）
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<PersistedSession>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }
}

impl SessionStore for FileSessionStore {
    fn get_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.map(|s| s.token))
    }

    fn get_user_info(&self) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.map(|s| s.user))
    }

    fn set(&self, token: &str, user: &User) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let record = PersistedSession {
            token: token.to_string(),
            user: user.clone(),
        };
        let json = serde_json::to_string(&record)?;

        // 先写临时文件再重命名，避免读到半截内容
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
