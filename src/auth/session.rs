//! 授权会话
//!
//! 客户端持有的当前用户授权快照。状态只会被整体替换（login / refresh）或整体清空
//! （logout），不存在局部修改。启动时从持久化存储恢复一次，任何读取或解析失败
//! 都降级为"未登录"，不会向外抛错。

use crate::{
    api::IdentityApi,
    auth::{capability::Requirement, store::SessionStore},
    error::AppError,
    models::{
        auth::{LoginCredentials, LoginResponse},
        user::User,
    },
};
use parking_lot::{RwLock, RwLockReadGuard};
use secrecy::{ExposeSecret, Secret};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 访问令牌（Debug 输出已脱敏）
#[derive(Debug, Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccessToken {}

/// 会话状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    user: Option<User>,
    token: Option<AccessToken>,
    permissions: HashSet<Uuid>,
    roles: BTreeSet<String>,
    is_authenticated: bool,
    is_loading: bool,
}

impl SessionState {
    /// 进程启动时、尚未恢复前的状态
    pub fn initial() -> Self {
        Self {
            is_loading: true,
            ..Self::unauthenticated()
        }
    }

    /// 未登录基线
    pub fn unauthenticated() -> Self {
        Self {
            user: None,
            token: None,
            permissions: HashSet::new(),
            roles: BTreeSet::new(),
            is_authenticated: false,
            is_loading: false,
        }
    }

    fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(AccessToken::new(token)),
            permissions: user.permissions.iter().copied().collect(),
            roles: user.roles.iter().cloned().collect(),
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn permissions(&self) -> &HashSet<Uuid> {
        &self.permissions
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// 持有任一所需权限即为 true；空列表为 false
    pub fn check_permission(&self, required: &[Uuid]) -> bool {
        required.iter().any(|id| self.permissions.contains(id))
    }

    pub fn has_permission(&self, id: Uuid) -> bool {
        self.check_permission(&[id])
    }

    /// 持有任一所需角色即为 true；空列表为 false
    pub fn check_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().any(|role| self.roles.contains(role.as_ref()))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.check_role(&[role])
    }

    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        match requirement {
            Requirement::Roles(roles) => self.check_role(roles.as_slice()),
            Requirement::Permissions(ids) => self.check_permission(ids.as_slice()),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

/// 刷新结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// 已用服务端最新数据替换会话
    Refreshed,
    /// 身份 API 未接入刷新端点，会话保持不变
    NotWired,
    /// 当前未登录，无需刷新
    Unauthenticated,
    /// 等待期间会话已被登出或替换，结果被丢弃
    Superseded,
}

/// 授权会话（拥有状态与持久化存储）
pub struct AuthSession {
    state: SessionState,
    store: Arc<dyn SessionStore>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            state: SessionState::initial(),
            store,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 启动时从存储恢复会话，只执行一次
    pub fn hydrate(&mut self) {
        if !self.state.is_loading {
            tracing::debug!("Session already hydrated, skipping");
            return;
        }

        self.state = match self.load_persisted() {
            Ok(Some((token, user))) => {
                tracing::info!(user_id = %user.id, "Session restored from store");
                SessionState::authenticated(token, user)
            }
            Ok(None) => {
                tracing::debug!("No persisted session found");
                SessionState::unauthenticated()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted session is unreadable, starting signed out");
                SessionState::unauthenticated()
            }
        };
    }

    fn load_persisted(&self) -> Result<Option<(String, User)>, crate::auth::store::StoreError> {
        let token = self.store.get_token()?;
        let user = self.store.get_user_info()?;

        match (token, user) {
            (Some(token), Some(user)) if !token.trim().is_empty() => Ok(Some((token, user))),
            _ => Ok(None),
        }
    }

    /// 登录：整体替换会话状态
    pub fn login(&mut self, token: impl Into<String>, user: User) {
        let token = token.into();

        if let Err(e) = self.store.set(&token, &user) {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to persist session");
        }

        tracing::info!(
            user_id = %user.id,
            roles = user.roles.len(),
            permissions = user.permissions.len(),
            "Session established"
        );

        self.state = SessionState::authenticated(token, user);
    }

    /// 登出：清空存储并回到未登录基线
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }

        if let Some(user) = &self.state.user {
            tracing::info!(user_id = %user.id, "Session cleared");
        }

        self.state = SessionState::unauthenticated();
    }

    /// 重新拉取授权信息并按 login 的方式替换
    pub async fn refresh_user_info(
        &mut self,
        identity: &dyn IdentityApi,
    ) -> Result<RefreshOutcome, AppError> {
        let Some(token) = self.current_token() else {
            return Ok(RefreshOutcome::Unauthenticated);
        };

        let fetched = identity.fetch_user_info(&token).await?;
        Ok(self.apply_refresh(fetched))
    }

    fn current_token(&self) -> Option<String> {
        if !self.state.is_authenticated {
            return None;
        }
        self.state.token.as_ref().map(|t| t.expose().to_string())
    }

    fn apply_refresh(&mut self, fetched: Option<LoginResponse>) -> RefreshOutcome {
        match fetched {
            Some(response) => {
                self.login(response.token, response.user);
                RefreshOutcome::Refreshed
            }
            None => {
                tracing::debug!("Identity API has no refresh endpoint, session left unchanged");
                RefreshOutcome::NotWired
            }
        }
    }

    pub fn check_permission(&self, required: &[Uuid]) -> bool {
        self.state.check_permission(required)
    }

    pub fn check_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        self.state.check_role(required)
    }
}

/// 共享的会话句柄，注入到守卫中间件与控制台运行时
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<AuthSession>>,
}

impl SessionHandle {
    pub fn new(session: AuthSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// 读取当前会话（同步、不阻塞 await）
    pub fn read(&self) -> RwLockReadGuard<'_, AuthSession> {
        self.inner.read()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.read().state().clone()
    }

    pub fn hydrate(&self) {
        self.inner.write().hydrate();
    }

    pub fn login(&self, token: impl Into<String>, user: User) {
        self.inner.write().login(token, user);
    }

    pub fn logout(&self) {
        self.inner.write().logout();
    }

    pub fn check_permission(&self, required: &[Uuid]) -> bool {
        self.inner.read().check_permission(required)
    }

    pub fn check_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        self.inner.read().check_role(required)
    }

    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        self.inner.read().state().satisfies(requirement)
    }

    /// 通过身份 API 登录；失败时会话保持不变
    pub async fn login_with(
        &self,
        identity: &dyn IdentityApi,
        credentials: &LoginCredentials,
    ) -> Result<(), AppError> {
        credentials
            .validate()
            .map_err(|e| AppError::BadRequest(format!("Invalid credentials: {}", e)))?;

        let response = identity.login(credentials).await?;
        self.login(response.token, response.user);
        Ok(())
    }

    /// 刷新授权信息；等待期间不持有锁
    pub async fn refresh_user_info(
        &self,
        identity: &dyn IdentityApi,
    ) -> Result<RefreshOutcome, AppError> {
        let token = self.inner.read().current_token();
        let Some(token) = token else {
            return Ok(RefreshOutcome::Unauthenticated);
        };

        let fetched = identity.fetch_user_info(&token).await?;

        let mut session = self.inner.write();
        if session.current_token().as_deref() != Some(token.as_str()) {
            tracing::debug!("Session changed while refreshing, discarding result");
            return Ok(RefreshOutcome::Superseded);
        }
        Ok(session.apply_refresh(fetched))
    }
}
