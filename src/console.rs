//! 控制台运行时
//! 根据配置组装会话、导航与守卫，把显式的上下文对象注入调用链

use crate::{
    api::PermissionApi,
    auth::{
        guard::{AccessGuard, GuardState},
        session::{AuthSession, SessionHandle},
        store::{FileSessionStore, MemorySessionStore, SessionStore},
        Requirement,
    },
    config::AppConfig,
    db,
    editor::PermissionMatrixEditor,
    error::AppError,
    navigation::NavigationResolver,
    repository::RoleRepository,
    telemetry,
};
use std::sync::Arc;

pub struct Console {
    config: AppConfig,
    session: SessionHandle,
    navigation: Arc<NavigationResolver>,
}

impl Console {
    /// 启动：安装日志、选择会话存储、恢复会话、加载菜单
    ///
    /// 会话恢复不会失败；只有菜单文件不可读或格式错误时返回错误。
    pub fn bootstrap(config: AppConfig) -> Result<Self, AppError> {
        telemetry::init_telemetry(&config.logging);

        let store: Arc<dyn SessionStore> = match &config.session.store_path {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };

        let navigation = match &config.console.menu_path {
            Some(path) => NavigationResolver::from_json_file(path, &config.console.default_title)?,
            None => NavigationResolver::new(Vec::new(), &config.console.default_title),
        };

        Ok(Self::with_store(config, store, navigation))
    }

    /// 以指定存储和菜单组装（测试与嵌入场景）
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn SessionStore>,
        navigation: NavigationResolver,
    ) -> Self {
        let session = SessionHandle::new(AuthSession::new(store));
        session.hydrate();

        let snapshot = session.snapshot();
        tracing::info!(
            authenticated = snapshot.is_authenticated(),
            menu_entries = navigation.menu().len(),
            "Console runtime ready"
        );

        Self {
            config,
            session,
            navigation: Arc::new(navigation),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn navigation(&self) -> &NavigationResolver {
        &self.navigation
    }

    /// 为一组路由生成守卫状态，配合 `auth::guarded` 使用
    pub fn guard(&self, requirement: Requirement) -> Arc<GuardState> {
        Arc::new(GuardState::new(
            self.session.clone(),
            AccessGuard::new(requirement),
            self.config.console.login_route.clone(),
        ))
    }

    /// 连接权限库（含迁移），返回可直接交给编辑器的服务端实现
    pub async fn open_permission_store(&self) -> Result<Arc<RoleRepository>, AppError> {
        let pool = db::connect(&self.config.database).await?;
        Ok(Arc::new(RoleRepository::new(pool)))
    }

    /// 新建权限矩阵编辑器（不持有会话）
    pub fn permission_editor(&self, api: Arc<dyn PermissionApi>) -> PermissionMatrixEditor {
        PermissionMatrixEditor::new(api)
    }
}
