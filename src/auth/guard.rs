//! 访问守卫
//! 按角色/权限要求决定受保护路由是否渲染，并提供 axum 路由层集成

use crate::auth::{
    capability::Requirement,
    session::{SessionHandle, SessionState},
};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use std::sync::Arc;

/// 守卫判定结果
///
/// `Forbidden` 与 `RedirectToLogin` 是正常的控制流结果，不是错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// 满足要求，渲染受保护内容
    Render,
    /// 会话尚未恢复完成，显示加载占位
    Loading,
    /// 未登录，跳转登录页
    RedirectToLogin,
    /// 已登录但缺少能力，显示空白/无权限占位（不跳转）
    Forbidden,
}

impl GuardDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardDecision::Render => "render",
            GuardDecision::Loading => "loading",
            GuardDecision::RedirectToLogin => "redirect_to_login",
            GuardDecision::Forbidden => "forbidden",
        }
    }
}

/// 访问守卫
#[derive(Debug, Clone)]
pub struct AccessGuard {
    requirement: Requirement,
}

impl AccessGuard {
    pub fn new(requirement: Requirement) -> Self {
        Self { requirement }
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// 对会话求值；加载中时压制其它分支，避免恢复完成前闪现拒绝
    pub fn evaluate(&self, session: &SessionState) -> GuardDecision {
        if session.is_loading() {
            return GuardDecision::Loading;
        }

        if session.satisfies(&self.requirement) {
            GuardDecision::Render
        } else if !session.is_authenticated() {
            GuardDecision::RedirectToLogin
        } else {
            GuardDecision::Forbidden
        }
    }

    pub fn check(&self, session: &SessionHandle) -> GuardDecision {
        let decision = self.evaluate(session.read().state());

        metrics::counter!(
            "console_guard_decisions_total",
            "outcome" => decision.as_str(),
            "requirement" => self.requirement.kind()
        )
        .increment(1);

        if decision != GuardDecision::Render {
            tracing::debug!(
                decision = decision.as_str(),
                requirement = ?self.requirement,
                "Access guard withheld content"
            );
        }

        decision
    }
}

/// 守卫中间件状态
#[derive(Clone)]
pub struct GuardState {
    pub session: SessionHandle,
    pub guard: AccessGuard,
    pub login_route: String,
}

impl GuardState {
    pub fn new(session: SessionHandle, guard: AccessGuard, login_route: impl Into<String>) -> Self {
        Self {
            session,
            guard,
            login_route: login_route.into(),
        }
    }

    /// 登录跳转目标，携带原路径以便登录后返回
    pub fn login_target(&self, uri: &Uri) -> String {
        let original = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());

        if uri.path() == self.login_route {
            return self.login_route.clone();
        }

        format!(
            "{}?redirect={}",
            self.login_route,
            urlencoding::encode(original)
        )
    }
}

/// 路由守卫中间件
pub async fn access_guard_middleware(
    State(state): State<Arc<GuardState>>,
    req: Request,
    next: Next,
) -> Response {
    match state.guard.check(&state.session) {
        GuardDecision::Render => next.run(req).await,
        GuardDecision::Loading => {
            (StatusCode::SERVICE_UNAVAILABLE, [(header::RETRY_AFTER, "1")]).into_response()
        }
        GuardDecision::RedirectToLogin => Redirect::to(&state.login_target(req.uri())).into_response(),
        GuardDecision::Forbidden => StatusCode::FORBIDDEN.into_response(),
    }
}

/// 为一组路由挂载守卫（在路由注册时调用）
pub fn guarded<S>(router: Router<S>, state: Arc<GuardState>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(state, access_guard_middleware))
}
