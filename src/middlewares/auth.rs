use crate::error::AppError;
use crate::models::AuthenticatedUser;
use crate::utils::TokenVerifier;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // 仅 GET 公开的前缀
    read_prefixes: Vec<&'static str>,
    // 即使命中公开前缀也需要认证的后缀
    excluded_suffixes: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/partnership",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
            read_prefixes: vec![
                "/api/v1/campaigns",
                "/api/v1/events",
                "/api/v1/blog-posts",
                "/api/v1/teams",
                "/api/v1/lookups",
                "/api/v1/dashboard/overview",
            ],
            excluded_suffixes: vec!["/registrations"],
        }
    }

    fn is_public_path(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }
        if method != Method::GET {
            return false;
        }
        if self
            .excluded_suffixes
            .iter()
            .any(|&suffix| path.ends_with(suffix))
        {
            return false;
        }
        self.read_prefixes
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub struct AuthMiddleware {
    verifier: TokenVerifier,
}

impl AuthMiddleware {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            verifier: self.verifier.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    verifier: TokenVerifier,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let token = bearer_token(&req);
        let is_public = self.public_paths.is_public_path(req.method(), req.path());

        match token.map(|t| self.verifier.verify(&t)) {
            Some(Ok(claims)) => {
                req.extensions_mut().insert(AuthenticatedUser::from(claims));
                Box::pin(self.service.call(req))
            }
            // 公开接口上的无效 token 按匿名处理
            Some(Err(_)) | None if is_public => Box::pin(self.service.call(req)),
            Some(Err(e)) => {
                log::debug!("Rejected token on {}: {e}", req.path());
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 从请求扩展中取出鉴权中间件注入的调用方；公开接口可用 `Option<AuthenticatedUser>`
impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(user.ok_or_else(|| AppError::AuthError("Missing access token".to_string()).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_reads() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path(&Method::GET, "/api/v1/campaigns"));
        assert!(paths.is_public_path(&Method::GET, "/api/v1/events/3"));
        assert!(paths.is_public_path(&Method::GET, "/swagger-ui/index.html"));
        assert!(paths.is_public_path(&Method::POST, "/api/v1/partnership"));
    }

    #[test]
    fn test_writes_and_private_reads_need_auth() {
        let paths = PublicPaths::new();
        assert!(!paths.is_public_path(&Method::POST, "/api/v1/campaigns"));
        assert!(!paths.is_public_path(&Method::POST, "/api/v1/events/3/register"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/events/3/registrations"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/dashboard/summary"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/donations/mine"));
    }
}
