use crate::auth::validate_token;
use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, HttpMessage, HttpRequest,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};

/// Attached to requests that carry a valid, current admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub epoch: u64,
}

/// Checks a bearer token against the JWT secret and the gate's current
/// session epoch.
pub fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AdminSession, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'".to_string(),
        )
    })?;

    let claims = validate_token(token, &state.jwt_secret)?;
    if !state.gate.is_current_session(claims.epoch) {
        return Err(AppError::Unauthorized("Session has ended".to_string()));
    }

    Ok(AdminSession {
        epoch: claims.epoch,
    })
}

/// Session for handlers outside the protected scope, where a token is optional.
pub fn optional_session(req: &HttpRequest, state: &AppState) -> Option<AdminSession> {
    if req.headers().contains_key(AUTHORIZATION) {
        authenticate(req.headers(), state).ok()
    } else {
        None
    }
}

/// Rejects requests without a current admin session.
pub struct AdminAuthentication;

impl<S, B> Transform<S, ServiceRequest> for AdminAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AdminAuthenticationService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthenticationService { service }))
    }
}

pub struct AdminAuthenticationService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AdminAuthenticationService<S>
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
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => authenticate(req.headers(), state),
            None => Err(AppError::Internal("Application state missing".to_string())),
        };

        match result {
            Ok(session) => {
                req.extensions_mut().insert(session);
                Box::pin(self.service.call(req))
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Admin auth failed");
                let error: Error = e.into();
                Box::pin(async move { Err(error) })
            }
        }
    }
}
