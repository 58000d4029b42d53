use crate::auth::{generate_token, Claims};
use crate::error::AppError;
use crate::handlers::AppState;
use crate::middleware::optional_session;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use leadform_core::export::summarize;
use leadform_core::ResponseSource;
use shared_types::{AdminLoginRequest, AdminLoginResponse, SetPasswordRequest};

pub async fn get_status(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let status = data.gate.status().await?;
    Ok(HttpResponse::Ok().json(status))
}

/// First-time setup, password change and password reset all land here. A
/// valid token marks the change as authenticated.
pub async fn set_password(
    req: HttpRequest,
    data: web::Data<AppState>,
    request: web::Json<SetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let authenticated = optional_session(&req, &data).is_some();
    data.gate
        .set_password(
            &request.new_password,
            &request.confirm_password,
            authenticated,
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn login(
    data: web::Data<AppState>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let epoch = data.gate.login(&request.password).await?;
    let token = generate_token(&Claims::new(epoch, data.token_hours), &data.jwt_secret)?;
    Ok(HttpResponse::Ok().json(AdminLoginResponse { token }))
}

pub async fn logout(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    data.gate.logout();
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_stats(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let records = data.recorder.responses(ResponseSource::Local).await?;
    let questions = data.questions.list().await?;
    Ok(HttpResponse::Ok().json(summarize(&records, questions.len())))
}
