use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{web, HttpResponse, Result};
use shared_types::{ColorScheme, LogoSettings, MessagingSettings};

pub async fn get_logo(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let logo = data.settings.logo().await?;
    Ok(HttpResponse::Ok().json(LogoSettings { logo }))
}

/// Stores the uploaded logo. A null `logo` removes it.
pub async fn update_logo(
    data: web::Data<AppState>,
    request: web::Json<LogoSettings>,
) -> Result<HttpResponse, AppError> {
    match request.logo.as_deref() {
        Some(data_url) => data.settings.set_logo(data_url).await?,
        None => data.settings.clear_logo().await?,
    }

    let logo = data.settings.logo().await?;
    Ok(HttpResponse::Ok().json(LogoSettings { logo }))
}

pub async fn delete_logo(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    data.settings.clear_logo().await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_messaging(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let destination = data.settings.destination().await?;
    Ok(HttpResponse::Ok().json(MessagingSettings { destination }))
}

pub async fn update_messaging(
    data: web::Data<AppState>,
    request: web::Json<MessagingSettings>,
) -> Result<HttpResponse, AppError> {
    data.settings.set_destination(&request.destination).await?;
    tracing::info!("Messaging destination updated");

    let destination = data.settings.destination().await?;
    Ok(HttpResponse::Ok().json(MessagingSettings { destination }))
}

pub async fn get_colors(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let colors = data.settings.colors().await?;
    Ok(HttpResponse::Ok().json(colors))
}

pub async fn update_colors(
    data: web::Data<AppState>,
    request: web::Json<ColorScheme>,
) -> Result<HttpResponse, AppError> {
    data.settings.set_colors(&request).await?;
    let colors = data.settings.colors().await?;
    Ok(HttpResponse::Ok().json(colors))
}

/// Restores the default palette and returns it.
pub async fn reset_colors(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let colors = data.settings.reset_colors().await?;
    Ok(HttpResponse::Ok().json(colors))
}
