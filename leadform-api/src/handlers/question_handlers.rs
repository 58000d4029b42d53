use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{web, HttpResponse, Result};
use shared_types::{QuestionDraft, QuestionId, QuestionListResponse, QuestionResponse};

/// Lists questions, persisting the default set the first time.
pub async fn list_questions(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let questions = data.questions.list_or_seed().await?;
    Ok(HttpResponse::Ok().json(QuestionListResponse { questions }))
}

pub async fn create_question(
    data: web::Data<AppState>,
    request: web::Json<QuestionDraft>,
) -> Result<HttpResponse, AppError> {
    let question = data.questions.add(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(QuestionResponse { question }))
}

pub async fn update_question(
    data: web::Data<AppState>,
    path: web::Path<QuestionId>,
    request: web::Json<QuestionDraft>,
) -> Result<HttpResponse, AppError> {
    let question = data
        .questions
        .update(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(QuestionResponse { question }))
}

pub async fn delete_question(
    data: web::Data<AppState>,
    path: web::Path<QuestionId>,
) -> Result<HttpResponse, AppError> {
    data.questions.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
