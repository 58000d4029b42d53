use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{web, HttpResponse, Result};
use leadform_core::evaluate;
use shared_types::{
    EvaluateRequest, EvaluationResponse, FormResponse, SubmitRequest, SubmitResponse,
};

pub async fn get_form(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let response = FormResponse {
        questions: data.questions.list().await?,
        logo: data.settings.logo().await?,
        colors: data.settings.colors().await?,
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Re-scores the questionnaire for the current answers. Called by the client
/// on every change.
pub async fn evaluate_answers(
    data: web::Data<AppState>,
    request: web::Json<EvaluateRequest>,
) -> Result<HttpResponse, AppError> {
    let questions = data.questions.list().await?;
    let evaluation = evaluate(&questions, &request.answers);
    Ok(HttpResponse::Ok().json(EvaluationResponse::from(evaluation)))
}

pub async fn submit_response(
    data: web::Data<AppState>,
    request: web::Json<SubmitRequest>,
) -> Result<HttpResponse, AppError> {
    let submission = data.recorder.submit(request.into_inner()).await.map_err(|e| {
        tracing::info!(category = e.category(), "Rejected submission: {}", e);
        e
    })?;

    Ok(HttpResponse::Created().json(SubmitResponse::from(submission)))
}
