use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;
use leadform_core::export::{to_csv, to_json_pretty, today_file_name};
use leadform_core::{ResponseFilter, ResponseSource};
use serde::Deserialize;
use shared_types::{ResponseListResponse, ResponseRecord};

/// Query string shared by the list and export endpoints. Empty values are
/// treated as absent, since the admin table submits every filter field.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseQuery {
    pub source: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ResponseQuery {
    fn source(&self) -> Result<ResponseSource, AppError> {
        match self.source.as_deref().map(str::trim).unwrap_or_default() {
            "" | "local" => Ok(ResponseSource::Local),
            "remote" => Ok(ResponseSource::Remote),
            other => Err(AppError::InvalidRequest(format!(
                "'source' must be 'local' or 'remote', got '{}'",
                other
            ))),
        }
    }

    fn filter(&self) -> Result<ResponseFilter, AppError> {
        Ok(ResponseFilter {
            name: self.name.clone(),
            phone: self.phone.clone(),
            from: parse_date("from", self.from.as_deref())?,
            to: parse_date("to", self.to.as_deref())?,
        })
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::InvalidRequest(format!(
                    "'{}' must be a date in YYYY-MM-DD format, got '{}'",
                    field, value
                ))
            }),
        None => Ok(None),
    }
}

async fn filtered_responses(
    data: &AppState,
    query: &ResponseQuery,
) -> Result<Vec<ResponseRecord>, AppError> {
    let filter = query.filter()?;
    let records = data.recorder.responses(query.source()?).await?;
    Ok(filter.apply(records))
}

fn attachment(file_name: String) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(file_name)],
    }
}

pub async fn list_responses(
    data: web::Data<AppState>,
    query: web::Query<ResponseQuery>,
) -> Result<HttpResponse, AppError> {
    let responses = filtered_responses(&data, &query).await?;
    Ok(HttpResponse::Ok().json(ResponseListResponse { responses }))
}

pub async fn export_csv(
    data: web::Data<AppState>,
    query: web::Query<ResponseQuery>,
) -> Result<HttpResponse, AppError> {
    let responses = filtered_responses(&data, &query).await?;
    let questions = data.questions.list().await?;
    let body = to_csv(&responses, &questions)?;

    tracing::info!(rows = responses.len(), "Exported responses as CSV");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(attachment(today_file_name("csv")))
        .body(body))
}

pub async fn export_json(
    data: web::Data<AppState>,
    query: web::Query<ResponseQuery>,
) -> Result<HttpResponse, AppError> {
    let responses = filtered_responses(&data, &query).await?;
    let body = to_json_pretty(&responses)?;

    tracing::info!(rows = responses.len(), "Exported responses as JSON");

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(attachment(today_file_name("json")))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_dates_are_ignored() {
        let query = ResponseQuery {
            from: Some(String::new()),
            to: Some("  ".to_string()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert!(filter.from.is_none());
        assert!(filter.to.is_none());
    }

    #[test]
    fn test_source_defaults_to_local() {
        let blank = ResponseQuery {
            source: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.source().unwrap(), ResponseSource::Local);
        assert_eq!(ResponseQuery::default().source().unwrap(), ResponseSource::Local);

        let remote = ResponseQuery {
            source: Some("remote".to_string()),
            ..Default::default()
        };
        assert_eq!(remote.source().unwrap(), ResponseSource::Remote);

        let unknown = ResponseQuery {
            source: Some("cloud".to_string()),
            ..Default::default()
        };
        assert!(matches!(unknown.source(), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let query = ResponseQuery {
            from: Some("03/02/2025".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.filter(), Err(AppError::InvalidRequest(_))));
    }
}
