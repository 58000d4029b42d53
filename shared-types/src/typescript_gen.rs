pub fn generate_typescript_definitions(
    type_names: &[&str],
) -> Result<String, Box<dyn std::error::Error>> {
    if type_names.is_empty() {
        return Err("No type names provided".into());
    }

    let mut definitions = Vec::new();

    for name in type_names {
        let type_def = export_type(name)?;
        let cleaned = clean_type(type_def);

        if !cleaned.trim().is_empty() {
            definitions.push(cleaned);
        }
    }

    Ok(definitions.join("\n\n"))
}

/// Every type the web client consumes, in dependency order.
pub const ALL_TYPES: &[&str] = &[
    "QuestionKind",
    "DisplayCondition",
    "Question",
    "QuestionDraft",
    "ResponseRecord",
    "QuestionListResponse",
    "QuestionResponse",
    "ResponseListResponse",
    "ColorScheme",
    "LogoSettings",
    "MessagingSettings",
    "FormResponse",
    "EvaluateRequest",
    "ApprovalBand",
    "EvaluationResponse",
    "SubmitRequest",
    "SinkOutcome",
    "SubmitResponse",
    "AdminStatusResponse",
    "SetPasswordRequest",
    "AdminLoginRequest",
    "AdminLoginResponse",
    "AdminStatsResponse",
    "ServerStatus",
    "ErrorResponse",
];

fn export_type(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    use crate::*;
    use ts_rs::TS;

    let result = match name {
        "QuestionKind" => QuestionKind::export_to_string()?,
        "DisplayCondition" => DisplayCondition::export_to_string()?,
        "Question" => Question::export_to_string()?,
        "QuestionDraft" => QuestionDraft::export_to_string()?,
        "ResponseRecord" => ResponseRecord::export_to_string()?,
        "QuestionListResponse" => QuestionListResponse::export_to_string()?,
        "QuestionResponse" => QuestionResponse::export_to_string()?,
        "ResponseListResponse" => ResponseListResponse::export_to_string()?,

        "ColorScheme" => ColorScheme::export_to_string()?,
        "LogoSettings" => LogoSettings::export_to_string()?,
        "MessagingSettings" => MessagingSettings::export_to_string()?,

        "FormResponse" => FormResponse::export_to_string()?,
        "EvaluateRequest" => EvaluateRequest::export_to_string()?,
        "ApprovalBand" => ApprovalBand::export_to_string()?,
        "EvaluationResponse" => EvaluationResponse::export_to_string()?,
        "SubmitRequest" => SubmitRequest::export_to_string()?,
        "SinkOutcome" => SinkOutcome::export_to_string()?,
        "SubmitResponse" => SubmitResponse::export_to_string()?,

        "AdminStatusResponse" => AdminStatusResponse::export_to_string()?,
        "SetPasswordRequest" => SetPasswordRequest::export_to_string()?,
        "AdminLoginRequest" => AdminLoginRequest::export_to_string()?,
        "AdminLoginResponse" => AdminLoginResponse::export_to_string()?,
        "AdminStatsResponse" => AdminStatsResponse::export_to_string()?,

        "ServerStatus" => ServerStatus::export_to_string()?,
        "ErrorResponse" => ErrorResponse::export_to_string()?,

        _ => {
            return Err(format!(
                "Unknown type: '{}'. Available types can be found in shared-types/src/",
                name
            )
            .into());
        }
    };

    Ok(result)
}

pub fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let lines: Vec<&str> = type_def.lines().collect();

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
        })
        .cloned()
        .collect();

    filtered.join("\n").trim().to_string()
}
