//! Analysis Requester — gap analysis between a résumé and a job posting.

use serde::{Deserialize, Serialize};

use crate::clients::{ChatMessage, GenerationError, GenerationProvider};
use crate::errors::AppError;
use crate::pipeline::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};

/// Structured gap analysis. Both lists must be present in the model's
/// response; a response missing either field is rejected as malformed rather
/// than repaired. Items carry no display numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub missing_requirements: Vec<String>,
    pub improvements: Vec<String>,
}

/// The envelope shape requested from the model: `{ "analysis": { ... } }`.
#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    analysis: AnalysisResult,
}

/// Requests a gap analysis in synchronous mode. The result is decoded with a
/// typed schema and hard-fails with `MalformedAnalysis` on any deviation from
/// the requested JSON shape — there is no repair pass.
pub async fn request_analysis(
    generation: &dyn GenerationProvider,
    resume: &str,
    job_description: &str,
) -> Result<AnalysisResult, AppError> {
    let prompt = ANALYSIS_PROMPT_TEMPLATE
        .replace("{resume}", resume)
        .replace("{job_description}", job_description);
    let messages = [ChatMessage::system(ANALYSIS_SYSTEM), ChatMessage::user(prompt)];

    let text = generation.complete(&messages).await.map_err(|e| match e {
        GenerationError::MissingApiKey => AppError::ConfigurationMissing("GENERATION_API_KEY"),
        other => AppError::GenerationFailed(other.to_string()),
    })?;

    parse_analysis(&text)
}

/// Decodes the model's text into an `AnalysisResult`. Markdown code fences
/// around the JSON are tolerated; anything else off-shape is malformed.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AppError> {
    let text = strip_json_fences(text);
    serde_json::from_str::<AnalysisEnvelope>(text)
        .map(|envelope| envelope.analysis)
        .map_err(|e| AppError::MalformedAnalysis(e.to_string()))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "analysis": {
            "missingRequirements": ["Kubernetes experience (3+ years required)"],
            "improvements": ["Quantify the impact of backend projects"]
        }
    }"#;

    #[test]
    fn test_parse_analysis_accepts_requested_shape() {
        let analysis = parse_analysis(VALID).unwrap();
        assert_eq!(analysis.missing_requirements.len(), 1);
        assert!(analysis.missing_requirements[0].contains("Kubernetes"));
        assert_eq!(analysis.improvements.len(), 1);
    }

    #[test]
    fn test_parse_analysis_accepts_empty_lists() {
        let analysis =
            parse_analysis(r#"{"analysis": {"missingRequirements": [], "improvements": []}}"#)
                .unwrap();
        assert!(analysis.missing_requirements.is_empty());
        assert!(analysis.improvements.is_empty());
    }

    #[test]
    fn test_parse_analysis_tolerates_code_fences() {
        let fenced = format!("```json\n{VALID}\n```");
        let analysis = parse_analysis(&fenced).unwrap();
        assert!(analysis.missing_requirements[0].contains("Kubernetes"));
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_analysis("Here are my thoughts on your resume...").unwrap_err();
        assert!(matches!(err, AppError::MalformedAnalysis(_)));
    }

    #[test]
    fn test_missing_envelope_is_malformed() {
        // The inner object without the `analysis` wrapper is off-shape.
        let err = parse_analysis(r#"{"missingRequirements": [], "improvements": []}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedAnalysis(_)));
    }

    #[test]
    fn test_missing_field_is_malformed_not_defaulted() {
        let err = parse_analysis(r#"{"analysis": {"improvements": ["x"]}}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedAnalysis(_)));
    }

    #[test]
    fn test_null_list_is_malformed_not_defaulted() {
        let err = parse_analysis(
            r#"{"analysis": {"missingRequirements": null, "improvements": []}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedAnalysis(_)));
    }

    #[test]
    fn test_analysis_result_round_trips_camel_case() {
        let analysis = AnalysisResult {
            missing_requirements: vec!["Kubernetes".into()],
            improvements: vec!["Add metrics".into()],
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value.get("missingRequirements").is_some());
        assert!(value.get("improvements").is_some());
    }
}
