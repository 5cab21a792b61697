//! Cover Letter Requester — free-form prose from résumé + job description.

use crate::clients::{ChatMessage, GenerationError, GenerationProvider};
use crate::errors::AppError;
use crate::pipeline::analysis::AnalysisResult;
use crate::pipeline::prompts::{COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM};

/// Requests a cover letter. When an analysis is available its missing
/// requirements are embedded so the letter can address them directly.
/// Single attempt, no retry.
pub async fn request_cover_letter(
    generation: &dyn GenerationProvider,
    resume: &str,
    job_description: &str,
    analysis: Option<&AnalysisResult>,
) -> Result<String, AppError> {
    let prompt = build_prompt(resume, job_description, analysis);
    let messages = [
        ChatMessage::system(COVER_LETTER_SYSTEM),
        ChatMessage::user(prompt),
    ];

    generation.complete(&messages).await.map_err(|e| match e {
        GenerationError::MissingApiKey => AppError::ConfigurationMissing("GENERATION_API_KEY"),
        other => AppError::CoverLetterGenerationFailed(other.to_string()),
    })
}

fn build_prompt(resume: &str, job_description: &str, analysis: Option<&AnalysisResult>) -> String {
    let gaps_section = match analysis {
        Some(analysis) if !analysis.missing_requirements.is_empty() => {
            let gaps = analysis
                .missing_requirements
                .iter()
                .map(|gap| format!("- {gap}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\nGaps identified in the resume analysis:\n{gaps}\n")
        }
        _ => String::new(),
    };

    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{gaps_section}", &gaps_section)
        .replace("{resume}", resume)
        .replace("{job_description}", job_description)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\njane.doe@example.com\nExperienced backend engineer, 5 years Python";
    const JOB: &str = "Requires: Python, Kubernetes, 3+ years";

    #[test]
    fn test_prompt_embeds_resume_and_job_description() {
        let prompt = build_prompt(RESUME, JOB, None);
        assert!(prompt.contains(RESUME));
        assert!(prompt.contains(JOB));
        assert!(!prompt.contains("{resume}"));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{gaps_section}"));
    }

    #[test]
    fn test_prompt_lists_identified_gaps() {
        let analysis = AnalysisResult {
            missing_requirements: vec!["Kubernetes experience".into()],
            improvements: vec![],
        };
        let prompt = build_prompt(RESUME, JOB, Some(&analysis));
        assert!(prompt.contains("Gaps identified in the resume analysis:"));
        assert!(prompt.contains("- Kubernetes experience"));
    }

    #[test]
    fn test_prompt_omits_gaps_section_when_analysis_has_none() {
        let analysis = AnalysisResult {
            missing_requirements: vec![],
            improvements: vec!["Tighten the summary".into()],
        };
        let prompt = build_prompt(RESUME, JOB, Some(&analysis));
        assert!(!prompt.contains("Gaps identified"));
    }
}
