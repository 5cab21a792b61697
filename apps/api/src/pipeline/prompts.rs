// All LLM prompt constants for the analysis pipeline.

/// System prompt for résumé analysis — pins the JSON envelope shape.
pub const ANALYSIS_SYSTEM: &str = r#"You are an expert resume analyzer. You must return your analysis in the following JSON structure:
{
  "analysis": {
    "missingRequirements": [
      "requirement 1",
      "requirement 2"
    ],
    "improvements": [
      "improvement 1",
      "improvement 2"
    ]
  }
}
Each array item should be a complete, self-contained suggestion.
Do not include numbering in the items - they will be numbered on display."#;

/// Analysis prompt template. Replace `{resume}` and `{job_description}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this resume against the job posting. Provide:
1. Missing requirements: Skills and experiences required by the job that are not evident in the resume
2. Improvements: Specific, actionable suggestions to enhance the resume

Return the analysis in the specified JSON format.

Resume:
{resume}

Job Posting:
{job_description}"#;

/// System prompt for cover letter writing.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert cover letter writer. \
    Create professional, concise cover letters that highlight relevant experience and skills.";

/// Cover letter prompt template. Replace `{gaps_section}`, `{resume}`, and
/// `{job_description}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter based on this resume and job posting. The cover letter should:
- Be no more than one page
- Include JUST the name and email of the applicant at the top
- Never include a link to the job posting, just the company name
- Highlight the most relevant skills and experiences
- Address any potential gaps identified in the resume analysis
{gaps_section}
Resume:
{resume}

Job Posting:
{job_description}"#;

/// System prompt for the streaming endpoint's combined analysis.
pub const STREAM_SYSTEM: &str = "You are an expert career counselor and resume writer. \
    Provide analysis in valid JSON format only.";

/// Streaming prompt template. Replace `{resume}` and `{job_description}` before sending.
pub const STREAM_PROMPT_TEMPLATE: &str = r#"You are an expert AI career counselor and resume writer. Analyze the following resume and job description.

Resume:
{resume}

Job Description:
{job_description}

Provide a comprehensive analysis in the following JSON format:
{
  "position": "extracted job title",
  "companyName": "extracted company name",
  "improvements": [
    "detailed, specific improvements for the resume based on job requirements"
  ],
  "skillsGap": [
    "specific skills mentioned in the job posting but missing from the resume"
  ],
  "coverLetter": "professional cover letter that highlights relevant experience from the resume and addresses job requirements"
}"#;
