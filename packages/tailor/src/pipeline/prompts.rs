//! LLM prompts for the tailoring pipelines.
//!
//! Templates use `{placeholder}` markers filled by the `format_*` helpers.

use crate::types::CareerSignals;

/// System prompt for structured extraction.
pub const EXTRACT_SYSTEM: &str =
    "You are an expert at extracting structured data from CVs. Always return valid JSON.";

/// Prompt for turning CV text into the candidate schema.
pub const EXTRACT_PROMPT: &str = r#"Extract structured data from the following CV text and format it as JSON.
The job description is provided for context to help identify relevant information.

Job Description:
{job}

CV Text:
{cv}

Return the following information in JSON format:
{
    "personal": {
        "name": "Full name",
        "email": "email@example.com",
        "phone": "phone number",
        "location": "city, country",
        "website": "website URL or empty string",
        "linkedin": "LinkedIn URL or empty string",
        "github": "GitHub URL or empty string"
    },
    "professionalSummary": "Brief professional summary",
    "experience": [
        {
            "role": "Job title",
            "company": "Company name",
            "startDate": "Start date (e.g., 'Jan 2023', '2023')",
            "endDate": "End date (e.g., 'Dec 2023', 'Present')",
            "location": "Job location",
            "description": "Job description",
            "achievements": ["achievement 1", "achievement 2"]
        }
    ],
    "education": [
        {
            "degree": "Degree name",
            "institution": "Institution name",
            "field": "Field of study",
            "startDate": "Start date (e.g., 'Sep 2020', '2020')",
            "endDate": "End date (e.g., 'May 2023', '2023', 'Present')",
            "gpa": "GPA if mentioned or empty string"
        }
    ],
    "projects": [
        {
            "name": "Project name",
            "description": "Project description",
            "techStack": ["technology1", "technology2"],
            "link": "Project URL or empty string",
            "startDate": "Start date or empty string",
            "endDate": "End date or empty string"
        }
    ],
    "skills": {
        "technical": ["skill1", "skill2"],
        "soft": ["skill1", "skill2"],
        "languages": ["language1", "language2"]
    },
    "licensesAndCertifications": [
        {
            "name": "Certification name",
            "issuer": "Issuing organization",
            "date": "Issue date (e.g., 'Jan 2023', '2023')",
            "expiry": "Expiry date or empty string"
        }
    ]
}

Date formatting:
- Use "Present" for ongoing positions or education
- If only the year is known, use just the year (e.g., "2023")
- If month and year are known, use the "Jan 2023" format

Return only the JSON object, no additional text."#;

/// User prompt for one committee persona.
pub const PERSONA_PROMPT: &str = r#"You are {persona}. Evaluate this CV for the given job description.

Job Description:
{job}

CV Content:
{cv}

Provide:
1. Overall score (1-10)
2. Strengths
3. Areas for improvement
4. Recommendation (Hire/Maybe/No)

Return your response in JSON format with the following structure:
{
    "score": <number between 1-10>,
    "strengths": "<strengths>",
    "improvements": "<areas for improvement>",
    "recommendation": "<Hire/Maybe/No>",
    "reasoning": "<brief explanation of your evaluation>"
}"#;

/// System prompt for the fused evaluation.
pub const COMPLETE_EVALUATION_SYSTEM: &str = "You are a hiring committee of a technical recruiter, an HR manager and a hiring manager. Give one consolidated, evidence-based CV evaluation. Always return valid JSON.";

/// Prompt folding structured data and retrieved CV passages into one evaluation.
pub const COMPLETE_EVALUATION_PROMPT: &str = r#"Evaluate the candidate below against the job description.

Job Description:
{job}

Structured CV Data:
{candidate}

Most relevant CV passages for this job:
{context}

Weigh technical fit, relevant experience, presentation and potential.
Ground strengths and weaknesses in the CV passages where possible.

Return JSON:
{
    "overall_score": <number between 1-10>,
    "strengths": ["strength 1", "strength 2"],
    "weaknesses": ["weakness 1", "weakness 2"],
    "recommendations": ["concrete change to the CV", "..."],
    "summary": "<two or three sentence verdict>"
}"#;

/// System prompt for the template recommendation.
pub const TEMPLATE_SYSTEM: &str = "You are an expert CV consultant with deep knowledge of different CV formats and their optimal use cases. Provide detailed, professional recommendations.";

/// Prompt for choosing a CV layout.
pub const TEMPLATE_PROMPT: &str = r#"Based on the job description and CV analysis, recommend the best CV template format.

Job Description:
{job}

CV Analysis:
- Experience entries: {experience_count}
- Linear career progression: {linear_progression}
- Employment gaps detected: {employment_gaps}
- Career change detected: {career_change}
- Skills strength: {skills_strength} total skills
- Projects count: {projects_count}

Available CV formats:
1. REVERSE-CHRONOLOGICAL: Work history in reverse chronological order. Best for a solid, linear work history with clear progression.
2. FUNCTIONAL: Skills-based, emphasizing abilities over work history. Best for career changers, employment gaps or non-linear paths.
3. COMBINATION: Skills emphasis plus chronological work history. Best for experienced professionals showcasing specific skills.

Consider:
- Job requirements and industry standards
- The candidate's career history and progression
- Employment gaps or career changes
- Strength of skills versus work experience

Return JSON:
{
    "recommended_template": "reverse-chronological|functional|combination",
    "confidence_score": <number between 0-100>,
    "reasoning": "<why this format is best>",
    "format_explanation": "<what this format emphasizes>",
    "alternatives": [
        {
            "template": "reverse-chronological|functional|combination",
            "reason": "<why this could also work>"
        }
    ]
}"#;

/// User prompt for rewriting one CV section.
pub const REPHRASE_PROMPT: &str = r#"{instruction}

Job Description:
{job}

Current {section} Content:
{content}

Instructions:
1. Rephrase the content to better match the job requirements
2. Use action verbs and quantifiable achievements where possible
3. Highlight relevant skills and technologies mentioned in the job description
4. Keep a professional tone and stay truthful
5. Keep the same length or slightly shorter
6. Focus on impact and results rather than responsibilities
7. Use keywords from the job description naturally

Return only the rephrased content, no additional text or explanations."#;

/// System prompt for writing a CV from scratch.
pub const GENERATE_SYSTEM: &str =
    "You are a professional CV writer. Generate tailored CVs based on job descriptions.";

pub const GENERATE_PROMPT: &str = r#"Based on the following job description and user experience, generate a tailored CV.

Job Description:
{job}

User Experience:
{experience}

Generate a professional CV that highlights relevant skills and experience."#;

/// System prompt for improving an existing CV.
pub const IMPROVE_SYSTEM: &str = "You are a professional CV writer. Improve and tailor existing CVs based on job descriptions.";

pub const IMPROVE_PROMPT: &str = r#"Based on the following existing CV content and job description, generate an improved, tailored CV.

Existing CV Content:
{cv}

Job Description:
{job}

Improve and tailor the CV to better match the job requirements."#;

/// System prompt for a committee persona.
pub fn persona_system_prompt(persona: &str) -> String {
    format!(
        "You are {}. Provide detailed, professional CV evaluations.",
        persona
    )
}

// Untrusted text is substituted last so a `{job}` inside a CV is never expanded.

pub fn format_extract_prompt(cv: &str, job: &str) -> String {
    EXTRACT_PROMPT.replace("{job}", job).replace("{cv}", cv)
}

pub fn format_persona_prompt(persona: &str, job: &str, cv: &str) -> String {
    PERSONA_PROMPT
        .replace("{persona}", persona)
        .replace("{job}", job)
        .replace("{cv}", cv)
}

pub fn format_complete_evaluation_prompt(job: &str, candidate: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        "(no passages retrieved)"
    } else {
        context
    };
    COMPLETE_EVALUATION_PROMPT
        .replace("{job}", job)
        .replace("{candidate}", candidate)
        .replace("{context}", context)
}

pub fn format_template_prompt(job: &str, signals: &CareerSignals) -> String {
    TEMPLATE_PROMPT
        .replace("{experience_count}", &signals.experience_count.to_string())
        .replace("{linear_progression}", &signals.linear_progression.to_string())
        .replace("{employment_gaps}", &signals.employment_gaps.to_string())
        .replace("{career_change}", &signals.career_change.to_string())
        .replace("{skills_strength}", &signals.skills_strength.to_string())
        .replace("{projects_count}", &signals.projects_count.to_string())
        .replace("{job}", job)
}

pub fn format_rephrase_prompt(instruction: &str, section: &str, job: &str, content: &str) -> String {
    REPHRASE_PROMPT
        .replace("{instruction}", instruction)
        .replace("{section}", section)
        .replace("{job}", job)
        .replace("{content}", content)
}

pub fn format_generate_prompt(job: &str, experience: &str) -> String {
    GENERATE_PROMPT
        .replace("{job}", job)
        .replace("{experience}", experience)
}

pub fn format_improve_prompt(cv: &str, job: &str) -> String {
    IMPROVE_PROMPT.replace("{job}", job).replace("{cv}", cv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extract_prompt() {
        let prompt = format_extract_prompt("Jane Smith, Data Scientist", "ML engineer");
        assert!(prompt.contains("Jane Smith, Data Scientist"));
        assert!(prompt.contains("ML engineer"));
        assert!(prompt.contains("\"licensesAndCertifications\""));
        assert!(!prompt.contains("{cv}"));
    }

    #[test]
    fn test_placeholder_in_cv_is_not_expanded() {
        let prompt = format_extract_prompt("my cv mentions {job}", "Rust developer");
        assert!(prompt.contains("my cv mentions {job}"));
    }

    #[test]
    fn test_format_template_prompt_includes_signals() {
        let signals = CareerSignals {
            experience_count: 4,
            linear_progression: true,
            employment_gaps: false,
            career_change: true,
            skills_strength: 12,
            projects_count: 2,
        };
        let prompt = format_template_prompt("Data role", &signals);
        assert!(prompt.contains("Experience entries: 4"));
        assert!(prompt.contains("Career change detected: true"));
        assert!(prompt.contains("Skills strength: 12 total skills"));
    }

    #[test]
    fn test_complete_evaluation_prompt_marks_empty_context() {
        let prompt = format_complete_evaluation_prompt("job", "{}", "  ");
        assert!(prompt.contains("(no passages retrieved)"));
    }
}
