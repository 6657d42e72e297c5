// All prompt templates for the analysis use cases.
// Placeholders: {job_description}, {resume_text}. Filled by llm_client::prompts::fill_template.

use crate::llm_client::prompts::{fill_template, JSON_CATEGORIES_INSTRUCTION};

/// Job description analysis. Replace `{job_description}` and `{json_instruction}`.
pub const JOB_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and provide a structured analysis:

{job_description}

Please provide the following information in a structured format:
1. Key responsibilities
2. Required skills and qualifications
3. Preferred skills and qualifications
4. Industry and role type
5. Experience level
6. Key keywords for optimization

{json_instruction}
Each category should be a list of items except for Experience Level which should be a single string."#;

/// Resume-to-job matching. Replace `{job_description}`, `{resume_text}`, `{json_instruction}`.
pub const RESUME_MATCH_PROMPT_TEMPLATE: &str = r#"Compare the following resume with the job description and provide a detailed matching analysis:

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Please provide the following analysis in a structured format:
1. Overall match percentage (0-100)
2. Matching skills (list)
3. Missing skills (list)
4. Experience match analysis
5. Education match analysis
6. Specific recommendations for improvement
7. Key strengths highlighted in the resume
8. Areas that need enhancement

{json_instruction}"#;

/// Resume optimization suggestions. Replace `{job_description}`, `{resume_text}`, `{json_instruction}`.
pub const OPTIMIZATION_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and job description to provide detailed optimization suggestions:

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Please provide the following optimization suggestions in a structured format:
1. Content Improvements:
   - Suggested additions
   - Suggested removals
   - Content reorganization
2. Keyword Optimization:
   - Missing keywords to add
   - Suggested keyword placement
3. Format Improvements:
   - Layout suggestions
   - Section organization
4. Achievement Highlights:
   - Suggested metrics to add
   - Impact statements to enhance
5. Skills Presentation:
   - Skills to emphasize
   - Skills to add
   - Skills to remove or de-emphasize
6. Action Items:
   - Specific changes to implement
   - Priority order of changes

{json_instruction}"#;

/// Cover letter generation. Replace `{job_description}` and `{resume_text}`.
/// The requested top-level key `cover_letter` is checked on the reply.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Generate a professional and tailored cover letter based on the following resume and job description:

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Please generate a cover letter that:
1. Is personalized and specific to the job
2. Highlights relevant experience and skills
3. Demonstrates understanding of the role
4. Shows enthusiasm and cultural fit
5. Is concise and well-structured
6. Uses professional language
7. Includes a strong opening and closing

Format the response as a JSON object with the following structure:
{
    "cover_letter": {
        "full_text": "The complete cover letter",
        "sections": {
            "opening": "Opening paragraph",
            "body": "Main content paragraphs",
            "closing": "Closing paragraph"
        },
        "key_highlights": [
            "List of key points emphasized in the letter"
        ]
    }
}"#;

pub fn job_analysis_prompt(job_description: &str) -> String {
    fill_template(
        JOB_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("json_instruction", JSON_CATEGORIES_INSTRUCTION),
        ],
    )
}

pub fn resume_match_prompt(resume_text: &str, job_description: &str) -> String {
    fill_template(
        RESUME_MATCH_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("resume_text", resume_text),
            ("json_instruction", JSON_CATEGORIES_INSTRUCTION),
        ],
    )
}

pub fn optimization_prompt(resume_text: &str, job_description: &str) -> String {
    fill_template(
        OPTIMIZATION_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("resume_text", resume_text),
            ("json_instruction", JSON_CATEGORIES_INSTRUCTION),
        ],
    )
}

pub fn cover_letter_prompt(resume_text: &str, job_description: &str) -> String {
    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("resume_text", resume_text),
        ],
    )
}
