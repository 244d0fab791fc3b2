// Prompt constants for experience extraction.
// Reuses the isolation preamble from llm_client::prompts.

/// Experience prompt template. Replace `{current_date}` before sending.
pub const EXPERIENCE_PROMPT_TEMPLATE: &str = r#"ROLE:
You are an ATS resume-parsing expert.

TASK:
Determine the candidate's TOTAL professional experience.

STEP 1: EXPLICIT STATEMENT (HIGHEST PRIORITY)
Look in the summary, profile or anywhere in the resume for an explicit total
experience statement such as "5 years of experience", "5+ years total experience"
or "Over 17 years of professional experience". If found, return it as written,
keeping any "+" sign.

STEP 2: EMPLOYMENT DATES (ONLY IF STEP 1 FAILS)
Use ONLY paid work experience (full-time, part-time, contract, freelance,
internships that are clearly employment). Exclude education, courses,
certifications, academic projects and tool versions such as "Python 3.10".
Treat Present, Current, Now, Till Date, To Date and Ongoing as the current date.
Round the total to whole years.

CURRENT DATE: {current_date}

ANTI-HALLUCINATION RULES:
- NEVER guess dates.
- NEVER infer experience that is not stated or dated.
- If nothing can be determined, return null.

Return a JSON object with this EXACT schema:
{"experience": "5 years"}
or, when unknown:
{"experience": null}"#;
