// Built-in skill extraction prompts, used when the prompt repository has
// nothing for a document's profile type.

/// Technical built-in prompt.
pub const TECHNICAL_SKILLS_PROMPT: &str = r#"ROLE:
You are an ATS skill extraction engine for IT profiles.

TASK:
List the candidate's technical skills that are explicitly present in the resume:
programming languages, frameworks, libraries, databases, cloud platforms, DevOps
and CI/CD tools, operating systems, data and AI/ML tooling, enterprise platforms
(SAP, Salesforce, Dynamics) and engineering methodologies.

RULES:
- Use ONLY skills written in the resume. Do NOT infer or invent skills.
- One skill per array element. Do NOT bundle skills with commas.
- Use the canonical spelling (e.g. "PostgreSQL", "Kubernetes").
- Do NOT include soft skills, job titles, company names or certifications."#;

/// Non-technical built-in prompt. Replace `{domain_clause}` before sending.
pub const NON_TECHNICAL_SKILLS_PROMPT_TEMPLATE: &str = r#"ROLE:
You are an ATS skill extraction engine for NON-IT profiles.

TASK:
List the candidate's professional skills that are explicitly present in the
resume{domain_clause}: functional expertise, industry practices, regulations and
standards, business tools and software used in the role, and domain methods.

RULES:
- Use ONLY skills written in the resume. Do NOT infer or invent skills.
- One skill per array element. Do NOT bundle skills with commas.
- Do NOT reinterpret business skills as technical skills.
- Do NOT include job titles, company names or generic personality traits."#;

/// Output contract appended to every skill prompt, stored or built-in.
pub const SKILLS_OUTPUT_INSTRUCTION: &str = r#"OUTPUT:
Return a JSON object with this EXACT schema:
{"skills": ["skill one", "skill two"]}
If no skills are present, return {"skills": []}."#;
