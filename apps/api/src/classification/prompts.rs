// Prompt constants for profile classification and category sub-classification.

pub const IT_NAVIGATION_TOKEN: &str = "NAVIGATE_TO_IT_SKILLS_EXTRACTION";
pub const NON_IT_NAVIGATION_TOKEN: &str = "NAVIGATE_TO_NON_IT_SKILLS_EXTRACTION";

/// Profile classification prompt. The resume excerpt is appended by `with_resume`.
pub const PROFILE_PROMPT: &str = r#"ROLE:
You are an Enterprise ATS Domain Classification Gateway.
Your sole responsibility is to determine whether a candidate profile belongs to
the IT domain or the NON-IT domain.

CONTEXT:
- You are given the first 1000 characters of the resume.
- Decide using ONLY the provided text. Do NOT infer intent or future roles.

IT INDICATORS:
1. Programming languages, frameworks, databases, cloud platforms, DevOps tools,
   AI/ML, ERP technical platforms or software systems.
2. IT job titles: Developer, Engineer, Architect, Data Scientist, Data Engineer,
   DevOps Engineer, Cloud Engineer, QA / Automation, Business Analyst (IT),
   IT Project / Program Manager, AI / ML / GenAI roles.
3. IT work descriptions: designing, developing, configuring, deploying,
   integrating, automating or maintaining software systems and platforms.

EXCLUSIONS:
- Ignore generic management, sales, HR, finance, operations, teaching or
  customer service content unless explicitly tied to IT systems.
- Excel, PowerPoint or basic reporting are NOT IT indicators on their own.

DECISION LOGIC:
- If ANY IT indicator is present, the profile is IT.
- Otherwise it is NON-IT.

OUTPUT:
Return a JSON object with this EXACT schema:
{"profile_type": "NAVIGATE_TO_IT_SKILLS_EXTRACTION" | "NAVIGATE_TO_NON_IT_SKILLS_EXTRACTION", "domain": "short industry or function label" | null}"#;

pub const IT_CATEGORIES: &[&str] = &[
    "Full Stack Development (Java)",
    "Full Stack Development (Python)",
    "Full Stack Development (.NET)",
    "Programming & Scripting",
    "Databases & Data Technologies",
    "Cloud Platforms (Azure)",
    "Cloud Platforms (AWS)",
    "DevOps & Platform Engineering",
    "Artificial Intelligence & Machine Learning",
    "Generative AI & Large Language Models",
    "Data Science",
    "Data Analysis & Business Intelligence",
    "Networking & Security",
    "Software Tools & Platforms",
    "Methodologies & Practices (Agile, DevOps, SDLC)",
    "Web & Mobile Development",
    "Microsoft Dynamics & Power Platform",
    "SAP Ecosystem",
    "Salesforce Ecosystem",
    "ERP Systems",
    "IT Business Analysis",
    "IT Project / Program Management",
];

pub const NON_IT_CATEGORIES: &[&str] = &[
    "Business & Management",
    "Finance & Accounting",
    "Banking, Financial Services & Insurance (BFSI)",
    "Sales & Marketing",
    "Human Resources (HR)",
    "Operations & Supply Chain Management",
    "Procurement & Vendor Management",
    "Manufacturing & Production",
    "Quality, Compliance & Audit",
    "Project Management (Non-IT)",
    "Strategy & Consulting",
    "Entrepreneurship & Startups",
    "Education, Training & Learning",
    "Healthcare & Life Sciences",
    "Pharmaceuticals & Clinical Research",
    "Retail & E-Commerce (Non-Tech)",
    "Logistics & Transportation",
    "Real Estate & Facilities Management",
    "Construction & Infrastructure",
    "Energy, Utilities & Sustainability",
    "Agriculture & Agri-Business",
    "Hospitality, Travel & Tourism",
    "Media, Advertising & Communications",
    "Legal, Risk & Corporate Governance",
    "Public Sector & Government Services",
    "NGOs, Social Impact & CSR",
    "Customer Service & Customer Experience",
    "Administration & Office Management",
    "Product Management (Business / Functional)",
    "Data, Analytics & Decision Sciences (Non-Technical)",
];

/// Category prompt template. Replace `{domain_label}` and `{category_list}` before sending.
pub const CATEGORY_PROMPT_TEMPLATE: &str = r#"ROLE:
You are an Enterprise ATS {domain_label} Categorization Engine.

OBJECTIVE:
Determine the SINGLE most appropriate category for the candidate's primary
specialization. The profile has ALREADY been classified as {domain_label}.

RULES:
- Use ONLY information explicitly present in the resume text.
- Prioritize frequency of mention, depth of responsibility and centrality to the role.
- Do NOT merge, rename or invent categories.

ALLOWED CATEGORIES:
{category_list}

OUTPUT:
- Output exactly ONE line.
- Output ONLY the category name, exactly as listed."#;
