use sqlx::FromRow;

/// Text column of a `resume_metadata` row.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeTextRow {
    pub resume_text: Option<String>,
}

/// One row of the `prompts` table, keyed by `(mastercategory, category)`.
#[derive(Debug, Clone, FromRow)]
pub struct StoredPromptRow {
    pub prompt: Option<String>,
}
