use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::skills::validation::normalize_skills;

#[derive(Deserialize)]
pub struct NormalizeSkillsRequest {
    pub skills: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct NormalizeSkillsResponse {
    pub skills: Vec<String>,
}

/// POST /api/v1/skills/normalize
pub async fn handle_normalize_skills(
    Json(req): Json<NormalizeSkillsRequest>,
) -> Json<NormalizeSkillsResponse> {
    Json(NormalizeSkillsResponse {
        skills: normalize_skills(&req.skills),
    })
}
