//! Default values for configuration

pub fn default_qdrant_url() -> String {
    "http://127.0.0.1:6334".to_string()
}

pub fn default_qdrant_api_key_env() -> String {
    "JUSTASK_QDRANT_API_KEY".to_string()
}

/// One collection per relational table, plus derived insight snippets
pub fn default_collections() -> Vec<String> {
    [
        "assignments",
        "products",
        "roles",
        "skills_matrix",
        "teammembers",
        "team_insights",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_embedding_url() -> String {
    "http://127.0.0.1:8090".to_string()
}

pub fn default_embedding_model() -> String {
    "text-embedding-005".to_string()
}

pub fn default_embedding_dimension() -> usize {
    768
}

pub fn default_completion_url() -> String {
    "http://127.0.0.1:8091".to_string()
}

pub fn default_completion_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Temperature 0 keeps SQL generation and synthesis deterministic
pub fn default_temperature() -> f32 {
    0.0
}

pub fn default_per_collection_limit() -> usize {
    50
}

/// Global top-K forwarded to the completion model
pub fn default_context_budget() -> usize {
    20
}

pub fn default_fallback_enabled() -> bool {
    true
}

pub fn default_database_url_env() -> String {
    "JUSTASK_DATABASE_URL".to_string()
}

pub fn default_sql_dialect() -> String {
    "PostgreSQL".to_string()
}

pub fn default_schema_file() -> String {
    "text_to_sql_schema_definition.json".to_string()
}
