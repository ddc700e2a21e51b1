//! Database schema definitions

/// SQL to create the file_ids table
pub const CREATE_FILE_IDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS file_ids (
    key TEXT PRIMARY KEY,
    file_id TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// Probe that fails if an existing file_ids table is missing an expected
/// column. Preparing the statement is enough; it never runs.
pub const VERIFY_COLUMNS: &str = "SELECT key, file_id, created_at FROM file_ids LIMIT 0";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_FILE_IDS_TABLE]
}
