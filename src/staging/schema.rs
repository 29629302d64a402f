//! SQLite schema for the staging store

/// SQL schema for the staging database
pub const SCHEMA_SQL: &str = r#"
-- Staged documents: schemaless JSON bodies keyed by collection kind.
-- Append-only; no dedup, no schema validation.
CREATE TABLE IF NOT EXISTS staged_documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    body TEXT NOT NULL,
    staged_at TEXT NOT NULL
);

-- Extraction runs: per-channel harvest history
CREATE TABLE IF NOT EXISTS extraction_runs (
    id TEXT PRIMARY KEY,
    channel_id TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    status TEXT NOT NULL,
    playlists_staged INTEGER DEFAULT 0,
    videos_staged INTEGER DEFAULT 0,
    comments_staged INTEGER DEFAULT 0,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_staged_collection ON staged_documents(collection);
CREATE INDEX IF NOT EXISTS idx_runs_channel ON extraction_runs(channel_id);
"#;
