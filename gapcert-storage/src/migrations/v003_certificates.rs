//! V003: Certificates. One per passed inspection; soft-revoked, never
//! deleted.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS certificates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    inspection_id INTEGER NOT NULL UNIQUE REFERENCES inspections(id),
    certificate_no TEXT NOT NULL UNIQUE,
    effective_date TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    cancel_request INTEGER NOT NULL DEFAULT 0,
    cancel_request_detail TEXT,
    files_json TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_certificates_active
    ON certificates(active);
CREATE INDEX IF NOT EXISTS idx_certificates_cancel_requests
    ON certificates(id) WHERE cancel_request = 1 AND active = 1;
"#;
