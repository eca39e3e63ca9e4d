//! V002: Inspections and their item/requirement evaluation rows.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS inspections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rubber_farm_id INTEGER NOT NULL REFERENCES rubber_farms(id),
    inspection_type_id INTEGER NOT NULL REFERENCES inspection_types(id),
    inspection_date_time INTEGER NOT NULL,
    chief_auditor_id INTEGER NOT NULL,
    status TEXT NOT NULL
        CHECK (status IN ('awaiting_schedule', 'awaiting_inspection', 'inspected')),
    result TEXT
        CHECK (result IN ('awaiting_result', 'pass', 'fail')),
    main_failed INTEGER,
    secondary_compliance INTEGER,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_inspections_farm
    ON inspections(rubber_farm_id);
CREATE INDEX IF NOT EXISTS idx_inspections_status
    ON inspections(status);

-- Co-auditors assigned at scheduling time.
CREATE TABLE IF NOT EXISTS inspection_auditors (
    inspection_id INTEGER NOT NULL REFERENCES inspections(id),
    user_id INTEGER NOT NULL,
    PRIMARY KEY (inspection_id, user_id)
) STRICT;

-- Checklist items copied from templates at scheduling time.
CREATE TABLE IF NOT EXISTS inspection_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    inspection_id INTEGER NOT NULL REFERENCES inspections(id),
    item_no INTEGER NOT NULL,
    name TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(inspection_id, item_no)
) STRICT;

-- Requirement evaluations. evaluation_result stays NULL until the
-- auditor records one; the completeness check keys off that.
CREATE TABLE IF NOT EXISTS requirements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    inspection_item_id INTEGER NOT NULL REFERENCES inspection_items(id),
    requirement_no INTEGER NOT NULL,
    name TEXT NOT NULL,
    level TEXT NOT NULL CHECK (level IN ('primary', 'secondary')),
    evaluation_result TEXT
        CHECK (evaluation_result IN ('yes', 'no', 'not_applicable')),
    evaluation_method TEXT,
    note TEXT,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(inspection_item_id, requirement_no)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_requirements_item
    ON requirements(inspection_item_id);
CREATE INDEX IF NOT EXISTS idx_requirements_unevaluated
    ON requirements(inspection_item_id) WHERE evaluation_result IS NULL;
"#;
