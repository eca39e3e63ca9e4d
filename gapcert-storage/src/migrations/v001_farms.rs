//! V001: Rubber farms, planting details, and the master checklist
//! templates the scheduler copies from.

pub const MIGRATION_SQL: &str = r#"
-- Rubber farms. `version` is the optimistic lock counter: every
-- successful update bumps it by exactly 1.
CREATE TABLE IF NOT EXISTS rubber_farms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_user_id INTEGER NOT NULL,
    village_name TEXT NOT NULL,
    moo TEXT,
    road TEXT,
    alley TEXT,
    subdistrict TEXT NOT NULL,
    district TEXT NOT NULL,
    province TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_rubber_farms_owner
    ON rubber_farms(owner_user_id);
CREATE INDEX IF NOT EXISTS idx_rubber_farms_province
    ON rubber_farms(province);

-- Planting details version independently of their farm.
CREATE TABLE IF NOT EXISTS planting_details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rubber_farm_id INTEGER NOT NULL REFERENCES rubber_farms(id),
    specie TEXT NOT NULL,
    area_of_plot REAL NOT NULL,
    number_of_rubber INTEGER NOT NULL,
    number_of_tapping INTEGER NOT NULL,
    age_of_rubber INTEGER NOT NULL,
    year_of_tapping INTEGER,
    month_of_tapping INTEGER,
    total_production REAL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_planting_details_farm
    ON planting_details(rubber_farm_id);

-- Master checklist reference data.
CREATE TABLE IF NOT EXISTS inspection_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
) STRICT;

CREATE TABLE IF NOT EXISTS inspection_item_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    inspection_type_id INTEGER NOT NULL REFERENCES inspection_types(id),
    item_no INTEGER NOT NULL,
    name TEXT NOT NULL,
    UNIQUE(inspection_type_id, item_no)
) STRICT;

CREATE TABLE IF NOT EXISTS requirement_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_template_id INTEGER NOT NULL REFERENCES inspection_item_templates(id),
    requirement_no INTEGER NOT NULL,
    name TEXT NOT NULL,
    level TEXT NOT NULL CHECK (level IN ('primary', 'secondary')),
    UNIQUE(item_template_id, requirement_no)
) STRICT;
"#;
