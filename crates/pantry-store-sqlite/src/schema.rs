//! SQL schema for the Pantry SQLite store.
//!
//! Run on every open. `PRAGMA user_version` records the layout so a later
//! migration can tell which tables it is looking at.

/// Full schema DDL. Every statement is safe to repeat.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS ingredients (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE,
    type          TEXT NOT NULL,   -- category tag: 'wax' | 'base' | 'scent' | ...
    unit          TEXT NOT NULL,
    stock         REAL NOT NULL DEFAULT 0,
    min_threshold REAL,            -- optional reorder threshold
    notes         TEXT,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at    TEXT NOT NULL
);

-- The audit trail is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS inventory_adjustments (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient_id   INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
    change          REAL NOT NULL,
    stock_after     REAL NOT NULL,
    reason          TEXT,
    reference       TEXT,
    created_by      TEXT,
    idempotency_key TEXT UNIQUE,
    created_at      TEXT NOT NULL
);

-- product_id points into the external product catalogue; it is not a
-- foreign key.
CREATE TABLE IF NOT EXISTS recipe_items (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id    INTEGER NOT NULL,
    ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE RESTRICT,
    unit          TEXT NOT NULL,
    amount        REAL NOT NULL,   -- per produced unit, in `unit`
    notes         TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS adjustments_ingredient_idx ON inventory_adjustments(ingredient_id);
CREATE INDEX IF NOT EXISTS recipe_items_product_idx   ON recipe_items(product_id);

PRAGMA user_version = 1;
";
