//! Knowledge Store (component D): SQLite-backed storage of Rules and
//! SourceBooks with atomic writes and multi-criteria search (§4.4).
//!
//! The store performs no clock access itself — callers stamp `created_at`/
//! `updated_at` before handing a [`Rule`] to [`KnowledgeStore::store_rule`],
//! which keeps timestamp policy (fresh ingest vs. bundle replay) outside
//! this module and out of the database layer entirely.

mod bundle;

pub use bundle::{Bundle, BundleMetadata, ImportReport, MergeStrategy};

use crate::error::{Error, Result};
use crate::ids::rule_id;
use crate::model::{
    AspectKind, AuthorityLevel, Category, Conditions, Correction, Nakshatra, Planet, Polarity,
    Rule, Sign, SourceBook, Strength,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sources (
    title TEXT PRIMARY KEY,
    author TEXT,
    authority_level INTEGER NOT NULL,
    registered_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rules (
    id TEXT PRIMARY KEY,
    source_title TEXT NOT NULL REFERENCES sources(title),
    original_text TEXT NOT NULL,
    corrected_text TEXT,
    planet TEXT,
    house INTEGER,
    sign TEXT,
    nakshatra TEXT,
    aspect TEXT,
    lord_of INTEGER,
    ascendant TEXT,
    strength TEXT,
    effects_json TEXT NOT NULL,
    polarity TEXT NOT NULL,
    tags_json TEXT NOT NULL,
    category TEXT NOT NULL,
    page INTEGER,
    chapter TEXT,
    verse TEXT,
    authority_level INTEGER NOT NULL,
    confidence REAL NOT NULL,
    extraction_method TEXT NOT NULL,
    correction_json TEXT,
    validated INTEGER NOT NULL DEFAULT 0,
    last_corrected_digest TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_rules_source_title ON rules(source_title);
CREATE INDEX IF NOT EXISTS idx_rules_authority_level ON rules(authority_level);
CREATE INDEX IF NOT EXISTS idx_rules_confidence ON rules(confidence);
CREATE INDEX IF NOT EXISTS idx_rules_category ON rules(category);
CREATE INDEX IF NOT EXISTS idx_rules_planet ON rules(planet);
CREATE INDEX IF NOT EXISTS idx_rules_house ON rules(house);
CREATE INDEX IF NOT EXISTS idx_rules_sign ON rules(sign);
CREATE INDEX IF NOT EXISTS idx_rules_nakshatra ON rules(nakshatra);

CREATE TABLE IF NOT EXISTS extraction_stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_title TEXT NOT NULL REFERENCES sources(title),
    sentences_total INTEGER NOT NULL,
    sentences_astrological INTEGER NOT NULL,
    rules_extracted INTEGER NOT NULL,
    average_confidence REAL NOT NULL,
    method TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS correction_audit (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rule_id TEXT NOT NULL REFERENCES rules(id),
    accepted INTEGER NOT NULL,
    reason TEXT,
    fixes_applied_json TEXT,
    model_id TEXT,
    confidence REAL,
    recorded_at TEXT NOT NULL
);
"#;

const RULE_COLUMNS: &str = "id, source_title, original_text, corrected_text, planet, house, sign, \
    nakshatra, aspect, lord_of, ascendant, strength, effects_json, polarity, tags_json, category, \
    page, chapter, verse, authority_level, confidence, extraction_method, correction_json, \
    validated, last_corrected_digest, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Relevance,
    Confidence,
    Authority,
    CreatedAt,
}

impl Default for OrderBy {
    fn default() -> Self {
        OrderBy::Relevance
    }
}

/// Multi-criteria search filters, built with method chaining (`SearchFilters::new().planet(..)`).
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub planet: Option<Planet>,
    pub house: Option<u8>,
    pub sign: Option<Sign>,
    pub nakshatra: Option<Nakshatra>,
    pub ascendant: Option<Sign>,
    pub lord_of: Option<u8>,
    pub source_title: Option<String>,
    pub authority_level: Option<AuthorityLevel>,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    pub effect_contains: Option<String>,
    pub extraction_method: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: OrderBy,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planet(mut self, planet: Planet) -> Self {
        self.planet = Some(planet);
        self
    }

    pub fn house(mut self, house: u8) -> Self {
        self.house = Some(house);
        self
    }

    pub fn sign(mut self, sign: Sign) -> Self {
        self.sign = Some(sign);
        self
    }

    pub fn nakshatra(mut self, nakshatra: Nakshatra) -> Self {
        self.nakshatra = Some(nakshatra);
        self
    }

    pub fn ascendant(mut self, sign: Sign) -> Self {
        self.ascendant = Some(sign);
        self
    }

    pub fn lord_of(mut self, house: u8) -> Self {
        self.lord_of = Some(house);
        self
    }

    pub fn source_title(mut self, title: impl Into<String>) -> Self {
        self.source_title = Some(title.into());
        self
    }

    pub fn authority_level(mut self, level: AuthorityLevel) -> Self {
        self.authority_level = Some(level);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn min_confidence(mut self, value: f64) -> Self {
        self.min_confidence = Some(value);
        self
    }

    pub fn max_confidence(mut self, value: f64) -> Self {
        self.max_confidence = Some(value);
        self
    }

    pub fn effect_contains(mut self, needle: impl Into<String>) -> Self {
        self.effect_contains = Some(needle.into());
        self
    }

    pub fn extraction_method(mut self, method: impl Into<String>) -> Self {
        self.extraction_method = Some(method.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }
}

pub struct KnowledgeStore {
    conn: Arc<Mutex<Connection>>,
}

impl KnowledgeStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Upsert by title. Authority level is immutable once a source is registered.
    pub fn register_source(&self, source: SourceBook) -> Result<SourceBook> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<u8> = conn
            .query_row(
                "SELECT authority_level FROM sources WHERE title = ?1",
                params![source.title],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing_level) = existing {
            if existing_level != source.authority_level.as_u8() {
                return Err(Error::SourceConflict {
                    title: source.title.clone(),
                    existing: existing_level,
                    attempted: source.authority_level.as_u8(),
                });
            }
            return Ok(source);
        }

        conn.execute(
            "INSERT INTO sources (title, author, authority_level, registered_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                source.title,
                source.author,
                source.authority_level.as_u8(),
                source.registered_at.to_rfc3339(),
            ],
        )?;
        Ok(source)
    }

    pub fn get_source(&self, title: &str) -> Result<Option<SourceBook>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT title, author, authority_level, registered_at FROM sources WHERE title = ?1",
            params![title],
            row_to_source,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn list_sources(&self) -> Result<Vec<SourceBook>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT title, author, authority_level, registered_at FROM sources ORDER BY title")?;
        let rows = stmt.query_map([], row_to_source)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Compute `id` deterministically and insert. Returns `Duplicate` without
    /// touching existing rows when the id already exists.
    pub fn store_rule(&self, mut rule: Rule) -> Result<StoreOutcome> {
        let conn = self.conn.lock().unwrap();
        Self::store_rule_locked(&conn, &mut rule)
    }

    /// A single transaction; per-row validation failures are skipped, not
    /// propagated, so one malformed rule never aborts the whole batch.
    pub fn store_rules_batch<I: IntoIterator<Item = Rule>>(&self, rules: I) -> Result<u64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut inserted = 0u64;
        for mut rule in rules {
            if let Ok(StoreOutcome::Stored) = Self::store_rule_locked(&tx, &mut rule) {
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn store_rule_locked(conn: &Connection, rule: &mut Rule) -> Result<StoreOutcome> {
        let source_exists: Option<String> = conn
            .query_row(
                "SELECT title FROM sources WHERE title = ?1",
                params![rule.source_title],
                |row| row.get(0),
            )
            .optional()?;
        if source_exists.is_none() {
            return Err(Error::UnknownSource(rule.source_title.clone()));
        }

        validate_rule(rule)?;

        rule.id = rule_id(&rule.source_title, &rule.original_text, &rule.conditions);

        let existing: Option<String> = conn
            .query_row("SELECT id FROM rules WHERE id = ?1", params![rule.id], |row| row.get(0))
            .optional()?;
        if existing.is_some() {
            return Ok(StoreOutcome::Duplicate);
        }

        let effects_json = serde_json::to_string(&rule.effects)?;
        let tags_json = serde_json::to_string(&rule.tags)?;
        let correction_json = rule
            .correction
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            &format!("INSERT INTO rules ({RULE_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,?25,?26,?27)"),
            params![
                rule.id,
                rule.source_title,
                rule.original_text,
                rule.corrected_text,
                rule.conditions.planet.map(|p| p.canonical_name()),
                rule.conditions.house.map(|h| h as i64),
                rule.conditions.sign.map(|s| s.canonical_name()),
                rule.conditions.nakshatra.map(|n| n.canonical_name()),
                rule.conditions.aspect.map(|a| a.canonical_name()),
                rule.conditions.lord_of.map(|h| h as i64),
                rule.conditions.ascendant.map(|s| s.canonical_name()),
                rule.conditions.strength.map(|s| s.canonical_name()),
                effects_json,
                rule.polarity.as_str(),
                tags_json,
                rule.category.as_str(),
                rule.page.map(|p| p as i64),
                rule.chapter,
                rule.verse,
                rule.authority_level.as_u8(),
                rule.confidence,
                rule.extraction_method,
                correction_json,
                rule.validated as i64,
                rule.last_corrected_digest,
                rule.created_at.to_rfc3339(),
                rule.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(StoreOutcome::Stored)
    }

    pub fn get_rule(&self, id: &str) -> Result<Option<Rule>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {RULE_COLUMNS} FROM rules WHERE id = ?1"),
            params![id],
            row_to_rule,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Updates `corrected_text`, `correction`, `last_corrected_digest`, and
    /// `updated_at`. Every other field is immutable through this path.
    pub fn apply_correction(
        &self,
        rule_id: &str,
        corrected_text: &str,
        correction: &Correction,
        digest: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let correction_json = serde_json::to_string(correction)?;
        let changed = conn.execute(
            "UPDATE rules SET corrected_text = ?1, correction_json = ?2, last_corrected_digest = ?3, updated_at = ?4 WHERE id = ?5",
            params![corrected_text, correction_json, digest, updated_at.to_rfc3339(), rule_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(rule_id.to_string()));
        }
        Ok(())
    }

    pub fn record_correction_audit(
        &self,
        rule_id: &str,
        accepted: bool,
        reason: Option<&str>,
        fixes_applied: &[String],
        model_id: Option<&str>,
        confidence: Option<f64>,
        recorded_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let fixes_json = serde_json::to_string(fixes_applied)?;
        conn.execute(
            "INSERT INTO correction_audit (rule_id, accepted, reason, fixes_applied_json, model_id, confidence, recorded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![rule_id, accepted as i64, reason, fixes_json, model_id, confidence, recorded_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn record_extraction_stats(
        &self,
        source_title: &str,
        sentences_total: u64,
        sentences_astrological: u64,
        rules_extracted: u64,
        average_confidence: f64,
        method: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO extraction_stats (source_title, sentences_total, sentences_astrological, rules_extracted, average_confidence, method, recorded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![source_title, sentences_total as i64, sentences_astrological as i64, rules_extracted as i64, average_confidence, method, recorded_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Rules whose `last_corrected_digest` does not match the digest of their
    /// current `original_text`, used by the corrector to skip already-corrected rules.
    pub fn rules_needing_correction(&self, limit: u32) -> Result<Vec<Rule>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM rules ORDER BY created_at ASC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], row_to_rule)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Wipes `rules` and `sources`. Used by [`MergeStrategy::Replace`] imports.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("DELETE FROM rules; DELETE FROM sources;")?;
        Ok(())
    }

    /**
     * Dynamic multi-criteria search over stored rules.
     *
     * DESIGN DECISION: build the `WHERE` clause and parameter list as
     * parallel `Vec<String>`/`Vec<Box<dyn ToSql>>` from whichever
     * `SearchFilters` fields are set, rather than a fixed query per filter
     * combination or a query-builder crate.
     * WHY: `SearchFilters` has over a dozen independently optional fields;
     * a fixed query per combination is combinatorial, and pulling in a
     * query-builder crate for what is still a single flat `AND`-joined
     * `WHERE` clause would be a dependency for a problem this small.
     *
     * REASONING CHAIN:
     * 1. Every set filter field appends one `"column = ?"` clause and one
     *    boxed `ToSql` value, in the same order, so the `?` placeholders and
     *    the parameter vector never drift apart.
     * 2. `tags` is the one multi-value filter: it expands to an
     *    `OR`-joined group of `tags_json LIKE ?` clauses wrapped in its own
     *    parentheses, so it composes correctly with the outer `AND` chain.
     * 3. `order_by` picks a fixed `ORDER BY` expression per `OrderBy`
     *    variant; `Relevance`'s formula (`0.4` authority weight, `0.6`
     *    confidence weight) intentionally favors classical sources over
     *    raw confidence so a single high-confidence modern rule can't
     *    outrank the classical consensus on the same placement.
     *
     * RELATED: `SearchFilters` (the builder this assembles from), `export`
     * (`store/bundle.rs`, built directly on this method)
     */
    pub fn search(&self, filters: &SearchFilters) -> Result<Vec<Rule>> {
        let conn = self.conn.lock().unwrap();
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(p) = filters.planet {
            clauses.push("planet = ?".to_string());
            values.push(Box::new(p.canonical_name().to_string()));
        }
        if let Some(h) = filters.house {
            clauses.push("house = ?".to_string());
            values.push(Box::new(h as i64));
        }
        if let Some(s) = filters.sign {
            clauses.push("sign = ?".to_string());
            values.push(Box::new(s.canonical_name().to_string()));
        }
        if let Some(n) = filters.nakshatra {
            clauses.push("nakshatra = ?".to_string());
            values.push(Box::new(n.canonical_name().to_string()));
        }
        if let Some(a) = filters.ascendant {
            clauses.push("ascendant = ?".to_string());
            values.push(Box::new(a.canonical_name().to_string()));
        }
        if let Some(l) = filters.lord_of {
            clauses.push("lord_of = ?".to_string());
            values.push(Box::new(l as i64));
        }
        if let Some(title) = &filters.source_title {
            clauses.push("source_title = ?".to_string());
            values.push(Box::new(title.clone()));
        }
        if let Some(level) = filters.authority_level {
            clauses.push("authority_level = ?".to_string());
            values.push(Box::new(level.as_u8() as i64));
        }
        if let Some(category) = filters.category {
            clauses.push("category = ?".to_string());
            values.push(Box::new(category.as_str().to_string()));
        }
        if !filters.tags.is_empty() {
            let tag_clauses: Vec<String> = filters.tags.iter().map(|_| "tags_json LIKE ?".to_string()).collect();
            clauses.push(format!("({})", tag_clauses.join(" OR ")));
            for tag in &filters.tags {
                values.push(Box::new(format!("%\"{tag}\"%")));
            }
        }
        if let Some(min) = filters.min_confidence {
            clauses.push("confidence >= ?".to_string());
            values.push(Box::new(min));
        }
        if let Some(max) = filters.max_confidence {
            clauses.push("confidence <= ?".to_string());
            values.push(Box::new(max));
        }
        if let Some(needle) = &filters.effect_contains {
            clauses.push("lower(effects_json) LIKE ?".to_string());
            values.push(Box::new(format!("%{}%", needle.to_lowercase())));
        }
        if let Some(method) = &filters.extraction_method {
            clauses.push("extraction_method = ?".to_string());
            values.push(Box::new(method.clone()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let order_sql = match filters.order_by {
            OrderBy::Relevance => "ORDER BY (0.4*(4.0-authority_level)/3.0 + 0.6*confidence) DESC, created_at ASC",
            OrderBy::Confidence => "ORDER BY confidence DESC, created_at ASC",
            OrderBy::Authority => "ORDER BY authority_level ASC, created_at ASC",
            OrderBy::CreatedAt => "ORDER BY created_at ASC",
        };

        let limit_sql = match (filters.limit, filters.offset) {
            (Some(l), Some(o)) => format!("LIMIT {l} OFFSET {o}"),
            (Some(l), None) => format!("LIMIT {l}"),
            (None, Some(o)) => format!("LIMIT -1 OFFSET {o}"),
            (None, None) => String::new(),
        };

        let sql = format!("SELECT {RULE_COLUMNS} FROM rules {where_sql} {order_sql} {limit_sql}");
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), row_to_rule)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }
}

fn validate_rule(rule: &Rule) -> Result<()> {
    if !(0.0..=1.0).contains(&rule.confidence) {
        return Err(Error::ValidationError(format!(
            "confidence out of range: {}",
            rule.confidence
        )));
    }
    if !rule.conditions.has_minimum_key() {
        return Err(Error::ValidationError(
            "conditions must include at least one of planet/house/sign".to_string(),
        ));
    }
    if rule.effects.is_empty() {
        return Err(Error::ValidationError("rule has no effects".to_string()));
    }
    if let Some(h) = rule.conditions.house {
        if !(1..=12).contains(&h) {
            return Err(Error::ValidationError(format!("house out of range: {h}")));
        }
    }
    if let Some(h) = rule.conditions.lord_of {
        if !(1..=12).contains(&h) {
            return Err(Error::ValidationError(format!("lord_of out of range: {h}")));
        }
    }
    Ok(())
}

fn row_to_source(row: &Row) -> rusqlite::Result<SourceBook> {
    let authority_level: u8 = row.get(2)?;
    let registered_at: String = row.get(3)?;
    Ok(SourceBook {
        title: row.get(0)?,
        author: row.get(1)?,
        authority_level: AuthorityLevel::from_u8(authority_level).unwrap_or(AuthorityLevel::Modern),
        registered_at: parse_timestamp(&registered_at),
    })
}

fn row_to_rule(row: &Row) -> rusqlite::Result<Rule> {
    let planet: Option<String> = row.get("planet")?;
    let sign: Option<String> = row.get("sign")?;
    let nakshatra: Option<String> = row.get("nakshatra")?;
    let aspect: Option<String> = row.get("aspect")?;
    let ascendant: Option<String> = row.get("ascendant")?;
    let strength: Option<String> = row.get("strength")?;
    let house: Option<i64> = row.get("house")?;
    let lord_of: Option<i64> = row.get("lord_of")?;

    let conditions = Conditions {
        planet: planet.and_then(|s| Planet::from_canonical_name(&s)),
        house: house.map(|h| h as u8),
        sign: sign.and_then(|s| Sign::from_canonical_name(&s)),
        nakshatra: nakshatra.and_then(|s| Nakshatra::from_canonical_name(&s)),
        aspect: aspect.and_then(|s| AspectKind::from_canonical_name(&s)),
        strength: strength.and_then(|s| Strength::from_canonical_name(&s)),
        lord_of: lord_of.map(|h| h as u8),
        ascendant: ascendant.and_then(|s| Sign::from_canonical_name(&s)),
    };

    let effects_json: String = row.get("effects_json")?;
    let effects: Vec<String> = serde_json::from_str(&effects_json).unwrap_or_default();

    let tags_json: String = row.get("tags_json")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();

    let polarity_str: String = row.get("polarity")?;
    let polarity = Polarity::from_str_exact(&polarity_str).unwrap_or(Polarity::Neutral);

    let category_str: String = row.get("category")?;
    let category = Category::from_str_exact(&category_str).unwrap_or(Category::Other);

    let authority_level: i64 = row.get("authority_level")?;
    let authority_level = AuthorityLevel::from_u8(authority_level as u8).unwrap_or(AuthorityLevel::Modern);

    let correction_json: Option<String> = row.get("correction_json")?;
    let correction = correction_json.and_then(|s| serde_json::from_str(&s).ok());

    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Rule {
        id: row.get("id")?,
        original_text: row.get("original_text")?,
        corrected_text: row.get("corrected_text")?,
        conditions,
        effects,
        polarity,
        tags,
        category,
        source_title: row.get("source_title")?,
        page: row.get::<_, Option<i64>>("page")?.map(|p| p as u32),
        chapter: row.get("chapter")?,
        verse: row.get("verse")?,
        authority_level,
        confidence: row.get("confidence")?,
        extraction_method: row.get("extraction_method")?,
        correction,
        validated: row.get::<_, i64>("validated")? != 0,
        last_corrected_digest: row.get("last_corrected_digest")?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthorityLevel, Planet, Polarity, SourceBook};
    use tempfile::tempdir;

    fn sample_rule(source_title: &str) -> Rule {
        let now = Utc::now();
        Rule {
            id: String::new(),
            original_text: "Mars in the 7th house causes discord in marriage".to_string(),
            corrected_text: None,
            conditions: Conditions {
                planet: Some(Planet::Mars),
                house: Some(7),
                ..Default::default()
            },
            effects: vec!["discord in marriage".to_string()],
            polarity: Polarity::Negative,
            tags: vec![],
            category: Category::PlanetaryPlacement,
            source_title: source_title.to_string(),
            page: Some(12),
            chapter: None,
            verse: None,
            authority_level: AuthorityLevel::Classical,
            confidence: 0.8,
            extraction_method: "basic_placement".to_string(),
            correction: None,
            validated: false,
            last_corrected_digest: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn register_source_then_conflicting_authority_level_fails() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("store.sqlite")).unwrap();
        store
            .register_source(SourceBook::new("Saravali", None, AuthorityLevel::Classical))
            .unwrap();

        let result = store.register_source(SourceBook::new("Saravali", None, AuthorityLevel::Modern));
        assert!(matches!(result, Err(Error::SourceConflict { .. })));
    }

    #[test]
    fn store_rule_is_idempotent_by_deterministic_id() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("store.sqlite")).unwrap();
        store
            .register_source(SourceBook::new("Saravali", None, AuthorityLevel::Classical))
            .unwrap();

        let first = store.store_rule(sample_rule("Saravali")).unwrap();
        let second = store.store_rule(sample_rule("Saravali")).unwrap();
        assert_eq!(first, StoreOutcome::Stored);
        assert_eq!(second, StoreOutcome::Duplicate);
    }

    #[test]
    fn store_rule_rejects_unknown_source() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("store.sqlite")).unwrap();
        let result = store.store_rule(sample_rule("Unregistered Text"));
        assert!(matches!(result, Err(Error::UnknownSource(_))));
    }

    #[test]
    fn search_by_planet_and_house_returns_matching_rule() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("store.sqlite")).unwrap();
        store
            .register_source(SourceBook::new("Saravali", None, AuthorityLevel::Classical))
            .unwrap();
        store.store_rule(sample_rule("Saravali")).unwrap();

        let results = store
            .search(&SearchFilters::new().planet(Planet::Mars).house(7))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_title, "Saravali");
    }

    #[test]
    fn relevance_ordering_favors_classical_and_high_confidence() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("store.sqlite")).unwrap();
        store
            .register_source(SourceBook::new("Classical Text", None, AuthorityLevel::Classical))
            .unwrap();
        store
            .register_source(SourceBook::new("Modern Text", None, AuthorityLevel::Modern))
            .unwrap();

        let mut low = sample_rule("Modern Text");
        low.confidence = 0.5;
        low.original_text = "Venus in the 2nd house brings wealth".to_string();
        low.conditions = Conditions { planet: Some(Planet::Venus), house: Some(2), ..Default::default() };

        let mut high = sample_rule("Classical Text");
        high.confidence = 0.9;

        store.store_rule(low).unwrap();
        store.store_rule(high).unwrap();

        let results = store.search(&SearchFilters::new()).unwrap();
        assert_eq!(results[0].source_title, "Classical Text");
    }
}
