//! Versioned persistence gateway.
//!
//! One JSON document per profile. Loads migrate older schemas forward before
//! typed deserialization; saves go through a temp file and an atomic rename
//! so a crash or a full disk never leaves a torn document behind.
//!
//! Migrations run over raw `serde_json::Value`, not typed structs: an old
//! document must become loadable *before* the current types see it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::GradusError;
use crate::program::{Program, SCHEMA_VERSION};

/// Document filename inside the data directory.
const PROGRAM_FILENAME: &str = "program.json";

/// Store handle: one path plus the load/save/export/import contract.
#[derive(Debug, Clone)]
pub struct ProgramStore {
    path: PathBuf,
}

impl ProgramStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store rooted under an arbitrary directory. Used by tests and by the
    /// data-dir override chain.
    pub fn with_root(root: &Path) -> Self {
        Self {
            path: root.join(PROGRAM_FILENAME),
        }
    }

    /// Default per-user location: `<platform data dir>/gradus/program.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gradus")
            .join(PROGRAM_FILENAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored program, migrating older documents forward.
    ///
    /// Missing, unreadable or unusable documents all yield a fresh default:
    /// a session must never fail to start over a bad file. The bad file is
    /// left in place untouched until the next save.
    pub fn load(&self) -> Program {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no stored program at {}", self.path.display());
                return Program::new();
            }
            Err(e) => {
                warn!("failed to read stored program: {}", e);
                return Program::new();
            }
        };
        match decode_document(&raw) {
            Ok(program) => program,
            Err(e) => {
                warn!("stored program unusable, starting fresh: {}", e);
                Program::new()
            }
        }
    }

    /// Persist the program atomically.
    pub fn save(&self, program: &Program) -> Result<(), GradusError> {
        let json = serde_json::to_string_pretty(program)?;
        atomic_write(&self.path, json.as_bytes())?;
        Ok(())
    }
}

/// Write via a temp file in the same directory, fsync, then rename over the
/// target.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

// ===== EXPORT / IMPORT =====

/// Serialize a program for export. Returns the document plus a date-stamped
/// filename; the caller decides where it lands.
pub fn export_document(program: &Program, today: NaiveDate) -> Result<(String, String), GradusError> {
    let json = serde_json::to_string_pretty(program)?;
    let filename = format!("gradus-export-{}.json", today.format("%Y-%m-%d"));
    Ok((json, filename))
}

/// Validate and migrate an imported document into a program.
///
/// Shape validation runs before migration, so a rejected file produces a
/// specific message instead of a half-migrated failure. The caller commits
/// the result; nothing here touches disk.
pub fn import_document(raw: &str) -> Result<Program, GradusError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| GradusError::InvalidImport(format!("not valid JSON: {}", e)))?;
    validate_shape(&value)?;
    let migrated = migrate(value);
    serde_json::from_value(migrated)
        .map_err(|e| GradusError::InvalidImport(format!("not a program document: {}", e)))
}

/// Shared by load and import: parse, check shape, migrate, deserialize.
fn decode_document(raw: &str) -> Result<Program, GradusError> {
    let value: Value = serde_json::from_str(raw)?;
    validate_shape(&value)?;
    let migrated = migrate(value);
    Ok(serde_json::from_value(migrated)?)
}

/// Minimal shape check: an object carrying a `weeks` array and a numeric
/// `total_xp`. Everything else can be back-filled; these two cannot.
fn validate_shape(value: &Value) -> Result<(), GradusError> {
    let Some(obj) = value.as_object() else {
        return Err(GradusError::InvalidImport("top level is not an object".into()));
    };
    match obj.get("weeks") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(GradusError::InvalidImport("`weeks` is not an array".into())),
        None => return Err(GradusError::InvalidImport("missing `weeks` array".into())),
    }
    match obj.get("total_xp") {
        Some(v) if v.is_number() => {}
        Some(_) => return Err(GradusError::InvalidImport("`total_xp` is not a number".into())),
        None => return Err(GradusError::InvalidImport("missing numeric `total_xp`".into())),
    }
    Ok(())
}

// ===== MIGRATIONS =====

/// Bring a document to the current schema, one version step at a time, then
/// back-fill any top-level field a fresh default would have.
fn migrate(mut value: Value) -> Value {
    let mut version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(1);
    if version < SCHEMA_VERSION {
        debug!("migrating stored program v{} -> v{}", version, SCHEMA_VERSION);
    }
    while version < SCHEMA_VERSION {
        match version {
            1 => v1_to_v2(&mut value),
            2 => v2_to_v3(&mut value),
            3 => v3_to_v4(&mut value),
            _ => break,
        }
        version += 1;
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("schema_version".into(), Value::from(SCHEMA_VERSION));
        backfill_defaults(obj);
    }
    value
}

fn for_each_lecture(value: &mut Value, f: impl Fn(&mut Map<String, Value>)) {
    let Some(weeks) = value.get_mut("weeks").and_then(Value::as_array_mut) else {
        return;
    };
    for week in weeks {
        let Some(lectures) = week.get_mut("lectures").and_then(Value::as_array_mut) else {
            continue;
        };
        for lecture in lectures {
            if let Some(obj) = lecture.as_object_mut() {
                f(obj);
            }
        }
    }
}

/// v1 -> v2: revision logging arrived; old lectures get a zero counter.
fn v1_to_v2(value: &mut Value) {
    for_each_lecture(value, |lecture| {
        lecture.entry("revision_count").or_insert(Value::from(0u32));
    });
}

/// v2 -> v3: per-lecture free-text notes.
fn v2_to_v3(value: &mut Value) {
    for_each_lecture(value, |lecture| {
        lecture.entry("notes").or_insert(Value::from(""));
    });
}

/// v3 -> v4: freeze pool plus best-streak tracking. The best streak is
/// seeded from the current streak, the only history the old schema has.
fn v3_to_v4(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        let streak = obj.get("streak").and_then(Value::as_u64).unwrap_or(0);
        obj.entry("best_streak").or_insert(Value::from(streak));
        obj.entry("streak_freezes").or_insert(Value::from(0u32));
    }
}

/// Insert any top-level key the current default defines but the document
/// lacks. Runs after the version steps so real migrations keep precedence.
fn backfill_defaults(obj: &mut Map<String, Value>) {
    if let Ok(Value::Object(defaults)) = serde_json::to_value(Program::new()) {
        for (key, default_value) in defaults {
            obj.entry(key).or_insert(default_value);
        }
    }
}
