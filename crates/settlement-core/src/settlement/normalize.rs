//! Legacy-document normalization.
//!
//! Documents arrive from storage as untyped JSON because pre-versioning
//! shapes cannot deserialize into the current types. The pipeline is an
//! ordered list of named, precondition-gated steps; each step checks its
//! gate against the raw document, mutates it in place, and reports whether
//! it changed anything. After the pipeline the document deserializes into
//! [`SettlementDocument`]. Any fatal step aborts the whole load.

use super::*;

use contracts::{
    CAMPAIGN_VERSION, EXPANSIONS_VERSION, INNOVATIONS_VERSION, LOCATIONS_VERSION,
    MONSTERS_VERSION, PRINCIPLES_VERSION, TIMELINE_VERSION,
};
use serde_json::Map;

/// Side effects a step cannot express inside the document itself.
#[derive(Debug, Default)]
struct StepEffects {
    extracted_notes: Vec<SettlementNote>,
}

struct MigrationStep {
    name: &'static str,
    applies: fn(&Value) -> bool,
    run: fn(&mut Value, &GameContent, &mut StepEffects) -> Result<bool, SettlementError>,
}

const PIPELINE: &[MigrationStep] = &[
    MigrationStep { name: "bug_fixes", applies: always, run: bug_fixes },
    MigrationStep { name: "baseline", applies: always, run: baseline },
    MigrationStep {
        name: "migrate_settlement_notes",
        applies: has_legacy_notes,
        run: migrate_settlement_notes,
    },
    MigrationStep {
        name: "convert_timeline_to_json",
        applies: timeline_unversioned,
        run: convert_timeline_to_json,
    },
    MigrationStep {
        name: "convert_timeline_quarry_events",
        applies: timeline_pre_1_1,
        run: convert_timeline_quarry_events,
    },
    MigrationStep {
        name: "convert_campaign_to_handle",
        applies: |doc| meta_version(doc, "campaign_version").is_none(),
        run: convert_campaign_to_handle,
    },
    MigrationStep {
        name: "convert_expansions_to_handles",
        applies: |doc| meta_version(doc, "expansions_version").is_none(),
        run: convert_expansions_to_handles,
    },
    MigrationStep {
        name: "convert_innovations_to_handles",
        applies: |doc| meta_version(doc, "innovations_version").is_none(),
        run: convert_innovations_to_handles,
    },
    MigrationStep {
        name: "convert_locations_to_handles",
        applies: |doc| meta_version(doc, "locations_version").is_none(),
        run: convert_locations_to_handles,
    },
    MigrationStep {
        name: "convert_monsters_to_handles",
        applies: |doc| meta_version(doc, "monsters_version").is_none(),
        run: convert_monsters_to_handles,
    },
    MigrationStep {
        name: "convert_principles_to_handles",
        applies: |doc| meta_version(doc, "principles_version").is_none(),
        run: convert_principles_to_handles,
    },
];

#[derive(Debug)]
pub struct NormalizeOutcome {
    pub doc: SettlementDocument,
    pub extracted_notes: Vec<SettlementNote>,
    pub dirty: bool,
}

/// Runs every applicable migration step, then deserializes the document.
/// Idempotent: a second pass over the output finds no applicable steps.
pub(crate) fn normalize(
    content: &GameContent,
    mut raw: Value,
) -> Result<NormalizeOutcome, SettlementError> {
    let mut effects = StepEffects::default();
    let mut dirty = false;

    for step in PIPELINE {
        if !(step.applies)(&raw) {
            continue;
        }
        match (step.run)(&mut raw, content, &mut effects) {
            Ok(mutated) => {
                if mutated {
                    info!(step = step.name, "normalization step mutated the settlement");
                    dirty = true;
                }
            }
            Err(err) => {
                return Err(SettlementError::Migration(format!(
                    "step '{}' failed: {err}",
                    step.name
                )));
            }
        }
    }

    let doc: SettlementDocument = serde_json::from_value(raw)
        .map_err(|err| SettlementError::Migration(format!("document does not deserialize: {err}")))?;

    Ok(NormalizeOutcome {
        doc,
        extracted_notes: effects.extracted_notes,
        dirty,
    })
}

fn always(_doc: &Value) -> bool {
    true
}

fn has_legacy_notes(doc: &Value) -> bool {
    doc.get("settlement_notes").is_some()
}

fn timeline_unversioned(doc: &Value) -> bool {
    meta_version(doc, "timeline_version").is_none()
}

fn timeline_pre_1_1(doc: &Value) -> bool {
    matches!(meta_version(doc, "timeline_version"), Some(version) if version < TIMELINE_VERSION)
}

fn meta_version(doc: &Value, key: &str) -> Option<f64> {
    doc.get("meta")?.get(key)?.as_f64()
}

fn set_meta_version(doc: &mut Value, key: &str, version: f64) {
    if let Some(meta) = doc.get_mut("meta").and_then(Value::as_object_mut) {
        meta.insert(key.to_string(), json!(version));
    }
}

fn object_mut<'v>(doc: &'v mut Value) -> Result<&'v mut Map<String, Value>, SettlementError> {
    doc.as_object_mut()
        .ok_or_else(|| SettlementError::Migration("settlement document is not an object".to_string()))
}

/// Innovation entries that are mangled display names (multi-word strings
/// with a dash token, from an old import bug) get re-resolved by name or
/// dropped.
fn bug_fixes(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let Some(innovations) = doc.get_mut("innovations").and_then(Value::as_array_mut) else {
        return Ok(false);
    };

    let mut mutated = false;
    let mut replacement = Vec::with_capacity(innovations.len());
    for entry in innovations.iter() {
        let Some(text) = entry.as_str() else {
            replacement.push(entry.clone());
            continue;
        };
        let words: Vec<&str> = text.split(' ').collect();
        if words.len() > 1 && words.contains(&"-") {
            mutated = true;
            match content.innovations.get_asset_from_name(text) {
                Some(asset) => {
                    warn!(name = text, handle = %asset.handle, "replacing malformed innovation name");
                    replacement.push(json!(asset.handle));
                }
                None => warn!(name = text, "dropping unresolvable malformed innovation name"),
            }
        } else {
            replacement.push(entry.clone());
        }
    }

    *innovations = replacement;
    Ok(mutated)
}

/// Fills in auxiliary keys the oldest documents predate, and moves legacy
/// top-level version keys into the `meta` vector.
fn baseline(
    doc: &mut Value,
    _content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let object = object_mut(doc)?;
    let mut mutated = false;

    if let Some(legacy_id) = object.remove("_id") {
        object.entry("id".to_string()).or_insert(legacy_id);
        mutated = true;
    }

    let defaults: &[(&str, Value)] = &[
        ("endeavor_tokens", json!(0)),
        ("location_levels", json!({})),
        ("innovation_levels", json!({})),
        ("admins", json!([])),
        ("custom_epithets", json!([])),
        ("expansions", json!([])),
    ];
    for (key, default) in defaults {
        if !object.contains_key(*key) {
            object.insert(key.to_string(), default.clone());
            mutated = true;
        }
    }

    if !object.contains_key("meta") {
        let mut meta = Map::new();
        for key in ["timeline_version", "monsters_version", "expansions_version"] {
            if let Some(value) = object.remove(key) {
                meta.insert(key.to_string(), value);
            }
        }
        object.insert("meta".to_string(), Value::Object(meta));
        mutated = true;
    }

    Ok(mutated)
}

/// The legacy data model kept one free-form note string on the settlement
/// itself. It becomes a proper note document.
fn migrate_settlement_notes(
    doc: &mut Value,
    _content: &GameContent,
    effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let object = object_mut(doc)?;
    let Some(raw_note) = object.remove("settlement_notes") else {
        return Ok(false);
    };

    let text = raw_note.as_str().unwrap_or_default().trim().to_string();
    if text.is_empty() {
        return Ok(true);
    }

    let settlement_id = object
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let author = object
        .get("admins")
        .and_then(Value::as_array)
        .and_then(|admins| admins.first())
        .and_then(Value::as_str)
        .unwrap_or("founder")
        .to_string();
    let lantern_year = object
        .get("lantern_year")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    effects.extracted_notes.push(SettlementNote {
        js_id: format!("{settlement_id}_legacy_note"),
        note: text,
        author,
        lantern_year,
    });
    Ok(true)
}

/// Converts the oldest timeline shapes to the structured model. Year
/// buckets may hold scalars ("story_event": "Returning Survivors") or
/// lists of strings; both become event record lists. Story and settlement
/// events that resolve against no catalog name are fatal.
fn convert_timeline_to_json(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let Some(timeline) = doc.get_mut("timeline").and_then(Value::as_array_mut) else {
        set_meta_version(doc, "timeline_version", 1.0);
        return Ok(true);
    };

    let mut new_timeline = Vec::with_capacity(timeline.len());
    for old_year in timeline.iter() {
        let Some(old_year) = old_year.as_object() else {
            return Err(SettlementError::Migration("timeline year is not an object".to_string()));
        };

        let mut new_year = Map::new();
        for (key, value) in old_year {
            match value {
                Value::Number(_) => {
                    new_year.insert(key.clone(), value.clone());
                }
                Value::Array(entries) => {
                    let mut records = Vec::with_capacity(entries.len());
                    for entry in entries {
                        match entry {
                            Value::Object(_) => records.push(entry.clone()),
                            Value::String(name) => records.push(record_from_name(content, name)),
                            other => {
                                return Err(SettlementError::Migration(format!(
                                    "unconvertible timeline entry: {other}"
                                )))
                            }
                        }
                    }
                    new_year.insert(key.clone(), Value::Array(records));
                }
                Value::String(name) => {
                    let records = match key.as_str() {
                        "settlement_event" | "story_event" => {
                            vec![resolve_scalar_event(content, key, name)?]
                        }
                        "nemesis_encounter" | "quarry_event" => {
                            vec![json!({ "name": name })]
                        }
                        other => {
                            return Err(SettlementError::Migration(format!(
                                "'{other}' is an unknown event type"
                            )))
                        }
                    };
                    new_year.insert(key.clone(), Value::Array(records));
                }
                other => {
                    return Err(SettlementError::Migration(format!(
                        "unconvertible timeline value for '{key}': {other}"
                    )))
                }
            }
        }
        new_timeline.push(Value::Object(new_year));
    }

    // Year order is significant downstream.
    new_timeline.sort_by_key(|entry| entry.get("year").and_then(Value::as_u64).unwrap_or(0));
    *timeline = new_timeline;

    set_meta_version(doc, "timeline_version", 1.0);
    Ok(true)
}

fn record_from_name(content: &GameContent, name: &str) -> Value {
    match content.events.get_asset_from_name(name) {
        Some(asset) => json!({ "handle": asset.handle, "name": asset.name }),
        None => json!({ "name": name }),
    }
}

/// Scalar story/settlement events must resolve by name; a parenthesized
/// suffix ("Endless Screams (p.83)") is retried without the suffix.
fn resolve_scalar_event(
    content: &GameContent,
    kind: &str,
    name: &str,
) -> Result<Value, SettlementError> {
    if let Some(asset) = content.events.get_asset_from_name(name) {
        return Ok(json!({ "handle": asset.handle, "name": asset.name }));
    }
    if let Some((root, _)) = name.split_once('(') {
        if let Some(asset) = content.events.get_asset_from_name(root.trim()) {
            return Ok(json!({ "handle": asset.handle, "name": asset.name }));
        }
    }
    Err(SettlementError::Migration(format!(
        "{kind} '{name}' could not be converted"
    )))
}

/// Timeline 1.0 to 1.1: `quarry_event` buckets become `showdown_event`.
fn convert_timeline_quarry_events(
    doc: &mut Value,
    _content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    if let Some(timeline) = doc.get_mut("timeline").and_then(Value::as_array_mut) {
        for year in timeline.iter_mut() {
            if let Some(year) = year.as_object_mut() {
                if let Some(events) = year.remove("quarry_event") {
                    year.insert("showdown_event".to_string(), events);
                }
            }
        }
    }
    set_meta_version(doc, "timeline_version", TIMELINE_VERSION);
    Ok(true)
}

/// A missing campaign defaults to the default campaign; a campaign name
/// that resolves against no definition is fatal.
fn convert_campaign_to_handle(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let object = object_mut(doc)?;

    let incoming = object.get("campaign").and_then(Value::as_str).map(str::to_string);
    let handle = match incoming {
        None => {
            let default = content
                .campaigns
                .values()
                .find(|campaign| campaign.default)
                .map(|campaign| campaign.handle.clone())
                .ok_or_else(|| SettlementError::Migration("no default campaign".to_string()))?;
            warn!(campaign = %default, "defaulted missing campaign attribute");
            default
        }
        Some(incoming) => {
            if content.campaigns.contains_key(&incoming) {
                incoming
            } else {
                content
                    .campaign_from_name(&incoming)
                    .map(|campaign| campaign.handle.clone())
                    .ok_or_else(|| {
                        SettlementError::Migration(format!(
                            "campaign '{incoming}' could not be converted"
                        ))
                    })?
            }
        }
    };

    object.insert("campaign".to_string(), json!(handle));
    set_meta_version(doc, "campaign_version", CAMPAIGN_VERSION);
    Ok(true)
}

/// Shared by the expansion, innovation, location, and principle steps:
/// keeps entries that already are handles, converts names, drops what
/// resolves against nothing.
fn convert_list_to_handles(
    doc: &mut Value,
    key: &str,
    resolve_handle: impl Fn(&str) -> bool,
    resolve_name: impl Fn(&str) -> Option<String>,
) -> Result<(), SettlementError> {
    let Some(entries) = doc.get_mut(key).and_then(Value::as_array_mut) else {
        return Ok(());
    };

    let mut converted = Vec::with_capacity(entries.len());
    for entry in entries.iter() {
        let Some(text) = entry.as_str() else {
            return Err(SettlementError::Migration(format!("'{key}' entry is not a string")));
        };
        if resolve_handle(text) {
            converted.push(json!(text));
        } else if let Some(handle) = resolve_name(text) {
            converted.push(json!(handle));
        } else {
            warn!(collection = key, name = text, "dropping unresolvable legacy entry");
        }
    }
    *entries = converted;
    Ok(())
}

fn convert_levels_to_handles(
    doc: &mut Value,
    key: &str,
    resolve_name: impl Fn(&str) -> Option<String>,
) {
    let Some(levels) = doc.get_mut(key).and_then(Value::as_object_mut) else {
        return;
    };

    let old = std::mem::take(levels);
    for (name, level) in old {
        match resolve_name(&name) {
            Some(handle) => {
                levels.insert(handle, level);
            }
            None => {
                levels.insert(name.clone(), level);
                warn!(collection = key, name = %name, "could not convert level key");
            }
        }
    }
}

fn convert_expansions_to_handles(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    convert_list_to_handles(
        doc,
        "expansions",
        |handle| content.expansions.contains_key(handle),
        |name| content.expansion_from_name(name).map(|e| e.handle.clone()),
    )?;
    set_meta_version(doc, "expansions_version", EXPANSIONS_VERSION);
    Ok(true)
}

fn convert_innovations_to_handles(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let resolve_name = |name: &str| {
        content
            .innovations
            .get_asset_from_name(name)
            .map(|asset| asset.handle.clone())
    };
    convert_list_to_handles(
        doc,
        "innovations",
        |handle| content.innovations.get_asset(handle).is_some(),
        resolve_name,
    )?;
    convert_levels_to_handles(doc, "innovation_levels", resolve_name);
    set_meta_version(doc, "innovations_version", INNOVATIONS_VERSION);
    Ok(true)
}

fn convert_locations_to_handles(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let resolve_name = |name: &str| {
        content
            .locations
            .get_asset_from_name(name)
            .map(|asset| asset.handle.clone())
    };
    convert_list_to_handles(
        doc,
        "locations",
        |handle| content.locations.get_asset(handle).is_some(),
        resolve_name,
    )?;
    convert_levels_to_handles(doc, "location_levels", resolve_name);
    set_meta_version(doc, "locations_version", LOCATIONS_VERSION);
    Ok(true)
}

/// Legacy monster bookkeeping kept nemesis levels as strings ("Lvl 2")
/// inside a name-keyed map. The trailing digit becomes the achieved level
/// in `nemesis_encounters`; the quarry and nemesis lists convert to
/// handles, dropping what no longer resolves.
fn convert_monsters_to_handles(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    let resolve_name = |name: &str| {
        content
            .monsters
            .get_asset_from_name(name)
            .map(|asset| asset.handle.clone())
    };

    // nemesis_monsters may be the legacy dict shape; extract encounter
    // levels first, then flatten to a list for the generic conversion.
    let mut encounters = Map::new();
    if let Some(nemeses) = doc.get("nemesis_monsters").and_then(Value::as_object).cloned() {
        let mut names = Vec::new();
        for (name, levels) in &nemeses {
            let Some(handle) = resolve_name(name) else {
                warn!(name = %name, "nemesis encounter cannot be migrated");
                continue;
            };
            let mut parsed = Vec::new();
            if let Some(levels) = levels.as_array() {
                for level in levels {
                    let digit = level
                        .as_str()
                        .and_then(|text| text.chars().last())
                        .and_then(|last| last.to_digit(10));
                    match digit {
                        Some(digit) => parsed.push(json!(digit)),
                        None => warn!(name = %name, ?level, "nemesis level cannot be migrated"),
                    }
                }
            }
            encounters.insert(handle, Value::Array(parsed));
            names.push(json!(name));
        }
        let object = object_mut(doc)?;
        object.insert("nemesis_monsters".to_string(), Value::Array(names));
    }
    if !encounters.is_empty() || doc.get("nemesis_encounters").is_none() {
        let object = object_mut(doc)?;
        object.insert("nemesis_encounters".to_string(), Value::Object(encounters));
    }

    for key in ["quarries", "nemesis_monsters"] {
        convert_list_to_handles(
            doc,
            key,
            |handle| content.monsters.get_asset(handle).is_some(),
            resolve_name,
        )?;
    }

    set_meta_version(doc, "monsters_version", MONSTERS_VERSION);
    Ok(true)
}

fn convert_principles_to_handles(
    doc: &mut Value,
    content: &GameContent,
    _effects: &mut StepEffects,
) -> Result<bool, SettlementError> {
    convert_list_to_handles(
        doc,
        "principles",
        |handle| content.innovations.get_asset(handle).is_some(),
        |name| {
            content
                .innovations
                .get_asset_from_name(name)
                .map(|asset| asset.handle.clone())
        },
    )?;
    set_meta_version(doc, "principles_version", PRINCIPLES_VERSION);
    Ok(true)
}
