//! Cross-boundary contracts for the settlement kernel, store, and CLI.
//!
//! Every shape here is serde-round-trippable and matches the persisted
//! settlement document field for field. Legacy documents that predate the
//! current schema are handled as untyped `serde_json::Value` by the
//! normalization pipeline before they are deserialized into these types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current schema version for each migratable subsystem. A settlement whose
/// `meta` vector is below (or missing) one of these gets migrated on load.
pub const TIMELINE_VERSION: f64 = 1.1;
pub const CAMPAIGN_VERSION: f64 = 1.0;
pub const MONSTERS_VERSION: f64 = 1.0;
pub const EXPANSIONS_VERSION: f64 = 1.0;
pub const INNOVATIONS_VERSION: f64 = 1.0;
pub const LOCATIONS_VERSION: f64 = 1.0;
pub const PRINCIPLES_VERSION: f64 = 1.0;

/// Per-subsystem schema version vector. Versions are monotonically
/// non-decreasing; an absent field means the subsystem predates versioning
/// and the corresponding migration step still has to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monsters_version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansions_version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub innovations_version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations_version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principles_version: Option<f64>,
}

impl SchemaMeta {
    pub fn current() -> Self {
        Self {
            timeline_version: Some(TIMELINE_VERSION),
            campaign_version: Some(CAMPAIGN_VERSION),
            monsters_version: Some(MONSTERS_VERSION),
            expansions_version: Some(EXPANSIONS_VERSION),
            innovations_version: Some(INNOVATIONS_VERSION),
            locations_version: Some(LOCATIONS_VERSION),
            principles_version: Some(PRINCIPLES_VERSION),
        }
    }
}

/// One record inside a timeline year bucket. Either `handle` (resolved
/// against the event catalog) or a free-form `name` identifies the event;
/// `excluded_campaign` suppresses the record for exactly one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_campaign: Option<String>,
}

impl EventRecord {
    pub fn from_handle(handle: impl Into<String>) -> Self {
        Self {
            handle: Some(handle.into()),
            name: None,
            excluded_campaign: None,
        }
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            handle: None,
            name: Some(name.into()),
            excluded_campaign: None,
        }
    }

    /// Loose match used for removal: the records refer to the same event if
    /// their names agree or their handles agree. Structural equality
    /// (`PartialEq`) is reserved for duplicate detection on insert.
    pub fn matches(&self, other: &EventRecord) -> bool {
        match (&self.name, &other.name) {
            (Some(a), Some(b)) if a == b => return true,
            _ => {}
        }
        matches!((&self.handle, &other.handle), (Some(a), Some(b)) if a == b)
    }
}

/// One year bucket of the timeline: a unique year plus a map from
/// event-type tag (`story_event`, `nemesis_encounter`, `showdown_event`,
/// `settlement_event`, ...) to the ordered records scheduled in that year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearEntry {
    pub year: u64,
    #[serde(flatten)]
    pub events: BTreeMap<String, Vec<EventRecord>>,
}

impl YearEntry {
    pub fn new(year: u64) -> Self {
        Self {
            year,
            events: BTreeMap::new(),
        }
    }
}

/// The command/delta shape for timeline mutations. Expansion
/// `timeline_add`/`timeline_rm` entries carry exactly this: an explicit
/// lantern year, an event-type tag, and a handle or free-form name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub ly: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_campaign: Option<String>,
}

impl TimelineEvent {
    pub fn record(&self) -> EventRecord {
        EventRecord {
            handle: self.handle.clone(),
            name: self.name.clone(),
            excluded_campaign: self.excluded_campaign.clone(),
        }
    }
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self
            .name
            .as_deref()
            .or(self.handle.as_deref())
            .unwrap_or("<unnamed>");
        write!(f, "{} '{}' (ly {})", self.kind, label, self.ly)
    }
}

/// The root aggregate document, persisted as one JSON document per
/// settlement. Auxiliary fields default so current-version documents
/// round-trip; legacy documents go through normalization first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementDocument {
    pub id: String,
    pub name: String,
    pub campaign: String,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub lantern_year: u64,
    #[serde(default)]
    pub population: i64,
    #[serde(default)]
    pub death_count: i64,
    #[serde(default)]
    pub survival_limit: i64,
    #[serde(default)]
    pub lost_settlements: i64,
    #[serde(default)]
    pub endeavor_tokens: i64,
    #[serde(default)]
    pub expansions: Vec<String>,
    #[serde(default)]
    pub innovations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub principles: Vec<String>,
    #[serde(default)]
    pub milestone_story_events: Vec<String>,
    #[serde(default)]
    pub quarries: Vec<String>,
    #[serde(default)]
    pub nemesis_monsters: Vec<String>,
    #[serde(default)]
    pub defeated_monsters: Vec<String>,
    #[serde(default)]
    pub storage: Vec<String>,
    #[serde(default)]
    pub custom_epithets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_quarry: Option<String>,
    #[serde(default)]
    pub innovation_levels: BTreeMap<String, i64>,
    #[serde(default)]
    pub location_levels: BTreeMap<String, i64>,
    #[serde(default)]
    pub nemesis_encounters: BTreeMap<String, Vec<i64>>,
    #[serde(default)]
    pub timeline: Vec<YearEntry>,
    #[serde(default)]
    pub meta: SchemaMeta,
}

impl fmt::Display for SettlementDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}', ly {})", self.id, self.name, self.lantern_year)
    }
}

/// Unlock condition on an innovation: the named handle must be present in
/// the named settlement collection (`locations`, `innovations`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableIf {
    pub handle: String,
    pub collection: String,
}

/// Generic catalog asset definition, shared by every content family that
/// the compatibility resolver evaluates (innovations, locations, monsters,
/// events, survival actions). Fields irrelevant to a family stay at their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDef {
    pub handle: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion: Option<String>,
    #[serde(default)]
    pub excluded_campaigns: Vec<String>,
    #[serde(default)]
    pub consequences: Vec<String>,
    #[serde(default)]
    pub available_if: Vec<AvailableIf>,
    #[serde(default)]
    pub survival_limit: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<u8>,
    #[serde(default)]
    pub current_survivor: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_buff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survivor_buff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_buff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survival_action: Option<String>,
    #[serde(default)]
    pub available: bool,
}

/// Sheet defaults applied exactly once at settlement creation, from the
/// campaign definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetInit {
    #[serde(default)]
    pub quarries: Vec<String>,
    #[serde(default)]
    pub nemesis_monsters: Vec<String>,
    #[serde(default)]
    pub nemesis_encounters: BTreeMap<String, Vec<i64>>,
    #[serde(default)]
    pub expansions: Vec<String>,
    #[serde(default)]
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignDef {
    pub handle: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub default: bool,
    pub timeline: Vec<YearEntry>,
    #[serde(default)]
    pub principles: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
    #[serde(default)]
    pub survival_actions: Vec<String>,
    #[serde(default)]
    pub nemesis_monsters: Vec<String>,
    #[serde(default)]
    pub quarries: Vec<String>,
    #[serde(default)]
    pub special_showdowns: Vec<String>,
    #[serde(default)]
    pub always_available: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub forbidden: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub settlement_sheet_init: SheetInit,
    #[serde(default)]
    pub survivor_attribute_milestones: Value,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionDef {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub timeline_add: Vec<TimelineEvent>,
    #[serde(default)]
    pub timeline_rm: Vec<TimelineEvent>,
    #[serde(default)]
    pub rm_nemesis_monsters: Vec<String>,
    #[serde(default)]
    pub quarries: Vec<String>,
    #[serde(default)]
    pub nemesis_monsters: Vec<String>,
    #[serde(default)]
    pub special_showdowns: Vec<String>,
    #[serde(default = "default_true")]
    pub enforce_survival_limit: bool,
}

/// A principle group: a settlement-wide exclusive choice. The elections in
/// `option_handles` are innovation assets of kind `principle`; at most one
/// may be active per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleGroupDef {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
    pub option_handles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneDef {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
    pub story_event: String,
    pub story_event_handle: String,
}

/// Dependent survivor document. Only the increment/decrement attribute
/// contract lives in this crate; richer survivor bookkeeping is out of
/// scope for the kernel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Survivor {
    pub id: String,
    pub settlement: String,
    pub name: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, i64>,
}

impl Survivor {
    pub fn update_attribute(&mut self, attribute: &str, delta: i64) {
        let entry = self.attributes.entry(attribute.to_string()).or_insert(0);
        *entry += delta;
    }
}

/// Prefab survivor shape used by campaign specials and the `survivors`
/// parameter of settlement creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivorTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, i64>,
    #[serde(default)]
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageGrant {
    pub name: String,
    pub quantity: u32,
}

/// New-settlement "special" script: a macro applied once at creation that
/// can seed survivors, storage, a starting quarry, and timeline events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialDef {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub random_survivors: Vec<SurvivorTemplate>,
    #[serde(default)]
    pub storage: Vec<StorageGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_quarry: Option<String>,
    #[serde(default)]
    pub timeline_events: Vec<TimelineEvent>,
}

/// Settlement note, kept as a separate document collection next to the
/// settlement (legacy documents carried one inline string instead; the
/// normalization pipeline extracts it).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementNote {
    pub js_id: String,
    pub note: String,
    pub author: String,
    #[serde(default)]
    pub lantern_year: u64,
}

/// One line of the settlement's session event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub lantern_year: u64,
    pub event_type: String,
    pub message: String,
}

/// Parameters for creating a new settlement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSettlement {
    pub campaign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub expansions: Vec<String>,
    #[serde(default)]
    pub specials: Vec<String>,
    #[serde(default)]
    pub survivors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_entry_flattens_event_type_tags() {
        let raw = serde_json::json!({
            "year": 4,
            "nemesis_encounter": [{"name": "Nemesis Encounter: Butcher"}],
        });
        let entry: YearEntry = serde_json::from_value(raw).expect("year entry parses");
        assert_eq!(entry.year, 4);
        let records = entry.events.get("nemesis_encounter").expect("tag present");
        assert_eq!(records[0].name.as_deref(), Some("Nemesis Encounter: Butcher"));
    }

    #[test]
    fn event_record_matches_on_name_or_handle() {
        let by_handle = EventRecord::from_handle("core_first_day");
        let mut enriched = EventRecord::from_handle("core_first_day");
        enriched.name = Some("First Day".to_string());
        assert!(by_handle.matches(&enriched));
        assert_ne!(by_handle, enriched);

        let by_name = EventRecord::from_name("Custom Event");
        assert!(!by_name.matches(&by_handle));
    }

    #[test]
    fn settlement_document_round_trips() {
        let mut doc = SettlementDocument {
            id: "stl_000001".to_string(),
            name: "Roshi's Landing".to_string(),
            campaign: "people_of_the_lantern".to_string(),
            survival_limit: 1,
            meta: SchemaMeta::current(),
            ..SettlementDocument::default()
        };
        doc.timeline.push(YearEntry::new(0));

        let value = serde_json::to_value(&doc).expect("serializes");
        let back: SettlementDocument = serde_json::from_value(value).expect("deserializes");
        assert_eq!(doc, back);
    }
}
