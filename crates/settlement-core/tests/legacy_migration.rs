use contracts::SchemaMeta;
use serde_json::json;
use settlement_core::{GameContent, Settlement, SettlementError};

/// A pre-versioning document exercising every legacy shape at once: name
/// keyed collections, the scalar/string timeline, the nemesis level dict,
/// and the inline notes string.
fn legacy_document() -> serde_json::Value {
    json!({
        "_id": "stl_legacy_01",
        "name": "Oldtown",
        "campaign": "People of the Lantern",
        "lantern_year": 1,
        "population": 3,
        "death_count": 0,
        "survival_limit": 1,
        "lost_settlements": 0,
        "settlement_notes": "  watch out for the butcher  ",
        "timeline": [
            {"year": 0, "settlement_event": "First Day", "quarry_event": ["White Lion (First Story)"]},
            {"year": 2, "story_event": "Endless Screams (p.83)"},
            {"year": 1, "story_event": "Returning Survivors", "custom": []},
            {"year": 4, "nemesis_encounter": "Nemesis Encounter: Butcher"}
        ],
        "expansions": ["Gorm"],
        "innovations": ["Language", "Mastery - Club", "Bogus Thing"],
        "innovation_levels": {"Language": 2},
        "locations": ["Lantern Hoard", "Bone Smith"],
        "quarries": ["White Lion"],
        "nemesis_monsters": {"Butcher": ["Lvl 1", "Lvl 2"]},
        "principles": ["Graves"],
        "milestone_story_events": [],
        "defeated_monsters": [],
        "storage": []
    })
}

#[test]
fn legacy_document_migrates_end_to_end() {
    let content = GameContent::core();
    let settlement =
        Settlement::load(&content, legacy_document(), Vec::new(), Vec::new()).unwrap();
    let doc = settlement.document();

    assert!(settlement.is_dirty());
    assert_eq!(doc.id, "stl_legacy_01");
    assert_eq!(doc.campaign, "people_of_the_lantern");
    assert_eq!(doc.meta, SchemaMeta::current());

    // Name keyed collections became handles; unresolvable entries dropped.
    assert_eq!(doc.expansions, vec!["gorm".to_string()]);
    assert_eq!(doc.innovations, vec!["language".to_string()]);
    assert_eq!(doc.innovation_levels.get("language"), Some(&2));
    assert_eq!(doc.locations, vec!["lantern_hoard".to_string(), "bone_smith".to_string()]);
    assert_eq!(doc.quarries, vec!["white_lion".to_string()]);
    assert_eq!(doc.nemesis_monsters, vec!["butcher".to_string()]);
    assert_eq!(doc.nemesis_encounters.get("butcher"), Some(&vec![1, 2]));
    assert_eq!(doc.principles, vec!["graves".to_string()]);

    // Timeline re-sorted by year with structured records.
    let years: Vec<u64> = doc.timeline.iter().map(|entry| entry.year).collect();
    assert_eq!(years, vec![0, 1, 2, 4]);

    let first_day = &doc.timeline[0].events["settlement_event"][0];
    assert_eq!(first_day.handle.as_deref(), Some("core_first_day"));

    // quarry_event buckets became showdown_event buckets.
    assert!(doc.timeline[0].events.get("quarry_event").is_none());
    let showdown = &doc.timeline[0].events["showdown_event"][0];
    assert_eq!(showdown.name.as_deref(), Some("White Lion (First Story)"));

    // The parenthesized suffix resolved against the catalog name.
    let screams = &doc.timeline[2].events["story_event"][0];
    assert_eq!(screams.handle.as_deref(), Some("core_endless_screams"));

    // The inline notes string became a note document, trimmed.
    assert_eq!(settlement.notes().len(), 1);
    assert_eq!(settlement.notes()[0].note, "watch out for the butcher");
}

#[test]
fn migrated_document_passes_a_second_normalization_untouched() {
    let content = GameContent::core();
    let settlement =
        Settlement::load(&content, legacy_document(), Vec::new(), Vec::new()).unwrap();

    let raw = serde_json::to_value(settlement.document()).unwrap();
    let reloaded = Settlement::load(&content, raw, Vec::new(), Vec::new()).unwrap();

    assert!(!reloaded.is_dirty());
    assert_eq!(reloaded.document(), settlement.document());
}

#[test]
fn unconvertible_story_event_aborts_the_load() {
    let content = GameContent::core();
    let mut raw = legacy_document();
    raw["timeline"][1]["story_event"] = json!("Absolutely Unknown Event");

    let result = Settlement::load(&content, raw, Vec::new(), Vec::new());
    assert!(matches!(result, Err(SettlementError::Migration(_))));
}

#[test]
fn unconvertible_campaign_aborts_the_load() {
    let content = GameContent::core();
    let mut raw = legacy_document();
    raw["campaign"] = json!("People of the Void");

    let result = Settlement::load(&content, raw, Vec::new(), Vec::new());
    assert!(matches!(result, Err(SettlementError::Migration(_))));
}

#[test]
fn missing_campaign_defaults_to_the_default_campaign() {
    let content = GameContent::core();
    let mut raw = legacy_document();
    raw.as_object_mut().unwrap().remove("campaign");

    let settlement = Settlement::load(&content, raw, Vec::new(), Vec::new()).unwrap();
    assert_eq!(settlement.document().campaign, "people_of_the_lantern");
}

#[test]
fn minimums_are_enforced_after_migration() {
    let content = GameContent::core();
    let mut raw = legacy_document();
    // A survival limit below the floor implied by acquired innovations.
    raw["survival_limit"] = json!(0);

    let settlement = Settlement::load(&content, raw, Vec::new(), Vec::new()).unwrap();
    // Language contributes 1 to the floor.
    assert_eq!(settlement.document().survival_limit, 1);
}
