use super::*;

fn new_settlement<'c>(content: &'c GameContent, campaign: &str) -> Settlement<'c> {
    let request = NewSettlement {
        campaign: campaign.to_string(),
        name: Some("Roshi's Landing".to_string()),
        ..NewSettlement::default()
    };
    Settlement::create(content, "stl_000001", &request).expect("settlement creates")
}

fn custom_event(ly: u64, kind: &str, name: &str) -> TimelineEvent {
    TimelineEvent {
        ly,
        kind: kind.to_string(),
        handle: None,
        name: Some(name.to_string()),
        excluded_campaign: None,
    }
}

#[test]
fn create_builds_sheet_and_timeline_from_campaign() {
    let content = GameContent::core();
    let settlement = new_settlement(&content, "people_of_the_lantern");
    let doc = settlement.document();

    assert_eq!(doc.survival_limit, 1);
    assert_eq!(doc.lantern_year, 0);
    assert_eq!(doc.quarries, vec!["white_lion".to_string()]);
    assert_eq!(doc.nemesis_monsters, vec!["butcher".to_string()]);
    assert_eq!(doc.timeline.len(), 41);

    let first_day = &doc.timeline[0].events["settlement_event"][0];
    assert_eq!(first_day.handle.as_deref(), Some("core_first_day"));
    assert_eq!(first_day.name.as_deref(), Some("First Day"));

    let butcher = &doc.timeline[4].events["nemesis_encounter"][0];
    assert_eq!(butcher.name.as_deref(), Some("Nemesis Encounter: Butcher"));
}

#[test]
fn create_applies_sheet_init_expansions() {
    let content = GameContent::core();
    let settlement = new_settlement(&content, "people_of_the_stars");
    let doc = settlement.document();

    assert!(doc.expansions.contains(&"dragon_king".to_string()));
    // The expansion removes this nemesis from the starting roster.
    assert!(!doc.nemesis_monsters.contains(&"kings_man".to_string()));
    // Its timeline event is excluded for this campaign.
    let year_8 = &doc.timeline[8];
    assert!(year_8.events.get("story_event").map_or(true, |bucket| bucket
        .iter()
        .all(|record| record.handle.as_deref() != Some("dk_glowing_crater"))));
}

#[test]
fn excluded_campaign_event_is_skipped_on_creation() {
    let content = GameContent::core();
    let settlement = new_settlement(&content, "people_of_the_sun");
    let doc = settlement.document();

    assert!(doc.expansions.contains(&"sunstalker".to_string()));
    let year_8 = &doc.timeline[8];
    assert!(year_8.events.get("story_event").map_or(true, |bucket| bucket
        .iter()
        .all(|record| record.handle.as_deref() != Some("ss_promise_under_the_sun"))));
}

#[test]
fn add_innovation_rejects_unknown_and_ignores_duplicates() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    assert!(matches!(
        settlement.add_innovation("basket_weaving"),
        Err(SettlementError::UnknownAsset(_))
    ));
    assert_eq!(settlement.add_innovation("language").unwrap(), true);
    assert_eq!(settlement.add_innovation("language").unwrap(), false);
    assert_eq!(settlement.document().innovations, vec!["language".to_string()]);
}

#[test]
fn innovation_deck_derives_from_consequences() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    settlement.add_innovation("language").unwrap();

    let deck = settlement.innovation_deck();
    for name in ["Ammonia", "Drums", "Hovel", "Inner Lantern", "Paint", "Symposium"] {
        assert!(deck.contains(&name.to_string()), "deck should hold {name}");
    }
    assert!(!deck.contains(&"Language".to_string()));
    // Forbidden by the campaign, so never compatible.
    assert!(!deck.contains(&"Sun Language".to_string()));
}

#[test]
fn available_if_forces_innovation_into_deck() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    settlement.add_innovation("language").unwrap();
    settlement.add_innovation("hovel").unwrap();

    assert!(!settlement.innovation_deck().contains(&"Clan of Death".to_string()));
    settlement.add_innovation("family").unwrap();
    assert!(settlement.innovation_deck().contains(&"Clan of Death".to_string()));
}

#[test]
fn set_principle_moves_survivor_deltas_exactly_once() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    settlement.add_survivor_from_template(&contracts::SurvivorTemplate {
        name: Some("Zachary".to_string()),
        sex: "M".to_string(),
        ..contracts::SurvivorTemplate::default()
    });

    assert_eq!(settlement.set_principle("conviction", Some("barbaric")).unwrap(), true);
    assert_eq!(settlement.survivors()[0].attributes.get("Strength"), Some(&1));

    // Re-electing the active option changes nothing.
    assert_eq!(settlement.set_principle("conviction", Some("barbaric")).unwrap(), false);
    assert_eq!(settlement.survivors()[0].attributes.get("Strength"), Some(&1));

    // Switching elections reverts the old deltas and applies the new ones.
    assert_eq!(settlement.set_principle("conviction", Some("romantic")).unwrap(), true);
    assert_eq!(settlement.survivors()[0].attributes.get("Strength"), Some(&0));
    assert_eq!(settlement.survivors()[0].attributes.get("Understanding"), Some(&1));
    assert_eq!(settlement.document().principles, vec!["romantic".to_string()]);
}

#[test]
fn unset_principle_with_no_election_is_a_noop() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    assert_eq!(settlement.set_principle("new_life", None).unwrap(), false);
}

#[test]
fn set_principle_rejects_foreign_election() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    assert!(matches!(
        settlement.set_principle("new_life", Some("barbaric")),
        Err(SettlementError::Validation(_))
    ));
}

#[test]
fn counters_clamp_at_zero() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    settlement.update_endeavor_tokens(3).unwrap();
    settlement.update_endeavor_tokens(-5).unwrap();
    assert_eq!(settlement.document().endeavor_tokens, 0);

    settlement.update_population(2).unwrap();
    settlement.update_population(-7).unwrap();
    assert_eq!(settlement.document().population, 0);

    settlement.set_lost_settlements(-2).unwrap();
    assert_eq!(settlement.document().lost_settlements, 0);
}

#[test]
fn nemesis_levels_only_update_roster_entries() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    assert_eq!(settlement.update_nemesis_levels("butcher", vec![1, 2]).unwrap(), true);
    assert_eq!(
        settlement.document().nemesis_encounters.get("butcher"),
        Some(&vec![1, 2])
    );

    // The hand is a campaign nemesis but not on the starting roster.
    assert_eq!(settlement.update_nemesis_levels("the_hand", vec![1]).unwrap(), false);
    assert!(settlement.document().nemesis_encounters.get("the_hand").is_none());
}

#[test]
fn timeline_add_and_remove_round_trip() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    let event = custom_event(3, "showdown_event", "White Lion Lvl 2");
    assert_eq!(settlement.add_timeline_event(&event).unwrap(), true);
    assert_eq!(settlement.add_timeline_event(&event).unwrap(), false);

    assert_eq!(settlement.rm_timeline_event(&event).unwrap(), true);
    assert!(matches!(
        settlement.rm_timeline_event(&event),
        Err(SettlementError::TimelineConsistency(_))
    ));
}

#[test]
fn timeline_rejects_years_outside_the_template() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    let event = custom_event(99, "story_event", "Beyond the Lantern");
    assert!(matches!(
        settlement.add_timeline_event(&event),
        Err(SettlementError::TimelineConsistency(_))
    ));
}

#[test]
fn expansion_add_and_remove_are_symmetric_at_year_zero() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    let baseline = settlement.document().timeline.clone();

    settlement.add_expansions(&["gorm".to_string()]).unwrap();
    let year_1 = &settlement.document().timeline[1];
    assert!(year_1.events["story_event"]
        .iter()
        .any(|record| record.handle.as_deref() == Some("gorm_approaching_storm")));
    assert!(settlement.document().expansions.contains(&"gorm".to_string()));

    settlement.rm_expansions(&["gorm".to_string()]).unwrap();
    assert_eq!(settlement.document().timeline, baseline);
    assert!(!settlement.document().expansions.contains(&"gorm".to_string()));
}

#[test]
fn expansion_pruning_ignores_unknown_and_duplicate_handles() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    assert_eq!(
        settlement.add_expansions(&["not_an_expansion".to_string()]).unwrap(),
        false
    );
    settlement.add_expansions(&["gorm".to_string()]).unwrap();
    assert_eq!(settlement.add_expansions(&["gorm".to_string()]).unwrap(), false);
}

#[test]
fn min_survival_limit_counts_innovations_and_principles() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    settlement.add_innovation("language").unwrap();
    settlement.set_principle("death", Some("cannibalize")).unwrap();
    assert_eq!(settlement.min_survival_limit(), 2);

    settlement.enforce_minimums();
    assert_eq!(settlement.document().survival_limit, 2);
}

#[test]
fn survival_actions_follow_innovations() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");

    let actions = settlement.survival_actions().unwrap();
    let available: Vec<&str> = actions
        .iter()
        .filter(|action| action.available)
        .map(|action| action.handle.as_str())
        .collect();
    assert_eq!(available, vec!["dodge"]);

    settlement.add_innovation("language").unwrap();
    let actions = settlement.survival_actions().unwrap();
    assert!(actions
        .iter()
        .any(|action| action.handle == "encourage" && action.available));
}

#[test]
fn monster_options_exclude_sheet_and_forbidden_entries() {
    let content = GameContent::core();
    let settlement = new_settlement(&content, "the_bloom_people");

    let quarries = settlement.monster_options("quarries").unwrap();
    let handles: Vec<&str> = quarries.iter().map(|m| m.handle.as_str()).collect();
    // Already on the sheet.
    assert!(!handles.contains(&"white_lion"));
    // Forbidden by the campaign even though its expansion is active.
    assert!(!handles.contains(&"flower_knight"));
    assert!(handles.contains(&"screaming_antelope"));
}

#[test]
fn serialize_exposes_minimums_and_decks() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    settlement.add_innovation("language").unwrap();

    let view = settlement.serialize().unwrap();
    assert_eq!(view["sheet"]["minimum_survival_limit"], json!(1));
    assert_eq!(view["sheet"]["enforce_survival_limit"], json!(true));
    assert!(view["game_assets"]["innovation_deck"]
        .as_array()
        .map_or(false, |deck| !deck.is_empty()));
    assert_eq!(view["game_assets"]["campaign"]["handle"], json!("people_of_the_lantern"));
}

#[test]
fn manhunter_suspends_survival_limit_enforcement() {
    let content = GameContent::core();
    let mut settlement = new_settlement(&content, "people_of_the_lantern");
    assert!(settlement.enforce_survival_limit());
    settlement.add_expansions(&["manhunter".to_string()]).unwrap();
    assert!(!settlement.enforce_survival_limit());
}
