use contracts::{NewSettlement, TimelineEvent};
use proptest::prelude::*;
use settlement_core::{GameContent, Settlement};

const CAMPAIGNS: &[&str] = &[
    "people_of_the_lantern",
    "the_bloom_people",
    "people_of_the_sun",
    "people_of_the_stars",
];

const EXPANSIONS: &[&str] = &[
    "gorm",
    "dung_beetle_knight",
    "flower_knight",
    "lion_knight",
    "manhunter",
    "sunstalker",
    "dragon_king",
    "green_knight_armor",
];

const PRINCIPLE_GROUPS: &[(&str, &[&str])] = &[
    ("new_life", &["protect_the_young", "survival_of_the_fittest"]),
    ("death", &["graves", "cannibalize"]),
    ("society", &["collective_toil", "accept_darkness"]),
    ("conviction", &["barbaric", "romantic"]),
];

fn new_settlement<'c>(content: &'c GameContent, campaign: &str) -> Settlement<'c> {
    let request = NewSettlement {
        campaign: campaign.to_string(),
        name: Some("Property Hold".to_string()),
        ..NewSettlement::default()
    };
    Settlement::create(content, "stl_prop", &request).expect("settlement creates")
}

fn custom_event(ly: u64, name_index: u8) -> TimelineEvent {
    TimelineEvent {
        ly,
        kind: "showdown_event".to_string(),
        handle: None,
        name: Some(format!("Custom Showdown {name_index}")),
        excluded_campaign: None,
    }
}

proptest! {
    #[test]
    fn timeline_years_stay_unique_and_ascending(
        campaign_index in 0_usize..CAMPAIGNS.len(),
        ops in prop::collection::vec((0_u64..41, 0_u8..6, prop::bool::ANY), 0..40),
    ) {
        let content = GameContent::core();
        let mut settlement = new_settlement(&content, CAMPAIGNS[campaign_index]);

        for (ly, name_index, add) in ops {
            let event = custom_event(ly, name_index);
            if add {
                settlement.add_timeline_event(&event).unwrap();
            } else {
                // Removal of an event that is not scheduled is an error and
                // must leave the timeline untouched.
                let _ = settlement.rm_timeline_event(&event);
            }

            let timeline = &settlement.document().timeline;
            prop_assert_eq!(timeline.len(), 41);
            for window in timeline.windows(2) {
                prop_assert!(window[0].year < window[1].year);
            }
        }
    }

    #[test]
    fn principle_groups_hold_at_most_one_election(
        elections in prop::collection::vec(
            (0_usize..PRINCIPLE_GROUPS.len(), prop::option::of(0_usize..2)),
            0..25,
        ),
    ) {
        let content = GameContent::core();
        let mut settlement = new_settlement(&content, "people_of_the_lantern");

        for (group_index, option_index) in elections {
            let (group, options) = PRINCIPLE_GROUPS[group_index];
            let election = option_index.and_then(|i| options.get(i).copied());
            settlement.set_principle(group, election).unwrap();

            for (_, options) in PRINCIPLE_GROUPS {
                let active = options
                    .iter()
                    .filter(|option| {
                        settlement
                            .document()
                            .principles
                            .contains(&option.to_string())
                    })
                    .count();
                prop_assert!(active <= 1);
            }
        }
    }

    #[test]
    fn counters_never_go_negative(
        token_deltas in prop::collection::vec(-5_i64..5, 0..30),
        population_deltas in prop::collection::vec(-5_i64..5, 0..30),
    ) {
        let content = GameContent::core();
        let mut settlement = new_settlement(&content, "people_of_the_lantern");

        for delta in token_deltas {
            settlement.update_endeavor_tokens(delta).unwrap();
            prop_assert!(settlement.document().endeavor_tokens >= 0);
        }
        for delta in population_deltas {
            settlement.update_population(delta).unwrap();
            prop_assert!(settlement.document().population >= 0);
        }
    }

    #[test]
    fn normalization_is_idempotent_for_current_documents(
        campaign_index in 0_usize..CAMPAIGNS.len(),
        expansion_mask in 0_u8..=255,
    ) {
        let content = GameContent::core();
        let mut settlement = new_settlement(&content, CAMPAIGNS[campaign_index]);

        let extra: Vec<String> = EXPANSIONS
            .iter()
            .enumerate()
            .filter(|(i, _)| expansion_mask & (1 << i) != 0)
            .map(|(_, handle)| handle.to_string())
            .collect();
        settlement.add_expansions(&extra).unwrap();

        let raw = serde_json::to_value(settlement.document()).unwrap();
        let reloaded = Settlement::load(&content, raw, Vec::new(), Vec::new()).unwrap();

        // A current-version document passes through untouched.
        prop_assert!(!reloaded.is_dirty());
        prop_assert_eq!(reloaded.document(), settlement.document());
    }
}
