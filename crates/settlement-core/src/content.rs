//! Built-in core-game content set.
//!
//! One constructor per content family, assembled by [`GameContent::core`].
//! Campaign timelines run lantern year 0 through 40; years with no scheduled
//! events still get an empty bucket so the timeline is dense and ordered.

use std::collections::BTreeMap;

use contracts::{
    AssetDef, AvailableIf, CampaignDef, EventRecord, ExpansionDef, MilestoneDef,
    PrincipleGroupDef, SheetInit, SpecialDef, StorageGrant, SurvivorTemplate, TimelineEvent,
    YearEntry,
};
use serde_json::json;

use crate::catalog::{AssetLibrary, GameContent};

const BASE_GAME_QUARRIES: &[&str] = &["white_lion", "screaming_antelope", "phoenix"];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn asset(handle: &str, name: &str, kind: &str) -> AssetDef {
    AssetDef {
        handle: handle.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        ..AssetDef::default()
    }
}

fn deltas(values: &[(&str, i64)]) -> BTreeMap<String, i64> {
    values
        .iter()
        .map(|(attribute, delta)| (attribute.to_string(), *delta))
        .collect()
}

fn year(y: u64) -> YearEntry {
    YearEntry::new(y)
}

fn year_with_handle(y: u64, tag: &str, handle: &str) -> YearEntry {
    let mut entry = YearEntry::new(y);
    entry
        .events
        .insert(tag.to_string(), vec![EventRecord::from_handle(handle)]);
    entry
}

fn year_with_name(y: u64, tag: &str, name: &str) -> YearEntry {
    let mut entry = YearEntry::new(y);
    entry
        .events
        .insert(tag.to_string(), vec![EventRecord::from_name(name)]);
    entry
}

fn timeline_add(
    ly: u64,
    kind: &str,
    handle: &str,
    name: &str,
    excluded_campaign: Option<&str>,
) -> TimelineEvent {
    TimelineEvent {
        ly,
        kind: kind.to_string(),
        handle: Some(handle.to_string()),
        name: Some(name.to_string()),
        excluded_campaign: excluded_campaign.map(str::to_string),
    }
}

fn default_timeline() -> Vec<YearEntry> {
    let mut timeline = vec![
        year_with_handle(0, "settlement_event", "core_first_day"),
        year_with_handle(1, "story_event", "core_returning_survivors"),
        year_with_handle(2, "story_event", "core_endless_screams"),
        year(3),
        year_with_name(4, "nemesis_encounter", "Nemesis Encounter: Butcher"),
        year_with_handle(5, "story_event", "core_hands_of_heat"),
        year_with_handle(6, "story_event", "core_armored_strangers"),
        year_with_handle(7, "story_event", "core_phoenix_feather"),
        year(8),
        year_with_name(9, "nemesis_encounter", "Nemesis Encounter: King's Man"),
        year(10),
        year_with_handle(11, "story_event", "core_regal_visit"),
        year_with_handle(12, "story_event", "core_conviction"),
        year(13),
        year(14),
        year(15),
        year_with_name(16, "nemesis_encounter", "Nemesis Encounter"),
        year(17),
        year(18),
        year_with_name(19, "nemesis_encounter", "Nemesis Encounter"),
        year_with_handle(20, "story_event", "core_watched"),
        year(21),
        year(22),
        year_with_name(23, "nemesis_encounter", "Nemesis Encounter: Level 3"),
        year(24),
        year(25),
        year_with_name(26, "nemesis_encounter", "Nemesis Encounter: Watcher"),
    ];
    timeline.extend((27..=40).map(year));
    timeline
}

fn sun_timeline() -> Vec<YearEntry> {
    let mut timeline = vec![
        year_with_handle(0, "settlement_event", "core_first_day"),
        year_with_handle(1, "story_event", "ss_pool_and_sun"),
        year_with_handle(2, "story_event", "core_endless_screams"),
        year(3),
        year_with_handle(4, "story_event", "ss_sun_dipping"),
        year_with_handle(5, "story_event", "ss_great_sky_gift"),
        year(6),
        year_with_handle(7, "story_event", "core_phoenix_feather"),
        year(8),
        year(9),
        year_with_handle(10, "story_event", "ss_birth_of_color"),
        year_with_handle(11, "story_event", "core_conviction"),
        year_with_handle(12, "story_event", "ss_sun_dipping"),
        year_with_handle(13, "story_event", "ss_great_sky_gift"),
        year(14),
        year(15),
        year(16),
        year(17),
        year(18),
        year_with_handle(19, "story_event", "ss_sun_dipping"),
        year_with_handle(20, "story_event", "ss_final_gift"),
        year_with_name(21, "nemesis_encounter", "Nemesis Encounter: Kings Man Level 2"),
        year_with_name(22, "nemesis_encounter", "Nemesis Encounter: Butcher Level 3"),
        year_with_name(23, "nemesis_encounter", "Nemesis Encounter: Kings Man Level 3"),
        year_with_name(24, "nemesis_encounter", "Nemesis Encounter: The Hand Level 3"),
        year_with_handle(25, "story_event", "ss_great_devourer"),
    ];
    timeline.extend((26..=40).map(year));
    timeline
}

fn stars_timeline() -> Vec<YearEntry> {
    let mut timeline = vec![
        year_with_handle(0, "settlement_event", "core_first_day"),
        year_with_handle(1, "story_event", "dk_foundlings"),
        year_with_handle(2, "story_event", "core_endless_screams"),
        year(3),
        year_with_name(4, "nemesis_encounter", "Nemesis Encounter - Dragon King Human Lvl 1"),
        year_with_handle(5, "story_event", "dk_midnights_children"),
        year(6),
        year_with_handle(7, "story_event", "core_phoenix_feather"),
        year(8),
        year_with_name(9, "nemesis_encounter", "Nemesis Encounter - Dragon King Human Lvl 2"),
        year_with_handle(10, "story_event", "dk_unveil_the_sky"),
        year(11),
        year_with_handle(12, "story_event", "core_conviction"),
        year_with_name(13, "nemesis_encounter", "Nemesis Encounter - Butcher Lvl 2"),
        year(14),
        year(15),
        year_with_name(16, "nemesis_encounter", "Nemesis Encounter - Lvl 2"),
        year(17),
        year(18),
        year_with_name(19, "nemesis_encounter", "Nemesis Encounter - Dragon King Human Lvl 3"),
        year_with_handle(20, "story_event", "dk_tomb"),
        year(21),
        year(22),
        year_with_name(23, "nemesis_encounter", "Nemesis Encounter - Lvl 3"),
        year(24),
        year_with_handle(25, "nemesis_encounter", "dk_death_of_the_dragon_king"),
    ];
    timeline.extend((26..=40).map(year));
    timeline
}

fn events() -> Vec<AssetDef> {
    let story = |handle: &str, name: &str| asset(handle, name, "story_event");
    let settlement = |handle: &str, name: &str| asset(handle, name, "settlement_event");
    vec![
        settlement("core_first_day", "First Day"),
        story("core_returning_survivors", "Returning Survivors"),
        story("core_endless_screams", "Endless Screams"),
        story("core_hands_of_heat", "Hands of Heat"),
        story("core_armored_strangers", "Armored Strangers"),
        story("core_phoenix_feather", "Phoenix Feather"),
        story("core_regal_visit", "Regal Visit"),
        story("core_conviction", "Principle: Conviction"),
        story("core_watched", "Watched"),
        story("core_new_life", "Principle: New Life"),
        story("core_death", "Principle: Death"),
        story("core_society", "Principle: Society"),
        story("core_hooded_knight", "Hooded Knight"),
        story("core_game_over", "Game Over"),
        story("core_age", "Age"),
        story("core_bold", "Bold"),
        story("core_insight", "Insight"),
        story("core_see_the_truth", "See the Truth"),
        story("core_white_secret", "White Secret"),
        story("ss_pool_and_sun", "The Pool and the Sun"),
        story("ss_sun_dipping", "Sun Dipping"),
        story("ss_great_sky_gift", "The Great Sky Gift"),
        story("ss_birth_of_color", "Birth of Color"),
        story("ss_final_gift", "The Final Gift"),
        story("ss_great_devourer", "The Great Devourer"),
        story("ss_edged_tonometry", "Edged Tonometry"),
        story("ss_promise_under_the_sun", "Promise Under the Sun"),
        story("dk_foundlings", "Foundlings"),
        story("dk_midnights_children", "Midnight's Children"),
        story("dk_unveil_the_sky", "Unveil the Sky"),
        story("dk_tomb", "The Tomb"),
        story("dk_awake", "Awake"),
        story("dk_death_of_the_dragon_king", "Death of the Dragon King"),
        story("dk_glowing_crater", "Glowing Crater"),
        story("gorm_approaching_storm", "The Approaching Storm"),
        story("dbk_rumbling_in_the_dark", "Rumbling in the Dark"),
        story("fk_crones_tale", "A Crone's Tale"),
        story("mh_the_hanged_man", "The Hanged Man"),
        story("lk_uninvited_guest", "An Uninvited Guest"),
        story("lk_places_everyone", "Places, Everyone!"),
    ]
}

fn innovations() -> Vec<AssetDef> {
    let mut language = asset("language", "Language", "innovation");
    language.consequences = strings(&["ammonia", "drums", "hovel", "inner_lantern", "paint", "symposium"]);
    language.survival_limit = 1;
    language.survival_action = Some("encourage".to_string());

    let mut ammonia = asset("ammonia", "Ammonia", "innovation");
    ammonia.consequences = strings(&["bloodletting", "lantern_oven"]);

    let bloodletting = asset("bloodletting", "Bloodletting", "innovation");

    let mut drums = asset("drums", "Drums", "innovation");
    drums.consequences = strings(&["song_of_the_brave", "forbidden_dance"]);

    let song_of_the_brave = asset("song_of_the_brave", "Song of the Brave", "innovation");
    let forbidden_dance = asset("forbidden_dance", "Forbidden Dance", "innovation");

    let mut hovel = asset("hovel", "Hovel", "innovation");
    hovel.consequences = strings(&["partnership", "family", "bed", "shadow_dancing"]);
    hovel.survival_limit = 1;

    let partnership = asset("partnership", "Partnership", "innovation");
    let mut family = asset("family", "Family", "innovation");
    family.survival_limit = 1;
    let bed = asset("bed", "Bed", "innovation");
    let shadow_dancing = asset("shadow_dancing", "Shadow Dancing", "innovation");

    let mut inner_lantern = asset("inner_lantern", "Inner Lantern", "innovation");
    inner_lantern.consequences = strings(&["shrine", "scarification"]);
    inner_lantern.survival_action = Some("surge".to_string());

    let shrine = asset("shrine", "Shrine", "innovation");
    let scarification = asset("scarification", "Scarification", "innovation");

    let mut paint = asset("paint", "Paint", "innovation");
    paint.consequences = strings(&["pictograph", "sculpture", "face_painting"]);
    paint.survival_action = Some("dash".to_string());

    let pictograph = asset("pictograph", "Pictograph", "innovation");
    let sculpture = asset("sculpture", "Sculpture", "innovation");
    let face_painting = asset("face_painting", "Face Painting", "innovation");

    let mut symposium = asset("symposium", "Symposium", "innovation");
    symposium.consequences = strings(&["collective_toil", "storytelling"]);
    symposium.survival_limit = 1;

    let mut storytelling = asset("storytelling", "Storytelling", "innovation");
    storytelling.survival_limit = 1;

    let mut lantern_oven = asset("lantern_oven", "Lantern Oven", "innovation");
    lantern_oven.consequences = strings(&["cooking", "scrap_smelting"]);

    let cooking = asset("cooking", "Cooking", "innovation");
    let scrap_smelting = asset("scrap_smelting", "Scrap Smelting", "innovation");

    let mut leader = asset("leader", "Leader", "innovation");
    leader.survival_limit = 1;

    let mut clan_of_death = asset("clan_of_death", "Clan of Death", "innovation");
    clan_of_death.available_if = vec![AvailableIf {
        handle: "family".to_string(),
        collection: "innovations".to_string(),
    }];

    let mut sun_language = asset("sun_language", "Sun Language", "innovation");
    sun_language.consequences =
        strings(&["ammonia", "drums", "hovel", "paint", "symposium", "umbilical_bank"]);
    sun_language.survival_limit = 1;
    sun_language.survival_action = Some("embolden".to_string());

    let umbilical_bank = asset("umbilical_bank", "Umbilical Bank", "innovation");

    let mut dragon_speech = asset("dragon_speech", "Dragon Speech", "innovation");
    dragon_speech.consequences = strings(&["ammonia", "drums", "hovel", "paint", "symposium"]);
    dragon_speech.survival_limit = 1;
    dragon_speech.survival_action = Some("encourage".to_string());

    let mut radiating_orb = asset("radiating_orb", "Radiating Orb", "innovation");
    radiating_orb.expansion = Some("dragon_king".to_string());

    let mut nigredo = asset("nigredo", "Nigredo", "innovation");
    nigredo.expansion = Some("gorm".to_string());
    nigredo.consequences = strings(&["albedo"]);
    let mut albedo = asset("albedo", "Albedo", "innovation");
    albedo.expansion = Some("gorm".to_string());

    // Principle elections live in the innovations library so level, buff,
    // and survival-limit accounting treats them uniformly.
    let principle = |handle: &str, name: &str| asset(handle, name, "principle");
    let protect_the_young = principle("protect_the_young", "Protect the Young");
    let mut survival_of_the_fittest =
        principle("survival_of_the_fittest", "Survival of the Fittest");
    survival_of_the_fittest.survival_limit = 1;
    let graves = principle("graves", "Graves");
    let mut cannibalize = principle("cannibalize", "Cannibalize");
    cannibalize.survival_limit = 1;
    let collective_toil = principle("collective_toil", "Collective Toil");
    let accept_darkness = principle("accept_darkness", "Accept Darkness");
    let mut barbaric = principle("barbaric", "Barbaric");
    barbaric.current_survivor = deltas(&[("Strength", 1)]);
    let mut romantic = principle("romantic", "Romantic");
    romantic.current_survivor = deltas(&[("Understanding", 1)]);

    vec![
        language,
        ammonia,
        bloodletting,
        drums,
        song_of_the_brave,
        forbidden_dance,
        hovel,
        partnership,
        family,
        bed,
        shadow_dancing,
        inner_lantern,
        shrine,
        scarification,
        paint,
        pictograph,
        sculpture,
        face_painting,
        symposium,
        storytelling,
        lantern_oven,
        cooking,
        scrap_smelting,
        leader,
        clan_of_death,
        sun_language,
        umbilical_bank,
        dragon_speech,
        radiating_orb,
        nigredo,
        albedo,
        protect_the_young,
        survival_of_the_fittest,
        graves,
        cannibalize,
        collective_toil,
        accept_darkness,
        barbaric,
        romantic,
    ]
}

fn locations() -> Vec<AssetDef> {
    let location = |handle: &str, name: &str| asset(handle, name, "location");

    let mut lantern_hoard = location("lantern_hoard", "Lantern Hoard");
    lantern_hoard.settlement_buff =
        Some("Survivors may spend endeavor to trigger Shared Dream.".to_string());

    let mut the_sun = location("the_sun", "The Sun");
    the_sun.expansion = Some("sunstalker".to_string());
    let mut sacred_pool = location("sacred_pool", "Sacred Pool");
    sacred_pool.expansion = Some("sunstalker".to_string());
    sacred_pool.levels = Some(3);
    let mut skyreef_sanctuary = location("skyreef_sanctuary", "Skyreef Sanctuary");
    skyreef_sanctuary.expansion = Some("sunstalker".to_string());

    let mut throne = location("throne", "Throne");
    throne.expansion = Some("dragon_king".to_string());
    let mut dragon_armory = location("dragon_armory", "Dragon Armory");
    dragon_armory.expansion = Some("dragon_king".to_string());

    let mut gormery = location("gormery", "Gormery");
    gormery.expansion = Some("gorm".to_string());
    let mut gormchymist = location("gormchymist", "Gormchymist");
    gormchymist.expansion = Some("gorm".to_string());
    gormchymist.levels = Some(5);

    let mut wet_resin_crafter = location("wet_resin_crafter", "Wet Resin Crafter");
    wet_resin_crafter.expansion = Some("dung_beetle_knight".to_string());

    vec![
        lantern_hoard,
        location("bone_smith", "Bone Smith"),
        location("skinnery", "Skinnery"),
        location("organ_grinder", "Organ Grinder"),
        location("stone_circle", "Stone Circle"),
        location("leather_worker", "Leather Worker"),
        location("weapon_crafter", "Weapon Crafter"),
        location("barber_surgeon", "Barber Surgeon"),
        location("plumery", "Plumery"),
        location("mask_maker", "Mask Maker"),
        the_sun,
        sacred_pool,
        skyreef_sanctuary,
        throne,
        dragon_armory,
        gormery,
        gormchymist,
        wet_resin_crafter,
    ]
}

fn monsters() -> Vec<AssetDef> {
    let quarry = |handle: &str, name: &str| asset(handle, name, "quarry");
    let nemesis = |handle: &str, name: &str| asset(handle, name, "nemesis");

    let mut gorm = quarry("gorm", "Gorm");
    gorm.expansion = Some("gorm".to_string());
    let mut dung_beetle_knight = quarry("dung_beetle_knight", "Dung Beetle Knight");
    dung_beetle_knight.expansion = Some("dung_beetle_knight".to_string());
    let mut sunstalker = quarry("sunstalker", "Sunstalker");
    sunstalker.expansion = Some("sunstalker".to_string());
    let mut dragon_king = quarry("dragon_king", "Dragon King");
    dragon_king.expansion = Some("dragon_king".to_string());
    let mut flower_knight = quarry("flower_knight", "Flower Knight");
    flower_knight.expansion = Some("flower_knight".to_string());
    let mut lion_knight = nemesis("lion_knight", "Lion Knight");
    lion_knight.expansion = Some("lion_knight".to_string());
    let mut manhunter = nemesis("manhunter", "Manhunter");
    manhunter.expansion = Some("manhunter".to_string());
    let mut the_tyrant = nemesis("the_tyrant", "The Tyrant");
    the_tyrant.expansion = Some("dragon_king".to_string());
    let mut ancient_sunstalker = nemesis("ancient_sunstalker", "Ancient Sunstalker");
    ancient_sunstalker.expansion = Some("sunstalker".to_string());
    ancient_sunstalker.sub_type = Some("final_boss".to_string());
    let mut dragon_king_lv3 = nemesis("dragon_king_lv3", "Dragon King (Nemesis)");
    dragon_king_lv3.expansion = Some("dragon_king".to_string());
    dragon_king_lv3.sub_type = Some("final_boss".to_string());
    let mut watcher = nemesis("watcher", "Watcher");
    watcher.sub_type = Some("final_boss".to_string());

    vec![
        quarry("white_lion", "White Lion"),
        quarry("screaming_antelope", "Screaming Antelope"),
        quarry("phoenix", "Phoenix"),
        nemesis("butcher", "Butcher"),
        nemesis("kings_man", "King's Man"),
        nemesis("the_hand", "The Hand"),
        watcher,
        gorm,
        dung_beetle_knight,
        sunstalker,
        dragon_king,
        flower_knight,
        lion_knight,
        manhunter,
        the_tyrant,
        ancient_sunstalker,
        dragon_king_lv3,
    ]
}

fn survival_actions() -> Vec<AssetDef> {
    vec![
        asset("dodge", "Dodge", "survival_action"),
        asset("encourage", "Encourage", "survival_action"),
        asset("dash", "Dash", "survival_action"),
        asset("surge", "Surge", "survival_action"),
        asset("overcharge", "Overcharge", "survival_action"),
        asset("embolden", "Embolden", "survival_action"),
    ]
}

fn expansions() -> BTreeMap<String, ExpansionDef> {
    let base = |handle: &str, name: &str| ExpansionDef {
        handle: handle.to_string(),
        name: name.to_string(),
        timeline_add: Vec::new(),
        timeline_rm: Vec::new(),
        rm_nemesis_monsters: Vec::new(),
        quarries: Vec::new(),
        nemesis_monsters: Vec::new(),
        special_showdowns: Vec::new(),
        enforce_survival_limit: true,
    };

    let mut gorm = base("gorm", "Gorm");
    gorm.quarries = strings(&["gorm"]);
    gorm.timeline_add = vec![timeline_add(
        1,
        "story_event",
        "gorm_approaching_storm",
        "The Approaching Storm",
        None,
    )];

    let mut dung_beetle_knight = base("dung_beetle_knight", "Dung Beetle Knight");
    dung_beetle_knight.quarries = strings(&["dung_beetle_knight"]);
    dung_beetle_knight.timeline_add = vec![timeline_add(
        8,
        "story_event",
        "dbk_rumbling_in_the_dark",
        "Rumbling in the Dark",
        None,
    )];

    let mut flower_knight = base("flower_knight", "Flower Knight");
    flower_knight.quarries = strings(&["flower_knight"]);
    flower_knight.timeline_add = vec![timeline_add(
        5,
        "story_event",
        "fk_crones_tale",
        "A Crone's Tale",
        None,
    )];

    let mut lion_knight = base("lion_knight", "Lion Knight");
    lion_knight.nemesis_monsters = strings(&["lion_knight"]);
    lion_knight.special_showdowns = strings(&["lion_knight"]);
    lion_knight.timeline_add = vec![
        timeline_add(6, "story_event", "lk_uninvited_guest", "An Uninvited Guest", None),
        timeline_add(8, "story_event", "lk_places_everyone", "Places, Everyone!", None),
        timeline_add(12, "story_event", "lk_places_everyone", "Places, Everyone!", None),
        timeline_add(16, "story_event", "lk_places_everyone", "Places, Everyone!", None),
    ];

    let mut manhunter = base("manhunter", "Manhunter");
    manhunter.nemesis_monsters = strings(&["manhunter"]);
    manhunter.special_showdowns = strings(&["manhunter"]);
    manhunter.enforce_survival_limit = false;
    manhunter.timeline_add = vec![timeline_add(
        5,
        "story_event",
        "mh_the_hanged_man",
        "The Hanged Man",
        None,
    )];

    let mut sunstalker = base("sunstalker", "Sunstalker");
    sunstalker.quarries = strings(&["sunstalker"]);
    sunstalker.special_showdowns = strings(&["ancient_sunstalker"]);
    sunstalker.timeline_add = vec![timeline_add(
        8,
        "story_event",
        "ss_promise_under_the_sun",
        "Promise Under the Sun",
        Some("people_of_the_sun"),
    )];

    let mut dragon_king = base("dragon_king", "Dragon King");
    dragon_king.quarries = strings(&["dragon_king"]);
    dragon_king.nemesis_monsters = strings(&["the_tyrant"]);
    dragon_king.special_showdowns = strings(&["the_tyrant", "dragon_king_lv3"]);
    dragon_king.rm_nemesis_monsters = strings(&["kings_man"]);
    dragon_king.timeline_add = vec![timeline_add(
        8,
        "story_event",
        "dk_glowing_crater",
        "Glowing Crater",
        Some("people_of_the_stars"),
    )];

    let green_knight_armor = base("green_knight_armor", "Green Knight Armor");

    [
        gorm,
        dung_beetle_knight,
        flower_knight,
        lion_knight,
        manhunter,
        sunstalker,
        dragon_king,
        green_knight_armor,
    ]
    .into_iter()
    .map(|expansion| (expansion.handle.clone(), expansion))
    .collect()
}

fn milestones() -> BTreeMap<String, MilestoneDef> {
    let milestone = |handle: &str, name: &str, sort_order: i64, story: &str, story_handle: &str| {
        MilestoneDef {
            handle: handle.to_string(),
            name: name.to_string(),
            sort_order,
            story_event: story.to_string(),
            story_event_handle: story_handle.to_string(),
        }
    };

    [
        milestone("first_child", "First child is born", 0, "Principle: New Life", "core_new_life"),
        milestone(
            "first_death",
            "First time death count is updated",
            1,
            "Principle: Death",
            "core_death",
        ),
        milestone("pop_15", "Population reaches 15", 2, "Principle: Society", "core_society"),
        milestone(
            "innovations_5",
            "Settlement has 5 innovations",
            3,
            "Hooded Knight",
            "core_hooded_knight",
        ),
        milestone(
            "innovations_8",
            "Settlement has 8 innovations",
            2,
            "Edged Tonometry",
            "ss_edged_tonometry",
        ),
        milestone(
            "nemesis_defeat",
            "Not Victorious against Nemesis",
            6,
            "Game Over",
            "core_game_over",
        ),
        milestone("game_over", "Population reaches 0", 10, "Game Over", "core_game_over"),
    ]
    .into_iter()
    .map(|milestone| (milestone.handle.clone(), milestone))
    .collect()
}

fn principles() -> BTreeMap<String, PrincipleGroupDef> {
    let group = |handle: &str, name: &str, sort_order: i64, options: &[&str]| PrincipleGroupDef {
        handle: handle.to_string(),
        name: name.to_string(),
        sort_order,
        option_handles: strings(options),
    };

    [
        group("new_life", "New Life", 0, &["protect_the_young", "survival_of_the_fittest"]),
        group("potsun_new_life", "New Life (People of the Sun)", 0, &["survival_of_the_fittest"]),
        group("death", "Death", 1, &["graves", "cannibalize"]),
        group("society", "Society", 2, &["collective_toil", "accept_darkness"]),
        group("conviction", "Conviction", 3, &["barbaric", "romantic"]),
    ]
    .into_iter()
    .map(|group| (group.handle.clone(), group))
    .collect()
}

fn campaigns() -> BTreeMap<String, CampaignDef> {
    let mut lantern = CampaignDef {
        handle: "people_of_the_lantern".to_string(),
        name: "People of the Lantern".to_string(),
        subtitle: None,
        default: true,
        timeline: default_timeline(),
        principles: strings(&["new_life", "death", "society", "conviction"]),
        milestones: strings(&["first_child", "first_death", "pop_15", "innovations_5", "game_over"]),
        survival_actions: strings(&["dodge", "encourage", "dash", "surge"]),
        nemesis_monsters: strings(&["butcher", "kings_man", "the_hand"]),
        quarries: strings(BASE_GAME_QUARRIES),
        special_showdowns: strings(&["watcher"]),
        always_available: BTreeMap::new(),
        forbidden: BTreeMap::new(),
        settlement_sheet_init: SheetInit {
            quarries: strings(&["white_lion"]),
            nemesis_monsters: strings(&["butcher"]),
            nemesis_encounters: [("butcher".to_string(), Vec::new())].into_iter().collect(),
            expansions: Vec::new(),
            storage: Vec::new(),
        },
        survivor_attribute_milestones: default_attribute_milestones(),
    };
    lantern
        .always_available
        .insert("location".to_string(), strings(&["Lantern Hoard"]));
    lantern
        .always_available
        .insert("innovation".to_string(), strings(&["Language"]));
    lantern
        .forbidden
        .insert("location".to_string(), strings(&["The Sun", "Throne"]));
    lantern.forbidden.insert(
        "innovation".to_string(),
        strings(&["Sun Language", "Dragon Speech", "Radiating Orb"]),
    );

    let mut bloom = lantern.clone();
    bloom.handle = "the_bloom_people".to_string();
    bloom.name = "The Bloom People".to_string();
    bloom.default = false;
    bloom.forbidden = BTreeMap::new();
    bloom
        .forbidden
        .insert("quarries".to_string(), strings(&["flower_knight"]));
    bloom.settlement_sheet_init = SheetInit {
        quarries: strings(&["white_lion"]),
        nemesis_monsters: strings(&["butcher"]),
        nemesis_encounters: [("butcher".to_string(), Vec::new())].into_iter().collect(),
        expansions: strings(&["flower_knight"]),
        storage: strings(&["Sleeping Virus Flower"]),
    };

    let mut sun = CampaignDef {
        handle: "people_of_the_sun".to_string(),
        name: "People of the Sun".to_string(),
        subtitle: None,
        default: false,
        timeline: sun_timeline(),
        principles: strings(&["potsun_new_life", "death", "society", "conviction"]),
        milestones: strings(&[
            "first_child",
            "first_death",
            "pop_15",
            "innovations_8",
            "nemesis_defeat",
            "game_over",
        ]),
        survival_actions: strings(&["dodge", "overcharge", "embolden"]),
        nemesis_monsters: strings(&["butcher", "kings_man", "the_hand"]),
        quarries: strings(BASE_GAME_QUARRIES),
        special_showdowns: strings(&["ancient_sunstalker"]),
        always_available: BTreeMap::new(),
        forbidden: BTreeMap::new(),
        settlement_sheet_init: SheetInit {
            quarries: strings(&["white_lion"]),
            nemesis_monsters: strings(&["butcher"]),
            nemesis_encounters: [("butcher".to_string(), Vec::new())].into_iter().collect(),
            expansions: strings(&["sunstalker"]),
            storage: Vec::new(),
        },
        survivor_attribute_milestones: default_attribute_milestones(),
    };
    sun.always_available
        .insert("location".to_string(), strings(&["The Sun", "Sacred Pool"]));
    sun.always_available
        .insert("innovation".to_string(), strings(&["Sun Language", "Umbilical Bank"]));
    sun.forbidden
        .insert("location".to_string(), strings(&["Lantern Hoard"]));
    sun.forbidden
        .insert("innovation".to_string(), strings(&["Leader", "Language"]));

    let mut stars = CampaignDef {
        handle: "people_of_the_stars".to_string(),
        name: "People of the Stars".to_string(),
        subtitle: None,
        default: false,
        timeline: stars_timeline(),
        principles: strings(&["new_life", "death", "society", "conviction"]),
        milestones: strings(&["first_child", "first_death", "pop_15", "game_over"]),
        survival_actions: strings(&["dodge", "encourage", "dash", "surge"]),
        nemesis_monsters: strings(&["butcher", "kings_man", "the_hand"]),
        quarries: strings(BASE_GAME_QUARRIES),
        special_showdowns: strings(&["the_tyrant", "dragon_king_lv3"]),
        always_available: BTreeMap::new(),
        forbidden: BTreeMap::new(),
        settlement_sheet_init: SheetInit {
            quarries: strings(&["white_lion"]),
            nemesis_monsters: strings(&["butcher", "kings_man", "the_hand"]),
            nemesis_encounters: [
                ("butcher".to_string(), vec![1]),
                ("kings_man".to_string(), vec![1]),
                ("the_hand".to_string(), vec![1]),
            ]
            .into_iter()
            .collect(),
            expansions: strings(&["dragon_king"]),
            storage: Vec::new(),
        },
        survivor_attribute_milestones: stars_attribute_milestones(),
    };
    stars
        .always_available
        .insert("location".to_string(), strings(&["Throne"]));
    stars
        .always_available
        .insert("innovation".to_string(), strings(&["Dragon Speech", "Radiating Orb"]));
    stars.forbidden.insert(
        "location".to_string(),
        strings(&["Lantern Hoard", "Dragon Armory"]),
    );
    stars.forbidden.insert(
        "innovation".to_string(),
        strings(&["Language", "Lantern Oven", "Clan of Death", "Family"]),
    );

    [lantern, bloom, sun, stars]
        .into_iter()
        .map(|campaign| (campaign.handle.clone(), campaign))
        .collect()
}

fn default_attribute_milestones() -> serde_json::Value {
    json!({
        "hunt_xp": [{"values": [2, 6, 10, 15], "handle": "core_age"}],
        "Courage": [
            {"values": [3], "handle": "core_bold"},
            {"values": [9], "handle": "core_see_the_truth"},
        ],
        "Understanding": [
            {"values": [3], "handle": "core_insight"},
            {"values": [9], "handle": "core_white_secret"},
        ],
    })
}

fn stars_attribute_milestones() -> serde_json::Value {
    json!({
        "hunt_xp": [{"values": [2, 6, 10, 15], "handle": "core_age"}],
        "Courage": [
            {"values": [3], "handle": "dk_awake"},
            {"values": [9], "handle": "core_see_the_truth"},
        ],
        "Understanding": [
            {"values": [3], "handle": "dk_awake"},
            {"values": [9], "handle": "core_white_secret"},
        ],
    })
}

fn specials() -> BTreeMap<String, SpecialDef> {
    let first_story = SpecialDef {
        handle: "create_first_story".to_string(),
        name: "First Story".to_string(),
        random_survivors: vec![
            founder("M"),
            founder("M"),
            founder("F"),
            founder("F"),
        ],
        storage: vec![
            StorageGrant { name: "Founding Stone".to_string(), quantity: 4 },
            StorageGrant { name: "Cloth".to_string(), quantity: 4 },
        ],
        current_quarry: Some("white_lion".to_string()),
        timeline_events: Vec::new(),
    };

    [(first_story.handle.clone(), first_story)].into_iter().collect()
}

fn founder(sex: &str) -> SurvivorTemplate {
    SurvivorTemplate {
        name: None,
        sex: sex.to_string(),
        attributes: BTreeMap::new(),
        storage: Vec::new(),
    }
}

fn survivor_templates() -> BTreeMap<String, SurvivorTemplate> {
    let named = |name: &str, sex: &str| SurvivorTemplate {
        name: Some(name.to_string()),
        sex: sex.to_string(),
        attributes: BTreeMap::new(),
        storage: Vec::new(),
    };

    [
        ("adam".to_string(), named("Adam", "M")),
        ("anna".to_string(), named("Anna", "F")),
        ("lucy".to_string(), named("Lucy", "F")),
        ("zachary".to_string(), named("Zachary", "M")),
    ]
    .into_iter()
    .collect()
}

impl GameContent {
    /// The core-game content set: four campaigns, the standard timeline
    /// templates, and the innovation, location, monster, event, and
    /// survival-action libraries they reference.
    pub fn core() -> Self {
        Self {
            campaigns: campaigns(),
            expansions: expansions(),
            innovations: AssetLibrary::new(innovations()),
            locations: AssetLibrary::new(locations()),
            monsters: AssetLibrary::new(monsters()),
            events: AssetLibrary::new(events()),
            survival_actions: AssetLibrary::new(survival_actions()),
            milestones: milestones(),
            principles: principles(),
            specials: specials(),
            survivor_templates: survivor_templates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetCatalog;

    #[test]
    fn core_content_is_internally_consistent() {
        let content = GameContent::core();

        for campaign in content.campaigns.values() {
            for handle in &campaign.principles {
                assert!(content.principles.contains_key(handle), "principle group {handle}");
            }
            for handle in &campaign.milestones {
                assert!(content.milestones.contains_key(handle), "milestone {handle}");
            }
            for handle in &campaign.nemesis_monsters {
                assert!(content.monsters.get_asset(handle).is_some(), "nemesis {handle}");
            }
            for handle in &campaign.quarries {
                assert!(content.monsters.get_asset(handle).is_some(), "quarry {handle}");
            }
            for handle in &campaign.settlement_sheet_init.expansions {
                assert!(content.expansions.contains_key(handle), "sheet expansion {handle}");
            }
        }

        for group in content.principles.values() {
            for option in &group.option_handles {
                let asset = content.innovations.get_asset(option);
                assert_eq!(asset.map(|a| a.kind.as_str()), Some("principle"), "option {option}");
            }
        }

        for expansion in content.expansions.values() {
            for event in &expansion.timeline_add {
                let handle = event.handle.as_deref().unwrap_or_default();
                assert!(content.events.get_asset(handle).is_some(), "timeline event {handle}");
            }
        }
    }

    #[test]
    fn default_timeline_is_dense_and_sorted() {
        let content = GameContent::core();
        let campaign = content.campaign("people_of_the_lantern").unwrap();
        assert_eq!(campaign.timeline.len(), 41);
        for (index, entry) in campaign.timeline.iter().enumerate() {
            assert_eq!(entry.year as usize, index);
        }
        let butcher = &campaign.timeline[4].events["nemesis_encounter"][0];
        assert_eq!(butcher.name.as_deref(), Some("Nemesis Encounter: Butcher"));
    }

    #[test]
    fn innovation_consequences_resolve() {
        let content = GameContent::core();
        for innovation in content.innovations.iter() {
            for consequence in &innovation.consequences {
                assert!(
                    content.innovations.get_asset(consequence).is_some(),
                    "{} -> {consequence}",
                    innovation.handle
                );
            }
        }
    }
}
