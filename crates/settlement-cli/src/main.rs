use std::env;

use contracts::{NewSettlement, SettlementNote, TimelineEvent};
use settlement_core::{GameContent, Settlement};
use settlement_store::SqliteSettlementStore;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("settlement-cli <command>");
    println!("commands:");
    println!("  list");
    println!("  new <settlement_id> <campaign> [name]");
    println!("  show <settlement_id>");
    println!("  deck <settlement_id>");
    println!("  timeline <settlement_id>");
    println!("  timeline-add <settlement_id> <ly> <type> <name>");
    println!("  timeline-rm <settlement_id> <ly> <type> <name>");
    println!("  add-expansions <settlement_id> <handle> [handle ...]");
    println!("  rm-expansions <settlement_id> <handle> [handle ...]");
    println!("  add-innovation <settlement_id> <handle>");
    println!("  rm-innovation <settlement_id> <handle>");
    println!("  set-principle <settlement_id> <group> [election]");
    println!("  note <settlement_id> <author> <text>");
    println!("  log <settlement_id>");
    println!("  sqlite path comes from SETTLEMENT_SQLITE_PATH when set");
}

fn default_sqlite_path() -> String {
    std::env::var("SETTLEMENT_SQLITE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "settlements.sqlite".to_string())
}

fn require_arg(args: &[String], index: usize, label: &str) -> Result<String, String> {
    args.get(index)
        .cloned()
        .ok_or_else(|| format!("missing {label}"))
}

fn parse_u64(value: Option<&String>, label: &str) -> Result<u64, String> {
    let raw = value.ok_or_else(|| format!("missing {label}"))?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid {label}: {raw}"))
}

fn open_store() -> Result<SqliteSettlementStore, String> {
    let path = default_sqlite_path();
    SqliteSettlementStore::open(&path).map_err(|err| format!("failed to open {path}: {err}"))
}

fn load_settlement<'c>(
    store: &SqliteSettlementStore,
    content: &'c GameContent,
    id: &str,
) -> Result<Settlement<'c>, String> {
    let bundle = store
        .load_bundle(id)
        .map_err(|err| format!("load failed: {err}"))?;
    Settlement::load(content, bundle.raw, bundle.survivors, bundle.notes)
        .map_err(|err| format!("settlement '{id}' did not load: {err}"))
}

fn save_settlement(
    store: &mut SqliteSettlementStore,
    settlement: &mut Settlement<'_>,
) -> Result<(), String> {
    if !settlement.is_dirty() {
        return Ok(());
    }
    store
        .save_bundle(
            settlement.document(),
            settlement.survivors(),
            settlement.notes(),
        )
        .map_err(|err| format!("save failed: {err}"))?;
    settlement.mark_saved();
    Ok(())
}

fn timeline_event_from_args(args: &[String]) -> Result<TimelineEvent, String> {
    let ly = parse_u64(args.get(3), "ly")?;
    let kind = require_arg(args, 4, "event type")?;
    let name = require_arg(args, 5, "event name")?;
    Ok(TimelineEvent {
        ly,
        kind,
        handle: None,
        name: Some(name),
        excluded_campaign: None,
    })
}

fn run(args: &[String]) -> Result<(), String> {
    let command = args.get(1).map(String::as_str);
    let content = GameContent::core();

    match command {
        Some("list") => {
            let store = open_store()?;
            let listing = store
                .list_settlements()
                .map_err(|err| format!("listing failed: {err}"))?;
            if listing.is_empty() {
                println!("no settlements");
            }
            for summary in listing {
                println!(
                    "{} '{}' campaign={} ly={}",
                    summary.id, summary.name, summary.campaign, summary.lantern_year
                );
            }
            Ok(())
        }
        Some("new") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let campaign = require_arg(args, 3, "campaign")?;
            let request = NewSettlement {
                campaign,
                name: args.get(4).cloned(),
                ..NewSettlement::default()
            };
            let mut settlement = Settlement::create(&content, &id, &request)
                .map_err(|err| format!("creation failed: {err}"))?;
            let mut store = open_store()?;
            save_settlement(&mut store, &mut settlement)?;
            println!("created {}", settlement.document());
            Ok(())
        }
        Some("show") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let store = open_store()?;
            let settlement = load_settlement(&store, &content, &id)?;
            let view = settlement
                .serialize()
                .map_err(|err| format!("serialization failed: {err}"))?;
            let pretty = serde_json::to_string_pretty(&view)
                .map_err(|err| format!("serialization failed: {err}"))?;
            println!("{pretty}");
            Ok(())
        }
        Some("deck") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let store = open_store()?;
            let settlement = load_settlement(&store, &content, &id)?;
            for name in settlement.innovation_deck() {
                println!("{name}");
            }
            Ok(())
        }
        Some("timeline") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let store = open_store()?;
            let settlement = load_settlement(&store, &content, &id)?;
            for entry in &settlement.document().timeline {
                for (kind, records) in &entry.events {
                    for record in records {
                        let label = record
                            .name
                            .as_deref()
                            .or(record.handle.as_deref())
                            .unwrap_or("<unnamed>");
                        println!("ly {:>2}  {kind}: {label}", entry.year);
                    }
                }
            }
            Ok(())
        }
        Some("timeline-add") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let event = timeline_event_from_args(args)?;
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let added = settlement
                .add_timeline_event(&event)
                .map_err(|err| format!("timeline update failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!("added={added} {event}");
            Ok(())
        }
        Some("timeline-rm") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let event = timeline_event_from_args(args)?;
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let removed = settlement
                .rm_timeline_event(&event)
                .map_err(|err| format!("timeline update failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!("removed={removed} {event}");
            Ok(())
        }
        Some("add-expansions") | Some("rm-expansions") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let handles: Vec<String> = args[3..].to_vec();
            if handles.is_empty() {
                return Err("missing expansion handles".to_string());
            }
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let changed = if command == Some("add-expansions") {
                settlement.add_expansions(&handles)
            } else {
                settlement.rm_expansions(&handles)
            }
            .map_err(|err| format!("expansion update failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!(
                "changed={changed} expansions={}",
                settlement.document().expansions.join(",")
            );
            Ok(())
        }
        Some("add-innovation") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let handle = require_arg(args, 3, "innovation handle")?;
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let added = settlement
                .add_innovation(&handle)
                .map_err(|err| format!("innovation update failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!("added={added} {handle}");
            Ok(())
        }
        Some("rm-innovation") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let handle = require_arg(args, 3, "innovation handle")?;
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let removed = settlement
                .rm_innovation(&handle)
                .map_err(|err| format!("innovation update failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!("removed={removed} {handle}");
            Ok(())
        }
        Some("set-principle") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let group = require_arg(args, 3, "principle group")?;
            let election = args.get(4).map(String::as_str);
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let changed = settlement
                .set_principle(&group, election)
                .map_err(|err| format!("principle update failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!(
                "changed={changed} principles={}",
                settlement.document().principles.join(",")
            );
            Ok(())
        }
        Some("note") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let author = require_arg(args, 3, "author")?;
            let text = args[4..].join(" ");
            let mut store = open_store()?;
            let mut settlement = load_settlement(&store, &content, &id)?;
            let js_id = format!("{}_note_{}", id, settlement.notes().len() + 1);
            settlement
                .add_settlement_note(SettlementNote {
                    js_id: js_id.clone(),
                    note: text,
                    author,
                    lantern_year: settlement.lantern_year(),
                })
                .map_err(|err| format!("note failed: {err}"))?;
            save_settlement(&mut store, &mut settlement)?;
            println!("noted {js_id}");
            Ok(())
        }
        Some("log") => {
            let id = require_arg(args, 2, "settlement_id")?;
            let store = open_store()?;
            let settlement = load_settlement(&store, &content, &id)?;
            for entry in settlement.event_log() {
                println!("ly {:>2}  [{}] {}", entry.lantern_year, entry.event_type, entry.message);
            }
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        print_usage();
        std::process::exit(2);
    }
}
