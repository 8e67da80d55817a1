//! Pipemind CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Wire observability**: install `tracing-subscriber` with an env filter,
//!    as text or JSON depending on `PIPEMIND_LOG_FORMAT`.
//! 2. **Load configuration**: `pipemind.toml` plus environment overrides.
//! 3. **Dispatch**: run one node per invocation and print its outputs to
//!    stdout, persisting line selector cursors when a state file is set.

mod args;
mod config;
mod room_plan;

use std::path::Path;

use anyhow::{bail, Context};
use nodes::line_selector::{LineRequest, LineSelector, SelectorStateStore, StateSnapshot};
use nodes::resolution::{select_resolution, ModelFamily};
use nodes::room_mapper::RoomMapperNode;
use nodes::text::{self, FindOptions};
use nodes::text_file::{self, InputDir};
use pipeline::{Delimiter, FileName, Orientation, Resolution, SelectionMode};
use tracing::{debug, info};

use crate::args::Flags;
use crate::config::Config;

fn usage_and_exit() -> ! {
    eprintln!(
        "pipemind

USAGE:
  pipemind <command> [--flag value]...

COMMANDS:
  nodes        [--json]
  files
  select-line  --file F [--mode manual|random|increment|decrement|custom_seq|custom_random]
               [--index N] [--seed S] [--custom IDX] [--ignore IDX] [--disabled]
  random-line  --file F [--seed S]
  load-text    --file F [--disabled]
  combine      [--prompt P]... [--delimiter space|newline|comma|slash|nothing]
  compose      --template T [--keyword K=V] [--data FILE]... [--seed S|-1]
  resolution   --family flux2m|qwen|sdxl [--orientation landscape|portrait|manual]
               [--preset LABEL] [--width W] [--height H]
  find         (--text T | --file F) --term X [--case-sensitive] [--whole-word]
  room-map     --plan PLAN.json

ENV:
  PIPEMIND_CONFIG          default ./pipemind.toml
  PIPEMIND_INPUT_DIR       default input
  PIPEMIND_ROOM_MAPS_DIR   default room_maps
  PIPEMIND_STATE_FILE      default unset (no persistence)
  PIPEMIND_LOG_FORMAT      text | json
  RUST_LOG                 default info
"
    );
    std::process::exit(2);
}

fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("PIPEMIND_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut argv = std::env::args().skip(1);
    let command = match argv.next() {
        Some(c) if c != "-h" && c != "--help" => c,
        _ => usage_and_exit(),
    };
    let flags = Flags::parse(argv)?;
    let config = Config::from_env().context("loading configuration")?;
    debug!(?config, command = %command, "starting");

    match command.as_str() {
        "nodes" => list_nodes(&flags),
        "files" => list_files(&config),
        "select-line" => select_line(&config, &flags),
        "random-line" => random_line(&config, &flags),
        "load-text" => load_text(&config, &flags),
        "combine" => combine(&flags),
        "compose" => compose(&config, &flags),
        "resolution" => resolution(&flags),
        "find" => find(&config, &flags),
        "room-map" => room_map(&config, &flags),
        _ => usage_and_exit(),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn file_flag(flags: &Flags) -> anyhow::Result<FileName> {
    let raw = flags.require("file")?;
    FileName::new(raw.trim()).context("--file must not be empty")
}

fn list_nodes(flags: &Flags) -> anyhow::Result<()> {
    if flags.switch("json") {
        return print_json(&nodes::NODES);
    }
    for node in nodes::NODES {
        println!("{:<32} {:<22} {}", node.name, node.category, node.display_name);
    }
    Ok(())
}

fn list_files(config: &Config) -> anyhow::Result<()> {
    let input = InputDir::new(&config.input_dir);
    let files = input
        .list_text_files()
        .with_context(|| format!("listing {}", config.input_dir.display()))?;
    for file in files {
        println!("{file}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Line selection
// ---------------------------------------------------------------------------

fn load_state(path: &Path) -> anyhow::Result<SelectorStateStore> {
    if !path.exists() {
        return Ok(SelectorStateStore::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file {}", path.display()))?;
    let snapshot: StateSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("parsing state file {}", path.display()))?;
    Ok(SelectorStateStore::from_snapshot(snapshot))
}

fn save_state(path: &Path, state: &SelectorStateStore) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&state.snapshot())?;
    std::fs::write(path, json).with_context(|| format!("writing state file {}", path.display()))?;
    debug!(path = %path.display(), entries = state.len(), "selector state saved");
    Ok(())
}

fn select_line(config: &Config, flags: &Flags) -> anyhow::Result<()> {
    let mode = flags.parsed::<SelectionMode>("mode")?.unwrap_or(SelectionMode::Manual);
    let request = LineRequest::new(file_flag(flags)?, mode)
        .with_enabled(!flags.switch("disabled"))
        .with_line_index(flags.parsed::<usize>("index")?.unwrap_or(0))
        .with_seed(flags.seed()?)
        .with_custom_indices(flags.get("custom").unwrap_or_default())
        .with_ignore_indices(flags.get("ignore").unwrap_or_default());

    let state = match &config.state_file {
        Some(path) => load_state(path)?,
        None => SelectorStateStore::new(),
    };
    let mut selector = LineSelector::with_state(InputDir::new(&config.input_dir), state);
    let selection = selector.select(&request);

    if let Some(path) = &config.state_file {
        if mode.is_stateful() {
            save_state(path, selector.state())?;
        }
    }
    print_json(&selection)
}

fn random_line(config: &Config, flags: &Flags) -> anyhow::Result<()> {
    let input = InputDir::new(&config.input_dir);
    println!("{}", text_file::random_line(&input, &file_flag(flags)?, flags.seed()?));
    Ok(())
}

fn load_text(config: &Config, flags: &Flags) -> anyhow::Result<()> {
    let input = InputDir::new(&config.input_dir);
    let loaded = text_file::load_text_file(&input, !flags.switch("disabled"), &file_flag(flags)?);
    print_json(&loaded)
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

fn combine(flags: &Flags) -> anyhow::Result<()> {
    let prompts = flags.all("prompt");
    if prompts.len() > text::PROMPT_SLOTS {
        bail!("at most {} prompts are accepted", text::PROMPT_SLOTS);
    }
    let delimiter = flags.parsed::<Delimiter>("delimiter")?.unwrap_or_default();
    println!("{}", text::combine_prompts(&prompts, delimiter));
    Ok(())
}

fn compose(config: &Config, flags: &Flags) -> anyhow::Result<()> {
    let template = flags.require("template")?;
    let seed = flags.optional_seed()?;
    let data_files = flags.all("data");
    let composed = if !data_files.is_empty() {
        if data_files.len() > text::KEYWORD_SLOTS {
            bail!("at most {} data files are accepted", text::KEYWORD_SLOTS);
        }
        let input = InputDir::new(&config.input_dir);
        let mut sources = Vec::with_capacity(data_files.len());
        for name in data_files {
            let file = FileName::new(name.trim()).context("--data must not be empty")?;
            sources.push(input.read_to_string(&file)?);
        }
        let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
        text::compose_multi(template, &sources, seed)
    } else {
        text::compose_enhanced(template, flags.get("keyword").unwrap_or_default(), seed)
    };
    println!("{composed}");
    Ok(())
}

fn find(config: &Config, flags: &Flags) -> anyhow::Result<()> {
    let haystack = match flags.get("text") {
        Some(t) => t.to_string(),
        None => InputDir::new(&config.input_dir).read_to_string(&file_flag(flags)?)?,
    };
    let options = FindOptions {
        case_sensitive: flags.switch("case-sensitive"),
        whole_word: flags.switch("whole-word"),
    };
    let result = text::find_in_text(&haystack, flags.get("term").unwrap_or_default(), options);
    println!("{}", result.search_results);
    Ok(())
}

// ---------------------------------------------------------------------------
// Resolution and rooms
// ---------------------------------------------------------------------------

fn resolution(flags: &Flags) -> anyhow::Result<()> {
    let family: ModelFamily = flags.require("family")?.parse()?;
    let orientation = flags.parsed::<Orientation>("orientation")?.unwrap_or_default();
    let fallback = family.fallback();
    let manual = Resolution::new(
        flags.parsed::<u32>("width")?.unwrap_or(fallback.width),
        flags.parsed::<u32>("height")?.unwrap_or(fallback.height),
    );
    let preset = flags
        .get("preset")
        .or_else(|| family.presets().first().map(|p| p.label))
        .unwrap_or_default();
    let resolved = select_resolution(family, orientation, preset, manual)?;
    println!("{resolved}");
    Ok(())
}

fn room_map(config: &Config, flags: &Flags) -> anyhow::Result<()> {
    let path = flags.require("plan")?;
    let content = std::fs::read_to_string(path).with_context(|| format!("reading plan {path}"))?;
    let plan: room_plan::RoomPlan =
        serde_json::from_str(&content).with_context(|| format!("parsing plan {path}"))?;
    let node = RoomMapperNode::new(&config.room_maps_dir);
    let outcome = room_plan::run(&plan, &node)?;
    for summary in &outcome.summaries {
        println!("{summary}\n");
    }
    if let Some(exported) = outcome.exported {
        info!(path = %exported.display(), "plan complete");
    }
    Ok(())
}
