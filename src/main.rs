use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use eventsieve_filter::{EventField, FieldFilterEngine, KeyExtractor};
use eventsieve_logs::{DisplayRow, EventBuffer, LevelCounts, RecordParser, RecordView};

mod config;

use config::{Config, Overrides};

type EventFilter = FieldFilterEngine<DisplayRow, EventField>;

/// Eventsieve - filter event log exports by provider or level
#[derive(Parser, Debug)]
#[command(name = "eventsieve")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines event files (reads stdin when none are given)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Field to filter on: provider or level
    #[arg(long)]
    field: Option<String>,

    /// Show only events with this value
    #[arg(long, value_name = "NAME")]
    only: Option<String>,

    /// Hide events with this value (repeatable)
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,

    /// Print the filter toggles instead of events
    #[arg(long)]
    list: bool,

    /// Write JSON instead of text
    #[arg(long)]
    json: bool,

    /// Print per-level counts of the visible events to stderr
    #[arg(long)]
    stats: bool,

    /// Buffer size for events
    #[arg(long)]
    buffer_size: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?.with_overrides(Overrides {
        buffer_size: args.buffer_size,
        field: args.field.clone(),
        only: args.only.clone(),
        exclude: args.exclude.clone(),
    });

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if let Some(directive) = &config.log_level {
        env_filter = env_filter.add_directive(
            directive
                .parse()
                .with_context(|| format!("Invalid log_level '{}'", directive))?,
        );
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let result = run(&args, &config);

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let field = config.event_field()?;
    let buffer = EventBuffer::new(config.buffer_size);
    let sources = load_events(&args.files, &buffer)?;
    let rows = build_rows(&buffer, &sources);
    debug!(events = buffer.len(), rows = rows.len(), "loaded events");

    let mut view = RecordView::new();
    let mut filter = EventFilter::new(field);
    filter.refresh(&rows, &mut view);
    let counts = count_keys(&rows, field);
    view.extend(rows);

    if let Some(name) = &config.only
        && !filter.isolate_only(name)
    {
        warn!("no {} named '{}' in the input", field.as_str(), name);
    }
    for name in &config.exclude {
        if !filter.exclude(name) {
            warn!("no {} named '{}' in the input", field.as_str(), name);
        }
    }

    // Nothing deselected: detach so marker rows stay visible
    if filter.registry().all_selected() {
        filter.reset(&mut view);
    } else {
        filter.apply(&mut view);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.list {
        write_toggles(&mut out, &filter, &counts, args.json)?;
    } else {
        write_rows(&mut out, &view, args.json)?;
    }
    out.flush()?;

    if args.stats {
        let levels = view
            .visible()
            .filter_map(DisplayRow::event)
            .map(|record| record.level);
        print_stats(&LevelCounts::from_levels(levels));
    }

    Ok(())
}

/// Read every input into the buffer, returning the first event id and label of each source
fn load_events(files: &[PathBuf], buffer: &EventBuffer) -> Result<Vec<(u64, String)>> {
    let mut sources = Vec::new();

    if files.is_empty() {
        let records = RecordParser::read_all(io::stdin().lock()).context("Failed to read stdin")?;
        sources.push((buffer.next_id(), "<stdin>".to_string()));
        buffer.extend(records);
        return Ok(sources);
    }

    for path in files {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let records = RecordParser::read_all(BufReader::new(file))
            .with_context(|| format!("Failed to read {}", path.display()))?;
        sources.push((buffer.next_id(), path.display().to_string()));
        buffer.extend(records);
    }

    Ok(sources)
}

/// Lay out buffered events as display rows, with a marker where each source
/// starts. Empty sources keep their marker; sources whose records were all
/// evicted lose it.
fn build_rows(buffer: &EventBuffer, sources: &[(u64, String)]) -> Vec<DisplayRow> {
    let records = buffer.all();
    let next_id = buffer.next_id();
    let first_id = records.first().map_or(next_id, |record| record.id);
    let mut rows = Vec::with_capacity(records.len() + sources.len());
    let mut records = records.into_iter().peekable();

    for (idx, (start, name)) in sources.iter().enumerate() {
        let end = sources.get(idx + 1).map_or(next_id, |(next, _)| *next);
        if *start < end && end <= first_id {
            continue;
        }
        rows.push(DisplayRow::marker(name.clone()));
        while let Some(record) = records.next_if(|record| record.id < end) {
            rows.push(DisplayRow::Event(record));
        }
    }
    rows.extend(records.map(DisplayRow::Event));

    rows
}

fn count_keys(rows: &[DisplayRow], field: EventField) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for key in rows.iter().filter_map(|row| field.extract_key(row)) {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

fn write_toggles<W: Write>(
    out: &mut W,
    filter: &EventFilter,
    counts: &HashMap<String, usize>,
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &filter.registry().states())?;
        writeln!(out)?;
        return Ok(());
    }

    let width = filter
        .items()
        .iter()
        .map(|item| item.name().width())
        .max()
        .unwrap_or(0);

    for item in filter.items() {
        let check = if item.selected() { "[x]" } else { "[ ]" };
        let pad = width - item.name().width();
        let count = counts.get(item.name()).copied().unwrap_or(0);
        writeln!(out, "{} {}{}  {}", check, item.name(), " ".repeat(pad), count)?;
    }
    Ok(())
}

fn write_rows<W: Write>(out: &mut W, view: &RecordView<DisplayRow>, json: bool) -> Result<()> {
    for row in view.visible() {
        if json {
            serde_json::to_writer(&mut *out, row)?;
            writeln!(out)?;
            continue;
        }

        match row {
            DisplayRow::Marker { label } => writeln!(out, "== {} ==", label)?,
            DisplayRow::Event(record) => {
                let timestamp = record
                    .timestamp
                    .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let event_id = record
                    .event_id
                    .map(|id| format!(" [{}]", id))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "{} {} {}{} {}",
                    timestamp,
                    record.level.as_str(),
                    record.provider,
                    event_id,
                    record.message
                )?;
            }
        }
    }
    Ok(())
}

fn print_stats(counts: &LevelCounts) {
    eprintln!(
        "visible: {} (fatal {}, error {}, warn {}, info {}, debug {}, trace {}, unknown {})",
        counts.total(),
        counts.fatal,
        counts.error,
        counts.warn,
        counts.info,
        counts.debug,
        counts.trace,
        counts.unknown
    );
}
