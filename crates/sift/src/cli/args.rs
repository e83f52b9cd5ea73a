//! Clap argument definitions for the `sift` CLI.

use std::{env, path::PathBuf, process::exit};

use chrono::NaiveDate;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, error::ErrorKind};
use sift_query::{
    DEFAULT_COUNT, DateRange, DebugFlags, FacetRequest, FacetScope, FieldFilter,
    SearchParameters, SortDirection, SortOrder,
};

/// Number of facet values shown when a facet request names no count.
pub const DEFAULT_FACET_COUNT: usize = 10;

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "sift - Relevance-ranked search over a document index engine")]
pub struct Cli {
    /// Log more (-v for info, -vv for debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Never syntax-highlight JSON or TOML output
    #[arg(long, global = true)]
    pub plain: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Parameters shared by commands that build a query.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Free-text query; wrap it in double quotes to match it as a phrase
    pub query: Option<String>,

    /// Find documents similar to this document identifier
    #[arg(long)]
    pub similar_to: Option<String>,

    /// Offset of the first result
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Number of results
    #[arg(short = 'n', long, default_value_t = DEFAULT_COUNT, value_parser = parse_count)]
    pub count: usize,

    /// Field to return (can be specified multiple times)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// Keep documents whose FIELD is one of the values: FIELD=V1,V2
    #[arg(long = "filter", value_parser = parse_text_filter)]
    pub filters: Vec<FieldFilter>,

    /// Drop documents whose FIELD is one of the values: FIELD=V1,V2
    #[arg(long = "reject", value_parser = parse_text_filter)]
    pub rejects: Vec<FieldFilter>,

    /// Keep documents whose date FIELD lies in a range: FIELD=FROM..TO (either bound optional)
    #[arg(long = "date", value_parser = parse_date_filter)]
    pub dates: Vec<FieldFilter>,

    /// Let filters on FIELD also accept documents without it
    #[arg(long = "include-missing", value_name = "FIELD")]
    pub include_missing: Vec<String>,

    /// Order by FIELD; prefix with '-' for descending
    #[arg(long, allow_hyphen_values = true, value_parser = parse_order)]
    pub order: Option<SortOrder>,

    /// Facet on a field: FIELD[=COUNT][,scope:all_filters|scope:exclude_field_filter]
    #[arg(long = "facet", value_parser = parse_facet)]
    pub facets: Vec<(String, FacetRequest)>,

    /// Skip curated best bets
    #[arg(long)]
    pub disable_best_bets: bool,

    /// Skip the popularity boost
    #[arg(long)]
    pub disable_popularity: bool,

    /// Match without synonym expansion
    #[arg(long)]
    pub disable_synonyms: bool,

    /// Ask the engine to explain scores
    #[arg(long)]
    pub explain: bool,

    /// Use the alternative field-weighting text query
    #[arg(long)]
    pub new_weighting: bool,
}

impl QueryArgs {
    /// Converts the flags into search parameters.
    pub fn to_params(&self) -> SearchParameters {
        let mut params = match &self.query {
            Some(query) => SearchParameters::for_query(query.as_str()),
            None => SearchParameters::default(),
        };
        if let Some(id) = &self.similar_to {
            params = params.with_similar_to(id.as_str());
        }

        let filters = self
            .filters
            .iter()
            .cloned()
            .chain(self.rejects.iter().cloned().map(FieldFilter::rejecting))
            .chain(self.dates.iter().cloned())
            .map(|filter| {
                if self.include_missing.iter().any(|f| f == filter.field()) {
                    filter.including_missing()
                } else {
                    filter
                }
            })
            .collect();

        params = params
            .with_page(self.start, self.count)
            .with_return_fields(self.fields.clone())
            .with_filters(filters)
            .with_debug(DebugFlags {
                disable_best_bets: self.disable_best_bets,
                disable_popularity: self.disable_popularity,
                disable_synonyms: self.disable_synonyms,
                explain: self.explain,
            })
            .with_new_weighting(self.new_weighting);
        if let Some(order) = &self.order {
            params = params.with_order(order.clone());
        }
        for (field, facet) in &self.facets {
            params = params.with_facet(field.as_str(), *facet);
        }
        params
    }
}

/// Arguments for `sift search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    /// Query parameters.
    pub query: QueryArgs,

    /// Backend or index to search (can be specified multiple times) [default: from config]
    #[arg(short = 'b', long = "backend")]
    pub backends: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift payload`.
#[derive(Args, Debug, Clone)]
pub struct PayloadCommand {
    #[command(flatten)]
    /// Query parameters.
    pub query: QueryArgs,

    /// Print the envelope on one line
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for `sift normalize`.
#[derive(Args, Debug, Clone)]
pub struct NormalizeCommand {
    /// Text to normalize; several words are joined with spaces
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Print the key padded with spaces, as stored on curated entries
    #[arg(long)]
    pub padded: bool,
}

/// Arguments for `sift prepare-bet`.
#[derive(Args, Debug, Clone)]
pub struct PrepareBetCommand {
    /// JSON document to prepare [default: read from stdin]
    pub file: Option<PathBuf>,
}

/// Arguments for `sift init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.sift.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Build a query and run it against the engine
    #[command(after_help = "\
EXAMPLES:
  sift search 'self assessment'
  sift search '\"tax return\"' -n 5
  sift search vat --filter format=guide,answer --reject section=archive
  sift search vat --date public_timestamp=2020-01-01..
  sift search --facet organisations=20,scope:all_filters --order -public_timestamp
  sift search --similar-to /vat-rates -b mainstream")]
    Search(SearchCommand),

    /// Print the query envelope without running it
    Payload(PayloadCommand),

    /// Print the best-bet key of a query
    Normalize(NormalizeCommand),

    /// Fill in the best-bet key of a curated entry document
    #[command(name = "prepare-bet")]
    PrepareBet(PrepareBetCommand),

    /// List configured backends and their indices
    Backends,

    /// Initialize sift configuration in current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,

    /// Validate configuration and diagnose issues
    Check,
}

/// Parses a result count, rejecting zero.
fn parse_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("count must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Splits `FIELD=VALUE`.
fn split_field(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value.trim())),
        _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
    }
}

/// Parses `FIELD=V1,V2` into a text filter.
fn parse_text_filter(s: &str) -> Result<FieldFilter, String> {
    let (field, values) = split_field(s)?;
    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    if values.is_empty() {
        return Err(format!("filter on '{field}' has no values"));
    }
    Ok(FieldFilter::text(field, values))
}

/// Parses `FIELD=FROM..TO` into a date filter.
fn parse_date_filter(s: &str) -> Result<FieldFilter, String> {
    let (field, range) = split_field(s)?;
    let (from, to) = range
        .split_once("..")
        .ok_or_else(|| format!("expected FROM..TO, got '{range}'"))?;
    let range = DateRange {
        from: parse_date(from)?,
        to: parse_date(to)?,
    };
    if range.is_unbounded() {
        return Err(format!("date filter on '{field}' has no bounds"));
    }
    Ok(FieldFilter::date(field, range))
}

/// Parses an optional `YYYY-MM-DD` date.
fn parse_date(s: &str) -> Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| format!("invalid date '{s}': {e}"))
}

/// Parses `FIELD` or `-FIELD`.
fn parse_order(s: &str) -> Result<SortOrder, String> {
    let (field, direction) = match s.strip_prefix('-') {
        Some(field) => (field, SortDirection::Desc),
        None => (s, SortDirection::Asc),
    };
    if field.is_empty() {
        return Err("order needs a field name".to_string());
    }
    Ok(SortOrder::new(field, direction))
}

/// Parses `FIELD[=COUNT][,scope:SCOPE]`.
fn parse_facet(s: &str) -> Result<(String, FacetRequest), String> {
    let mut parts = s.split(',');
    let head = parts.next().unwrap_or_default();
    let (field, requested) = match head.split_once('=') {
        Some((field, count)) => (
            field,
            count
                .parse::<usize>()
                .map_err(|e| format!("invalid facet count '{count}': {e}"))?,
        ),
        None => (head, DEFAULT_FACET_COUNT),
    };
    if field.is_empty() {
        return Err("facet needs a field name".to_string());
    }

    let mut scope = FacetScope::default();
    for option in parts {
        scope = match option.trim() {
            "scope:all_filters" => FacetScope::AllFilters,
            "scope:exclude_field_filter" => FacetScope::ExcludeFieldFilter,
            other => return Err(format!("unknown facet option '{other}'")),
        };
    }
    Ok((field.to_string(), FacetRequest::new(requested, scope)))
}

/// Parses CLI arguments, printing hierarchical help for top-level `--help`.
pub fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.kind() == ErrorKind::DisplayHelp {
                let args: Vec<_> = env::args().collect();
                if args.len() <= 2 {
                    print_command_summary();
                    exit(0);
                }
            }
            e.exit();
        }
    }
}

/// Prints the command list with one line per subcommand.
fn print_command_summary() {
    let cmd = Cli::command();
    let about = cmd.get_about().map(|s| s.to_string()).unwrap_or_default();

    println!("{about}");
    println!();
    println!("Usage: sift [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    for sub in cmd.get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue;
        }
        let about = sub.get_about().map(|s| s.to_string()).unwrap_or_default();
        println!("  {name:12} {about}");
    }
    println!();
    println!("Options:");
    println!("  -v, --verbose  Log more (-v for info, -vv for debug)");
    println!("      --plain    Never syntax-highlight JSON or TOML output");
    println!("  -h, --help     Print help");
}
