//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use serde_json::Value;
use sift_highlight::Highlighter;
pub use sift_highlight::{dim, header, subheader, success, warning};
use sift_index::{Registry, SearchHit, SearchResponse};
use sift_query::SearchParameters;

/// Field shown as a hit's heading when present.
const TITLE_FIELD: &str = "title";

/// Prints `value` as pretty JSON, highlighted when enabled.
pub fn print_json<T: Serialize + ?Sized>(value: &T, highlighter: &Highlighter) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", highlighter.highlight_json(&json));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Renders a search response for reading in a terminal.
///
/// Hits are numbered from the request's offset; each facet shows at most the number of values
/// the request asked for.
pub fn format_results(response: &SearchResponse, params: &SearchParameters) -> String {
    let mut out = String::new();
    if response.hits.is_empty() {
        out.push_str(&dim("No results found."));
        out.push('\n');
        return out;
    }

    out.push_str(&subheader(&format!(
        "{} results ({} ms)",
        response.total, response.took
    )));
    out.push_str("\n\n");
    for (offset, hit) in response.hits.iter().enumerate() {
        out.push_str(&format_hit(params.start + offset + 1, hit));
    }

    let facets = format_facets(response, params);
    if !facets.is_empty() {
        out.push('\n');
        out.push_str(&facets);
    }
    out
}

/// Renders one hit: rank and title, then where it came from.
fn format_hit(rank: usize, hit: &SearchHit) -> String {
    let title = hit
        .fields
        .get(TITLE_FIELD)
        .and_then(field_text)
        .unwrap_or(hit.id.as_str());
    let score = hit
        .score
        .map(|s| format!(" score {s:.3}"))
        .unwrap_or_default();
    format!(
        "{rank:>3}. {}\n     {}\n",
        header(title),
        dim(&format!("{} {}{score}", hit.index, hit.id))
    )
}

/// Reads a returned field that may be a string or a one-element array.
fn field_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

/// Renders facet buckets, looking through filter-scoped aggregations.
fn format_facets(response: &SearchResponse, params: &SearchParameters) -> String {
    let mut out = String::new();
    for (name, aggregation) in &response.aggregations {
        let buckets = aggregation
            .pointer("/filtered_aggregations/buckets")
            .or_else(|| aggregation.get("buckets"))
            .and_then(Value::as_array);
        let Some(buckets) = buckets else {
            continue;
        };
        let shown = params
            .facets
            .get(name)
            .map_or(buckets.len(), |facet| facet.requested);
        out.push_str(&subheader(&format!("{name}:")));
        out.push('\n');
        for bucket in buckets.iter().take(shown) {
            let key = bucket
                .get("key")
                .map(|k| k.as_str().map_or_else(|| k.to_string(), String::from))
                .unwrap_or_default();
            let count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
            out.push_str(&format!("   {key} {}\n", dim(&format!("({count})"))));
        }
    }
    out
}

/// Builds the backend table, marking the default backend.
pub fn backends_table(registry: &Registry, default_backend: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Backend", "Indices", "Default"]);
    for (name, members) in registry.backends() {
        let marker = if name == default_backend { "*" } else { "" };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(members.join(", ")),
            Cell::new(marker),
        ]);
    }
    table
}
