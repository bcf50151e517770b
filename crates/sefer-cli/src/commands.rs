//! Command handlers
//!
//! Each handler renders its result to a string: plain text one entry per
//! line, or pretty JSON when `json` is set.

use anyhow::{Context, bail};
use sefer_core::{Level, Scope};
use sefer_logging::SessionContextGuard;
use sefer_places::{CatalogReport, PlaceDirectory, ScopeResolver, SearchHit};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Command, SelectionArgs};

/// A resolved selection as printed by `resolve` and `parse`
#[derive(Debug, Serialize)]
struct Resolved {
    scope: Scope,
    query: String,
}

impl Resolved {
    /// Resolve `resolver` and record the scope on the current session
    fn from_resolver(resolver: &ScopeResolver) -> Self {
        let scope = resolver.resolve();
        SessionContextGuard::record_scope(&scope);
        info!(scope = %scope, "Resolved selection");
        Self {
            query: resolver.to_query_string(),
            scope,
        }
    }
}

#[derive(Debug, Serialize)]
struct Stats {
    #[serde(flatten)]
    report: CatalogReport,
    regions: usize,
}

pub fn run(command: &Command, directory: &PlaceDirectory, json: bool) -> anyhow::Result<String> {
    let catalog = directory.catalog();
    match command {
        Command::Regions => render_names(catalog.regions(), json),
        Command::Zones { region } => render_names(catalog.zones_of(region), json),
        Command::Woredas { region, zone } => render_names(catalog.woredas_of(region, zone), json),
        Command::Kebeles {
            region,
            zone,
            woreda,
        } => render_names(catalog.kebeles_of(region, zone, woreda), json),
        Command::Search { query, .. } => render_hits(&directory.search(query), json),
        Command::Resolve(args) => {
            let resolver = select_all(directory.resolver(), args)?;
            render_resolved(Resolved::from_resolver(&resolver), json)
        }
        Command::Parse { query } => {
            let resolver = directory.resolver_from_query(query);
            render_resolved(Resolved::from_resolver(&resolver), json)
        }
        Command::Stats => {
            let stats = Stats {
                report: catalog.report(),
                regions: catalog.roots().len(),
            };
            if json {
                return to_json(&stats);
            }
            Ok(format!(
                "rows\t{}\ndropped\t{}\ntruncated\t{}\nnodes\t{}\nregions\t{}",
                stats.report.rows_seen,
                stats.report.rows_dropped,
                stats.report.rows_truncated,
                stats.report.nodes,
                stats.regions
            ))
        }
    }
}

/// Apply each given level in order, failing on the first one the catalog rejects
fn select_all(mut resolver: ScopeResolver, args: &SelectionArgs) -> anyhow::Result<ScopeResolver> {
    let requested = [
        (Level::Region, &args.region),
        (Level::Zone, &args.zone),
        (Level::Woreda, &args.woreda),
        (Level::Kebele, &args.kebele),
    ];
    for (level, value) in requested {
        let Some(value) = value else { continue };
        if resolver.select(level, value) {
            debug!(%level, value = %value, "Selected");
            continue;
        }
        let options = resolver.options(level);
        if options.is_empty() {
            bail!("cannot select {} '{}' before its parent levels", level.label(), value);
        }
        bail!(
            "unknown {} '{}'; expected one of: {}",
            level.label(),
            value,
            options.join(", ")
        );
    }
    Ok(resolver)
}

fn render_names(names: Vec<&str>, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(&names);
    }
    Ok(names.join("\n"))
}

fn render_hits(hits: &[SearchHit], json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(&hits);
    }
    Ok(hits
        .iter()
        .map(|hit| format!("{}\t{}\t{}", hit.path, hit.title, hit.subtitle))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_resolved(resolved: Resolved, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(&resolved);
    }
    Ok(format!("{}\n{}", resolved.scope, resolved.query))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}
