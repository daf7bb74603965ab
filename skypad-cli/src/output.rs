//! Human-readable and JSON rendering of command results.

use serde::Serialize;

use skypad_search::driver::StoredNode;
use skypad_search::ingest::IngestReport;
use skypad_search::nodes::AssetNode;
use skypad_search::search::{MatchKind, ScoredResult, SearchStrategy, SmartSearchResults};
use skypad_search::utils::truncate_with_ellipsis;

const DESCRIPTION_WIDTH: usize = 80;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn node_line(node: &AssetNode) -> String {
    format!(
        "{:<8} {}  {}",
        node.label().as_str(),
        node.display_name(),
        truncate_with_ellipsis(node.description(), DESCRIPTION_WIDTH)
    )
}

fn result_line(rank: usize, result: &ScoredResult) -> String {
    let marker = match result.match_kind {
        MatchKind::Semantic => "",
        MatchKind::TextMatch => " (text match)",
    };
    format!(
        "{rank:>3}. {:.3}{marker}  {}",
        result.similarity_score,
        node_line(&result.node)
    )
}

pub fn results(results: &[ScoredResult], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(results);
    }
    if results.is_empty() {
        println!("No results.");
    }
    for (i, result) in results.iter().enumerate() {
        println!("{}", result_line(i + 1, result));
    }
    Ok(())
}

pub fn smart(results: &SmartSearchResults, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(results);
    }
    match results.strategy {
        SearchStrategy::DomainScoped(domain) => println!("Searched the {domain} domain."),
        SearchStrategy::Global => println!("Searched all domains."),
    }
    if results.is_empty() {
        println!("No results.");
    }
    for (domain, group) in &results.groups {
        println!("\n[{domain}]");
        for (i, result) in group.iter().enumerate() {
            println!("{}", result_line(i + 1, result));
        }
    }
    Ok(())
}

pub fn nodes(nodes: &[StoredNode], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(nodes);
    }
    if nodes.is_empty() {
        println!("No embedded nodes found.");
    }
    for stored in nodes {
        println!("{}", node_line(&stored.node));
    }
    Ok(())
}

pub fn report(report: &IngestReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }
    println!(
        "Wrote {} nodes ({} newly embedded, {} without embedding) and {} links; {} project links inferred.",
        report.nodes_written,
        report.embeddings_computed,
        report.nodes_without_embedding,
        report.links_written,
        report.project_links_created
    );
    Ok(())
}
