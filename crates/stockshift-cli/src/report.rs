//! Command handlers. Each loads the network fresh, derives suggestions, and
//! prints to stdout; logging goes to stderr so CSV output stays clean.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use stockshift_core::{
    export_rows, load_network, run_query, suggest, write_csv, EngineSettings, QueryResult,
    SortKey, StaticSignals, StoreNetwork, SuggestionBook, SuggestionQuery, UrgencyFilter,
};

fn load(path: &Path) -> anyhow::Result<StoreNetwork> {
    load_network(path).with_context(|| format!("loading network from {}", path.display()))
}

fn evaluate(
    network: &StoreNetwork,
    settings: &EngineSettings,
    query: &SuggestionQuery,
) -> QueryResult {
    let signals = StaticSignals::from_entries(&network.signals);
    let admission = suggest(network, &signals, settings);
    tracing::debug!(
        admitted = admission.admitted.len(),
        rejected = admission.rejected.len(),
        "suggestions derived"
    );
    let book = SuggestionBook::from_candidates(admission.admitted, Utc::now());
    run_query(book.all(), query)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Print the suggestion table followed by totals and urgency badges.
///
/// # Errors
///
/// Returns an error if the network file cannot be loaded.
pub(crate) fn run_suggest(
    network_path: &Path,
    settings: &EngineSettings,
    urgency: UrgencyFilter,
    search: String,
    sort: SortKey,
) -> anyhow::Result<()> {
    let network = load(network_path)?;
    let result = evaluate(
        &network,
        settings,
        &SuggestionQuery {
            urgency,
            search,
            sort,
        },
    );

    if result.suggestions.is_empty() {
        println!("no transfer suggestions match");
        return Ok(());
    }

    println!(
        "{:<9}{:<24}{:<24}{:<28}{:>6}{:>10}{:>11}  URGENCY",
        "ID", "FROM", "TO", "PRODUCT", "QTY", "MILES", "SAVINGS"
    );
    for s in &result.suggestions {
        println!(
            "{:<9}{:<24}{:<24}{:<28}{:>6}{:>10.1}{:>11.2}  {}",
            s.id,
            truncate(network.store_name(&s.plan.from_store_id), 21),
            truncate(network.store_name(&s.plan.to_store_id), 21),
            truncate(&s.plan.product_name, 25),
            s.plan.quantity,
            s.assessment.distance_miles,
            s.assessment.estimated_savings,
            s.urgency(),
        );
    }

    let stats = &result.stats;
    println!();
    println!(
        "shown: {}  total savings: ${:.2}  avg distance: {:.1} mi",
        stats.shown, stats.total_savings, stats.average_distance
    );
    println!(
        "critical: {}  high: {}  medium: {}  low: {}",
        stats.urgency_counts.critical,
        stats.urgency_counts.high,
        stats.urgency_counts.medium,
        stats.urgency_counts.low
    );

    Ok(())
}

/// Write filtered suggestions as CSV to `out`, or stdout when `None`.
///
/// # Errors
///
/// Returns an error if the network cannot be loaded or the CSV cannot be written.
pub(crate) fn run_export(
    network_path: &Path,
    settings: &EngineSettings,
    urgency: UrgencyFilter,
    search: String,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let network = load(network_path)?;
    let result = evaluate(
        &network,
        settings,
        &SuggestionQuery {
            urgency,
            search,
            sort: SortKey::default(),
        },
    );
    let rows = export_rows(&result.suggestions, &network);

    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_csv(&rows, BufWriter::new(file))?;
            tracing::info!(rows = rows.len(), path = %path.display(), "csv written");
            eprintln!("wrote {} rows to {}", rows.len(), path.display());
        }
        None => write_csv(&rows, io::stdout().lock())?,
    }

    Ok(())
}

/// Print inventory value and stock-level counts per store.
///
/// # Errors
///
/// Returns an error if the network file cannot be loaded.
pub(crate) fn run_stores(network_path: &Path) -> anyhow::Result<()> {
    let network = load(network_path)?;

    println!(
        "{:<12}{:<28}{:>16}{:>7}{:>7}{:>7}",
        "STORE", "NAME", "VALUE", "SKUS", "LOW", "OVER"
    );
    for summary in network.store_summaries() {
        println!(
            "{:<12}{:<28}{:>16.2}{:>7}{:>7}{:>7}",
            summary.store_id,
            truncate(&summary.store_name, 25),
            summary.total_value,
            summary.sku_count,
            summary.low_stock_count,
            summary.over_stock_count,
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/network.yaml")
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("GoPro Hero 12", 25), "GoPro Hero 12");
        assert_eq!(truncate("Sony Noise Cancelling Headphones", 10), "Sony Noise...");
    }

    #[test]
    fn evaluate_filters_fixture_network() {
        let network = load(&fixture_path()).unwrap();
        let query = SuggestionQuery {
            urgency: "high".parse().unwrap(),
            ..SuggestionQuery::default()
        };
        let result = evaluate(&network, &EngineSettings::default(), &query);
        assert_eq!(result.stats.shown, 2);
        assert_eq!(result.stats.urgency_counts.total(), 6);
    }

    #[test]
    fn engine_settings_change_the_result() {
        let network = load(&fixture_path()).unwrap();
        let query = SuggestionQuery::default();

        let strict = EngineSettings {
            surplus_threshold: 1000,
            ..EngineSettings::default()
        };
        assert_eq!(evaluate(&network, &strict, &query).stats.shown, 0);

        let cheap_loss = EngineSettings {
            avoided_loss_per_unit: 0.0,
            ..EngineSettings::default()
        };
        assert_eq!(evaluate(&network, &cheap_loss, &query).stats.shown, 0);
    }

    #[test]
    fn export_with_strict_settings_writes_header_only() {
        let out = std::env::temp_dir().join(format!(
            "stockshift-export-empty-{}.csv",
            std::process::id()
        ));
        let strict = EngineSettings {
            surplus_threshold: 1000,
            ..EngineSettings::default()
        };
        run_export(&fixture_path(), &strict, UrgencyFilter::All, String::new(), Some(&out))
            .unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        std::fs::remove_file(&out).ok();
        assert_eq!(
            text,
            "ID,Track ID,From,To,Product,Quantity,Distance,Savings,Urgency\n"
        );
    }

    #[test]
    fn export_writes_csv_file() {
        let out = std::env::temp_dir().join(format!("stockshift-export-{}.csv", std::process::id()));
        run_export(
            &fixture_path(),
            &EngineSettings::default(),
            UrgencyFilter::All,
            String::new(),
            Some(&out),
        )
        .unwrap();

        let rows = stockshift_core::parse_csv(File::open(&out).unwrap()).unwrap();
        std::fs::remove_file(&out).ok();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].id, "ts-001");
    }

    #[test]
    fn missing_network_file_is_an_error() {
        let err = run_stores(Path::new("/nonexistent/network.yaml")).unwrap_err();
        assert!(err.to_string().contains("loading network"));
    }
}
