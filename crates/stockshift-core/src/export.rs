//! Flat tabular export of suggestions.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::StoreNetwork;
use crate::suggestion::TransferSuggestion;
use crate::urgency::Urgency;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error at row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Column names, in the order [`ExportRow`] serializes them.
pub const EXPORT_HEADER: [&str; 9] = [
    "ID", "Track ID", "From", "To", "Product", "Quantity", "Distance", "Savings", "Urgency",
];

/// One CSV row. Store columns hold display names, not ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    /// Empty until the suggestion is approved.
    #[serde(rename = "Track ID")]
    pub tracking_code: Option<String>,
    #[serde(rename = "From")]
    pub from_store: String,
    #[serde(rename = "To")]
    pub to_store: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Distance")]
    pub distance_miles: f64,
    #[serde(rename = "Savings")]
    pub estimated_savings: f64,
    #[serde(rename = "Urgency")]
    pub urgency: Urgency,
}

impl ExportRow {
    #[must_use]
    pub fn from_suggestion(s: &TransferSuggestion, network: &StoreNetwork) -> Self {
        Self {
            id: s.id.clone(),
            tracking_code: s.tracking_code().map(str::to_string),
            from_store: network.store_name(&s.plan.from_store_id).to_string(),
            to_store: network.store_name(&s.plan.to_store_id).to_string(),
            product: s.plan.product_name.clone(),
            quantity: s.plan.quantity,
            distance_miles: s.assessment.distance_miles,
            estimated_savings: s.assessment.estimated_savings,
            urgency: s.assessment.urgency,
        }
    }
}

pub fn export_rows<'a, I>(suggestions: I, network: &StoreNetwork) -> Vec<ExportRow>
where
    I: IntoIterator<Item = &'a TransferSuggestion>,
{
    suggestions
        .into_iter()
        .map(|s| ExportRow::from_suggestion(s, network))
        .collect()
}

/// Write rows under a header line. The header is written even when `rows`
/// is empty.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the underlying writer fails.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        // serialize() emits the header with the first record only
        csv_writer.write_record(EXPORT_HEADER)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// # Errors
///
/// Returns [`ExportError`] if a row cannot be serialized.
pub fn to_csv_string(rows: &[ExportRow]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Read rows previously produced by [`write_csv`].
///
/// # Errors
///
/// Returns [`ExportError::Row`] naming the first malformed data row (1-based).
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in csv_reader.deserialize().enumerate() {
        let row: ExportRow = result.map_err(|source| ExportError::Row {
            row: index + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::generator::generate_candidates;
    use crate::settings::EngineSettings;
    use crate::shipping::FixedShippingEstimator;
    use crate::signals::NoSignals;
    use crate::test_support::surplus_shortage_network;

    fn suggestion(network: &StoreNetwork) -> TransferSuggestion {
        let candidate = generate_candidates(network, &NoSignals, &EngineSettings::default())
            .into_iter()
            .next()
            .expect("candidate");
        TransferSuggestion::from_candidate("ts-001".to_string(), candidate, Utc::now())
    }

    #[test]
    fn header_lists_export_columns() {
        let network = surplus_shortage_network(31);
        let rows = export_rows([&suggestion(&network)], &network);
        let csv = to_csv_string(&rows).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "ID,Track ID,From,To,Product,Quantity,Distance,Savings,Urgency"
        );
        assert_eq!(header, EXPORT_HEADER.join(","));
    }

    #[test]
    fn empty_export_still_has_header() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(
            csv,
            "ID,Track ID,From,To,Product,Quantity,Distance,Savings,Urgency\n"
        );
        assert!(parse_csv(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn rows_use_store_names_and_tracking_code() {
        let network = surplus_shortage_network(31);
        let approved = crate::lifecycle::approve(
            &suggestion(&network),
            "alice",
            &FixedShippingEstimator::default(),
            Utc::now(),
        )
        .unwrap();
        let rows = export_rows([&approved], &network);
        assert_eq!(rows[0].from_store, "Store store-x");
        assert_eq!(rows[0].to_store, "Store store-y");
        assert_eq!(rows[0].tracking_code.as_deref(), Some("TRK-ts-001-0001"));
    }

    #[test]
    fn export_then_parse_reproduces_rows() {
        let network = surplus_shortage_network(31);
        let mut rows = export_rows([&suggestion(&network)], &network);
        rows.push(ExportRow {
            id: "ts-002".to_string(),
            tracking_code: Some("TRK-ts-002-77".to_string()),
            from_store: "Plano, Legacy".to_string(),
            to_store: "Frisco".to_string(),
            product: "Samsung 65\" 4K TV".to_string(),
            quantity: 45,
            distance_miles: 18.372_914_2,
            estimated_savings: 1234.5,
            urgency: Urgency::Critical,
        });

        let csv = to_csv_string(&rows).unwrap();
        let parsed = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed, rows);
        assert!(parsed[0].tracking_code.is_none());
    }

    #[test]
    fn malformed_row_is_reported_with_position() {
        let input = "ID,Track ID,From,To,Product,Quantity,Distance,Savings,Urgency\n\
                     ts-001,,A,B,Widget,ten,1.0,2.0,low\n";
        let err = parse_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ExportError::Row { row: 1, .. }));
    }
}
