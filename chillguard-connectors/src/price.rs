//! Market price records and price feeds
//!
//! The scraper regenerates a small record set of premium cuts on a schedule.
//! Files may be CSV (the scraper's native output) or a JSON array; columns
//! are accepted under their English or Spanish names:
//!
//! | Field          | Aliases     |
//! |----------------|-------------|
//! | `product`      | `producto`  |
//! | `price_per_kg` | `precio_kg` |
//! | `store`        | `tienda`    |
//! | `date`         | `fecha`     |
//!
//! [`FilePriceFeed`] never fails: any read or parse problem degrades to
//! [`PriceSource::Fallback`] with a warning.

use crate::MarketPriceFeed;
use chillguard_core::{constants::risk::FALLBACK_PRICE_PER_KG, PriceSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One scraped price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(alias = "producto")]
    pub product: String,
    #[serde(alias = "precio_kg")]
    pub price_per_kg: f64,
    #[serde(alias = "tienda", default)]
    pub store: Option<String>,
    #[serde(alias = "fecha", default)]
    pub date: Option<NaiveDate>,
}

/// Price record set errors
#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("Failed to read price records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No price records")]
    Empty,
}

fn column(header: &[String], names: &[&str]) -> Option<usize> {
    header.iter().position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

/// Split one CSV line, honoring double-quoted fields
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Parse the scraper's CSV output
pub fn parse_csv(input: &str) -> Result<Vec<PriceRecord>, PriceFeedError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_start_matches('\u{feff}')))
        .filter(|(_, line)| !line.trim().is_empty());

    let header = match lines.next() {
        Some((_, line)) => split_line(line),
        None => return Err(PriceFeedError::Empty),
    };

    let product_col =
        column(&header, &["product", "producto"]).ok_or(PriceFeedError::MissingColumn("product"))?;
    let price_col = column(&header, &["price_per_kg", "precio_kg"])
        .ok_or(PriceFeedError::MissingColumn("price_per_kg"))?;
    let store_col = column(&header, &["store", "tienda"]);
    let date_col = column(&header, &["date", "fecha"]);

    let mut records = Vec::new();
    for (line, text) in lines {
        let fields = split_line(text);
        let field = |index: usize| fields.get(index).map(String::as_str).unwrap_or("");

        let price_per_kg = field(price_col).parse::<f64>().map_err(|e| PriceFeedError::Malformed {
            line,
            reason: format!("price {:?}: {}", field(price_col), e),
        })?;

        let date = match date_col.map(field).filter(|d| !d.is_empty()) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                PriceFeedError::Malformed { line, reason: format!("date {raw:?}: {e}") }
            })?),
            None => None,
        };

        records.push(PriceRecord {
            product: field(product_col).to_string(),
            price_per_kg,
            store: store_col.map(field).filter(|s| !s.is_empty()).map(str::to_string),
            date,
        });
    }

    Ok(records)
}

/// Parse a JSON array of records
pub fn parse_json(input: &str) -> Result<Vec<PriceRecord>, PriceFeedError> {
    Ok(serde_json::from_str(input)?)
}

/// Parse either format, sniffing JSON by its leading bracket
pub fn parse_records(input: &str) -> Result<Vec<PriceRecord>, PriceFeedError> {
    if input.trim_start().starts_with('[') {
        parse_json(input)
    } else {
        parse_csv(input)
    }
}

/// Mean price per kilogram
///
/// Every price must be finite and positive; one bad record rejects the set.
pub fn average(records: &[PriceRecord]) -> Result<f64, PriceFeedError> {
    if records.is_empty() {
        return Err(PriceFeedError::Empty);
    }

    for (index, record) in records.iter().enumerate() {
        if !record.price_per_kg.is_finite() || record.price_per_kg <= 0.0 {
            return Err(PriceFeedError::Malformed {
                line: index + 1,
                reason: format!("{}: price {}", record.product, record.price_per_kg),
            });
        }
    }

    let total: f64 = records.iter().map(|r| r.price_per_kg).sum();
    Ok(total / records.len() as f64)
}

/// Price feed backed by the scraper's output file
#[derive(Debug, Clone)]
pub struct FilePriceFeed {
    path: PathBuf,
    fallback: f64,
}

impl FilePriceFeed {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), fallback: FALLBACK_PRICE_PER_KG }
    }

    /// Override the fallback price
    pub fn with_fallback(mut self, price_per_kg: f64) -> Self {
        self.fallback = price_per_kg;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and average the current record set
    pub async fn load(&self) -> Result<f64, PriceFeedError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        average(&parse_records(&contents)?)
    }
}

#[async_trait::async_trait]
impl MarketPriceFeed for FilePriceFeed {
    async fn average_price_per_kg(&self) -> PriceSource {
        match self.load().await {
            Ok(price) => PriceSource::live_or(Some(price), self.fallback),
            Err(e) => {
                log::warn!(
                    "price records at {} unusable ({}), using fallback {}",
                    self.path.display(),
                    e,
                    self.fallback
                );
                PriceSource::Fallback(self.fallback)
            }
        }
    }
}

/// Fixed price feed
#[derive(Debug, Clone, Copy)]
pub struct StaticPriceFeed {
    source: PriceSource,
}

impl StaticPriceFeed {
    pub fn new(source: PriceSource) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl MarketPriceFeed for StaticPriceFeed {
    async fn average_price_per_kg(&self) -> PriceSource {
        self.source
    }
}
