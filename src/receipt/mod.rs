// src/receipt/mod.rs
pub mod client;
pub mod models;
pub mod router;

pub use models::{PaymentRecord, SourceNetwork};

use crate::extractors;
use crate::utils::AppError;

/// Resolves a transaction id into a canonical payment record: select the
/// source network, fetch its receipt document, run the matching extractor.
///
/// A lookup either yields a complete record or a single error; there is no
/// partial-success path. Missing individual fields are handled inside the
/// extractors and never surface here.
pub async fn resolve(transaction_id: &str) -> Result<PaymentRecord, AppError> {
    if transaction_id.trim().is_empty() {
        return Err(AppError::Config(
            "transaction id must not be empty".to_string(),
        ));
    }

    let lookup = router::route(transaction_id);
    tracing::info!(
        "Resolving {} via {} ({})",
        transaction_id,
        lookup.network,
        lookup.url
    );

    let record = match lookup.network {
        SourceNetwork::Cbe => {
            let bytes = client::fetch_pdf(&lookup.url).await?;
            extractors::cbe::extract(&bytes, transaction_id, &lookup.url)?
        }
        SourceNetwork::Telebirr => {
            let html = client::fetch_html(&lookup.url).await?;
            extractors::telebirr::extract(&html, transaction_id, &lookup.url)?
        }
    };

    tracing::info!("Resolved {} from {}", transaction_id, record.source);
    Ok(record)
}
