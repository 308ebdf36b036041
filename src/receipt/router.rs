// src/receipt/router.rs
use super::models::SourceNetwork;

/// Identifiers issued by CBE all start with this prefix; everything else is
/// treated as a Telebirr transaction number.
const CBE_ID_PREFIX: &str = "FT";

const CBE_RECEIPT_URL: &str = "https://apps.cbe.com.et:100/?id=";
/// Fixed account suffix the CBE receipt service expects appended to the
/// transaction id.
const CBE_ACCOUNT_SUFFIX: &str = "29012935";

const TELEBIRR_RECEIPT_URL: &str = "https://transactioninfo.ethiotelecom.et/receipt/";

/// Network selection plus the receipt URL to fetch for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedLookup {
    pub network: SourceNetwork,
    pub url: String,
}

/// Selects the source network from the identifier's shape and builds the
/// matching receipt URL. Pure string work; malformed identifiers are passed
/// through and left to fail at the fetch step.
pub fn route(transaction_id: &str) -> RoutedLookup {
    if transaction_id.starts_with(CBE_ID_PREFIX) {
        RoutedLookup {
            network: SourceNetwork::Cbe,
            url: format!("{}{}{}", CBE_RECEIPT_URL, transaction_id, CBE_ACCOUNT_SUFFIX),
        }
    } else {
        RoutedLookup {
            network: SourceNetwork::Telebirr,
            url: format!("{}{}", TELEBIRR_RECEIPT_URL, transaction_id),
        }
    }
}
