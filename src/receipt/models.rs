// src/receipt/models.rs
use serde::{Deserialize, Serialize};

/// The upstream payment network a transaction id belongs to. Each network
/// publishes its receipts in a different document format (CBE: PDF,
/// Telebirr: HTML) and carries its own field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceNetwork {
    #[serde(rename = "CBE")]
    Cbe,
    Telebirr,
}

impl std::fmt::Display for SourceNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceNetwork::Cbe => write!(f, "CBE"),
            SourceNetwork::Telebirr => write!(f, "Telebirr"),
        }
    }
}

/// Fields extracted from a CBE receipt PDF.
///
/// Fields without a fallback policy serialize as `null` when the document
/// lacks them; `payer_account`, `receiver_account` and `total_amount` are
/// always populated (see the fallback constants in `extractors::cbe`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbeFields {
    pub payer: Option<String>,
    pub payer_account: String,
    pub receiver: Option<String>,
    pub receiver_account: String,
    pub payment_date_time: Option<String>,
    pub reference_no: Option<String>,
    pub reason: Option<String>,
    pub total_amount: String,
}

/// Fields extracted from a Telebirr receipt page. A field whose cell is
/// missing comes back as an empty string, except `bank_account_number`
/// which has its own fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelebirrFields {
    pub payment_type: String,
    pub payer_name: String,
    pub payer_telebirr_number: String,
    pub credited_party_name: String,
    pub bank_account_number: String,
    pub receipt_number: String,
    pub payment_date: String,
    pub total_amount_paid: String,
}

/// Per-network field set. Untagged so the wire shape is the plain field
/// object; the two schemas have disjoint required keys, which is what lets
/// deserialization pick the right variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReceiptFields {
    Cbe(CbeFields),
    Telebirr(TelebirrFields),
}

/// The canonical output of one resolved transaction: which network issued
/// it, the link the receipt was fetched from, and the normalized field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub source: SourceNetwork,
    pub transaction_id: String,
    pub link: String,
    pub data: ReceiptFields,
}
