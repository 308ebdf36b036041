// src/extractors/telebirr.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::flatten_whitespace;
use crate::receipt::models::{PaymentRecord, ReceiptFields, SourceNetwork, TelebirrFields};
use crate::utils::error::ExtractError;

/// Phrase the receipt service renders when the transaction number is not
/// recognized. The one case where the document itself declares failure.
const INVALID_ID_SENTINEL: &str = "This request is not correct";

const BANK_ACCOUNT_FALLBACK: &str = "Not available";

// --- CSS Selectors (Lazy Static) ---
static TD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to compile TD_SELECTOR"));

/// Header cells of the receipt-number row carry a `receipt*` class, unlike
/// the label/value table used by the other fields.
static MARKER_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td[class*='receipt']").expect("Failed to compile MARKER_CELL_SELECTOR")
});

// --- Structural offsets from the marker cell ---
// The marker row holds three header cells; the matching values sit one row
// below, so the first value is three cells forward in document order.
const RECEIPT_NUMBER_OFFSET: usize = 3;
const PAYMENT_DATE_OFFSET: usize = 4;

// --- Bilingual label rule table ---
// Each field is found by its own label match, independent of row order.
struct LabelRule {
    name: &'static str,
    label: &'static str,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        name: "paymentType",
        label: "የክፍያው አይነት/Payment Type",
    },
    LabelRule {
        name: "payerName",
        label: "የከፋይ ስም/Payer Name",
    },
    LabelRule {
        name: "payerTelebirrNumber",
        label: "የከፋይ ቴሌብር ቁ./Payer telebirr no.",
    },
    LabelRule {
        name: "creditedPartyName",
        label: "የገንዘብ ተቀባይ ስም/Credited Party name",
    },
    LabelRule {
        name: "bankAccountNumber",
        label: "የባንክ አካውንት ቁጥር/Bank account number",
    },
    LabelRule {
        name: "totalAmountPaid",
        label: "ጠቅላላ የተከፈለ/Total Paid Amount",
    },
];

/// Extracts the canonical field set from a Telebirr receipt page.
///
/// The sentinel-phrase check is the only fatal path; a missing individual
/// cell degrades to an empty string or the bank-account fallback.
pub fn extract(html: &str, transaction_id: &str, link: &str) -> Result<PaymentRecord, ExtractError> {
    if html.contains(INVALID_ID_SENTINEL) {
        tracing::warn!("Receipt service rejected transaction id: {}", transaction_id);
        return Err(ExtractError::InvalidIdentifier(transaction_id.to_string()));
    }

    let document = Html::parse_document(html);

    Ok(PaymentRecord {
        source: SourceNetwork::Telebirr,
        transaction_id: transaction_id.to_string(),
        link: link.to_string(),
        data: ReceiptFields::Telebirr(extract_fields(&document)),
    })
}

fn extract_fields(document: &Html) -> TelebirrFields {
    let field = |name: &str| -> String {
        LABEL_RULES
            .iter()
            .find(|rule| rule.name == name)
            .and_then(|rule| value_after_label(document, rule.label))
            .unwrap_or_default()
    };

    let bank_account = field("bankAccountNumber");

    TelebirrFields {
        payment_type: field("paymentType"),
        payer_name: field("payerName"),
        payer_telebirr_number: field("payerTelebirrNumber"),
        credited_party_name: field("creditedPartyName"),
        bank_account_number: if bank_account.is_empty() {
            BANK_ACCOUNT_FALLBACK.to_string()
        } else {
            bank_account
        },
        receipt_number: cell_at_marker_offset(document, RECEIPT_NUMBER_OFFSET)
            .unwrap_or_default(),
        payment_date: cell_at_marker_offset(document, PAYMENT_DATE_OFFSET).unwrap_or_default(),
        total_amount_paid: field("totalAmountPaid"),
    }
}

/// Finds the first table cell whose text contains `label` and returns the
/// text of the immediately following sibling cell. The generic primitive
/// behind every label-adjacent field.
fn value_after_label(document: &Html, label: &str) -> Option<String> {
    for cell in document.select(&TD_SELECTOR) {
        if cell_text(&cell).contains(label) {
            return next_cell(&cell).map(|value| cell_text(&value));
        }
    }
    None
}

fn next_cell<'a>(cell: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    cell.next_siblings().find_map(ElementRef::wrap)
}

fn cell_text(cell: &ElementRef) -> String {
    flatten_whitespace(&cell.text().collect::<String>())
}

/// Reads the cell `offset` positions after the marker header cell, in
/// document order over all table cells.
fn cell_at_marker_offset(document: &Html, offset: usize) -> Option<String> {
    let marker = document.select(&MARKER_CELL_SELECTOR).next()?;
    let cells: Vec<ElementRef> = document.select(&TD_SELECTOR).collect();
    let index = cells.iter().position(|cell| cell.id() == marker.id())?;
    cells.get(index + offset).map(cell_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECEIPT_HTML: &str = r#"
        <!DOCTYPE html>
        <html><body>
        <table>
            <tr><td>የክፍያው አይነት/Payment Type</td><td>Transfer</td></tr>
            <tr><td>የከፋይ ስም/Payer Name</td><td>Abebe Kebede</td></tr>
            <tr><td>የከፋይ ቴሌብር ቁ./Payer telebirr no.</td><td>2519****5678</td></tr>
            <tr><td>የገንዘብ ተቀባይ ስም/Credited Party name</td><td>Sara General Trading</td></tr>
            <tr><td>የባንክ አካውንት ቁጥር/Bank account number</td><td>1000234567890</td></tr>
            <tr><td>ጠቅላላ የተከፈለ/Total Paid Amount</td><td>150.00 Birr</td></tr>
        </table>
        <table>
            <tr>
                <td class="receiptTd">የክፍያ ቁጥር/Receipt No</td>
                <td class="receiptTd">የክፍያ ቀን/Payment date</td>
                <td class="receiptTd">የክፍያው ሁኔታ/Payment status</td>
            </tr>
            <tr>
                <td>CHE1234TEST</td>
                <td>2024-06-20 15:32:12</td>
                <td>Completed</td>
            </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn full_receipt_populates_every_field() {
        let record = extract(FULL_RECEIPT_HTML, "CHE1234TEST", "link").unwrap();
        let ReceiptFields::Telebirr(fields) = &record.data else {
            panic!("expected Telebirr field set");
        };

        assert_eq!(record.source, SourceNetwork::Telebirr);
        assert_eq!(fields.payment_type, "Transfer");
        assert_eq!(fields.payer_name, "Abebe Kebede");
        assert_eq!(fields.payer_telebirr_number, "2519****5678");
        assert_eq!(fields.credited_party_name, "Sara General Trading");
        assert_eq!(fields.bank_account_number, "1000234567890");
        assert_eq!(fields.receipt_number, "CHE1234TEST");
        assert_eq!(fields.payment_date, "2024-06-20 15:32:12");
        assert_eq!(fields.total_amount_paid, "150.00 Birr");
    }

    #[test]
    fn sentinel_phrase_fails_with_invalid_identifier() {
        let html = "<html><body><p>This request is not correct.</p></body></html>";
        let err = extract(html, "BOGUS1", "link").expect_err("sentinel should fail");
        assert!(matches!(err, ExtractError::InvalidIdentifier(id) if id == "BOGUS1"));
    }

    #[test]
    fn empty_bank_account_cell_falls_back() {
        let html = r#"
            <html><body>
            <table>
                <tr><td>የከፋይ ስም/Payer Name</td><td>Abebe Kebede</td></tr>
                <tr><td>የባንክ አካውንት ቁጥር/Bank account number</td><td>   </td></tr>
                <tr><td>ጠቅላላ የተከፈለ/Total Paid Amount</td><td>150.00 Birr</td></tr>
            </table>
            </body></html>
        "#;
        let record = extract(html, "CHE1234TEST", "link").unwrap();
        let ReceiptFields::Telebirr(fields) = &record.data else {
            panic!("expected Telebirr field set");
        };

        assert_eq!(fields.bank_account_number, "Not available");
        assert_eq!(fields.payer_name, "Abebe Kebede");
        assert_eq!(fields.total_amount_paid, "150.00 Birr");
    }

    #[test]
    fn missing_labels_degrade_to_empty_strings_without_error() {
        let html = "<html><body><table><tr><td>unrelated</td><td>cells</td></tr></table></body></html>";
        let record = extract(html, "CHE1234TEST", "link").unwrap();
        let ReceiptFields::Telebirr(fields) = &record.data else {
            panic!("expected Telebirr field set");
        };

        assert_eq!(fields.payer_name, "");
        assert_eq!(fields.receipt_number, "");
        assert_eq!(fields.payment_date, "");
        assert_eq!(fields.bank_account_number, "Not available");
    }

    #[test]
    fn label_lookup_is_independent_of_row_order() {
        // Same rows shuffled; every field still finds its own label.
        let html = r#"
            <html><body>
            <table>
                <tr><td>ጠቅላላ የተከፈለ/Total Paid Amount</td><td>150.00 Birr</td></tr>
                <tr><td>የባንክ አካውንት ቁጥር/Bank account number</td><td>1000234567890</td></tr>
                <tr><td>የከፋይ ስም/Payer Name</td><td>Abebe Kebede</td></tr>
            </table>
            </body></html>
        "#;
        let record = extract(html, "CHE1234TEST", "link").unwrap();
        let ReceiptFields::Telebirr(fields) = &record.data else {
            panic!("expected Telebirr field set");
        };

        assert_eq!(fields.payer_name, "Abebe Kebede");
        assert_eq!(fields.bank_account_number, "1000234567890");
        assert_eq!(fields.total_amount_paid, "150.00 Birr");
    }

    #[test]
    fn extraction_is_idempotent_over_the_same_document() {
        let first = extract(FULL_RECEIPT_HTML, "CHE1234TEST", "link").unwrap();
        let second = extract(FULL_RECEIPT_HTML, "CHE1234TEST", "link").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
