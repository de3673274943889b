//! Receipt documents linked from notifications.
//!
//! The bank's receipt links point at a PDF whose first page carries the reason,
//! receiver, payer and payment time. Anything that goes wrong here degrades to
//! "no receipt": the notification alone is still a usable record.

use std::panic;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, warn};

/// Page separator in pdf-extract's plain text output.
const PAGE_BREAK: char = '\u{000C}';

pub trait ReceiptSource {
    /// Text of the first page of the receipt at `url`, or `None` when it cannot
    /// be fetched or read.
    fn first_page_text(&self, url: &str) -> Option<String>;
}

/// Never fetches anything; used for offline runs.
pub struct NoReceipts;

impl ReceiptSource for NoReceipts {
    fn first_page_text(&self, _url: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Skip TLS certificate verification. The receipt host's certificate chain
    /// is not trusted by stock roots, so some users need this.
    pub insecure: bool,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct HttpReceipts {
    client: Client,
    timeout: Duration,
}

impl HttpReceipts {
    pub fn new(options: FetchOptions) -> Result<Self> {
        if options.insecure {
            warn!("TLS certificate verification is disabled for receipt downloads");
        }
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            timeout: options.timeout,
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.map_request_error(e))?;
        let status = response.status();
        if !status.is_success() {
            bail!("receipt server returned HTTP {}", status.as_u16());
        }
        let body = response.bytes().context("Failed to read receipt body")?;
        Ok(body.to_vec())
    }

    fn map_request_error(&self, error: reqwest::Error) -> anyhow::Error {
        if error.is_timeout() {
            anyhow!("receipt request timed out after {} seconds", self.timeout.as_secs())
        } else if error.is_connect() {
            anyhow!("unable to connect to receipt server: {error}")
        } else {
            anyhow!("receipt request failed: {error}")
        }
    }
}

impl ReceiptSource for HttpReceipts {
    fn first_page_text(&self, url: &str) -> Option<String> {
        let bytes = match self.download(url) {
            Ok(b) => b,
            Err(e) => {
                warn!(%url, "Error fetching receipt: {e:#}");
                return None;
            }
        };
        debug!(%url, size = bytes.len(), "downloaded receipt");
        match pdf_first_page(&bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(%url, "Error reading receipt: {e:#}");
                None
            }
        }
    }
}

/// Extract the text of the first non-blank page of a PDF.
pub fn pdf_first_page(pdf: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed inputs instead of returning an error
    let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf))
        .map_err(|_| anyhow!("PDF parser crashed on malformed document"))?
        .map_err(|e| anyhow!("Failed to extract PDF text: {e}"))?;
    first_page(&text)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("document has no text pages"))
}

fn first_page(text: &str) -> Option<&str> {
    text.split(PAGE_BREAK).find(|page| !page.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::Field;
    use crate::rules::CompiledRules;

    const RECEIPT_PDF: &[u8] = include_bytes!("../tests/data/receipt.pdf");

    fn words(value: Option<&str>) -> String {
        value.unwrap_or_default().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_first_page_splits_on_form_feed() {
        let text = "Payer  A\nReceiver  B\n\u{000C}Page two\n";
        assert_eq!(first_page(text), Some("Payer  A\nReceiver  B\n"));
    }

    #[test]
    fn test_first_page_skips_blank_leading_pages() {
        assert_eq!(first_page("\n\n\u{000C}  \u{000C}Body\n"), Some("Body\n"));
        assert_eq!(first_page(" \u{000C}\n"), None);
        assert_eq!(first_page(""), None);
    }

    #[test]
    fn test_receipt_pdf_yields_receipt_fields() {
        let page = pdf_first_page(RECEIPT_PDF).unwrap();
        let fields = CompiledRules::builtin().unwrap().receipt.extract(&page);
        assert!(words(fields.get(Field::Payer)).starts_with("ALMAZ TADESSE"));
        assert!(words(fields.get(Field::Receiver)).starts_with("ABEBE KEBEDE"));
        assert!(words(fields.get(Field::PaymentDatetime)).contains("9:15:02"));
        assert_eq!(words(fields.get(Field::Reason)), "house rent");
        assert_eq!(fields.get(Field::TransactionAmount), None);
    }

    #[test]
    fn test_garbage_document_is_an_error() {
        assert!(pdf_first_page(b"<html>Service unavailable</html>").is_err());
        assert!(pdf_first_page(b"").is_err());
    }

    #[test]
    fn test_unreachable_host_yields_no_receipt() {
        let receipts = HttpReceipts::new(FetchOptions {
            insecure: false,
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        assert!(receipts.first_page_text("https://127.0.0.1:1/receipt").is_none());
    }

    #[test]
    fn test_malformed_url_yields_no_receipt() {
        let receipts = HttpReceipts::new(FetchOptions::default()).unwrap();
        assert!(receipts.first_page_text("https://").is_none());
    }
}
