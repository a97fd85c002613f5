//! Persistent identifier minting.
//!
//! The assembler asks for identifiers in batches sized to what it is about to
//! build. A batch either arrives complete, in request order, or the request
//! fails as a whole.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::blocking::Client;

use crate::config::{MinterConfig, MINT_BATCH_LIMIT};
use crate::error::{MetsError, Result};
use crate::http::{create_client, post_text};
use crate::types::Ark;

/// Source of persistent identifiers.
pub trait IdentifierMinter {
    /// Mint `count` identifiers, returned in consumption order.
    fn mint_batch(&self, count: usize) -> Result<Vec<Ark>>;
}

/// Mint exactly `count` identifiers, treating a short or long batch as a
/// failure. A zero count never reaches the minter.
pub fn mint_exact(minter: &dyn IdentifierMinter, count: usize) -> Result<Vec<Ark>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let arks = minter.mint_batch(count)?;
    if arks.len() != count {
        return Err(MetsError::ShortBatch {
            requested: count,
            received: arks.len(),
        });
    }
    Ok(arks)
}

/// Offline minter handing out `<prefix>1`, `<prefix>2`, …
#[derive(Debug)]
pub struct SequentialMinter {
    prefix: String,
    next: AtomicU64,
}

impl SequentialMinter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdentifierMinter for SequentialMinter {
    fn mint_batch(&self, count: usize) -> Result<Vec<Ark>> {
        let start = self.next.fetch_add(count as u64, Ordering::Relaxed);
        Ok((start..start + count as u64)
            .map(|n| Ark::new(format!("{}{n}", self.prefix)))
            .collect())
    }
}

/// Client of the PII minting service.
#[derive(Debug)]
pub struct HttpMinter {
    client: Client,
    config: MinterConfig,
}

impl HttpMinter {
    pub fn new(config: MinterConfig) -> Result<Self> {
        config.validate()?;
        let client = create_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }
}

impl IdentifierMinter for HttpMinter {
    fn mint_batch(&self, count: usize) -> Result<Vec<Ark>> {
        if count == 0 || count >= MINT_BATCH_LIMIT {
            return Err(MetsError::InvalidBatchSize(count));
        }

        let url = self.config.mint_url(count);
        tracing::debug!(url = %url, count, "Requesting identifiers");

        let body = post_text(&self.client, &url)?;
        let arks = parse_mint_response(&body, &url)?;
        if arks.len() != count {
            return Err(MetsError::ShortBatch {
                requested: count,
                received: arks.len(),
            });
        }

        tracing::debug!(count, "Identifiers minted");
        Ok(arks)
    }
}

/// Extract minted identifiers from a PII service response.
///
/// Every `Ark` element contributes its `Value` attribute, `Value` child or
/// own text, in document order. Any `Error` element makes the whole response
/// an error.
///
/// # Examples
/// ```
/// use sip_mets::minter::parse_mint_response;
///
/// let xml = "<Pii><TheResults><Results><TheArkList><ArkList><Arks>\
///            <Ark><Value>ark:/81055/a1</Value></Ark>\
///            </Arks></ArkList></TheArkList></Results></TheResults></Pii>";
/// let arks = parse_mint_response(xml, "http://pii/81055").unwrap();
/// assert_eq!(arks[0].as_str(), "ark:/81055/a1");
/// ```
pub fn parse_mint_response(xml: &str, url: &str) -> Result<Vec<Ark>> {
    let doc = roxmltree::Document::parse(xml)?;

    let messages: Vec<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name("Error"))
        .map(|n| {
            let code = n.attribute("Code").unwrap_or_default();
            format!("{code} - {}", element_value(n))
        })
        .collect();
    if !messages.is_empty() {
        tracing::error!(url, errors = messages.len(), "Minting service reported errors");
        return Err(MetsError::MinterService {
            url: url.to_string(),
            messages,
        });
    }

    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("Ark"))
        .map(element_value)
        .filter(|v| !v.is_empty())
        .map(Ark::from)
        .collect())
}

fn element_value(node: roxmltree::Node<'_, '_>) -> String {
    if let Some(value) = node.attribute("Value") {
        return value.trim().to_string();
    }
    node.children()
        .find(|c| c.has_tag_name("Value"))
        .or(Some(node))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}
