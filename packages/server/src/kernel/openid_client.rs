//! OpenID 2.0 relying party.
//!
//! Discovery is HTML-based (`<link rel="openid2.provider">`); assertions are
//! checked with direct verification (`check_authentication`) so no
//! association state needs to be kept. Before verifying, the claimed
//! identifier is rediscovered so only its own provider can vouch for it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use scraper::{Html, Selector};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::warn;
use url::Url;

use super::BaseIdentityProvider;

const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Fields the provider must cover with its signature.
const REQUIRED_SIGNED_FIELDS: [&str; 5] =
    ["op_endpoint", "return_to", "response_nonce", "claimed_id", "identity"];

/// Assertions older than this (or this far in the future) are refused.
const NONCE_MAX_AGE_MINUTES: i64 = 60;

/// Endpoint and local identifier found on an identifier page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub endpoint: String,
    pub local_id: Option<String>,
}

pub struct OpenIdClient {
    /// Trust root presented to providers, e.g. `https://points.example.org/`
    realm: String,
    /// The only `return_to` accepted in assertions, query excluded
    callback: Url,
    /// Response nonces already accepted, with their issue time
    seen_nonces: Mutex<HashMap<String, DateTime<Utc>>>,
    client: reqwest::Client,
}

impl OpenIdClient {
    pub fn new(realm: String) -> Result<Self> {
        let callback = Url::parse(&realm)
            .and_then(|realm| realm.join("login/callback"))
            .with_context(|| format!("Invalid OpenID realm {}", realm))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            realm,
            callback,
            seen_nonces: Mutex::new(HashMap::new()),
            client,
        })
    }

    async fn discover(&self, identifier: &str) -> Result<ProviderInfo> {
        let response = self
            .client
            .get(identifier)
            .send()
            .await
            .with_context(|| format!("Failed to fetch OpenID identifier {}", identifier))?;

        if !response.status().is_success() {
            anyhow::bail!("OpenID identifier {} returned {}", identifier, response.status());
        }

        let body = response.text().await?;
        find_provider(&body)
            .with_context(|| format!("No OpenID provider advertised at {}", identifier))
    }

    fn check_return_to(&self, return_to: &str) -> Result<()> {
        let mut url =
            Url::parse(return_to).with_context(|| format!("Invalid return_to {}", return_to))?;
        url.set_query(None);
        url.set_fragment(None);

        if url != self.callback {
            anyhow::bail!("OpenID return_to {} does not match {}", return_to, self.callback);
        }
        Ok(())
    }

    /// Accept each nonce once while it is fresh; stale entries are dropped.
    async fn record_nonce(&self, nonce: &str) -> Result<()> {
        let issued = nonce_timestamp(nonce)?;
        let now = Utc::now();
        let max_age = Duration::minutes(NONCE_MAX_AGE_MINUTES);
        if now - issued > max_age || issued - now > max_age {
            anyhow::bail!("OpenID response nonce {} is expired", nonce);
        }

        let mut seen = self.seen_nonces.lock().await;
        seen.retain(|_, issued| now - *issued <= max_age);
        if seen.insert(nonce.to_string(), issued).is_some() {
            anyhow::bail!("OpenID response nonce {} was already used", nonce);
        }
        Ok(())
    }
}

#[async_trait]
impl BaseIdentityProvider for OpenIdClient {
    async fn begin_login(&self, identifier: &str, return_to: &str) -> Result<String> {
        let identifier = normalize_identifier(identifier)?;
        let provider = self.discover(&identifier).await?;

        let mut url = Url::parse(&provider.endpoint)
            .with_context(|| format!("Invalid OpenID endpoint {}", provider.endpoint))?;
        url.query_pairs_mut()
            .append_pair("openid.ns", OPENID_NS)
            .append_pair("openid.mode", "checkid_setup")
            .append_pair("openid.claimed_id", &identifier)
            .append_pair(
                "openid.identity",
                provider.local_id.as_deref().unwrap_or(&identifier),
            )
            .append_pair("openid.return_to", return_to)
            .append_pair("openid.realm", &self.realm);

        Ok(url.into())
    }

    async fn complete_login(&self, params: &HashMap<String, String>) -> Result<String> {
        let field = |name: &str| params.get(name).map(String::as_str);

        match field("openid.mode") {
            Some("id_res") => {}
            Some("cancel") => anyhow::bail!("Login was cancelled"),
            Some(other) => anyhow::bail!("Unexpected OpenID mode: {}", other),
            None => anyhow::bail!("Missing OpenID response"),
        }

        let signed: Vec<&str> = field("openid.signed")
            .context("Missing openid.signed")?
            .split(',')
            .collect();
        if let Some(missing) = REQUIRED_SIGNED_FIELDS
            .into_iter()
            .find(|name| !signed.contains(name))
        {
            anyhow::bail!("OpenID assertion does not sign openid.{}", missing);
        }

        let return_to = field("openid.return_to").context("Missing openid.return_to")?;
        self.check_return_to(return_to)?;

        let endpoint = field("openid.op_endpoint").context("Missing openid.op_endpoint")?;
        let claimed_id = field("openid.claimed_id").context("Missing openid.claimed_id")?;
        let identity = field("openid.identity").context("Missing openid.identity")?;

        // The claimed identifier names the only provider allowed to assert it
        let identifier = normalize_identifier(claimed_id)?;
        let provider = self.discover(&identifier).await?;
        if provider.endpoint != endpoint {
            warn!(
                claimed_id = %claimed_id,
                asserted_endpoint = %endpoint,
                discovered_endpoint = %provider.endpoint,
                "OpenID endpoint not authorized for claimed identifier"
            );
            anyhow::bail!(
                "OpenID endpoint {} is not authorized for {}",
                endpoint,
                claimed_id
            );
        }
        let expected_identity = provider.local_id.as_deref().unwrap_or(&identifier);
        if identity != expected_identity {
            anyhow::bail!(
                "OpenID identity {} does not match {} for {}",
                identity,
                expected_identity,
                claimed_id
            );
        }

        let nonce = field("openid.response_nonce").context("Missing openid.response_nonce")?;
        self.record_nonce(nonce).await?;

        let mut form: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, _)| key.starts_with("openid.") && key.as_str() != "openid.mode")
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        form.push(("openid.mode", "check_authentication"));

        let response = self
            .client
            .post(&provider.endpoint)
            .form(&form)
            .send()
            .await
            .context("Failed to verify OpenID assertion")?;

        if !response.status().is_success() {
            anyhow::bail!("OpenID provider returned {}", response.status());
        }

        let body = response.text().await?;
        if !is_valid_assertion(&body) {
            anyhow::bail!("OpenID provider rejected the assertion");
        }

        Ok(claimed_id.to_string())
    }
}

/// Nonces start with their UTC issue time, e.g. `2005-05-15T17:11:51ZUNIQUE`.
fn nonce_timestamp(nonce: &str) -> Result<DateTime<Utc>> {
    let stamp = nonce
        .get(..20)
        .with_context(|| format!("Malformed OpenID response nonce {}", nonce))?;
    let issued = DateTime::parse_from_rfc3339(stamp)
        .with_context(|| format!("Malformed OpenID response nonce {}", nonce))?;
    Ok(issued.with_timezone(&Utc))
}

/// Users type bare domains; give them a scheme and strip fragments.
pub fn normalize_identifier(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("OpenID identifier is empty");
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url =
        Url::parse(&with_scheme).with_context(|| format!("Invalid OpenID identifier {}", raw))?;
    url.set_fragment(None);
    Ok(url.into())
}

/// Find the OpenID 2.0 (or 1.x) provider links in an HTML document.
pub fn find_provider(html: &str) -> Option<ProviderInfo> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("link[rel][href]").ok()?;

    let mut endpoint = None;
    let mut legacy_endpoint = None;
    let mut local_id = None;

    for link in document.select(&selector) {
        let (Some(rel), Some(href)) = (link.value().attr("rel"), link.value().attr("href")) else {
            continue;
        };
        for rel in rel.split_whitespace() {
            match rel {
                "openid2.provider" => endpoint = Some(href.to_string()),
                "openid.server" => legacy_endpoint = Some(href.to_string()),
                "openid2.local_id" | "openid.delegate" => local_id = Some(href.to_string()),
                _ => {}
            }
        }
    }

    endpoint
        .or(legacy_endpoint)
        .map(|endpoint| ProviderInfo { endpoint, local_id })
}

/// Parse a key-value form response and check `is_valid:true`.
fn is_valid_assertion(body: &str) -> bool {
    body.lines()
        .filter_map(|line| line.split_once(':'))
        .any(|(key, value)| key.trim() == "is_valid" && value.trim() == "true")
}
