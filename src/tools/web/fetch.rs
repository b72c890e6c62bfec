//! Page scraping with SSRF protection
//!
//! Fetches a search hit's page with a browser-like header set and keeps only
//! the visible text of heading and paragraph elements. Requests to
//! private/internal addresses and to banned sites are refused before any
//! connection is made.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_CHARSET, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue,
    LOCATION,
};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use url::Host;

use super::search::SearchSettings;
use crate::{Error, Result};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.84 Safari/537.36";

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

static TEXT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, h1, h2, h3, h4, h5, h6").expect("valid selector")
});

/// Source of page text for search hits
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page and return its extracted text
    ///
    /// # Errors
    ///
    /// Returns error if the page is denied, unreachable, or answers with a
    /// non-success status
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// HTTP page scraper
pub struct PageScraper {
    client: Client,
    banned_sites: Vec<String>,
    is_blocked: fn(IpAddr) -> bool,
}

impl PageScraper {
    /// Create a scraper from search settings (timeout and deny-list)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        Self::with_options(settings.scrape_timeout, settings.banned_sites.clone())
    }

    /// Create a scraper with an explicit timeout and deny-list
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_options(timeout: Duration, banned_sites: Vec<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            // Redirects are followed by hand so every hop passes the SSRF check
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(browser_headers())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            banned_sites,
            is_blocked: is_blocked_ip,
        })
    }

    /// Whether a URL matches the deny-list
    #[must_use]
    pub fn is_banned(&self, url: &str) -> bool {
        self.banned_sites.iter().any(|site| url.contains(site.as_str()))
    }

    /// Refuse banned sites, non-HTTP schemes and private/internal targets
    ///
    /// IP literals are checked directly; domains are resolved and every
    /// returned address must pass.
    async fn check_target(&self, url: &Url) -> Result<()> {
        if self.is_banned(url.as_str()) {
            tracing::debug!(url = %url, "skipping banned site");
            return Err(Error::WebFetch(format!("banned site: {url}")));
        }

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::WebFetch(format!(
                "Invalid scheme: {scheme}. Only http and https are allowed"
            )));
        }

        let port = url.port_or_known_default().unwrap_or(80);
        match url.host() {
            Some(Host::Ipv4(ip)) => self.check_ip(url, IpAddr::V4(ip)),
            Some(Host::Ipv6(ip)) => self.check_ip(url, IpAddr::V6(ip)),
            Some(Host::Domain(domain)) => {
                let addrs = tokio::net::lookup_host((domain, port))
                    .await
                    .map_err(|e| Error::WebFetch(format!("Failed to resolve hostname: {e}")))?;

                for addr in addrs {
                    self.check_ip(url, addr.ip())?;
                }
                Ok(())
            }
            None => Err(Error::WebFetch("URL has no host".to_string())),
        }
    }

    fn check_ip(&self, url: &Url, ip: IpAddr) -> Result<()> {
        if (self.is_blocked)(ip) {
            return Err(Error::WebFetch(format!(
                "Blocked: {} resolves to private/internal IP {ip}",
                url.host_str().unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PageFetcher for PageScraper {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut current =
            Url::parse(url).map_err(|e| Error::WebFetch(format!("Invalid URL: {e}")))?;

        for _ in 0..=MAX_REDIRECTS {
            self.check_target(&current).await?;

            tracing::debug!(url = %current, "scraping page");

            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| Error::WebFetch(format!("Request failed: {e}")))?;

            if response.status().is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| Error::WebFetch("Redirect without location".to_string()))?;
                current = current
                    .join(location)
                    .map_err(|e| Error::WebFetch(format!("Invalid redirect: {e}")))?;
                continue;
            }

            let body = response
                .error_for_status()
                .map_err(|e| Error::WebFetch(format!("Bad status: {e}")))?
                .text()
                .await
                .map_err(|e| Error::WebFetch(format!("Failed to read response body: {e}")))?;

            return Ok(extract_page_text(&body));
        }

        Err(Error::WebFetch(format!("Too many redirects: {url}")))
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
        ),
    );
    headers.insert(
        ACCEPT_CHARSET,
        HeaderValue::from_static("ISO-8859-1,utf-8;q=0.7,*;q=0.3"),
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("none"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

/// Extract visible heading and paragraph text from an HTML document
///
/// Elements are joined with single spaces in document order and pipe
/// characters are stripped.
#[must_use]
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    document
        .select(&TEXT_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "")
}

/// Check if an IP address is private or otherwise blocked
///
/// Blocks the following ranges:
/// - IPv4: 127.0.0.0/8 (loopback), 10.0.0.0/8, 172.16.0.0/12,
///   192.168.0.0/16 (private), 169.254.0.0/16 (link-local),
///   0.0.0.0/8 (current network)
/// - IPv6: `::1` (loopback), `::` (unspecified), `fc00::/7` (unique local),
///   `fe80::/10` (link-local), and IPv4-mapped addresses in any blocked
///   IPv4 range
#[must_use]
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_blocked_ipv4(ipv4),
        IpAddr::V6(ipv6) => is_blocked_ipv6(ipv6),
    }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    a == 0
        || a == 127
        || a == 10
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
        || (a == 169 && b == 254)
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    // ::ffff:0:0/96
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(mapped);
    }

    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }

    let first = ip.segments()[0];
    // fc00::/7
    if first & 0xfe00 == 0xfc00 {
        return true;
    }
    // fe80::/10
    first & 0xffc0 == 0xfe80
}
