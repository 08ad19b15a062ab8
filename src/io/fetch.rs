use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result, anyhow};

/// Read-only access to source payloads by URL.
/// Any error is fatal for the run; implementations do not retry.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP(S) fetcher.
#[cfg(feature = "download")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "download")]
impl HttpFetcher {
    /// Build a client with the given request timeout and user agent.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        use std::time::Duration;
        use reqwest::redirect::Policy;

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("[io::fetch] Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[cfg(feature = "download")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned error status"))?;
        let bytes = resp.bytes()
            .with_context(|| format!("GET {url}: failed to read response body"))?;
        Ok(bytes.to_vec())
    }
}

/// Fetcher for local paths and `file://` URLs.
#[derive(Debug, Default, Clone)]
pub struct LocalFetcher {
    root: Option<PathBuf>,
}

impl LocalFetcher {
    /// Resolve relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: Some(root.into()) } }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

impl Fetcher for LocalFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.resolve(url);
        std::fs::read(&path)
            .with_context(|| format!("[io::fetch] Failed to read {}", path.display()))
    }
}

/// In-memory fetcher keyed by URL.
#[derive(Debug, Default, Clone)]
pub struct MemFetcher {
    payloads: HashMap<String, Vec<u8>>,
}

impl MemFetcher {
    pub fn new() -> Self { Self::default() }

    /// Register `bytes` under `url`.
    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.payloads.insert(url.into(), bytes.into());
        self
    }
}

impl Fetcher for MemFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.payloads.get(url).cloned()
            .ok_or_else(|| anyhow!("no payload registered for {url}"))
    }
}

/// Dispatches `http(s)://` URLs to HTTP and everything else to the filesystem.
pub struct AutoFetcher {
    #[cfg(feature = "download")]
    http: HttpFetcher,
    local: LocalFetcher,
}

impl AutoFetcher {
    #[cfg(feature = "download")]
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        Ok(Self { http: HttpFetcher::new(timeout_secs, user_agent)?, local: LocalFetcher::default() })
    }

    #[cfg(not(feature = "download"))]
    pub fn new(_timeout_secs: u64, _user_agent: &str) -> Result<Self> {
        Ok(Self { local: LocalFetcher::default() })
    }
}

#[inline]
fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Fetcher for AutoFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if is_remote(url) {
            #[cfg(feature = "download")]
            return self.http.fetch(url);
            #[cfg(not(feature = "download"))]
            anyhow::bail!("[io::fetch] {url} requires the `download` feature");
        }
        self.local.fetch(url)
    }
}
