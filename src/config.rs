//! MCP endpoint resolution
//!
//! The connection descriptor is derived from:
//! 1. Environment variable EXA_MCP_URL (endpoint override)
//! 2. Environment variable EXA_MCP_TOOLS (tools allowlist override)
//! 3. The API key, attached as the `exaApiKey` query parameter
//! 4. Default values
//!
//! An explicit override always replaces a query parameter already embedded
//! in the base URL; a default only fills in when the parameter is absent.

use url::Url;

use crate::error::Result;

/// Hosted Exa MCP endpoint used when no override is given
pub const DEFAULT_ENDPOINT: &str = "https://mcp.exa.ai/mcp";

/// Default tools allowlist requested from the endpoint
pub const DEFAULT_TOOLS: &str = "web_search_exa,crawling_exa,deep_search_exa,get_code_context_exa,company_research_exa,linkedin_search_exa,deep_researcher_start,deep_researcher_check";

/// Environment overrides for endpoint resolution
///
/// Kept separate from [`McpEndpoint::resolve`] so resolution itself stays a
/// pure function.
#[derive(Debug, Clone, Default)]
pub struct EndpointOverrides {
    /// Full endpoint URL override (EXA_MCP_URL)
    pub url: Option<String>,
    /// Tools allowlist override, comma-separated (EXA_MCP_TOOLS)
    pub tools: Option<String>,
}

impl EndpointOverrides {
    /// Read overrides from the process environment, treating empty values
    /// as unset
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("EXA_MCP_URL").ok().filter(|v| !v.is_empty()),
            tools: std::env::var("EXA_MCP_TOOLS").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Resolved MCP connection descriptor
///
/// Built once per client and held for its lifetime; each call opens its own
/// transport connection against this URL.
#[derive(Debug, Clone)]
pub struct McpEndpoint {
    url: Url,
}

impl McpEndpoint {
    /// Derive the endpoint URL from overrides and the API key
    ///
    /// Malformed override URLs surface as [`crate::ExaError::InvalidEndpoint`].
    pub fn resolve(overrides: &EndpointOverrides, api_key: Option<&str>) -> Result<Self> {
        let base = overrides.url.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let mut url = Url::parse(base)?;

        match overrides.tools.as_deref() {
            Some(tools) => set_query_param(&mut url, "tools", tools, true),
            None => set_query_param(&mut url, "tools", DEFAULT_TOOLS, false),
        }

        // The key comes from the caller, so it counts as explicit and
        // replaces any key embedded in an override URL.
        if let Some(key) = api_key {
            set_query_param(&mut url, "exaApiKey", key, true);
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Set a query parameter on the URL
///
/// `explicit` marks the value as an override: it replaces an existing
/// parameter of the same name. Non-explicit (default) values are only
/// applied when the parameter is absent.
fn set_query_param(url: &mut Url, key: &str, value: &str, explicit: bool) {
    let present = url.query_pairs().any(|(k, _)| k.as_ref() == key);
    if present && !explicit {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k.as_ref() != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut editor = url.query_pairs_mut();
    editor.clear();
    for (k, v) in &kept {
        editor.append_pair(k, v);
    }
    editor.append_pair(key, value);
}
