//! Routing client: MCP-vs-direct dispatch for Exa operations
//!
//! Every operation except `answer` goes over the hosted MCP endpoint; the
//! REST client is retained for `answer` (and keeps its other methods so the
//! direct path stays viable, see [`crate::api`]). Options with no MCP
//! representation are rejected up front by named guards, before any
//! network traffic.

use serde_json::{json, Map, Value};

use crate::api::{AnswerOptions, AnswerResponse, ExaApi};
use crate::config::{EndpointOverrides, McpEndpoint};
use crate::error::{ExaError, Result};
use crate::mcp::render::render;
use crate::mcp::transport::{McpConnection, McpSession};

/// Research models the MCP endpoint accepts
pub const RESEARCH_MODELS: [&str; 2] = ["exa-research", "exa-research-pro"];

const DEFAULT_RESEARCH_MODEL: &str = "exa-research";

// ============================================================================
// Dispatch table
// ============================================================================

/// Logical operations the client exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    GetContents,
    Answer,
    ResearchCreate,
    ResearchGet,
    DeepSearch,
    CodeContext,
    CompanyResearch,
    LinkedinSearch,
}

/// Which path serves an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Mcp,
    Sdk,
}

impl Operation {
    /// The whole dispatch decision in one place: `answer` has no MCP tool
    /// wired, everything else goes over MCP even where a direct method
    /// exists.
    pub fn route(self) -> Route {
        match self {
            Operation::Answer => Route::Sdk,
            _ => Route::Mcp,
        }
    }

    /// MCP tool serving this operation, if routed over MCP
    pub fn tool_name(self) -> Option<&'static str> {
        match self {
            Operation::Search => Some("web_search_exa"),
            Operation::GetContents => Some("crawling_exa"),
            Operation::Answer => None,
            Operation::ResearchCreate => Some("deep_researcher_start"),
            Operation::ResearchGet => Some("deep_researcher_check"),
            Operation::DeepSearch => Some("deep_search_exa"),
            Operation::CodeContext => Some("get_code_context_exa"),
            Operation::CompanyResearch => Some("company_research_exa"),
            Operation::LinkedinSearch => Some("linkedin_search_exa"),
        }
    }
}

// ============================================================================
// Option bags and output
// ============================================================================

/// Options for `search`
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub num_results: Option<u32>,
    /// `auto`, `keyword`, `neural`, or `fast`
    pub search_type: Option<String>,
    /// Per-result text truncation, mapped to `contextMaxCharacters`
    pub max_characters: Option<u32>,
}

/// Options for `get_contents`
#[derive(Debug, Clone, Default)]
pub struct ContentsOptions {
    /// Page text truncation, mapped to `maxCharacters`
    pub max_characters: Option<u32>,
}

/// Options for `research_create`
#[derive(Debug, Clone, Default)]
pub struct ResearchCreateOptions {
    /// Defaults to `exa-research`; must be an MCP-exposed research model
    pub model: Option<String>,
}

/// Options for `research_get`
#[derive(Debug, Clone, Default)]
pub struct ResearchGetOptions {
    /// Stream task events. Has no MCP representation and is rejected.
    pub events: bool,
}

/// Result returned to the command layer, tagged by origin
///
/// The MCP path always produces `Text`; `Structured` carries a
/// vendor-shaped response from the direct path.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientOutput {
    Text(String),
    Structured(Value),
}

impl ClientOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ClientOutput::Text(text) => Some(text),
            ClientOutput::Structured(_) => None,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Dual-path Exa client
///
/// Holds only immutable configuration; concurrent calls are independent
/// and each opens its own transport connection.
pub struct ExaClient {
    endpoint: McpEndpoint,
    api: ExaApi,
}

impl ExaClient {
    /// Build a client from the process environment and an API key
    pub fn new(api_key: &str) -> Result<Self> {
        let endpoint = McpEndpoint::resolve(&EndpointOverrides::from_env(), Some(api_key))?;
        Ok(Self {
            endpoint,
            api: ExaApi::new(api_key),
        })
    }

    /// Build a client from an already-resolved endpoint
    pub fn with_endpoint(endpoint: McpEndpoint, api: ExaApi) -> Self {
        Self { endpoint, api }
    }

    /// Web search
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<ClientOutput> {
        let text = self
            .call_mcp(Operation::Search, search_args(query, options))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// Fetch page contents. The MCP crawling tool takes a single URL;
    /// supplying more than one is rejected before any network call.
    pub async fn get_contents(
        &self,
        urls: &[String],
        options: &ContentsOptions,
    ) -> Result<ClientOutput> {
        let url = guard_single_url(urls)?;
        let text = self
            .call_mcp(Operation::GetContents, contents_args(url, options))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// Answer a question with citations (direct API, vendor shape)
    pub async fn answer(&self, query: &str, options: &AnswerOptions) -> Result<AnswerResponse> {
        self.api.answer(query, options).await
    }

    /// Start a deep research task
    pub async fn research_create(
        &self,
        instructions: &str,
        options: &ResearchCreateOptions,
    ) -> Result<ClientOutput> {
        let model = guard_research_model(options.model.as_deref())?;
        let args = json!({ "instructions": instructions, "model": model });
        let text = self.call_mcp(Operation::ResearchCreate, args).await?;
        Ok(ClientOutput::Text(text))
    }

    /// Check a deep research task
    pub async fn research_get(
        &self,
        id: &str,
        options: &ResearchGetOptions,
    ) -> Result<ClientOutput> {
        guard_no_events(options)?;
        let text = self
            .call_mcp(Operation::ResearchGet, json!({ "taskId": id }))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// Agentic search driven by an objective and optional seed queries
    pub async fn deep_search(&self, objective: &str, queries: &[String]) -> Result<ClientOutput> {
        let mut args = Map::new();
        args.insert("objective".to_string(), json!(objective));
        if !queries.is_empty() {
            args.insert("queries".to_string(), json!(queries));
        }
        let text = self
            .call_mcp(Operation::DeepSearch, Value::Object(args))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// Search code documentation and examples
    pub async fn code_context(&self, query: &str, tokens_num: Option<u32>) -> Result<ClientOutput> {
        let mut args = Map::new();
        args.insert("query".to_string(), json!(query));
        if let Some(tokens) = tokens_num {
            args.insert("tokensNum".to_string(), json!(tokens));
        }
        let text = self
            .call_mcp(Operation::CodeContext, Value::Object(args))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// Research a company by name
    pub async fn company_research(
        &self,
        name: &str,
        num_results: Option<u32>,
    ) -> Result<ClientOutput> {
        let mut args = Map::new();
        args.insert("companyName".to_string(), json!(name));
        if let Some(n) = num_results {
            args.insert("numResults".to_string(), json!(n));
        }
        let text = self
            .call_mcp(Operation::CompanyResearch, Value::Object(args))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// Search LinkedIn profiles or companies
    pub async fn linkedin_search(
        &self,
        query: &str,
        search_type: Option<&str>,
        num_results: Option<u32>,
    ) -> Result<ClientOutput> {
        let mut args = Map::new();
        args.insert("query".to_string(), json!(query));
        if let Some(ty) = search_type {
            args.insert("searchType".to_string(), json!(ty));
        }
        if let Some(n) = num_results {
            args.insert("numResults".to_string(), json!(n));
        }
        let text = self
            .call_mcp(Operation::LinkedinSearch, Value::Object(args))
            .await?;
        Ok(ClientOutput::Text(text))
    }

    /// List the tools the endpoint advertises
    pub async fn available_tools(&self) -> Result<Vec<String>> {
        let mut session = McpConnection::open(&self.endpoint).await?;
        let result = session.list_tools().await;
        close_session(&mut session).await;
        result
    }

    async fn call_mcp(&self, op: Operation, args: Value) -> Result<String> {
        let tool = op
            .tool_name()
            .ok_or_else(|| ExaError::ToolUnavailable(format!("{op:?}")))?;

        let mut session = McpConnection::open(&self.endpoint).await?;
        run_with_session(&mut session, tool, args).await
    }
}

// ============================================================================
// MCP call driver
// ============================================================================

/// Drive one tool call over an open session, closing it on every exit path
pub(crate) async fn run_with_session<S: McpSession>(
    session: &mut S,
    tool: &str,
    args: Value,
) -> Result<String> {
    let result = drive(session, tool, args).await;
    close_session(session).await;
    result
}

async fn drive<S: McpSession>(session: &mut S, tool: &str, args: Value) -> Result<String> {
    let tools = session.list_tools().await?;
    if !tools.iter().any(|t| t == tool) {
        return Err(ExaError::ToolUnavailable(tool.to_string()));
    }

    let outcome = session.call_tool(tool, args).await?;
    let text = render(&outcome);

    // Transport succeeded but the tool itself reported failure; the
    // rendered content is the failure message.
    if outcome.is_error.unwrap_or(false) {
        return Err(ExaError::ToolExecution(text));
    }

    Ok(text)
}

/// Close failures must not mask the operation's outcome
async fn close_session<S: McpSession>(session: &mut S) {
    if let Err(e) = session.close().await {
        tracing::warn!("failed to close MCP connection: {e}");
    }
}

// ============================================================================
// Guards and argument translation
// ============================================================================

fn guard_single_url(urls: &[String]) -> Result<&str> {
    match urls {
        [url] => Ok(url.as_str()),
        [] => Err(ExaError::UnsupportedOption("no URL supplied".to_string())),
        _ => Err(ExaError::UnsupportedOption("multiple URLs".to_string())),
    }
}

fn guard_research_model(model: Option<&str>) -> Result<&'static str> {
    let model = model.unwrap_or(DEFAULT_RESEARCH_MODEL);
    RESEARCH_MODELS
        .iter()
        .copied()
        .find(|m| *m == model)
        .ok_or_else(|| ExaError::UnsupportedOption(format!("research model '{model}'")))
}

fn guard_no_events(options: &ResearchGetOptions) -> Result<()> {
    if options.events {
        return Err(ExaError::UnsupportedOption("events".to_string()));
    }
    Ok(())
}

fn search_args(query: &str, options: &SearchOptions) -> Value {
    let mut args = Map::new();
    args.insert("query".to_string(), json!(query));
    if let Some(n) = options.num_results {
        args.insert("numResults".to_string(), json!(n));
    }
    if let Some(ty) = &options.search_type {
        args.insert("type".to_string(), json!(ty));
    }
    if let Some(max) = options.max_characters {
        args.insert("contextMaxCharacters".to_string(), json!(max));
    }
    Value::Object(args)
}

fn contents_args(url: &str, options: &ContentsOptions) -> Value {
    let mut args = Map::new();
    args.insert("url".to_string(), json!(url));
    if let Some(max) = options.max_characters {
        args.insert("maxCharacters".to_string(), json!(max));
    }
    Value::Object(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ExaApi;
    use crate::mcp::types::ToolOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_client() -> ExaClient {
        let endpoint = McpEndpoint::resolve(&EndpointOverrides::default(), Some("test-key"))
            .expect("default endpoint resolves");
        ExaClient::with_endpoint(endpoint, ExaApi::new("test-key"))
    }

    // ------------------------------------------------------------------
    // Dispatch table
    // ------------------------------------------------------------------

    #[test]
    fn answer_is_the_only_sdk_routed_operation() {
        let all = [
            Operation::Search,
            Operation::GetContents,
            Operation::Answer,
            Operation::ResearchCreate,
            Operation::ResearchGet,
            Operation::DeepSearch,
            Operation::CodeContext,
            Operation::CompanyResearch,
            Operation::LinkedinSearch,
        ];

        for op in all {
            if op == Operation::Answer {
                assert_eq!(op.route(), Route::Sdk);
                assert!(op.tool_name().is_none());
            } else {
                assert_eq!(op.route(), Route::Mcp);
                assert!(op.tool_name().is_some());
            }
        }
    }

    // ------------------------------------------------------------------
    // Guards (fail fast, no network)
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn contents_rejects_multiple_urls_before_connecting() {
        let client = test_client();
        let urls = vec!["https://a.example".to_string(), "https://b.example".to_string()];

        let err = client
            .get_contents(&urls, &ContentsOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExaError::UnsupportedOption(ref d) if d == "multiple URLs"));
    }

    #[tokio::test]
    async fn research_create_rejects_unknown_model_before_connecting() {
        let client = test_client();
        let options = ResearchCreateOptions {
            model: Some("exa-research-fast".to_string()),
        };

        let err = client.research_create("look into it", &options).await.unwrap_err();
        assert!(matches!(err, ExaError::UnsupportedOption(_)));
    }

    #[tokio::test]
    async fn research_get_rejects_events_before_connecting() {
        let client = test_client();
        let options = ResearchGetOptions { events: true };

        let err = client.research_get("task-1", &options).await.unwrap_err();
        assert!(matches!(err, ExaError::UnsupportedOption(ref d) if d == "events"));
    }

    #[test]
    fn known_research_models_pass_the_gate() {
        assert_eq!(guard_research_model(Some("exa-research")).unwrap(), "exa-research");
        assert_eq!(
            guard_research_model(Some("exa-research-pro")).unwrap(),
            "exa-research-pro"
        );
        assert_eq!(guard_research_model(None).unwrap(), "exa-research");
    }

    // ------------------------------------------------------------------
    // Argument translation
    // ------------------------------------------------------------------

    #[test]
    fn search_args_map_option_fields() {
        let options = SearchOptions {
            num_results: Some(5),
            search_type: Some("neural".to_string()),
            max_characters: Some(2000),
        };
        let args = search_args("rust mcp", &options);

        assert_eq!(args["query"], "rust mcp");
        assert_eq!(args["numResults"], 5);
        assert_eq!(args["type"], "neural");
        assert_eq!(args["contextMaxCharacters"], 2000);
    }

    #[test]
    fn unset_options_are_omitted_not_defaulted() {
        let args = search_args("q", &SearchOptions::default());
        assert_eq!(args.as_object().unwrap().len(), 1);

        let args = contents_args("https://a.example", &ContentsOptions::default());
        assert_eq!(args.as_object().unwrap().len(), 1);
        assert_eq!(args["url"], "https://a.example");
    }

    #[test]
    fn contents_truncation_maps_to_max_characters() {
        let options = ContentsOptions {
            max_characters: Some(500),
        };
        let args = contents_args("https://a.example", &options);
        assert_eq!(args["maxCharacters"], 500);
    }

    // ------------------------------------------------------------------
    // Session driver: closure on every path
    // ------------------------------------------------------------------

    enum FakeBehavior {
        Succeed(ToolOutcome),
        MissingTool,
        FailCall,
    }

    struct FakeSession {
        behavior: FakeBehavior,
        tool: &'static str,
        calls: AtomicUsize,
        closes: AtomicUsize,
    }

    impl FakeSession {
        fn new(behavior: FakeBehavior) -> Self {
            Self {
                behavior,
                tool: "web_search_exa",
                calls: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl McpSession for FakeSession {
        async fn list_tools(&self) -> Result<Vec<String>> {
            match self.behavior {
                FakeBehavior::MissingTool => Ok(vec!["something_else".to_string()]),
                _ => Ok(vec![self.tool.to_string()]),
            }
        }

        async fn call_tool(&self, _name: &str, _args: Value) -> Result<ToolOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                FakeBehavior::Succeed(outcome) => Ok(outcome.clone()),
                FakeBehavior::FailCall => {
                    Err(ExaError::Connection("connection reset".to_string()))
                }
                FakeBehavior::MissingTool => unreachable!("tool check happens first"),
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn text_outcome(text: &str, is_error: bool) -> ToolOutcome {
        serde_json::from_value(json!({
            "content": [{"type": "text", "text": text}],
            "isError": is_error,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn success_path_renders_and_closes_once() {
        let mut session = FakeSession::new(FakeBehavior::Succeed(text_outcome("hello", false)));

        let text = run_with_session(&mut session, "web_search_exa", json!({}))
            .await
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_tool_closes_without_calling() {
        let mut session = FakeSession::new(FakeBehavior::MissingTool);

        let err = run_with_session(&mut session, "web_search_exa", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExaError::ToolUnavailable(ref t) if t == "web_search_exa"));
        assert_eq!(session.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_flag_becomes_tool_execution_error_and_closes() {
        let mut session = FakeSession::new(FakeBehavior::Succeed(text_outcome("boom", true)));

        let err = run_with_session(&mut session, "web_search_exa", json!({}))
            .await
            .unwrap_err();
        match err {
            ExaError::ToolExecution(message) => assert!(message.contains("boom")),
            other => panic!("expected ToolExecution, got {other:?}"),
        }
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_failure_mid_call_still_closes() {
        let mut session = FakeSession::new(FakeBehavior::FailCall);

        let err = run_with_session(&mut session, "web_search_exa", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExaError::Connection(_)));
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }
}
