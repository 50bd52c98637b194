// Router configuration
//
// RouterConfig can be:
// - Created directly with defaults matching the agent runtime's conventions
// - Built with the fluent RouterConfigBuilder
// - Deserialized (the HTTP service fills it from environment variables)

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::message::InferenceConfig;

/// Reserved tool name that finishes the turn with its `text` argument
pub const DEFAULT_ANSWER_TOOL: &str = "answer";

/// Reserved tool name carrying streamed answer chunks
pub const DEFAULT_STREAM_TOOL: &str = "bedrock_stream_answer_tool";

/// Input text that switches the router into streaming mode
pub const DEFAULT_STREAM_TRIGGER: &str = "send payload";

/// Orchestration strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Reason, act, observe; one model call per tool call
    #[default]
    React,
    /// Plan once, run every planned tool, then summarize
    Rewoo,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::React => "react",
            StrategyKind::Rewoo => "rewoo",
        }
    }

    /// Sampling temperature used when none is configured
    pub fn default_temperature(&self) -> f32 {
        match self {
            StrategyKind::React => 0.7,
            StrategyKind::Rewoo => 0.0,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "react" => Ok(StrategyKind::React),
            "rewoo" => Ok(StrategyKind::Rewoo),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Configuration for the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Tool whose invocation finishes the turn
    #[serde(default = "default_answer_tool")]
    pub answer_tool: String,

    /// Tool name used for streamed chunks
    #[serde(default = "default_stream_tool")]
    pub stream_tool: String,

    /// Input text that triggers streaming mode
    #[serde(default = "default_stream_trigger")]
    pub stream_trigger: String,

    /// Pause between streamed payloads
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,

    /// Maximum tokens to generate per model call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (strategy default when unset)
    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_answer_tool() -> String {
    DEFAULT_ANSWER_TOOL.to_string()
}

fn default_stream_tool() -> String {
    DEFAULT_STREAM_TOOL.to_string()
}

fn default_stream_trigger() -> String {
    DEFAULT_STREAM_TRIGGER.to_string()
}

fn default_stream_interval_ms() -> u64 {
    500
}

fn default_max_tokens() -> u32 {
    500
}

fn default_top_p() -> f32 {
    0.9
}

impl RouterConfig {
    /// Create a configuration for the given strategy
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::new()
    }

    /// Sampling parameters for model requests
    pub fn inference(&self) -> InferenceConfig {
        InferenceConfig {
            max_tokens: self.max_tokens,
            temperature: self
                .temperature
                .unwrap_or_else(|| self.strategy.default_temperature()),
            top_p: self.top_p,
        }
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            answer_tool: default_answer_tool(),
            stream_tool: default_stream_tool(),
            stream_trigger: default_stream_trigger(),
            stream_interval_ms: default_stream_interval_ms(),
            max_tokens: default_max_tokens(),
            temperature: None,
            top_p: default_top_p(),
        }
    }
}

/// Builder for RouterConfig with fluent API
pub struct RouterConfigBuilder {
    config: RouterConfig,
}

impl RouterConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RouterConfig::default(),
        }
    }

    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn answer_tool(mut self, name: impl Into<String>) -> Self {
        self.config.answer_tool = name.into();
        self
    }

    pub fn stream_tool(mut self, name: impl Into<String>) -> Self {
        self.config.stream_tool = name.into();
        self
    }

    pub fn stream_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.config.stream_trigger = trigger.into();
        self
    }

    pub fn stream_interval(mut self, interval: Duration) -> Self {
        self.config.stream_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.config.top_p = top_p;
        self
    }

    pub fn build(self) -> RouterConfig {
        self.config
    }
}

impl Default for RouterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
