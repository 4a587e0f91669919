//! Meal description → shopping list.
//!
//! [`ShoppingListGenerator`] renders the prompts, calls the backend held by
//! the [`ExecCtx`] (with transport retry), rejects empty completions, strips
//! reasoning blocks, and hands the answer to the reply parser.

use crate::{
    backend::{self, LlmRequest, LlmResponse},
    config::{GeneratorConfig, LlmConfig, DEFAULT_MODEL},
    diagnostics::ParseDiagnostics,
    error::{Result, ShoppingListError},
    events::{emit, Event},
    exec_ctx::ExecCtx,
    output_parser, prompt,
    types::ShoppingList,
};
use std::collections::HashMap;
use std::time::Duration;

/// Number of description characters shown in logs and events.
const PREVIEW_CHARS: usize = 50;

/// Result of one generation call.
#[derive(Debug, Clone)]
pub struct GeneratedList {
    pub shopping_list: ShoppingList,
    /// Completion text exactly as received.
    pub raw_response: String,
    /// Content of any `<think>` blocks, removed before parsing.
    pub thinking: Option<String>,
    /// Model that produced the reply.
    pub model: String,
    pub diagnostics: ParseDiagnostics,
    /// Provider metadata (token usage etc.), if reported.
    pub metadata: Option<serde_json::Value>,
}

/// Generates categorized shopping lists from free-text meal descriptions.
///
/// # Example
///
/// ```no_run
/// use shopping_list::{ExecCtx, GeneratorConfig, ShoppingListGenerator};
///
/// # async fn run() -> shopping_list::Result<()> {
/// let config = GeneratorConfig::from_env();
/// let ctx = ExecCtx::from_config(&config)?;
/// let generator = ShoppingListGenerator::from_config(&config);
///
/// let generated = generator.generate(&ctx, "Chicken tikka masala for four").await?;
/// for category in &generated.shopping_list {
///     println!("{}: {:?}", category.category, category.items);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ShoppingListGenerator {
    model: String,
    config: LlmConfig,
    /// `None` sends the user prompt alone.
    system_prompt: Option<String>,
    /// Template with `{input}` and `{key}` placeholders.
    prompt_template: String,
    vars: HashMap<String, String>,
}

impl Default for ShoppingListGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShoppingListGenerator {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            config: LlmConfig::default(),
            system_prompt: Some(prompt::SYSTEM_PROMPT.to_string()),
            prompt_template: prompt::USER_PROMPT_TEMPLATE.to_string(),
            vars: HashMap::new(),
        }
    }

    /// Model and sampling parameters taken from the configuration.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new()
            .with_model(config.model.clone())
            .with_config(config.llm.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace (or with `None`, drop) the system prompt.
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system_prompt = system;
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Insert a template variable for `{key}` placeholders.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    fn build_request(&self, description: &str) -> LlmRequest {
        LlmRequest {
            model: self.model.clone(),
            system_prompt: self
                .system_prompt
                .as_ref()
                .map(|t| prompt::render(t, "", &self.vars)),
            prompt: prompt::render(&self.prompt_template, description, &self.vars),
            config: self.config.clone(),
        }
    }

    /// Call the backend with retry, tracking retry count and total backoff.
    async fn call_backend(
        &self,
        ctx: &ExecCtx,
        request: &LlmRequest,
    ) -> Result<(LlmResponse, u32, u64)> {
        let mut transport_retries: u32 = 0;
        let mut backoff_total_ms: u64 = 0;
        let event_handler = ctx.event_handler.clone();

        let mut on_retry = |attempt: u32, delay: Duration, reason: &str| {
            transport_retries = attempt;
            backoff_total_ms += delay.as_millis() as u64;
            emit(
                &event_handler,
                Event::TransportRetry {
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                    reason: reason.to_string(),
                },
            );
        };

        let response = backend::with_backoff(
            &ctx.backend,
            &ctx.client,
            &ctx.base_url,
            request,
            &ctx.backoff,
            ctx.cancel_flag(),
            Some(&mut on_retry),
        )
        .await?;

        Ok((response, transport_retries, backoff_total_ms))
    }

    /// Turn completion text into a [`GeneratedList`]. Never fails.
    fn build_output(&self, raw_text: String, metadata: Option<serde_json::Value>) -> GeneratedList {
        let (thinking, answer) = output_parser::extract_thinking(&raw_text);
        let (shopping_list, mut diagnostics) =
            output_parser::parse_shopping_list_with_diagnostics(&answer);
        diagnostics.thinking_stripped = thinking.is_some();

        GeneratedList {
            shopping_list,
            raw_response: raw_text,
            thinking,
            model: self.model.clone(),
            diagnostics,
            metadata,
        }
    }

    /// Ask the model for a shopping list and parse its reply.
    ///
    /// Fails when the upstream call fails or returns blank text
    /// ([`ShoppingListError::EmptyResponse`]). Whatever non-blank text
    /// arrives is parsed; unstructured replies land in the fallback category.
    pub async fn generate(&self, ctx: &ExecCtx, description: &str) -> Result<GeneratedList> {
        ctx.check_cancelled()?;

        let preview = prompt::preview(description, PREVIEW_CHARS);
        log::info!(
            "Requesting shopping list from {} ({}): {}",
            ctx.backend.name(),
            self.model,
            preview
        );
        emit(
            &ctx.event_handler,
            Event::GenerationStart {
                model: self.model.clone(),
                preview,
            },
        );

        let request = self.build_request(description);
        let result = self
            .call_backend(ctx, &request)
            .await
            .and_then(|(response, retries, backoff_ms)| {
                if response.text.trim().is_empty() {
                    return Err(ShoppingListError::EmptyResponse);
                }
                Ok((response, retries, backoff_ms))
            });

        let (response, transport_retries, backoff_total_ms) = match result {
            Ok(parts) => parts,
            Err(e) => {
                log::error!("Failed to generate shopping list: {}", e);
                emit(&ctx.event_handler, Event::GenerationEnd { ok: false });
                return Err(e);
            }
        };

        let mut output = self.build_output(response.text, response.metadata);
        output.diagnostics.transport_retries = transport_retries;
        output.diagnostics.backoff_total_ms = backoff_total_ms;

        let diag = &output.diagnostics;
        if diag.used_fallback() {
            log::warn!(
                "No categories recognized in model reply; kept {} lines under the fallback category",
                output.shopping_list.item_count()
            );
        } else {
            log::info!(
                "Parsed {} categories, {} items ({} empty headers, {} lines dropped)",
                output.shopping_list.len(),
                output.shopping_list.item_count(),
                diag.headers_discarded,
                diag.lines_dropped
            );
        }

        emit(
            &ctx.event_handler,
            Event::Parsed {
                outcome: diag.outcome,
                categories: output.shopping_list.len(),
                items: output.shopping_list.item_count(),
            },
        );
        emit(&ctx.event_handler, Event::GenerationEnd { ok: true });

        Ok(output)
    }
}
