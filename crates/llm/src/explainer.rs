//! Chat explanations over the latest prediction
//!
//! `ExplanationService` asks the language model when it is configured and
//! degrades to `RuleBasedExplainer` otherwise. Upstream failures never reach
//! the caller as errors; they ride along in `Explanation::error`.

use std::sync::Arc;

use async_trait::async_trait;

use item_predictor_config::ExplainConfig;
use item_predictor_core::{Explainer, Explanation, ItemSource, PredictionRecord, QuantitySource};

use crate::backend::{LlmBackend, OpenAIBackend, OpenAIConfig};
use crate::prompt::PromptBuilder;
use crate::LlmError;

/// Deterministic template replies
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExplainer;

impl RuleBasedExplainer {
    pub fn reply(&self, context: Option<&PredictionRecord>) -> String {
        let Some(record) = context else {
            return "No prediction has been made yet. Send an item description to /predict \
                    and I can explain the result."
                .to_string();
        };

        let prediction = &record.prediction;
        let item_reason = match prediction.item_source {
            ItemSource::Classifier => "the text classifier matched the description".to_string(),
            ItemSource::Memo(tier) => {
                format!("an exact match was found in the {} lookup table", tier.as_str())
            }
            ItemSource::GlobalMode => {
                "no confident match was found, so the most common item was used".to_string()
            }
        };
        let quantity_reason = match prediction.quantity_source {
            QuantitySource::ItemUomPrior => "the historical ratio for this item and unit of measure",
            QuantitySource::ItemPrior => "the historical ratio for this item",
            QuantitySource::GlobalPrior => "the catalog-wide average ratio",
            QuantitySource::ItemMedian => "the median quantity shipped for this item",
            QuantitySource::Floor => "the minimum default of 1",
        };

        format!(
            "For \"{}\" the predicted item is {} with an expected quantity of {:.2}. \
             The item was chosen because {}; the quantity comes from {}.",
            record.description, prediction.item, prediction.quantity, item_reason, quantity_reason
        )
    }
}

#[async_trait]
impl Explainer for RuleBasedExplainer {
    async fn explain(&self, _message: &str, context: Option<&PredictionRecord>) -> Explanation {
        Explanation::fallback(self.reply(context), None)
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}

/// LLM-backed explainer with a rule-based fallback
pub struct ExplanationService {
    backend: Option<Arc<dyn LlmBackend>>,
    /// Why `backend` is absent
    unavailable: Option<String>,
    fallback: RuleBasedExplainer,
}

impl ExplanationService {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend: Some(backend),
            unavailable: None,
            fallback: RuleBasedExplainer,
        }
    }

    /// Always answer with the rule-based explainer, reporting `reason`
    pub fn fallback_only(reason: impl Into<String>) -> Self {
        Self {
            backend: None,
            unavailable: Some(reason.into()),
            fallback: RuleBasedExplainer,
        }
    }

    /// Build from settings; a disabled explainer or missing key is not an error
    pub fn from_config(config: &ExplainConfig) -> Result<Self, LlmError> {
        if !config.enabled {
            return Ok(Self::fallback_only("language model disabled by configuration"));
        }
        match OpenAIConfig::from_settings(config) {
            Some(openai) => Ok(Self::new(Arc::new(OpenAIBackend::new(openai)?))),
            None => Ok(Self::fallback_only("no API key configured")),
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }
}

#[async_trait]
impl Explainer for ExplanationService {
    async fn explain(&self, message: &str, context: Option<&PredictionRecord>) -> Explanation {
        let Some(backend) = &self.backend else {
            return Explanation::fallback(self.fallback.reply(context), self.unavailable.clone());
        };

        let messages = PromptBuilder::new()
            .system_prompt()
            .with_prediction(context)
            .user_message(message)
            .build();

        match backend.generate(&messages).await {
            Ok(result) => {
                tracing::debug!(
                    model = backend.model_name(),
                    tokens = result.tokens,
                    latency_ms = result.total_time_ms,
                    "Generated explanation"
                );
                Explanation::from_llm(result.text)
            }
            Err(e) => {
                tracing::warn!(model = backend.model_name(), error = %e, "Explanation failed, using fallback");
                Explanation::fallback(self.fallback.reply(context), Some(e.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        match &self.backend {
            Some(backend) => backend.model_name(),
            None => self.fallback.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FinishReason, GenerationResult};
    use crate::prompt::{Message, Role};
    use item_predictor_core::{ExplanationSource, MemoTier, Prediction};

    struct EchoBackend;

    #[async_trait]
    impl LlmBackend for EchoBackend {
        async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
            let user = messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(GenerationResult {
                text: format!("echo: {}", user),
                tokens: 2,
                total_time_ms: 1,
                finish_reason: FinishReason::Stop,
            })
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl LlmBackend for FailingBackend {
        async fn generate(&self, _messages: &[Message]) -> Result<GenerationResult, LlmError> {
            Err(LlmError::Api("HTTP 500: upstream down".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn record(item_source: ItemSource, quantity_source: QuantitySource) -> PredictionRecord {
        PredictionRecord::new(
            "hex bolt",
            None,
            None,
            Prediction {
                item: 11,
                quantity: 6.0,
                item_source,
                quantity_source,
            },
            "memorizer",
        )
    }

    #[test]
    fn test_rule_based_reply_without_context() {
        let reply = RuleBasedExplainer.reply(None);
        assert!(reply.starts_with("No prediction has been made yet."));
    }

    #[test]
    fn test_rule_based_reply_mentions_sources() {
        let reply = RuleBasedExplainer.reply(Some(&record(
            ItemSource::Memo(MemoTier::Description),
            QuantitySource::ItemPrior,
        )));
        assert!(reply.contains("predicted item is 11"));
        assert!(reply.contains("6.00"));
        assert!(reply.contains("desc lookup table"));
        assert!(reply.contains("historical ratio for this item"));
    }

    #[test]
    fn test_rule_based_reply_is_deterministic() {
        let context = record(ItemSource::GlobalMode, QuantitySource::Floor);
        assert_eq!(
            RuleBasedExplainer.reply(Some(&context)),
            RuleBasedExplainer.reply(Some(&context))
        );
    }

    #[tokio::test]
    async fn test_llm_reply() {
        let service = ExplanationService::new(Arc::new(EchoBackend));
        let explanation = service.explain("why?", None).await;
        assert_eq!(explanation.source, ExplanationSource::Llm);
        assert_eq!(explanation.reply, "echo: why?");
        assert!(explanation.error.is_none());
        assert_eq!(service.name(), "echo");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_with_detail() {
        let service = ExplanationService::new(Arc::new(FailingBackend));
        let context = record(ItemSource::Classifier, QuantitySource::GlobalPrior);
        let explanation = service.explain("why?", Some(&context)).await;

        assert_eq!(explanation.source, ExplanationSource::Fallback);
        assert_eq!(explanation.reply, RuleBasedExplainer.reply(Some(&context)));
        assert!(explanation.error.unwrap().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_missing_key_uses_fallback() {
        let mut config = ExplainConfig::default();
        config.api_key = None;
        let service = ExplanationService::from_config(&config).unwrap();
        assert!(!service.has_backend());

        let explanation = service.explain("hello", None).await;
        assert_eq!(explanation.source, ExplanationSource::Fallback);
        assert_eq!(explanation.error.as_deref(), Some("no API key configured"));
    }

    #[tokio::test]
    async fn test_disabled_explainer() {
        let mut config = ExplainConfig::default();
        config.enabled = false;
        config.api_key = Some("sk-test".to_string());
        let service = ExplanationService::from_config(&config).unwrap();
        assert!(!service.has_backend());
        assert_eq!(service.name(), "rule_based");
    }
}
