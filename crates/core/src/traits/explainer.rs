//! Chat/explanation collaborator trait

use async_trait::async_trait;

use crate::{Explanation, PredictionRecord};

/// Produces a textual reply about the most recent prediction.
///
/// Implementations must not surface collaborator failures as errors: a
/// missing API key or failed upstream call yields a deterministic fallback
/// `Explanation` carrying the error detail instead.
#[async_trait]
pub trait Explainer: Send + Sync + 'static {
    async fn explain(&self, message: &str, context: Option<&PredictionRecord>) -> Explanation;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExplanationSource;

    struct EchoExplainer;

    #[async_trait]
    impl Explainer for EchoExplainer {
        async fn explain(&self, message: &str, _context: Option<&PredictionRecord>) -> Explanation {
            Explanation::fallback(message, None)
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_mock_explainer() {
        let explainer = EchoExplainer;
        let reply = explainer.explain("why?", None).await;
        assert_eq!(reply.reply, "why?");
        assert_eq!(reply.source, ExplanationSource::Fallback);
        assert_eq!(explainer.name(), "echo");
    }
}
