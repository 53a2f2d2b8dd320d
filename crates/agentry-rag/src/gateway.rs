//! Provider gateway for the document RAG CLI

use crate::error::{RagError, RagResult};
use agentry_llm::{ChatMessage, ChatModel, ChatRequest};
use tracing::error;

/// The only provider the gateway knows
pub const OPENAI_PROVIDER: &str = "openai";

/// Answer `query` from `context` with `model_name` on `provider`
///
/// Unknown providers are an error. Model failures are reported in-band as
/// `[Error] Model failed: ...` so the CLI loop can keep going.
pub async fn model_gateway(
    model: &dyn ChatModel,
    query: &str,
    context: &str,
    provider: &str,
    model_name: &str,
) -> RagResult<String> {
    if provider != OPENAI_PROVIDER {
        return Err(RagError::UnsupportedProvider(provider.to_string()));
    }

    let prompt = format!("Context:\n{}\n\nQuestion:\n{}", context, query);
    let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
        .with_model(model_name)
        .with_temperature(0.7)
        .with_max_tokens(500);

    match model.chat(request).await {
        Ok(response) => Ok(response.content),
        Err(e) => {
            error!(model = %model_name, error = %e, "Chat completion failed");
            Ok(format!("[Error] Model failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_llm::mock::ScriptedModel;

    #[tokio::test]
    async fn test_gateway_builds_prompt() {
        let model = ScriptedModel::new().then_text("Refunds take 14 days.");
        let answer = model_gateway(&model, "refunds?", "Refund policy: 14 days", "openai", "gpt-4")
            .await
            .unwrap();

        assert_eq!(answer, "Refunds take 14 days.");
        let request = &model.requests()[0];
        assert_eq!(
            request.messages[0].content,
            "Context:\nRefund policy: 14 days\n\nQuestion:\nrefunds?"
        );
        assert_eq!(request.model.as_deref(), Some("gpt-4"));
        assert_eq!(request.max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_gateway_reports_model_failure_in_band() {
        let model = ScriptedModel::new();
        let answer = model_gateway(&model, "q", "c", "openai", "gpt-3.5-turbo")
            .await
            .unwrap();
        assert!(answer.starts_with("[Error] Model failed: "));
    }

    #[tokio::test]
    async fn test_gateway_rejects_unknown_provider() {
        let model = ScriptedModel::new();
        let err = model_gateway(&model, "q", "c", "anthropic", "claude").await.unwrap_err();
        assert_eq!(err.to_string(), "Model provider 'anthropic' is not supported.");
    }
}
