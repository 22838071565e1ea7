use std::sync::Arc;

use {
    recap_providers::{ChatMessage, LlmProvider},
    tracing::{debug, warn},
};

use crate::prompt::{EVALUATOR_ROLE, FINAL_EVAL_PROMPT, chunk_request, transcript_request};

/// Longest text dispatched as a summary or evaluation, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

const ELLIPSIS: &str = "...";

/// Cap `text` at [`MAX_MESSAGE_CHARS`], replacing the tail with `...`.
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let keep = MAX_MESSAGE_CHARS - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Inline text standing in for a summary when generation failed.
pub fn generation_error(detail: &anyhow::Error) -> String {
    format!("🔴 Error: Failed communicating with AI.\n{detail:#}")
}

/// Turns transcript text into bounded summaries. Never fails: generation
/// errors come back as inline error text.
pub struct ChunkSummarizer {
    provider: Arc<dyn LlmProvider>,
}

impl ChunkSummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Summarize one chunk under the session's system prompt.
    pub async fn summarize_chunk(&self, prompt: &str, chunk: &str) -> String {
        let messages = [ChatMessage::system(prompt), ChatMessage::user(chunk_request(chunk))];
        self.generate(&messages).await
    }

    /// Evaluate participants over the full transcript.
    pub async fn evaluate(&self, transcript: &str) -> String {
        let messages = [
            ChatMessage::system(EVALUATOR_ROLE),
            ChatMessage::user(transcript_request(transcript)),
            ChatMessage::user(FINAL_EVAL_PROMPT),
        ];
        self.generate(&messages).await
    }

    async fn generate(&self, messages: &[ChatMessage]) -> String {
        debug!(model = %self.provider.id(), "calling LLM");
        let text = match self.provider.complete(messages).await {
            Ok(text) => text,
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "generation failed");
                #[cfg(feature = "metrics")]
                metrics::counter!("recap_generation_failures_total").increment(1);
                generation_error(&e)
            },
        };
        truncate_message(&text)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::test_support::MockProvider, rstest::rstest};

    #[rstest]
    #[case::short(10, 10)]
    #[case::exactly_at_cap(2000, 2000)]
    #[case::one_over(2001, 2000)]
    #[case::far_over(10_000, 2000)]
    fn truncation_caps_length(#[case] input_len: usize, #[case] expected_len: usize) {
        let out = truncate_message(&"a".repeat(input_len));
        assert_eq!(out.chars().count(), expected_len);
    }

    #[test]
    fn truncation_keeps_1995_chars_plus_ellipsis() {
        let input: String = (0..2500).map(|i| if i < 1995 { 'x' } else { 'y' }).collect();
        let out = truncate_message(&input);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..1995], "x".repeat(1995));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let input = "汉".repeat(2001);
        let out = truncate_message(&input);
        assert_eq!(out.chars().count(), 2000);
        assert!(out.starts_with("汉"));
    }

    #[tokio::test]
    async fn chunk_request_shape() {
        let provider = Arc::new(MockProvider::replying("summary"));
        let summarizer = ChunkSummarizer::new(provider.clone());

        let out = summarizer
            .summarize_chunk("be brief", "Alice: hi\nBob: hello")
            .await;

        assert_eq!(out, "summary");
        assert_eq!(provider.calls().await, vec![vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("Transcript Chunk:\nAlice: hi\nBob: hello"),
        ]]);
    }

    #[tokio::test]
    async fn evaluation_request_shape() {
        let provider = Arc::new(MockProvider::replying("@Alice did well"));
        let summarizer = ChunkSummarizer::new(provider.clone());

        summarizer.evaluate("a\n\nb").await;

        let calls = provider.calls().await;
        assert_eq!(calls[0], vec![
            ChatMessage::system(EVALUATOR_ROLE),
            ChatMessage::user("Here is the complete transcript of the meeting:\na\n\nb"),
            ChatMessage::user(FINAL_EVAL_PROMPT),
        ]);
    }

    #[tokio::test]
    async fn failure_becomes_inline_error_text() {
        let summarizer = ChunkSummarizer::new(Arc::new(MockProvider::failing("connection reset")));
        let out = summarizer.summarize_chunk("p", "c").await;
        assert_eq!(out, "🔴 Error: Failed communicating with AI.\nconnection reset");
    }

    #[tokio::test]
    async fn long_output_is_truncated() {
        let summarizer = ChunkSummarizer::new(Arc::new(MockProvider::replying(&"z".repeat(3000))));
        let out = summarizer.evaluate("t").await;
        assert_eq!(out.chars().count(), MAX_MESSAGE_CHARS);
        assert!(out.ends_with("..."));
    }
}
