//! Offline responder
//!
//! Serves only local models. The answer is extracted from the question
//! itself, so it is deterministic and never needs network or credentials.

use async_trait::async_trait;
use chorus_application::{AdapterError, BackendAdapter, GenerateParams, Generation};
use chorus_domain::util::split_sentences;
use chorus_domain::{BackendProfile, LOCAL_PROVIDER, strip_instructions};
use std::collections::BTreeMap;
use std::time::Instant;

/// Points listed after the lead sentence
const MAX_POINTS: usize = 3;

pub struct LocalAdapter {
    name: String,
}

impl LocalAdapter {
    pub fn new() -> Self {
        Self::named(LOCAL_PROVIDER)
    }

    /// Register under a provider name other than `local`
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LocalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendAdapter for LocalAdapter {
    fn provider(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<Generation, AdapterError> {
        if !BackendProfile::unknown(model).is_local() {
            return Err(AdapterError::InvalidRequest(format!(
                "{} cannot serve model '{}'",
                self.name, model
            )));
        }

        let started = Instant::now();
        let question = strip_instructions(prompt);
        if question.is_empty() {
            return Err(AdapterError::InvalidRequest("empty prompt".to_string()));
        }

        let text = respond(&question, params);
        let tokens = text.split_whitespace().count() as u64;

        Ok(Generation {
            text,
            tokens,
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
            cost_usd: 0.0,
            backend_name: model.to_string(),
            metadata: BTreeMap::new(),
        })
    }
}

fn respond(question: &str, params: &GenerateParams) -> String {
    let flattened = question.split_whitespace().collect::<Vec<_>>().join(" ");
    let sentences = split_sentences(&flattened);
    let lead = sentences.first().copied().unwrap_or(flattened.as_str());
    let points: Vec<&str> = sentences.iter().skip(1).take(MAX_POINTS).copied().collect();

    let answer = format!(
        "This is an offline answer based only on the question. The question asks: {}",
        lead
    );

    if params.json_mode {
        let answer = limit_words(&answer, params.max_tokens);
        return serde_json::json!({ "answer": answer, "points": points }).to_string();
    }

    let mut text = answer;
    for point in &points {
        text.push_str("\n- ");
        text.push_str(point);
    }
    limit_words(&text, params.max_tokens)
}

/// Keep at most `max` whitespace-separated words, preserving line breaks
fn limit_words(text: &str, max: u32) -> String {
    let max = max as usize;
    let mut out = String::new();
    let mut count = 0;
    for line in text.lines() {
        if count >= max {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().take(max - count).collect();
        count += words.len();
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&words.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_domain::LOCAL_FALLBACK_BACKEND;

    fn params(max_tokens: u32, json_mode: bool) -> GenerateParams {
        GenerateParams {
            temperature: 0.2,
            top_p: 0.8,
            max_tokens,
            n_samples: 1,
            json_mode,
        }
    }

    #[tokio::test]
    async fn test_answers_local_models_deterministically() {
        let adapter = LocalAdapter::new();
        let prompt = "Use a structured approach: outline the key steps before answering.\n\nWhat is Rust? Why use it? Is it fast?";
        let a = adapter
            .generate(LOCAL_FALLBACK_BACKEND, prompt, &params(512, false))
            .await
            .unwrap();
        let b = adapter
            .generate(LOCAL_FALLBACK_BACKEND, prompt, &params(512, false))
            .await
            .unwrap();
        assert_eq!(a.text, b.text);
        assert!(a.text.contains("What is Rust?"));
        assert!(a.text.contains("\n- Why use it?"));
        assert!(!a.text.contains("structured approach"));
        assert_eq!(a.backend_name, LOCAL_FALLBACK_BACKEND);
        assert_eq!(a.cost_usd, 0.0);
        assert!(a.tokens > 0);
    }

    #[tokio::test]
    async fn test_refuses_remote_models() {
        let err = LocalAdapter::new()
            .generate("gpt-4o", "hi", &params(64, false))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_json_mode_emits_object() {
        let g = LocalAdapter::new()
            .generate("llama-3-8b-local", "List primes. Two and three.", &params(64, true))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&g.text).unwrap();
        assert!(value["answer"].as_str().unwrap().contains("List primes."));
        assert_eq!(value["points"][0], "Two and three.");
    }

    #[tokio::test]
    async fn test_respects_max_tokens() {
        let g = LocalAdapter::new()
            .generate(LOCAL_FALLBACK_BACKEND, "Explain everything. In detail.", &params(5, false))
            .await
            .unwrap();
        assert_eq!(g.tokens, 5);
    }

    #[test]
    fn test_limit_words_keeps_lines() {
        assert_eq!(limit_words("a b\nc d e", 3), "a b\nc");
        assert_eq!(limit_words("a b", 10), "a b");
    }
}
