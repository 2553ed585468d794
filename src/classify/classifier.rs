// src/classify/classifier.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use metrics::counter;
use tracing::{debug, error};

use super::prompts::{analyses_block, combined_prompt, individual_prompt};
use super::{Classification, DynGenerator, Origin};
use crate::cache::ResultCache;
use crate::news::Article;

/// Stored in place of a blank completion.
pub const EMPTY_COMPLETION_RESULT: &str = "Unexpected response: empty completion";

/// Per-article and aggregate opportunity scoring over a
/// [`TextGenerator`](super::TextGenerator).
///
/// Every remote call is memoized and bounded by `timeout`. Failures are
/// logged and turned into [`Classification::failed`]; they are never cached.
pub struct OpportunityClassifier {
    generator: DynGenerator,
    cache: Arc<ResultCache<String>>,
    timeout: Duration,
}

impl OpportunityClassifier {
    pub fn new(generator: DynGenerator, cache: Arc<ResultCache<String>>, timeout: Duration) -> Self {
        Self {
            generator,
            cache,
            timeout,
        }
    }

    /// Score one piece of article text. Blank text short-circuits to the
    /// canned no-text result without a remote call.
    pub async fn classify(&self, company: &str, text: &str) -> Classification {
        let text = text.trim();
        if text.is_empty() {
            counter!("classify_skipped_total", "reason" => "no_text").increment(1);
            return Classification::no_text();
        }
        let prompt = individual_prompt(text);
        self.submit("classify.article", company, &prompt).await
    }

    pub async fn classify_article(&self, company: &str, article: &Article) -> Classification {
        self.classify(company, article.text()).await
    }

    /// Combine per-article results into one company-level verdict.
    pub async fn classify_aggregate(
        &self,
        company: &str,
        results: &[Classification],
    ) -> Classification {
        if results.is_empty() {
            counter!("classify_skipped_total", "reason" => "empty_aggregate").increment(1);
            return Classification::empty_aggregate();
        }
        let prompt = combined_prompt(&analyses_block(results));
        self.submit("classify.aggregate", company, &prompt).await
    }

    /// One remote call under the timeout; a blank completion is replaced.
    async fn complete_bounded(&self, operation: &'static str, prompt: &str) -> anyhow::Result<String> {
        counter!("classify_calls_total", "op" => operation).increment(1);
        let completion = tokio::time::timeout(self.timeout, self.generator.complete(prompt))
            .await
            .map_err(|_| anyhow!("completion timed out after {:?}", self.timeout))??;
        if completion.trim().is_empty() {
            return Ok(EMPTY_COMPLETION_RESULT.to_string());
        }
        Ok(completion)
    }

    async fn submit(&self, operation: &'static str, company: &str, prompt: &str) -> Classification {
        let args = (self.generator.name(), company, prompt);
        let res = self
            .cache
            .try_memoize(operation, &args, || self.complete_bounded(operation, prompt))
            .await;

        match res {
            Ok(text) => {
                debug!(target: "classify", operation, company, prompt_len = prompt.len(), reply_len = text.len(), "classified");
                Classification::new(text, Origin::Model)
            }
            Err(e) => {
                error!(target: "classify", operation, company, provider = self.generator.name(), error = ?e, "text generation failed");
                counter!("classify_failures_total", "op" => operation).increment(1);
                Classification::failed()
            }
        }
    }
}
