// src/classify/mod.rs
//! Opportunity scoring: prompt templates, text-generation providers and the
//! classifier that turns article text into a [`Classification`].

pub mod classifier;
pub mod llm;
pub mod prompts;

use serde::{Deserialize, Serialize};

pub use classifier::OpportunityClassifier;
pub use llm::{build_generator, DynGenerator, TextGenerator};

/// Canned result for an article without summary or title.
pub const NO_TEXT_RESULT: &str =
    "No Upsell Opportunity Indicated (No text in article summary/title).";
/// Aggregate verdict when there is nothing to aggregate.
pub const EMPTY_AGGREGATE_RESULT: &str = "Overall No Upsell Opportunity Indicated.";
/// Company summary when the search produced no articles.
pub const NO_ARTICLES_RESULT: &str = "No relevant news articles found for analysis.";
/// Substituted for any failed completion.
pub const FAILURE_RESULT: &str = "Analysis failed due to AI service error.";

/// Categorical verdict extracted from a free-text completion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OpportunityLevel {
    High,
    Medium,
    Low,
    NoOpportunity,
    Unknown,
}

impl OpportunityLevel {
    /// Label used in reports and exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Opportunity",
            Self::Medium => "Medium Opportunity",
            Self::Low => "Low Opportunity",
            Self::NoOpportunity => "No Upsell Opportunity Indicated",
            Self::Unknown => "Unknown Opportunity",
        }
    }
}

impl std::fmt::Display for OpportunityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Checked in this order; the first phrase found wins.
const LEVEL_PHRASES: [(&str, OpportunityLevel); 4] = [
    ("low opportunity", OpportunityLevel::Low),
    ("medium opportunity", OpportunityLevel::Medium),
    ("high opportunity", OpportunityLevel::High),
    ("no upsell opportunity indicated", OpportunityLevel::NoOpportunity),
];

/// Case-insensitive phrase lookup; total over all inputs.
pub fn extract_level(text: &str) -> OpportunityLevel {
    let lower = text.to_lowercase();
    LEVEL_PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, level)| *level)
        .unwrap_or(OpportunityLevel::Unknown)
}

/// Where a classification's text came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Completion returned by the text-generation service (or its cache).
    Model,
    /// Article had no usable text; no call made.
    NoText,
    /// Company had no articles; no call made.
    NoArticles,
    /// Nothing to aggregate; no call made.
    EmptyAggregate,
    /// Call failed; text is [`FAILURE_RESULT`].
    Failed,
}

/// Raw completion text plus the level extracted from it at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub level: OpportunityLevel,
    pub text: String,
    pub origin: Origin,
}

impl Classification {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        let text = text.into();
        Self {
            level: extract_level(&text),
            text,
            origin,
        }
    }

    pub fn no_text() -> Self {
        Self::new(NO_TEXT_RESULT, Origin::NoText)
    }

    pub fn no_articles() -> Self {
        Self::new(NO_ARTICLES_RESULT, Origin::NoArticles)
    }

    pub fn empty_aggregate() -> Self {
        Self::new(EMPTY_AGGREGATE_RESULT, Origin::EmptyAggregate)
    }

    pub fn failed() -> Self {
        Self::new(FAILURE_RESULT, Origin::Failed)
    }

    pub fn is_failure(&self) -> bool {
        self.origin == Origin::Failed
    }
}
