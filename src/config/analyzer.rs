// src/config/analyzer.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "UPSELL_CONFIG_PATH";

pub const MIN_DAYS_BACK: u32 = 1;
pub const MAX_DAYS_BACK: u32 = 365;
/// Entries older than this are never served, whatever the config says.
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 3600;

fn default_days_back() -> u32 {
    90
}
fn default_max_articles() -> usize {
    10
}
fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_allowed_domains() -> Vec<String> {
    DEFAULT_ALLOWED_DOMAINS.iter().map(|s| s.to_string()).collect()
}
fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

/// Search and cache settings for one analyzer instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Default look-back window when a request does not name one (1–365).
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    /// Cap per batch and per company.
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// Trusted publisher domains, matched by substring against article hosts.
    /// An empty list disables filtering.
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    /// Topical phrases appended to the company name to build queries.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            max_articles: default_max_articles(),
            allowed_domains: default_allowed_domains(),
            keywords: default_keywords(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
        .normalized()
    }
}

impl AnalyzerConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
    }

    /// Load using env var + fallbacks:
    /// 1) $UPSELL_CONFIG_PATH
    /// 2) config/analyzer.toml
    /// 3) config/analyzer.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("UPSELL_CONFIG_PATH points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/analyzer.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/analyzer.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Trim/dedup lists, canonicalize domains and keep `days_back` in range.
    pub fn normalized(mut self) -> Self {
        self.allowed_domains = clean_domains(self.allowed_domains);
        self.keywords = clean_keywords(self.keywords);
        self.days_back = self.days_back.clamp(MIN_DAYS_BACK, MAX_DAYS_BACK);
        if self.cache_ttl_secs == 0 {
            self.cache_ttl_secs = default_cache_ttl_secs();
        }
        self.cache_ttl_secs = self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS);
        self
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AnalyzerConfig> {
    if hint_ext == "json" {
        return parse_json(s);
    }
    if hint_ext == "toml" {
        return parse_toml(s);
    }
    parse_toml(s)
        .or_else(|_| parse_json(s))
        .map_err(|_| anyhow!("unsupported analyzer config format"))
}

fn parse_toml(s: &str) -> Result<AnalyzerConfig> {
    let v: AnalyzerConfig = toml::from_str(s).context("parsing analyzer config toml")?;
    Ok(v.normalized())
}

fn parse_json(s: &str) -> Result<AnalyzerConfig> {
    let v: AnalyzerConfig = serde_json::from_str(s).context("parsing analyzer config json")?;
    Ok(v.normalized())
}

/// Lowercase, strip a leading `www.`, drop blanks, sort + dedup.
fn clean_domains(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim().to_ascii_lowercase();
        let t = t.strip_prefix("www.").unwrap_or(&t);
        if !t.is_empty() {
            set.insert(t.to_string());
        }
    }
    set.into_iter().collect()
}

/// Drop blanks and repeats, keeping first-seen order (order drives batching).
fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_ascii_lowercase()) {
            out.push(t.to_string());
        }
    }
    out
}

pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "livemint.com",
    "economictimes.indiatimes.com",
    "business-standard.com",
    "thehindubusinessline.com",
    "financialexpress.com",
    "ndtvprofit.com",
    "zeebiz.com",
    "moneycontrol.com",
    "bloombergquint.com",
    "cnbctv18.com",
    "businesstoday.in",
    "indianexpress.com",
    "thehindu.com",
    "reuters.com",
    "businesstraveller.com",
    "sify.com",
    "telegraphindia.com",
    "outlookindia.com",
    "firstpost.com",
    "pulse.zerodha.com",
    "ddnews.gov.in",
    "newsonair.gov.in",
    "pib.gov.in",
    "niti.gov.in",
    "rbi.org.in",
    "sebi.gov.in",
    "dpiit.gov.in",
    "investindia.gov.in",
    "indiabriefing.com",
    "taxscan.in",
    "bwbusinessworld.com",
    "inc42.com",
    "yourstory.com",
    "vccircle.com",
    "entrackr.com",
    "the-ken.com",
    "linkedin.com",
    "mca.gov.in",
    "zaubacorp.com",
    "tofler.in",
];

pub const DEFAULT_KEYWORDS: &[&str] = &[
    // Benefits, wellness, culture
    "employee wellness",
    "mental health",
    "gym memberships",
    "lifestyle benefits",
    "remote work policy",
    "hybrid work",
    "flexible hours",
    "wellness programs",
    "employee upskilling",
    "learning program",
    "L&D initiatives",
    "digital training",
    "career development",
    "skill building",
    "internal promotions",
    "diversity equity inclusion",
    "LGBTQ+ policy",
    "gender affirmation",
    "disability inclusion",
    "inclusive benefits",
    "DEI initiatives",
    "employer of choice",
    "employee engagement strategy",
    "workplace culture",
    "employee satisfaction",
    "employee retention",
    "great place to work",
    "benefits automation",
    "HR tech",
    "employee benefits platform",
    "benefits outsourcing",
    "AI in HR",
    "HRMS integration",
    "benefits digitization",
    "labor law compliance",
    "social security code",
    "employee tax benefits",
    "fringe benefit tax",
    "benefits structure optimization",
    "mass hiring",
    "talent acquisition strategy",
    "hiring surge",
    "hiring spree",
    "campus recruitment",
    "talent war",
    "employer branding",
    // Financial & business growth
    "record revenue",
    "profit growth",
    "EBITDA margin increase",
    "business expansion",
    "funding round",
    "Series A funding",
    "Series B funding",
    "IPO plans",
    "profit surge",
    "quarterly growth",
    "yearly growth",
    "financial turnaround",
    "cash flow positive",
    "valuation increase",
    "market share gain",
    "cost optimization success",
    // Hiring & organizational growth
    "hiring plans",
    "expansion hiring",
    "workforce expansion",
    "headcount growth",
    "employee growth",
    "talent acquisition drive",
    "leadership hiring",
    // Strategic initiatives
    "business transformation",
    "employee experience initiative",
    "workplace digitization",
    "employee-first culture",
    "future of work",
    "benefits overhaul",
    "HR transformation",
    "employee engagement program",
    "rewards and recognition",
    // Market recognition & awards
    "best workplace award",
    "employer of the year",
    "HR excellence award",
    "diversity champion",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn defaults_are_normalized() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.days_back, 90);
        assert_eq!(cfg.max_articles, 10);
        assert_eq!(cfg.cache_ttl_secs, 3600);
        assert!(cfg.allowed_domains.contains(&"taxscan.in".to_string()));
        let unique: std::collections::HashSet<_> = cfg.allowed_domains.iter().collect();
        assert_eq!(unique.len(), cfg.allowed_domains.len());
        assert_eq!(cfg.keywords.first().map(String::as_str), Some("employee wellness"));
    }

    #[test]
    fn toml_and_json_parse_with_partial_fields() {
        let toml = r#"
days_back = 500
allowed_domains = [" www.LiveMint.com ", "", "reuters.com", "reuters.com"]
keywords = ["hiring spree", " ", "Hiring Spree", "funding round"]
"#;
        let cfg = parse_toml(toml).unwrap();
        assert_eq!(cfg.days_back, 365);
        assert_eq!(
            cfg.allowed_domains,
            vec!["livemint.com".to_string(), "reuters.com".to_string()]
        );
        assert_eq!(
            cfg.keywords,
            vec!["hiring spree".to_string(), "funding round".to_string()]
        );
        assert_eq!(cfg.max_articles, 10);

        let json = r#"{"max_articles": 3, "allowed_domains": []}"#;
        let cfg = parse_json(json).unwrap();
        assert_eq!(cfg.max_articles, 3);
        assert!(cfg.allowed_domains.is_empty());
        assert!(!cfg.keywords.is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        // No files → built-in defaults
        let v = AnalyzerConfig::load_default().unwrap();
        assert_eq!(v, AnalyzerConfig::default());

        // Fallback TOML in ./config/
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config/analyzer.toml"), "max_articles = 4").unwrap();
        assert_eq!(AnalyzerConfig::load_default().unwrap().max_articles, 4);

        // Env wins
        let p_json = tmp.path().join("custom.json");
        fs::write(&p_json, r#"{"max_articles": 7}"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p_json.display().to_string());
        assert_eq!(AnalyzerConfig::load_default().unwrap().max_articles, 7);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(AnalyzerConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
