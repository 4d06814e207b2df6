// Scam-pattern analysis for scanned content that is not a URL

use crate::config::TextAnalysisConfig;
use crate::error::Result;
use crate::heuristics::compile;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// Highest matched category score, or the baseline when nothing matched.
    pub score: u8,
    pub threats: Vec<String>,
}

impl TextAnalysis {
    pub fn is_clean(&self) -> bool {
        self.threats.is_empty()
    }
}

struct CompiledCategory {
    pattern: Regex,
    score: u8,
    threat: String,
}

pub struct TextAnalyzer {
    baseline_score: u8,
    categories: Vec<CompiledCategory>,
}

impl TextAnalyzer {
    pub fn new(config: &TextAnalysisConfig) -> Result<Self> {
        let categories = config
            .categories
            .iter()
            .map(|c| {
                Ok(CompiledCategory {
                    pattern: compile(&c.pattern)?,
                    score: c.score,
                    threat: c.threat.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            baseline_score: config.baseline_score,
            categories,
        })
    }

    pub fn analyze(&self, text: &str) -> TextAnalysis {
        let mut score = self.baseline_score;
        let mut threats = Vec::new();

        for category in &self.categories {
            if category.pattern.is_match(text) {
                score = score.max(category.score);
                threats.push(category.threat.clone());
            }
        }

        TextAnalysis { score, threats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TextAnalyzer {
        TextAnalyzer::new(&TextAnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_prize_text_scores_forty() {
        let analysis = analyzer().analyze("Congratulations you won a free lottery prize!");
        assert_eq!(analysis.score, 40);
        assert_eq!(analysis.threats, vec!["Promises prizes or lottery winnings"]);
    }

    #[test]
    fn test_plain_text_gets_baseline() {
        let analysis = analyzer().analyze("See you at lunch tomorrow");
        assert_eq!(analysis.score, 10);
        assert!(analysis.is_clean());
    }

    #[test]
    fn test_score_is_max_not_sum() {
        let analysis =
            analyzer().analyze("SCAM alert: send your bank account PIN to claim the bitcoin prize");
        assert_eq!(analysis.score, 80);
        assert_eq!(analysis.threats.len(), 4);
        assert_eq!(analysis.threats[0], "Contains fraud or malware related terms");
        assert_eq!(analysis.threats[3], "Promises prizes or lottery winnings");
    }

    #[test]
    fn test_credentials_outrank_crypto() {
        let analysis = analyzer().analyze("Verify your account and connect your crypto wallet");
        assert_eq!(analysis.score, 60);
        assert_eq!(analysis.threats.len(), 2);
    }

    #[test]
    fn test_word_boundaries() {
        // "pin" inside "spinning" and "won" inside "wonderful" are not matches
        let analysis = analyzer().analyze("What a wonderful spinning class");
        assert_eq!(analysis.score, 10);
    }
}
