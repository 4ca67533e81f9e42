//! News articles and their preparation for prompts

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Articles listed in a news context block
pub const DEFAULT_CONTEXT_ARTICLES: usize = 15;

/// Description characters kept per article in a news context block
pub const DEFAULT_DESCRIPTION_CHARS: usize = 200;

/// A news item or policy document, normalized across sources
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: String,
}

/// Drop articles whose lowercased title was already seen
///
/// Only exact matches after lowercasing are merged; titles differing in
/// whitespace or punctuation are kept as distinct articles. The first
/// occurrence wins and the input order is preserved.
pub fn dedup_by_title(articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.title.to_lowercase()))
        .collect()
}

/// Numbered article list for a prompt
///
/// Each entry is `"{n}. {title}: {description prefix}...\n\n"`.
pub fn format_article_context(articles: &[NewsArticle], limit: usize, desc_chars: usize) -> String {
    articles
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, article)| {
            let description: String = article.description.chars().take(desc_chars).collect();
            format!("{}. {}: {}...\n\n", i + 1, article.title, description)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            description: format!("About {title}"),
            ..NewsArticle::default()
        }
    }

    #[test]
    fn test_dedup_is_case_insensitive_exact_match() {
        let merged = dedup_by_title(vec![
            article("Fed Raises Rates"),
            article("fed raises rates"),
            article("Fed Raises Rates Again"),
        ]);

        let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Fed Raises Rates", "Fed Raises Rates Again"]);
    }

    #[test]
    fn test_dedup_keeps_whitespace_variants() {
        let merged = dedup_by_title(vec![article("Fed Raises Rates"), article("Fed  Raises Rates")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_context_format_and_limit() {
        let mut long = article("Tariffs");
        long.description = "x".repeat(300);
        let articles = vec![article("Budget"), long, article("Sanctions")];

        let context = format_article_context(&articles, 2, 200);
        assert!(context.starts_with("1. Budget: About Budget...\n\n2. Tariffs: "));
        assert!(context.contains(&format!("{}...\n\n", "x".repeat(200))));
        assert!(!context.contains("x".repeat(201).as_str()));
        assert!(!context.contains("Sanctions"));
    }
}
