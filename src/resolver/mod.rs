//! Fuzzy school name resolution
//!
//! Maps a free-text visitor query onto at most one catalog school. Queries
//! are matched against the full catalog with a blend of token-level and
//! whole-string similarity, and only the single best candidate at or above
//! the configured minimum score is returned. Anything below the threshold
//! resolves to no match, which is an ordinary outcome rather than an error.

use std::collections::HashSet;

use tracing::debug;

use crate::models::School;

/// A catalog school chosen for a query, with the score that selected it.
#[derive(Debug, Clone)]
pub struct ResolvedSchool {
    pub school: School,
    pub score: f64,
}

/// One catalog school with its precomputed comparison forms.
struct IndexedEntry {
    school: School,
    normalized: String,
    tokens: Vec<String>,
}

/// Fuzzy resolver over a fixed school catalog.
///
/// Built once at startup; the catalog does not change while the service
/// runs, so every comparison form is precomputed here.
pub struct SchoolResolver {
    entries: Vec<IndexedEntry>,
    min_score: f64,
}

impl SchoolResolver {
    pub fn new(schools: Vec<School>, min_score: f64) -> Self {
        let entries = schools
            .into_iter()
            .map(|school| {
                let normalized = normalize(&school.name);
                let tokens = normalized.split_whitespace().map(str::to_string).collect();
                IndexedEntry {
                    school,
                    normalized,
                    tokens,
                }
            })
            .collect();

        Self { entries, min_score }
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Resolve a raw query to the best-scoring catalog school, or `None`
    /// when nothing reaches the minimum score. Ties keep the earliest
    /// catalog entry, so resolution is deterministic for a given catalog.
    pub fn resolve(&self, query: &str) -> Option<ResolvedSchool> {
        let normalized_query = normalize(query);
        if normalized_query.is_empty() {
            return None;
        }
        let query_tokens: Vec<&str> = normalized_query.split_whitespace().collect();

        let mut best: Option<(&IndexedEntry, f64)> = None;
        for entry in &self.entries {
            let score = self.score(&normalized_query, &query_tokens, entry);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
        }

        match best {
            Some((entry, score)) if score >= self.min_score => {
                debug!(
                    "Query '{}' resolved to '{}' (score {:.3})",
                    query, entry.school.name, score
                );
                Some(ResolvedSchool {
                    school: entry.school.clone(),
                    score,
                })
            }
            Some((_, score)) => {
                debug!(
                    "Query '{}' best score {:.3} below minimum {:.3}",
                    query, score, self.min_score
                );
                None
            }
            None => None,
        }
    }

    /// Score a query against one catalog entry.
    ///
    /// Token coverage dominates so that a partial query like "churchil"
    /// still lands on "Churchill High School"; whole-string similarity
    /// pulls complete-but-misspelled queries up and keeps single generic
    /// words from outranking closer full matches.
    fn score(&self, normalized_query: &str, query_tokens: &[&str], entry: &IndexedEntry) -> f64 {
        let token_score = self.token_coverage(query_tokens, &entry.tokens);

        let jaro_winkler = self.jaro_winkler_similarity(normalized_query, &entry.normalized);
        let levenshtein = self.levenshtein_similarity(normalized_query, &entry.normalized);
        let word_overlap = self.word_overlap_similarity(normalized_query, &entry.normalized);
        let full_score = jaro_winkler * 0.3 + levenshtein * 0.3 + word_overlap * 0.4;

        (token_score * 0.6 + full_score * 0.4).min(1.0)
    }

    /// Mean, over the query tokens, of each token's best similarity against
    /// any entry token. Directional on purpose: visitors type a fragment of
    /// the name, not the other way round.
    fn token_coverage(&self, query_tokens: &[&str], entry_tokens: &[String]) -> f64 {
        if query_tokens.is_empty() || entry_tokens.is_empty() {
            return 0.0;
        }

        let total: f64 = query_tokens
            .iter()
            .map(|query_token| {
                entry_tokens
                    .iter()
                    .map(|entry_token| {
                        let jw = self.jaro_winkler_similarity(query_token, entry_token);
                        let lev = self.levenshtein_similarity(query_token, entry_token);
                        (jw + lev) / 2.0
                    })
                    .fold(0.0, f64::max)
            })
            .sum();

        total / query_tokens.len() as f64
    }

    /// Jaro-Winkler similarity (simplified implementation)
    fn jaro_winkler_similarity(&self, s1: &str, s2: &str) -> f64 {
        let s1_chars: Vec<char> = s1.chars().collect();
        let s2_chars: Vec<char> = s2.chars().collect();

        if s1_chars.is_empty() && s2_chars.is_empty() {
            return 1.0;
        }
        if s1_chars.is_empty() || s2_chars.is_empty() {
            return 0.0;
        }

        let match_window = (s1_chars.len().max(s2_chars.len()) / 2).saturating_sub(1);
        let mut s1_matches = vec![false; s1_chars.len()];
        let mut s2_matches = vec![false; s2_chars.len()];
        let mut matches = 0;

        for i in 0..s1_chars.len() {
            let start = i.saturating_sub(match_window);
            let end = (i + match_window + 1).min(s2_chars.len());

            for j in start..end {
                if s2_matches[j] || s1_chars[i] != s2_chars[j] {
                    continue;
                }
                s1_matches[i] = true;
                s2_matches[j] = true;
                matches += 1;
                break;
            }
        }

        if matches == 0 {
            return 0.0;
        }

        let mut transpositions = 0;
        let mut k = 0;
        for i in 0..s1_chars.len() {
            if !s1_matches[i] {
                continue;
            }
            while !s2_matches[k] {
                k += 1;
            }
            if s1_chars[i] != s2_chars[k] {
                transpositions += 1;
            }
            k += 1;
        }

        let jaro = (matches as f64 / s1_chars.len() as f64
            + matches as f64 / s2_chars.len() as f64
            + (matches as f64 - transpositions as f64 / 2.0) / matches as f64)
            / 3.0;

        let prefix_length = s1_chars
            .iter()
            .zip(s2_chars.iter())
            .take(4)
            .take_while(|(a, b)| a == b)
            .count() as f64;

        jaro + (0.1 * prefix_length * (1.0 - jaro))
    }

    /// Levenshtein similarity
    fn levenshtein_similarity(&self, s1: &str, s2: &str) -> f64 {
        let max_len = s1.chars().count().max(s2.chars().count());
        if max_len == 0 {
            return 1.0;
        }

        let distance = self.levenshtein_distance(s1, s2);
        1.0 - (distance as f64 / max_len as f64)
    }

    /// Levenshtein distance, two-row formulation.
    fn levenshtein_distance(&self, s1: &str, s2: &str) -> usize {
        let s1_chars: Vec<char> = s1.chars().collect();
        let s2_chars: Vec<char> = s2.chars().collect();

        if s1_chars.is_empty() {
            return s2_chars.len();
        }
        if s2_chars.is_empty() {
            return s1_chars.len();
        }

        let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
        let mut current = vec![0; s2_chars.len() + 1];

        for (i, c1) in s1_chars.iter().enumerate() {
            current[0] = i + 1;
            for (j, c2) in s2_chars.iter().enumerate() {
                let cost = if c1 == c2 { 0 } else { 1 };
                current[j + 1] = (previous[j + 1] + 1)
                    .min(current[j] + 1)
                    .min(previous[j] + cost);
            }
            std::mem::swap(&mut previous, &mut current);
        }

        previous[s2_chars.len()]
    }

    /// Word overlap similarity
    fn word_overlap_similarity(&self, s1: &str, s2: &str) -> f64 {
        let words1: HashSet<&str> = s1.split_whitespace().collect();
        let words2: HashSet<&str> = s2.split_whitespace().collect();

        if words1.is_empty() && words2.is_empty() {
            return 1.0;
        }

        let union = words1.union(&words2).count();
        if union == 0 {
            return 0.0;
        }

        words1.intersection(&words2).count() as f64 / union as f64
    }
}

/// Normalize a name for comparison: lowercase, punctuation mapped to
/// spaces, whitespace runs collapsed.
fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(name: &str) -> School {
        School {
            name: name.to_string(),
            logo_url: format!(
                "https://assets.example.com/logos/{}.png",
                name.to_lowercase().replace(' ', "-")
            ),
        }
    }

    fn test_resolver() -> SchoolResolver {
        SchoolResolver::new(
            vec![
                school("Churchill High School"),
                school("Prince Edward School"),
                school("Goromonzi High School"),
                school("St Georges College"),
            ],
            0.6,
        )
    }

    #[test]
    fn test_exact_name_scores_full_confidence() {
        let resolver = test_resolver();
        let resolved = resolver.resolve("Churchill High School").unwrap();

        assert_eq!(resolved.school.name, "Churchill High School");
        assert!(resolved.score > 0.99);
    }

    #[test]
    fn test_partial_query_with_typo_resolves() {
        let resolver = test_resolver();
        let resolved = resolver.resolve("churchil").unwrap();

        assert_eq!(resolved.school.name, "Churchill High School");
        assert!(resolved.score >= 0.6);
    }

    #[test]
    fn test_partial_name_resolves() {
        let resolver = test_resolver();
        let resolved = resolver.resolve("prince edward").unwrap();

        assert_eq!(resolved.school.name, "Prince Edward School");
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        let resolver = test_resolver();
        let resolved = resolver.resolve("ST. GEORGE'S COLLEGE").unwrap();

        assert_eq!(resolved.school.name, "St Georges College");
    }

    #[test]
    fn test_gibberish_resolves_to_none() {
        let resolver = test_resolver();
        assert!(resolver.resolve("xyzxyzxyz").is_none());
        assert!(resolver.resolve("qqqq wwww 1234").is_none());
    }

    #[test]
    fn test_empty_query_resolves_to_none() {
        let resolver = test_resolver();
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("   ").is_none());
        assert!(resolver.resolve("!!!").is_none());
    }

    #[test]
    fn test_raised_threshold_rejects_weaker_matches() {
        let strict = SchoolResolver::new(vec![school("Churchill High School")], 0.95);
        assert!(strict.resolve("churchil high").is_none());
        assert!(strict.resolve("Churchill High School").is_some());
    }

    #[test]
    fn test_ties_keep_the_earliest_catalog_entry() {
        let first = School {
            name: "Twin Rivers School".to_string(),
            logo_url: "https://assets.example.com/logos/first.png".to_string(),
        };
        let second = School {
            name: "Twin Rivers School".to_string(),
            logo_url: "https://assets.example.com/logos/second.png".to_string(),
        };
        let resolver = SchoolResolver::new(vec![first, second], 0.6);

        let resolved = resolver.resolve("twin rivers").unwrap();
        assert_eq!(resolved.school.logo_url, "https://assets.example.com/logos/first.png");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = test_resolver();
        let a = resolver.resolve("goromonzi").unwrap();
        let b = resolver.resolve("goromonzi").unwrap();

        assert_eq!(a.school.name, b.school.name);
        assert_eq!(a.score, b.score);
    }
}
