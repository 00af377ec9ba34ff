//! Directory search engine
//!
//! Scored multi-criterion matching over the directory snapshot: exact name
//! tokens beat prefixes, prefixes beat fuzzy and substring hits. Results
//! are ordered by score then name so repeated queries are reproducible.

use std::collections::HashMap;

use crate::domain::entities::Employee;

const SCORE_EXACT: u32 = 3;
const SCORE_PREFIX: u32 = 2;
const SCORE_FUZZY: u32 = 1;
const SCORE_SUBSTRING: u32 = 1;

/// Minimum token length before fuzzy matching applies; shorter tokens
/// produce too many accidental one-edit neighbours.
const FUZZY_MIN_LEN: usize = 4;

/// Precomputed token index over a set of employees. Immutable once built;
/// a directory reload builds a fresh one and swaps it in wholesale.
#[derive(Debug)]
pub struct SearchIndex {
    employees: Vec<Employee>,
    /// Normalized name tokens per employee, parallel to `employees`.
    name_tokens: Vec<Vec<String>>,
    /// Normalized position + department text per employee, for substring hits.
    extra_text: Vec<String>,
    /// Normalized name token -> employee ids containing it.
    token_map: HashMap<String, Vec<usize>>,
}

/// Result of one search. `NoMatches` is distinct from an empty hit list on
/// purpose: the router renders a helpful message instead of silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query normalized to nothing; ask the user for one.
    EmptyQuery,
    /// Every employee scored zero.
    NoMatches,
    Matches {
        hits: Vec<Hit>,
        /// How many further matches were cut by the top-K limit.
        remaining: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub employee: Employee,
    pub score: u32,
}

impl SearchIndex {
    /// Build the index once for a loaded employee set.
    pub fn build(employees: Vec<Employee>) -> Self {
        let mut name_tokens = Vec::with_capacity(employees.len());
        let mut extra_text = Vec::with_capacity(employees.len());
        let mut token_map: HashMap<String, Vec<usize>> = HashMap::new();

        for (id, employee) in employees.iter().enumerate() {
            let tokens = normalize_tokens(&employee.name);
            for token in &tokens {
                let ids = token_map.entry(token.clone()).or_default();
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            name_tokens.push(tokens);

            let mut extra = normalize_tokens(employee.position.as_deref().unwrap_or_default());
            extra.extend(normalize_tokens(&employee.department));
            extra_text.push(extra.join(" "));
        }

        Self {
            employees,
            name_tokens,
            extra_text,
            token_map,
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Employee ids whose name contains the exact normalized token.
    pub fn lookup(&self, token: &str) -> &[usize] {
        self.token_map
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Answer a "find a person" query against the index.
    pub fn search(&self, query: &str, top_k: usize) -> SearchOutcome {
        let query_tokens = normalize_tokens(query);
        if query_tokens.is_empty() {
            return SearchOutcome::EmptyQuery;
        }

        let mut scored: Vec<(u32, usize)> = Vec::new();
        for id in 0..self.employees.len() {
            let score: u32 = query_tokens
                .iter()
                .map(|token| self.score_token(token, id))
                .sum();
            if score > 0 {
                scored.push((score, id));
            }
        }

        if scored.is_empty() {
            return SearchOutcome::NoMatches;
        }

        // Descending score, name ascending as the tie break. Stable and
        // deterministic across runs regardless of map iteration order.
        scored.sort_by(|(sa, ia), (sb, ib)| {
            sb.cmp(sa)
                .then_with(|| self.employees[*ia].name.cmp(&self.employees[*ib].name))
        });

        let remaining = scored.len().saturating_sub(top_k);
        let hits = scored
            .into_iter()
            .take(top_k)
            .map(|(score, id)| Hit {
                employee: self.employees[id].clone(),
                score,
            })
            .collect();

        SearchOutcome::Matches { hits, remaining }
    }

    /// Best single criterion for one query token against one employee.
    fn score_token(&self, token: &str, id: usize) -> u32 {
        let names = &self.name_tokens[id];

        if self.lookup(token).binary_search(&id).is_ok() {
            return SCORE_EXACT;
        }
        if names.iter().any(|n| n.starts_with(token)) {
            return SCORE_PREFIX;
        }
        if token.len() >= FUZZY_MIN_LEN
            && names.iter().any(|n| within_one_edit(token, n))
        {
            return SCORE_FUZZY;
        }
        if self.extra_text[id].contains(token) {
            return SCORE_SUBSTRING;
        }
        0
    }
}

/// Normalize text into search tokens: lowercase, diacritics folded,
/// punctuation dropped, split on whitespace. Applied identically at index
/// build and query time.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                current.push(fold_diacritic(lower).unwrap_or(lower));
            }
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Fold the common Latin-1 accents and Cyrillic yo that show up in
/// personnel data. Returns `None` when the char needs no folding.
fn fold_diacritic(c: char) -> Option<char> {
    let plain = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ё' => 'е',
        _ => return None,
    };
    Some(plain)
}

/// True when `a` and `b` are within edit distance one (insert, delete or
/// substitute a single char). Linear scan, no allocation.
pub fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    match long.len() - short.len() {
        0 => {
            let diffs = short.iter().zip(long.iter()).filter(|(x, y)| x != y).count();
            diffs <= 1
        }
        1 => {
            // One deletion from the longer string must align the rest.
            let mut i = 0;
            let mut j = 0;
            let mut skipped = false;
            while i < short.len() && j < long.len() {
                if short[i] == long[j] {
                    i += 1;
                    j += 1;
                } else if skipped {
                    return false;
                } else {
                    skipped = true;
                    j += 1;
                }
            }
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SearchIndex {
        SearchIndex::build(vec![
            Employee::new("Ivan Petrov", "Sales").with_position("Sales Manager"),
            Employee::new("Irina Ivanova", "Marketing").with_position("Designer"),
            Employee::new("Oleg Arsipov", "Engineering").with_position("Backend Developer"),
        ])
    }

    fn hit_names(outcome: &SearchOutcome) -> Vec<&str> {
        match outcome {
            SearchOutcome::Matches { hits, .. } => {
                hits.iter().map(|h| h.employee.name.as_str()).collect()
            }
            other => panic!("expected matches, got {:?}", other),
        }
    }

    #[test]
    fn ivan_query_ranks_exact_token_above_prefix() {
        let outcome = index().search("ivan", 5);
        assert_eq!(hit_names(&outcome), vec!["Ivan Petrov", "Irina Ivanova"]);
    }

    #[test]
    fn full_name_query_gives_the_maximum_score() {
        let idx = index();
        let outcome = idx.search("Ivan Petrov", 5);
        let SearchOutcome::Matches { hits, .. } = &outcome else {
            panic!("expected matches");
        };
        let top = &hits[0];
        assert_eq!(top.employee.name, "Ivan Petrov");
        assert!(hits.iter().all(|h| h.score <= top.score));
    }

    #[test]
    fn results_are_reproducible() {
        let idx = index();
        let first = idx.search("ivan", 5);
        for _ in 0..10 {
            assert_eq!(idx.search("ivan", 5), first);
        }
    }

    #[test]
    fn empty_query_is_signalled_without_a_scan() {
        assert_eq!(index().search("  ...  ", 5), SearchOutcome::EmptyQuery);
        assert_eq!(index().search("", 5), SearchOutcome::EmptyQuery);
    }

    #[test]
    fn no_matches_is_distinct_from_empty() {
        assert_eq!(index().search("zzzzz", 5), SearchOutcome::NoMatches);
    }

    #[test]
    fn truncation_reports_remaining_count() {
        let idx = SearchIndex::build(
            (0..7)
                .map(|i| Employee::new(format!("Ivan Number{}", i), "Sales"))
                .collect(),
        );
        let SearchOutcome::Matches { hits, remaining } = idx.search("ivan", 5) else {
            panic!("expected matches");
        };
        assert_eq!(hits.len(), 5);
        assert_eq!(remaining, 2);
    }

    #[test]
    fn position_and_department_match_as_substring() {
        let outcome = index().search("backend", 5);
        assert_eq!(hit_names(&outcome), vec!["Oleg Arsipov"]);
        let outcome = index().search("marketing", 5);
        assert_eq!(hit_names(&outcome), vec!["Irina Ivanova"]);
    }

    #[test]
    fn fuzzy_matches_within_one_edit() {
        let outcome = index().search("petrow", 5);
        assert_eq!(hit_names(&outcome), vec!["Ivan Petrov"]);
    }

    #[test]
    fn diacritics_fold_to_their_base_letters() {
        let idx = SearchIndex::build(vec![Employee::new("José García", "Support")]);
        let outcome = idx.search("jose", 5);
        assert_eq!(hit_names(&outcome), vec!["José García"]);
    }

    #[test]
    fn within_one_edit_cases() {
        assert!(within_one_edit("petrov", "petrov"));
        assert!(within_one_edit("petrov", "petrow"));
        assert!(within_one_edit("petrov", "petro"));
        assert!(within_one_edit("petrov", "petrovs"));
        assert!(!within_one_edit("petrov", "pertov"));
        assert!(!within_one_edit("petrov", "pet"));
    }
}
