use std::collections::{HashMap, HashSet};

use ai_extractor::types::RequirementSet;
use serde::Serialize;

const TRIMMED_PUNCTUATION: &str = " ,.;:-_/\\()[]{}\"'";

/// Lowercase, collapse whitespace, trim surrounding punctuation
pub fn normalize_token(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| TRIMMED_PUNCTUATION.contains(c))
        .to_owned()
}

pub(crate) fn percent_of(count: usize, total_postings: usize) -> f64 {
    if total_postings == 0 {
        return 0.0;
    }
    (count as f64 / total_postings as f64 * 1000.0).round() / 10.0
}

/// Document frequency: a term counts at most once per posting
fn document_frequency(items_per_posting: &[Vec<String>]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for items in items_per_posting {
        let unique: HashSet<String> = items
            .iter()
            .map(|item| normalize_token(item))
            .filter(|item| !item.is_empty())
            .collect();
        for term in unique {
            *counts.entry(term).or_insert(0) += 1;
        }
    }
    counts
}

/// Whole-word containment, so "aws" subsumes "aws certified" but
/// "go" does not subsume "google cloud"
fn term_subsumes(short: &str, long: &str) -> bool {
    if short.len() < 2 || short.len() >= long.len() {
        return false;
    }
    format!(" {} ", long).contains(&format!(" {} ", short))
}

/// Fold near-duplicate terms into their shortest kept form, summing counts.
/// A naive heuristic, a candidate for embeddings later.
fn merge_substrings(counts: HashMap<String, usize>) -> HashMap<String, usize> {
    let mut terms: Vec<&String> = counts.keys().collect();
    terms.sort_by(|a, b| a.len().cmp(&b.len()).then(a.cmp(b)));
    let mut merged: Vec<(String, usize)> = Vec::new();
    for term in terms {
        let count = counts[term];
        match merged
            .iter_mut()
            .find(|(kept, _)| term_subsumes(kept, term))
        {
            Some((_, kept_count)) => *kept_count += count,
            None => merged.push((term.clone(), count)),
        }
    }
    merged.into_iter().collect()
}

#[derive(Serialize, Debug, Clone)]
pub struct FrequencyRow {
    pub term: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct FrequencyTable {
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    fn from_counts(counts: HashMap<String, usize>, total_postings: usize) -> Self {
        let mut rows: Vec<FrequencyRow> = counts
            .into_iter()
            .map(|(term, count)| FrequencyRow {
                percent: percent_of(count, total_postings),
                term,
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.term.cmp(&b.term)));
        Self { rows }
    }

    pub fn top(&self, n: usize) -> &[FrequencyRow] {
        &self.rows[..self.rows.len().min(n)]
    }
}

/// Frequency-ranked merge of the RequirementSets across all postings
#[derive(Serialize, Debug, Clone)]
pub struct AggregateSummary {
    pub total_postings: usize,
    pub skills: FrequencyTable,
    pub cloud_platforms: FrequencyTable,
    pub certifications: FrequencyTable,
}

pub fn aggregate(sets: &[RequirementSet]) -> AggregateSummary {
    let total = sets.len();
    let skills: Vec<Vec<String>> = sets
        .iter()
        .map(|set| set.technical_skills_and_tools.clone())
        .collect();
    let clouds: Vec<Vec<String>> = sets
        .iter()
        .map(|set| {
            set.cloud_platforms
                .iter()
                .map(|platform| platform.as_str().to_owned())
                .collect()
        })
        .collect();
    let certifications: Vec<Vec<String>> = sets
        .iter()
        .map(|set| set.certifications.clone())
        .collect();
    AggregateSummary {
        total_postings: total,
        skills: FrequencyTable::from_counts(merge_substrings(document_frequency(&skills)), total),
        // closed three-value vocabulary, nothing to merge
        cloud_platforms: FrequencyTable::from_counts(document_frequency(&clouds), total),
        certifications: FrequencyTable::from_counts(
            merge_substrings(document_frequency(&certifications)),
            total,
        ),
    }
}

fn push_markdown_table<'a>(
    out: &mut String,
    header: &str,
    rows: impl Iterator<Item = &'a FrequencyRow>,
) {
    out.push_str(&format!("| {} | Positions | % of positions |\n", header));
    out.push_str("| --- | --- | --- |\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            row.term, row.count, row.percent
        ));
    }
}

impl AggregateSummary {
    /// Markdown summary: every skill/tool, top 3 cloud platforms,
    /// top 5 certifications
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("## Job Market Analysis\n\n");
        out.push_str(&format!("Postings analyzed: {}\n\n", self.total_postings));
        out.push_str("### Technical skills and tools\n\n");
        push_markdown_table(&mut out, "Skill / Tool", self.skills.rows.iter());
        out.push_str("\n### Cloud platforms\n\n");
        push_markdown_table(
            &mut out,
            "Cloud platform",
            self.cloud_platforms.top(3).iter(),
        );
        out.push_str("\n### Certifications\n\n");
        push_markdown_table(&mut out, "Certification", self.certifications.top(5).iter());
        out
    }
}
