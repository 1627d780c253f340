use std::collections::{HashMap, HashSet};

use ai_extractor::types::RequirementSet;
use serde::Serialize;

use crate::aggregate::{normalize_token, percent_of, AggregateSummary};

/// How many unmet market terms the pipeline recommends
pub const TOP_RECOMMENDATIONS: usize = 5;

#[derive(Serialize, Debug, Clone)]
pub struct Recommendation {
    pub term: String,
    pub count: usize,
    pub percent: f64,
}

fn resume_terms(resume: &RequirementSet) -> HashSet<String> {
    resume
        .technical_skills_and_tools
        .iter()
        .chain(resume.certifications.iter())
        .map(|item| normalize_token(item))
        .chain(
            resume
                .cloud_platforms
                .iter()
                .map(|platform| normalize_token(platform.as_str())),
        )
        .filter(|term| !term.is_empty())
        .collect()
}

/// Market terms absent from the resume, ranked by demand
/// (count descending, term ascending), truncated to `top_n`
pub fn recommend(
    summary: &AggregateSummary,
    resume: &RequirementSet,
    top_n: usize,
) -> Vec<Recommendation> {
    let covered = resume_terms(resume);

    let mut market: HashMap<&str, usize> = HashMap::new();
    for row in summary
        .skills
        .rows
        .iter()
        .chain(summary.cloud_platforms.rows.iter())
        .chain(summary.certifications.rows.iter())
    {
        *market.entry(row.term.as_str()).or_insert(0) += row.count;
    }

    let mut missing: Vec<Recommendation> = market
        .into_iter()
        .filter(|(term, _)| !covered.contains(*term))
        .map(|(term, count)| Recommendation {
            percent: percent_of(count, summary.total_postings),
            term: term.to_owned(),
            count,
        })
        .collect();
    missing.sort_by(|a, b| b.count.cmp(&a.count).then(a.term.cmp(&b.term)));
    missing.truncate(top_n);
    missing
}
