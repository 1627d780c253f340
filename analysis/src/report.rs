use std::fs;
use std::path::PathBuf;

use ai_extractor::types::RequirementSet;
use chrono::Local;
use job_collector::Posting;
use serde::Serialize;

use crate::aggregate::{AggregateSummary, FrequencyRow};
use crate::compare::Recommendation;
use crate::Result;

/// Everything one pipeline run produced, snapshotted to disk as-is
#[derive(Serialize, Debug)]
pub struct PipelineRun {
    pub job_titles: Vec<String>,
    pub country: String,
    pub postings: Vec<Posting>,
    pub extractions: Vec<RequirementSet>,
    pub resume: RequirementSet,
    pub summary: AggregateSummary,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
struct FinalResult<'a> {
    job_titles: &'a [String],
    country: &'a str,
    num_job_postings: usize,
    recommendations: &'a [Recommendation],
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Job Market Analysis and Resume Boost Report</title>
<style>
body { font-family: "Segoe UI", Arial, sans-serif; background: #fafaf7; color: #333; margin: 2em auto; max-width: 860px; }
h1 { color: #2a5d84; border-bottom: 3px solid #7fb3d5; padding-bottom: 0.3em; }
h2 { color: #2a5d84; margin-top: 1.6em; }
ul.meta { background: #eef4fa; border-radius: 6px; padding: 1em 2.5em; }
table { border-collapse: collapse; width: 100%; margin: 1em 0; }
th { background: #7fb3d5; color: #fff; text-align: left; }
th, td { border: 1px solid #d5dce2; padding: 0.45em 0.8em; }
tr:nth-child(even) { background: #f0f5f9; }
p.note { color: #555; }
</style>
</head>
<body>
<h1>Job Market Analysis and Resume Boost Report</h1>
<ul class="meta">
<li>Target Job Titles: __JOB_TITLES__</li>
<li>Country: __COUNTRY__</li>
<li>Number of job listings analyzed: __NUM_POSTS__</li>
</ul>
<h2>Job Market Analysis</h2>
<h3>Top technical skills and tools</h3>
<table>
<tr><th>Skill / Tool</th><th>Positions</th><th>% of positions</th></tr>
__SKILL_ROWS__</table>
<h3>Cloud platforms</h3>
<table>
<tr><th>Cloud platform</th><th>Positions</th><th>% of positions</th></tr>
__CLOUD_ROWS__</table>
<h3>Top certifications</h3>
<table>
<tr><th>Certification</th><th>Positions</th><th>% of positions</th></tr>
__CERT_ROWS__</table>
<h2>Resume Boosting Suggestions</h2>
<p class="note">This section compares your resume with the analyzed postings and lists the top skills and tools worth learning next, together with how often the market asked for them.</p>
<table>
<tr><th>Suggested skill / tool</th><th>Positions</th><th>% of positions</th></tr>
__RECOMMENDATION_ROWS__</table>
</body>
</html>
"#;

/// How many skills/tools the HTML market section shows
const HTML_TOP_SKILLS: usize = 20;

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn frequency_rows_html(rows: &[FrequencyRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                escape_html(&row.term),
                row.count,
                row.percent
            )
        })
        .collect()
}

fn recommendation_rows_html(recommendations: &[Recommendation]) -> String {
    recommendations
        .iter()
        .map(|recommendation| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                escape_html(&recommendation.term),
                recommendation.count,
                recommendation.percent
            )
        })
        .collect()
}

/// Substitute the run's data into the static report skeleton
pub fn render_html(run: &PipelineRun) -> String {
    HTML_TEMPLATE
        .replace("__JOB_TITLES__", &escape_html(&run.job_titles.join(", ")))
        .replace("__COUNTRY__", &escape_html(&run.country))
        .replace("__NUM_POSTS__", &run.postings.len().to_string())
        .replace(
            "__SKILL_ROWS__",
            &frequency_rows_html(run.summary.skills.top(HTML_TOP_SKILLS)),
        )
        .replace(
            "__CLOUD_ROWS__",
            &frequency_rows_html(run.summary.cloud_platforms.top(3)),
        )
        .replace(
            "__CERT_ROWS__",
            &frequency_rows_html(run.summary.certifications.top(5)),
        )
        .replace(
            "__RECOMMENDATION_ROWS__",
            &recommendation_rows_html(&run.recommendations),
        )
}

pub fn render_markdown(run: &PipelineRun) -> String {
    let mut out = String::new();
    out.push_str("# Job Market Analysis and Resume Boost Report\n\n");
    out.push_str(&format!(
        "- Target Job Titles: {}\n- Country: {}\n- Number of job listings analyzed: {}\n\n",
        run.job_titles.join(", "),
        run.country,
        run.postings.len()
    ));
    out.push_str(&run.summary.to_markdown());
    out.push_str("\n## Resume Boosting Suggestions\n\n");
    if run.recommendations.is_empty() {
        out.push_str("Your resume already covers the most requested items. Keep it up!\n");
    } else {
        out.push_str("| Suggested skill / tool | Positions | % of positions |\n");
        out.push_str("| --- | --- | --- |\n");
        for recommendation in &run.recommendations {
            out.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                recommendation.term, recommendation.count, recommendation.percent
            ));
        }
    }
    out
}

/// Written-once artifact paths of a single run
#[derive(Debug)]
pub struct WrittenReport {
    pub html: PathBuf,
    pub pipeline_json: PathBuf,
    pub summary_json: PathBuf,
    pub summary_md: PathBuf,
}

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write the HTML report and its JSON/Markdown siblings, suffixed
    /// with the wall-clock time of the run
    pub fn write_all(&self, run: &PipelineRun) -> Result<WrittenReport> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.write_with_timestamp(run, &timestamp)
    }

    fn write_with_timestamp(&self, run: &PipelineRun, timestamp: &str) -> Result<WrittenReport> {
        fs::create_dir_all(&self.output_dir)?;

        let html = self
            .output_dir
            .join(format!("job_market_report_{}.html", timestamp));
        fs::write(&html, render_html(run))?;

        let pipeline_json = self
            .output_dir
            .join(format!("crew_output_{}.json", timestamp));
        fs::write(&pipeline_json, serde_json::to_string_pretty(run)?)?;

        let final_result = FinalResult {
            job_titles: &run.job_titles,
            country: &run.country,
            num_job_postings: run.postings.len(),
            recommendations: &run.recommendations,
        };
        let summary_json = self
            .output_dir
            .join(format!("final_result_{}.json", timestamp));
        fs::write(&summary_json, serde_json::to_string_pretty(&final_result)?)?;

        let summary_md = self.output_dir.join(format!("final_result_{}.md", timestamp));
        fs::write(&summary_md, render_markdown(run))?;

        log::info!("wrote report to {}", html.display());
        Ok(WrittenReport {
            html,
            pipeline_json,
            summary_json,
            summary_md,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::compare::{recommend, TOP_RECOMMENDATIONS};
    use ai_extractor::types::CloudPlatform;

    fn sample_run() -> PipelineRun {
        let postings = vec![Posting {
            title: "AI Engineer".to_owned(),
            company: "Acme".to_owned(),
            location: "Cairo, Egypt".to_owned(),
            description: "Python & LangChain on AWS".to_owned(),
            link: None,
            job_id: Some("abc123".to_owned()),
        }];
        let extractions = vec![RequirementSet {
            technical_skills_and_tools: vec!["Python".into(), "LangChain".into()],
            cloud_platforms: vec![CloudPlatform::Aws],
            certifications: vec![],
        }];
        let resume = RequirementSet {
            technical_skills_and_tools: vec!["Python".into()],
            cloud_platforms: vec![],
            certifications: vec![],
        };
        let summary = aggregate(&extractions);
        let recommendations = recommend(&summary, &resume, TOP_RECOMMENDATIONS);
        PipelineRun {
            job_titles: vec!["AI Engineer".to_owned()],
            country: "Egypt".to_owned(),
            postings,
            extractions,
            resume,
            summary,
            recommendations,
        }
    }

    #[test]
    fn test_html_contains_meta_and_sections() {
        let html = render_html(&sample_run());
        assert!(html.contains("Job Market Analysis and Resume Boost Report"));
        assert!(html.contains("Target Job Titles: AI Engineer"));
        assert!(html.contains("Country: Egypt"));
        assert!(html.contains("Number of job listings analyzed: 1"));
        assert!(html.contains("<td>langchain</td>"));
        assert!(html.contains("Resume Boosting Suggestions"));
        assert!(!html.contains("__SKILL_ROWS__"));
    }

    #[test]
    fn test_markdown_lists_recommendations() {
        let markdown = render_markdown(&sample_run());
        assert!(markdown.contains("# Job Market Analysis and Resume Boost Report"));
        assert!(markdown.contains("| langchain | 1 | 100.0% |"));
    }

    #[test]
    fn test_artifacts_are_written_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("outputs"));
        let written = writer
            .write_with_timestamp(&sample_run(), "20250101_120000")
            .unwrap();
        for path in [
            &written.html,
            &written.pipeline_json,
            &written.summary_json,
            &written.summary_md,
        ] {
            assert!(path.exists(), "missing artifact: {}", path.display());
            assert!(fs::metadata(path).unwrap().len() > 0);
            assert!(path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .contains("20250101_120000"));
        }
        assert!(written
            .html
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("job_market_report_"));
        assert!(written
            .pipeline_json
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("crew_output_"));
    }

    #[test]
    fn test_write_all_stamps_run_time() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let written = writer.write_all(&sample_run()).unwrap();
        let name = written.html.file_name().unwrap().to_string_lossy().into_owned();
        let timestamp = name
            .trim_start_matches("job_market_report_")
            .trim_end_matches(".html");
        assert_eq!(timestamp.len(), "20250101_120000".len());
        assert!(timestamp.starts_with(&Local::now().format("%Y").to_string()));
    }
}
