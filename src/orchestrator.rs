use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::budget::cap_records;
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::export::write_all_viz;
use crate::models::{CleanedRecord, RawRecord};
use crate::out_models::AnalysisResult;
use crate::render::{render_key_summaries_markdown, render_report_markdown};
use crate::renderer::{ArtifactFormat, RenderRequest, RendererChain};
use crate::report::{report_title, Analyzer};
use crate::scrape::{filter_by_term, load_records, mock_search};

/// Where a job's records come from.
#[derive(Debug, Clone)]
pub enum JobInput {
    Keyword(String),
    File {
        path: PathBuf,
        search: Option<String>,
        title: Option<String>,
    },
}

impl JobInput {
    pub fn label(&self) -> String {
        match self {
            JobInput::Keyword(k) => format!("keyword:{}", k.trim()),
            JobInput::File { path, search, .. } => match search {
                Some(term) => format!("file:{}?search={}", path.display(), term),
                None => format!("file:{}", path.display()),
            },
        }
    }
}

/// Records acquired for one report.
#[derive(Debug, Clone)]
pub struct Job {
    pub label: String,
    pub title: String,
    pub records: Vec<RawRecord>,
}

#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub label: String,
    pub report_id: String,
    pub dir: PathBuf,
    pub format: ArtifactFormat,
    pub renderer: String,
    pub raw_count: usize,
    pub cleaned_count: usize,
}

/// Stable id from the job's position in the run, its label and the titles
/// that survived cleaning. Repeated identical jobs get distinct ids.
pub fn report_id(index: usize, label: &str, cleaned: &[CleanedRecord]) -> String {
    let mut key = format!("{}\n{}", index, label);
    for r in cleaned {
        key.push('\n');
        key.push_str(&r.title);
    }
    format!("{:016x}", xxh3_64(key.as_bytes()))
}

pub fn acquire(input: &JobInput, now: DateTime<Utc>, max_records: usize) -> Result<Job> {
    let label = input.label();
    let (records, title) = match input {
        JobInput::Keyword(k) => (mock_search(k, now)?, None),
        JobInput::File { path, search, title } => {
            let mut records = load_records(path)?;
            if let Some(term) = search.as_deref().filter(|t| !t.trim().is_empty()) {
                records = filter_by_term(records, term.trim());
            }
            (records, title.clone())
        }
    };

    if records.is_empty() {
        error!("Acquisition empty - job={}", label);
        return Err(PipelineError::EmptyAcquisition { source_label: label }.into());
    }

    let records = cap_records(records, max_records);
    let title = title.unwrap_or_else(|| report_title(&records));
    debug!("Job acquired - job={}, records={}, title={}", label, records.len(), title);
    Ok(Job { label, title, records })
}

/// Analyze a record file without rendering anything.
pub fn analyze_file(cfg: &AppConfig, path: &Path) -> Result<AnalysisResult> {
    let options = cfg.analysis.options_today()?;
    let records = cap_records(load_records(path)?, cfg.analysis.max_records);
    Ok(Analyzer::new(options).analyze(&records))
}

pub async fn run_jobs(cfg: &AppConfig, inputs: &[JobInput], output_dir: &Path) -> Result<Vec<JobOutcome>> {
    let pipeline_start = std::time::Instant::now();
    let analyzer = Analyzer::new(cfg.analysis.options_today()?);
    let ymd = analyzer.options().today.format("%Y-%m-%d").to_string();
    info!("Pipeline started - jobs={}, date={}, output_dir={}", inputs.len(), ymd, output_dir.display());

    let now = Utc::now();
    let jobs = inputs
        .iter()
        .map(|i| acquire(i, now, cfg.analysis.max_records))
        .collect::<Result<Vec<_>>>()?;

    // analysis is CPU-bound and pure; fan out across jobs
    let analysis_start = std::time::Instant::now();
    let results: Vec<AnalysisResult> = jobs.par_iter().map(|j| analyzer.analyze(&j.records)).collect();
    info!(
        "Analysis completed - duration={:.2}s, jobs={}",
        analysis_start.elapsed().as_secs_f32(),
        results.len()
    );

    let chain = RendererChain::from_config(&cfg.render).await;
    debug!("Renderer chain - order={:?}", chain.names());

    let date_dir = output_dir.join(&ymd);
    let tasks = jobs
        .iter()
        .zip(results.iter())
        .enumerate()
        .map(|(index, (job, result))| render_and_persist(&chain, &date_dir, &ymd, index, job, result, now));
    let outcomes = futures::future::join_all(tasks)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Pipeline completed successfully - total_duration={:.2}s, reports={}",
        pipeline_start.elapsed().as_secs_f32(),
        outcomes.len()
    );
    Ok(outcomes)
}

async fn render_and_persist(
    chain: &RendererChain,
    date_dir: &Path,
    ymd: &str,
    index: usize,
    job: &Job,
    result: &AnalysisResult,
    now: DateTime<Utc>,
) -> Result<JobOutcome> {
    let id = report_id(index, &job.label, &result.cleaned);
    let dir = date_dir.join(&id);
    std::fs::create_dir_all(&dir).with_context(|| format!("create {:?}", dir))?;

    std::fs::write(dir.join("analysis.json"), serde_json::to_vec_pretty(result)?)?;
    debug!("Wrote analysis.json - report_id={}", id);

    let mut md = render_report_markdown(&job.title, &result.report, &result.cleaned, now);
    md.push_str(&render_key_summaries_markdown(&result.key_summaries));
    std::fs::write(dir.join("report.md"), md.as_bytes())?;
    debug!("Wrote report.md - report_id={}", id);

    let req = RenderRequest {
        title: &job.title,
        report: &result.report,
        records: &result.cleaned,
        generated_at: now,
    };
    let artifact = chain.render(&req).await?;
    let file = format!("report.{}", artifact.format.extension());
    std::fs::write(dir.join(&file), &artifact.bytes)?;
    debug!("Wrote {} - report_id={}, renderer={}", file, id, artifact.renderer);

    write_all_viz(&dir, ymd, result)?;
    debug!("Wrote viz bundle - report_id={}", id);

    info!(
        "Report persisted - job={}, report_id={}, format={}, directory={}",
        job.label,
        id,
        artifact.format.extension(),
        dir.display()
    );
    Ok(JobOutcome {
        label: job.label.clone(),
        report_id: id,
        dir,
        format: artifact.format,
        renderer: artifact.renderer,
        raw_count: result.raw_count,
        cleaned_count: result.cleaned_count,
    })
}
