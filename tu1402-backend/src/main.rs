use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tu1402_backend::executor::{JobExecutor, JobStatus};
use tu1402_backend::job::Job;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tu1402_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TU1402 benchmark backend");

    let job_paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if job_paths.is_empty() {
        anyhow::bail!("usage: tu1402-backend <job.json> [<job.json> ...]");
    }

    let out_dir = std::env::var("TU1402_OUT_DIR").unwrap_or_else(|_| "results".to_string());
    tracing::info!("Writing result tables to {}/", out_dir);

    let executor = Arc::new(JobExecutor::new(&out_dir));

    // The solver is CPU-bound, so each job runs on a blocking worker
    let mut handles = Vec::new();
    for path in job_paths {
        let executor = executor.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            match Job::from_file(&path) {
                Ok(job) => Some(executor.execute(&job)),
                Err(e) => {
                    tracing::error!("Cannot read job file {}: {}", path.display(), e);
                    None
                }
            }
        }));
    }

    let mut failures = 0usize;
    for handle in handles {
        match handle.await? {
            Some(report) => {
                if report.status == JobStatus::Completed {
                    for file in &report.files {
                        tracing::info!("  {} -> {}", report.name, file.display());
                    }
                    tracing::info!(
                        "Job '{}' finished in {:.2} s",
                        report.name,
                        report.elapsed_seconds
                    );
                } else {
                    failures += 1;
                }
            }
            None => failures += 1,
        }
    }

    if failures > 0 {
        anyhow::bail!("{} job(s) failed", failures);
    }
    Ok(())
}
