// 全ジョブ実行

use crate::pipeline::Pipeline;
use crate::pipeline::job_runner::{JobConfig, JobResult, run_job};

/// Run multiple jobs sequentially through one pipeline, collecting results.
/// One job failure does NOT prevent other jobs from running.
pub fn run_all_jobs(pipeline: &Pipeline, jobs: &[JobConfig]) -> Vec<crate::error::Result<JobResult>> {
    jobs.iter().map(|job| run_job(pipeline, job)).collect()
}
