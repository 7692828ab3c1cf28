pub mod run;

use crate::jobs::run::RunJob;
use serde::{Deserialize, Serialize};

/// Worker job enum - represents the jobs the worker can process
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum WorkerJob {
    /// Run code and push the output to the job's result key
    #[serde(rename = "run")]
    Run(RunJob),
}
