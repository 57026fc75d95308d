//! Job metadata for batch and import submissions.
//!
//! The router's job collaborator persists one [`JobRecord`] per submitted
//! job. State and kind are closed enumerations; the string forms accepted by
//! [`FromStr`] exist for interoperability with persisted records, which store
//! them case-insensitively.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use smart_default::SmartDefault;

use crate::error::{Error, Result};

/// Lifecycle state of a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Submitted,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
}

impl JobState {
    /// True iff no further state transition can occur
    pub fn is_final(self) -> bool {
        matches!(
            self,
            JobState::Finished | JobState::Failed | JobState::Killed | JobState::Lost
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Submitted => "submitted",
            JobState::Running => "running",
            JobState::Finished => "finished",
            JobState::Failed => "failed",
            JobState::Killed => "killed",
            JobState::Lost => "lost",
        };
        f.write_str(name)
    }
}

impl FromStr for JobState {
    type Err = Error;

    /// Case-insensitive. An unknown or empty state raises instead of being
    /// silently treated as non-final.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "submitted" => Ok(JobState::Submitted),
            "running" => Ok(JobState::Running),
            "finished" => Ok(JobState::Finished),
            "failed" => Ok(JobState::Failed),
            "killed" => Ok(JobState::Killed),
            "lost" => Ok(JobState::Lost),
            _ => Err(Error::UnknownJobState(s.to_owned())),
        }
    }
}

/// Kind of work a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    BatchSql,
    ImportOfflineData,
    ImportOnlineData,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobType::BatchSql => "batchsql",
            JobType::ImportOfflineData => "importofflinedata",
            JobType::ImportOnlineData => "importonlinedata",
        };
        f.write_str(name)
    }
}

impl FromStr for JobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "batchsql" => Ok(JobType::BatchSql),
            "importofflinedata" => Ok(JobType::ImportOfflineData),
            "importonlinedata" => Ok(JobType::ImportOnlineData),
            _ => Err(Error::UnknownJobType(s.to_owned())),
        }
    }
}

/// Persisted metadata of one submitted job.
///
/// Created by the job-submission collaborator; the codec core never mutates
/// it except through [`JobRecord::set_state`].
#[derive(Debug, Clone, SmartDefault, PartialEq)]
pub struct JobRecord {
    pub id: i64,
    #[default(JobType::BatchSql)]
    pub job_type: JobType,
    #[default(JobState::Submitted)]
    pub state: JobState,
    pub start_time: Option<SystemTime>,
    pub end_time: Option<SystemTime>,
    pub cluster: String,
    pub parameter: String,
    pub application_id: String,
    pub error: String,
}

impl JobRecord {
    /// True iff the job reached a state from which no transition occurs
    pub fn is_final(&self) -> bool {
        self.state.is_final()
    }

    /// Apply a state-transition update from the job collaborator.
    ///
    /// Terminal states are sinks; moving out of one is an error.
    pub fn set_state(&mut self, next: JobState) -> Result<()> {
        if self.state.is_final() {
            return Err(Error::JobStateTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, job_type: {}, state: {}, cluster: {}, parameter: {}, application_id: {}, error: {}",
            self.id,
            self.job_type,
            self.state,
            self.cluster,
            self.parameter,
            self.application_id,
            self.error
        )
    }
}
