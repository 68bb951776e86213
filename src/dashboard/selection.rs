//! Single-job selection for the detail overlay.

use thiserror::Error;

use crate::models::{Job, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no job with id '{0}' in the current snapshot")]
    UnknownJob(String),
}

/// The selected job id, if any.
///
/// The id is checked against the snapshot when it is set, but may stop
/// resolving after a refresh. [`resolve`](Self::resolve) then yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    job_id: Option<String>,
}

impl Selection {
    /// Select `id`, replacing any previous selection.
    pub fn select(&mut self, snapshot: &Snapshot, id: &str) -> Result<(), SelectionError> {
        if snapshot.job(id).is_none() {
            return Err(SelectionError::UnknownJob(id.to_string()));
        }
        self.job_id = Some(id.to_string());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.job_id = None;
    }

    #[must_use]
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Look the selection up in `snapshot`.
    #[must_use]
    pub fn resolve<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Job> {
        self.job_id.as_deref().and_then(|id| snapshot.job(id))
    }
}
