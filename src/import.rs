//! Bulk task import from delimited text files.
//!
//! Each data row becomes one `POST /tasks` with `{title, description}` taken
//! from the first two columns. The header row and empty lines are skipped.
//! Requests are sent one at a time and never retried.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Payload for `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub sent: usize,
    pub created: usize,
    pub rejected: usize,
}

/// Minimal client for the tasks endpoint.
#[derive(Debug, Clone)]
pub struct TasksClient {
    client: Client,
    base_url: String,
}

impl TasksClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `POST /tasks`. Returns the response status; only transport failures are errors.
    pub async fn create_task(&self, task: &NewTask) -> Result<StatusCode, reqwest::Error> {
        let resp = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .json(task)
            .send()
            .await?;
        Ok(resp.status())
    }
}

/// Stream rows from `reader`, skipping the header line.
pub fn rows<R: Read>(reader: R, delimiter: u8) -> impl Iterator<Item = Result<NewTask, ImportError>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .map(|record| {
            let record = record?;
            Ok(NewTask {
                title: record.get(0).unwrap_or_default().to_string(),
                description: record.get(1).unwrap_or_default().to_string(),
            })
        })
}

/// Send every row of `reader` to the API, in order.
///
/// A transport error aborts the run. A rejected row (non-2xx) is logged and skipped.
pub async fn import_tasks<R: Read>(
    client: &TasksClient,
    reader: R,
    delimiter: u8,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();

    for (index, row) in rows(reader, delimiter).enumerate() {
        let task = row?;
        let status = client.create_task(&task).await?;
        summary.sent += 1;

        if status.is_success() {
            summary.created += 1;
            tracing::debug!(row = index + 1, title = %task.title, "Task imported");
        } else {
            summary.rejected += 1;
            tracing::warn!(row = index + 1, title = %task.title, status = %status, "Task rejected");
        }
    }

    Ok(summary)
}

/// [`import_tasks`] over a file on disk.
pub async fn import_file(
    client: &TasksClient,
    path: &Path,
    delimiter: u8,
) -> Result<ImportSummary, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    import_tasks(client, file, delimiter).await
}
