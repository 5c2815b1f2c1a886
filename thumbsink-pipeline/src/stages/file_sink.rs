//! Sequential file writer stage.
//!
//! Writes each encoded payload to a new numbered file. The index is owned
//! by the sink for the pipeline's lifetime and only resets when a new
//! pipeline is constructed. A failed write propagates as
//! [`PipelineError::Write`] with no retry; the host decides on recovery.

use crate::caps::Caps;
use crate::naming::NamingPolicy;
use crate::stage::{Stage, StagePayload};
use crate::{PipelineError, Result};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use thumbsink_core::CoreError;
use tracing::{debug, info};

/// Writes encoded stills to sequentially numbered files.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    naming: NamingPolicy,
    next_index: u64,
    files_written: u64,
}

impl FileSink {
    /// Create a sink writing into `dir` using the given template, starting
    /// at `start_index`.
    ///
    /// Construction is pure setup; the directory is first touched when a
    /// payload arrives.
    pub fn new(dir: PathBuf, template: &str, start_index: u64) -> Result<Self> {
        Ok(Self {
            dir,
            naming: NamingPolicy::parse(template)?,
            next_index: start_index,
            files_written: 0,
        })
    }

    /// Files written so far.
    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    /// Index the next file will use.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    fn write_file(&mut self, data: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(self.naming.render(self.next_index));
        let mut file = File::create(&path).map_err(|source| PipelineError::Write {
            path: path.clone(),
            source,
        })?;
        file.write_all(data).map_err(|source| PipelineError::Write {
            path: path.clone(),
            source,
        })?;

        self.next_index += 1;
        self.files_written += 1;
        Ok(path)
    }
}

impl Stage for FileSink {
    fn name(&self) -> &str {
        "thumb_sink"
    }

    fn input_caps(&self) -> Caps {
        Caps::still()
    }

    fn output_caps(&self) -> Caps {
        // Terminal stage: output escapes as a filesystem side effect.
        Caps::still()
    }

    fn process(&mut self, payload: StagePayload) -> Result<Option<StagePayload>> {
        let StagePayload::Still(still) = payload else {
            return Err(PipelineError::Core(CoreError::invalid_param(
                "file sink received a raw payload",
            )));
        };

        let path = self.write_file(&still.data)?;
        debug!(path = %path.display(), bytes = still.data.len(), "thumbnail written");
        Ok(None)
    }

    fn finish(&mut self) -> Result<()> {
        info!(files = self.files_written, "file sink finished");
        Ok(())
    }
}
