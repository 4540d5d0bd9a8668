//! Driving an external column solver over a process document.
//!
//! The solver is any executable honoring the contract
//! `<solver> <process.xml> <solution.csv>`: it reads the process
//! description, integrates the column models over the scheduled stages
//! and writes the outlet concentration history as a CSV table.

use std::{
    io::Seek,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    sync::Arc,
};

use arrow::{
    csv::{reader::Format, ReaderBuilder},
    record_batch::RecordBatch,
};
use carousel::schema;

#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("Failed to launch solver {binary:?}: {source}")]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Solver exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("Solver wrote no solution table at {path:?}")]
    MissingOutput { path: PathBuf },

    #[error(transparent)]
    Schema(#[from] schema::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Anything that can turn a process document into a solution table.
pub trait ProcessSolver {
    fn solve(&mut self, document: &schema::CarouselProcess) -> Result<RecordBatch, SolveError>;
}

/// Runs a solver executable in a temporary working directory.
#[derive(Debug)]
pub struct ExternalSolver {
    binary: PathBuf,
    keep_work_dir: bool,
}

impl ExternalSolver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            keep_work_dir: false,
        }
    }

    /// Keep the working directory around after the run instead of deleting it.
    pub fn keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }
}

impl ProcessSolver for ExternalSolver {
    fn solve(&mut self, document: &schema::CarouselProcess) -> Result<RecordBatch, SolveError> {
        let work_dir = tempfile::tempdir()?;
        let input = work_dir.path().join("process.xml");
        let output = work_dir.path().join("solution.csv");

        std::fs::write(&input, schema::serialize(document)?)?;

        log::info!(
            "Running solver {:?} for process '{}'",
            self.binary,
            document.name
        );

        let run = Command::new(&self.binary)
            .arg(&input)
            .arg(&output)
            .current_dir(work_dir.path())
            .output()
            .map_err(|source| SolveError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !run.stdout.is_empty() {
            log::debug!("Solver stdout: {}", String::from_utf8_lossy(&run.stdout));
        }

        if !run.status.success() {
            return Err(SolveError::Failed {
                status: run.status,
                stderr: String::from_utf8_lossy(&run.stderr).trim().to_string(),
            });
        }

        if !output.exists() {
            return Err(SolveError::MissingOutput { path: output });
        }

        let solution = read_csv(&output)?;

        if self.keep_work_dir {
            let kept = work_dir.keep();
            log::info!("Keeping solver working directory {kept:?}");
        }

        Ok(solution)
    }
}

/// Read a CSV file into a single RecordBatch.
pub fn read_csv<P>(path: P) -> Result<RecordBatch, SolveError>
where
    P: AsRef<Path>,
{
    let mut file = std::fs::File::open(&path)?;

    // Infer the schema with the first 100 records
    let (file_schema, _) = Format::default()
        .with_header(true)
        .infer_schema(&file, Some(100))?;
    file.rewind()?;

    log::debug!(
        "Read CSV file {:?}, with schema: {:?}",
        path.as_ref(),
        file_schema
            .fields()
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
    );

    let reader = ReaderBuilder::new(Arc::new(file_schema))
        .with_header(true)
        .build(file)?;

    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    if batches.is_empty() {
        return Err(SolveError::MissingOutput {
            path: path.as_ref().to_path_buf(),
        });
    }

    Ok(arrow::compute::concat_batches(
        &batches[0].schema(),
        &batches,
    )?)
}
