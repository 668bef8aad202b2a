use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{self, AsyncWriteExt, BufWriter};

use crate::dedup::Classification;

/// The three classified output streams created next to the input file.
///
/// Sinks are opened once, written append-only in consumption order and
/// flushed by [`RecordSinks::shutdown`] at the end of the run.
pub struct RecordSinks {
    uniques: BufWriter<File>,
    duplicates: BufWriter<File>,
    bad_umi: BufWriter<File>,
}

impl RecordSinks {
    /// Create the output files derived from the alignment file name.
    pub async fn create(input: &Path) -> Result<RecordSinks, SinkError> {
        Ok(RecordSinks {
            uniques: sink(input, "_uniques").await?,
            duplicates: sink(input, "_duplicates").await?,
            bad_umi: sink(input, "_bad_umi").await?,
        })
    }

    /// Append `line` to the stream matching `classification`. Header lines
    /// always go to the uniques stream.
    pub async fn write(&mut self, classification: Classification, line: &str) -> io::Result<()> {
        let sink = match classification {
            Classification::Header | Classification::Unique => &mut self.uniques,
            Classification::Duplicate => &mut self.duplicates,
            Classification::BadUmi => &mut self.bad_umi,
        };
        sink.write_all(line.as_bytes()).await?;
        sink.write_all(b"\n").await
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.uniques.shutdown().await?;
        self.duplicates.shutdown().await?;
        self.bad_umi.shutdown().await
    }
}

async fn sink(input: &Path, tag: &str) -> Result<BufWriter<File>, SinkError> {
    Ok(BufWriter::new(File::create(derive_path(input, tag)?).await?))
}

/// Insert `tag` in front of the 4 byte extension of `input`:
/// `reads.sam` becomes `reads_uniques.sam`.
fn derive_path(input: &Path, tag: &str) -> Result<PathBuf, SinkError> {
    let name = input
        .to_str()
        .ok_or_else(|| SinkError::UnusableName(input.to_owned()))?;
    let split = name
        .len()
        .checked_sub(4)
        .filter(|&at| at > 0 && name.is_char_boundary(at))
        .ok_or_else(|| SinkError::UnusableName(input.to_owned()))?;
    let (stem, ext) = name.split_at(split);
    Ok(PathBuf::from(format!("{stem}{tag}{ext}")))
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error creating output file")]
    Io(#[from] std::io::Error),
    #[error("cannot derive output names from {0:?}")]
    UnusableName(PathBuf),
}
