use std::path::PathBuf;

use clap::Parser;
use log::info;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cigar::CigarError,
    dedup::{ChromDedupIndex, Classification, UmiWhitelist},
    io::{RecordSinks, SinkError},
    metrics::Metrics,
    record::{AlignmentRecord, RecordError},
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    /// Text file with the known UMI sequences, one per line
    #[clap(short, long)]
    pub umis: PathBuf,

    /// The input SAM file to split into unique/duplicate/bad-umi reads
    #[clap(short, long)]
    pub file: PathBuf,

    /// The input SAM file contains paired-end reads.
    /// samdedup is single-end only and will refuse to run
    #[clap(short, long)]
    pub paired_end: bool,

    /// The duplication metrics file, if missing metrics will be written to stderr
    #[clap(short = 'm', long)]
    pub metrics: Option<PathBuf>,
}

pub struct App {
    config: Config,
    reader: BufReader<File>,
    sinks: RecordSinks,
    index: ChromDedupIndex,
    metrics: Metrics,
}

impl App {
    pub async fn new() -> Result<App, SamDedupError> {
        let config = Config::parse();

        // refuse before any path is opened or created
        if config.paired_end {
            return Err(SamDedupError::PairedEndInput);
        }

        let whitelist = UmiWhitelist::from_lines(&fs::read_to_string(&config.umis).await?);
        info!(
            "loaded {} whitelisted umis from {}",
            whitelist.len(),
            config.umis.display()
        );

        let reader = BufReader::new(File::open(&config.file).await?);
        let sinks = RecordSinks::create(&config.file).await?;
        let index = ChromDedupIndex::new(&whitelist);

        Ok(App {
            config,
            reader,
            sinks,
            index,
            metrics: Metrics::default(),
        })
    }

    /// Stream the alignment file line by line and route every line to the
    /// sink matching its classification. A single pass; records must be
    /// grouped by reference sequence for the scoped index to hold.
    pub async fn run(&mut self) -> Result<(), SamDedupError> {
        let mut lines = (&mut self.reader).lines();

        while let Some(line) = lines.next_line().await? {
            let classification = if line.starts_with('@') {
                Classification::Header
            } else {
                let record = AlignmentRecord::parse(&line)?;
                self.index.enter_reference(record.reference_name());
                let start = record.cigar().adjust(record.signed_start())?;
                self.index.classify(record.umi(), start)
            };
            self.metrics.count(classification);
            self.sinks.write(classification, &line).await?;
        }

        self.sinks.shutdown().await?;

        info!(
            "classified {} reads, {} duplicates",
            self.metrics.reads_examined(),
            self.metrics.duplicate_reads()
        );

        // print/write the metrics (sync)
        if let Some(path) = &self.config.metrics {
            use std::io::Write;
            let mut mout = std::fs::File::create(path)?;
            write!(mout, "{}", self.metrics)?;
        } else {
            eprintln!("{}", self.metrics);
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SamDedupError {
    #[error("paired-end input is not supported")]
    PairedEndInput,
    #[error("IoError")]
    IoError(#[from] std::io::Error),
    #[error("Error creating output files")]
    SinkError(#[from] SinkError),
    #[error("Error parsing alignment record")]
    RecordError(#[from] RecordError),
    #[error("Error adjusting alignment position")]
    CigarError(#[from] CigarError),
}
