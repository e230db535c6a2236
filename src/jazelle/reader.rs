use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info, warn};

use super::format::banks::BankDecoder;
use super::format::{directory, header};
use super::format::logical::LogicalRecordAssembler;
use super::iter::{IntoRecords, Records};
use super::types::error::{JazelleError, Result};
use super::types::models::{DecodedRecord, FileMetadata, LogicalRecord, SkippedBank};
use super::types::options::{ReaderOptions, Strictness};

/// The main reader for Jazelle MiniDST files.
///
/// Reads strictly forward: each call to [`next_record`](Self::next_record)
/// reassembles one logical record, locates its banks and decodes them. Once
/// the end of the data, the record limit or a fatal error has been reached
/// the reader stays finished.
pub struct JazelleReader<R: Read> {
    assembler: LogicalRecordAssembler<R>,
    metadata: FileMetadata,
    decoder: BankDecoder,
    options: ReaderOptions,
    yielded: u64,
    last_event: Option<(i32, i32)>,
    last_run: Option<i32>,
    finished: bool,
}

/// Outcome of processing one logical record.
enum Step {
    Record(Box<DecodedRecord>),
    Skipped,
    End,
}

impl JazelleReader<BufReader<File>> {
    /// Opens a Jazelle file and reads its file header.
    ///
    /// # Arguments
    /// * `path` - Path to the Jazelle file
    /// * `options` - Decoding options; see [`ReaderOptions`]
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The first logical record cannot be framed or reassembled
    /// - The file header magic is not `JAZELLE`
    pub fn open(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Jazelle file: {}", path.display());
        let file = File::open(path)?;
        Self::new(BufReader::new(file), options)
    }
}

impl<R: Read> JazelleReader<R> {
    /// Wraps any byte source and reads its file header.
    pub fn new(source: R, options: ReaderOptions) -> Result<Self> {
        let mut assembler = LogicalRecordAssembler::with_float_policy(source, options.float_policy);
        let raw = assembler
            .next_raw()?
            .ok_or_else(|| {
                JazelleError::InvalidHeader("Input holds no file header record".to_string())
            })?;
        let metadata = header::parse_file_header(&raw)?;

        info!(
            "Jazelle file '{}': created {}, modified {} ({} modifications)",
            metadata.name, metadata.created, metadata.modified, metadata.modification_count
        );

        let decoder = BankDecoder::new(options.layouts.clone(), options.float_policy);
        Ok(Self {
            assembler,
            metadata,
            decoder,
            options,
            yielded: 0,
            last_event: None,
            last_run: None,
            finished: false,
        })
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Number of logical records read after the file header, skipped ones included.
    pub fn records_read(&self) -> u64 {
        self.assembler.records_read().saturating_sub(1)
    }

    /// Number of decoded records handed out so far.
    pub fn records_yielded(&self) -> u64 {
        self.yielded
    }

    /// Run and event number of the last record handed out that carried an event header.
    pub fn last_event(&self) -> Option<(i32, i32)> {
        self.last_event
    }

    /// Returns an iterator over the remaining records.
    pub fn records(&mut self) -> Records<'_, R> {
        Records::new(self)
    }

    /// Consumes the reader into an iterator over the remaining records.
    pub fn into_records(self) -> IntoRecords<R> {
        IntoRecords::new(self)
    }

    /// Decodes the next record.
    ///
    /// Returns `Ok(None)` at the end of the data, once the record limit is
    /// reached, and after any error.
    ///
    /// # Errors
    /// Returns [`JazelleError::Fatal`] wrapping the underlying error, with
    /// the logical record number, byte offset and last event seen.
    pub fn next_record(&mut self) -> Result<Option<DecodedRecord>> {
        if self.finished {
            return Ok(None);
        }
        if let Some(limit) = self.options.max_records
            && self.yielded >= limit
        {
            info!("Record limit of {} reached", limit);
            self.finished = true;
            return Ok(None);
        }

        loop {
            let record_number = self.assembler.records_read();
            match self.step() {
                Ok(Step::Record(record)) => return Ok(Some(*record)),
                Ok(Step::Skipped) => continue,
                Ok(Step::End) => {
                    info!(
                        "End of data after {} logical records, {} decoded",
                        self.records_read(),
                        self.yielded
                    );
                    self.finished = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.finished = true;
                    return Err(JazelleError::Fatal {
                        record: record_number,
                        last_event: self.last_event,
                        offset: self.assembler.offset(),
                        source: Box::new(e),
                    });
                }
            }
        }
    }

    fn step(&mut self) -> Result<Step> {
        let Some(record) = self.assembler.next_record()? else {
            return Ok(Step::End);
        };
        self.observe(&record);

        let directory = match directory::parse(&record, self.decoder.layouts()) {
            Ok(directory) => directory,
            Err(e) if self.options.strictness == Strictness::Permissive => {
                warn!("Skipping logical record {}: {}", record.index(), e);
                return Ok(Step::Skipped);
            }
            Err(e) => return Err(e),
        };

        let mut banks = BTreeMap::new();
        let mut skipped = Vec::new();
        for entry in directory.iter().flat_map(|d| d.entries.iter()) {
            match self.decoder.decode(entry, &record.raw.payload) {
                Ok(bank) => {
                    banks.insert(entry.id, bank);
                }
                Err(e)
                    if e.is_bank_level() && self.options.strictness == Strictness::Permissive =>
                {
                    warn!("Logical record {}: skipping bank {}: {}", record.index(), entry.id, e);
                    skipped.push(SkippedBank {
                        id: entry.id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(event) = &record.event {
            self.last_event = Some((event.run, event.event));
        }
        self.yielded += 1;

        let LogicalRecord { raw, header, event, .. } = record;
        Ok(Step::Record(Box::new(DecodedRecord {
            ordinal: self.yielded,
            index: raw.index,
            header,
            event,
            toc: directory.map(|d| d.toc),
            banks,
            skipped,
        })))
    }

    /// Progress reporting and run ordering checks for every record read.
    fn observe(&mut self, record: &LogicalRecord) {
        let Some(event) = &record.event else {
            debug!("Logical record {} carries no event header", record.index());
            return;
        };

        if let Some(interval) = self.options.progress_interval
            && interval > 0
            && record.index() % interval == 0
        {
            info!(
                "Record {}: Run {}, Event {}, Time {}",
                record.index(),
                event.run,
                event.event,
                event.time
            );
        }

        if let Some(previous) = self.last_run
            && event.run < previous
        {
            warn!(
                "Run number went backwards at logical record {}: {} after {}",
                record.index(),
                event.run,
                previous
            );
        }
        self.last_run = Some(event.run);
    }
}
