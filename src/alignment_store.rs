use log::debug;
use rust_htslib::bam;
use rust_htslib::bam::Read;
use rust_htslib::bam::ext::BamRecordExtensions;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum AlignmentError {
    #[error("failed to open indexed alignment file {filename:?}: {source}")]
    IndexLoad {
        filename: PathBuf,
        source: rust_htslib::errors::Error
    },
    #[error("failed to configure reader for {filename:?}: {source}")]
    ReaderSetup {
        filename: PathBuf,
        source: rust_htslib::errors::Error
    },
    #[error("failed to query contig {contig_id} over {start}..{end}: {source}")]
    Query {
        contig_id: u32,
        start: u64,
        end: u64,
        source: rust_htslib::errors::Error
    },
    #[error("query over {start}..{end} is outside the indexable coordinate range")]
    CoordinateRange {
        start: u64,
        end: u64
    },
    #[error("failed to read alignment record: {0}")]
    Record(#[from] rust_htslib::errors::Error),
    #[error("read name is not valid UTF-8: {0}")]
    ReadName(#[from] std::str::Utf8Error),
    #[error("alignment record {read_name:?} is not placed on a contig")]
    UnplacedRecord { read_name: String },
    #[error("unknown contig {contig:?}")]
    UnknownContig { contig: String }
}

/// The parts of an aligned read that the counting logic needs
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlignmentRecord {
    /// The contig index in the alignment header
    contig_id: u32,
    /// First reference base covered, 0-based inclusive
    start: u64,
    /// Reference end of the alignment, 0-based exclusive
    end: u64,
    /// The read name, shared by all records from the same read
    read_name: String,
    /// Mapping quality
    mapq: u8,
    /// SAM flags
    flags: u16
}

impl AlignmentRecord {
    /// Creates a primary, MAPQ 60 record
    /// # Arguments
    /// * `contig_id` - the contig index
    /// * `start` - 0-based inclusive start
    /// * `end` - 0-based exclusive end
    /// * `read_name` - the read identifier
    pub fn new(contig_id: u32, start: u64, end: u64, read_name: String) -> AlignmentRecord {
        AlignmentRecord {
            contig_id,
            start,
            end,
            read_name,
            mapq: 60,
            flags: 0
        }
    }

    pub fn with_mapq(mut self, mapq: u8) -> AlignmentRecord {
        self.mapq = mapq;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> AlignmentRecord {
        self.flags = flags;
        self
    }

    /// Converts an htslib record, keeping only what we need
    /// # Errors
    /// * if the read name is not UTF-8
    /// * if the record has no contig
    pub fn from_bam(record: &bam::Record) -> Result<AlignmentRecord, AlignmentError> {
        let read_name: String = std::str::from_utf8(record.qname())?.to_string();
        let contig_id: u32 = match u32::try_from(record.tid()) {
            Ok(tid) => tid,
            Err(_) => return Err(AlignmentError::UnplacedRecord { read_name })
        };
        Ok(AlignmentRecord {
            contig_id,
            start: record.pos().max(0) as u64,
            end: record.reference_end().max(0) as u64,
            read_name,
            mapq: record.mapq(),
            flags: record.flags()
        })
    }

    pub fn contig_id(&self) -> u32 {
        self.contig_id
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn read_name(&self) -> &str {
        &self.read_name
    }

    pub fn mapq(&self) -> u8 {
        self.mapq
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Returns true if the alignment spans the reference position, `start <= position < end`
    pub fn covers(&self, position: u64) -> bool {
        self.start <= position && position < self.end
    }
}

/// Lazy sequence of records from a single overlap query
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<AlignmentRecord, AlignmentError>> + 'a>;

/// Read-only, indexed access to aligned reads.
/// Dropping the store releases the underlying handle.
pub trait AlignmentStore {
    /// Returns the contig index for a contig name, or None if the store does not know the contig
    fn contig_id(&self, contig: &str) -> Option<u32>;

    /// Returns every record overlapping the half-open interval `[start, end)` on a contig.
    /// The returned iterator must be fully consumed or dropped before the next query.
    fn query_overlap(&mut self, contig_id: u32, start: u64, end: u64) -> Result<RecordIter<'_>, AlignmentError>;
}

/// Anything that can hand out independent store handles, one per concurrent worker
pub trait StoreOpener: Send + Sync {
    type Store: AlignmentStore;

    fn open_store(&self) -> Result<Self::Store, AlignmentError>;
}

/// Everything required to open an indexed BAM/CRAM
#[derive(Clone, Debug)]
pub struct BamStoreConfig {
    /// The alignment file, must have a .bai/.csi/.crai index
    pub filename: PathBuf,
    /// Reference FASTA, required to decode most CRAM files
    pub reference: Option<PathBuf>,
    /// Number of htslib decompression threads per handle
    pub io_threads: usize
}

impl BamStoreConfig {
    pub fn new(filename: &Path, reference: Option<&Path>, io_threads: usize) -> BamStoreConfig {
        BamStoreConfig {
            filename: filename.to_path_buf(),
            reference: reference.map(|r| r.to_path_buf()),
            io_threads
        }
    }
}

impl StoreOpener for BamStoreConfig {
    type Store = IndexedBamStore;

    fn open_store(&self) -> Result<IndexedBamStore, AlignmentError> {
        IndexedBamStore::open(self)
    }
}

/// htslib-backed store over an indexed BAM or CRAM file
pub struct IndexedBamStore {
    /// The underlying reader
    bam_reader: bam::IndexedReader
}

impl IndexedBamStore {
    /// Opens the alignment file and loads its index.
    /// # Arguments
    /// * `config` - the file, optional reference, and thread settings
    /// # Errors
    /// * if the file or its index cannot be loaded
    /// * if the reference or thread configuration is rejected by htslib
    pub fn open(config: &BamStoreConfig) -> Result<IndexedBamStore, AlignmentError> {
        debug!("Opening {:?}...", config.filename);
        let mut bam_reader = bam::IndexedReader::from_path(&config.filename)
            .map_err(|e| AlignmentError::IndexLoad {
                filename: config.filename.clone(),
                source: e
            })?;

        if let Some(reference) = config.reference.as_ref() {
            bam_reader.set_reference(reference)
                .map_err(|e| AlignmentError::ReaderSetup {
                    filename: config.filename.clone(),
                    source: e
                })?;
        }

        if config.io_threads > 1 {
            bam_reader.set_threads(config.io_threads)
                .map_err(|e| AlignmentError::ReaderSetup {
                    filename: config.filename.clone(),
                    source: e
                })?;
        }

        Ok(IndexedBamStore {
            bam_reader
        })
    }
}

/// Unpacks a single entry from the htslib record iterator
fn convert_record(entry: rust_htslib::errors::Result<bam::Record>) -> Result<AlignmentRecord, AlignmentError> {
    let record: bam::Record = entry?;
    AlignmentRecord::from_bam(&record)
}

impl AlignmentStore for IndexedBamStore {
    fn contig_id(&self, contig: &str) -> Option<u32> {
        self.bam_reader.header().tid(contig.as_bytes())
    }

    fn query_overlap(&mut self, contig_id: u32, start: u64, end: u64) -> Result<RecordIter<'_>, AlignmentError> {
        // htslib coordinates are i64, larger values would panic inside the fetch conversion
        let (fetch_start, fetch_end): (i64, i64) = match (i64::try_from(start), i64::try_from(end)) {
            (Ok(s), Ok(e)) => (s, e),
            _ => return Err(AlignmentError::CoordinateRange { start, end })
        };
        self.bam_reader.fetch((contig_id, fetch_start, fetch_end))
            .map_err(|e| AlignmentError::Query {
                contig_id,
                start,
                end,
                source: e
            })?;
        Ok(Box::new(self.bam_reader.records().map(convert_record)))
    }
}

/// Store that keeps all records in memory, useful for small inputs and for testing the counting logic
#[derive(Clone, Debug, Default)]
pub struct InMemoryAlignments {
    /// Contig names, the index is the contig id
    contigs: Vec<String>,
    /// All records, kept sorted by (contig_id, start)
    records: Vec<AlignmentRecord>
}

impl InMemoryAlignments {
    /// Creates an empty store with a fixed list of contigs
    pub fn new(contigs: Vec<String>) -> InMemoryAlignments {
        InMemoryAlignments {
            contigs,
            records: vec![]
        }
    }

    /// Adds a simple record by contig name
    /// # Arguments
    /// * `contig` - the contig name, must be one provided at creation
    /// * `start` - 0-based inclusive start
    /// * `end` - 0-based exclusive end
    /// * `read_name` - the read identifier
    /// # Errors
    /// * if the contig is unknown
    pub fn add_read(&mut self, contig: &str, start: u64, end: u64, read_name: &str) -> Result<(), AlignmentError> {
        let contig_id: u32 = self.contig_id(contig)
            .ok_or_else(|| AlignmentError::UnknownContig { contig: contig.to_string() })?;
        self.add_record(AlignmentRecord::new(contig_id, start, end, read_name.to_string()));
        Ok(())
    }

    /// Adds a fully specified record
    pub fn add_record(&mut self, record: AlignmentRecord) {
        let insert_index = self.records
            .partition_point(|r| (r.contig_id, r.start) <= (record.contig_id, record.start));
        self.records.insert(insert_index, record);
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }
}

impl AlignmentStore for InMemoryAlignments {
    fn contig_id(&self, contig: &str) -> Option<u32> {
        self.contigs.iter()
            .position(|c| c == contig)
            .map(|i| i as u32)
    }

    fn query_overlap(&mut self, contig_id: u32, start: u64, end: u64) -> Result<RecordIter<'_>, AlignmentError> {
        // zero-length alignments are treated as a single base, the same way htslib does
        let overlapping = self.records.iter()
            .filter(move |r| r.contig_id == contig_id && r.start < end && r.end.max(r.start + 1) > start)
            .map(|r| Ok::<AlignmentRecord, AlignmentError>(r.clone()));
        Ok(Box::new(overlapping))
    }
}

impl StoreOpener for InMemoryAlignments {
    type Store = InMemoryAlignments;

    fn open_store(&self) -> Result<InMemoryAlignments, AlignmentError> {
        Ok(self.clone())
    }
}
