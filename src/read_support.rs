use crate::alignment_store::{AlignmentError, AlignmentRecord, AlignmentStore, StoreOpener};
use crate::data_types::pair_table::PairTable;
use crate::data_types::support_counts::{CountingMode, SupportCounts};
use crate::data_types::variant_pair::VariantPair;

use log::{debug, info, trace, warn};
use rustc_hash::FxHashSet as HashSet;
use std::sync::{Arc, mpsc};
use std::time::Instant;
use threadpool::ThreadPool;

/// Progress is logged every time this many pairs finish
const UPDATE_SPEED: usize = 1000;
/// The number of chunks queued per worker thread
const CHUNKS_PER_THREAD: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum ReadSupportError {
    #[error("error while counting reads for {pair}: {source}")]
    Alignment {
        pair: VariantPair,
        source: AlignmentError
    },
    #[error("failed to open an alignment handle for a worker: {0}")]
    WorkerOpen(AlignmentError),
    #[error("panic detected in worker pool, check above for details")]
    WorkerPanic
}

/// Settings that control which records are considered and how they are counted
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SupportConfig {
    /// The counting contract to apply
    pub counting_mode: CountingMode,
    /// Records below this MAPQ are ignored
    pub min_mapq: u8,
    /// Records with any of these SAM flag bits are ignored
    pub exclude_flags: u16
}

impl SupportConfig {
    /// Returns true if an alignment record should be filtered out, aka ignored.
    /// The default configuration keeps everything.
    /// # Arguments
    /// * `record` - the record of interest
    pub fn filter_out_record(&self, record: &AlignmentRecord) -> bool {
        (record.flags() & self.exclude_flags) != 0 || record.mapq() < self.min_mapq
    }
}

/// The read names covering each variant of a pair
#[derive(Debug, Default)]
pub struct PairReadSets {
    /// Reads with a record covering the first variant
    pub covering_first: HashSet<String>,
    /// Reads with a record covering the second variant
    pub covering_second: HashSet<String>
}

/// Splits records into the reads covering each variant of a pair.
/// A read may contribute several records (mates, supplementary, secondary) but is only recorded once per set.
/// # Arguments
/// * `records` - the records from an overlap query over the pair region
/// * `pair` - the pair being counted
/// * `config` - the record filtering settings
/// # Errors
/// * if any record fails to load
pub fn collect_read_sets<I>(records: I, pair: &VariantPair, config: &SupportConfig) -> Result<PairReadSets, AlignmentError>
where
    I: Iterator<Item = Result<AlignmentRecord, AlignmentError>>
{
    let first_pos: u64 = pair.first().position();
    let second_pos: u64 = pair.second().position();

    let mut read_sets = PairReadSets::default();
    for record_result in records {
        let record: AlignmentRecord = record_result?;
        if config.filter_out_record(&record) {
            trace!("\tFiltered {} (mapq={}, flags={})", record.read_name(), record.mapq(), record.flags());
            continue;
        }

        let covers_first: bool = record.covers(first_pos);
        let covers_second: bool = record.covers(second_pos);
        trace!("\t{} {}..{} first={} second={}", record.read_name(), record.start(), record.end(), covers_first, covers_second);

        if covers_first {
            read_sets.covering_first.insert(record.read_name().to_string());
        }
        if covers_second {
            read_sets.covering_second.insert(record.read_name().to_string());
        }
    }
    Ok(read_sets)
}

/// Queries the store for a single pair and reduces the overlapping reads to support counts.
/// A contig that is missing from the store is not an error, the pair just has no support.
/// # Arguments
/// * `store` - the alignment store to query
/// * `pair` - the pair to count
/// * `config` - filtering and counting settings
/// # Errors
/// * if the query or any record fails
pub fn count_pair_support<S: AlignmentStore + ?Sized>(store: &mut S, pair: &VariantPair, config: &SupportConfig) -> Result<SupportCounts, AlignmentError> {
    let contig_id: u32 = match store.contig_id(pair.contig()) {
        Some(cid) => cid,
        None => {
            warn!("Contig {:?} not found in alignment file, reporting no support for {}", pair.contig(), pair);
            return Ok(SupportCounts::default());
        }
    };

    let (start, end) = pair.query_region();
    let records = store.query_overlap(contig_id, start, end)?;
    let read_sets: PairReadSets = collect_read_sets(records, pair, config)?;
    let counts = SupportCounts::from_read_sets(&read_sets.covering_first, &read_sets.covering_second, config.counting_mode);
    debug!("{} => same_read: {}, diff_read: {}, total: {}", pair, counts.same_read(), counts.diff_read(), counts.total());
    Ok(counts)
}

/// Counts a collection of pairs one at a time, returning results in input order
/// # Arguments
/// * `store` - the alignment store to query
/// * `pairs` - the pairs to count
/// * `config` - filtering and counting settings
fn count_pair_chunk<S: AlignmentStore + ?Sized>(store: &mut S, pairs: &[VariantPair], config: &SupportConfig) -> Result<Vec<(VariantPair, SupportCounts)>, ReadSupportError> {
    let mut results: Vec<(VariantPair, SupportCounts)> = Vec::with_capacity(pairs.len());
    for pair in pairs.iter() {
        let counts = count_pair_support(&mut *store, pair, config)
            .map_err(|e| ReadSupportError::Alignment {
                pair: pair.clone(),
                source: e
            })?;
        results.push((pair.clone(), counts));
    }
    Ok(results)
}

/// Logs a throughput update
fn log_progress(pairs_received: usize, total_pairs: usize, start_time: &Instant) {
    let time_so_far: f64 = start_time.elapsed().as_secs_f64();
    let pairs_per_sec: f64 = pairs_received as f64 / time_so_far;
    info!("Counted {} / {} variant pairs: {:.4} pairs/sec", pairs_received, total_pairs, pairs_per_sec);
}

/// Counts every pair sequentially using a single store handle.
/// # Arguments
/// * `store` - the alignment store to query
/// * `pairs` - the candidate pairs, in any order and possibly with duplicates
/// * `config` - filtering and counting settings
/// # Errors
/// * if any alignment query fails
pub fn count_all_pairs<S: AlignmentStore + ?Sized>(store: &mut S, pairs: &[VariantPair], config: &SupportConfig) -> Result<PairTable, ReadSupportError> {
    let start_time: Instant = Instant::now();
    let mut pair_table: PairTable = PairTable::new();
    for (i, pair_chunk) in pairs.chunks(UPDATE_SPEED).enumerate() {
        pair_table.extend(count_pair_chunk(&mut *store, pair_chunk, config)?);
        log_progress(pairs.len().min((i + 1) * UPDATE_SPEED), pairs.len(), &start_time);
    }
    Ok(pair_table)
}

/// Counts every pair on a pool of worker threads.
/// Each worker opens its own store handle, and results are merged into an ordered table so completion order never matters.
/// # Arguments
/// * `opener` - hands out one store handle per job
/// * `pairs` - the candidate pairs, in any order and possibly with duplicates
/// * `config` - filtering and counting settings
/// * `threads` - the number of worker threads
/// # Errors
/// * if a worker cannot open a store handle
/// * if any alignment query fails
/// * if a worker panics
pub fn count_all_pairs_parallel<O>(opener: Arc<O>, pairs: Vec<VariantPair>, config: &SupportConfig, threads: usize) -> Result<PairTable, ReadSupportError>
where
    O: StoreOpener + 'static
{
    let start_time: Instant = Instant::now();
    let total_pairs: usize = pairs.len();
    let threads: usize = threads.max(1);
    let chunk_size: usize = total_pairs.div_ceil(threads * CHUNKS_PER_THREAD).max(1);
    info!("Starting job pool with {} threads...", threads);

    let pool = ThreadPool::new(threads);
    let (tx, rx) = mpsc::channel();
    let mut jobs_queued: usize = 0;
    for pair_chunk in pairs.chunks(chunk_size) {
        let tx = tx.clone();
        let opener = opener.clone();
        let config: SupportConfig = *config;
        let pair_chunk: Vec<VariantPair> = pair_chunk.to_vec();
        pool.execute(move || {
            // errors are sent back so the main thread decides how to exit
            let chunk_result = match opener.open_store() {
                Ok(mut store) => count_pair_chunk(&mut store, &pair_chunk, &config),
                Err(e) => Err(ReadSupportError::WorkerOpen(e))
            };
            tx.send(chunk_result).expect("channel will be there waiting for the pool");
        });
        jobs_queued += 1;
    }
    // only the workers hold senders now, so a worker panic surfaces as a closed channel
    drop(tx);

    let mut pair_table: PairTable = PairTable::new();
    let mut jobs_received: usize = 0;
    let mut pairs_received: usize = 0;
    while jobs_received < jobs_queued {
        if pool.panic_count() > 0 {
            return Err(ReadSupportError::WorkerPanic);
        }
        let chunk_results = match rx.recv() {
            Ok(cr) => cr?,
            Err(_) => return Err(ReadSupportError::WorkerPanic)
        };
        jobs_received += 1;
        pairs_received += chunk_results.len();
        pair_table.extend(chunk_results);
        log_progress(pairs_received, total_pairs, &start_time);
    }
    Ok(pair_table)
}
