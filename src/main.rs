use cistrans::alignment_store::{BamStoreConfig, IndexedBamStore, StoreOpener};
use cistrans::cli::{EXIT_FATAL, Settings, check_settings, get_raw_settings};
use cistrans::data_types::pair_table::PairTable;
use cistrans::data_types::variant_pair::VariantPair;
use cistrans::data_types::variants::Variant;
use cistrans::pair_gen::generate_pairs;
use cistrans::read_support::{ReadSupportError, count_all_pairs, count_all_pairs_parallel};
use cistrans::variant_loader::{VariantFileError, load_variants};
use cistrans::writers::pair_table_writer::{PairTableWriter, open_output};

use log::{LevelFilter, error, info};
use std::sync::Arc;
use std::time::Instant;

fn main() {
    // get the settings
    let settings: Settings = get_raw_settings();
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: Settings = check_settings(settings);
    let start_time: Instant = Instant::now();

    // load everything before any pairs are built
    let variants: Vec<Variant> = match load_variants(&cli_settings.variant_filename) {
        Ok(v) => v,
        Err(e) => {
            error!("Error during variant loading: {}", e);
            let exit_code = match e {
                VariantFileError::Io { .. } => exitcode::IOERR,
                VariantFileError::Malformed { .. } => exitcode::DATAERR
            };
            std::process::exit(exit_code);
        }
    };

    let pairs: Vec<VariantPair> = generate_pairs(&variants, cli_settings.max_distance, cli_settings.pair_strategy);
    info!("Generated {} candidate variant pairs from {} variants.", pairs.len(), variants.len());

    // the index is always opened here so a bad file fails before any work is queued
    let store_config = BamStoreConfig::new(
        &cli_settings.alignment_filename,
        cli_settings.reference_filename.as_deref(),
        cli_settings.io_threads
    );
    let mut alignment_store: IndexedBamStore = match store_config.open_store() {
        Ok(s) => s,
        Err(e) => {
            error!("Error while loading alignment index: {}", e);
            std::process::exit(EXIT_FATAL);
        }
    };

    let support_config = cli_settings.support_config();
    info!("Read counting starting...");
    let count_result = if cli_settings.threads <= 1 {
        count_all_pairs(&mut alignment_store, &pairs, &support_config)
    } else {
        // workers open their own handles
        std::mem::drop(alignment_store);
        count_all_pairs_parallel(Arc::new(store_config), pairs, &support_config, cli_settings.threads)
    };
    let pair_table: PairTable = match count_result {
        Ok(pt) => pt,
        Err(e) => {
            error!("Error while counting read support: {}", e);
            let exit_code = match e {
                ReadSupportError::WorkerOpen(_) => EXIT_FATAL,
                ReadSupportError::WorkerPanic => exitcode::SOFTWARE,
                ReadSupportError::Alignment { .. } => exitcode::IOERR
            };
            std::process::exit(exit_code);
        }
    };
    info!("All variant pairs counted, writing {} rows...", pair_table.len());

    // nothing is written until every pair is done
    let output = match open_output(cli_settings.output_filename.as_deref()) {
        Ok(o) => o,
        Err(e) => {
            error!("Error while opening output: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    };
    let mut table_writer = PairTableWriter::new(output);
    match table_writer.write_table(&pair_table) {
        Ok(()) => {},
        Err(e) => {
            error!("Error while writing pair table: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("All variant pairs finished successfully after {} seconds.", start_time.elapsed().as_secs_f64());
}
