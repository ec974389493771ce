use clap::Parser;
use lazy_static::lazy_static;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::data_types::support_counts::CountingMode;
use crate::pair_gen::{DEFAULT_MAX_DISTANCE, PairStrategy};
use crate::read_support::SupportConfig;

/// Exit status for argument errors and for alignment files that cannot be opened with an index
pub const EXIT_FATAL: exitcode::ExitCode = 1;

lazy_static! {
    /// Stores the full version string we plan to use.
    /// # Examples
    /// * `0.1.0-6bb9635-dirty` - while on a dirty branch
    /// * `0.1.0-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));
}

#[derive(Clone, Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = "Rows are written as: contig1 pos1 contig2 pos2 same_read_count diff_read_count total_count")]
pub struct Settings {
    /// Input variant file, one "<contig> <position>" per line with 0-based positions (plain or .gz)
    #[clap(value_name = "VARIANTS")]
    #[clap(help_heading = Some("Input/Output"))]
    pub variant_filename: PathBuf,

    /// Input alignment file in BAM or CRAM format, must be indexed
    #[clap(value_name = "ALIGNMENTS")]
    #[clap(help_heading = Some("Input/Output"))]
    pub alignment_filename: PathBuf,

    /// Reference FASTA file, used for decoding CRAM input
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_filename: Option<PathBuf>,

    /// Output pair table (default: stdout)
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: Option<PathBuf>,

    /// Number of htslib decompression threads per alignment handle
    #[clap(long = "io-threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[clap(help_heading = Some("Input/Output"))]
    pub io_threads: usize,

    /// Number of threads to use for counting pairs
    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Variants must be strictly closer than this distance to form a pair
    #[clap(long = "max-distance")]
    #[clap(value_name = "BP")]
    #[clap(default_value_t = DEFAULT_MAX_DISTANCE)]
    #[clap(help_heading = Some("Pair Generation"))]
    pub max_distance: u64,

    /// Pair generation strategy: "all-pairs" or "windowed"; both produce identical pairs
    #[clap(long = "pair-strategy")]
    #[clap(value_name = "STRATEGY")]
    #[clap(default_value = "all-pairs")]
    #[clap(help_heading = Some("Pair Generation"))]
    pub pair_strategy: PairStrategy,

    /// Read counting mode: "asymmetric" only counts reads covering the first variant, "symmetric" counts reads covering either
    #[clap(long = "counting-mode")]
    #[clap(value_name = "MODE")]
    #[clap(default_value = "asymmetric")]
    #[clap(help_heading = Some("Read Counting"))]
    pub counting_mode: CountingMode,

    /// Sets a minimum MAPQ to include a read in the counts
    #[clap(long = "min-mapq")]
    #[clap(value_name = "MAPQ")]
    #[clap(default_value = "0")]
    #[clap(help_heading = Some("Read Counting"))]
    pub min_mapping_quality: u8,

    /// Excludes reads with any of these SAM flag bits set (e.g. 3328 for secondary, duplicate, supplementary)
    #[clap(long = "exclude-flags")]
    #[clap(value_name = "FLAGS")]
    #[clap(default_value = "0")]
    #[clap(help_heading = Some("Read Counting"))]
    pub exclude_flags: u16
}

impl Settings {
    /// Wrapper function to build the read counting configuration from our CLI settings
    pub fn support_config(&self) -> SupportConfig {
        SupportConfig {
            counting_mode: self.counting_mode,
            min_mapq: self.min_mapping_quality,
            exclude_flags: self.exclude_flags
        }
    }
}

/// Parses the command line.
/// Argument errors exit with `EXIT_FATAL`; help and version requests exit normally.
pub fn get_raw_settings() -> Settings {
    match Settings::try_parse() {
        Ok(settings) => settings,
        Err(e) => {
            if e.use_stderr() {
                // clap already includes the usage in the message
                let _ = e.print();
                std::process::exit(EXIT_FATAL);
            }
            e.exit()
        }
    }
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
/// * `exit_code` - the exit status if the file is missing
fn check_required_filename(filename: &Path, label: &str, exit_code: exitcode::ExitCode) {
    if !filename.exists() {
        error!("{} does not exist: \"{}\"", label, filename.display());
        std::process::exit(exit_code);
    } else {
        info!("{}: \"{}\"", label, filename.display());
    }
}

/// Do some additional checks here, we may increase these as we go.
/// Also can modify settings if needed since we're passing it around.
/// # Arguments
/// * `settings` - the raw settings, nothing has been checked other than what clap does for us.
pub fn check_settings(mut settings: Settings) -> Settings {
    //check for any of our required files
    check_required_filename(&settings.variant_filename, "Variant file", exitcode::NOINPUT);
    check_required_filename(&settings.alignment_filename, "Alignment file", EXIT_FATAL);
    if let Some(ref reference_filename) = settings.reference_filename {
        check_required_filename(reference_filename, "Reference file", exitcode::NOINPUT);
    }
    if let Some(ref output_filename) = settings.output_filename {
        info!("Output file: \"{}\"", output_filename.display());
    }

    // 0 doesn't make sense, so lets just error proof it up to 1
    if settings.threads == 0 {
        settings.threads = 1;
    }
    if settings.io_threads == 0 {
        settings.io_threads = 1;
    }

    // dump stuff to the logger
    info!("Pair generation:");
    info!("\tMaximum distance: <{} bp", settings.max_distance);
    if settings.max_distance == 0 {
        warn!("\tA maximum distance of 0 will not generate any pairs.");
    }
    info!("\tStrategy: {}", settings.pair_strategy);

    info!("Read counting:");
    info!("\tCounting mode: {}", settings.counting_mode);
    if settings.counting_mode == CountingMode::Symmetric {
        info!("\tdiff_read includes reads covering only the second variant");
    }
    info!("\tMinimum mapping quality: {}", settings.min_mapping_quality);
    if settings.exclude_flags == 0 {
        info!("\tExcluded flags: NONE");
    } else {
        info!("\tExcluded flags: {:#06x}", settings.exclude_flags);
    }

    info!("Processing threads: {}", settings.threads);
    info!("I/O threads: {}", settings.io_threads);

    //send the settings back
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["cistrans", "variants.txt", "reads.bam"]).unwrap();
        assert_eq!(settings.variant_filename, PathBuf::from("variants.txt"));
        assert_eq!(settings.alignment_filename, PathBuf::from("reads.bam"));
        assert_eq!(settings.max_distance, 500);
        assert_eq!(settings.pair_strategy, PairStrategy::AllPairs);
        assert_eq!(settings.threads, 1);
        assert_eq!(settings.reference_filename, None);
        assert_eq!(settings.output_filename, None);
        assert_eq!(settings.support_config(), SupportConfig::default());
    }

    #[test]
    fn test_options() {
        let settings = Settings::try_parse_from([
            "cistrans", "variants.txt", "reads.cram",
            "-r", "ref.fa", "-o", "out.tsv", "-t", "4", "-vv",
            "--max-distance", "1000", "--pair-strategy", "windowed",
            "--counting-mode", "symmetric", "--min-mapq", "5", "--exclude-flags", "3328"
        ]).unwrap();
        assert_eq!(settings.reference_filename, Some(PathBuf::from("ref.fa")));
        assert_eq!(settings.output_filename, Some(PathBuf::from("out.tsv")));
        assert_eq!(settings.threads, 4);
        assert_eq!(settings.verbosity, 2);
        assert_eq!(settings.max_distance, 1000);
        assert_eq!(settings.pair_strategy, PairStrategy::Windowed);
        assert_eq!(settings.support_config(), SupportConfig {
            counting_mode: CountingMode::Symmetric,
            min_mapq: 5,
            exclude_flags: 3328
        });
    }

    #[test]
    fn test_wrong_argument_count() {
        assert!(Settings::try_parse_from(["cistrans"]).is_err());
        assert!(Settings::try_parse_from(["cistrans", "variants.txt"]).is_err());
        assert!(Settings::try_parse_from(["cistrans", "variants.txt", "reads.bam", "extra"]).is_err());
        assert!(Settings::try_parse_from(["cistrans", "variants.txt", "reads.bam", "--counting-mode", "both"]).is_err());
    }
}
