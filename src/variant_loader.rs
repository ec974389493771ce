use crate::data_types::variants::{Variant, VariantParseError};

use flate2::bufread::MultiGzDecoder;
use log::{debug, info, trace};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum VariantFileError {
    #[error("failed to read {filename:?}: {source}")]
    Io {
        filename: PathBuf,
        source: std::io::Error
    },
    #[error("malformed variant on line {line_number} of {filename:?}: {source}")]
    Malformed {
        filename: PathBuf,
        line_number: usize,
        source: VariantParseError
    }
}

/// Parses a single line of a variant file.
/// Blank lines and `#` comment lines return `Ok(None)`, everything else must be a valid variant.
/// # Arguments
/// * `line` - the raw line, trailing newline optional
/// # Errors
/// * if the line does not contain exactly a contig and a non-negative position
pub fn parse_variant_line(line: &str) -> Result<Option<Variant>, VariantParseError> {
    let trimmed: &str = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Reads all variants from any buffered source, preserving the order of the input.
/// The first malformed line aborts loading; nothing is skipped silently.
/// # Arguments
/// * `reader` - the buffered source of lines
/// * `filename` - the source name, only used for error messages
/// # Errors
/// * if a line cannot be read
/// * if a line is not a valid variant
pub fn read_variants<R: BufRead>(reader: R, filename: &Path) -> Result<Vec<Variant>, VariantFileError> {
    let mut variants: Vec<Variant> = vec![];
    // split on raw bytes so a bad encoding is reported against its line instead of as an I/O failure
    for (line_index, line_result) in reader.split(b'\n').enumerate() {
        let line_bytes: Vec<u8> = line_result.map_err(|e| VariantFileError::Io {
            filename: filename.to_path_buf(),
            source: e
        })?;
        let parse_result = std::str::from_utf8(&line_bytes)
            .map_err(|_| VariantParseError::NotUtf8)
            .and_then(parse_variant_line);

        match parse_result {
            Ok(Some(variant)) => {
                trace!("Loaded variant {}", variant);
                variants.push(variant);
            },
            Ok(None) => {},
            Err(e) => {
                return Err(VariantFileError::Malformed {
                    filename: filename.to_path_buf(),
                    line_number: line_index + 1,
                    source: e
                });
            }
        };
    }
    Ok(variants)
}

/// Loads a two-column variant file, gzip is allowed if the file ends with `.gz`.
/// # Arguments
/// * `filename` - the variant file to load
/// # Errors
/// * if the file cannot be opened or read
/// * if any line is malformed
pub fn load_variants(filename: &Path) -> Result<Vec<Variant>, VariantFileError> {
    info!("Loading variants from {:?}...", filename);
    let variant_file: std::fs::File = std::fs::File::open(filename).map_err(|e| VariantFileError::Io {
        filename: filename.to_path_buf(),
        source: e
    })?;
    let file_reader = BufReader::new(variant_file);
    let variants: Vec<Variant> = if filename.extension().unwrap_or_default() == "gz" {
        debug!("Detected gzip extension, loading variants with MultiGzDecoder...");
        let gz_decoder = MultiGzDecoder::new(file_reader);
        read_variants(BufReader::new(gz_decoder), filename)?
    } else {
        debug!("Loading variants as plain-text file...");
        read_variants(file_reader, filename)?
    };
    info!("Finished loading {} variants.", variants.len());
    Ok(variants)
}
