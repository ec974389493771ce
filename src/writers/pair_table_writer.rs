use crate::data_types::pair_table::PairTable;

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// This is a wrapper for writing the final pair table
pub struct PairTableWriter<W: Write> {
    /// Handle for the CSV writer
    csv_writer: csv::Writer<W>
}

/// Contains all the data written to each row of the output table
#[derive(Serialize)]
struct PairRow<'a> {
    /// contig of the first variant
    contig1: &'a str,
    /// position of the first variant
    pos1: u64,
    /// contig of the second variant
    contig2: &'a str,
    /// position of the second variant
    pos2: u64,
    /// reads covering both variants
    same_read_count: u64,
    /// reads covering only one variant
    diff_read_count: u64,
    /// same + diff
    total_count: u64
}

impl<W: Write> PairTableWriter<W> {
    /// Wraps a writer; output is tab-separated with no header row and no quoting
    /// # Arguments
    /// * `writer` - the destination for all rows
    pub fn new(writer: W) -> PairTableWriter<W> {
        let csv_writer: csv::Writer<W> = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(writer);
        PairTableWriter {
            csv_writer
        }
    }

    /// Writes every row of the table in table order, then flushes.
    /// # Arguments
    /// * `pair_table` - the full set of results
    /// # Errors
    /// * if the csv_writer has any errors
    pub fn write_table(&mut self, pair_table: &PairTable) -> csv::Result<()> {
        for (pair, counts) in pair_table.iter() {
            let row: PairRow = PairRow {
                contig1: pair.first().contig(),
                pos1: pair.first().position(),
                contig2: pair.second().contig(),
                pos2: pair.second().position(),
                same_read_count: counts.same_read(),
                diff_read_count: counts.diff_read(),
                total_count: counts.total()
            };
            self.csv_writer.serialize(&row)?;
        }
        self.csv_writer.flush()?;
        Ok(())
    }
}

/// Opens the output destination, a file if one is given or stdout otherwise
/// # Arguments
/// * `filename` - optional output path
/// # Errors
/// * if the file cannot be created
pub fn open_output(filename: Option<&Path>) -> std::io::Result<Box<dyn Write>> {
    Ok(match filename {
        Some(f) => Box::new(BufWriter::new(File::create(f)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock()))
    })
}
