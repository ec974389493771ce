
/// Contains the writer for the final pair table
pub mod pair_table_writer;
