// not every test binary uses every helper
#![allow(dead_code)]

use rust_htslib::bam;
use rust_htslib::bam::Read;
use std::path::{Path, PathBuf};

/// Per-process path in the temp directory so parallel test binaries never collide
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cistrans_it_{}_{}", std::process::id(), name))
}

/// Location htslib uses for a default .bai index
pub fn bai_path(bam_fn: &Path) -> PathBuf {
    let mut index_fn = bam_fn.as_os_str().to_os_string();
    index_fn.push(".bai");
    PathBuf::from(index_fn)
}

/// Converts SAM text into a BAM in the temp directory, optionally with a .bai index.
/// Records must already be in coordinate order.
/// # Arguments
/// * `name` - unique stem for the files of one test
/// * `sam_records` - SAM body lines over chr1 and chr2, both 10 kbp
/// * `build_index` - if true, writes `<bam>.bai` next to the BAM
pub fn write_test_bam(name: &str, sam_records: &[&str], build_index: bool) -> PathBuf {
    let sam_fn: PathBuf = temp_path(&format!("{name}.sam"));
    let bam_fn: PathBuf = temp_path(&format!("{name}.bam"));

    let mut sam_text: String = "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:10000\n@SQ\tSN:chr2\tLN:10000\n".to_string();
    for record in sam_records.iter() {
        sam_text.push_str(record);
        sam_text.push('\n');
    }
    std::fs::write(&sam_fn, sam_text).unwrap();

    {
        let mut sam_reader = bam::Reader::from_path(&sam_fn).unwrap();
        let header = bam::Header::from_template(sam_reader.header());
        let mut bam_writer = bam::Writer::from_path(&bam_fn, &header, bam::Format::Bam).unwrap();
        for record in sam_reader.records() {
            bam_writer.write(&record.unwrap()).unwrap();
        }
    }
    std::fs::remove_file(&sam_fn).unwrap();

    if build_index {
        let index_fn: PathBuf = bai_path(&bam_fn);
        bam::index::build(&bam_fn, Some(&index_fn), bam::index::Type::Bai, 1).unwrap();
    }
    bam_fn
}

/// Removes a BAM written by `write_test_bam` along with its index, if one was built
pub fn remove_test_bam(bam_fn: &Path) {
    let index_fn: PathBuf = bai_path(bam_fn);
    if index_fn.exists() {
        std::fs::remove_file(index_fn).unwrap();
    }
    std::fs::remove_file(bam_fn).unwrap();
}
