//! Format sniffing: extension plus the first bytes of the file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::unified::IngestionFormat;

/// Local file header signature of a zip container (modern spreadsheets are zip archives).
pub const ZIP_SIGNATURE: &[u8] = b"PK";

/// Number of leading bytes inspected.
pub const MAGIC_LEN: usize = 4;

/// What the sniffer found out about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    /// Format implied by the extension, if the extension is a known one.
    pub extension: Option<IngestionFormat>,
    /// Whether the file starts with a zip signature.
    pub zip_signature: bool,
}

/// The first reader the chain will try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPlan {
    /// Delimited text.
    Csv,
    /// Modern spreadsheet engine.
    Xlsx,
    /// Legacy spreadsheet engine.
    Xls,
    /// Unknown extension: delimited text first, then the modern spreadsheet engine.
    CsvThenXlsx,
}

impl From<IngestionFormat> for ReadPlan {
    fn from(f: IngestionFormat) -> Self {
        match f {
            IngestionFormat::Csv => ReadPlan::Csv,
            IngestionFormat::Xlsx => ReadPlan::Xlsx,
            IngestionFormat::Xls => ReadPlan::Xls,
        }
    }
}

impl Sniffed {
    /// Selection policy, first match wins:
    ///
    /// 1. `.csv` without a zip signature → delimited text
    /// 2. `.xlsx`, or any zip signature → modern engine
    /// 3. `.xls` → legacy engine
    /// 4. anything else → delimited text, then modern engine
    pub fn plan(&self) -> ReadPlan {
        match (self.extension, self.zip_signature) {
            (Some(IngestionFormat::Csv), false) => ReadPlan::Csv,
            (Some(IngestionFormat::Xlsx), _) | (_, true) => ReadPlan::Xlsx,
            (Some(IngestionFormat::Xls), _) => ReadPlan::Xls,
            (None, false) => ReadPlan::CsvThenXlsx,
        }
    }
}

/// Inspect `path`. An unreadable file sniffs as "no signature"; the readers report the I/O error.
pub fn sniff(path: impl AsRef<Path>) -> Sniffed {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .and_then(IngestionFormat::from_extension);

    Sniffed {
        extension,
        zip_signature: read_magic(path).starts_with(ZIP_SIGNATURE),
    }
}

fn read_magic(path: &Path) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAGIC_LEN);
    match File::open(path) {
        Ok(f) => {
            let _ = f.take(MAGIC_LEN as u64).read_to_end(&mut buf);
            buf
        }
        Err(_) => buf,
    }
}
