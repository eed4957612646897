/// General functions used across the project

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{Error, Result};

/// Bases kept on each side of an aligned interval when trimming a read.
pub const TRIM_PADDING: u64 = 5;

/// Open a file as a line source, gunzipping it when the name ends in `.gz`.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    open_file(path, is_gzipped(path))
}

pub fn open_file(path: &Path, gzipped: bool) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn open_stdin() -> Box<dyn BufRead> {
    Box::new(BufReader::new(io::stdin()))
}

pub fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".gz")
}

/// Order a coordinate pair so that start <= end.
pub fn normalize(start: u64, end: u64) -> (u64, u64) {
    if start <= end { (start, end) } else { (end, start) }
}

/// Window `[max(0, start - 5), min(len, end + 5)]` of a read, inverted windows collapse to empty.
pub fn trim_window(start: u64, end: u64, seq_len: usize) -> (usize, usize) {
    let (start, end) = normalize(start, end);
    let len = seq_len as u64;
    let from = start.saturating_sub(TRIM_PADDING).min(len);
    let to = end.saturating_add(TRIM_PADDING).min(len);
    (from as usize, to.max(from) as usize)
}

/// Render a count the way `{:,.2f}` does: comma grouped with two decimals.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push_str(".00");
    grouped
}
