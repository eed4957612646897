/// Delimited text reader
/// Yields one field list per line, skipping blank lines and '#' comments.

use std::io::{BufRead, Lines};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::error::{Error, Result};
use crate::utils::{open_input, open_stdin};

pub const STDIN_NAME: &str = "<stdin>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabularSource {
    Stdin,
    File(PathBuf),
}

impl TabularSource {
    /// Resolve an alignment input: an empty path reads standard input, otherwise a `.paf` file.
    pub fn for_paf(path: &str) -> Result<Self> {
        if path.is_empty() {
            Ok(TabularSource::Stdin)
        } else if path.ends_with(".paf") {
            Ok(TabularSource::File(PathBuf::from(path)))
        } else {
            Err(Error::Format {
                path: PathBuf::from(path),
                expected: "paf (.paf, or no path to read standard input)",
            })
        }
    }

    pub fn name(&self) -> String {
        match self {
            TabularSource::Stdin => STDIN_NAME.to_string(),
            TabularSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// Any run of whitespace, leading and trailing whitespace ignored.
    #[default]
    Whitespace,
    Char(char),
}

impl Separator {
    fn split(&self, line: &str) -> Vec<String> {
        match self {
            Separator::Whitespace => line.split_whitespace().map(str::to_string).collect(),
            Separator::Char(c) => line.split(*c).map(str::to_string).collect(),
        }
    }
}

/// One data line of a delimited file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    pub source_name: String,
    pub line: usize,
    pub fields: Vec<String>,
}

impl TabularRow {
    pub fn field(&self, index: usize) -> Result<&str> {
        self.fields.get(index).map(String::as_str).ok_or_else(|| {
            self.malformed(format!(
                "expected at least {} columns, found {}",
                index + 1,
                self.fields.len()
            ))
        })
    }

    pub fn parse_field<T: FromStr>(&self, index: usize) -> Result<T> {
        let value = self.field(index)?;
        value.parse().map_err(|_| {
            self.malformed(format!("column {} has invalid value {:?}", index + 1, value))
        })
    }

    pub fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::malformed(&self.source_name, self.line, reason)
    }
}

pub struct TabularReader<R> {
    lines: Lines<R>,
    source_name: String,
    separator: Separator,
    line_no: usize,
    done: bool,
}

impl TabularReader<Box<dyn BufRead>> {
    pub fn open(source: &TabularSource, separator: Separator) -> Result<Self> {
        info!("reading message from {}", source.name());
        let reader = match source {
            TabularSource::Stdin => open_stdin(),
            TabularSource::File(path) => open_input(path)?,
        };
        Ok(Self::new(reader, source.name(), separator))
    }

    pub fn from_path(path: &Path, separator: Separator) -> Result<Self> {
        Self::open(&TabularSource::File(path.to_path_buf()), separator)
    }
}

impl<R: BufRead> TabularReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>, separator: Separator) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            separator,
            line_no: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for TabularReader<R> {
    type Item = Result<TabularRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(Error::io(&self.source_name, e)));
                }
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(Ok(TabularRow {
                source_name: self.source_name.clone(),
                line: self.line_no,
                fields: self.separator.split(line),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rows(text: &str, separator: Separator) -> Vec<TabularRow> {
        TabularReader::new(Cursor::new(text.to_string()), "test.paf", separator)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let rows = rows("# header\n\n  \na\tb\n#x\tb\nc\td\n", Separator::Char('\t'));
        let fields: Vec<_> = rows.iter().map(|r| r.fields.clone()).collect();
        assert_eq!(fields, vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(rows[0].line, 4);
        assert_eq!(rows[1].line, 6);
    }

    #[test]
    fn whitespace_separator_collapses_runs() {
        let rows = rows("  a \t b   c \n", Separator::Whitespace);
        assert_eq!(rows[0].fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn char_separator_keeps_empty_fields() {
        let rows = rows("a\t\tc\n", Separator::Char('\t'));
        assert_eq!(rows[0].fields, vec!["a", "", "c"]);
    }

    #[test]
    fn field_access_reports_short_rows() {
        let parsed = rows("a\t12\tx\n", Separator::Char('\t'));
        let row = &parsed[0];
        assert_eq!(row.field(0).unwrap(), "a");
        assert_eq!(row.parse_field::<u64>(1).unwrap(), 12);
        assert!(matches!(row.field(5), Err(Error::MalformedRecord { line: 1, .. })));
        assert!(matches!(row.parse_field::<u64>(2), Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn paf_source_resolution() {
        assert_eq!(TabularSource::for_paf("").unwrap(), TabularSource::Stdin);
        assert_eq!(
            TabularSource::for_paf("aln.paf").unwrap(),
            TabularSource::File(PathBuf::from("aln.paf"))
        );
        assert!(matches!(TabularSource::for_paf("aln.sam"), Err(Error::Format { .. })));
        assert!(matches!(TabularSource::for_paf("aln.paf.gz"), Err(Error::Format { .. })));
    }
}
