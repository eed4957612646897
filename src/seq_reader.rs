/// Sequence reader module
/// Streams (id, sequence) records out of FASTA or FASTQ files, plain or gzipped.
/// The record format is decided once from the file name when the stream is opened.

use std::io::{self, BufRead, Lines, Write};
use std::mem;
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::utils::open_file;

/// Struct to hold a sequence record, quality scores are not kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn write_fasta<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_fasta(out, &self.id, self.sequence.as_bytes())
    }
}

pub fn write_fasta<W: Write>(out: &mut W, id: &str, sequence: &[u8]) -> io::Result<()> {
    out.write_all(b">")?;
    out.write_all(id.as_bytes())?;
    out.write_all(b"\n")?;
    out.write_all(sequence)?;
    out.write_all(b"\n")
}

/// First whitespace token of a header line with the marker characters stripped from both ends.
fn header_id(line: &str, marker: char) -> String {
    line.trim_matches(marker)
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

/// Record format of an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    Fasta,
    Fastq,
    Gzip(Box<InputFormat>),
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy();
        let (stem, gzipped) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (&*name, false),
        };

        let format = if stem.ends_with(".fasta") || stem.ends_with(".fa") {
            InputFormat::Fasta
        } else if stem.ends_with(".fastq") || stem.ends_with(".fq") {
            InputFormat::Fastq
        } else {
            return Err(Error::Format {
                path: path.to_path_buf(),
                expected: "fasta or fastq (.fa, .fasta, .fq, .fastq, optionally .gz)",
            });
        };

        Ok(if gzipped { InputFormat::Gzip(Box::new(format)) } else { format })
    }

    /// The format of the records once any compression is removed.
    pub fn record_format(&self) -> &InputFormat {
        match self {
            InputFormat::Gzip(inner) => inner.record_format(),
            format => format,
        }
    }

    pub fn is_gzipped(&self) -> bool {
        matches!(self, InputFormat::Gzip(_))
    }
}

/// How FASTQ lines are grouped into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FastqMode {
    /// Four-line cycle keyed on line position.
    #[default]
    Strict,
    /// Header sniffing on '@' with a growing buffer, kept for byte compatible output.
    Legacy,
}

pub struct FastaReader<R> {
    lines: Lines<R>,
    source_name: String,
    pending: Option<SequenceRecord>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            pending: None,
            done: false,
        }
    }

    fn open_record(line: &str) -> SequenceRecord {
        SequenceRecord {
            id: header_id(line, '>'),
            sequence: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::io(&self.source_name, e)));
                }
                None => {
                    self.done = true;
                    return self.pending.take().map(Ok);
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // the first non-blank line opens a record whether or not it carries '>'
            if self.pending.is_none() {
                self.pending = Some(Self::open_record(line));
                continue;
            }

            if line.starts_with('>') {
                let finished = self.pending.replace(Self::open_record(line));
                return finished.map(Ok);
            }

            if let Some(record) = self.pending.as_mut() {
                record.sequence.push_str(line);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FastqState {
    AwaitHeader,
    AwaitSeq,
    AwaitSep,
    AwaitQual,
}

pub struct FastqReader<R> {
    lines: Lines<R>,
    source_name: String,
    mode: FastqMode,
    line_no: usize,
    state: FastqState,
    id: String,
    sequence: String,
    // legacy mode only
    buffer: Vec<String>,
    done: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>, mode: FastqMode) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            mode,
            line_no: 0,
            state: FastqState::AwaitHeader,
            id: String::new(),
            sequence: String::new(),
            buffer: Vec::new(),
            done: false,
        }
    }

    fn step_strict(&mut self, line: &str) -> Option<Result<SequenceRecord>> {
        match self.state {
            FastqState::AwaitHeader => {
                if !line.starts_with('@') {
                    return Some(Err(self.malformed(format!(
                        "expected FASTQ header starting with '@', found {:?}",
                        line
                    ))));
                }
                self.id = header_id(line, '@');
                self.state = FastqState::AwaitSeq;
            }
            FastqState::AwaitSeq => {
                self.sequence = line.to_string();
                self.state = FastqState::AwaitSep;
            }
            FastqState::AwaitSep => {
                if !line.starts_with('+') {
                    return Some(Err(self.malformed(format!(
                        "expected FASTQ separator starting with '+', found {:?}",
                        line
                    ))));
                }
                self.state = FastqState::AwaitQual;
            }
            FastqState::AwaitQual => {
                self.state = FastqState::AwaitHeader;
                return Some(Ok(SequenceRecord {
                    id: mem::take(&mut self.id),
                    sequence: mem::take(&mut self.sequence),
                }));
            }
        }
        None
    }

    fn step_legacy(&mut self, line: &str) -> Option<SequenceRecord> {
        let is_header = line.starts_with('@');
        match self.buffer.len() {
            // past four lines the buffer never emits again, so it stops growing at five
            5.. => None,
            0 if is_header => {
                self.buffer.push(header_id(line, '@'));
                None
            }
            4 if is_header => {
                let record = Self::record_from_buffer(mem::take(&mut self.buffer));
                self.buffer.push(header_id(line, '@'));
                Some(record)
            }
            _ => {
                self.buffer.push(line.to_string());
                None
            }
        }
    }

    fn record_from_buffer(buffer: Vec<String>) -> SequenceRecord {
        let mut lines = buffer.into_iter();
        SequenceRecord {
            id: lines.next().unwrap_or_default(),
            sequence: lines.next().unwrap_or_default(),
        }
    }

    fn finish(&mut self) -> Option<SequenceRecord> {
        match self.mode {
            FastqMode::Strict => {
                if self.state != FastqState::AwaitHeader {
                    warn!(
                        "{}: dropping truncated FASTQ record {:?} at end of input",
                        self.source_name, self.id
                    );
                }
                None
            }
            FastqMode::Legacy => {
                if self.buffer.len() == 4 {
                    Some(Self::record_from_buffer(mem::take(&mut self.buffer)))
                } else {
                    None
                }
            }
        }
    }

    fn malformed(&mut self, reason: String) -> Error {
        self.done = true;
        Error::malformed(&self.source_name, self.line_no, reason)
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::io(&self.source_name, e)));
                }
                None => {
                    self.done = true;
                    return self.finish().map(Ok);
                }
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.mode {
                FastqMode::Strict => {
                    if let Some(result) = self.step_strict(line) {
                        return Some(result);
                    }
                }
                FastqMode::Legacy => {
                    if let Some(record) = self.step_legacy(line) {
                        return Some(Ok(record));
                    }
                }
            }
        }
    }
}

/// Streaming reader over either record format
pub enum SequenceReader {
    Fasta(FastaReader<Box<dyn BufRead>>),
    Fastq(FastqReader<Box<dyn BufRead>>),
}

impl SequenceReader {
    pub fn from_path(path: &Path, mode: FastqMode) -> Result<Self> {
        let format = InputFormat::from_path(path)?;
        info!("reading sequences from {}", path.display());
        let reader = open_file(path, format.is_gzipped())?;
        Ok(Self::new(reader, &format, mode, path.display().to_string()))
    }

    pub fn new<R: BufRead + 'static>(
        reader: R,
        format: &InputFormat,
        mode: FastqMode,
        source_name: impl Into<String>,
    ) -> Self {
        let reader: Box<dyn BufRead> = Box::new(reader);
        match format.record_format() {
            InputFormat::Fastq => {
                SequenceReader::Fastq(FastqReader::new(reader, source_name, mode))
            }
            _ => SequenceReader::Fasta(FastaReader::new(reader, source_name)),
        }
    }
}

impl Iterator for SequenceReader {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SequenceReader::Fasta(reader) => reader.next(),
            SequenceReader::Fastq(reader) => reader.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Cursor;

    fn fasta(text: &str) -> Vec<SequenceRecord> {
        FastaReader::new(Cursor::new(text.to_string()), "test.fa")
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn fastq(text: &str, mode: FastqMode) -> Vec<SequenceRecord> {
        FastqReader::new(Cursor::new(text.to_string()), "test.fq", mode)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn record(id: &str, sequence: &str) -> SequenceRecord {
        SequenceRecord {
            id: id.to_string(),
            sequence: sequence.to_string(),
        }
    }

    #[test]
    fn format_from_suffix() {
        assert_eq!(InputFormat::from_path(Path::new("a.fa")).unwrap(), InputFormat::Fasta);
        assert_eq!(InputFormat::from_path(Path::new("a.fasta")).unwrap(), InputFormat::Fasta);
        assert_eq!(InputFormat::from_path(Path::new("a.fq")).unwrap(), InputFormat::Fastq);
        let gz = InputFormat::from_path(Path::new("dir/a.fastq.gz")).unwrap();
        assert!(gz.is_gzipped());
        assert_eq!(gz.record_format(), &InputFormat::Fastq);
    }

    #[test]
    fn unknown_suffix_is_a_format_error() {
        for name in ["reads.txt", "reads.gz", "reads.FA", "reads.paf"] {
            match InputFormat::from_path(Path::new(name)) {
                Err(Error::Format { path, .. }) => assert_eq!(path, Path::new(name)),
                other => panic!("expected format error for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn fasta_joins_wrapped_lines_and_strips_descriptions() {
        let records = fasta(">r1 some description\nACGT\nTTGG\n\n>r2\nCC\n>r3\n");
        assert_eq!(records, vec![record("r1", "ACGTTTGG"), record("r2", "CC"), record("r3", "")]);
    }

    #[test]
    fn fasta_trims_lines_and_flushes_last_record() {
        let records = fasta("  >r1\t\n  AC  \nGT\r\n");
        assert_eq!(records, vec![record("r1", "ACGT")]);
    }

    #[test]
    fn fasta_first_line_opens_a_record_without_marker() {
        let records = fasta("orphan\nAC\n>r2\nGG\n");
        assert_eq!(records, vec![record("orphan", "AC"), record("r2", "GG")]);
    }

    #[test]
    fn empty_fasta_yields_nothing() {
        assert!(fasta("\n\n").is_empty());
    }

    #[test]
    fn strict_fastq_yields_one_record_per_four_lines() {
        let text = "@r1 desc\nACGT\n+\nIIII\n@r2\nGG\n+r2\n##\n";
        assert_eq!(
            fastq(text, FastqMode::Strict),
            vec![record("r1", "ACGT"), record("r2", "GG")]
        );
    }

    #[test]
    fn strict_fastq_is_not_fooled_by_at_sign_quality() {
        let text = "@r1\nACGT\n+\n@III\n@r2\nGGCC\n+\n@@@@\n";
        assert_eq!(
            fastq(text, FastqMode::Strict),
            vec![record("r1", "ACGT"), record("r2", "GGCC")]
        );
    }

    #[test]
    fn strict_fastq_drops_truncated_tail() {
        let text = "@r1\nACGT\n+\nIIII\n@r2\nGG\n";
        assert_eq!(fastq(text, FastqMode::Strict), vec![record("r1", "ACGT")]);
    }

    #[test]
    fn strict_fastq_rejects_missing_header() {
        let input = Cursor::new("r1\nACGT\n+\nIIII\n");
        let mut reader = FastqReader::new(input, "bad.fq", FastqMode::Strict);
        match reader.next() {
            Some(Err(Error::MalformedRecord { line, .. })) => assert_eq!(line, 1),
            other => panic!("expected malformed record, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn legacy_fastq_matches_strict_on_clean_input() {
        let text = "@r1\nACGT\n+\nIIII\n\n@r2\nGG\n+\n##\n";
        assert_eq!(fastq(text, FastqMode::Legacy), fastq(text, FastqMode::Strict));
    }

    #[test]
    fn legacy_fastq_keeps_at_sign_quality_quirk() {
        // a quality line starting with '@' lands in position 3 and is taken as data,
        // so the record still closes when the next header arrives
        let text = "@r1\nACGT\n+\n@III\n@r2\nGGCC\n+\nIIII\n";
        assert_eq!(
            fastq(text, FastqMode::Legacy),
            vec![record("r1", "ACGT"), record("r2", "GGCC")]
        );

        // an extra line grows the buffer past four and nothing after it is emitted
        let text = "@r1\nACGT\n+\nIIII\nEXTRA\n@r2\nGG\n+\nII\n";
        assert!(fastq(text, FastqMode::Legacy).is_empty());
    }

    #[test]
    fn reads_gzipped_fastq_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fq.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(b"@r1\nACGT\n+\nIIII\n").unwrap();
        encoder.finish().unwrap();

        let records = SequenceReader::from_path(&path, FastqMode::Strict)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records, vec![record("r1", "ACGT")]);
    }

    #[test]
    fn write_fasta_puts_sequence_on_one_line() {
        let mut out = Vec::new();
        record("r1", "ACGT").write_fasta(&mut out).unwrap();
        assert_eq!(out, b">r1\nACGT\n");
    }
}
