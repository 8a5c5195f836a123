// GeoInsert - core/filter.rs
//
// INSERT-only filtering of PGDump output.
//
// The dump is processed as raw bytes, one line at a time, so the client
// encoding chosen for ogr2ogr never has to be decoded here. Kept lines are
// written unchanged, including their original line terminator.

use crate::core::model::FilterStats;
use crate::util::constants;
use crate::util::error::ConvertError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Returns true if `line` is a row insertion statement.
///
/// Leading whitespace is ignored and the `INSERT INTO` keyword is compared
/// case-insensitively. Whitespace covers the ASCII separators (vertical tab,
/// form feed and the 0x1C-0x1F information separators included) and any
/// UTF-8 encoded Unicode whitespace such as NEL or NO-BREAK SPACE.
pub fn is_insert_statement(line: &[u8]) -> bool {
    let keyword = constants::INSERT_KEYWORD.as_bytes();
    let start = leading_space_len(line);
    line[start..]
        .get(..keyword.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

fn leading_space_len(line: &[u8]) -> usize {
    let mut pos = 0;
    while let Some(&b) = line.get(pos) {
        if matches!(
            b,
            b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r' | 0x1c..=0x1f
        ) {
            pos += 1;
            continue;
        }
        if b.is_ascii() {
            break;
        }
        match decode_utf8_char(&line[pos..]) {
            Some(c) if c.is_whitespace() => pos += c.len_utf8(),
            _ => break,
        }
    }
    pos
}

/// First character of `bytes` when it starts with a valid multi-byte sequence.
fn decode_utf8_char(bytes: &[u8]) -> Option<char> {
    let width = match bytes.first()? {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return None,
    };
    std::str::from_utf8(bytes.get(..width)?)
        .ok()?
        .chars()
        .next()
}

/// Copy insert statements from `reader` to `writer`, dropping everything else.
pub fn filter_inserts<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
) -> io::Result<FilterStats> {
    let mut stats = FilterStats::default();
    let mut line: Vec<u8> = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if is_insert_statement(&line) {
            writer.write_all(&line)?;
            stats.kept += 1;
        } else {
            stats.dropped += 1;
        }
    }

    writer.flush()?;
    Ok(stats)
}

/// Filter the dump at `src` into a new file at `dst` (truncating it).
pub fn filter_file(src: &Path, dst: &Path) -> Result<FilterStats, ConvertError> {
    let input = match File::open(src) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConvertError::MissingDump {
                path: src.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(ConvertError::Io {
                path: src.to_path_buf(),
                source: e,
            });
        }
    };

    let output = File::create(dst).map_err(|e| ConvertError::Io {
        path: dst.to_path_buf(),
        source: e,
    })?;

    // Read and write failures are indistinguishable from the stream side;
    // attribute them to the output, which is the file being produced.
    let stats = filter_inserts(BufReader::new(input), BufWriter::new(output)).map_err(|e| {
        ConvertError::Io {
            path: dst.to_path_buf(),
            source: e,
        }
    })?;

    tracing::debug!(
        src = %src.display(),
        dst = %dst.display(),
        kept = stats.kept,
        dropped = stats.dropped,
        "Filtered SQL dump"
    );

    Ok(stats)
}
