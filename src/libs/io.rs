use anyhow::Context;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

/// Open `input` for buffered reading. `stdin` reads standard input and
/// files ending in `.gz` are decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = ogr::reader("tests/ogr/scenario_a.tsv").unwrap();
/// assert_eq!(reader.lines().count(), 4);
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Open `output` for buffered writing; `stdout` writes to the screen.
///
/// Commands call this only after the whole result is in memory, so a failed
/// stage never leaves a truncated file behind.
pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("could not create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Slurp a whole input into a string.
pub fn read_to_string(input: &str) -> anyhow::Result<String> {
    let mut reader = reader(input)?;
    let mut s = String::new();
    reader
        .read_to_string(&mut s)
        .with_context(|| format!("read error in {}", input))?;
    Ok(s)
}
