//! Marker-line framing and extraction of envelope blocks.

use std::io::{self, BufRead};

const DUMP_BEGIN: &str = "-----BEGIN AARLO DUMP-----";
const DUMP_END: &str = "-----END AARLO DUMP-----";
const DATA_BEGIN: &str = "-----BEGIN AARLO DATA-----";
const DATA_END: &str = "-----END AARLO DATA-----";

/// Which marker pair frames a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armor {
    /// Encrypted device dumps.
    Dump,
    /// Ad-hoc text from the `encrypt` command.
    Data,
}

impl Armor {
    pub fn begin(self) -> &'static str {
        match self {
            Armor::Dump => DUMP_BEGIN,
            Armor::Data => DATA_BEGIN,
        }
    }

    pub fn end(self) -> &'static str {
        match self {
            Armor::Dump => DUMP_END,
            Armor::Data => DATA_END,
        }
    }

    fn opened_by(line: &str) -> Option<Armor> {
        [Armor::Dump, Armor::Data]
            .into_iter()
            .find(|armor| line.starts_with(armor.begin()))
    }
}

/// Frame `body` between the marker lines of `armor`.
pub fn wrap(armor: Armor, body: &str) -> String {
    format!("{}\n{}\n{}", armor.begin(), body.trim_end(), armor.end())
}

/// Text found between one BEGIN/END pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub armor: Armor,
    pub body: String,
}

/// Lazily pulls envelope blocks out of arbitrary surrounding text.
///
/// Lines are consumed one at a time; only the body of the block currently
/// being collected is buffered. Everything outside a block, including blocks
/// with foreign markers and lines that are not UTF-8, is discarded. A BEGIN
/// line seen while already inside a block restarts collection, and a block
/// still open at end of input is dropped.
pub struct Scanner<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for Scanner<R> {
    type Item = io::Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut open: Option<Block> = None;
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }

            let line = match std::str::from_utf8(strip_line_ending(&self.line)) {
                Ok(line) => line,
                Err(_) if open.is_none() => continue,
                Err(e) => return Some(Err(io::Error::new(io::ErrorKind::InvalidData, e))),
            };

            if let Some(armor) = Armor::opened_by(line) {
                open = Some(Block {
                    armor,
                    body: String::new(),
                });
                continue;
            }

            let closed = match open.as_mut() {
                None => false,
                Some(block) if line.starts_with(block.armor.end()) => true,
                Some(block) => {
                    block.body.push_str(line);
                    block.body.push('\n');
                    false
                }
            };
            if closed {
                return open.take().map(Ok);
            }
        }
    }
}

fn strip_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
