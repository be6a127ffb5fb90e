//! Encoding resolution.
//!
//! Candidates are tried strictly in priority order and the first one that
//! both decodes cleanly and parses into a rectangular table wins. There is no
//! scoring between successful candidates, so the outcome for a given byte
//! sequence never changes between runs. A byte-order mark overrides the
//! configured order: the encoding it names is tried first.

use std::path::Path;

use encoding_rs::Encoding;
use itertools::Itertools;
use log::debug;

use crate::{
    error::IngestError,
    io_utils::{self, RawTable},
};

#[derive(Debug, Clone)]
pub struct FailedAttempt {
    pub encoding: &'static Encoding,
    pub reason: String,
}

/// Progress of one resolution run.
#[derive(Debug)]
pub enum DecodeState {
    Pending {
        order: Vec<&'static Encoding>,
        next: usize,
        attempts: Vec<FailedAttempt>,
    },
    Decoded {
        encoding: &'static Encoding,
        table: RawTable,
        attempts: Vec<FailedAttempt>,
    },
    Exhausted {
        attempts: Vec<FailedAttempt>,
    },
}

impl DecodeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecodeState::Pending { .. })
    }
}

/// Output of a successful resolution.
#[derive(Debug)]
pub struct DecodedTable {
    pub encoding: &'static Encoding,
    pub table: RawTable,
    /// Candidates that were tried and rejected before `encoding`.
    pub rejected: Vec<FailedAttempt>,
}

#[derive(Debug, Clone)]
pub struct EncodingResolver {
    candidates: Vec<&'static Encoding>,
    delimiter: u8,
}

impl EncodingResolver {
    pub fn new(candidates: Vec<&'static Encoding>) -> Self {
        Self {
            candidates,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
        }
    }

    /// Candidate order for `bytes`: the BOM's encoding, if any, then the
    /// configured candidates without duplicates.
    pub fn candidates_for(&self, bytes: &[u8]) -> Vec<&'static Encoding> {
        let sniffed = Encoding::for_bom(bytes).map(|(encoding, _)| encoding);
        if let Some(encoding) = sniffed {
            debug!("Byte-order mark names {}", encoding.name());
        }
        let mut order: Vec<&'static Encoding> = Vec::with_capacity(self.candidates.len() + 1);
        for encoding in sniffed.into_iter().chain(self.candidates.iter().copied()) {
            if !order.contains(&encoding) {
                order.push(encoding);
            }
        }
        order
    }

    pub fn start(&self, bytes: &[u8]) -> DecodeState {
        DecodeState::Pending {
            order: self.candidates_for(bytes),
            next: 0,
            attempts: Vec::new(),
        }
    }

    /// Advances the machine by one candidate. Terminal states are returned unchanged.
    pub fn step(&self, bytes: &[u8], state: DecodeState) -> DecodeState {
        let (order, next, mut attempts) = match state {
            DecodeState::Pending {
                order,
                next,
                attempts,
            } => (order, next, attempts),
            terminal => return terminal,
        };
        let Some(&encoding) = order.get(next) else {
            return DecodeState::Exhausted { attempts };
        };
        let outcome = io_utils::decode_bytes(bytes, encoding)
            .and_then(|text| io_utils::parse_table(&text, self.delimiter));
        match outcome {
            Ok(table) => DecodeState::Decoded {
                encoding,
                table,
                attempts,
            },
            Err(err) => {
                debug!("Candidate {} rejected: {err:#}", encoding.name());
                attempts.push(FailedAttempt {
                    encoding,
                    reason: format!("{err:#}"),
                });
                DecodeState::Pending {
                    order,
                    next: next + 1,
                    attempts,
                }
            }
        }
    }

    pub fn resolve(&self, path: &Path, bytes: &[u8]) -> Result<DecodedTable, IngestError> {
        let mut state = self.start(bytes);
        loop {
            state = match self.step(bytes, state) {
                DecodeState::Decoded {
                    encoding,
                    table,
                    attempts,
                } => {
                    return Ok(DecodedTable {
                        encoding,
                        table,
                        rejected: attempts,
                    });
                }
                DecodeState::Exhausted { attempts } => {
                    return Err(IngestError::DecodeFailure {
                        path: path.to_path_buf(),
                        attempted: attempts
                            .iter()
                            .map(|a| format!("{}: {}", a.encoding.name(), a.reason))
                            .join("; "),
                    });
                }
                pending => pending,
            };
        }
    }
}
