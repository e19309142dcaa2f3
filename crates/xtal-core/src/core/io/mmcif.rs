use super::error::{IoError, ParseErrorKind};
use super::records::AtomRecord;
use super::traits::StructureFile;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::BufRead;

const ATOM_SITE_PREFIX: &str = "_atom_site.";

/// Reader for the `_atom_site` loop of PDBx/mmCIF files.
///
/// Author chain and residue numbering are preferred over the label scheme so
/// that chain identifiers match the ones users see in the PDB file of the same
/// entry.
pub struct MmcifFile;

#[derive(Debug, PartialEq)]
enum Token {
    Value(String),
    Null,
}

impl Token {
    fn as_str(&self) -> Option<&str> {
        match self {
            Token::Value(s) => Some(s),
            Token::Null => None,
        }
    }
}

fn classify(raw: &str, quoted: bool) -> Token {
    if !quoted && (raw == "." || raw == "?") {
        Token::Null
    } else {
        Token::Value(raw.to_string())
    }
}

fn tokenize(line: &str, line_num: usize) -> Result<Vec<Token>, IoError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }
        if c == '\'' || c == '"' {
            // A quote only closes when followed by whitespace or the end of line.
            let start = i + 1;
            let mut j = start;
            let mut closed = None;
            while j < chars.len() {
                if chars[j] == c && chars.get(j + 1).is_none_or(|n| n.is_whitespace()) {
                    closed = Some(j);
                    break;
                }
                j += 1;
            }
            let Some(end) = closed else {
                return Err(IoError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::UnterminatedQuote,
                });
            };
            let value: String = chars[start..end].iter().collect();
            tokens.push(classify(&value, true));
            i = end + 1;
        } else {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            let value: String = chars[start..i].iter().collect();
            tokens.push(classify(&value, false));
        }
    }

    Ok(tokens)
}

struct AtomSiteColumns {
    index: HashMap<String, usize>,
    width: usize,
}

impl AtomSiteColumns {
    fn new(tags: &[String]) -> Self {
        let index = tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| !tag.is_empty())
            .map(|(i, tag)| (tag.clone(), i))
            .collect();
        Self {
            index,
            width: tags.len(),
        }
    }

    /// First non-null value among the given column names.
    fn get<'a>(&self, row: &'a [Token], names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .filter_map(|name| self.index.get(*name))
            .find_map(|&i| row.get(i).and_then(Token::as_str))
    }

    fn required<'a>(&self, row: &'a [Token], names: &[&str], line: usize) -> Result<&'a str, IoError> {
        self.get(row, names).ok_or_else(|| IoError::Parse {
            line,
            kind: ParseErrorKind::MissingRequiredField {
                field: format!("{}{}", ATOM_SITE_PREFIX, names[0]),
            },
        })
    }

    fn float(&self, row: &[Token], name: &str, line: usize) -> Result<Option<f64>, IoError> {
        self.get(row, &[name])
            .map(|value| {
                value.parse().map_err(|_| IoError::Parse {
                    line,
                    kind: ParseErrorKind::InvalidFloat {
                        field: format!("{ATOM_SITE_PREFIX}{name}"),
                        value: value.to_string(),
                    },
                })
            })
            .transpose()
    }

    fn to_record(&self, row: &[Token], line: usize, ordinal: usize) -> Result<AtomRecord, IoError> {
        let coordinate = |name: &str| -> Result<f64, IoError> {
            self.float(row, name, line)?.ok_or_else(|| IoError::Parse {
                line,
                kind: ParseErrorKind::MissingRequiredField {
                    field: format!("{ATOM_SITE_PREFIX}{name}"),
                },
            })
        };

        let seq_str = self.required(row, &["auth_seq_id", "label_seq_id"], line)?;
        let residue_number = seq_str.parse().map_err(|_| IoError::Parse {
            line,
            kind: ParseErrorKind::InvalidInt {
                field: format!("{ATOM_SITE_PREFIX}auth_seq_id"),
                value: seq_str.to_string(),
            },
        })?;

        let model = match self.get(row, &["pdbx_PDB_model_num"]) {
            Some(value) => value.parse().map_err(|_| IoError::Parse {
                line,
                kind: ParseErrorKind::InvalidInt {
                    field: format!("{ATOM_SITE_PREFIX}pdbx_PDB_model_num"),
                    value: value.to_string(),
                },
            })?,
            None => 1,
        };

        Ok(AtomRecord {
            hetero: self.get(row, &["group_PDB"]) == Some("HETATM"),
            serial: self
                .get(row, &["id"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(ordinal),
            name: self
                .required(row, &["label_atom_id", "auth_atom_id"], line)?
                .to_string(),
            alt_loc: self.get(row, &["label_alt_id"]).and_then(|s| s.chars().next()),
            residue_name: self
                .required(row, &["label_comp_id", "auth_comp_id"], line)?
                .to_string(),
            chain_id: self
                .required(row, &["auth_asym_id", "label_asym_id"], line)?
                .to_string(),
            residue_number,
            insertion_code: self
                .get(row, &["pdbx_PDB_ins_code"])
                .and_then(|s| s.chars().next()),
            position: Point3::new(coordinate("Cartn_x")?, coordinate("Cartn_y")?, coordinate("Cartn_z")?),
            occupancy: self.float(row, "occupancy", line)?.unwrap_or(1.0),
            b_factor: self.float(row, "B_iso_or_equiv", line)?.unwrap_or(0.0),
            element: self.get(row, &["type_symbol"]).unwrap_or_default().to_string(),
            model,
        })
    }
}

enum LoopState {
    Outside,
    /// Just read `loop_`; collecting tag names.
    Header { tags: Vec<String>, atom_site: bool },
    Rows(RowBuffer),
    /// Values of a loop other than `_atom_site`.
    Skipping,
}

struct RowBuffer {
    columns: AtomSiteColumns,
    pending: Vec<Token>,
    row_line: usize,
}

impl RowBuffer {
    fn push(&mut self, tokens: Vec<Token>, line: usize, records: &mut Vec<AtomRecord>) -> Result<(), IoError> {
        if self.pending.is_empty() {
            self.row_line = line;
        }
        self.pending.extend(tokens);
        while self.pending.len() >= self.columns.width {
            let row: Vec<Token> = self.pending.drain(..self.columns.width).collect();
            let ordinal = records.len() + 1;
            records.push(self.columns.to_record(&row, self.row_line, ordinal)?);
            self.row_line = line;
        }
        Ok(())
    }

    fn finish(self) -> Result<(), IoError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(IoError::Parse {
                line: self.row_line,
                kind: ParseErrorKind::ColumnCountMismatch {
                    expected: self.columns.width,
                    found: self.pending.len(),
                },
            })
        }
    }
}

fn close_loop(state: &mut LoopState) -> Result<(), IoError> {
    match std::mem::replace(state, LoopState::Outside) {
        LoopState::Rows(buffer) => buffer.finish(),
        _ => Ok(()),
    }
}

impl StructureFile for MmcifFile {
    fn read_records(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, IoError> {
        let mut records = Vec::new();
        let mut state = LoopState::Outside;
        let mut text_field: Option<(usize, String)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            // Multi-line text fields are delimited by ';' in the first column.
            if let Some((_, buffer)) = text_field.as_mut() {
                if line.starts_with(';') {
                    let value = std::mem::take(buffer);
                    text_field = None;
                    if let LoopState::Rows(rows) = &mut state {
                        rows.push(vec![Token::Value(value)], line_num, &mut records)?;
                    }
                } else {
                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(&line);
                }
                continue;
            }
            if let Some(rest) = line.strip_prefix(';') {
                text_field = Some((line_num, rest.to_string()));
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') {
                if matches!(state, LoopState::Rows(_) | LoopState::Skipping) {
                    close_loop(&mut state)?;
                }
                continue;
            }
            if trimmed == "loop_" {
                close_loop(&mut state)?;
                state = LoopState::Header {
                    tags: Vec::new(),
                    atom_site: false,
                };
                continue;
            }
            if trimmed.starts_with('_') || trimmed.starts_with("data_") {
                let is_tag = trimmed.starts_with('_');
                if let (LoopState::Header { tags, atom_site }, true) = (&mut state, is_tag) {
                    let tag = trimmed.split_whitespace().next().unwrap_or_default();
                    match tag.strip_prefix(ATOM_SITE_PREFIX) {
                        Some(column) => {
                            *atom_site = true;
                            tags.push(column.to_string());
                        }
                        None => tags.push(String::new()),
                    }
                    continue;
                }
                close_loop(&mut state)?;
                continue;
            }

            if let LoopState::Header { tags, atom_site } = &state {
                let next = if *atom_site {
                    LoopState::Rows(RowBuffer {
                        columns: AtomSiteColumns::new(tags),
                        pending: Vec::new(),
                        row_line: line_num,
                    })
                } else {
                    LoopState::Skipping
                };
                state = next;
            }

            if let LoopState::Rows(rows) = &mut state {
                rows.push(tokenize(&line, line_num)?, line_num, &mut records)?;
            }
        }

        if let Some((line, _)) = text_field {
            return Err(IoError::Parse {
                line,
                kind: ParseErrorKind::UnterminatedQuote,
            });
        }
        close_loop(&mut state)?;

        Ok(records)
    }
}
