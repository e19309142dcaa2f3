use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Structure format '{extension}' of '{path}' is not supported. Use '.pdb', '.ent' or '.cif'.", path = path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    #[error("Unsupported non-standard amino acid found: {name} (chain {chain}, residue {number})")]
    NonStandardResidue {
        name: String,
        chain: String,
        number: isize,
    },

    #[error("Structure '{0}' contains no protein atoms after filtering")]
    EmptyStructure(String),
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("Invalid integer format in {field} (value: '{value}')")]
    InvalidInt { field: String, value: String },
    #[error("Invalid float format in {field} (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Required field {field} is empty")]
    MissingRequiredField { field: String },
    #[error("Atom site row has {found} values but the loop declares {expected} columns")]
    ColumnCountMismatch { expected: usize, found: usize },
    #[error("Unterminated quoted value")]
    UnterminatedQuote,
}
