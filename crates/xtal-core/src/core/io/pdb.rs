use super::error::{IoError, ParseErrorKind};
use super::records::AtomRecord;
use super::traits::StructureFile;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::collections::HashSet;
use std::io::{BufRead, Write};

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_float(line: &str, start: usize, end: usize, field: &str, line_num: usize) -> Result<f64, IoError> {
    let value = slice_and_trim(line, start, end);
    if value.is_empty() {
        return Err(IoError::Parse {
            line: line_num,
            kind: ParseErrorKind::MissingRequiredField {
                field: field.to_string(),
            },
        });
    }
    value.parse().map_err(|_| IoError::Parse {
        line: line_num,
        kind: ParseErrorKind::InvalidFloat {
            field: field.to_string(),
            value: value.to_string(),
        },
    })
}

fn parse_optional_float(
    line: &str,
    start: usize,
    end: usize,
    field: &str,
    line_num: usize,
    default: f64,
) -> Result<f64, IoError> {
    if slice_and_trim(line, start, end).is_empty() {
        Ok(default)
    } else {
        parse_float(line, start, end, field, line_num)
    }
}

/// Reader and writer for the fixed-column PDB format.
pub struct PdbFile;

impl StructureFile for PdbFile {
    fn read_records(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, IoError> {
        let mut records = Vec::new();
        let mut model = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "MODEL" => {
                    model += 1;
                }
                "ATOM" | "HETATM" => {
                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(IoError::Parse {
                            line: line_num,
                            kind: ParseErrorKind::MissingRequiredField {
                                field: "atom name (columns 13-16)".into(),
                            },
                        });
                    }

                    let res_seq_str = slice_and_trim(&line, 22, 26);
                    let residue_number: isize =
                        res_seq_str.parse().map_err(|_| IoError::Parse {
                            line: line_num,
                            kind: ParseErrorKind::InvalidInt {
                                field: "residue number (columns 23-26)".into(),
                                value: res_seq_str.into(),
                            },
                        })?;

                    let x = parse_float(&line, 30, 38, "x (columns 31-38)", line_num)?;
                    let y = parse_float(&line, 38, 46, "y (columns 39-46)", line_num)?;
                    let z = parse_float(&line, 46, 54, "z (columns 47-54)", line_num)?;
                    let occupancy =
                        parse_optional_float(&line, 54, 60, "occupancy (columns 55-60)", line_num, 1.0)?;
                    let b_factor =
                        parse_optional_float(&line, 60, 66, "B-factor (columns 61-66)", line_num, 0.0)?;

                    // Serial numbers overflow the column in very large entries; they
                    // carry no meaning beyond ordering, so fall back to the row index.
                    let serial = slice_and_trim(&line, 6, 11)
                        .parse()
                        .unwrap_or(records.len() + 1);

                    records.push(AtomRecord {
                        hetero: record_type == "HETATM",
                        serial,
                        name: name.to_string(),
                        alt_loc: column_char(&line, 16),
                        residue_name: slice_and_trim(&line, 17, 20).to_string(),
                        chain_id: line.get(21..22).unwrap_or(" ").to_string(),
                        residue_number,
                        insertion_code: column_char(&line, 26),
                        position: Point3::new(x, y, z),
                        occupancy,
                        b_factor,
                        element: slice_and_trim(&line, 76, 78).to_string(),
                        model,
                    });
                }
                _ => {}
            }
        }

        Ok(records)
    }
}

fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() >= 4 || element.len() == 2 {
        format!("{:<4}", name)
    } else {
        format!(" {:<3}", name)
    }
}

impl PdbFile {
    /// Writes the structure as 80-column ATOM records, optionally restricted to
    /// a set of chains. Atoms are renumbered from 1.
    pub fn write_to(
        structure: &Structure,
        chains: Option<&HashSet<String>>,
        writer: &mut impl Write,
    ) -> Result<(), IoError> {
        let mut serial = 0usize;

        for (_, chain) in structure.chains_iter() {
            if chains.is_some_and(|selected| !selected.contains(&chain.id)) {
                continue;
            }
            let chain_char = chain.id.chars().next().unwrap_or(' ');

            for &residue_id in chain.residues() {
                let Some(residue) = structure.residue(residue_id) else {
                    continue;
                };
                for &atom_id in residue.atoms() {
                    let Some(atom) = structure.atom(atom_id) else {
                        continue;
                    };
                    serial += 1;
                    writeln!(
                        writer,
                        "ATOM  {:>5} {} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}  ",
                        serial % 100_000,
                        format_atom_name(&atom.name, &atom.element),
                        residue.name,
                        chain_char,
                        residue.number,
                        residue.insertion_code.unwrap_or(' '),
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        atom.b_factor,
                        atom.element,
                    )?;
                }
            }
            writeln!(writer, "TER")?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
