//! # Carregador das Tabelas TSV
//!
//! Lê os três arquivos de referência (formato INE, separados por tabulação):
//!
//! | Arquivo                  | Linha                                   |
//! |--------------------------|-----------------------------------------|
//! | `names_ine.tsv`          | `nome \t frequência \t prob_masculino`  |
//! | `name_surname_ratio.tsv` | `token \t prob_sobrenome`               |
//! | `surnames_ine.tsv`       | `sobrenome \t ...` (só o 1º campo)      |
//!
//! Linhas começando com `#` são comentários e linhas em branco são ignoradas.
//!
//! Qualquer linha malformada rejeita a tabela inteira.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::reference::ReferenceData;

pub const GIVEN_NAMES_FILE: &str = "names_ine.tsv";
pub const AMBIGUITY_FILE: &str = "name_surname_ratio.tsv";
pub const SURNAMES_FILE: &str = "surnames_ine.tsv";

/// Qual das três tabelas estava sendo lida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    GivenNames,
    Ambiguity,
    Surnames,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::GivenNames => "given-names",
            TableKind::Ambiguity => "ambiguity",
            TableKind::Surnames => "surnames",
        }
    }

    /// Número exato de campos exigido (`None` = pelo menos um).
    fn expected_fields(&self) -> Option<usize> {
        match self {
            TableKind::GivenNames => Some(3),
            TableKind::Ambiguity => Some(2),
            TableKind::Surnames => None,
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {table} table: {source}")]
    Read {
        table: TableKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{table} table, line {line}: {reason}")]
    Malformed {
        table: TableKind,
        line: usize,
        reason: String,
    },
}

impl ReferenceData {
    /// Carrega as três tabelas de um diretório.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let open = |file: &str| {
            let path = dir.join(file);
            File::open(&path).map_err(|source| LoadError::Open { path, source })
        };

        let data = Self::from_readers(
            open(GIVEN_NAMES_FILE)?,
            open(AMBIGUITY_FILE)?,
            open(SURNAMES_FILE)?,
        )?;

        info!(dir = %dir.display(), "Dados de referência carregados");
        Ok(data)
    }

    /// Carrega as três tabelas a partir de leitores arbitrários.
    pub fn from_readers(
        given_names: impl Read,
        ambiguity: impl Read,
        surnames: impl Read,
    ) -> Result<Self, LoadError> {
        let mut builder = ReferenceData::builder();

        for_each_row(given_names, TableKind::GivenNames, |line, fields| {
            parse_frequency(fields[1], TableKind::GivenNames, line)?;
            let prob = parse_probability(fields[2], TableKind::GivenNames, line)?;
            builder.add_given_name(fields[0], prob);
            Ok(())
        })?;

        for_each_row(ambiguity, TableKind::Ambiguity, |line, fields| {
            let ratio = parse_probability(fields[1], TableKind::Ambiguity, line)?;
            builder.add_ambiguous(fields[0], ratio);
            Ok(())
        })?;

        for_each_row(surnames, TableKind::Surnames, |_, fields| {
            builder.add_surname(fields[0]);
            Ok(())
        })?;

        let data = builder.build();
        info!(
            given_names = data.given_names().len(),
            ambiguous = data.ambiguity().len(),
            surnames = data.surnames().len(),
            "Tabelas de referência prontas"
        );
        Ok(data)
    }

    /// Tabelas de exemplo embutidas no binário (ver `data/`).
    pub fn bundled() -> Result<Self, LoadError> {
        Self::from_readers(
            crate::sample::GIVEN_NAMES_TSV.as_bytes(),
            crate::sample::AMBIGUITY_TSV.as_bytes(),
            crate::sample::SURNAMES_TSV.as_bytes(),
        )
    }
}

/// Percorre as linhas úteis de uma tabela, já separadas em campos.
///
/// `line` é 1-based e conta comentários e linhas em branco.
fn for_each_row<R, F>(reader: R, table: TableKind, mut row: F) -> Result<(), LoadError>
where
    R: Read,
    F: FnMut(usize, &[&str]) -> Result<(), LoadError>,
{
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| LoadError::Read { table, source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        match table.expected_fields() {
            Some(expected) if fields.len() != expected => {
                return Err(LoadError::Malformed {
                    table,
                    line: line_no,
                    reason: format!("expected {expected} fields, found {}", fields.len()),
                });
            }
            _ => {}
        }
        if fields[0].is_empty() {
            return Err(LoadError::Malformed {
                table,
                line: line_no,
                reason: "empty key".to_string(),
            });
        }

        row(line_no, &fields)?;
    }
    Ok(())
}

fn parse_probability(field: &str, table: TableKind, line: usize) -> Result<f64, LoadError> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() && (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(LoadError::Malformed {
            table,
            line,
            reason: format!("invalid probability {field:?}"),
        }),
    }
}

fn parse_frequency(field: &str, table: TableKind, line: usize) -> Result<u64, LoadError> {
    field.parse::<u64>().map_err(|_| LoadError::Malformed {
        table,
        line,
        reason: format!("invalid frequency {field:?}"),
    })
}
