//! # Dados de Referência
//!
//! As três tabelas que substituem um modelo treinado:
//!
//! | Tabela            | Chave               | Valor                                  |
//! |-------------------|---------------------|----------------------------------------|
//! | `GivenNameTable`  | nome ("maria jose") | probabilidade de ser masculino (0..1)  |
//! | `AmbiguityTable`  | token ("leon")      | probabilidade de ser sobrenome (0..1)  |
//! | `SurnameSet`      | sobrenome           | (presença)                             |
//!
//! `ReferenceData` é construído uma única vez e nunca mais alterado. Para
//! compartilhar entre vários pipelines (ou threads), embrulhe em `Arc`:
//! nenhuma classificação precisa de `&mut`.

use std::collections::{HashMap, HashSet};

use crate::normalizer::normalize;

/// Nome → probabilidade de ser um nome masculino.
#[derive(Debug, Clone, Default)]
pub struct GivenNameTable {
    names: HashMap<String, f64>,
}

impl GivenNameTable {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Token → probabilidade de ser sobrenome em vez de nome.
#[derive(Debug, Clone, Default)]
pub struct AmbiguityTable {
    ratios: HashMap<String, f64>,
}

impl AmbiguityTable {
    pub fn get(&self, token: &str) -> Option<f64> {
        self.ratios.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

/// Conjunto de sobrenomes conhecidos.
#[derive(Debug, Clone, Default)]
pub struct SurnameSet {
    surnames: HashSet<String>,
}

impl SurnameSet {
    pub fn contains(&self, surname: &str) -> bool {
        self.surnames.contains(surname)
    }

    pub fn len(&self) -> usize {
        self.surnames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surnames.is_empty()
    }
}

/// O que as tabelas sabem sobre um token (ou span candidato).
///
/// As tabelas são consultadas nesta ordem: ambiguidade, nomes, sobrenomes.
/// O primeiro acerto define a evidência.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenEvidence {
    /// Pode ser nome ou sobrenome; `surname_ratio` é a chance de ser sobrenome.
    Ambiguous { surname_ratio: f64 },
    /// Nome conhecido.
    GivenName { male_probability: f64 },
    /// Sobrenome conhecido.
    Surname,
    /// Nenhuma tabela conhece o token.
    Unknown,
}

impl TokenEvidence {
    /// Probabilidade de o token ser um nome (e não sobrenome).
    ///
    /// `None` quando nenhuma tabela conhece o token.
    pub fn given_name_probability(&self) -> Option<f64> {
        match *self {
            TokenEvidence::Ambiguous { surname_ratio } => Some(1.0 - surname_ratio),
            TokenEvidence::GivenName { .. } => Some(1.0),
            TokenEvidence::Surname => Some(0.0),
            TokenEvidence::Unknown => None,
        }
    }
}

/// As três tabelas de referência, imutáveis após a construção.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    given_names: GivenNameTable,
    ambiguity: AmbiguityTable,
    surnames: SurnameSet,
}

impl ReferenceData {
    pub fn builder() -> ReferenceDataBuilder {
        ReferenceDataBuilder::default()
    }

    pub fn given_names(&self) -> &GivenNameTable {
        &self.given_names
    }

    pub fn ambiguity(&self) -> &AmbiguityTable {
        &self.ambiguity
    }

    pub fn surnames(&self) -> &SurnameSet {
        &self.surnames
    }

    /// Consulta as três tabelas e devolve a evidência para `token`.
    pub fn evidence(&self, token: &str) -> TokenEvidence {
        if let Some(surname_ratio) = self.ambiguity.get(token) {
            TokenEvidence::Ambiguous { surname_ratio }
        } else if let Some(male_probability) = self.given_names.get(token) {
            TokenEvidence::GivenName { male_probability }
        } else if self.surnames.contains(token) {
            TokenEvidence::Surname
        } else {
            TokenEvidence::Unknown
        }
    }

    /// Atalho para `evidence(candidate).given_name_probability()`.
    pub fn given_name_probability(&self, candidate: &str) -> Option<f64> {
        self.evidence(candidate).given_name_probability()
    }
}

/// Monta um [`ReferenceData`] programaticamente.
///
/// As chaves passam pelo normalizador, então "José" e "jose" caem na mesma
/// entrada. Inserir a mesma chave duas vezes mantém o último valor.
#[derive(Debug, Default)]
pub struct ReferenceDataBuilder {
    data: ReferenceData,
}

impl ReferenceDataBuilder {
    pub fn given_name(mut self, name: &str, male_probability: f64) -> Self {
        self.add_given_name(name, male_probability);
        self
    }

    pub fn ambiguous(mut self, token: &str, surname_ratio: f64) -> Self {
        self.add_ambiguous(token, surname_ratio);
        self
    }

    pub fn surname(mut self, surname: &str) -> Self {
        self.add_surname(surname);
        self
    }

    pub fn add_given_name(&mut self, name: &str, male_probability: f64) {
        self.data
            .given_names
            .names
            .insert(normalize(name), male_probability);
    }

    pub fn add_ambiguous(&mut self, token: &str, surname_ratio: f64) {
        self.data
            .ambiguity
            .ratios
            .insert(normalize(token), surname_ratio);
    }

    pub fn add_surname(&mut self, surname: &str) {
        self.data.surnames.surnames.insert(normalize(surname));
    }

    pub fn build(self) -> ReferenceData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ReferenceData {
        ReferenceData::builder()
            .given_name("Juan", 0.99)
            .given_name("leon", 0.98)
            .ambiguous("León", 0.4)
            .surname("García")
            .surname("leon")
            .build()
    }

    #[test]
    fn test_keys_are_normalized() {
        let data = data();
        assert_eq!(data.given_names().get("juan"), Some(0.99));
        assert!(data.surnames().contains("garcia"));
    }

    #[test]
    fn test_evidence_prefers_ambiguity_table() {
        let data = data();
        assert_eq!(
            data.evidence("leon"),
            TokenEvidence::Ambiguous { surname_ratio: 0.4 }
        );
        assert_eq!(
            data.evidence("juan"),
            TokenEvidence::GivenName { male_probability: 0.99 }
        );
        assert_eq!(data.evidence("garcia"), TokenEvidence::Surname);
        assert_eq!(data.evidence("xyz"), TokenEvidence::Unknown);
    }

    #[test]
    fn test_given_name_probability() {
        let data = data();
        let p = data.given_name_probability("leon").unwrap();
        assert!((p - 0.6).abs() < 1e-9);
        assert_eq!(data.given_name_probability("juan"), Some(1.0));
        assert_eq!(data.given_name_probability("garcia"), Some(0.0));
        assert_eq!(data.given_name_probability("xyz"), None);
    }

    #[test]
    fn test_independent_instances_do_not_share_tables() {
        let first = ReferenceData::builder().surname("garcia").build();
        let second = ReferenceData::builder().surname("lopez").build();
        assert_eq!(first.surnames().len(), 1);
        assert_eq!(second.surnames().len(), 1);
        assert!(!second.surnames().contains("garcia"));
    }
}
