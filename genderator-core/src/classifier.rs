//! # Classificador de Tokens — Nome vs. Sobrenome
//!
//! Percorre o nome normalizado da esquerda para a direita e decide, token a
//! token, se ele pertence ao bloco de nomes ("maria jose") ou ao bloco de
//! sobrenomes ("garcia lopez").
//!
//! ## Máquina de estados
//!
//! | Estado                | Significado                                          |
//! |-----------------------|------------------------------------------------------|
//! | `CollectingGivenName` | ainda aceitando nomes                                |
//! | `CollectingSurname`   | o nome terminou; tudo que resolver vira sobrenome    |
//! | buffer não vazio      | tokens pendentes que nenhuma tabela reconheceu ainda |
//!
//! Tokens pendentes são concatenados com os seguintes ("de" + "la" +
//! "fuente") até que a junção seja reconhecida. Se a junção sozinha não é
//! conhecida, tenta-se ainda prefixar o último span confirmado ("maria" +
//! "del carmen"); nesse caso o span antigo é reatribuído ao span fundido.
//!
//! ## Empates
//!
//! Uma probabilidade de exatamente 0.5 sempre cai no lado do sobrenome.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use genderator_core::classifier::Classifier;
//! use genderator_core::reference::ReferenceData;
//!
//! let data = ReferenceData::builder()
//!     .given_name("juan", 0.99)
//!     .surname("garcia")
//!     .build();
//!
//! let result = Classifier::new(&data).classify("juan garcia");
//! assert_eq!(result.given_names.get("juan"), Some(1.0));
//! assert_eq!(result.surnames.get("garcia"), Some(1.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::normalizer::tokens;
use crate::reference::{ReferenceData, TokenEvidence};
use crate::span::OrderedSpans;

/// Fase da classificação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CollectingGivenName,
    CollectingSurname,
}

/// Qual dos dois mapeamentos recebeu um span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    GivenName,
    Surname,
}

/// O que aconteceu com um token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// Um span foi confirmado em um dos mapeamentos.
    Committed {
        target: SpanKind,
        key: String,
        confidence: f64,
        /// Span anterior absorvido pela fusão, se houve.
        merged_with: Option<String>,
    },
    /// O token ficou pendente aguardando os próximos.
    Buffered { pending: String },
    /// Nome reconhecido depois que o bloco de nomes já terminou.
    Dropped,
}

/// Registro de um passo da classificação (um por token).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyStep {
    pub token: String,
    pub decision: Decision,
    pub phase: Phase,
}

/// Resultado da classificação de um nome completo.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub given_names: OrderedSpans,
    pub surnames: OrderedSpans,
    /// Tokens que terminaram pendentes e foram descartados.
    pub unresolved: Vec<String>,
}

impl Classification {
    /// Verdadeiro se algum nome além do primeiro não é 100% certo, sugerindo
    /// um fragmento de sobrenome não reconhecido.
    pub fn is_splittable(&self) -> bool {
        is_splittable(&self.given_names)
    }
}

/// Ver [`Classification::is_splittable`].
pub fn is_splittable(given_names: &OrderedSpans) -> bool {
    given_names.iter().skip(1).any(|(_, confidence)| confidence < 1.0)
}

/// Classificador de nomes completos sobre um conjunto de dados de referência.
///
/// Não guarda estado entre chamadas: cada `classify` cria o seu próprio.
pub struct Classifier<'a> {
    data: &'a ReferenceData,
}

impl<'a> Classifier<'a> {
    pub fn new(data: &'a ReferenceData) -> Self {
        Self { data }
    }

    /// Classifica um nome já normalizado.
    pub fn classify(&self, normalized: &str) -> Classification {
        self.classify_traced(normalized, |_| {})
    }

    /// Classifica um nome já normalizado, reportando cada passo em `on_step`.
    pub fn classify_traced<F>(&self, normalized: &str, mut on_step: F) -> Classification
    where
        F: FnMut(ClassifyStep),
    {
        let mut state = ClassificationState::new();

        for token in tokens(normalized) {
            let decision = state.step(self.data, token);
            trace!(token, ?decision, "Token classificado");
            on_step(ClassifyStep {
                token: token.to_string(),
                decision,
                phase: state.phase,
            });
        }

        state.finish()
    }
}

/// Estado transitório de uma única classificação.
struct ClassificationState<'t> {
    given_names: OrderedSpans,
    surnames: OrderedSpans,
    pending: Vec<&'t str>,
    last_processed: Option<String>,
    phase: Phase,
}

impl<'t> ClassificationState<'t> {
    fn new() -> Self {
        Self {
            given_names: OrderedSpans::new(),
            surnames: OrderedSpans::new(),
            pending: Vec::new(),
            last_processed: None,
            phase: Phase::CollectingGivenName,
        }
    }

    fn accepts_given_names(&self) -> bool {
        self.phase == Phase::CollectingGivenName
    }

    fn step(&mut self, data: &ReferenceData, token: &'t str) -> Decision {
        let already_buffered = !self.pending.is_empty();
        if already_buffered {
            self.pending.push(token);
            if let Some(decision) = self.resolve_pending(data) {
                return decision;
            }
        }

        match data.evidence(token) {
            TokenEvidence::Ambiguous { surname_ratio } => {
                let decision = if self.given_names.is_empty()
                    || (surname_ratio < 0.5 && self.accepts_given_names())
                {
                    self.commit(SpanKind::GivenName, token, 1.0 - surname_ratio, None)
                } else {
                    if surname_ratio == 1.0 {
                        self.phase = Phase::CollectingSurname;
                    }
                    self.commit(SpanKind::Surname, token, surname_ratio, None)
                };
                self.pending.clear();
                self.last_processed = Some(token.to_string());
                decision
            }
            TokenEvidence::GivenName { .. } => {
                self.pending.clear();
                if self.accepts_given_names() {
                    self.last_processed = Some(token.to_string());
                    self.commit(SpanKind::GivenName, token, 1.0, None)
                } else {
                    Decision::Dropped
                }
            }
            TokenEvidence::Surname if !self.given_names.is_empty() => {
                self.phase = Phase::CollectingSurname;
                self.pending.clear();
                self.last_processed = Some(token.to_string());
                self.commit(SpanKind::Surname, token, 1.0, None)
            }
            TokenEvidence::Surname | TokenEvidence::Unknown => {
                if !already_buffered {
                    self.pending.push(token);
                }
                Decision::Buffered {
                    pending: self.pending.join(" "),
                }
            }
        }
    }

    /// Tenta resolver o buffer pendente, sozinho ou fundido ao último span.
    fn resolve_pending(&mut self, data: &ReferenceData) -> Option<Decision> {
        let joined = self.pending.join(" ");
        let (candidate, probability, merged_with) = match data.given_name_probability(&joined) {
            Some(probability) => (joined, probability, None),
            None => {
                let last = self.last_processed.clone()?;
                let merged = format!("{last} {joined}");
                let probability = data.given_name_probability(&merged)?;
                self.reassign(&last);
                (merged, probability, Some(last))
            }
        };

        let decision = if probability > 0.5 && self.accepts_given_names() {
            self.commit(SpanKind::GivenName, &candidate, probability, merged_with)
        } else {
            self.phase = Phase::CollectingSurname;
            self.commit(SpanKind::Surname, &candidate, 1.0 - probability, merged_with)
        };
        self.pending.clear();
        self.last_processed = Some(candidate);
        Some(decision)
    }

    /// Retira um span já confirmado de qualquer mapeamento que o contenha,
    /// para que ele seja substituído pelo span fundido.
    fn reassign(&mut self, key: &str) {
        if self.given_names.remove(key).is_none() {
            self.surnames.remove(key);
        }
    }

    fn commit(
        &mut self,
        target: SpanKind,
        key: &str,
        confidence: f64,
        merged_with: Option<String>,
    ) -> Decision {
        match target {
            SpanKind::GivenName => self.given_names.insert(key, confidence),
            SpanKind::Surname => self.surnames.insert(key, confidence),
        }
        Decision::Committed {
            target,
            key: key.to_string(),
            confidence,
            merged_with,
        }
    }

    fn finish(self) -> Classification {
        Classification {
            given_names: self.given_names,
            surnames: self.surnames,
            unresolved: self.pending.iter().map(|t| t.to_string()).collect(),
        }
    }
}
