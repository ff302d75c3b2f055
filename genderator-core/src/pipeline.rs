//! # Pipeline de Inferência — Orquestrador com Eventos Observáveis
//!
//! Conecta normalizador, classificador, resolvedor e montagem da resposta,
//! emitindo um evento por etapa via canal (`mpsc`). O servidor WebSocket usa
//! esses eventos para mostrar o "raciocínio" token a token.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answer::Answer;
use crate::classifier::{Classification, Classifier, ClassifyStep};
use crate::normalizer::normalize;
use crate::reference::ReferenceData;
use crate::resolver::{resolve, Resolution};

/// Por que a inferência terminou como terminou.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Resposta produzida.
    Answered,
    /// Nada sobrou depois da normalização.
    EmptyInput,
    /// Nenhum nome foi reconhecido.
    NoGivenName,
    /// Há nomes, mas nenhum sobrenome (e a divisão forçada não se aplica).
    NoSurname,
    /// Nenhum prefixo do bloco de nomes existe na tabela de nomes.
    Unresolved,
}

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Texto normalizado.
    Normalized { input: String, normalized: String },
    /// **Passo 2** (Loop): Decisão tomada para um token.
    TokenClassified { index: usize, step: ClassifyStep },
    /// **Passo 3**: Os dois blocos finais.
    Classified {
        classification: Classification,
        splittable: bool,
    },
    /// **Passo 4**: Nome real encontrado na tabela.
    Resolved { resolution: Resolution },
    /// **Conclusão**: resposta (ou ausência dela) e o motivo.
    Done {
        answer: Option<Answer>,
        outcome: Outcome,
        processing_ms: u64,
    },
}

/// O pipeline de inferência de gênero.
///
/// Os dados de referência ficam atrás de um `Arc` e nunca são alterados;
/// vários pipelines (ex: com e sem `force_split`) podem dividir as mesmas
/// tabelas entre threads.
#[derive(Debug, Clone)]
pub struct GenderPipeline {
    data: Arc<ReferenceData>,
    force_split: bool,
}

impl GenderPipeline {
    /// Cria o pipeline.
    ///
    /// Com `force_split`, um nome sem sobrenome reconhecido ainda gera
    /// resposta se o bloco de nomes for divisível.
    pub fn new(data: Arc<ReferenceData>, force_split: bool) -> Self {
        Self { data, force_split }
    }

    pub fn data(&self) -> &Arc<ReferenceData> {
        &self.data
    }

    pub fn force_split(&self) -> bool {
        self.force_split
    }

    /// Infere o gênero de um nome completo.
    pub fn guess_gender(&self, full_name: &str) -> Option<Answer> {
        self.guess_with_outcome(full_name).0
    }

    /// Como [`guess_gender`](Self::guess_gender), devolvendo também o motivo.
    pub fn guess_with_outcome(&self, full_name: &str) -> (Option<Answer>, Outcome) {
        let (tx, rx) = mpsc::channel();
        self.guess_streaming(full_name, tx);

        let mut result = (None, Outcome::EmptyInput);
        while let Ok(event) = rx.recv() {
            if let PipelineEvent::Done { answer, outcome, .. } = event {
                result = (answer, outcome);
            }
        }
        result
    }

    /// Infere o gênero de vários nomes em paralelo, preservando a ordem.
    pub fn guess_batch<S: AsRef<str> + Sync>(&self, names: &[S]) -> Vec<Option<Answer>> {
        names
            .par_iter()
            .map(|name| self.guess_gender(name.as_ref()))
            .collect()
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `Normalized`
    /// 2. `TokenClassified` (um por token)
    /// 3. `Classified`
    /// 4. `Resolved` (se algum prefixo foi encontrado)
    /// 5. `Done` (sempre o último)
    pub fn guess_streaming(&self, full_name: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let done = |answer: Option<Answer>, outcome: Outcome| {
            debug!(input = full_name, ?outcome, "Inferência concluída");
            let _ = tx.send(PipelineEvent::Done {
                answer,
                outcome,
                processing_ms: start.elapsed().as_millis() as u64,
            });
        };

        // === Passo 1: Normalização ===
        let normalized = normalize(full_name);
        let _ = tx.send(PipelineEvent::Normalized {
            input: full_name.to_string(),
            normalized: normalized.clone(),
        });
        if normalized.is_empty() {
            done(None, Outcome::EmptyInput);
            return;
        }

        // === Passo 2: Classificação token a token ===
        let mut index = 0;
        let classification =
            Classifier::new(&self.data).classify_traced(&normalized, |step| {
                let _ = tx.send(PipelineEvent::TokenClassified { index, step });
                index += 1;
            });

        // === Passo 3: Verificação dos blocos ===
        let splittable = classification.is_splittable();
        let _ = tx.send(PipelineEvent::Classified {
            classification: classification.clone(),
            splittable,
        });

        if classification.given_names.is_empty() {
            done(None, Outcome::NoGivenName);
            return;
        }
        if classification.surnames.is_empty() && !(self.force_split && splittable) {
            done(None, Outcome::NoSurname);
            return;
        }

        // === Passo 4: Resolução do nome real ===
        let keys: Vec<&str> = classification.given_names.keys().collect();
        let Some(resolution) = resolve(&keys, self.data.given_names()) else {
            done(None, Outcome::Unresolved);
            return;
        };
        let _ = tx.send(PipelineEvent::Resolved {
            resolution: resolution.clone(),
        });

        // === Passo 5: Resposta ===
        let Classification {
            given_names,
            surnames,
            ..
        } = classification;
        done(
            Some(Answer::new(resolution, given_names, surnames)),
            Outcome::Answered,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Gender;

    fn pipeline(data: ReferenceData, force_split: bool) -> GenderPipeline {
        GenderPipeline::new(Arc::new(data), force_split)
    }

    #[test]
    fn test_certain_case() {
        let data = ReferenceData::builder()
            .given_name("juan", 0.99)
            .surname("garcia")
            .build();
        let answer = pipeline(data, false).guess_gender("Juan García").unwrap();

        assert_eq!(answer.given_names.iter().collect::<Vec<_>>(), vec![("juan", 1.0)]);
        assert_eq!(answer.surnames.iter().collect::<Vec<_>>(), vec![("garcia", 1.0)]);
        assert_eq!(answer.real_name, "juan");
        assert_eq!(answer.gender, Gender::Male);
        assert_eq!(answer.confidence, 0.99);
    }

    #[test]
    fn test_resolver_prefers_compound_name() {
        let data = ReferenceData::builder()
            .given_name("maria", 0.004)
            .given_name("maria jose", 0.001)
            .ambiguous("maria", 0.1)
            .ambiguous("jose", 0.2)
            .surname("garcia")
            .build();
        let answer = pipeline(data, false).guess_gender("maria jose garcia").unwrap();

        assert_eq!(answer.real_name, "maria jose");
        assert_eq!(answer.gender, Gender::Female);
        assert!((answer.confidence - 0.999).abs() < 1e-9);
    }

    #[test]
    fn test_force_split() {
        let data = ReferenceData::builder()
            .given_name("juan", 0.995)
            .ambiguous("leon", 0.4)
            .build();
        let shared = Arc::new(data);
        let strict = GenderPipeline::new(Arc::clone(&shared), false);
        let split = GenderPipeline::new(Arc::clone(&shared), true);

        assert_eq!(strict.guess_with_outcome("juan leon"), (None, Outcome::NoSurname));

        let answer = split.guess_gender("juan leon").unwrap();
        assert_eq!(answer.real_name, "juan");
        assert!(answer.surnames.is_empty());
        assert_eq!(answer.given_names.keys().collect::<Vec<_>>(), vec!["juan", "leon"]);
    }

    #[test]
    fn test_force_split_requires_splittable_span() {
        let data = ReferenceData::builder()
            .given_name("juan", 0.995)
            .given_name("carlos", 0.998)
            .build();
        let (answer, outcome) = pipeline(data, true).guess_with_outcome("juan carlos");
        assert!(answer.is_none());
        assert_eq!(outcome, Outcome::NoSurname);
    }

    #[test]
    fn test_no_given_name() {
        let data = ReferenceData::builder().surname("garcia").build();
        let (answer, outcome) = pipeline(data, false).guess_with_outcome("garcia lopez");
        assert!(answer.is_none());
        assert_eq!(outcome, Outcome::NoGivenName);
    }

    #[test]
    fn test_unresolved_given_name_yields_no_answer() {
        // "leon" entra como nome via tabela de ambiguidade, mas não está na tabela de nomes
        let data = ReferenceData::builder()
            .ambiguous("leon", 0.3)
            .surname("garcia")
            .build();
        let (answer, outcome) = pipeline(data, false).guess_with_outcome("leon garcia");
        assert!(answer.is_none());
        assert_eq!(outcome, Outcome::Unresolved);
    }

    #[test]
    fn test_empty_input() {
        let p = pipeline(ReferenceData::default(), false);
        assert_eq!(p.guess_with_outcome("   "), (None, Outcome::EmptyInput));
        assert_eq!(p.guess_with_outcome("¿?"), (None, Outcome::EmptyInput));
    }

    #[test]
    fn test_deterministic_output() {
        let p = pipeline(ReferenceData::bundled().unwrap(), true);
        for (_, name) in crate::sample::demo_names() {
            let first = p.guess_gender(name).map(|a| a.to_json());
            let second = p.guess_gender(name).map(|a| a.to_json());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let p = pipeline(ReferenceData::bundled().unwrap(), false);
        let names = ["María José García", "nadie", "Juan Carlos Pérez López"];
        let answers = p.guess_batch(&names);

        assert_eq!(answers.len(), 3);
        assert_eq!(answers[0].as_ref().unwrap().real_name, "maria jose");
        assert!(answers[1].is_none());
        assert_eq!(answers[2].as_ref().unwrap().real_name, "juan carlos");
    }

    #[test]
    fn test_events_streaming() {
        let data = ReferenceData::builder()
            .given_name("juan", 0.99)
            .surname("garcia")
            .build();
        let (tx, rx) = mpsc::channel();
        pipeline(data, false).guess_streaming("Juan García", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(
            matches!(&events[0], PipelineEvent::Normalized { normalized, .. } if normalized == "juan garcia"),
            "Primeiro evento deve ser Normalized"
        );
        let steps = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::TokenClassified { .. }))
            .count();
        assert_eq!(steps, 2);
        assert!(events.iter().any(|e| matches!(e, PipelineEvent::Resolved { .. })));
        assert!(
            matches!(events.last().unwrap(), PipelineEvent::Done { outcome: Outcome::Answered, .. }),
            "Último evento deve ser Done"
        );
    }

    #[test]
    fn test_shared_data_across_threads() {
        let shared = Arc::new(ReferenceData::bundled().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let p = GenderPipeline::new(Arc::clone(&shared), i % 2 == 0);
                std::thread::spawn(move || p.guess_gender("Antonio García López"))
            })
            .collect();
        for handle in handles {
            let answer = handle.join().unwrap().unwrap();
            assert_eq!(answer.real_name, "antonio");
            assert_eq!(answer.gender, Gender::Male);
        }
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}
