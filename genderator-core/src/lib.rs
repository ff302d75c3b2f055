//! # genderator-core — Inferência de Gênero a partir de Nomes em Espanhol
//!
//! Este crate estima o gênero provável de uma pessoa a partir do seu nome
//! completo (convenção espanhola: um ou mais nomes seguidos de um ou mais
//! sobrenomes). Não há aprendizado de máquina: tudo vem de três tabelas de
//! referência pré-computadas.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: Nome completo bruto (String).
//! 2.  **Normalização** ([`normalizer`]): acentos removidos, caixa baixa, um espaço entre palavras.
//! 3.  **Classificação** ([`classifier`]): cada token vai para o bloco de nomes ou de sobrenomes,
//!     consultando as tabelas de [`reference`].
//! 4.  **Resolução** ([`resolver`]): a combinação de nomes mais longa conhecida define a probabilidade.
//! 5.  **Saída**: [`Answer`] com os dois blocos, o nome real, o gênero e a confiança.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use genderator_core::{Gender, GenderPipeline, ReferenceData};
//!
//! // 1. Carrega as tabelas uma única vez
//! let data = Arc::new(ReferenceData::bundled().unwrap());
//!
//! // 2. Instancia o pipeline (sem divisão forçada)
//! let pipeline = GenderPipeline::new(data, false);
//!
//! // 3. Consulta
//! let answer = pipeline.guess_gender("María José García López").unwrap();
//! assert_eq!(answer.real_name, "maria jose");
//! assert_eq!(answer.gender, Gender::Female);
//! println!("{}", answer.to_json());
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador principal que conecta todos os estágios.
//! - [`loader`]: Leitura das tabelas TSV com rejeição de linhas malformadas.
//! - [`sample`]: Tabelas de exemplo embutidas e nomes de demonstração.

pub mod answer;
pub mod classifier;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod reference;
pub mod resolver;
pub mod sample;
pub mod span;

pub use answer::{Answer, Gender};
pub use classifier::{Classification, Classifier};
pub use loader::LoadError;
pub use pipeline::{GenderPipeline, Outcome, PipelineEvent};
pub use reference::ReferenceData;
pub use span::OrderedSpans;
