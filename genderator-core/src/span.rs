//! # Spans Classificados
//!
//! Um *span* é uma sequência contígua de tokens classificada em bloco como
//! parte do nome ou do sobrenome (ex: "maria jose", "de la fuente").
//!
//! O classificador mantém dois mapeamentos ordenados `span → confiança`:
//! um para nomes e outro para sobrenomes. A ordem de inserção reflete a
//! posição da esquerda para a direita no texto de entrada e precisa ser
//! preservada até a saída JSON.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Mapeamento ordenado de spans para sua confiança em (0, 1].
///
/// # Exemplo
/// Em "maria jose garcia", o mapeamento de nomes fica
/// `[("maria", 0.9), ("jose", 0.8)]` e o de sobrenomes `[("garcia", 1.0)]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedSpans {
    entries: Vec<(String, f64)>,
}

impl OrderedSpans {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere um span no fim do mapeamento.
    ///
    /// Se a chave já existe, apenas a confiança é atualizada e a posição
    /// original é mantida.
    pub fn insert(&mut self, key: impl Into<String>, confidence: f64) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = confidence,
            None => self.entries.push((key, confidence)),
        }
    }

    /// Remove um span, retornando sua confiança se existia.
    pub fn remove(&mut self, key: &str) -> Option<f64> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, confidence)| *confidence)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn first(&self) -> Option<(&str, f64)> {
        self.entries.first().map(|(k, c)| (k.as_str(), *c))
    }

    /// Chaves na ordem de inserção.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for OrderedSpans {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, confidence) in &self.entries {
            map.serialize_entry(key, confidence)?;
        }
        map.end()
    }
}
