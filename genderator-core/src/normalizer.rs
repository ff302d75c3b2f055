//! # Normalizador de Nomes
//!
//! Converte o texto bruto digitado pelo usuário em uma forma canônica,
//! separável por espaços, que é a única forma consumida pelo classificador
//! e pelas tabelas de referência.
//!
//! ## Etapas
//!
//! 1. Decomposição Unicode (NFD): "José" vira "Jose" + acento combinante.
//! 2. Remoção das marcas combinantes (acentos, til, trema).
//! 3. Caixa baixa.
//! 4. Segmentação em palavras Unicode: pontuação e símbolos somem,
//!    hífens e apóstrofos separam palavras ("Ruiz-Picasso" → "ruiz picasso").
//! 5. Junção com um único espaço.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use genderator_core::normalizer::{normalize, tokens};
//!
//! let normalized = normalize("  María  José Núñez-García ");
//! assert_eq!(normalized, "maria jose nunez garcia");
//! assert_eq!(tokens(&normalized).count(), 4);
//! ```

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Normaliza um nome completo (ou uma chave das tabelas de referência).
///
/// Retorna string vazia quando não sobra nenhuma palavra.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded
        .unicode_words()
        .flat_map(|word| word.split(['-', '\'', '’']))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Itera sobre os tokens de uma string já normalizada.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}
