//! # Resposta Final
//!
//! Monta o registro devolvido ao usuário a partir da classificação e da
//! resolução do nome real.
//!
//! ```json
//! {
//!   "givenNames": {"maria": 0.9, "jose": 0.8},
//!   "surnames": {"garcia": 1.0},
//!   "realName": "maria jose",
//!   "gender": "Female",
//!   "confidence": 0.999
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::resolver::Resolution;
use crate::span::OrderedSpans;

/// Gênero inferido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Masculino se a probabilidade passa estritamente de 0.5.
    pub fn from_male_probability(male_probability: f64) -> Self {
        if male_probability > 0.5 {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resultado de uma inferência bem-sucedida.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub given_names: OrderedSpans,
    pub surnames: OrderedSpans,
    pub real_name: String,
    pub gender: Gender,
    /// Probabilidade do gênero escolhido, em [0.5, 1].
    pub confidence: f64,
}

impl Answer {
    pub fn new(resolution: Resolution, given_names: OrderedSpans, surnames: OrderedSpans) -> Self {
        let gender = Gender::from_male_probability(resolution.male_probability);
        let confidence = match gender {
            Gender::Male => resolution.male_probability,
            Gender::Female => 1.0 - resolution.male_probability,
        };
        Self {
            given_names,
            surnames,
            real_name: resolution.real_name,
            gender,
            confidence,
        }
    }

    pub fn to_json(&self) -> String {
        // Apenas strings, floats e mapas com chave string: não há como falhar
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(entries: &[(&str, f64)]) -> OrderedSpans {
        let mut spans = OrderedSpans::new();
        for (key, confidence) in entries {
            spans.insert(*key, *confidence);
        }
        spans
    }

    #[test]
    fn test_male_answer() {
        let answer = Answer::new(
            Resolution { real_name: "juan".into(), male_probability: 0.99 },
            spans(&[("juan", 1.0)]),
            spans(&[("garcia", 1.0)]),
        );
        assert_eq!(answer.gender, Gender::Male);
        assert_eq!(answer.confidence, 0.99);
    }

    #[test]
    fn test_half_probability_is_female() {
        let answer = Answer::new(
            Resolution { real_name: "cruz".into(), male_probability: 0.5 },
            spans(&[("cruz", 1.0)]),
            OrderedSpans::new(),
        );
        assert_eq!(answer.gender, Gender::Female);
        assert_eq!(answer.confidence, 0.5);
    }

    #[test]
    fn test_json_field_names_and_order() {
        let answer = Answer::new(
            Resolution { real_name: "maria jose".into(), male_probability: 0.25 },
            spans(&[("maria", 0.9), ("jose", 0.75)]),
            spans(&[("lopez", 1.0), ("garcia", 1.0)]),
        );
        assert_eq!(
            answer.to_json(),
            r#"{"givenNames":{"maria":0.9,"jose":0.75},"surnames":{"lopez":1.0,"garcia":1.0},"realName":"maria jose","gender":"Female","confidence":0.75}"#
        );
    }
}
