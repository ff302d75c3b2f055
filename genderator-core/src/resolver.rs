//! # Resolvedor do Nome Real
//!
//! Dado o bloco de nomes em ordem ("maria", "jose"), encontra a combinação
//! mais longa que existe na tabela de nomes e devolve sua probabilidade de
//! ser masculino.
//!
//! Prefixos mais longos vencem: "maria jose" (feminino) tem prioridade sobre
//! "maria", mesmo que os dois tokens tenham sido classificados separadamente.

use serde::Serialize;

use crate::reference::GivenNameTable;

/// O nome reconhecido e sua probabilidade de ser masculino.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub real_name: String,
    pub male_probability: f64,
}

/// Testa os prefixos de `keys` do mais longo ao mais curto.
///
/// Retorna `None` quando nenhum prefixo está na tabela.
pub fn resolve<S: AsRef<str>>(keys: &[S], table: &GivenNameTable) -> Option<Resolution> {
    (1..=keys.len()).rev().find_map(|len| {
        let candidate = keys[..len]
            .iter()
            .map(|k| k.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        table.get(&candidate).map(|male_probability| Resolution {
            real_name: candidate,
            male_probability,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceData;

    #[test]
    fn test_longest_prefix_wins() {
        let data = ReferenceData::builder()
            .given_name("maria", 0.004)
            .given_name("maria jose", 0.001)
            .build();
        let resolution = resolve(&["maria", "jose"], data.given_names()).unwrap();
        assert_eq!(resolution.real_name, "maria jose");
        assert_eq!(resolution.male_probability, 0.001);
    }

    #[test]
    fn test_falls_back_to_shorter_prefix() {
        let data = ReferenceData::builder().given_name("juan", 0.995).build();
        let resolution = resolve(&["juan", "leon"], data.given_names()).unwrap();
        assert_eq!(resolution.real_name, "juan");
    }

    #[test]
    fn test_only_prefixes_are_considered() {
        // "carlos" existe, mas não é prefixo de ["xavi", "carlos"]
        let data = ReferenceData::builder().given_name("carlos", 0.998).build();
        assert!(resolve(&["xavi", "carlos"], data.given_names()).is_none());
    }

    #[test]
    fn test_empty_keys() {
        let data = ReferenceData::builder().given_name("juan", 0.995).build();
        let keys: [&str; 0] = [];
        assert!(resolve(&keys, data.given_names()).is_none());
    }
}
