//! # Dados de Exemplo Embutidos
//!
//! Pequenas amostras das tabelas do INE (Instituto Nacional de Estadística),
//! suficientes para demonstração e testes. Para uso real, carregue as
//! tabelas completas com [`ReferenceData::load_dir`](crate::reference::ReferenceData::load_dir).

pub const GIVEN_NAMES_TSV: &str = include_str!("../data/names_ine.tsv");
pub const AMBIGUITY_TSV: &str = include_str!("../data/name_surname_ratio.tsv");
pub const SURNAMES_TSV: &str = include_str!("../data/surnames_ine.tsv");

/// Nomes de demonstração, cada um exercitando um caminho do classificador.
pub fn demo_names() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Nome composto", "María José García López"),
        ("Partícula no nome", "María del Carmen Fernández Ruiz"),
        ("Nome ambíguo", "Rosario León Castro"),
        ("Sobrenome composto", "Juan de la Fuente Serrano"),
        ("Sobrenome com hífen", "José Luis Ruiz-Picasso"),
        ("Token desconhecido", "Carmen Xiomara Gil"),
        ("Divisão forçada", "Antonio Andrés"),
    ]
}
