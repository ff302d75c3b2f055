//! Configuração do servidor via variáveis de ambiente

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const ADDR_VAR: &str = "GENDERATOR_ADDR";
pub const DATA_DIR_VAR: &str = "GENDERATOR_DATA_DIR";
pub const FORCE_SPLIT_VAR: &str = "GENDERATOR_FORCE_SPLIT";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Endereço de escuta (padrão `0.0.0.0:3000`)
    pub addr: SocketAddr,
    /// Diretório com as tabelas TSV; sem ele usa as tabelas embutidas
    pub data_dir: Option<PathBuf>,
    /// `force_split` para requisições que não informam o campo
    pub force_split: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr = lookup(ADDR_VAR)
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .with_context(|| format!("{ADDR_VAR} inválido"))?;

        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let force_split = match lookup(FORCE_SPLIT_VAR).as_deref().map(str::trim) {
            None | Some("") => false,
            Some(value) => parse_bool(value)
                .with_context(|| format!("{FORCE_SPLIT_VAR} inválido: {value:?}"))?,
        };

        Ok(Self {
            addr,
            data_dir,
            force_split,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("esperado true/false"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert!(cfg.data_dir.is_none());
        assert!(!cfg.force_split);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (ADDR_VAR, "127.0.0.1:8080"),
            (DATA_DIR_VAR, "/srv/ine"),
            (FORCE_SPLIT_VAR, "TRUE"),
        ])
        .unwrap();
        assert_eq!(cfg.addr.port(), 8080);
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/srv/ine")));
        assert!(cfg.force_split);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[(ADDR_VAR, "localhost")]).is_err());
        assert!(config(&[(FORCE_SPLIT_VAR, "talvez")]).is_err());
    }
}
