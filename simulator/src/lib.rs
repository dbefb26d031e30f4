//! Offline driver for the stardrop engines.
//!
//! - [`rtp`]: Monte Carlo estimates of the realized return of every game mode
//! - [`session`]: a live, timer-driven session persisted through a [`store::FileStore`]

use anyhow::Context;
use stardrop_execution::{Catalog, GameConfig};
use stardrop_types::casino::CatalogFile;
use std::path::Path;

pub mod rtp;
pub mod session;
pub mod store;

/// Catalog bundled with the binary.
pub const DEFAULT_CATALOG: &str = include_str!("../data/catalog.json");

/// Parse and validate a catalog document.
pub fn parse_catalog(json: &str) -> anyhow::Result<Catalog> {
    let file: CatalogFile = serde_json::from_str(json).context("failed to parse catalog")?;
    Catalog::from_file(file).context("invalid catalog")
}

/// Load the catalog at `path`, or the bundled one.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog {}", path.display()))?;
            parse_catalog(&json)
        }
        None => parse_catalog(DEFAULT_CATALOG),
    }
}

/// Load the config at `path` (defaults otherwise) and validate it against `catalog`.
pub fn load_config(path: Option<&Path>, catalog: &Catalog) -> anyhow::Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&json).context("failed to parse config")?
        }
        None => GameConfig::default(),
    };
    config.validate(catalog).context("invalid config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = parse_catalog(DEFAULT_CATALOG).unwrap();
        assert_eq!(catalog.items().len(), 23);
        assert_eq!(catalog.cases().len(), 4);
        let starter = catalog.case("starter").unwrap();
        assert_eq!(starter.display_percent(3), Some(30.0));
    }

    #[test]
    fn test_default_config_validates_against_default_catalog() {
        let catalog = parse_catalog(DEFAULT_CATALOG).unwrap();
        assert_eq!(load_config(None, &catalog).unwrap(), GameConfig::default());
    }

    #[test]
    fn test_rejects_bad_catalog() {
        assert!(parse_catalog(r#"{"items": []}"#).is_err());
        assert!(parse_catalog("not json").is_err());
    }
}
