use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// Default search radius for bond candidates, in Å.
pub const DEFAULT_BOND_MAX_RADIUS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntraBondProps {
    /// Run geometric inference even where explicit connectivity covers an atom.
    pub force_compute: bool,
    pub no_compute: bool,
    pub max_radius: f64,
}

impl Default for IntraBondProps {
    fn default() -> Self {
        Self {
            force_compute: false,
            no_compute: false,
            max_radius: DEFAULT_BOND_MAX_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterBondProps {
    pub max_radius: f64,
    pub ignore_water: bool,
    pub ignore_ion: bool,
    pub no_compute: bool,
    pub force_compute: bool,
}

impl Default for InterBondProps {
    fn default() -> Self {
        Self {
            max_radius: DEFAULT_BOND_MAX_RADIUS,
            ignore_water: true,
            ignore_ion: true,
            no_compute: false,
            force_compute: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BondComputationProps {
    pub intra: IntraBondProps,
    pub inter: InterBondProps,
}

/// Residue-count thresholds of the structure size classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeThresholds {
    pub small_residue_count: usize,
    pub medium_residue_count: usize,
    pub large_residue_count: usize,
    pub high_symmetry_unit_count: usize,
    pub fiber_residue_count: usize,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            small_residue_count: 10,
            medium_residue_count: 5000,
            large_residue_count: 30000,
            high_symmetry_unit_count: 10,
            fiber_residue_count: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StructureConfig {
    pub bonds: BondComputationProps,
    pub size: SizeThresholds,
    /// Recompute intra-unit bonds for every new frame instead of remapping them.
    pub dynamic_bonds: bool,
}

impl StructureConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: StructureConfig = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, value) in [
            ("bonds.intra.max_radius", self.bonds.intra.max_radius),
            ("bonds.inter.max_radius", self.bonds.inter.max_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    parameter,
                    reason: format!("must be a positive finite distance, got {value}"),
                });
            }
        }
        let s = &self.size;
        if !(s.small_residue_count <= s.medium_residue_count
            && s.medium_residue_count <= s.large_residue_count)
        {
            return Err(ConfigError::Invalid {
                parameter: "size",
                reason: "residue-count thresholds must be non-decreasing".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct StructureConfigBuilder {
    intra: Option<IntraBondProps>,
    inter: Option<InterBondProps>,
    size: Option<SizeThresholds>,
    dynamic_bonds: Option<bool>,
}

impl StructureConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intra_bonds(mut self, props: IntraBondProps) -> Self {
        self.intra = Some(props);
        self
    }
    pub fn inter_bonds(mut self, props: InterBondProps) -> Self {
        self.inter = Some(props);
        self
    }
    pub fn size_thresholds(mut self, thresholds: SizeThresholds) -> Self {
        self.size = Some(thresholds);
        self
    }
    pub fn dynamic_bonds(mut self, dynamic: bool) -> Self {
        self.dynamic_bonds = Some(dynamic);
        self
    }

    pub fn build(self) -> Result<StructureConfig, ConfigError> {
        let config = StructureConfig {
            bonds: BondComputationProps {
                intra: self.intra.unwrap_or_default(),
                inter: self.inter.unwrap_or_default(),
            },
            size: self.size.unwrap_or_default(),
            dynamic_bonds: self.dynamic_bonds.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = StructureConfig::default();
        assert_eq!(config.bonds.intra.max_radius, 4.0);
        assert!(config.bonds.inter.ignore_water);
        assert!(config.bonds.inter.ignore_ion);
        assert_eq!(config.size.large_residue_count, 30000);
        assert!(!config.dynamic_bonds);
    }

    #[test]
    fn load_merges_partial_file_with_defaults() {
        let file = write_temp_file(
            r#"
            dynamic_bonds = true

            [bonds.inter]
            ignore_water = false

            [size]
            small_residue_count = 20
            "#,
        );
        let config = StructureConfig::load(file.path()).unwrap();
        assert!(config.dynamic_bonds);
        assert!(!config.bonds.inter.ignore_water);
        assert!(config.bonds.inter.ignore_ion);
        assert_eq!(config.size.small_residue_count, 20);
        assert_eq!(config.size.medium_residue_count, 5000);
    }

    #[test]
    fn load_reports_io_and_toml_errors() {
        let missing = StructureConfig::load(Path::new("/nonexistent/structure.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let file = write_temp_file("[bonds.inter]\nunknown_key = 1\n");
        assert!(matches!(
            StructureConfig::load(file.path()),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn load_validates_values() {
        let file = write_temp_file("[bonds.intra]\nmax_radius = -1.0\n");
        assert!(matches!(
            StructureConfig::load(file.path()),
            Err(ConfigError::Invalid {
                parameter: "bonds.intra.max_radius",
                ..
            })
        ));
    }

    #[test]
    fn builder_fills_defaults_and_validates() {
        let config = StructureConfigBuilder::new()
            .dynamic_bonds(true)
            .inter_bonds(InterBondProps {
                ignore_ion: false,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert!(config.dynamic_bonds);
        assert!(!config.bonds.inter.ignore_ion);
        assert_eq!(config.bonds.intra, IntraBondProps::default());

        let err = StructureConfigBuilder::new()
            .size_thresholds(SizeThresholds {
                small_residue_count: 100,
                medium_residue_count: 10,
                ..Default::default()
            })
            .build();
        assert!(matches!(err, Err(ConfigError::Invalid { parameter: "size", .. })));
    }
}
