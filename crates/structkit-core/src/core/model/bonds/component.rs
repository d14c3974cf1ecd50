use crate::core::chemistry::{BondType, parse_bond_order};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentBondInfo {
    pub order: u8,
    pub flags: BondType,
    /// Row of the dictionary record, or `-1` when not loaded from a table.
    pub key: i32,
}

/// Bonds of one chemical component, addressed by atom-name pair in either order.
#[derive(Debug, Clone, Default)]
pub struct ComponentBonds {
    map: HashMap<String, HashMap<String, ComponentBondInfo>>,
}

impl ComponentBonds {
    fn insert(&mut self, atom_1: &str, atom_2: &str, info: ComponentBondInfo) {
        self.map
            .entry(atom_1.to_string())
            .or_default()
            .insert(atom_2.to_string(), info);
        self.map
            .entry(atom_2.to_string())
            .or_default()
            .insert(atom_1.to_string(), info);
    }

    pub fn get(&self, atom_1: &str, atom_2: &str) -> Option<&ComponentBondInfo> {
        self.map.get(atom_1).and_then(|m| m.get(atom_2))
    }

    /// All partners of `atom` with their bond properties.
    pub fn partners(&self, atom: &str) -> impl Iterator<Item = (&str, &ComponentBondInfo)> {
        self.map
            .get(atom)
            .into_iter()
            .flat_map(|m| m.iter().map(|(name, info)| (name.as_str(), info)))
    }

    pub fn atom_count(&self) -> usize {
        self.map.len()
    }
}

/// Chemical-component bond dictionary: component id → atom-name pair → bond properties.
#[derive(Debug, Clone, Default)]
pub struct ComponentBondDictionary {
    components: HashMap<String, ComponentBonds>,
}

#[derive(Debug, Error)]
pub enum DictionaryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ChemCompBondRecord {
    comp_id: String,
    atom_id_1: String,
    atom_id_2: String,
    value_order: String,
    #[serde(default)]
    pdbx_aromatic_flag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlComponent {
    bonds: Vec<TomlBond>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBond {
    atoms: [String; 2],
    #[serde(default = "default_order")]
    order: String,
    #[serde(default)]
    aromatic: bool,
}

fn default_order() -> String {
    "sing".to_string()
}

impl ComponentBondDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bond(
        &mut self,
        comp_id: &str,
        atom_1: &str,
        atom_2: &str,
        order: u8,
        flags: BondType,
        key: i32,
    ) {
        self.components
            .entry(comp_id.to_string())
            .or_default()
            .insert(atom_1, atom_2, ComponentBondInfo { order, flags, key });
    }

    pub fn get(&self, comp_id: &str) -> Option<&ComponentBonds> {
        self.components.get(comp_id)
    }

    pub fn has(&self, comp_id: &str) -> bool {
        self.components.contains_key(comp_id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Loads a `chem_comp_bond`-shaped CSV with columns `comp_id`, `atom_id_1`, `atom_id_2`,
    /// `value_order` and optionally `pdbx_aromatic_flag` (`Y`/`N`).
    pub fn load_csv(path: &Path) -> Result<Self, DictionaryLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| DictionaryLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut dictionary = Self::new();
        for (row, result) in reader.deserialize::<ChemCompBondRecord>().enumerate() {
            let record = result.map_err(|e| DictionaryLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let aromatic = record
                .pdbx_aromatic_flag
                .as_deref()
                .is_some_and(|f| f.trim().eq_ignore_ascii_case("y"));
            let (order, flags) = parse_bond_order(&record.value_order, aromatic);
            dictionary.add_bond(
                &record.comp_id,
                &record.atom_id_1,
                &record.atom_id_2,
                order,
                flags,
                row as i32,
            );
        }
        tracing::debug!(
            components = dictionary.len(),
            path = %path.display(),
            "Loaded component bond dictionary from CSV."
        );
        Ok(dictionary)
    }

    /// Loads a TOML table of the form `[COMP] bonds = [{ atoms = ["C1", "C2"], order = "doub" }]`.
    pub fn load_toml(path: &Path) -> Result<Self, DictionaryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| DictionaryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let raw: HashMap<String, TomlComponent> =
            toml::from_str(&content).map_err(|e| DictionaryLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;

        let mut names: Vec<_> = raw.keys().cloned().collect();
        names.sort();
        let mut dictionary = Self::new();
        let mut key = 0;
        for name in names {
            for bond in &raw[&name].bonds {
                let (order, flags) = parse_bond_order(&bond.order, bond.aromatic);
                dictionary.add_bond(&name, &bond.atoms[0], &bond.atoms[1], order, flags, key);
                key += 1;
            }
        }
        tracing::debug!(
            components = dictionary.len(),
            path = %path.display(),
            "Loaded component bond dictionary from TOML."
        );
        Ok(dictionary)
    }
}
