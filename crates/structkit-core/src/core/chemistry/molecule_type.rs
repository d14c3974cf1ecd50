use super::identifiers::{
    is_amino_acid_name, is_dna_name, is_ion_name, is_rna_name, is_saccharide_name, is_water_name,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoleculeType {
    #[default]
    Unknown,
    Water,
    Ion,
    Protein,
    Rna,
    Dna,
    Saccharide,
    Other,
}

impl MoleculeType {
    /// Classifies a residue by its chemical component type, falling back to the name tables.
    ///
    /// `comp_type` is the component's type string (e.g. `"L-PEPTIDE LINKING"`,
    /// `"RNA LINKING"`, `"D-SACCHARIDE"`), matched case-insensitively.
    pub fn classify(comp_id: &str, comp_type: Option<&str>) -> Self {
        if is_water_name(comp_id) {
            return MoleculeType::Water;
        }
        if let Some(kind) = comp_type.and_then(Self::from_component_type) {
            return kind;
        }
        Self::from_name(comp_id)
    }

    fn from_component_type(comp_type: &str) -> Option<Self> {
        let t = comp_type.trim().to_ascii_uppercase();
        if t.is_empty() || t == "?" {
            return None;
        }
        if t.contains("PEPTIDE") {
            Some(MoleculeType::Protein)
        } else if t.contains("DNA") {
            Some(MoleculeType::Dna)
        } else if t.contains("RNA") {
            Some(MoleculeType::Rna)
        } else if t.contains("SACCHARIDE") {
            Some(MoleculeType::Saccharide)
        } else if t == "NON-POLYMER" || t == "OTHER" {
            None
        } else {
            Some(MoleculeType::Other)
        }
    }

    pub fn from_name(comp_id: &str) -> Self {
        if is_water_name(comp_id) {
            MoleculeType::Water
        } else if is_ion_name(comp_id) {
            MoleculeType::Ion
        } else if is_amino_acid_name(comp_id) {
            MoleculeType::Protein
        } else if is_dna_name(comp_id) {
            MoleculeType::Dna
        } else if is_rna_name(comp_id) {
            MoleculeType::Rna
        } else if is_saccharide_name(comp_id) {
            MoleculeType::Saccharide
        } else if comp_id.trim().is_empty() {
            MoleculeType::Unknown
        } else {
            MoleculeType::Other
        }
    }

    pub fn is_polymer(self) -> bool {
        matches!(
            self,
            MoleculeType::Protein | MoleculeType::Rna | MoleculeType::Dna
        )
    }

    pub fn is_nucleic(self) -> bool {
        matches!(self, MoleculeType::Rna | MoleculeType::Dna)
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Unknown => "Unknown",
                Self::Water => "Water",
                Self::Ion => "Ion",
                Self::Protein => "Protein",
                Self::Rna => "RNA",
                Self::Dna => "DNA",
                Self::Saccharide => "Saccharide",
                Self::Other => "Other",
            }
        )
    }
}
