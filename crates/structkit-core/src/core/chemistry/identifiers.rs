use phf::{Set, phf_set};

static WATER_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "DIS", "SOL", "TIP", "TIP3", "TIP4", "TP3", "TP3M", "SPC", "T3P",
    "T4P", "T4", "T5P", "OH2",
};

static ION_NAMES: Set<&'static str> = phf_set! {
    "NA", "K", "LI", "RB", "CS", "MG", "CA", "SR", "BA", "ZN", "FE", "FE2", "CO", "3CO", "NI",
    "3NI", "CU", "CU1", "CU3", "MN", "MN3", "CD", "HG", "PB", "AG", "AU", "PT", "CL", "BR",
    "IOD", "F", "YB", "LA", "GD", "EU", "SM", "TB", "AL", "GA", "IN", "TL", "CR", "V", "OS",
    "IR", "RU", "RH", "PD", "W", "MO", "SE", "O", "OH", "NH4", "SO4", "PO4", "NO3", "CO3",
};

static AMINO_ACID_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "SEC", "PYL", "MSE", "SEP", "TPO", "PTR",
    "HYP", "MLY", "CSO", "KCX", "ASX", "GLX", "UNK", "HID", "HIE", "HIP", "HSD", "HSE", "HSP",
    "CYX", "CYM", "ASH", "GLH", "LYN", "DAL", "DAR", "DSG", "DAS", "DCY", "DGN", "DGL", "DHI",
    "DIL", "DLE", "DLY", "MED", "DPN", "DPR", "DSN", "DTH", "DTR", "DTY", "DVA",
};

static RNA_NAMES: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "I", "N", "PSU", "5MC", "OMC", "OMG", "1MA", "2MG", "M2G", "7MG", "H2U",
};

static DNA_NAMES: Set<&'static str> = phf_set! {
    "DA", "DC", "DG", "DT", "DU", "DI", "DN", "5CM", "5IU", "8OG",
};

static SACCHARIDE_NAMES: Set<&'static str> = phf_set! {
    "GLC", "BGC", "MAN", "BMA", "GAL", "GLA", "NAG", "NDG", "FUC", "FUL", "SIA", "XYP", "XYS",
    "RIB", "FRU", "A2G", "NGA", "GCU", "BDP", "IDR", "SGN", "KDO", "RAM", "RHA", "ARA", "ARB",
};

/// Atom names that carry the polymer trace of a residue.
static PROTEIN_TRACE_NAMES: Set<&'static str> = phf_set! { "CA" };
static NUCLEIC_TRACE_NAMES: Set<&'static str> = phf_set! { "C4'", "C4*", "P" };

static POLYMER_LINK_NAMES: Set<&'static str> = phf_set! {
    "C", "N", "O3'", "O3*", "P",
};

pub fn is_water_name(comp_id: &str) -> bool {
    WATER_NAMES.contains(comp_id.trim())
}

pub fn is_ion_name(comp_id: &str) -> bool {
    ION_NAMES.contains(comp_id.trim())
}

pub fn is_amino_acid_name(comp_id: &str) -> bool {
    AMINO_ACID_NAMES.contains(comp_id.trim())
}

pub fn is_rna_name(comp_id: &str) -> bool {
    RNA_NAMES.contains(comp_id.trim())
}

pub fn is_dna_name(comp_id: &str) -> bool {
    DNA_NAMES.contains(comp_id.trim())
}

pub fn is_saccharide_name(comp_id: &str) -> bool {
    SACCHARIDE_NAMES.contains(comp_id.trim())
}

pub fn is_protein_trace_atom(atom_name: &str) -> bool {
    PROTEIN_TRACE_NAMES.contains(atom_name.trim())
}

pub fn is_nucleic_trace_atom(atom_name: &str) -> bool {
    NUCLEIC_TRACE_NAMES.contains(atom_name.trim())
}

pub fn is_trace_atom(atom_name: &str) -> bool {
    is_protein_trace_atom(atom_name) || is_nucleic_trace_atom(atom_name)
}

/// Backbone atoms that link consecutive polymer residues (peptide and phosphodiester bonds).
pub fn is_polymer_link_atom(atom_name: &str) -> bool {
    POLYMER_LINK_NAMES.contains(atom_name.trim())
}
