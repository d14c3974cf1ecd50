use bitflags::bitflags;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// Kind flags attached to every inferred or declared bond.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BondType: u16 {
        const COVALENT = 0x01;
        const METALLIC_COORDINATION = 0x02;
        const HYDROGEN_BOND = 0x04;
        const DISULFIDE = 0x08;
        const AROMATIC = 0x10;
        /// Bond was derived from geometry rather than declared.
        const COMPUTED = 0x20;
    }
}

impl BondType {
    #[inline]
    pub fn is_covalent(self) -> bool {
        self.contains(BondType::COVALENT)
    }

    #[inline]
    pub fn is_metallic(self) -> bool {
        self.contains(BondType::METALLIC_COORDINATION)
    }
}

/// Bond order as declared by connectivity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid bond order string '{0}'")]
pub struct ParseBondOrderError(pub String);

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "s" | "sing" | "single" => Ok(Self::Single),
            "2" | "d" | "doub" | "double" => Ok(Self::Double),
            "3" | "t" | "trip" | "triple" => Ok(Self::Triple),
            "4" | "quad" | "quadruple" => Ok(Self::Quadruple),
            "ar" | "arom" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

impl BondOrder {
    /// Numeric order stored on bond edges; aromatic bonds count as order 2.
    pub fn numeric(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
            Self::Aromatic => 2,
        }
    }

    pub fn flags(self) -> BondType {
        match self {
            Self::Aromatic => BondType::COVALENT | BondType::AROMATIC,
            _ => BondType::COVALENT,
        }
    }
}

/// Parses a textual order into `(numeric order, flags)`; unknown text yields order 0.
pub fn parse_bond_order(value: &str, aromatic_flag: bool) -> (u8, BondType) {
    let (order, mut flags) = match value.parse::<BondOrder>() {
        Ok(order) => (order.numeric(), order.flags()),
        Err(_) => (0, BondType::COVALENT),
    };
    if aromatic_flag {
        flags |= BondType::AROMATIC;
    }
    (order, flags)
}
