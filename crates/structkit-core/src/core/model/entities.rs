use crate::core::chemistry::MoleculeType;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Polymer,
    NonPolymer,
    Branched,
    Water,
}

#[derive(Debug, Error)]
#[error("Invalid entity type string '{0}'")]
pub struct ParseEntityTypeError(pub String);

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polymer" => Ok(Self::Polymer),
            "non-polymer" | "nonpolymer" => Ok(Self::NonPolymer),
            "branched" => Ok(Self::Branched),
            "water" => Ok(Self::Water),
            _ => Err(ParseEntityTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub entity_type: EntityType,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct Entities {
    list: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl Entities {
    /// Inserts or replaces the entity with the same id.
    pub fn insert(&mut self, entity: Entity) {
        match self.index.get(&entity.id) {
            Some(&i) => self.list[i] = entity,
            None => {
                self.index.insert(entity.id.clone(), self.list.len());
                self.list.push(entity);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.list[i])
    }

    pub fn entity_type(&self, id: &str) -> Option<EntityType> {
        self.get(id).map(|e| e.entity_type)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChemicalComponent {
    pub id: String,
    /// Component type string such as `"L-PEPTIDE LINKING"` or `"NON-POLYMER"`.
    pub comp_type: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChemicalComponentMap {
    map: HashMap<String, ChemicalComponent>,
}

impl ChemicalComponentMap {
    pub fn insert(&mut self, component: ChemicalComponent) {
        self.map.insert(component.id.clone(), component);
    }

    pub fn get(&self, id: &str) -> Option<&ChemicalComponent> {
        self.map.get(id)
    }

    pub fn molecule_type(&self, comp_id: &str) -> MoleculeType {
        MoleculeType::classify(comp_id, self.get(comp_id).map(|c| c.comp_type.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
