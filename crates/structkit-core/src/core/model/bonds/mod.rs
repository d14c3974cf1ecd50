pub mod component;
pub mod index_pair;
pub mod struct_conn;

use std::sync::Arc;

pub use component::{ComponentBondDictionary, ComponentBondInfo, ComponentBonds, DictionaryLoadError};
pub use index_pair::{IndexPairBond, IndexPairBonds, IndexPairEdge};
pub use struct_conn::{StructConn, StructConnEntry, StructConnKind, StructConnPartner};

/// Optional bond tables attached to a model. Shared by `Arc` so frames of the same
/// trajectory can be recognized as carrying the same table.
#[derive(Debug, Clone, Default)]
pub struct ModelBonds {
    pub index_pairs: Option<Arc<IndexPairBonds>>,
    pub struct_conn: Option<Arc<StructConn>>,
    pub component_bonds: Option<Arc<ComponentBondDictionary>>,
}
