use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-breaking hyphen found in some catalog product names.
const NON_BREAKING_HYPHEN: char = '\u{2011}';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog row as supplied by a product store. Immutable for the
/// duration of a recommendation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub subcategory: String,
    /// Free text of the form `"cotton:60, polyester:40"`.
    pub material_composition: String,
    /// kg CO2e.
    pub ghg_emission: f64,
}

impl Product {
    pub fn display_name(&self) -> String {
        sanitize_display_name(&self.name)
    }
}

/// Output-only cleanup of product names; never used for matching.
pub fn sanitize_display_name(name: &str) -> String {
    name.replace(NON_BREAKING_HYPHEN, "-")
}
