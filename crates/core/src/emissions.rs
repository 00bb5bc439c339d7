//! Emission reference table.
//!
//! Maps each product category to the materials it recognises and to a
//! reference emission intensity per material (kg CO2e per kg). The material
//! order of a category fixes the column layout of composition vectors, so the
//! table keeps declaration order everywhere and never sorts.
//!
//! Intensities are reference data only: the matching algorithm reads the
//! material names, not the intensity values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::category::Category;
use crate::errors::RecommendError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialEmission {
    pub name: String,
    pub intensity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryEmissions {
    pub name: Category,
    #[serde(default)]
    pub materials: Vec<MaterialEmission>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionTable {
    #[serde(default, rename = "category")]
    categories: Vec<CategoryEmissions>,
}

#[derive(Debug, Error)]
pub enum EmissionTableError {
    #[error("could not read emission table `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse emission table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("emission table is invalid: {0}")]
    Validation(String),
}

/// Ordered, deduplicated material names of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialVocabulary {
    materials: Vec<String>,
}

impl MaterialVocabulary {
    /// Builds a vocabulary, normalising names the same way composition text
    /// is normalised and dropping later duplicates.
    pub fn new<I, S>(materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for material in materials {
            let name = material.as_ref().trim().to_lowercase();
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        Self { materials: ordered }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.materials.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.materials
    }
}

impl EmissionTable {
    /// The built-in table for the categories the catalog ships with.
    pub fn reference() -> Self {
        Self {
            categories: vec![
                category(
                    "clothing",
                    &[("cotton", 5.9), ("polyester", 9.5), ("leather", 65.0), ("faux leather", 15.8)],
                ),
                category(
                    "kitchenware",
                    &[
                        ("stainless steel", 6.15),
                        ("aluminum", 18.5),
                        ("polypropylene", 2.3),
                        ("silicone", 3.28),
                        ("glass", 2.25),
                    ],
                ),
            ],
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, EmissionTableError> {
        let table = toml::from_str::<Self>(raw)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, EmissionTableError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| EmissionTableError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Reference table with the categories of `path` merged over it.
    pub fn reference_with_overrides(path: Option<&Path>) -> Result<Self, EmissionTableError> {
        let mut table = Self::reference();
        if let Some(path) = path {
            table.merge(Self::load(path)?);
        }
        Ok(table)
    }

    /// Replaces categories that already exist and appends new ones, keeping
    /// the position of replaced categories.
    pub fn merge(&mut self, other: EmissionTable) {
        for incoming in other.categories {
            match self.categories.iter_mut().find(|existing| existing.name == incoming.name) {
                Some(existing) => *existing = incoming,
                None => self.categories.push(incoming),
            }
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().map(|entry| &entry.name)
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.entry(category).is_some()
    }

    pub fn vocabulary(&self, category: &Category) -> Result<MaterialVocabulary, RecommendError> {
        self.entry(category)
            .map(|entry| MaterialVocabulary::new(entry.materials.iter().map(|m| m.name.as_str())))
            .ok_or_else(|| RecommendError::UnknownCategory(category.to_string()))
    }

    pub fn intensity(&self, category: &Category, material: &str) -> Option<f64> {
        let material = material.trim().to_lowercase();
        self.entry(category)?
            .materials
            .iter()
            .find(|entry| entry.name.trim().to_lowercase() == material)
            .map(|entry| entry.intensity)
    }

    fn entry(&self, category: &Category) -> Option<&CategoryEmissions> {
        self.categories.iter().find(|entry| &entry.name == category)
    }

    fn validate(&self) -> Result<(), EmissionTableError> {
        for entry in &self.categories {
            if entry.name.as_str().is_empty() {
                return Err(EmissionTableError::Validation(
                    "category name must not be empty".to_string(),
                ));
            }
            if entry.materials.is_empty() {
                return Err(EmissionTableError::Validation(format!(
                    "category `{}` declares no materials",
                    entry.name
                )));
            }
            if let Some(material) = entry
                .materials
                .iter()
                .find(|m| m.name.trim().is_empty() || !m.intensity.is_finite() || m.intensity < 0.0)
            {
                return Err(EmissionTableError::Validation(format!(
                    "category `{}` has an invalid material entry `{}` ({})",
                    entry.name, material.name, material.intensity
                )));
            }
        }
        Ok(())
    }
}

fn category(name: &str, materials: &[(&str, f64)]) -> CategoryEmissions {
    CategoryEmissions {
        name: Category::new(name),
        materials: materials
            .iter()
            .map(|(material, intensity)| MaterialEmission {
                name: (*material).to_string(),
                intensity: *intensity,
            })
            .collect(),
    }
}
