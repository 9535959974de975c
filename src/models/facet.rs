use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{RecError, RecResult};

/// One semantic aspect of a movie with its own embedding space and index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// Title text
    Title,
    /// Synopsis / overview text
    Content,
    /// Category / genre descriptor text
    Type,
    /// Cast and crew names
    People,
}

impl Facet {
    /// All facets in the fixed order fusion consumes them
    pub const ALL: [Facet; 4] = [Facet::Title, Facet::Content, Facet::Type, Facet::People];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Title => "title",
            Facet::Content => "content",
            Facet::Type => "type",
            Facet::People => "people",
        }
    }
}

impl Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The stored embedding vectors of one movie, one per facet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetVectors {
    pub title: Vec<f32>,
    pub content: Vec<f32>,
    #[serde(rename = "type")]
    pub type_: Vec<f32>,
    pub people: Vec<f32>,
}

impl FacetVectors {
    pub fn get(&self, facet: Facet) -> &[f32] {
        match facet {
            Facet::Title => &self.title,
            Facet::Content => &self.content,
            Facet::Type => &self.type_,
            Facet::People => &self.people,
        }
    }
}

/// Per-facet weights for weighted-sum fusion
///
/// Title and cast similarity are stronger relevance signals than raw
/// synopsis similarity for this catalog, hence the default skew.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FacetWeights {
    pub title: f32,
    pub content: f32,
    #[serde(rename = "type")]
    pub type_: f32,
    pub people: f32,
}

impl Default for FacetWeights {
    fn default() -> Self {
        Self {
            title: 0.45,
            content: 0.20,
            type_: 0.10,
            people: 0.25,
        }
    }
}

impl FacetWeights {
    /// Builds a weight set, rejecting negative weights
    pub fn new(title: f32, content: f32, type_: f32, people: f32) -> RecResult<Self> {
        for (facet, w) in [
            (Facet::Title, title),
            (Facet::Content, content),
            (Facet::Type, type_),
            (Facet::People, people),
        ] {
            if w < 0.0 || !w.is_finite() {
                return Err(RecError::Configuration(format!(
                    "facet weight for '{}' must be a non-negative finite number, got {}",
                    facet, w
                )));
            }
        }
        Ok(Self {
            title,
            content,
            type_,
            people,
        })
    }

    pub fn get(&self, facet: Facet) -> f32 {
        match facet {
            Facet::Title => self.title,
            Facet::Content => self.content,
            Facet::Type => self.type_,
            Facet::People => self.people,
        }
    }
}
