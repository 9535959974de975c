mod candidate;
mod facet;

pub use candidate::{Neighbor, PopularityRow, RankedCandidate, RatingRecord};
pub use facet::{Facet, FacetVectors, FacetWeights};
