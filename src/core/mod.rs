// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod fuzzy;
pub mod matcher;
pub mod ranking;
pub mod scoring;

pub use distance::{bounding_box, calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box};
pub use filters::{BoundingBoxSource, Candidate};
pub use fuzzy::{fuzzy_rank, levenshtein, NameSearchSource, Named};
pub use matcher::{Matcher, MatcherConfig, NearbyQuery};
pub use ranking::{paginate, rank, rank_page, Rated};
pub use scoring::{courier_score, select_best_courier};
