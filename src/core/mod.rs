// Core algorithm exports
pub mod distance;
pub mod matcher;
pub mod proximity;
pub mod scoring;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use matcher::{MatchError, Matcher, DEFAULT_RADIUS_KM};
pub use proximity::{within_radius, Locatable};
pub use scoring::{calculate_match_score, PreferenceWeight};
