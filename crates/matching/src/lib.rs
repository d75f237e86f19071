pub mod engine;
pub mod groups;
pub mod normalize;

pub use engine::{find_roster_match, names_match};
pub use groups::NameGroups;
pub use normalize::normalize;
