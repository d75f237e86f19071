pub mod activity;
pub mod discovery;
pub mod lookup;
pub mod meta;
pub mod metrics;
pub mod roster;
pub mod seats;
pub mod timeparse;

pub use activity::{load_activity, ActivityRecord};
pub use discovery::{find_all, find_latest, freshness_warning, SnapshotCategory, StalenessWarning};
pub use lookup::{load_lookup, LookupUser};
pub use meta::SnapshotMeta;
pub use metrics::{load_metrics, MetricsSnapshot};
pub use roster::{flatten_names, load_roster, RosterPerson};
pub use seats::{load_seats, AssigningTeam, SeatRecord, SeatSnapshot};
