pub mod pagination;
pub mod stake;

pub use pagination::{paginate, sort_by_time_desc, PageOutcome};
pub use stake::{StakeError, StakeService};
