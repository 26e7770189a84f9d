//! The ratio pipeline: calculator → {sector aggregates, company selection}.
//!
//! Every stage is a pure function over a `Dataset`. The loader's cache runs
//! the calculator once per fetch; aggregation and selection are recomputed on
//! each render.

pub mod aggregate;
pub mod ratios;
pub mod select;

pub use aggregate::sector_aggregates;
pub use select::{SelectionState, company_ids, select_companies, validate_selection};
