//! Enrichment roles: each one owns a single prompt contract and fills a
//! single slot on the enriched claim. Roles never fail the pipeline; an
//! unusable response leaves the slot empty (or defaulted, for scores).

pub mod assigner;
pub mod evidence;
pub mod perspectives;
pub mod rater;
