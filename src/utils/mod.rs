// Utilities Module
//
// Path and name helpers shared by the cache, the surface scanner and the importability filter.

pub mod name_match;
pub mod paths;
