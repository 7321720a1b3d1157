// readnext: find the articles most similar to the one you are reading.
//
// This is the library root. `similarity` holds the ranking core; the other
// modules load data, cache results, and present them.

pub mod browse;
pub mod config;
pub mod corpus;
pub mod db;
pub mod output;
pub mod pipeline;
pub mod similarity;
pub mod status;
