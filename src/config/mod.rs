//! Candidate list building and configuration file handling

mod candidates;
mod file;

pub use candidates::{candidate_list, Candidate, ProviderKeys};
pub use file::{ApiKeys, ConfigFile, CustomEndpoint, DisabledEndpoints, Settings};
