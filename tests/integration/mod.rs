//! Integration tests for fixture generation

mod cli_route;
mod config_loading;
mod declared_subtypes;
mod depth_guard;
mod determinism;
mod generics;
mod promoter_priority;
mod retry_loop;
mod sealed_resolution;
mod sequence_pool;
mod test_utils;
