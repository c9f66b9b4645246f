//! Fixtree: Seeded Fixture Generation over Type Node Graphs
//!
//! Builds test fixtures by walking a graph of typed nodes: candidate
//! generators propose child positions, promoters bind each position to a
//! concrete node (resolving sealed hierarchies, tagged unions and interfaces
//! along the way), and every random decision is derived from the session seed
//! and the node's path, so a seed reproduces the same instances.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod leaf;
pub mod logging;
pub mod node;
pub mod resolver;
pub mod seed;
pub mod sequence;
pub mod types;
pub mod validate;
pub mod value;
