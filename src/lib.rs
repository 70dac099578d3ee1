//! variantree: component trees for visual page building.
//!
//! Every component is derived from a master, either one of the four root
//! masters (`container`, `text`, `header`, `image`) or another component.
//! Variants inherit attributes along the master chain and mirror structural
//! edits made to their masters.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
