//! Built-in analyzer implementations.
//!
//! A plugin unit's `kind` field selects one of these; its `[config]` table
//! configures the constructed instance.

mod date;
pub mod grouping;
mod size;

use anyhow::Result;

pub use crate::plugin::builtin::date::FileDate;
pub use crate::plugin::builtin::grouping::Grouping;
pub use crate::plugin::builtin::size::FileSize;
use crate::plugin::{Analyzer, Kind};

/// Construct the analyzer for a plugin unit.
pub fn construct(kind: Kind, config: &toml::Table) -> Result<Box<dyn Analyzer>> {
    Ok(match kind {
        Kind::FileDate => Box::new(FileDate::from_config(config)?),
        Kind::FileSize => Box::new(FileSize::from_config(config)?),
        Kind::Grouping => Box::new(Grouping::from_config(config)?),
    })
}
