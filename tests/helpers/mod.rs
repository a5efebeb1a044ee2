mod dirs;
mod process;

pub use crate::helpers::dirs::TestDirs;
pub use crate::helpers::process::TestCommand;
