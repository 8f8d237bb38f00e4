mod cli;
mod state;

pub use cli::{TerraformCli, TerraformError};
pub use state::{ImportError, StateStore};
