mod args;

pub use args::{Cli, Command, DeployArgs, ReconcileArgs, TargetArgs};
