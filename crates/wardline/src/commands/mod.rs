//! Command dispatch: bridges CLI args -> session / query operations -> output.

pub mod auth;
pub mod config_cmd;
pub mod hospitals;
pub mod profile;
pub mod specialties;
pub mod util;

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Register(args) => auth::register(ctx, args).await,
        Command::Logout => auth::logout(ctx).await,
        Command::Whoami => auth::whoami(ctx),
        Command::Profile(args) => profile::handle(ctx, args).await,
        Command::Hospitals(args) => hospitals::handle(ctx, args).await,
        Command::Specialties => specialties::handle(ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
