//! Profile command handlers.

use wardline_core::ProfilePatch;

use crate::cli::{ProfileArgs, ProfileCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::auth::print_user;

pub async fn handle(ctx: &Context, args: ProfileArgs) -> Result<(), CliError> {
    if !ctx.session.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }

    match args.command {
        ProfileCommand::Show => {
            let user = ctx.session.fetch_profile().await?;
            print_user(ctx, &user);
            Ok(())
        }

        ProfileCommand::Update { name, email } => {
            let patch = ProfilePatch {
                name,
                email,
                ..ProfilePatch::default()
            };
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: "nothing to update; pass --name and/or --email".into(),
                });
            }

            let user = ctx.session.update_profile(&patch).await?;
            output::notice(&output::success("Profile updated", ctx.color), ctx.quiet);
            print_user(ctx, &user);
            Ok(())
        }
    }
}
