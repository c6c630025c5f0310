//! Login, registration, logout and identity.

use serde::Serialize;
use wardline_core::{LoginRequest, Registration, User};

use crate::cli::{LoginArgs, RegisterArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

/// Serializable view of a user for structured output.
#[derive(Serialize)]
pub struct UserView<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(u: &'a User) -> Self {
        Self {
            id: &u.id,
            name: &u.name,
            email: u.email.as_deref(),
            role: u.role.as_deref(),
        }
    }
}

pub fn user_detail(u: &UserView<'_>) -> String {
    output::detail_lines(&[
        ("Name", u.name.to_owned()),
        ("Email", u.email.unwrap_or_default().to_owned()),
        ("Role", u.role.unwrap_or_default().to_owned()),
        ("ID", u.id.to_owned()),
    ])
}

pub fn print_user(ctx: &Context, user: &User) {
    let view = UserView::from(user);
    let out = output::render_single(ctx.format, &view, user_detail, |u| u.id.to_owned());
    output::print_output(&out, ctx.quiet);
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<(), CliError> {
    let email = if let Some(email) = args.email {
        email
    } else {
        util::input("Email", None)?
    };
    let password = util::read_password(args.password_stdin)?;

    let user = ctx
        .session
        .login(&LoginRequest { email, password })
        .await?;

    output::notice(
        &output::success(&format!("Logged in as {}", user.name), ctx.color),
        ctx.quiet,
    );
    Ok(())
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), CliError> {
    let password = util::read_password(args.password_stdin)?;

    let user = ctx
        .session
        .register(&Registration {
            name: args.name,
            email: args.email,
            password,
            role: args.role,
        })
        .await?;

    output::notice(
        &output::success(&format!("Account created; logged in as {}", user.name), ctx.color),
        ctx.quiet,
    );
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    if !ctx.session.is_authenticated() {
        output::notice("Not logged in", ctx.quiet);
        return Ok(());
    }
    ctx.session.logout().await;
    output::notice(&output::success("Logged out", ctx.color), ctx.quiet);
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.session.identity().ok_or(CliError::NotLoggedIn)?;
    print_user(ctx, &user);
    Ok(())
}
