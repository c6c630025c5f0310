//! Specialty listing.

use tabled::Tabled;
use wardline_core::{CoreError, Specialty};

use crate::config::Context;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SpecialtyRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Specialty> for SpecialtyRow {
    fn from(s: &Specialty) -> Self {
        Self {
            name: s.name.clone(),
            id: s.id.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let specialties = ctx
        .session
        .api()
        .list_specialties()
        .await
        .map_err(CoreError::from)?;

    let out = output::render_list(
        ctx.format,
        &specialties,
        |s| SpecialtyRow::from(s),
        |s| s.name.clone(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
