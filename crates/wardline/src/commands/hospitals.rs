//! Hospital command handlers.
//!
//! `list` drives a `QueryController`: a search goes through the debounced
//! path and paging through `set_page`, exactly as an interactive view would.

use tabled::Tabled;
use wardline_core::{
    CoreError, Hospital, HospitalDraft, HospitalSource, QueryConfig, QueryController, QueryStatus,
    QueryView,
};

use crate::cli::{HospitalFields, HospitalsArgs, HospitalsCommand, OutputFormat};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Rendering ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct HospitalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Specialities")]
    speciality: String,
}

impl From<&Hospital> for HospitalRow {
    fn from(h: &Hospital) -> Self {
        Self {
            id: h.id.clone(),
            name: h.name.clone(),
            city: h.city.clone(),
            rating: h.rating.map(|r| format!("{r:.1}")).unwrap_or_default(),
            speciality: h.speciality.join(", "),
        }
    }
}

fn hospital_detail(h: &Hospital) -> String {
    output::detail_lines(&[
        ("ID", h.id.clone()),
        ("Name", h.name.clone()),
        ("City", h.city.clone()),
        ("Rating", h.rating.map(|r| format!("{r:.1}")).unwrap_or_default()),
        ("Specialities", h.speciality.join(", ")),
        ("Image", h.image.clone().unwrap_or_default()),
    ])
}

fn print_list(ctx: &Context, hospitals: &[Hospital]) {
    let out = output::render_list(
        ctx.format,
        hospitals,
        |h| HospitalRow::from(h),
        |h| h.id.clone(),
    );
    output::print_output(&out, ctx.quiet);
}

fn print_one(ctx: &Context, hospital: &Hospital) {
    let out = output::render_single(ctx.format, hospital, hospital_detail, |h| h.id.clone());
    output::print_output(&out, ctx.quiet);
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: HospitalsArgs) -> Result<(), CliError> {
    let api = ctx.session.api();

    match args.command {
        HospitalsCommand::List { search, page, all } => list(ctx, search, page, all).await,

        HospitalsCommand::Get { id } => {
            let hospital = api.get_hospital(&id).await.map_err(|e| not_found(e, &id))?;
            print_one(ctx, &hospital);
            Ok(())
        }

        HospitalsCommand::Search { query } => {
            let hospitals = api
                .search_hospitals(&query)
                .await
                .map_err(CoreError::from)?;
            if hospitals.is_empty() {
                output::notice(&format!("No hospitals match '{query}'"), ctx.quiet);
                return Ok(());
            }
            print_list(ctx, &hospitals);
            Ok(())
        }

        HospitalsCommand::Create(fields) => {
            let draft = draft_from(fields)?;
            if draft.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "a new hospital needs a name".into(),
                });
            }
            let hospital = api.create_hospital(&draft).await.map_err(CoreError::from)?;
            output::notice(
                &output::success(&format!("Created hospital {}", hospital.id), ctx.color),
                ctx.quiet,
            );
            print_one(ctx, &hospital);
            Ok(())
        }

        HospitalsCommand::Update { id, fields } => {
            let draft = draft_from(fields)?;
            let hospital = api
                .update_hospital(&id, &draft)
                .await
                .map_err(|e| not_found(e, &id))?;
            output::notice(&output::success("Hospital updated", ctx.color), ctx.quiet);
            print_one(ctx, &hospital);
            Ok(())
        }

        HospitalsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete hospital '{id}'?"), ctx.yes)? {
                return Ok(());
            }
            api.delete_hospital(&id).await.map_err(|e| not_found(e, &id))?;
            output::notice(&output::success("Hospital deleted", ctx.color), ctx.quiet);
            Ok(())
        }
    }
}

/// Attach the requested id to a 404 so the hint names the right listing.
fn not_found(err: impl Into<CoreError>, id: &str) -> CliError {
    match err.into() {
        CoreError::NotFound { .. } => CliError::NotFound {
            resource_type: "hospital".into(),
            identifier: id.into(),
            list_command: "hospitals list".into(),
        },
        other => other.into(),
    }
}

fn draft_from(fields: HospitalFields) -> Result<HospitalDraft, CliError> {
    if let Some(ref path) = fields.from_file {
        return util::read_json_file(path);
    }
    let draft = HospitalDraft {
        name: fields.name,
        city: fields.city,
        image: fields.image,
        rating: fields.rating,
        speciality: (!fields.speciality.is_empty()).then_some(fields.speciality),
        ..HospitalDraft::default()
    };
    if let Some(r) = draft.rating.filter(|r| !(0.0..=5.0).contains(r)) {
        return Err(CliError::Validation {
            field: "rating".into(),
            reason: format!("{r} is outside 0-5"),
        });
    }
    Ok(draft)
}

// ── Paged listing ────────────────────────────────────────────────────

async fn list(
    ctx: &Context,
    search: Option<String>,
    page: u32,
    all: bool,
) -> Result<(), CliError> {
    let source = HospitalSource::new(ctx.session.api().clone(), ctx.client.search_param.clone());
    let query = QueryController::new(source, QueryConfig::from(&ctx.client));
    let spinner = util::spinner("Fetching hospitals", ctx.quiet);

    if let Some(text) = search {
        query.set_search_text(text);
    } else {
        query.refresh();
    }
    let mut view = settled(&query).await?;

    if page > 1 {
        if !query.set_page(page) {
            spinner.finish_and_clear();
            return Err(CliError::Validation {
                field: "page".into(),
                reason: format!("page {page} is out of range (1-{})", view.total_pages.max(1)),
            });
        }
        view = settled(&query).await?;
    }

    let mut hospitals: Vec<Hospital> = view.items.as_ref().clone();
    if all {
        while query.next_page() {
            spinner.set_message(format!("Fetching page {}", view.page + 1));
            view = settled(&query).await?;
            hospitals.extend(view.items.iter().cloned());
        }
    }
    spinner.finish_and_clear();

    if hospitals.is_empty() {
        let scope = view
            .applied
            .as_ref()
            .filter(|q| !q.search.trim().is_empty())
            .map(|q| format!(" in {}", q.search.trim()))
            .unwrap_or_default();
        output::notice(&format!("No hospitals found{scope}"), ctx.quiet);
        return Ok(());
    }

    print_list(ctx, &hospitals);
    if !all && ctx.format == OutputFormat::Table {
        let mut footer = format!("Page {} of {}", view.page, view.total_pages.max(1));
        if view.has_next() {
            footer.push_str(&format!(" (next: --page {})", view.page + 1));
        }
        output::notice(&output::muted(&footer, ctx.color), ctx.quiet);
    }
    Ok(())
}

/// Wait for the controller to settle and surface a failed fetch as an error.
async fn settled(query: &QueryController<HospitalSource>) -> Result<QueryView<Hospital>, CliError> {
    let view = query.settled().await;
    if view.status == QueryStatus::Error {
        return Err(CliError::FetchFailed {
            message: view
                .error_message
                .unwrap_or_else(|| "Failed to fetch hospitals".into()),
        });
    }
    Ok(view)
}
