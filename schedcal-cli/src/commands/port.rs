use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use schedcal_core::Event;
use schedcal_core::config::SchedcalConfig;
use schedcal_core::export::{EventPayload, export_events};
use schedcal_core::pick::{PickMode, pick_events};
use schedcal_core::schedule::{FileSource, HttpSource, load_schedule};
use schedcal_core::slot::group_slots;
use schedcal_provider_google::{CALENDAR_WEB_URL, GoogleCalendar};

use crate::prompt::TerminalSurface;
use crate::render::{Render, pluralize};
use crate::utils::tui::create_spinner;

/// Command-line overrides for a single run.
pub struct PortArgs {
    pub calendar: Option<String>,
    pub take_all: bool,
    pub access_token: Option<String>,
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub insecure: bool,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

pub async fn run(args: PortArgs) -> Result<()> {
    let mut config = SchedcalConfig::load_from(args.config.as_deref())?;
    if let Some(calendar) = args.calendar {
        config.calendar = calendar;
    }
    if let Some(url) = args.url {
        config.schedule_url = url;
    }
    config.insecure |= args.insecure;

    let access_token = args.access_token.or_else(|| config.access_token.clone());
    let access_token = match (access_token, args.dry_run) {
        (Some(token), _) => Some(token),
        (None, true) => None,
        (None, false) => anyhow::bail!(
            "No access token configured.\n\n\
            Pass one with:\n  \
            schedcal --access-token <TOKEN>\n\n\
            or set SCHEDCAL_ACCESS_TOKEN, or run with --dry-run to preview."
        ),
    };

    let events = fetch_events(&config, args.file).await?;
    if events.is_empty() {
        println!("The schedule has no talks.");
        return Ok(());
    }

    let slots = group_slots(&events);
    tracing::debug!(events = events.len(), slots = slots.len(), "grouped schedule");
    let mode = if args.take_all {
        PickMode::TakeAll
    } else {
        PickMode::Interactive
    };
    let selection = pick_events(&slots, mode, &mut TerminalSurface::new())?;

    if selection.is_empty() {
        println!("No events selected.");
        return Ok(());
    }

    let venue = config.venue();

    let Some(access_token) = access_token.filter(|_| !args.dry_run) else {
        println!(
            "Would add {} {} to {}:",
            selection.len(),
            pluralize("event", selection.len()),
            config.calendar.bold()
        );
        for event in &selection {
            println!("  {}", EventPayload::from_event(event, &venue).render());
        }
        return Ok(());
    };

    let google = GoogleCalendar::new(access_token)?;
    let spinner = create_spinner(format!(
        "Adding {} {} to {}",
        selection.len(),
        pluralize("event", selection.len()),
        config.calendar
    ));
    let result = export_events(&google, &config.calendar, &selection, &venue).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(failure) => {
            if !failure.created.is_empty() {
                eprintln!(
                    "{}",
                    format!(
                        "Added {} {} before the failure",
                        failure.created.len(),
                        pluralize("event", failure.created.len())
                    )
                    .yellow()
                );
            }
            return Err(failure).context("Could not add events to Google Calendar");
        }
    };

    println!(
        "{} {} {}",
        "Added".green(),
        report.event_ids.len(),
        pluralize("event", report.event_ids.len())
    );
    println!("All the events have been added to: {}", report.calendar_id);
    println!("You can check your calendar at: {CALENDAR_WEB_URL}");

    Ok(())
}

async fn fetch_events(config: &SchedcalConfig, file: Option<PathBuf>) -> Result<Vec<Event>> {
    match file {
        Some(path) => {
            let source = FileSource::new(&path);
            load_schedule(&source)
                .await
                .with_context(|| format!("Could not read schedule from {}", path.display()))
        }
        None => {
            let source = HttpSource::new(&config.schedule_url, &config.fetch_options())?;
            let spinner = create_spinner(format!("Fetching {}", config.schedule_url));
            let result = load_schedule(&source).await;
            spinner.finish_and_clear();
            result.with_context(|| format!("Could not load schedule from {}", config.schedule_url))
        }
    }
}
