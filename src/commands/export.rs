use super::{with_notice, CommandContext, CommandResult};
use crate::components::calendar_view::google_calendar_link;
use crate::components::ics::time::format_event_when;
use crate::components::ics::{export_file, CalendarEvent, ExportEvent};
use crate::error::{export_error, CalendarResult};
use rust_i18n::t;
use std::path::Path;
use tracing::info;

/// Write one event to an `.ics` file in `out_dir`
pub async fn export(ctx: &CommandContext, id: &str, out_dir: &Path) -> CommandResult {
    let tz = ctx.tz().await?;
    let load = ctx.feed_handle().await?.load().await?;
    let event = find_event(&load.events, id)?;

    let export_event = ExportEvent::from_calendar_event(event, &tz)
        .ok_or_else(|| export_error(&format!("Event {} has no start time", id)))?;
    let file = export_file(&export_event, &tz)?;
    let path = file.write_to(out_dir).await?;
    info!("Exported {} to {}", id, path.display());

    let body = t!("export_written", path = path.display().to_string()).to_string();
    Ok(with_notice(&load, body))
}

/// Google Calendar link for one event
pub async fn link(ctx: &CommandContext, id: &str) -> CommandResult {
    let tz = ctx.tz().await?;
    let load = ctx.feed_handle().await?.load().await?;
    let event = find_event(&load.events, id)?;

    let body = format!(
        "{}\n{}\n\n{}",
        event.title,
        format_event_when(event, &tz),
        google_calendar_link(event, &tz)
    );
    Ok(with_notice(&load, body))
}

fn find_event<'a>(events: &'a [CalendarEvent], id: &str) -> CalendarResult<&'a CalendarEvent> {
    events
        .iter()
        .find(|event| event.id == id)
        .ok_or_else(|| export_error(&t!("event_not_found", id = id)))
}
