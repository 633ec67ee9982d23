use super::{with_notice, CommandContext, CommandResult};
use crate::components::calendar_view::format::{format_agenda, format_month_grid};
use crate::components::calendar_view::{events_in_month, events_in_range, events_on_date};
use crate::components::ics::time::{format_date, local_date};
use crate::error::config_error;
use chrono::{Datelike, Days, Month, NaiveDate, Utc};
use rust_i18n::t;
use tracing::debug;

/// Events from today for the given number of days
pub async fn agenda(ctx: &CommandContext, days: u32) -> CommandResult {
    let tz = ctx.tz().await?;
    let load = ctx.feed_handle().await?.load().await?;

    let from = local_date(Utc::now(), &tz);
    let to = from
        .checked_add_days(Days::new(u64::from(days.max(1) - 1)))
        .unwrap_or(NaiveDate::MAX);
    debug!("Agenda from {} to {}", from, to);

    let events = events_in_range(&load.events, from, to, &tz);
    let body = format!(
        "{}\n\n{}",
        t!("agenda_heading", from = format_date(from), to = format_date(to)),
        format_agenda(&events, &tz)
    );

    Ok(with_notice(&load, body))
}

/// Events on one date, today by default
pub async fn day(ctx: &CommandContext, date: Option<NaiveDate>) -> CommandResult {
    let tz = ctx.tz().await?;
    let load = ctx.feed_handle().await?.load().await?;

    let date = date.unwrap_or_else(|| local_date(Utc::now(), &tz));
    let events = events_on_date(&load.events, date, &tz);
    let body = format!(
        "{}\n\n{}",
        t!("day_heading", date = format_date(date)),
        format_agenda(&events, &tz)
    );

    Ok(with_notice(&load, body))
}

/// Month grid plus the month's agenda, current month by default
pub async fn month(ctx: &CommandContext, year: Option<i32>, month: Option<u32>) -> CommandResult {
    let tz = ctx.tz().await?;
    let today = local_date(Utc::now(), &tz);
    let year = year.unwrap_or_else(|| today.year());
    let month_number = month.unwrap_or_else(|| today.month());
    let month = u8::try_from(month_number)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| config_error(&format!("Invalid month: {}", month_number)))?;

    let load = ctx.feed_handle().await?.load().await?;

    let grid = format_month_grid(year, month, &load.events, &tz)
        .ok_or_else(|| config_error(&format!("Year out of range: {}", year)))?;
    let events = events_in_month(&load.events, year, month, &tz);
    let body = format!("{}\n\n{}", grid, format_agenda(&events, &tz));

    Ok(with_notice(&load, body))
}

/// Fetch the feed regardless of cache age
pub async fn refresh(ctx: &CommandContext) -> CommandResult {
    let load = ctx.feed_handle().await?.refresh().await?;
    let body = t!(
        "refresh_done",
        count = load.events.len(),
        tier = load.tier.to_string()
    )
    .to_string();

    Ok(with_notice(&load, body))
}

/// Remove the cached feed
pub async fn clear_cache(ctx: &CommandContext) -> CommandResult {
    ctx.feed_handle().await?.clear_cache().await?;
    Ok(t!("cache_cleared").to_string())
}
