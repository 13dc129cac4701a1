use anyhow::{format_err, Error};
use chrono::{NaiveDate, NaiveDateTime};
use gdrive_lib::drive_v3_types::Revision;
use log::warn;

const RFC3339_NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an RFC3339 timestamp into a naive date time, dropping fractional
/// seconds and timezone: `2016-08-15T07:05:04.000Z` -> 2016-08-15 07:05:04.
pub fn parse_rfc3339_naive(s: &str) -> Result<NaiveDateTime, Error> {
    let truncated = match s.find('.') {
        Some(idx) => &s[..idx],
        None => s.get(..19).unwrap_or(s),
    };
    NaiveDateTime::parse_from_str(truncated, RFC3339_NAIVE_FORMAT)
        .map_err(|e| format_err!("Invalid timestamp {}: {}", s, e))
}

/// Cutoff given on the command line, `YYYY-MM-DD` (midnight) or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_cutoff(s: &str) -> Result<NaiveDateTime, Error> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format_err!("Invalid cutoff {}", s));
    }
    parse_rfc3339_naive(s)
}

fn revision_time(rev: &Revision) -> Option<NaiveDateTime> {
    let modified = rev.modified_time.as_ref()?;
    match parse_rfc3339_naive(modified) {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("skipping revision {:?}: {}", rev.id, e);
            None
        }
    }
}

/// The newest revision modified strictly before `cutoff`, first one wins on ties.
pub fn latest_revision_before(revisions: &[Revision], cutoff: NaiveDateTime) -> Option<&Revision> {
    let mut result: Option<(&Revision, NaiveDateTime)> = None;
    for rev in revisions {
        if let Some(t) = revision_time(rev) {
            if t < cutoff && result.map_or(true, |(_, last)| t > last) {
                result = Some((rev, t));
            }
        }
    }
    result.map(|(rev, _)| rev)
}
