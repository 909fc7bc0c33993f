//! Line-oriented persistence format
//!
//! One speaker per line, fields separated by spaces:
//!
//! ```text
//! <speaker_identity> <cutoff_hz> <enabled_as_0_or_1>
//! ```
//!
//! Lines are written sorted by identity and newline-terminated.

use std::collections::btree_map::Entry;

use crate::constants::{MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::error::{CutoffError, Result};
use crate::store::{FilterMap, FilterSetting};

/// Parse a single non-empty line. `line_no` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<(String, FilterSetting)> {
    let malformed = |reason: String| CutoffError::Parse {
        line: line_no,
        reason,
    };

    let mut fields = line.split_whitespace();
    let (Some(identity), Some(cutoff), Some(enabled)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed(format!("expected 3 fields in {:?}", line)));
    };
    if fields.next().is_some() {
        return Err(malformed(format!("trailing fields in {:?}", line)));
    }

    let cutoff: i64 = cutoff
        .parse()
        .map_err(|_| malformed(format!("invalid cutoff {:?}", cutoff)))?;
    let enabled: i64 = enabled
        .parse()
        .map_err(|_| malformed(format!("invalid enabled flag {:?}", enabled)))?;

    let clamped = cutoff.clamp(MIN_CUTOFF_HZ as i64, MAX_CUTOFF_HZ as i64);
    if clamped != cutoff {
        log::warn!(
            "Cutoff {} Hz for {} on line {} out of range, using {} Hz",
            cutoff,
            identity,
            line_no,
            clamped
        );
    }

    Ok((
        identity.to_string(),
        FilterSetting::new(enabled != 0, clamped as u32),
    ))
}

/// Parse a whole settings file. Malformed lines are skipped with a warning;
/// for duplicated identities the first line wins.
pub fn parse(text: &str) -> FilterMap {
    let mut settings = FilterMap::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line, line_no) {
            Ok((identity, setting)) => match settings.entry(identity) {
                Entry::Vacant(entry) => {
                    entry.insert(setting);
                }
                Entry::Occupied(entry) => {
                    log::warn!(
                        "Duplicate entry for {} on line {}, keeping the earlier one",
                        entry.key(),
                        line_no
                    );
                }
            },
            Err(e) => log::warn!("{}; skipping", e),
        }
    }

    settings
}

pub fn format_line(identity: &str, setting: &FilterSetting) -> String {
    format!(
        "{} {} {}",
        identity,
        setting.cutoff_hz(),
        u8::from(setting.enabled())
    )
}

pub fn serialize(settings: &FilterMap) -> String {
    let mut out = String::new();
    for (identity, setting) in settings {
        out.push_str(&format_line(identity, setting));
        out.push('\n');
    }
    out
}
