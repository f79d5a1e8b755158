use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

type Description = &'static [BorrowedFormatItem<'static>];

#[derive(Error, Debug)]
pub enum DateParseError {
    #[error("empty date string")]
    Empty,
    #[error("cannot parse {input:?}: {source}")]
    Unrecognized {
        input: String,
        #[source]
        source: time::error::Parse,
    },
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    /// The input carries its own UTC offset.
    Zoned(Description),
    Rfc3339,
    /// Wall-clock date and time, read as UTC.
    Naive(Description),
    /// Date without a time of day, read as midnight UTC.
    DateOnly(Description),
}

/// One accepted textual timestamp format.
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub name: &'static str,
    shape: Shape,
}

impl Layout {
    const fn new(name: &'static str, shape: Shape) -> Self {
        Self { name, shape }
    }

    fn parse(&self, input: &str) -> Result<OffsetDateTime, time::error::Parse> {
        let parsed = match self.shape {
            Shape::Zoned(description) => OffsetDateTime::parse(input, description)?,
            Shape::Rfc3339 => OffsetDateTime::parse(input, &Rfc3339)?,
            Shape::Naive(description) => PrimitiveDateTime::parse(input, description)?.assume_utc(),
            Shape::DateOnly(description) => Date::parse(input, description)?.midnight().assume_utc(),
        };
        Ok(parsed.to_offset(UtcOffset::UTC))
    }
}

/// Accepted layouts in priority order. The first one that parses wins, so a
/// new device format is added by inserting a row at the right position.
///
/// Hours may be one or two digits, and any layout ending in seconds also
/// takes an optional fraction.
pub static LAYOUTS: &[Layout] = &[
    // `+0000` is literal text here; other offsets in this shape are not accepted
    Layout::new(
        "date-minute-utc-suffix",
        Shape::Naive(format_description!("[year]-[month]-[day] [hour padding:none]:[minute] +0000")),
    ),
    Layout::new(
        "iso-t-zulu",
        Shape::Naive(format_description!(
            "[year]-[month]-[day]T[hour padding:none]:[minute]:[second][optional [.[subsecond]]]Z"
        )),
    ),
    Layout::new(
        "iso-t-local",
        Shape::Naive(format_description!(
            "[year]-[month]-[day]T[hour padding:none]:[minute]:[second][optional [.[subsecond]]]"
        )),
    ),
    Layout::new("rfc3339", Shape::Rfc3339),
    Layout::new(
        "iso-space-offset",
        Shape::Zoned(format_description!(
            "[year]-[month]-[day] [hour padding:none]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]:[offset_minute]"
        )),
    ),
    Layout::new(
        "iso-space-zulu",
        Shape::Naive(format_description!(
            "[year]-[month]-[day] [hour padding:none]:[minute]:[second][optional [.[subsecond]]]Z"
        )),
    ),
    Layout::new(
        "iso-space-seconds",
        Shape::Naive(format_description!(
            "[year]-[month]-[day] [hour padding:none]:[minute]:[second][optional [.[subsecond]]]"
        )),
    ),
    Layout::new(
        "iso-space-minutes",
        Shape::Naive(format_description!("[year]-[month]-[day] [hour padding:none]:[minute]")),
    ),
    Layout::new("iso-date", Shape::DateOnly(format_description!("[year]-[month]-[day]"))),
    Layout::new(
        "dotted-seconds",
        Shape::Naive(format_description!(
            "[day].[month].[year] [hour padding:none]:[minute]:[second][optional [.[subsecond]]]"
        )),
    ),
    Layout::new(
        "dotted-minutes",
        Shape::Naive(format_description!("[day].[month].[year] [hour padding:none]:[minute]")),
    ),
    Layout::new("dotted-date", Shape::DateOnly(format_description!("[day].[month].[year]"))),
    Layout::new(
        "slashed-seconds",
        Shape::Naive(format_description!(
            "[day]/[month]/[year] [hour padding:none]:[minute]:[second][optional [.[subsecond]]]"
        )),
    ),
    Layout::new("slashed-date", Shape::DateOnly(format_description!("[day]/[month]/[year]"))),
    Layout::new(
        "month-name-seconds",
        Shape::Naive(format_description!(
            "[month repr:short case_sensitive:false] [day padding:none], [year] [hour padding:none]:[minute]:[second][optional [.[subsecond]]]"
        )),
    ),
    Layout::new(
        "month-name-minutes",
        Shape::Naive(format_description!(
            "[month repr:short case_sensitive:false] [day padding:none], [year] [hour padding:none]:[minute]"
        )),
    ),
    Layout::new(
        "month-name-date",
        Shape::DateOnly(format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]")),
    ),
];

/// Parses a device-reported timestamp into a UTC instant.
///
/// # Errors
/// Returns `DateParseError::Empty` for blank input and
/// `DateParseError::Unrecognized` (carrying the last layout's error) when no
/// layout matches.
pub fn parse_date_utc(raw: &str) -> Result<OffsetDateTime, DateParseError> {
    resolve(raw).map(|(_, instant)| instant)
}

/// Like [`parse_date_utc`], but also reports which layout matched.
///
/// # Errors
/// See [`parse_date_utc`].
pub fn resolve(raw: &str) -> Result<(&'static Layout, OffsetDateTime), DateParseError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(DateParseError::Empty);
    }

    let mut last_error = None;
    for layout in LAYOUTS {
        match layout.parse(input) {
            Ok(instant) => {
                tracing::trace!(layout = layout.name, "timestamp layout matched");
                return Ok((layout, instant));
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(source) => Err(DateParseError::Unrecognized { input: input.to_string(), source }),
        None => Err(DateParseError::Empty),
    }
}
