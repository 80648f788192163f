//! Date helper functions

use anyhow::{anyhow, bail, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Locale, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::SiteConfig;

/// One piece of a parsed date-fns pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateToken {
    /// A date field such as `dd` or `MMM`
    Field(&'static str),
    /// Literal text
    Text(String),
}

/// Pattern and locale data for formatting dates in the browser
#[derive(Debug, Clone, Serialize)]
pub struct ClientDateFormat {
    pub tokens: Vec<DateToken>,
    pub timezone: String,
    pub months: Vec<String>,
    pub months_short: Vec<String>,
    /// Sunday first
    pub weekdays: Vec<String>,
    pub weekdays_short: Vec<String>,
    pub periods: Vec<String>,
}

/// Formats CMS publication timestamps for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    tokens: Vec<DateToken>,
    pattern: String,
    locale: Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Create a formatter from a date-fns style format, a language tag and an IANA timezone
    ///
    /// # Examples
    /// ```ignore
    /// DateFormatter::new("dd MMM yyyy", "pt-BR", "America/Sao_Paulo")?
    /// ```
    pub fn new(format: &str, language: &str, timezone: &str) -> Result<Self> {
        let tokens = parse_date_fns(format)?;
        let pattern = chrono_pattern(&tokens);
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            bail!("invalid date format: {:?}", format);
        }

        let timezone = if timezone.is_empty() {
            Tz::UTC
        } else {
            timezone
                .parse::<Tz>()
                .map_err(|e| anyhow!("unknown timezone {:?}: {}", timezone, e))?
        };

        Ok(Self {
            tokens,
            pattern,
            locale: chrono_locale(language),
            timezone,
        })
    }

    /// Create a formatter from the site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(&config.date_format, &config.language, &config.timezone)
    }

    /// Format a parsed timestamp
    pub fn format(&self, date: &DateTime<FixedOffset>) -> String {
        date.with_timezone(&self.timezone)
            .format_localized(&self.pattern, self.locale)
            .to_string()
    }

    /// Parse and format a raw CMS timestamp; unparseable input yields `None`
    pub fn format_timestamp(&self, raw: &str) -> Option<String> {
        match parse_timestamp(raw) {
            Some(date) => Some(self.format(&date)),
            None => {
                tracing::debug!("Unparseable publication date: {:?}", raw);
                None
            }
        }
    }

    /// The same format as data for a client-side formatter
    pub fn client_format(&self) -> ClientDateFormat {
        let month = |fmt: &str| -> Vec<String> {
            (1..=12)
                .filter_map(|m| Utc.with_ymd_and_hms(2021, m, 1, 12, 0, 0).single())
                .map(|d| d.format_localized(fmt, self.locale).to_string())
                .collect()
        };
        // 2021-03-07 is a Sunday
        let weekday = |fmt: &str| -> Vec<String> {
            (7..14)
                .filter_map(|d| Utc.with_ymd_and_hms(2021, 3, d, 12, 0, 0).single())
                .map(|d| d.format_localized(fmt, self.locale).to_string())
                .collect()
        };
        let periods = [0, 12]
            .into_iter()
            .filter_map(|h| Utc.with_ymd_and_hms(2021, 3, 7, h, 0, 0).single())
            .map(|d| d.format_localized("%p", self.locale).to_string())
            .collect();

        ClientDateFormat {
            tokens: self.tokens.clone(),
            timezone: self.timezone.name().to_string(),
            months: month("%B"),
            months_short: month("%b"),
            weekdays: weekday("%A"),
            weekdays_short: weekday("%a"),
            periods,
        }
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        let tokens = vec![
            DateToken::Field("dd"),
            DateToken::Text(" ".to_string()),
            DateToken::Field("MMM"),
            DateToken::Text(" ".to_string()),
            DateToken::Field("yyyy"),
        ];
        Self {
            pattern: chrono_pattern(&tokens),
            tokens,
            locale: Locale::en_US,
            timezone: Tz::UTC,
        }
    }
}

/// Parse a timestamp as RFC 3339 or in the `+0000` offset form the CMS emits
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Map a BCP 47 language tag onto a chrono locale
fn chrono_locale(language: &str) -> Locale {
    match language.replace('-', "_").as_str() {
        "pt" | "pt_BR" => Locale::pt_BR,
        "pt_PT" => Locale::pt_PT,
        "es" | "es_ES" => Locale::es_ES,
        "fr" | "fr_FR" => Locale::fr_FR,
        "de" | "de_DE" => Locale::de_DE,
        "en_GB" => Locale::en_GB,
        _ => Locale::en_US,
    }
}

/// Split a date-fns format into fields and literal text, left to right.
///
/// A field is a run of one letter. Text inside single quotes is literal and
/// `''` is a quote. Unquoted letters that are not a known field are rejected.
fn parse_date_fns(format: &str) -> Result<Vec<DateToken>> {
    let chars: Vec<char> = format.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                text.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            loop {
                match chars.get(j).copied() {
                    None => bail!("unterminated quote in date format: {:?}", format),
                    Some('\'') if chars.get(j + 1) == Some(&'\'') => {
                        text.push('\'');
                        j += 2;
                    }
                    Some('\'') => break,
                    Some(q) => {
                        text.push(q);
                        j += 1;
                    }
                }
            }
            i = j + 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            text.push(c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let field = date_fns_field(c, run).ok_or_else(|| {
            anyhow!(
                "unsupported token {:?} in date format {:?}",
                c.to_string().repeat(run),
                format
            )
        })?;
        if !text.is_empty() {
            tokens.push(DateToken::Text(std::mem::take(&mut text)));
        }
        tokens.push(DateToken::Field(field));
        i += run;
    }

    if !text.is_empty() {
        tokens.push(DateToken::Text(text));
    }
    Ok(tokens)
}

/// Normalized field name for a run of `letter`
fn date_fns_field(letter: char, run: usize) -> Option<&'static str> {
    let field = match (letter, run) {
        ('y', 2) => "yy",
        ('y', 1 | 3 | 4) => "yyyy",
        ('M', 4) => "MMMM",
        ('M', 3) => "MMM",
        ('M', 2) => "MM",
        ('M', 1) => "M",
        ('d', 2) => "dd",
        ('d', 1) => "d",
        ('E', 4) => "EEEE",
        ('E', 1..=3) => "EEE",
        ('H', 2) => "HH",
        ('H', 1) => "H",
        ('h', 2) => "hh",
        ('h', 1) => "h",
        ('m', 2) => "mm",
        ('m', 1) => "m",
        ('s', 2) => "ss",
        ('s', 1) => "s",
        ('a', 1..=3) => "a",
        _ => return None,
    };
    Some(field)
}

/// Render tokens as a chrono format string
fn chrono_pattern(tokens: &[DateToken]) -> String {
    tokens
        .iter()
        .map(|token| match token {
            DateToken::Text(text) => text.replace('%', "%%"),
            DateToken::Field(field) => match *field {
                "yyyy" => "%Y",
                "yy" => "%y",
                "MMMM" => "%B",
                "MMM" => "%b",
                "MM" => "%m",
                "M" => "%-m",
                "dd" => "%d",
                "d" => "%-d",
                "EEEE" => "%A",
                "EEE" => "%a",
                "HH" => "%H",
                "H" => "%-H",
                "hh" => "%I",
                "h" => "%-I",
                "mm" => "%M",
                "m" => "%-M",
                "ss" => "%S",
                "s" => "%-S",
                _ => "%p",
            }
            .to_string(),
        })
        .collect()
}
