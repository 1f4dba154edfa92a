//! Cell value formatting.
//!
//! Columns turn cell data into text with an optional printf-style format
//! (`"%.2f"`, `"%05d"`, `"$%s"`) and an optional strftime-style time format.
//! Without a format every type has a default rendering: integers in decimal,
//! floats in their shortest round-trip form, times in the configured
//! date-time format shifted to the client's timezone.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use regex::{Captures, Regex};

use horizon_tabula_core::{TabulaConfig, Value};

/// What a formatter needs to know about the page and request.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    pub config: &'a TabulaConfig,
    /// Client timezone, minutes east of UTC.
    pub timezone_offset: i32,
}

impl<'a> FormatContext<'a> {
    pub fn new(config: &'a TabulaConfig, timezone_offset: i32) -> Self {
        Self {
            config,
            timezone_offset,
        }
    }

    fn local_time(&self, time: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset =
            FixedOffset::east_opt(self.timezone_offset.saturating_mul(60)).unwrap_or(Utc.fix());
        time.with_timezone(&offset)
    }
}

/// Produce cell text from a value.
pub fn apply_format(
    value: &Value,
    format: Option<&str>,
    time_format: Option<&str>,
    ctx: &FormatContext<'_>,
) -> String {
    if let Value::Time(time) = value {
        let local = ctx.local_time(*time);
        let pattern = time_format.unwrap_or(&ctx.config.datetime_format);
        let text = local.format(pattern).to_string();
        return match format {
            Some(format) => sprintf(format, &Value::String(text)),
            None => text,
        };
    }
    match format {
        Some(format) => sprintf(format, value),
        None => value.to_string(),
    }
}

fn verb_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"%([-+ 0#]*)(\d+)?(?:\.(\d+))?([svdfeExXobtq%])")
            .expect("format verb pattern is valid")
    })
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Format a single value with a printf-style format string.
///
/// Every verb in the format consumes the same value, so `"%d (%x)"` renders
/// a number twice. Supported verbs: `%s %v %d %f %e %E %x %X %o %b %t %q %%`.
pub fn sprintf(format: &str, value: &Value) -> String {
    verb_pattern()
        .replace_all(format, |caps: &Captures<'_>| {
            let verb = caps.get(4).map_or("", |m| m.as_str());
            if verb == "%" {
                return "%".to_string();
            }
            let flags = caps.get(1).map_or("", |m| m.as_str());
            let spec = Spec {
                left: flags.contains('-'),
                plus: flags.contains('+'),
                space: flags.contains(' '),
                zero: flags.contains('0'),
                alternate: flags.contains('#'),
                width: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                precision: caps.get(3).and_then(|m| m.as_str().parse().ok()),
            };
            format_verb(verb, &spec, value)
        })
        .into_owned()
}

fn format_verb(verb: &str, spec: &Spec, value: &Value) -> String {
    let (body, numeric) = match verb {
        "d" => match value.as_i64() {
            Some(i) => (signed(i.to_string(), spec), true),
            None => match value.as_f64() {
                Some(f) => (signed(format!("{}", f.trunc() as i64), spec), true),
                None => (value.to_string(), false),
            },
        },
        "f" => match value.as_f64() {
            Some(f) => (signed(format!("{:.*}", spec.precision.unwrap_or(6), f), spec), true),
            None => (value.to_string(), false),
        },
        "e" | "E" => match value.as_f64() {
            Some(f) => {
                let text = exponent(f, spec.precision.unwrap_or(6));
                let text = if verb == "E" { text.to_uppercase() } else { text };
                (signed(text, spec), true)
            }
            None => (value.to_string(), false),
        },
        "x" | "X" | "o" | "b" => match value.as_i64() {
            Some(i) => {
                let magnitude = i.unsigned_abs();
                let mut digits = match verb {
                    "x" => format!("{magnitude:x}"),
                    "X" => format!("{magnitude:X}"),
                    "o" => format!("{magnitude:o}"),
                    _ => format!("{magnitude:b}"),
                };
                if spec.alternate {
                    let prefix = match verb {
                        "x" => "0x",
                        "X" => "0X",
                        "o" => "0",
                        _ => "",
                    };
                    digits.insert_str(0, prefix);
                }
                if i < 0 {
                    digits.insert(0, '-');
                }
                (signed(digits, spec), true)
            }
            None => match (verb, value) {
                ("x", Value::String(s)) => (s.bytes().map(|b| format!("{b:02x}")).collect(), false),
                ("X", Value::String(s)) => (s.bytes().map(|b| format!("{b:02X}")).collect(), false),
                _ => (value.to_string(), false),
            },
        },
        "t" => (
            value
                .as_bool()
                .map_or_else(|| value.to_string(), |b| b.to_string()),
            false,
        ),
        "q" => (format!("{:?}", truncate(&value.to_string(), spec.precision)), false),
        _ => (truncate(&value.to_string(), spec.precision), false),
    };
    pad(body, spec, numeric)
}

fn signed(text: String, spec: &Spec) -> String {
    if text.starts_with('-') {
        text
    } else if spec.plus {
        format!("+{text}")
    } else if spec.space {
        format!(" {text}")
    } else {
        text
    }
}

fn exponent(value: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, value);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => text,
    }
}

fn truncate(text: &str, precision: Option<usize>) -> String {
    match precision {
        Some(max) => text.chars().take(max).collect(),
        None => text.to_string(),
    }
}

fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let Some(width) = spec.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;
    if spec.left {
        format!("{body}{}", " ".repeat(fill))
    } else if spec.zero && numeric {
        // Zeros go after the sign.
        let (sign, digits) = match body.chars().next() {
            Some(c @ ('-' | '+' | ' ')) => (c.to_string(), body[1..].to_string()),
            _ => (String::new(), body),
        };
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{body}", " ".repeat(fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx(config: &TabulaConfig) -> FormatContext<'_> {
        FormatContext::new(config, 0)
    }

    #[test]
    fn test_defaults_per_type() {
        let config = TabulaConfig::default();
        let ctx = ctx(&config);
        assert_eq!(apply_format(&Value::Int(1234), None, None, &ctx), "1234");
        assert_eq!(apply_format(&Value::Float(0.1), None, None, &ctx), "0.1");
        assert_eq!(apply_format(&Value::from("x"), None, None, &ctx), "x");
        assert_eq!(apply_format(&Value::Null, None, None, &ctx), "");
    }

    #[test]
    fn test_time_default_and_timezone() {
        let config = TabulaConfig::default();
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        let utc = FormatContext::new(&config, 0);
        assert_eq!(
            apply_format(&Value::Time(time), None, None, &utc),
            "2024-03-09 23:30:00"
        );

        let lisbon_summer = FormatContext::new(&config, 60);
        assert_eq!(
            apply_format(&Value::Time(time), None, Some("%Y-%m-%d"), &lisbon_summer),
            "2024-03-10"
        );

        assert_eq!(
            apply_format(&Value::Time(time), Some("[%s]"), Some("%H:%M"), &utc),
            "[23:30]"
        );
    }

    #[test]
    fn test_sprintf_numbers() {
        assert_eq!(sprintf("%d", &Value::Int(42)), "42");
        assert_eq!(sprintf("%05d", &Value::Int(-42)), "-0042");
        assert_eq!(sprintf("%+d", &Value::Int(7)), "+7");
        assert_eq!(sprintf("%.2f", &Value::Float(3.14159)), "3.14");
        assert_eq!(sprintf("%8.3f|", &Value::Float(2.5)), "   2.500|");
        assert_eq!(sprintf("%-6d|", &Value::Int(12)), "12    |");
        assert_eq!(sprintf("%e", &Value::Float(1500.0)), "1.500000e+03");
        assert_eq!(sprintf("%.1E", &Value::Float(0.00025)), "2.5E-04");
    }

    #[test]
    fn test_sprintf_bases() {
        assert_eq!(sprintf("%x", &Value::Int(255)), "ff");
        assert_eq!(sprintf("%#X", &Value::Int(255)), "0XFF");
        assert_eq!(sprintf("%o", &Value::Int(8)), "10");
        assert_eq!(sprintf("%b", &Value::Int(5)), "101");
        assert_eq!(sprintf("%x", &Value::from("hi")), "6869");
    }

    #[test]
    fn test_sprintf_strings() {
        assert_eq!(sprintf("$%s", &Value::from("12")), "$12");
        assert_eq!(sprintf("%.3s", &Value::from("abcdef")), "abc");
        assert_eq!(sprintf("%q", &Value::from("a\"b")), "\"a\\\"b\"");
        assert_eq!(sprintf("%t", &Value::Bool(false)), "false");
        assert_eq!(sprintf("100%%", &Value::Null), "100%");
        assert_eq!(sprintf("%5s|%-5s|", &Value::from("ab")), "   ab|ab   |");
    }

    #[test]
    fn test_sprintf_mismatched_type_falls_back() {
        assert_eq!(sprintf("%d", &Value::from("n/a")), "n/a");
        assert_eq!(sprintf("%d", &Value::Float(9.9)), "9");
    }
}
