//! printf-style formatting
//!
//! Backs the `format` operation (`12.333.format("%.2f")`) and `String#%`.
//! Supported directive syntax: `%[flags][width][.precision]conversion` with
//! flags `-`, `+`, space, `0`, `#` and conversions `s d i u f F e E g G x X o b c`.

use crate::error::{LiquefyError, LiquefyResult};
use crate::value::Value;

/// Largest width or precision a directive may ask for.
const MAX_FIELD: usize = u16::MAX as usize;

#[derive(Debug, Default)]
struct Directive {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Format `args` according to `template`.
///
/// Surplus arguments are ignored; missing ones are an error.
pub fn sprintf(template: &str, args: &[Value]) -> LiquefyResult<String> {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut index = 0usize;
    let mut next_arg = 0usize;

    while index < chars.len() {
        let ch = chars[index];
        index += 1;
        if ch != '%' {
            out.push(ch);
            continue;
        }
        if index >= chars.len() {
            return Err(LiquefyError::Format("incomplete format specifier".into()));
        }
        if chars[index] == '%' {
            out.push('%');
            index += 1;
            continue;
        }

        let mut directive = Directive::default();
        while index < chars.len() {
            match chars[index] {
                '-' => directive.left = true,
                '+' => directive.plus = true,
                ' ' => directive.space = true,
                '0' => directive.zero = true,
                '#' => directive.alt = true,
                _ => break,
            }
            index += 1;
        }
        directive.width = read_number(&chars, &mut index);
        if index < chars.len() && chars[index] == '.' {
            index += 1;
            directive.precision = Some(read_number(&chars, &mut index).unwrap_or(0));
        }
        if directive.width.is_some_and(|width| width > MAX_FIELD) {
            return Err(LiquefyError::Format("width too big".into()));
        }
        if directive.precision.is_some_and(|precision| precision > MAX_FIELD) {
            return Err(LiquefyError::Format("precision too big".into()));
        }
        let Some(&conversion) = chars.get(index) else {
            return Err(LiquefyError::Format("incomplete format specifier".into()));
        };
        index += 1;
        directive.conversion = conversion;

        let Some(arg) = args.get(next_arg) else {
            return Err(LiquefyError::Format("too few arguments".into()));
        };
        next_arg += 1;
        out.push_str(&render(&directive, arg)?);
    }

    Ok(out)
}

fn read_number(chars: &[char], index: &mut usize) -> Option<usize> {
    let start = *index;
    while *index < chars.len() && chars[*index].is_ascii_digit() {
        *index += 1;
    }
    if *index == start {
        return None;
    }
    // Saturates so an absurd field still trips the size check.
    Some(chars[start..*index].iter().fold(0usize, |n, c| {
        n.saturating_mul(10)
            .saturating_add(c.to_digit(10).unwrap_or(0) as usize)
    }))
}

fn render(d: &Directive, arg: &Value) -> LiquefyResult<String> {
    match d.conversion {
        's' => {
            let mut text = arg.to_string();
            if let Some(precision) = d.precision {
                text = text.chars().take(precision).collect();
            }
            Ok(pad(d, "", "", &text, false))
        }
        'c' => {
            let ch = match arg {
                Value::Int(code) => u32::try_from(*code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| LiquefyError::Format(format!("invalid character code {code}")))?,
                Value::Str(s) => s
                    .chars()
                    .next()
                    .ok_or_else(|| LiquefyError::Format("%c requires a character".into()))?,
                other => return Err(numeric_mismatch('c', other)),
            };
            Ok(pad(d, "", "", &ch.to_string(), false))
        }
        'd' | 'i' | 'u' => {
            let n = integer_arg(d.conversion, arg)?;
            let mut digits = n.unsigned_abs().to_string();
            if let Some(precision) = d.precision {
                digits = format!("{digits:0>precision$}");
            }
            Ok(pad(d, sign(d, n < 0), "", &digits, d.precision.is_none()))
        }
        'x' | 'X' | 'o' | 'b' | 'B' => {
            let n = integer_arg(d.conversion, arg)?;
            let magnitude = n.unsigned_abs();
            let (digits, prefix) = match d.conversion {
                'x' => (format!("{magnitude:x}"), "0x"),
                'X' => (format!("{magnitude:X}"), "0X"),
                'o' => (format!("{magnitude:o}"), "0"),
                'b' => (format!("{magnitude:b}"), "0b"),
                _ => (format!("{magnitude:b}"), "0B"),
            };
            let prefix = if d.alt && magnitude != 0 { prefix } else { "" };
            Ok(pad(d, sign(d, n < 0), prefix, &digits, true))
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let x = float_arg(d.conversion, arg)?;
            if !x.is_finite() {
                let text = if x.is_nan() { "NaN" } else { "Inf" };
                return Ok(pad(d, sign(d, x < 0.0), "", text, false));
            }
            let precision = d.precision.unwrap_or(6);
            let magnitude = x.abs();
            let digits = match d.conversion {
                'f' | 'F' => fixed(magnitude, precision, d.alt),
                'e' | 'E' => exponential(magnitude, precision, d.conversion == 'E'),
                _ => general(magnitude, precision, d.alt, d.conversion == 'G'),
            };
            let negative = x.is_sign_negative() && x != 0.0;
            Ok(pad(d, sign(d, negative), "", &digits, true))
        }
        other => Err(LiquefyError::Format(format!(
            "malformed format string - %{other}"
        ))),
    }
}

fn sign(d: &Directive, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if d.plus {
        "+"
    } else if d.space {
        " "
    } else {
        ""
    }
}

fn pad(d: &Directive, sign: &str, prefix: &str, body: &str, zero_allowed: bool) -> String {
    let len = sign.len() + prefix.len() + body.chars().count();
    let width = d.width.unwrap_or(0);
    if len >= width {
        return format!("{sign}{prefix}{body}");
    }
    let fill = width - len;
    if d.left {
        format!("{sign}{prefix}{body}{}", " ".repeat(fill))
    } else if d.zero && zero_allowed {
        format!("{sign}{prefix}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{prefix}{body}", " ".repeat(fill))
    }
}

fn numeric_mismatch(conversion: char, arg: &Value) -> LiquefyError {
    LiquefyError::Format(format!(
        "%{conversion} cannot format {} ({})",
        arg.kind(),
        arg.inspect()
    ))
}

fn integer_arg(conversion: char, arg: &Value) -> LiquefyResult<i64> {
    match arg {
        Value::Int(i) => Ok(*i),
        Value::Float(x) if x.is_finite() => Ok(x.trunc() as i64),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| numeric_mismatch(conversion, arg)),
        other => Err(numeric_mismatch(conversion, other)),
    }
}

fn float_arg(conversion: char, arg: &Value) -> LiquefyResult<f64> {
    match arg {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(x) => Ok(*x),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| numeric_mismatch(conversion, arg)),
        other => Err(numeric_mismatch(conversion, other)),
    }
}

fn fixed(magnitude: f64, precision: usize, alt: bool) -> String {
    let mut text = format!("{magnitude:.precision$}");
    if alt && precision == 0 {
        text.push('.');
    }
    text
}

fn exponential(magnitude: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.abs())
}

fn general(magnitude: f64, precision: usize, alt: bool, upper: bool) -> String {
    let precision = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        // Exponent after rounding to `precision` significant digits.
        let rounded = format!("{magnitude:.prec$e}", prec = precision - 1);
        rounded
            .split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };
    let text = if exponent < -4 || exponent >= precision as i32 {
        exponential(magnitude, precision - 1, upper)
    } else {
        let decimals = ((precision as i32 - 1 - exponent).max(0) as usize).min(MAX_FIELD);
        format!("{magnitude:.decimals$}")
    };
    if alt {
        return text;
    }
    strip_trailing_zeros(&text)
}

fn strip_trailing_zeros(text: &str) -> String {
    let (number, exponent) = match text.find(['e', 'E']) {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };
    if !number.contains('.') {
        return text.to_string();
    }
    let trimmed = number.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{exponent}")
}
