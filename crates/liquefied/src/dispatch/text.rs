//! String operations

use super::{object, Args};
use crate::error::LiquefyResult;
use crate::format::sprintf;
use crate::value::Value;

/// Largest string, in bytes, that `*` and the justify operations will build.
const MAX_STRING_BYTES: usize = 1 << 28;

pub(super) fn string(value: &Value, s: &str, args: &Args<'_>) -> LiquefyResult<Value> {
    let op = args.operation();
    match op {
        "upcase" => unary(args, s.to_uppercase()),
        "downcase" => unary(args, s.to_lowercase()),
        "capitalize" => unary(args, capitalize(s)),
        "swapcase" => unary(args, swapcase(s)),
        "reverse" => unary(args, s.chars().rev().collect()),
        "strip" => unary(args, s.trim().to_string()),
        "lstrip" => unary(args, s.trim_start().to_string()),
        "rstrip" => unary(args, s.trim_end().to_string()),
        "chars" => {
            args.none()?;
            Ok(Value::list(s.chars().map(String::from)))
        }
        "split" => {
            args.between(0, 1)?;
            let parts: Vec<Value> = match args.get(0) {
                None => s.split_whitespace().map(Value::from).collect(),
                Some(_) => {
                    let sep = args.str(0)?;
                    if sep.is_empty() {
                        s.chars().map(|c| Value::Str(c.to_string())).collect()
                    } else if sep == " " {
                        s.split_whitespace().map(Value::from).collect()
                    } else {
                        let mut parts: Vec<Value> = s.split(sep).map(Value::from).collect();
                        // Trailing empty fields are dropped.
                        while matches!(parts.last(), Some(Value::Str(p)) if p.is_empty()) {
                            parts.pop();
                        }
                        parts
                    }
                }
            };
            Ok(Value::List(parts))
        }
        "length" | "size" => {
            args.none()?;
            Ok(Value::Int(s.chars().count() as i64))
        }
        "bytesize" => {
            args.none()?;
            Ok(Value::Int(s.len() as i64))
        }
        "+" | "concat" => {
            args.exactly(1)?;
            Ok(Value::Str(format!("{s}{}", args.str(0)?)))
        }
        "*" => {
            args.exactly(1)?;
            let times = args.count(0)?;
            match s.len().checked_mul(times) {
                Some(total) if total <= MAX_STRING_BYTES => Ok(Value::Str(s.repeat(times))),
                _ => Err(args.invalid("argument too big")),
            }
        }
        "include?" => {
            args.exactly(1)?;
            Ok(Value::Bool(s.contains(args.str(0)?)))
        }
        "start_with?" => {
            args.exactly(1)?;
            Ok(Value::Bool(s.starts_with(args.str(0)?)))
        }
        "end_with?" => {
            args.exactly(1)?;
            Ok(Value::Bool(s.ends_with(args.str(0)?)))
        }
        "empty?" => {
            args.none()?;
            Ok(Value::Bool(s.is_empty()))
        }
        "index" => {
            args.exactly(1)?;
            let needle = args.str(0)?;
            Ok(s
                .find(needle)
                .map(|byte| Value::Int(s[..byte].chars().count() as i64))
                .unwrap_or(Value::Nil))
        }
        "sub" | "gsub" => {
            args.exactly(2)?;
            let (pattern, replacement) = (args.str(0)?, args.str(1)?);
            if op == "sub" {
                Ok(Value::Str(s.replacen(pattern, replacement, 1)))
            } else {
                Ok(Value::Str(s.replace(pattern, replacement)))
            }
        }
        "center" | "ljust" | "rjust" => {
            args.between(1, 2)?;
            let width = args.count(0)?;
            let pad = if args.len() == 2 { args.str(1)? } else { " " };
            if pad.is_empty() {
                return Err(args.invalid("zero width padding"));
            }
            // Pad chars are at most 4 bytes each.
            if width.saturating_mul(4).saturating_add(s.len()) > MAX_STRING_BYTES {
                return Err(args.invalid("argument too big"));
            }
            Ok(Value::Str(justify(op, s, width, pad)))
        }
        "to_i" => {
            args.none()?;
            Ok(Value::Int(leading_integer(s)))
        }
        "to_f" => {
            args.none()?;
            Ok(Value::Float(leading_float(s)))
        }
        "%" => {
            // A single array argument spreads into the format arguments.
            let spread = match args.values() {
                [Value::List(items)] => items.as_slice(),
                values => values,
            };
            Ok(Value::Str(sprintf(s, spread)?))
        }
        "format" => {
            args.exactly(1)?;
            Ok(Value::Str(sprintf(args.str(0)?, std::slice::from_ref(value))?))
        }
        _ => object(value, args),
    }
}

fn unary(args: &Args<'_>, result: String) -> LiquefyResult<Value> {
    args.none()?;
    Ok(Value::Str(result))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

fn swapcase(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                c.to_uppercase().collect::<Vec<_>>()
            }
        })
        .collect()
}

fn justify(op: &str, s: &str, width: usize, pad: &str) -> String {
    let len = s.chars().count();
    if width <= len {
        return s.to_string();
    }
    let total = width - len;
    let fill = |n: usize| pad.chars().cycle().take(n).collect::<String>();
    match op {
        "ljust" => format!("{s}{}", fill(total)),
        "rjust" => format!("{}{s}", fill(total)),
        _ => {
            let left = total / 2;
            format!("{}{s}{}", fill(left), fill(total - left))
        }
    }
}

/// Leading integer of `s`, `0` when there is none (Ruby's `String#to_i`).
fn leading_integer(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse().unwrap_or(0)
}

/// Longest numeric prefix of `s` parsed as a float, `0.0` when there is none.
fn leading_float(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let mut best = 0.0;
    for (i, c) in trimmed.char_indices() {
        if let Ok(parsed) = trimmed[..i + c.len_utf8()].parse::<f64>() {
            if !trimmed[..i + c.len_utf8()].ends_with(|c: char| c.is_alphabetic()) {
                best = parsed;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use crate::dispatch::Dispatch;
    use crate::error::LiquefyError;
    use crate::value::Value;

    fn call(s: &str, op: &str, args: &[Value]) -> Value {
        Value::from(s).dispatch(op, args).unwrap()
    }

    #[test]
    fn test_case_operations() {
        assert_eq!(call("hello World", "upcase", &[]), Value::from("HELLO WORLD"));
        assert_eq!(call("hello World", "downcase", &[]), Value::from("hello world"));
        assert_eq!(call("hELLO", "capitalize", &[]), Value::from("Hello"));
        assert_eq!(call("hELLo", "swapcase", &[]), Value::from("HellO"));
        assert_eq!(call("", "capitalize", &[]), Value::from(""));
    }

    #[test]
    fn test_splitting() {
        assert_eq!(call(" a  b c ", "split", &[]), Value::list(["a", "b", "c"]));
        assert_eq!(call("a,b,,", "split", &[Value::from(",")]), Value::list(["a", "b"]));
        assert_eq!(call("ab", "split", &[Value::from("")]), Value::list(["a", "b"]));
        assert_eq!(call("héllo", "chars", &[]).as_list().map(<[Value]>::len), Some(5));
    }

    #[test]
    fn test_type_changing_operations() {
        assert_eq!(call("héllo", "length", &[]), Value::Int(5));
        assert_eq!(call("héllo", "bytesize", &[]), Value::Int(6));
        assert_eq!(call("abc", "include?", &[Value::from("b")]), Value::Bool(true));
        assert_eq!(call("abc", "index", &[Value::from("c")]), Value::Int(2));
        assert_eq!(call("abc", "index", &[Value::from("z")]), Value::Nil);
        assert_eq!(call("  42abc", "to_i", &[]), Value::Int(42));
        assert_eq!(call("-7", "to_i", &[]), Value::Int(-7));
        assert_eq!(call("abc", "to_i", &[]), Value::Int(0));
        assert_eq!(call("3.25kg", "to_f", &[]), Value::Float(3.25));
        assert_eq!(call("nope", "to_f", &[]), Value::Float(0.0));
    }

    #[test]
    fn test_justify() {
        assert_eq!(call("abc", "center", &[Value::from(8), Value::from("*")]), Value::from("**abc***"));
        assert_eq!(call("abc", "ljust", &[Value::from(6), Value::from("12")]), Value::from("abc121"));
        assert_eq!(call("abc", "rjust", &[Value::from(5)]), Value::from("  abc"));
        assert_eq!(call("abc", "rjust", &[Value::from(2)]), Value::from("abc"));
        let err = Value::from("abc").dispatch("ljust", &[Value::from(5), Value::from("")]);
        assert!(matches!(err, Err(LiquefyError::InvalidArgument { .. })));
    }

    #[test]
    fn test_concat_and_repeat() {
        assert_eq!(call("ab", "+", &[Value::from("cd")]), Value::from("abcd"));
        assert_eq!(call("ab", "*", &[Value::from(3)]), Value::from("ababab"));
        assert_eq!(call("a-b-c", "sub", &[Value::from("-"), Value::from("+")]), Value::from("a+b-c"));
        assert_eq!(call("a-b-c", "gsub", &[Value::from("-"), Value::from("+")]), Value::from("a+b+c"));
        let err = Value::from("ab").dispatch("+", &[Value::from(1)]);
        assert!(matches!(err, Err(LiquefyError::InvalidArgument { .. })));
    }

    #[test]
    fn test_oversized_results_are_rejected() {
        let err = Value::from("ab").dispatch("*", &[Value::Int(1 << 62)]).unwrap_err();
        assert!(matches!(err, LiquefyError::InvalidArgument { ref reason, .. } if reason == "argument too big"));
        let err = Value::from("ab").dispatch("*", &[Value::Int(1 << 28)]).unwrap_err();
        assert!(matches!(err, LiquefyError::InvalidArgument { .. }));
        assert_eq!(call("", "*", &[Value::Int(1 << 62)]), Value::from(""));

        for op in ["center", "ljust", "rjust"] {
            let err = Value::from("ab").dispatch(op, &[Value::Int(i64::MAX)]).unwrap_err();
            assert!(matches!(err, LiquefyError::InvalidArgument { .. }));
        }
        let err = Value::from("%99999999999d").dispatch("%", &[Value::from(1)]).unwrap_err();
        assert!(matches!(err, LiquefyError::Format(_)));
    }

    #[test]
    fn test_percent_and_format() {
        assert_eq!(call("%05.1f", "%", &[Value::from(3.14159)]), Value::from("003.1"));
        assert_eq!(
            call("%s-%s", "%", &[Value::list(["a", "b"])]),
            Value::from("a-b")
        );
        assert_eq!(call("abc", "format", &[Value::from("[%5s]")]), Value::from("[  abc]"));
    }
}
