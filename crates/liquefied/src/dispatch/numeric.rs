//! Integer and Float operations

use super::{object, Args};
use crate::error::{LiquefyError, LiquefyResult};
use crate::format::sprintf;
use crate::value::Value;

pub(super) fn integer(value: &Value, i: i64, args: &Args<'_>) -> LiquefyResult<Value> {
    let op = args.operation();
    match op {
        "+" | "-" | "*" => {
            let rhs = &args.exactly(1)?[0];
            match rhs {
                Value::Int(j) => {
                    let result = match op {
                        "+" => i.checked_add(*j),
                        "-" => i.checked_sub(*j),
                        _ => i.checked_mul(*j),
                    };
                    result.map(Value::Int).ok_or_else(|| args.invalid("integer overflow"))
                }
                _ => Ok(Value::Float(float_arith(op, i as f64, args.float(0)?))),
            }
        }
        "/" | "div" => match &args.exactly(1)?[0] {
            Value::Int(0) => Err(zero_division(op)),
            Value::Int(j) => floor_div(i, *j)
                .map(Value::Int)
                .ok_or_else(|| args.invalid("integer overflow")),
            _ => Ok(Value::Float(i as f64 / args.float(0)?)),
        },
        "%" | "modulo" => match &args.exactly(1)?[0] {
            Value::Int(0) => Err(zero_division(op)),
            Value::Int(j) => Ok(Value::Int(floor_mod(i, *j))),
            _ => Ok(Value::Float(float_mod(i as f64, args.float(0)?))),
        },
        "**" | "pow" => match &args.exactly(1)?[0] {
            Value::Int(exp) if *exp >= 0 => u32::try_from(*exp)
                .ok()
                .and_then(|exp| i.checked_pow(exp))
                .map(Value::Int)
                .ok_or_else(|| args.invalid("integer overflow")),
            _ => Ok(Value::Float((i as f64).powf(args.float(0)?))),
        },
        "abs" | "magnitude" => {
            args.none()?;
            i.checked_abs()
                .map(Value::Int)
                .ok_or_else(|| args.invalid("integer overflow"))
        }
        "succ" | "next" | "pred" => {
            args.none()?;
            let step = if op == "pred" { i.checked_sub(1) } else { i.checked_add(1) };
            step.map(Value::Int).ok_or_else(|| args.invalid("integer overflow"))
        }
        "to_i" | "to_int" | "floor" | "ceil" | "truncate" => {
            args.none()?;
            Ok(Value::Int(i))
        }
        "round" => {
            args.between(0, 1)?;
            let digits = if args.is_empty() { 0 } else { args.int(0)? };
            Ok(Value::Int(round_integer(args, i, digits)?))
        }
        "to_f" => {
            args.none()?;
            Ok(Value::Float(i as f64))
        }
        "to_s" | "to_string" if !args.is_empty() => {
            args.exactly(1)?;
            let base = args.int(0)?;
            if !(2..=36).contains(&base) {
                return Err(args.invalid(format!("invalid radix {base}")));
            }
            Ok(Value::Str(to_radix(i, base as u32)))
        }
        "chr" => {
            args.none()?;
            u32::try_from(i)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| args.invalid(format!("{i} out of char range")))
        }
        "gcd" => {
            args.exactly(1)?;
            let (mut a, mut b) = (i.unsigned_abs(), args.int(0)?.unsigned_abs());
            while b != 0 {
                (a, b) = (b, a % b);
            }
            i64::try_from(a)
                .map(Value::Int)
                .map_err(|_| args.invalid("integer overflow"))
        }
        "even?" => predicate(args, i % 2 == 0),
        "odd?" => predicate(args, i % 2 != 0),
        "zero?" => predicate(args, i == 0),
        "positive?" => predicate(args, i > 0),
        "negative?" => predicate(args, i < 0),
        "clamp" => clamp(value, args),
        "format" => {
            args.exactly(1)?;
            Ok(Value::Str(sprintf(args.str(0)?, std::slice::from_ref(value))?))
        }
        _ => object(value, args),
    }
}

pub(super) fn float(value: &Value, x: f64, args: &Args<'_>) -> LiquefyResult<Value> {
    let op = args.operation();
    match op {
        "+" | "-" | "*" | "/" => {
            args.exactly(1)?;
            Ok(Value::Float(float_arith(op, x, args.float(0)?)))
        }
        "%" | "modulo" => {
            args.exactly(1)?;
            Ok(Value::Float(float_mod(x, args.float(0)?)))
        }
        "**" | "pow" => {
            args.exactly(1)?;
            Ok(Value::Float(x.powf(args.float(0)?)))
        }
        "abs" | "magnitude" => {
            args.none()?;
            Ok(Value::Float(x.abs()))
        }
        "round" => {
            args.between(0, 1)?;
            let digits = if args.is_empty() { 0 } else { args.int(0)? };
            if digits > 0 {
                // Past 17 significant digits a double has nothing left to round.
                if !x.is_finite() || digits >= 17 {
                    return Ok(Value::Float(x));
                }
                let factor = 10f64.powi(digits as i32);
                let scaled = x * factor;
                if !scaled.is_finite() {
                    return Ok(Value::Float(x));
                }
                return Ok(Value::Float(scaled.round() / factor));
            }
            let rounded = float_to_int(args, x.round())?;
            Ok(Value::Int(round_integer(args, rounded, digits)?))
        }
        "floor" => {
            args.none()?;
            Ok(Value::Int(float_to_int(args, x.floor())?))
        }
        "ceil" => {
            args.none()?;
            Ok(Value::Int(float_to_int(args, x.ceil())?))
        }
        "truncate" | "to_i" | "to_int" => {
            args.none()?;
            Ok(Value::Int(float_to_int(args, x.trunc())?))
        }
        "to_f" => {
            args.none()?;
            Ok(Value::Float(x))
        }
        "nan?" => predicate(args, x.is_nan()),
        "infinite?" => predicate(args, x.is_infinite()),
        "finite?" => predicate(args, x.is_finite()),
        "zero?" => predicate(args, x == 0.0),
        "positive?" => predicate(args, x > 0.0),
        "negative?" => predicate(args, x < 0.0),
        "clamp" => clamp(value, args),
        "format" => {
            args.exactly(1)?;
            Ok(Value::Str(sprintf(args.str(0)?, std::slice::from_ref(value))?))
        }
        _ => object(value, args),
    }
}

fn predicate(args: &Args<'_>, result: bool) -> LiquefyResult<Value> {
    args.none()?;
    Ok(Value::Bool(result))
}

fn zero_division(operation: &str) -> LiquefyError {
    LiquefyError::ZeroDivision {
        operation: operation.to_string(),
    }
}

fn float_arith(op: &str, a: f64, b: f64) -> f64 {
    match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        _ => a / b,
    }
}

/// Division rounding toward negative infinity; `None` on overflow or a zero divisor.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Remainder taking the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

fn float_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else {
        r
    }
}

/// `Integer#round(digits)`: negative digits round to tens, hundreds, ...
fn round_integer(args: &Args<'_>, i: i64, digits: i64) -> LiquefyResult<i64> {
    if digits >= 0 {
        return Ok(i);
    }
    let Some(factor) = digits
        .checked_neg()
        .and_then(|d| u32::try_from(d).ok())
        .and_then(|d| 10i64.checked_pow(d))
    else {
        return Ok(0);
    };
    let half = factor / 2;
    let remainder = i.rem_euclid(factor);
    // Half away from zero.
    let rounded = if remainder > half || (remainder == half && i > 0) {
        i.checked_add(factor - remainder)
    } else {
        i.checked_sub(remainder)
    };
    rounded.ok_or_else(|| args.invalid("integer overflow"))
}

fn float_to_int(args: &Args<'_>, x: f64) -> LiquefyResult<i64> {
    if !x.is_finite() || x < i64::MIN as f64 || x >= i64::MAX as f64 {
        return Err(args.invalid(format!("{x} out of integer range")));
    }
    Ok(x as i64)
}

fn to_radix(i: i64, base: u32) -> String {
    let mut magnitude = i.unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while magnitude > 0 {
        let digit = (magnitude % u64::from(base)) as u32;
        digits.push(char::from_digit(digit, base).unwrap_or('?'));
        magnitude /= u64::from(base);
    }
    if i < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn clamp(value: &Value, args: &Args<'_>) -> LiquefyResult<Value> {
    let bounds = args.exactly(2)?;
    let (low, high) = (&bounds[0], &bounds[1]);
    let x = value.as_float().unwrap_or(f64::NAN);
    let (lo, hi) = (args.float(0)?, args.float(1)?);
    if lo > hi {
        return Err(args.invalid("min argument must be less than or equal to max argument"));
    }
    if x < lo {
        Ok(low.clone())
    } else if x > hi {
        Ok(high.clone())
    } else {
        Ok(value.clone())
    }
}
