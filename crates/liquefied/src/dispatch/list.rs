//! Array operations

use std::cmp::Ordering;

use super::{object, Args};
use crate::error::LiquefyResult;
use crate::value::Value;

pub(super) fn array(value: &Value, items: &[Value], args: &Args<'_>) -> LiquefyResult<Value> {
    let op = args.operation();
    match op {
        "push" | "append" => {
            let mut out = items.to_vec();
            out.extend_from_slice(args.values());
            Ok(Value::List(out))
        }
        "<<" => {
            let mut out = items.to_vec();
            out.push(args.exactly(1)?[0].clone());
            Ok(Value::List(out))
        }
        "concat" => {
            let mut out = items.to_vec();
            for (index, other) in args.values().iter().enumerate() {
                match other {
                    Value::List(more) => out.extend_from_slice(more),
                    _ => return Err(args.invalid(format!("argument {} must be Array", index + 1))),
                }
            }
            Ok(Value::List(out))
        }
        "first" | "last" => {
            args.between(0, 1)?;
            if args.is_empty() {
                let item = if op == "first" { items.first() } else { items.last() };
                return Ok(item.cloned().unwrap_or(Value::Nil));
            }
            let n = args.count(0)?.min(items.len());
            let slice = if op == "first" { &items[..n] } else { &items[items.len() - n..] };
            Ok(Value::List(slice.to_vec()))
        }
        "take" => {
            args.exactly(1)?;
            let n = args.count(0)?.min(items.len());
            Ok(Value::List(items[..n].to_vec()))
        }
        "drop" => {
            args.exactly(1)?;
            let n = args.count(0)?.min(items.len());
            Ok(Value::List(items[n..].to_vec()))
        }
        "length" | "size" => {
            args.none()?;
            Ok(Value::Int(items.len() as i64))
        }
        "count" => {
            args.between(0, 1)?;
            let count = match args.get(0) {
                None => items.len(),
                Some(needle) => items.iter().filter(|item| item.loose_eq(needle)).count(),
            };
            Ok(Value::Int(count as i64))
        }
        "empty?" => {
            args.none()?;
            Ok(Value::Bool(items.is_empty()))
        }
        "include?" => {
            let needle = &args.exactly(1)?[0];
            Ok(Value::Bool(items.iter().any(|item| item.loose_eq(needle))))
        }
        "index" => {
            let needle = &args.exactly(1)?[0];
            Ok(items
                .iter()
                .position(|item| item.loose_eq(needle))
                .map(|i| Value::Int(i as i64))
                .unwrap_or(Value::Nil))
        }
        "at" | "[]" => {
            args.exactly(1)?;
            let index = args.int(0)?;
            let resolved = if index < 0 {
                i64::try_from(items.len()).ok().map(|len| len + index)
            } else {
                Some(index)
            };
            Ok(resolved
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Nil))
        }
        "reverse" => {
            args.none()?;
            Ok(Value::List(items.iter().rev().cloned().collect()))
        }
        "sort" => {
            args.none()?;
            let mut out = items.to_vec();
            ensure_comparable(args, &out)?;
            out.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
            Ok(Value::List(out))
        }
        "min" | "max" => {
            args.none()?;
            ensure_comparable(args, items)?;
            let pick = items.iter().reduce(|best, item| {
                let ord = item.compare(best).unwrap_or(Ordering::Equal);
                match (op, ord) {
                    ("min", Ordering::Less) | ("max", Ordering::Greater) => item,
                    _ => best,
                }
            });
            Ok(pick.cloned().unwrap_or(Value::Nil))
        }
        "sum" => {
            args.none()?;
            sum(args, items)
        }
        "join" => {
            args.between(0, 1)?;
            let sep = if args.is_empty() { "" } else { args.str(0)? };
            Ok(Value::Str(join(items, sep)))
        }
        "uniq" => {
            args.none()?;
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
            Ok(Value::List(out))
        }
        "compact" => {
            args.none()?;
            Ok(Value::List(items.iter().filter(|i| !i.is_nil()).cloned().collect()))
        }
        "flatten" => {
            args.none()?;
            let mut out = Vec::new();
            flatten_into(items, &mut out);
            Ok(Value::List(out))
        }
        "to_a" => {
            args.none()?;
            Ok(value.clone())
        }
        _ => object(value, args),
    }
}

fn ensure_comparable(args: &Args<'_>, items: &[Value]) -> LiquefyResult<()> {
    for pair in items.windows(2) {
        if pair[0].compare(&pair[1]).is_none() {
            return Err(args.invalid(format!(
                "comparison of {} with {} failed",
                pair[0].kind(),
                pair[1].inspect()
            )));
        }
    }
    Ok(())
}

fn sum(args: &Args<'_>, items: &[Value]) -> LiquefyResult<Value> {
    let mut total = Value::Int(0);
    for item in items {
        total = match (&total, item) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| args.invalid("integer overflow"))?,
            (acc, next) => match (acc.as_float(), next.as_float()) {
                (Some(a), Some(b)) => Value::Float(a + b),
                _ => {
                    return Err(args.invalid(format!(
                        "{} can't be coerced into {}",
                        next.kind(),
                        acc.kind()
                    )))
                }
            },
        };
    }
    Ok(total)
}

fn join(items: &[Value], sep: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::List(nested) => join(nested, sep),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(sep)
}

fn flatten_into(items: &[Value], out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(nested) => flatten_into(nested, out),
            other => out.push(other.clone()),
        }
    }
}
