//! Name-based dispatch
//!
//! [`Dispatch`] is the seam between the proxy and the value it wraps. The
//! proxy never inspects the wrapped value; it only asks it to run an operation
//! by name and, afterwards, whether a result has the wrapped value's own
//! runtime type.
//!
//! [`Value`] carries a built-in object model modelled on Ruby's core classes.
//! Each kind resolves its own operations first and falls back to the
//! operations every object has (`to_s`, `inspect`, `==`, ...).

mod args;
mod date;
mod list;
mod numeric;
mod text;

use chrono::NaiveDate;

use crate::error::{LiquefyError, LiquefyResult};
use crate::value::{Value, ValueKind};

pub use args::Args;

/// A value that can run operations by name.
///
/// All methods have defaults, so `impl Dispatch for MyType {}` is enough for
/// a type that is only used through the statically typed proxy API
/// (`map`, `apply`, `finalize_with`).
pub trait Dispatch: Sized {
    /// Runtime type name, as shown by `describe`.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Run `operation` with positional `args`.
    fn dispatch(&self, operation: &str, args: &[Value]) -> LiquefyResult<Value> {
        let _ = args;
        Err(LiquefyError::unsupported(self.type_name(), operation))
    }

    /// Recover `Self` from a dispatch result of the same runtime type.
    ///
    /// Returns the result untouched when its type differs.
    fn rewrap(&self, result: Value) -> Result<Self, Value> {
        Err(result)
    }

    /// Equality as the value's own `==` operation sees it.
    fn value_eq(&self, other: &Self) -> bool
    where
        Self: PartialEq,
    {
        self == other
    }
}

impl Dispatch for Value {
    fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    fn dispatch(&self, operation: &str, args: &[Value]) -> LiquefyResult<Value> {
        let args = Args::new(operation, args);
        match self {
            Value::Nil => nil(self, &args),
            Value::Bool(b) => boolean(self, *b, &args),
            Value::Int(i) => numeric::integer(self, *i, &args),
            Value::Float(x) => numeric::float(self, *x, &args),
            Value::Str(s) => text::string(self, s, &args),
            Value::List(items) => list::array(self, items, &args),
            Value::Date(d) => date::date(self, *d, &args),
        }
    }

    fn rewrap(&self, result: Value) -> Result<Self, Value> {
        if result.kind() == self.kind() {
            Ok(result)
        } else {
            Err(result)
        }
    }

    fn value_eq(&self, other: &Self) -> bool {
        self.loose_eq(other)
    }
}

macro_rules! dispatch_via_value {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl Dispatch for $ty {
            fn type_name(&self) -> &'static str {
                ValueKind::$kind.name()
            }

            fn dispatch(&self, operation: &str, args: &[Value]) -> LiquefyResult<Value> {
                Value::$variant(self.to_owned()).dispatch(operation, args)
            }

            fn rewrap(&self, result: Value) -> Result<Self, Value> {
                match result {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

dispatch_via_value!(bool, Bool, Boolean);
dispatch_via_value!(i64, Int, Integer);
dispatch_via_value!(f64, Float, Float);
dispatch_via_value!(String, Str, String);
dispatch_via_value!(Vec<Value>, List, Array);
dispatch_via_value!(NaiveDate, Date, Date);

/// Operations shared by every kind.
fn object(value: &Value, args: &Args<'_>) -> LiquefyResult<Value> {
    match args.operation() {
        "to_s" | "to_string" => {
            args.none()?;
            Ok(Value::Str(value.to_string()))
        }
        "inspect" => {
            args.none()?;
            Ok(Value::Str(value.inspect()))
        }
        "class" => {
            args.none()?;
            Ok(Value::from(value.kind().name()))
        }
        "nil?" => {
            args.none()?;
            Ok(Value::Bool(value.is_nil()))
        }
        "==" => {
            let other = &args.exactly(1)?[0];
            Ok(Value::Bool(value.loose_eq(other)))
        }
        "!=" => {
            let other = &args.exactly(1)?[0];
            Ok(Value::Bool(!value.loose_eq(other)))
        }
        "dup" | "clone" | "itself" => {
            args.none()?;
            Ok(value.clone())
        }
        "is_a?" | "kind_of?" => {
            args.exactly(1)?;
            let name = args.str(0)?;
            let kind = value.kind();
            Ok(Value::Bool(
                name == kind.name() || name == "Object" || (name == "Numeric" && kind.is_numeric()),
            ))
        }
        operation => Err(LiquefyError::unsupported(value.kind().name(), operation)),
    }
}

fn nil(value: &Value, args: &Args<'_>) -> LiquefyResult<Value> {
    match args.operation() {
        "to_a" => {
            args.none()?;
            Ok(Value::List(Vec::new()))
        }
        "to_i" => {
            args.none()?;
            Ok(Value::Int(0))
        }
        "to_f" => {
            args.none()?;
            Ok(Value::Float(0.0))
        }
        _ => object(value, args),
    }
}

fn boolean(value: &Value, b: bool, args: &Args<'_>) -> LiquefyResult<Value> {
    match args.operation() {
        "!" => {
            args.none()?;
            Ok(Value::Bool(!b))
        }
        "&" => Ok(Value::Bool(b && args.exactly(1)?[0].is_truthy())),
        "|" => Ok(Value::Bool(b || args.exactly(1)?[0].is_truthy())),
        "^" => Ok(Value::Bool(b ^ args.exactly(1)?[0].is_truthy())),
        _ => object(value, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(value: impl Into<Value>, op: &str, args: &[Value]) -> LiquefyResult<Value> {
        value.into().dispatch(op, args)
    }

    #[test]
    fn test_object_operations_on_every_kind() {
        for value in [
            Value::Nil,
            Value::from(true),
            Value::from(1),
            Value::from(1.5),
            Value::from("s"),
            Value::list([1]),
            Value::from(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()),
        ] {
            let class = value.dispatch("class", &[]).unwrap();
            assert_eq!(class, Value::from(value.kind().name()));
            assert_eq!(value.dispatch("dup", &[]).unwrap(), value);
            assert_eq!(
                value.dispatch("==", &[value.clone()]).unwrap(),
                Value::Bool(true)
            );
            assert_eq!(
                value.dispatch("inspect", &[]).unwrap(),
                Value::Str(value.inspect())
            );
        }
    }

    #[test]
    fn test_unsupported_operation_names_kind() {
        let err = call(1.5, "upcase", &[]).unwrap_err();
        assert!(matches!(
            err,
            LiquefyError::UnsupportedOperation { ref type_name, ref operation }
                if type_name == "Float" && operation == "upcase"
        ));
    }

    #[test]
    fn test_is_a() {
        assert_eq!(call(1, "is_a?", &["Numeric".into()]).unwrap(), Value::Bool(true));
        assert_eq!(call(1, "is_a?", &["Integer".into()]).unwrap(), Value::Bool(true));
        assert_eq!(call("x", "is_a?", &["Numeric".into()]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_nil_and_boolean() {
        assert_eq!(call((), "to_s", &[]).unwrap(), Value::from(""));
        assert_eq!(call((), "to_a", &[]).unwrap(), Value::List(vec![]));
        assert_eq!(call((), "nil?", &[]).unwrap(), Value::Bool(true));
        assert_eq!(call(true, "!", &[]).unwrap(), Value::Bool(false));
        assert_eq!(call(true, "&", &[Value::Nil]).unwrap(), Value::Bool(false));
        assert_eq!(call(false, "|", &[Value::from(0)]).unwrap(), Value::Bool(true));
        assert_eq!(call(true, "^", &[Value::from(true)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_rewrap_by_kind() {
        let original = Value::from(3);
        assert_eq!(original.rewrap(Value::from(4)), Ok(Value::from(4)));
        assert_eq!(original.rewrap(Value::from(4.0)), Err(Value::from(4.0)));
    }

    #[test]
    fn test_primitive_impls_delegate_to_value() {
        assert_eq!(12.333_f64.dispatch("format", &["%.1f".into()]).unwrap(), Value::from("12.3"));
        assert_eq!(5_i64.rewrap(Value::from(6)), Ok(6));
        assert_eq!(5_i64.rewrap(Value::from("6")), Err(Value::from("6")));
        assert_eq!(String::from("ab").type_name(), "String");
        assert_eq!(
            String::from("ab").rewrap(Value::from("AB")),
            Ok(String::from("AB"))
        );
    }

    #[test]
    fn test_value_eq_matches_equality_operation() {
        let one = Value::from(1);
        assert!(one.value_eq(&Value::from(1.0)));
        assert_eq!(one.dispatch("==", &[Value::from(1.0)]).unwrap(), Value::Bool(true));
        assert!(!one.value_eq(&Value::from("1")));
        assert!(2_i64.value_eq(&2));
    }

    #[test]
    fn test_default_trait_methods() {
        struct Opaque;
        impl Dispatch for Opaque {}

        let err = Opaque.dispatch("anything", &[]).unwrap_err();
        assert!(err.is_unsupported());
        assert!(Opaque.type_name().ends_with("Opaque"));
        assert_eq!(Opaque.rewrap(Value::Nil).err(), Some(Value::Nil));
    }
}
