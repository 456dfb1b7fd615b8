//! Property tests: forwarding, re-wrapping and finalization rules of the proxy.

use liquefied::{Finalizer, Liquefied, LiquefyResult, Value};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

/// Integers small enough that a few additions cannot overflow.
fn arb_small_int() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000
}

/// A flat list of integers and strings.
fn arb_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        prop_oneof![
            arb_small_int().prop_map(Value::Int),
            "[a-z]{0,6}".prop_map(Value::from),
        ],
        0..8,
    )
}

fn adding_finalizer(default: i64) -> Finalizer<Value> {
    Finalizer::new("+").with_default_args([default])
}

fn tagged(tag: &'static str) -> impl Fn(&Value, &[Value]) -> LiquefyResult<Value> {
    move |value, args| Ok(Value::from(format!("{tag}:{value}:{}", args.len())))
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A same-type result is re-wrapped: new identity, same finalizer, forwarded value.
    #[test]
    fn same_type_results_are_rewrapped(a in arb_small_int(), b in arb_small_int()) {
        let proxy = Liquefied::new(Value::Int(a));
        let sum = proxy.invoke("+", &[Value::Int(b)]).unwrap();
        let sum = sum.wrapped().expect("Integer + Integer stays wrapped");

        prop_assert_eq!(sum.object(), &Value::Int(a + b));
        prop_assert_ne!(sum.id(), proxy.id());
        prop_assert!(sum.shares_finalizer_with(&proxy));
        prop_assert_eq!(proxy.object(), &Value::Int(a));
    }

    /// A result of another type is returned exactly as the wrapped value would return it.
    #[test]
    fn other_type_results_are_plain(items in arb_list()) {
        let proxy = Liquefied::new(Value::List(items.clone()));
        let length = proxy.invoke("length", &[]).unwrap();
        prop_assert_eq!(length.value(), Some(Value::Int(items.len() as i64)));

        let joined = proxy.invoke("join", &[Value::from(",")]).unwrap();
        let direct = liquefied::Dispatch::dispatch(&Value::List(items), "join", &[Value::from(",")]).unwrap();
        prop_assert_eq!(joined.value(), Some(direct));
    }

    /// Unwrapping is idempotent and never copies or alters the wrapped value.
    #[test]
    fn object_is_idempotent(items in arb_list()) {
        let proxy = Liquefied::new(Value::List(items.clone()));
        prop_assert_eq!(proxy.object(), proxy.object());
        prop_assert!(proxy.equals(&Value::List(items.clone())));
        prop_assert_eq!(proxy.into_object(), Value::List(items));
    }

    /// Default args apply only when finalization gets no args of its own.
    #[test]
    fn default_args_substitute_only_when_empty(
        a in arb_small_int(),
        default in arb_small_int(),
        explicit in arb_small_int(),
    ) {
        let proxy = Liquefied::with_finalizer(Value::Int(a), adding_finalizer(default));
        prop_assert_eq!(proxy.finalize(&[]).unwrap(), Value::Int(a + default));
        prop_assert_eq!(proxy.finalize(&[Value::Int(explicit)]).unwrap(), Value::Int(a + explicit));
        // Invoking the finalizer by name is the same as finalizing.
        let by_name = proxy.invoke("+", &[]).unwrap();
        prop_assert_eq!(by_name.value(), Some(Value::Int(a + default)));
    }

    /// Re-wrapped proxies finalize with the original configuration.
    #[test]
    fn rewrapped_proxies_keep_defaults(a in arb_small_int(), b in arb_small_int(), default in arb_small_int()) {
        let proxy = Liquefied::with_finalizer(Value::Int(a), adding_finalizer(default));
        let next = proxy.invoke("-", &[Value::Int(b)]).unwrap().wrapped().unwrap();
        prop_assert_eq!(next.finalize(&[]).unwrap(), Value::Int(a - b + default));
    }

    /// A call-site callback beats the default transform, which beats the finalizer name.
    #[test]
    fn callback_precedence(a in arb_small_int(), extra in prop::collection::vec(arb_small_int(), 0..3)) {
        let args: Vec<Value> = extra.into_iter().map(Value::Int).collect();
        let with_transform = Liquefied::with_finalizer(
            Value::Int(a),
            adding_finalizer(1).with_default_transform(tagged("default")),
        );

        prop_assert_eq!(
            with_transform.finalize(&args).unwrap(),
            Value::from(format!("default:{a}:{}", args.len()))
        );
        prop_assert_eq!(
            with_transform.finalize_with(&args, tagged("callback")).unwrap(),
            Value::from(format!("callback:{a}:{}", args.len()))
        );
    }

    /// Strings keep their pending formatting through same-type operations.
    #[test]
    fn string_operations_stay_wrapped(s in "[a-zA-Z ]{0,12}") {
        let proxy = Liquefied::new(Value::from(s.as_str()));
        let upper = proxy.invoke("upcase", &[]).unwrap().wrapped().unwrap();
        prop_assert_eq!(upper.to_string(), s.to_uppercase());
        prop_assert!(upper.describe().starts_with("#<Liquefied(String):"));
    }
}
