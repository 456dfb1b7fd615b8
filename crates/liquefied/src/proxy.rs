use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::dispatch::Dispatch;
use crate::error::LiquefyResult;
use crate::finalizer::Finalizer;
use crate::id::ProxyId;
use crate::value::Value;

/// A proxy that forwards calls to the value it wraps until it is finalized.
///
/// - `invoke` forwards an operation by name. A result with the wrapped value's
///   runtime type comes back wrapped in a new proxy sharing this proxy's
///   finalizer; any other result comes back plain.
/// - Invoking the finalizer's name, `finalize` or `finalize_with` ends the
///   chain and returns a plain [`Value`].
/// - `describe`, `object` and `equals` are answered by the proxy itself and
///   are never forwarded.
///
/// The proxy never mutates the wrapped value and never translates errors.
pub struct Liquefied<T> {
    id: ProxyId,
    original: T,
    finalizer: Arc<Finalizer<T>>,
}

/// Result of a forwarded call.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Same runtime type as the wrapped value: a new proxy around the result
    Wrapped(Liquefied<T>),
    /// Different type, or a finalization result
    Value(Value),
}

impl<T> Liquefied<T> {
    /// Wrap `original` with the default finalizer (`to_s`, no default args).
    pub fn new(original: T) -> Self {
        Self::with_finalizer(original, Finalizer::default())
    }

    pub fn with_finalizer(original: T, finalizer: Finalizer<T>) -> Self {
        Self::from_parts(original, Arc::new(finalizer))
    }

    fn from_parts(original: T, finalizer: Arc<Finalizer<T>>) -> Self {
        Self {
            id: ProxyId::generate(),
            original,
            finalizer,
        }
    }

    /// A new proxy around `result` carrying this proxy's finalizer.
    fn rewrapped(&self, result: T) -> Self {
        Self::from_parts(result, Arc::clone(&self.finalizer))
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    pub fn finalizer(&self) -> &Finalizer<T> {
        &self.finalizer
    }

    /// Do both proxies carry the very same finalizer (e.g. one re-wrapped the other)?
    pub fn shares_finalizer_with(&self, other: &Liquefied<T>) -> bool {
        Arc::ptr_eq(&self.finalizer, &other.finalizer)
    }

    /// The wrapped value, as-is.
    pub fn object(&self) -> &T {
        &self.original
    }

    pub fn into_object(self) -> T {
        self.original
    }

    /// Compare the wrapped value with a raw value, using the wrapped value's
    /// own equality ([`Dispatch::value_eq`]).
    pub fn equals(&self, other: &T) -> bool
    where
        T: Dispatch + PartialEq,
    {
        self.original.value_eq(other)
    }

    /// Forward a same-type operation; the result stays wrapped.
    pub fn map<F>(&self, operation: F) -> Self
    where
        F: FnOnce(&T) -> T,
    {
        self.rewrapped(operation(&self.original))
    }

    /// Fallible [`map`](Self::map). Errors propagate unchanged.
    pub fn try_map<F, E>(&self, operation: F) -> Result<Self, E>
    where
        F: FnOnce(&T) -> Result<T, E>,
    {
        Ok(self.rewrapped(operation(&self.original)?))
    }

    /// Forward a type-changing operation; the result is returned plain.
    pub fn apply<U, F>(&self, operation: F) -> U
    where
        F: FnOnce(&T) -> U,
    {
        operation(&self.original)
    }

    /// Finalize through `callback`, ignoring the default transform and default args.
    pub fn finalize_with<F>(&self, args: &[Value], callback: F) -> LiquefyResult<Value>
    where
        F: FnOnce(&T, &[Value]) -> LiquefyResult<Value>,
    {
        debug!(proxy = %self.id, path = "callback", "Finalizing");
        callback(&self.original, args)
    }
}

impl<T: Dispatch> Liquefied<T> {
    /// Diagnostic description: wrapped runtime type and proxy identity.
    pub fn describe(&self) -> String {
        format!("#<Liquefied({}):{}>", self.original.type_name(), self.id)
    }

    /// Invoke `operation` by name.
    ///
    /// The finalizer's name finalizes (see [`finalize`](Self::finalize)).
    /// Anything else is forwarded to the wrapped value. To finalize with a
    /// call-site callback use [`finalize_with`](Self::finalize_with).
    pub fn invoke(&self, operation: &str, args: &[Value]) -> LiquefyResult<Outcome<T>> {
        if operation == self.finalizer.method() {
            return self.finalize(args).map(Outcome::Value);
        }

        trace!(proxy = %self.id, operation, args = args.len(), "Forwarding call");
        let result = self.original.dispatch(operation, args)?;
        match self.original.rewrap(result) {
            Ok(same_type) => {
                let proxy = self.rewrapped(same_type);
                trace!(proxy = %self.id, rewrapped = %proxy.id, operation, "Result re-wrapped");
                Ok(Outcome::Wrapped(proxy))
            }
            Err(other) => Ok(Outcome::Value(other)),
        }
    }

    /// Finalize with call-site `args`.
    ///
    /// With a default transform, it receives the wrapped value and `args` as
    /// given. Otherwise the finalizer runs by name on the wrapped value, with
    /// the default args when `args` is empty. The result is never re-wrapped.
    pub fn finalize(&self, args: &[Value]) -> LiquefyResult<Value> {
        if let Some(transform) = self.finalizer.default_transform() {
            debug!(proxy = %self.id, path = "default_transform", "Finalizing");
            return transform(&self.original, args);
        }

        let args = if args.is_empty() {
            self.finalizer.default_args()
        } else {
            args
        };
        debug!(
            proxy = %self.id,
            path = "method",
            method = self.finalizer.method(),
            args = args.len(),
            "Finalizing"
        );
        self.original.dispatch(self.finalizer.method(), args)
    }
}

/// Implicit finalization: renders the finalized result with its defaults.
///
/// A failing finalizer renders `describe()` instead and logs a warning.
impl<T: Dispatch> std::fmt::Display for Liquefied<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.finalize(&[]) {
            Ok(value) => write!(f, "{value}"),
            Err(err) => {
                warn!(proxy = %self.id, error = %err, "Implicit finalization failed");
                f.write_str(&self.describe())
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Liquefied<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Liquefied")
            .field("id", &self.id)
            .field("original", &self.original)
            .field("finalizer", &self.finalizer)
            .finish()
    }
}

/// Two proxies are equal when their wrapped values are.
impl<T: Dispatch + PartialEq> PartialEq for Liquefied<T> {
    fn eq(&self, other: &Self) -> bool {
        self.original.value_eq(&other.original)
    }
}

impl PartialEq<Value> for Liquefied<Value> {
    fn eq(&self, other: &Value) -> bool {
        self.original.value_eq(other)
    }
}

impl<T> From<T> for Liquefied<T> {
    fn from(original: T) -> Self {
        Self::new(original)
    }
}

impl<T> Outcome<T> {
    pub fn is_wrapped(&self) -> bool {
        matches!(self, Outcome::Wrapped(_))
    }

    pub fn as_wrapped(&self) -> Option<&Liquefied<T>> {
        match self {
            Outcome::Wrapped(proxy) => Some(proxy),
            Outcome::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Outcome::Wrapped(_) => None,
            Outcome::Value(value) => Some(value),
        }
    }

    pub fn wrapped(self) -> Option<Liquefied<T>> {
        match self {
            Outcome::Wrapped(proxy) => Some(proxy),
            Outcome::Value(_) => None,
        }
    }

    pub fn value(self) -> Option<Value> {
        match self {
            Outcome::Wrapped(_) => None,
            Outcome::Value(value) => Some(value),
        }
    }
}

impl<T: Dispatch> Outcome<T> {
    /// Continue a chain: a wrapped result forwards through its proxy, a plain
    /// result is called directly.
    pub fn invoke(&self, operation: &str, args: &[Value]) -> LiquefyResult<Outcome<T>> {
        match self {
            Outcome::Wrapped(proxy) => proxy.invoke(operation, args),
            Outcome::Value(value) => value.dispatch(operation, args).map(Outcome::Value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiquefyError;
    use chrono::NaiveDate;

    fn money() -> Liquefied<Value> {
        Liquefied::with_finalizer(
            Value::from(12.333),
            Finalizer::new("format").with_default_args(["%.2f"]),
        )
    }

    #[test]
    fn test_finalize_uses_default_args() {
        assert_eq!(money().finalize(&[]).unwrap(), Value::from("12.33"));
    }

    #[test]
    fn test_explicit_args_replace_defaults() {
        let proxy = money();
        assert_eq!(proxy.finalize(&["%.1f".into()]).unwrap(), Value::from("12.3"));
        // Defaults are untouched afterwards.
        assert_eq!(proxy.finalize(&[]).unwrap(), Value::from("12.33"));
    }

    #[test]
    fn test_invoke_finalizer_name_finalizes() {
        let outcome = money().invoke("format", &[]).unwrap();
        assert_eq!(outcome.value(), Some(Value::from("12.33")));
    }

    #[test]
    fn test_forwarded_same_type_is_rewrapped() {
        let proxy = money();
        let outcome = proxy.invoke("*", &[Value::from(2.0)]).unwrap();
        let doubled = outcome.wrapped().expect("Float * Float stays wrapped");
        assert_eq!(doubled.object(), &Value::from(24.666));
        assert_ne!(doubled.id(), proxy.id());
        assert!(doubled.shares_finalizer_with(&proxy));
        assert_eq!(doubled.finalize(&[]).unwrap(), Value::from("24.67"));
    }

    #[test]
    fn test_forwarded_other_type_is_plain() {
        let outcome = money().invoke("round", &[]).unwrap();
        assert_eq!(outcome.as_value(), Some(&Value::Int(12)));
        assert!(!outcome.is_wrapped());
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let err = money().invoke("upcase", &[]).unwrap_err();
        assert!(matches!(
            err,
            LiquefyError::UnsupportedOperation { ref operation, .. } if operation == "upcase"
        ));

        let missing = Liquefied::with_finalizer(Value::from(1), Finalizer::new("nope"));
        assert!(missing.finalize(&[]).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_callback_precedence() {
        let proxy = Liquefied::with_finalizer(
            Value::from(2),
            Finalizer::new("to_s")
                .with_default_args([16])
                .with_default_transform(|v, args| {
                    Ok(Value::from(format!("default:{v}:{}", args.len())))
                }),
        );
        assert_eq!(proxy.finalize(&[]).unwrap(), Value::from("default:2:0"));
        let via_callback = proxy
            .finalize_with(&[Value::from(1)], |v, args| {
                Ok(Value::from(format!("callback:{v}:{}", args.len())))
            })
            .unwrap();
        assert_eq!(via_callback, Value::from("callback:2:1"));
    }

    #[test]
    fn test_transform_path_does_not_substitute_defaults() {
        let proxy = Liquefied::with_finalizer(
            Value::from(1),
            Finalizer::new("format")
                .with_default_args(["%03d"])
                .with_default_transform(|_, args| Ok(Value::Int(args.len() as i64))),
        );
        assert_eq!(proxy.finalize(&[]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_callback_errors_propagate() {
        let err = money()
            .finalize_with(&[], |_, _| Err(LiquefyError::transform("boom")))
            .unwrap_err();
        assert_eq!(err.to_string(), "transform failed: boom");
    }

    #[test]
    fn test_identity_operations() {
        let proxy = money();
        assert_eq!(proxy.object(), &Value::from(12.333));
        assert_eq!(proxy.object(), proxy.object());
        assert!(proxy.equals(&Value::from(12.333)));
        assert!(proxy == Value::from(12.333));
        assert!(proxy == money());

        let description = proxy.describe();
        assert!(description.starts_with("#<Liquefied(Float):"));
        assert!(description.ends_with(&format!("{}>", proxy.id())));
    }

    #[test]
    fn test_finalizer_by_name_and_call_site_callback() {
        let proxy = money();
        let by_name = proxy.invoke("format", &["%.1f".into()]).unwrap();
        assert_eq!(by_name.value(), Some(proxy.finalize(&["%.1f".into()]).unwrap()));
        let with_callback = proxy
            .finalize_with(&["%.1f".into()], |v, args| Ok(Value::from(format!("{v}/{}", args[0]))))
            .unwrap();
        assert_eq!(with_callback, Value::from("12.333/%.1f"));
    }

    #[test]
    fn test_equality_follows_wrapped_semantics() {
        let one = Liquefied::new(Value::from(1));
        let as_operation = one.invoke("==", &[Value::from(1.0)]).unwrap();
        assert_eq!(as_operation.value(), Some(Value::Bool(true)));
        assert!(one.equals(&Value::from(1.0)));
        assert!(one == Value::from(1.0));
        assert!(one == Liquefied::new(Value::from(1.0)));
        assert!(!one.equals(&Value::from("1")));
        assert!(Liquefied::new(3_i64).equals(&3));
    }

    #[test]
    fn test_display_finalizes_implicitly() {
        assert_eq!(money().to_string(), "12.33");
        let date = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let proxy = Liquefied::with_finalizer(date, Finalizer::new("format").with_default_args(["long"]));
        assert_eq!(format!("Due {proxy}"), "Due January 1, 2016");
    }

    #[test]
    fn test_display_falls_back_to_describe() {
        let proxy = Liquefied::with_finalizer(Value::from(1), Finalizer::new("missing"));
        assert_eq!(proxy.to_string(), proxy.describe());
    }

    #[test]
    fn test_static_map_and_apply() {
        let proxy: Liquefied<Vec<i32>> = Liquefied::new(vec![1, 2, 3]);
        let longer = proxy.map(|v| {
            let mut v = v.clone();
            v.push(4);
            v
        });
        assert_eq!(longer.object(), &vec![1, 2, 3, 4]);
        assert_eq!(proxy.object(), &vec![1, 2, 3]);
        assert!(longer.shares_finalizer_with(&proxy));
        assert_eq!(longer.apply(Vec::len), 4);

        let failed: Result<Liquefied<Vec<i32>>, &str> = proxy.try_map(|_| Err("no"));
        assert_eq!(failed.err(), Some("no"));
    }

    #[test]
    fn test_outcome_chaining() {
        let proxy = Liquefied::new(Value::list([3, 1, 2]));
        let sorted = proxy
            .invoke("sort", &[])
            .and_then(|o| o.invoke("append", &[Value::from(4)]))
            .unwrap();
        assert!(sorted.is_wrapped());
        let length = sorted.invoke("length", &[]).unwrap();
        assert_eq!(length.as_value(), Some(&Value::Int(4)));
        // A plain result keeps answering calls directly.
        let succ = length.invoke("succ", &[]).unwrap();
        assert_eq!(succ.value(), Some(Value::Int(5)));
    }
}
