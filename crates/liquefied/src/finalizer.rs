use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LiquefyResult;
use crate::value::Value;

/// Finalizer used when none is configured: the value's string form.
pub const DEFAULT_FINALIZER: &str = "to_s";

/// A finalization callback: receives the wrapped value and the call-site arguments.
pub type Transform<T> = Arc<dyn Fn(&T, &[Value]) -> LiquefyResult<Value> + Send + Sync>;

/// Serializable part of a finalizer (name and default arguments).
///
/// ```json
/// { "method": "format", "default_args": [{ "type": "str", "value": "%.2f" }] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizerConfig {
    /// Operation that ends the wrapping (default: `to_s`)
    pub method: String,
    /// Arguments used when finalization is called without any
    pub default_args: Vec<Value>,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            method: DEFAULT_FINALIZER.to_string(),
            default_args: Vec::new(),
        }
    }
}

impl FinalizerConfig {
    pub fn from_json(json: &str) -> LiquefyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> LiquefyResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How a proxy finalizes: finalizer name, default arguments, optional default transform.
///
/// Fixed once a proxy is built. Proxies produced by re-wrapping share the same
/// `Finalizer` instance.
pub struct Finalizer<T> {
    method: String,
    default_args: Vec<Value>,
    default_transform: Option<Transform<T>>,
}

impl<T> Finalizer<T> {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            default_args: Vec::new(),
            default_transform: None,
        }
    }

    pub fn from_config(config: FinalizerConfig) -> Self {
        Self {
            method: config.method,
            default_args: config.default_args,
            default_transform: None,
        }
    }

    pub fn with_default_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.default_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Use `transform` instead of calling the finalizer by name.
    pub fn with_default_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&T, &[Value]) -> LiquefyResult<Value> + Send + Sync + 'static,
    {
        self.default_transform = Some(Arc::new(transform));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn default_args(&self) -> &[Value] {
        &self.default_args
    }

    pub fn default_transform(&self) -> Option<&Transform<T>> {
        self.default_transform.as_ref()
    }

    pub fn has_default_transform(&self) -> bool {
        self.default_transform.is_some()
    }

    /// The serializable part of this finalizer. The transform is not included.
    pub fn config(&self) -> FinalizerConfig {
        FinalizerConfig {
            method: self.method.clone(),
            default_args: self.default_args.clone(),
        }
    }
}

impl<T> Default for Finalizer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_FINALIZER)
    }
}

impl<T> Clone for Finalizer<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            default_args: self.default_args.clone(),
            default_transform: self.default_transform.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Finalizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finalizer")
            .field("method", &self.method)
            .field("default_args", &self.default_args)
            .field("default_transform", &self.default_transform.is_some())
            .finish()
    }
}

impl<T> From<FinalizerConfig> for Finalizer<T> {
    fn from(config: FinalizerConfig) -> Self {
        Self::from_config(config)
    }
}
