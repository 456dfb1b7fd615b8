use chrono::NaiveDate;

use crate::error::{LiquefyError, LiquefyResult};
use crate::value::Value;

/// Positional arguments of a single dispatched call.
///
/// Every accessor reports failures against the operation name so errors read
/// like `wrong number of arguments for `round' (given 2, expected 0..1)`.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a> {
    operation: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(operation: &'a str, values: &'a [Value]) -> Self {
        Self { operation, values }
    }

    pub fn operation(&self) -> &'a str {
        self.operation
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    pub fn none(&self) -> LiquefyResult<()> {
        self.exactly(0).map(|_| ())
    }

    pub fn exactly(&self, count: usize) -> LiquefyResult<&'a [Value]> {
        if self.values.len() != count {
            return Err(self.count_error(count.to_string()));
        }
        Ok(self.values)
    }

    pub fn between(&self, min: usize, max: usize) -> LiquefyResult<&'a [Value]> {
        if self.values.len() < min || self.values.len() > max {
            return Err(self.count_error(format!("{min}..{max}")));
        }
        Ok(self.values)
    }

    pub fn at_least(&self, min: usize) -> LiquefyResult<&'a [Value]> {
        if self.values.len() < min {
            return Err(self.count_error(format!("{min}+")));
        }
        Ok(self.values)
    }

    pub fn int(&self, index: usize) -> LiquefyResult<i64> {
        match self.required(index)? {
            Value::Int(i) => Ok(*i),
            other => Err(self.type_error(index, "Integer", other)),
        }
    }

    /// Numeric argument; integers widen.
    pub fn float(&self, index: usize) -> LiquefyResult<f64> {
        let value = self.required(index)?;
        value
            .as_float()
            .ok_or_else(|| self.type_error(index, "Numeric", value))
    }

    pub fn str(&self, index: usize) -> LiquefyResult<&'a str> {
        match self.required(index)? {
            Value::Str(s) => Ok(s),
            other => Err(self.type_error(index, "String", other)),
        }
    }

    pub fn date(&self, index: usize) -> LiquefyResult<NaiveDate> {
        match self.required(index)? {
            Value::Date(d) => Ok(*d),
            other => Err(self.type_error(index, "Date", other)),
        }
    }

    /// Non-negative integer argument, e.g. a count or width.
    pub fn count(&self, index: usize) -> LiquefyResult<usize> {
        let n = self.int(index)?;
        usize::try_from(n).map_err(|_| self.invalid(format!("negative size ({n})")))
    }

    pub fn invalid(&self, reason: impl Into<String>) -> LiquefyError {
        LiquefyError::invalid_argument(self.operation, reason)
    }

    fn required(&self, index: usize) -> LiquefyResult<&'a Value> {
        self.values
            .get(index)
            .ok_or_else(|| self.count_error(format!("{}+", index + 1)))
    }

    fn count_error(&self, expected: String) -> LiquefyError {
        LiquefyError::ArgumentCount {
            operation: self.operation.to_string(),
            expected,
            given: self.values.len(),
        }
    }

    fn type_error(&self, index: usize, expected: &str, got: &Value) -> LiquefyError {
        self.invalid(format!(
            "argument {} must be {expected}, got {} ({})",
            index + 1,
            got.kind(),
            got.inspect()
        ))
    }
}
