use crate::value::{Array, BigInt, Object, Value};
use crate::ArgumentError;

/// Positional arguments of a dynamic method call
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Result<&'a Value, ArgumentError> {
        self.values.get(index).ok_or(ArgumentError::Missing {
            index,
            expected: "a value",
        })
    }

    /// Argument at `index`, treating `null` as absent
    pub fn opt_value(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    /// Everything from `index` on
    pub fn rest(&self, index: usize) -> &'a [Value] {
        self.values.get(index..).unwrap_or(&[])
    }

    pub fn number(&self, index: usize) -> Result<f64, ArgumentError> {
        self.opt_number(index)?.ok_or(ArgumentError::Missing {
            index,
            expected: "number",
        })
    }

    pub fn opt_number(&self, index: usize) -> Result<Option<f64>, ArgumentError> {
        self.typed(index, "number", Value::as_f64)
    }

    pub fn string(&self, index: usize) -> Result<&'a str, ArgumentError> {
        self.opt_string(index)?.ok_or(ArgumentError::Missing {
            index,
            expected: "string",
        })
    }

    pub fn opt_string(&self, index: usize) -> Result<Option<&'a str>, ArgumentError> {
        self.typed(index, "string", Value::as_str)
    }

    pub fn boolean(&self, index: usize) -> Result<bool, ArgumentError> {
        self.typed(index, "boolean", Value::as_bool)?
            .ok_or(ArgumentError::Missing {
                index,
                expected: "boolean",
            })
    }

    pub fn bigint(&self, index: usize) -> Result<BigInt, ArgumentError> {
        self.typed(index, "bigint", Value::as_bigint)?
            .ok_or(ArgumentError::Missing {
                index,
                expected: "bigint",
            })
    }

    pub fn array(&self, index: usize) -> Result<&'a Array, ArgumentError> {
        self.typed(index, "array", Value::as_array)?
            .ok_or(ArgumentError::Missing {
                index,
                expected: "array",
            })
    }

    pub fn object(&self, index: usize) -> Result<&'a Object, ArgumentError> {
        self.typed(index, "object", Value::as_object)?
            .ok_or(ArgumentError::Missing {
                index,
                expected: "object",
            })
    }

    fn typed<R>(
        &self,
        index: usize,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<R>,
    ) -> Result<Option<R>, ArgumentError> {
        match self.opt_value(index) {
            None => Ok(None),
            Some(value) => extract(value).map(Some).ok_or(ArgumentError::InvalidType {
                index,
                expected,
                actual: value.type_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_positional_arguments() {
        let values = [Value::from(2), Value::from("x"), Value::Null];
        let args = Args::new(&values);
        assert_eq!(args.number(0), Ok(2.0));
        assert_eq!(args.string(1), Ok("x"));
        assert_eq!(args.opt_number(2), Ok(None));
        assert_eq!(args.rest(1).len(), 2);
        assert!(args.rest(5).is_empty());
    }

    #[test]
    fn reports_type_mismatches() {
        let values = [Value::from("x")];
        let err = Args::new(&values).number(0).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::InvalidType {
                index: 0,
                expected: "number",
                actual: "string",
            }
        );
    }
}
