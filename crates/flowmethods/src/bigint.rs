use crate::convert::{bigint_to_radix, check_radix};
use crate::{boolean, codes, failure, number, string, successor};
use flowcore::{Args, BigInt, Flow, FlowContext, Methods, TypeTag, ValidationError, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTINS: Lazy<Arc<Methods<BigInt>>> = Lazy::new(|| Arc::new(builtins()));

pub(crate) fn table() -> &'static Arc<Methods<BigInt>> {
    &BUILTINS
}

/// Bigint flow on the process-wide context
pub fn bigint_flow(value: impl Into<Value>) -> Flow<BigInt> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, None)
}

/// Bigint flow with extension methods merged over the built-ins
pub fn bigint_flow_with(value: impl Into<Value>, methods: &Methods<BigInt>) -> Flow<BigInt> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, Some(methods))
}

/// Checked integer arithmetic on bigint flows.
///
/// Division truncates towards zero. Overflow, division by zero and negative
/// exponents produce error flows coded `BIGINT_ARITHMETIC_ERROR`.
pub trait BigintMethods {
    fn add(&self, other: BigInt) -> Flow<BigInt>;
    fn subtract(&self, other: BigInt) -> Flow<BigInt>;
    fn multiply(&self, other: BigInt) -> Flow<BigInt>;
    fn divide(&self, other: BigInt) -> Flow<BigInt>;
    fn modulo(&self, other: BigInt) -> Flow<BigInt>;
    fn power(&self, exponent: BigInt) -> Flow<BigInt>;
    fn abs(&self) -> Flow<BigInt>;
    fn negate(&self) -> Flow<BigInt>;
    fn min(&self, other: BigInt) -> Flow<BigInt>;
    fn max(&self, other: BigInt) -> Flow<BigInt>;
    fn less_than(&self, other: BigInt) -> Flow<bool>;
    fn greater_than(&self, other: BigInt) -> Flow<bool>;
    fn less_than_or_equal(&self, other: BigInt) -> Flow<bool>;
    fn greater_than_or_equal(&self, other: BigInt) -> Flow<bool>;
    fn equals(&self, other: BigInt) -> Flow<bool>;
    fn flow_string(&self, radix: Option<i32>) -> Flow<String>;
    /// Nearest double; precision is lost beyond 2^53
    fn flow_number(&self) -> Flow<f64>;
    fn flow_boolean(&self) -> Flow<bool>;
}

impl BigintMethods for Flow<BigInt> {
    fn add(&self, other: BigInt) -> Flow<BigInt> {
        self.checked(|n| n.checked_add(other).ok_or(ValidationError::Overflow("bigint addition")))
    }

    fn subtract(&self, other: BigInt) -> Flow<BigInt> {
        self.checked(|n| {
            n.checked_sub(other)
                .ok_or(ValidationError::Overflow("bigint subtraction"))
        })
    }

    fn multiply(&self, other: BigInt) -> Flow<BigInt> {
        self.checked(|n| {
            n.checked_mul(other)
                .ok_or(ValidationError::Overflow("bigint multiplication"))
        })
    }

    fn divide(&self, other: BigInt) -> Flow<BigInt> {
        self.checked(|n| {
            if other == 0 {
                return Err(ValidationError::DivisionByZero);
            }
            n.checked_div(other)
                .ok_or(ValidationError::Overflow("bigint division"))
        })
    }

    fn modulo(&self, other: BigInt) -> Flow<BigInt> {
        self.checked(|n| {
            if other == 0 {
                return Err(ValidationError::DivisionByZero);
            }
            n.checked_rem(other)
                .ok_or(ValidationError::Overflow("bigint remainder"))
        })
    }

    fn power(&self, exponent: BigInt) -> Flow<BigInt> {
        self.checked(|n| {
            if exponent < 0 {
                return Err(ValidationError::Range(
                    "Exponent must be non-negative".to_string(),
                ));
            }
            let power = match (u32::try_from(exponent), *n) {
                (Ok(exponent), n) => n.checked_pow(exponent),
                (Err(_), base @ (0 | 1)) => Some(base),
                (Err(_), -1) => Some(if exponent % 2 == 0 { 1 } else { -1 }),
                (Err(_), _) => None,
            };
            power.ok_or(ValidationError::Overflow("bigint exponentiation"))
        })
    }

    fn abs(&self) -> Flow<BigInt> {
        self.checked(|n| n.checked_abs().ok_or(ValidationError::Overflow("bigint absolute value")))
    }

    fn negate(&self) -> Flow<BigInt> {
        self.checked(|n| n.checked_neg().ok_or(ValidationError::Overflow("bigint negation")))
    }

    fn min(&self, other: BigInt) -> Flow<BigInt> {
        self.map_value(|n| (*n).min(other))
    }

    fn max(&self, other: BigInt) -> Flow<BigInt> {
        self.map_value(|n| (*n).max(other))
    }

    fn less_than(&self, other: BigInt) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n < other))
    }

    fn greater_than(&self, other: BigInt) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n > other))
    }

    fn less_than_or_equal(&self, other: BigInt) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n <= other))
    }

    fn greater_than_or_equal(&self, other: BigInt) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n >= other))
    }

    fn equals(&self, other: BigInt) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n == other))
    }

    fn flow_string(&self, radix: Option<i32>) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Bigint, codes::RANGE_ERROR),
            |n| check_radix(radix.unwrap_or(10)).map(|radix| bigint_to_radix(*n, radix)),
            string::wrap,
        )
    }

    fn flow_number(&self) -> Flow<f64> {
        self.and_then(|n, ctx| number::wrap(ctx, *n as f64))
    }

    fn flow_boolean(&self) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n != 0))
    }
}

trait Checked {
    fn checked(&self, op: impl FnOnce(&BigInt) -> Result<BigInt, ValidationError>) -> Flow<BigInt>;
}

impl Checked for Flow<BigInt> {
    fn checked(&self, op: impl FnOnce(&BigInt) -> Result<BigInt, ValidationError>) -> Flow<BigInt> {
        self.try_then(
            failure(TypeTag::Bigint, codes::BIGINT_ARITHMETIC_ERROR),
            op,
            |ctx, n| successor(self, ctx, n, &BUILTINS),
        )
    }
}

fn operand(
    op: fn(&Flow<BigInt>, BigInt) -> Flow<BigInt>,
) -> impl Fn(&Flow<BigInt>, &[Value]) -> flowcore::MethodResult + Send + Sync + 'static {
    move |flow, values| Ok(op(flow, Args::new(values).bigint(0)?).into())
}

fn comparison(
    op: fn(&Flow<BigInt>, BigInt) -> Flow<bool>,
) -> impl Fn(&Flow<BigInt>, &[Value]) -> flowcore::MethodResult + Send + Sync + 'static {
    move |flow, values| Ok(op(flow, Args::new(values).bigint(0)?).into())
}

fn builtins() -> Methods<BigInt> {
    Methods::new()
        .with("add", operand(BigintMethods::add))
        .with("subtract", operand(BigintMethods::subtract))
        .with("multiply", operand(BigintMethods::multiply))
        .with("divide", operand(BigintMethods::divide))
        .with("modulo", operand(BigintMethods::modulo))
        .with("power", operand(BigintMethods::power))
        .with("min", operand(BigintMethods::min))
        .with("max", operand(BigintMethods::max))
        .with("abs", |flow, _| Ok(flow.abs().into()))
        .with("negate", |flow, _| Ok(flow.negate().into()))
        .with("less_than", comparison(BigintMethods::less_than))
        .with("greater_than", comparison(BigintMethods::greater_than))
        .with("less_than_or_equal", comparison(BigintMethods::less_than_or_equal))
        .with("greater_than_or_equal", comparison(BigintMethods::greater_than_or_equal))
        .with("equals", comparison(BigintMethods::equals))
        .with("flow_string", |flow, values| {
            let radix = Args::new(values)
                .opt_number(0)?
                .map(|n| crate::convert::to_integer(n).clamp(0, 64) as i32);
            Ok(flow.flow_string(radix).into())
        })
        .with("flow_number", |flow, _| Ok(flow.flow_number().into()))
        .with("flow_boolean", |flow, _| Ok(flow.flow_boolean().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_becomes_an_error_flow() {
        let ctx = FlowContext::new();
        let flow = Flow::new(&ctx, BigInt::MAX, Arc::clone(table()));
        let sum = flow.add(1);
        assert!(sum.is_error());
        assert_eq!(
            sum.get_error().unwrap().code(),
            codes::BIGINT_ARITHMETIC_ERROR
        );
        assert_eq!(ctx.registry().len(), 1);
    }

    #[test]
    fn arithmetic_keeps_the_receiver_table() {
        let ctx = FlowContext::new();
        let flow = Flow::new(&ctx, 7, Arc::clone(table()));
        let quotient = flow.divide(2);
        assert_eq!(quotient.get(), Some(&3));
        assert!(Arc::ptr_eq(quotient.methods().unwrap(), table()));
    }
}
