use crate::convert::{
    check_radix, js_max, js_min, js_round, js_sign, number_to_radix, to_exponential, to_fixed,
    to_locale_string, to_precision,
};
use crate::{boolean, codes, failure, string};
use flowcore::{Args, Flow, FlowContext, Methods, TypeTag, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTINS: Lazy<Arc<Methods<f64>>> = Lazy::new(|| Arc::new(builtins()));

pub(crate) fn table() -> &'static Arc<Methods<f64>> {
    &BUILTINS
}

pub(crate) fn wrap(ctx: &FlowContext, value: f64) -> Flow<f64> {
    Flow::new(ctx, value, Arc::clone(&BUILTINS))
}

/// Number flow on the process-wide context
pub fn number_flow(value: impl Into<Value>) -> Flow<f64> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, None)
}

/// Number flow with extension methods merged over the built-ins
pub fn number_flow_with(value: impl Into<Value>, methods: &Methods<f64>) -> Flow<f64> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, Some(methods))
}

/// Arithmetic, rounding, comparison and formatting on number flows.
///
/// Arithmetic follows IEEE-754: dividing by zero yields an infinity and NaN
/// propagates. Formatting operations reject out-of-range arguments with an
/// error flow coded `RANGE_ERROR`.
pub trait NumberMethods {
    fn add(&self, other: f64) -> Flow<f64>;
    fn subtract(&self, other: f64) -> Flow<f64>;
    fn multiply(&self, other: f64) -> Flow<f64>;
    fn divide(&self, other: f64) -> Flow<f64>;
    /// Remainder with the sign of the dividend
    fn modulo(&self, other: f64) -> Flow<f64>;
    fn power(&self, exponent: f64) -> Flow<f64>;
    fn sqrt(&self) -> Flow<f64>;
    /// Halves round towards positive infinity
    fn round(&self) -> Flow<f64>;
    fn floor(&self) -> Flow<f64>;
    fn ceil(&self) -> Flow<f64>;
    fn abs(&self) -> Flow<f64>;
    /// Fresh number in `[0, 1)`, independent of the payload
    fn random(&self) -> Flow<f64>;
    fn min(&self, other: f64) -> Flow<f64>;
    fn max(&self, other: f64) -> Flow<f64>;
    fn clamp(&self, lower: f64, upper: f64) -> Flow<f64>;
    fn sign(&self) -> Flow<f64>;
    fn to_fixed(&self, digits: i32) -> Flow<String>;
    fn to_exponential(&self, digits: Option<i32>) -> Flow<String>;
    fn to_precision(&self, precision: Option<i32>) -> Flow<String>;
    fn less_than(&self, other: f64) -> Flow<bool>;
    fn greater_than(&self, other: f64) -> Flow<bool>;
    fn less_than_or_equal(&self, other: f64) -> Flow<bool>;
    fn greater_than_or_equal(&self, other: f64) -> Flow<bool>;
    fn equals(&self, other: f64) -> Flow<bool>;
    /// False for zero and NaN
    fn flow_boolean(&self) -> Flow<bool>;
    fn flow_string(&self, radix: Option<i32>) -> Flow<String>;
    fn flow_locale_string(&self) -> Flow<String>;
}

impl NumberMethods for Flow<f64> {
    fn add(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| n + other)
    }

    fn subtract(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| n - other)
    }

    fn multiply(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| n * other)
    }

    fn divide(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| n / other)
    }

    fn modulo(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| n % other)
    }

    fn power(&self, exponent: f64) -> Flow<f64> {
        self.map_value(|n| n.powf(exponent))
    }

    fn sqrt(&self) -> Flow<f64> {
        self.map_value(|n| n.sqrt())
    }

    fn round(&self) -> Flow<f64> {
        self.map_value(|n| js_round(*n))
    }

    fn floor(&self) -> Flow<f64> {
        self.map_value(|n| n.floor())
    }

    fn ceil(&self) -> Flow<f64> {
        self.map_value(|n| n.ceil())
    }

    fn abs(&self) -> Flow<f64> {
        self.map_value(|n| n.abs())
    }

    fn random(&self) -> Flow<f64> {
        self.map_value(|_| rand::random::<f64>())
    }

    fn min(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| js_min(*n, other))
    }

    fn max(&self, other: f64) -> Flow<f64> {
        self.map_value(|n| js_max(*n, other))
    }

    fn clamp(&self, lower: f64, upper: f64) -> Flow<f64> {
        self.map_value(|n| js_min(js_max(*n, lower), upper))
    }

    fn sign(&self) -> Flow<f64> {
        self.map_value(|n| js_sign(*n))
    }

    fn to_fixed(&self, digits: i32) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Number, codes::RANGE_ERROR),
            |n| to_fixed(*n, digits),
            string::wrap,
        )
    }

    fn to_exponential(&self, digits: Option<i32>) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Number, codes::RANGE_ERROR),
            |n| to_exponential(*n, digits),
            string::wrap,
        )
    }

    fn to_precision(&self, precision: Option<i32>) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Number, codes::RANGE_ERROR),
            |n| to_precision(*n, precision),
            string::wrap,
        )
    }

    fn less_than(&self, other: f64) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n < other))
    }

    fn greater_than(&self, other: f64) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n > other))
    }

    fn less_than_or_equal(&self, other: f64) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n <= other))
    }

    fn greater_than_or_equal(&self, other: f64) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n >= other))
    }

    fn equals(&self, other: f64) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n == other))
    }

    fn flow_boolean(&self) -> Flow<bool> {
        self.and_then(|n, ctx| boolean::wrap(ctx, *n != 0.0 && !n.is_nan()))
    }

    fn flow_string(&self, radix: Option<i32>) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Number, codes::RANGE_ERROR),
            |n| check_radix(radix.unwrap_or(10)).map(|radix| number_to_radix(*n, radix)),
            string::wrap,
        )
    }

    fn flow_locale_string(&self) -> Flow<String> {
        self.and_then(|n, ctx| string::wrap(ctx, to_locale_string(*n)))
    }
}

fn optional_i32(values: &[Value], index: usize) -> anyhow::Result<Option<i32>> {
    Ok(Args::new(values)
        .opt_number(index)?
        .map(|n| crate::convert::to_integer(n).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32))
}

fn builtins() -> Methods<f64> {
    Methods::new()
        .with("add", |flow, values| Ok(flow.add(Args::new(values).number(0)?).into()))
        .with("subtract", |flow, values| {
            Ok(flow.subtract(Args::new(values).number(0)?).into())
        })
        .with("multiply", |flow, values| {
            Ok(flow.multiply(Args::new(values).number(0)?).into())
        })
        .with("divide", |flow, values| {
            Ok(flow.divide(Args::new(values).number(0)?).into())
        })
        .with("modulo", |flow, values| {
            Ok(flow.modulo(Args::new(values).number(0)?).into())
        })
        .with("power", |flow, values| {
            Ok(flow.power(Args::new(values).number(0)?).into())
        })
        .with("sqrt", |flow, _| Ok(flow.sqrt().into()))
        .with("round", |flow, _| Ok(flow.round().into()))
        .with("floor", |flow, _| Ok(flow.floor().into()))
        .with("ceil", |flow, _| Ok(flow.ceil().into()))
        .with("abs", |flow, _| Ok(flow.abs().into()))
        .with("random", |flow, _| Ok(flow.random().into()))
        .with("min", |flow, values| Ok(flow.min(Args::new(values).number(0)?).into()))
        .with("max", |flow, values| Ok(flow.max(Args::new(values).number(0)?).into()))
        .with("clamp", |flow, values| {
            let args = Args::new(values);
            Ok(flow.clamp(args.number(0)?, args.number(1)?).into())
        })
        .with("sign", |flow, _| Ok(flow.sign().into()))
        .with("to_fixed", |flow, values| {
            let digits = optional_i32(values, 0)?.unwrap_or(0);
            Ok(flow.to_fixed(digits).into())
        })
        .with("to_exponential", |flow, values| {
            Ok(flow.to_exponential(optional_i32(values, 0)?).into())
        })
        .with("to_precision", |flow, values| {
            Ok(flow.to_precision(optional_i32(values, 0)?).into())
        })
        .with("less_than", |flow, values| {
            Ok(flow.less_than(Args::new(values).number(0)?).into())
        })
        .with("greater_than", |flow, values| {
            Ok(flow.greater_than(Args::new(values).number(0)?).into())
        })
        .with("less_than_or_equal", |flow, values| {
            Ok(flow.less_than_or_equal(Args::new(values).number(0)?).into())
        })
        .with("greater_than_or_equal", |flow, values| {
            Ok(flow.greater_than_or_equal(Args::new(values).number(0)?).into())
        })
        .with("equals", |flow, values| {
            Ok(flow.equals(Args::new(values).number(0)?).into())
        })
        .with("flow_boolean", |flow, _| Ok(flow.flow_boolean().into()))
        .with("flow_string", |flow, values| {
            Ok(flow.flow_string(optional_i32(values, 0)?).into())
        })
        .with("flow_locale_string", |flow, _| Ok(flow.flow_locale_string().into()))
}
