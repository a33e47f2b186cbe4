use crate::{number, string};
use flowcore::{Args, Flow, FlowContext, Methods, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTINS: Lazy<Arc<Methods<bool>>> = Lazy::new(|| Arc::new(builtins()));

pub(crate) fn table() -> &'static Arc<Methods<bool>> {
    &BUILTINS
}

pub(crate) fn wrap(ctx: &FlowContext, value: bool) -> Flow<bool> {
    Flow::new(ctx, value, Arc::clone(&BUILTINS))
}

/// Boolean flow on the process-wide context
pub fn boolean_flow(value: impl Into<Value>) -> Flow<bool> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, None)
}

/// Boolean flow with extension methods merged over the built-ins
pub fn boolean_flow_with(value: impl Into<Value>, methods: &Methods<bool>) -> Flow<bool> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, Some(methods))
}

/// Logic on boolean flows. Orderings treat `false < true`.
pub trait BooleanMethods {
    fn not(&self) -> Flow<bool>;
    fn and(&self, other: bool) -> Flow<bool>;
    fn or(&self, other: bool) -> Flow<bool>;
    fn xor(&self, other: bool) -> Flow<bool>;
    fn nor(&self, other: bool) -> Flow<bool>;
    fn nand(&self, other: bool) -> Flow<bool>;
    fn equal(&self, other: bool) -> Flow<bool>;
    fn not_equal(&self, other: bool) -> Flow<bool>;
    fn greater_than(&self, other: bool) -> Flow<bool>;
    fn less_than(&self, other: bool) -> Flow<bool>;
    fn greater_than_or_equal(&self, other: bool) -> Flow<bool>;
    fn less_than_or_equal(&self, other: bool) -> Flow<bool>;
    /// `"true"` or `"false"`
    fn flow_string(&self) -> Flow<String>;
    /// 1 or 0
    fn flow_number(&self) -> Flow<f64>;
}

impl BooleanMethods for Flow<bool> {
    fn not(&self) -> Flow<bool> {
        self.map_value(|b| !b)
    }

    fn and(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b && other)
    }

    fn or(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b || other)
    }

    fn xor(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b != other)
    }

    fn nor(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| !(*b || other))
    }

    fn nand(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| !(*b && other))
    }

    fn equal(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b == other)
    }

    fn not_equal(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b != other)
    }

    fn greater_than(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b & !other)
    }

    fn less_than(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| !*b & other)
    }

    fn greater_than_or_equal(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b >= other)
    }

    fn less_than_or_equal(&self, other: bool) -> Flow<bool> {
        self.map_value(|b| *b <= other)
    }

    fn flow_string(&self) -> Flow<String> {
        self.and_then(|b, ctx| string::wrap(ctx, b.to_string()))
    }

    fn flow_number(&self) -> Flow<f64> {
        self.and_then(|b, ctx| number::wrap(ctx, if *b { 1.0 } else { 0.0 }))
    }
}

fn binary(
    op: fn(&Flow<bool>, bool) -> Flow<bool>,
) -> impl Fn(&Flow<bool>, &[Value]) -> flowcore::MethodResult + Send + Sync + 'static {
    move |flow, values| Ok(op(flow, Args::new(values).boolean(0)?).into())
}

fn builtins() -> Methods<bool> {
    Methods::new()
        .with("not", |flow, _| Ok(flow.not().into()))
        .with("and", binary(BooleanMethods::and))
        .with("or", binary(BooleanMethods::or))
        .with("xor", binary(BooleanMethods::xor))
        .with("nor", binary(BooleanMethods::nor))
        .with("nand", binary(BooleanMethods::nand))
        .with("equal", binary(BooleanMethods::equal))
        .with("not_equal", binary(BooleanMethods::not_equal))
        .with("greater_than", binary(BooleanMethods::greater_than))
        .with("less_than", binary(BooleanMethods::less_than))
        .with("greater_than_or_equal", binary(BooleanMethods::greater_than_or_equal))
        .with("less_than_or_equal", binary(BooleanMethods::less_than_or_equal))
        .with("flow_string", |flow, _| Ok(flow.flow_string().into()))
        .with("flow_number", |flow, _| Ok(flow.flow_number().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table() {
        let ctx = FlowContext::new();
        let t = wrap(&ctx, true);
        let f = wrap(&ctx, false);
        assert_eq!(t.xor(true).get(), Some(&false));
        assert_eq!(f.nor(false).get(), Some(&true));
        assert_eq!(t.nand(true).get(), Some(&false));
        assert_eq!(t.greater_than(false).get(), Some(&true));
        assert_eq!(f.less_than(true).get(), Some(&true));
        assert_eq!(f.greater_than_or_equal(true).get(), Some(&false));
    }

    #[test]
    fn dynamic_binary_ops_decode_their_argument() {
        let ctx = FlowContext::new();
        let flow = wrap(&ctx, true);
        let out = flow.call("and", &[Value::from(false)]);
        assert_eq!(out.value(), Some(Value::Bool(false)));
        assert!(table().contains("nand"));
    }
}
