use crate::{array, bigint, boolean, number, object, string};
use flowcore::{
    codes, AnyFlow, Array, BigInt, ErrorTemplate, Flow, FlowContext, Methods, Object, TypeTag,
    ValidationError, Value,
};

/// Factories bound to an explicit context, so records land in its registry
pub trait FlowFactory {
    fn string_flow(&self, value: impl Into<Value>) -> Flow<String>;
    fn string_flow_with(&self, value: impl Into<Value>, methods: &Methods<String>) -> Flow<String>;
    fn number_flow(&self, value: impl Into<Value>) -> Flow<f64>;
    fn number_flow_with(&self, value: impl Into<Value>, methods: &Methods<f64>) -> Flow<f64>;
    fn boolean_flow(&self, value: impl Into<Value>) -> Flow<bool>;
    fn boolean_flow_with(&self, value: impl Into<Value>, methods: &Methods<bool>) -> Flow<bool>;
    fn bigint_flow(&self, value: impl Into<Value>) -> Flow<BigInt>;
    fn bigint_flow_with(&self, value: impl Into<Value>, methods: &Methods<BigInt>)
        -> Flow<BigInt>;
    fn array_flow(&self, value: impl Into<Value>) -> Flow<Array>;
    fn array_flow_with(&self, value: impl Into<Value>, methods: &Methods<Array>) -> Flow<Array>;
    fn object_flow(&self, value: impl Into<Value>) -> Flow<Object>;
    fn object_flow_with(&self, value: impl Into<Value>, methods: &Methods<Object>)
        -> Flow<Object>;
    /// Flow of the kind named by `tag`
    fn make_flow(&self, tag: TypeTag, value: impl Into<Value>) -> AnyFlow;
}

impl FlowFactory for FlowContext {
    fn string_flow(&self, value: impl Into<Value>) -> Flow<String> {
        flowcore::make_flow(self, value, string::table(), None)
    }

    fn string_flow_with(&self, value: impl Into<Value>, methods: &Methods<String>) -> Flow<String> {
        flowcore::make_flow(self, value, string::table(), Some(methods))
    }

    fn number_flow(&self, value: impl Into<Value>) -> Flow<f64> {
        flowcore::make_flow(self, value, number::table(), None)
    }

    fn number_flow_with(&self, value: impl Into<Value>, methods: &Methods<f64>) -> Flow<f64> {
        flowcore::make_flow(self, value, number::table(), Some(methods))
    }

    fn boolean_flow(&self, value: impl Into<Value>) -> Flow<bool> {
        flowcore::make_flow(self, value, boolean::table(), None)
    }

    fn boolean_flow_with(&self, value: impl Into<Value>, methods: &Methods<bool>) -> Flow<bool> {
        flowcore::make_flow(self, value, boolean::table(), Some(methods))
    }

    fn bigint_flow(&self, value: impl Into<Value>) -> Flow<BigInt> {
        flowcore::make_flow(self, value, bigint::table(), None)
    }

    fn bigint_flow_with(
        &self,
        value: impl Into<Value>,
        methods: &Methods<BigInt>,
    ) -> Flow<BigInt> {
        flowcore::make_flow(self, value, bigint::table(), Some(methods))
    }

    fn array_flow(&self, value: impl Into<Value>) -> Flow<Array> {
        flowcore::make_flow(self, value, array::table(), None)
    }

    fn array_flow_with(&self, value: impl Into<Value>, methods: &Methods<Array>) -> Flow<Array> {
        flowcore::make_flow(self, value, array::table(), Some(methods))
    }

    fn object_flow(&self, value: impl Into<Value>) -> Flow<Object> {
        flowcore::make_flow(self, value, object::table(), None)
    }

    fn object_flow_with(
        &self,
        value: impl Into<Value>,
        methods: &Methods<Object>,
    ) -> Flow<Object> {
        flowcore::make_flow(self, value, object::table(), Some(methods))
    }

    fn make_flow(&self, tag: TypeTag, value: impl Into<Value>) -> AnyFlow {
        let value = value.into();
        match tag {
            TypeTag::String => self.string_flow(value).into(),
            TypeTag::Number => self.number_flow(value).into(),
            TypeTag::Boolean => self.boolean_flow(value).into(),
            TypeTag::Bigint => self.bigint_flow(value).into(),
            TypeTag::Array => self.array_flow(value).into(),
            TypeTag::Object => self.object_flow(value).into(),
            TypeTag::Error => {
                tracing::warn!("Refusing to build a flow for the {} tag", tag);
                let template = ErrorTemplate::new(tag, ValidationError::InvalidTag(tag).to_string())
                    .with_code(codes::INVALID_FLOW_TYPE)
                    .with_value(value)
                    .with_cause(ValidationError::InvalidTag(tag));
                AnyFlow::Error(self.error_flow(template))
            }
        }
    }
}

/// Flow of the kind named by `tag` on the process-wide context.
///
/// `TypeTag::Error` names no payload kind; it yields an error flow coded
/// `INVALID_FLOW_TYPE`.
pub fn make_flow(tag: TypeTag, value: impl Into<Value>) -> AnyFlow {
    FlowContext::global().make_flow(tag, value)
}
