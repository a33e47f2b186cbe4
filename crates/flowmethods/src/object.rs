use crate::{array, boolean, codes, failure, number, string};
use flowcore::{Args, Array, Flow, FlowContext, Methods, Object, TypeTag, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTINS: Lazy<Arc<Methods<Object>>> = Lazy::new(|| Arc::new(builtins()));

pub(crate) fn table() -> &'static Arc<Methods<Object>> {
    &BUILTINS
}

pub(crate) fn wrap(ctx: &FlowContext, value: Object) -> Flow<Object> {
    Flow::new(ctx, value, Arc::clone(&BUILTINS))
}

/// Object flow on the process-wide context. Arrays and null are rejected.
pub fn object_flow(value: impl Into<Value>) -> Flow<Object> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, None)
}

/// Object flow with extension methods merged over the built-ins
pub fn object_flow_with(value: impl Into<Value>, methods: &Methods<Object>) -> Flow<Object> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, Some(methods))
}

/// Key/value access on object flows. Keys are visited in sorted order.
pub trait ObjectMethods {
    fn keys(&self) -> Flow<Array>;
    fn values(&self) -> Flow<Array>;
    /// `[key, value]` pairs
    fn entries(&self) -> Flow<Array>;
    fn has(&self, key: &str) -> Flow<bool>;
    fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Flow<Object>;
    fn delete(&self, key: &str) -> Flow<Object>;
    /// Value stored under `key`
    fn prop(&self, key: &str) -> Option<Value>;
    fn len(&self) -> Flow<f64>;
    /// Shallow merge; keys of `other` win
    fn merge(&self, other: &Object) -> Flow<Object>;
    /// JSON rendering; fails on bigint values
    fn flow_string(&self) -> Flow<String>;
}

impl ObjectMethods for Flow<Object> {
    fn keys(&self) -> Flow<Array> {
        self.and_then(|object, ctx| {
            array::wrap(ctx, object.keys().map(|key| Value::from(key.as_str())).collect())
        })
    }

    fn values(&self) -> Flow<Array> {
        self.and_then(|object, ctx| array::wrap(ctx, object.values().cloned().collect()))
    }

    fn entries(&self) -> Flow<Array> {
        self.and_then(|object, ctx| {
            let pairs: Array = object
                .iter()
                .map(|(key, value)| Value::Array(vec![Value::from(key.as_str()), value.clone()]))
                .collect();
            array::wrap(ctx, pairs)
        })
    }

    fn has(&self, key: &str) -> Flow<bool> {
        self.and_then(|object, ctx| boolean::wrap(ctx, object.contains_key(key)))
    }

    fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Flow<Object> {
        let (key, value) = (key.into(), value.into());
        self.map_value(|object| {
            let mut next = object.clone();
            next.insert(key, value);
            next
        })
    }

    fn delete(&self, key: &str) -> Flow<Object> {
        self.map_value(|object| {
            let mut next = object.clone();
            next.remove(key);
            next
        })
    }

    fn prop(&self, key: &str) -> Option<Value> {
        self.inspect_value(|object| object.get(key).cloned()).flatten()
    }

    fn len(&self) -> Flow<f64> {
        self.and_then(|object, ctx| number::wrap(ctx, object.len() as f64))
    }

    fn merge(&self, other: &Object) -> Flow<Object> {
        self.map_value(|object| {
            let mut next = object.clone();
            next.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
            next
        })
    }

    fn flow_string(&self) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Object, codes::JSON_STRINGIFY_ERROR),
            |object| serde_json::to_string(object),
            string::wrap,
        )
    }
}

fn builtins() -> Methods<Object> {
    Methods::new()
        .with("keys", |flow, _| Ok(flow.keys().into()))
        .with("values", |flow, _| Ok(flow.values().into()))
        .with("entries", |flow, _| Ok(flow.entries().into()))
        .with("has", |flow, values| Ok(flow.has(Args::new(values).string(0)?).into()))
        .with("set", |flow, values| {
            let args = Args::new(values);
            Ok(flow.set(args.string(0)?, args.value(1)?.clone()).into())
        })
        .with("delete", |flow, values| {
            Ok(flow.delete(Args::new(values).string(0)?).into())
        })
        .with("prop", |flow, values| Ok(flow.prop(Args::new(values).string(0)?).into()))
        .with("len", |flow, _| Ok(flow.len().into()))
        .with("merge", |flow, values| {
            Ok(flow.merge(Args::new(values).object(0)?).into())
        })
        .with("flow_string", |flow, _| Ok(flow.flow_string().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_delete_copy_the_payload() {
        let ctx = FlowContext::new();
        let flow = wrap(&ctx, Object::new());
        let updated = flow.set("a", 1).set("b", true);
        let trimmed = updated.delete("a");
        assert!(flow.get().unwrap().is_empty());
        assert_eq!(updated.get().unwrap().len(), 2);
        assert_eq!(trimmed.prop("b"), Some(Value::Bool(true)));
        assert_eq!(trimmed.prop("a"), None);
    }

    #[test]
    fn entries_are_sorted_pairs() {
        let ctx = FlowContext::new();
        let flow = wrap(&ctx, Object::new()).set("z", 1).set("a", 2);
        let entries = flow.entries().to_value();
        assert_eq!(
            entries,
            Value::from(vec![
                Value::from(vec![Value::from("a"), Value::from(2)]),
                Value::from(vec![Value::from("z"), Value::from(1)]),
            ])
        );
        assert!(table().contains("merge"));
    }
}
