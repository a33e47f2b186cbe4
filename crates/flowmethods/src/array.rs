use crate::convert::{relative_index, to_integer, to_locale_string};
use crate::{boolean, codes, failure, number, object, string};
use flowcore::{
    join_values, Args, Array, Flow, FlowContext, Methods, Object, TypeTag, ValidationError, Value,
};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::sync::Arc;

static BUILTINS: Lazy<Arc<Methods<Array>>> = Lazy::new(|| Arc::new(builtins()));

pub(crate) fn table() -> &'static Arc<Methods<Array>> {
    &BUILTINS
}

pub(crate) fn wrap(ctx: &FlowContext, value: Array) -> Flow<Array> {
    Flow::new(ctx, value, Arc::clone(&BUILTINS))
}

/// Array flow on the process-wide context
pub fn array_flow(value: impl Into<Value>) -> Flow<Array> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, None)
}

/// Array flow with extension methods merged over the built-ins
pub fn array_flow_with(value: impl Into<Value>, methods: &Methods<Array>) -> Flow<Array> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, Some(methods))
}

/// Operations on array flows.
///
/// Operations whose native counterpart mutates (push, sort, splice, ...)
/// work on a copy and return a new flow. Callbacks receive the element and
/// its index. Terminal queries (`find`, `reduce`, `at`) return bare values.
pub trait ArrayMethods {
    fn push<I>(&self, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>;
    /// The array without its last element
    fn pop(&self) -> Flow<Array>;
    /// The array without its first element
    fn shift(&self) -> Flow<Array>;
    fn unshift<I>(&self, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>;
    /// Elements rendered as strings; null elements render empty
    fn join(&self, separator: &str) -> Flow<String>;
    fn map<V, F>(&self, f: F) -> Flow<Array>
    where
        V: Into<Value>,
        F: FnMut(&Value, usize) -> V;
    fn filter<F>(&self, predicate: F) -> Flow<Array>
    where
        F: FnMut(&Value, usize) -> bool;
    fn reduce<A, F>(&self, init: A, f: F) -> Option<A>
    where
        F: FnMut(A, &Value, usize) -> A;
    /// Orders elements by their string rendering
    fn sort(&self) -> Flow<Array>;
    fn sort_by<F>(&self, compare: F) -> Flow<Array>
    where
        F: FnMut(&Value, &Value) -> Ordering;
    fn reverse(&self) -> Flow<Array>;
    /// Appends `items`; array items are spread one level
    fn concat<I>(&self, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>;
    fn slice(&self, start: i64, end: Option<i64>) -> Flow<Array>;
    /// The array after removing `delete_count` elements at `start` and
    /// inserting `items` there
    fn splice<I>(&self, start: i64, delete_count: Option<usize>, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>;
    fn index_of(&self, search: impl Into<Value>, from: Option<i64>) -> Flow<f64>;
    fn last_index_of(&self, search: impl Into<Value>) -> Flow<f64>;
    /// Like `index_of`, but NaN matches NaN
    fn includes(&self, search: impl Into<Value>, from: Option<i64>) -> Flow<bool>;
    fn find<F>(&self, predicate: F) -> Option<Value>
    where
        F: FnMut(&Value, usize) -> bool;
    fn find_index<F>(&self, predicate: F) -> Flow<f64>
    where
        F: FnMut(&Value, usize) -> bool;
    fn find_last_index<F>(&self, predicate: F) -> Flow<f64>
    where
        F: FnMut(&Value, usize) -> bool;
    /// Runs `f` for its side effects and returns the receiver
    fn for_each<F>(&self, f: F) -> Flow<Array>
    where
        F: FnMut(&Value, usize);
    fn every<F>(&self, predicate: F) -> Flow<bool>
    where
        F: FnMut(&Value, usize) -> bool;
    fn some<F>(&self, predicate: F) -> Flow<bool>
    where
        F: FnMut(&Value, usize) -> bool;
    /// Negative indices count from the end
    fn at(&self, index: i64) -> Option<Value>;
    fn length(&self) -> Flow<f64>;
    fn flow_string(&self) -> Flow<String>;
    fn flow_locale_string(&self) -> Flow<String>;
    /// JSON rendering; fails on bigint elements
    fn flow_stringify(&self) -> Flow<String>;
    /// Object keyed by element index
    fn flow_object(&self) -> Flow<Object>;
    /// Object built from `[key, value]` pairs
    fn flow_object_entries(&self) -> Flow<Object>;
    /// True for a non-empty array
    fn flow_boolean(&self) -> Flow<bool>;
    fn flow_number(&self) -> Flow<f64>;
}

impl ArrayMethods for Flow<Array> {
    fn push<I>(&self, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.map_value(|array| {
            let mut next = array.clone();
            next.extend(items.into_iter().map(Into::<Value>::into));
            next
        })
    }

    fn pop(&self) -> Flow<Array> {
        self.map_value(|array| {
            let mut next = array.clone();
            next.pop();
            next
        })
    }

    fn shift(&self) -> Flow<Array> {
        self.map_value(|array| array.iter().skip(1).cloned().collect())
    }

    fn unshift<I>(&self, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.map_value(|array| {
            items
                .into_iter()
                .map(Into::<Value>::into)
                .chain(array.iter().cloned())
                .collect()
        })
    }

    fn join(&self, separator: &str) -> Flow<String> {
        self.and_then(|array, ctx| string::wrap(ctx, join_values(array, separator)))
    }

    fn map<V, F>(&self, mut f: F) -> Flow<Array>
    where
        V: Into<Value>,
        F: FnMut(&Value, usize) -> V,
    {
        self.map_value(|array| {
            array
                .iter()
                .enumerate()
                .map(|(i, item)| Into::<Value>::into(f(item, i)))
                .collect()
        })
    }

    fn filter<F>(&self, mut predicate: F) -> Flow<Array>
    where
        F: FnMut(&Value, usize) -> bool,
    {
        self.map_value(|array| {
            array
                .iter()
                .enumerate()
                .filter(|(i, item)| predicate(*item, *i))
                .map(|(_, item)| item.clone())
                .collect()
        })
    }

    fn reduce<A, F>(&self, init: A, mut f: F) -> Option<A>
    where
        F: FnMut(A, &Value, usize) -> A,
    {
        self.inspect_value(|array| {
            array
                .iter()
                .enumerate()
                .fold(init, |acc, (i, item)| f(acc, item, i))
        })
    }

    fn sort(&self) -> Flow<Array> {
        self.map_value(|array| {
            let mut next = array.clone();
            next.sort_by_cached_key(Value::to_js_string);
            next
        })
    }

    fn sort_by<F>(&self, mut compare: F) -> Flow<Array>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.map_value(|array| {
            let mut next = array.clone();
            next.sort_by(|a, b| compare(a, b));
            next
        })
    }

    fn reverse(&self) -> Flow<Array> {
        self.map_value(|array| array.iter().rev().cloned().collect())
    }

    fn concat<I>(&self, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.map_value(|array| {
            let mut next = array.clone();
            for item in items {
                let item: Value = item.into();
                match item {
                    Value::Array(inner) => next.extend(inner),
                    other => next.push(other),
                }
            }
            next
        })
    }

    fn slice(&self, start: i64, end: Option<i64>) -> Flow<Array> {
        self.map_value(|array| {
            let from = relative_index(start, array.len());
            let to = end.map_or(array.len(), |end| relative_index(end, array.len()));
            if from >= to {
                Array::new()
            } else {
                array[from..to].to_vec()
            }
        })
    }

    fn splice<I>(&self, start: i64, delete_count: Option<usize>, items: I) -> Flow<Array>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.map_value(|array| {
            let from = relative_index(start, array.len());
            let to = delete_count.map_or(array.len(), |count| {
                from.saturating_add(count).min(array.len())
            });
            let mut next = array[..from].to_vec();
            next.extend(items.into_iter().map(Into::<Value>::into));
            next.extend_from_slice(&array[to..]);
            next
        })
    }

    fn index_of(&self, search: impl Into<Value>, from: Option<i64>) -> Flow<f64> {
        let search = search.into();
        self.and_then(|array, ctx| {
            let start = from.map_or(0, |from| relative_index(from, array.len()));
            let found = array
                .iter()
                .enumerate()
                .skip(start)
                .find(|(_, item)| **item == search);
            number::wrap(ctx, position(found.map(|(i, _)| i)))
        })
    }

    fn last_index_of(&self, search: impl Into<Value>) -> Flow<f64> {
        let search = search.into();
        self.and_then(|array, ctx| {
            number::wrap(ctx, position(array.iter().rposition(|item| *item == search)))
        })
    }

    fn includes(&self, search: impl Into<Value>, from: Option<i64>) -> Flow<bool> {
        let search = search.into();
        self.and_then(|array, ctx| {
            let start = from.map_or(0, |from| relative_index(from, array.len()));
            let found = array[start..]
                .iter()
                .any(|item| item.same_value_zero(&search));
            boolean::wrap(ctx, found)
        })
    }

    fn find<F>(&self, mut predicate: F) -> Option<Value>
    where
        F: FnMut(&Value, usize) -> bool,
    {
        self.inspect_value(|array| {
            array
                .iter()
                .enumerate()
                .find(|(i, item)| predicate(*item, *i))
                .map(|(_, item)| item.clone())
        })
        .flatten()
    }

    fn find_index<F>(&self, mut predicate: F) -> Flow<f64>
    where
        F: FnMut(&Value, usize) -> bool,
    {
        self.and_then(|array, ctx| {
            let found = array
                .iter()
                .enumerate()
                .position(|(i, item)| predicate(item, i));
            number::wrap(ctx, position(found))
        })
    }

    fn find_last_index<F>(&self, mut predicate: F) -> Flow<f64>
    where
        F: FnMut(&Value, usize) -> bool,
    {
        self.and_then(|array, ctx| {
            let found = array
                .iter()
                .enumerate()
                .rposition(|(i, item)| predicate(item, i));
            number::wrap(ctx, position(found))
        })
    }

    fn for_each<F>(&self, mut f: F) -> Flow<Array>
    where
        F: FnMut(&Value, usize),
    {
        if let Some(array) = self.get() {
            array.iter().enumerate().for_each(|(i, item)| f(item, i));
        }
        self.clone()
    }

    fn every<F>(&self, mut predicate: F) -> Flow<bool>
    where
        F: FnMut(&Value, usize) -> bool,
    {
        self.and_then(|array, ctx| {
            let all = array.iter().enumerate().all(|(i, item)| predicate(item, i));
            boolean::wrap(ctx, all)
        })
    }

    fn some<F>(&self, mut predicate: F) -> Flow<bool>
    where
        F: FnMut(&Value, usize) -> bool,
    {
        self.and_then(|array, ctx| {
            let any = array.iter().enumerate().any(|(i, item)| predicate(item, i));
            boolean::wrap(ctx, any)
        })
    }

    fn at(&self, index: i64) -> Option<Value> {
        self.inspect_value(|array| {
            let resolved = if index < 0 {
                array.len().checked_sub(index.unsigned_abs() as usize)
            } else {
                Some(index as usize)
            };
            resolved.and_then(|i| array.get(i)).cloned()
        })
        .flatten()
    }

    fn length(&self) -> Flow<f64> {
        self.and_then(|array, ctx| number::wrap(ctx, array.len() as f64))
    }

    fn flow_string(&self) -> Flow<String> {
        self.join(",")
    }

    fn flow_locale_string(&self) -> Flow<String> {
        self.and_then(|array, ctx| {
            let rendered: Vec<String> = array
                .iter()
                .map(|item| match item {
                    Value::Number(n) => to_locale_string(*n),
                    Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect();
            string::wrap(ctx, rendered.join(","))
        })
    }

    fn flow_stringify(&self) -> Flow<String> {
        self.try_then(
            failure(TypeTag::Array, codes::JSON_STRINGIFY_ERROR),
            |array| serde_json::to_string(array),
            string::wrap,
        )
    }

    fn flow_object(&self) -> Flow<Object> {
        self.and_then(|array, ctx| {
            let indexed: Object = array
                .iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item.clone()))
                .collect();
            object::wrap(ctx, indexed)
        })
    }

    fn flow_object_entries(&self) -> Flow<Object> {
        self.try_then(
            failure(TypeTag::Object, codes::OBJECT_ENTRIES_ERROR),
            |array| entries_to_object(array),
            object::wrap,
        )
    }

    fn flow_boolean(&self) -> Flow<bool> {
        self.and_then(|array, ctx| boolean::wrap(ctx, !array.is_empty()))
    }

    fn flow_number(&self) -> Flow<f64> {
        self.length()
    }
}

fn position(index: Option<usize>) -> f64 {
    index.map_or(-1.0, |i| i as f64)
}

fn entries_to_object(array: &Array) -> Result<Object, ValidationError> {
    array
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Array(pair) if pair.len() == 2 => {
                Ok((pair[0].to_js_string(), pair[1].clone()))
            }
            other => Err(ValidationError::MalformedEntry {
                index,
                found: other.to_js_string(),
            }),
        })
        .collect()
}

fn builtins() -> Methods<Array> {
    Methods::new()
        .with("push", |flow, values| Ok(flow.push(values.iter().cloned()).into()))
        .with("pop", |flow, _| Ok(flow.pop().into()))
        .with("shift", |flow, _| Ok(flow.shift().into()))
        .with("unshift", |flow, values| {
            Ok(flow.unshift(values.iter().cloned()).into())
        })
        .with("join", |flow, values| {
            let separator = Args::new(values).opt_string(0)?.unwrap_or(",");
            Ok(flow.join(separator).into())
        })
        .with("sort", |flow, _| Ok(flow.sort().into()))
        .with("reverse", |flow, _| Ok(flow.reverse().into()))
        .with("concat", |flow, values| {
            Ok(flow.concat(values.iter().cloned()).into())
        })
        .with("slice", |flow, values| {
            let args = Args::new(values);
            let start = args.opt_number(0)?.map_or(0, to_integer);
            let end = args.opt_number(1)?.map(to_integer);
            Ok(flow.slice(start, end).into())
        })
        .with("splice", |flow, values| {
            let args = Args::new(values);
            let start = args.opt_number(0)?.map_or(0, to_integer);
            let delete_count = args
                .opt_number(1)?
                .map(|n| to_integer(n).max(0) as usize);
            let items = args.rest(2).iter().cloned();
            Ok(flow.splice(start, delete_count, items).into())
        })
        .with("index_of", |flow, values| {
            let args = Args::new(values);
            let from = args.opt_number(1)?.map(to_integer);
            Ok(flow.index_of(args.value(0)?.clone(), from).into())
        })
        .with("last_index_of", |flow, values| {
            Ok(flow.last_index_of(Args::new(values).value(0)?.clone()).into())
        })
        .with("includes", |flow, values| {
            let args = Args::new(values);
            let from = args.opt_number(1)?.map(to_integer);
            Ok(flow.includes(args.value(0)?.clone(), from).into())
        })
        .with("at", |flow, values| {
            let index = Args::new(values).opt_number(0)?.map_or(0, to_integer);
            Ok(flow.at(index).into())
        })
        .with("length", |flow, _| Ok(flow.length().into()))
        .with("flow_string", |flow, _| Ok(flow.flow_string().into()))
        .with("flow_locale_string", |flow, _| Ok(flow.flow_locale_string().into()))
        .with("flow_stringify", |flow, _| Ok(flow.flow_stringify().into()))
        .with("flow_object", |flow, _| Ok(flow.flow_object().into()))
        .with("flow_object_entries", |flow, _| Ok(flow.flow_object_entries().into()))
        .with("flow_boolean", |flow, _| Ok(flow.flow_boolean().into()))
        .with("flow_number", |flow, _| Ok(flow.flow_number().into()))
}
