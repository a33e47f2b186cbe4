use crate::convert::{clamp_index, parse_float, relative_index, string_to_number};
use crate::{array, boolean, codes, failure, number, successor};
use flowcore::{
    Args, Array, Flow, FlowContext, FlowKind, Methods, Object, TypeTag, ValidationError, Value,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static BUILTINS: Lazy<Arc<Methods<String>>> = Lazy::new(|| Arc::new(builtins()));

pub(crate) fn table() -> &'static Arc<Methods<String>> {
    &BUILTINS
}

pub(crate) fn wrap(ctx: &FlowContext, value: String) -> Flow<String> {
    Flow::new(ctx, value, Arc::clone(&BUILTINS))
}

/// String flow on the process-wide context
pub fn string_flow(value: impl Into<Value>) -> Flow<String> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, None)
}

/// String flow with extension methods merged over the built-ins
pub fn string_flow_with(value: impl Into<Value>, methods: &Methods<String>) -> Flow<String> {
    flowcore::make_flow(&FlowContext::global(), value, &BUILTINS, Some(methods))
}

/// Operations on string flows. Indices count characters.
pub trait StringMethods {
    fn to_upper(&self) -> Flow<String>;
    fn to_lower(&self) -> Flow<String>;
    fn length(&self) -> Flow<f64>;
    fn reverse(&self) -> Flow<String>;
    /// Replace the first occurrence of `search`
    fn replace(&self, search: &str, replacement: &str) -> Flow<String>;
    fn replace_all(&self, search: &str, replacement: &str) -> Flow<String>;
    /// Replace every match of a regular expression; `$1` expands groups
    fn replace_pattern(&self, pattern: &str, replacement: &str) -> Flow<String>;
    fn trim(&self) -> Flow<String>;
    fn trim_start(&self) -> Flow<String>;
    fn trim_end(&self) -> Flow<String>;
    fn pad_start(&self, target_length: usize, fill: &str) -> Flow<String>;
    fn pad_end(&self, target_length: usize, fill: &str) -> Flow<String>;
    fn starts_with(&self, search: &str) -> Flow<bool>;
    fn ends_with(&self, search: &str) -> Flow<bool>;
    fn includes(&self, search: &str) -> Flow<bool>;
    fn index_of(&self, search: &str) -> Flow<f64>;
    fn last_index_of(&self, search: &str) -> Flow<f64>;
    /// Character at `index`, or an empty string when out of range
    fn char_at(&self, index: i64) -> Flow<String>;
    /// Code point at `index`, or NaN when out of range
    fn char_code_at(&self, index: i64) -> Flow<f64>;
    fn concat(&self, other: &str) -> Flow<String>;
    fn split(&self, separator: &str) -> Flow<Array>;
    fn split_pattern(&self, pattern: &str) -> Flow<Array>;
    /// Negative indices count from the end
    fn slice(&self, start: i64, end: Option<i64>) -> Flow<String>;
    /// Negative indices clamp to zero; swapped bounds are reordered
    fn substring(&self, start: i64, end: Option<i64>) -> Flow<String>;
    fn equals(&self, other: &str) -> Flow<bool>;
    fn not_equal(&self, other: &str) -> Flow<bool>;
    /// Whole-string numeric conversion; NaN when not numeric
    fn flow_number(&self) -> Flow<f64>;
    /// Leading numeric prefix; NaN when there is none
    fn flow_float_number(&self) -> Flow<f64>;
    fn flow_boolean(&self) -> Flow<bool>;
    fn flow_array(&self) -> Flow<Array>;
    /// Parse the string as a JSON object
    fn flow_object(&self) -> Flow<Object>;
}

impl StringMethods for Flow<String> {
    fn to_upper(&self) -> Flow<String> {
        self.map_value(|s| s.to_uppercase())
    }

    fn to_lower(&self) -> Flow<String> {
        self.map_value(|s| s.to_lowercase())
    }

    fn length(&self) -> Flow<f64> {
        self.and_then(|s, ctx| number::wrap(ctx, s.chars().count() as f64))
    }

    fn reverse(&self) -> Flow<String> {
        self.map_value(|s| s.chars().rev().collect())
    }

    fn replace(&self, search: &str, replacement: &str) -> Flow<String> {
        self.map_value(|s| s.replacen(search, replacement, 1))
    }

    fn replace_all(&self, search: &str, replacement: &str) -> Flow<String> {
        self.map_value(|s| s.replace(search, replacement))
    }

    fn replace_pattern(&self, pattern: &str, replacement: &str) -> Flow<String> {
        self.try_then(
            failure(TypeTag::String, codes::PATTERN_ERROR),
            |s| compile(pattern).map(|re| re.replace_all(s, replacement).into_owned()),
            |ctx, replaced| successor(self, ctx, replaced, &BUILTINS),
        )
    }

    fn trim(&self) -> Flow<String> {
        self.map_value(|s| s.trim().to_string())
    }

    fn trim_start(&self) -> Flow<String> {
        self.map_value(|s| s.trim_start().to_string())
    }

    fn trim_end(&self) -> Flow<String> {
        self.map_value(|s| s.trim_end().to_string())
    }

    fn pad_start(&self, target_length: usize, fill: &str) -> Flow<String> {
        self.try_then(
            failure(TypeTag::String, codes::RANGE_ERROR),
            |s| padding(s, target_length, fill).map(|pad| pad + s),
            |ctx, padded| successor(self, ctx, padded, &BUILTINS),
        )
    }

    fn pad_end(&self, target_length: usize, fill: &str) -> Flow<String> {
        self.try_then(
            failure(TypeTag::String, codes::RANGE_ERROR),
            |s| padding(s, target_length, fill).map(|pad| s.clone() + &pad),
            |ctx, padded| successor(self, ctx, padded, &BUILTINS),
        )
    }

    fn starts_with(&self, search: &str) -> Flow<bool> {
        self.and_then(|s, ctx| boolean::wrap(ctx, s.starts_with(search)))
    }

    fn ends_with(&self, search: &str) -> Flow<bool> {
        self.and_then(|s, ctx| boolean::wrap(ctx, s.ends_with(search)))
    }

    fn includes(&self, search: &str) -> Flow<bool> {
        self.and_then(|s, ctx| boolean::wrap(ctx, s.contains(search)))
    }

    fn index_of(&self, search: &str) -> Flow<f64> {
        self.and_then(|s, ctx| number::wrap(ctx, char_position(s, s.find(search))))
    }

    fn last_index_of(&self, search: &str) -> Flow<f64> {
        self.and_then(|s, ctx| number::wrap(ctx, char_position(s, s.rfind(search))))
    }

    fn char_at(&self, index: i64) -> Flow<String> {
        self.map_value(|s| {
            usize::try_from(index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(String::from)
                .unwrap_or_default()
        })
    }

    fn char_code_at(&self, index: i64) -> Flow<f64> {
        self.and_then(|s, ctx| {
            let code = usize::try_from(index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map_or(f64::NAN, |c| f64::from(u32::from(c)));
            number::wrap(ctx, code)
        })
    }

    fn concat(&self, other: &str) -> Flow<String> {
        self.map_value(|s| format!("{}{}", s, other))
    }

    fn split(&self, separator: &str) -> Flow<Array> {
        self.and_then(|s, ctx| {
            let parts: Array = if separator.is_empty() {
                s.chars().map(Value::from).collect()
            } else {
                s.split(separator).map(Value::from).collect()
            };
            array::wrap(ctx, parts)
        })
    }

    fn split_pattern(&self, pattern: &str) -> Flow<Array> {
        self.try_then(
            failure(TypeTag::String, codes::PATTERN_ERROR),
            |s| compile(pattern).map(|re| re.split(s).map(Value::from).collect::<Array>()),
            array::wrap,
        )
    }

    fn slice(&self, start: i64, end: Option<i64>) -> Flow<String> {
        self.map_value(|s| {
            let chars: Vec<char> = s.chars().collect();
            let from = relative_index(start, chars.len());
            let to = end.map_or(chars.len(), |end| relative_index(end, chars.len()));
            if from >= to {
                String::new()
            } else {
                chars[from..to].iter().collect()
            }
        })
    }

    fn substring(&self, start: i64, end: Option<i64>) -> Flow<String> {
        self.map_value(|s| {
            let chars: Vec<char> = s.chars().collect();
            let a = clamp_index(start, chars.len());
            let b = end.map_or(chars.len(), |end| clamp_index(end, chars.len()));
            chars[a.min(b)..a.max(b)].iter().collect()
        })
    }

    fn equals(&self, other: &str) -> Flow<bool> {
        self.and_then(|s, ctx| boolean::wrap(ctx, s == other))
    }

    fn not_equal(&self, other: &str) -> Flow<bool> {
        self.and_then(|s, ctx| boolean::wrap(ctx, s != other))
    }

    fn flow_number(&self) -> Flow<f64> {
        self.and_then(|s, ctx| number::wrap(ctx, string_to_number(s)))
    }

    fn flow_float_number(&self) -> Flow<f64> {
        self.and_then(|s, ctx| number::wrap(ctx, parse_float(s)))
    }

    fn flow_boolean(&self) -> Flow<bool> {
        self.and_then(|s, ctx| boolean::wrap(ctx, !s.is_empty()))
    }

    fn flow_array(&self) -> Flow<Array> {
        self.and_then(|s, ctx| array::wrap(ctx, s.chars().map(Value::from).collect()))
    }

    fn flow_object(&self) -> Flow<Object> {
        self.try_then(
            failure(TypeTag::Object, codes::JSON_PARSE_ERROR),
            |s| -> Result<Object, ValidationError> {
                let parsed: Value = serde_json::from_str(s)?;
                Object::from_value(&parsed)
            },
            crate::object::wrap,
        )
    }
}

fn compile(pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern).map_err(|err| ValidationError::InvalidPattern(err.to_string()))
}

/// Longest string a pad may produce
const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

fn padding(s: &str, target_length: usize, fill: &str) -> Result<String, ValidationError> {
    let current = s.chars().count();
    if target_length <= current || fill.is_empty() {
        return Ok(String::new());
    }
    if target_length > MAX_STRING_LENGTH {
        return Err(ValidationError::Range("Invalid string length".to_string()));
    }
    Ok(fill.chars().cycle().take(target_length - current).collect())
}

fn char_position(s: &str, byte_index: Option<usize>) -> f64 {
    byte_index.map_or(-1.0, |b| s[..b].chars().count() as f64)
}

fn builtins() -> Methods<String> {
    Methods::new()
        .with("to_upper", |flow, _| Ok(flow.to_upper().into()))
        .with("to_lower", |flow, _| Ok(flow.to_lower().into()))
        .with("length", |flow, _| Ok(flow.length().into()))
        .with("reverse", |flow, _| Ok(flow.reverse().into()))
        .with("replace", |flow, values| {
            let args = Args::new(values);
            Ok(flow.replace(args.string(0)?, args.string(1)?).into())
        })
        .with("replace_all", |flow, values| {
            let args = Args::new(values);
            Ok(flow.replace_all(args.string(0)?, args.string(1)?).into())
        })
        .with("replace_pattern", |flow, values| {
            let args = Args::new(values);
            Ok(flow.replace_pattern(args.string(0)?, args.string(1)?).into())
        })
        .with("trim", |flow, _| Ok(flow.trim().into()))
        .with("trim_start", |flow, _| Ok(flow.trim_start().into()))
        .with("trim_end", |flow, _| Ok(flow.trim_end().into()))
        .with("pad_start", |flow, values| {
            let args = Args::new(values);
            let fill = args.opt_string(1)?.unwrap_or(" ");
            Ok(flow.pad_start(args.number(0)? as usize, fill).into())
        })
        .with("pad_end", |flow, values| {
            let args = Args::new(values);
            let fill = args.opt_string(1)?.unwrap_or(" ");
            Ok(flow.pad_end(args.number(0)? as usize, fill).into())
        })
        .with("starts_with", |flow, values| {
            Ok(flow.starts_with(Args::new(values).string(0)?).into())
        })
        .with("ends_with", |flow, values| {
            Ok(flow.ends_with(Args::new(values).string(0)?).into())
        })
        .with("includes", |flow, values| {
            Ok(flow.includes(Args::new(values).string(0)?).into())
        })
        .with("index_of", |flow, values| {
            Ok(flow.index_of(Args::new(values).string(0)?).into())
        })
        .with("last_index_of", |flow, values| {
            Ok(flow.last_index_of(Args::new(values).string(0)?).into())
        })
        .with("char_at", |flow, values| {
            let index = Args::new(values).opt_number(0)?.unwrap_or(0.0);
            Ok(flow.char_at(crate::convert::to_integer(index)).into())
        })
        .with("char_code_at", |flow, values| {
            let index = Args::new(values).opt_number(0)?.unwrap_or(0.0);
            Ok(flow.char_code_at(crate::convert::to_integer(index)).into())
        })
        .with("concat", |flow, values| {
            let joined: String = values.iter().map(Value::to_js_string).collect();
            Ok(flow.concat(&joined).into())
        })
        .with("split", |flow, values| {
            Ok(flow.split(Args::new(values).string(0)?).into())
        })
        .with("split_pattern", |flow, values| {
            Ok(flow.split_pattern(Args::new(values).string(0)?).into())
        })
        .with("slice", |flow, values| {
            let args = Args::new(values);
            let start = args.opt_number(0)?.map_or(0, crate::convert::to_integer);
            let end = args.opt_number(1)?.map(crate::convert::to_integer);
            Ok(flow.slice(start, end).into())
        })
        .with("substring", |flow, values| {
            let args = Args::new(values);
            let start = args.opt_number(0)?.map_or(0, crate::convert::to_integer);
            let end = args.opt_number(1)?.map(crate::convert::to_integer);
            Ok(flow.substring(start, end).into())
        })
        .with("equals", |flow, values| {
            Ok(flow.equals(Args::new(values).string(0)?).into())
        })
        .with("not_equal", |flow, values| {
            Ok(flow.not_equal(Args::new(values).string(0)?).into())
        })
        .with("flow_number", |flow, _| Ok(flow.flow_number().into()))
        .with("flow_float_number", |flow, _| Ok(flow.flow_float_number().into()))
        .with("flow_boolean", |flow, _| Ok(flow.flow_boolean().into()))
        .with("flow_array", |flow, _| Ok(flow.flow_array().into()))
        .with("flow_object", |flow, _| Ok(flow.flow_object().into()))
}
