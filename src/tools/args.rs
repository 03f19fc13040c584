//! Schema-driven preparation of a raw argument bag.
//!
//! Required parameters are checked first, then defaults from the descriptor
//! are filled in, scalar shapes are lightly coerced, and filepath arguments
//! are resolved. The resulting object is what the typed params deserialize
//! from.

use crate::catalog::{ParamKind, ParamSpec, ToolDescriptor};
use crate::errors::RequestError;
use crate::paths::PathResolver;
use rmcp::model::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn prepare_arguments(
    descriptor: &ToolDescriptor,
    raw: Option<&JsonObject>,
    resolver: &PathResolver,
) -> Result<JsonObject, RequestError> {
    let tool = descriptor.name.as_str();
    let mut args = raw.cloned().unwrap_or_default();

    check_required(descriptor, &args)?;

    for param in &descriptor.params {
        let present = args.get(param.name).is_some_and(|v| !v.is_null());
        if !present {
            match &param.default {
                Some(default) => {
                    args.insert(param.name.to_string(), default.clone());
                }
                None => {
                    args.remove(param.name);
                }
            }
            continue;
        }

        if let Some(value) = args.get_mut(param.name) {
            coerce(tool, param, value)?;
            if param.kind == ParamKind::FilePath
                && let Value::String(raw_path) = value
            {
                *value = Value::String(resolver.resolve(raw_path).to_string());
            }
        }
    }

    // Coercion can blank a value, e.g. a list string of only separators.
    check_required(descriptor, &args)?;
    Ok(args)
}

fn check_required(descriptor: &ToolDescriptor, args: &JsonObject) -> Result<(), RequestError> {
    let missing: Vec<&'static str> = descriptor
        .required_params()
        .filter(|param| args.get(param.name).is_none_or(is_blank))
        .map(|param| param.name)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(RequestError::MissingParameters {
        tool: descriptor.name.as_str(),
        names: missing,
    })
}

pub fn decode_params<T: DeserializeOwned>(
    descriptor: &ToolDescriptor,
    args: JsonObject,
) -> Result<T, RequestError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| RequestError::InvalidArguments {
        tool: descriptor.name.as_str(),
        message: e.to_string(),
    })
}

/// Absent-equivalent values: null, empty strings, empty arrays and objects.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn coerce(tool: &'static str, param: &ParamSpec, value: &mut Value) -> Result<(), RequestError> {
    let invalid = || RequestError::InvalidParameter {
        tool,
        name: param.name,
        expected: param.kind.expected(),
    };

    let coerced = match (param.kind, &*value) {
        (ParamKind::FilePath | ParamKind::String, Value::String(_)) => None,
        (ParamKind::FilePath | ParamKind::String, Value::Number(n)) => {
            Some(Value::String(n.to_string()))
        }
        (ParamKind::Boolean, Value::Bool(_)) => None,
        (ParamKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "0" | "" => Some(Value::Bool(false)),
            _ => return Err(invalid()),
        },
        (ParamKind::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => return Err(invalid()),
        },
        (ParamKind::Integer, Value::Number(n)) => {
            if n.is_u64() {
                None
            } else {
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 => Some(Value::from(f as u64)),
                    _ => return Err(invalid()),
                }
            }
        }
        (ParamKind::Integer, Value::String(s)) => match s.trim().parse::<u64>() {
            Ok(n) => Some(Value::from(n)),
            Err(_) => return Err(invalid()),
        },
        (ParamKind::StringList, Value::Array(items)) => {
            if items.iter().all(Value::is_string) {
                None
            } else {
                return Err(invalid());
            }
        }
        (ParamKind::StringList, Value::String(s)) => Some(Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
        )),
        (ParamKind::Rows, Value::Array(_)) => None,
        (ParamKind::Object, Value::Object(_)) => None,
        _ => return Err(invalid()),
    };

    if let Some(coerced) = coerced {
        *value = coerced;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ToolName, descriptor};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn blank_required_values_are_reported_together() {
        let resolver = PathResolver::new("/data");
        let args = object(json!({ "filepath": "", "sheet_name": "Sheet1", "cell": null }));
        let err = prepare_arguments(
            descriptor(ToolName::ApplyFormula),
            Some(&args),
            &resolver,
        )
        .unwrap_err();
        assert_matches!(
            err,
            RequestError::MissingParameters { names, .. } if names == vec!["filepath", "cell", "formula"]
        );
    }

    #[test]
    fn defaults_fill_absent_optionals_and_filepath_is_resolved() {
        let resolver = PathResolver::new("/data");
        let args = object(json!({ "filepath": "book.xlsx", "sheet_name": "S" }));
        let prepared = prepare_arguments(
            descriptor(ToolName::ReadDataFromExcel),
            Some(&args),
            &resolver,
        )
        .unwrap();
        assert_eq!(prepared["filepath"], json!("/data/book.xlsx"));
        assert_eq!(prepared["start_cell"], json!("A1"));
        assert_eq!(prepared["preview_only"], json!(false));
        assert!(!prepared.contains_key("end_cell"));
    }

    #[test]
    fn scalar_shapes_are_coerced() {
        let resolver = PathResolver::new("/data");
        let args = object(json!({
            "filepath": "/abs/book.xlsx",
            "sheet_name": "S",
            "start_cell": "A1",
            "bold": "true",
            "font_size": "14",
        }));
        let prepared =
            prepare_arguments(descriptor(ToolName::FormatRange), Some(&args), &resolver).unwrap();
        assert_eq!(prepared["filepath"], json!("/abs/book.xlsx"));
        assert_eq!(prepared["bold"], json!(true));
        assert_eq!(prepared["font_size"], json!(14));
        assert_eq!(prepared["italic"], json!(false));
    }

    #[test]
    fn separator_only_lists_count_as_missing() {
        let resolver = PathResolver::new("/data");
        let args = object(json!({
            "filepath": "book.xlsx",
            "sheet_name": "S",
            "data_range": "A1:B4",
            "rows": " , ",
            "values": "Sales",
        }));
        let err = prepare_arguments(
            descriptor(ToolName::CreatePivotTable),
            Some(&args),
            &resolver,
        )
        .unwrap_err();
        assert_matches!(
            err,
            RequestError::MissingParameters { names, .. } if names == vec!["rows"]
        );
    }

    #[test]
    fn wrong_shapes_name_the_parameter() {
        let resolver = PathResolver::new("/data");
        let args = object(json!({
            "filepath": "book.xlsx",
            "sheet_name": "S",
            "preview_only": { "nested": true },
        }));
        let err = prepare_arguments(
            descriptor(ToolName::ReadDataFromExcel),
            Some(&args),
            &resolver,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'preview_only': expected a boolean"
        );
    }
}
