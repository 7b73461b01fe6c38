use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::contract::{FieldKind, field_kind};

use super::provider::QueryRequest;

/// Largest page the provider accepts.
pub const MAX_PAGE_SIZE: i64 = 5000;

/// Comparison and ordering operations the provider understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lte,
    Sort,
}

impl FilterOp {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(FilterOp::Eq),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lte" => Some(FilterOp::Lte),
            "sort" => Some(FilterOp::Sort),
            _ => None,
        }
    }
}

/// One raw criterion as submitted by a caller. Operation and value are kept
/// loose here; the compiler is the boundary that rejects unknown operations
/// and fields rather than passing them through to the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterCriterion {
    pub operation: String,
    pub field: String,
    pub value: Value,
}

/// An ordered list of criteria plus paging, defining one screening query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub filters: Vec<FilterCriterion>,
    #[serde(default)]
    pub page_no: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// A validated, normalized criterion safe to send verbatim to the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFilter {
    pub operation: FilterOp,
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("unknown operation `{operation}`")]
    UnknownOperation { operation: String },

    #[error("`{field}` is not a queryable option field")]
    UnknownField { field: String },

    #[error("sort direction must be `asc` or `desc`, got `{value}`")]
    BadSortDirection { value: String },

    #[error("unsupported value for `{field}`: expected a number or string")]
    UnsupportedValue { field: String },
}

/// Compile a FilterSpec into the canonical provider request.
///
/// Pure and deterministic: the same spec always yields an identical request.
/// When several `sort` criteria are present only the last one is kept —
/// matching what the provider actually does with duplicates; no multi-key
/// sort is implied.
pub fn compile(
    spec: &FilterSpec,
    page_name: &str,
    provider_user: &str,
) -> Result<QueryRequest, FilterError> {
    let mut filters: Vec<CompiledFilter> = Vec::with_capacity(spec.filters.len());
    let mut last_sort: Option<usize> = None;

    for criterion in &spec.filters {
        let op = FilterOp::parse(&criterion.operation).ok_or_else(|| {
            FilterError::UnknownOperation {
                operation: criterion.operation.clone(),
            }
        })?;

        let kind = field_kind(&criterion.field).ok_or_else(|| FilterError::UnknownField {
            field: criterion.field.clone(),
        })?;

        let value = if op == FilterOp::Sort {
            normalize_direction(&criterion.value)?
        } else {
            normalize_value(&criterion.field, kind, &criterion.value)?
        };

        if op == FilterOp::Sort {
            // Last sort wins; drop any earlier one.
            if let Some(idx) = last_sort.take() {
                filters.remove(idx);
            }
            last_sort = Some(filters.len());
        }

        filters.push(CompiledFilter {
            operation: op,
            field: criterion.field.clone(),
            value,
        });
    }

    Ok(QueryRequest {
        filters,
        paging: true,
        page_no: spec.page_no.filter(|&p| p >= 1).unwrap_or(1),
        page_size: spec.page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        page_name: page_name.to_string(),
        user_id: provider_user.to_string(),
    })
}

/// Numbers pass through; strings are stripped of one layer of literal quotes
/// (the provider chokes on quoted string literals, so user-supplied
/// formatting must not leak through). A bare string is re-typed as a number
/// only when the field itself is numeric: a symbol like `"123"` must stay
/// text or the provider's equality check goes numeric and misses.
fn normalize_value(field: &str, kind: FieldKind, value: &Value) -> Result<Value, FilterError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => {
            let bare = strip_quotes(s);
            if kind == FieldKind::Num {
                if let Ok(n) = bare.parse::<f64>() {
                    if let Some(n) = serde_json::Number::from_f64(n) {
                        return Ok(Value::Number(n));
                    }
                }
            }
            Ok(Value::String(bare.to_string()))
        }
        _ => Err(FilterError::UnsupportedValue {
            field: field.to_string(),
        }),
    }
}

fn normalize_direction(value: &Value) -> Result<Value, FilterError> {
    let raw = match value {
        Value::String(s) => strip_quotes(s).to_ascii_lowercase(),
        other => other.to_string(),
    };
    match raw.as_str() {
        "asc" | "desc" => Ok(Value::String(raw)),
        _ => Err(FilterError::BadSortDirection { value: raw }),
    }
}

fn strip_quotes(s: &str) -> &str {
    let t = s.trim();
    if t.len() >= 2
        && ((t.starts_with('"') && t.ends_with('"'))
            || (t.starts_with('\'') && t.ends_with('\'')))
    {
        &t[1..t.len() - 1]
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(filters: Value) -> FilterSpec {
        serde_json::from_value(json!({ "filters": filters })).unwrap()
    }

    #[test]
    fn compiles_deterministically() {
        let s = spec(json!([
            { "operation": "eq", "field": "type", "value": "put" },
            { "operation": "gte", "field": "delta", "value": "-0.3" },
            { "operation": "sort", "field": "bidPrice", "value": "desc" },
        ]));
        let a = compile(&s, "options-screener", "svc").unwrap();
        let b = compile(&s, "options-screener", "svc").unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn rejects_unknown_field() {
        let s = spec(json!([{ "operation": "eq", "field": "gamma", "value": 1 }]));
        assert_eq!(
            compile(&s, "p", "u"),
            Err(FilterError::UnknownField {
                field: "gamma".into()
            })
        );
    }

    #[test]
    fn rejects_unknown_operation() {
        let s = spec(json!([{ "operation": "neq", "field": "delta", "value": 1 }]));
        assert_eq!(
            compile(&s, "p", "u"),
            Err(FilterError::UnknownOperation {
                operation: "neq".into()
            })
        );
    }

    #[test]
    fn normalizes_quoted_strings_and_numeric_strings() {
        let s = spec(json!([
            { "operation": "eq", "field": "type", "value": "\"put\"" },
            { "operation": "gte", "field": "delta", "value": "-0.3" },
        ]));
        let req = compile(&s, "p", "u").unwrap();
        assert_eq!(req.filters[0].value, json!("put"));
        assert_eq!(req.filters[1].value, json!(-0.3));
    }

    #[test]
    fn numeric_looking_text_values_stay_text() {
        // A ticker or sector that happens to parse as a number must not be
        // re-typed, or the provider's text equality never matches.
        let s = spec(json!([
            { "operation": "eq", "field": "symbol", "value": "123" },
            { "operation": "eq", "field": "sector", "value": "\"501\"" },
            { "operation": "gte", "field": "strike", "value": "100" },
        ]));
        let req = compile(&s, "p", "u").unwrap();
        assert_eq!(req.filters[0].value, json!("123"));
        assert_eq!(req.filters[1].value, json!("501"));
        assert_eq!(req.filters[2].value, json!(100.0));
    }

    #[test]
    fn last_sort_wins() {
        let s = spec(json!([
            { "operation": "sort", "field": "delta", "value": "asc" },
            { "operation": "eq", "field": "type", "value": "put" },
            { "operation": "sort", "field": "bidPrice", "value": "desc" },
        ]));
        let req = compile(&s, "p", "u").unwrap();
        let sorts: Vec<_> = req
            .filters
            .iter()
            .filter(|f| f.operation == FilterOp::Sort)
            .collect();
        assert_eq!(sorts.len(), 1);
        assert_eq!(sorts[0].field, "bidPrice");
        assert_eq!(sorts[0].value, json!("desc"));
    }

    #[test]
    fn clamps_paging() {
        let mut s = spec(json!([]));
        s.page_no = Some(0);
        s.page_size = Some(999_999);
        let req = compile(&s, "p", "u").unwrap();
        assert_eq!(req.page_no, 1);
        assert_eq!(req.page_size, MAX_PAGE_SIZE);

        s.page_no = Some(3);
        s.page_size = Some(0);
        let req = compile(&s, "p", "u").unwrap();
        assert_eq!(req.page_no, 3);
        assert_eq!(req.page_size, 1);
    }

    #[test]
    fn rejects_bad_sort_direction() {
        let s = spec(json!([
            { "operation": "sort", "field": "delta", "value": "sideways" },
        ]));
        assert_eq!(
            compile(&s, "p", "u"),
            Err(FilterError::BadSortDirection {
                value: "sideways".into()
            })
        );
    }
}
