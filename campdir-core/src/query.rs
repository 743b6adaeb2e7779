use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

const DEFAULT_LIMIT: usize = 25;
const DEFAULT_SORT: &str = "-created_at";

/// Parsed list-endpoint query: filtering, projection, sorting and
/// pagination applied uniformly to every collection listing.
#[derive(Debug, Default, PartialEq)]
pub struct ListQuery {
    filters: Vec<Filter>,
    select: Option<Vec<String>>,
    sort: Vec<SortKey>,
    page: usize,
    limit: usize,
}

#[derive(Debug, PartialEq)]
struct Filter {
    field: String,
    op: Op,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

#[derive(Debug, PartialEq)]
struct SortKey {
    field: String,
    descending: bool,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Page>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Page>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug)]
pub struct ListResult {
    /// Number of documents on this page.
    pub count: usize,
    pub pagination: Pagination,
    pub items: Vec<Value>,
}

impl ListQuery {
    pub fn parse(query: Option<&str>) -> Self {
        let mut parsed = ListQuery {
            page: 1,
            limit: DEFAULT_LIMIT,
            ..Default::default()
        };

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "select" => {
                    parsed.select = Some(
                        value
                            .split(',')
                            .filter(|field| !field.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                }
                "sort" => {
                    parsed.sort = value
                        .split(',')
                        .filter(|field| !field.is_empty())
                        .map(SortKey::parse)
                        .collect();
                }
                "page" => {
                    parsed.page = value.parse().unwrap_or(1).max(1);
                }
                "limit" => {
                    parsed.limit = value.parse().unwrap_or(DEFAULT_LIMIT).max(1);
                }
                _ => {
                    let (field, op) = split_operator(key.as_ref());
                    parsed.filters.push(Filter {
                        field: field.to_string(),
                        op,
                        value: value.to_string(),
                    });
                }
            }
        }

        if parsed.sort.is_empty() {
            parsed.sort = vec![SortKey::parse(DEFAULT_SORT)];
        }
        parsed
    }

    /// Fixes an extra equality filter, used by the nested child listings
    /// (`/bootcamps/:id/courses` and friends).
    pub fn scoped(mut self, field: &str, value: &str) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op: Op::Eq,
            value: value.to_string(),
        });
        self
    }

    pub fn apply<T: Serialize>(&self, docs: &[T]) -> anyhow::Result<ListResult> {
        let mut items: Vec<Value> = docs
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;

        items.retain(|doc| self.filters.iter().all(|filter| filter.matches(doc)));

        items.sort_by(|a, b| {
            for key in self.sort.iter() {
                let ord = cmp_values(&a[&key.field], &b[&key.field]);
                let ord = if key.descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let total = items.len();
        let start = (self.page - 1) * self.limit;
        let end = (start + self.limit).min(total);
        let mut items: Vec<Value> = if start < total {
            items.drain(start..end).collect()
        } else {
            Vec::new()
        };

        if let Some(fields) = self.select.as_ref() {
            for item in items.iter_mut() {
                project(item, fields);
            }
        }

        let pagination = Pagination {
            next: (end < total).then_some(Page {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.page > 1).then_some(Page {
                page: self.page - 1,
                limit: self.limit,
            }),
        };

        Ok(ListResult {
            count: items.len(),
            pagination,
            items,
        })
    }
}

impl SortKey {
    fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_string(),
                descending: true,
            },
            None => SortKey {
                field: spec.to_string(),
                descending: false,
            },
        }
    }
}

fn split_operator(key: &str) -> (&str, Op) {
    if let Some((field, rest)) = key.split_once('[') {
        let op = match rest.trim_end_matches(']') {
            "gt" => Op::Gt,
            "gte" => Op::Gte,
            "lt" => Op::Lt,
            "lte" => Op::Lte,
            "ne" => Op::Ne,
            "in" => Op::In,
            _ => return (key, Op::Eq),
        };
        (field, op)
    } else {
        (key, Op::Eq)
    }
}

impl Filter {
    fn matches(&self, doc: &Value) -> bool {
        let actual = &doc[&self.field];
        if actual.is_null() {
            // Only a negative filter can match a missing field.
            return self.op == Op::Ne;
        }
        match self.op {
            Op::Eq => match actual {
                Value::Array(values) => values.iter().any(|v| scalar_eq(v, &self.value)),
                _ => scalar_eq(actual, &self.value),
            },
            Op::Ne => !scalar_eq(actual, &self.value),
            Op::In => match actual {
                Value::Array(values) => self
                    .value
                    .split(',')
                    .any(|needle| values.iter().any(|v| scalar_eq(v, needle))),
                _ => self.value.split(',').any(|needle| scalar_eq(actual, needle)),
            },
            Op::Gt | Op::Gte | Op::Lt | Op::Lte => {
                let ord = cmp_scalar(actual, &self.value);
                match (self.op, ord) {
                    (Op::Gt, Some(Ordering::Greater)) => true,
                    (Op::Gte, Some(Ordering::Greater | Ordering::Equal)) => true,
                    (Op::Lt, Some(Ordering::Less)) => true,
                    (Op::Lte, Some(Ordering::Less | Ordering::Equal)) => true,
                    _ => false,
                }
            }
        }
    }
}

fn scalar_eq(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(s) => s == expected,
        Value::Number(n) => matches!(expected.parse::<f64>(), Ok(e) if n.as_f64() == Some(e)),
        Value::Bool(b) => expected.parse::<bool>() == Ok(*b),
        _ => false,
    }
}

/// Compares a document value against a raw query value: numerically
/// when the document side is a number, lexicographically otherwise.
fn cmp_scalar(actual: &Value, expected: &str) -> Option<Ordering> {
    match actual {
        Value::Number(n) => {
            let expected: f64 = expected.parse().ok()?;
            n.as_f64()?.partial_cmp(&expected)
        }
        Value::String(s) => Some(s.as_str().cmp(expected)),
        _ => None,
    }
}

fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        // Missing values sort last either direction.
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn project(item: &mut Value, fields: &[String]) {
    if let Value::Object(map) = item {
        map.retain(|key, _| key == "id" || fields.iter().any(|field| field == key));
    }
}
