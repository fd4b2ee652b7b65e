//! Records returned by a host search

use serde_json::{Map, Value};

/// One host match, kept as the raw JSON object returned by the service
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostRecord {
    fields: Map<String, Value>,
}

impl HostRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wraps a JSON value if it is an object; other values are not host records
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields)),
            _ => None,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Raw service banner (`data`), e.g. HTTP response headers and body
    pub fn banner(&self) -> Option<&str> {
        self.field("data").and_then(Value::as_str)
    }

    pub fn ip_str(&self) -> Option<&str> {
        self.field("ip_str").and_then(Value::as_str)
    }

    pub fn port(&self) -> Option<u64> {
        self.field("port").and_then(Value::as_u64)
    }

    /// `ip:port` for log lines
    pub fn label(&self) -> String {
        match (self.ip_str(), self.port()) {
            (Some(ip), Some(port)) => format!("{}:{}", ip, port),
            (Some(ip), None) => ip.to_string(),
            _ => "<unknown>".to_string(),
        }
    }

    /// Render the whole record as one line of text for banner matching.
    ///
    /// Objects become `map[key:value ...]` with sorted keys, arrays become
    /// `[a b]`, strings are written raw and `null` is `<nil>`. Version markers
    /// anywhere in the record, nested or not, end up in the output unchanged.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        write_map(&mut out, &self.fields);
        out
    }
}

fn write_map(out: &mut String, map: &Map<String, Value>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    out.push_str("map[");
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(key);
        out.push(':');
        write_value(out, &map[key]);
    }
    out.push(']');
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("<nil>"),
        Value::Bool(b) => out.push_str(&b.to_string()),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_map(out, map),
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    pub matches: Vec<HostRecord>,
    /// Total number of matches across all pages
    pub total: u64,
}

impl SearchPage {
    pub fn new(matches: Vec<HostRecord>, total: u64) -> Self {
        Self { matches, total }
    }
}
