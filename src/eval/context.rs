use crate::formula::Value;
use ahash::AHashMap;

/// Resolution seam between the evaluator and whoever owns the values.
///
/// The engine itself only ever pulls values through this trait; a plain
/// [`ValueContext`] satisfies it, and the session layer wraps one to resolve
/// symbolic keys through the variable registry.
pub trait Resolve {
    fn resolve(&self, key: &str) -> Option<Value>;
}

/// The flat value context: one map from field id / exposed key / scoped
/// repeater key to the current value.
///
/// The context is the only mutable state of an evaluation session. Hiding a
/// node never removes its value from here; toggling a condition back on must
/// restore prior input without re-entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueContext {
    values: AHashMap<String, Value>,
}

impl ValueContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Builds a context from the inbound JSON shape: a flat map of
    /// `string | number | boolean | null` values. Nested values are not part
    /// of the contract and are dropped.
    pub fn from_json(data: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut ctx = Self::new();
        for (key, raw) in data {
            if let Some(value) = json_to_value(raw) {
                ctx.values.insert(key.clone(), value);
            }
        }
        ctx
    }
}

impl Resolve for ValueContext {
    fn resolve(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

fn json_to_value(raw: &serde_json::Value) -> Option<Value> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Null => Some(Value::Null),
        _ => None,
    }
}
