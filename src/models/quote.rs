//! 行情记录模型
//!
//! 上游接口返回的 JSON 对象原样保留，只追加一个本地序号字段 `id`

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 追加到每条记录上的序号字段名
pub const ID_FIELD: &str = "id";

/// 行情记录
///
/// 不对字段做任何校验或类型化，键顺序与上游一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteRecord(Map<String, Value>);

impl QuoteRecord {
    /// 从接口返回值构造记录
    ///
    /// 非对象或空对象视为无数据
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => Ok(Self(map)),
            Value::Object(_) => Err(anyhow!("响应为空对象")),
            other => Err(anyhow!("响应不是 JSON 对象: {}", type_name(&other))),
        }
    }

    /// 写入序号，已有的 `id` 字段会被原位替换
    pub fn assign_id(&mut self, id: u64) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    pub fn id(&self) -> Option<u64> {
        self.0.get(ID_FIELD).and_then(Value::as_u64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_accepts_object() {
        let record = QuoteRecord::from_value(json!({"c": 150.2, "h": 151.0})).unwrap();
        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        for value in [json!(null), json!([1, 2]), json!("SAP"), json!(42), json!({})] {
            assert!(QuoteRecord::from_value(value.clone()).is_err(), "{} 应被拒绝", value);
        }
    }

    /// id 追加在末尾，已有 id 原位替换
    #[test]
    fn test_assign_id_keeps_order() {
        let mut record = QuoteRecord::from_value(json!({"c": 1.0, "h": 2.0})).unwrap();
        record.assign_id(1);
        let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "h", "id"]);
        assert_eq!(record.id(), Some(1));

        let mut record = QuoteRecord::from_value(json!({"id": "x", "c": 1.0})).unwrap();
        record.assign_id(7);
        let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "c"]);
        assert_eq!(record.id(), Some(7));
    }
}
