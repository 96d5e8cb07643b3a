//! 行数据归一化（coercion）
//!
//! 后端返回的行字段表示并不统一：数值可能是字符串、数组可能被 JSON 编码成
//! 字符串或对象、布尔值可能为空。此处把原始行统一转换为强类型实体，
//! 事件与镜像中只会出现归一化后的实体。
//!
use crate::error::{DomainError, DomainResult};
use crate::value_object::Price;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// 后端原始行
pub type Row = Map<String, Value>;

/// 从原始行构造强类型实体
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> DomainResult<Self>;
}

/// 数值：JSON 数字或可解析的数字字符串
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// 布尔：JSON 布尔、常见的字符串写法或 0/1
pub fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" => Some(true),
            "false" | "f" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// 字符串列表：JSON 数组、JSON 编码的数组字符串或以下标为键的对象
pub fn as_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::Array(items) => Some(items.iter().filter_map(scalar_to_string).collect()),
        Value::String(s) if s.trim().is_empty() => Some(Vec::new()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner @ (Value::Array(_) | Value::Object(_))) => as_string_list(&inner),
            _ => None,
        },
        Value::Object(map) => {
            // 对象按数字下标排序，非数字键排在其后并保持原有顺序
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.parse::<usize>().unwrap_or(usize::MAX));
            Some(entries.into_iter().filter_map(|(_, v)| scalar_to_string(v)).collect())
        }
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 按实体读取原始行字段，失败时给出实体与字段信息
pub struct RowReader<'a> {
    entity: &'static str,
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    pub fn new(entity: &'static str, row: &'a Row) -> Self {
        Self { entity, row }
    }

    fn get(&self, field: &'static str) -> Option<&'a Value> {
        self.row.get(field).filter(|v| !v.is_null())
    }

    fn fail(&self, field: &'static str, reason: impl Into<String>) -> DomainError {
        DomainError::coercion(self.entity, field, reason)
    }

    /// 必填字符串（数字会被转换为字符串，便于兼容数字主键）
    pub fn string(&self, field: &'static str) -> DomainResult<String> {
        self.opt_string(field)?
            .ok_or_else(|| self.fail(field, "missing"))
    }

    pub fn opt_string(&self, field: &'static str) -> DomainResult<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(self.fail(field, format!("expected string, got {other}"))),
        }
    }

    pub fn number(&self, field: &'static str) -> DomainResult<f64> {
        let value = self.get(field).ok_or_else(|| self.fail(field, "missing"))?;
        as_number(value).ok_or_else(|| self.fail(field, format!("not a number: {value}")))
    }

    /// 金额字段：数值归一化后再做值对象校验
    pub fn price(&self, field: &'static str) -> DomainResult<Price> {
        Price::new(self.number(field)?).map_err(|e| self.fail(field, e.to_string()))
    }

    /// 非负整数计数，缺失时使用默认值
    pub fn count(&self, field: &'static str, default: u32) -> DomainResult<u32> {
        let Some(value) = self.get(field) else {
            return Ok(default);
        };
        let n = as_number(value).ok_or_else(|| self.fail(field, format!("not a number: {value}")))?;
        if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
            return Err(self.fail(field, format!("not a non-negative integer: {n}")));
        }
        Ok(n as u32)
    }

    /// 布尔字段，缺失或为空时使用默认值
    pub fn flag(&self, field: &'static str, default: bool) -> DomainResult<bool> {
        match self.get(field) {
            None => Ok(default),
            Some(value) => {
                as_flag(value).ok_or_else(|| self.fail(field, format!("not a boolean: {value}")))
            }
        }
    }

    pub fn list(&self, field: &'static str) -> DomainResult<Vec<String>> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(value) => as_string_list(value)
                .ok_or_else(|| self.fail(field, format!("not a list: {value}"))),
        }
    }

    /// RFC 3339 时间戳，缺失时取当前时间
    pub fn timestamp(&self, field: &'static str) -> DomainResult<DateTime<Utc>> {
        match self.get(field) {
            None => Ok(Utc::now()),
            Some(Value::String(s)) => Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
            Some(other) => Err(self.fail(field, format!("not a timestamp: {other}"))),
        }
    }

    /// 枚举字段：按 serde 名称解析，缺失时使用默认值
    pub fn variant<T>(&self, field: &'static str) -> DomainResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.get(field) {
            None => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| self.fail(field, e.to_string())),
        }
    }

    /// 原样 JSON 字段；JSON 编码的字符串会被解开
    pub fn json(&self, field: &'static str) -> Value {
        match self.get(field) {
            None => Value::Null,
            Some(Value::String(s)) => {
                serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
            }
            Some(other) => other.clone(),
        }
    }
}
