// ==========================================
// 库存文件导入系统 - 校验违规
// ==========================================
// 职责: 单条违规 (字段, 消息)、违规列表及按发现顺序的 字段 → 消息 映射
// ==========================================

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 单条校验违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,   // 逻辑列标识（code / name / ...）
    pub message: String, // 可读错误信息
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 违规列表（保持发现顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationList {
    violations: Vec<Violation>,
}

impl ViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, other: ViolationList) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// 是否包含指定字段的违规
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// 转换为 字段 → 消息 映射（同字段后者覆盖前者，位置不变）
    pub fn to_field_messages(&self) -> FieldMessages {
        self.violations
            .iter()
            .map(|v| (v.field.clone(), v.message.clone()))
            .collect()
    }
}

// ==========================================
// FieldMessages - 字段 → 消息（保持发现顺序）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMessages {
    entries: Vec<(String, String)>,
}

impl FieldMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入消息；字段已存在时替换消息，保留首次出现的位置
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = message,
            None => self.entries.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, String)> {
        self.entries.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }
}

impl FromIterator<(String, String)> for FieldMessages {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut messages = FieldMessages::new();
        for (field, message) in iter {
            messages.insert(field, message);
        }
        messages
    }
}

impl<'a> IntoIterator for &'a FieldMessages {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// JSON 中以对象输出，键顺序即发现顺序
impl Serialize for FieldMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, message) in &self.entries {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

struct FieldMessagesVisitor;

impl<'de> Visitor<'de> for FieldMessagesVisitor {
    type Value = FieldMessages;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("字段到消息的映射")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut messages = FieldMessages::new();
        while let Some((field, message)) = access.next_entry::<String, String>()? {
            messages.insert(field, message);
        }
        Ok(messages)
    }
}

impl<'de> Deserialize<'de> for FieldMessages {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMessagesVisitor)
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
