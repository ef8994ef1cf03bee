//! 通用表格模型
//!
//! 所有数据源的结果都归一化为 `Table`：有序的命名列，每列是一组有序的类型化值。

use crate::data::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元格值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// 文本形式，CSV 写出时使用（Null 写为空串）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            // Debug 形式保留小数点，避免 1.0 被读回为整数
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// 列的逻辑类型（由非空值决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Bool,
    Str,
}

/// 命名列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 非空值的共同类型
    ///
    /// 全空列返回 `None`；同一列混合不同类型（包括整数与浮点）时返回 `Schema` 错误。
    pub fn value_type(&self) -> Result<Option<DataType>> {
        let mut dtype: Option<DataType> = None;
        for value in &self.values {
            let current = match value {
                Value::Null => continue,
                Value::Int(_) => DataType::Int,
                Value::Float(_) => DataType::Float,
                Value::Bool(_) => DataType::Bool,
                Value::Str(_) => DataType::Str,
            };
            match dtype {
                None => dtype = Some(current),
                Some(seen) if seen == current => {}
                Some(seen) => {
                    return Err(DataError::Schema(format!(
                        "列 '{}' 混合了 {seen:?} 与 {current:?} 类型",
                        self.name
                    )))
                }
            }
        }
        Ok(dtype)
    }

    /// 列类型，全空列按 `Str` 处理
    pub fn dtype(&self) -> DataType {
        self.value_type().ok().flatten().unwrap_or(DataType::Str)
    }
}

/// 表格
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// 创建表格，校验列长度一致、列名唯一且每列类型单一
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let table = Self { columns };
        table.validate()?;
        Ok(table)
    }

    /// 校验表格结构（反序列化得到的表格不经过 [`Table::new`]）
    pub fn validate(&self) -> Result<()> {
        let columns = &self.columns;
        if let Some(first) = columns.first() {
            let height = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != height) {
                return Err(DataError::Schema(format!(
                    "列 '{}' 长度为 {}，期望 {}",
                    bad.name,
                    bad.len(),
                    height
                )));
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(DataError::Schema(format!("列名重复: '{}'", col.name)));
            }
            col.value_type()?;
        }
        Ok(())
    }

    /// 只有列名、没有行的空表
    pub fn empty<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            columns: names
                .iter()
                .map(|n| Column::new(n.as_ref(), Vec::new()))
                .collect(),
        }
    }

    /// 行数
    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// 第 `idx` 行（越界返回 None）
    pub fn row(&self, idx: usize) -> Option<Vec<&Value>> {
        if idx >= self.height() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[idx]).collect())
    }

    /// 按给定顺序选取列
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name.as_ref())
                    .cloned()
                    .ok_or_else(|| DataError::Schema(format!("列不存在: '{}'", name.as_ref())))
            })
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// 按行号取行（行号可重复，顺序即结果顺序）
    pub fn take(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = indices
                    .iter()
                    .filter_map(|&i| c.values.get(i).cloned())
                    .collect();
                Column::new(c.name.clone(), values)
            })
            .collect();
        Table { columns }
    }

    /// 纵向拼接，两表列名（含顺序）必须一致；空列表视为单位元
    pub fn vstack(&mut self, other: Table) -> Result<()> {
        if self.columns.is_empty() {
            *self = other;
            return Ok(());
        }
        if other.columns.is_empty() {
            return Ok(());
        }
        if self.column_names() != other.column_names() {
            return Err(DataError::Schema(format!(
                "拼接列不匹配: {:?} vs {:?}",
                self.column_names(),
                other.column_names()
            )));
        }
        for (col, extra) in self.columns.iter().zip(&other.columns) {
            if let (Some(a), Some(b)) = (col.value_type()?, extra.value_type()?) {
                if a != b {
                    return Err(DataError::Schema(format!(
                        "拼接列 '{}' 类型不一致: {a:?} vs {b:?}",
                        col.name
                    )));
                }
            }
        }
        for (col, extra) in self.columns.iter_mut().zip(other.columns) {
            col.values.extend(extra.values);
        }
        Ok(())
    }

    /// 依次纵向拼接多张表
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Result<Table> {
        let mut out = Table::default();
        for table in tables {
            out.vstack(table)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("name", vec!["ruth".into(), "gehrig".into()]),
            Column::new("hr", vec![Value::Int(714), Value::Int(493)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("a", vec![Value::Int(2)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("列名重复"));
    }

    #[test]
    fn test_select_and_take() {
        let table = sample();
        let hr = table.select(&["hr"]).unwrap();
        assert_eq!(hr.width(), 1);
        assert_eq!(hr.height(), 2);

        let picked = table.take(&[1, 1]);
        assert_eq!(picked.height(), 2);
        assert_eq!(picked.row(0).unwrap()[0], &Value::from("gehrig"));
        assert!(table.select(&["missing"]).is_err());
    }

    #[test]
    fn test_concat_keeps_order() {
        let table = Table::concat(vec![sample(), sample().take(&[0])]).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(table.row(2).unwrap()[0], &Value::from("ruth"));
    }

    #[test]
    fn test_vstack_mismatched_columns() {
        let mut table = sample();
        let other = Table::empty(&["other"]);
        assert!(table.vstack(other).is_err());
    }

    #[test]
    fn test_dtype_inference() {
        let col = Column::new("x", vec![Value::Int(1), Value::Null, Value::Int(2)]);
        assert_eq!(col.dtype(), DataType::Int);
        let col = Column::new("x", vec![Value::Null, Value::Null]);
        assert_eq!(col.value_type().unwrap(), None);
        assert_eq!(col.dtype(), DataType::Str);
    }

    #[test]
    fn test_new_rejects_mixed_types() {
        for values in [
            vec![Value::Int(5), Value::from("a")],
            vec![Value::Int(1), Value::Null, Value::Float(2.5)],
            vec![Value::Bool(true), Value::Int(1)],
        ] {
            let err = Table::new(vec![Column::new("x", values)]).unwrap_err();
            assert!(matches!(err, DataError::Schema(_)));
        }
    }

    #[test]
    fn test_vstack_rejects_type_change() {
        let mut table = Table::new(vec![Column::new("hr", vec![Value::Int(60)])]).unwrap();
        let other = Table::new(vec![Column::new("hr", vec![Value::from("sixty")])]).unwrap();
        assert!(table.vstack(other).is_err());
        assert_eq!(table.height(), 1);

        let nulls = Table::new(vec![Column::new("hr", vec![Value::Null])]).unwrap();
        table.vstack(nulls).unwrap();
        assert_eq!(table.height(), 2);
    }
}
