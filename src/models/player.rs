//! 球员注册表数据模型

use super::table::{Column, Table, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 注册表保留的列（顺序即输出顺序）
pub const REGISTRY_COLUMNS: [&str; 8] = [
    "name_last",
    "name_first",
    "key_mlbam",
    "key_retro",
    "key_bbref",
    "key_fangraphs",
    "mlb_played_first",
    "mlb_played_last",
];

/// 数字 ID 缺失时的占位值
pub const UNKNOWN_ID: i64 = -1;

/// 注册表中的一名球员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name_last: String,
    pub name_first: String,
    /// MLB Advanced Media ID，未知为 -1
    pub key_mlbam: i64,
    /// Retrosheet ID
    pub key_retro: Option<String>,
    /// Baseball-Reference ID
    pub key_bbref: Option<String>,
    /// FanGraphs ID，未知为 -1
    pub key_fangraphs: i64,
    pub mlb_played_first: Option<i64>,
    pub mlb_played_last: Option<i64>,
}

/// 某个 ID 体系下的取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValue<'a> {
    /// 数字 ID，缺失时为 -1
    Numeric(i64),
    Text(Option<&'a str>),
}

impl PlayerRecord {
    /// 指定 ID 体系下的值，数字 ID 的 -1 占位值原样返回
    pub fn key(&self, key_type: KeyType) -> KeyValue<'_> {
        match key_type {
            KeyType::Mlbam => KeyValue::Numeric(self.key_mlbam),
            KeyType::Retro => KeyValue::Text(self.key_retro.as_deref()),
            KeyType::Bbref => KeyValue::Text(self.key_bbref.as_deref()),
            KeyType::Fangraphs => KeyValue::Numeric(self.key_fangraphs),
        }
    }

    /// 转换为通用表格
    pub fn to_table(records: &[PlayerRecord]) -> Table {
        let mut columns: Vec<Column> = REGISTRY_COLUMNS
            .iter()
            .map(|name| Column::new(*name, Vec::with_capacity(records.len())))
            .collect();

        for r in records {
            let row: [Value; 8] = [
                r.name_last.clone().into(),
                r.name_first.clone().into(),
                r.key_mlbam.into(),
                r.key_retro.clone().into(),
                r.key_bbref.clone().into(),
                r.key_fangraphs.into(),
                r.mlb_played_first.into(),
                r.mlb_played_last.into(),
            ];
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }

        // 列长度一致、列名唯一，构造不会失败
        Table::new(columns).unwrap_or_default()
    }
}

/// 反向查询支持的 ID 体系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Mlbam,
    Retro,
    Bbref,
    Fangraphs,
}

impl KeyType {
    pub const ALL: [KeyType; 4] = [
        KeyType::Mlbam,
        KeyType::Retro,
        KeyType::Bbref,
        KeyType::Fangraphs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Mlbam => "mlbam",
            KeyType::Retro => "retro",
            KeyType::Bbref => "bbref",
            KeyType::Fangraphs => "fangraphs",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的 ID 体系
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("无效的键类型 '{key_type}'，必须是以下之一: mlbam, retro, bbref, fangraphs")]
pub struct InvalidKeyType {
    pub key_type: String,
}

impl FromStr for KeyType {
    type Err = InvalidKeyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyType::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| InvalidKeyType {
                key_type: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruth() -> PlayerRecord {
        PlayerRecord {
            name_last: "ruth".to_string(),
            name_first: "babe".to_string(),
            key_mlbam: 121578,
            key_retro: Some("ruthb101".to_string()),
            key_bbref: Some("ruthba01".to_string()),
            key_fangraphs: UNKNOWN_ID,
            mlb_played_first: Some(1914),
            mlb_played_last: Some(1935),
        }
    }

    #[test]
    fn test_key_type_parse() {
        assert_eq!("retro".parse::<KeyType>().unwrap(), KeyType::Retro);
        let err = "bogus".parse::<KeyType>().unwrap_err();
        assert_eq!(err.key_type, "bogus");
        let msg = err.to_string();
        for k in KeyType::ALL {
            assert!(msg.contains(k.as_str()));
        }
    }

    #[test]
    fn test_key_values() {
        let mut r = ruth();
        assert_eq!(r.key(KeyType::Mlbam), KeyValue::Numeric(121578));
        assert_eq!(r.key(KeyType::Bbref), KeyValue::Text(Some("ruthba01")));
        assert_eq!(r.key(KeyType::Fangraphs), KeyValue::Numeric(UNKNOWN_ID));
        r.key_retro = None;
        assert_eq!(r.key(KeyType::Retro), KeyValue::Text(None));
    }

    #[test]
    fn test_to_table_columns() {
        let table = PlayerRecord::to_table(&[ruth(), ruth()]);
        assert_eq!(table.column_names(), REGISTRY_COLUMNS.to_vec());
        assert_eq!(table.height(), 2);
        assert_eq!(table.column("key_fangraphs").unwrap().values[0], Value::Int(-1));
        assert_eq!(table.column("key_retro").unwrap().values[1], Value::from("ruthb101"));
    }
}
