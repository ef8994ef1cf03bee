//! 表格编解码
//!
//! 持久化格式完全由文件后缀决定：
//! - `csv`: 文本表格（`csv` crate，字符串加引号写出，读回时值与类型不变）
//! - `parquet`: 列式二进制（`parquet` + `arrow`）

pub mod csv_format;
pub mod parquet_format;

use crate::data::{DataError, Result};
use crate::models::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 支持的表格持久化格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl Default for TableFormat {
    fn default() -> Self {
        TableFormat::Parquet
    }
}

impl TableFormat {
    /// 文件后缀（不含点）
    pub fn ext(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }

    /// 根据文件后缀识别格式（大小写不敏感），其他后缀返回 `UnsupportedFormat`
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("parquet") => Ok(TableFormat::Parquet),
            _ => Err(DataError::unsupported(path)),
        }
    }
}

/// 按后缀读取表格文件
pub fn read_table(path: &Path) -> Result<Table> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => {
            let file = std::fs::File::open(path).map_err(|e| DataError::io(path, e))?;
            csv_format::read_csv_exact(file)
        }
        TableFormat::Parquet => parquet_format::read_parquet_file(path),
    }
}

/// 按后缀写出表格文件
///
/// 先校验后缀再创建文件，不支持的格式不会留下任何文件。
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    let file = std::fs::File::create(path).map_err(|e| DataError::io(path, e))?;
    write_to(file, table, format)
}

/// 以指定格式写入任意 writer
pub fn write_to<W>(writer: W, table: &Table, format: TableFormat) -> Result<()>
where
    W: std::io::Write + Send,
{
    match format {
        TableFormat::Csv => csv_format::write_csv(writer, table),
        TableFormat::Parquet => parquet_format::write_parquet(writer, table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, Value};
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            TableFormat::from_path(Path::new("a/b.CSV")).unwrap(),
            TableFormat::Csv
        );
        assert_eq!(
            TableFormat::from_path(Path::new("x.parquet")).unwrap(),
            TableFormat::Parquet
        );
        assert!(matches!(
            TableFormat::from_path(Path::new("x.json")),
            Err(DataError::UnsupportedFormat { .. })
        ));
        assert!(TableFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_write_unsupported_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.xlsx");
        let table = Table::new(vec![Column::new("a", vec![Value::Int(1)])]).unwrap();

        let err = write_table(&path, &table).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_then_read_by_suffix() {
        let dir = TempDir::new().unwrap();
        let table = Table::new(vec![
            Column::new("playerID", vec!["ruthba01".into(), "gehrilo01".into()]),
            Column::new("HR", vec![Value::Int(60), Value::Int(47)]),
            Column::new("zip", vec!["02215".into(), "".into()]),
        ])
        .unwrap();

        for name in ["t.csv", "t.parquet"] {
            let path = dir.path().join(name);
            write_table(&path, &table).unwrap();
            assert_eq!(read_table(&path).unwrap(), table);
        }
    }
}
