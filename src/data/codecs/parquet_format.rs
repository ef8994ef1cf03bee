//! Parquet 表格编解码
//!
//! 整张表写为单个 record batch，列类型映射：
//! Int → Int64，Float → Float64，Bool → Boolean，Str / 全空列 → Utf8，全部可空。
//! 混合类型的列无法无损写出，返回 `Schema` 错误。

use crate::data::{DataError, Result};
use crate::models::{Column, DataType, Table, Value};
use arrow_array::cast::AsArray;
use arrow_array::types::{Float64Type, Int32Type, Int64Type};
use arrow_array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray,
};
use arrow_schema::{DataType as ArrowType, Field, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// 将表格写为 Parquet
pub fn write_parquet<W: Write + Send>(writer: W, table: &Table) -> Result<()> {
    if table.width() == 0 {
        return Err(DataError::Schema("Parquet 不支持零列表格".to_string()));
    }

    let mut fields = Vec::with_capacity(table.width());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.width());
    for col in table.columns() {
        let (arrow_type, array) = to_arrow(col)?;
        fields.push(Field::new(col.name.as_str(), arrow_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let mut parquet_writer = ArrowWriter::try_new(writer, schema, None)?;
    parquet_writer.write(&batch)?;
    parquet_writer.close()?;
    Ok(())
}

/// 读取 Parquet 文件为表格
pub fn read_parquet_file(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // 先按 schema 建列，零行文件也能保留列名
    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();

    for batch in builder.build()? {
        let batch = batch?;
        for (col, array) in columns.iter_mut().zip(batch.columns()) {
            append_values(col, array.as_ref())?;
        }
    }

    Table::new(columns)
}

fn to_arrow(col: &Column) -> Result<(ArrowType, ArrayRef)> {
    let converted: (ArrowType, ArrayRef) = match col.value_type()?.unwrap_or(DataType::Str) {
        DataType::Int => {
            let array: Int64Array = col.values.iter().map(Value::as_i64).collect();
            (ArrowType::Int64, Arc::new(array))
        }
        DataType::Float => {
            let array: Float64Array = col.values.iter().map(Value::as_f64).collect();
            (ArrowType::Float64, Arc::new(array))
        }
        DataType::Bool => {
            let array: BooleanArray = col.values.iter().map(Value::as_bool).collect();
            (ArrowType::Boolean, Arc::new(array))
        }
        DataType::Str => {
            let array: StringArray = col.values.iter().map(Value::as_str).collect();
            (ArrowType::Utf8, Arc::new(array))
        }
    };
    Ok(converted)
}

fn append_values(col: &mut Column, array: &dyn Array) -> Result<()> {
    match array.data_type() {
        ArrowType::Int64 => col.values.extend(
            array
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(Value::Int).unwrap_or(Value::Null)),
        ),
        ArrowType::Int32 => col.values.extend(
            array
                .as_primitive::<Int32Type>()
                .iter()
                .map(|v| v.map(|x| Value::Int(i64::from(x))).unwrap_or(Value::Null)),
        ),
        ArrowType::Float64 => col.values.extend(
            array
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map(Value::Float).unwrap_or(Value::Null)),
        ),
        ArrowType::Boolean => col.values.extend(
            array
                .as_boolean()
                .iter()
                .map(|v| v.map(Value::Bool).unwrap_or(Value::Null)),
        ),
        ArrowType::Utf8 => col.values.extend(
            array
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(Value::from).unwrap_or(Value::Null)),
        ),
        ArrowType::LargeUtf8 => col.values.extend(
            array
                .as_string::<i64>()
                .iter()
                .map(|v| v.map(Value::from).unwrap_or(Value::Null)),
        ),
        other => {
            return Err(DataError::Schema(format!(
                "列 '{}' 的 Parquet 类型不受支持: {other}",
                col.name
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn batting() -> Table {
        Table::new(vec![
            Column::new("playerID", vec!["ruthba01".into(), Value::Null]),
            Column::new("HR", vec![Value::Int(60), Value::Null]),
            Column::new("AVG", vec![Value::Float(0.356), Value::Float(1.0)]),
            Column::new("HOF", vec![Value::Bool(true), Value::Bool(false)]),
            Column::new("notes", vec![Value::Null, Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parquet_preserves_types_and_nulls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batting.parquet");
        let table = batting();

        let file = File::create(&path).unwrap();
        write_parquet(file, &table).unwrap();

        assert_eq!(read_parquet_file(&path).unwrap(), table);
    }

    #[test]
    fn test_parquet_zero_rows_keeps_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.parquet");
        let table = Table::empty(&["name_last", "name_first"]);

        write_parquet(File::create(&path).unwrap(), &table).unwrap();
        let back = read_parquet_file(&path).unwrap();

        assert_eq!(back.column_names(), vec!["name_last", "name_first"]);
        assert_eq!(back.height(), 0);
    }

    #[test]
    fn test_parquet_rejects_zero_columns() {
        let mut out = Vec::new();
        let err = write_parquet(&mut out, &Table::default()).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn test_parquet_rejects_mixed_column() {
        // 绕过 Table::new 的校验，模拟反序列化得到的表格
        let table: Table =
            serde_json::from_str(r#"{"columns":[{"name":"x","values":[5,"a"]}]}"#).unwrap();
        let mut out = Vec::new();
        let err = write_parquet(&mut out, &table).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.parquet");
        std::fs::write(&path, b"not a parquet file").unwrap();
        assert!(read_parquet_file(&path).is_err());
    }
}
