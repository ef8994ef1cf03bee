//! CSV 表格编解码
//!
//! 首行为表头；读取时逐列推断类型：
//! - 全部非空单元格可解析为 `i64` ⇒ Int
//! - 否则可解析为 `f64` ⇒ Float
//! - 否则全部为 `true`/`false` ⇒ Bool
//! - 其余为 Str
//!
//! 写出时 Str 单元格（以及表头）一律加引号，Null 写为不带引号的空单元格。
//! [`read_csv_exact`] 据此还原：带引号的列是 Str，数字只在文本与写出形式
//! 完全一致时才识别，因此 `"0123"`、`""`、`"true"` 读回仍是原来的字符串。
//! [`read_csv`] 用于外部数据文件，忽略引号并宽松地解析数字。

use crate::data::Result;
use crate::models::{Column, Table, Value};
use std::io::{Read, Write};

/// 类型推断方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inference {
    /// 外部文件：能解析即可
    Lenient,
    /// 本模块写出的文件：引号与文本形式都要对得上
    Exact,
}

/// 单元格原文
struct Cell {
    text: String,
    quoted: bool,
}

/// 从 reader 读取外部 CSV 表格
///
/// `quote` 为引号字符，Lahman 的大部分表使用单引号。
pub fn read_csv<R: Read>(reader: R, quote: u8) -> Result<Table> {
    read_with(reader, quote, Inference::Lenient)
}

/// 读取 [`write_csv`] 写出的表格，值与类型保持不变
pub fn read_csv_exact<R: Read>(reader: R) -> Result<Table> {
    read_with(reader, b'"', Inference::Exact)
}

fn read_with<R: Read>(mut reader: R, quote: u8, mode: Inference) -> Result<Table> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw).map_err(csv::Error::from)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .quote(quote)
        .flexible(false)
        .from_reader(raw.as_slice());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut cells: Vec<Vec<Cell>> = headers.iter().map(|_| Vec::new()).collect();

    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record)? {
        // 沿原始字节逐字段前进，判断每个字段是否以引号开头
        let mut at = record.position().map_or(0, |p| p.byte() as usize);
        while matches!(raw.get(at), Some(b'\r' | b'\n')) {
            at += 1;
        }
        for (col, text) in cells.iter_mut().zip(record.iter()) {
            let quoted = raw.get(at) == Some(&quote);
            at += raw_field_len(text, quoted, quote) + 1;
            col.push(Cell {
                text: text.to_string(),
                quoted,
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, infer_column(cells, mode)))
        .collect();

    Table::new(columns)
}

/// 字段在原始输入中占用的字节数（引号内的引号写作两个）
fn raw_field_len(text: &str, quoted: bool, quote: u8) -> usize {
    if quoted {
        text.len() + 2 + text.bytes().filter(|b| *b == quote).count()
    } else {
        text.len()
    }
}

/// 将表格写为 CSV（含表头）
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<()> {
    // 引号由 render 自行添加
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    wtr.write_record(table.column_names().into_iter().map(quote_text))?;

    for idx in 0..table.height() {
        let row = table.columns().iter().map(|c| render(&c.values[idx]));
        wtr.write_record(row)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::Str(s) => quote_text(s),
        other => other.to_string(),
    }
}

fn quote_text(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// 推断整列的类型并转换
fn infer_column(cells: Vec<Cell>, mode: Inference) -> Vec<Value> {
    let exact = mode == Inference::Exact;

    if exact && cells.iter().any(|c| c.quoted) {
        return cells
            .into_iter()
            .map(|c| {
                if c.text.is_empty() && !c.quoted {
                    Value::Null
                } else {
                    Value::Str(c.text)
                }
            })
            .collect();
    }

    let accept = |text: &str, rendered: String| !exact || rendered == text;
    let non_empty = || cells.iter().map(|c| c.text.as_str()).filter(|t| !t.is_empty());

    if non_empty().all(|t| t.parse::<i64>().is_ok_and(|v| accept(t, v.to_string()))) {
        return convert(cells, |t| t.parse::<i64>().ok().map(Value::Int));
    }
    if non_empty().all(|t| t.parse::<f64>().is_ok_and(|v| accept(t, format!("{v:?}")))) {
        return convert(cells, |t| t.parse::<f64>().ok().map(Value::Float));
    }
    if non_empty().all(|t| parse_bool(t).is_some_and(|v| accept(t, v.to_string()))) {
        return convert(cells, |t| parse_bool(t).map(Value::Bool));
    }
    cells
        .into_iter()
        .map(|c| {
            if c.text.is_empty() {
                Value::Null
            } else {
                Value::Str(c.text)
            }
        })
        .collect()
}

fn convert(cells: Vec<Cell>, parse: impl Fn(&str) -> Option<Value>) -> Vec<Value> {
    cells
        .iter()
        .map(|c| parse(&c.text).unwrap_or(Value::Null))
        .collect()
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_infers_types() {
        let data = "playerID,yearID,AVG,active,note\n\
                    ruthba01,1927,0.356,false,\n\
                    gehrilo01,1927,0.373,true,triple crown\n";
        let table = read_csv(data.as_bytes(), b'"').unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(table.column("yearID").unwrap().values[0], Value::Int(1927));
        assert_eq!(table.column("AVG").unwrap().values[1], Value::Float(0.373));
        assert_eq!(table.column("active").unwrap().values[1], Value::Bool(true));
        assert_eq!(table.column("note").unwrap().values[0], Value::Null);
        assert_eq!(
            table.column("note").unwrap().values[1],
            Value::from("triple crown")
        );
    }

    #[test]
    fn test_single_quote_char() {
        let data = "schoolID,name_full\nabc,'Smith, John College'\n";
        let table = read_csv(data.as_bytes(), b'\'').unwrap();
        assert_eq!(
            table.column("name_full").unwrap().values[0],
            Value::from("Smith, John College")
        );
    }

    #[test]
    fn test_write_quotes_embedded_commas() {
        let table = Table::new(vec![
            Column::new("team", vec!["Boston, MA".into()]),
            Column::new("wins", vec![Value::Null]),
        ])
        .unwrap();

        let mut out = Vec::new();
        write_csv(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\"team\",\"wins\"\n\"Boston, MA\",\n");

        let back = read_csv_exact(text.as_bytes()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_exact_read_keeps_string_cells() {
        let table = Table::new(vec![
            Column::new("teamID", vec!["0123".into(), "".into(), Value::Null]),
            Column::new("note", vec!["true".into(), "a \"quoted\" word".into(), "x,y".into()]),
            Column::new("R", vec![Value::Int(5), Value::Int(-3), Value::Null]),
            Column::new("AVG", vec![Value::Float(0.3), Value::Float(2.0), Value::Null]),
        ])
        .unwrap();

        let mut out = Vec::new();
        write_csv(&mut out, &table).unwrap();
        assert_eq!(read_csv_exact(out.as_slice()).unwrap(), table);
    }

    #[test]
    fn test_exact_read_only_accepts_canonical_numbers() {
        let data = "a,b,c\n0123,1.50,TRUE\n7,2.5,false\n";
        let table = read_csv_exact(data.as_bytes()).unwrap();
        assert_eq!(table.column("a").unwrap().values[0], Value::from("0123"));
        assert_eq!(table.column("b").unwrap().values[1], Value::from("2.5"));
        assert_eq!(table.column("c").unwrap().values[0], Value::from("TRUE"));

        // 外部文件仍按宽松规则解析
        let lenient = read_csv(data.as_bytes(), b'"').unwrap();
        assert_eq!(lenient.column("a").unwrap().values[0], Value::Int(123));
        assert_eq!(lenient.column("b").unwrap().values[0], Value::Float(1.5));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(read_csv(data.as_bytes(), b'"').is_err());
    }
}
