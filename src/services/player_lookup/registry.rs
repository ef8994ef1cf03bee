// 球员注册表加载
//
// 远程来源为 Chadwick Bureau register 归档；本地可选保存为
// `{cache_dir}/chadwick-register.csv`，后续加载直接读取该文件。

use crate::core::error::AppResult;
use crate::core::http::fetch_bytes;
use crate::data::DataError;
use crate::models::player::{PlayerRecord, UNKNOWN_ID};
use crate::services::archive::ZipBundle;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 本地注册表文件名
pub const REGISTER_FILE_NAME: &str = "chadwick-register.csv";

/// 归档中球员数据文件的匹配规则
static PEOPLE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/people.+csv$").expect("people 文件正则无效"));

/// 注册表来源
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// 来源名称（用于日志）
    fn name(&self) -> &str;

    /// 拉取完整注册表（已过滤、已填充缺失 ID，保持原始大小写）
    async fn fetch(&self) -> AppResult<Vec<PlayerRecord>>;
}

/// Chadwick Bureau register 远程归档
pub struct ChadwickRegister {
    client: reqwest::Client,
    url: String,
}

impl ChadwickRegister {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RegistrySource for ChadwickRegister {
    fn name(&self) -> &str {
        "chadwick"
    }

    async fn fetch(&self) -> AppResult<Vec<PlayerRecord>> {
        tracing::info!(url = %self.url, "正在下载球员注册表，可能需要一些时间");
        let bytes = fetch_bytes(&self.client, &self.url).await?;
        let bundle = ZipBundle::from_bytes(bytes)?;
        records_from_archive(&bundle)
    }
}

/// 从 register 归档中读取所有 people 文件并合并
pub fn records_from_archive(bundle: &ZipBundle) -> AppResult<Vec<PlayerRecord>> {
    let files = bundle.read_matching(&PEOPLE_FILE)?;
    if files.is_empty() {
        return Err(DataError::NotFound("register 归档中没有 people 文件".to_string()).into());
    }

    let mut records = Vec::new();
    let mut raw_rows = 0usize;
    for (name, content) in files {
        let rows = read_people(content.as_slice(), Path::new(&name))?;
        raw_rows += rows.len();
        records.extend(rows.into_iter().filter_map(RawPerson::into_record));
    }

    tracing::info!(
        rows = raw_rows,
        kept = records.len(),
        "球员注册表解析完成（仅保留大联盟球员）"
    );
    Ok(records)
}

/// 加载注册表
///
/// 本地文件存在且未要求强制刷新时直接读取；否则从来源拉取，
/// `save` 为真时写入本地文件。
pub async fn load_registry(
    source: &dyn RegistrySource,
    register_file: &Path,
    force_refresh: bool,
    save: bool,
) -> AppResult<Vec<PlayerRecord>> {
    if !force_refresh && register_file.exists() {
        tracing::debug!(path = %register_file.display(), "从本地文件读取球员注册表");
        return Ok(read_register_file(register_file)?);
    }

    let records = source.fetch().await?;
    tracing::info!(source = source.name(), players = records.len(), "球员注册表已拉取");

    if save {
        write_register_file(register_file, &records)?;
    }
    Ok(records)
}

/// 本地注册表文件路径
pub fn register_file_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(REGISTER_FILE_NAME)
}

/// 读取本地注册表文件
pub fn read_register_file(path: &Path) -> crate::data::Result<Vec<PlayerRecord>> {
    let file = std::fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let rows = read_people(file, path)?;
    Ok(rows.into_iter().filter_map(RawPerson::into_record).collect())
}

/// 原子写入本地注册表文件
pub fn write_register_file(path: &Path, records: &[PlayerRecord]) -> crate::data::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| DataError::io(dir, e))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|e| DataError::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| DataError::io(path, e.error))?;

    tracing::info!(path = %path.display(), players = records.len(), "球员注册表已保存");
    Ok(())
}

fn read_people<R: Read>(reader: R, origin: &Path) -> crate::data::Result<Vec<RawPerson>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize::<RawPerson>() {
        rows.push(row?);
    }
    tracing::trace!(origin = %origin.display(), rows = rows.len(), "读取 people 表");
    Ok(rows)
}

/// people 文件中的一行（只取需要的列，其余列忽略）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPerson {
    name_last: Option<String>,
    name_first: Option<String>,
    key_mlbam: Option<String>,
    key_retro: Option<String>,
    key_bbref: Option<String>,
    key_fangraphs: Option<String>,
    mlb_played_first: Option<String>,
    mlb_played_last: Option<String>,
}

impl RawPerson {
    /// 转换为记录；大联盟相关列全部缺失时丢弃
    fn into_record(self) -> Option<PlayerRecord> {
        let key_retro = non_empty(self.key_retro);
        let key_bbref = non_empty(self.key_bbref);
        let key_fangraphs = parse_int(self.key_fangraphs.as_deref());
        let mlb_played_first = parse_int(self.mlb_played_first.as_deref());
        let mlb_played_last = parse_int(self.mlb_played_last.as_deref());

        let is_major_leaguer = key_retro.is_some()
            || key_bbref.is_some()
            || key_fangraphs.is_some_and(|v| v != UNKNOWN_ID)
            || mlb_played_first.is_some()
            || mlb_played_last.is_some();
        if !is_major_leaguer {
            return None;
        }

        Some(PlayerRecord {
            name_last: self.name_last.unwrap_or_default(),
            name_first: self.name_first.unwrap_or_default(),
            key_mlbam: parse_int(self.key_mlbam.as_deref()).unwrap_or(UNKNOWN_ID),
            key_retro,
            key_bbref,
            key_fangraphs: key_fangraphs.unwrap_or(UNKNOWN_ID),
            mlb_played_first,
            mlb_played_last,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 宽松解析整数，兼容 `"123.0"` 形式
fn parse_int(value: Option<&str>) -> Option<i64> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}
