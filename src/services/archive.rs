// ZIP 归档读取
//
// 归档整体保存在内存中（`Bytes`），每次读取时重新解析中央目录，
// 因此同一份归档可以在多个任务间共享而无需加锁。

use crate::core::error::AppResult;
use crate::data::DataError;
use bytes::Bytes;
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// 内存中的 ZIP 归档
#[derive(Clone)]
pub struct ZipBundle {
    bytes: Bytes,
}

impl ZipBundle {
    /// 从下载的字节创建，立即校验归档结构
    pub fn from_bytes(bytes: Bytes) -> AppResult<Self> {
        let bundle = Self { bytes };
        bundle.open()?;
        Ok(bundle)
    }

    fn open(&self) -> AppResult<ZipArchive<Cursor<Bytes>>> {
        Ok(ZipArchive::new(Cursor::new(self.bytes.clone()))?)
    }

    /// 归档大小（字节）
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 所有条目名称（归档顺序）
    pub fn names(&self) -> AppResult<Vec<String>> {
        let archive = self.open()?;
        Ok(archive.file_names().map(str::to_string).collect())
    }

    /// 读取单个条目，不存在时返回 `NotFound`
    pub fn read_entry(&self, name: &str) -> AppResult<Vec<u8>> {
        let mut archive = self.open()?;
        let mut file = match archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(DataError::NotFound(name.to_string()).into())
            }
            Err(e) => return Err(e.into()),
        };

        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| DataError::io(Path::new(name), e))?;
        Ok(buf)
    }

    /// 读取名称匹配正则的全部条目，按归档中的顺序返回 `(名称, 内容)`
    pub fn read_matching(&self, pattern: &Regex) -> AppResult<Vec<(String, Vec<u8>)>> {
        let mut archive = self.open()?;
        let mut out = Vec::new();

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() || !pattern.is_match(file.name()) {
                continue;
            }
            let name = file.name().to_string();
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)
                .map_err(|e| DataError::io(Path::new(&name), e))?;
            out.push((name, buf));
        }

        tracing::debug!(pattern = %pattern, matched = out.len(), "读取归档匹配条目");
        Ok(out)
    }

    /// 将归档完整解压到目录（条目路径越界时由 zip 拒绝）
    pub fn extract_to(&self, dir: &Path) -> AppResult<()> {
        std::fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;
        let mut archive = self.open()?;
        archive.extract(dir)?;
        tracing::info!(directory = %dir.display(), entries = archive.len(), "归档已解压");
        Ok(())
    }
}

impl std::fmt::Debug for ZipBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipBundle")
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// 在内存中构造 ZIP，供各模块测试使用
#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Bytes {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    Bytes::from(writer.finish().unwrap().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppError;
    use tempfile::TempDir;

    fn register_zip() -> ZipBundle {
        ZipBundle::from_bytes(build_zip(&[
            ("register-master/README.md", b"# register"),
            ("register-master/data/people-0.csv", b"name_last\nruth\n"),
            ("register-master/data/names.csv", b"x\n1\n"),
            ("register-master/data/people-a.csv", b"name_last\ngehrig\n"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_rejects_non_zip() {
        let err = ZipBundle::from_bytes(Bytes::from_static(b"<html>not found</html>")).unwrap_err();
        assert!(matches!(err, AppError::Archive(_)));
    }

    #[test]
    fn test_read_matching_keeps_archive_order() {
        let pattern = Regex::new("/people.+csv$").unwrap();
        let matched = register_zip().read_matching(&pattern).unwrap();
        let names: Vec<&str> = matched.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["register-master/data/people-0.csv", "register-master/data/people-a.csv"]
        );
        assert_eq!(matched[1].1, b"name_last\ngehrig\n");
    }

    #[test]
    fn test_read_entry_missing_is_not_found() {
        let err = register_zip().read_entry("register-master/nope.csv").unwrap_err();
        assert!(matches!(err, AppError::Data(DataError::NotFound(_))));
        assert_eq!(register_zip().read_entry("register-master/README.md").unwrap(), b"# register");
    }

    #[test]
    fn test_extract_to() {
        let tmp = TempDir::new().unwrap();
        register_zip().extract_to(tmp.path()).unwrap();
        let content =
            std::fs::read_to_string(tmp.path().join("register-master/data/people-0.csv")).unwrap();
        assert_eq!(content, "name_last\nruth\n");
    }
}
