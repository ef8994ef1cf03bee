//! 名称规范化

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 去除重音符号：NFD 分解后丢弃组合标记（`pérez` → `perez`）
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// 查询与匹配用的规范形式：小写，可选去重音
pub fn fold_name(s: &str, ignore_accents: bool) -> String {
    let lower = s.to_lowercase();
    if ignore_accents {
        strip_accents(&lower)
    } else {
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("pérez"), "perez");
        assert_eq!(strip_accents("Acuña"), "Acuna");
        assert_eq!(strip_accents("ruth"), "ruth");
        assert_eq!(strip_accents(""), "");
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("PÉREZ", false), "pérez");
        assert_eq!(fold_name("PÉREZ", true), "perez");
    }
}
