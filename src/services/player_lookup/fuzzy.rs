//! 模糊姓名匹配

use std::cmp::Ordering;

/// 模糊匹配最多返回的行数
pub const MAX_FUZZY_MATCHES: usize = 5;

/// 按全名相似度挑选最接近的记录
///
/// `names` 为 `(last, first)`。每行按 [`full_name`] 构造 `"first last"` 与查询比较
/// （归一化 Levenshtein 相似度，取值 0..=1），按相似度降序返回至多 5 个下标；相同分数保持注册表顺序。
pub fn closest_indices<'a, I>(query: &str, names: I) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut scored: Vec<(usize, f64)> = names
        .into_iter()
        .enumerate()
        .map(|(idx, (last, first))| {
            let candidate = full_name(last, Some(first));
            (idx, strsim::normalized_levenshtein(query, &candidate))
        })
        .collect();

    // 稳定排序，相同分数保留原顺序
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(MAX_FUZZY_MATCHES);
    scored
}

/// 构造全名 `"first last"`，缺失的名字按空串处理
pub fn full_name(last: &str, first: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or(""), last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_and_sorted() {
        let registry = [
            ("ruth", "babe"),
            ("ruth", "george"),
            ("gehrig", "lou"),
            ("rush", "bob"),
            ("ruthven", "dick"),
            ("roth", "braggo"),
            ("mays", "willie"),
        ];

        let result = closest_indices(&full_name("ruht", Some("babe")), registry);
        assert_eq!(result.len(), MAX_FUZZY_MATCHES);
        assert_eq!(result[0].0, 0);
        assert!(result.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_ties_keep_registry_order() {
        let registry = [("abc", "x"), ("abd", "x"), ("abe", "x")];
        let result = closest_indices(&full_name("abz", Some("x")), registry);
        let order: Vec<usize> = result.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_fewer_rows_than_limit() {
        assert_eq!(closest_indices("anything", [("ruth", "babe")]).len(), 1);
        assert!(closest_indices("anything", Vec::<(&str, &str)>::new()).is_empty());
    }

    #[test]
    fn test_full_name_without_first() {
        assert_eq!(full_name("ruth", None), " ruth");
    }
}
