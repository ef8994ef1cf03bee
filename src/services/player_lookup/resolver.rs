// 球员身份解析：精确、模糊、批量与反向查询
//
// 注册表在构造时统一小写，之后只读；去重音查询使用单独生成的视图，
// 不修改已加载的注册表。

use super::fuzzy::{closest_indices, full_name};
use super::normalize::{fold_name, strip_accents};
use crate::models::player::{InvalidKeyType, KeyType, KeyValue, PlayerRecord};
use std::collections::HashSet;
use std::sync::OnceLock;

/// 球员身份解析器
pub struct PlayerResolver {
    records: Vec<PlayerRecord>,
    /// 去重音后的 `(last, first)` 视图，首次需要时生成
    unaccented: OnceLock<Vec<(String, String)>>,
}

impl PlayerResolver {
    /// 由注册表记录构造，姓名统一转为小写
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut r| {
                r.name_last = r.name_last.to_lowercase();
                r.name_first = r.name_first.to_lowercase();
                r
            })
            .collect();

        Self {
            records,
            unaccented: OnceLock::new(),
        }
    }

    /// 已加载的注册表（姓名已小写）
    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按姓名查询球员 ID
    ///
    /// - `first` 为空时只按姓过滤
    /// - `ignore_accents` 时输入与注册表都按去重音形式比较
    /// - 没有精确匹配且 `fuzzy` 为真时，返回最相近的至多 5 个球员
    ///
    /// 结果保持注册表顺序（模糊回退按相似度排序）。
    pub fn search(
        &self,
        last: &str,
        first: Option<&str>,
        fuzzy: bool,
        ignore_accents: bool,
    ) -> Vec<PlayerRecord> {
        let last = fold_name(last, ignore_accents);
        let first = first
            .filter(|f| !f.is_empty())
            .map(|f| fold_name(f, ignore_accents));

        let names = self.name_view(ignore_accents);
        let results: Vec<PlayerRecord> = names
            .iter()
            .zip(&self.records)
            .filter(|((l, f), _)| *l == last && first.as_deref().map_or(true, |q| q == *f))
            .map(|(_, record)| record.clone())
            .collect();

        if results.is_empty() && fuzzy {
            tracing::info!(
                last = %last,
                first = ?first,
                "没有完全匹配的姓名，返回最相近的 5 个结果"
            );
            return self.closest_in(&names, &full_name(&last, first.as_deref()));
        }

        results
    }

    /// 模糊查询：按全名相似度返回至多 5 个球员
    pub fn closest_names(&self, last: &str, first: Option<&str>) -> Vec<PlayerRecord> {
        let last = last.to_lowercase();
        let first = first.map(str::to_lowercase);
        let names = self.name_view(false);
        self.closest_in(&names, &full_name(&last, first.as_deref()))
    }

    /// 批量查询 `(last, first)`，不做模糊回退；结果按输入顺序拼接
    pub fn search_batch(&self, players: &[(&str, &str)]) -> Vec<PlayerRecord> {
        players
            .iter()
            .flat_map(|(last, first)| self.search(last, Some(*first), false, false))
            .collect()
    }

    /// 按 ID 反向查询，`key_type` 必须是 mlbam / retro / bbref / fangraphs 之一
    pub fn reverse_lookup<T: ToString>(
        &self,
        player_ids: &[T],
        key_type: &str,
    ) -> Result<Vec<PlayerRecord>, InvalidKeyType> {
        let key_type: KeyType = key_type.parse()?;
        Ok(self.reverse_lookup_by(player_ids, key_type))
    }

    /// 按 ID 反向查询（已解析的 ID 体系），结果保持注册表顺序
    ///
    /// 数字 ID 直接与注册表中的整数比较，`-1` 会匹配 ID 缺失的球员。
    pub fn reverse_lookup_by<T: ToString>(
        &self,
        player_ids: &[T],
        key_type: KeyType,
    ) -> Vec<PlayerRecord> {
        let wanted = WantedIds::new(player_ids, key_type);

        self.records
            .iter()
            .filter(|r| wanted.contains(r.key(key_type)))
            .cloned()
            .collect()
    }

    fn name_view(&self, ignore_accents: bool) -> Vec<(&str, &str)> {
        if ignore_accents {
            let view = self.unaccented.get_or_init(|| {
                self.records
                    .iter()
                    .map(|r| (strip_accents(&r.name_last), strip_accents(&r.name_first)))
                    .collect()
            });
            view.iter().map(|(l, f)| (l.as_str(), f.as_str())).collect()
        } else {
            self.records
                .iter()
                .map(|r| (r.name_last.as_str(), r.name_first.as_str()))
                .collect()
        }
    }

    fn closest_in(&self, names: &[(&str, &str)], query: &str) -> Vec<PlayerRecord> {
        closest_indices(query, names.iter().copied())
            .into_iter()
            .map(|(idx, _)| self.records[idx].clone())
            .collect()
    }
}

/// 反向查询的目标 ID 集合
enum WantedIds {
    Numeric(HashSet<i64>),
    Text(HashSet<String>),
}

impl WantedIds {
    fn new<T: ToString>(player_ids: &[T], key_type: KeyType) -> Self {
        let raw = player_ids.iter().map(|id| id.to_string());
        match key_type {
            KeyType::Mlbam | KeyType::Fangraphs => {
                WantedIds::Numeric(raw.filter_map(|id| parse_numeric_id(&id)).collect())
            }
            KeyType::Retro | KeyType::Bbref => {
                WantedIds::Text(raw.map(|id| id.trim().to_string()).collect())
            }
        }
    }

    fn contains(&self, value: KeyValue<'_>) -> bool {
        match (self, value) {
            (WantedIds::Numeric(ids), KeyValue::Numeric(v)) => ids.contains(&v),
            (WantedIds::Text(ids), KeyValue::Text(Some(v))) => ids.contains(v),
            _ => false,
        }
    }
}

/// 数字 ID 去除前后空白，接受 `123` 与 `123.0` 两种写法
fn parse_numeric_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}
