// Lahman 棒球数据库（baseballdatabank）
//
// 整个数据库是一个 GitHub 归档。已解压到缓存目录时直接读文件，
// 否则按需下载归档（同一实例只下载一次）并从内存中读取条目。

use crate::core::error::{AppError, AppResult};
use crate::core::http::fetch_bytes;
use crate::data::codecs::csv_format::read_csv;
use crate::data::DataError;
use crate::models::Table;
use crate::services::archive::ZipBundle;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// 归档内的顶层目录
pub const LAHMAN_BASE_DIR: &str = "baseballdatabank-master";

/// Lahman 数据库中的表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LahmanTable {
    Parks,
    AllStarFull,
    Appearances,
    AwardsManagers,
    AwardsPlayers,
    AwardsShareManagers,
    AwardsSharePlayers,
    Batting,
    BattingPost,
    CollegePlaying,
    Fielding,
    FieldingOf,
    FieldingOfSplit,
    FieldingPost,
    HallOfFame,
    HomeGames,
    Managers,
    ManagersHalf,
    People,
    Pitching,
    PitchingPost,
    Salaries,
    Schools,
    SeriesPost,
    TeamsCore,
    /// 人工维护的 Teams 表
    TeamsUpstream,
    TeamsFranchises,
    TeamsHalf,
}

impl LahmanTable {
    /// `Master` 是 `People` 的旧名
    pub const MASTER: LahmanTable = LahmanTable::People;

    pub const ALL: [LahmanTable; 28] = [
        LahmanTable::Parks,
        LahmanTable::AllStarFull,
        LahmanTable::Appearances,
        LahmanTable::AwardsManagers,
        LahmanTable::AwardsPlayers,
        LahmanTable::AwardsShareManagers,
        LahmanTable::AwardsSharePlayers,
        LahmanTable::Batting,
        LahmanTable::BattingPost,
        LahmanTable::CollegePlaying,
        LahmanTable::Fielding,
        LahmanTable::FieldingOf,
        LahmanTable::FieldingOfSplit,
        LahmanTable::FieldingPost,
        LahmanTable::HallOfFame,
        LahmanTable::HomeGames,
        LahmanTable::Managers,
        LahmanTable::ManagersHalf,
        LahmanTable::People,
        LahmanTable::Pitching,
        LahmanTable::PitchingPost,
        LahmanTable::Salaries,
        LahmanTable::Schools,
        LahmanTable::SeriesPost,
        LahmanTable::TeamsCore,
        LahmanTable::TeamsUpstream,
        LahmanTable::TeamsFranchises,
        LahmanTable::TeamsHalf,
    ];

    /// 相对 `baseballdatabank-master/` 的路径
    pub fn path(&self) -> &'static str {
        match self {
            LahmanTable::Parks => "core/Parks.csv",
            LahmanTable::AllStarFull => "core/AllstarFull.csv",
            LahmanTable::Appearances => "core/Appearances.csv",
            LahmanTable::AwardsManagers => "contrib/AwardsManagers.csv",
            LahmanTable::AwardsPlayers => "contrib/AwardsPlayers.csv",
            LahmanTable::AwardsShareManagers => "contrib/AwardsShareManagers.csv",
            LahmanTable::AwardsSharePlayers => "contrib/AwardsSharePlayers.csv",
            LahmanTable::Batting => "core/Batting.csv",
            LahmanTable::BattingPost => "core/BattingPost.csv",
            LahmanTable::CollegePlaying => "contrib/CollegePlaying.csv",
            LahmanTable::Fielding => "core/Fielding.csv",
            LahmanTable::FieldingOf => "core/FieldingOF.csv",
            LahmanTable::FieldingOfSplit => "core/FieldingOFsplit.csv",
            LahmanTable::FieldingPost => "core/FieldingPost.csv",
            LahmanTable::HallOfFame => "contrib/HallOfFame.csv",
            LahmanTable::HomeGames => "core/HomeGames.csv",
            LahmanTable::Managers => "core/Managers.csv",
            LahmanTable::ManagersHalf => "core/ManagersHalf.csv",
            LahmanTable::People => "core/People.csv",
            LahmanTable::Pitching => "core/Pitching.csv",
            LahmanTable::PitchingPost => "core/PitchingPost.csv",
            LahmanTable::Salaries => "contrib/Salaries.csv",
            LahmanTable::Schools => "contrib/Schools.csv",
            LahmanTable::SeriesPost => "core/SeriesPost.csv",
            LahmanTable::TeamsCore => "core/Teams.csv",
            LahmanTable::TeamsUpstream => "upstream/Teams.csv",
            LahmanTable::TeamsFranchises => "core/TeamsFranchises.csv",
            LahmanTable::TeamsHalf => "core/TeamsHalf.csv",
        }
    }

    /// CSV 引号字符；Schools 的校名里有双引号，单独使用 `"`
    pub fn quote(&self) -> u8 {
        match self {
            LahmanTable::Schools => b'"',
            _ => b'\'',
        }
    }

    /// 归档内完整条目名
    pub fn archive_entry(&self) -> String {
        format!("{LAHMAN_BASE_DIR}/{}", self.path())
    }
}

/// Lahman 数据库访问入口
pub struct LahmanDatabase {
    client: Option<reqwest::Client>,
    url: String,
    cache_dir: PathBuf,
    archive: OnceCell<ZipBundle>,
}

impl LahmanDatabase {
    /// 从远程归档读取
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        cache_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            client: Some(client),
            url: url.into(),
            cache_dir: cache_dir.as_ref().to_path_buf(),
            archive: OnceCell::new(),
        }
    }

    /// 使用已获得的归档（例如本地保存的 zip），不访问网络
    pub fn from_archive(bundle: ZipBundle, cache_dir: impl AsRef<Path>) -> Self {
        Self {
            client: None,
            url: String::new(),
            cache_dir: cache_dir.as_ref().to_path_buf(),
            archive: OnceCell::new_with(Some(bundle)),
        }
    }

    /// 解压后的根目录 `{cache_dir}/baseballdatabank-master`
    pub fn extracted_dir(&self) -> PathBuf {
        self.cache_dir.join(LAHMAN_BASE_DIR)
    }

    pub fn is_extracted(&self) -> bool {
        self.extracted_dir().is_dir()
    }

    /// 下载并解压整个数据库到缓存目录（已解压时跳过）
    pub async fn download(&self) -> AppResult<()> {
        if self.is_extracted() {
            tracing::debug!(directory = %self.extracted_dir().display(), "Lahman 数据库已存在，跳过下载");
            return Ok(());
        }
        let bundle = self.archive().await?;
        bundle.extract_to(&self.cache_dir)?;
        Ok(())
    }

    /// 读取一张表
    pub async fn table(&self, table: LahmanTable) -> AppResult<Table> {
        let loaded = if self.is_extracted() {
            let path = self.extracted_dir().join(table.path());
            if !path.exists() {
                return Err(DataError::NotFound(path.display().to_string()).into());
            }
            let file = std::fs::File::open(&path).map_err(|e| DataError::io(&path, e))?;
            read_csv(file, table.quote())?
        } else {
            let content = self.archive().await?.read_entry(&table.archive_entry())?;
            read_csv(content.as_slice(), table.quote())?
        };

        tracing::debug!(table = ?table, rows = loaded.height(), "Lahman 表已读取");
        Ok(loaded)
    }

    async fn archive(&self) -> AppResult<&ZipBundle> {
        self.archive
            .get_or_try_init(|| async {
                let client = self
                    .client
                    .as_ref()
                    .ok_or_else(|| AppError::config("未配置 Lahman 归档来源"))?;
                tracing::info!(url = %self.url, "正在下载 Lahman 数据库归档");
                let bytes = fetch_bytes(client, &self.url).await?;
                ZipBundle::from_bytes(bytes)
            })
            .await
    }
}
