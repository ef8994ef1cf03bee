// 服务层模块
//
// - archive: ZIP 归档读取
// - player_lookup: 球员注册表与身份解析
// - lahman: Lahman 数据库表加载

pub mod archive;
pub mod lahman;
pub mod player_lookup;
