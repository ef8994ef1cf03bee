pub mod config;
pub mod player;
pub mod table;

pub use config::*;
pub use player::{KeyType, KeyValue, PlayerRecord};
pub use table::{Column, DataType, Table, Value};
