use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongLevel {
    pub charter: String,
    pub all_combo_num: i32,
    pub difficulty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    pub id: String,
    pub name: String,
    pub composer: String,
    pub illustrator: String,
    pub preview_time: f64,
    pub preview_end_time: f64,
    /// Keyed by difficulty tier name, in chart order.
    pub levels: IndexMap<String, SongLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub title: String,
    pub sub_title: String,
    pub cover: String,
    pub files: Vec<FileItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub key: String,
    pub sub_index: i32,
    pub name: String,
    pub date: String,
    pub supervisor: String,
    pub category: String,
    pub content: String,
    pub properties: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub name: String,
    pub addressable_key: String,
}

/// The four collections of one extraction run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extracted {
    pub songs: Vec<SongInfo>,
    pub collection: Vec<Folder>,
    pub avatars: Vec<Avatar>,
    pub tips: Vec<String>,
}
