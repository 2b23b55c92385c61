use std::fmt::Display;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::node::FieldNode;
use crate::package::PackageFiles;
use crate::records::{Avatar, Extracted, FileItem, Folder, SongInfo, SongLevel};

pub const GAME_INFORMATION: &str = "GameInformation";
pub const SATURN_OS_CONTROL: &str = "SaturnOSControl";
pub const GET_COLLECTION_CONTROL: &str = "GetCollectionControl";
pub const TIPS_PROVIDER: &str = "TipsProvider";

/// The asset containers script objects are looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    GlobalGameManagers,
    Level0,
    Level22,
}

impl Container {
    pub fn name(self) -> &'static str {
        match self {
            Container::GlobalGameManagers => PackageFiles::GLOBAL_GAME_MANAGERS,
            Container::Level0 => PackageFiles::LEVEL0,
            Container::Level22 => PackageFiles::LEVEL22,
        }
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can produce the decoded fields of a script-backed object.
pub trait ScriptObjectSource {
    /// The first MonoBehaviour in `container` whose script is named `script`,
    /// decoded into a generic graph.
    fn script_object(&self, container: Container, script: &str) -> Result<Option<Value>>;
}

impl<T: ScriptObjectSource> ScriptObjectSource for &T {
    fn script_object(&self, container: Container, script: &str) -> Result<Option<Value>> {
        (**self).script_object(container, script)
    }
}

pub struct Extractor<'a, S> {
    source: S,
    config: &'a ExtractConfig,
}

impl<'a, S: ScriptObjectSource> Extractor<'a, S> {
    pub fn new(source: S, config: &'a ExtractConfig) -> Self {
        Extractor { source, config }
    }

    pub fn extract_all(&self) -> Result<Extracted> {
        let songs = self.songs().context("failed to extract song info")?;
        tracing::info!("extracted {} songs", songs.len());
        let collection = self.collection().context("failed to extract collection")?;
        tracing::info!("extracted {} folders", collection.len());
        let avatars = self.avatars().context("failed to extract avatars")?;
        tracing::info!("extracted {} avatars", avatars.len());
        let tips = self.tips().context("failed to extract tips")?;
        tracing::info!("extracted {} tips", tips.len());

        Ok(Extracted {
            songs,
            collection,
            avatars,
            tips,
        })
    }

    fn find(&self, container: Container, script: &'static str) -> Result<Value> {
        self.source
            .script_object(container, script)?
            .ok_or_else(|| ExtractError::MissingScriptObject { script, container }.into())
    }

    pub fn songs(&self) -> Result<Vec<SongInfo>> {
        let game_information = self.find(Container::Level0, GAME_INFORMATION)?;
        let root = FieldNode::root(&game_information, GAME_INFORMATION);

        let mut all_combos: FxHashMap<&str, Vec<i32>> = FxHashMap::default();
        for combo in root.field("songAllCombos")?.elements()? {
            let song_id = combo.field("songsId")?.as_str()?;
            let counts = combo
                .field("allComboNum")?
                .elements()?
                .iter()
                .map(FieldNode::as_i32)
                .collect::<Result<Vec<_>, _>>()?;
            all_combos.insert(song_id, counts);
        }

        let mut songs = Vec::new();
        for list in root.field("song")?.children()? {
            for song in list.elements()? {
                let id = song.field("songsId")?.as_str()?;
                let combos = all_combos.get(id).map(Vec::as_slice).unwrap_or_default();

                let level_names = song.field("levels")?;
                let charters = song.field("charter")?;
                let difficulties = song.field("difficulty")?.elements()?;

                let mut levels = IndexMap::new();
                for (i, difficulty) in difficulties.iter().enumerate() {
                    let difficulty = difficulty.as_f64()?;
                    if difficulty == 0.0 {
                        continue;
                    }

                    let level_name = level_names.index(i)?.as_str()?;
                    let charter = charters.index(i)?.as_str()?;
                    levels.insert(
                        level_name.to_owned(),
                        SongLevel {
                            charter: charter.to_owned(),
                            all_combo_num: combos.get(i).copied().unwrap_or(0),
                            difficulty: round_to(difficulty, 1),
                        },
                    );
                }

                if levels.is_empty() {
                    tracing::debug!("skipping song {id} without charted levels");
                    continue;
                }

                songs.push(SongInfo {
                    id: id.to_owned(),
                    name: song.field("songsName")?.as_str()?.to_owned(),
                    composer: song.field("composer")?.as_str()?.to_owned(),
                    illustrator: song.field("illustrator")?.as_str()?.to_owned(),
                    preview_time: round_to(song.field("previewTime")?.as_f64()?, 2),
                    preview_end_time: round_to(song.field("previewEndTime")?.as_f64()?, 2),
                    levels,
                });
            }
        }

        Ok(songs)
    }

    pub fn collection(&self) -> Result<Vec<Folder>> {
        let control = self.find(Container::Level22, SATURN_OS_CONTROL)?;
        let root = FieldNode::root(&control, SATURN_OS_CONTROL);
        let lang = self.config.language.as_str();

        let mut folders = Vec::new();
        for folder in root.field("folders")?.elements()? {
            let mut files = Vec::new();
            for file in folder.field("files")?.elements()? {
                files.push(FileItem {
                    key: file.field("key")?.as_str()?.to_owned(),
                    sub_index: file.field("subIndex")?.as_i32()?,
                    name: localized(&file, "name", lang)?,
                    date: file.field("date")?.as_str()?.to_owned(),
                    supervisor: localized(&file, "supervisor", lang)?,
                    category: file.field("category")?.as_str()?.to_owned(),
                    content: localized(&file, "content", lang)?,
                    properties: localized(&file, "properties", lang)?,
                });
            }

            folders.push(Folder {
                title: localized(&folder, "title", lang)?,
                sub_title: localized(&folder, "subTitle", lang)?,
                cover: folder.field("cover")?.as_str()?.to_owned(),
                files,
            });
        }

        Ok(folders)
    }

    pub fn avatars(&self) -> Result<Vec<Avatar>> {
        let control = self.find(Container::Level0, GET_COLLECTION_CONTROL)?;
        let root = FieldNode::root(&control, GET_COLLECTION_CONTROL);

        root.field("avatars")?
            .elements()?
            .iter()
            .map(|avatar| -> Result<_> {
                Ok(Avatar {
                    name: avatar.field("name")?.as_str()?.to_owned(),
                    addressable_key: avatar.field("addressableKey")?.as_str()?.to_owned(),
                })
            })
            .collect()
    }

    pub fn tips(&self) -> Result<Vec<String>> {
        let provider = self.find(Container::Level0, TIPS_PROVIDER)?;
        let root = FieldNode::root(&provider, TIPS_PROVIDER);
        let language_id = self.config.tips_language_id;

        for block in root.field("tips")?.elements()? {
            if block.field("language")?.as_i64()? != language_id {
                continue;
            }
            return block
                .field("tips")?
                .elements()?
                .iter()
                .map(|tip| -> Result<_> { Ok(tip.as_str()?.to_owned()) })
                .collect();
        }

        tracing::warn!("no tips with language id {language_id}");
        Ok(Vec::new())
    }
}

fn localized(node: &FieldNode<'_>, field: &str, lang: &str) -> Result<String> {
    Ok(node.field(field)?.field(lang)?.as_str()?.to_owned())
}

/// Rounds to `digits` decimal places, ties to even.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}
