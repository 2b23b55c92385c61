use anyhow::Result;
use indexmap::IndexMap;
use phi_info::records::{Avatar, FileItem, Folder, SongInfo, SongLevel};
use phi_info::{Container, ExtractConfig, Extractor, ScriptObjectSource};
use serde_json::{Value, json};

/// Script objects as they come out of the type tree decoder.
struct SyntheticGame;

impl ScriptObjectSource for SyntheticGame {
    fn script_object(&self, container: Container, script: &str) -> Result<Option<Value>> {
        let text = |zh: &str, en: &str| json!({ "chinese": zh, "english": en });
        Ok(match (container, script) {
            (Container::Level0, "GameInformation") => Some(json!({
                "m_Name": "",
                "song": {
                    "mainSongs": { "Array": [
                        {
                            "songsId": "Glaciaxion.SunsetRay.0",
                            "songsName": "Glaciaxion",
                            "composer": "SunsetRay",
                            "illustrator": "けいしん",
                            "previewTime": 61.256,
                            "previewEndTime": 76.0,
                            "levels": { "Array": ["EZ", "HD", "IN", "AT"] },
                            "charter": { "Array": ["晨", "晨", "百九十八", ""] },
                            "difficulty": { "Array": [1.0, 3.5, 6.449999809265137, 0.0] },
                        },
                        {
                            "songsId": "Unreleased.Nobody.0",
                            "songsName": "Unreleased",
                            "composer": "",
                            "illustrator": "",
                            "previewTime": 0.0,
                            "previewEndTime": 0.0,
                            "levels": { "Array": ["EZ"] },
                            "charter": { "Array": [""] },
                            "difficulty": { "Array": [0.0] },
                        },
                    ]},
                    "sideStory": { "Array": [
                        {
                            "songsId": "Spasmodic.姜米條.0",
                            "songsName": "Spasmodic",
                            "composer": "姜米條",
                            "illustrator": "Rosuuri",
                            "previewTime": 10.0,
                            "previewEndTime": 25.5,
                            "levels": { "Array": ["EZ", "HD", "IN", "AT", "Legacy"] },
                            "charter": { "Array": ["a", "b", "c", "d", "e"] },
                            "difficulty": { "Array": [6.0, 11.0, 15.5, 16.4, 15.0] },
                        },
                    ]},
                },
                "songAllCombos": { "Array": [
                    { "songsId": "Glaciaxion.SunsetRay.0", "allComboNum": { "Array": [1, 2] } },
                    { "songsId": "Glaciaxion.SunsetRay.0", "allComboNum": { "Array": [10, 20, 30] } },
                ]},
            })),
            (Container::Level22, "SaturnOSControl") => Some(json!({
                "folders": { "Array": [{
                    "title": text("单曲精选集", "Singles"),
                    "subTitle": text("", ""),
                    "cover": "Assets/cover.png",
                    "files": { "Array": [{
                        "key": "singles.1",
                        "subIndex": 0,
                        "name": text("文件", "File"),
                        "date": "2021/02/02",
                        "supervisor": text("监督", "Supervisor"),
                        "category": "Chart",
                        "content": text("内容\n第二行", "Content"),
                        "properties": text("属性", "Properties"),
                    }]},
                }]},
            })),
            (Container::Level0, "GetCollectionControl") => Some(json!({
                "avatars": { "Array": [
                    { "name": "Introduction", "addressableKey": "avatar.Introduction" },
                ]},
            })),
            (Container::Level0, "TipsProvider") => Some(json!({
                "tips": { "Array": [
                    { "language": 40, "tips": { "Array": ["按住 note 直到结束"] } },
                ]},
            })),
            _ => None,
        })
    }
}

fn read<T: serde::de::DeserializeOwned>(dir: &std::path::Path, name: &str) -> T {
    let data = std::fs::read(dir.join(name)).unwrap();
    serde_json::from_slice(&data).unwrap()
}

#[test]
fn synthetic_game_round_trips_through_files() {
    let config = ExtractConfig::default();
    let extracted = Extractor::new(&SyntheticGame, &config).extract_all().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    extracted.write_to(&out).unwrap();

    let songs: Vec<SongInfo> = read(&out, "song_info.json");
    let collection: Vec<Folder> = read(&out, "collection_info.json");
    let avatars: Vec<Avatar> = read(&out, "avatars.json");
    let tips: Vec<String> = read(&out, "tips.json");

    assert_eq!(songs, extracted.songs);
    assert_eq!(collection, extracted.collection);
    assert_eq!(avatars, extracted.avatars);
    assert_eq!(tips, extracted.tips);

    let mut levels = IndexMap::new();
    for (name, charter, all_combo_num, difficulty) in [
        ("EZ", "晨", 10, 1.0),
        ("HD", "晨", 20, 3.5),
        ("IN", "百九十八", 30, 6.4),
    ] {
        levels.insert(
            name.to_owned(),
            SongLevel {
                charter: charter.to_owned(),
                all_combo_num,
                difficulty,
            },
        );
    }
    assert_eq!(
        songs[0],
        SongInfo {
            id: "Glaciaxion.SunsetRay.0".to_owned(),
            name: "Glaciaxion".to_owned(),
            composer: "SunsetRay".to_owned(),
            illustrator: "けいしん".to_owned(),
            preview_time: 61.26,
            preview_end_time: 76.0,
            levels,
        }
    );

    assert_eq!(songs.len(), 2);
    assert_eq!(songs[1].id, "Spasmodic.姜米條.0");
    assert_eq!(
        songs[1].levels.keys().collect::<Vec<_>>(),
        ["EZ", "HD", "IN", "AT", "Legacy"]
    );
    assert_eq!(songs[1].levels["IN"].difficulty, 15.5);
    assert!(songs[1].levels.values().all(|level| level.all_combo_num == 0));

    assert_eq!(
        collection[0].files[0],
        FileItem {
            key: "singles.1".to_owned(),
            sub_index: 0,
            name: "文件".to_owned(),
            date: "2021/02/02".to_owned(),
            supervisor: "监督".to_owned(),
            category: "Chart".to_owned(),
            content: "内容\n第二行".to_owned(),
            properties: "属性".to_owned(),
        }
    );
    assert_eq!(tips, ["按住 note 直到结束"]);
}

#[test]
fn written_files_keep_non_ascii_text() {
    let config = ExtractConfig::default();
    let extracted = Extractor::new(&SyntheticGame, &config).extract_all().unwrap();

    let dir = tempfile::tempdir().unwrap();
    extracted.write_to(dir.path()).unwrap();

    let songs = std::fs::read_to_string(dir.path().join("song_info.json")).unwrap();
    assert!(songs.contains("\"composer\": \"姜米條\""));
    assert!(!songs.contains("\\u"));
    let collection = std::fs::read_to_string(dir.path().join("collection_info.json")).unwrap();
    assert!(collection.contains("\"sub_title\": \"\""));
}

#[test]
fn missing_language_fails_extraction() {
    let config = ExtractConfig {
        language: "korean".to_owned(),
        ..ExtractConfig::default()
    };
    let err = Extractor::new(&SyntheticGame, &config).extract_all().unwrap_err();
    assert!(format!("{err:#}").contains("failed to extract collection"));
}
