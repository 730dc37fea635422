use assert_cmd::{cargo::cargo_bin_cmd, Command};
use serde_json::json;
use std::fs;
use std::path::Path;

pub fn essay_cv() -> Command {
    cargo_bin_cmd!("essay-cv")
}

const SENTENCES: [&[&str]; 4] = [
    &["The", "library", "opens", "early"],
    &["Students", "read", "there", "every", "day"],
    &["Books", "help", "us", "learn"],
    &["I", "like", "quiet", "rooms"],
];

/// Raw (score, content, organization) for essays 1..=12
const SCORES: [(i64, i64, i64); 12] = [
    (2, 1, 1),
    (4, 2, 2),
    (6, 3, 3),
    (8, 4, 4),
    (10, 5, 5),
    (12, 6, 6),
    (3, 1, 2),
    (5, 2, 3),
    (7, 4, 3),
    (9, 5, 4),
    (11, 6, 5),
    (7, 3, 4),
];

fn essay(id: usize, (score, content, organization): (i64, i64, i64)) -> serde_json::Value {
    let words: Vec<Vec<&str>> = (0..=(id % 3))
        .map(|s| SENTENCES[(id + s) % SENTENCES.len()].to_vec())
        .collect();
    let pos: Vec<Vec<&str>> = words
        .iter()
        .map(|sentence| sentence.iter().map(|_| "NN").collect())
        .collect();
    json!({
        "essay_id": id,
        "prompt_id": 1,
        "scores": [score, content, organization, -1, -1, -1, -1, -1, -1],
        "words": words,
        "pos": pos,
    })
}

/// Write a two-fold dataset and an `essay-cv.toml` pointing at it
#[allow(dead_code)]
pub fn write_workspace(root: &Path) {
    write_workspace_with(root, |_| {});
}

/// Like [`write_workspace`], letting the caller adjust the raw scores
pub fn write_workspace_with(root: &Path, adjust: impl Fn(&mut Vec<(i64, i64, i64)>)) {
    let mut scores = SCORES.to_vec();
    adjust(&mut scores);

    let essays: Vec<serde_json::Value> = scores
        .iter()
        .enumerate()
        .map(|(i, &s)| essay(i + 1, s))
        .collect();

    // even-indexed essays are tested in fold 0, odd ones in fold 1
    for fold in 0..2 {
        let dir = root.join("data").join("1").join(format!("fold-{}", fold));
        fs::create_dir_all(&dir).unwrap();
        let (test, train): (Vec<_>, Vec<_>) = essays
            .iter()
            .enumerate()
            .partition(|(i, _)| i % 2 == fold);
        let to_json = |rows: Vec<(usize, &serde_json::Value)>| {
            serde_json::Value::Array(rows.into_iter().map(|(_, e)| e.clone()).collect())
        };
        fs::write(dir.join("train.json"), to_json(train).to_string()).unwrap();
        fs::write(dir.join("test.json"), to_json(test).to_string()).unwrap();
    }

    let features: serde_json::Map<String, serde_json::Value> = (1..=scores.len())
        .map(|id| (id.to_string(), json!([id as f64 * 0.1, (id % 4) as f64])))
        .collect();
    let readability: serde_json::Map<String, serde_json::Value> = (1..=scores.len())
        .map(|id| (id.to_string(), json!([60.0 + id as f64])))
        .collect();
    fs::write(
        root.join("features.json"),
        serde_json::Value::Object(features).to_string(),
    )
    .unwrap();
    fs::write(
        root.join("readability.json"),
        serde_json::Value::Object(readability).to_string(),
    )
    .unwrap();

    fs::write(
        root.join("essay-cv.toml"),
        r#"data_path = "data"
features_path = "features.json"
readability_path = "readability.json"
output_root = "out"
folds = 2
epochs = 3
batch_size = 2

[model]
learning_rate = 0.5

[[prompts]]
id = 1
overall = [2, 12]
analytic = [1, 6]
items = ["content", "organization"]
"#,
    )
    .unwrap();
}
