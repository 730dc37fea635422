use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{pad_hierarchical, EssayRecord, FeatureBatch, FoldData, FoldSource, Vocab};
use crate::config::{InputKind, RunConfig};
use crate::error::{EssayCvError, Result};

type FeatureTable = HashMap<String, Vec<f64>>;

/// Reads folds from `{data_path}/{prompt}/fold-{k}/{train,test}.json`.
///
/// Feature tables are keyed by essay id and shared by every fold, so they
/// are read once and cached.
pub struct JsonFoldLoader {
    data_path: PathBuf,
    features_path: PathBuf,
    readability_path: PathBuf,
    vocab_size: usize,
    prompt_id: u32,
    input: InputKind,
    tables: Option<(FeatureTable, FeatureTable)>,
}

impl JsonFoldLoader {
    pub fn new(config: &RunConfig, prompt_id: u32, input: InputKind) -> Self {
        JsonFoldLoader {
            data_path: config.data_path.clone(),
            features_path: config.features_path.clone(),
            readability_path: config.readability_path.clone(),
            vocab_size: config.vocab_size,
            prompt_id,
            input,
            tables: None,
        }
    }

    pub fn fold_dir(&self, fold: usize) -> PathBuf {
        self.data_path
            .join(self.prompt_id.to_string())
            .join(format!("fold-{}", fold))
    }

    fn tables(&mut self) -> Result<&(FeatureTable, FeatureTable)> {
        if self.tables.is_none() {
            let features = read_json::<FeatureTable>(&self.features_path)?;
            let readability = read_json::<FeatureTable>(&self.readability_path)?;
            tracing::debug!(
                features = features.len(),
                readability = readability.len(),
                "loaded feature tables"
            );
            self.tables = Some((features, readability));
        }
        self.tables
            .as_ref()
            .ok_or_else(|| EssayCvError::Other("feature tables unavailable".to_string()))
    }

    fn view<'e>(&self, essay: &'e EssayRecord) -> &'e [Vec<String>] {
        match self.input {
            InputKind::Word => &essay.words,
            InputKind::Pos => &essay.pos,
        }
    }
}

impl FoldSource for JsonFoldLoader {
    #[tracing::instrument(skip(self), fields(prompt = self.prompt_id, input = %self.input))]
    fn load_fold(&mut self, fold: usize) -> Result<FoldData> {
        let start = Instant::now();
        let dir = self.fold_dir(fold);
        let train = read_json::<Vec<EssayRecord>>(&dir.join("train.json"))?;
        let test = read_json::<Vec<EssayRecord>>(&dir.join("test.json"))?;
        tracing::debug!(
            dir = %dir.display(),
            train = train.len(),
            test = test.len(),
            "read fold essays"
        );

        let vocab = Vocab::build(
            train
                .iter()
                .flat_map(|essay| self.view(essay).iter().flatten())
                .map(String::as_str),
            self.vocab_size,
            self.input == InputKind::Word,
        );

        let train_seqs: Vec<_> = train.iter().map(|e| vocab.encode(self.view(e))).collect();
        let test_seqs: Vec<_> = test.iter().map(|e| vocab.encode(self.view(e))).collect();

        let all = train_seqs.iter().chain(&test_seqs);
        let max_sentnum = all.clone().map(Vec::len).max().unwrap_or(0).max(1);
        let max_sentlen = all
            .flat_map(|essay| essay.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
            .max(1);

        let features_path = self.features_path.clone();
        let readability_path = self.readability_path.clone();
        let (features, readability) = self.tables()?;

        let data = FoldData {
            train: FeatureBatch {
                tokens: pad_hierarchical(&train_seqs, max_sentnum, max_sentlen),
                linguistic: lookup_rows(&train, features, &features_path)?,
                readability: lookup_rows(&train, readability, &readability_path)?,
            },
            test: FeatureBatch {
                tokens: pad_hierarchical(&test_seqs, max_sentnum, max_sentlen),
                linguistic: lookup_rows(&test, features, &features_path)?,
                readability: lookup_rows(&test, readability, &readability_path)?,
            },
            train_scores: train.iter().map(|e| e.scores.clone()).collect(),
            test_scores: test.iter().map(|e| e.scores.clone()).collect(),
            train_prompts: train.iter().map(|e| e.prompt_id).collect(),
            test_prompts: test.iter().map(|e| e.prompt_id).collect(),
            vocab_len: vocab.len(),
            max_sentnum,
            max_sentlen,
        };
        crate::trace_time!(start, "load_fold", fold = fold);
        Ok(data)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| EssayCvError::io_operation("read", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| EssayCvError::io_operation("parse", path.display(), e))
}

/// Feature rows for each essay, all of one width
fn lookup_rows(essays: &[EssayRecord], table: &FeatureTable, path: &Path) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::with_capacity(essays.len());
    for essay in essays {
        let row = table.get(&essay.essay_id.to_string()).ok_or_else(|| {
            EssayCvError::invalid_data(format!(
                "essay {} has no entry in {}",
                essay.essay_id,
                path.display()
            ))
        })?;
        if let Some(first) = rows.first().map(|r: &Vec<f64>| r.len()) {
            if first != row.len() {
                crate::bail_data!(
                    "essay {} has {} values in {}, expected {}",
                    essay.essay_id,
                    row.len(),
                    path.display(),
                    first
                );
            }
        }
        rows.push(row.clone());
    }
    Ok(rows)
}
