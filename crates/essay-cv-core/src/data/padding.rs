/// Pad sentence-segmented token indices to a fixed grid and flatten.
///
/// Sentences beyond `max_sentnum` and tokens beyond `max_sentlen` are
/// dropped; missing positions are filled with `PAD_INDEX` (0).
pub fn pad_hierarchical(
    essays: &[Vec<Vec<usize>>],
    max_sentnum: usize,
    max_sentlen: usize,
) -> Vec<Vec<usize>> {
    essays
        .iter()
        .map(|sentences| {
            let mut row = vec![super::PAD_INDEX; max_sentnum * max_sentlen];
            for (s, sentence) in sentences.iter().take(max_sentnum).enumerate() {
                for (t, &token) in sentence.iter().take(max_sentlen).enumerate() {
                    row[s * max_sentlen + t] = token;
                }
            }
            row
        })
        .collect()
}
