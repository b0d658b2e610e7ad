// Word tokenization shared by the TF-IDF model.
//
// Case-folds, splits on whitespace, and strips every non-alphanumeric
// character from each word. Tokens that end up empty (bare punctuation,
// stray bullets) are dropped.
//
// Apostrophes and hyphens inside a word are removed, not split on:
// "Newton's" is one token "newtons", and "non-inertial" is "noninertial".
// A tokenizer that splits on every non-word character would produce
// "newton" + "s" instead. The 0.60 threshold was set against that splitting
// behavior, so scores for questions heavy in possessives or hyphenated
// terms can drift slightly from it.

/// Split text into lowercase word tokens with punctuation removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}
