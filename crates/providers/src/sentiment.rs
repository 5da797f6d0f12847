//! Lexicon-based sentiment scoring for headlines and comments.
//!
//! The pipeline only needs a coarse -1..1 signal over short English texts
//! (article titles, video comments), so this is a small valence lexicon with
//! single-token negation, not a full NLP stack.

/// Words counted as positive valence.
const POSITIVE: &[&str] = &[
    "amazing",
    "awesome",
    "best",
    "breakout",
    "brilliant",
    "captivating",
    "celebrated",
    "charming",
    "compelling",
    "excellent",
    "exciting",
    "fantastic",
    "favorite",
    "fun",
    "good",
    "great",
    "gripping",
    "hilarious",
    "hit",
    "incredible",
    "love",
    "loved",
    "masterpiece",
    "must-watch",
    "perfect",
    "phenomenal",
    "popular",
    "praised",
    "renewed",
    "stunning",
    "success",
    "superb",
    "thrilling",
    "top",
    "triumph",
    "win",
    "wonderful",
];

/// Words counted as negative valence.
const NEGATIVE: &[&str] = &[
    "awful",
    "bad",
    "bland",
    "boring",
    "cancelled",
    "canceled",
    "controversy",
    "criticized",
    "disappointing",
    "disaster",
    "dull",
    "fail",
    "failure",
    "flop",
    "hate",
    "hated",
    "lawsuit",
    "mediocre",
    "mess",
    "miss",
    "overrated",
    "panned",
    "poor",
    "problem",
    "scandal",
    "slow",
    "terrible",
    "tired",
    "trash",
    "unwatchable",
    "waste",
    "weak",
    "worst",
];

/// Tokens that flip the valence of the word immediately after them.
const NEGATORS: &[&str] = &["not", "no", "never", "hardly", "isnt", "wasnt", "dont"];

/// Scores a text's sentiment in -1..1. Neutral or empty text scores 0.
///
/// The running valence sum is squashed with the compound normalization
/// `x / sqrt(x^2 + 15)`, so a single strong word stays moderate and long
/// uniformly-positive texts approach (but never reach) 1.
pub fn score_text(text: &str) -> f64 {
    let mut valence = 0.0_f64;
    let mut negated = false;

    for token in tokens(text) {
        if NEGATORS.contains(&token.as_str()) {
            negated = true;
            continue;
        }

        let hit = if POSITIVE.contains(&token.as_str()) {
            1.0
        } else if NEGATIVE.contains(&token.as_str()) {
            -1.0
        } else {
            negated = false;
            continue;
        };

        valence += if negated { -hit } else { hit };
        negated = false;
    }

    if valence == 0.0 {
        return 0.0;
    }
    valence / (valence * valence + 15.0).sqrt()
}

/// Lowercased alphanumeric tokens, apostrophes dropped so "don't" matches
/// the "dont" negator.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.chars()
                .filter(|c| *c != '\'')
                .collect::<String>()
                .to_lowercase()
        })
}
