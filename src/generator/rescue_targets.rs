use crate::engine::rescue::RescueDifficulty;
use crate::generator::packs::PackLibrary;

const EASY_WORDS: &[&str] = &[
    "cat", "sun", "moon", "glass", "wind", "sky", "calm", "soft", "glow", "flow", "song", "green",
    "bright", "swift", "happy", "spark", "quiet", "brave", "dream", "drift", "cloud",
];

pub const FALLBACK_TARGETS: &[&str] = &["glass", "rescue", "aurora", "flow"];

/// Rescue targets for `difficulty` drawn from the bundled packs.
pub fn build_targets(difficulty: RescueDifficulty) -> Vec<String> {
    targets_from_texts(difficulty, &PackLibrary::load().all_texts())
}

/// Filter `texts` by the difficulty's length band. Never returns an empty list.
pub fn targets_from_texts(difficulty: RescueDifficulty, texts: &[String]) -> Vec<String> {
    let in_band = |text: &&String, min: usize, max: usize| {
        let len = text.chars().count();
        len >= min && len <= max
    };

    let filtered: Vec<String> = match difficulty {
        RescueDifficulty::Easy => EASY_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(texts.iter().filter(|t| in_band(t, 3, 22)).cloned())
            .collect(),
        RescueDifficulty::Medium => texts.iter().filter(|t| in_band(t, 10, 70)).cloned().collect(),
        RescueDifficulty::Hard => texts
            .iter()
            .filter(|t| in_band(t, 10, usize::MAX))
            .cloned()
            .collect(),
    };

    if filtered.is_empty() {
        return FALLBACK_TARGETS.iter().map(|w| w.to_string()).collect();
    }
    filtered
}
