pub mod letters;
pub mod packs;
pub mod rescue_targets;
