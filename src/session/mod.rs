pub mod free_play;
pub mod input;
pub mod metrics;
pub mod rescue_run;
pub mod result;
