pub mod completions;
pub mod history;
pub mod mute;
pub mod mutes;
pub mod palette;
pub mod run;
