pub mod content;
pub mod redaction;
pub mod time;
