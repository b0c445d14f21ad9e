pub mod channel_scanner;
pub mod fresh_content;
pub mod keyword_rotator;
