pub mod client;
pub mod rich_text;
