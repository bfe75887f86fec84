// Raw record parsing: sensor feeds and import files into validated readings

pub mod feed_parser;
pub mod reading;

use crate::model::{ParserError, RawReading};

pub use feed_parser::{FeedParser, ImportParser};
pub use reading::parse_reading;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<Vec<RawReading>, ParserError>;
}
