//! Pull-based streaming parse of the feed.
//!
//! Events are pulled from a `quick_xml::Reader` over any `BufRead` and fed to
//! a [`FeedReducer`] one at a time, so an HTTP body can be parsed while it is
//! still arriving.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::element::{Attributes, ElementKind};
use crate::error::{ParseError, ParseResult};
use crate::reducer::{FeedReducer, ParsedFeed};

/// Parse a feed from an in-memory string.
pub fn parse_str(xml: &str) -> ParseResult<ParsedFeed> {
    parse_feed(xml.as_bytes())
}

/// Parse a feed from a buffered reader.
pub fn parse_feed<R: BufRead>(source: R) -> ParseResult<ParsedFeed> {
    parse_feed_with(source, || true)
}

/// Parse a feed, checking `keep_going` before each event.
///
/// Returns [`ParseError::Aborted`] as soon as `keep_going` returns `false`;
/// nothing further is read from `source`.
pub fn parse_feed_with<R, F>(source: R, mut keep_going: F) -> ParseResult<ParsedFeed>
where
    R: BufRead,
    F: FnMut() -> bool,
{
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let mut reducer = FeedReducer::new();
    let mut buf = Vec::new();
    let mut saw_element = false;

    loop {
        if !keep_going() {
            tracing::debug!("Feed parse aborted at byte {}", reader.buffer_position());
            return Err(ParseError::Aborted);
        }

        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                saw_element = true;
                reducer.open(ElementKind::of(&e), &Attributes::from_start(&e));
            }
            Ok(Event::Empty(e)) => {
                saw_element = true;
                reducer.open(ElementKind::of(&e), &Attributes::from_start(&e));
                reducer.close();
            }
            Ok(Event::End(_)) => reducer.close(),
            Ok(Event::Eof) => break,
            Err(quick_xml::Error::Io(e)) => return Err(ParseError::Io(e.to_string())),
            Err(e) => {
                return Err(ParseError::Malformed {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    if reducer.depth() > 0 {
        return Err(ParseError::UnexpectedEof {
            open_elements: reducer.depth(),
        });
    }
    if !saw_element {
        return Err(ParseError::EmptyDocument);
    }

    let feed = reducer.finish();
    tracing::debug!(
        "Parsed feed: {} continents, {} countries, {} servers, {} dropped",
        feed.continents.len(),
        feed.countries.len(),
        feed.server_count(),
        feed.dropped_entries
    );
    Ok(feed)
}
