//! Comma-separated token lists: Accept-Ranges and Content-Encoding.

use crate::headers::handler::{join_list, parse_token, HeaderHandler};
use crate::headers::syntax;

pub fn accept_ranges() -> HeaderHandler {
    HeaderHandler::new("Accept-Ranges", parse_token)
        .with_syntax(syntax::is_token_list)
        .with_join(join_list)
}

pub fn content_encoding() -> HeaderHandler {
    HeaderHandler::new("Content-Encoding", parse_token)
        .with_syntax(syntax::is_token_list)
        .with_join(join_list)
}
