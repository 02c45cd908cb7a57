//! Last-Modified: a single HTTP-date.

use crate::headers::date;
use crate::headers::handler::{HeaderContext, HeaderHandler, ParseError};
use crate::headers::value::FieldValue;

pub fn handler() -> HeaderHandler {
    HeaderHandler::new("Last-Modified", parse).single()
}

fn parse(value: &str, _cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    date::parse_http_date(value)
        .map(FieldValue::Date)
        .ok_or(ParseError::Invalid)
}
