//! Content-Length: a single non-negative integer of any size.

use num_bigint::BigUint;

use crate::headers::handler::{HeaderContext, HeaderHandler, ParseError};
use crate::headers::syntax;
use crate::headers::value::FieldValue;

pub fn handler() -> HeaderHandler {
    HeaderHandler::new("Content-Length", parse)
        .single()
        .with_syntax(syntax::is_digits)
}

fn parse(value: &str, _cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    BigUint::parse_bytes(value.as_bytes(), 10)
        .map(FieldValue::Integer)
        .ok_or(ParseError::Invalid)
}
