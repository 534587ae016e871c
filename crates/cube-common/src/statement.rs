//! Typed literal constructors for observation statements.

use chrono::{DateTime, Utc};
use oxrdf::vocab::xsd;
use oxrdf::Literal;

use crate::vocab;

/// An `xsd:integer` literal.
pub fn integer_literal(value: i64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER)
}

/// An `xsd:decimal` literal.
///
/// Rust's `Display` for f64 never uses scientific notation, which keeps the
/// lexical form inside xsd:decimal's grammar.
pub fn decimal_literal(value: f64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::DECIMAL)
}

/// An `xsd:double` literal.
pub fn double_literal(value: f64) -> Literal {
    Literal::from(value)
}

/// An `xsd:dateTime` literal with microsecond precision.
pub fn datetime_literal(ts: &DateTime<Utc>) -> Literal {
    Literal::new_typed_literal(
        ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        xsd::DATE_TIME,
    )
}

/// An `ogc:wktLiteral` geometry literal.
pub fn wkt_literal(text: impl Into<String>) -> Literal {
    Literal::new_typed_literal(text, vocab::ogc("wktLiteral"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_integer_literal() {
        let lit = integer_literal(7);
        assert_eq!(lit.value(), "7");
        assert_eq!(lit.datatype(), xsd::INTEGER);
    }

    #[test]
    fn test_decimal_literal_plain_notation() {
        // Small magnitudes must not flip into scientific notation
        let lit = decimal_literal(1.0 / 360.0);
        assert!(!lit.value().contains('e'));
        assert_eq!(lit.datatype(), xsd::DECIMAL);
    }

    #[test]
    fn test_datetime_literal_microseconds() {
        let ts = Utc
            .with_ymd_and_hms(2012, 2, 10, 23, 50, 47)
            .unwrap()
            .checked_add_signed(chrono::Duration::microseconds(650_696))
            .unwrap();
        let lit = datetime_literal(&ts);
        assert_eq!(lit.value(), "2012-02-10T23:50:47.650696Z");
        assert_eq!(lit.datatype(), xsd::DATE_TIME);
    }

    #[test]
    fn test_wkt_literal_datatype() {
        let lit = wkt_literal("POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))");
        assert_eq!(lit.datatype(), vocab::ogc("wktLiteral").as_ref());
    }
}
