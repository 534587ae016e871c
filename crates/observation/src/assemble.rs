//! Graph assembly: schema first, then the lazy observation stream.

use oxrdf::Triple;

use cube_common::CubeResult;

use crate::schema;

/// Prepend the parsed schema to a lazy observation-statement sequence.
///
/// The schema is parsed synchronously before the first observation is
/// pulled. The returned sequence is finite, single-pass and
/// non-restartable; the batching stage realizes it exactly once.
pub fn assemble<I>(observations: I) -> CubeResult<impl Iterator<Item = CubeResult<Triple>>>
where
    I: Iterator<Item = CubeResult<Triple>>,
{
    let schema = schema::schema_statements()?;
    tracing::debug!(statements = schema.len(), "Parsed schema document");
    Ok(schema.into_iter().map(Ok).chain(observations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_common::vocab;
    use oxrdf::vocab::rdf;

    #[test]
    fn test_schema_precedes_observations() {
        let observation = Triple::new(
            vocab::led("observation/cell/R/levelSquare-0/levelPixel-0/band-0/pixel"),
            rdf::TYPE,
            vocab::qb("Observation"),
        );
        let statements: Vec<Triple> = assemble(std::iter::once(Ok(observation.clone())))
            .unwrap()
            .collect::<CubeResult<_>>()
            .unwrap();

        let schema_len = schema::schema_statements().unwrap().len();
        assert_eq!(statements.len(), schema_len + 1);
        assert_eq!(statements.last(), Some(&observation));
    }

    #[test]
    fn test_observation_errors_pass_through() {
        let failing = std::iter::once(Err(cube_common::CubeError::MalformedInput(
            "broken".to_string(),
        )));
        let results: Vec<_> = assemble(failing).unwrap().collect();
        assert!(results.last().unwrap().is_err());
    }
}
