//! RDF vocabulary and namespace definitions for the linked earth data cube.
//!
//! Namespace URIs follow the ANU-LED ontology together with the standard
//! RDF Data Cube, WGS84 position and GeoSPARQL vocabularies.

use oxrdf::NamedNode;

/// Linked earth data namespace URI
pub const LED_NS: &str = "http://www.anulinkedearth.org/sandbox/ANU-LED#";

/// RDF Data Cube namespace URI
pub const QB_NS: &str = "http://purl.org/linked-data/cube#";

/// WGS84 position namespace URI
pub const GEO_NS: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#";

/// GeoSPARQL namespace URI
pub const OGC_NS: &str = "http://www.opengis.net/ont/geosparql#";

/// SDMX concept namespace URI
pub const SDMX_CONCEPT_NS: &str = "http://purl.org/linked-data/sdmx/2009/concept#";

/// SDMX dimension namespace URI
pub const SDMX_DIMENSION_NS: &str = "http://purl.org/linked-data/sdmx/2009/dimension#";

/// SDMX measure namespace URI
pub const SDMX_MEASURE_NS: &str = "http://purl.org/linked-data/sdmx/2009/measure#";

/// GCMD platform ontology namespace URI
pub const GCMD_PLATFORM_NS: &str =
    "http://geobrain.laits.gmu.edu/ontology/2004/11/gcmd-platform.owl#";

/// GCMD instrument ontology namespace URI
pub const GCMD_INSTRUMENT_NS: &str =
    "http://geobrain.laits.gmu.edu/ontology/2004/11/gcmd-instrument.owl#";

/// Term in the linked earth data namespace.
pub fn led(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{LED_NS}{local}"))
}

/// Term in the RDF Data Cube namespace.
pub fn qb(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{QB_NS}{local}"))
}

/// Term in the WGS84 position namespace.
pub fn geo(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{GEO_NS}{local}"))
}

/// Term in the GeoSPARQL namespace.
pub fn ogc(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{OGC_NS}{local}"))
}

/// The dataset every observation belongs to.
pub fn landsat_dataset() -> NamedNode {
    led("landsatDS")
}

/// The fixed named graph observations are uploaded into.
pub fn default_graph() -> NamedNode {
    led("lsGraph")
}
