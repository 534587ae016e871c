//! The fixed data-cube schema prepended to every upload.
//!
//! Declares the data structure definition, the dataset itself, and the
//! component/property declarations observations refer to. Parsed from
//! Turtle exactly once, before any observation is produced; schema-before-
//! data ordering is a streaming-consumer convenience, not a store-level
//! requirement.

use oxrdf::Triple;

use cube_common::{CubeError, CubeResult};

const SCHEMA_TTL: &str = r#"
@prefix : <http://www.anulinkedearth.org/sandbox/ANU-LED#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix qb: <http://purl.org/linked-data/cube#> .
@prefix ogc: <http://www.opengis.net/ont/geosparql#> .
@prefix gcmd-platform: <http://geobrain.laits.gmu.edu/ontology/2004/11/gcmd-platform.owl#> .
@prefix gcmd-instrument: <http://geobrain.laits.gmu.edu/ontology/2004/11/gcmd-instrument.owl#> .

:landsatDSD a qb:DataStructureDefinition ;
    qb:component :instrumentComponent
               , :positionComponent
               , :satelliteComponent
               , :timeComponent
               , :dataComponent
               , :etmBandComponent
               , :dggsCellComponent
               , :levelComponent .

:landsatDS a qb:DataSet ;
    rdfs:label "Landsat sensor data"@en ;
    rdfs:comment "Landsat observations retrieved from the AGDC"@en ;
    qb:structure :landsatDSD ;
    :instrument gcmd-instrument:SCANNER ;
    :satellite gcmd-platform:LANDSAT-7 .

:instrumentComponent a qb:ComponentSpecification ;
    qb:attribute :instrument .

:positionComponent a qb:ComponentSpecification ;
    qb:dimension :location .

:satelliteComponent a qb:ComponentSpecification ;
    qb:attribute :satellite .

:timeComponent a qb:ComponentSpecification ;
    qb:dimension :time .

:dataComponent a qb:ComponentSpecification ;
    qb:dimension :imageData .

:etmBandComponent a qb:ComponentSpecification ;
    qb:dimension :etmBand .

:dggsCellComponent a qb:ComponentSpecification ;
    qb:dimension :dggsCell .

:levelComponent a qb:ComponentSpecification ;
    qb:dimension :levelPixel .

:etmBand a qb:AttributeProperty ;
    rdfs:label "Landsat ETM observation band"@en ;
    rdfs:range xsd:integer .

:instrument a qb:AttributeProperty ;
    rdfs:range gcmd-instrument:Instrument .

:satellite a qb:AttributeProperty ;
    rdfs:range gcmd-platform:PLATFORM .

:time a qb:AttributeProperty ;
    rdfs:range xsd:dateTime .

:bounds a qb:AttributeProperty ;
    rdfs:range ogc:wktLiteral .

:resolution a qb:AttributeProperty ;
    rdfs:label "Pixels per degree"@en ;
    rdfs:range xsd:decimal .

:dggsCell a qb:DimensionProperty ;
    rdfs:label "rHEALPix cell identifier"@en ;
    rdfs:range xsd:string .

:levelSquare a qb:DimensionProperty ;
    rdfs:label "DGGS level of the observed cell"@en ;
    rdfs:range xsd:integer .

:levelPixel a qb:DimensionProperty ;
    rdfs:label "DGGS level covered by one pixel"@en ;
    rdfs:range xsd:integer .
"#;

/// Parse the schema document into statements.
pub fn schema_statements() -> CubeResult<Vec<Triple>> {
    oxttl::TurtleParser::new()
        .for_slice(SCHEMA_TTL.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CubeError::SchemaParse(e.to_string()))
}
