//! SPARQL update endpoint client.

use std::time::Duration;

use oxrdf::{NamedNode, Triple};

use cube_common::{vocab, CubeError, CubeResult};

/// Endpoints and the fixed default graph of the target store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SPARQL query endpoint URL.
    pub query_url: String,
    /// SPARQL update endpoint URL.
    pub update_url: String,
    /// Named graph every statement is added to.
    pub graph: NamedNode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_url: "http://localhost:3030/landsat/query".to_string(),
            update_url: "http://localhost:3030/landsat/update".to_string(),
            graph: vocab::default_graph(),
        }
    }
}

fn store_err(e: reqwest::Error) -> CubeError {
    CubeError::StoreUpload(e.to_string())
}

/// One open/add/close cycle against the update endpoint.
///
/// Statements are accumulated while the connection is open; closing posts
/// them as a single `INSERT DATA` operation, which is the point at which
/// the batch is durably committed. There is no rollback: a failed close
/// leaves earlier, already-closed batches in the store.
pub struct UpdateConnection {
    client: reqwest::blocking::Client,
    update_url: String,
    graph: NamedNode,
    pending: Vec<Triple>,
}

impl UpdateConnection {
    /// Open a connection for one batch.
    pub fn open(config: &StoreConfig) -> CubeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(store_err)?;

        Ok(Self {
            client,
            update_url: config.update_url.clone(),
            graph: config.graph.clone(),
            pending: Vec::new(),
        })
    }

    /// Stage a statement, tagged with the fixed default graph.
    pub fn add(&mut self, statement: Triple) {
        self.pending.push(statement);
    }

    /// Commit the staged statements and close the connection.
    pub fn close(self) -> CubeResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let count = self.pending.len();
        let body = insert_data_update(&self.graph, &self.pending);
        let response = self
            .client
            .post(&self.update_url)
            .header(reqwest::header::CONTENT_TYPE, "application/sparql-update")
            .body(body)
            .send()
            .map_err(store_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CubeError::StoreUpload(format!(
                "update endpoint {} returned {status}",
                self.update_url
            )));
        }
        Ok(count)
    }
}

/// Render one `INSERT DATA` operation adding statements to a named graph.
fn insert_data_update(graph: &NamedNode, statements: &[Triple]) -> String {
    let mut body = String::from("INSERT DATA {\n");
    body.push_str(&format!("  GRAPH {graph} {{\n"));
    for statement in statements {
        body.push_str(&format!("    {statement} .\n"));
    }
    body.push_str("  }\n}\n");
    body
}
