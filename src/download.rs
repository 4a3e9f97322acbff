//! Retrieval of raw GenBank records from NCBI
//!
//! Only available with the `download` feature.
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";
const TIMEOUT: Duration = Duration::from_secs(60);

/// Errors while retrieving a record
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The server answered with a status other than `200 OK`
    #[error("could not download the GenBank record {accession}: status {status}")]
    Status { accession: String, status: u16 },
    /// The request could not be sent or the body could not be read
    #[error("could not download the GenBank record {accession}")]
    Request {
        accession: String,
        #[source]
        source: reqwest::Error,
    },
    /// The record could not be written to disk
    #[error("could not write the GenBank record {accession}")]
    Io {
        accession: String,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that returns the raw bytes of a record for an accession
pub trait RecordSource {
    /// Returns the raw record of `accession`
    ///
    /// # Errors
    ///
    /// [`DownloadError`] if the record cannot be retrieved
    fn fetch(&self, accession: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Fetches GenBank records (`gbwithparts`) from the NCBI Entrez service
///
/// Each accession is requested once, there are no retries.
#[derive(Debug, Clone)]
pub struct GenbankClient {
    client: Client,
    url: String,
}

impl GenbankClient {
    /// Builds a client for the NCBI efetch endpoint with a 60 second timeout
    ///
    /// # Errors
    ///
    /// [`reqwest::Error`] if the TLS backend cannot be initialized
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_url(EFETCH_URL)
    }

    /// Builds a client for an efetch compatible endpoint, e.g. a mirror
    ///
    /// # Errors
    ///
    /// [`reqwest::Error`] if the TLS backend cannot be initialized
    pub fn with_url(url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl RecordSource for GenbankClient {
    fn fetch(&self, accession: &str) -> Result<Vec<u8>, DownloadError> {
        debug!("Requesting {accession} from {}", self.url);
        let request_error = |source| DownloadError::Request {
            accession: accession.to_string(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("db", "nuccore"),
                ("rettype", "gbwithparts"),
                ("retmode", "text"),
                ("id", accession),
            ])
            .send()
            .map_err(request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::Status {
                accession: accession.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().map_err(request_error)?.to_vec())
    }
}

/// Downloads the GenBank record of `accession` into `output`
///
/// # Errors
///
/// [`DownloadError`] if the record cannot be retrieved or written
pub fn download_genbank<S: RecordSource, P: AsRef<Path>>(
    source: &S,
    accession: &str,
    output: P,
) -> Result<(), DownloadError> {
    let content = source.fetch(accession)?;
    fs::write(output.as_ref(), content).map_err(|source| DownloadError::Io {
        accession: accession.to_string(),
        source,
    })?;
    info!("GenBank record {accession} written to {}", output.as_ref().display());
    Ok(())
}
