use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::fs;
use tracing::{debug, instrument, warn};

use crate::core::config::ImportSettings;
use crate::core::importer::{ActivityImporter, ImportOutcome};
use crate::core::transaction::Transaction;

/// Client for the tracker's bulk activity import endpoint.
pub struct GhostfolioClient {
    import_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ImportRequest<'a> {
    activities: &'a [Transaction],
}

impl GhostfolioClient {
    pub fn new(settings: &ImportSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("contrib-import/1.0");

        if let Some(path) = &settings.ca_cert {
            let pem = fs::read(path)
                .with_context(|| format!("Failed to read certificate chain: {}", path.display()))?;
            let certs = reqwest::Certificate::from_pem_bundle(&pem).with_context(|| {
                format!("Failed to parse certificate chain: {}", path.display())
            })?;
            if certs.is_empty() {
                bail!("No certificates found in {}", path.display());
            }
            debug!(count = certs.len(), path = %path.display(), "Trusting certificate chain");
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        Ok(GhostfolioClient {
            import_url: format!("{}/api/v1/import", settings.base_url),
            api_key: settings.api_key.clone(),
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl ActivityImporter for GhostfolioClient {
    #[instrument(name = "ImportSubmit", skip_all, fields(count = transactions.len()))]
    async fn submit(&self, transactions: &[Transaction]) -> Result<ImportOutcome> {
        debug!("Posting activities to {}", self.import_url);

        let response = self
            .client
            .post(&self.import_url)
            .bearer_auth(&self.api_key)
            .json(&ImportRequest {
                activities: transactions,
            })
            .send()
            .await
            .with_context(|| format!("Failed to send import request to {}", self.import_url))?;

        let status = response.status();
        debug!(%status, "Received import response");
        if status == StatusCode::CREATED {
            return Ok(ImportOutcome::Created);
        }

        Ok(ImportOutcome::Rejected {
            status: status.as_u16(),
            body: rejection_body(response.text().await),
        })
    }
}

/// The rejection is reported with its status even when the body is unreadable.
fn rejection_body(text: reqwest::Result<String>) -> String {
    match text {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read import response body");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{DataSource, TransactionType};
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> ImportSettings {
        ImportSettings {
            base_url: base_url.to_string(),
            api_key: "secret-token".to_string(),
            ca_cert: None,
        }
    }

    fn transaction(symbol: &str, quantity: f64, unit_price: f64) -> Transaction {
        Transaction {
            account_id: "acc-1".to_string(),
            symbol: symbol.to_string(),
            transaction_type: TransactionType::Buy,
            quantity,
            unit_price,
            date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            currency: "USD".to_string(),
            data_source: DataSource::Yahoo,
            fee: 0.0,
        }
    }

    #[tokio::test]
    async fn test_created_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/import"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_json(serde_json::json!({
                "activities": [{
                    "accountId": "acc-1",
                    "symbol": "VTI",
                    "type": "BUY",
                    "quantity": 6.0,
                    "unitPrice": 100.0,
                    "date": "2024-06-12",
                    "currency": "USD",
                    "dataSource": "YAHOO",
                    "fee": 0.0
                }]
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GhostfolioClient::new(&settings(&mock_server.uri())).unwrap();
        let outcome = client.submit(&[transaction("VTI", 6.0, 100.0)]).await.unwrap();
        assert_eq!(outcome, ImportOutcome::Created);
    }

    #[tokio::test]
    async fn test_empty_batch_is_well_formed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/import"))
            .and(body_json(serde_json::json!({ "activities": [] })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GhostfolioClient::new(&settings(&mock_server.uri())).unwrap();
        assert!(client.submit(&[]).await.unwrap().is_created());
    }

    #[tokio::test]
    async fn test_other_status_is_rejected_with_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/import"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"message":["activities.0.symbol is invalid"]}"#),
            )
            .mount(&mock_server)
            .await;

        let client = GhostfolioClient::new(&settings(&mock_server.uri())).unwrap();
        let outcome = client.submit(&[transaction("???", 1.0, 1.0)]).await.unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Rejected {
                status: 400,
                body: r#"{"message":["activities.0.symbol is invalid"]}"#.to_string(),
            }
        );
    }

    #[test_log::test]
    fn test_unreadable_rejection_body_is_empty() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert_eq!(rejection_body(Err(err)), "");
        assert_eq!(rejection_body(Ok("Unauthorized".to_string())), "Unauthorized");
    }

    #[tokio::test]
    async fn test_rejection_without_body_keeps_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = GhostfolioClient::new(&settings(&mock_server.uri())).unwrap();
        let outcome = client.submit(&[transaction("VTI", 1.0, 1.0)]).await.unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Rejected {
                status: 502,
                body: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_ok_is_not_created() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = GhostfolioClient::new(&settings(&mock_server.uri())).unwrap();
        let outcome = client.submit(&[]).await.unwrap();
        assert!(!outcome.is_created());
    }

    #[test]
    fn test_missing_certificate_file() {
        let mut settings = settings("https://folio.example.com");
        settings.ca_cert = Some(PathBuf::from("/nonexistent/chain.pem"));
        let err = GhostfolioClient::new(&settings).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Failed to read certificate chain: /nonexistent/chain.pem"
        );
    }

    #[test]
    fn test_certificate_file_without_certificates() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not a certificate\n").unwrap();
        let mut settings = settings("https://folio.example.com");
        settings.ca_cert = Some(file.path().to_path_buf());
        assert!(GhostfolioClient::new(&settings).is_err());
    }
}
