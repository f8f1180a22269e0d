use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Result, ServiceClient};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Certificate {
    #[serde(rename_all = "camelCase")]
    Remote {
        certificate_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// Plain-text stand-in produced when the remote service is unavailable.
    Local { text: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateResponse {
    #[serde(alias = "id")]
    certificate_id: String,
    #[serde(default)]
    url: Option<String>,
}

pub struct CertificateClient {
    client: ServiceClient,
    url: String,
}

impl CertificateClient {
    pub fn new(client: ServiceClient, url: String) -> Self {
        Self { client, url }
    }

    pub async fn generate(&self, fields: &BTreeMap<String, String>) -> Result<Certificate> {
        let url = self.url.clone();
        let resp: CertificateResponse = self
            .client
            .send_json("certificate", |http| http.post(&url).json(fields))
            .await?;
        Ok(Certificate::Remote {
            certificate_id: resp.certificate_id,
            url: resp.url,
        })
    }
}

/// Renders the fields as a plain-text certificate. Well-known fields get
/// their own lines; everything else is listed after them.
pub fn local_certificate(fields: &BTreeMap<String, String>) -> Certificate {
    const KNOWN: [&str; 4] = ["learnerName", "moduleTitle", "score", "completedAt"];
    let get = |k: &str| fields.get(k).map(String::as_str).unwrap_or("-");

    let mut text = String::new();
    text.push_str("CERTIFICATE OF COMPLETION\n");
    text.push_str("=========================\n\n");
    text.push_str(&format!("This certifies that {}\n", get("learnerName")));
    text.push_str(&format!("has completed the module \"{}\"\n", get("moduleTitle")));
    if let Some(score) = fields.get("score") {
        text.push_str(&format!("with a quiz score of {score}%\n"));
    }
    text.push_str(&format!("on {}.\n", get("completedAt")));

    let extra: Vec<_> = fields
        .iter()
        .filter(|(k, _)| !KNOWN.contains(&k.as_str()))
        .collect();
    if !extra.is_empty() {
        text.push('\n');
        for (k, v) in extra {
            text.push_str(&format!("{k}: {v}\n"));
        }
    }
    Certificate::Local { text }
}
