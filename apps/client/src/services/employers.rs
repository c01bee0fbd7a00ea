use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::employer::ScrapeRequest;
use crate::models::{EmployerProfile, RecordId};

const EMPLOYERS_PATH: &str = "/employers";

/// POST /employers/scrape
///
/// Reads the employer's name and stated values from its website.
pub async fn scrape_employer(client: &ApiClient, url: &str) -> Result<EmployerProfile, ClientError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ClientError::Validation(
            "Please enter an employer website URL".to_string(),
        ));
    }
    client
        .post(&format!("{EMPLOYERS_PATH}/scrape"), &ScrapeRequest { employer_url: url })
        .await
}

/// GET /employers
pub async fn list_employers(client: &ApiClient) -> Result<Vec<EmployerProfile>, ClientError> {
    client.get(EMPLOYERS_PATH).await
}

/// GET /employers/:id
pub async fn get_employer(client: &ApiClient, id: &RecordId) -> Result<EmployerProfile, ClientError> {
    client.get(&format!("{EMPLOYERS_PATH}/{id}")).await
}
