//! Document generation — `create` with a server-composed body.

use tracing::info;

use crate::collection::{append, Collection};
use crate::errors::ClientError;
use crate::models::{Document, GenerationRequest};

const GENERATE_PATH: &str = "/documents/generate";

impl Collection<Document> {
    /// POST /documents/generate
    ///
    /// The backend composes the document from the job details and the selected
    /// profile records. Success appends the generated document to the cache;
    /// failure leaves the cache as it was and records the backend's message,
    /// or `Failed to generate document` when it gave none.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Document, ClientError> {
        self.validate(request, "generate")?;
        let ticket = self.begin(None)?;
        info!(
            "Generating {} for {} at {}",
            request.document_type, request.job_title, request.employer_name
        );
        let result = self
            .client
            .post::<_, Document>(GENERATE_PATH, request)
            .await;
        self.settle(ticket, result, "generate", append)
    }
}
