//! Image actions client implementation.

use crate::models::{ActionEnvelope, ActionRequest};
use crate::Result;
use async_trait::async_trait;
use digitalocean_core::types::Action;
use digitalocean_core::{Client, Error, Response, Transport, TransportExt};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Operations on the actions of a single image.
///
/// Every call makes exactly one request; failures are returned as-is.
#[async_trait]
pub trait ImageActionsService: Send + Sync {
    /// Fetch an action of an image by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without sending anything when
    /// `action_id` is less than 1, otherwise any transport or decode error.
    async fn get(&self, image_id: &str, action_id: i64) -> Result<(Action, Response)>;

    /// Transfer an image using a caller-built request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without sending anything when
    /// `transfer_request` is `None`, otherwise any transport or decode error.
    async fn transfer(
        &self,
        image_id: &str,
        transfer_request: Option<&ActionRequest>,
    ) -> Result<(Action, Response)>;

    /// Convert an image (e.g. a backup) to a snapshot.
    ///
    /// # Errors
    ///
    /// Returns any transport or decode error.
    async fn convert(&self, image_id: &str) -> Result<(Action, Response)>;
}

/// [`ImageActionsService`] backed by a shared [`Transport`].
#[derive(Clone)]
pub struct ImageActionsClient {
    transport: Arc<dyn Transport>,
}

impl ImageActionsClient {
    /// Create the service on top of an API client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_transport(Arc::new(client))
    }

    /// Create the service on top of any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(Action, Response)> {
        let request = self.transport.new_request(method, path, body)?;
        let (envelope, response) = self
            .transport
            .execute_json::<ActionEnvelope>(request)
            .await?;
        Ok((envelope.action, response))
    }
}

impl std::fmt::Debug for ImageActionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageActionsClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageActionsService for ImageActionsClient {
    async fn get(&self, image_id: &str, action_id: i64) -> Result<(Action, Response)> {
        if action_id < 1 {
            warn!(image_id, action_id, "Rejected image action lookup");
            return Err(Error::invalid_argument("action_id", "cannot be less than 1"));
        }

        debug!(image_id, action_id, "Fetching image action");
        self.send(Method::GET, &action_path(image_id, action_id), None)
            .await
    }

    async fn transfer(
        &self,
        image_id: &str,
        transfer_request: Option<&ActionRequest>,
    ) -> Result<(Action, Response)> {
        let Some(transfer_request) = transfer_request else {
            warn!(image_id, "Rejected image transfer without a request body");
            return Err(Error::invalid_argument("transfer_request", "cannot be nil"));
        };

        debug!(image_id, "Transferring image");
        self.send(
            Method::POST,
            &actions_path(image_id),
            Some(transfer_request.to_value()),
        )
        .await
    }

    async fn convert(&self, image_id: &str) -> Result<(Action, Response)> {
        debug!(image_id, "Converting image to snapshot");
        let convert_request = ActionRequest::convert();
        self.send(
            Method::POST,
            &actions_path(image_id),
            Some(convert_request.to_value()),
        )
        .await
    }
}

fn actions_path(image_id: &str) -> String {
    format!("v2/images/{image_id}/actions")
}

fn action_path(image_id: &str, action_id: i64) -> String {
    format!("v2/images/{image_id}/actions/{action_id}")
}
