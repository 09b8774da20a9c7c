use super::*;

impl AcademyApiClient {
    /// The backend's VAPID public key (URL-safe base64), if configured.
    pub async fn push_public_key(&self) -> Result<Option<String>, ClientError> {
        let url = self.endpoint(&["push", "public-key"])?;
        let body = self.authenticated_get(url).await?;
        Ok(parse_public_key(&body))
    }

    /// Hand a browser push subscription to the backend.
    pub async fn register_push_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["push", "subscribe"])?;
        self.authenticated_post(url, subscription).await?;
        Ok(())
    }
}

fn parse_public_key(body: &str) -> Option<String> {
    let resp: PublicKeyResponse = serde_json::from_str(body).ok()?;
    resp.public_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
