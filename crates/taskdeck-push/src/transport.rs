use async_trait::async_trait;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, URL_SAFE_NO_PAD,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

use taskdeck_types::models::PushSubscription;

use crate::{PushTransport, SendFailure};

/// Production transport: VAPID-signed Web Push via the `web-push` crate.
pub struct WebPushTransport {
    client: HyperWebPushClient,
    private_key: String,
    subject: String,
}

impl WebPushTransport {
    /// `private_key` is the URL-safe base64 VAPID private key; `subject` is
    /// the `mailto:` contact claim.
    pub fn new(private_key: String, subject: String) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            private_key,
            subject,
        }
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), SendFailure> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.p256dh.clone(),
            subscription.auth.clone(),
        );

        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, &info)
                .map_err(other)?;
        sig_builder.add_claim("sub", self.subject.as_str());
        let signature = sig_builder.build().map_err(other)?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        let message = builder.build().map_err(other)?;

        match self.client.send(message).await {
            Ok(()) => Ok(()),
            Err(WebPushError::EndpointNotValid | WebPushError::EndpointNotFound) => {
                Err(SendFailure::Gone)
            }
            Err(e) => Err(SendFailure::Other(e.to_string())),
        }
    }
}

fn other(e: WebPushError) -> SendFailure {
    SendFailure::Other(e.to_string())
}
