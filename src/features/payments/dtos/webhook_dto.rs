use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment.failed";
pub const EVENT_REFUND_SUCCEEDED: &str = "refund.succeeded";

/// Event posted by the payments provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookObject,
}

/// The payment or refund the event is about
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookObject {
    /// Payment id, or refund id for refund events
    pub id: String,
    /// Amount in cents
    #[serde(default)]
    pub amount: Option<i64>,
    /// Payment a refund belongs to
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: WebhookMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WebhookMetadata {
    #[serde(default)]
    pub request_id: Option<String>,
}

impl WebhookObject {
    /// Booking id echoed back from the charge metadata
    pub fn request_id(&self) -> Option<Uuid> {
        self.metadata
            .request_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
    }

    /// Vendor id of the payment this object settles
    pub fn payment_reference(&self) -> &str {
        self.payment_intent.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAckDto {
    pub received: bool,
    /// False when the event type or booking is unknown
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_payment_event() {
        let request_id = Uuid::new_v4();
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": "payment.succeeded",
            "data": {
                "id": "pi_1",
                "amount": 12000,
                "metadata": { "request_id": request_id.to_string() }
            }
        }))
        .unwrap();

        assert_eq!(event.event_type, EVENT_PAYMENT_SUCCEEDED);
        assert_eq!(event.data.request_id(), Some(request_id));
        assert_eq!(event.data.payment_reference(), "pi_1");
    }

    #[test]
    fn test_refund_references_its_payment() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "refund.succeeded",
            "data": { "id": "re_1", "amount": 8000, "payment_intent": "pi_1" }
        }))
        .unwrap();

        assert_eq!(event.data.request_id(), None);
        assert_eq!(event.data.payment_reference(), "pi_1");
    }

    #[test]
    fn test_invalid_request_id_is_ignored() {
        let object = WebhookObject {
            id: "pi_1".to_string(),
            amount: None,
            payment_intent: None,
            metadata: WebhookMetadata {
                request_id: Some("not-a-uuid".to_string()),
            },
        };
        assert_eq!(object.request_id(), None);
    }
}
