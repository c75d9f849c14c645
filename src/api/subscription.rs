//! Subscription packages and checkout.

use tracing::info;

use super::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{CheckoutRequest, CheckoutSession, Package, Subscription};

pub async fn packages(api: &ApiClient) -> Result<Vec<Package>> {
    api.get_data("subscription/packages").await
}

/// Current subscription, `None` before the first checkout.
pub async fn current(api: &ApiClient) -> Result<Option<Subscription>> {
    match api.get_data("subscription").await {
        Ok(subscription) => Ok(subscription),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create a payment order; the user pays at the returned URL.
pub async fn checkout(api: &ApiClient, request: &CheckoutRequest) -> Result<CheckoutSession> {
    if request.seats == 0 {
        return Err(AppError::validation("At least one seat is required"));
    }
    let session: CheckoutSession = api.post_data("subscription/checkout", request).await?;
    info!(
        "Checkout order {} for {} seats ({})",
        session.order_id,
        request.seats,
        request.cycle.label()
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, Reply};
    use crate::models::BillingCycle;

    #[tokio::test]
    async fn test_current_is_none_when_missing() {
        let server = mock::serve(vec![
            Reply::json(404, r#"{"message":"No subscription"}"#),
            Reply::json(200, r#"{"data":null}"#),
        ])
        .await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        assert_eq!(current(&api).await.unwrap(), None);
        assert_eq!(current(&api).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_checkout_returns_payment_link() {
        let server = mock::serve(vec![Reply::json(
            201,
            r#"{"data":{"order_id":"INV-2026-0042","amount":166500,"payment_url":"https://pay.example.com/INV-2026-0042"}}"#,
        )])
        .await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let request = CheckoutRequest {
            package_id: 1,
            seats: 10,
            cycle: BillingCycle::Monthly,
        };
        let session = checkout(&api, &request).await.unwrap();
        assert_eq!(session.amount, 166_500);

        let raw = &server.requests().await[0];
        assert!(raw.ends_with(r#"{"package_id":1,"seats":10,"cycle":"monthly"}"#));
    }
}
