#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use crate::shared::constants::{ROLE_ADMIN, ROLE_AGENT, ROLE_CLIENT};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
fn user_with_role(sub: &str, role: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: sub.to_string(),
        email: Some(format!("{}@example.test", sub)),
        phone: None,
        roles: vec![role.to_string()],
    }
}

#[cfg(test)]
pub fn create_admin_user() -> AuthenticatedUser {
    user_with_role("test-admin", ROLE_ADMIN)
}

#[cfg(test)]
pub fn create_agent_user() -> AuthenticatedUser {
    user_with_role("test-agent", ROLE_AGENT)
}

#[cfg(test)]
pub fn create_client_user() -> AuthenticatedUser {
    user_with_role("test-client", ROLE_CLIENT)
}

/// Layer that injects a fixed user, standing in for the JWT middleware
#[cfg(test)]
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}


#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::features::{
    admin::AdminService, bookings::BookingService, catalog::CatalogService, jobs::JobService,
    notifications::NotificationService, profiles::ProfileService,
};

#[cfg(test)]
use crate::modules::payments::{
    ChargeRequest, PaymentError, PaymentGateway, PaymentOutcome, RefundRequest,
};

/// Pool that never connects until a query runs
#[cfg(test)]
pub fn lazy_pool() -> sqlx::PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/servicehub_test")
        .unwrap()
}

/// Gateway that approves everything without a network call
#[cfg(test)]
pub struct ApprovingPaymentGateway;

#[cfg(test)]
#[async_trait]
impl PaymentGateway for ApprovingPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<PaymentOutcome, PaymentError> {
        Ok(PaymentOutcome {
            reference: format!("pi_{}", request.idempotency_key),
            status: "succeeded".to_string(),
        })
    }

    async fn refund(&self, request: RefundRequest) -> Result<PaymentOutcome, PaymentError> {
        Ok(PaymentOutcome {
            reference: format!("re_{}", request.idempotency_key),
            status: "succeeded".to_string(),
        })
    }
}

/// Fully wired services over a lazy pool, for router tests that stop before the database
#[cfg(test)]
pub struct TestServices {
    pub profiles: Arc<ProfileService>,
    pub notifications: Arc<NotificationService>,
    pub bookings: Arc<BookingService>,
    pub jobs: Arc<JobService>,
    pub admin: Arc<AdminService>,
}

#[cfg(test)]
impl TestServices {
    pub async fn new() -> Self {
        use crate::core::config::MinIOConfig;
        use crate::modules::sms::LogSmsSender;
        use crate::modules::storage::MinIOClient;
        use chrono::FixedOffset;

        let pool = lazy_pool();
        let offset = FixedOffset::east_opt(0).unwrap();

        let storage = Arc::new(
            MinIOClient::new(MinIOConfig {
                endpoint: "http://localhost:9000".to_string(),
                access_key: "minioadmin".to_string(),
                secret_key: "minioadmin".to_string(),
                bucket: "servicehub-test".to_string(),
                region: "us-east-1".to_string(),
                private_prefix: "private".to_string(),
                presigned_url_expiry_secs: 60,
            })
            .await
            .unwrap(),
        );
        let payments: Arc<dyn PaymentGateway> = Arc::new(ApprovingPaymentGateway);

        let profiles = Arc::new(ProfileService::new(pool.clone()));
        let catalog = Arc::new(CatalogService::new(pool.clone()));
        let notifications = Arc::new(NotificationService::new(
            pool.clone(),
            Arc::new(LogSmsSender),
            profiles.clone(),
            offset,
            "usd".to_string(),
        ));
        let bookings = Arc::new(BookingService::new(
            pool.clone(),
            catalog,
            profiles.clone(),
            notifications.clone(),
            payments.clone(),
            storage.clone(),
            offset,
        ));
        let jobs = Arc::new(JobService::new(
            pool.clone(),
            profiles.clone(),
            bookings.clone(),
            notifications.clone(),
            storage,
        ));
        let admin = Arc::new(AdminService::new(
            pool,
            bookings.clone(),
            jobs.clone(),
            profiles.clone(),
            notifications.clone(),
            payments,
        ));

        Self {
            profiles,
            notifications,
            bookings,
            jobs,
            admin,
        }
    }
}
