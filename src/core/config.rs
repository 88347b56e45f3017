use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub sms: SmsConfig,
    pub payments: PaymentsConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for proof-of-work photos
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Prefix under which proof photos are written
    pub private_prefix: String,
    /// Presigned URL expiry time in seconds
    pub presigned_url_expiry_secs: u32,
}

/// SMS vendor configuration (Twilio-style REST API)
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// When false, messages are logged instead of sent
    pub enabled: bool,
    pub api_base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Payments vendor configuration (card-on-file charges and refunds)
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    pub api_base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub currency: String,
}

/// Booking schedule and reminder settings
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// UTC offset of the service area, used to interpret preferred date/time
    pub utc_offset_minutes: i32,
    /// Reminders go out for bookings starting within this many hours
    pub reminder_lead_hours: i64,
    pub reminder_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            sms: SmsConfig::from_env()?,
            payments: PaymentsConfig::from_env()?,
            booking: BookingConfig::from_env()?,
        })
    }
}

/// Parse an env var with a default, reporting the variable name on failure
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String>
where
    T: ToString,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", name))
}

/// Split a comma-separated list, dropping empty entries
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins =
            split_list(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let max_request_body_size =
            parse_var("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?;

        let audience = env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());

        // Hosted providers publish keys under the well-known path of the issuer
        let jwks_url = env::var("AUTH_JWKS_URL").unwrap_or_else(|_| {
            format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
        });

        let jwks_cache_ttl_secs = parse_var("JWKS_CACHE_TTL", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs = parse_var("JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "ServiceHub API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the ServiceHub marketplace".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u32 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            endpoint: env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            access_key: env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "servicehub-proofs".to_string()),
            region: env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            private_prefix: env::var("MINIO_PRIVATE_PREFIX")
                .unwrap_or_else(|_| "private".to_string()),
            presigned_url_expiry_secs: parse_var(
                "MINIO_PRESIGNED_URL_EXPIRY_SECS",
                Self::DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            )?,
        })
    }
}

impl SmsConfig {
    pub fn from_env() -> Result<Self, String> {
        let enabled = env::var("SMS_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let api_base_url = env::var("SMS_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.twilio.com/2010-04-01".to_string());
        let account_sid = env::var("SMS_ACCOUNT_SID").unwrap_or_default();
        let auth_token = env::var("SMS_AUTH_TOKEN").unwrap_or_default();
        let from_number = env::var("SMS_FROM_NUMBER").unwrap_or_default();

        if enabled && (account_sid.is_empty() || auth_token.is_empty() || from_number.is_empty()) {
            return Err(
                "SMS_ACCOUNT_SID, SMS_AUTH_TOKEN and SMS_FROM_NUMBER are required when SMS_ENABLED is set"
                    .to_string(),
            );
        }

        Ok(Self {
            enabled,
            api_base_url,
            account_sid,
            auth_token,
            from_number,
        })
    }
}

impl PaymentsConfig {
    pub fn from_env() -> Result<Self, String> {
        let secret_key = env::var("PAYMENTS_SECRET_KEY")
            .map_err(|_| "PAYMENTS_SECRET_KEY environment variable is required".to_string())?;
        let webhook_secret = env::var("PAYMENTS_WEBHOOK_SECRET")
            .map_err(|_| "PAYMENTS_WEBHOOK_SECRET environment variable is required".to_string())?;

        Ok(Self {
            api_base_url: env::var("PAYMENTS_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            secret_key,
            webhook_secret,
            currency: env::var("PAYMENTS_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
        })
    }
}

impl BookingConfig {
    const DEFAULT_REMINDER_LEAD_HOURS: i64 = 24;
    const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 300;

    pub fn from_env() -> Result<Self, String> {
        let utc_offset_minutes: i32 = parse_var("SERVICE_AREA_UTC_OFFSET_MINUTES", 0)?;
        if !(-14 * 60..=14 * 60).contains(&utc_offset_minutes) {
            return Err("SERVICE_AREA_UTC_OFFSET_MINUTES must be within +/- 840".to_string());
        }

        Ok(Self {
            utc_offset_minutes,
            reminder_lead_hours: parse_var(
                "REMINDER_LEAD_HOURS",
                Self::DEFAULT_REMINDER_LEAD_HOURS,
            )?,
            reminder_interval_secs: parse_var(
                "REMINDER_INTERVAL_SECS",
                Self::DEFAULT_REMINDER_INTERVAL_SECS,
            )?,
        })
    }

    /// Service area offset as a chrono timezone
    pub fn service_area_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" https://a.test, ,https://b.test,"),
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("docs".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("docs:secret".to_string()));
    }
}
