use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub supabase: SupabaseConfig,
    pub storefront: StorefrontConfig,
    pub session: SessionConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// Connection settings for the hosted backend (Supabase).
///
/// `url` and `anon_key` are required for the shop to work, but their absence
/// does not stop startup. See [`SupabaseConfig::is_configured`].
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub anon_key: String,
    /// Postgres schema the products table lives in
    pub schema: String,
    /// Name of the products table
    pub products_table: String,
    /// Interval between Realtime heartbeats
    pub realtime_heartbeat: Duration,
}

/// Shop-facing settings used by the catalog and order links
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub store_name: String,
    /// WhatsApp number in international format without `+`
    pub whatsapp_number: String,
    pub placeholder_image_url: String,
    pub low_stock_threshold: i64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
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
            supabase: SupabaseConfig::from_env()?,
            storefront: StorefrontConfig::from_env()?,
            session: SessionConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

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

impl SupabaseConfig {
    const DEFAULT_HEARTBEAT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("SUPABASE_URL")
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let anon_key = env::var("SUPABASE_ANON_KEY").unwrap_or_default();

        let schema = env::var("SUPABASE_SCHEMA").unwrap_or_else(|_| "public".to_string());
        let products_table =
            env::var("SUPABASE_PRODUCTS_TABLE").unwrap_or_else(|_| "products".to_string());

        let heartbeat_secs = env::var("REALTIME_HEARTBEAT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_HEARTBEAT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "REALTIME_HEARTBEAT_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            anon_key,
            schema,
            products_table,
            realtime_heartbeat: Duration::from_secs(heartbeat_secs.max(1)),
        })
    }

    /// Both the project URL and the anon key are present
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}

impl StorefrontConfig {
    const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let store_name = env::var("STORE_NAME").unwrap_or_else(|_| "Dava Samjho".to_string());
        let whatsapp_number =
            env::var("WHATSAPP_NUMBER").unwrap_or_else(|_| "919876543210".to_string());
        let placeholder_image_url = env::var("PLACEHOLDER_IMAGE_URL").unwrap_or_else(|_| {
            "https://via.placeholder.com/400x300?text=Medical+Product".to_string()
        });

        let low_stock_threshold = env::var("LOW_STOCK_THRESHOLD")
            .unwrap_or_else(|_| Self::DEFAULT_LOW_STOCK_THRESHOLD.to_string())
            .parse::<i64>()
            .map_err(|_| "LOW_STOCK_THRESHOLD must be a valid number".to_string())?;

        Ok(Self {
            store_name,
            whatsapp_number,
            placeholder_image_url,
            low_stock_threshold,
        })
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            store_name: "Dava Samjho".to_string(),
            whatsapp_number: "919876543210".to_string(),
            placeholder_image_url: "https://via.placeholder.com/400x300?text=Medical+Product"
                .to_string(),
            low_stock_threshold: Self::DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, String> {
        let cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "sb-access-token".to_string());

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            cookie_name,
            cookie_secure,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sb-access-token".to_string(),
            cookie_secure: false,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Dava Samjho API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Product catalog API for the Dava Samjho storefront".to_string());

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
