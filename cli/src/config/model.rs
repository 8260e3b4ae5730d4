//! Deployment configuration record

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::legacy::LegacyEnv;
use crate::config::secrets::{generate_secret, SECRET_LENGTH};
use crate::errors::CliError;

/// Schema version written to `liquidai.yaml`
pub const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_API_SECRET: &str = "local_api_token";
pub const DEFAULT_STACK_VERSION: &str = "c3d7dbacd1";
pub const DEFAULT_MODEL_IMAGE: &str = "liquidai/lfm-7b-e:0.0.1";

/// Used when the model image does not follow the `liquidai/<family>-<name>` pattern
pub const FALLBACK_MODEL_NAME: &str = "lfm-7b";

pub const DEFAULT_DB_NAME: &str = "liquid_labs";
pub const DEFAULT_DB_USER: &str = "local_user";
pub const DEFAULT_DB_PASSWORD: &str = "local_password";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_SCHEMA: &str = "labs";

/// Hostname of the postgres container on the stack network
pub const DB_HOST_ALIAS: &str = "liquid-labs-postgres";

/// Full deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    pub security: SecuritySettings,

    pub stack: StackSettings,

    pub database: DatabaseSettings,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Secrets shared by the stack services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    pub jwt_secret: String,
    pub api_secret: String,
    pub auth_secret: String,
}

/// Stack and model versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSettings {
    pub version: String,
    pub model: ModelSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Image reference, e.g. `liquidai/lfm-7b-e:0.0.1`
    pub image: String,

    /// Short name derived from `image`
    pub name: String,
}

/// Postgres connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub schema: String,

    /// Connection string, always computed from the other fields
    pub url: String,
}

impl DatabaseSettings {
    /// Build the connection string used by the application server
    pub fn connection_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, DB_HOST_ALIAS, self.port, self.name
        )
    }
}

/// Every addressable field of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    JwtSecret,
    ApiSecret,
    AuthSecret,
    StackVersion,
    ModelImage,
    ModelName,
    DbName,
    DbUser,
    DbPort,
    DbSchema,
    DbPassword,
    DbUrl,
}

impl Field {
    /// All fields, in environment projection order
    pub const ALL: [Field; 12] = [
        Field::JwtSecret,
        Field::ApiSecret,
        Field::AuthSecret,
        Field::StackVersion,
        Field::ModelImage,
        Field::ModelName,
        Field::DbName,
        Field::DbUser,
        Field::DbPort,
        Field::DbSchema,
        Field::DbPassword,
        Field::DbUrl,
    ];

    /// Dotted key as it appears in `liquidai.yaml`
    pub fn key(&self) -> &'static str {
        match self {
            Field::JwtSecret => "security.jwt_secret",
            Field::ApiSecret => "security.api_secret",
            Field::AuthSecret => "security.auth_secret",
            Field::StackVersion => "stack.version",
            Field::ModelImage => "stack.model.image",
            Field::ModelName => "stack.model.name",
            Field::DbName => "database.name",
            Field::DbUser => "database.user",
            Field::DbPort => "database.port",
            Field::DbSchema => "database.schema",
            Field::DbPassword => "database.password",
            Field::DbUrl => "database.url",
        }
    }

    /// Environment variable read by the compose file
    pub fn env_name(&self) -> &'static str {
        match self {
            Field::JwtSecret => "JWT_SECRET",
            Field::ApiSecret => "API_SECRET",
            Field::AuthSecret => "AUTH_SECRET",
            Field::StackVersion => "STACK_VERSION",
            Field::ModelImage => "MODEL_IMAGE",
            Field::ModelName => "MODEL_NAME",
            Field::DbName => "POSTGRES_DB",
            Field::DbUser => "POSTGRES_USER",
            Field::DbPort => "POSTGRES_PORT",
            Field::DbSchema => "POSTGRES_SCHEMA",
            Field::DbPassword => "POSTGRES_PASSWORD",
            Field::DbUrl => "DATABASE_URL",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn from_env_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.env_name() == name)
    }

    /// Derived fields cannot be set directly
    pub fn is_derived(&self) -> bool {
        matches!(self, Field::ModelName | Field::DbUrl)
    }
}

/// Extract the model short name from an image reference.
///
/// `liquidai/lfm-7b-e:0.0.1` yields `7b-e`; anything else yields
/// [`FALLBACK_MODEL_NAME`].
pub fn derive_model_name(image: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"liquidai/[^-]+-([^:]+)").expect("valid model image pattern"));

    pattern
        .captures(image)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| FALLBACK_MODEL_NAME.to_string())
}

impl DeploymentConfig {
    /// Fresh configuration with newly generated secrets
    pub fn generate() -> Self {
        let mut database = DatabaseSettings {
            name: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            port: DEFAULT_DB_PORT,
            schema: DEFAULT_DB_SCHEMA.to_string(),
            url: String::new(),
        };
        database.url = database.connection_url();

        Self {
            version: CONFIG_VERSION,
            security: SecuritySettings {
                jwt_secret: generate_secret(SECRET_LENGTH),
                api_secret: DEFAULT_API_SECRET.to_string(),
                auth_secret: generate_secret(SECRET_LENGTH),
            },
            stack: StackSettings {
                version: DEFAULT_STACK_VERSION.to_string(),
                model: ModelSettings {
                    image: DEFAULT_MODEL_IMAGE.to_string(),
                    name: derive_model_name(DEFAULT_MODEL_IMAGE),
                },
            },
            database,
        }
    }

    /// Build a record from a legacy env file.
    ///
    /// Known keys are copied verbatim, missing ones become empty. The
    /// database port is always normalised to 5432.
    pub fn from_legacy(env: &LegacyEnv) -> Self {
        let value = |field: Field| env.get_or_empty(field.env_name());

        Self {
            version: CONFIG_VERSION,
            security: SecuritySettings {
                jwt_secret: value(Field::JwtSecret),
                api_secret: value(Field::ApiSecret),
                auth_secret: value(Field::AuthSecret),
            },
            stack: StackSettings {
                version: value(Field::StackVersion),
                model: ModelSettings {
                    image: value(Field::ModelImage),
                    name: value(Field::ModelName),
                },
            },
            database: DatabaseSettings {
                name: value(Field::DbName),
                user: value(Field::DbUser),
                password: value(Field::DbPassword),
                port: DEFAULT_DB_PORT,
                schema: value(Field::DbSchema),
                url: value(Field::DbUrl),
            },
        }
    }

    /// Reset the stack version to the release default
    pub fn upgrade_stack(&mut self) {
        self.stack.version = DEFAULT_STACK_VERSION.to_string();
    }

    /// Reset the model image to the release default and re-derive its name
    pub fn upgrade_model(&mut self) {
        self.stack.model.image = DEFAULT_MODEL_IMAGE.to_string();
        self.stack.model.name = derive_model_name(&self.stack.model.image);
    }

    /// Recompute the model name and connection string.
    ///
    /// Returns whether anything changed.
    pub fn refresh_derived(&mut self) -> bool {
        let name = derive_model_name(&self.stack.model.image);
        let url = self.database.connection_url();
        let changed = self.stack.model.name != name || self.database.url != url;
        self.stack.model.name = name;
        self.database.url = url;
        changed
    }

    /// Current value of a field, as a string
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::JwtSecret => self.security.jwt_secret.clone(),
            Field::ApiSecret => self.security.api_secret.clone(),
            Field::AuthSecret => self.security.auth_secret.clone(),
            Field::StackVersion => self.stack.version.clone(),
            Field::ModelImage => self.stack.model.image.clone(),
            Field::ModelName => self.stack.model.name.clone(),
            Field::DbName => self.database.name.clone(),
            Field::DbUser => self.database.user.clone(),
            Field::DbPort => self.database.port.to_string(),
            Field::DbSchema => self.database.schema.clone(),
            Field::DbPassword => self.database.password.clone(),
            Field::DbUrl => self.database.url.clone(),
        }
    }

    /// Look up a dotted key
    pub fn get(&self, key: &str) -> Result<String, CliError> {
        Field::from_key(key)
            .map(|field| self.value(field))
            .ok_or_else(|| CliError::UnknownKey(key.to_string()))
    }

    /// Update a dotted key, re-deriving whatever depends on it
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CliError> {
        let field = Field::from_key(key).ok_or_else(|| CliError::UnknownKey(key.to_string()))?;
        if field.is_derived() {
            return Err(CliError::Config(format!(
                "{} is derived and cannot be set directly",
                key
            )));
        }

        let value = value.to_string();
        match field {
            Field::JwtSecret => self.security.jwt_secret = value,
            Field::ApiSecret => self.security.api_secret = value,
            Field::AuthSecret => self.security.auth_secret = value,
            Field::StackVersion => self.stack.version = value,
            Field::ModelImage => self.stack.model.image = value,
            Field::DbName => self.database.name = value,
            Field::DbUser => self.database.user = value,
            Field::DbPort => {
                self.database.port = value.parse().map_err(|_| {
                    CliError::Config(format!("invalid database port: {}", value))
                })?
            }
            Field::DbSchema => self.database.schema = value,
            Field::DbPassword => self.database.password = value,
            Field::ModelName | Field::DbUrl => unreachable!("derived fields are rejected above"),
        }

        self.refresh_derived();
        Ok(())
    }
}
