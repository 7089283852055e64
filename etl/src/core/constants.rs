// =============================================================================
// Application Identity
// =============================================================================

/// Application name (for display)
pub const APP_NAME: &str = "retail-etl";

/// Target name used in the default log filter
pub const APP_LOG_TARGET: &str = "retail_etl";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".retail-etl";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "retail-etl.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "RETAIL_ETL_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "RETAIL_ETL_LOG";

/// Environment variable to switch logs to JSON lines
pub const ENV_JSON_LOGS: &str = "RETAIL_ETL_JSON_LOGS";

// =============================================================================
// Environment Variables - Input & Pipeline
// =============================================================================

/// Environment variable for the spreadsheet path
pub const ENV_INPUT_PATH: &str = "RETAIL_ETL_INPUT_PATH";

/// Environment variable for the worksheet name
pub const ENV_INPUT_SHEET: &str = "RETAIL_ETL_INPUT_SHEET";

/// Environment variable for the analytical insert batch size
pub const ENV_BATCH_SIZE: &str = "RETAIL_ETL_BATCH_SIZE";

/// Environment variable for the staging policy
pub const ENV_STAGING_MODE: &str = "RETAIL_ETL_STAGING_MODE";

/// Environment variable for the stage retry count
pub const ENV_RETRIES: &str = "RETAIL_ETL_RETRIES";

/// Environment variable for the stage retry delay (seconds)
pub const ENV_RETRY_DELAY_SECS: &str = "RETAIL_ETL_RETRY_DELAY_SECS";

// =============================================================================
// Environment Variables - Databases
// =============================================================================

/// PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "RETAIL_ETL_POSTGRES_URL";

/// ClickHouse connection URL
pub const ENV_CLICKHOUSE_URL: &str = "RETAIL_ETL_CLICKHOUSE_URL";

/// ClickHouse user
pub const ENV_CLICKHOUSE_USER: &str = "RETAIL_ETL_CLICKHOUSE_USER";

/// ClickHouse password
pub const ENV_CLICKHOUSE_PASSWORD: &str = "RETAIL_ETL_CLICKHOUSE_PASSWORD";

// =============================================================================
// Pipeline Defaults
// =============================================================================

/// Rows per analytical insert call
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Stage retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 1;

/// Delay before the first stage retry
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 300;

/// Columns the input spreadsheet must carry
pub const REQUIRED_COLUMNS: [&str; 5] = ["CLIENTCODE", "GENDER", "PRICE", "AMOUNT", "DATE_"];

// =============================================================================
// PostgreSQL Defaults
// =============================================================================

pub const POSTGRES_DEFAULT_HOST: &str = "localhost";
pub const POSTGRES_DEFAULT_PORT: u16 = 5432;
pub const POSTGRES_DEFAULT_USER: &str = "postgres";
pub const POSTGRES_DEFAULT_DATABASE: &str = "postgres";

/// One run is sequential; a handful of connections is plenty
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 4;

pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL caps a single statement at 65535 bind parameters
pub const POSTGRES_MAX_BIND_PARAMS: usize = 65_535;

// =============================================================================
// ClickHouse Defaults
// =============================================================================

pub const CLICKHOUSE_DEFAULT_URL: &str = "http://localhost:8123";
pub const CLICKHOUSE_DEFAULT_DATABASE: &str = "default";
