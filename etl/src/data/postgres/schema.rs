//! PostgreSQL schema definitions
//!
//! The wide `temp_data` staging table plus the star schema it is normalized
//! into. Every statement is kept separate so each can be executed on its own;
//! the populate steps are ordered so that every table is filled after the
//! tables it references.

/// Staging table name
pub const STAGING_TABLE: &str = "temp_data";

/// Staging columns in spreadsheet order; also the bind order of staging inserts
pub const STAGING_COLUMNS: [&str; 26] = [
    "ID",
    "ITEMCODE",
    "ITEMNAME",
    "FICHENO",
    "DATE_",
    "AMOUNT",
    "PRICE",
    "LINENETTOTAL",
    "LINENET",
    "BRANCHNR",
    "BRANCH",
    "SALESMAN",
    "CITY",
    "REGION",
    "LATITUDE",
    "LONGITUDE",
    "CLIENTCODE",
    "CLIENTNAME",
    "BRANDCODE",
    "BRAND",
    "CATEGORY_NAME1",
    "CATEGORY_NAME2",
    "CATEGORY_NAME3",
    "STARTDATE",
    "ENDDATE",
    "GENDER",
];

/// Wide landing table, no constraints
pub const CREATE_STAGING_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS temp_data (
    ID BIGINT,
    ITEMCODE VARCHAR,
    ITEMNAME VARCHAR,
    FICHENO VARCHAR,
    DATE_ TIMESTAMP DEFAULT NULL,
    AMOUNT DOUBLE PRECISION,
    PRICE DOUBLE PRECISION,
    LINENETTOTAL DOUBLE PRECISION,
    LINENET DOUBLE PRECISION,
    BRANCHNR INT,
    BRANCH VARCHAR,
    SALESMAN VARCHAR,
    CITY VARCHAR,
    REGION VARCHAR,
    LATITUDE DOUBLE PRECISION,
    LONGITUDE DOUBLE PRECISION,
    CLIENTCODE VARCHAR,
    CLIENTNAME VARCHAR,
    BRANDCODE VARCHAR,
    BRAND VARCHAR,
    CATEGORY_NAME1 VARCHAR,
    CATEGORY_NAME2 VARCHAR,
    CATEGORY_NAME3 VARCHAR,
    STARTDATE TIMESTAMP DEFAULT NULL,
    ENDDATE TIMESTAMP DEFAULT NULL,
    GENDER VARCHAR
)
"#;

/// Star schema tables, referenced tables first
pub const STAR_SCHEMA: [&str; 8] = [
    r#"
CREATE TABLE IF NOT EXISTS branches (
    branch_id SERIAL PRIMARY KEY,
    branch_nr INT UNIQUE,
    branch_name VARCHAR,
    city VARCHAR,
    region VARCHAR,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION
)"#,
    r#"
CREATE TABLE IF NOT EXISTS salesmen (
    salesman_id SERIAL PRIMARY KEY,
    salesman_name VARCHAR,
    branch_id INT REFERENCES branches(branch_id),
    CONSTRAINT salesmen_name_branch_unique UNIQUE (salesman_name, branch_id)
)"#,
    r#"
CREATE TABLE IF NOT EXISTS clients (
    client_id SERIAL PRIMARY KEY,
    client_code VARCHAR UNIQUE,
    client_name VARCHAR,
    gender VARCHAR
)"#,
    r#"
CREATE TABLE IF NOT EXISTS brands (
    brand_id SERIAL PRIMARY KEY,
    brand_code VARCHAR UNIQUE,
    brand_name VARCHAR
)"#,
    r#"
CREATE TABLE IF NOT EXISTS categories (
    category_id SERIAL PRIMARY KEY,
    category_name1 VARCHAR,
    category_name2 VARCHAR,
    category_name3 VARCHAR
)"#,
    r#"
CREATE TABLE IF NOT EXISTS items (
    item_id SERIAL PRIMARY KEY,
    item_code VARCHAR UNIQUE,
    item_name VARCHAR,
    brand_id INT REFERENCES brands(brand_id),
    category_id INT REFERENCES categories(category_id),
    price DOUBLE PRECISION
)"#,
    r#"
CREATE TABLE IF NOT EXISTS sales (
    sale_id SERIAL PRIMARY KEY,
    fisheno VARCHAR,
    date TIMESTAMP,
    client_id INT REFERENCES clients(client_id),
    salesman_id INT REFERENCES salesmen(salesman_id),
    start_date TIMESTAMP,
    end_date TIMESTAMP,
    CONSTRAINT sales_fisheno_date_unique UNIQUE (fisheno, date)
)"#,
    r#"
CREATE TABLE IF NOT EXISTS sale_items (
    sale_item_id SERIAL PRIMARY KEY,
    sale_id INT REFERENCES sales(sale_id),
    item_id INT REFERENCES items(item_id),
    amount DOUBLE PRECISION,
    line_net_total DOUBLE PRECISION,
    line_net DOUBLE PRECISION
)"#,
];

/// One `INSERT ... SELECT` that fills a star table from staging
#[derive(Debug, Clone, Copy)]
pub struct PopulateStep {
    pub table: &'static str,
    pub sql: &'static str,
}

/// Populate statements in dependency order
///
/// Every step except `categories` and `sale_items` skips rows whose natural
/// key already exists, so repeated passes over the same staging data do not
/// duplicate dimensions or sales.
pub const POPULATE_STEPS: [PopulateStep; 8] = [
    PopulateStep {
        table: "branches",
        sql: r#"
INSERT INTO branches (branch_nr, branch_name, city, region, latitude, longitude)
SELECT DISTINCT
    BRANCHNR,
    NULLIF(BRANCH, ''),
    NULLIF(CITY, ''),
    NULLIF(REGION, ''),
    NULLIF(LATITUDE, 0),
    NULLIF(LONGITUDE, 0)
FROM temp_data
WHERE BRANCHNR IS NOT NULL
  AND NULLIF(BRANCH, '') IS NOT NULL
  AND NULLIF(CITY, '') IS NOT NULL
  AND NULLIF(REGION, '') IS NOT NULL
ORDER BY 1, 2, 3, 4, 5, 6
ON CONFLICT (branch_nr) DO NOTHING"#,
    },
    PopulateStep {
        table: "clients",
        sql: r#"
INSERT INTO clients (client_code, client_name, gender)
SELECT DISTINCT
    NULLIF(CLIENTCODE, ''),
    NULLIF(CLIENTNAME, ''),
    NULLIF(GENDER, '')
FROM temp_data
WHERE NULLIF(CLIENTCODE, '') IS NOT NULL
  AND NULLIF(CLIENTNAME, '') IS NOT NULL
ORDER BY 1, 2, 3
ON CONFLICT (client_code) DO NOTHING"#,
    },
    PopulateStep {
        table: "brands",
        sql: r#"
INSERT INTO brands (brand_code, brand_name)
SELECT DISTINCT
    NULLIF(BRANDCODE, ''),
    NULLIF(BRAND, '')
FROM temp_data
WHERE NULLIF(BRANDCODE, '') IS NOT NULL
  AND NULLIF(BRAND, '') IS NOT NULL
ORDER BY 1, 2
ON CONFLICT (brand_code) DO NOTHING"#,
    },
    PopulateStep {
        table: "categories",
        sql: r#"
INSERT INTO categories (category_name1, category_name2, category_name3)
SELECT DISTINCT
    NULLIF(CATEGORY_NAME1, ''),
    NULLIF(NULLIF(CATEGORY_NAME2, ''), 'N/A'),
    NULLIF(NULLIF(CATEGORY_NAME3, ''), 'N/A')
FROM temp_data
WHERE NULLIF(CATEGORY_NAME1, '') IS NOT NULL
ORDER BY 1, 2, 3"#,
    },
    PopulateStep {
        table: "salesmen",
        sql: r#"
INSERT INTO salesmen (salesman_name, branch_id)
SELECT DISTINCT
    NULLIF(t.SALESMAN, ''),
    b.branch_id
FROM temp_data t
JOIN branches b ON t.BRANCHNR = b.branch_nr
WHERE NULLIF(t.SALESMAN, '') IS NOT NULL
ORDER BY 1, 2
ON CONFLICT (salesman_name, branch_id) DO NOTHING"#,
    },
    PopulateStep {
        table: "items",
        sql: r#"
INSERT INTO items (item_code, item_name, brand_id, category_id, price)
SELECT DISTINCT
    t.ITEMCODE,
    t.ITEMNAME,
    b.brand_id,
    c.category_id,
    t.PRICE
FROM temp_data t
JOIN brands b ON t.BRANDCODE = b.brand_code
JOIN categories c
    ON NULLIF(t.CATEGORY_NAME1, '') = c.category_name1
   AND NULLIF(NULLIF(t.CATEGORY_NAME2, ''), 'N/A') IS NOT DISTINCT FROM c.category_name2
   AND NULLIF(NULLIF(t.CATEGORY_NAME3, ''), 'N/A') IS NOT DISTINCT FROM c.category_name3
WHERE NULLIF(t.ITEMCODE, '') IS NOT NULL
  AND NULLIF(t.ITEMNAME, '') IS NOT NULL
  AND t.PRICE IS NOT NULL
ORDER BY 1, 4, 2, 3, 5
ON CONFLICT (item_code) DO NOTHING"#,
    },
    PopulateStep {
        table: "sales",
        sql: r#"
INSERT INTO sales (fisheno, date, client_id, salesman_id, start_date, end_date)
SELECT DISTINCT
    t.FICHENO,
    t.DATE_,
    cl.client_id,
    s.salesman_id,
    NULLIF(t.STARTDATE, '1970-01-01'::timestamp),
    NULLIF(t.ENDDATE, '1970-01-01'::timestamp)
FROM temp_data t
JOIN clients cl ON t.CLIENTCODE = cl.client_code
JOIN branches b ON t.BRANCHNR = b.branch_nr
JOIN salesmen s ON t.SALESMAN = s.salesman_name AND s.branch_id = b.branch_id
WHERE NULLIF(t.FICHENO, '') IS NOT NULL
  AND t.DATE_ IS NOT NULL
ORDER BY 1, 2, 3, 4, 5, 6
ON CONFLICT (fisheno, date) DO NOTHING"#,
    },
    PopulateStep {
        table: "sale_items",
        sql: r#"
INSERT INTO sale_items (sale_id, item_id, amount, line_net_total, line_net)
SELECT
    s.sale_id,
    i.item_id,
    NULLIF(t.AMOUNT, 0),
    NULLIF(t.LINENETTOTAL, 0),
    NULLIF(t.LINENET, 0)
FROM temp_data t
JOIN sales s ON t.FICHENO = s.fisheno AND t.DATE_ = s.date
JOIN items i ON t.ITEMCODE = i.item_code
WHERE t.AMOUNT IS NOT NULL
  AND t.LINENETTOTAL IS NOT NULL
  AND t.LINENET IS NOT NULL"#,
    },
];
