//! Data file schema
//!
//! The statements are run in order, verbatim, when a new data file is
//! created. Existing files are never migrated.

/// Ordered DDL for a new data file
pub const TABLE_DEFINITION: &[&str] = &[
    r#"CREATE TABLE conditions (
        record_id INTEGER PRIMARY KEY,
        condition TEXT NOT NULL UNIQUE,
        remarks TEXT
    )"#,
    r#"CREATE TABLE items (
        record_id INTEGER PRIMARY KEY,
        part_number TEXT NOT NULL,
        assembly TEXT NOT NULL,
        quantity INTEGER,
        condition TEXT,
        installed INTEGER,
        box INTEGER,
        remarks TEXT
    )"#,
    r#"CREATE TABLE order_lines (
        record_id INTEGER PRIMARY KEY,
        order_number TEXT NOT NULL,
        line INTEGER,
        part_number TEXT NOT NULL,
        cost_each REAL,
        quantity INTEGER,
        remarks TEXT
    )"#,
    r#"CREATE TABLE orders (
        record_id INTEGER PRIMARY KEY,
        order_number TEXT NOT NULL UNIQUE,
        date TEXT,
        source TEXT,
        subtotal REAL,
        shipping REAL,
        discount REAL,
        tax REAL,
        total REAL,
        remarks TEXT
    )"#,
    r#"CREATE TABLE parts (
        record_id INTEGER PRIMARY KEY,
        part_number TEXT NOT NULL UNIQUE,
        source TEXT,
        description TEXT,
        remarks TEXT
    )"#,
    r#"CREATE TABLE sources (
        record_id INTEGER PRIMARY KEY,
        source TEXT NOT NULL UNIQUE,
        remarks TEXT
    )"#,
    "CREATE INDEX idx_items_assembly ON items(assembly)",
    "CREATE INDEX idx_items_part_number ON items(part_number)",
    "CREATE INDEX idx_order_lines_order_number ON order_lines(order_number)",
    "CREATE INDEX idx_order_lines_part_number ON order_lines(part_number)",
    "CREATE INDEX idx_parts_source ON parts(source)",
    "CREATE INDEX idx_orders_date ON orders(date)",
];

/// Tables every data file must have
pub const TABLES: &[&str] = &[
    "conditions",
    "items",
    "order_lines",
    "orders",
    "parts",
    "sources",
];
