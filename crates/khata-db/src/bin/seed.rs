//! # Seed Data Generator
//!
//! Populates the database with a starter catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p khata-db --bin seed
//!
//! # Specify database path
//! cargo run -p khata-db --bin seed -- --db ./data/khata.db
//! ```
//!
//! Seeds the kind of catalog a kirana-style oil and grain shop carries:
//! oils by the litre, rice/atta/dal by the kilogram, with base prices in
//! rupees and a low-stock threshold per product.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use khata_core::{Money, Product, Unit};
use khata_db::{Database, DbConfig};

/// (name, category, product_type, packaging, price rupees, stock, unit, alert)
const CATALOG: &[(&str, &str, &str, &str, i64, i64, Unit, i64)] = &[
    ("Sunflower Oil 1L", "oil", "sunflower", "1L pouch", 140, 60, Unit::L, 10),
    ("Sunflower Oil 5L", "oil", "sunflower", "5L can", 680, 20, Unit::L, 5),
    ("Groundnut Oil 1L", "oil", "groundnut", "1L pouch", 190, 40, Unit::L, 10),
    ("Mustard Oil 1L", "oil", "mustard", "1L bottle", 165, 30, Unit::L, 8),
    ("Coconut Oil 500ml", "oil", "coconut", "500ml bottle", 110, 25, Unit::L, 6),
    ("Basmati Rice 1KG", "rice", "basmati", "1KG pack", 95, 80, Unit::Kg, 15),
    ("Basmati Rice 25KG", "rice", "basmati", "25KG bag", 2200, 12, Unit::Kg, 3),
    ("Sona Masoori 25KG", "rice", "sona masoori", "25KG bag", 1450, 15, Unit::Kg, 4),
    ("Idli Rice 25KG", "rice", "idli", "25KG bag", 1300, 10, Unit::Kg, 3),
    ("Whole Wheat Atta 10KG", "atta", "whole wheat", "10KG bag", 420, 25, Unit::Kg, 6),
    ("Toor Dal 1KG", "dal", "toor", "1KG pack", 155, 50, Unit::Kg, 10),
    ("Moong Dal 1KG", "dal", "moong", "1KG pack", 130, 45, Unit::Kg, 10),
    ("Chana Dal 1KG", "dal", "chana", "1KG pack", 105, 40, Unit::Kg, 10),
    ("Sugar 1KG", "grocery", "sugar", "1KG pack", 46, 100, Unit::Kg, 20),
    ("Jaggery 1KG", "grocery", "jaggery", "1KG block", 70, 30, Unit::Kg, 8),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let db_path = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "khata.db".to_string());

    println!("Seeding catalog into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let products = db.products();
    let now = Utc::now();

    let mut inserted = 0usize;
    for (name, category, product_type, packaging, price, stock, unit, alert) in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: category.to_string(),
            product_type: product_type.to_string(),
            packaging: packaging.to_string(),
            base_price_paise: Money::from_rupees(*price).paise(),
            stock: *stock,
            unit: *unit,
            low_stock_alert: *alert,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        products.insert(&product).await?;
        inserted += 1;
    }

    println!("Seeded {inserted} products");
    Ok(())
}
