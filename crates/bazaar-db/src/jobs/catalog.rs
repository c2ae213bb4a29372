//! # Catalog Seed
//!
//! Populates an empty database with branches, GST categories, products,
//! staff and customers.
//!
//! ## Generated Data
//! - 5 branches across Bengaluru, Mumbai, Delhi and Pune; `BLR-01` is primary
//! - 8 categories, one per GST slab in use (0%, 5%, 12%, 18%)
//! - 8 base items per category, most with a value-pack variant
//!   - SKU: `{CAT}-{NNNN}`, barcode `890` + 10 digits
//!   - selling = cost + 15-45% margin, MRP = selling + 0-10%
//!   - GST rate copied from the category
//! - Staff: one admin, one manager and two cashiers per branch
//! - Customers: ~10% VIP, ~40% regular, rest retail
//!
//! Customer stats are generated on their own (purchase count × order value)
//! and do not come from any sale. `validate-data` reports the divergence as
//! warnings.
//!
//! Running against a database that already has branches does nothing.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::JobResult;
use crate::pool::Database;
use bazaar_core::ledger::loyalty_points_for;
use bazaar_core::validation::validate_product;
use bazaar_core::{
    Branch, Category, Customer, CustomerGroup, LoyaltyTier, Money, Product, Rate, User, UserRole,
    DEFAULT_CURRENCY,
};

/// (code, name, address, city, phone, primary)
const BRANCHES: &[(&str, &str, &str, &str, &str, bool)] = &[
    ("BLR-01", "Bazaar Indiranagar", "100 Feet Road, Indiranagar", "Bengaluru", "+91 80 4110 2001", true),
    ("BLR-02", "Bazaar Koramangala", "80 Feet Road, Koramangala", "Bengaluru", "+91 80 4110 2002", false),
    ("MUM-01", "Bazaar Andheri", "Link Road, Andheri West", "Mumbai", "+91 22 4220 3001", false),
    ("DEL-01", "Bazaar Saket", "Press Enclave Marg, Saket", "New Delhi", "+91 11 4330 4001", false),
    ("PNQ-01", "Bazaar Kothrud", "Karve Road, Kothrud", "Pune", "+91 20 4440 5001", false),
];

/// (name, brand, unit, cost in paise)
type Item = (&'static str, &'static str, &'static str, i64);

struct CategorySeed {
    code: &'static str,
    name: &'static str,
    sku_prefix: &'static str,
    gst_bps: u32,
    value_packs: bool,
    items: &'static [Item],
}

const CATEGORIES: &[CategorySeed] = &[
    CategorySeed {
        code: "FRESH",
        name: "Fruits & Vegetables",
        sku_prefix: "FRE",
        gst_bps: 0,
        value_packs: true,
        items: &[
            ("Tomatoes 1kg", "Farm Fresh", "kg", 3_000),
            ("Onions 1kg", "Farm Fresh", "kg", 2_800),
            ("Potatoes 1kg", "Farm Fresh", "kg", 2_500),
            ("Bananas Robusta", "Farm Fresh", "dozen", 4_000),
            ("Apples Shimla 1kg", "Farm Fresh", "kg", 12_000),
            ("Spinach", "Farm Fresh", "bunch", 1_500),
            ("Carrots 500g", "Farm Fresh", "pack", 2_500),
            ("Coriander", "Farm Fresh", "bunch", 800),
        ],
    },
    CategorySeed {
        code: "STAPLES",
        name: "Staples",
        sku_prefix: "STA",
        gst_bps: 500,
        value_packs: true,
        items: &[
            ("Basmati Rice 5kg", "India Gate", "bag", 52_000),
            ("Toor Dal 1kg", "Tata Sampann", "pack", 14_000),
            ("Whole Wheat Atta 10kg", "Aashirvaad", "bag", 38_000),
            ("Sugar 1kg", "Madhur", "pack", 4_200),
            ("Sunflower Oil 1L", "Fortune", "bottle", 13_000),
            ("Iodised Salt 1kg", "Tata", "pack", 2_000),
            ("Moong Dal 1kg", "Tata Sampann", "pack", 12_500),
            ("Poha 500g", "Rajdhani", "pack", 3_500),
        ],
    },
    CategorySeed {
        code: "DAIRY",
        name: "Dairy & Eggs",
        sku_prefix: "DAI",
        gst_bps: 500,
        value_packs: true,
        items: &[
            ("Toned Milk 1L", "Amul", "pack", 5_400),
            ("Fresh Curd 400g", "Nandini", "cup", 3_500),
            ("Malai Paneer 200g", "Amul", "pack", 8_000),
            ("Salted Butter 100g", "Amul", "pack", 5_000),
            ("Pure Ghee 1L", "Amul", "tin", 55_000),
            ("Cheese Slices 200g", "Britannia", "pack", 11_000),
            ("Sandwich Bread", "Modern", "loaf", 4_000),
            ("Brown Eggs", "Eggoz", "tray", 7_000),
        ],
    },
    CategorySeed {
        code: "SNACKS",
        name: "Snacks & Confectionery",
        sku_prefix: "SNA",
        gst_bps: 1200,
        value_packs: true,
        items: &[
            ("Aloo Bhujia 400g", "Haldiram's", "pack", 9_000),
            ("Marie Gold Biscuits", "Britannia", "pack", 2_500),
            ("Classic Salted Chips", "Lay's", "pack", 1_700),
            ("Dairy Milk Silk", "Cadbury", "bar", 3_500),
            ("Masala Noodles 4-Pack", "Maggi", "pack", 5_500),
            ("Dark Fantasy Cookies", "Sunfeast", "pack", 3_000),
            ("Roasted Peanuts 500g", "Haldiram's", "pack", 6_000),
            ("Toastea Rusk", "Britannia", "pack", 3_200),
        ],
    },
    CategorySeed {
        code: "BEVERAGES",
        name: "Beverages",
        sku_prefix: "BEV",
        gst_bps: 1200,
        value_packs: true,
        items: &[
            ("Premium Tea 500g", "Tata Tea", "pack", 22_000),
            ("Instant Coffee 200g", "Bru", "jar", 28_000),
            ("Mixed Fruit Juice 1L", "Real", "carton", 9_000),
            ("Cola 2L", "Thums Up", "bottle", 7_500),
            ("Mineral Water 1L", "Bisleri", "bottle", 1_500),
            ("Health Drink 500g", "Horlicks", "jar", 21_000),
            ("Green Tea 25 Bags", "Lipton", "box", 13_000),
            ("Sweet Lassi 200ml", "Amul", "bottle", 1_800),
        ],
    },
    CategorySeed {
        code: "PERSONAL-CARE",
        name: "Personal Care",
        sku_prefix: "PER",
        gst_bps: 1800,
        value_packs: true,
        items: &[
            ("Anti-Dandruff Shampoo 340ml", "Head & Shoulders", "bottle", 28_000),
            ("Toothpaste 150g", "Colgate", "tube", 8_500),
            ("Soap 4x100g", "Lux", "pack", 14_000),
            ("Neem Face Wash 100ml", "Himalaya", "tube", 12_000),
            ("Coconut Oil 300ml", "Parachute", "bottle", 11_000),
            ("Deodorant 150ml", "Nivea", "can", 15_000),
            ("Body Lotion 400ml", "Vaseline", "bottle", 19_000),
            ("Toothbrush Medium", "Oral-B", "piece", 3_500),
        ],
    },
    CategorySeed {
        code: "HOUSEHOLD",
        name: "Household",
        sku_prefix: "HOU",
        gst_bps: 1800,
        value_packs: true,
        items: &[
            ("Detergent Powder 1kg", "Surf Excel", "pack", 16_000),
            ("Dishwash Bar", "Vim", "piece", 2_800),
            ("Floor Cleaner 1L", "Lizol", "bottle", 17_000),
            ("Toilet Cleaner 500ml", "Harpic", "bottle", 8_500),
            ("Garbage Bags Medium", "Ezee", "roll", 4_500),
            ("Mosquito Repellent Refill", "Good Knight", "piece", 6_500),
            ("Scrub Pad 3-Pack", "Scotch-Brite", "pack", 2_500),
            ("Air Freshener", "Odonil", "piece", 4_000),
        ],
    },
    CategorySeed {
        code: "APPLIANCES",
        name: "Small Appliances",
        sku_prefix: "APP",
        gst_bps: 1800,
        value_packs: false,
        items: &[
            ("Electric Kettle 1.5L", "Prestige", "piece", 85_000),
            ("Mixer Grinder 750W", "Bajaj", "piece", 240_000),
            ("LED Bulb 9W", "Philips", "piece", 9_000),
            ("Dry Iron", "Philips", "piece", 70_000),
            ("Extension Board 4-Socket", "Anchor", "piece", 35_000),
            ("Rechargeable Torch", "Eveready", "piece", 18_000),
            ("Pressure Cooker 3L", "Hawkins", "piece", 130_000),
            ("Steel Water Bottle 1L", "Milton", "piece", 30_000),
        ],
    },
];

/// Value pack: three units at 2.8× the single-unit cost.
const VALUE_PACK_COST_TENTHS: i64 = 28;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Ananya", "Arjun", "Diya", "Ishaan", "Kavya", "Meera", "Nikhil", "Priya", "Rahul",
    "Rohan", "Saanvi", "Sneha", "Tanvi", "Varun", "Vikram", "Aditi", "Farhan", "Lakshmi", "Zoya",
];

const LAST_NAMES: &[&str] = &[
    "Sharma", "Iyer", "Reddy", "Patel", "Nair", "Gupta", "Khan", "Menon", "Rao", "Desai",
    "Kulkarni", "Singh", "Bose", "Pillai", "Joshi",
];

/// What [`seed_catalog`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub branches: usize,
    pub categories: usize,
    pub products: usize,
    pub users: usize,
    pub customers: usize,
    /// The database already had branches; nothing was written.
    pub skipped: bool,
}

/// Seeds branches, catalog, staff and `customer_count` customers.
pub async fn seed_catalog<R: Rng + ?Sized>(
    db: &Database,
    customer_count: usize,
    rng: &mut R,
) -> JobResult<SeedSummary> {
    let existing = db.branches().count().await?;
    if existing > 0 {
        warn!(branches = existing, "Database already seeded, skipping");
        return Ok(SeedSummary {
            skipped: true,
            ..SeedSummary::default()
        });
    }

    let mut summary = SeedSummary::default();

    let branches = build_branches();
    for branch in &branches {
        db.branches().insert(branch).await?;
    }
    summary.branches = branches.len();
    info!(count = summary.branches, "Branches created");

    let mut barcode_seq = 0u64;
    for seed in CATEGORIES {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            code: seed.code.to_string(),
            name: seed.name.to_string(),
            gst_rate_bps: seed.gst_bps,
            created_at: Utc::now(),
        };
        db.categories().insert(&category).await?;
        summary.categories += 1;

        let products = build_products(seed, &category, &mut barcode_seq, rng)?;
        for product in &products {
            db.products().insert(product).await?;
        }
        summary.products += products.len();
        info!(category = %category.code, products = products.len(), "Category seeded");
    }

    let users = build_staff(&branches);
    for user in &users {
        db.users().insert(user).await?;
    }
    summary.users = users.len();
    info!(count = summary.users, "Staff created");

    for index in 0..customer_count {
        let customer = build_customer(index + 1, rng);
        db.customers().insert(&customer).await?;
    }
    summary.customers = customer_count;
    info!(count = customer_count, "Customers created");

    Ok(summary)
}

fn build_branches() -> Vec<Branch> {
    let now = Utc::now();
    BRANCHES
        .iter()
        .map(|&(code, name, address, city, phone, is_primary)| Branch {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            phone: Some(phone.to_string()),
            email: Some(format!("{}@bazaar.example.in", code.to_lowercase())),
            is_primary,
            tax_rate_bps: 1800,
            currency: DEFAULT_CURRENCY.to_string(),
            is_active: true,
            created_at: now,
        })
        .collect()
}

/// Products of one category, base items first, then value packs.
fn build_products<R: Rng + ?Sized>(
    seed: &CategorySeed,
    category: &Category,
    barcode_seq: &mut u64,
    rng: &mut R,
) -> JobResult<Vec<Product>> {
    let mut variants: Vec<(String, &str, String, Money)> = seed
        .items
        .iter()
        .map(|&(name, brand, unit, cost)| (name.to_string(), brand, unit.to_string(), Money::from_paise(cost)))
        .collect();

    if seed.value_packs {
        let packs: Vec<_> = seed
            .items
            .iter()
            .map(|&(name, brand, _, cost)| {
                (
                    format!("{name} Value Pack"),
                    brand,
                    "pack of 3".to_string(),
                    Money::from_paise(cost * VALUE_PACK_COST_TENTHS / 10),
                )
            })
            .collect();
        variants.extend(packs);
    }

    let now = Utc::now();
    let mut products = Vec::with_capacity(variants.len());
    for (index, (name, brand, unit, cost)) in variants.into_iter().enumerate() {
        *barcode_seq += 1;

        let selling = round_up_to_rupee(cost + cost.apply_rate(Rate::from_bps(rng.gen_range(1500..=4500))));
        let mrp = round_up_to_rupee(selling + selling.apply_rate(Rate::from_bps(rng.gen_range(0..=1000))));

        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: format!("{}-{:04}", seed.sku_prefix, index + 1),
            barcode: Some(format!("890{:010}", barcode_seq)),
            name,
            category_id: category.id.clone(),
            brand: Some(brand.to_string()),
            unit,
            cost_price_paise: cost.paise(),
            selling_price_paise: selling.paise(),
            mrp_paise: mrp.paise(),
            gst_rate_bps: category.gst_rate_bps,
            is_active: true,
            created_at: now,
            updated_at: now,
            stock_by_branch: Vec::new(),
        };
        validate_product(&product).map_err(bazaar_core::CoreError::from)?;
        products.push(product);
    }

    Ok(products)
}

fn round_up_to_rupee(amount: Money) -> Money {
    Money::from_rupees((amount.paise() + 99) / 100)
}

fn build_staff(branches: &[Branch]) -> Vec<User> {
    let now = Utc::now();
    let mut users = vec![User {
        id: Uuid::new_v4().to_string(),
        username: "admin".to_string(),
        full_name: "Store Administrator".to_string(),
        email: Some("admin@bazaar.example.in".to_string()),
        role: UserRole::Admin,
        branch_id: None,
        is_active: true,
        created_at: now,
    }];

    for branch in branches {
        let suffix = branch.code.to_lowercase().replace('-', "");
        let staff = [
            (format!("mgr.{suffix}"), format!("{} Manager", branch.name), UserRole::Manager),
            (format!("cashier1.{suffix}"), format!("{} Cashier 1", branch.name), UserRole::Cashier),
            (format!("cashier2.{suffix}"), format!("{} Cashier 2", branch.name), UserRole::Cashier),
        ];
        for (username, full_name, role) in staff {
            users.push(User {
                id: Uuid::new_v4().to_string(),
                email: Some(format!("{username}@bazaar.example.in")),
                username,
                full_name,
                role,
                branch_id: Some(branch.id.clone()),
                is_active: true,
                created_at: now,
            });
        }
    }

    users
}

fn draw_group<R: Rng + ?Sized>(rng: &mut R) -> CustomerGroup {
    match rng.gen_range(0..100) {
        0..=9 => CustomerGroup::Vip,
        10..=49 => CustomerGroup::Regular,
        _ => CustomerGroup::Retail,
    }
}

/// One customer with independently generated purchase stats.
fn build_customer<R: Rng + ?Sized>(number: usize, rng: &mut R) -> Customer {
    let group = draw_group(rng);
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Guest");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Customer");

    let (purchases, order_value_rupees, credit_limit) = match group {
        CustomerGroup::Vip => (rng.gen_range(10..=60), rng.gen_range(2_000..=8_000), 50_000),
        CustomerGroup::Regular => (rng.gen_range(3..=25), rng.gen_range(800..=3_000), 10_000),
        CustomerGroup::Retail => (rng.gen_range(0..=8), rng.gen_range(200..=1_200), 0),
    };

    let average = Money::from_rupees(order_value_rupees);
    let total_spent = average * purchases;
    let now = Utc::now();
    let last_purchase_at = (purchases > 0).then(|| now - Duration::days(rng.gen_range(0..90)));

    Customer {
        id: Uuid::new_v4().to_string(),
        customer_number: format!("CUST{number:06}"),
        name: format!("{first} {last}"),
        phone: Some(format!("+91 9{:09}", rng.gen_range(0..1_000_000_000u64))),
        email: Some(format!("{}.{}{}@example.in", first.to_lowercase(), last.to_lowercase(), number)),
        customer_group: group,
        total_spent_paise: total_spent.paise(),
        total_purchases: purchases,
        average_order_value_paise: if purchases > 0 { average.paise() } else { 0 },
        loyalty_points: loyalty_points_for(total_spent),
        loyalty_tier: LoyaltyTier::for_spend(total_spent),
        credit_limit_paise: Money::from_rupees(credit_limit).paise(),
        current_balance_paise: 0,
        last_purchase_at,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
