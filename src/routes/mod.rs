mod analytics;
mod auth;
mod cart;
mod coupons;
mod health_check;
mod payments;
mod products;

pub use analytics::analytics_report;
pub use auth::{log_in, log_out, profile, refresh, sign_up};
pub use cart::{add_to_cart, get_cart, remove_from_cart, update_quantity};
pub use coupons::{get_coupon, validate_coupon};
pub use health_check::health_check;
pub use payments::{checkout_success, create_checkout_session};
pub use products::{
    create_product, delete_product, get_all_products, get_featured_products, get_product,
    get_products_by_category, get_recommended_products, toggle_featured_product, update_product,
};
