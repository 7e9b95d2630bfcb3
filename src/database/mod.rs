mod analytics;
mod coupon;
mod customer;
mod order;
mod product;
mod session_token;

pub use analytics::{AnalyticsDatabase, AnalyticsRepository};
pub use coupon::{CouponDatabase, CouponRepository};
pub use customer::{CustomerDatabase, CustomerRepository};
pub use order::{OrderDatabase, OrderRepository};
pub use product::{ProductDatabase, ProductRepository};
pub use session_token::{SessionTokenDatabase, SessionTokenRepository};
