pub mod analytics;
pub mod cart_item;
pub mod checkout;
mod cookies;
mod coupon;
mod customer;
mod order;
mod product;
mod role;
mod token;
mod tokens;

pub use cart_item::{CartItem, CartProduct};
pub use cookies::{auth_cookie, removal_cookie, AuthCookies};
pub use coupon::{generate_gift_code, Coupon, NewCoupon};
pub use customer::{normalize_email, AuthCustomer, Customer, LoginInput, NewCustomer, SignupInput};
pub use order::{Confirmation, NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product, ProductInput, Specification};
pub use role::Role;
pub use token::{Claims, TokenType, VerifiedToken};
pub use tokens::TokenPair;
