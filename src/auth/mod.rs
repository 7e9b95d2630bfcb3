mod authenticate;
pub(crate) mod authorize;
mod guard;
mod token;

pub use authenticate::{hash_password, verify_password, verify_password_and_fetch_details};
pub use authorize::{decode_token, encode_token};
pub use guard::{authenticate_request, require_admin, AdminCustomer, AuthenticatedCustomer};
pub use token::{generate_new_tokens, refresh_access_token, revoke_refresh_token};
