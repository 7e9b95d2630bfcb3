use serde::{Deserialize, Serialize};
use sqlx::Type;
use strum::{Display, EnumString};

#[derive(
    Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Type, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(type_name = "customer_role", rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}
