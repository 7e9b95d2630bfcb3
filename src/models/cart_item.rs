use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{models::Product, StoreError};

/// A single entry in the cart stored on the customer record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart entry joined with the catalog, as returned to the client
#[derive(Debug, Serialize, Clone)]
pub struct CartProduct {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: i32,
}

/// Increments the quantity of `product_id`, appending it with a quantity of 1
/// when it isn't in the cart yet
pub fn add_item(items: &mut Vec<CartItem>, product_id: Uuid) {
    match items.iter_mut().find(|item| item.product_id == product_id) {
        Some(item) => item.quantity += 1,
        None => items.push(CartItem {
            product_id,
            quantity: 1,
        }),
    }
}

pub fn remove_item(items: &mut Vec<CartItem>, product_id: Uuid) {
    items.retain(|item| item.product_id != product_id);
}

/// Sets the quantity of an entry already in the cart, a quantity of zero
/// removes it
pub fn set_quantity(
    items: &mut Vec<CartItem>,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), StoreError> {
    if quantity < 0 {
        return Err(StoreError::BadRequest(
            "Quantity cannot be negative".to_owned(),
        ));
    }
    let position = items
        .iter()
        .position(|item| item.product_id == product_id)
        .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))?;

    if quantity == 0 {
        items.remove(position);
    } else if let Some(item) = items.get_mut(position) {
        item.quantity = quantity;
    }
    Ok(())
}

/// Zips the stored quantities into the products that still exist, keeping
/// cart order. Entries whose product was deleted are dropped.
pub fn join_with_products(items: &[CartItem], products: Vec<Product>) -> Vec<CartProduct> {
    items
        .iter()
        .filter_map(|item| {
            products
                .iter()
                .find(|product| product.id == item.product_id)
                .map(|product| CartProduct {
                    product: product.clone(),
                    quantity: item.quantity,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_product;
    use claim::{assert_err, assert_ok};

    #[test]
    fn adding_a_new_product_appends_with_quantity_one() {
        let mut items = vec![];
        let id = Uuid::new_v4();
        add_item(&mut items, id);
        assert_eq!(
            items,
            vec![CartItem {
                product_id: id,
                quantity: 1
            }]
        );
    }

    #[test]
    fn adding_an_existing_product_increments_it() {
        let id = Uuid::new_v4();
        let mut items = vec![CartItem {
            product_id: id,
            quantity: 2,
        }];
        add_item(&mut items, id);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn add_then_remove_restores_the_cart() {
        let existing = CartItem {
            product_id: Uuid::new_v4(),
            quantity: 4,
        };
        let mut items = vec![existing.clone()];
        let before = items.clone();

        let id = Uuid::new_v4();
        add_item(&mut items, id);
        remove_item(&mut items, id);

        assert_eq!(items, before);
    }

    #[test]
    fn zero_quantity_removes_the_entry() {
        let id = Uuid::new_v4();
        let mut items = vec![CartItem {
            product_id: id,
            quantity: 2,
        }];
        assert_ok!(set_quantity(&mut items, id, 0));
        assert!(items.is_empty());
    }

    #[test]
    fn updating_an_unknown_entry_is_not_found() {
        let mut items = vec![];
        let result = set_quantity(&mut items, Uuid::new_v4(), 3);
        assert_eq!(
            result,
            Err(StoreError::NotFound("Product not found".to_owned()))
        );
    }

    #[test]
    fn negative_quantities_are_rejected() {
        let id = Uuid::new_v4();
        let mut items = vec![CartItem {
            product_id: id,
            quantity: 2,
        }];
        assert_err!(set_quantity(&mut items, id, -1));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn deleted_products_silently_drop_out_of_the_joined_cart() {
        let kept = sample_product(100.0);
        let items = vec![
            CartItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
            },
            CartItem {
                product_id: kept.id,
                quantity: 3,
            },
        ];

        let joined = join_with_products(&items, vec![kept.clone()]);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].product.id, kept.id);
        assert_eq!(joined[0].quantity, 3);
    }
}
