use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub restaurant_id: String,
    pub name: String,
    pub cuisine: String,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub cart_id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub items: Vec<CartItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    /// Removed by the server's TTL monitor once this instant has passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

impl Cart {
    pub fn computed_total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{self, Bson};

    use super::*;

    #[test]
    fn user_serializes_with_validator_field_names() {
        let user = User {
            user_id: "u-1".into(),
            email: "ada@example.com".into(),
            profile: Profile {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                phone: None,
            },
            created_at: None,
        };
        let doc = bson::to_document(&user).unwrap();
        assert!(doc.contains_key("userId"));
        let profile = doc.get_document("profile").unwrap();
        assert!(profile.contains_key("firstName"));
        assert!(!profile.contains_key("phone"));
        assert!(!doc.contains_key("createdAt"));
    }

    #[test]
    fn cart_expiry_is_a_bson_date() {
        let cart = Cart {
            cart_id: "c-1".into(),
            customer_id: "u-1".into(),
            restaurant_id: "r-1".into(),
            items: vec![CartItem {
                item_id: "i-1".into(),
                name: "Margherita".into(),
                price: 9.5,
                quantity: 2,
            }],
            total_amount: Some(19.0),
            expires_at: Some(DateTime::from_millis(0)),
        };
        let doc = bson::to_document(&cart).unwrap();
        assert!(matches!(doc.get("expiresAt"), Some(Bson::DateTime(_))));
        assert_eq!(cart.computed_total(), 19.0);
    }
}
