use mongodb::bson::{Document, doc};

use super::{CollectionSpec, IndexSpec};

pub const COLLECTION: &str = "carts";

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::new(&[("cartId", 1)]).unique(),
    IndexSpec::new(&[("customerId", 1)]),
    IndexSpec::new(&[("restaurantId", 1)]),
    // Documents are removed by the server once `expiresAt` is in the past.
    IndexSpec::new(&[("expiresAt", 1)]).expire_after(0),
];

pub const SPEC: CollectionSpec = CollectionSpec {
    name: COLLECTION,
    validator,
    indexes: INDEXES,
};

pub fn validator() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["cartId", "customerId", "restaurantId", "items"],
        "properties": {
            "cartId": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "customerId": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "restaurantId": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "items": {
                "bsonType": "array",
                "description": "must be an array and is required"
            },
            "totalAmount": {
                "bsonType": "number",
                "minimum": 0,
                "description": "must be a positive number if the field exists"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_amount_is_non_negative_number() {
        let schema = validator();
        let total = schema
            .get_document("properties")
            .and_then(|p| p.get_document("totalAmount"))
            .unwrap();
        assert_eq!(total.get_str("bsonType").unwrap(), "number");
        assert_eq!(total.get_i32("minimum").unwrap(), 0);
    }

    #[test]
    fn items_element_shape_is_unconstrained() {
        let schema = validator();
        let items = schema
            .get_document("properties")
            .and_then(|p| p.get_document("items"))
            .unwrap();
        assert!(!items.contains_key("items"));
    }
}
