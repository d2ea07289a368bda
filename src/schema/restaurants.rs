use mongodb::bson::{Document, doc};

use super::{CollectionSpec, IndexSpec};

pub const COLLECTION: &str = "restaurants";

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::new(&[("restaurantId", 1)]).unique(),
    IndexSpec::new(&[("name", 1)]),
    IndexSpec::new(&[("cuisine", 1)]),
    IndexSpec::new(&[("address.city", 1)]),
    IndexSpec::new(&[("isActive", 1)]),
];

pub const SPEC: CollectionSpec = CollectionSpec {
    name: COLLECTION,
    validator,
    indexes: INDEXES,
};

pub fn validator() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["restaurantId", "name", "cuisine", "address"],
        "properties": {
            "restaurantId": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "name": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "cuisine": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "address": {
                "bsonType": "object",
                "required": ["street", "city", "zipCode"],
                "description": "must be an object and is required"
            },
            "isActive": {
                "bsonType": "bool",
                "description": "must be a boolean if the field exists"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_requires_street_city_and_zip() {
        let schema = validator();
        let address = schema
            .get_document("properties")
            .and_then(|p| p.get_document("address"))
            .unwrap();
        let required: Vec<_> = address
            .get_array("required")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["street", "city", "zipCode"]);
    }

    #[test]
    fn nested_city_is_indexed() {
        assert!(INDEXES.iter().any(|i| i.name() == "address.city_1"));
    }
}
