use mongodb::bson::{Document, doc};

use super::{CollectionSpec, IndexSpec};

pub const COLLECTION: &str = "users";

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

// `createdAt` is indexed but not required by the validator.
pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::new(&[("userId", 1)]).unique(),
    IndexSpec::new(&[("email", 1)]).unique(),
    IndexSpec::new(&[("createdAt", 1)]),
];

pub const SPEC: CollectionSpec = CollectionSpec {
    name: COLLECTION,
    validator,
    indexes: INDEXES,
};

pub fn validator() -> Document {
    doc! {
        "bsonType": "object",
        "required": ["userId", "email", "profile"],
        "properties": {
            "userId": {
                "bsonType": "string",
                "description": "must be a string and is required"
            },
            "email": {
                "bsonType": "string",
                "pattern": EMAIL_PATTERN,
                "description": "must be a valid email address and is required"
            },
            "profile": {
                "bsonType": "object",
                "required": ["firstName", "lastName"],
                "properties": {
                    "firstName": {
                        "bsonType": "string",
                        "description": "must be a string and is required"
                    },
                    "lastName": {
                        "bsonType": "string",
                        "description": "must be a string and is required"
                    },
                    "phone": {
                        "bsonType": "string",
                        "description": "must be a string if the field exists"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_identity_email_and_profile() {
        let schema = validator();
        let required: Vec<_> = schema
            .get_array("required")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["userId", "email", "profile"]);
        assert!(!required.contains(&"createdAt"));
    }

    #[test]
    fn email_pattern_is_declared_verbatim() {
        let schema = validator();
        let email = schema
            .get_document("properties")
            .and_then(|p| p.get_document("email"))
            .unwrap();
        assert_eq!(
            email.get_str("pattern").unwrap(),
            "^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{2,}$"
        );
    }

    #[test]
    fn profile_requires_names_only() {
        let schema = validator();
        let profile = schema
            .get_document("properties")
            .and_then(|p| p.get_document("profile"))
            .unwrap();
        let required: Vec<_> = profile
            .get_array("required")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["firstName", "lastName"]);
        assert!(
            profile
                .get_document("properties")
                .unwrap()
                .contains_key("phone")
        );
    }
}
