use mongodb::{Client, Database};

/// Connection handle plus the database every step targets.
#[derive(Clone, Debug)]
pub struct BootstrapContext {
    pub client: Client,
    pub database_name: String,
    pub strict_validators: bool,
}

impl BootstrapContext {
    pub fn new(client: Client, database_name: impl Into<String>) -> Self {
        Self {
            client,
            database_name: database_name.into(),
            strict_validators: false,
        }
    }

    pub fn with_strict_validators(mut self, strict: bool) -> Self {
        self.strict_validators = strict;
        self
    }

    pub fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }
}
