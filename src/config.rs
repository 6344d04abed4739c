fn required(key: &str) -> String {
    std::env::var(key)
        .unwrap_or_else(|_| panic!("Cannot retreive {} from environment variable.", key))
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,

    pub db_username: String,
    pub db_password: String,
    pub db_host: String,
    pub db_name: String,

    pub firebase_project_id: String,
    pub stripe_secret_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|it| it.parse().ok())
            .unwrap_or(5000);

        Self {
            port,

            db_username: required("DB_USERNAME"),
            db_password: required("DB_PASSWORD"),
            db_host: required("DB_HOST"),
            db_name: required("DB_NAME"),

            firebase_project_id: required("FIREBASE_PROJECT_ID"),
            stripe_secret_key: required("STRIPE_SECRET_KEY"),
        }
    }

    pub fn mongodb_uri(&self) -> String {
        format!(
            "mongodb+srv://{}:{}@{}/{}?retryWrites=true&w=majority",
            self.db_username, self.db_password, self.db_host, self.db_name
        )
    }
}
