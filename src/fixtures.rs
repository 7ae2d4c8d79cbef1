#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use serde::Deserialize;
    use url::Url;

    use crate::builder::Field;
    use crate::types::Kind;

    #[derive(Deserialize, Debug, PartialEq)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        pub secure: bool,
        pub timeout: Duration,
        pub upstream: Option<Url>,
        pub database: DatabaseConfig,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    pub struct DatabaseConfig {
        pub pool_size: usize,
    }

    pub fn server_fields() -> Vec<Field> {
        vec![
            Field::new("host", Kind::Str)
                .env("HOST")
                .flag("-h,--host")
                .default("localhost")
                .help("Host to bind to"),
            Field::new("port", Kind::Uint)
                .env("PORT")
                .flag("-p,--port")
                .default("80")
                .help("Port to listen on"),
            Field::new("secure", Kind::Bool)
                .env("SECURE")
                .flag("-s,--secure")
                .default("false")
                .help("Serve over TLS"),
            Field::new("timeout", Kind::Duration)
                .env("TIMEOUT")
                .flag("--timeout")
                .default("30s")
                .help("Request timeout, e.g. 500ms or 1m30s"),
            Field::new("upstream", Kind::Url)
                .env("UPSTREAM")
                .flag("--upstream")
                .help("Backend to proxy requests to"),
            Field::new("database.pool_size", Kind::Uint)
                .env("DB_POOL")
                .default("5"),
        ]
    }

    #[test]
    fn server_fields_are_unique() {
        let fields = server_fields();
        let mut names: Vec<&str> = fields.iter().map(Field::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), fields.len());
    }
}
