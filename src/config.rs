// Environment-driven configuration; every key has a default matching the
// expected deployment layout.
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub class_names_path: PathBuf,
    pub recipes_path: PathBuf,
    pub database_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Loads configuration from environment variables, reading a `.env`
    /// file first if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let var = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let bind_addr = var("BIND_ADDR", "0.0.0.0:5000")
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        Ok(Self {
            model_path: PathBuf::from(var("MODEL_PATH", "indian_food_classifier.safetensors")),
            class_names_path: PathBuf::from(var("CLASS_NAMES_PATH", "class_names.txt")),
            recipes_path: PathBuf::from(var("RECIPES_PATH", "recipes.json")),
            database_path: PathBuf::from(var("DATABASE_PATH", "predictions.db")),
            uploads_dir: PathBuf::from(var("UPLOADS_DIR", "static/uploads")),
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_layout() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.model_path, PathBuf::from("indian_food_classifier.safetensors"));
        assert_eq!(config.class_names_path, PathBuf::from("class_names.txt"));
        assert_eq!(config.recipes_path, PathBuf::from("recipes.json"));
        assert_eq!(config.database_path, PathBuf::from("predictions.db"));
        assert_eq!(config.uploads_dir, PathBuf::from("static/uploads"));
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
    }
}
