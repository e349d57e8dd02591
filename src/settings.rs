use serde::Deserialize;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use dotenv::dotenv;

use crate::data::booking::BookingConfig;

#[derive(Deserialize, Clone)]
pub struct Settings {
    /// Base URL of the Plek REST backend
    pub backend_url: String,
    /// Fixed institute offset from UTC in minutes (330 = Asia/Kolkata)
    pub timezone_offset_minutes: i32,
    pub slot_minutes: u16,
    /// Working hours in 24h "HH:MM" form; the slot grid is derived from these
    pub working_hours_start: String,
    pub working_hours_end: String,
}

impl Settings {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        dotenv().ok();

        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let mut settings: Settings = serde_yaml::from_str(&contents)?;

        settings.backend_url = parse_env_var(&settings.backend_url)?;

        Ok(settings)
    }

    pub fn booking_config(&self) -> BookingConfig {
        BookingConfig {
            timezone_offset_minutes: self.timezone_offset_minutes,
            slot_minutes: self.slot_minutes,
            working_hours_start: self.working_hours_start.clone(),
            working_hours_end: self.working_hours_end.clone(),
        }
    }
}

fn parse_env_var(value: &str) -> Result<String, Box<dyn std::error::Error>> {
    if value.starts_with("${") && value.ends_with("}") {
        let env_name = &value[2..value.len() - 1];
        match env::var(env_name) {
            Ok(val) => Ok(val),
            Err(_) => Err(format!("Environment variable '{}' not found", env_name).into()),
        }
    } else {
        Ok(value.to_string())
    }
}
