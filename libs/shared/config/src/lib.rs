use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tracing::warn;

pub const DEFAULT_DATA_FILE: &str = "data/doctors.json";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub server_host: IpAddr,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            server_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            server_port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_file = env::var("DIRECTORY_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                warn!("DIRECTORY_DATA_FILE not set, using {}", DEFAULT_DATA_FILE);
                defaults.data_file.clone()
            });

        let server_host = match env::var("SERVER_HOST") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("SERVER_HOST '{}' is not an IP address, using {}", raw, defaults.server_host);
                defaults.server_host
            }),
            Err(_) => defaults.server_host,
        };

        let server_port = match env::var("SERVER_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("SERVER_PORT '{}' is not a valid port, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => defaults.server_port,
        };

        Self {
            data_file,
            server_host,
            server_port,
        }
    }

    pub fn with_data_file(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            ..Self::default()
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}
