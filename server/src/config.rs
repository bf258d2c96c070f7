use std::path::PathBuf;

pub const DEFAULT_GEOJSON_PATH: &str = "data/geojs-21-mun.json";
pub const DEFAULT_MUNICIPALITIES_PATH: &str = "data/maranhao-municipios.json";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Both data documents are fixed for the life of the process.
pub const DATA_CACHE_CONTROL: &str = "public, max-age=300";

fn path_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn geojson_path() -> PathBuf {
    path_from_env("MAP_GEOJSON_PATH", DEFAULT_GEOJSON_PATH)
}

pub fn municipalities_path() -> PathBuf {
    path_from_env("MAP_MUNICIPALITIES_PATH", DEFAULT_MUNICIPALITIES_PATH)
}

pub fn static_dir() -> PathBuf {
    path_from_env("MAP_STATIC_DIR", DEFAULT_STATIC_DIR)
}

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn defaults_when_unset() {
        temp_env::with_vars_unset(
            [
                "MAP_GEOJSON_PATH",
                "MAP_MUNICIPALITIES_PATH",
                "MAP_STATIC_DIR",
                "SERVER_PORT",
            ],
            || {
                assert_eq!(geojson_path(), PathBuf::from(DEFAULT_GEOJSON_PATH));
                assert_eq!(municipalities_path(), PathBuf::from(DEFAULT_MUNICIPALITIES_PATH));
                assert_eq!(static_dir(), PathBuf::from(DEFAULT_STATIC_DIR));
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
            },
        );
    }

    #[test]
    fn paths_come_from_env() {
        temp_env::with_vars(
            [
                ("MAP_GEOJSON_PATH", Some("/srv/map/shapes.json")),
                ("MAP_MUNICIPALITIES_PATH", Some(" /srv/map/records.json ")),
                ("MAP_STATIC_DIR", Some("/srv/map/dist")),
            ],
            || {
                assert_eq!(geojson_path(), PathBuf::from("/srv/map/shapes.json"));
                assert_eq!(municipalities_path(), PathBuf::from("/srv/map/records.json"));
                assert_eq!(static_dir(), PathBuf::from("/srv/map/dist"));
            },
        );
    }

    #[test]
    fn blank_path_falls_back_to_default() {
        temp_env::with_var("MAP_GEOJSON_PATH", Some("   "), || {
            assert_eq!(geojson_path(), PathBuf::from(DEFAULT_GEOJSON_PATH));
        });
    }

    #[test]
    fn server_port_parses_and_rejects_invalid() {
        temp_env::with_var("SERVER_PORT", Some("8080"), || {
            assert_eq!(server_port(), 8080);
        });
        temp_env::with_var("SERVER_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("SERVER_PORT", Some("http"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("SERVER_PORT", Some("70000"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }
}
