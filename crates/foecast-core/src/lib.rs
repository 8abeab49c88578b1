#![deny(warnings)]
pub mod analysis;
pub mod cycle;
pub mod export;
pub mod model;
pub mod predict;
pub mod session;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "foecast"
    }

    pub const fn codename() -> &'static str {
        "Magic Chess Predictor"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "foecast");
        assert_eq!(AppInfo::codename(), "Magic Chess Predictor");
        assert!(!AppInfo::version().is_empty());
    }
}
