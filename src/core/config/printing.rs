use std::fmt::Write as _;

use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        print!("{}", self.describe());
    }

    pub fn describe(&self) -> String {
        let mut out = String::from("Current configuration:\n");
        let _ = match &self.endpoint {
            Some(endpoint) => writeln!(out, "  endpoint: {endpoint}"),
            None => writeln!(out, "  endpoint: (unset, using {})", self.endpoint_url()),
        };
        let _ = match self.request_timeout_secs {
            Some(0) | None => writeln!(out, "  request-timeout: (none)"),
            Some(secs) => writeln!(out, "  request-timeout: {secs}s"),
        };
        let _ = match &self.title {
            Some(title) => writeln!(out, "  title: {title}"),
            None => writeln!(out, "  title: (unset, using {})", self.title()),
        };
        out
    }
}
