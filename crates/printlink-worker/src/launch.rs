// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker command line.

use printlink_core::WorkerConfig;

/// Shared secret the worker authenticates with, baked in at build time.
///
/// Set `PRINTLINK_WORKER_SECRET` when compiling release builds.
pub const WORKER_SECRET: &str = match option_env!("PRINTLINK_WORKER_SECRET") {
    Some(secret) => secret,
    None => "printlink-dev-secret",
};

/// The worker always talks to this control surface over HTTP.
const PROVIDER: &str = "http";

const PASSWORD_FLAG: &str = "--password";

/// Arguments for one launch, in the order the worker expects.
pub fn worker_args(config: &WorkerConfig, secret: &str) -> Vec<String> {
    [
        ("--site", config.site.as_str()),
        ("--provider", PROVIDER),
        ("--host", config.host.as_str()),
        ("--port", config.port.as_str()),
        ("--email", config.email.as_str()),
        (PASSWORD_FLAG, secret),
    ]
    .into_iter()
    .flat_map(|(flag, value)| [flag.to_string(), value.to_string()])
    .collect()
}

/// One `*` per character; the secret itself never reaches a log.
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Render `args` for logging with the password value masked.
pub fn display_args(args: &[String]) -> String {
    let mut out: Vec<String> = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            out.push(mask(arg));
            mask_next = false;
        } else {
            mask_next = arg == PASSWORD_FLAG;
            out.push(arg.clone());
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkerConfig {
        WorkerConfig {
            site: "a.com".into(),
            provider: "custom".into(),
            host: "0.0.0.0".into(),
            port: "9100".into(),
            email: "x@y.com".into(),
            ..WorkerConfig::default()
        }
    }

    #[test]
    fn args_follow_fixed_order() {
        let args = worker_args(&config(), "s3cret");
        assert_eq!(
            args,
            [
                "--site", "a.com", "--provider", "http", "--host", "0.0.0.0", "--port", "9100",
                "--email", "x@y.com", "--password", "s3cret",
            ]
        );
    }

    #[test]
    fn display_hides_secret() {
        let shown = display_args(&worker_args(&config(), "s3cret"));
        assert!(!shown.contains("s3cret"));
        assert!(shown.ends_with("--password ******"));
        assert!(shown.starts_with("--site a.com"));
    }

    #[test]
    fn mask_matches_length() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask(""), "");
    }
}
