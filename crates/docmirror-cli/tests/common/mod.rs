#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::MockServer;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a configured `docmirror` command suitable for integration tests.
#[allow(dead_code)]
pub fn docmirror_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docmirror"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env_remove("DOCMIRROR_CONFIG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// A sitemap listing `paths` under the mock server's root.
#[allow(dead_code)]
pub fn sitemap_xml(server: &MockServer, paths: &[&str]) -> String {
    let urls: String = paths
        .iter()
        .map(|p| format!("  <url><loc>{}/{p}</loc></url>\n", server.uri()))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{urls}</urlset>\n"
    )
}

/// One `[[sites]]` table.
#[allow(dead_code)]
pub fn site_toml(name: &str, sitemap_url: &str, prefix: &str, output_dir: &str) -> String {
    format!(
        "[[sites]]\nname = \"{name}\"\nsitemap_url = \"{sitemap_url}\"\n\
         prefixes = [\"{prefix}\"]\noutput_dir = \"{output_dir}\"\n\n"
    )
}

/// Write a config file with small timeouts and the given site tables.
#[allow(dead_code)]
pub fn write_config(dir: &Path, sites: &[String]) -> PathBuf {
    let mut body = String::from("concurrency = 4\ntimeout_secs = 5\n\n");
    for site in sites {
        body.push_str(site);
    }
    let path = dir.join("sites.toml");
    fs::write(&path, body).unwrap();
    path
}
