use std::fs;

const DEFAULT_CONFIG: &str = "src/default_config.toml";

fn main() {
    println!("cargo:rerun-if-changed={DEFAULT_CONFIG}");

    let content = fs::read_to_string(DEFAULT_CONFIG)
        .unwrap_or_else(|e| panic!("cannot read {DEFAULT_CONFIG}: {e}"));

    // The bundled default is parsed leniently at runtime, so reject a broken
    // file here instead of silently falling back to struct defaults
    let table = content
        .parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("invalid {DEFAULT_CONFIG}: {e}"));

    let base_url = table
        .get("media")
        .and_then(|media| media.get("base_url"))
        .and_then(|url| url.as_str());
    if base_url.is_none_or(|url| url.trim().is_empty()) {
        panic!("{DEFAULT_CONFIG} must set a non-empty [media] base_url");
    }
}
