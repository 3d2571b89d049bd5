//! Writes the OpenAPI document of the voice agent API.
//!
//! Usage: `openapi [OUTPUT_PATH]` (defaults to `openapi.json`).

use utoipa::OpenApi;
use voice_agent_api::router::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, spec_json)?;
    println!("Wrote OpenAPI document to {}", path);
    Ok(())
}
