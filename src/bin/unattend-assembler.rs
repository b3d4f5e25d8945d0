use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;
use unattend_assembler::schema::Schema;
use unattend_assembler::settings::Configuration;
use unattend_assembler::{codec, Element};

fn usage() -> &'static str {
    "Usage:\n  unattend-assembler generate <settings.toml|settings.json> <output.xml>\n  unattend-assembler validate <answer.xml>\n  unattend-assembler embed <destination-path> <input-file>"
}

fn main() -> Result<()> {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [cmd, settings, output] if cmd == "generate" => {
            generate(Path::new(settings), Path::new(output))
        }
        [cmd, answer] if cmd == "validate" => validate(Path::new(answer)),
        [cmd, destination, input] if cmd == "embed" => embed(destination, Path::new(input)),
        _ => bail!(usage()),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(settings: &Path, output: &Path) -> Result<()> {
    let config = Configuration::load(settings)
        .with_context(|| format!("loading settings from '{}'", settings.display()))?;
    let document = unattend_assembler::generate(&config)
        .with_context(|| format!("generating answer file from '{}'", settings.display()))?;
    document
        .write_to(output)
        .with_context(|| format!("writing '{}'", output.display()))?;

    let bytes = document.to_bytes();
    let sha = {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        format!("{:x}", hasher.finalize())
    };
    println!("[generate] wrote {}", output.display());
    println!("[generate] {} bytes, sha256 {sha}", bytes.len());
    Ok(())
}

fn validate(answer: &Path) -> Result<()> {
    let text = fs::read_to_string(answer)
        .with_context(|| format!("reading '{}'", answer.display()))?;
    let root = Element::parse(&text)
        .with_context(|| format!("parsing '{}'", answer.display()))?;
    Schema::packaged()?
        .validate(&root)
        .with_context(|| format!("validating '{}'", answer.display()))?;
    println!("[validate] {}: ok", answer.display());
    Ok(())
}

fn embed(destination: &str, input: &Path) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("reading '{}'", input.display()))?;
    let plan = codec::write_to_file(destination, &text);
    eprintln!(
        "[embed] {} command(s), chunk budget {}",
        plan.len(),
        codec::max_chunk(destination)
    );
    for command in plan {
        println!("{command}");
    }
    Ok(())
}
