//! `ngi`: inspect and build NextGen image identifiers

mod codec;

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use codec::Codec;
use ngi_assets::NextGenConfig;
use ngi_fileid::AddressingScheme;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn command() -> Command {
    Command::new("ngi")
        .version(ngi_fileid::VERSION)
        .about("NextGen image identifier tool")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("scheme")
                .long("scheme")
                .global(true)
                .value_parser(["hash", "natural"])
                .help("Addressing scheme, overriding the configuration"),
        )
        .subcommand(
            Command::new("parse")
                .about("Decode a file id")
                .arg(Arg::new("file-id").required(true)),
        )
        .subcommand(
            Command::new("build")
                .about("Encode a file id")
                .arg(Arg::new("filename").required(true))
                .arg(Arg::new("hash").long("hash").default_value(""))
                .arg(Arg::new("variant").long("variant").default_value("")),
        )
        .subcommand(
            Command::new("strip-variant")
                .about("File id of the original a variant was made from")
                .arg(Arg::new("file-id").required(true)),
        )
        .subcommand(
            Command::new("is-variant")
                .about("Whether a file id is a derived-format variant of an original")
                .arg(Arg::new("file-id").required(true))
                .arg(Arg::new("of").long("of").required(true).help("Filename of the original"))
                .arg(Arg::new("hash").long("hash").default_value("")),
        )
        .subcommand(
            Command::new("variant-name")
                .about("Variant tag for a manipulation")
                .arg(Arg::new("method").required(true))
                .arg(Arg::new("args").default_value("[]").help("JSON argument list")),
        )
        .subcommand(
            Command::new("clean")
                .about("Normalise a filename")
                .arg(Arg::new("filename").required(true)),
        )
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument '{name}'"))
}

fn load_config(matches: &ArgMatches) -> Result<NextGenConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => NextGenConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => NextGenConfig::default(),
    };
    if let Some(scheme) = matches.get_one::<String>("scheme") {
        config.addressing = scheme.parse::<AddressingScheme>()?;
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<Value> {
    let config = load_config(matches)?;
    let codec = Codec::new(&config)?;

    let output = match matches.subcommand() {
        Some(("parse", args)) => serde_json::to_value(codec.parse(arg(args, "file-id")?)?)?,
        Some(("build", args)) => {
            let file_id = codec.build(arg(args, "filename")?, arg(args, "hash")?, arg(args, "variant")?)?;
            json!({ "file_id": file_id })
        }
        Some(("strip-variant", args)) => serde_json::to_value(codec.strip_variant(arg(args, "file-id")?)?)?,
        Some(("is-variant", args)) => {
            let file_id = arg(args, "file-id")?;
            let original = arg(args, "of")?;
            json!({
                "file_id": file_id,
                "original": original,
                "is_variant": codec.is_variant(file_id, original, arg(args, "hash")?),
            })
        }
        Some(("variant-name", args)) => {
            json!({ "variant": codec::variant(arg(args, "method")?, arg(args, "args")?)? })
        }
        Some(("clean", args)) => json!({ "filename": codec.clean(arg(args, "filename")?) }),
        Some((other, _)) => return Err(anyhow!("unknown command '{other}'")),
        None => return Err(anyhow!("no command given")),
    };
    Ok(output)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();
    let output = run(&matches)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run_with(argv: &[&str]) -> Result<Value> {
        let matches = command().try_get_matches_from(std::iter::once("ngi").chain(argv.iter().copied()))?;
        run(&matches)
    }

    #[test]
    fn command_definition_is_valid() {
        command().debug_assert();
    }

    #[test]
    fn parse_prints_tuple() {
        let output = run_with(&["parse", "folder/abc1234567/wbg-logo__ScaleWidthWzEwMF0.png.webp"]).unwrap();
        assert_eq!(
            output,
            json!({
                "filename": "folder/wbg-logo.png.webp",
                "hash": "abc1234567",
                "variant": "ScaleWidthWzEwMF0",
                "file_id": "folder/abc1234567/wbg-logo__ScaleWidthWzEwMF0.png.webp",
            })
        );
    }

    #[test]
    fn scheme_flag_overrides_config() {
        let output = run_with(&["build", "images/x.png.webp", "--variant", "v", "--scheme", "natural"]).unwrap();
        assert_eq!(output, json!({ "file_id": "images/x__v.png.webp" }));
        assert!(run_with(&["build", "images/x.png.webp"]).is_err());
    }

    #[test]
    fn unrecognised_file_id_fails() {
        assert!(run_with(&["parse", "--scheme", "natural", "images/_resampled/x.png.webp"]).is_err());
    }

    #[test]
    fn variant_name_command() {
        let output = run_with(&["variant-name", "ScaleWidth", "[100]"]).unwrap();
        assert_eq!(output, json!({ "variant": "ScaleWidthWzEwMF0" }));
    }
}
