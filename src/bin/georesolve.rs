use anyhow::Result;
use clap::{Parser, Subcommand};
use georesolve::{Family, GeoIp, GeoIpConfig, FALLBACK_UNKNOWN};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "georesolve")]
#[command(
    about = "Resolve IP addresses to city, region, country and coordinates",
    long_about = "georesolve - Geo-IP resolution against MaxMind-format databases\n\n\
    Looks up IP addresses in a memory-mapped city-level database and prints the\n\
    resolved location fields, the composite summary line, or the full set of\n\
    request-header annotations. Missing fields render as the fallback text.\n\n\
    Database selection:\n\
      --db / --db-v6 flags, or GEORESOLVE_DB_DIR / GEORESOLVE_V4_DB /\n\
      GEORESOLVE_V6_DB environment variables, defaulting to\n\
      /usr/share/GeoIP/GeoLite2-City.mmdb\n\n\
    Examples:\n\
      georesolve lookup 8.8.8.8\n\
      georesolve lookup --json 2001:4860:4860::8888\n\
      georesolve headers 8.8.8.8\n\
      georesolve summary 8.8.8.8"
)]
#[command(version)]
struct Cli {
    /// Database file for IPv4 lookups (and IPv6, unless --db-v6 is given)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Separate database file for IPv6 lookups
    #[arg(long, global = true, value_name = "FILE")]
    db_v6: Option<PathBuf>,

    /// Render missing fields as "Unknown" instead of an empty string
    #[arg(long, global = true)]
    unknown: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an IP address and print the location record
    Lookup {
        /// IP address to resolve (IPv4 or IPv6)
        #[arg(value_name = "IP")]
        ip: String,

        /// Output the record as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the eight request-header annotations for an IP address
    Headers {
        /// IP address to resolve (IPv4 or IPv6)
        #[arg(value_name = "IP")]
        ip: String,

        /// Output the annotations as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the composite one-line summary for an IP address
    Summary {
        /// IP address to resolve (IPv4 or IPv6)
        #[arg(value_name = "IP")]
        ip: String,
    },
}

fn build_context(cli: &Cli) -> GeoIp {
    let mut config = GeoIpConfig::from_env();
    if let Some(db) = &cli.db {
        config.v4_path = db.clone();
    }
    if let Some(db_v6) = &cli.db_v6 {
        config.v6_path = Some(db_v6.clone());
    }
    if cli.unknown {
        config.fallback = FALLBACK_UNKNOWN.to_string();
    }
    GeoIp::new(config)
}

fn cmd_lookup(geo: &GeoIp, ip: &str, json: bool) -> Result<()> {
    let addr = ip
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid IP address '{}': {}", ip, e))?;
    let record = geo.resolve(Family::of(addr), ip);

    let found = record.is_some();
    if json {
        match &record {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => println!("null"),
        }
    } else {
        match &record {
            Some(record) => {
                let show = |v: &Option<String>| v.clone().unwrap_or_default();
                println!("city:         {}", show(&record.city));
                println!("region:       {}", show(&record.region));
                println!("country code: {}", show(&record.country_code));
                println!("country name: {}", show(&record.country_name));
                println!("latitude:     {}", geo.latitude(ip));
                println!("longitude:    {}", geo.longitude(ip));
            }
            None => eprintln!("no record for {}", ip),
        }
    }

    // Exit code signals resolution for scripting.
    std::process::exit(if found { 0 } else { 1 });
}

fn cmd_headers(geo: &GeoIp, ip: &str, json: bool) -> Result<()> {
    let headers = geo.headers(ip);
    if json {
        println!("{}", serde_json::to_string_pretty(&headers)?);
    } else {
        for annotation in &headers {
            println!("{}: {}", annotation.name, annotation.value);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let geo = build_context(&cli);

    match &cli.command {
        Commands::Lookup { ip, json } => cmd_lookup(&geo, ip, *json),
        Commands::Headers { ip, json } => cmd_headers(&geo, ip, *json),
        Commands::Summary { ip } => {
            println!("{}", geo.summary(ip));
            Ok(())
        }
    }
}
