//! Ad Kit Pricing CLI - Bridge interface for the site build
//!
//! Commands: plans, quote, offers, faq
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on a pricing error

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use adkit_pricing::{format_money, to_script_tag, Catalog, PricingEngine, Quote, Selection};

#[derive(Parser)]
#[command(name = "adkit-pricing-cli")]
#[command(about = "Ad Kit Pricing CLI - quotes and offer listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a catalog JSON file (defaults to the embedded catalog)
    #[arg(short, long, env = "ADKIT_PRICING_CATALOG")]
    catalog: Option<PathBuf>,

    /// Also render the quote total in this currency as `displayTotal`
    #[arg(long)]
    currency: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List plans and add-ons
    Plans,

    /// Price a plan with a set of add-ons
    Quote {
        /// Plan ID
        #[arg(short, long)]
        plan: String,

        /// Add-on ID (repeatable)
        #[arg(short, long = "addon")]
        addons: Vec<String>,
    },

    /// Emit the schema.org offer listing
    Offers {
        /// Wrap in a <script type="application/ld+json"> element
        #[arg(long)]
        script: bool,
    },

    /// Emit the schema.org FAQ page
    Faq {
        /// Wrap in a <script type="application/ld+json"> element
        #[arg(long)]
        script: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn load_engine(path: Option<&PathBuf>) -> Result<PricingEngine, adkit_pricing::PricingError> {
    match path {
        Some(path) => Ok(PricingEngine::new(Catalog::load_from_file(path)?)),
        None => PricingEngine::builtin(),
    }
}

/// Quote output. The quote itself always carries the catalog currency.
fn quote_output(quote: &Quote, display_currency: Option<&str>) -> serde_json::Value {
    let mut output = json!({
        "success": true,
        "quote": quote,
    });
    if let Some(code) = display_currency {
        output["displayTotal"] = json!(format_money(quote.total.amount(), code));
    }
    output
}

fn emit<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to serialize output: {}"}}"#, e);
            ExitCode::FAILURE
        }
    }
}

fn emit_error(error: impl std::fmt::Display) -> ExitCode {
    let output = json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", output);
    ExitCode::from(2)
}

fn emit_document<T: Serialize>(id: &str, document: &T, script: bool) -> ExitCode {
    if !script {
        return emit(document);
    }
    match to_script_tag(id, document) {
        Ok(tag) => {
            println!("{}", tag);
            ExitCode::SUCCESS
        }
        Err(e) => emit_error(e),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let engine = match load_engine(cli.catalog.as_ref()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load catalog: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Plans => {
            let catalog = engine.catalog();
            let plans: Vec<_> = catalog
                .list_plans()
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "name": p.name,
                    "basePrice": p.base_price,
                    "price": engine.format(p.base_price.into()),
                    "unit": p.unit.label(),
                    "features": p.features,
                }))
                .collect();

            emit(&json!({
                "currency": catalog.currency(),
                "plans": plans,
                "addons": catalog.list_addons(),
            }))
        }

        Commands::Quote { plan, addons } => {
            let selection: Selection = addons.into_iter().collect();

            match engine.quote(&plan, &selection) {
                Ok(quote) => emit(&quote_output(&quote, cli.currency.as_deref())),
                Err(e) => emit_error(e),
            }
        }

        Commands::Offers { script } => match engine.offer_listing() {
            Ok(listing) => emit_document("pricing-jsonld", &listing, script),
            Err(e) => emit_error(e),
        },

        Commands::Faq { script } => match engine.faq_page() {
            Ok(page) => emit_document("faq-jsonld", &page, script),
            Err(e) => emit_error(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quote() -> Quote {
        let engine = PricingEngine::builtin().unwrap();
        let selection: Selection = ["paid-usage"].into_iter().collect();
        engine.quote("ad-kit", &selection).unwrap()
    }

    #[test]
    fn test_quote_output_keeps_catalog_currency() {
        let quote = sample_quote();
        let output = quote_output(&quote, Some("EUR"));

        assert_eq!(output["displayTotal"], "€567.00");
        assert_eq!(output["quote"]["currency"], "USD");
        assert_eq!(output["quote"]["formattedTotal"], "$567.00");
        assert_eq!(output["quote"]["fingerprint"], quote.fingerprint.as_str());
    }

    #[test]
    fn test_quote_output_without_override() {
        let output = quote_output(&sample_quote(), None);
        assert_eq!(output["success"], true);
        assert!(output.get("displayTotal").is_none());
    }
}
