use clap::{Args, Parser, Subcommand};
use image_redirector::config::{self, Overrides, RedirectorConfig};
use image_redirector::hooks::Redirector;
use image_redirector::types::{ImageAttributes, ImageSize};
use image_redirector::{batch, logging, output, scanner};
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-redirector")]
#[command(about = "Point local image URLs at a production site")]
#[command(long_about = "\
Point local image URLs at a production site

Rewrites image references so a local or staging copy of a site loads its
images from production, without copying the uploads directory.

  /wp-content/uploads/a.jpg          → https://example.com/wp-content/uploads/a.jpg
  http://example.local/uploads/a.jpg → https://example.com/uploads/a.jpg
  https://cdn.other.net/a.jpg        → unchanged

In HTML, <img src>, srcset candidates and inline background-image url()
values are rewritten. Everything else is left byte-for-byte as it was.

Settings come from config.toml in --config-dir; flags override it.
Run 'image-redirector gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Flags layered over config.toml.
#[derive(Args, Clone)]
struct SettingsArgs {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Production site URL images should point at
    #[arg(long, global = true)]
    production_url: Option<String>,

    /// This site's own base URL
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// Turn redirection on regardless of config.toml
    #[arg(long, global = true, conflicts_with = "disable")]
    enable: bool,

    /// Turn redirection off regardless of config.toml
    #[arg(long, global = true)]
    disable: bool,
}

impl SettingsArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            production_url: self.production_url.clone(),
            site_url: self.site_url.clone(),
            enable_redirect: match (self.enable, self.disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one or more URLs
    Url {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Rewrite a srcset attribute value
    Srcset { value: String },
    /// Rewrite a JSON object of <img> attributes (src and srcset)
    Attrs { json: String },
    /// Rewrite a JSON [url, width, height, is_intermediate] image descriptor.
    /// Anything else is printed back unchanged.
    ImageSrc { json: String },
    /// Rewrite HTML from stdin, or HTML files in place
    Rewrite {
        /// Files or directories (walked for .html/.htm). Reads stdin when empty.
        paths: Vec<PathBuf>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// List the host extension points
    Hooks,
    /// Show the effective configuration
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Hooks => {
            for line in output::format_hooks() {
                println!("{}", line);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Check => {
            let site_config = load(&cli.settings)?;
            for line in output::format_check_output(&site_config) {
                println!("{}", line);
            }
        }
        command => {
            let site_config = load(&cli.settings)?;
            run(command, &build_redirector(&site_config))?;
        }
    }

    Ok(())
}

/// Commands that rewrite something.
fn run(command: Command, redirector: &Redirector) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Url { urls } => {
            for url in urls {
                println!("{}", redirector.attachment_url(&url));
            }
        }
        Command::Srcset { value } => {
            println!(
                "{}",
                scanner::rewrite_srcset(&value, redirector.config(), redirector.local_base_url())
            );
        }
        Command::Attrs { json } => {
            let attrs: ImageAttributes = serde_json::from_str(&json)?;
            let attrs = redirector.attachment_image_attributes(attrs);
            println!("{}", serde_json::to_string(&attrs)?);
        }
        Command::ImageSrc { json } => match serde_json::from_str::<ImageSize>(&json) {
            Ok(image) => {
                let image = redirector.attachment_image_src(Some(image));
                println!("{}", serde_json::to_string(&image)?);
            }
            // `null`, `false` and malformed tuples are not descriptors; they
            // go back out as they came in.
            Err(e) => {
                tracing::debug!(error = %e, "not an image descriptor; passing through");
                println!("{}", json);
            }
        },
        Command::Rewrite { paths, dry_run } => {
            if paths.is_empty() {
                let mut html = String::new();
                std::io::stdin().read_to_string(&mut html)?;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(redirector.content(&html).as_bytes())?;
                stdout.flush()?;
            } else {
                let files = batch::collect_html_files(&paths)?;
                let outcomes = batch::rewrite_files(&files, redirector, dry_run);
                output::print_batch_report(&outcomes, dry_run);
                let failed = batch::BatchStats::from_outcomes(&outcomes).failed;
                if failed > 0 {
                    return Err(format!("{failed} file(s) could not be rewritten").into());
                }
            }
        }
        Command::Hooks | Command::Check | Command::GenConfig => {}
    }
    Ok(())
}

fn load(settings: &SettingsArgs) -> Result<RedirectorConfig, config::ConfigError> {
    config::load_config(&settings.config_dir, &settings.overrides())
}

fn build_redirector(site_config: &RedirectorConfig) -> Redirector {
    if !site_config.is_active() {
        tracing::info!("redirection inactive; output will match input");
    }
    Redirector::new(site_config.rewrite_config(), site_config.site_url.clone())
}
