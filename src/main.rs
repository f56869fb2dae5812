use catgen::build::{build_site, BuildOptions};
use catgen::category::CategoryPage;
use catgen::config::Config;
use catgen::site::Site;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let source_arg = Arg::with_name("source")
        .short("s")
        .long("source")
        .value_name("DIR")
        .takes_value(true)
        .help("Directory to search (along with its parents) for _config.yml; defaults to the working directory");
    let verbose_arg = Arg::with_name("verbose")
        .short("v")
        .long("verbose")
        .multiple(true)
        .help("Log more detail; repeat for trace output");
    let quiet_arg = Arg::with_name("quiet")
        .short("q")
        .long("quiet")
        .help("Only log warnings and errors");

    let matches = App::new("catgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates one listing page per post category")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes the category pages")
                .arg(source_arg.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("DIR")
                        .takes_value(true)
                        .help("Write pages here instead of the source (stubs) or destination (--render) directory"),
                )
                .arg(
                    Arg::with_name("render")
                        .long("render")
                        .help("Render pages through the `category` layout instead of writing page stubs"),
                )
                .arg(
                    Arg::with_name("clean")
                        .long("clean")
                        .help("Delete stale category pages before writing: .html stubs in blog/categories with `layout: category` front matter, or every .html file there with --render"),
                )
                .arg(verbose_arg.clone())
                .arg(quiet_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Prints the category pages a build would write")
                .arg(source_arg)
                .arg(verbose_arg)
                .arg(quiet_arg),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => {
            init_logging(matches);
            let config = load_config(matches)?;
            let options = BuildOptions {
                render: matches.is_present("render"),
                output_directory: matches.value_of("output").map(PathBuf::from),
                clean: matches.is_present("clean"),
            };
            build_site(&config, &options)?;
            Ok(())
        }
        ("list", Some(matches)) => {
            init_logging(matches);
            let config = load_config(matches)?;
            print!("{}", listing(&Site::load(&config)?.category_pages()));
            Ok(())
        }
        // SubcommandRequiredElseHelp prints help before we get here.
        _ => Ok(()),
    }
}

/// Formats `pages` for `catgen list`: one `{output path}\t{title}` line per
/// page.
fn listing(pages: &[CategoryPage]) -> String {
    pages
        .iter()
        .map(|page| format!("{}\t{}\n", page.output_path().display(), page.title))
        .collect()
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let start = match matches.value_of("source") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    // Absolute so the search can climb above the starting directory.
    let start = start.canonicalize().map_err(|e| {
        format!("Resolving source directory '{}': {}", start.display(), e)
    })?;
    Ok(Config::from_directory(&start)?)
}

/// Initialises tracing-based logging on stderr. `RUST_LOG` wins if set;
/// otherwise the level follows `-q`/`-v`.
fn init_logging(matches: &ArgMatches) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if matches.is_present("quiet") {
        EnvFilter::new("warn")
    } else {
        match matches.occurrences_of("verbose") {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_listing() {
        let pages = vec![CategoryPage::new("ruby"), CategoryPage::new("web-development")];
        assert_eq!(
            "blog/categories/ruby.html\tRuby - Categories\n\
             blog/categories/web-development.html\tWeb Development - Categories\n",
            listing(&pages)
        );
    }

    #[test]
    fn test_listing_empty() {
        assert_eq!("", listing(&[]));
    }
}
