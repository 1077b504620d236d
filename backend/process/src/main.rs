use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(default_value = catalog::CATALOG_PATH)]
    path: String,

    /// Report what would change without writing the file
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    process::normalize_catalog(&args.path, !args.check)?;

    Ok(())
}
