use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;

use bluntify::args::BluntifyArgs;
use bluntify::pipeline::Bluntifier;

#[derive(Parser)]
#[command(name = "bluntify")]
#[command(version = "0.1.0")]
#[command(
    about = "Rewrites an overlapped assembly graph into an equivalent blunt graph",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    args: BluntifyArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = cli.args;

    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let mut bluntifier = Bluntifier::from_reader(BufReader::new(file), args.verbose)?;
    bluntifier.bluntify(args.num_threads)?;

    let mut gfa_out = BufWriter::new(
        File::create(&args.output)
            .with_context(|| format!("writing {}", args.output.display()))?,
    );
    bluntifier.write_gfa(&mut gfa_out)?;

    let mut provenance_out = BufWriter::new(
        File::create(&args.provenance)
            .with_context(|| format!("writing {}", args.provenance.display()))?,
    );
    bluntifier.write_provenance(&mut provenance_out)?;

    Ok(())
}
