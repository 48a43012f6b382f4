use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BluntifyArgs {
    /// Input assembly graph (GFA 1.0 with overlap CIGARs on L lines)
    pub input: PathBuf,
    /// Output blunt GFA
    #[arg(short, long, default_value = "test_bluntify_final.gfa")]
    pub output: PathBuf,
    /// Provenance file mapping every output node to its source intervals
    #[arg(long, default_value = "test_bluntify_provenance.txt")]
    pub provenance: PathBuf,
    /// Worker threads for the biclique-cover phase (0 = all cores)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
