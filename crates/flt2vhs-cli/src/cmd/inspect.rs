use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use flt2vhs_core::io::with_mapped;
use flt2vhs_core::FlightModel;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input .flt path
    #[arg(long)]
    pub r#in: PathBuf,
}

pub fn run(args: InspectArgs) -> anyhow::Result<i32> {
    let (bytes, model) = with_mapped(&args.r#in, |b| Ok((b.len(), FlightModel::ingest(b)?)))
        .with_context(|| format!("read {}", args.r#in.display()))?;

    println!("--- inspect ---");
    println!("file              = {}", args.r#in.display());
    println!("bytes             = {}", bytes);
    println!("records           = {}", model.counts.total());
    for (ty, n) in model.counts.nonzero() {
        println!("  {:<18}= {}", ty.name(), n);
    }
    println!("entities          = {}", model.entities.len());
    match model.span {
        Some(s) => println!("time_span         = {} .. {}", s.start, s.end),
        None => println!("time_span         = (none)"),
    }
    if let Some(tod) = model.globals.tod_offset {
        println!("tod_offset        = {}", tod);
    }
    println!("callsigns         = {}", model.globals.callsigns().len());
    match model.truncation {
        Some(t) => println!(
            "truncated         = at offset {} ({} bytes needed, {} left)",
            t.offset, t.needed, t.skipped
        ),
        None => println!("truncated         = false"),
    }
    Ok(0)
}
