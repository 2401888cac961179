use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use log::{info, warn};

use flt2vhs_core::io::{convert_file, with_mapped};
use flt2vhs_core::vhs;

use super::EXIT_TRUNCATED;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input .flt path
    #[arg(long)]
    pub r#in: PathBuf,

    /// Output .vhs path (default: input with a .vhs extension)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: ConvertArgs) -> anyhow::Result<i32> {
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| args.r#in.with_extension("vhs"));

    let started = Instant::now();
    let report = convert_file(&args.r#in, &out).with_context(|| {
        format!(
            "convert {} -> {}",
            args.r#in.display(),
            out.display()
        )
    })?;
    let elapsed = started.elapsed();

    for (ty, n) in report.records.nonzero() {
        info!("{:>18}: {}", ty.name(), n);
    }
    if let Some(span) = report.span {
        info!("time span {} .. {}", span.start, span.end);
    }

    let id = with_mapped(&out, |bytes| Ok(vhs::content_id_hex(bytes)))
        .with_context(|| format!("re-read {}", out.display()))?;

    eprintln!("--- convert ---");
    eprintln!("in                = {}", args.r#in.display());
    eprintln!("out               = {}", out.display());
    eprintln!("flt_bytes         = {}", report.input_bytes);
    eprintln!("vhs_bytes         = {}", report.output_bytes);
    eprintln!("records           = {}", report.records.total());
    eprintln!("entities          = {}", report.entity_count);
    eprintln!("features          = {}", report.feature_count);
    if report.unplaced_count > 0 {
        eprintln!("unplaced          = {}", report.unplaced_count);
    }
    if report.stray_status_count > 0 {
        eprintln!("stray_statuses    = {}", report.stray_status_count);
    }
    eprintln!("tracers           = {}", report.tracer_count);
    eprintln!("stationary_sfx    = {}", report.stationary_sfx_count);
    eprintln!("moving_sfx        = {}", report.moving_sfx_count);
    eprintln!("callsigns         = {}", report.callsign_count);
    eprintln!("content_id        = {}", id);
    eprintln!("elapsed           = {:?}", elapsed);

    match report.truncation {
        Some(t) => {
            warn!(
                "{} was cut short at offset {}; {} trailing bytes were not converted",
                args.r#in.display(),
                t.offset,
                t.skipped
            );
            eprintln!("truncated         = true");
            Ok(EXIT_TRUNCATED)
        }
        None => Ok(0),
    }
}
