use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use flt2vhs_core::io::with_mapped;
use flt2vhs_core::vhs::{self, Tape};

#[derive(Args, Debug)]
pub struct CatArgs {
    /// Input .vhs path; omit or pass "-" to read stdin
    #[arg(long)]
    pub r#in: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Serialize)]
struct Line<'a, T: Serialize> {
    kind: &'a str,
    value: &'a T,
}

fn line<T: Serialize>(w: &mut impl Write, kind: &str, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *w, &Line { kind, value })?;
    w.write_all(b"\n")?;
    Ok(())
}

fn lines<T: Serialize>(w: &mut impl Write, kind: &str, values: &[T]) -> anyhow::Result<()> {
    for v in values {
        line(w, kind, v)?;
    }
    Ok(())
}

/// One JSON object per structure, in file order.
fn dump(tape: &Tape, w: &mut impl Write) -> anyhow::Result<()> {
    line(w, "header", &tape.header)?;
    lines(w, "entity", &tape.entities)?;
    lines(w, "feature", &tape.features)?;
    lines(w, "general-event", &tape.general_events)?;
    lines(w, "trailer", &tape.trailers)?;
    lines(w, "feature-event", &tape.feature_events)?;
    lines(w, "callsign", &tape.callsigns)?;
    w.flush()?;
    Ok(())
}

fn read_tape(input: Option<&Path>) -> anyhow::Result<Tape> {
    match input {
        Some(path) if path != Path::new("-") => with_mapped(path, vhs::decode)
            .with_context(|| format!("decode {}", path.display())),
        _ => {
            let mut bytes = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .context("read stdin")?;
            vhs::decode(&bytes).context("decode stdin")
        }
    }
}

pub fn run(args: CatArgs) -> anyhow::Result<i32> {
    let tape = read_tape(args.r#in.as_deref())?;

    match args.out.as_deref() {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
            dump(&tape, &mut BufWriter::new(f))?;
        }
        None => {
            let stdout = io::stdout();
            dump(&tape, &mut BufWriter::new(stdout.lock()))?;
        }
    }
    Ok(0)
}
