//! Subsurf CLI - Catmull-Clark subdivision from the command line.
//!
//! Usage: subsurf <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Set `RUST_LOG=debug` for per-level statistics.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use subsurf::algo::patches::{regular_patches, PATCH_SIZE};
use subsurf::algo::subdivide::{
    catmull_clark_subdivide_with_progress, LimitPositionSubdivider, SubdivideOptions,
    SubdivisionHierarchy, Subdivider,
};
use subsurf::algo::Progress;
use subsurf::error::MeshError;
use subsurf::io;
use subsurf::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "subsurf")]
#[command(author, version, about = "Catmull-Clark subdivision surfaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Subdivide a mesh
    Subdivide {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of subdivision levels
        #[arg(short, long, default_value = "1")]
        levels: usize,

        /// Project the result onto the limit surface
        #[arg(long)]
        limit: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// List the regular bicubic patches of a mesh
    Patches {
        /// Input mesh file
        input: PathBuf,

        /// Subdivide this many levels first
        #[arg(short, long, default_value = "0")]
        levels: usize,

        /// Print the control point indices of every patch
        #[arg(long)]
        dump: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = error_hint(e.as_ref()) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

/// Extra guidance for errors caused by the input mesh rather than the run.
fn error_hint(e: &(dyn std::error::Error + 'static)) -> Option<&'static str> {
    match e.downcast_ref::<MeshError>() {
        Some(e) if e.is_topology_error() => {
            Some("the input polygons must form a consistently oriented 2-manifold")
        }
        _ => None,
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Subdivide {
            input,
            output,
            levels,
            limit,
            sequential,
        } => {
            cmd_subdivide(&input, &output, levels, limit, sequential)?;
        }

        Commands::Patches { input, levels, dump } => {
            cmd_patches(&input, levels, dump)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Never move backwards
        let previous = max_percent.fetch_max(percent, Ordering::Relaxed);
        if percent <= previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let mut valences: BTreeMap<usize, usize> = BTreeMap::new();
    for (_, face) in mesh.faces() {
        *valences.entry(face.valence).or_default() += 1;
    }
    println!("Face valences:");
    for (valence, count) in &valences {
        println!("  {:>2}-gons: {}", valence, count);
    }

    let boundary = mesh.num_boundary_halfedges();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary half-edges)", boundary);
    }

    let extraordinary = mesh
        .vertex_ids()
        .filter(|&v| !mesh.is_boundary_vertex(v) && mesh.valence(v) != 4)
        .count();
    println!("Extraordinary interior vertices: {}", extraordinary);
    println!("Regular patches: {}", regular_patches(&mesh).len());

    Ok(())
}

fn cmd_subdivide(
    input: &Path,
    output: &Path,
    levels: usize,
    limit: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let options = SubdivideOptions::new(levels).with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };
    let progress = create_progress();

    let start = Instant::now();
    println!("Applying Catmull-Clark subdivision ({} levels, {})...", levels, mode);
    let mut result = catmull_clark_subdivide_with_progress(&mesh, &options, &progress)?;

    if limit {
        let projector: &dyn Subdivider<u32> = &LimitPositionSubdivider::new(options.clone());
        println!("Applying {}...", projector.name());
        result = projector.subdivide(&result)?;
    }
    let elapsed = start.elapsed();

    println!("Result: {} vertices, {} faces", result.num_vertices(), result.num_faces());
    io::save(&result, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_patches(input: &Path, levels: usize, dump: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;
    let mut hierarchy = SubdivisionHierarchy::new(mesh);
    let mesh = hierarchy.level(levels)?;

    let patches = regular_patches(mesh);
    println!(
        "Level {}: {} of {} faces are regular patches ({} indices)",
        levels,
        patches.len(),
        mesh.num_faces(),
        patches.len() * PATCH_SIZE
    );

    if dump {
        for patch in &patches {
            let row: Vec<String> = patch.iter().map(|v| v.index().to_string()).collect();
            println!("{}", row.join(" "));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_only_for_topology_errors() {
        let topology: Box<dyn std::error::Error> =
            Box::new(MeshError::NonManifoldEdge { v0: 0, v1: 1 });
        assert!(error_hint(topology.as_ref()).is_some());

        let parameter: Box<dyn std::error::Error> =
            Box::new(MeshError::invalid_param("levels", 99, "too many levels"));
        assert!(error_hint(parameter.as_ref()).is_none());

        let other: Box<dyn std::error::Error> = "unrelated".into();
        assert!(error_hint(other.as_ref()).is_none());
    }
}
