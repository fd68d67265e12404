//! Chiral CLI - half-edge topology inspection tool.
//!
//! Usage: chiral <COMMAND> [OPTIONS] <INPUT>
//!
//! Run `chiral --help` for available commands.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use chiral::algo::{assemble_laplacian_with_progress, LaplacianOptions, Progress};
use chiral::io;
use chiral::mesh::{Mesh, TriangleId, VertexId};

#[derive(Parser)]
#[command(name = "chiral")]
#[command(author, version, about = "Half-edge topology CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display topology counts and chirality repairs
    Info {
        /// Input triangle list
        input: PathBuf,
    },

    /// Check topological invariants
    Verify {
        /// Input triangle list
        input: PathBuf,
    },

    /// Assemble the mesh Laplacian
    Laplacian {
        /// Input triangle list
        input: PathBuf,

        /// Write `i j w` triplets to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Edge lengths, one per edge, for inverse squared length weights
        #[arg(long, conflicts_with = "cotangents")]
        lengths: Option<PathBuf>,

        /// Cotangents, three per triangle, for cotangent weights
        #[arg(long)]
        cotangents: Option<PathBuf>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Print the neighbourhood of a vertex or triangle
    Status {
        /// Input triangle list
        input: PathBuf,

        /// Vertex to describe
        #[arg(short, long, required_unless_present = "triangle")]
        vertex: Option<usize>,

        /// Triangle to describe
        #[arg(short, long)]
        triangle: Option<usize>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::Verify { input } => cmd_verify(&input)?,
        Commands::Laplacian {
            input,
            output,
            lengths,
            cotangents,
            sequential,
        } => cmd_laplacian(
            &input,
            output.as_deref(),
            lengths.as_deref(),
            cotangents.as_deref(),
            sequential,
        )?,
        Commands::Status {
            input,
            vertex,
            triangle,
        } => cmd_status(&input, vertex, triangle)?,
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let last_percent = Arc::new(AtomicUsize::new(usize::MAX));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        let percent = (current * 100).min(total * 100) / total;
        if last_percent.swap(percent, Ordering::Relaxed) == percent {
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

fn read_values(path: &Path) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let values = text
        .split_whitespace()
        .map(|token| token.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(values)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: Mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.n_vertices());
    println!("Triangles: {}", mesh.n_triangles());
    println!("Edges: {}", mesh.n_edges());
    println!("Half-edges: {}", mesh.n_halfedges());
    println!("Full edges: {}", mesh.n_fulledges());
    println!("Boundary half-edges: {}", mesh.n_boundary_halfedges());

    let unreferenced = mesh.unreferenced_vertices();
    if !unreferenced.is_empty() {
        println!("Unreferenced vertices: {}", unreferenced.len());
    }
    if mesh.is_contiguous() {
        println!("Topology: Contiguous");
    } else {
        println!("Topology: Disconnected");
    }

    let repairs = mesh.chirality_repairs();
    if repairs.is_empty() {
        println!("Chirality: Consistent");
    } else {
        let flipped: usize = repairs.iter().map(|r| r.flipped).sum();
        println!(
            "Chirality: {} repairs, {} triangles flipped",
            repairs.len(),
            flipped
        );
        for repair in repairs {
            println!("  {}", repair);
        }
    }

    Ok(())
}

fn cmd_verify(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: Mesh = io::load(input)?;
    let diagnostics = mesh.verify();

    for diagnostic in &diagnostics {
        println!("{}", diagnostic);
    }
    if diagnostics.is_empty() {
        println!("OK: {} triangles verified", mesh.n_triangles());
        Ok(())
    } else {
        Err(format!("{} topology problems found", diagnostics.len()).into())
    }
}

fn cmd_laplacian(
    input: &Path,
    output: Option<&Path>,
    lengths: Option<&Path>,
    cotangents: Option<&Path>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: Mesh = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} triangles",
        mesh.n_vertices(),
        mesh.n_triangles()
    );

    let lengths = lengths.map(read_values).transpose()?;
    let cotangents = cotangents.map(read_values).transpose()?;

    let mut options = LaplacianOptions::default().with_parallel(!sequential);
    if let Some(lengths) = &lengths {
        options = options.with_edge_lengths(lengths);
    } else if let Some(cotangents) = &cotangents {
        options = options.with_cotangents(cotangents);
    }

    let mode = if sequential { "sequential" } else { "parallel" };
    println!("Assembling Laplacian ({})...", mode);

    let start = Instant::now();
    let laplacian = assemble_laplacian_with_progress(&mesh, &options, &create_progress())?;
    let elapsed = start.elapsed();
    println!("Entries: {} ({:.2?})", laplacian.len(), elapsed);

    if let Some(output) = output {
        let mut writer = BufWriter::new(File::create(output)?);
        for (i, j, w) in laplacian.triplets() {
            writeln!(writer, "{} {} {}", i, j, w)?;
        }
        writer.flush()?;
        println!("Saved: {}", output.display());
    }

    Ok(())
}

fn cmd_status(
    input: &Path,
    vertex: Option<usize>,
    triangle: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: Mesh = io::load(input)?;

    if let Some(v) = vertex {
        if v >= mesh.n_vertices() {
            return Err(format!("vertex {} out of range ({} vertices)", v, mesh.n_vertices()).into());
        }
        print!("{}", mesh.vertex_status(VertexId::new(v)));
    }
    if let Some(t) = triangle {
        if t >= mesh.n_triangles() {
            return Err(
                format!("triangle {} out of range ({} triangles)", t, mesh.n_triangles()).into(),
            );
        }
        println!("{}", mesh.triangle_status(TriangleId::new(t)));
    }

    Ok(())
}
