//! Gregory CLI - build and inspect Gregory patch buffers.
//!
//! Usage: gregory <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `gregory --help` for available commands. Set `RUST_LOG=info` (or
//! `debug`) for pipeline logging.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use clap::{Parser, Subcommand};

use gregory::io;
use gregory::mesh::HalfEdgeMesh;
use gregory::patch::stencil::{extrapolated_edge_point, VertexKind};
use gregory::patch::{
    classify_patches, tessellate, tessellate_with_progress, GregoryOptions, GregoryQuadPatchPoint,
    Patch, PointKind, Progress, Side,
};

#[derive(Parser)]
#[command(name = "gregory")]
#[command(author, version, about = "Gregory patch construction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh topology and face classification
    Info {
        /// Input mesh file (.obj or .ply)
        input: PathBuf,
    },

    /// Build patches and write the GPU patch buffer
    Pack {
        /// Input mesh file (.obj or .ply)
        input: PathBuf,

        /// Output patch buffer
        output: PathBuf,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,

        /// Also build patches for interior quads with extraordinary corners
        #[arg(long)]
        irregular: bool,

        /// Do not show the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build patches and report stencil weight sums
    Check {
        /// Input mesh file (.obj or .ply)
        input: PathBuf,

        /// Also build patches for interior quads with extraordinary corners
        #[arg(long)]
        irregular: bool,

        /// Largest accepted deviation of a weight sum
        #[arg(short, long, default_value = "1e-4")]
        tolerance: f32,
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
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Pack {
            input,
            output,
            sequential,
            irregular,
            quiet,
        } => {
            cmd_pack(&input, &output, sequential, irregular, quiet)?;
        }

        Commands::Check {
            input,
            irregular,
            tolerance,
        } => {
            cmd_check(&input, irregular, tolerance)?;
        }
    }

    Ok(())
}

fn options(sequential: bool, irregular: bool) -> GregoryOptions {
    let options = GregoryOptions::default().with_parallel(!sequential);
    if irregular {
        options.with_irregular_quads()
    } else {
        options
    }
}

/// Create a progress reporter that displays a progress bar on the terminal.
///
/// Each pipeline stage gets its own bar line.
fn create_progress() -> Progress {
    // (last percent drawn, message of the current bar)
    let state: Mutex<(Option<usize>, String)> = Mutex::new((None, String::new()));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        let Ok(mut state) = state.lock() else {
            return;
        };

        if state.1 != message {
            if matches!(state.0, Some(p) if p < 100) {
                eprintln!();
            }
            *state = (None, message.to_string());
        }

        // Use rounding instead of truncation for smoother progress
        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Ensure monotonic progress and only redraw when it increased
        if matches!(state.0, Some(p) if percent <= p) {
            return;
        }
        state.0 = Some(percent);

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let empty = bar_width - filled;

        let bar: String = std::iter::repeat('=').take(filled).collect();
        let space: String = std::iter::repeat(' ').take(empty).collect();

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if percent == 100 {
            eprintln!();
        }
    })
}

fn load(input: &Path) -> Result<HalfEdgeMesh, Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
    for f in mesh.face_ids() {
        *sizes.entry(mesh.face_len(f)).or_default() += 1;
    }
    let sizes: Vec<String> = sizes
        .iter()
        .map(|(len, count)| format!("{}x{}-gon", count, len))
        .collect();
    println!("Face sizes: {}", sizes.join(", "));

    // Boundary info
    let mut corners = 0;
    let mut t_junctions = 0;
    let mut unsupported = 0;
    let mut valences: BTreeMap<usize, usize> = BTreeMap::new();
    for v in mesh.vertex_ids() {
        match VertexKind::classify(&mesh, v) {
            VertexKind::Interior { valence } => *valences.entry(valence).or_default() += 1,
            VertexKind::Corner => corners += 1,
            VertexKind::TJunction => t_junctions += 1,
            VertexKind::Boundary { .. } => unsupported += 1,
        }
    }
    let boundary = corners + t_junctions + unsupported;
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary vertices: {} corners, {} T-junctions, {} unsupported)",
            boundary, corners, t_junctions, unsupported
        );
    }

    println!("\nInterior valences:");
    for (valence, count) in &valences {
        println!("  {:2}: {}", valence, count);
    }

    let groups = classify_patches(&mesh)?;
    println!("\nClassification:");
    println!("  Regular quads:    {}", groups.quad_patches.len());
    println!("  Irregular quads:  {}", groups.irregular_quad.len());
    println!("  Boundary quads:   {}", groups.edge_quad_patches.len());
    println!("  Regular tris:     {}", groups.tri_patches.len());
    println!("  Irregular tris:   {}", groups.irregular_tri.len());
    println!("  Boundary tris:    {}", groups.edge_tri_patches.len());
    println!("  Unclassified:     {}", groups.unclassified.len());

    Ok(())
}

fn cmd_pack(
    input: &Path,
    output: &Path,
    sequential: bool,
    irregular: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input)?;
    let options = options(sequential, irregular);

    let mode = if sequential { "sequential" } else { "parallel" };
    println!("Building patches ({})...", mode);

    let progress = if quiet {
        Progress::none()
    } else {
        create_progress()
    };

    let start = Instant::now();
    let result = tessellate_with_progress(&mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    io::patches::save(&result.packed, output)?;
    println!(
        "Saved: {} ({} patches, {} of {} faces, {:.2?})",
        output.display(),
        result.packed.patch_count(),
        result.patches.len(),
        mesh.num_faces(),
        elapsed
    );

    Ok(())
}

/// Weight-sum statistics of one control point family.
#[derive(Default)]
struct SumStats {
    count: usize,
    min: f32,
    max: f32,
    failures: usize,
}

impl SumStats {
    fn add(&mut self, sum: f32, expected: f32, tolerance: f32) {
        if self.count == 0 {
            self.min = sum;
            self.max = sum;
        }
        self.count += 1;
        self.min = self.min.min(sum);
        self.max = self.max.max(sum);
        if (sum - expected).abs() > tolerance {
            self.failures += 1;
        }
    }
}

fn cmd_check(input: &Path, irregular: bool, tolerance: f32) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input)?;
    let result = tessellate(&mesh, &options(false, irregular))?;

    let families = [
        (PointKind::Corner, "corner (p)", 1.0),
        (PointKind::Edge, "edge (e)", 1.0),
        (PointKind::Twist, "twist (r)", 0.0),
    ];
    let mut stats: [SumStats; 3] = Default::default();

    for patch in &result.patches {
        for point in GregoryQuadPatchPoint::ALL {
            let i = families
                .iter()
                .position(|(kind, _, _)| *kind == point.kind())
                .unwrap_or(0);
            stats[i].add(patch.point(point).weight_sum(), families[i].2, tolerance);
        }
    }

    println!("Patches: {}", result.patches.len());
    println!("Weight sums:");
    for ((_, name, expected), s) in families.iter().zip(&stats) {
        println!(
            "  {:10} expected {:.1}: min={:+.6}, max={:+.6}, {} of {} outside tolerance",
            name, expected, s.min, s.max, s.failures, s.count
        );
    }

    let deviation = edge_point_deviation(&mesh, &result.patches);
    println!("Max interior edge point deviation from P + 2/3 Q: {:.3e}", deviation);

    let failures: usize = stats.iter().map(|s| s.failures).sum();
    if failures > 0 {
        return Err(format!("{} control points outside tolerance {}", failures, tolerance).into());
    }
    Ok(())
}

/// Largest distance between a stored interior edge point and its re-extrapolation.
fn edge_point_deviation(mesh: &HalfEdgeMesh, patches: &[Patch]) -> f64 {
    let mut worst = 0.0f64;
    for patch in patches {
        for k in 0..4 {
            let v = mesh.origin(mesh.face_corner(patch.face, k));
            if !matches!(VertexKind::classify(mesh, v), VertexKind::Interior { .. }) {
                continue;
            }
            for side in [Side::Minus, Side::Plus] {
                let stored = patch
                    .point(GregoryQuadPatchPoint::edge(k, side))
                    .apply_weights(mesh);
                if let Ok(rebuilt) = extrapolated_edge_point(mesh, patch, k, side) {
                    worst = worst.max((stored - rebuilt).norm());
                }
            }
        }
    }
    worst
}
